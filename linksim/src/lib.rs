//! # Link budget simulation
//!
//! `linksim` estimates downlink capacity for receivers scattered across
//! a hexagonal cell site and searches for the lowest transmit power that
//! still carries each hour's traffic.

pub mod demand;
mod error;
mod interference;
pub mod link;
mod math;
pub mod mcs;
pub mod optimizer;
pub mod params;
pub mod propagation;
pub mod receivers;
pub mod simulation;
pub mod stats;

pub use {
    crate::{
        demand::HourlyShare,
        error::ConfigError,
        interference::interference,
        link::{estimate_link, LinkEstimate, LinkParams},
        mcs::{McsRow, McsTable, ModulationAndCoding},
        optimizer::{PowerOptimizer, PowerRange, PowerSelection},
        params::{Carrier, Scenario},
        receivers::{Receiver, ReceiverSampler},
        simulation::{HourlyResult, ScenarioEnergy, Simulation},
        stats::LinkSummary,
    },
    hexsite,
};
