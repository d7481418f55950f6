//! # Hexagonal cell sites
//!
//! `hexsite` lays out a serving transmitter, its hexagonal site area,
//! and the surrounding rings of interfering transmitters in a
//! projected (planar, meter based) coordinate system.

mod crs;
mod error;
pub mod layout;

pub use {
    crate::{crs::Crs, error::HexSiteError, layout::SiteLayout},
    geo,
};
