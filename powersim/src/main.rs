#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]

mod config;
mod options;
mod progress;

use anyhow::Error as AnyError;
use clap::Parser;
use config::{load_hourly_share, Config};
use hexsite::{Crs, SiteLayout};
use linksim::{
    stats::CONFIDENCE_INTERVALS, HourlyResult, LinkParams, LinkSummary, PowerOptimizer, Receiver,
    ReceiverSampler, ScenarioEnergy, Simulation,
};
use log::info;
use options::{Cli, Command as CliCmd, Format};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::io::Write;
use textplots::{Chart, Plot, Shape};

fn main() -> Result<(), AnyError> {
    let cli = Cli::parse();
    let Cli {
        seed,
        center,
        radius,
        rings,
        population,
        config,
        cmd,
    } = cli;

    env_logger::init();

    let config = Config::load(config.as_deref())?;
    let site = SiteLayout::builder()
        .center(center.0)
        .radius(radius)
        .rings(rings)
        .build()?;
    info!(
        "site; area: {:.2} km², interferers: {}",
        site.site_area_km2(),
        site.interfering_transmitters.len()
    );

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let receivers = ReceiverSampler::default()
        .indoor_probability(config.indoor_probability())
        .sample(&site.site_area, population, &mut rng)?;

    match cmd {
        CliCmd::Run { hourly, format } => {
            let simulation = Simulation::builder()
                .site(site)
                .population(receivers)
                .hourly_share(load_hourly_share(hourly.as_deref())?)
                .scenarios(config.scenarios())
                .carrier(config.carrier())
                .mcs(config.mcs()?)
                .monthly_data_gb(config.monthly_data_gb())
                .build()?;
            run(&simulation, format)?;
        }
        CliCmd::Receivers { format } => match format {
            Format::Csv => print_receivers_csv(&receivers, &site)?,
            Format::Json => print_receivers_json(&receivers, &site)?,
            Format::Plot => plot_receivers(&receivers, &site),
        },
        CliCmd::Link { power, scenario } => {
            let scenario = config.scenario(&scenario)?;
            let carrier = config.carrier();
            let mcs = config.mcs()?;
            let params = LinkParams::new(&scenario, &carrier)?;
            let table = mcs.get(&carrier.generation)?;
            let optimizer = PowerOptimizer::new(&scenario, &params, &site, table)?;
            let estimates = optimizer.sample_links(&receivers, power, scenario.seed);
            let summaries =
                LinkSummary::summarize(&estimates, site.site_area_km2(), &CONFIDENCE_INTERVALS);
            print_link_summary(&summaries)?;
        }
    };
    Ok(())
}

fn run(simulation: &Simulation, format: Format) -> Result<(), AnyError> {
    let pb = progress::bar(
        "simulating".to_string(),
        (simulation.scenarios().len() * 24) as u64,
    );
    let results = simulation.run(|result| {
        pb.set_message(format!("{} hour {}", result.scenario, result.hour));
        pb.inc(1);
    })?;
    pb.finish_and_clear();

    match format {
        Format::Csv => print_csv(&results)?,
        Format::Json => print_json(&results)?,
        Format::Plot => plot_ascii(simulation, &results),
    };

    for energy in ScenarioEnergy::from_results(&results) {
        info!(
            "{}; daily: {:.3} kWh, annual: {:.1} kWh, unmet hours: {}",
            energy.scenario, energy.daily_kwh, energy.annual_kwh, energy.unmet_hours
        );
    }
    Ok(())
}

/// # Example with gnuplot
///
/// ```sh
/// cargo run -- run | grep managed_power | tr ',' ' ' > ~/.tmp/plot && gnuplot -p -e "plot '~/.tmp/plot' using 3:11 with steps"
/// ```
fn print_csv(results: &[HourlyResult]) -> Result<(), AnyError> {
    let mut stdout = std::io::stdout().lock();
    writeln!(
        stdout,
        "scenario,site_radius_km,hour,hourly_share,per_user_demand_mbps,active_users,total_demand_mbps,demand_mbps_km2,capacity_mbps_km2,capacity_demand_metric,tx_power_w,demand_met"
    )?;
    for HourlyResult {
        scenario,
        site_radius_km,
        hour,
        hourly_share,
        per_user_demand_mbps,
        active_users,
        total_demand_mbps,
        demand_mbps_km2,
        capacity_mbps_km2,
        capacity_demand_metric,
        tx_power_w,
        demand_met,
    } in results
    {
        writeln!(
            stdout,
            "{scenario},{site_radius_km},{hour},{hourly_share},{per_user_demand_mbps},{active_users},{total_demand_mbps},{demand_mbps_km2},{capacity_mbps_km2},{capacity_demand_metric},{tx_power_w},{demand_met}",
        )?;
    }
    Ok(())
}

fn print_json(results: &[HourlyResult]) -> Result<(), AnyError> {
    let json = serde_json::to_string(results)?;
    println!("{json}");
    Ok(())
}

fn plot_ascii(simulation: &Simulation, results: &[HourlyResult]) {
    for scenario in simulation.scenarios() {
        let plot_data: Vec<(f32, f32)> = results
            .iter()
            .filter(|result| result.scenario == scenario.name)
            .map(|result| (result.hour as f32, result.tx_power_w as f32))
            .collect();
        println!("{}: transmit power (W) by hour", scenario.name);
        Chart::new(120, 60, 0.0, 23.0)
            .lineplot(&Shape::Steps(&plot_data))
            .display();
    }
}

fn print_receivers_csv(receivers: &[Receiver], site: &SiteLayout) -> Result<(), AnyError> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "id,x,y,longitude,latitude,indoor")?;
    for receiver in receivers {
        let (x, y) = receiver.location.x_y();
        let lonlat = site.crs.transform(receiver.location.0, Crs::Wgs84);
        writeln!(
            stdout,
            "{receiver},{x},{y},{},{},{}",
            lonlat.x, lonlat.y, receiver.indoor
        )?;
    }
    Ok(())
}

fn print_receivers_json(receivers: &[Receiver], site: &SiteLayout) -> Result<(), AnyError> {
    #[derive(Serialize)]
    struct JsonEntry {
        id: String,
        location: [f64; 2],
        lonlat: [f64; 2],
        indoor: bool,
    }

    let reshaped: Vec<JsonEntry> = receivers
        .iter()
        .map(|receiver| {
            let lonlat = site.crs.transform(receiver.location.0, Crs::Wgs84);
            JsonEntry {
                id: receiver.to_string(),
                location: [receiver.location.x(), receiver.location.y()],
                lonlat: [lonlat.x, lonlat.y],
                indoor: receiver.indoor,
            }
        })
        .collect();
    let json = serde_json::to_string(&reshaped)?;
    println!("{json}");
    Ok(())
}

/// Receivers relative to the serving transmitter, in km.
fn plot_receivers(receivers: &[Receiver], site: &SiteLayout) {
    let origin = site.transmitter;
    let plot_data: Vec<(f32, f32)> = receivers
        .iter()
        .map(|receiver| {
            let offset = receiver.location - origin;
            ((offset.x() / 1e3) as f32, (offset.y() / 1e3) as f32)
        })
        .collect();
    let extent = (2.0 * site.radius_m / 1e3) as f32;
    Chart::new(120, 120, -extent, extent)
        .lineplot(&Shape::Points(&plot_data))
        .display();
}

fn print_link_summary(summaries: &[LinkSummary]) -> Result<(), AnyError> {
    let mut stdout = std::io::stdout().lock();
    writeln!(
        stdout,
        "confidence_interval,path_loss_db,received_power_db,interference,noise_db,sinr,spectral_efficiency,capacity_mbps,capacity_mbps_km2"
    )?;
    for LinkSummary {
        confidence_interval,
        path_loss_db,
        received_power_db,
        interference,
        noise_db,
        sinr,
        spectral_efficiency,
        capacity_mbps,
        capacity_mbps_km2,
    } in summaries
    {
        writeln!(
            stdout,
            "{confidence_interval},{path_loss_db},{received_power_db},{interference},{noise_db},{sinr},{spectral_efficiency},{capacity_mbps},{capacity_mbps_km2}",
        )?;
    }
    Ok(())
}
