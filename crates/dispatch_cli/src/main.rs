//! `dispatch-cli` (C9, §6): loads the four JSON configs plus the tabular input named by a
//! `simulation_config` document, runs the event loop to completion, and writes the report
//! tables. Grounded on the teacher's `xtask` binary: a `clap` derive `Parser`/`Subcommand`
//! wired straight into the library crate, with `tracing-subscriber` installed for logging.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use dispatch_core::config;
use dispatch_core::context::SimulationContext;
use dispatch_core::dispatcher::Dispatcher;
use dispatch_core::input;
use dispatch_core::report;
use dispatch_core::runner::Runner;
use dispatch_core::skim::Skim;

#[derive(Parser)]
#[command(name = "dispatch-cli", about = "On-demand ride-hailing dispatch and pooling simulation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Runs a simulation from a `simulation_config` JSON document and writes its reports.
    Run {
        /// Path to the `simulation_config` JSON file.
        config: PathBuf,
        /// Date tag for the report directory, e.g. `2026-07-31` (defaults to `run`).
        #[arg(long, default_value = "run")]
        date: String,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run { config, date } => match run(&config, &date) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                tracing::error!(error = %err, "simulation run failed");
                ExitCode::FAILURE
            }
        },
    }
}

fn run(config_path: &std::path::Path, date: &str) -> Result<(), Box<dyn std::error::Error>> {
    let base = config_path.parent().unwrap_or_else(|| std::path::Path::new("."));

    info!(path = %config_path.display(), "loading simulation config");
    let sim_config = config::load_simulation_config(config_path)?;
    let city_config = config::load_city_config(&base.join(&sim_config.city_config))?;
    let behavioural_config = config::load_behavioural_config(&base.join(&sim_config.behavioural_config))?;
    let fares_config = config::load_fares_config(&base.join(&sim_config.fares_config))?;

    let requests_path = base.join(&sim_config.requests);
    let vehicles_path = base.join(&sim_config.vehicles);
    let epoch = input::earliest_epoch(&requests_path, &vehicles_path)?;
    let requests = input::load_requests(&requests_path, epoch)?;
    let vehicles = input::load_vehicles(&vehicles_path, epoch)?;
    info!(requests = requests.len(), vehicles = vehicles.len(), "loaded tabular input");

    let graph = config::load_road_graph(&base.join(&city_config.paths.city_graph))?;
    let skim = Skim::from_graph(graph);

    let mut ctx = SimulationContext::new(skim, sim_config.refresh_density, epoch);

    let mut operators: Vec<String> = vehicles.iter().map(|v| v.operator.clone()).collect();
    operators.extend(requests.iter().map(|r| r.operator.clone()));
    operators.sort();
    operators.dedup();
    let taxi_only: std::collections::HashSet<&String> = sim_config.taxi_operators.iter().collect();
    for operator in operators {
        let fares = fares_config.fares_for(&operator)?;
        let operating_costs = fares_config.operating_costs_for(&operator)?;
        ctx.register_dispatcher(Dispatcher::new(
            operator.clone(),
            fares,
            operating_costs,
            taxi_only.contains(&operator),
        ));
    }

    let behaviour = behavioural_config.to_behaviour();
    let mut runner = Runner::new(vehicles, requests, behaviour);
    info!(city = %city_config.city, "starting event loop");
    runner.run(&mut ctx)?;

    let resigned = ctx.travellers.iter().filter(|t| t.is_resigned()).count();
    if resigned > 0 {
        warn!(resigned, "travellers resigned before being served");
    }

    let output_path = base.join(&sim_config.output_path);
    report::write_reports(&ctx, &output_path, date)?;
    info!(path = %output_path.join(date).display(), "wrote reports");

    Ok(())
}
