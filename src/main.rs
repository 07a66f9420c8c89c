use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env};
use std::ffi::OsString;
use std::time::Duration;

use one_lane_bridge::simulation::{
    BridgeWorld, Reporter, SimConfig, DEFAULT_VEHICLES, MAX_VEHICLES,
};

#[derive(Parser)]
#[command(name = "one_lane_bridge")]
#[command(about = "Vehicles crossing a one-lane bridge between cities A and B")]
struct Cli {
    /// Number of vehicles
    #[arg(default_value_t = DEFAULT_VEHICLES, value_parser = parse_vehicle_count)]
    vehicles: usize,

    /// List the queued vehicles per direction under every report line
    #[arg(long)]
    debug: bool,

    /// Time a vehicle spends on the bridge, in milliseconds
    #[arg(long, default_value = "1000")]
    crossing_ms: u64,

    /// Shortest drive around a city between crossings, in milliseconds
    #[arg(long, default_value = "1000")]
    min_wander_ms: u64,

    /// Longest drive around a city between crossings, in milliseconds
    #[arg(long, default_value = "7000")]
    max_wander_ms: u64,

    /// Seed for reproducible home cities and drive times
    #[arg(long)]
    seed: Option<u64>,

    /// Stop cleanly after this many seconds instead of running forever
    #[arg(long)]
    duration_secs: Option<u64>,
}

impl Cli {
    fn config(&self) -> SimConfig {
        SimConfig {
            vehicles: self.vehicles,
            verbose: self.debug,
            crossing_time: Duration::from_millis(self.crossing_ms),
            min_wander: Duration::from_millis(self.min_wander_ms),
            max_wander: Duration::from_millis(self.max_wander_ms),
            seed: self.seed,
        }
    }
}

fn parse_vehicle_count(arg: &str) -> Result<usize, String> {
    let count: usize = arg
        .parse()
        .map_err(|_| format!("'{}' is not a valid vehicle count", arg))?;
    if count < 1 {
        return Err("there must be at least one vehicle".to_string());
    }
    if count > MAX_VEHICLES {
        return Err(format!("at most {} vehicles are supported", MAX_VEHICLES));
    }
    Ok(count)
}

/// Accept the single-dash `-debug` spelling anywhere on the command line
fn normalize_args(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    args.into_iter()
        .map(|arg| {
            if arg == "-debug" {
                OsString::from("--debug")
            } else {
                arg
            }
        })
        .collect()
}

fn main() {
    Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse_from(normalize_args(std::env::args_os()));

    if let Err(err) = run(&cli) {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let world = BridgeWorld::new(cli.config(), Reporter::stdout(cli.debug))?;
    world.report_fleet()?;

    let running = world.start()?;
    let summary = running.run_for(cli.duration_secs.map(Duration::from_secs))?;
    summary.log();
    Ok(())
}
