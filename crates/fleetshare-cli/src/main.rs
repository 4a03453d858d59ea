use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use fleetshare_cli::output::{render_nearby, render_summary, render_vehicles, OutputFormat};
use fleetshare_cli::simulation::{run_simulation, SimulationConfig};
use fleetshare_cli::terminal::ColorPalette;
use fleetshare_lib::{demo_fleet, save_fleet, Fleet, GeoLocation};

#[derive(Parser, Debug)]
#[command(author, version, about = "fleetshare dataset, query, and simulation tools")]
struct Cli {
    /// Fleet dataset (SQLite `.db` or `.json`).
    #[arg(long, env = "FLEETSHARE_DATA_PATH", default_value = "fleet.db", global = true)]
    data: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a demo fleet laid out around a centre point.
    Init {
        #[arg(long, default_value_t = 50)]
        vehicles: usize,
        #[arg(long, default_value_t = 5)]
        riders: usize,
        #[arg(long, default_value_t = 52.5466, allow_negative_numbers = true)]
        latitude: f64,
        #[arg(long, default_value_t = 13.3512, allow_negative_numbers = true)]
        longitude: f64,
        /// Overwrite an existing dataset.
        #[arg(long)]
        force: bool,
    },
    /// List available vehicles within a radius, nearest first.
    Nearby {
        #[arg(long, allow_negative_numbers = true)]
        latitude: f64,
        #[arg(long, allow_negative_numbers = true)]
        longitude: f64,
        /// Search radius in meters.
        #[arg(long, default_value_t = 200.0)]
        radius: f64,
    },
    /// List every vehicle in the dataset.
    Vehicles,
    /// Run riders concurrently against the dataset and report the outcome.
    Simulate {
        #[arg(long, default_value_t = 3)]
        trips: usize,
        /// Location updates per trip.
        #[arg(long, default_value_t = 5)]
        steps: usize,
        #[arg(long, default_value_t = 10.0)]
        step_meters: f64,
        #[arg(long, default_value_t = 500.0)]
        radius: f64,
        /// Pause between a rider's trips, in milliseconds.
        #[arg(long, default_value_t = 0)]
        rest_ms: u64,
        /// Write the final vehicle positions back to the dataset.
        #[arg(long)]
        save: bool,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let palette = ColorPalette::detect();

    match cli.command {
        Command::Init {
            vehicles,
            riders,
            latitude,
            longitude,
            force,
        } => handle_init(
            &cli.data,
            GeoLocation::new(latitude, longitude),
            vehicles,
            riders,
            force,
        ),
        Command::Nearby {
            latitude,
            longitude,
            radius,
        } => {
            let fleet = load(&cli.data)?;
            let nearby = fleet
                .query_nearby(GeoLocation::new(latitude, longitude), radius)
                .context("nearby query failed")?;
            render_nearby(&mut io::stdout().lock(), &nearby, cli.format, &palette)?;
            Ok(())
        }
        Command::Vehicles => {
            let fleet = load(&cli.data)?;
            let vehicles = fleet.vehicles()?;
            render_vehicles(&mut io::stdout().lock(), &vehicles, cli.format, &palette)?;
            Ok(())
        }
        Command::Simulate {
            trips,
            steps,
            step_meters,
            radius,
            rest_ms,
            save,
        } => {
            let fleet = load(&cli.data)?;
            let origin = fleet
                .vehicles()?
                .first()
                .map(|v| v.location)
                .context("dataset has no vehicles")?;
            let config = SimulationConfig {
                origin,
                trips_per_rider: trips,
                steps_per_trip: steps,
                step_meters,
                search_radius: radius,
                rest: Duration::from_millis(rest_ms),
            };

            let summary = run_simulation(&fleet, fleet.riders(), &config)?;
            render_summary(&mut io::stdout().lock(), &summary, cli.format, &palette)?;

            if save {
                save_fleet(&cli.data, &fleet.snapshot()?)
                    .with_context(|| format!("failed to save {}", cli.data.display()))?;
                info!(path = %cli.data.display(), "fleet positions saved");
            }
            Ok(())
        }
    }
}

fn handle_init(
    path: &Path,
    center: GeoLocation,
    vehicles: usize,
    riders: usize,
    force: bool,
) -> Result<()> {
    center.validate()?;
    if path.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite",
            path.display()
        );
    }

    let dataset = demo_fleet(center, vehicles, riders);
    save_fleet(path, &dataset)
        .with_context(|| format!("failed to write dataset to {}", path.display()))?;
    println!(
        "Wrote {} vehicles and {} riders to {}",
        dataset.vehicles.len(),
        dataset.riders.len(),
        path.display()
    );
    Ok(())
}

fn load(path: &Path) -> Result<Fleet> {
    Fleet::load(path).with_context(|| format!("failed to load dataset from {}", path.display()))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
