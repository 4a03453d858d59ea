//! Output formatting for CLI results.
//!
//! Text output is for people at a terminal; JSON output is one document per
//! command, suitable for piping into other tools.

use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use fleetshare_lib::{NearbyVehicle, Vehicle};

use crate::simulation::SimulationSummary;
use crate::terminal::ColorPalette;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Serialize)]
struct Listing<'a, T> {
    count: usize,
    vehicles: &'a [T],
}

fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

fn write_vehicle_line<W: Write>(
    out: &mut W,
    vehicle: &Vehicle,
    distance: Option<f64>,
    palette: &ColorPalette,
) -> io::Result<()> {
    let status = match &vehicle.holder {
        Some(holder) => format!("{}reserved by {}{}", palette.red, holder, palette.reset),
        None => format!("{}available{}", palette.green, palette.reset),
    };
    write!(
        out,
        "{}{:<14}{} {:<16} {:>10.6}, {:>11.6}  {}",
        palette.white_bold,
        vehicle.id,
        palette.reset,
        vehicle.name,
        vehicle.location.latitude,
        vehicle.location.longitude,
        status
    )?;
    if let Some(distance) = distance {
        write!(out, "  {}{:.1} m{}", palette.gray, distance, palette.reset)?;
    }
    writeln!(out)
}

/// Render proximity results, nearest first.
pub fn render_nearby<W: Write>(
    out: &mut W,
    nearby: &[NearbyVehicle],
    format: OutputFormat,
    palette: &ColorPalette,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => write_json(
            out,
            &Listing {
                count: nearby.len(),
                vehicles: nearby,
            },
        ),
        OutputFormat::Text => {
            if nearby.is_empty() {
                return writeln!(out, "No available vehicles in range.");
            }
            writeln!(out, "{} vehicle(s) in range:", nearby.len())?;
            for entry in nearby {
                write_vehicle_line(out, &entry.vehicle, Some(entry.distance_meters), palette)?;
            }
            Ok(())
        }
    }
}

/// Render the full fleet listing.
pub fn render_vehicles<W: Write>(
    out: &mut W,
    vehicles: &[Vehicle],
    format: OutputFormat,
    palette: &ColorPalette,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => write_json(
            out,
            &Listing {
                count: vehicles.len(),
                vehicles,
            },
        ),
        OutputFormat::Text => {
            let available = vehicles.iter().filter(|v| v.is_available).count();
            writeln!(
                out,
                "{} vehicle(s), {} available:",
                vehicles.len(),
                available
            )?;
            for vehicle in vehicles {
                write_vehicle_line(out, vehicle, None, palette)?;
            }
            Ok(())
        }
    }
}

pub fn render_summary<W: Write>(
    out: &mut W,
    summary: &SimulationSummary,
    format: OutputFormat,
    palette: &ColorPalette,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => write_json(out, summary),
        OutputFormat::Text => {
            writeln!(out, "Simulation summary")?;
            writeln!(out, "  riders:                {}", summary.riders)?;
            writeln!(
                out,
                "  trips completed:       {}{}{}",
                palette.green, summary.trips_completed, palette.reset
            )?;
            writeln!(
                out,
                "  reservation conflicts: {}{}{}",
                palette.red, summary.reservation_conflicts, palette.reset
            )?;
            writeln!(out, "  no vehicle in range:   {}", summary.no_vehicle_found)?;
            writeln!(out, "  events logged:         {}", summary.events_logged)
        }
    }
}
