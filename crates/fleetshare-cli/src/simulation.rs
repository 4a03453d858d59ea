//! In-process load simulation: riders competing for the same fleet.
//!
//! Every rider runs on its own thread against a shared [`Fleet`]. A trip is
//! a nearby query, a begin on the closest free vehicle, a series of location
//! updates while riding north, and an end at the final position. Telemetry
//! is appended for each step so the log can be reconstructed afterwards.

use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use fleetshare_lib::{ErrorKind, Fleet, GeoLocation, NewTripEvent, Rider, TripEventKind, Vehicle};

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Where riders start; rider `n` starts `n * 25` meters east of it.
    pub origin: GeoLocation,
    pub trips_per_rider: usize,
    /// Location updates per trip.
    pub steps_per_trip: usize,
    pub step_meters: f64,
    pub search_radius: f64,
    /// Pause between a rider's trips.
    pub rest: Duration,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            origin: GeoLocation::new(0.0, 0.0),
            trips_per_rider: 3,
            steps_per_trip: 5,
            step_meters: 10.0,
            search_radius: 500.0,
            rest: Duration::ZERO,
        }
    }
}

/// Totals across all riders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SimulationSummary {
    pub riders: usize,
    pub trips_completed: usize,
    /// Begin attempts lost to another rider.
    pub reservation_conflicts: usize,
    /// Trip attempts that found no free vehicle in range.
    pub no_vehicle_found: usize,
    pub events_logged: usize,
}

impl SimulationSummary {
    fn absorb(&mut self, other: SimulationSummary) {
        self.riders += other.riders;
        self.trips_completed += other.trips_completed;
        self.reservation_conflicts += other.reservation_conflicts;
        self.no_vehicle_found += other.no_vehicle_found;
        self.events_logged += other.events_logged;
    }
}

/// Run one thread per rider until each has attempted its trips.
pub fn run_simulation(
    fleet: &Fleet,
    riders: &[Rider],
    config: &SimulationConfig,
) -> Result<SimulationSummary> {
    if riders.is_empty() {
        return Err(anyhow!("simulation needs at least one rider"));
    }

    info!(
        riders = riders.len(),
        trips_per_rider = config.trips_per_rider,
        "starting simulation"
    );

    let results: Vec<Result<SimulationSummary>> = thread::scope(|scope| {
        let handles: Vec<_> = riders
            .iter()
            .enumerate()
            .map(|(n, rider)| {
                let start = config.origin.offset_east(25.0 * n as f64);
                scope.spawn(move || ride(fleet, rider, start, config))
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .map_err(|_| anyhow!("rider thread panicked"))?
            })
            .collect()
    });

    let mut summary = SimulationSummary::default();
    for result in results {
        summary.absorb(result?);
    }

    info!(
        trips = summary.trips_completed,
        conflicts = summary.reservation_conflicts,
        events = summary.events_logged,
        "simulation finished"
    );
    Ok(summary)
}

fn ride(
    fleet: &Fleet,
    rider: &Rider,
    start: GeoLocation,
    config: &SimulationConfig,
) -> Result<SimulationSummary> {
    let mut stats = SimulationSummary {
        riders: 1,
        ..SimulationSummary::default()
    };
    let mut position = start;

    for _ in 0..config.trips_per_rider {
        match claim_nearest(fleet, rider, position, config.search_radius, &mut stats)? {
            Some(vehicle) => {
                position = trip(fleet, rider, &vehicle, config, &mut stats)?;
                stats.trips_completed += 1;
            }
            None => {
                debug!(rider = %rider.id, "no free vehicle in range");
                stats.no_vehicle_found += 1;
            }
        }

        if !config.rest.is_zero() {
            thread::sleep(config.rest);
        }
    }

    Ok(stats)
}

/// Begin a trip on the closest vehicle, moving down the candidate list when
/// another rider wins the race.
fn claim_nearest(
    fleet: &Fleet,
    rider: &Rider,
    position: GeoLocation,
    radius: f64,
    stats: &mut SimulationSummary,
) -> Result<Option<Vehicle>> {
    let candidates = fleet
        .query_nearby(position, radius)
        .context("nearby query failed")?;

    for candidate in candidates {
        match fleet.begin_trip(&rider.id, &candidate.vehicle.id) {
            Ok(vehicle) => return Ok(Some(vehicle)),
            Err(e) if e.kind() == ErrorKind::OperationNotAllowed => {
                debug!(rider = %rider.id, vehicle = %candidate.vehicle.id, "lost reservation race");
                stats.reservation_conflicts += 1;
            }
            Err(e) => return Err(e).context("begin trip failed"),
        }
    }

    Ok(None)
}

/// Ride north from the vehicle's position and end the trip there. Returns
/// the drop-off location.
///
/// A failure while the vehicle is held releases it before the error is
/// returned, so an aborted run leaves no reservation behind.
fn trip(
    fleet: &Fleet,
    rider: &Rider,
    vehicle: &Vehicle,
    config: &SimulationConfig,
    stats: &mut SimulationSummary,
) -> Result<GeoLocation> {
    let position = match ride_north(fleet, rider, vehicle, config, stats) {
        Ok(position) => position,
        Err(e) => {
            if let Err(release) = fleet.end_trip(&rider.id, &vehicle.id) {
                warn!(
                    rider = %rider.id,
                    vehicle = %vehicle.id,
                    error = %release,
                    "could not release vehicle after failed trip"
                );
            }
            return Err(e);
        }
    };

    fleet
        .end_trip_at(&rider.id, &vehicle.id, position)
        .context("end trip failed")?;
    log_event(fleet, rider, vehicle, TripEventKind::TripStop, position, stats)?;

    debug!(rider = %rider.id, vehicle = %vehicle.id, "trip completed");
    Ok(position)
}

fn ride_north(
    fleet: &Fleet,
    rider: &Rider,
    vehicle: &Vehicle,
    config: &SimulationConfig,
    stats: &mut SimulationSummary,
) -> Result<GeoLocation> {
    let mut position = vehicle.location;
    log_event(fleet, rider, vehicle, TripEventKind::TripStart, position, stats)?;

    for _ in 0..config.steps_per_trip {
        position = position.offset_north(config.step_meters);
        log_event(
            fleet,
            rider,
            vehicle,
            TripEventKind::TripLocationUpdate,
            position,
            stats,
        )?;
    }
    Ok(position)
}

fn log_event(
    fleet: &Fleet,
    rider: &Rider,
    vehicle: &Vehicle,
    kind: TripEventKind,
    location: GeoLocation,
    stats: &mut SimulationSummary,
) -> Result<()> {
    fleet
        .append_event(NewTripEvent::new(&rider.id, &vehicle.id, location, kind))
        .context("telemetry append failed")?;
    stats.events_logged += 1;
    Ok(())
}
