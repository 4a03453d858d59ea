//! Fleet dataset loading and saving.
//!
//! Two on-disk formats are understood, chosen by file extension:
//!
//! - `.json`: `{ "vehicles": [...], "riders": [...] }`
//! - anything else: a SQLite database with a `vehicles` table and an optional
//!   `riders` table.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::geo::GeoLocation;
use crate::vehicle::{Rider, Vehicle};

const VEHICLE_COLUMNS: &[&str] = &[
    "id",
    "name",
    "latitude",
    "longitude",
    "holder",
    "is_available",
];

/// Vehicles and riders read from, or written to, a fleet dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FleetDataset {
    pub vehicles: Vec<Vehicle>,
    #[serde(default)]
    pub riders: Vec<Rider>,
}

impl FleetDataset {
    /// Check every vehicle record and reject duplicate ids.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for vehicle in &self.vehicles {
            vehicle.validate()?;
            if !seen.insert(vehicle.id.as_str()) {
                return Err(Error::DuplicateVehicle {
                    vehicle_id: vehicle.id.clone(),
                });
            }
        }
        Ok(())
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Load a fleet dataset from `path`.
///
/// Fails with [`Error::DatasetNotFound`] if the file is missing,
/// [`Error::UnsupportedSchema`] if a SQLite file lacks the vehicles table, and
/// [`Error::InvalidArgument`]/[`Error::DuplicateVehicle`] for bad records.
pub fn load_fleet(path: &Path) -> Result<FleetDataset> {
    if !path.exists() {
        return Err(Error::DatasetNotFound {
            path: path.to_path_buf(),
        });
    }

    let dataset = if is_json(path) {
        let raw = fs::read_to_string(path)?;
        serde_json::from_str::<FleetDataset>(&raw)?
    } else {
        load_sqlite(path)?
    };
    dataset.validate()?;

    info!(
        path = %path.display(),
        vehicles = dataset.vehicles.len(),
        riders = dataset.riders.len(),
        "loaded fleet dataset"
    );
    Ok(dataset)
}

/// Write a fleet dataset to `path`, replacing any previous contents.
pub fn save_fleet(path: &Path, dataset: &FleetDataset) -> Result<()> {
    dataset.validate()?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    if is_json(path) {
        fs::write(path, serde_json::to_vec_pretty(dataset)?)?;
    } else {
        save_sqlite(path, dataset)?;
    }

    debug!(
        path = %path.display(),
        vehicles = dataset.vehicles.len(),
        "saved fleet dataset"
    );
    Ok(())
}

fn load_sqlite(path: &Path) -> Result<FleetDataset> {
    let connection = Connection::open(path)?;
    if !table_exists(&connection, "vehicles")?
        || !table_has_columns(&connection, "vehicles", VEHICLE_COLUMNS)?
    {
        return Err(Error::UnsupportedSchema {
            path: path.to_path_buf(),
        });
    }

    let mut stmt = connection.prepare(
        "SELECT id, name, latitude, longitude, holder, is_available FROM vehicles ORDER BY id",
    )?;
    let vehicles = stmt
        .query_map([], row_to_vehicle)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let riders = if table_exists(&connection, "riders")? {
        let mut stmt = connection.prepare("SELECT id, name FROM riders ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Rider {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>()?
    } else {
        Vec::new()
    };

    Ok(FleetDataset { vehicles, riders })
}

fn row_to_vehicle(row: &Row<'_>) -> rusqlite::Result<Vehicle> {
    let is_available: i64 = row.get(5)?;
    Ok(Vehicle {
        id: row.get(0)?,
        name: row.get(1)?,
        location: GeoLocation::new(row.get(2)?, row.get(3)?),
        holder: row.get(4)?,
        is_available: is_available != 0,
    })
}

fn save_sqlite(path: &Path, dataset: &FleetDataset) -> Result<()> {
    let mut connection = Connection::open(path)?;
    let tx = connection.transaction()?;
    tx.execute_batch(
        "DROP TABLE IF EXISTS vehicles;
         DROP TABLE IF EXISTS riders;
         CREATE TABLE vehicles (
             id TEXT PRIMARY KEY,
             name TEXT NOT NULL,
             latitude REAL NOT NULL,
             longitude REAL NOT NULL,
             holder TEXT NULL,
             is_available INTEGER NOT NULL
         );
         CREATE TABLE riders (
             id TEXT PRIMARY KEY,
             name TEXT NOT NULL
         );",
    )?;
    {
        let mut insert = tx.prepare(
            "INSERT INTO vehicles (id, name, latitude, longitude, holder, is_available)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for vehicle in &dataset.vehicles {
            insert.execute(params![
                vehicle.id,
                vehicle.name,
                vehicle.location.latitude,
                vehicle.location.longitude,
                vehicle.holder,
                vehicle.is_available as i64,
            ])?;
        }

        let mut insert = tx.prepare("INSERT INTO riders (id, name) VALUES (?1, ?2)")?;
        for rider in &dataset.riders {
            insert.execute(params![rider.id, rider.name])?;
        }
    }
    tx.commit()?;
    Ok(())
}

fn table_exists(connection: &Connection, table: &str) -> Result<bool> {
    let mut stmt = connection
        .prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1 LIMIT 1")?;
    let mut rows = stmt.query([table])?;
    let exists = rows.next()?.is_some();
    Ok(exists)
}

fn table_has_columns(connection: &Connection, table: &str, required: &[&str]) -> Result<bool> {
    let pragma = format!("PRAGMA table_info('{table}')");
    let mut stmt = connection.prepare(&pragma)?;
    let mut rows = stmt.query([])?;

    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        columns.push(name);
    }

    Ok(required.iter().all(|required| {
        columns
            .iter()
            .any(|column| column.eq_ignore_ascii_case(required))
    }))
}

/// Deterministic demo fleet laid out on a sunflower spiral around `center`.
///
/// Vehicles are roughly 40 m apart; all start available.
pub fn demo_fleet(center: GeoLocation, vehicles: usize, riders: usize) -> FleetDataset {
    const SPACING_METERS: f64 = 40.0;
    let golden_angle = std::f64::consts::PI * (3.0 - 5.0_f64.sqrt());

    let vehicles = (0..vehicles)
        .map(|i| {
            let radius = SPACING_METERS * ((i + 1) as f64).sqrt();
            let theta = golden_angle * i as f64;
            let location = center
                .offset_north(radius * theta.cos())
                .offset_east(radius * theta.sin());
            Vehicle::available(
                format!("scooter-{:03}", i + 1),
                format!("Scooter {}", i + 1),
                location,
            )
        })
        .collect();

    let riders = (0..riders)
        .map(|i| Rider {
            id: format!("rider-{:03}", i + 1),
            name: format!("Rider {}", i + 1),
        })
        .collect();

    FleetDataset { vehicles, riders }
}
