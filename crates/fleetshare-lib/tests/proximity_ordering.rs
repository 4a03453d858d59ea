mod common;

use common::{fleet_with, origin, vehicle_at};
use fleetshare_lib::{Error, ErrorKind, GeoLocation};

#[test]
fn returns_vehicles_inside_radius_nearest_first() {
    let fleet = fleet_with(vec![
        vehicle_at("v-200", 200.0),
        vehicle_at("v-10", 10.0),
        vehicle_at("v-50", 50.0),
    ]);

    let nearby = fleet.query_nearby(origin(), 100.0).unwrap();
    let ids: Vec<&str> = nearby.iter().map(|n| n.vehicle.id.as_str()).collect();
    assert_eq!(ids, vec!["v-10", "v-50"]);
    assert!((nearby[0].distance_meters - 10.0).abs() < 1e-3);
    assert!((nearby[1].distance_meters - 50.0).abs() < 1e-3);
}

#[test]
fn reserved_vehicles_never_appear() {
    let fleet = fleet_with(vec![vehicle_at("v-10", 10.0), vehicle_at("v-50", 50.0)]);
    fleet.begin_trip("rider-1", "v-10").unwrap();

    let nearby = fleet.query_nearby(origin(), 100.0).unwrap();
    assert!(nearby.iter().all(|n| n.vehicle.id != "v-10"));
    assert!(nearby.iter().all(|n| n.vehicle.is_available));
}

#[test]
fn equal_distances_are_ordered_by_id() {
    let spot = origin().offset_east(30.0);
    let fleet = fleet_with(
        ["v-c", "v-a", "v-b"]
            .into_iter()
            .map(|id| fleetshare_lib::Vehicle::available(id, id, spot))
            .collect(),
    );

    let ids: Vec<String> = fleet
        .query_nearby(origin(), 100.0)
        .unwrap()
        .into_iter()
        .map(|n| n.vehicle.id)
        .collect();
    assert_eq!(ids, vec!["v-a", "v-b", "v-c"]);
}

#[test]
fn no_matches_is_empty_not_error() {
    let fleet = fleet_with(vec![vehicle_at("v-1", 5_000.0)]);
    assert!(fleet.query_nearby(origin(), 100.0).unwrap().is_empty());
}

#[test]
fn zero_radius_is_invalid() {
    let fleet = fleet_with(vec![vehicle_at("v-1", 0.0)]);
    assert!(matches!(
        fleet.query_nearby(origin(), 0.0),
        Err(Error::InvalidArgument { field: "radius", .. })
    ));
}

#[test]
fn out_of_range_coordinates_are_invalid() {
    let fleet = fleet_with(vec![vehicle_at("v-1", 0.0)]);
    for point in [
        GeoLocation::new(90.5, 0.0),
        GeoLocation::new(0.0, -180.5),
        GeoLocation::new(f64::NAN, 0.0),
    ] {
        assert_eq!(
            fleet.query_nearby(point, 100.0).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
    }
}

#[test]
fn query_across_antimeridian() {
    let west = GeoLocation::new(0.0, 179.9999);
    let fleet = fleet_with(vec![fleetshare_lib::Vehicle::available(
        "v-east",
        "east",
        west.offset_east(50.0),
    )]);

    let nearby = fleet.query_nearby(west, 100.0).unwrap();
    assert_eq!(nearby.len(), 1);
    assert!(nearby[0].vehicle.location.longitude < 0.0);
}
