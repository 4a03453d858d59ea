use criterion::{criterion_group, criterion_main, Criterion};
use fleetshare_lib::{demo_fleet, Fleet, GeoLocation, ProximityIndex};
use once_cell::sync::Lazy;
use std::hint::black_box;

const CENTER: GeoLocation = GeoLocation {
    latitude: 52.5466,
    longitude: 13.3512,
};

static FLEET: Lazy<Fleet> =
    Lazy::new(|| Fleet::from_dataset(demo_fleet(CENTER, 5_000, 0)).expect("demo fleet builds"));

static INDEX: Lazy<ProximityIndex> = Lazy::new(|| {
    ProximityIndex::build(
        demo_fleet(CENTER, 5_000, 0)
            .vehicles
            .into_iter()
            .map(|v| (v.id, v.location)),
    )
});

fn benchmark_proximity(c: &mut Criterion) {
    c.bench_function("index_within_250m", |b| {
        let index = &*INDEX;
        b.iter(|| black_box(index.within_radius(&CENTER, 250.0).len()));
    });

    c.bench_function("fleet_query_nearby_250m", |b| {
        let fleet = &*FLEET;
        b.iter(|| {
            let nearby = fleet.query_nearby(CENTER, 250.0).expect("valid query");
            black_box(nearby.len())
        });
    });

    c.bench_function("begin_end_trip", |b| {
        let fleet = &*FLEET;
        b.iter(|| {
            fleet.begin_trip("bench-rider", "scooter-001").expect("free");
            fleet.end_trip("bench-rider", "scooter-001").expect("held")
        });
    });
}

criterion_group!(benches, benchmark_proximity);
criterion_main!(benches);
