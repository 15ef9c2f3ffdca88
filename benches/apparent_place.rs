use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use sightline::apparent::ApparentPlaceSolver;
use sightline::earth_orientation::{DeltaT, Iau1980};
use sightline::ephemeris::{
    Body, EarthCentre, MeanElementsEphemeris, MoonCentre, PlanetCentre, PositionProvider,
    SharedEphemeris, TerrestrialObserver,
};
use sightline::kepler::eccentric_anomaly;
use sightline::visibility::Place;

/// Epochs drawn uniformly over 2000-2050
#[inline]
fn rand_epoch(rng: &mut StdRng) -> f64 {
    rng.random_range(2_451_545.0..2_469_807.5)
}

fn target(eph: &SharedEphemeris, body: Body) -> Arc<dyn PositionProvider> {
    match body {
        Body::Moon => Arc::new(MoonCentre::new(eph.clone())),
        other => Arc::new(PlanetCentre::new(eph.clone(), other).unwrap()),
    }
}

fn geocentric(eph: &SharedEphemeris, body: Body) -> ApparentPlaceSolver {
    ApparentPlaceSolver::new(
        Arc::new(EarthCentre::new(eph.clone())),
        target(eph, body),
        Arc::new(PlanetCentre::sun(eph.clone())),
    )
    .with_earth_orientation(Arc::new(Iau1980::new(DeltaT::LeapSeconds)))
}

fn bench_geocentric_bodies(c: &mut Criterion) {
    let eph: SharedEphemeris = Arc::new(MeanElementsEphemeris::new());
    let samples = 1_000usize;

    for (name, body) in [
        ("sun", Body::Sun),
        ("moon", Body::Moon),
        ("mars", Body::Mars),
        ("neptune", Body::Neptune),
    ] {
        let solver = geocentric(&eph, body);
        let mut rng = StdRng::seed_from_u64(0x5EED_0001);

        c.bench_function(&format!("apparent_place/geocentric_{name}"), |b| {
            b.iter_batched(
                || (0..samples).map(|_| rand_epoch(&mut rng)).collect::<Vec<_>>(),
                |epochs| {
                    for jd in epochs {
                        black_box(solver.solve(black_box(jd)).unwrap());
                    }
                },
                BatchSize::LargeInput,
            )
        });
    }
}

fn bench_topocentric_moon(c: &mut Criterion) {
    let eph: SharedEphemeris = Arc::new(MeanElementsEphemeris::new());
    let orientation = Arc::new(Iau1980::new(DeltaT::LeapSeconds));
    let place = Place::new(43.9317, 5.7122, 650.0, 1.0).unwrap();
    let observer =
        TerrestrialObserver::new(EarthCentre::new(eph.clone()), place, orientation.clone());
    let solver = ApparentPlaceSolver::new(
        Arc::new(observer),
        target(&eph, Body::Moon),
        Arc::new(PlanetCentre::sun(eph.clone())),
    )
    .with_earth_orientation(orientation);

    let mut rng = StdRng::seed_from_u64(0x5EED_0002);
    let samples = 1_000usize;

    c.bench_function("apparent_place/topocentric_moon", |b| {
        b.iter_batched(
            || (0..samples).map(|_| rand_epoch(&mut rng)).collect::<Vec<_>>(),
            |epochs| {
                for jd in epochs {
                    black_box(solver.solve(black_box(jd)).unwrap());
                }
            },
            BatchSize::LargeInput,
        )
    });
}

/// Kepler's equation over e ∈ [0, 0.9], the inner loop of every planet position
fn bench_kepler(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0xDEADBEEF);
    let samples = 10_000usize;

    c.bench_function("apparent_place/eccentric_anomaly", |b| {
        b.iter_batched(
            || {
                (0..samples)
                    .map(|_| {
                        let m = rng.random::<f64>() * std::f64::consts::TAU;
                        let e = rng.random_range(0.0..0.9);
                        (m, e)
                    })
                    .collect::<Vec<_>>()
            },
            |cases| {
                for (m, e) in cases {
                    black_box(eccentric_anomaly(black_box(m), black_box(e)).unwrap());
                }
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_geocentric_bodies, bench_topocentric_moon, bench_kepler
);
criterion_main!(benches);
