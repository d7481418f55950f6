use criterion::{criterion_group, criterion_main, Criterion};
use geo::geometry::Coord;
use hexsite::{Crs, SiteLayout};
use linksim::{Carrier, LinkParams, McsTable, PowerOptimizer, ReceiverSampler, Scenario};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn power_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("Power Search");

    let site = SiteLayout::builder()
        .center(Coord {
            x: -74.835_48,
            y: -8.156_502,
        })
        .input_crs(Crs::Wgs84)
        .radius(10_000.0)
        .build()
        .unwrap();
    let scenario = Scenario::managed_power();
    let params = LinkParams::new(&scenario, &Carrier::default()).unwrap();
    let mcs = McsTable::lte_2x2();
    let optimizer = PowerOptimizer::new(&scenario, &params, &site, &mcs).unwrap();
    let site_area_km2 = site.site_area_km2();

    for active in [1_usize, 25] {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let receivers = ReceiverSampler::default()
            .sample(&site.site_area, active, &mut rng)
            .unwrap();
        #[allow(clippy::cast_precision_loss)]
        let demand_km2 = 2.0 * active as f64 / site_area_km2;
        group.bench_with_input(
            format!("{active} receivers"),
            &receivers,
            |b, receivers| {
                b.iter(|| {
                    optimizer
                        .optimize(receivers, site_area_km2, demand_km2, 42)
                        .unwrap()
                });
            },
        );
    }
}

criterion_group!(benches, power_search);
criterion_main!(benches);
