use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rs_gas_collapse::particles::{DiskCloud, Particle};
use rs_gas_collapse::scheduler::{subdivide_tree, GravEqProcessor};
use rs_gas_collapse::sph::{barnes_hut_force, brute_force_gravity, density_at};
use rs_gas_collapse::tree::{QuadTree, ROOT};
use rs_gas_collapse::utils::{init_logging, SchedulerConfig, SphConstants};

fn cloud(amount: usize) -> Vec<Particle> {
    let mut rng = StdRng::seed_from_u64(42);
    DiskCloud::default().with_amount(amount).sample(&mut rng)
}

pub fn bench_tree(c: &mut Criterion) {
    init_logging("warn");
    let mut group = c.benchmark_group("quad_tree");
    group.measurement_time(std::time::Duration::from_secs(5));
    group.sample_size(50);

    let particles = cloud(2000);
    let tree = QuadTree::from_particles(100.0, &particles);
    let leaves = tree.leaves_below(ROOT);

    group.bench_function("build", |b| b.iter(|| QuadTree::from_particles(100.0, black_box(&particles))));

    group.bench_function("subdivide", |b| b.iter(|| subdivide_tree(black_box(&tree), 8, 5)));

    group.bench_function("radius_query", |b| {
        let mut scratch = Vec::new();
        b.iter(|| {
            let mut sum = 0.0;
            for &leaf in &leaves {
                sum += density_at(&tree, leaf, &mut scratch, None);
            }
            sum
        })
    });

    group.finish();
}

pub fn bench_gravity(c: &mut Criterion) {
    let mut group = c.benchmark_group("gravity");
    group.sample_size(30);

    let particles = cloud(1000);
    let tree = QuadTree::from_particles(100.0, &particles);
    let constants = SphConstants::default();

    group.bench_function("barnes_hut", |b| b.iter(|| {
        particles
            .iter()
            .map(|p| barnes_hut_force(&tree, ROOT, p, constants.error_edge_squared, constants.gravitational_constant))
            .fold(0.0, |acc, force| acc + force.norm())
    }));

    group.bench_function("brute_force", |b| b.iter(|| {
        particles
            .iter()
            .map(|p| brute_force_gravity(p, &particles, constants.gravitational_constant))
            .fold(0.0, |acc, force| acc + force.norm())
    }));

    group.finish();
}

pub fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("processor");
    group.sample_size(20);

    let config = SchedulerConfig::default().with_threads(4);
    let processor = GravEqProcessor::with_config(&cloud(1000), 100.0, SphConstants::default(), config)
        .expect("Failed to create processor");
    group.bench_function("step", |b| b.iter(|| processor.step()));

    group.finish();
}

criterion_group!(benches, bench_tree, bench_gravity, bench_step);
criterion_main!(benches);
