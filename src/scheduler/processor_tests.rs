use std::thread;
use std::time::{Duration, Instant};

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::assert_float_eq;
use crate::models::Point2;
use crate::particles::{DiskCloud, Particle};
use crate::scheduler::{iterate_subtree, GravEqProcessor, PassFlags};
use crate::sph::NeighborScratch;
use crate::tree::{DrawChannel, QuadTree, ROOT};
use crate::utils::{SchedulerConfig, SchedulingMode, SimulationError, SphConstants};

const TIMEOUT: Duration = Duration::from_secs(10);

fn body(x: f64, y: f64, mass: f64) -> Particle {
    Particle::new(Point2::xy(x, y), Point2::zero(), mass, 0.1, 0.0).expect("Failed to create particle")
}

fn pair_processor() -> GravEqProcessor {
    let config = SchedulerConfig::default().with_threads(1);
    GravEqProcessor::with_config(
        &[body(-1.0, 0.0, 1000.0), body(1.0, 0.0, 1000.0)],
        100.0,
        SphConstants::default(),
        config,
    )
    .expect("Failed to create processor")
}

fn cloud(amount: usize, seed: u64) -> Vec<Particle> {
    let mut rng = StdRng::seed_from_u64(seed);
    DiskCloud::default().with_amount(amount).sample(&mut rng)
}

fn threaded_processor(mode: SchedulingMode) -> GravEqProcessor {
    let config = SchedulerConfig::default()
        .with_threads(2)
        .with_mode(mode)
        .with_intervals(Duration::from_millis(1), Duration::from_millis(1));
    GravEqProcessor::with_config(&cloud(60, 5), 100.0, SphConstants::default(), config)
        .expect("Failed to create processor")
}

fn wait_for_cycles(processor: &GravEqProcessor, cycles: u64) -> bool {
    let started = Instant::now();
    while started.elapsed() < TIMEOUT {
        if processor.stats().cycles >= cycles {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    false
}

fn sorted_by_x(mut particles: Vec<Particle>) -> Vec<Particle> {
    particles.sort_by(|a, b| a.position.x().total_cmp(&b.position.x()));
    particles
}

#[test]
fn test_rejects_invalid_setup() {
    let particles = [body(0.0, 0.0, 1.0)];
    assert_eq!(GravEqProcessor::new(&particles, 0.0).unwrap_err(), SimulationError::InvalidDomainSize);
    assert_eq!(GravEqProcessor::new(&particles, f64::NAN).unwrap_err(), SimulationError::InvalidDomainSize);

    let config = SchedulerConfig::default().with_threads(0);
    let result = GravEqProcessor::with_config(&particles, 100.0, SphConstants::default(), config);
    assert_eq!(result.unwrap_err(), SimulationError::InvalidThreadCount);

    let constants = SphConstants::new(None, None, Some(-1.0));
    let result = GravEqProcessor::with_config(&particles, 100.0, constants, SchedulerConfig::default());
    assert_eq!(result.unwrap_err(), SimulationError::InvalidTimeStep);
}

#[test]
fn test_outside_particles_are_dropped() {
    let processor = GravEqProcessor::new(&[body(0.0, 0.0, 1.0), body(80.0, 0.0, 1.0)], 100.0)
        .expect("Failed to create processor");
    let stats = processor.stats();
    assert_eq!(stats.particles, 1);
    assert_eq!(stats.dropped_particles, 1);
}

#[test]
fn test_two_bodies_attract() {
    let processor = pair_processor();
    let mut gap = 2.0;
    for step in 0..20 {
        assert!(processor.step().expect("Step failed"));

        let particles = sorted_by_x(processor.particles());
        assert_eq!(particles.len(), 2);
        let (left, right) = (&particles[0], &particles[1]);
        let next_gap = right.position.x() - left.position.x();
        assert!(next_gap < gap, "gap grew from {} to {} at step {}", gap, next_gap, step);
        assert!(next_gap > 0.0);
        gap = next_gap;

        assert_relative_eq!(left.position.x(), -right.position.x(), epsilon = 1e-9);
        assert_eq!(left.interactions_count, right.interactions_count);
        for p in &particles {
            assert_relative_eq!(p.position.y(), 0.0, epsilon = 1e-12);
        }
    }
    assert_eq!(processor.stats().cycles, 20);
}

#[test]
fn test_lone_particle_stays_put() {
    let processor = GravEqProcessor::new(&[body(0.0, 0.0, 1.0)], 100.0).expect("Failed to create processor");
    for _ in 0..3 {
        processor.step().expect("Step failed");
    }
    let particles = processor.particles();
    assert_eq!(particles.len(), 1);
    assert_relative_eq!(particles[0].position.norm(), 0.0, epsilon = 1e-12);
    assert_relative_eq!(particles[0].velocity.norm(), 0.0, epsilon = 1e-12);
}

#[test]
fn test_step_keeps_mass() {
    let particles = cloud(200, 17);
    let initial: f64 = particles.iter().map(|p| p.mass).sum();
    let config = SchedulerConfig::default().with_threads(3);
    let processor = GravEqProcessor::with_config(&particles, 100.0, SphConstants::default(), config)
        .expect("Failed to create processor");

    processor.step().expect("Step failed");
    let stats = processor.stats();
    if stats.dropped_particles == 0 {
        assert_relative_eq!(stats.total_mass, initial, max_relative = 1e-9);
    }
    assert!(stats.total_mass <= initial * (1.0 + 1e-9));
}

#[test]
fn test_step_is_skipped_while_paused() {
    let processor = pair_processor();
    assert!(processor.toggle_pause());
    assert_eq!(processor.step(), Ok(false));
    assert_eq!(processor.stats().cycles, 0);

    assert!(!processor.toggle_pause());
    assert_eq!(processor.step(), Ok(true));
}

#[test]
fn test_flickering_marks_particles() {
    let processor = pair_processor();
    processor.step().expect("Step failed");
    assert!(processor.particles().iter().all(|p| p.visited));

    processor.set_flickering(false);
    processor.step().expect("Step failed");
    assert!(processor.particles().iter().all(|p| !p.visited));
}

#[test]
fn test_halt_velocity() {
    let processor = pair_processor();
    processor.set_halt_velocity(true);
    processor.step().expect("Step failed");
    assert!(processor.particles().iter().all(|p| p.velocity == Point2::zero()));
}

#[test]
fn test_runtime_parameters() {
    let processor = pair_processor();
    assert_eq!(processor.set_time_step(0.0), Err(SimulationError::InvalidTimeStep));
    assert_eq!(processor.set_time_step(f64::INFINITY), Err(SimulationError::InvalidTimeStep));
    assert_eq!(processor.set_heat_capacity(-1.0), Err(SimulationError::InvalidCoefficient));
    assert_eq!(processor.set_polytropic_coef(f64::NAN), Err(SimulationError::InvalidCoefficient));

    processor.set_time_step(0.01).expect("Failed to set time step");
    processor.set_heat_capacity(2.0).expect("Failed to set heat capacity");
    processor.set_polytropic_coef(1.4).expect("Failed to set polytropic coefficient");
    let constants = processor.constants();
    assert_float_eq(constants.time_step, 0.01, 1e-15, Some("time step"));
    assert_float_eq(constants.heat_capacity, 2.0, 1e-15, Some("heat capacity"));
    assert_float_eq(constants.polytropic_coef, 1.4, 1e-15, None);
    assert_eq!(processor.time_step(), 0.01);
    assert_eq!(constants.gravitational_constant, SphConstants::default().gravitational_constant);
}

#[test]
fn test_render_snapshot_follows_controls() {
    let processor = pair_processor();
    let controls = processor.render_controls();
    controls.set_channel(DrawChannel::Energy);
    controls.set_brightness(3.0);
    controls.set_edge_drawer(true);

    let params = controls.params(Point2::zero(), 400.0, 2.0);
    assert_eq!(params.channel, DrawChannel::Energy);
    assert_eq!(params.brightness, 3.0);
    assert!(params.edge_drawer);
    assert!(!params.point_drawer);

    let samples = processor.render_snapshot(Point2::zero(), 400.0, 2.0);
    assert!(!samples.is_empty());

    controls.set_draw_level(0);
    let samples = processor.render_snapshot(Point2::zero(), 400.0, 2.0);
    assert_eq!(samples.len(), 1);
}

#[test]
fn test_threads_run_cycles() {
    let mut processor = threaded_processor(SchedulingMode::Signaled);
    let initial = processor.stats().total_mass;
    processor.start_threads().expect("Failed to start threads");
    assert!(processor.is_running());
    assert!(wait_for_cycles(&processor, 3));
    processor.stop();

    assert!(!processor.is_running());
    let stats = processor.stats();
    assert!(stats.cycles >= 3);
    assert!(stats.total_mass <= initial * (1.0 + 1e-9));
}

#[test]
fn test_polling_threads_run_cycles() {
    let mut processor = threaded_processor(SchedulingMode::Polling);
    processor.start_threads().expect("Failed to start threads");
    assert!(wait_for_cycles(&processor, 3));
    processor.stop();
}

#[test]
fn test_start_is_idempotent_and_blocks_step() {
    let mut processor = threaded_processor(SchedulingMode::Signaled);
    processor.start_threads().expect("Failed to start threads");
    processor.start_threads().expect("Second start failed");
    assert_eq!(processor.step(), Err(SimulationError::ThreadsRunning));
    processor.stop();

    let cycles = processor.stats().cycles;
    assert_eq!(processor.step(), Ok(true));
    assert_eq!(processor.stats().cycles, cycles + 1);
}

#[test]
fn test_pause_halts_threads() {
    let mut processor = threaded_processor(SchedulingMode::Signaled);
    processor.start_threads().expect("Failed to start threads");
    assert!(wait_for_cycles(&processor, 1));

    processor.set_paused(true);
    thread::sleep(Duration::from_millis(100));
    let paused_at = processor.stats().cycles;
    thread::sleep(Duration::from_millis(100));
    assert_eq!(processor.stats().cycles, paused_at);

    processor.set_paused(false);
    assert!(wait_for_cycles(&processor, paused_at + 2));
    processor.stop();
}

#[test]
fn test_stop_while_paused() {
    let mut processor = threaded_processor(SchedulingMode::Signaled);
    processor.set_paused(true);
    processor.start_threads().expect("Failed to start threads");
    thread::sleep(Duration::from_millis(20));
    processor.stop();
    assert_eq!(processor.stats().cycles, 0);
}

fn runaway_pair() -> [Particle; 2] {
    let runaway = Particle {
        velocity: Point2::xy(f64::NAN, 0.0),
        ..body(-20.0, 0.0, 10.0)
    };
    [runaway, body(20.0, 0.0, 10.0)]
}

#[test]
fn test_non_finite_particles_are_dropped() {
    let processor = GravEqProcessor::with_config(
        &runaway_pair(),
        100.0,
        SphConstants::default(),
        SchedulerConfig::default().with_threads(1),
    )
    .expect("Failed to create processor");

    assert!(processor.step().expect("Step failed"));
    let stats = processor.stats();
    assert_eq!(stats.cycles, 1);
    assert_eq!(stats.dropped_particles, 1);
    assert_eq!(stats.particles, 1);

    let survivors = processor.particles();
    assert!(survivors[0].is_finite());
    assert_relative_eq!(survivors[0].position.x(), 20.0, epsilon = 1e-3);
}

#[test]
fn test_iterate_subtree_counts_dropped() {
    let tree = QuadTree::from_particles(100.0, &runaway_pair());
    let mut scratch = NeighborScratch::default();
    let flags = PassFlags { flickering: true, halt_velocity: false };

    let batch = iterate_subtree(&tree, ROOT, &mut scratch, &SphConstants::default(), flags);
    assert_eq!(batch.dropped, 1);
    assert_eq!(batch.particles.len(), 1);
    assert!(batch.particles[0].is_finite());
    assert!(batch.particles[0].visited);
}
