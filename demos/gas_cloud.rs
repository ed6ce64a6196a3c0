// demos/gas_cloud.rs

use std::thread;
use std::time::Duration;

use log::info;
use rs_gas_collapse::models::Point2;
use rs_gas_collapse::particles::DiskCloud;
use rs_gas_collapse::scheduler::GravEqProcessor;
use rs_gas_collapse::utils::{init_logging, SchedulerConfig, SimulationError, SphConstants, DEFAULT_DOMAIN_SIZE};

fn main() -> Result<(), SimulationError> {
    init_logging("info");

    let particles = DiskCloud::default()
        .with_amount(2000)
        .with_domain_size(DEFAULT_DOMAIN_SIZE)
        .sample_random();
    info!("Sampled {} particles", particles.len());

    let mut processor = GravEqProcessor::with_config(
        &particles,
        DEFAULT_DOMAIN_SIZE,
        SphConstants::default(),
        SchedulerConfig::default(),
    )?;
    processor.set_reporting(true);
    processor.start_threads()?;

    for second in 1..=5 {
        thread::sleep(Duration::from_secs(1));
        let stats = processor.stats();
        let samples = processor.render_snapshot(Point2::zero(), 400.0, 2.0);
        println!(
            "t={}s cycles={} particles={} mass={:.1} dropped={} drawn={}",
            second,
            stats.cycles,
            stats.particles,
            stats.total_mass,
            stats.dropped_particles,
            samples.len()
        );
    }

    processor.toggle_pause();
    thread::sleep(Duration::from_millis(500));
    println!("Paused at cycle {}", processor.stats().cycles);
    processor.toggle_pause();

    processor.stop();
    println!("Finished after {} cycles", processor.stats().cycles);
    Ok(())
}
