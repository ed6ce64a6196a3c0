use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::models::Point2;
use crate::particles::Particle;
use crate::scheduler::{subdivide_tree, DoubleBufferedTree, PauseGate, PooledWorker, WorkerHandle, WorkerState};
use crate::sph::{iterate_over_particle, NeighborScratch};
use crate::tree::{DrawChannel, DrawParams, DrawSample, NodeId, QuadTree};
use crate::utils::{AtomicF64, SchedulerConfig, SchedulingMode, SimulationError, SphConstants, EPSILON};

/// Per-pass switches that change what a worker writes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PassFlags {
    /// Value written into `visited` of every produced particle.
    pub flickering: bool,
    /// Zero the velocity of every produced particle.
    pub halt_velocity: bool,
}

/// Output of integrating one subtree.
#[derive(Debug, Clone, Default)]
pub struct SubtreeBatch {
    pub particles: Vec<Particle>,
    /// Particles dropped because their new state was not finite.
    pub dropped: usize,
}

/// Advances every particle stored below `subtree_root` by one step against `tree`.
///
/// Leaves lighter than [`EPSILON`] are skipped. Results that are not finite
/// are logged and dropped.
pub fn iterate_subtree(
    tree: &QuadTree,
    subtree_root: NodeId,
    scratch: &mut NeighborScratch,
    constants: &SphConstants,
    flags: PassFlags,
) -> SubtreeBatch {
    let mut batch = SubtreeBatch::default();
    for leaf in tree.leaves_below(subtree_root) {
        let source = tree.node(leaf).mass_center;
        if source.mass.abs() <= EPSILON {
            continue;
        }
        let mut next = iterate_over_particle(tree, &source, scratch, constants);
        next.visited = flags.flickering;
        if flags.halt_velocity {
            next.velocity = Point2::zero();
        }
        if next.is_finite() {
            batch.particles.push(next);
        } else {
            warn!("Dropping particle that left the finite range (was at {})", source.position);
            batch.dropped += 1;
        }
    }
    batch
}

/// Display settings shared with the renderer; any thread may change them.
#[derive(Debug)]
pub struct RenderControls {
    draw_level: AtomicUsize,
    brightness: AtomicF64,
    channel: AtomicU8,
    point_drawer: AtomicBool,
    edge_drawer: AtomicBool,
    ext_draw: AtomicBool,
    extra_flare: AtomicBool,
}

impl Default for RenderControls {
    fn default() -> Self {
        let defaults = DrawParams::default();
        Self {
            draw_level: AtomicUsize::new(defaults.draw_level),
            brightness: AtomicF64::new(defaults.brightness),
            channel: AtomicU8::new(defaults.channel.index() as u8),
            point_drawer: AtomicBool::new(defaults.point_drawer),
            edge_drawer: AtomicBool::new(defaults.edge_drawer),
            ext_draw: AtomicBool::new(defaults.ext_draw),
            extra_flare: AtomicBool::new(defaults.extra_flare),
        }
    }
}

impl RenderControls {
    pub fn set_draw_level(&self, level: usize) {
        self.draw_level.store(level, Ordering::Relaxed);
    }

    pub fn set_brightness(&self, brightness: f64) {
        self.brightness.store(brightness);
    }

    pub fn set_channel(&self, channel: DrawChannel) {
        self.channel.store(channel.index() as u8, Ordering::Relaxed);
    }

    pub fn set_point_drawer(&self, enabled: bool) {
        self.point_drawer.store(enabled, Ordering::Relaxed);
    }

    pub fn set_edge_drawer(&self, enabled: bool) {
        self.edge_drawer.store(enabled, Ordering::Relaxed);
    }

    pub fn set_ext_draw(&self, enabled: bool) {
        self.ext_draw.store(enabled, Ordering::Relaxed);
    }

    pub fn set_extra_flare(&self, enabled: bool) {
        self.extra_flare.store(enabled, Ordering::Relaxed);
    }

    /// Current settings for a view at `center` with the given screen side length.
    pub fn params(&self, center: Point2, side_size: f64, points_size: f64) -> DrawParams {
        DrawParams {
            draw_level: self.draw_level.load(Ordering::Relaxed),
            center,
            side_size,
            points_size,
            brightness: self.brightness.load(),
            channel: DrawChannel::from_index(self.channel.load(Ordering::Relaxed) as usize).unwrap_or_default(),
            extra_flare: self.extra_flare.load(Ordering::Relaxed),
            edge_drawer: self.edge_drawer.load(Ordering::Relaxed),
            point_drawer: self.point_drawer.load(Ordering::Relaxed),
            ext_draw: self.ext_draw.load(Ordering::Relaxed),
        }
    }
}

/// Counters of a processor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessorStats {
    /// Completed swaps.
    pub cycles: u64,
    /// Particles dropped for leaving the finite range or the domain.
    pub dropped_particles: u64,
    /// Particles in the current tree.
    pub particles: usize,
    pub total_mass: f64,
}

#[derive(Debug)]
struct ProcessorState {
    trees: DoubleBufferedTree,
    constants: SphConstants,
    time_step: AtomicF64,
    heat_capacity: AtomicF64,
    polytropic_coef: AtomicF64,
    flickering: AtomicBool,
    reporting: AtomicBool,
    halt_velocity: AtomicBool,
    render: RenderControls,
    pause: PauseGate,
    stop: AtomicBool,
    cycles: AtomicU64,
    dropped: AtomicU64,
    num_threads: usize,
    catch_level: usize,
}

impl ProcessorState {
    fn constants(&self) -> SphConstants {
        SphConstants {
            time_step: self.time_step.load(),
            heat_capacity: self.heat_capacity.load(),
            polytropic_coef: self.polytropic_coef.load(),
            ..self.constants
        }
    }

    fn flags(&self) -> PassFlags {
        PassFlags {
            flickering: self.flickering.load(Ordering::Relaxed),
            halt_velocity: self.halt_velocity.load(Ordering::Relaxed),
        }
    }

    fn store_batch(&self, batch: SubtreeBatch) {
        let outside = self.trees.push_batch(batch.particles);
        let dropped = batch.dropped + outside;
        if outside > 0 {
            debug!("{} particles left the domain", outside);
        }
        if dropped > 0 {
            self.dropped.fetch_add(dropped as u64, Ordering::Relaxed);
        }
    }

    /// One worker's share of a step: integrates its work list into the buffer.
    fn run_worker_pass(&self, thread: usize) {
        if self.stop.load(Ordering::SeqCst) {
            return;
        }
        self.pause.wait_until_resumed(&self.stop);
        if self.stop.load(Ordering::SeqCst) {
            return;
        }
        let started = Instant::now();
        let constants = self.constants();
        let flags = self.flags();
        let mut scratch = NeighborScratch::default();
        self.trees.read_current(|view| {
            let Some(roots) = view.work_lists.get(thread) else {
                return;
            };
            for &root in roots {
                let batch = iterate_subtree(&view.tree, root, &mut scratch, &constants, flags);
                self.store_batch(batch);
            }
        });
        debug!("Worker {} pass took {:?}", thread, started.elapsed());
    }

    /// Swaps once every worker is idle, then re-arms the workers.
    fn run_observer_pass(&self, workers: &[WorkerHandle]) {
        if self.stop.load(Ordering::SeqCst) {
            return;
        }
        // A disabled worker will not run again, so the cycle cannot complete.
        if workers
            .iter()
            .any(|worker| !worker.is_active() || worker.state() != WorkerState::Idle)
        {
            return;
        }
        self.pause.wait_until_resumed(&self.stop);
        if self.stop.load(Ordering::SeqCst) {
            return;
        }
        self.finish_cycle();
        for worker in workers {
            worker.sign_awaiting();
        }
    }

    fn finish_cycle(&self) {
        let started = Instant::now();
        let (num_threads, catch_level) = (self.num_threads, self.catch_level);
        self.trees.swap(|tree| {
            let work_lists = subdivide_tree(tree, num_threads, catch_level);
            debug!(
                "Partitioned into {:?} subtrees per thread",
                work_lists.iter().map(Vec::len).collect::<Vec<_>>()
            );
            work_lists
        });
        let cycle = self.cycles.fetch_add(1, Ordering::Relaxed) + 1;
        if self.reporting.load(Ordering::Relaxed) {
            let particles = self
                .trees
                .read_current(|view| view.tree.root().particles_count_in_subtrees);
            info!("Cycle {}: {} particles, swap took {:?}", cycle, particles, started.elapsed());
        } else {
            debug!("Cycle {} swapped in {:?}", cycle, started.elapsed());
        }
    }
}

/// Drives a gas cloud forward in time with a pool of worker threads.
///
/// Workers read the current tree and write next-step particles into the
/// buffer tree; an observer thread swaps the two once every worker is idle,
/// repartitions the new tree and re-arms the workers. The processor can also
/// be stepped synchronously with [`GravEqProcessor::step`].
///
/// # Examples
///
/// ```
/// use rs_gas_collapse::models::Point2;
/// use rs_gas_collapse::particles::Particle;
/// use rs_gas_collapse::scheduler::GravEqProcessor;
///
/// let particles = vec![
///     Particle::new(Point2::xy(-1.0, 0.0), Point2::zero(), 1000.0, 0.1, 0.0).unwrap(),
///     Particle::new(Point2::xy(1.0, 0.0), Point2::zero(), 1000.0, 0.1, 0.0).unwrap(),
/// ];
/// let processor = GravEqProcessor::new(&particles, 100.0).unwrap();
/// assert!(processor.step().unwrap());
/// assert_eq!(processor.stats().cycles, 1);
/// assert_eq!(processor.particles().len(), 2);
/// ```
#[derive(Debug)]
pub struct GravEqProcessor {
    shared: Arc<ProcessorState>,
    config: SchedulerConfig,
    workers: Vec<PooledWorker>,
    observer: Option<PooledWorker>,
}

impl GravEqProcessor {
    /// A processor with default constants and scheduler settings.
    pub fn new(particles: &[Particle], size: f64) -> Result<Self, SimulationError> {
        Self::with_config(particles, size, SphConstants::default(), SchedulerConfig::default())
    }

    /// Builds the current tree from `particles`.
    ///
    /// Particles outside the square of side `size` are skipped with a warning
    /// and counted as dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if `size`, `constants` or `config` are invalid.
    pub fn with_config(
        particles: &[Particle],
        size: f64,
        constants: SphConstants,
        config: SchedulerConfig,
    ) -> Result<Self, SimulationError> {
        if !size.is_finite() || size <= 0.0 {
            return Err(SimulationError::InvalidDomainSize);
        }
        constants.validate()?;
        config.validate()?;

        let trees = DoubleBufferedTree::new(size);
        let outside = trees.write_current(|view| {
            let outside = particles.iter().filter(|p| view.tree.push(**p).is_none()).count();
            view.work_lists = subdivide_tree(&view.tree, config.num_threads, config.catch_level);
            outside
        });
        if outside > 0 {
            warn!("{} particles lie outside the {}-wide domain and were skipped", outside, size);
        }

        let shared = ProcessorState {
            trees,
            constants,
            time_step: AtomicF64::new(constants.time_step),
            heat_capacity: AtomicF64::new(constants.heat_capacity),
            polytropic_coef: AtomicF64::new(constants.polytropic_coef),
            flickering: AtomicBool::new(true),
            reporting: AtomicBool::new(false),
            halt_velocity: AtomicBool::new(false),
            render: RenderControls::default(),
            pause: PauseGate::new(),
            stop: AtomicBool::new(false),
            cycles: AtomicU64::new(0),
            dropped: AtomicU64::new(outside as u64),
            num_threads: config.num_threads,
            catch_level: config.catch_level,
        };
        info!(
            "Processor ready: {} particles, {} threads",
            particles.len() - outside,
            config.num_threads
        );
        Ok(Self {
            shared: Arc::new(shared),
            config,
            workers: Vec::new(),
            observer: None,
        })
    }

    pub fn num_threads(&self) -> usize {
        self.config.num_threads
    }

    pub fn is_running(&self) -> bool {
        !self.workers.is_empty()
    }

    /// Starts the workers and the observer. Calling it again while running does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::ThreadSpawn`] if a thread cannot be created;
    /// any threads already started are stopped.
    pub fn start_threads(&mut self) -> Result<(), SimulationError> {
        if self.is_running() {
            return Ok(());
        }
        self.shared.stop.store(false, Ordering::SeqCst);
        if let Err(err) = self.spawn_threads() {
            self.stop();
            return Err(err);
        }
        info!("Started {} workers ({:?} scheduling)", self.workers.len(), self.config.mode);
        Ok(())
    }

    fn spawn_threads(&mut self) -> Result<(), SimulationError> {
        let mode = self.config.mode;
        let observer_default = match mode {
            SchedulingMode::Polling => WorkerState::Waiting,
            SchedulingMode::Signaled => WorkerState::Idle,
        };
        let observer_handle = WorkerHandle::new(observer_default, mode, self.config.observer_interval);
        let notify = match mode {
            SchedulingMode::Signaled => Some(observer_handle.clone()),
            SchedulingMode::Polling => None,
        };

        for thread in 0..self.config.num_threads {
            let handle = WorkerHandle::new(WorkerState::Idle, mode, self.config.worker_interval);
            let state = Arc::clone(&self.shared);
            let worker = PooledWorker::spawn(format!("sph-worker-{}", thread), handle, notify.clone(), move || {
                state.run_worker_pass(thread)
            })?;
            worker.handle().sign_awaiting();
            self.workers.push(worker);
        }

        let handles: Vec<WorkerHandle> = self.workers.iter().map(|w| w.handle().clone()).collect();
        let state = Arc::clone(&self.shared);
        let observer = PooledWorker::spawn("sph-observer", observer_handle, None, move || {
            state.run_observer_pass(&handles)
        })?;
        observer.handle().sign_awaiting();
        self.observer = Some(observer);
        Ok(())
    }

    /// Stops and joins every thread. Partial results of an interrupted step are discarded.
    pub fn stop(&mut self) {
        if self.workers.is_empty() && self.observer.is_none() {
            return;
        }
        self.shared.stop.store(true, Ordering::SeqCst);
        if let Some(mut observer) = self.observer.take() {
            observer.join();
        }
        for mut worker in self.workers.drain(..) {
            worker.join();
        }
        self.shared.trees.write_buffer(|buffer| buffer.clear());
        info!("Stopped after {} cycles", self.shared.cycles.load(Ordering::Relaxed));
    }

    /// Runs one full step on the calling thread, using rayon across the work lists.
    ///
    /// Returns `Ok(false)` without stepping while paused.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::ThreadsRunning`] if the worker threads are active.
    pub fn step(&self) -> Result<bool, SimulationError> {
        if self.is_running() {
            return Err(SimulationError::ThreadsRunning);
        }
        if self.is_paused() {
            debug!("Step skipped while paused");
            return Ok(false);
        }
        let state = &self.shared;
        let constants = state.constants();
        let flags = state.flags();
        state.trees.read_current(|view| {
            view.work_lists.par_iter().for_each(|roots| {
                let mut scratch = NeighborScratch::default();
                for &root in roots {
                    let batch = iterate_subtree(&view.tree, root, &mut scratch, &constants, flags);
                    state.store_batch(batch);
                }
            });
        });
        state.finish_cycle();
        Ok(true)
    }

    pub fn time_step(&self) -> f64 {
        self.shared.time_step.load()
    }

    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidTimeStep`] unless `time_step` is finite and positive.
    pub fn set_time_step(&self, time_step: f64) -> Result<(), SimulationError> {
        if !time_step.is_finite() || time_step <= 0.0 {
            return Err(SimulationError::InvalidTimeStep);
        }
        self.shared.time_step.store(time_step);
        Ok(())
    }

    pub fn heat_capacity(&self) -> f64 {
        self.shared.heat_capacity.load()
    }

    pub fn set_heat_capacity(&self, heat_capacity: f64) -> Result<(), SimulationError> {
        if !heat_capacity.is_finite() || heat_capacity <= 0.0 {
            return Err(SimulationError::InvalidCoefficient);
        }
        self.shared.heat_capacity.store(heat_capacity);
        Ok(())
    }

    pub fn polytropic_coef(&self) -> f64 {
        self.shared.polytropic_coef.load()
    }

    pub fn set_polytropic_coef(&self, polytropic_coef: f64) -> Result<(), SimulationError> {
        if !polytropic_coef.is_finite() || polytropic_coef <= 0.0 {
            return Err(SimulationError::InvalidCoefficient);
        }
        self.shared.polytropic_coef.store(polytropic_coef);
        Ok(())
    }

    /// Constants the next pass will use.
    pub fn constants(&self) -> SphConstants {
        self.shared.constants()
    }

    pub fn is_paused(&self) -> bool {
        self.shared.pause.is_paused()
    }

    pub fn set_paused(&self, paused: bool) {
        self.shared.pause.set_paused(paused);
    }

    /// Flips pause and returns whether the processor is now paused.
    pub fn toggle_pause(&self) -> bool {
        let paused = self.shared.pause.toggle();
        info!("{}", if paused { "Paused" } else { "Resumed" });
        paused
    }

    pub fn flickering(&self) -> bool {
        self.shared.flickering.load(Ordering::Relaxed)
    }

    pub fn set_flickering(&self, flickering: bool) {
        self.shared.flickering.store(flickering, Ordering::Relaxed);
    }

    pub fn set_reporting(&self, reporting: bool) {
        self.shared.reporting.store(reporting, Ordering::Relaxed);
    }

    pub fn set_halt_velocity(&self, halt: bool) {
        self.shared.halt_velocity.store(halt, Ordering::Relaxed);
    }

    pub fn render_controls(&self) -> &RenderControls {
        &self.shared.render
    }

    /// Runs `f` on the current tree; no swap happens until it returns.
    pub fn with_current<R>(&self, f: impl FnOnce(&QuadTree) -> R) -> R {
        self.shared.trees.read_current(|view| f(&view.tree))
    }

    /// The drawable nodes of the current tree under the current render controls.
    pub fn render_snapshot(&self, center: Point2, side_size: f64, points_size: f64) -> Vec<DrawSample> {
        let params = self.shared.render.params(center, side_size, points_size);
        self.with_current(|tree| tree.draw_samples(&params))
    }

    /// Particles stored in the current tree.
    pub fn particles(&self) -> Vec<Particle> {
        self.with_current(QuadTree::particles)
    }

    pub fn work_lists(&self) -> Vec<Vec<NodeId>> {
        self.shared.trees.read_current(|view| view.work_lists.clone())
    }

    pub fn stats(&self) -> ProcessorStats {
        let (particles, total_mass) =
            self.with_current(|tree| (tree.particles().len(), tree.root().mass_center.mass));
        ProcessorStats {
            cycles: self.shared.cycles.load(Ordering::Relaxed),
            dropped_particles: self.shared.dropped.load(Ordering::Relaxed),
            particles,
            total_mass,
        }
    }
}

impl Drop for GravEqProcessor {
    fn drop(&mut self) {
        self.stop();
    }
}
