use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, error};

use crate::utils::{SchedulingMode, SimulationError};

/// Lifecycle of a pooled worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Nothing to do until signalled.
    Idle,
    /// Signalled; the job runs on the next wake-up.
    Waiting,
    Running,
}

#[derive(Debug)]
struct WorkerControl {
    state: WorkerState,
    default_state: WorkerState,
    rearm: bool,
    active: bool,
    mode: SchedulingMode,
    interval: Duration,
}

#[derive(Debug)]
struct WorkerShared {
    control: Mutex<WorkerControl>,
    signal: Condvar,
}

/// Shared control block of a pooled worker; cheap to clone.
#[derive(Debug, Clone)]
pub struct WorkerHandle {
    inner: Arc<WorkerShared>,
}

impl WorkerHandle {
    /// A handle whose worker returns to `default_state` after each run.
    ///
    /// A default of [`WorkerState::Waiting`] makes the worker run its job on
    /// every wake-up.
    pub fn new(default_state: WorkerState, mode: SchedulingMode, interval: Duration) -> Self {
        Self {
            inner: Arc::new(WorkerShared {
                control: Mutex::new(WorkerControl {
                    state: WorkerState::Idle,
                    default_state,
                    rearm: false,
                    active: true,
                    mode,
                    interval,
                }),
                signal: Condvar::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, WorkerControl> {
        self.inner.control.lock().unwrap_or_else(|poisoned| {
            error!("Worker control lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    pub fn state(&self) -> WorkerState {
        self.lock().state
    }

    pub fn is_active(&self) -> bool {
        self.lock().active
    }

    /// Asks the worker to run its job once more.
    ///
    /// A signal that arrives while the job is running is remembered and
    /// triggers another run right after the current one.
    pub fn sign_awaiting(&self) {
        let mut control = self.lock();
        match control.state {
            WorkerState::Running => control.rearm = true,
            _ => control.state = WorkerState::Waiting,
        }
        drop(control);
        self.inner.signal.notify_all();
    }

    /// Stops the worker after its current run.
    pub fn disable(&self) {
        self.lock().active = false;
        self.inner.signal.notify_all();
    }

    /// Blocks until the worker is signalled; marks it running and returns
    /// `true`, or returns `false` once the worker has been disabled.
    fn await_signal(&self) -> bool {
        let mut control = self.lock();
        loop {
            if !control.active {
                return false;
            }
            if control.state == WorkerState::Waiting {
                control.state = WorkerState::Running;
                return true;
            }
            let interval = control.interval;
            control = match control.mode {
                SchedulingMode::Polling => {
                    drop(control);
                    thread::sleep(interval);
                    self.lock()
                }
                SchedulingMode::Signaled => self
                    .inner
                    .signal
                    .wait_timeout(control, interval)
                    .map(|(guard, _)| guard)
                    .unwrap_or_else(|poisoned| poisoned.into_inner().0),
            };
        }
    }

    /// Leaves the running state; returns the polling interval to sleep, if any.
    fn finish_run(&self) -> Option<Duration> {
        let mut control = self.lock();
        control.state = if control.rearm {
            control.rearm = false;
            WorkerState::Waiting
        } else {
            control.default_state
        };
        match control.mode {
            SchedulingMode::Polling => Some(control.interval),
            SchedulingMode::Signaled => None,
        }
    }
}

/// A long-lived thread that runs the same job each time it is signalled.
///
/// After each run the worker optionally signals `notify`, which is how
/// the observer learns that a worker has finished its pass.
#[derive(Debug)]
pub struct PooledWorker {
    handle: WorkerHandle,
    thread: Option<JoinHandle<()>>,
}

impl PooledWorker {
    /// Spawns a named worker thread driven by `handle`.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::ThreadSpawn`] if the OS refuses the thread.
    pub fn spawn<F>(
        name: impl Into<String>,
        handle: WorkerHandle,
        notify: Option<WorkerHandle>,
        mut job: F,
    ) -> Result<Self, SimulationError>
    where
        F: FnMut() + Send + 'static,
    {
        let name = name.into();
        let control = handle.clone();
        let thread = thread::Builder::new().name(name.clone()).spawn(move || {
            debug!("Worker {} started", name);
            while control.await_signal() {
                job();
                let pause = control.finish_run();
                if let Some(observer) = &notify {
                    observer.sign_awaiting();
                }
                if let Some(interval) = pause {
                    thread::sleep(interval);
                }
            }
            debug!("Worker {} stopped", name);
        })?;
        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }

    pub fn handle(&self) -> &WorkerHandle {
        &self.handle
    }

    pub fn state(&self) -> WorkerState {
        self.handle.state()
    }

    /// Disables the worker and waits for its thread to exit.
    pub fn join(&mut self) {
        self.handle.disable();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("Worker thread panicked");
            }
        }
    }
}

impl Drop for PooledWorker {
    fn drop(&mut self) {
        self.join();
    }
}
