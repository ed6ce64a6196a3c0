use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Duration;

use log::error;

const STOP_CHECK_INTERVAL: Duration = Duration::from_millis(50);

/// A gate that every simulation thread passes before it starts a pass.
///
/// While paused, threads block at the gate; they are released on resume or
/// when the shared stop flag is raised.
#[derive(Debug, Default)]
pub struct PauseGate {
    paused: Mutex<bool>,
    resumed: Condvar,
}

impl PauseGate {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, bool> {
        self.paused.lock().unwrap_or_else(|poisoned| {
            error!("Pause lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    pub fn is_paused(&self) -> bool {
        *self.lock()
    }

    pub fn set_paused(&self, paused: bool) {
        *self.lock() = paused;
        if !paused {
            self.resumed.notify_all();
        }
    }

    /// Flips the pause state and returns the new one.
    pub fn toggle(&self) -> bool {
        let mut paused = self.lock();
        *paused = !*paused;
        let now = *paused;
        drop(paused);
        if !now {
            self.resumed.notify_all();
        }
        now
    }

    /// Blocks while paused, unless `stop` is raised.
    pub fn wait_until_resumed(&self, stop: &AtomicBool) {
        let mut paused = self.lock();
        while *paused && !stop.load(Ordering::SeqCst) {
            paused = self
                .resumed
                .wait_timeout(paused, STOP_CHECK_INTERVAL)
                .map(|(guard, _)| guard)
                .unwrap_or_else(|poisoned| poisoned.into_inner().0);
        }
    }
}
