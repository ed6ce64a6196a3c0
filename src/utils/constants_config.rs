// src/utils/constants_config.rs
use std::thread;
use std::time::Duration;

use crate::utils::{
    DEFAULT_CATCH_LEVEL,
    DEFAULT_SPH_CONSTANTS,
    errors::SimulationError
};

/// Physical and numerical parameters of the SPH solver.
///
/// `heat_capacity`, `polytropic_coef` and `time_step` can be tuned while a
/// simulation runs; the remaining fields are fixed for the lifetime of a processor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphConstants {
    pub heat_capacity: f64,
    pub polytropic_coef: f64,
    pub time_step: f64,
    pub gravitational_constant: f64,
    /// Barnes-Hut acceptance threshold on `0.5 * diagonal² / distance²`.
    pub error_edge_squared: f64,
    pub courant_number: f64,
    pub pressure_constant: f64,
    /// Multiplier on the artificial viscosity term. Zero disables it.
    pub viscosity_coefficient: f64,
    pub viscosity_alpha: f64,
    pub desired_interactions: i32,
    /// Feed the CFL estimate of a step back into the particle's `cfl_time`.
    pub adopt_cfl_estimate: bool,
    /// Evaluate the corrector with heat capacity and polytropic coefficient
    /// exchanged, reproducing the historical solver.
    pub swap_corrector_coefficients: bool,
}

impl Default for SphConstants {
    fn default() -> Self {
        DEFAULT_SPH_CONSTANTS
    }
}

impl SphConstants {
    /// Creates a set of constants, falling back to the defaults for any `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_gas_collapse::utils::SphConstants;
    ///
    /// let constants = SphConstants::new(None, Some(1.4), None);
    /// assert_eq!(constants.polytropic_coef, 1.4);
    /// assert_eq!(constants.heat_capacity, 1.01);
    /// ```
    pub fn new(
        heat_capacity: Option<f64>,
        polytropic_coef: Option<f64>,
        time_step: Option<f64>,
    ) -> Self {
        let default = DEFAULT_SPH_CONSTANTS;
        Self {
            heat_capacity: heat_capacity.unwrap_or(default.heat_capacity),
            polytropic_coef: polytropic_coef.unwrap_or(default.polytropic_coef),
            time_step: time_step.unwrap_or(default.time_step),
            ..default
        }
    }

    pub fn with_gravitational_constant(mut self, gravitational_constant: f64) -> Self {
        self.gravitational_constant = gravitational_constant;
        self
    }

    pub fn with_error_edge_squared(mut self, error_edge_squared: f64) -> Self {
        self.error_edge_squared = error_edge_squared;
        self
    }

    pub fn with_viscosity(mut self, coefficient: f64, alpha: f64) -> Self {
        self.viscosity_coefficient = coefficient;
        self.viscosity_alpha = alpha;
        self
    }

    pub fn with_adopt_cfl_estimate(mut self, adopt: bool) -> Self {
        self.adopt_cfl_estimate = adopt;
        self
    }

    pub fn with_swapped_corrector_coefficients(mut self, swap: bool) -> Self {
        self.swap_corrector_coefficients = swap;
        self
    }

    /// Constants the corrector evaluation runs with.
    pub fn corrector(&self) -> SphConstants {
        if self.swap_corrector_coefficients {
            SphConstants {
                heat_capacity: self.polytropic_coef,
                polytropic_coef: self.heat_capacity,
                ..*self
            }
        } else {
            *self
        }
    }

    /// Checks that every parameter is usable by the solver.
    ///
    /// # Returns
    ///
    /// * `Ok(())` when the constants are valid.
    /// * `Err(SimulationError)` naming the first offending parameter.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if !self.time_step.is_finite() || self.time_step <= 0.0 {
            return Err(SimulationError::InvalidTimeStep);
        }
        let positive = [
            self.heat_capacity,
            self.polytropic_coef,
            self.courant_number,
            self.pressure_constant,
        ];
        if positive.iter().any(|value| !value.is_finite() || *value <= 0.0) {
            return Err(SimulationError::InvalidCoefficient);
        }
        let non_negative = [
            self.gravitational_constant,
            self.error_edge_squared,
            self.viscosity_coefficient,
            self.viscosity_alpha,
        ];
        if non_negative.iter().any(|value| !value.is_finite() || *value < 0.0) {
            return Err(SimulationError::InvalidCoefficient);
        }
        if self.desired_interactions < 0 {
            return Err(SimulationError::InvalidCoefficient);
        }
        Ok(())
    }
}

/// How pooled workers learn that they have work to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulingMode {
    /// Workers sleep on a condition variable and the observer is woken by
    /// workers finishing their pass.
    #[default]
    Signaled,
    /// Workers poll their state at a fixed interval.
    Polling,
}

/// Thread layout of a running processor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerConfig {
    pub num_threads: usize,
    pub catch_level: usize,
    pub worker_interval: Duration,
    pub observer_interval: Duration,
    pub mode: SchedulingMode,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            num_threads: default_thread_count(),
            catch_level: DEFAULT_CATCH_LEVEL,
            worker_interval: Duration::from_millis(5),
            observer_interval: Duration::from_millis(10),
            mode: SchedulingMode::default(),
        }
    }
}

impl SchedulerConfig {
    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    pub fn with_catch_level(mut self, catch_level: usize) -> Self {
        self.catch_level = catch_level;
        self
    }

    pub fn with_mode(mut self, mode: SchedulingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_intervals(mut self, worker_interval: Duration, observer_interval: Duration) -> Self {
        self.worker_interval = worker_interval;
        self.observer_interval = observer_interval;
        self
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.num_threads == 0 {
            return Err(SimulationError::InvalidThreadCount);
        }
        Ok(())
    }
}

/// Number of hardware threads minus two (left for the UI and the observer), at least one.
pub fn default_thread_count() -> usize {
    thread::available_parallelism()
        .map(|count| count.get())
        .unwrap_or(1)
        .saturating_sub(2)
        .max(1)
}
