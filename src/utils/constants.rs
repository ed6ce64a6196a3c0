use crate::utils::SphConstants;

/// Distance and mass tolerance used throughout the tree and the solver.
pub const EPSILON: f64 = 0.005;

/// Depth at which the quadtree stops subdividing and merges particles into the leaf.
pub const MAX_TREE_DEPTH: usize = 50;

/// Side length of the simulated square used by the demo and the defaults.
pub const DEFAULT_DOMAIN_SIZE: f64 = 100.0;

/// Depth at which the partitioner stops descending and hands whole subtrees to a thread.
pub const DEFAULT_CATCH_LEVEL: usize = 5;

pub const DEFAULT_SPH_CONSTANTS: SphConstants = SphConstants {
    heat_capacity: 1.01,
    polytropic_coef: 1.67,
    time_step: 0.004,
    gravitational_constant: 0.001,
    error_edge_squared: 0.05,
    courant_number: 0.3,
    pressure_constant: 8.3,
    viscosity_coefficient: 0.0,
    viscosity_alpha: 1.0,
    desired_interactions: 10,
    adopt_cfl_estimate: false,
    swap_corrector_coefficients: false,
};
