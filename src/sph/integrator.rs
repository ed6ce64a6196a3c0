use crate::models::Point2;
use crate::particles::Particle;
use crate::sph::{barnes_hut_force, density_at, energy_at, is_beyond_radius, pressure, pressure_core_gradient, speed_of_sound};
use crate::tree::{NodeId, QuadTree, ROOT};
use crate::utils::{SphConstants, EPSILON};

/// Time derivatives of one particle, as estimated from the current tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationResult {
    /// Acceleration: gravity minus the pressure gradient.
    pub d_v: Point2,
    pub d_e: f64,
    /// Change of smoothing radius towards the desired neighbour count.
    pub d_r: f64,
    pub interactions_count: i32,
    /// CFL time-step estimate.
    pub dt_cfl: f64,
}

/// Neighbour lists reused across particles by one worker.
#[derive(Debug, Default, Clone)]
pub struct NeighborScratch {
    pub radius_nodes: Vec<NodeId>,
    pub first_corad: Vec<NodeId>,
    pub second_corad: Vec<NodeId>,
}

/// `max(r_i, r_j) (dv . dr) / (|dr|² + 0.01)` for approaching pairs, zero otherwise.
fn mu(current: &Particle, other: &Particle) -> f64 {
    let velocity_difference = current.velocity - other.velocity;
    let position_difference = current.position - other.position;
    let radius = current.radius.max(other.radius);
    let prod = velocity_difference.dot(&position_difference);
    if prod < 0.0 {
        radius * prod / (position_difference.norm_squared() + 0.01)
    } else {
        0.0
    }
}

/// Monaghan-style artificial viscosity between an approaching pair.
fn viscosity_tensor(
    current: &Particle,
    current_energy: f64,
    current_density: f64,
    other: &Particle,
    other_energy: f64,
    other_density: f64,
    constants: &SphConstants,
) -> f64 {
    let velocity_difference = current.velocity - other.velocity;
    let position_difference = current.position - other.position;
    let mut omega = velocity_difference.dot(&position_difference);
    if omega >= 0.0 {
        return 0.0;
    }
    omega /= position_difference.norm();
    let current_sos = speed_of_sound(current_energy, constants);
    let other_sos = speed_of_sound(other_energy, constants);
    -constants.viscosity_alpha * 0.5 * (current_sos + other_sos - 3.0 * omega).abs() * omega
        / (current_density + other_density)
}

/// Estimates the derivatives of `current` from the neighbours and the gravity of `tree`.
///
/// `current` does not have to be stored in the tree; its neighbours are
/// searched around its own position and radius.
pub fn iterate_particle(
    tree: &QuadTree,
    current: &Particle,
    scratch: &mut NeighborScratch,
    constants: &SphConstants,
) -> IterationResult {
    let NeighborScratch { radius_nodes, first_corad, second_corad } = scratch;
    first_corad.clear();
    second_corad.clear();

    tree.radius_node_catcher(ROOT, current.radius, radius_nodes, Some(current.position));
    let current_density = density_at(tree, ROOT, first_corad, Some(current));
    let current_energy = energy_at(tree, ROOT, first_corad, second_corad, Some(current));
    let current_pressure = pressure(current_density, current_energy, constants);
    let gravity = barnes_hut_force(
        tree,
        ROOT,
        current,
        constants.error_edge_squared,
        constants.gravitational_constant,
    );

    // Integer ratio of desired to found neighbours drives the radius.
    let ratio = constants.desired_interactions / (current.interactions_count + 1).max(1);
    let mut d_r = current.radius * 0.5 * (1.0 + f64::from(ratio).powf(0.33333));
    d_r = d_r.max(EPSILON * tree.size() * 0.1);
    d_r -= current.radius;

    let mut d_v = Point2::zero();
    let mut d_e = 0.0;
    let mut nabla_velocity = 0.0;
    let mut max_mu: f64 = 0.0;
    let mut interactions_count = 0;

    for &id in radius_nodes.iter() {
        let neighbor = tree.node(id).mass_center;
        let pos_difference = current.position - neighbor.position;
        let vel_difference = current.velocity - neighbor.velocity;
        let max_radius = current.radius.max(neighbor.radius);
        if is_beyond_radius(&pos_difference, max_radius) || pos_difference.norm_squared() < EPSILON {
            continue;
        }

        let neighbor_density = density_at(tree, id, first_corad, None);
        let neighbor_energy = energy_at(tree, id, first_corad, second_corad, None);
        let neighbor_pressure = pressure(neighbor_density, neighbor_energy, constants);
        let viscosity = constants.viscosity_coefficient
            * viscosity_tensor(
                current,
                current_energy,
                current_density,
                &neighbor,
                neighbor_energy,
                neighbor_density,
                constants,
            );
        let gradient = pressure_core_gradient(&pos_difference, max_radius);

        max_mu = max_mu.max(mu(current, &neighbor));
        let flux = vel_difference.dot(&gradient);
        nabla_velocity += neighbor.mass * flux;

        let exchange = viscosity
            + neighbor_pressure / (neighbor_density * neighbor_density)
            + current_pressure / (current_density * current_density);
        d_v += gradient * (neighbor.mass * exchange);
        d_e += neighbor.mass * flux * exchange;
        interactions_count += 1;
    }

    nabla_velocity = -nabla_velocity / current_density;
    let dt_cfl = constants.courant_number * current.radius
        / (current.radius * nabla_velocity.abs() + current_energy + 1.2 * (current_energy + 0.5 * max_mu));

    IterationResult {
        d_v: gravity - d_v,
        d_e,
        d_r,
        interactions_count,
        dt_cfl,
    }
}

/// Number of equal substeps needed to keep each below `cfl_time`; at least one.
pub fn substep_count(time_step: f64, cfl_time: f64) -> f64 {
    let count = (time_step / cfl_time).ceil();
    if count.is_finite() && count >= 1.0 {
        count
    } else {
        1.0
    }
}

/// Advances `current` by one predictor-corrector step against `tree`.
///
/// The predictor uses the derivatives at the old state and the stored
/// acceleration; the corrector re-evaluates them at the predicted state.
/// The returned particle keeps the input's `cfl_time` unless
/// `constants.adopt_cfl_estimate` is set. The corrector runs with
/// [`SphConstants::corrector`].
pub fn iterate_over_particle(
    tree: &QuadTree,
    current: &Particle,
    scratch: &mut NeighborScratch,
    constants: &SphConstants,
) -> Particle {
    let mut local = *current;
    let cfl_time = local.cfl_time;
    let local_time_step = constants.time_step / substep_count(constants.time_step, cfl_time);
    let mut time_elapsed = 0.0;
    let mut min_cfl = f64::INFINITY;
    let corrector_constants = constants.corrector();

    loop {
        let predicted = iterate_particle(tree, &local, scratch, constants);
        local.energy += local_time_step * predicted.d_e;
        local.interactions_count = predicted.interactions_count;
        local.radius += 0.5 * predicted.d_r;

        let initial_velocity = local.velocity;
        local.position += (local.velocity
            + (predicted.d_v * (2.0 / 3.0) - local.acceleration * (1.0 / 6.0)) * local_time_step)
            * local_time_step;
        local.velocity += (predicted.d_v * 1.5 - local.acceleration * 0.5) * local_time_step;

        let corrected = iterate_particle(tree, &local, scratch, &corrector_constants);
        local.interactions_count = corrected.interactions_count;
        local.radius = (local.radius + 0.5 * corrected.d_r).max(EPSILON);
        local.energy = local_time_step * predicted.d_e;

        local.acceleration = (predicted.d_v + corrected.d_v) * 0.5;
        local.velocity = initial_velocity
            + (corrected.d_v * (1.0 / 3.0) + predicted.d_v * (5.0 / 6.0) - local.acceleration * (1.0 / 6.0))
                * local_time_step;

        time_elapsed += local_time_step;
        min_cfl = min_cfl.min(predicted.dt_cfl);
        if time_elapsed >= cfl_time.min(local_time_step) {
            break;
        }
    }

    local.cfl_time = if constants.adopt_cfl_estimate && min_cfl.is_finite() && min_cfl > 0.0 {
        min_cfl
    } else {
        cfl_time
    };
    local
}
