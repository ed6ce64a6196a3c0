use crate::models::Point2;
use crate::particles::Particle;
use crate::tree::{Node, NodeId, QuadTree};

/// Softened pull of `distant` on `center`:
/// `G m1 m2 (p2 - p1) / (r2 + |p1 - p2|²)^1.5`, where `r2` is the radius of `distant`.
///
/// # Examples
///
/// ```
/// use rs_gas_collapse::models::Point2;
/// use rs_gas_collapse::particles::Particle;
/// use rs_gas_collapse::sph::grav_force;
///
/// let a = Particle::new(Point2::zero(), Point2::zero(), 10.0, 0.0, 0.0).unwrap();
/// let b = Particle::new(Point2::xy(2.0, 0.0), Point2::zero(), 10.0, 0.0, 0.0).unwrap();
///
/// let force = grav_force(&a, &b, 1.0);
/// assert!((force - Point2::xy(25.0, 0.0)).norm() < 1e-12);
/// ```
pub fn grav_force(center: &Particle, distant: &Particle, gravitational_constant: f64) -> Point2 {
    let diff = distant.position - center.position;
    let softened = (distant.radius + diff.norm_squared()).powf(1.5);
    diff * (gravitational_constant * center.mass * distant.mass / softened)
}

/// `0.5 * diagonal² / distance²` between `current` and the node's aggregate.
pub fn squared_error(current: &Particle, node: &Node) -> f64 {
    0.5 * node.diagonal_squared() / (current.position - node.mass_center.position).norm_squared()
}

/// Barnes-Hut gravity on `current` from the subtree rooted at `start`.
///
/// An internal node is opened while its [`squared_error`] is at least
/// `error_edge_squared`; otherwise its aggregate is used as a single body.
/// Setting `error_edge_squared` to zero opens every internal node.
pub fn barnes_hut_force(
    tree: &QuadTree,
    start: NodeId,
    current: &Particle,
    error_edge_squared: f64,
    gravitational_constant: f64,
) -> Point2 {
    let mut force = Point2::zero();
    let mut stack = vec![start];
    while let Some(id) = stack.pop() {
        let node = tree.node(id);
        if node.particles_count_in_subtrees > 0 && squared_error(current, node) >= error_edge_squared {
            stack.extend(node.child_ids());
        } else {
            force += grav_force(current, &node.mass_center, gravitational_constant);
        }
    }
    force
}

/// Direct sum over every particle, the reference the tree walk approximates.
pub fn brute_force_gravity(current: &Particle, others: &[Particle], gravitational_constant: f64) -> Point2 {
    others
        .iter()
        .map(|other| grav_force(current, other, gravitational_constant))
        .fold(Point2::zero(), |acc, f| acc + f)
}
