use crate::models::Point2;
use crate::particles::Particle;
use crate::sph::pressure_core_at;
use crate::tree::{NodeId, QuadTree};
use crate::utils::SphConstants;

/// True when `dist` is longer than `radius`.
pub fn is_beyond_radius(dist: &Point2, radius: f64) -> bool {
    dist.norm_squared() > radius * radius
}

/// Kernel-weighted density around `begin` (or around `source`, when given).
///
/// `neighbors` is scratch space for the neighbour search and holds the
/// neighbours on return.
///
/// # Examples
///
/// ```
/// use rs_gas_collapse::models::Point2;
/// use rs_gas_collapse::particles::Particle;
/// use rs_gas_collapse::sph::density_at;
/// use rs_gas_collapse::tree::{QuadTree, ROOT};
///
/// let mut tree = QuadTree::new(100.0);
/// let p = Particle::new(Point2::zero(), Point2::zero(), 2.0, 1.0, 0.0).unwrap();
/// tree.push(p);
///
/// let mut scratch = Vec::new();
/// // A lone particle sees only itself: mass * W(0, h) = 2 * 4.
/// assert_eq!(density_at(&tree, ROOT, &mut scratch, Some(&p)), 8.0);
/// ```
pub fn density_at(tree: &QuadTree, begin: NodeId, neighbors: &mut Vec<NodeId>, source: Option<&Particle>) -> f64 {
    let source = source.copied().unwrap_or(tree.node(begin).mass_center);
    tree.radius_node_catcher(begin, source.radius, neighbors, Some(source.position));
    neighbors
        .iter()
        .map(|&id| {
            let other = &tree.node(id).mass_center;
            let pos_difference = source.position - other.position;
            let max_radius = source.radius.max(other.radius);
            if is_beyond_radius(&pos_difference, max_radius) {
                0.0
            } else {
                other.mass * pressure_core_at(&pos_difference, max_radius)
            }
        })
        .sum()
}

/// Kernel-weighted specific energy around `begin` (or `source`).
///
/// Each neighbour contributes `m / rho * u * W`, with its density estimated
/// around the neighbour itself using `density_scratch`.
pub fn energy_at(
    tree: &QuadTree,
    begin: NodeId,
    neighbors: &mut Vec<NodeId>,
    density_scratch: &mut Vec<NodeId>,
    source: Option<&Particle>,
) -> f64 {
    let source = source.copied().unwrap_or(tree.node(begin).mass_center);
    tree.radius_node_catcher(begin, source.radius, neighbors, Some(source.position));
    let mut sum = 0.0;
    for &id in neighbors.iter() {
        let other = &tree.node(id).mass_center;
        let pos_difference = source.position - other.position;
        let max_radius = source.radius.max(other.radius);
        if is_beyond_radius(&pos_difference, max_radius) {
            continue;
        }
        let other_density = density_at(tree, id, density_scratch, None);
        sum += other.mass / other_density * other.energy * pressure_core_at(&pos_difference, max_radius);
    }
    sum
}

/// Equation of state: `(γ - 1) ρ u + C (n/3 + 1 - γ) |ρ|^(n/3 + 1)`,
/// with `γ` the heat capacity and `n` the polytropic coefficient.
pub fn pressure(density: f64, energy: f64, constants: &SphConstants) -> f64 {
    let heat_capacity = constants.heat_capacity;
    let exponent = constants.polytropic_coef / 3.0 + 1.0;
    (heat_capacity - 1.0) * density * energy
        + constants.pressure_constant * (exponent - heat_capacity) * density.abs().powf(exponent)
}

/// `sqrt(|(1 + 1/n) C u|)`.
pub fn speed_of_sound(energy: f64, constants: &SphConstants) -> f64 {
    ((1.0 + 1.0 / constants.polytropic_coef) * constants.pressure_constant * energy)
        .abs()
        .sqrt()
}
