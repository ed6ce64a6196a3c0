use std::mem;

use log::trace;

use crate::models::Point2;
use crate::particles::Particle;
use crate::tree::geometry::{circle_inside_square, point_in_circle, square_circle_intersection};
use crate::tree::{Node, NodeId, Quadrant};
use crate::utils::{EPSILON, MAX_TREE_DEPTH};

/// Id of the root node of every tree.
pub const ROOT: NodeId = 0;

/// A 2D Barnes-Hut quadtree over a square centred on the origin.
///
/// Nodes live in an arena and refer to each other by [`NodeId`]. Every internal
/// node keeps the combined [`Particle`] of its subtree, so a subtree can be
/// used as a single distant body. Each stored particle ends up in exactly one
/// leaf; particles closer than [`EPSILON`] to a leaf, or arriving below
/// [`MAX_TREE_DEPTH`], are merged into that leaf.
///
/// # Examples
///
/// ```
/// use rs_gas_collapse::models::Point2;
/// use rs_gas_collapse::particles::Particle;
/// use rs_gas_collapse::tree::QuadTree;
///
/// let mut tree = QuadTree::new(100.0);
/// for x in [-10.0, 10.0] {
///     let p = Particle::new(Point2::xy(x, 0.0), Point2::zero(), 2.0, 1.0, 0.0).unwrap();
///     assert!(tree.push(p).is_some());
/// }
///
/// assert_eq!(tree.root().particles_count_in_subtrees, 2);
/// assert_eq!(tree.root().mass_center.mass, 4.0);
/// assert_eq!(tree.root().mass_center.position, Point2::zero());
/// ```
#[derive(Debug, Clone)]
pub struct QuadTree {
    nodes: Vec<Node>,
    size: f64,
}

impl QuadTree {
    /// An empty tree covering the square of side `size` centred on the origin.
    pub fn new(size: f64) -> Self {
        Self {
            nodes: vec![Node::root(size)],
            size,
        }
    }

    /// Builds a tree from a slice of particles, skipping those outside the square.
    pub fn from_particles(size: f64, particles: &[Particle]) -> Self {
        let mut tree = Self::new(size);
        for particle in particles {
            tree.push(*particle);
        }
        tree
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn root(&self) -> &Node {
        &self.nodes[ROOT]
    }

    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Number of nodes in the arena, the root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root().is_leaf() && self.root().mass_center.mass.abs() <= EPSILON
    }

    /// Inserts a particle and returns the node it was merged into at insertion time.
    ///
    /// A later push may split that node and move the particle further down,
    /// so the id is not a stable handle to the particle. Returns `None` (and
    /// stores nothing) when the particle lies outside the tree's square.
    pub fn push(&mut self, particle: Particle) -> Option<NodeId> {
        if !self.root().point_is_inside(&particle.position) {
            trace!("Particle at {} is outside the tree", particle.position);
            return None;
        }

        let mut current = ROOT;
        let mut level = 0;
        loop {
            let node = &self.nodes[current];
            let coincident = (node.mass_center.position - particle.position).norm_squared() < EPSILON * EPSILON;
            if node.mass_center.mass.abs() <= EPSILON || coincident || level >= MAX_TREE_DEPTH {
                self.nodes[current].mass_center += particle;
                return Some(current);
            }

            if node.is_leaf() {
                // Demote the resident particle into its own child first.
                let resident = node.mass_center;
                if let Some(quadrant) = node.quadrant_of(&resident.position) {
                    let child = self.spawn_child(current, quadrant);
                    self.nodes[child].mass_center = resident;
                    self.nodes[current].particles_count_in_subtrees += 1;
                }
            }

            let node = &mut self.nodes[current];
            node.mass_center += particle;
            node.particles_count_in_subtrees += 1;
            let quadrant = node.quadrant_of(&particle.position)?;
            current = match node.child(quadrant) {
                Some(child) => child,
                None => self.spawn_child(current, quadrant),
            };
            level += 1;
        }
    }

    fn spawn_child(&mut self, parent: NodeId, quadrant: Quadrant) -> NodeId {
        debug_assert!(self.nodes[parent].child(quadrant).is_none());
        let (leftbottom, righttop) = self.nodes[parent].child_bounds(quadrant);
        let id = self.nodes.len();
        self.nodes.push(Node::new(leftbottom, righttop, Some(parent)));
        self.nodes[parent].children[quadrant.index()] = Some(id);
        id
    }

    /// Drops every node but the root and resets the root to empty.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.nodes[ROOT] = Node::root(self.size);
    }

    /// Exchanges the contents of two trees in constant time.
    pub fn swap(&mut self, other: &mut QuadTree) {
        mem::swap(self, other);
    }

    /// Collects into `out` every leaf whose particle lies strictly within
    /// `radius` of `source` (by default the aggregate position of `center`).
    ///
    /// The search climbs from `center` until the circle fits inside the
    /// current cell (or the root is reached), then descends into every child
    /// the circle touches. `out` is cleared first.
    pub fn radius_node_catcher(&self, center: NodeId, radius: f64, out: &mut Vec<NodeId>, source: Option<Point2>) {
        out.clear();
        let source = source.unwrap_or(self.nodes[center].mass_center.position);

        let mut start = center;
        while let Some(parent) = self.nodes[start].parent {
            let node = &self.nodes[start];
            if circle_inside_square(&node.leftbottom_corner, &node.righttop_corner, &source, radius) {
                break;
            }
            start = parent;
        }

        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if !node.is_leaf() {
                for child in node.child_ids() {
                    let cell = &self.nodes[child];
                    if square_circle_intersection(&cell.leftbottom_corner, &cell.righttop_corner, &source, radius) {
                        stack.push(child);
                    }
                }
            } else if node.mass_center.mass.abs() > EPSILON
                && point_in_circle(&source, radius, &node.mass_center.position)
            {
                out.push(id);
            }
        }
    }

    /// Leaves below `start`, in depth-first order.
    pub fn leaves_below(&self, start: NodeId) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if node.is_leaf() {
                leaves.push(id);
            } else {
                stack.extend(node.child_ids());
            }
        }
        leaves
    }

    /// The particles stored in the tree, one per non-empty leaf.
    pub fn particles(&self) -> Vec<Particle> {
        self.leaves_below(ROOT)
            .into_iter()
            .map(|id| self.nodes[id].mass_center)
            .filter(|p| p.mass.abs() > EPSILON)
            .collect()
    }
}
