use crate::tree::{NodeId, QuadTree, ROOT};

/// Splits the tree into `num_threads` work lists of subtree roots with
/// roughly equal particle counts.
///
/// The walk descends at most `catch_level` levels; every node where it stops
/// (a leaf, or a subtree at the catch level) goes to the current thread, and
/// the thread index advances once the running count passes its share.
/// Each leaf is covered by exactly one list.
///
/// # Examples
///
/// ```
/// use rs_gas_collapse::models::Point2;
/// use rs_gas_collapse::particles::Particle;
/// use rs_gas_collapse::scheduler::subdivide_tree;
/// use rs_gas_collapse::tree::QuadTree;
///
/// let particles: Vec<Particle> = (0..40)
///     .map(|i| {
///         let x = -39.0 + 2.0 * i as f64;
///         Particle::new(Point2::xy(x, x / 2.0), Point2::zero(), 1.0, 1.0, 0.0).unwrap()
///     })
///     .collect();
/// let tree = QuadTree::from_particles(100.0, &particles);
///
/// let lists = subdivide_tree(&tree, 4, 5);
/// assert_eq!(lists.len(), 4);
/// let covered: usize = lists.iter().flatten().map(|&id| tree.leaves_below(id).len()).sum();
/// assert_eq!(covered, 40);
/// ```
pub fn subdivide_tree(tree: &QuadTree, num_threads: usize, catch_level: usize) -> Vec<Vec<NodeId>> {
    let num_threads = num_threads.max(1);
    let mut work_lists = vec![Vec::new(); num_threads];
    let relation = tree.root().particles_count_in_subtrees as f64 / num_threads as f64;

    let mut thread = 0;
    let mut running_count = 0usize;
    let mut stack = vec![(ROOT, 0usize)];
    while let Some((id, level)) = stack.pop() {
        let node = tree.node(id);
        if level < catch_level && !node.is_leaf() {
            stack.extend(node.child_ids().map(|child| (child, level + 1)));
            continue;
        }
        running_count += node.particles_count_in_subtrees.max(1);
        if relation > 0.0 && running_count as f64 / relation - 1.0 > thread as f64 && thread + 1 < num_threads {
            thread += 1;
        }
        work_lists[thread].push(id);
    }
    work_lists
}
