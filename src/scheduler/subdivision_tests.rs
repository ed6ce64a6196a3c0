use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::Point2;
use crate::particles::Particle;
use crate::scheduler::subdivide_tree;
use crate::tree::{NodeId, QuadTree, ROOT};

fn random_tree(count: usize, seed: u64) -> QuadTree {
    let mut rng = StdRng::seed_from_u64(seed);
    let particles: Vec<Particle> = (0..count)
        .map(|_| {
            let position = Point2::xy(rng.random_range(-45.0..45.0), rng.random_range(-45.0..45.0));
            Particle::new(position, Point2::zero(), 1.0, 1.0, 0.0).expect("Failed to create particle")
        })
        .collect();
    QuadTree::from_particles(100.0, &particles)
}

fn covered_leaves(tree: &QuadTree, lists: &[Vec<NodeId>]) -> Vec<NodeId> {
    lists.iter().flatten().flat_map(|&id| tree.leaves_below(id)).collect()
}

#[test]
fn test_every_leaf_covered_once() {
    let tree = random_tree(500, 3);
    for threads in [1, 2, 3, 6, 16] {
        let lists = subdivide_tree(&tree, threads, 5);
        assert_eq!(lists.len(), threads);

        let covered = covered_leaves(&tree, &lists);
        let unique: HashSet<NodeId> = covered.iter().copied().collect();
        assert_eq!(covered.len(), unique.len(), "{} threads cover a leaf twice", threads);
        assert_eq!(unique, tree.leaves_below(ROOT).into_iter().collect::<HashSet<_>>());
    }
}

#[test]
fn test_single_thread_takes_everything() {
    let tree = random_tree(100, 8);
    let lists = subdivide_tree(&tree, 1, 5);
    assert_eq!(lists.len(), 1);
    assert_eq!(covered_leaves(&tree, &lists).len(), tree.leaves_below(ROOT).len());
}

#[test]
fn test_catch_level_zero_hands_out_root() {
    let tree = random_tree(100, 9);
    let lists = subdivide_tree(&tree, 4, 0);
    let handed_out: Vec<NodeId> = lists.into_iter().flatten().collect();
    assert_eq!(handed_out, vec![ROOT]);
}

#[test]
fn test_empty_tree() {
    let tree = QuadTree::new(100.0);
    let lists = subdivide_tree(&tree, 3, 5);
    assert_eq!(lists, vec![vec![ROOT], Vec::new(), Vec::new()]);
}

#[test]
fn test_zero_threads_treated_as_one() {
    let tree = random_tree(20, 1);
    assert_eq!(subdivide_tree(&tree, 0, 5).len(), 1);
}

#[test]
fn test_uniform_cloud_is_balanced() {
    let tree = random_tree(4000, 21);
    let threads = 4;
    let lists = subdivide_tree(&tree, threads, 6);
    let share = 4000 / threads;

    for (thread, list) in lists.iter().enumerate() {
        let load: usize = list
            .iter()
            .map(|&id| tree.leaves_below(id).iter().filter(|&&leaf| tree.node(leaf).mass_center.mass > 0.0).count())
            .sum();
        assert!(load > share / 2, "thread {} got {} particles", thread, load);
        assert!(load < share * 2, "thread {} got {} particles", thread, load);
    }
}
