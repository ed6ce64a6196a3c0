use approx::assert_relative_eq;

use crate::models::Point2;
use crate::particles::Particle;
use crate::tree::{smooth_circle_rings, DrawChannel, DrawParams, QuadTree, ROOT};

fn spread_tree() -> QuadTree {
    let mut tree = QuadTree::new(100.0);
    for (x, y) in [(-30.0, -30.0), (-10.0, 20.0), (25.0, 25.0), (30.0, -5.0), (31.0, -6.0)] {
        let mut p = Particle::new(Point2::xy(x, y), Point2::xy(1.0, -2.0), 10.0, 2.0, 0.5)
            .expect("Failed to create particle");
        p.acceleration = Point2::xy(0.25, 4.0);
        tree.push(p);
    }
    tree
}

#[test]
fn test_draw_level_zero_draws_root() {
    let tree = spread_tree();
    let params = DrawParams { draw_level: 0, ..DrawParams::default() };
    let samples = tree.draw_samples(&params);

    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].node, ROOT);
    assert_eq!(samples[0].leftbottom, Point2::xy(-200.0, -200.0));
    assert_eq!(samples[0].righttop, Point2::xy(200.0, 200.0));
}

#[test]
fn test_deep_draw_level_reaches_every_leaf() {
    let tree = spread_tree();
    let samples = tree.draw_samples(&DrawParams::default());
    assert_eq!(samples.len(), tree.leaves_below(ROOT).len());
    assert!(samples.iter().all(|s| tree.node(s.node).is_leaf()));

    let total: f64 = samples.iter().map(|s| tree.node(s.node).mass_center.mass).sum();
    assert_relative_eq!(total, 50.0, epsilon = 1e-9);
}

#[test]
fn test_draw_sample_values() {
    let tree = spread_tree();
    let params = DrawParams {
        center: Point2::xy(10.0, 5.0),
        side_size: 200.0,
        brightness: 2.0,
        ..DrawParams::default()
    };
    for sample in tree.draw_samples(&params) {
        let node = tree.node(sample.node);
        let p = node.mass_center;
        assert_relative_eq!(sample.position.x(), p.position.x() * 2.0 + 10.0, epsilon = 1e-9);
        assert_relative_eq!(sample.position.y(), p.position.y() * 2.0 + 5.0, epsilon = 1e-9);
        assert_relative_eq!(sample.radius, p.radius * 2.0, epsilon = 1e-9);
        assert_relative_eq!(sample.particle_value, 2.0 * p.mass / p.radius, epsilon = 1e-9);
        let ratio = p.radius * p.radius / (node.width() * node.width());
        assert_relative_eq!(sample.node_value, sample.particle_value * ratio, epsilon = 1e-9);
    }
}

#[test]
fn test_draw_channels() {
    let p = Particle {
        mass: 6.0,
        radius: 2.0,
        energy: 0.7,
        velocity: Point2::xy(1.0, -2.0),
        acceleration: Point2::xy(3.0, -4.0),
        ..Particle::default()
    };
    assert_eq!(DrawChannel::Density.value_of(&p), 3.0);
    assert_eq!(DrawChannel::Energy.value_of(&p), 0.7);
    assert_eq!(DrawChannel::XSpeed.value_of(&p), 1.0);
    assert_eq!(DrawChannel::YSpeed.value_of(&p), -2.0);
    assert_eq!(DrawChannel::XAcceleration.value_of(&p), 3.0);
    assert_eq!(DrawChannel::YAcceleration.value_of(&p), -4.0);

    for channel in DrawChannel::ALL {
        assert_eq!(DrawChannel::from_index(channel.index()), Some(channel));
    }
    assert_eq!(DrawChannel::from_index(6), None);
}

#[test]
fn test_marker_size() {
    let params = DrawParams { points_size: 3.0, ..DrawParams::default() };
    assert_eq!(params.marker_size(), 3.0);
    assert_eq!(DrawParams { extra_flare: true, ..params }.marker_size(), 6.0);
}

#[test]
fn test_smooth_circle_rings() {
    let rings = smooth_circle_rings(10.0, 2.0, 1.1);
    assert!(!rings.is_empty());
    assert_relative_eq!(rings[0].radius, 0.0, epsilon = 1e-12);
    assert_relative_eq!(rings[0].value, 0.8, epsilon = 1e-12);
    assert!(rings.iter().all(|r| r.radius >= 0.0 && r.radius <= 10.0));
    assert!(rings.windows(2).all(|w| w[0].value > w[1].value));

    assert!(smooth_circle_rings(0.0, 1.0, 1.1).is_empty());
    assert!(smooth_circle_rings(10.0, 1.0, 1.0).is_empty());
}
