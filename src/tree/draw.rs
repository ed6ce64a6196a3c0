use crate::models::Point2;
use crate::particles::Particle;
use crate::sph::{inverse_pressure_core, pressure_core};
use crate::tree::{NodeId, QuadTree, ROOT};

/// Quantity shown by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawChannel {
    /// `mass / radius`.
    #[default]
    Density,
    Energy,
    XSpeed,
    YSpeed,
    XAcceleration,
    YAcceleration,
}

impl DrawChannel {
    pub const ALL: [DrawChannel; 6] = [
        DrawChannel::Density,
        DrawChannel::Energy,
        DrawChannel::XSpeed,
        DrawChannel::YSpeed,
        DrawChannel::XAcceleration,
        DrawChannel::YAcceleration,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn value_of(self, particle: &Particle) -> f64 {
        match self {
            DrawChannel::Density => particle.mass / particle.radius,
            DrawChannel::Energy => particle.energy,
            DrawChannel::XSpeed => particle.velocity.x(),
            DrawChannel::YSpeed => particle.velocity.y(),
            DrawChannel::XAcceleration => particle.acceleration.x(),
            DrawChannel::YAcceleration => particle.acceleration.y(),
        }
    }
}

/// What and how to draw a tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawParams {
    /// Nodes at this depth are drawn as a whole instead of being opened.
    pub draw_level: usize,
    /// Screen position of the tree centre.
    pub center: Point2,
    /// Screen length of the whole tree side.
    pub side_size: f64,
    pub points_size: f64,
    /// Multiplier applied to every channel value.
    pub brightness: f64,
    pub channel: DrawChannel,
    pub extra_flare: bool,
    pub edge_drawer: bool,
    pub point_drawer: bool,
    /// Draw smooth kernel rings instead of a single blob.
    pub ext_draw: bool,
}

impl Default for DrawParams {
    fn default() -> Self {
        Self {
            draw_level: 15,
            center: Point2::zero(),
            side_size: 400.0,
            points_size: 2.0,
            brightness: 1.0,
            channel: DrawChannel::Density,
            extra_flare: false,
            edge_drawer: false,
            point_drawer: false,
            ext_draw: false,
        }
    }
}

impl DrawParams {
    /// Size of the marker point drawn on top of a particle.
    pub fn marker_size(&self) -> f64 {
        if self.extra_flare {
            2.0 * self.points_size
        } else {
            self.points_size
        }
    }
}

/// One drawn node, in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawSample {
    pub node: NodeId,
    pub depth: usize,
    pub leftbottom: Point2,
    pub righttop: Point2,
    pub position: Point2,
    /// Smoothing radius on screen.
    pub radius: f64,
    /// Channel value of the aggregate, scaled by brightness.
    pub particle_value: f64,
    /// `particle_value` weighted by the share of the cell the particle covers.
    pub node_value: f64,
    pub visited: bool,
}

/// A filled disk of one smooth-circle rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothRing {
    pub radius: f64,
    pub value: f64,
}

/// Concentric disks approximating the kernel profile of a particle of radius `radius`.
///
/// Kernel levels start at the kernel's central value and are divided by
/// `dvalue` until they fall below `0.005`; each level becomes a disk at the
/// distance where the kernel takes that value.
///
/// # Examples
///
/// ```
/// use rs_gas_collapse::tree::smooth_circle_rings;
///
/// let rings = smooth_circle_rings(10.0, 1.0, 1.1);
/// assert!(!rings.is_empty());
/// assert!(rings.windows(2).all(|w| w[0].radius <= w[1].radius));
/// ```
pub fn smooth_circle_rings(radius: f64, value: f64, dvalue: f64) -> Vec<SmoothRing> {
    let mut rings = Vec::new();
    if radius.is_nan() || radius <= 0.0 || dvalue.is_nan() || dvalue <= 1.0 {
        return rings;
    }
    let mut level = pressure_core(0.0, radius);
    while level > 0.005 {
        rings.push(SmoothRing {
            radius: inverse_pressure_core(level, radius),
            value: level * value,
        });
        level /= dvalue;
    }
    rings
}

impl QuadTree {
    /// Walks the tree down to `params.draw_level` and hands every drawn node to `visit`.
    ///
    /// Internal nodes above the draw level are opened; leaves and nodes at the
    /// draw level are drawn using their aggregate.
    pub fn draw_traversal(&self, params: &DrawParams, mut visit: impl FnMut(DrawSample)) {
        let scale = params.side_size / self.size();
        let mut stack = vec![(ROOT, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let node = self.node(id);
            if depth < params.draw_level && node.particles_count_in_subtrees > 0 {
                stack.extend(node.child_ids().map(|child| (child, depth + 1)));
                continue;
            }
            let aggregate = &node.mass_center;
            let width = node.width();
            let ratio = aggregate.radius * aggregate.radius / (width * width);
            let particle_value = params.channel.value_of(aggregate) * params.brightness;
            visit(DrawSample {
                node: id,
                depth,
                leftbottom: node.leftbottom_corner * scale + params.center,
                righttop: node.righttop_corner * scale + params.center,
                position: aggregate.position * scale + params.center,
                radius: aggregate.radius * scale,
                particle_value,
                node_value: particle_value * ratio,
                visited: aggregate.visited,
            });
        }
    }

    pub fn draw_samples(&self, params: &DrawParams) -> Vec<DrawSample> {
        let mut samples = Vec::new();
        self.draw_traversal(params, |sample| samples.push(sample));
        samples
    }
}
