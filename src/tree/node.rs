use crate::models::Point2;
use crate::particles::Particle;

/// Index of a node inside its [`QuadTree`](crate::tree::QuadTree) arena.
pub type NodeId = usize;

/// The four children of a node, in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    LeftBottom = 0,
    LeftTop = 1,
    RightTop = 2,
    RightBottom = 3,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::LeftBottom,
        Quadrant::LeftTop,
        Quadrant::RightTop,
        Quadrant::RightBottom,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// A square cell of the quadtree.
///
/// A node without children is a leaf and its `mass_center` is the particle
/// (or the merge of coincident particles) stored there. An internal node's
/// `mass_center` aggregates its whole subtree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub leftbottom_corner: Point2,
    pub righttop_corner: Point2,
    pub mass_center: Particle,
    /// Number of particles stored below this node; zero for a leaf.
    pub particles_count_in_subtrees: usize,
    pub children: [Option<NodeId>; 4],
    pub parent: Option<NodeId>,
}

impl Node {
    /// A root cell covering the square of side `size` centred on the origin.
    pub fn root(size: f64) -> Self {
        let half = Point2::xy(size / 2.0, size / 2.0);
        Self::new(-half, half, None)
    }

    /// An empty cell; its aggregate starts at the centre of the cell with zero mass.
    pub fn new(leftbottom_corner: Point2, righttop_corner: Point2, parent: Option<NodeId>) -> Self {
        let mass_center = Particle {
            position: (leftbottom_corner + righttop_corner) / 2.0,
            ..Particle::default()
        };
        Self {
            leftbottom_corner,
            righttop_corner,
            mass_center,
            particles_count_in_subtrees: 0,
            children: [None; 4],
            parent,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    pub fn center(&self) -> Point2 {
        (self.leftbottom_corner + self.righttop_corner) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.righttop_corner.x() - self.leftbottom_corner.x()
    }

    /// Squared length of the cell diagonal.
    pub fn diagonal_squared(&self) -> f64 {
        (self.leftbottom_corner - self.righttop_corner).norm_squared()
    }

    /// Inclusive on every side.
    pub fn point_is_inside(&self, pos: &Point2) -> bool {
        pos.all_ge(&self.leftbottom_corner) && pos.all_le(&self.righttop_corner)
    }

    /// The child quadrant `pos` falls into; points on the centre lines go right and up.
    pub fn quadrant_of(&self, pos: &Point2) -> Option<Quadrant> {
        if !self.point_is_inside(pos) {
            return None;
        }
        let diff = *pos - self.center();
        let quadrant = match (diff.x() >= 0.0, diff.y() >= 0.0) {
            (true, true) => Quadrant::RightTop,
            (true, false) => Quadrant::RightBottom,
            (false, true) => Quadrant::LeftTop,
            (false, false) => Quadrant::LeftBottom,
        };
        Some(quadrant)
    }

    /// Corners of the given child cell.
    pub fn child_bounds(&self, quadrant: Quadrant) -> (Point2, Point2) {
        let center = self.center();
        let lb = self.leftbottom_corner;
        let rt = self.righttop_corner;
        match quadrant {
            Quadrant::LeftBottom => (lb, center),
            Quadrant::LeftTop => (Point2::xy(lb.x(), center.y()), Point2::xy(center.x(), rt.y())),
            Quadrant::RightTop => (center, rt),
            Quadrant::RightBottom => (Point2::xy(center.x(), lb.y()), Point2::xy(rt.x(), center.y())),
        }
    }

    pub fn child(&self, quadrant: Quadrant) -> Option<NodeId> {
        self.children[quadrant.index()]
    }

    /// Ids of the existing children.
    pub fn child_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.iter().flatten().copied()
    }
}
