mod geometry;
mod node;
mod quad_tree;
mod draw;

pub use geometry::*;
pub use node::*;
pub use quad_tree::*;
pub use draw::*;

#[cfg(test)]
mod draw_tests;
