mod particle;
mod sampling;

pub use particle::*;
pub use sampling::*;
