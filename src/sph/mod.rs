mod kernel;
mod estimators;
mod gravity;
mod integrator;

pub use kernel::*;
pub use estimators::*;
pub use gravity::*;
pub use integrator::*;
