pub mod errors;
mod constants;
mod constants_config;
mod logging;
mod atomic;

pub use errors::SimulationError;
pub use constants::*;
pub use constants_config::*;
pub use logging::init_logging;
pub use atomic::AtomicF64;
