use std::fmt;
use std::error::Error;
use std::io;

/// Represents errors that can occur while building or running a simulation.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// Indicates an invalid mass value (e.g., negative or non-finite mass).
    InvalidMass,
    /// Indicates an invalid smoothing radius (e.g., negative or non-finite radius).
    InvalidRadius,
    /// Indicates an invalid time step (must be finite and positive).
    InvalidTimeStep,
    /// Indicates an invalid domain size (must be finite and positive).
    InvalidDomainSize,
    /// Indicates an invalid coefficient value (e.g., non-positive heat capacity).
    InvalidCoefficient,
    /// Indicates a thread count of zero.
    InvalidThreadCount,
    /// A worker thread could not be spawned.
    ThreadSpawn(String),
    /// The operation needs the worker threads to be stopped.
    ThreadsRunning,
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SimulationError::InvalidMass => write!(f, "Invalid mass value"),
            SimulationError::InvalidRadius => write!(f, "Invalid radius value"),
            SimulationError::InvalidTimeStep => write!(f, "Invalid time step"),
            SimulationError::InvalidDomainSize => write!(f, "Invalid domain size"),
            SimulationError::InvalidCoefficient => write!(f, "Invalid coefficient value"),
            SimulationError::InvalidThreadCount => write!(f, "Thread count must be at least 1"),
            SimulationError::ThreadSpawn(msg) => write!(f, "Failed to spawn worker thread: {}", msg),
            SimulationError::ThreadsRunning => write!(f, "Worker threads are running"),
        }
    }
}

impl Error for SimulationError {}

impl From<io::Error> for SimulationError {
    fn from(err: io::Error) -> Self {
        SimulationError::ThreadSpawn(err.to_string())
    }
}
