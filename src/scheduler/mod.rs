mod pooled_worker;
mod pause_gate;
mod double_buffer;
mod subdivision;
mod processor;

pub use pooled_worker::*;
pub use pause_gate::*;
pub use double_buffer::*;
pub use subdivision::*;
pub use processor::*;

#[cfg(test)]
mod subdivision_tests;
#[cfg(test)]
mod processor_tests;
