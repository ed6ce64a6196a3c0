use std::sync::atomic::{AtomicU64, Ordering};

/// An `f64` that can be shared between threads, stored as its bit pattern.
///
/// Used for the parameters the UI tunes while workers are running. Readers
/// see the new value from their next pass onwards.
#[derive(Debug, Default)]
pub struct AtomicF64 {
    bits: AtomicU64,
}

impl AtomicF64 {
    pub fn new(value: f64) -> Self {
        Self { bits: AtomicU64::new(value.to_bits()) }
    }

    pub fn load(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }

    pub fn store(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::Relaxed);
    }
}
