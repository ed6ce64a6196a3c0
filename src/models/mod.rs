mod point;
mod matrix;

pub use point::*;
pub use matrix::*;

#[cfg(test)]
mod matrix_tests;
