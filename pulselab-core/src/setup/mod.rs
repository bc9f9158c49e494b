//! Rule-gated trade-setup generation.

pub mod generator;

pub use generator::{generate, SetupContext};
