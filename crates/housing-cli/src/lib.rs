//! Library components for the `housing` binary.

pub mod artifacts;
pub mod input;
pub mod logging;
