//! Utility layer - error types shared by every other layer

pub mod errors;

pub use errors::*;
