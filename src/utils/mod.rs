//! The `utils` module provides definitions shared across `petnet`:
//! error types and logging initialisation.

pub mod error;
pub mod logging;

pub use error::{DescriptorError, TransportError};
