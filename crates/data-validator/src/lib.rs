//! Data Validation
//!
//! Provides landmark sanity checks and threshold range checking for the fatigue engine.
//! Frames and configuration are validated at the boundary so the per-frame path never
//! sees NaN, infinity or out-of-range thresholds.

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{Coordinates, ValidationConfig, ValidationResult, Validator};
