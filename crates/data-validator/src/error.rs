//! Validation Error Types

use thiserror::Error;

/// Errors during data validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Coordinate is NaN or infinite
    #[error("Landmark {index} has non-finite {axis} coordinate")]
    NonFinite { index: usize, axis: char },

    /// Landmark collection too short for a required index
    #[error("Landmark {index} missing (collection has {len} points)")]
    MissingLandmark { index: usize, len: usize },
}
