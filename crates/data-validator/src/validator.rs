//! Data Validator for Landmarks and Thresholds

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Anything that exposes a 3-D coordinate
pub trait Coordinates {
    /// (x, y, z) with a missing z reported as 0
    fn coords(&self) -> [f32; 3];
}

impl Coordinates for [f32; 3] {
    fn coords(&self) -> [f32; 3] {
        *self
    }
}

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Eye aspect ratio threshold valid range
    pub ear_threshold_range: (f64, f64),
    /// Mouth aspect ratio threshold valid range
    pub mar_threshold_range: (f64, f64),
    /// Eye closure duration valid range (seconds)
    pub closure_duration_range: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            ear_threshold_range: (0.0, 1.0),
            mar_threshold_range: (0.0, 3.0),
            closure_duration_range: (0.1, 30.0),
        }
    }
}

/// Result of validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether all values are valid
    pub valid: bool,
    /// List of validation errors
    pub errors: Vec<ValidationError>,
    /// Number of fields validated
    pub fields_checked: usize,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid(fields_checked: usize) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            fields_checked,
        }
    }

    /// Create an invalid result with errors
    pub fn invalid(errors: Vec<ValidationError>, fields_checked: usize) -> Self {
        Self {
            valid: false,
            errors,
            fields_checked,
        }
    }

    /// First error, if any
    pub fn into_result(self) -> Result<(), ValidationError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Validator for landmark frames and detection thresholds
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if !value.is_finite() || value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Validate EAR threshold
    pub fn validate_ear_threshold(&self, value: f64) -> Result<(), ValidationError> {
        self.validate_range("ear_threshold", value, self.config.ear_threshold_range)
    }

    /// Validate MAR threshold
    pub fn validate_mar_threshold(&self, value: f64) -> Result<(), ValidationError> {
        self.validate_range("mar_threshold", value, self.config.mar_threshold_range)
    }

    /// Validate eye closure duration
    pub fn validate_closure_duration(&self, seconds: f64) -> Result<(), ValidationError> {
        self.validate_range(
            "closure_duration_sec",
            seconds,
            self.config.closure_duration_range,
        )
    }

    /// Validate one point's coordinates
    pub fn validate_point<P: Coordinates>(
        &self,
        index: usize,
        point: &P,
    ) -> Result<(), ValidationError> {
        for (axis, value) in ['x', 'y', 'z'].into_iter().zip(point.coords()) {
            if !value.is_finite() {
                return Err(ValidationError::NonFinite { index, axis });
            }
        }
        Ok(())
    }

    /// Check that every required index exists and is finite
    pub fn check_landmarks<P: Coordinates>(
        &self,
        points: &[P],
        required: &[usize],
    ) -> ValidationResult {
        let errors: Vec<ValidationError> = required
            .iter()
            .filter_map(|&index| match points.get(index) {
                None => Some(ValidationError::MissingLandmark {
                    index,
                    len: points.len(),
                }),
                Some(point) => self.validate_point(index, point).err(),
            })
            .collect();

        if errors.is_empty() {
            ValidationResult::valid(required.len())
        } else {
            debug!("Landmark validation failed with {} errors", errors.len());
            ValidationResult::invalid(errors, required.len())
        }
    }

    /// Validate landmarks, returning the first error
    pub fn validate_landmarks<P: Coordinates>(
        &self,
        points: &[P],
        required: &[usize],
    ) -> Result<(), ValidationError> {
        self.check_landmarks(points, required).into_result()
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
