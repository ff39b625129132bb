//! Face mesh landmark input

use data_validator::{Coordinates, ValidationError, Validator};
use serde::{Deserialize, Serialize};

/// Left eye contour: corner, two upper, corner, two lower
pub const LEFT_EYE: [usize; 6] = [33, 160, 158, 133, 153, 144];
/// Right eye contour, same ordering as [`LEFT_EYE`]
pub const RIGHT_EYE: [usize; 6] = [362, 385, 387, 263, 373, 380];
/// Mouth: left corner, right corner, upper/lower lip pairs
pub const MOUTH: [usize; 6] = [61, 291, 0, 17, 146, 91];

pub const NOSE_TIP: usize = 1;
pub const CHIN: usize = 152;
pub const LEFT_EYE_CORNER: usize = 33;
pub const RIGHT_EYE_CORNER: usize = 263;

/// Every index the engine reads from a frame
pub const REQUIRED_INDICES: [usize; 20] = [
    33, 160, 158, 133, 153, 144, // left eye
    362, 385, 387, 263, 373, 380, // right eye
    61, 291, 0, 17, 146, 91, // mouth
    NOSE_TIP, CHIN,
];

/// Normalized landmark coordinate
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub x: f32,
    pub y: f32,
    /// Depth; providers without depth omit it
    #[serde(default)]
    pub z: f32,
}

impl LandmarkPoint {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Point without depth
    pub fn flat(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// 3-D Euclidean distance
    pub fn distance(&self, other: &LandmarkPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl Coordinates for LandmarkPoint {
    fn coords(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

/// The subset of a face mesh the metrics are computed from
#[derive(Debug, Clone, PartialEq)]
pub struct FaceGeometry {
    pub left_eye: [LandmarkPoint; 6],
    pub right_eye: [LandmarkPoint; 6],
    pub mouth: [LandmarkPoint; 6],
    pub nose_tip: LandmarkPoint,
    pub chin: LandmarkPoint,
    pub left_eye_corner: LandmarkPoint,
    pub right_eye_corner: LandmarkPoint,
}

impl FaceGeometry {
    /// Validate and pick the consumed landmarks out of a full mesh
    pub fn from_landmarks(
        points: &[LandmarkPoint],
        validator: &Validator,
    ) -> Result<Self, ValidationError> {
        validator.validate_landmarks(points, &REQUIRED_INDICES)?;

        let pick = |indices: [usize; 6]| indices.map(|i| points[i]);

        Ok(Self {
            left_eye: pick(LEFT_EYE),
            right_eye: pick(RIGHT_EYE),
            mouth: pick(MOUTH),
            nose_tip: points[NOSE_TIP],
            chin: points[CHIN],
            left_eye_corner: points[LEFT_EYE_CORNER],
            right_eye_corner: points[RIGHT_EYE_CORNER],
        })
    }
}
