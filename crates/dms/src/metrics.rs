//! Per-frame facial metrics: eye/mouth aspect ratios and head pose
//!
//! Everything here is a pure function of the landmark positions. No history is read.

use crate::landmarks::{FaceGeometry, LandmarkPoint};
use crate::DmsError;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Reference widths below this reject the frame instead of dividing through
pub const MIN_REFERENCE_WIDTH: f32 = 1e-6;

/// Head pose (Euler-like angles)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadPose {
    /// Pitch (up-down tilt) in degrees, positive looking down
    pub pitch: f32,
    /// Yaw as nose offset from the eye midpoint, scaled by 100 (not an angle)
    pub yaw: f32,
    /// Roll (side tilt) in degrees
    pub roll: f32,
}

/// Scalar metrics for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMetrics {
    pub ear: f32,
    pub mar: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
    pub timestamp: Instant,
}

impl FrameMetrics {
    /// Compute all metrics for a face
    pub fn compute(face: &FaceGeometry, timestamp: Instant) -> Result<Self, DmsError> {
        let left = eye_aspect_ratio(&face.left_eye)?;
        let right = eye_aspect_ratio(&face.right_eye)?;
        let mar = mouth_aspect_ratio(&face.mouth)?;
        let pose = head_pose(
            &face.nose_tip,
            &face.chin,
            &face.left_eye_corner,
            &face.right_eye_corner,
        );

        Ok(Self {
            ear: (left + right) / 2.0,
            mar,
            pitch: pose.pitch,
            yaw: pose.yaw,
            roll: pose.roll,
            timestamp,
        })
    }

    pub fn head_pose(&self) -> HeadPose {
        HeadPose {
            pitch: self.pitch,
            yaw: self.yaw,
            roll: self.roll,
        }
    }
}

/// Distances that overflow `f32` are as unusable as a collapsed width
fn ratio(feature: &'static str, v1: f32, v2: f32, width: f32) -> Result<f32, DmsError> {
    if !width.is_finite() || width < MIN_REFERENCE_WIDTH {
        return Err(DmsError::DegenerateGeometry { feature, width });
    }
    let value = (v1 + v2) / (2.0 * width);
    if !value.is_finite() {
        return Err(DmsError::DegenerateGeometry { feature, width });
    }
    Ok(value)
}

/// Eye aspect ratio over six contour points (corner, top, top, corner, bottom, bottom)
pub fn eye_aspect_ratio(points: &[LandmarkPoint; 6]) -> Result<f32, DmsError> {
    let v1 = points[1].distance(&points[5]);
    let v2 = points[2].distance(&points[4]);
    let h = points[0].distance(&points[3]);
    ratio("eye", v1, v2, h)
}

/// Mouth aspect ratio over (left corner, right corner, two vertical lip pairs)
pub fn mouth_aspect_ratio(points: &[LandmarkPoint; 6]) -> Result<f32, DmsError> {
    let v1 = points[2].distance(&points[3]);
    let v2 = points[4].distance(&points[5]);
    let h = points[0].distance(&points[1]);
    ratio("mouth", v1, v2, h)
}

/// Head pose from nose tip, chin and outer eye corners
pub fn head_pose(
    nose_tip: &LandmarkPoint,
    chin: &LandmarkPoint,
    left_eye: &LandmarkPoint,
    right_eye: &LandmarkPoint,
) -> HeadPose {
    let pitch = (chin.y - nose_tip.y).atan2(chin.z - nose_tip.z).to_degrees();

    let mid_eye_x = (left_eye.x + right_eye.x) / 2.0;
    let yaw = (nose_tip.x - mid_eye_x) * 100.0;

    let roll = (right_eye.y - left_eye.y)
        .atan2(right_eye.x - left_eye.x)
        .to_degrees();

    HeadPose { pitch, yaw, roll }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn p(x: f32, y: f32) -> LandmarkPoint {
        LandmarkPoint::flat(x, y)
    }

    /// Eye of width 0.1 with both vertical pairs `open` apart
    fn eye(open: f32) -> [LandmarkPoint; 6] {
        [
            p(0.0, 0.0),
            p(0.03, -open / 2.0),
            p(0.07, -open / 2.0),
            p(0.1, 0.0),
            p(0.07, open / 2.0),
            p(0.03, open / 2.0),
        ]
    }

    #[test]
    fn test_ear_open_eye() {
        let ear = eye_aspect_ratio(&eye(0.03)).unwrap();
        assert!((ear - 0.3).abs() < 1e-5);
    }

    #[test]
    fn test_ear_closed_eye_is_zero() {
        let ear = eye_aspect_ratio(&eye(0.0)).unwrap();
        assert_eq!(ear, 0.0);
    }

    #[test]
    fn test_degenerate_width_rejected() {
        let points = [p(0.5, 0.5); 6];
        assert!(matches!(
            eye_aspect_ratio(&points),
            Err(DmsError::DegenerateGeometry { feature: "eye", .. })
        ));
        assert!(matches!(
            mouth_aspect_ratio(&points),
            Err(DmsError::DegenerateGeometry { feature: "mouth", .. })
        ));
    }

    #[test]
    fn test_overflowing_distances_rejected() {
        // Finite coordinates whose squared distances overflow
        let mut wide = eye(0.03);
        wide[0].x = 3.0e38;
        wide[1].x = 3.0e38;
        assert!(matches!(
            eye_aspect_ratio(&wide),
            Err(DmsError::DegenerateGeometry { feature: "eye", .. })
        ));

        let mut tall = eye(0.03);
        tall[1].y = -3.0e38;
        tall[5].y = 3.0e38;
        assert!(matches!(
            eye_aspect_ratio(&tall),
            Err(DmsError::DegenerateGeometry { feature: "eye", .. })
        ));
    }

    proptest! {
        #[test]
        fn ear_is_scale_invariant(open in 0.0f32..0.08, scale in 0.5f32..20.0) {
            let base = eye_aspect_ratio(&eye(open)).unwrap();
            let scaled = eye(open).map(|pt| p(pt.x * scale, pt.y * scale));
            let ear = eye_aspect_ratio(&scaled).unwrap();
            prop_assert!(ear.is_finite());
            prop_assert!((ear - base).abs() < 1e-4, "{} vs {}", ear, base);
        }
    }

    #[test]
    fn test_mar() {
        // width 0.2, both lip pairs 0.1 apart
        let mouth = [
            p(0.0, 0.0),
            p(0.2, 0.0),
            p(0.1, -0.05),
            p(0.1, 0.05),
            p(0.05, -0.05),
            p(0.05, 0.05),
        ];
        let mar = mouth_aspect_ratio(&mouth).unwrap();
        assert!((mar - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_head_pose() {
        let nose = LandmarkPoint::new(0.52, 0.5, 0.0);
        let chin = LandmarkPoint::new(0.5, 0.6, 0.1);
        let left = p(0.4, 0.4);
        let right = p(0.6, 0.4);

        let pose = head_pose(&nose, &chin, &left, &right);
        assert!((pose.pitch - 45.0).abs() < 1e-3);
        assert!((pose.yaw - 2.0).abs() < 1e-3);
        assert!(pose.roll.abs() < 1e-3);

        // Right corner lower than left tilts the head
        let tilted = head_pose(&nose, &chin, &left, &p(0.6, 0.6));
        assert!((tilted.roll - 45.0).abs() < 1e-3);
    }
}
