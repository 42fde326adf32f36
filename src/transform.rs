//! Spatial transform published for each smoothed gaze estimate.

use crate::{
    angles::{euler_from_phi_theta, SmoothedGazeEstimate},
    constants::{
        DEFAULT_CAMERA_FRAME, DEFAULT_TF_PREFIX, GAZE_ORIGIN_OFFSET_Z, HEAD_POSE_FRAME_STEM,
        WORLD_GAZE_FRAME_STEM,
    },
    types::{SubjectId, Timestamp},
};
use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Naming of the transform frames the pipeline reads and writes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameNames {
    /// Prefix shared by head pose and gaze frames
    pub tf_prefix: String,
    /// Camera frame head poses are expressed in
    pub camera_frame: String,
}

impl FrameNames {
    /// Head pose frame of `subject`
    #[must_use]
    pub fn head_pose_frame(&self, subject: SubjectId) -> String {
        format!("{}/{}{}", self.tf_prefix, HEAD_POSE_FRAME_STEM, subject)
    }

    /// Gaze frame of `subject`
    #[must_use]
    pub fn gaze_frame(&self, subject: SubjectId) -> String {
        format!("{}/{}{}", self.tf_prefix, WORLD_GAZE_FRAME_STEM, subject)
    }
}

impl Default for FrameNames {
    fn default() -> Self {
        Self {
            tf_prefix: DEFAULT_TF_PREFIX.to_string(),
            camera_frame: DEFAULT_CAMERA_FRAME.to_string(),
        }
    }
}

/// Gaze direction of one subject as a child frame of its head pose
#[derive(Debug, Clone, PartialEq)]
pub struct GazeTransform {
    /// Head pose frame
    pub parent_frame: String,
    /// Gaze frame
    pub child_frame: String,
    /// Offset from the head pose origin, meters
    pub translation: Vector3<f64>,
    /// Gaze orientation relative to the head
    pub rotation: UnitQuaternion<f64>,
    /// Stamp of the frame the estimate came from
    pub timestamp: Timestamp,
}

impl GazeTransform {
    /// Build the transform for a smoothed estimate.
    ///
    /// The gaze frame sits 5 cm above the head pose origin (nose tip).
    #[must_use]
    pub fn from_estimate(
        names: &FrameNames,
        subject: SubjectId,
        gaze: SmoothedGazeEstimate,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            parent_frame: names.head_pose_frame(subject),
            child_frame: names.gaze_frame(subject),
            translation: Vector3::new(0.0, 0.0, GAZE_ORIGIN_OFFSET_Z),
            rotation: euler_from_phi_theta(gaze).to_quaternion(),
            timestamp,
        }
    }
}

impl fmt::Display for GazeTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let q = self.rotation.quaternion();
        write!(
            f,
            "{} -> {} @ {}: t=({:.3}, {:.3}, {:.3}) q=({:.4}, {:.4}, {:.4}, {:.4})",
            self.parent_frame,
            self.child_frame,
            self.timestamp,
            self.translation.x,
            self.translation.y,
            self.translation.z,
            q.i,
            q.j,
            q.k,
            q.w
        )
    }
}
