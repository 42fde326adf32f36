//! Conversions between head orientations, Euler angles and spherical gaze angles.
//!
//! Gaze estimates are expressed as `(theta, phi)` in radians: `theta` is the
//! elevation and `phi` the azimuth relative to the subject's head.

use nalgebra::UnitQuaternion;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// Spherical `(theta, phi)` pair in radians
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ThetaPhi {
    /// Elevation angle
    pub theta: f64,
    /// Azimuth angle
    pub phi: f64,
}

impl ThetaPhi {
    /// Create a new angle pair
    #[must_use]
    pub const fn new(theta: f64, phi: f64) -> Self {
        Self { theta, phi }
    }

    /// Whether both components are finite
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.theta.is_finite() && self.phi.is_finite()
    }
}

impl fmt::Display for ThetaPhi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.4}, {:.4}]", self.theta, self.phi)
    }
}

/// Single-frame gaze estimate produced by the estimator
pub type RawGazeEstimate = ThetaPhi;

/// Weighted average over a full smoothing window
pub type SmoothedGazeEstimate = ThetaPhi;

/// Static-axis XYZ Euler angles in radians
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EulerAngles {
    /// Rotation about X
    pub roll: f64,
    /// Rotation about Y
    pub pitch: f64,
    /// Rotation about Z
    pub yaw: f64,
}

impl EulerAngles {
    /// Create a new set of Euler angles
    #[must_use]
    pub const fn new(roll: f64, pitch: f64, yaw: f64) -> Self {
        Self { roll, pitch, yaw }
    }

    /// Euler angles of a unit quaternion
    #[must_use]
    pub fn from_quaternion(q: &UnitQuaternion<f64>) -> Self {
        let (roll, pitch, yaw) = q.euler_angles();
        Self { roll, pitch, yaw }
    }

    /// Unit quaternion of these Euler angles
    #[must_use]
    pub fn to_quaternion(self) -> UnitQuaternion<f64> {
        UnitQuaternion::from_euler_angles(self.roll, self.pitch, self.yaw)
    }
}

/// Convert a head orientation into Euler angles with yaw turned to face the camera.
///
/// Head poses are published looking away from the camera, so yaw is rotated
/// by π and wrapped back into (-π, π].
#[must_use]
pub fn limit_yaw(orientation: &UnitQuaternion<f64>) -> EulerAngles {
    let mut euler = EulerAngles::from_quaternion(orientation);
    euler.yaw += PI;
    if euler.yaw > PI {
        euler.yaw -= 2.0 * PI;
    }
    euler
}

/// Head-relative `(theta, phi)` of a head pose
#[must_use]
pub fn phi_theta_from_euler(euler: EulerAngles) -> ThetaPhi {
    ThetaPhi {
        theta: -euler.pitch,
        phi: -euler.yaw,
    }
}

/// Euler angles of a gaze direction, used for the published gaze transform
#[must_use]
pub fn euler_from_phi_theta(gaze: ThetaPhi) -> EulerAngles {
    EulerAngles {
        roll: 0.0,
        pitch: -gaze.theta,
        yaw: -gaze.phi,
    }
}

/// Head-relative angles for a head orientation
#[must_use]
pub fn head_angles(orientation: &UnitQuaternion<f64>) -> ThetaPhi {
    phi_theta_from_euler(limit_yaw(orientation))
}

/// End point of a gaze line of `length` pixels starting at `center`
#[must_use]
pub fn gaze_endpoint(gaze: ThetaPhi, center: (f64, f64), length: f64) -> (f64, f64) {
    let x = -length * gaze.theta.cos() * gaze.phi.sin() + center.0;
    let y = -length * gaze.theta.sin() + center.1;
    (x, y)
}
