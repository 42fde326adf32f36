//! Core data types shared by the gate, the smoothing buffers and the pipeline.

use crate::constants::NANOS_PER_SEC;
use image::RgbImage;
use nalgebra::UnitQuaternion;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Sub;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Identifier of a tracked subject, stable while the subject is tracked
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(pub u32);

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SubjectId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Point in time with nanosecond resolution.
///
/// Frame stamps and head pose stamps share this clock, so the two can be
/// subtracted directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp {
    nanos: i64,
}

impl Timestamp {
    /// Create a timestamp from nanoseconds since the clock origin
    #[must_use]
    pub const fn from_nanos(nanos: i64) -> Self {
        Self { nanos }
    }

    /// Create a timestamp from seconds since the clock origin
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_secs_f64(secs: f64) -> Self {
        Self {
            nanos: (secs * NANOS_PER_SEC as f64).round() as i64,
        }
    }

    /// Current wall-clock time
    #[must_use]
    pub fn now() -> Self {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO);
        Self {
            nanos: i64::try_from(since_epoch.as_nanos()).unwrap_or(i64::MAX),
        }
    }

    /// Nanoseconds since the clock origin
    #[must_use]
    pub const fn as_nanos(self) -> i64 {
        self.nanos
    }

    /// Seconds since the clock origin
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_secs_f64(self) -> f64 {
        self.nanos as f64 / NANOS_PER_SEC as f64
    }
}

impl Sub for Timestamp {
    type Output = TimeDelta;

    fn sub(self, rhs: Self) -> TimeDelta {
        TimeDelta {
            nanos: self.nanos.saturating_sub(rhs.nanos),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}s", self.as_secs_f64())
    }
}

/// Signed difference between two timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeDelta {
    nanos: i64,
}

impl TimeDelta {
    /// Signed nanoseconds
    #[must_use]
    pub const fn as_nanos(self) -> i64 {
        self.nanos
    }

    /// Signed seconds
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_secs_f64(self) -> f64 {
        self.nanos as f64 / NANOS_PER_SEC as f64
    }

    /// True when this delta is at least `duration` long
    #[must_use]
    pub fn exceeds_or_equals(self, duration: Duration) -> bool {
        i128::from(self.nanos) >= i128::try_from(duration.as_nanos()).unwrap_or(i128::MAX)
    }
}

impl fmt::Display for TimeDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.as_secs_f64())
    }
}

/// Latest head pose known for a subject, as reported by the transform service
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadPoseObservation {
    /// Head orientation in the camera frame
    pub orientation: UnitQuaternion<f64>,
    /// Time the pose was observed
    pub timestamp: Timestamp,
}

/// Left and right eye crops of one subject
#[derive(Debug, Clone)]
pub struct EyePair {
    /// Left eye crop
    pub left: RgbImage,
    /// Right eye crop
    pub right: RgbImage,
}

/// One incoming multi-subject frame.
///
/// Subjects are kept sorted by id so a batch is always processed, and its
/// composite image assembled, in the same order.
#[derive(Debug, Clone)]
pub struct FrameBatch {
    /// Capture time of the frame
    pub timestamp: Timestamp,
    /// Eye crops per subject
    pub subjects: BTreeMap<SubjectId, EyePair>,
}

impl FrameBatch {
    /// Create an empty batch
    #[must_use]
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            subjects: BTreeMap::new(),
        }
    }

    /// Add a subject's eye crops, builder style
    #[must_use]
    pub fn with_subject(mut self, id: SubjectId, eyes: EyePair) -> Self {
        self.subjects.insert(id, eyes);
        self
    }

    /// Number of subjects in the batch
    #[must_use]
    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    /// Whether the batch carries no subject
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}
