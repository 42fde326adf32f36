//! Freshness gate pairing an image frame with the latest head pose.

use crate::{
    angles::{head_angles, ThetaPhi},
    collaborators::PoseLookup,
    constants::DEFAULT_MAX_STALENESS_SECS,
    error::LookupError,
    types::{SubjectId, TimeDelta, Timestamp},
    Error, Result,
};
use std::fmt;
use std::time::Duration;

/// Why a subject was skipped for a frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// No usable head pose could be looked up
    LookupFailed(LookupError),
    /// The latest head pose is too old for the frame
    Stale {
        /// Frame time minus head pose time
        delta: TimeDelta,
    },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LookupFailed(err) => write!(f, "lookup failed: {err}"),
            Self::Stale { delta } => write!(f, "head pose stale by {delta}"),
        }
    }
}

/// Outcome of the freshness check for one subject and frame
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    /// Head pose is fresh; carries the head-relative angles
    Accept(ThetaPhi),
    /// Subject must be skipped for this frame
    Reject(RejectReason),
}

/// Staleness check between frame timestamps and head pose timestamps.
///
/// Stateless: every frame is evaluated on its own, nothing is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameCorrespondenceGate {
    max_staleness: Duration,
}

impl FrameCorrespondenceGate {
    /// Create a gate accepting head poses younger than `max_staleness`
    #[must_use]
    pub const fn new(max_staleness: Duration) -> Self {
        Self { max_staleness }
    }

    /// Create a gate from a staleness limit in seconds
    ///
    /// # Errors
    ///
    /// Returns an error if `secs` is not a positive finite number
    pub fn from_secs_f64(secs: f64) -> Result<Self> {
        if !secs.is_finite() || secs <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "Maximum staleness must be positive, got {secs}"
            )));
        }
        let max_staleness = Duration::try_from_secs_f64(secs)
            .map_err(|e| Error::InvalidInput(format!("Maximum staleness {secs} out of range: {e}")))?;
        Ok(Self::new(max_staleness))
    }

    /// Maximum accepted head pose age
    #[must_use]
    pub const fn max_staleness(&self) -> Duration {
        self.max_staleness
    }

    /// Check the latest head pose of `subject` against a frame stamped `frame_time`.
    ///
    /// Accepts only when `frame_time - pose_time` is strictly below the limit.
    pub fn evaluate<L>(&self, lookup: &mut L, subject: SubjectId, frame_time: Timestamp) -> GateDecision
    where
        L: PoseLookup + ?Sized,
    {
        let pose = match lookup.latest(subject, frame_time) {
            Ok(pose) => pose,
            Err(err) => return GateDecision::Reject(RejectReason::LookupFailed(err)),
        };

        let delta = frame_time - pose.timestamp;
        if delta.exceeds_or_equals(self.max_staleness) {
            return GateDecision::Reject(RejectReason::Stale { delta });
        }

        GateDecision::Accept(head_angles(&pose.orientation))
    }
}

impl Default for FrameCorrespondenceGate {
    fn default() -> Self {
        Self::new(Duration::from_secs_f64(DEFAULT_MAX_STALENESS_SECS))
    }
}
