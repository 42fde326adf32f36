//! Helper functions and test doubles shared by the integration tests

#![allow(dead_code)]

use gaze_smoothing::{
    angles::{RawGazeEstimate, SmoothedGazeEstimate, ThetaPhi},
    collaborators::{GazeEstimator, PoseLookup, Publisher},
    error::{LookupError, PublishError},
    types::{EyePair, FrameBatch, HeadPoseObservation, SubjectId, Timestamp},
};
use image::{Rgb, RgbImage};
use nalgebra::UnitQuaternion;
use std::collections::{HashMap, VecDeque};

/// Create flat eye crops of the given size
pub fn create_test_eyes(width: u32, height: u32) -> EyePair {
    let crop = RgbImage::from_pixel(width, height, Rgb([90, 90, 90]));
    EyePair {
        left: crop.clone(),
        right: crop,
    }
}

/// Create a frame holding `ids` with default-sized crops
pub fn create_test_batch(secs: f64, ids: &[u32]) -> FrameBatch {
    ids.iter().fold(FrameBatch::new(Timestamp::from_secs_f64(secs)), |batch, &id| {
        batch.with_subject(SubjectId(id), create_test_eyes(60, 36))
    })
}

/// Head pose lookup answering from a per-subject table
#[derive(Default)]
pub struct ScriptedLookup {
    /// Pose age relative to the queried frame, seconds, per subject
    pub ages: HashMap<SubjectId, f64>,
    /// Subjects whose lookups fail
    pub failures: HashMap<SubjectId, LookupError>,
    /// Number of lookups served
    pub calls: usize,
}

impl ScriptedLookup {
    /// Subject's pose is always `age` seconds older than the frame
    pub fn with_age(mut self, id: u32, age: f64) -> Self {
        self.ages.insert(SubjectId(id), age);
        self
    }

    /// Subject's lookups fail with `err`
    pub fn with_failure(mut self, id: u32, err: LookupError) -> Self {
        self.failures.insert(SubjectId(id), err);
        self
    }
}

impl PoseLookup for ScriptedLookup {
    fn latest(&mut self, subject: SubjectId, as_of: Timestamp) -> Result<HeadPoseObservation, LookupError> {
        self.calls += 1;
        if let Some(err) = self.failures.get(&subject) {
            return Err(err.clone());
        }
        let age = self.ages.get(&subject).ok_or(LookupError::NotAvailable(subject))?;
        Ok(HeadPoseObservation {
            orientation: UnitQuaternion::from_euler_angles(0.0, 0.0, std::f64::consts::PI),
            timestamp: Timestamp::from_secs_f64(as_of.as_secs_f64() - age),
        })
    }
}

/// Estimator returning queued values, then repeating the last one
#[derive(Default)]
pub struct QueuedEstimator {
    /// Values still to return
    pub queue: VecDeque<RawGazeEstimate>,
    /// Value returned once the queue is empty
    pub fallback: RawGazeEstimate,
    /// Number of estimates produced
    pub calls: usize,
}

impl QueuedEstimator {
    /// Estimator returning `values` in order
    pub fn new(values: &[(f64, f64)]) -> Self {
        Self {
            queue: values.iter().map(|&(theta, phi)| ThetaPhi::new(theta, phi)).collect(),
            fallback: ThetaPhi::default(),
            calls: 0,
        }
    }
}

impl GazeEstimator for QueuedEstimator {
    fn estimate(&mut self, _right: &RgbImage, _left: &RgbImage, _head: ThetaPhi) -> RawGazeEstimate {
        self.calls += 1;
        if let Some(next) = self.queue.pop_front() {
            self.fallback = next;
        }
        self.fallback
    }
}

/// Publisher collecting every call
#[derive(Default)]
pub struct CollectingPublisher {
    /// Published transforms
    pub transforms: Vec<(SubjectId, SmoothedGazeEstimate, Timestamp)>,
    /// Dimensions of published composites
    pub composites: Vec<(u32, u32)>,
}

impl Publisher for CollectingPublisher {
    fn publish_transform(
        &mut self,
        subject: SubjectId,
        gaze: SmoothedGazeEstimate,
        timestamp: Timestamp,
    ) -> Result<(), PublishError> {
        self.transforms.push((subject, gaze, timestamp));
        Ok(())
    }

    fn publish_visualization(&mut self, composite: &RgbImage, _timestamp: Timestamp) -> Result<(), PublishError> {
        self.composites.push(composite.dimensions());
        Ok(())
    }
}

/// Assert two angle pairs agree within `tol`
pub fn assert_angles_close(actual: ThetaPhi, expected: ThetaPhi, tol: f64) {
    assert!(
        (actual.theta - expected.theta).abs() < tol && (actual.phi - expected.phi).abs() < tol,
        "expected {expected}, got {actual}"
    );
}
