//! Capabilities the pipeline depends on but does not implement.
//!
//! Head pose tracking, gaze inference, frame transport and publishing are
//! provided by the host application and injected into
//! [`GazePipeline`](crate::pipeline::GazePipeline), so each can be replaced by
//! a deterministic double in tests.

use crate::{
    angles::{RawGazeEstimate, SmoothedGazeEstimate, ThetaPhi},
    error::{LookupError, PublishError},
    types::{FrameBatch, HeadPoseObservation, SubjectId, Timestamp},
};
use image::RgbImage;

/// Source of head pose observations
pub trait PoseLookup {
    /// Latest head pose of `subject` available at `as_of`
    ///
    /// # Errors
    ///
    /// Returns a [`LookupError`] when no pose exists or the transform
    /// service cannot answer right now
    fn latest(&mut self, subject: SubjectId, as_of: Timestamp) -> Result<HeadPoseObservation, LookupError>;
}

/// Two-eye gaze estimation network
pub trait GazeEstimator {
    /// Estimate head-relative gaze from both eye crops and the head angles
    fn estimate(&mut self, right: &RgbImage, left: &RgbImage, head: ThetaPhi) -> RawGazeEstimate;
}

/// Sink for smoothed gaze results
pub trait Publisher {
    /// Publish the smoothed gaze of `subject` for the frame stamped `timestamp`
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::ChannelClosed`] when the sink is gone
    fn publish_transform(
        &mut self,
        subject: SubjectId,
        gaze: SmoothedGazeEstimate,
        timestamp: Timestamp,
    ) -> Result<(), PublishError>;

    /// Publish the composite visualization of one frame
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::ChannelClosed`] when the sink is gone
    fn publish_visualization(&mut self, composite: &RgbImage, timestamp: Timestamp) -> Result<(), PublishError>;
}

/// Stream of incoming frames, delivered one at a time
pub trait FrameSource {
    /// Next frame, or `None` once the stream has ended
    fn next_batch(&mut self) -> Option<FrameBatch>;
}

impl<T: PoseLookup + ?Sized> PoseLookup for Box<T> {
    fn latest(&mut self, subject: SubjectId, as_of: Timestamp) -> Result<HeadPoseObservation, LookupError> {
        (**self).latest(subject, as_of)
    }
}

impl<T: GazeEstimator + ?Sized> GazeEstimator for Box<T> {
    fn estimate(&mut self, right: &RgbImage, left: &RgbImage, head: ThetaPhi) -> RawGazeEstimate {
        (**self).estimate(right, left, head)
    }
}

impl<T: Publisher + ?Sized> Publisher for Box<T> {
    fn publish_transform(
        &mut self,
        subject: SubjectId,
        gaze: SmoothedGazeEstimate,
        timestamp: Timestamp,
    ) -> Result<(), PublishError> {
        (**self).publish_transform(subject, gaze, timestamp)
    }

    fn publish_visualization(&mut self, composite: &RgbImage, timestamp: Timestamp) -> Result<(), PublishError> {
        (**self).publish_visualization(composite, timestamp)
    }
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn next_batch(&mut self) -> Option<FrameBatch> {
        (**self).next_batch()
    }
}
