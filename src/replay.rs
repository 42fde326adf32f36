//! Recorded sessions that drive the pipeline without live services.
//!
//! A session lists frames with, per subject, the head pose the transform
//! service reported and the raw gaze the network produced. Replaying it
//! exercises the exact gate, smoothing and publishing path of a live run.

use crate::{
    angles::{EulerAngles, RawGazeEstimate, SmoothedGazeEstimate, ThetaPhi},
    collaborators::{FrameSource, GazeEstimator, PoseLookup, Publisher},
    constants::{DEFAULT_CROP_HEIGHT, DEFAULT_CROP_WIDTH},
    error::{LookupError, PublishError},
    transform::{FrameNames, GazeTransform},
    types::{EyePair, FrameBatch, HeadPoseObservation, SubjectId, Timestamp},
    Error, Result,
};
use image::{Rgb, RgbImage};
use log::{info, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::Path;
use std::sync::Arc;

/// Size of the synthetic eye crops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropSize {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Default for CropSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_CROP_WIDTH,
            height: DEFAULT_CROP_HEIGHT,
        }
    }
}

/// Head pose as reported by the transform service
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecordedPose {
    /// Observation time, seconds
    pub timestamp: f64,
    /// Orientation about X, radians
    #[serde(default)]
    pub roll: f64,
    /// Orientation about Y, radians
    #[serde(default)]
    pub pitch: f64,
    /// Orientation about Z, radians
    #[serde(default)]
    pub yaw: f64,
}

/// One subject of a recorded frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecordedSubject {
    /// Latest head pose at frame time; absent when none was available
    #[serde(default)]
    pub head_pose: Option<RecordedPose>,
    /// Raw gaze the network produced
    pub gaze: ThetaPhi,
}

/// One recorded frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    /// Frame capture time, seconds
    pub timestamp: f64,
    /// Recorded data per subject id
    #[serde(default)]
    pub subjects: BTreeMap<u32, RecordedSubject>,
}

/// A full recorded session
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReplaySession {
    /// Size of the synthetic eye crops
    #[serde(default)]
    pub crop: CropSize,
    /// Frames in arrival order
    #[serde(default)]
    pub frames: Vec<RecordedFrame>,
}

impl ReplaySession {
    /// Load a session from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::IoError(e.to_string()))?;
        Self::from_yaml(&content)
    }

    /// Parse a session from YAML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid session
    pub fn from_yaml(content: &str) -> Result<Self> {
        let session: Self = serde_yaml::from_str(content)
            .map_err(|e| Error::ReplayError(format!("Failed to parse session: {e}")))?;
        session.validate()?;
        Ok(session)
    }

    /// Check crop size, timestamps and recorded values
    ///
    /// # Errors
    ///
    /// Returns an error on empty crops or non-finite values
    pub fn validate(&self) -> Result<()> {
        if self.crop.width == 0 || self.crop.height == 0 {
            return Err(Error::ReplayError("Crop size must be non-zero".to_string()));
        }
        for frame in &self.frames {
            if !frame.timestamp.is_finite() {
                return Err(Error::ReplayError(format!(
                    "Frame timestamp must be finite, got {}",
                    frame.timestamp
                )));
            }
            for (id, subject) in &frame.subjects {
                if let Some(pose) = &subject.head_pose {
                    let fields = [pose.timestamp, pose.roll, pose.pitch, pose.yaw];
                    if fields.iter().any(|value| !value.is_finite()) {
                        return Err(Error::ReplayError(format!(
                            "Subject {id} at {}s has a non-finite head pose",
                            frame.timestamp
                        )));
                    }
                }
                if !subject.gaze.is_finite() {
                    return Err(Error::ReplayError(format!(
                        "Subject {id} at {}s has a non-finite gaze",
                        frame.timestamp
                    )));
                }
            }
        }
        Ok(())
    }

    /// Split the session into the collaborators a pipeline needs
    #[must_use]
    pub fn into_parts(self) -> (ReplaySource, ReplayPoseLookup, ReplayEstimator) {
        let mut poses = HashMap::new();
        let mut gazes = HashMap::new();
        let mut frames = VecDeque::with_capacity(self.frames.len());

        for (index, recorded) in self.frames.into_iter().enumerate() {
            let mut batch = FrameBatch::new(Timestamp::from_secs_f64(recorded.timestamp));

            for (id, subject) in recorded.subjects {
                let id = SubjectId(id);
                if let Some(pose) = subject.head_pose {
                    poses.insert(
                        (index, id),
                        HeadPoseObservation {
                            orientation: EulerAngles::new(pose.roll, pose.pitch, pose.yaw).to_quaternion(),
                            timestamp: Timestamp::from_secs_f64(pose.timestamp),
                        },
                    );
                }
                gazes.insert((index, id), subject.gaze);
                batch.subjects.insert(id, synthetic_eyes(self.crop, id));
            }
            frames.push_back(batch);
        }

        let cursor = Cursor::default();
        (
            ReplaySource {
                frames,
                delivered: 0,
                cursor: Arc::clone(&cursor),
            },
            ReplayPoseLookup {
                poses,
                cursor: Arc::clone(&cursor),
                lookups: 0,
            },
            ReplayEstimator {
                gazes,
                cursor,
                calls: 0,
            },
        )
    }
}

/// Flat-coloured crops, one shade per subject
fn synthetic_eyes(size: CropSize, id: SubjectId) -> EyePair {
    #[allow(clippy::cast_possible_truncation)]
    let shade = 64 + (id.0 % 8) as u8 * 16;
    let crop = RgbImage::from_pixel(size.width, size.height, Rgb([shade, shade, shade]));
    EyePair {
        left: crop.clone(),
        right: crop,
    }
}

/// Recorded frame and subject a replay is currently at.
///
/// The source sets the frame when it delivers a batch and the lookup sets the
/// subject. Frames are processed one at a time and the pipeline always runs
/// the estimator right after a successful gate for the same subject, so the
/// estimator reads this to find its recording.
#[derive(Debug, Default, Clone, Copy)]
struct ReplayPosition {
    frame: Option<usize>,
    subject: Option<SubjectId>,
}

impl ReplayPosition {
    fn key(self) -> Option<(usize, SubjectId)> {
        Some((self.frame?, self.subject?))
    }
}

type Cursor = Arc<Mutex<ReplayPosition>>;

/// Recorded frames in arrival order
#[derive(Debug)]
pub struct ReplaySource {
    frames: VecDeque<FrameBatch>,
    delivered: usize,
    cursor: Cursor,
}

impl ReplaySource {
    /// Frames not yet delivered
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for ReplaySource {
    fn next_batch(&mut self) -> Option<FrameBatch> {
        let batch = self.frames.pop_front()?;
        *self.cursor.lock() = ReplayPosition {
            frame: Some(self.delivered),
            subject: None,
        };
        self.delivered += 1;
        Some(batch)
    }
}

/// Head poses as recorded per subject and frame
#[derive(Debug)]
pub struct ReplayPoseLookup {
    poses: HashMap<(usize, SubjectId), HeadPoseObservation>,
    cursor: Cursor,
    lookups: usize,
}

impl ReplayPoseLookup {
    /// Number of lookups served
    #[must_use]
    pub fn lookups(&self) -> usize {
        self.lookups
    }
}

impl PoseLookup for ReplayPoseLookup {
    fn latest(&mut self, subject: SubjectId, _as_of: Timestamp) -> std::result::Result<HeadPoseObservation, LookupError> {
        self.lookups += 1;
        let mut position = self.cursor.lock();
        position.subject = Some(subject);
        position
            .key()
            .and_then(|key| self.poses.get(&key))
            .copied()
            .ok_or(LookupError::NotAvailable(subject))
    }
}

/// Raw gaze as recorded per subject and frame
#[derive(Debug)]
pub struct ReplayEstimator {
    gazes: HashMap<(usize, SubjectId), RawGazeEstimate>,
    cursor: Cursor,
    calls: usize,
}

impl ReplayEstimator {
    /// Number of estimates produced
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl GazeEstimator for ReplayEstimator {
    fn estimate(&mut self, _right: &RgbImage, _left: &RgbImage, head: ThetaPhi) -> RawGazeEstimate {
        self.calls += 1;
        let current = self.cursor.lock().key();
        match current.and_then(|key| self.gazes.get(&key)) {
            Some(gaze) => *gaze,
            None => {
                warn!("No recorded gaze for {:?}, using head angles", current);
                head
            }
        }
    }
}

/// Publisher that keeps everything it is given
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    names: FrameNames,
    transforms: Vec<GazeTransform>,
    estimates: Vec<(SubjectId, SmoothedGazeEstimate, Timestamp)>,
    composites: Vec<(Timestamp, RgbImage)>,
    closed: bool,
}

impl RecordingPublisher {
    /// Create a publisher naming frames with `names`
    #[must_use]
    pub fn new(names: FrameNames) -> Self {
        Self {
            names,
            ..Self::default()
        }
    }

    /// Reject every further publish, as a torn-down topic would
    pub fn close(&mut self) {
        self.closed = true;
    }

    /// Published gaze transforms
    #[must_use]
    pub fn transforms(&self) -> &[GazeTransform] {
        &self.transforms
    }

    /// Published smoothed estimates
    #[must_use]
    pub fn estimates(&self) -> &[(SubjectId, SmoothedGazeEstimate, Timestamp)] {
        &self.estimates
    }

    /// Published composite images
    #[must_use]
    pub fn composites(&self) -> &[(Timestamp, RgbImage)] {
        &self.composites
    }
}

impl Publisher for RecordingPublisher {
    fn publish_transform(
        &mut self,
        subject: SubjectId,
        gaze: SmoothedGazeEstimate,
        timestamp: Timestamp,
    ) -> std::result::Result<(), PublishError> {
        if self.closed {
            return Err(PublishError::ChannelClosed(self.names.gaze_frame(subject)));
        }
        let transform = GazeTransform::from_estimate(&self.names, subject, gaze, timestamp);
        info!("{}", transform);
        self.transforms.push(transform);
        self.estimates.push((subject, gaze, timestamp));
        Ok(())
    }

    fn publish_visualization(&mut self, composite: &RgbImage, timestamp: Timestamp) -> std::result::Result<(), PublishError> {
        if self.closed {
            return Err(PublishError::ChannelClosed("/subjects/gazeimages".to_string()));
        }
        self.composites.push((timestamp, composite.clone()));
        Ok(())
    }
}
