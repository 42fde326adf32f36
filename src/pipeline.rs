//! Per-frame orchestration: gate, estimate, smooth, publish.
//!
//! For every subject of an incoming frame the pipeline
//! 1. makes sure the subject has a smoothing buffer,
//! 2. checks the head pose freshness,
//! 3. runs the gaze estimator on the eye crops,
//! 4. pushes the raw estimate into the subject's buffer,
//! 5. publishes the smoothed estimate once the window is full.
//!
//! Subjects that emitted in a frame are drawn into one composite image which
//! is published after the whole frame has been processed.

use crate::{
    angles::SmoothedGazeEstimate,
    collaborators::{GazeEstimator, PoseLookup, Publisher},
    constants::DEFAULT_GAZE_LINE_LENGTH,
    diagnostics::EmissionStats,
    error::PublishError,
    gate::{FrameCorrespondenceGate, GateDecision, RejectReason},
    registry::SubjectRegistry,
    smoothing::WeightScheme,
    types::{EyePair, FrameBatch, SubjectId, Timestamp},
    visualization::{annotate_eye, CompositeBuilder},
};
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::time::Duration;

/// Pipeline behaviour beyond the gate and the weighting
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    /// Build and publish the composite visualization
    pub visualize: bool,
    /// Length of the gaze line drawn on eye crops, pixels
    pub line_length: f32,
    /// Drop subjects not seen for this long; `None` keeps them forever
    pub evict_after: Option<Duration>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            visualize: true,
            line_length: DEFAULT_GAZE_LINE_LENGTH,
            evict_after: None,
        }
    }
}

/// What happened to one subject in one frame
#[derive(Debug, Clone, PartialEq)]
pub enum SubjectOutcome {
    /// Skipped by the freshness gate; buffer untouched
    Rejected(RejectReason),
    /// Estimate buffered; the window holds this many samples and is not full yet
    Buffered(usize),
    /// Window full; carries the smoothed estimate
    Emitted(SmoothedGazeEstimate),
}

impl SubjectOutcome {
    /// The smoothed estimate, if one was emitted
    #[must_use]
    pub fn emitted(&self) -> Option<SmoothedGazeEstimate> {
        match self {
            Self::Emitted(gaze) => Some(*gaze),
            _ => None,
        }
    }
}

/// Summary of one processed frame
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    /// Stamp of the processed frame
    pub timestamp: Timestamp,
    /// Outcome per subject of the frame
    pub outcomes: BTreeMap<SubjectId, SubjectOutcome>,
    /// Whether a composite visualization was published
    pub visualization_published: bool,
    /// Publish calls that failed because a sink was closed
    pub publish_failures: usize,
    /// Subjects evicted from the registry after this frame
    pub evicted: Vec<SubjectId>,
}

impl BatchReport {
    /// Subjects that emitted a smoothed estimate, in id order
    pub fn emitted(&self) -> impl Iterator<Item = (SubjectId, SmoothedGazeEstimate)> + '_ {
        self.outcomes
            .iter()
            .filter_map(|(id, outcome)| outcome.emitted().map(|gaze| (*id, gaze)))
    }
}

/// Gaze estimation pipeline over a continuous multi-subject frame stream
pub struct GazePipeline<L, E, P> {
    gate: FrameCorrespondenceGate,
    registry: SubjectRegistry,
    lookup: L,
    estimator: E,
    publisher: P,
    options: PipelineOptions,
    stats: EmissionStats,
}

impl<L, E, P> GazePipeline<L, E, P>
where
    L: PoseLookup,
    E: GazeEstimator,
    P: Publisher,
{
    /// Create a pipeline with default options
    pub fn new(
        gate: FrameCorrespondenceGate,
        scheme: WeightScheme,
        lookup: L,
        estimator: E,
        publisher: P,
    ) -> Self {
        Self::with_options(gate, scheme, lookup, estimator, publisher, PipelineOptions::default())
    }

    /// Create a pipeline with explicit options
    pub fn with_options(
        gate: FrameCorrespondenceGate,
        scheme: WeightScheme,
        lookup: L,
        estimator: E,
        publisher: P,
        options: PipelineOptions,
    ) -> Self {
        info!(
            "Initializing gaze pipeline: window {}, max staleness {:?}",
            scheme.window_size(),
            gate.max_staleness()
        );
        Self {
            gate,
            registry: SubjectRegistry::new(scheme),
            lookup,
            estimator,
            publisher,
            options,
            stats: EmissionStats::new(),
        }
    }

    /// Process one frame end to end
    pub fn process_batch(&mut self, batch: &FrameBatch) -> BatchReport {
        let timestamp = batch.timestamp;
        let mut outcomes = BTreeMap::new();
        let mut composite = CompositeBuilder::new();
        let mut publish_failures = 0;

        for (&id, eyes) in &batch.subjects {
            self.registry.get_or_create(id);
            self.registry.record_seen(id, timestamp);

            let (outcome, failed) = self.run_subject(id, eyes, timestamp);
            publish_failures += failed;

            if let (Some(gaze), true) = (outcome.emitted(), self.options.visualize) {
                let right = annotate_eye(&eyes.right, gaze, self.options.line_length);
                let left = annotate_eye(&eyes.left, gaze, self.options.line_length);
                composite.push_subject(&right, &left);
            }
            outcomes.insert(id, outcome);
        }

        let mut visualization_published = false;
        if let Some(image) = composite.build() {
            match self.publisher.publish_visualization(&image, timestamp) {
                Ok(()) => visualization_published = true,
                Err(err) => {
                    publish_failures += 1;
                    Self::log_publish_failure(&err);
                }
            }
        }

        let evicted = match self.options.evict_after {
            Some(max_age) => self.registry.evict_unseen(timestamp, max_age),
            None => Vec::new(),
        };

        BatchReport {
            timestamp,
            outcomes,
            visualization_published,
            publish_failures,
            evicted,
        }
    }

    /// Gate, estimate, smooth and publish a single subject of a frame
    pub fn process_subject(&mut self, id: SubjectId, eyes: &EyePair, timestamp: Timestamp) -> SubjectOutcome {
        self.registry.get_or_create(id);
        self.registry.record_seen(id, timestamp);
        self.run_subject(id, eyes, timestamp).0
    }

    fn run_subject(&mut self, id: SubjectId, eyes: &EyePair, timestamp: Timestamp) -> (SubjectOutcome, usize) {
        let head = match self.gate.evaluate(&mut self.lookup, id, timestamp) {
            GateDecision::Accept(head) => head,
            GateDecision::Reject(reason) => {
                match &reason {
                    RejectReason::LookupFailed(err) => debug!("Subject {}: {}", id, err),
                    RejectReason::Stale { delta } => info!(
                        "Subject {}: too big time diff for head pose, do not estimate gaze! {}",
                        id, delta
                    ),
                }
                return (SubjectOutcome::Rejected(reason), 0);
            }
        };

        let raw = self.estimator.estimate(&eyes.right, &eyes.left, head);
        debug!("Subject {}: head {} raw gaze {}", id, head, raw);

        let buffer = self.registry.get_or_create(id);
        let Some(smoothed) = buffer.push(raw) else {
            return (SubjectOutcome::Buffered(buffer.len()), 0);
        };

        let failed = match self.publisher.publish_transform(id, smoothed, timestamp) {
            Ok(()) => 0,
            Err(err) => {
                Self::log_publish_failure(&err);
                1
            }
        };
        self.stats.record(id, smoothed, timestamp);

        (SubjectOutcome::Emitted(smoothed), failed)
    }

    fn log_publish_failure(err: &PublishError) {
        warn!("Dropping output: {}", err);
    }

    /// Smoothing buffers of every subject seen so far
    pub fn registry(&self) -> &SubjectRegistry {
        &self.registry
    }

    /// Freshness gate in use
    pub fn gate(&self) -> &FrameCorrespondenceGate {
        &self.gate
    }

    /// Pipeline options in use
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Emission statistics
    pub fn stats(&self) -> &EmissionStats {
        &self.stats
    }

    /// Head pose source
    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    /// Gaze estimator
    pub fn estimator(&self) -> &E {
        &self.estimator
    }

    /// Output sink
    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Mutable access to the output sink
    pub fn publisher_mut(&mut self) -> &mut P {
        &mut self.publisher
    }
}
