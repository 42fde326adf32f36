use super::WeightScheme;
use crate::angles::{RawGazeEstimate, SmoothedGazeEstimate};
use std::collections::VecDeque;
use std::sync::Arc;

/// Smoothing progress of one subject
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmoothingState {
    /// Fewer than a full window of samples so far
    Warming(usize),
    /// Window full; every further push emits
    Steady,
}

/// Bounded FIFO of one subject's raw gaze estimates
#[derive(Debug, Clone)]
pub struct SubjectBuffer {
    scheme: Arc<WeightScheme>,
    samples: VecDeque<RawGazeEstimate>,
}

impl SubjectBuffer {
    /// Create an empty buffer sized to the weighting scheme's window
    #[must_use]
    pub fn new(scheme: Arc<WeightScheme>) -> Self {
        let capacity = scheme.window_size();
        Self {
            scheme,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    /// Append an estimate, evicting the oldest one when the window overflows.
    ///
    /// Returns the weighted average of the window when it holds exactly
    /// `window_size` samples after the append.
    pub fn push(&mut self, estimate: RawGazeEstimate) -> Option<SmoothedGazeEstimate> {
        self.samples.push_back(estimate);
        while self.samples.len() > self.scheme.window_size() {
            self.samples.pop_front();
        }

        self.scheme.average(self.samples.iter())
    }

    /// Number of samples held
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no sample has been pushed yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Window capacity
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.scheme.window_size()
    }

    /// Samples held, oldest first
    pub fn samples(&self) -> impl ExactSizeIterator<Item = &RawGazeEstimate> + '_ {
        self.samples.iter()
    }

    /// Current smoothing state
    #[must_use]
    pub fn state(&self) -> SmoothingState {
        if self.samples.len() >= self.scheme.window_size() {
            SmoothingState::Steady
        } else {
            SmoothingState::Warming(self.samples.len())
        }
    }
}
