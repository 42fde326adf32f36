use crate::{
    angles::{RawGazeEstimate, SmoothedGazeEstimate},
    constants::{DEFAULT_WEIGHTS, EPSILON},
    Error, Result,
};

/// Ordered smoothing weights, index 0 applied to the oldest sample in a window.
///
/// Weights need not sum to one; the average divides by their sum.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightScheme {
    weights: Vec<f64>,
    total: f64,
}

impl WeightScheme {
    /// Create a weighting scheme
    ///
    /// # Errors
    ///
    /// Returns an error if the weights are empty, contain a negative or
    /// non-finite value, or sum to zero
    pub fn new(weights: Vec<f64>) -> Result<Self> {
        if weights.is_empty() {
            return Err(Error::WeightingError(
                "Window size must be greater than 0".to_string(),
            ));
        }
        if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(Error::WeightingError(format!(
                "Weights must be finite and non-negative, got {bad}"
            )));
        }
        let total: f64 = weights.iter().sum();
        if total <= EPSILON {
            return Err(Error::WeightingError(
                "Weights must have a positive sum".to_string(),
            ));
        }
        Ok(Self { weights, total })
    }

    /// Equal weights over a window of `window_size` samples
    ///
    /// # Errors
    ///
    /// Returns an error if `window_size` is zero
    pub fn uniform(window_size: usize) -> Result<Self> {
        Self::new(vec![1.0; window_size])
    }

    /// Number of samples in a full window
    #[must_use]
    pub fn window_size(&self) -> usize {
        self.weights.len()
    }

    /// The weights, oldest sample first
    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Sum of all weights
    #[must_use]
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Weighted average of a full window given oldest to newest.
    ///
    /// Returns `None` unless `window` holds exactly `window_size` samples.
    pub fn average<'a, I>(&self, window: I) -> Option<SmoothedGazeEstimate>
    where
        I: ExactSizeIterator<Item = &'a RawGazeEstimate>,
    {
        if window.len() != self.weights.len() {
            return None;
        }

        let (theta, phi) = self
            .weights
            .iter()
            .zip(window)
            .fold((0.0, 0.0), |(theta, phi), (w, sample)| {
                (theta + w * sample.theta, phi + w * sample.phi)
            });

        Some(SmoothedGazeEstimate::new(theta / self.total, phi / self.total))
    }
}

impl Default for WeightScheme {
    fn default() -> Self {
        let weights = DEFAULT_WEIGHTS.to_vec();
        let total = weights.iter().sum();
        Self { weights, total }
    }
}
