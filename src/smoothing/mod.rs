//! Bounded-window smoothing of noisy single-frame gaze estimates.
//!
//! Each subject owns a [`SubjectBuffer`] holding its most recent raw
//! estimates. Once the window is full, every push yields the weighted
//! average of the window according to a shared [`WeightScheme`].

/// Fixed weighting applied to a full smoothing window
pub mod weights;

/// Per-subject FIFO of raw estimates
pub mod buffer;

pub use buffer::SubjectBuffer;
pub use weights::WeightScheme;
