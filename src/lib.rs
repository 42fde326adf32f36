//! Per-subject gaze estimation pipeline for real-time multi-person tracking.
//!
//! This library turns a stream of per-subject eye crops plus externally
//! tracked head poses into smoothed gaze directions:
//! - A freshness gate pairs each frame with a recent enough head pose
//! - An external network estimates raw gaze from both eye crops
//! - A bounded per-subject window smooths the raw estimates with fixed weights
//! - Smoothed estimates are published as transforms and drawn on the crops
//!
//! Head pose tracking, gaze inference, frame transport and publishing are
//! injected as [`collaborators`], so the pipeline runs the same against live
//! services, recorded [`replay`] sessions or test doubles.
//!
//! # Examples
//!
//! ## Smoothing a single subject
//!
//! ```
//! use gaze_smoothing::{angles::ThetaPhi, smoothing::{SubjectBuffer, WeightScheme}};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let scheme = Arc::new(WeightScheme::new(vec![1.0, 2.0, 3.0])?);
//! let mut buffer = SubjectBuffer::new(scheme);
//!
//! assert!(buffer.push(ThetaPhi::new(1.0, 1.0)).is_none());
//! assert!(buffer.push(ThetaPhi::new(2.0, 2.0)).is_none());
//!
//! // Window full: (1·1 + 2·2 + 3·3) / 6
//! let smoothed = buffer.push(ThetaPhi::new(3.0, 3.0)).expect("window is full");
//! assert!((smoothed.theta - 14.0 / 6.0).abs() < 1e-10);
//! # Ok(())
//! # }
//! ```
//!
//! ## Replaying a recorded session
//!
//! ```
//! use gaze_smoothing::{
//!     config::Config,
//!     pipeline::GazePipeline,
//!     replay::{RecordingPublisher, ReplaySession},
//!     runner::{run_source, ShutdownSignal},
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let session = ReplaySession::from_yaml(r#"
//! frames:
//!   - timestamp: 1.0
//!     subjects:
//!       0:
//!         head_pose: { timestamp: 0.9, yaw: 3.1 }
//!         gaze: { theta: 0.1, phi: 0.2 }
//! "#)?;
//! let (mut source, lookup, estimator) = session.into_parts();
//!
//! let config = Config::default();
//! let mut pipeline = GazePipeline::with_options(
//!     config.gate()?,
//!     config.weight_scheme()?,
//!     lookup,
//!     estimator,
//!     RecordingPublisher::new(config.frames.clone()),
//!     config.pipeline_options()?,
//! );
//!
//! let processed = run_source(&mut source, &mut pipeline, &ShutdownSignal::new());
//! assert_eq!(processed, 1);
//! // One sample is not a full window yet
//! assert!(pipeline.publisher().transforms().is_empty());
//! # Ok(())
//! # }
//! ```

/// Head orientation and gaze angle conversions
pub mod angles;

/// Capabilities injected into the pipeline
pub mod collaborators;

/// Configuration management
pub mod config;

/// Constants used throughout the crate
pub mod constants;

/// Emission rate and latency reporting
pub mod diagnostics;

/// Error types and result handling
pub mod error;

/// Head pose freshness gate
pub mod gate;

/// Per-frame orchestration
pub mod pipeline;

/// Per-subject buffer ownership
pub mod registry;

/// Recorded sessions for offline runs
pub mod replay;

/// Threaded, serialized frame dispatch
pub mod runner;

/// Weighted window smoothing
pub mod smoothing;

/// Published gaze transforms
pub mod transform;

/// Core data types
pub mod types;

/// Gaze overlays and composite images
pub mod visualization;

pub use error::{Error, Result};
