//! Rate and latency reporting for smoothed estimates.

use crate::{
    angles::SmoothedGazeEstimate,
    types::{SubjectId, Timestamp},
};
use log::info;
use std::time::Instant;

/// Timing of one emission
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmissionTiming {
    /// Emissions per second based on the gap to the previous emission
    pub rate_hz: Option<f64>,
    /// Wall-clock time between frame capture and emission, seconds
    pub latency_secs: f64,
}

/// Tracks the time between consecutive emissions across all subjects
#[derive(Debug, Default)]
pub struct EmissionStats {
    last_emission: Option<Instant>,
    emissions: u64,
}

impl EmissionStats {
    /// Create an empty tracker
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an emission for a frame stamped `frame_time`, observed at `now`
    pub fn record_at(&mut self, frame_time: Timestamp, now: Instant, wall_now: Timestamp) -> EmissionTiming {
        let rate_hz = self.last_emission.and_then(|last| {
            let elapsed = now.saturating_duration_since(last).as_secs_f64();
            (elapsed > 0.0).then(|| 1.0 / elapsed)
        });
        self.last_emission = Some(now);
        self.emissions += 1;

        EmissionTiming {
            rate_hz,
            latency_secs: (wall_now - frame_time).as_secs_f64(),
        }
    }

    /// Record and log an emission happening now
    pub fn record(&mut self, subject: SubjectId, gaze: SmoothedGazeEstimate, frame_time: Timestamp) -> EmissionTiming {
        let timing = self.record_at(frame_time, Instant::now(), Timestamp::now());
        info!(
            "est_gaze_c[{}]: {} (fps: {:.1}, latency: {:.2}s)",
            subject,
            gaze,
            timing.rate_hz.unwrap_or(0.0),
            timing.latency_secs
        );
        timing
    }

    /// Number of emissions recorded
    #[must_use]
    pub fn emissions(&self) -> u64 {
        self.emissions
    }
}
