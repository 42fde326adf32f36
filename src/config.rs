//! Configuration management for the gaze smoothing pipeline

use crate::{
    constants::{DEFAULT_GAZE_LINE_LENGTH, DEFAULT_MAX_STALENESS_SECS, DEFAULT_WEIGHTS, DEFAULT_WINDOW_SIZE},
    gate::FrameCorrespondenceGate,
    pipeline::PipelineOptions,
    smoothing::WeightScheme,
    transform::FrameNames,
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Smoothing window configuration
    pub smoothing: SmoothingConfig,

    /// Head pose freshness configuration
    pub gate: GateConfig,

    /// Transform frame naming
    pub frames: FrameNames,

    /// Visualization configuration
    pub visualization: VisualizationConfig,

    /// Subject registry configuration
    pub registry: RegistryConfig,
}

/// Smoothing window configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Number of raw estimates averaged
    pub window_size: usize,

    /// Weight per window position, oldest first
    pub weights: Vec<f64>,
}

/// Head pose freshness configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Maximum head pose age relative to the frame, seconds
    pub max_staleness_secs: f64,
}

/// Visualization configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizationConfig {
    /// Publish the annotated composite image
    pub enabled: bool,

    /// Gaze line length on eye crops, pixels
    pub line_length: f32,
}

/// Subject registry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RegistryConfig {
    /// Forget subjects not seen for this many seconds; unset keeps them forever
    pub evict_after_secs: Option<f64>,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            weights: DEFAULT_WEIGHTS.to_vec(),
        }
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            max_staleness_secs: DEFAULT_MAX_STALENESS_SECS,
        }
    }
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            line_length: DEFAULT_GAZE_LINE_LENGTH,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::IoError(e.to_string()))?;

        serde_yaml::from_str(&content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| Error::IoError(e.to_string()))?;

        Ok(())
    }

    /// Weighting scheme described by the smoothing section
    ///
    /// # Errors
    ///
    /// Returns an error if the weights do not match the window size or are invalid
    pub fn weight_scheme(&self) -> Result<WeightScheme> {
        if self.smoothing.weights.len() != self.smoothing.window_size {
            return Err(Error::ConfigError(format!(
                "Expected {} weights for window size {}, got {}",
                self.smoothing.window_size,
                self.smoothing.window_size,
                self.smoothing.weights.len()
            )));
        }
        WeightScheme::new(self.smoothing.weights.clone()).map_err(|e| Error::ConfigError(e.to_string()))
    }

    /// Freshness gate described by the gate section
    ///
    /// # Errors
    ///
    /// Returns an error if the staleness limit is not positive
    pub fn gate(&self) -> Result<FrameCorrespondenceGate> {
        FrameCorrespondenceGate::from_secs_f64(self.gate.max_staleness_secs)
            .map_err(|e| Error::ConfigError(e.to_string()))
    }

    /// Pipeline options described by the visualization and registry sections
    ///
    /// # Errors
    ///
    /// Returns an error if the eviction age is not positive
    pub fn pipeline_options(&self) -> Result<PipelineOptions> {
        let evict_after = match self.registry.evict_after_secs {
            Some(secs) if secs.is_finite() && secs > 0.0 => Some(
                Duration::try_from_secs_f64(secs)
                    .map_err(|e| Error::ConfigError(format!("Eviction age {secs} out of range: {e}")))?,
            ),
            Some(secs) => {
                return Err(Error::ConfigError(format!(
                    "Eviction age must be positive, got {secs}"
                )))
            }
            None => None,
        };

        Ok(PipelineOptions {
            visualize: self.visualization.enabled,
            line_length: self.visualization.line_length,
            evict_after,
        })
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found
    pub fn validate(&self) -> Result<()> {
        if self.smoothing.window_size == 0 {
            return Err(Error::ConfigError(
                "Window size must be greater than 0".to_string(),
            ));
        }
        self.weight_scheme()?;
        self.gate()?;
        self.pipeline_options()?;

        if !self.visualization.line_length.is_finite() || self.visualization.line_length < 0.0 {
            return Err(Error::ConfigError(
                "Gaze line length must be non-negative".to_string(),
            ));
        }
        if self.frames.tf_prefix.is_empty() {
            return Err(Error::ConfigError("Frame prefix must not be empty".to_string()));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Gaze Smoothing Configuration

# Smoothing window, weights oldest sample first
smoothing:
  window_size: 5
  weights: [0.1, 0.125, 0.175, 0.2, 0.4]

# Head pose freshness
gate:
  max_staleness_secs: 0.25

# Transform frames
frames:
  tf_prefix: "gaze"
  camera_frame: "/kinect2_nonrotated_link"

# Composite image of annotated eye crops
visualization:
  enabled: true
  line_length: 50.0

# Subject registry (omit evict_after_secs to keep subjects forever)
registry:
  evict_after_secs: null
"#;
