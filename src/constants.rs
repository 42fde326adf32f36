//! Constants used throughout the crate

/// Default number of raw estimates in a smoothing window
pub const DEFAULT_WINDOW_SIZE: usize = 5;

/// Default smoothing weights, oldest sample first
pub const DEFAULT_WEIGHTS: [f64; DEFAULT_WINDOW_SIZE] = [0.1, 0.125, 0.175, 0.2, 0.4];

/// Maximum age of a head pose relative to the frame it is paired with
pub const DEFAULT_MAX_STALENESS_SECS: f64 = 0.25;

/// Default transform frame prefix
pub const DEFAULT_TF_PREFIX: &str = "gaze";

/// Default camera frame head poses are expressed in
pub const DEFAULT_CAMERA_FRAME: &str = "/kinect2_nonrotated_link";

/// Head pose frame name stem, suffixed with the subject id
pub const HEAD_POSE_FRAME_STEM: &str = "head_pose_estimated";

/// Gaze frame name stem, suffixed with the subject id
pub const WORLD_GAZE_FRAME_STEM: &str = "world_gaze";

/// Gaze transform offset above the head pose origin (nose tip), meters
pub const GAZE_ORIGIN_OFFSET_Z: f64 = 0.05;

/// Length of the gaze line drawn on eye crops, pixels
pub const DEFAULT_GAZE_LINE_LENGTH: f32 = 50.0;

/// Gaze line colour on eye crops
pub const GAZE_LINE_COLOR: [u8; 3] = [255, 0, 0];

/// Synthetic eye crop dimensions used by replays
pub const DEFAULT_CROP_WIDTH: u32 = 60;
pub const DEFAULT_CROP_HEIGHT: u32 = 36;

/// Receive timeout of the dispatch worker between shutdown checks
pub const DISPATCH_RECV_TIMEOUT_MS: u64 = 20;

/// Numeric precision epsilon
pub const EPSILON: f64 = 1e-10;

/// Nanoseconds per second
pub const NANOS_PER_SEC: i64 = 1_000_000_000;
