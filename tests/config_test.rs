//! Configuration files driving pipeline construction

use gaze_smoothing::{
    config::{Config, EXAMPLE_CONFIG},
    Error,
};
use std::io::Write;
use std::time::Duration;
use tempfile::{NamedTempFile, TempDir};

#[test]
fn test_config_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gaze.yaml");

    let mut config = Config::default();
    config.smoothing.window_size = 3;
    config.smoothing.weights = vec![0.2, 0.3, 0.5];
    config.gate.max_staleness_secs = 0.1;
    config.registry.evict_after_secs = Some(10.0);
    config.frames.tf_prefix = "lab".to_string();
    config.to_file(&path).unwrap();

    let loaded = Config::from_file(&path).unwrap();
    assert_eq!(loaded, config);
    assert!(loaded.validate().is_ok());
    assert_eq!(loaded.weight_scheme().unwrap().weights(), &[0.2, 0.3, 0.5]);
    assert_eq!(loaded.gate().unwrap().max_staleness(), Duration::from_millis(100));
    assert_eq!(loaded.pipeline_options().unwrap().evict_after, Some(Duration::from_secs(10)));
}

#[test]
fn test_example_config_file_loads() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(EXAMPLE_CONFIG.as_bytes()).unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_malformed_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"smoothing: [not, a, map]\n").unwrap();

    assert!(matches!(Config::from_file(file.path()), Err(Error::ConfigError(_))));
    assert!(matches!(Config::from_file("/nonexistent/gaze.yaml"), Err(Error::IoError(_))));
}

#[test]
fn test_invalid_settings_rejected() {
    let cases = [
        "smoothing:\n  window_size: 0\n  weights: []\n",
        "smoothing:\n  window_size: 2\n  weights: [0.0, 0.0]\n",
        "gate:\n  max_staleness_secs: -0.1\n",
        "visualization:\n  line_length: -5.0\n",
        "frames:\n  tf_prefix: \"\"\n",
    ];
    for yaml in cases {
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err(), "accepted {yaml:?}");
    }
}
