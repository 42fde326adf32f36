//! Replaying recorded sessions through the full pipeline

use gaze_smoothing::{
    angles::ThetaPhi,
    config::Config,
    pipeline::GazePipeline,
    replay::{RecordingPublisher, ReplayEstimator, ReplayPoseLookup, ReplaySession},
    runner::{run_source, ShutdownSignal},
    types::SubjectId,
};
use std::fmt::Write as _;
use std::io::Write;
use tempfile::NamedTempFile;

/// Session of `frames` frames at 30 fps with a fresh, a stale and a pose-less subject
fn session_yaml(frames: usize) -> String {
    let mut yaml = String::from("crop: { width: 40, height: 20 }\nframes:\n");
    for i in 0..frames {
        let t = 1.0 + i as f64 / 30.0;
        let gaze = 0.1 * i as f64;
        writeln!(yaml, "  - timestamp: {t}").unwrap();
        writeln!(yaml, "    subjects:").unwrap();
        writeln!(yaml, "      0:").unwrap();
        writeln!(yaml, "        head_pose: {{ timestamp: {}, yaw: 3.0 }}", t - 0.02).unwrap();
        writeln!(yaml, "        gaze: {{ theta: {gaze}, phi: {} }}", -gaze).unwrap();
        writeln!(yaml, "      1:").unwrap();
        writeln!(yaml, "        head_pose: {{ timestamp: {}, pitch: 0.2 }}", t - 0.3).unwrap();
        writeln!(yaml, "        gaze: {{ theta: 0.5, phi: 0.5 }}").unwrap();
        writeln!(yaml, "      2:").unwrap();
        writeln!(yaml, "        gaze: {{ theta: 0.7, phi: 0.7 }}").unwrap();
    }
    yaml
}

type ReplayPipeline = GazePipeline<ReplayPoseLookup, ReplayEstimator, RecordingPublisher>;

fn replay(session: ReplaySession, config: &Config) -> ReplayPipeline {
    let (mut source, lookup, estimator) = session.into_parts();
    let mut pipeline = GazePipeline::with_options(
        config.gate().unwrap(),
        config.weight_scheme().unwrap(),
        lookup,
        estimator,
        RecordingPublisher::new(config.frames.clone()),
        config.pipeline_options().unwrap(),
    );
    let frames = source.remaining();
    assert_eq!(run_source(&mut source, &mut pipeline, &ShutdownSignal::new()), frames);
    pipeline
}

#[test]
fn test_replay_emits_only_fresh_subject() {
    let session = ReplaySession::from_yaml(&session_yaml(7)).unwrap();
    let pipeline = replay(session, &Config::default());

    let publisher = pipeline.publisher();
    assert_eq!(publisher.transforms().len(), 3);
    assert!(publisher.estimates().iter().all(|(id, _, _)| *id == SubjectId(0)));
    assert_eq!(pipeline.lookup().lookups(), 21);
    assert_eq!(pipeline.estimator().calls(), 7);

    // Default weights over gazes 0.0..=0.4
    let expected = 0.1 * (0.0 * 0.1 + 1.0 * 0.125 + 2.0 * 0.175 + 3.0 * 0.2 + 4.0 * 0.4);
    let (_, first, _) = publisher.estimates()[0];
    assert!((first.theta - expected).abs() < 1e-9);
    assert!((first.phi + expected).abs() < 1e-9);

    let transform = &publisher.transforms()[0];
    assert_eq!(transform.parent_frame, "gaze/head_pose_estimated0");
    assert_eq!(transform.child_frame, "gaze/world_gaze0");
    assert!((transform.translation.z - 0.05).abs() < 1e-12);

    // One 40x20 crop pair per emitting frame
    assert_eq!(publisher.composites().len(), 3);
    assert_eq!(publisher.composites()[0].1.dimensions(), (80, 20));

    let ids = pipeline.registry().ids();
    assert_eq!(ids, vec![SubjectId(0), SubjectId(1), SubjectId(2)]);
    assert!(pipeline.registry().get(SubjectId(1)).unwrap().is_empty());
    assert!(pipeline.registry().get(SubjectId(2)).unwrap().is_empty());
}

#[test]
fn test_replay_with_relaxed_gate_and_short_window() {
    let mut config = Config::default();
    config.gate.max_staleness_secs = 0.5;
    config.smoothing.window_size = 1;
    config.smoothing.weights = vec![1.0];
    config.visualization.enabled = false;
    config.frames.tf_prefix = "lab".to_string();

    let session = ReplaySession::from_yaml(&session_yaml(2)).unwrap();
    let pipeline = replay(session, &config);

    let publisher = pipeline.publisher();
    // Subjects 0 and 1 pass the relaxed gate on both frames
    assert_eq!(publisher.transforms().len(), 4);
    assert!(publisher.composites().is_empty());
    assert_eq!(publisher.transforms()[1].child_frame, "lab/world_gaze1");
    assert_eq!(publisher.estimates()[1].1, ThetaPhi::new(0.5, 0.5));
}

#[test]
fn test_replay_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(session_yaml(5).as_bytes()).unwrap();

    let session = ReplaySession::from_file(file.path()).unwrap();
    assert_eq!(session.frames.len(), 5);
    assert_eq!(session.crop.width, 40);

    let pipeline = replay(session, &Config::default());
    assert_eq!(pipeline.publisher().transforms().len(), 1);
}

#[test]
fn test_repeated_frame_stamps_replay_in_order() {
    let session = ReplaySession::from_yaml(
        r"
frames:
  - timestamp: 1.0
    subjects:
      0: { head_pose: { timestamp: 0.95 }, gaze: { theta: 1.0, phi: 1.0 } }
  - timestamp: 1.0
    subjects:
      0: { head_pose: { timestamp: 0.95 }, gaze: { theta: 3.0, phi: 3.0 } }
",
    )
    .unwrap();
    let mut config = Config::default();
    config.smoothing.window_size = 2;
    config.smoothing.weights = vec![1.0, 1.0];

    let pipeline = replay(session, &config);

    let estimates = pipeline.publisher().estimates();
    assert_eq!(estimates.len(), 1);
    assert_eq!(estimates[0].1, ThetaPhi::new(2.0, 2.0));
}

#[test]
fn test_missing_session_file() {
    assert!(ReplaySession::from_file("/nonexistent/session.yaml").is_err());
}

#[test]
fn test_closed_publisher_keeps_smoothing() {
    let session = ReplaySession::from_yaml(&session_yaml(6)).unwrap();
    let config = Config::default();
    let (mut source, lookup, estimator) = session.into_parts();
    let mut publisher = RecordingPublisher::new(config.frames.clone());
    publisher.close();
    let mut pipeline = GazePipeline::new(
        config.gate().unwrap(),
        config.weight_scheme().unwrap(),
        lookup,
        estimator,
        publisher,
    );

    run_source(&mut source, &mut pipeline, &ShutdownSignal::new());

    assert!(pipeline.publisher().transforms().is_empty());
    assert_eq!(pipeline.stats().emissions(), 2);
    assert_eq!(pipeline.registry().get(SubjectId(0)).unwrap().len(), 5);
}

#[test]
fn test_shutdown_stops_replay() {
    let session = ReplaySession::from_yaml(&session_yaml(4)).unwrap();
    let config = Config::default();
    let (mut source, lookup, estimator) = session.into_parts();
    let mut pipeline = GazePipeline::new(
        config.gate().unwrap(),
        config.weight_scheme().unwrap(),
        lookup,
        estimator,
        RecordingPublisher::default(),
    );

    let shutdown = ShutdownSignal::new();
    shutdown.request();
    assert_eq!(run_source(&mut source, &mut pipeline, &shutdown), 0);
    assert_eq!(source.remaining(), 4);
}
