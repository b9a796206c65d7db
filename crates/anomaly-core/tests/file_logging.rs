// Runs in its own test binary so it owns the global subscriber

use anomaly_core::logging::init_logging;
use anomaly_core::LoggingConfig;

#[test]
fn test_file_output_writes_json_log() {
    let dir = tempfile::tempdir().unwrap();
    let config = LoggingConfig {
        verbose: true,
        log_dir: dir.path().join("logs"),
        log_file: "eval.log".to_string(),
        file_output: true,
    };

    let guard = init_logging(&config).unwrap();
    assert!(guard.is_some());
    tracing::info!(cutoff = 0.4, "threshold chosen");
    // Dropping the guard flushes the non-blocking writer
    drop(guard);

    let content = std::fs::read_to_string(dir.path().join("logs").join("eval.log")).unwrap();
    assert!(content.contains("threshold chosen"));
    assert!(content.lines().any(|line| line.trim_start().starts_with('{')));
}
