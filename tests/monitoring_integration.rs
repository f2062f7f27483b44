//! Monitoring integration tests: metrics log, summaries, drift and alerts

use quickcheck_macros::quickcheck;
use raggate::monitoring::{
    check_alerts, compute_drift_score, load_baseline, make_metric, read_metrics_log,
    summarize_metrics, Baseline, MetricInput, MetricsConfig, MetricsLogger, MetricsSink,
};
use std::sync::Arc;
use tempfile::TempDir;

fn logger_for(path: std::path::PathBuf, enabled: bool) -> MetricsLogger {
    MetricsLogger::new(MetricsConfig {
        sink: MetricsSink::File,
        file: path,
        enabled,
    })
}

#[test]
fn test_disabled_logger_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("metrics.jsonl");
    let logger = logger_for(path.clone(), false);

    let metric = make_metric(MetricInput {
        request_id: "r1",
        question: "q",
        ..Default::default()
    });
    logger.log(&metric).unwrap();
    assert!(!path.exists());
}

#[test]
fn test_concurrent_writers_produce_whole_lines() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("metrics.jsonl");
    let logger = Arc::new(logger_for(path.clone(), true));

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let logger = Arc::clone(&logger);
            std::thread::spawn(move || {
                for i in 0..25 {
                    let request_id = format!("w{}-{}", worker, i);
                    let metric = make_metric(MetricInput {
                        request_id: &request_id,
                        question: "What are the lawful bases for processing?",
                        top_k: 4,
                        distances: &[0.2, 0.3, 0.4, 0.5],
                        cited: true,
                        latency_ms: 120,
                        ..Default::default()
                    });
                    logger.log(&metric).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let metrics = read_metrics_log(&path).unwrap();
    assert_eq!(metrics.len(), 200);
}

#[test]
fn test_monitoring_round_trip_against_baseline() {
    let dir = TempDir::new().unwrap();
    let metrics_path = dir.path().join("metrics.jsonl");
    let baseline_path = dir.path().join("monitoring").join("baseline.json");
    let logger = logger_for(metrics_path.clone(), true);

    for (question, distances, refusal) in [
        ("abcdefghij", vec![0.6, 0.8], true),
        ("abcdefghijklmnopqrst", vec![0.5], false),
    ] {
        let metric = make_metric(MetricInput {
            request_id: "r",
            question,
            top_k: 4,
            distances: &distances,
            refusal,
            cited: !refusal,
            ..Default::default()
        });
        logger.log(&metric).unwrap();
    }

    let summary = summarize_metrics(&read_metrics_log(&metrics_path).unwrap()).unwrap();
    assert_eq!(summary.count, 2);
    assert_eq!(summary.refusal_rate, 0.5);
    assert_eq!(summary.question_len_mean, 15.0);
    let mean_distance = summary.mean_distance.unwrap();
    assert!((mean_distance - 0.6).abs() < 1e-12);

    let alerts = check_alerts(summary.refusal_rate, summary.mean_distance);
    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[0], "High refusal rate: 0.50 (>0.30)");
    assert!(alerts[1].starts_with("High mean retrieval distance: 0.600"));

    assert_eq!(load_baseline(&baseline_path).unwrap(), None);

    std::fs::create_dir_all(baseline_path.parent().unwrap()).unwrap();
    std::fs::write(
        &baseline_path,
        r#"{"question_len_mean": 12.0, "mean_distance_mean": 0.4}"#,
    )
    .unwrap();
    let baseline = load_baseline(&baseline_path).unwrap().unwrap();
    let drift = compute_drift_score(&summary.as_baseline().unwrap(), &baseline);
    assert_eq!(drift.delta_question_len_mean, 3.0);
    assert!((drift.delta_mean_distance_mean - 0.2).abs() < 1e-9);
}

#[test]
fn test_metrics_never_store_question_text() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("metrics.jsonl");
    let logger = logger_for(path.clone(), true);
    let question = "Is my employee's health record special category data?";

    logger
        .log(&make_metric(MetricInput {
            request_id: "r",
            question,
            ..Default::default()
        }))
        .unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(!contents.contains("health record"));
    assert_eq!(contents.lines().count(), 1);
}

#[quickcheck]
fn prop_identical_baselines_have_zero_drift(question_len_mean: f64, mean_distance_mean: f64) -> bool {
    if !question_len_mean.is_finite() || !mean_distance_mean.is_finite() {
        return true;
    }
    let baseline = Baseline {
        question_len_mean,
        mean_distance_mean,
    };
    let drift = compute_drift_score(&baseline, &baseline);
    drift.delta_question_len_mean == 0.0 && drift.delta_mean_distance_mean == 0.0
}

#[quickcheck]
fn prop_alerts_only_above_thresholds(refusal_rate: f64, distance: Option<f64>) -> bool {
    let alerts = check_alerts(refusal_rate, distance);
    let expected = usize::from(refusal_rate > 0.30) + usize::from(distance.map_or(false, |d| d > 0.55));
    alerts.len() == expected
}
