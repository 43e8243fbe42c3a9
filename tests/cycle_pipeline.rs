//! End-to-end pipeline tests on a toy dataset
//!
//! Ten documents, three trained labels plus one zero-shot label, split
//! evenly across train/validation/test via membership files.

use afinar::cli::logging::LogLevel;
use afinar::config::{CycleSchedule, LabelColumn, ModelFamily, RunConfig};
use afinar::train::pipeline;
use std::fs;
use std::path::Path;

/// Write the toy dataset and split lists, returning the dataset path.
fn write_fixture(root: &Path) -> std::path::PathBuf {
    let lines = [
        r#"{"celex_id": "d0", "text": "alpha document one", "Labels": "red;blue"}"#,
        r#"{"celex_id": "d1", "text": "bravo document two", "Labels": "blue"}"#,
        r#"{"celex_id": "d2", "text": "charlie document three", "Labels": "green"}"#,
        r#"{"celex_id": "d3", "text": "delta document four", "Labels": "red"}"#,
        r#"{"celex_id": "d4", "text": "echo document five", "Labels": "green;blue"}"#,
        r#"{"celex_id": "d5", "text": "foxtrot document six", "Labels": "red"}"#,
        r#"{"celex_id": "d6", "text": "golf document seven", "Labels": "blue;zeta"}"#,
        r#"{"celex_id": "d7", "text": "hotel document eight", "Labels": "green"}"#,
        r#"{"celex_id": "d8", "text": "india document nine", "Labels": "red;zeta"}"#,
        r#"{"celex_id": "d9", "text": "juliet document ten", "Labels": "blue"}"#,
    ];
    let dataset = root.join("data.jsonl");
    fs::write(&dataset, lines.join("\n")).unwrap();

    let split_dir = root.join("splits");
    fs::create_dir_all(&split_dir).unwrap();
    fs::write(split_dir.join("train.txt"), "d0\nd1\nd2\nd3\n").unwrap();
    fs::write(split_dir.join("validation.txt"), "d4\nd5\nd6\n").unwrap();
    fs::write(split_dir.join("test.txt"), "d7\nd8\nd9\n").unwrap();

    dataset
}

/// One-cycle run config over the fixture: unfreeze -1, 1 iteration, lr 1e-4.
fn fixture_config(root: &Path, total_cycles: usize, start_cycle: usize) -> RunConfig {
    RunConfig {
        dataset_path: root.join("data.jsonl"),
        split_dir: Some(root.join("splits")),
        label_column: LabelColumn::Labels,
        cased: false,
        model_family: ModelFamily::Encoder,
        pretrained_model: "encoder-mini".to_string(),
        max_len: 32,
        batch_size: 2,
        total_cycles,
        start_cycle,
        schedule: CycleSchedule::new(vec![1], vec![1e-4], vec![-1]).unwrap(),
        experiment_name: "toy".to_string(),
        lr_find: false,
        seed: 42,
        output_root: root.to_path_buf(),
    }
}

#[test]
fn test_single_cycle_produces_checkpoint_and_ledger_row() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    let config = fixture_config(dir.path(), 1, 1);

    pipeline::run(&config, LogLevel::Quiet).unwrap();

    // Checkpoints 0 and 1 exist, nothing further
    let model_dir = config.model_dir();
    assert!(model_dir.join("0.safetensors").exists());
    assert!(model_dir.join("1.safetensors").exists());
    assert!(!model_dir.join("2.safetensors").exists());

    // Exactly one ledger row of 39 comma-separated floats
    let content = fs::read_to_string(config.results_path()).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1);
    let values: Vec<f64> = lines[0]
        .split(',')
        .map(|v| v.parse().expect("ledger cell parses as float"))
        .collect();
    assert_eq!(values.len(), 39);
    assert!(values.iter().all(|v| v.is_finite()));
}

#[test]
fn test_second_cycle_appends_and_leaves_cycle_zero_untouched() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());

    pipeline::run(&fixture_config(dir.path(), 1, 1), LogLevel::Quiet).unwrap();
    let config = fixture_config(dir.path(), 2, 2);
    let zero_before = fs::read(config.model_dir().join("0.safetensors")).unwrap();
    let one_before = fs::read(config.model_dir().join("1.safetensors")).unwrap();

    // Resume with cycle 2 only
    pipeline::run(&config, LogLevel::Quiet).unwrap();

    let zero_after = fs::read(config.model_dir().join("0.safetensors")).unwrap();
    let one_after = fs::read(config.model_dir().join("1.safetensors")).unwrap();
    assert_eq!(zero_before, zero_after, "cycle 0 slot must stay untouched");
    assert_eq!(one_before, one_after, "cycle 1 slot must stay untouched");
    assert!(config.model_dir().join("2.safetensors").exists());

    // Two rows now, in cycle order, neither rewritten
    let content = fs::read_to_string(config.results_path()).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    for line in &lines {
        assert_eq!(line.split(',').count(), 39);
    }
}

#[test]
fn test_resume_without_predecessor_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());

    // Start at cycle 2 with no cycle-1 checkpoint on disk
    let config = fixture_config(dir.path(), 2, 2);
    let err = pipeline::run(&config, LogLevel::Quiet).unwrap_err();
    assert!(matches!(
        err,
        afinar::Error::CheckpointNotFound { cycle: 1, .. }
    ));
}

#[test]
fn test_missing_split_files_degrade_to_no_split() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    fs::remove_file(dir.path().join("splits").join("test.txt")).unwrap();

    let config = fixture_config(dir.path(), 1, 1);
    // Every document falls back to "no split": training still constructs a
    // model and checkpoint 0, but evaluation finds empty splits and the
    // ledger stays empty. The run itself must not abort.
    pipeline::run(&config, LogLevel::Quiet).unwrap();
    assert!(config.model_dir().join("0.safetensors").exists());
    assert!(!config.results_path().exists());
}

#[test]
fn test_metrics_reflect_zero_shot_columns() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    let config = fixture_config(dir.path(), 1, 1);

    pipeline::run(&config, LogLevel::Quiet).unwrap();

    // "zeta" never occurs in the training split, so predictions carry three
    // trained columns against four ground-truth columns. Padded evaluation
    // still yields a full, finite metrics row.
    let content = fs::read_to_string(config.results_path()).unwrap();
    let row: Vec<f64> = content
        .lines()
        .next()
        .unwrap()
        .split(',')
        .map(|v| v.parse().unwrap())
        .collect();
    // precision@k and nDCG@k live in [0, 1]
    assert!(row.iter().all(|&v| (0.0..=1.0).contains(&v)));
}
