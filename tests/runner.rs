use dashdata::config::Config;
use dashdata::runner::{Progress, run, run_with_progress};
use dashdata::validation::RequiredFields;
use dashdata::{ConvertError, RunMetrics, Stage};
use serde_json::Value;
use std::fs;
use std::path::Path;

const COHORT: &str = "age,sex,cogstat,uresidence,note\n\
                      70,F,normal,home,\"\"\n\
                      ,M,normal,home,\"\"\n\
                      88,M,impaired,care,fell twice\n\
                      79,F,normal\n\
                      93,F,,home,\n";

fn cohort(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("cohort.csv");
    fs::write(&path, COHORT).unwrap();
    path
}

#[test]
fn converts_and_reports_absolute_path() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let input = cohort(tmp.path());
    let output = tmp.path().join("data.json");

    let report = run(&Config::new(&input, &output))?;
    assert_eq!(report.rows, 2);
    assert!(report.output.is_absolute());
    assert!(report.output.ends_with("data.json"));

    let back: Value = serde_json::from_str(&fs::read_to_string(&output)?)?;
    let ages: Vec<&str> = back
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["age"].as_str().unwrap())
        .collect();
    assert_eq!(ages, vec!["70", "88"]);

    assert_eq!(report.metrics.rows_read, 5);
    assert_eq!(report.metrics.rows_retained, 2);
    assert_eq!(report.metrics.rows_incomplete, 2);
    assert_eq!(report.metrics.rows_malformed, 1);
    assert_eq!(report.metrics.rows_written, 2);
    Ok(())
}

#[test]
fn second_run_is_byte_identical() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let input = cohort(tmp.path());
    let output = tmp.path().join("data.json");
    let config = Config::new(&input, &output);

    run(&config)?;
    let first = fs::read(&output)?;
    run(&config)?;
    assert_eq!(fs::read(&output)?, first);
    Ok(())
}

#[test]
fn missing_input_leaves_output_alone() {
    let tmp = tempfile::tempdir().unwrap();
    let output = tmp.path().join("data.json");
    fs::write(&output, "previous").unwrap();

    let err = run(&Config::new(tmp.path().join("absent.csv"), &output)).unwrap_err();
    assert_eq!(err.stage(), Stage::Load);
    assert_eq!(fs::read_to_string(&output).unwrap(), "previous");

    let fresh = tmp.path().join("fresh.json");
    assert!(run(&Config::new(tmp.path().join("absent.csv"), &fresh)).is_err());
    assert!(!fresh.exists());
}

#[test]
fn unwritable_output_fails_after_load() {
    let tmp = tempfile::tempdir().unwrap();
    let input = cohort(tmp.path());
    let output = tmp.path().join("missing").join("data.json");

    let mut events = Vec::new();
    let err = run_with_progress(&Config::new(&input, &output), |e| {
        events.push(match e {
            Progress::Loading(_) => "loading",
            Progress::Loaded { .. } => "loaded",
            Progress::Saving(_) => "saving",
            Progress::Saved { .. } => "saved",
        })
    })
    .unwrap_err();

    assert_eq!(events, vec!["loading", "loaded", "saving"]);
    assert!(matches!(err, ConvertError::Write { .. }));
    assert_eq!(err.path(), Some(output.as_path()));
}

#[test]
fn strict_run_rejects_ragged_cohort() {
    let tmp = tempfile::tempdir().unwrap();
    let input = cohort(tmp.path());
    let output = tmp.path().join("data.json");

    let err = run(&Config::new(&input, &output).strict(true)).unwrap_err();
    assert!(matches!(err, ConvertError::Malformed { line: 5, .. }));
    assert!(!output.exists());
}

#[test]
fn progress_reports_counts_in_order() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let input = cohort(tmp.path());
    let output = tmp.path().join("data.json");

    let mut seen = Vec::new();
    run_with_progress(&Config::new(&input, &output), |e| match e {
        Progress::Loaded { retained } => seen.push(format!("loaded {retained}")),
        Progress::Saved { rows, path } => {
            assert!(path.is_absolute());
            seen.push(format!("saved {rows}"));
        }
        _ => {}
    })?;
    assert_eq!(seen, vec!["loaded 2", "saved 2"]);
    Ok(())
}

#[test]
fn writes_run_summary() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let input = cohort(tmp.path());
    let output = tmp.path().join("data.json");
    let summary = tmp.path().join("summary.json");

    let report = run(&Config::new(&input, &output).with_metrics_path(&summary))?;
    let back: Value = serde_json::from_str(&fs::read_to_string(&summary)?)?;
    let expected: RunMetrics = report.metrics;
    assert_eq!(back["rows_read"], expected.rows_read);
    assert_eq!(back["rows_retained"], expected.rows_retained);
    assert_eq!(back["rows_malformed"], expected.rows_malformed);
    Ok(())
}

#[test]
fn custom_required_fields_change_selection() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let input = cohort(tmp.path());
    let output = tmp.path().join("data.json");

    let report = run(&Config::new(&input, &output).with_required(RequiredFields::new(["note"])))?;
    assert_eq!(report.rows, 1);
    Ok(())
}

#[test]
fn invalid_config_is_rejected_before_io() {
    let tmp = tempfile::tempdir().unwrap();
    let input = cohort(tmp.path());
    let err = run(&Config::new(&input, &input)).unwrap_err();
    assert_eq!(err.stage(), Stage::Config);
    assert_eq!(fs::read_to_string(&input).unwrap(), COHORT);
}
