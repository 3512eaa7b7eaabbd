// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::window::Window;
use chrono::NaiveTime;
use std::time::Duration;

fn sample_step() -> StepDef {
    StepDef {
        name: StepName::new("dl_am"),
        kind: StepKind::WindowedJob,
        windows: vec![Window {
            start: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        }],
        dependencies: BTreeSet::new(),
        executable: PathBuf::from("C:/tools/dl.exe"),
        arguments: vec!["--morning".to_string()],
        timeout: Duration::from_secs(600),
        max_attempts_per_window: 3,
        required_days_of_week: BTreeSet::new(),
        post_success_artifact_check: None,
        catch_up: false,
        closes_application_on_exit: false,
    }
}

#[test]
fn depends_on_checks_direct_dependency_membership() {
    let mut step = sample_step();
    step.dependencies.insert(StepName::new("login"));
    assert!(step.depends_on(&StepName::new("login")));
    assert!(!step.depends_on(&StepName::new("merge")));
}

#[test]
fn default_max_attempts_is_one() {
    assert_eq!(StepDef::default_max_attempts(), 1);
}

#[test]
fn artifact_check_default_min_count_is_one() {
    let check = ArtifactCheck {
        dir: ArtifactDir::Csv,
        glob: "*.csv".to_string(),
        min_count: ArtifactCheck::default_min_count(),
        min_size_bytes: 0,
        min_age_millis: 0,
    };
    assert_eq!(check.min_count, 1);
}

#[test]
fn timeout_round_trips_through_serde_as_a_duration_string() {
    let step = sample_step();
    let json = serde_json::to_string(&step).unwrap();
    assert!(json.contains("\"timeout\":\"10m\""));
    let parsed: StepDef = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.timeout, step.timeout);
}

#[test]
fn step_kind_serializes_as_snake_case() {
    assert_eq!(
        serde_json::to_string(&StepKind::DependencyGated).unwrap(),
        "\"dependency_gated\""
    );
}
