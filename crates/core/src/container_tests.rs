// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Slipway Contributors

use super::*;

fn record() -> ContainerRecord {
    ContainerRecord {
        handle: "handle-1".into(),
        worker_name: "worker-a".into(),
        pipeline_name: "main".into(),
        job_name: "build".into(),
        build_id: 12,
        build_name: "3".into(),
        step_type: StepType::Task,
        step_name: "unit".into(),
        resource_name: None,
        working_directory: "/tmp/build".into(),
        env: vec!["CI=true".into()],
        user: "root".into(),
        attempt: Attempt::default(),
    }
}

#[test]
fn menu_line_omits_empty_attempt() {
    assert_eq!(record().menu_line(), "build #3, step: unit, type: task");
}

#[test]
fn menu_line_includes_attempt_path() {
    let mut r = record();
    r.attempt = Attempt(vec![1, 1, 2]);
    assert_eq!(r.menu_line(), "build #3, step: unit, type: task, attempt: 1.1.2");
}

#[yare::parameterized(
    get   = { StepType::Get, "get" },
    put   = { StepType::Put, "put" },
    task  = { StepType::Task, "task" },
    check = { StepType::Check, "check" },
)]
fn step_type_serde_tag_matches_display(step_type: StepType, expected: &str) {
    assert_eq!(step_type.to_string(), expected);
    let json = serde_json::to_string(&step_type).unwrap();
    assert_eq!(json, format!("\"{}\"", expected));
}

#[test]
fn record_roundtrips_through_json() {
    let mut r = record();
    r.resource_name = Some("repo".into());
    r.step_type = StepType::Check;
    let json = serde_json::to_string(&r).unwrap();
    let parsed: ContainerRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, r);
}
