// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Slipway Contributors

use std::path::PathBuf;

use tokio::io::BufReader;

use slipway_core::{BuildStatus, Event, Origin, Step, TaskConfig, TaskInput};
use slipway_wire::{PipeResource, ProtocolError, SseReader, SseWriter};

use super::{assemble_plan, drain_feed, parse_input, resolve_inputs};

fn config_with_inputs(names: &[&str]) -> TaskConfig {
    TaskConfig {
        platform: "linux".to_string(),
        inputs: names
            .iter()
            .map(|name| TaskInput {
                name: name.to_string(),
            })
            .collect(),
        ..TaskConfig::default()
    }
}

fn pipe(id: &str) -> PipeResource {
    PipeResource {
        id: id.to_string(),
        read_url: format!("http://127.0.0.1:8080/api/v1/pipes/{}", id),
        write_url: format!("http://127.0.0.1:8080/api/v1/pipes/{}", id),
    }
}

#[test]
fn parses_input_mappings() {
    assert_eq!(
        parse_input("code=./src").unwrap(),
        ("code".to_string(), PathBuf::from("./src"))
    );
    assert!(parse_input("code").is_err());
    assert!(parse_input("=path").is_err());
}

#[test]
fn inputs_default_to_their_name() {
    let config = config_with_inputs(&["code", "deps"]);
    let resolved = resolve_inputs(&config, &[]).unwrap();
    assert_eq!(
        resolved,
        vec![
            ("code".to_string(), PathBuf::from("code")),
            ("deps".to_string(), PathBuf::from("deps")),
        ]
    );
}

#[test]
fn input_mapping_overrides_default() {
    let config = config_with_inputs(&["code"]);
    let overrides = vec![("code".to_string(), PathBuf::from("/tmp/checkout"))];
    let resolved = resolve_inputs(&config, &overrides).unwrap();
    assert_eq!(resolved, vec![("code".to_string(), PathBuf::from("/tmp/checkout"))]);
}

#[test]
fn undeclared_input_mapping_is_rejected() {
    let config = config_with_inputs(&["code"]);
    let overrides = vec![("nope".to_string(), PathBuf::from("."))];
    let err = resolve_inputs(&config, &overrides).unwrap_err();
    assert!(err.to_string().contains("nope"), "{err}");
}

#[test]
fn plan_fetches_inputs_then_runs_task() {
    let pipes = vec![
        ("code".to_string(), PathBuf::from("code"), pipe("p1")),
        ("deps".to_string(), PathBuf::from("deps"), pipe("p2")),
    ];
    let plan = assemble_plan(config_with_inputs(&["code", "deps"]), &pipes);

    let Step::Do(stages) = &plan.step else {
        panic!("expected do step, got {:?}", plan.step);
    };
    assert_eq!(stages.len(), 2);

    let Step::Aggregate(gets) = &stages[0].step else {
        panic!("expected aggregate first, got {:?}", stages[0].step);
    };
    assert_eq!(gets.len(), 2);
    let Step::Get {
        name,
        resource_type,
        source,
        version,
    } = &gets[0].step
    else {
        panic!("expected get step, got {:?}", gets[0].step);
    };
    assert_eq!(name, "code");
    assert_eq!(resource_type, "archive");
    assert_eq!(source.get("uri"), Some("http://127.0.0.1:8080/api/v1/pipes/p1"));
    assert!(version.is_none());

    assert!(matches!(&stages[1].step, Step::Task { name, .. } if name == "one-off"));
}

#[test]
fn plan_node_identifiers_are_unique() {
    let pipes = vec![("code".to_string(), PathBuf::from("code"), pipe("p1"))];
    let plan = assemble_plan(config_with_inputs(&["code"]), &pipes);

    let mut ids = Vec::new();
    collect_ids(&plan, &mut ids);
    let count = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), count, "duplicate plan identifiers");
}

fn collect_ids(plan: &slipway_core::Plan, ids: &mut Vec<u64>) {
    ids.push(plan.id);
    if let Step::Do(children) | Step::Aggregate(children) = &plan.step {
        for child in children {
            collect_ids(child, ids);
        }
    }
}

#[test]
fn task_only_plan_when_no_inputs_declared() {
    let plan = assemble_plan(config_with_inputs(&[]), &[]);
    let Step::Do(stages) = &plan.step else {
        panic!("expected do step, got {:?}", plan.step);
    };
    assert_eq!(stages.len(), 1);
    assert!(matches!(&stages[0].step, Step::Task { .. }));
}

async fn feed_bytes(events: &[Event], end: bool) -> Vec<u8> {
    let mut writer = SseWriter::new(Vec::new());
    for (i, event) in events.iter().enumerate() {
        writer.write_event(i as u64, event).await.unwrap();
    }
    if end {
        writer.write_end().await.unwrap();
    }
    writer.into_inner()
}

#[tokio::test]
async fn feed_drains_to_terminal_status() {
    let bytes = feed_bytes(
        &[
            Event::Status {
                status: BuildStatus::Started,
                time: 1,
            },
            Event::Log {
                origin: Origin::default(),
                payload: "hello\n".to_string(),
            },
            Event::Status {
                status: BuildStatus::Failed,
                time: 2,
            },
        ],
        true,
    )
    .await;

    let mut feed = SseReader::new(BufReader::new(bytes.as_slice()));
    let mut last_seen = None;
    let status = drain_feed(&mut feed, &mut last_seen).await.unwrap();
    assert_eq!(status, Some(BuildStatus::Failed));
    assert_eq!(last_seen, Some(2));
}

#[tokio::test]
async fn already_rendered_records_are_skipped_on_resume() {
    let bytes = feed_bytes(
        &[
            Event::Status {
                status: BuildStatus::Started,
                time: 1,
            },
            Event::Status {
                status: BuildStatus::Succeeded,
                time: 2,
            },
        ],
        true,
    )
    .await;

    // A previous connection already rendered both records; resuming
    // past them must not re-report the terminal status.
    let mut feed = SseReader::new(BufReader::new(bytes.as_slice()));
    let mut last_seen = Some(1);
    let status = drain_feed(&mut feed, &mut last_seen).await.unwrap();
    assert_eq!(status, None);
}

#[tokio::test]
async fn feed_closing_without_end_marker_is_premature() {
    let bytes = feed_bytes(
        &[Event::Status {
            status: BuildStatus::Started,
            time: 1,
        }],
        false,
    )
    .await;

    let mut feed = SseReader::new(BufReader::new(bytes.as_slice()));
    let err = drain_feed(&mut feed, &mut None).await.unwrap_err();
    assert!(matches!(err, ProtocolError::PrematureClose));
}
