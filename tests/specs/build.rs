// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Slipway Contributors

//! One-off build scenario: several inputs travel through pipes while a
//! subscriber follows the event stream, and the terminal status only
//! appears after every input has fully arrived.

use std::io::Read;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use slipway_core::{BuildStatus, Event, Origin};
use slipway_relay::{EventStream, PipeRegistry};

fn archive(entries: &[(&str, &str)]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, body) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, body.as_bytes()).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

fn extract(bytes: &[u8]) -> Vec<(String, String)> {
    let mut archive = tar::Archive::new(GzDecoder::new(bytes));
    archive
        .entries()
        .unwrap()
        .map(|entry| {
            let mut entry = entry.unwrap();
            let name = entry.path().unwrap().to_string_lossy().into_owned();
            let mut body = String::new();
            entry.read_to_string(&mut body).unwrap();
            (name, body)
        })
        .collect()
}

#[tokio::test]
async fn inputs_arrive_before_the_terminal_status() {
    let registry = PipeRegistry::new();
    let events = EventStream::new();

    let inputs: Vec<(&str, Vec<u8>)> = vec![
        ("code", archive(&[("main.rs", "fn main() {}")])),
        ("assets", archive(&[("logo.svg", "<svg/>")])),
    ];
    let pipe_ids: Vec<String> = inputs.iter().map(|_| registry.create()).collect();

    // A live subscriber follows the whole build.
    let mut subscription = events.subscribe();

    // Relay side: drain each pipe to EOF, report the fetch, then finish
    // the build. The terminal status cannot precede any input.
    let consumer = {
        let events = events.clone();
        let readers: Vec<_> = pipe_ids
            .iter()
            .map(|id| registry.take_reader(id).unwrap())
            .collect();
        tokio::spawn(async move {
            let mut received = Vec::new();
            for (step, mut reader) in readers.into_iter().enumerate() {
                let mut bytes = Vec::new();
                reader.read_to_end(&mut bytes).await.unwrap();
                events.emit(Event::FinishGet {
                    origin: Origin { id: step as u64 + 1, source: String::new() },
                    version: None,
                    metadata: Vec::new(),
                    exit_status: 0,
                });
                received.push(bytes);
            }
            events.emit(Event::Status { status: BuildStatus::Succeeded, time: 42 });
            events.close();
            received
        })
    };

    // Client side: uploads run in parallel, one connection each.
    let mut uploads = Vec::new();
    for (id, (_, bytes)) in pipe_ids.iter().zip(&inputs) {
        let mut writer = registry.take_writer(id).unwrap();
        let bytes = bytes.clone();
        uploads.push(tokio::spawn(async move {
            writer.write_all(&bytes).await.unwrap();
            writer.shutdown().await.unwrap();
        }));
    }
    for upload in uploads {
        upload.await.unwrap();
    }

    let mut seen = Vec::new();
    let mut sequences = Vec::new();
    while let Some((seq, event)) = subscription.next().await {
        sequences.push(seq);
        seen.push(event);
    }

    assert!(sequences.windows(2).all(|w| w[0] < w[1]), "{sequences:?}");

    let terminal = seen
        .iter()
        .position(|e| matches!(e, Event::Status { status, .. } if status.is_terminal()))
        .expect("no terminal status");
    let fetches: Vec<usize> = seen
        .iter()
        .enumerate()
        .filter(|(_, e)| matches!(e, Event::FinishGet { .. }))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(fetches.len(), inputs.len());
    assert!(fetches.iter().all(|&i| i < terminal));

    let received = consumer.await.unwrap();
    assert_eq!(
        extract(&received[0]),
        vec![("main.rs".to_string(), "fn main() {}".to_string())]
    );
    assert_eq!(
        extract(&received[1]),
        vec![("logo.svg".to_string(), "<svg/>".to_string())]
    );
}

#[tokio::test]
async fn late_subscriber_replays_the_whole_build() {
    let events = EventStream::new();
    events.emit(Event::Status { status: BuildStatus::Started, time: 1 });
    events.emit(Event::Log {
        origin: Origin::default(),
        payload: "hello\n".to_string(),
    });
    events.emit(Event::Status { status: BuildStatus::Failed, time: 2 });
    events.close();

    let mut subscription = events.subscribe();
    let mut seen = Vec::new();
    while let Some((_, event)) = subscription.next().await {
        seen.push(event);
    }

    assert_eq!(seen.len(), 3);
    assert!(matches!(
        seen[2],
        Event::Status { status: BuildStatus::Failed, .. }
    ));
}
