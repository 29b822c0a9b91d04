// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Slipway Contributors

//! Resource protocol scenario: real shell scripts standing in for a
//! resource image, driven through the full runner/sandbox stack.

use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use async_trait::async_trait;

use slipway_core::{Params, Source, Version};
use slipway_resource::{
    CheckInput, GetInput, ProcessOutput, ProcessSandbox, ProcessSpec, ProtocolRunner,
    RunnerError, Sandbox, SandboxError,
};

/// Maps the fixed script paths into a temporary directory so the tests
/// can provide their own check/in/out executables.
struct RelocatedSandbox {
    root: PathBuf,
    inner: ProcessSandbox,
}

#[async_trait]
impl Sandbox for RelocatedSandbox {
    async fn run(&self, mut spec: ProcessSpec) -> Result<ProcessOutput, SandboxError> {
        let relative = spec.path.trim_start_matches('/');
        spec.path = self.root.join(relative).to_string_lossy().into_owned();
        self.inner.run(spec).await
    }
}

fn install_script(root: &std::path::Path, name: &str, body: &str) {
    let dir = root.join("opt/resource");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

fn source() -> Source {
    Source::from_iter([("uri", "https://example.com/repo.git")])
}

#[tokio::test]
async fn check_runs_the_script_and_parses_versions() {
    let root = tempfile::tempdir().unwrap();
    // The script sees the full request on stdin and reports versions,
    // oldest first, on stdout.
    install_script(
        root.path(),
        "check",
        r#"cat > /dev/null
echo '[{"ref":"abc"},{"ref":"def"}]'"#,
    );

    let runner = ProtocolRunner::new(RelocatedSandbox {
        root: root.path().to_path_buf(),
        inner: ProcessSandbox,
    });
    let versions = runner
        .check(CheckInput {
            resource_type: "git".to_string(),
            source: source(),
            version: None,
        })
        .await
        .unwrap();

    assert_eq!(
        versions,
        vec![
            Version::from_iter([("ref", "abc")]),
            Version::from_iter([("ref", "def")]),
        ]
    );
}

#[tokio::test]
async fn check_receives_the_prior_version_on_stdin() {
    let root = tempfile::tempdir().unwrap();
    // Echo the request back as the error channel so the test can see
    // exactly what arrived.
    install_script(root.path(), "check", "cat >&2\nexit 1");

    let runner = ProtocolRunner::new(RelocatedSandbox {
        root: root.path().to_path_buf(),
        inner: ProcessSandbox,
    });
    let err = runner
        .check(CheckInput {
            resource_type: "git".to_string(),
            source: source(),
            version: Some(Version::from_iter([("ref", "abc")])),
        })
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains(r#""version":{"ref":"abc"}"#), "{message}");
    assert!(message.ends_with("exit status 1"), "{message}");
    assert!(matches!(err, RunnerError::RemoteFailure { status: 1, .. }));
}

#[tokio::test]
async fn get_reports_version_and_metadata() {
    let root = tempfile::tempdir().unwrap();
    install_script(
        root.path(),
        "in",
        r#"cat > /dev/null
echo '{"version":{"ref":"abc"},"metadata":[{"name":"commit","value":"abc"}]}'"#,
    );

    let runner = ProtocolRunner::new(RelocatedSandbox {
        root: root.path().to_path_buf(),
        inner: ProcessSandbox,
    });
    let summary = runner
        .get(GetInput {
            resource_type: "git".to_string(),
            source: source(),
            version: Some(Version::from_iter([("ref", "abc")])),
            params: Params::new(),
            destination: "/tmp/build/get".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(summary.version, Version::from_iter([("ref", "abc")]));
    assert_eq!(summary.metadata.len(), 1);
    assert_eq!(summary.metadata[0].name, "commit");
}

#[tokio::test]
async fn garbage_stdout_is_a_protocol_violation() {
    let root = tempfile::tempdir().unwrap();
    install_script(root.path(), "check", "cat > /dev/null\necho 'not json'");

    let runner = ProtocolRunner::new(RelocatedSandbox {
        root: root.path().to_path_buf(),
        inner: ProcessSandbox,
    });
    let err = runner
        .check(CheckInput {
            resource_type: "git".to_string(),
            source: source(),
            version: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, RunnerError::ProtocolViolation(_)), "{err:?}");
}
