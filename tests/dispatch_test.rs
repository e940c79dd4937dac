#![cfg(unix)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use breachcheck::dispatch::process::ProcessRunner;
use breachcheck::dispatch::{EngineArgs, ProcessDispatcher};
use breachcheck::error::CheckError;
use breachcheck::resolver::Candidate;

/// Write a shell "engine" into a temp dir. `sh` plays the interpreter, so
/// `$1` is the password, exactly where a Python script would find it.
fn engine(body: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("check_password.sh");
    std::fs::write(&path, body).unwrap();
    (dir, path)
}

fn dispatcher() -> ProcessDispatcher {
    ProcessDispatcher::new(Arc::new(ProcessRunner::default()))
}

fn args<'a>(script: &'a Path, password: &'a str) -> EngineArgs<'a> {
    EngineArgs { script, password }
}

#[tokio::test]
async fn engine_receives_password_as_single_argument() {
    let (_dir, script) = engine(r#"printf 'got [%s] with %d args\n' "$1" "$#""#);

    let outcome = dispatcher()
        .dispatch(&[Candidate::bare("sh")], args(&script, "two words; $(id)"))
        .await
        .unwrap();

    assert!(outcome.succeeded);
    assert_eq!(
        outcome.into_result().unwrap(),
        "got [two words; $(id)] with 1 args\n"
    );
}

#[tokio::test]
async fn missing_interpreter_falls_back_to_next_candidate() {
    let (_dir, script) = engine("echo 'Breached 3 times.'");

    let outcome = dispatcher()
        .dispatch(
            &[
                Candidate::bare("/nonexistent/bin/python3"),
                Candidate::bare("sh"),
            ],
            args(&script, "password1"),
        )
        .await
        .unwrap();

    assert!(outcome.succeeded);
    assert_eq!(outcome.attempts, 2);
    assert_eq!(outcome.final_attempt.combined_output.trim(), "Breached 3 times.");
}

#[tokio::test]
async fn engine_failure_is_not_retried() {
    let (_dir, script) = engine("echo 'ValueError: bad hash' >&2; exit 2");

    let outcome = dispatcher()
        .dispatch(
            &[Candidate::bare("sh"), Candidate::bare("sh")],
            args(&script, "password1"),
        )
        .await
        .unwrap();

    assert!(!outcome.succeeded);
    assert_eq!(outcome.attempts, 1);
    assert_eq!(outcome.final_attempt.exit_code, 2);

    match outcome.into_result() {
        Err(CheckError::EngineFailed(o)) => {
            assert_eq!(o.final_attempt.combined_output.trim(), "ValueError: bad hash");
            assert!(!o.command.contains("password1"));
        }
        other => panic!("expected EngineFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn all_candidates_missing_is_discovery_exhausted() {
    let (_dir, script) = engine("echo unreachable");

    let outcome = dispatcher()
        .dispatch(
            &[
                Candidate::with_prefix("/nonexistent/py", &["-3"]),
                Candidate::bare("/nonexistent/python"),
            ],
            args(&script, "password1"),
        )
        .await
        .unwrap();

    assert_eq!(outcome.attempts, 2);
    assert_eq!(outcome.final_attempt.exit_code, 127);
    assert!(outcome.command.starts_with("/nonexistent/python "));
    assert!(matches!(
        outcome.into_result(),
        Err(CheckError::DiscoveryExhausted(_))
    ));
}

#[tokio::test]
async fn script_that_says_not_found_counts_as_missing_runtime() {
    // Output is classified, not the cause: a script that prints a
    // "not found" phrase and fails is indistinguishable from a missing
    // interpreter and is retried.
    let (_dir, script) = engine("echo 'sh: python3: not found'; exit 127");

    let outcome = dispatcher()
        .dispatch(
            &[Candidate::bare("sh"), Candidate::bare("sh")],
            args(&script, "pw"),
        )
        .await
        .unwrap();

    assert_eq!(outcome.attempts, 2);
}
