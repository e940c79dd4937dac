//! Runs the engine through each interpreter candidate in turn.
//!
//! Only discovery problems are retried. When a candidate runs and the
//! engine fails, that failure is the answer: trying more interpreters would
//! hide a real bug or bad input behind a later, unrelated result.

pub mod mock;
pub mod process;

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::consts::{MISSING_RUNTIME_PHRASES, REDACTED};
use crate::error::CheckError;
use crate::resolver::Candidate;

/// Exit code and interleaved stdout/stderr of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptResult {
    pub exit_code: i32,
    pub combined_output: String,
}

impl AttemptResult {
    pub fn new(exit_code: i32, combined_output: impl Into<String>) -> Self {
        Self {
            exit_code,
            combined_output: combined_output.into(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }

    /// Output says the interpreter itself could not be found.
    pub fn is_missing_runtime(&self) -> bool {
        looks_like_missing_runtime(&self.combined_output)
    }
}

pub fn looks_like_missing_runtime(output: &str) -> bool {
    let text = output.to_lowercase();
    MISSING_RUNTIME_PHRASES
        .iter()
        .any(|phrase| text.contains(phrase))
}

/// What a whole dispatch produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub succeeded: bool,
    pub final_attempt: AttemptResult,
    /// Last command line tried, password redacted.
    pub command: String,
    pub attempts: usize,
}

impl DispatchOutcome {
    /// Engine output on success, otherwise the classified failure.
    pub fn into_result(self) -> Result<String, CheckError> {
        if self.succeeded {
            Ok(self.final_attempt.combined_output)
        } else if self.final_attempt.is_missing_runtime() {
            Err(CheckError::DiscoveryExhausted(self))
        } else {
            Err(CheckError::EngineFailed(self))
        }
    }
}

/// The fixed arguments every candidate receives after its own prefix.
#[derive(Debug, Clone, Copy)]
pub struct EngineArgs<'a> {
    pub script: &'a Path,
    pub password: &'a str,
}

impl EngineArgs<'_> {
    fn argv(&self, candidate: &Candidate) -> Vec<String> {
        let mut argv = candidate.prefix.clone();
        argv.push(self.script.to_string_lossy().into_owned());
        argv.push(self.password.to_string());
        argv
    }

    /// Shell-style rendering for logs. Never used to execute anything.
    pub fn describe(&self, candidate: &Candidate) -> String {
        let mut parts = vec![shell_quote(&candidate.program.to_string_lossy())];
        parts.extend(candidate.prefix.iter().map(|a| shell_quote(a)));
        parts.push(shell_quote(&self.script.to_string_lossy()));
        parts.push(shell_quote(REDACTED));
        parts.join(" ")
    }
}

fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@+,".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Starts a program and collects its exit code and output.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Failing to start the program is a normal [`AttemptResult`]; `Err` is
    /// reserved for plumbing failures on our side.
    async fn run(&self, program: &Path, args: &[String]) -> Result<AttemptResult>;
}

/// Walks the candidate list with a [`CommandRunner`]. Holds no per-request state.
pub struct ProcessDispatcher {
    runner: Arc<dyn CommandRunner>,
}

impl ProcessDispatcher {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    pub async fn dispatch(
        &self,
        candidates: &[Candidate],
        args: EngineArgs<'_>,
    ) -> Result<DispatchOutcome, CheckError> {
        let mut last: Option<DispatchOutcome> = None;

        for (i, candidate) in candidates.iter().enumerate() {
            let command = args.describe(candidate);
            tracing::debug!(op = "dispatch.attempt", attempt = i + 1, %command);

            let attempt = self
                .runner
                .run(&candidate.program, &args.argv(candidate))
                .await
                .map_err(|e| CheckError::Internal(format!("{e:#}")))?;

            let succeeded = attempt.succeeded();
            let missing = !succeeded && attempt.is_missing_runtime();
            let outcome = DispatchOutcome {
                succeeded,
                final_attempt: attempt,
                command,
                attempts: i + 1,
            };

            if !missing {
                return Ok(outcome);
            }

            tracing::info!(
                op = "dispatch.fallback",
                command = %outcome.command,
                exit_code = outcome.final_attempt.exit_code,
                "interpreter not found, trying next candidate"
            );
            last = Some(outcome);
        }

        last.ok_or_else(|| CheckError::Internal("no interpreter candidates".to_string()))
    }
}
