use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use super::{AttemptResult, CommandRunner};

/// Exit codes a POSIX shell would report for spawn failures.
const EXIT_NOT_FOUND: i32 = 127;
const EXIT_CANNOT_EXECUTE: i32 = 126;

/// Runs real processes with an argument vector. No shell is involved, so
/// nothing needs escaping.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    fn spawn_failure(program: &Path, err: &std::io::Error) -> AttemptResult {
        let code = if err.kind() == ErrorKind::NotFound {
            EXIT_NOT_FOUND
        } else {
            EXIT_CANNOT_EXECUTE
        };
        AttemptResult::new(code, format!("{}: {}", program.display(), err))
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, program: &Path, args: &[String]) -> Result<AttemptResult> {
        // One pipe for both streams keeps the engine's own interleaving.
        let (mut reader, writer) = std::io::pipe().context("failed to create output pipe")?;
        let writer_err = writer
            .try_clone()
            .context("failed to duplicate output pipe")?;

        let spawned = {
            let mut cmd = Command::new(program);
            cmd.args(args)
                .stdin(Stdio::null())
                .stdout(writer)
                .stderr(writer_err)
                .kill_on_drop(true);
            cmd.spawn()
            // `cmd` drops here and closes our copies of the write end,
            // otherwise the reader would never see EOF.
        };

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => return Ok(Self::spawn_failure(program, &e)),
        };

        let collect = tokio::task::spawn_blocking(move || {
            let mut buf = Vec::new();
            reader.read_to_end(&mut buf).map(|_| buf)
        });

        let status = match self.timeout {
            None => child.wait().await.context("failed to wait for engine")?,
            Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                Ok(status) => status.context("failed to wait for engine")?,
                Err(_) => {
                    if let Err(e) = child.kill().await {
                        tracing::warn!(
                            op = "dispatch.timeout",
                            program = %program.display(),
                            error = %e,
                            "failed to kill engine after time limit"
                        );
                    }
                    tracing::warn!(
                        op = "dispatch.timeout",
                        program = %program.display(),
                        secs = limit.as_secs(),
                        "engine exceeded time limit and was killed"
                    );
                    return Ok(AttemptResult::new(
                        -1,
                        format!("timed out after {}s", limit.as_secs()),
                    ));
                }
            },
        };

        let bytes = collect
            .await
            .context("output reader task failed")?
            .context("failed to read engine output")?;

        Ok(AttemptResult {
            exit_code: status.code().unwrap_or(-1),
            combined_output: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}
