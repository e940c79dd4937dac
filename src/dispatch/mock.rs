use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{AttemptResult, CommandRunner};

/// A scripted runner for tests. Returns pre-defined results in order and
/// records every invocation.
pub struct ScriptedRunner {
    results: Vec<AttemptResult>,
    index: AtomicUsize,
    calls: Mutex<Vec<(PathBuf, Vec<String>)>>,
}

impl ScriptedRunner {
    pub fn new(results: Vec<AttemptResult>) -> Self {
        Self {
            results,
            index: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Program and arguments of every call so far, in order.
    pub fn calls(&self) -> Vec<(PathBuf, Vec<String>)> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, program: &Path, args: &[String]) -> Result<AttemptResult> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((program.to_path_buf(), args.to_vec()));

        let i = self.index.fetch_add(1, Ordering::SeqCst);
        self.results.get(i).cloned().ok_or_else(|| {
            anyhow::anyhow!("ScriptedRunner: no more results (called {} times)", i + 1)
        })
    }
}
