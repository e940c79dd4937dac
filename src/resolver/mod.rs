//! Works out the ways the engine's interpreter might be invoked.
//!
//! Resolution never runs anything. It reads configuration and asks a
//! [`Filesystem`] whether files exist, so the same inputs always produce
//! the same candidate list.

pub mod fs;
pub mod mock;
pub mod pattern;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::consts::{
    DESKTOP_FALLBACK, DESKTOP_INSTALL_PATTERNS, LAUNCHER, LAUNCHER_ARGS, SERVER_CANONICAL_PATH,
    SERVER_FALLBACK,
};

pub use fs::{Filesystem, HostFilesystem};

/// One way to start the interpreter: a program plus leading arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub program: PathBuf,
    pub prefix: Vec<String>,
}

impl Candidate {
    pub fn bare(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            prefix: Vec::new(),
        }
    }

    pub fn with_prefix(program: impl Into<PathBuf>, prefix: &[&str]) -> Self {
        Self {
            program: program.into(),
            prefix: prefix.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.prefix {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Host class, which decides the discovery strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Windows-style desktop: launcher, install dirs, then `python`.
    Desktop,
    /// Unix-like server: canonical path or `python3`.
    Server,
}

impl Platform {
    pub fn host() -> Self {
        if cfg!(windows) {
            Platform::Desktop
        } else {
            Platform::Server
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Desktop => f.write_str("desktop"),
            Platform::Server => f.write_str("server"),
        }
    }
}

/// Produces the ordered candidate list for a fixed configuration.
pub struct InterpreterResolver {
    python_bin: Option<PathBuf>,
    platform: Platform,
    fs: Arc<dyn Filesystem>,
}

impl InterpreterResolver {
    pub fn new(config: &Config, platform: Platform, fs: Arc<dyn Filesystem>) -> Self {
        Self {
            python_bin: config.python_bin.clone(),
            platform,
            fs,
        }
    }

    /// Resolver for the current host, backed by the real filesystem.
    pub fn for_host(config: &Config) -> Self {
        Self::new(config, Platform::host(), Arc::new(HostFilesystem))
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Ordered, never empty. Earlier candidates are tried first.
    pub fn candidates(&self) -> Vec<Candidate> {
        if let Some(bin) = &self.python_bin {
            return vec![Candidate::bare(bin.clone())];
        }

        match self.platform {
            Platform::Desktop => self.desktop_candidates(),
            Platform::Server => self.server_candidates(),
        }
    }

    fn desktop_candidates(&self) -> Vec<Candidate> {
        let mut out = vec![Candidate::with_prefix(LAUNCHER, LAUNCHER_ARGS)];
        for glob in DESKTOP_INSTALL_PATTERNS {
            for path in pattern::expand(self.fs.as_ref(), glob) {
                let candidate = Candidate::bare(path);
                if !out.contains(&candidate) {
                    out.push(candidate);
                }
            }
        }
        out.push(Candidate::bare(DESKTOP_FALLBACK));
        out
    }

    fn server_candidates(&self) -> Vec<Candidate> {
        let canonical = PathBuf::from(SERVER_CANONICAL_PATH);
        if self.fs.is_file(&canonical) {
            vec![Candidate::bare(canonical)]
        } else {
            vec![Candidate::bare(SERVER_FALLBACK)]
        }
    }
}
