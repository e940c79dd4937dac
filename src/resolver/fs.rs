use std::path::{Path, PathBuf};

/// Read-only view of the filesystem used during discovery.
pub trait Filesystem: Send + Sync {
    fn is_file(&self, path: &Path) -> bool;

    /// Immediate children of `dir`. Missing or unreadable dirs yield nothing.
    fn list_dir(&self, dir: &Path) -> Vec<PathBuf>;
}

/// The machine's real filesystem.
pub struct HostFilesystem;

impl Filesystem for HostFilesystem {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn list_dir(&self, dir: &Path) -> Vec<PathBuf> {
        match std::fs::read_dir(dir) {
            Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
            Err(_) => Vec::new(),
        }
    }
}
