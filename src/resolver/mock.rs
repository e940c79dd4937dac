use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use super::Filesystem;

/// An in-memory file tree for tests. Directories are implied by the files.
#[derive(Debug, Default)]
pub struct MockFilesystem {
    files: BTreeSet<PathBuf>,
}

impl MockFilesystem {
    pub fn with_files(files: &[&str]) -> Self {
        Self {
            files: files.iter().map(PathBuf::from).collect(),
        }
    }
}

impl Filesystem for MockFilesystem {
    fn is_file(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    fn list_dir(&self, dir: &Path) -> Vec<PathBuf> {
        let mut children = BTreeSet::new();
        for file in &self.files {
            let Ok(rest) = file.strip_prefix(dir) else {
                continue;
            };
            if let Some(first) = rest.components().next() {
                children.insert(dir.join(first));
            }
        }
        children.into_iter().collect()
    }
}
