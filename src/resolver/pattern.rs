//! Expands install-location patterns like `C:/Program Files/Python*/python.exe`.
//!
//! Wildcards may appear in any path segment. Only segments with wildcards
//! cause a directory listing; literal segments are joined as-is.

use globset::{GlobBuilder, GlobMatcher};
use std::path::PathBuf;

use super::Filesystem;

fn has_wildcard(segment: &str) -> bool {
    segment.contains(['*', '?', '[', '{'])
}

fn matcher(segment: &str) -> Option<GlobMatcher> {
    match GlobBuilder::new(segment).case_insensitive(true).build() {
        Ok(glob) => Some(glob.compile_matcher()),
        Err(e) => {
            tracing::warn!(op = "resolver.pattern", segment, error = %e, "invalid glob segment");
            None
        }
    }
}

/// Existing files matching `pattern`, sorted.
pub fn expand(fs: &dyn Filesystem, pattern: &str) -> Vec<PathBuf> {
    let segments: Vec<&str> = pattern.split('/').collect();
    let Some(first_wild) = segments.iter().position(|s| has_wildcard(s)) else {
        let path = PathBuf::from(pattern);
        return if fs.is_file(&path) { vec![path] } else { Vec::new() };
    };

    // Keep the literal prefix whole so drive letters stay absolute.
    let root = match segments[..first_wild].join("/") {
        r if !r.is_empty() => PathBuf::from(r),
        _ if pattern.starts_with('/') => PathBuf::from("/"),
        _ => PathBuf::from("."),
    };

    let mut current = vec![root];
    for segment in &segments[first_wild..] {
        if segment.is_empty() {
            continue;
        }
        if has_wildcard(segment) {
            let Some(m) = matcher(segment) else {
                return Vec::new();
            };
            current = current
                .iter()
                .flat_map(|dir| fs.list_dir(dir))
                .filter(|p| p.file_name().is_some_and(|name| m.is_match(name)))
                .collect();
        } else {
            current = current.iter().map(|dir| dir.join(segment)).collect();
        }
        if current.is_empty() {
            break;
        }
    }

    let mut found: Vec<PathBuf> = current.into_iter().filter(|p| fs.is_file(p)).collect();
    found.sort();
    found.dedup();
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::mock::MockFilesystem;

    #[test]
    fn literal_pattern_checks_existence() {
        let fs = MockFilesystem::with_files(&["/usr/bin/python3"]);
        assert_eq!(
            expand(&fs, "/usr/bin/python3"),
            vec![PathBuf::from("/usr/bin/python3")]
        );
        assert!(expand(&fs, "/usr/bin/python2").is_empty());
    }

    #[test]
    fn wildcard_in_one_segment() {
        let fs = MockFilesystem::with_files(&[
            "C:/Program Files/Python312/python.exe",
            "C:/Program Files/Python311/python.exe",
            "C:/Program Files/Git/git.exe",
        ]);
        assert_eq!(
            expand(&fs, "C:/Program Files/Python*/python.exe"),
            vec![
                PathBuf::from("C:/Program Files/Python311/python.exe"),
                PathBuf::from("C:/Program Files/Python312/python.exe"),
            ]
        );
    }

    #[test]
    fn wildcards_in_several_segments() {
        let fs = MockFilesystem::with_files(&[
            "C:/Users/alex/AppData/Local/Programs/Python/Python312/python.exe",
            "C:/Users/sam/AppData/Local/Programs/Python/Python310/python.exe",
            "C:/Users/sam/AppData/Local/Programs/Other/tool.exe",
        ]);
        assert_eq!(
            expand(
                &fs,
                "C:/Users/*/AppData/Local/Programs/Python/Python*/python.exe"
            ),
            vec![
                PathBuf::from("C:/Users/alex/AppData/Local/Programs/Python/Python312/python.exe"),
                PathBuf::from("C:/Users/sam/AppData/Local/Programs/Python/Python310/python.exe"),
            ]
        );
    }

    #[test]
    fn matching_ignores_case() {
        let fs = MockFilesystem::with_files(&["C:/Program Files/PYTHON39/python.exe"]);
        assert_eq!(expand(&fs, "C:/Program Files/Python*/python.exe").len(), 1);
    }

    #[test]
    fn no_matches_is_empty() {
        let fs = MockFilesystem::default();
        assert!(expand(&fs, "C:/Program Files/Python*/python.exe").is_empty());
    }

    #[test]
    fn works_against_real_directories() {
        let dir = tempfile::tempdir().unwrap();
        let install = dir.path().join("Python313");
        std::fs::create_dir(&install).unwrap();
        std::fs::write(install.join("python.exe"), b"").unwrap();
        std::fs::create_dir(dir.path().join("Python27")).unwrap();

        let root = dir.path().to_str().unwrap().replace('\\', "/");
        let found = expand(
            &crate::resolver::HostFilesystem,
            &format!("{root}/Python*/python.exe"),
        );
        assert_eq!(found, vec![install.join("python.exe")]);
    }
}
