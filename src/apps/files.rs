//! File search and directory tree display
//!
//! Both walk the tree with `std::fs::read_dir`, visiting files before
//! subdirectories and sorting entries by name so output is stable.
//! Symlinked directories are listed but never entered.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::platform::format_bytes;

/// A file that matched a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoundFile {
    pub path: PathBuf,
    pub size: u64,
}

/// Shell-style wildcard mask: `*` any run, `?` one character.
///
/// Matching is case-insensitive.
#[derive(Debug, Clone)]
pub struct WildcardMask {
    regex: Regex,
}

impl WildcardMask {
    pub fn new(mask: &str) -> Result<Self, regex::Error> {
        let mask = if mask.trim().is_empty() { "*" } else { mask.trim() };
        let mut pattern = String::from("(?i)^");
        for c in mask.chars() {
            match c {
                '*' => pattern.push_str(".*"),
                '?' => pattern.push('.'),
                other => pattern.push_str(&regex::escape(&other.to_string())),
            }
        }
        pattern.push('$');
        Ok(Self {
            regex: Regex::new(&pattern)?,
        })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

/// Filters applied to each candidate file.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub mask: WildcardMask,
    pub min_size: Option<u64>,
    pub max_size: Option<u64>,
}

impl SearchOptions {
    fn accepts(&self, name: &str, size: u64) -> bool {
        self.mask.matches(name)
            && self.min_size.map_or(true, |min| size >= min)
            && self.max_size.map_or(true, |max| size <= max)
    }
}

/// Matches plus the directories that could not be read.
#[derive(Debug, Default)]
pub struct SearchResults {
    pub files: Vec<FoundFile>,
    /// Directories skipped for reasons other than permission, with the error
    pub errors: Vec<(PathBuf, String)>,
}

impl SearchResults {
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }
}

fn ensure_dir(root: &Path) -> io::Result<()> {
    if root.is_dir() {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("Directory does not exist: {}", root.display()),
        ))
    }
}

/// Split a directory's entries into sorted (files, subdirectories).
fn read_sorted(dir: &Path) -> io::Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut files = Vec::new();
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        // Entries removed or unreadable mid-walk are skipped.
        let Ok(entry) = entry else {
            continue;
        };
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            dirs.push(entry.path());
        } else {
            files.push(entry.path());
        }
    }
    files.sort();
    dirs.sort();
    Ok((files, dirs))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Recursively search `root` for files accepted by `options`.
///
/// Directories that deny access are skipped silently; any other read error
/// is recorded in [`SearchResults::errors`] and the walk continues.
pub fn search(root: &Path, options: &SearchOptions) -> io::Result<SearchResults> {
    ensure_dir(root)?;
    let mut results = SearchResults::default();
    search_dir(root, options, &mut results);
    debug!(
        "Search under {} found {} files",
        root.display(),
        results.files.len()
    );
    Ok(results)
}

fn search_dir(dir: &Path, options: &SearchOptions, results: &mut SearchResults) {
    let (files, dirs) = match read_sorted(dir) {
        Ok(entries) => entries,
        Err(e) => return on_read_error(dir, e, results),
    };

    for path in files {
        // Dangling symlinks and files removed mid-walk are skipped.
        let Ok(metadata) = fs::metadata(&path) else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }
        if options.accepts(&file_name(&path), metadata.len()) {
            results.files.push(FoundFile {
                path,
                size: metadata.len(),
            });
        }
    }

    for sub in dirs {
        search_dir(&sub, options, results);
    }
}

/// Permission-denied directories are dropped quietly, anything else is recorded.
fn on_read_error(dir: &Path, err: io::Error, results: &mut SearchResults) {
    if err.kind() == io::ErrorKind::PermissionDenied {
        debug!("Skipping {}: {}", dir.display(), err);
    } else {
        results.errors.push((dir.to_path_buf(), err.to_string()));
    }
}

/// Fixed-width listing of search results with a final count.
pub fn search_table(results: &SearchResults) -> Vec<String> {
    let mut lines = vec![
        format!("{:<60} {:>15}", "Path", "Size"),
        "-".repeat(80),
    ];
    for file in &results.files {
        lines.push(format!(
            "{:<60} {:>15}",
            file.path.display(),
            format_bytes(file.size)
        ));
    }
    for (dir, err) in &results.errors {
        lines.push(format!("Error accessing {}: {}", dir.display(), err));
    }
    lines.push(String::new());
    lines.push(format!(
        "Total files found: {} ({})",
        results.files.len(),
        format_bytes(results.total_size())
    ));
    lines
}

/// Render `root` as an indented tree.
///
/// Directories appear as `[name]`, files two spaces deeper. Directories
/// below `max_depth` are shown with `...` instead of their contents.
pub fn tree_lines(root: &Path, max_depth: Option<usize>) -> io::Result<Vec<String>> {
    ensure_dir(root)?;
    let mut lines = Vec::new();
    tree_dir(root, 0, max_depth, &mut lines);
    Ok(lines)
}

fn tree_dir(dir: &Path, depth: usize, max_depth: Option<usize>, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    if max_depth.is_some_and(|max| depth > max) {
        lines.push(format!("{}[{}] ...", indent, file_name(dir)));
        return;
    }
    lines.push(format!("{}[{}]", indent, file_name(dir)));

    match read_sorted(dir) {
        Ok((files, dirs)) => {
            for file in files {
                lines.push(format!("{}  {}", indent, file_name(&file)));
            }
            for sub in dirs {
                tree_dir(&sub, depth + 1, max_depth, lines);
            }
        }
        Err(e) => lines.push(format!("{}  <{}>", indent, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn options(mask: &str) -> SearchOptions {
        SearchOptions {
            mask: WildcardMask::new(mask).unwrap(),
            min_size: None,
            max_size: None,
        }
    }

    fn fixture() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::write(root.join("notes.txt"), "hello").unwrap();
        fs::write(root.join("image.PNG"), vec![0u8; 2048]).unwrap();
        fs::create_dir_all(root.join("docs").join("old")).unwrap();
        fs::write(root.join("docs").join("readme.txt"), "x".repeat(100)).unwrap();
        fs::write(root.join("docs").join("old").join("a.log"), "").unwrap();
        temp
    }

    #[test]
    fn test_wildcard_mask() {
        let mask = WildcardMask::new("*.txt").unwrap();
        assert!(mask.matches("notes.txt"));
        assert!(mask.matches("NOTES.TXT"));
        assert!(!mask.matches("notes.txt.bak"));
        assert!(!mask.matches("notesxtxt"));

        let single = WildcardMask::new("a?.log").unwrap();
        assert!(single.matches("ab.log"));
        assert!(!single.matches("abc.log"));

        assert!(WildcardMask::new("").unwrap().matches("anything"));
        assert!(WildcardMask::new("[x](y)+").unwrap().matches("[x](y)+"));
    }

    #[test]
    fn test_search_recurses_with_mask() {
        let temp = fixture();
        let results = search(temp.path(), &options("*.txt")).unwrap();
        let found: Vec<_> = results
            .files
            .iter()
            .map(|f| f.path.strip_prefix(temp.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            found,
            vec![PathBuf::from("notes.txt"), PathBuf::from("docs/readme.txt")]
        );
        assert_eq!(results.total_size(), 105);
        assert!(results.errors.is_empty());
    }

    #[test]
    fn test_search_size_filters() {
        let temp = fixture();
        let mut opts = options("*");
        opts.min_size = Some(100);
        opts.max_size = Some(1024);
        let results = search(temp.path(), &opts).unwrap();
        assert_eq!(results.files.len(), 1);
        assert_eq!(results.files[0].size, 100);
    }

    #[test]
    fn test_search_missing_root() {
        let temp = TempDir::new().unwrap();
        let err = search(&temp.path().join("missing"), &options("*")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_search_table_summary() {
        let temp = fixture();
        let results = search(temp.path(), &options("*.png")).unwrap();
        let lines = search_table(&results);
        assert!(lines[0].starts_with("Path"));
        assert!(lines[2].ends_with("2.00 KB"));
        assert_eq!(lines.last().unwrap(), "Total files found: 1 (2.00 KB)");
    }

    #[test]
    fn test_read_errors_are_classified() {
        let mut results = SearchResults::default();
        let dir = Path::new("/srv/locked");

        on_read_error(
            dir,
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            &mut results,
        );
        assert!(results.errors.is_empty());

        on_read_error(dir, io::Error::new(io::ErrorKind::Other, "stale handle"), &mut results);
        assert_eq!(
            results.errors,
            vec![(PathBuf::from("/srv/locked"), "stale handle".to_string())]
        );

        let lines = search_table(&results);
        assert!(lines.contains(&"Error accessing /srv/locked: stale handle".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn test_search_skips_unreadable_directory() {
        use std::os::unix::fs::PermissionsExt;

        let temp = fixture();
        let locked = temp.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("secret.txt"), "x").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Root ignores directory permissions.
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let results = search(temp.path(), &options("*.txt"));
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let results = results.unwrap();
        assert!(results.errors.is_empty());
        assert_eq!(results.files.len(), 2);
        assert!(results.files.iter().all(|f| !f.path.starts_with(&locked)));
    }

    #[test]
    fn test_tree_layout() {
        let temp = fixture();
        let root_name = file_name(temp.path());
        let lines = tree_lines(temp.path(), None).unwrap();
        assert_eq!(
            lines,
            vec![
                format!("[{}]", root_name),
                "  image.PNG".to_string(),
                "  notes.txt".to_string(),
                "  [docs]".to_string(),
                "    readme.txt".to_string(),
                "    [old]".to_string(),
                "      a.log".to_string(),
            ]
        );
    }

    #[test]
    fn test_tree_depth_limit() {
        let temp = fixture();
        let lines = tree_lines(temp.path(), Some(1)).unwrap();
        assert!(lines.contains(&"  [docs]".to_string()));
        assert!(lines.contains(&"    [old] ...".to_string()));
        assert!(!lines.contains(&"      a.log".to_string()));
    }
}
