pub mod action_executor;

use crate::error::{Result, TriageError};
use chrono::{DateTime, Local};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Names starting with this marker are hidden and never triaged
pub const HIDDEN_MARKER: char = '.';

/// Characters that may not appear in a new file name
pub const ILLEGAL_NAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    pub name: String,
    /// Extension without the leading dot, if the name has one
    pub extension: Option<String>,
    pub size: u64,
    pub modified_date: DateTime<Local>,
}

impl FileEntry {
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let metadata = fs::metadata(path)?;
        let modified_date: DateTime<Local> = metadata.modified()?.into();

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("File name is not valid UTF-8: {:?}", path),
                )
            })?
            .to_string();

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_string);

        Ok(FileEntry {
            path: path.to_path_buf(),
            name,
            extension,
            size: metadata.len(),
            modified_date,
        })
    }

    /// Joins a user-supplied base name with this file's original extension
    pub fn final_name(&self, new_name: &str) -> String {
        match &self.extension {
            Some(ext) => format!("{}.{}", new_name, ext),
            None => new_name.to_string(),
        }
    }

    /// Re-checks the filesystem; entries can vanish between discovery and processing
    pub fn is_regular_file(&self) -> bool {
        fs::metadata(&self.path)
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    /// One-line description used in the "Processing file" banner
    pub fn describe(&self) -> String {
        format!(
            "{} ({}, modified {})",
            self.name,
            format_size(self.size),
            self.modified_date.format("%Y-%m-%d %H:%M")
        )
    }
}

pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// Lists the triage candidates in a directory.
///
/// # Behavior
/// - Filters out hidden files (names starting with '.')
/// - Filters out anything that is not a regular file; symlinks are followed
/// - Does not recurse into subdirectories
/// - Sorts results by name in byte order
/// - Entries that cannot be inspected are skipped
///
/// Failing to open the directory itself is fatal and reported as
/// [`TriageError::SourceUnreadable`].
pub fn discover_files(dir_path: &Path) -> Result<Vec<FileEntry>> {
    let entries = fs::read_dir(dir_path).map_err(|source| TriageError::SourceUnreadable {
        path: dir_path.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();

    for entry_result in entries {
        let entry = match entry_result {
            Ok(e) => e,
            Err(e) => {
                debug!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };

        let path = entry.path();

        let file_name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => {
                debug!(path = ?path, "skipping entry with non UTF-8 name");
                continue;
            }
        };

        if file_name.starts_with(HIDDEN_MARKER) {
            continue;
        }

        let metadata = match fs::metadata(&path) {
            Ok(m) => m,
            Err(_) => continue,
        };

        if !metadata.is_file() {
            continue;
        }

        match FileEntry::from_path(&path) {
            Ok(fe) => files.push(fe),
            Err(e) => debug!(path = ?path, error = %e, "skipping entry"),
        }
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(files)
}

/// Creates the destination directory and any missing parents
pub fn ensure_destination(dir_path: &Path) -> Result<()> {
    fs::create_dir_all(dir_path).map_err(|source| TriageError::DestinationUnavailable {
        path: dir_path.to_path_buf(),
        source,
    })
}

/// A menu selection read from the decision prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    Delete,
    RenameAndMove,
    Preview,
    Invalid(String),
}

impl Choice {
    pub fn parse(token: &str) -> Self {
        match token.trim() {
            "1" => Choice::Delete,
            "2" => Choice::RenameAndMove,
            "3" => Choice::Preview,
            other => Choice::Invalid(other.to_string()),
        }
    }
}

/// Why a proposed new name was refused. The user is asked again in every case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameRejection {
    Empty,
    IllegalCharacter(char),
    AlreadyExists(PathBuf),
}

impl fmt::Display for NameRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameRejection::Empty => write!(f, "The name cannot be empty."),
            NameRejection::IllegalCharacter(c) if c.is_control() => write!(
                f,
                "The name contains a control character (0x{:02X}). Please provide a different name.",
                *c as u32
            ),
            NameRejection::IllegalCharacter(c) => write!(
                f,
                "The name contains the illegal character '{}'. Please provide a different name.",
                c
            ),
            NameRejection::AlreadyExists(_) => write!(
                f,
                "A file with the same name already exists. Please provide a different name."
            ),
        }
    }
}

/// Returns the first character that is not allowed in a file name
pub fn find_illegal_char(name: &str) -> Option<char> {
    name.chars()
        .find(|c| ILLEGAL_NAME_CHARS.contains(c) || ('\u{0}'..='\u{1F}').contains(c))
}

/// Checks a proposed base name for `entry` and returns the final file name
/// (base name plus original extension) if it can be used in `source_dir`.
pub fn validate_new_name(
    source_dir: &Path,
    entry: &FileEntry,
    new_name: &str,
) -> std::result::Result<String, NameRejection> {
    if new_name.is_empty() {
        return Err(NameRejection::Empty);
    }

    let final_name = entry.final_name(new_name);

    if let Some(c) = find_illegal_char(&final_name) {
        return Err(NameRejection::IllegalCharacter(c));
    }

    let candidate = source_dir.join(&final_name);
    // symlink_metadata so a dangling link still counts as taken
    if fs::symlink_metadata(&candidate).is_ok() {
        return Err(NameRejection::AlreadyExists(candidate));
    }

    Ok(final_name)
}

/// Counts for the end-of-session summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriageStatistics {
    pub total_files: usize,
    pub deleted: usize,
    pub moved: usize,
    pub left_in_place: usize,
}

impl TriageStatistics {
    pub fn resolved(&self) -> usize {
        self.deleted + self.moved + self.left_in_place
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_entry(dir: &Path, name: &str) -> FileEntry {
        let path = dir.join(name);
        fs::write(&path, b"content").unwrap();
        FileEntry::from_path(&path).unwrap()
    }

    mod file_entry_tests {
        use super::*;

        #[test]
        fn test_file_entry_from_path() {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("notes.txt");
            fs::write(&path, b"test content").unwrap();

            let entry = FileEntry::from_path(&path).unwrap();

            assert_eq!(entry.path, path);
            assert_eq!(entry.name, "notes.txt");
            assert_eq!(entry.extension.as_deref(), Some("txt"));
            assert_eq!(entry.size, 12);
        }

        #[test]
        fn test_file_entry_extension_is_last_suffix() {
            let temp_dir = TempDir::new().unwrap();
            let entry = create_test_entry(temp_dir.path(), "archive.tar.gz");
            assert_eq!(entry.extension.as_deref(), Some("gz"));
            assert_eq!(entry.final_name("backup"), "backup.gz");
        }

        #[test]
        fn test_file_entry_without_extension() {
            let temp_dir = TempDir::new().unwrap();
            let entry = create_test_entry(temp_dir.path(), "README");
            assert!(entry.extension.is_none());
            assert_eq!(entry.final_name("readme-old"), "readme-old");
        }

        #[test]
        fn test_file_entry_nonexistent_file() {
            let result = FileEntry::from_path(Path::new("/nonexistent/file.txt"));
            assert!(result.is_err());
        }

        #[test]
        fn test_is_regular_file_after_removal() {
            let temp_dir = TempDir::new().unwrap();
            let entry = create_test_entry(temp_dir.path(), "gone.txt");
            assert!(entry.is_regular_file());

            fs::remove_file(&entry.path).unwrap();
            assert!(!entry.is_regular_file());
        }

        #[test]
        fn test_describe_includes_name_and_size() {
            let temp_dir = TempDir::new().unwrap();
            let entry = create_test_entry(temp_dir.path(), "a.txt");
            let text = entry.describe();
            assert!(text.starts_with("a.txt (7 B, modified "));
        }
    }

    mod format_size_tests {
        use super::*;

        #[test]
        fn test_format_size_bytes() {
            assert_eq!(format_size(0), "0 B");
            assert_eq!(format_size(1023), "1023 B");
        }

        #[test]
        fn test_format_size_larger_units() {
            assert_eq!(format_size(1024), "1.0 KB");
            assert_eq!(format_size(1536), "1.5 KB");
            assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
            assert_eq!(format_size(1024 * 1024 * 1024), "1.0 GB");
        }
    }

    mod discovery_tests {
        use super::*;

        #[test]
        fn test_discover_skips_hidden_and_directories() {
            let temp_dir = TempDir::new().unwrap();
            fs::write(temp_dir.path().join("a.txt"), b"a").unwrap();
            fs::write(temp_dir.path().join(".hidden"), b"h").unwrap();
            fs::write(temp_dir.path().join("b.pdf"), b"b").unwrap();
            fs::create_dir(temp_dir.path().join("folder")).unwrap();

            let files = discover_files(temp_dir.path()).unwrap();
            let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();

            assert_eq!(names, vec!["a.txt", "b.pdf"]);
        }

        #[test]
        fn test_discover_sorts_lexicographically() {
            let temp_dir = TempDir::new().unwrap();
            for name in ["zeta.txt", "Alpha.txt", "beta.txt", "10.txt", "2.txt"] {
                fs::write(temp_dir.path().join(name), b"x").unwrap();
            }

            let files = discover_files(temp_dir.path()).unwrap();
            let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();

            assert_eq!(
                names,
                vec!["10.txt", "2.txt", "Alpha.txt", "beta.txt", "zeta.txt"]
            );
        }

        #[test]
        fn test_discover_empty_directory() {
            let temp_dir = TempDir::new().unwrap();
            let files = discover_files(temp_dir.path()).unwrap();
            assert!(files.is_empty());
        }

        #[test]
        fn test_discover_missing_directory_is_fatal() {
            let temp_dir = TempDir::new().unwrap();
            let missing = temp_dir.path().join("Downloads");

            let result = discover_files(&missing);
            assert!(matches!(
                result,
                Err(TriageError::SourceUnreadable { ref path, .. }) if path == &missing
            ));
        }

        #[cfg(unix)]
        #[test]
        fn test_discover_follows_symlinks() {
            use std::os::unix::fs::symlink;

            let temp_dir = TempDir::new().unwrap();
            let target_file = temp_dir.path().join("real.txt");
            fs::write(&target_file, b"x").unwrap();
            let target_dir = temp_dir.path().join("realdir");
            fs::create_dir(&target_dir).unwrap();

            symlink(&target_file, temp_dir.path().join("link-to-file")).unwrap();
            symlink(&target_dir, temp_dir.path().join("link-to-dir")).unwrap();

            let files = discover_files(temp_dir.path()).unwrap();
            let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();

            assert_eq!(names, vec!["link-to-file", "real.txt"]);
        }
    }

    #[test]
    fn test_ensure_destination_creates_parents_and_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("Desktop").join("New Folder");

        ensure_destination(&dest).unwrap();
        assert!(dest.is_dir());

        ensure_destination(&dest).unwrap();
        assert!(dest.is_dir());
    }

    mod choice_tests {
        use super::*;

        #[test]
        fn test_choice_parse_menu_tokens() {
            assert_eq!(Choice::parse("1"), Choice::Delete);
            assert_eq!(Choice::parse("2"), Choice::RenameAndMove);
            assert_eq!(Choice::parse("3"), Choice::Preview);
        }

        #[test]
        fn test_choice_parse_trims_whitespace() {
            assert_eq!(Choice::parse(" 1 \n"), Choice::Delete);
            assert_eq!(Choice::parse("3\r\n"), Choice::Preview);
        }

        #[test]
        fn test_choice_parse_invalid() {
            assert_eq!(Choice::parse("4"), Choice::Invalid("4".to_string()));
            assert_eq!(Choice::parse("delete"), Choice::Invalid("delete".to_string()));
            assert_eq!(Choice::parse(""), Choice::Invalid(String::new()));
        }
    }

    mod name_validation_tests {
        use super::*;

        #[test]
        fn test_find_illegal_char_rejects_each_symbol() {
            for c in ['/', '\\', ':', '*', '?', '"', '<', '>', '|'] {
                let name = format!("bad{}name", c);
                assert_eq!(find_illegal_char(&name), Some(c), "char {:?}", c);
            }
        }

        #[test]
        fn test_find_illegal_char_rejects_control_chars() {
            assert_eq!(find_illegal_char("tab\there"), Some('\t'));
            assert_eq!(find_illegal_char("nul\0"), Some('\0'));
            assert_eq!(find_illegal_char("esc\u{1F}"), Some('\u{1F}'));
        }

        #[test]
        fn test_find_illegal_char_accepts_ordinary_names() {
            assert_eq!(find_illegal_char("report"), None);
            assert_eq!(find_illegal_char("my report (final) v2.pdf"), None);
            assert_eq!(find_illegal_char("résumé-2026"), None);
            // DEL is outside the control range that is checked
            assert_eq!(find_illegal_char("x\u{7F}"), None);
        }

        #[test]
        fn test_validate_new_name_success() {
            let temp_dir = TempDir::new().unwrap();
            let entry = create_test_entry(temp_dir.path(), "b.pdf");

            let result = validate_new_name(temp_dir.path(), &entry, "report");
            assert_eq!(result, Ok("report.pdf".to_string()));
        }

        #[test]
        fn test_validate_new_name_rejects_collision() {
            let temp_dir = TempDir::new().unwrap();
            let entry = create_test_entry(temp_dir.path(), "b.pdf");
            fs::write(temp_dir.path().join("report.pdf"), b"existing").unwrap();

            let result = validate_new_name(temp_dir.path(), &entry, "report");
            assert_eq!(
                result,
                Err(NameRejection::AlreadyExists(
                    temp_dir.path().join("report.pdf")
                ))
            );
        }

        #[test]
        fn test_validate_new_name_rejects_own_name() {
            let temp_dir = TempDir::new().unwrap();
            let entry = create_test_entry(temp_dir.path(), "b.pdf");

            let result = validate_new_name(temp_dir.path(), &entry, "b");
            assert!(matches!(result, Err(NameRejection::AlreadyExists(_))));
        }

        #[test]
        fn test_validate_new_name_rejects_illegal_char() {
            let temp_dir = TempDir::new().unwrap();
            let entry = create_test_entry(temp_dir.path(), "b.pdf");

            let result = validate_new_name(temp_dir.path(), &entry, "bad:name");
            assert_eq!(result, Err(NameRejection::IllegalCharacter(':')));
        }

        #[test]
        fn test_validate_new_name_rejects_empty() {
            let temp_dir = TempDir::new().unwrap();
            let entry = create_test_entry(temp_dir.path(), "b.pdf");

            assert_eq!(
                validate_new_name(temp_dir.path(), &entry, ""),
                Err(NameRejection::Empty)
            );
        }

        #[test]
        fn test_validate_collision_ignores_other_extensions() {
            let temp_dir = TempDir::new().unwrap();
            let entry = create_test_entry(temp_dir.path(), "b.pdf");
            fs::write(temp_dir.path().join("report.txt"), b"other").unwrap();

            assert!(validate_new_name(temp_dir.path(), &entry, "report").is_ok());
        }

        #[test]
        fn test_rejection_messages() {
            assert!(NameRejection::IllegalCharacter(':')
                .to_string()
                .contains("':'"));
            assert!(NameRejection::IllegalCharacter('\t')
                .to_string()
                .contains("0x09"));
            assert!(NameRejection::AlreadyExists(PathBuf::from("x"))
                .to_string()
                .contains("already exists"));
        }
    }

    #[test]
    fn test_statistics_resolved() {
        let stats = TriageStatistics {
            total_files: 5,
            deleted: 1,
            moved: 2,
            left_in_place: 1,
        };
        assert_eq!(stats.resolved(), 4);
    }
}
