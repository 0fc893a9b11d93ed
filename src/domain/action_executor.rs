use super::{FileEntry, TriageStatistics};
use crate::error::ActionError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where a renamed file ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveReport {
    pub final_name: String,
    pub renamed_path: PathBuf,
    pub destination_path: PathBuf,
}

/// Performs the filesystem side of each triage decision and keeps the session counts
#[derive(Debug)]
pub struct ActionExecutor {
    source_dir: PathBuf,
    destination_dir: PathBuf,
    stats: TriageStatistics,
    dry_run: bool,
}

impl ActionExecutor {
    pub fn new(source_dir: PathBuf, destination_dir: PathBuf, total_files: usize) -> Self {
        Self {
            source_dir,
            destination_dir,
            stats: TriageStatistics {
                total_files,
                ..TriageStatistics::default()
            },
            dry_run: false,
        }
    }

    pub fn set_dry_run(&mut self, dry_run: bool) {
        self.dry_run = dry_run;
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn destination_dir(&self) -> &Path {
        &self.destination_dir
    }

    /// Removes the file for good. Nothing is kept anywhere else.
    pub fn delete(&mut self, entry: &FileEntry) -> Result<(), ActionError> {
        if self.dry_run {
            if !entry.path.exists() {
                return Err(ActionError::Delete {
                    path: entry.path.clone(),
                    source: io::Error::new(io::ErrorKind::NotFound, "file not found"),
                });
            }
            self.stats.deleted += 1;
            return Ok(());
        }

        fs::remove_file(&entry.path).map_err(|source| ActionError::Delete {
            path: entry.path.clone(),
            source,
        })?;

        info!(path = ?entry.path, "deleted");
        self.stats.deleted += 1;
        Ok(())
    }

    /// Renames the file in place to `final_name`, then moves it into the
    /// destination directory under the same name.
    ///
    /// `final_name` must already have passed [`super::validate_new_name`].
    /// If the move step fails the file stays at its renamed path.
    pub fn rename_and_move(
        &mut self,
        entry: &FileEntry,
        final_name: &str,
    ) -> Result<MoveReport, ActionError> {
        let renamed_path = self.source_dir.join(final_name);
        let destination_path = self.destination_dir.join(final_name);

        let report = MoveReport {
            final_name: final_name.to_string(),
            renamed_path,
            destination_path,
        };

        if self.dry_run {
            if destination_taken(&report.destination_path) {
                return Err(ActionError::DestinationTaken(report.destination_path));
            }
            self.stats.moved += 1;
            return Ok(report);
        }

        fs::rename(&entry.path, &report.renamed_path).map_err(ActionError::Rename)?;
        debug!(from = ?entry.path, to = ?report.renamed_path, "renamed");

        if destination_taken(&report.destination_path) {
            return Err(ActionError::DestinationTaken(report.destination_path));
        }

        move_file(&report.renamed_path, &report.destination_path).map_err(|source| {
            ActionError::Move {
                renamed: report.renamed_path.clone(),
                source,
            }
        })?;

        info!(to = ?report.destination_path, "moved");
        self.stats.moved += 1;
        Ok(report)
    }

    /// Counts a file that was not deleted or moved
    pub fn mark_left_in_place(&mut self) {
        self.stats.left_in_place += 1;
    }

    /// Drops a file that disappeared before its turn from the total
    pub fn mark_vanished(&mut self) {
        self.stats.total_files = self.stats.total_files.saturating_sub(1);
    }

    pub fn get_statistics(&self) -> &TriageStatistics {
        &self.stats
    }
}

fn destination_taken(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Renames across directories, copying when they live on different filesystems
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!(from = ?from, to = ?to, "cross-device move, copying");
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
        Err(e) => Err(e),
    }
}
