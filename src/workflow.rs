//! The triage loop: walk the source directory and resolve one file at a time.

use crate::cli::AppConfig;
use crate::domain::action_executor::ActionExecutor;
use crate::domain::{
    discover_files, ensure_destination, validate_new_name, Choice, FileEntry, TriageStatistics,
};
use crate::error::{ActionError, Result};
use crate::preview::Previewer;
use crate::prompt::Prompter;
use std::io::{BufRead, Write};
use tracing::{debug, info, warn};

/// How processing of a single file ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileOutcome {
    Resolved,
    EndOfInput,
}

enum RenameStep {
    Done,
    Cancelled,
    EndOfInput,
}

/// Runs a full triage session and returns the session counts.
///
/// Only failing to read the source directory, to create the destination
/// directory or to talk to the console aborts the run. Errors from individual
/// actions are reported and the file is left where it is.
pub fn run_triage<R: BufRead, W: Write>(
    config: &AppConfig,
    previewer: &mut dyn Previewer,
    prompter: &mut Prompter<R, W>,
) -> Result<TriageStatistics> {
    prompter.say(format!("Cleaning {}...", config.source_dir.display()))?;

    let files = discover_files(&config.source_dir)?;
    info!(count = files.len(), source = ?config.source_dir, "discovered files");

    if config.dry_run {
        prompter.say("[DRY RUN] No files will be deleted, renamed or moved")?;
    } else {
        ensure_destination(&config.destination_dir)?;
    }

    let mut executor = ActionExecutor::new(
        config.source_dir.clone(),
        config.destination_dir.clone(),
        files.len(),
    );
    executor.set_dry_run(config.dry_run);

    let mut finished = true;
    for (index, entry) in files.iter().enumerate() {
        if !entry.is_regular_file() {
            debug!(path = ?entry.path, "entry vanished before its turn, skipping");
            executor.mark_vanished();
            continue;
        }

        prompter.say(format!("\nProcessing file: {}", entry.describe()))?;

        if triage_file(entry, &mut executor, previewer, prompter)? == FileOutcome::EndOfInput {
            executor.mark_left_in_place();
            for later in &files[index + 1..] {
                if later.is_regular_file() {
                    executor.mark_left_in_place();
                } else {
                    executor.mark_vanished();
                }
            }
            prompter.say("\nNo more input, stopping.")?;
            finished = false;
            break;
        }
    }

    let stats = executor.get_statistics().clone();
    if finished {
        prompter.say("Folder is empty!")?;
    }
    print_summary(prompter, &stats, config.dry_run)?;

    Ok(stats)
}

/// Prompts until the file is deleted, moved or given up on
fn triage_file<R: BufRead, W: Write>(
    entry: &FileEntry,
    executor: &mut ActionExecutor,
    previewer: &mut dyn Previewer,
    prompter: &mut Prompter<R, W>,
) -> Result<FileOutcome> {
    loop {
        let token = match prompter.read_choice()? {
            Some(token) => token,
            None => return Ok(FileOutcome::EndOfInput),
        };

        match Choice::parse(&token) {
            Choice::Delete => {
                match executor.delete(entry) {
                    Ok(()) if executor.is_dry_run() => {
                        prompter.say(format!("[DRY RUN] Would delete {}", entry.path.display()))?
                    }
                    Ok(()) => prompter.say(format!(
                        "File: {} has been deleted",
                        entry.path.display()
                    ))?,
                    Err(e) => {
                        warn!(error = %e, "delete failed");
                        prompter.say(&e)?;
                        executor.mark_left_in_place();
                    }
                }
                return Ok(FileOutcome::Resolved);
            }
            Choice::RenameAndMove => match rename_and_move(entry, executor, prompter)? {
                RenameStep::Done => return Ok(FileOutcome::Resolved),
                RenameStep::EndOfInput => return Ok(FileOutcome::EndOfInput),
                RenameStep::Cancelled => prompter.say("Rename cancelled.")?,
            },
            Choice::Preview => match previewer.preview(&entry.path) {
                Ok(()) => {
                    prompter.say("Preview opened.")?;
                    prompter.say("What would you like to do now?")?;
                }
                Err(e) => {
                    warn!(error = %e, path = ?entry.path, "preview failed");
                    prompter.say(format!("Could not open a preview: {}", e))?;
                }
            },
            Choice::Invalid(token) => {
                debug!(%token, "invalid menu choice");
                prompter.say("Invalid choice.")?;
            }
        }
    }
}

/// Asks for a valid new name, then renames the file and moves it to the destination.
/// An empty answer backs out to the menu.
fn rename_and_move<R: BufRead, W: Write>(
    entry: &FileEntry,
    executor: &mut ActionExecutor,
    prompter: &mut Prompter<R, W>,
) -> Result<RenameStep> {
    let final_name = loop {
        let new_name = match prompter.read_new_name()? {
            Some(name) => name,
            None => return Ok(RenameStep::EndOfInput),
        };

        if new_name.is_empty() {
            return Ok(RenameStep::Cancelled);
        }

        match validate_new_name(executor.source_dir(), entry, &new_name) {
            Ok(final_name) => break final_name,
            Err(rejection) => {
                debug!(%new_name, ?rejection, "name rejected");
                prompter.say(&rejection)?;
            }
        }
    };

    match executor.rename_and_move(entry, &final_name) {
        Ok(report) if executor.is_dry_run() => prompter.say(format!(
            "[DRY RUN] Would rename to {} and move to {}",
            report.final_name,
            report.destination_path.display()
        ))?,
        Ok(report) => {
            prompter.say(format!("File renamed to: {}", report.final_name))?;
            prompter.say(format!(
                "File moved to {}",
                report.destination_path.display()
            ))?;
        }
        Err(e) => {
            if matches!(e, ActionError::Move { .. } | ActionError::DestinationTaken(_)) {
                prompter.say(format!("File renamed to: {}", final_name))?;
            }
            warn!(error = %e, "rename and move failed");
            prompter.say(&e)?;
            executor.mark_left_in_place();
        }
    }

    Ok(RenameStep::Done)
}

fn print_summary<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    stats: &TriageStatistics,
    dry_run: bool,
) -> Result<()> {
    let (deleted, moved) = if dry_run {
        ("Would have deleted", "Would have moved")
    } else {
        ("Deleted", "Moved")
    };

    prompter.say(format!(
        "\n{}Summary: {} files",
        if dry_run { "[DRY RUN] " } else { "" },
        stats.total_files
    ))?;
    prompter.say(format!("   {}: {}", deleted, stats.deleted))?;
    prompter.say(format!("   {}: {}", moved, stats.moved))?;
    prompter.say(format!("   Left in place: {}", stats.left_in_place))?;
    Ok(())
}
