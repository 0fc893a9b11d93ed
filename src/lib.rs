//! dltriage - interactive downloads folder cleanup
//!
//! This crate walks a directory one file at a time and lets the user delete
//! each file, rename it into a holding folder, or preview it before deciding.

pub mod cli;
pub mod domain;
pub mod error;
pub mod logging;
pub mod preview;
pub mod prompt;
pub mod workflow;

// Re-export primary types for convenience
pub use cli::{AppConfig, Args};
pub use domain::action_executor::{ActionExecutor, MoveReport};
pub use domain::{
    discover_files, ensure_destination, find_illegal_char, validate_new_name, Choice, FileEntry,
    NameRejection, TriageStatistics,
};
pub use error::{ActionError, Result, TriageError};
pub use preview::{PreviewCommand, PreviewLauncher, Previewer};
pub use prompt::Prompter;
pub use workflow::run_triage;
