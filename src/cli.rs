// CLI module for argument parsing and configuration

use crate::error::{Result, TriageError};
use crate::preview::{PreviewCommand, DEFAULT_PREVIEW_TIMEOUT};
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;

/// Name of the holding folder created on the desktop by default
pub const DEFAULT_DESTINATION_NAME: &str = "New Folder";

/// dltriage - clean up a downloads folder one file at a time
///
/// For every file you choose to delete it, give it a proper name and move it
/// to a holding folder, or preview it first.
#[derive(Parser, Debug, Clone)]
#[command(name = "dltriage")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory to triage
    ///
    /// Defaults to the user's downloads folder.
    #[arg(short = 's', long = "source")]
    pub source: Option<PathBuf>,

    /// Holding folder for renamed files, created if missing
    ///
    /// Defaults to "New Folder" on the user's desktop.
    #[arg(short = 'd', long = "dest")]
    pub destination: Option<PathBuf>,

    /// Seconds before an open preview is dismissed automatically
    #[arg(short = 't', long = "preview-timeout", default_value_t = DEFAULT_PREVIEW_TIMEOUT.as_secs())]
    pub preview_timeout: u64,

    /// Program used to preview files; the file path is passed as its last argument
    ///
    /// Defaults to Quick Look (qlmanage -p) on macOS and the desktop opener elsewhere.
    #[arg(long = "preview-command")]
    pub preview_command: Option<String>,

    /// Extra argument placed before the file path, can be repeated
    #[arg(
        long = "preview-arg",
        requires = "preview_command",
        allow_hyphen_values = true
    )]
    pub preview_args: Vec<String>,

    /// Dry run mode - report what would happen without touching any file
    #[arg(short = 'n', long = "dry-run", action = ArgAction::SetTrue)]
    pub dry_run: bool,

    /// More diagnostics on stderr (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Args::parse()
    }

    /// Validate the arguments and return any errors
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.preview_timeout == 0 {
            return Err("preview-timeout must be at least 1 second".to_string());
        }

        if let Some(ref program) = self.preview_command {
            if program.trim().is_empty() {
                return Err("preview-command cannot be empty".to_string());
            }
        }

        if let (Some(source), Some(dest)) = (&self.source, &self.destination) {
            if source == dest {
                return Err(format!(
                    "Source and destination must differ: {}",
                    source.display()
                ));
            }
        }

        Ok(())
    }

    fn preview(&self) -> PreviewCommand {
        match &self.preview_command {
            Some(program) => PreviewCommand::Custom {
                program: program.clone(),
                args: self.preview_args.clone(),
            },
            None => PreviewCommand::platform_default(),
        }
    }
}

/// Resolved settings the triage run is started with
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub source_dir: PathBuf,
    pub destination_dir: PathBuf,
    pub preview_timeout: Duration,
    pub preview_command: PreviewCommand,
    pub dry_run: bool,
    pub verbose: u8,
}

impl AppConfig {
    /// Settings for explicit directories with every other option at its default
    pub fn new(source_dir: PathBuf, destination_dir: PathBuf) -> Self {
        AppConfig {
            source_dir,
            destination_dir,
            preview_timeout: DEFAULT_PREVIEW_TIMEOUT,
            preview_command: PreviewCommand::platform_default(),
            dry_run: false,
            verbose: 0,
        }
    }
}

impl TryFrom<Args> for AppConfig {
    type Error = TriageError;

    fn try_from(args: Args) -> Result<Self> {
        let source_dir = match args.source.clone() {
            Some(dir) => dir,
            None => default_source_dir()?,
        };
        let destination_dir = match args.destination.clone() {
            Some(dir) => dir,
            None => default_destination_dir()?,
        };

        if source_dir == destination_dir {
            return Err(TriageError::ConfigError(format!(
                "Source and destination must differ: {}",
                source_dir.display()
            )));
        }

        Ok(AppConfig {
            source_dir,
            destination_dir,
            preview_timeout: Duration::from_secs(args.preview_timeout),
            preview_command: args.preview(),
            dry_run: args.dry_run,
            verbose: args.verbose,
        })
    }
}

/// The user's downloads folder, or ~/Downloads when the platform has no such notion
pub fn default_source_dir() -> Result<PathBuf> {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .ok_or(TriageError::NoHomeDirectory)
}

/// "New Folder" on the desktop, or under ~/Desktop
pub fn default_destination_dir() -> Result<PathBuf> {
    dirs::desktop_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Desktop")))
        .map(|desktop| desktop.join(DEFAULT_DESTINATION_NAME))
        .ok_or(TriageError::NoHomeDirectory)
}
