// External preview process with an auto-dismiss timer

use std::fmt;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Default auto-dismiss delay for a preview window
pub const DEFAULT_PREVIEW_TIMEOUT: Duration = Duration::from_secs(10);

/// Opens a file for the user to look at without blocking the caller
pub trait Previewer {
    fn preview(&mut self, path: &Path) -> io::Result<()>;
}

/// Which program renders the preview
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewCommand {
    /// Program plus fixed leading arguments; the file path is appended last
    Custom { program: String, args: Vec<String> },
    /// The desktop's default opener, as resolved by the `open` crate
    SystemOpener,
}

impl PreviewCommand {
    /// Quick Look on macOS, the desktop opener elsewhere
    pub fn platform_default() -> Self {
        if cfg!(target_os = "macos") {
            PreviewCommand::Custom {
                program: "qlmanage".to_string(),
                args: vec!["-p".to_string()],
            }
        } else {
            PreviewCommand::SystemOpener
        }
    }

    pub fn build(&self, path: &Path) -> io::Result<Command> {
        match self {
            PreviewCommand::Custom { program, args } => {
                let mut command = Command::new(program);
                command.args(args).arg(path);
                Ok(command)
            }
            PreviewCommand::SystemOpener => open::commands(path).into_iter().next().ok_or_else(
                || io::Error::new(io::ErrorKind::NotFound, "No preview program available"),
            ),
        }
    }
}

impl fmt::Display for PreviewCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreviewCommand::Custom { program, args } if args.is_empty() => write!(f, "{}", program),
            PreviewCommand::Custom { program, args } => write!(f, "{} {}", program, args.join(" ")),
            PreviewCommand::SystemOpener => write!(f, "system opener"),
        }
    }
}

/// How a preview process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewEnd {
    /// The process exited before the timeout
    Closed,
    /// The timeout fired and the process was asked to terminate
    Dismissed,
}

/// Spawns preview processes and dismisses them after a timeout.
///
/// Owns a small tokio runtime so the synchronous prompt loop can keep reading
/// input while each timer task waits in the background. A timer task owns its
/// child handle; nothing else touches the process once it is launched.
///
/// Dropping the launcher waits for outstanding timers, so a preview opened
/// near the end of a session is still dismissed on schedule.
pub struct PreviewLauncher {
    runtime: tokio::runtime::Runtime,
    command: PreviewCommand,
    timeout: Duration,
    pending: Vec<JoinHandle<PreviewEnd>>,
}

impl PreviewLauncher {
    pub fn new(command: PreviewCommand, timeout: Duration) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("preview-timer")
            .enable_all()
            .build()?;

        Ok(Self {
            runtime,
            command,
            timeout,
            pending: Vec::new(),
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Number of previews whose dismiss timer has not finished yet
    pub fn pending(&self) -> usize {
        self.pending.iter().filter(|h| !h.is_finished()).count()
    }

    /// Starts the preview and its dismiss timer, returning the timer task
    pub fn launch(&self, path: &Path) -> io::Result<JoinHandle<PreviewEnd>> {
        let mut command = self.command.build(path)?;
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // Process spawning registers with the runtime's signal driver
        let _guard = self.runtime.enter();
        let mut child = tokio::process::Command::from(command).spawn()?;
        debug!(pid = ?child.id(), path = ?path, "preview started");

        let timeout = self.timeout;
        Ok(self.runtime.spawn(async move {
            match tokio::time::timeout(timeout, child.wait()).await {
                Ok(status) => {
                    debug!(?status, "preview closed");
                    PreviewEnd::Closed
                }
                Err(_) => {
                    // Already gone is fine
                    if let Err(e) = child.start_kill() {
                        debug!(error = %e, "preview already exited");
                    }
                    if let Err(e) = child.wait().await {
                        warn!(error = %e, "failed to reap preview process");
                    }
                    PreviewEnd::Dismissed
                }
            }
        }))
    }
}

impl Previewer for PreviewLauncher {
    fn preview(&mut self, path: &Path) -> io::Result<()> {
        self.pending.retain(|h| !h.is_finished());
        let timer = self.launch(path)?;
        self.pending.push(timer);
        Ok(())
    }
}

impl Drop for PreviewLauncher {
    fn drop(&mut self) {
        let pending: Vec<_> = self.pending.drain(..).collect();
        if pending.is_empty() {
            return;
        }

        debug!(count = pending.len(), "waiting for open previews to be dismissed");
        for timer in pending {
            if let Err(e) = self.runtime.block_on(timer) {
                warn!(error = %e, "preview timer task failed");
            }
        }
    }
}
