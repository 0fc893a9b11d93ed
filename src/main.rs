use dltriage::cli::{AppConfig, Args};
use dltriage::logging::init_logging;
use dltriage::preview::PreviewLauncher;
use dltriage::prompt::Prompter;
use dltriage::workflow::run_triage;
use dltriage::Result;

use std::io;
use tracing::error;

fn main() {
    // Parse command line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(args) {
        error!(error = %e, "triage aborted");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = AppConfig::try_from(args)?;

    if let Err(e) = init_logging(config.verbose) {
        eprintln!("Warning: {}", e);
    }

    let mut previewer =
        PreviewLauncher::new(config.preview_command.clone(), config.preview_timeout)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut prompter = Prompter::new(stdin.lock(), stdout.lock());

    run_triage(&config, &mut previewer, &mut prompter)?;
    Ok(())
}
