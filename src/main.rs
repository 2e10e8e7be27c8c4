//! modsync CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use modsync::cli::{Cli, CommandDispatcher};
use modsync::shell::is_ci;
use modsync::ui::{create_ui, OutputMode};
use modsync::updates::{cleanup_stale_binary, get_install_path};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("modsync=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("modsync=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("modsync starting with args: {:?}", cli);

    if let Some(exe) = get_install_path() {
        cleanup_stale_binary(&exe);
    }

    let output_mode = if cli.quiet {
        OutputMode::Quiet
    } else if cli.verbose {
        OutputMode::Verbose
    } else {
        OutputMode::Normal
    };

    if cli.no_color {
        std::env::set_var("NO_COLOR", "1");
    }

    let is_interactive = !cli.non_interactive && !is_ci();
    let mut ui = create_ui(is_interactive, output_mode);

    let dispatcher = CommandDispatcher::from_cli(&cli);

    match dispatcher.dispatch(&cli, ui.as_mut()) {
        Ok(result) => ExitCode::from(result.exit_code.clamp(0, 255) as u8),
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            ExitCode::from(1)
        }
    }
}
