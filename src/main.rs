// stepwise: statement-stepping script debugger driven over stdin/stdout

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use stepwise::config::Cli;
use stepwise::logging;
use stepwise::protocol::{Channel, ErrorKind, ServerMessage};
use stepwise::session::Session;

/// Report a panic on the control channel before the process dies
fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let payload = if let Some(s) = info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        let location = info
            .location()
            .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_default();
        error!(%payload, %location, "panic");

        let message = ServerMessage::error(
            ErrorKind::Fatal,
            format!("panicked at {}", location),
            Some(payload),
        );
        if let Ok(line) = serde_json::to_string(&message) {
            let mut stdout = io::stdout();
            let _ = writeln!(stdout, "{}", line);
            let _ = stdout.flush();
        }
    }));
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let stdin = io::stdin();
    let channel = Channel::new(stdin.lock(), io::stdout());
    let mut session = Session::new(channel, cli.session_config());

    match session.serve() {
        Ok(()) => {
            info!(steps = session.step_count(), "debugger session completed");
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            session.report_fatal(&err);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let _guard = logging::init(&cli.log_level, Some(&cli.log_file))?;
    install_panic_hook();
    info!(
        max_steps = cli.max_steps,
        max_output_chars = cli.max_output_chars,
        "starting debugger"
    );
    run(&cli)
}
