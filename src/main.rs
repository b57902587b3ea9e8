mod cli;
mod credentials;
mod models;
mod poller;
mod statusline;
mod theme;

use std::io::Write;
use std::time::Duration;

use clap::error::ErrorKind;
use tracing_subscriber::EnvFilter;

use crate::poller::UsageClient;
use crate::statusline::PLACEHOLDER;

// Always exits 0: status-line hosts treat any failure as a broken segment.
fn main() {
    let parsed = match cli::Cli::try_parse_lenient(std::env::args_os()) {
        Ok(parsed) => parsed,
        Err(err) => {
            if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                let _ = err.print();
            } else {
                if std::env::args_os().any(|arg| arg == "--debug") {
                    init_tracing();
                    tracing::debug!(error = %err.render(), "invalid arguments");
                }
                print_line(PLACEHOLDER);
            }
            return;
        }
    };
    let cli = parsed.cli;

    if cli.debug {
        init_tracing();
        for arg in &parsed.ignored {
            tracing::debug!(arg = %arg, "ignoring unknown flag");
        }
    }

    let options = cli.display_options();
    let client = UsageClient::new(cli.api_url, Duration::from_millis(cli.timeout));

    let line = match client.poll() {
        Ok(data) => statusline::render_line(&data, &options, chrono::Utc::now()),
        Err(err) => {
            tracing::debug!(error = %err, "usage unavailable");
            PLACEHOLDER.to_string()
        }
    };
    print_line(&line);
}

fn print_line(line: &str) {
    let mut stdout = std::io::stdout().lock();
    let _ = writeln!(stdout, "{line}");
    let _ = stdout.flush();
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}
