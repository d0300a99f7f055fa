// Entrypoint for the CLI application.
// - With `--action` a single command runs and the process exits.
// - Without it the interactive menu starts, asking for the API key if no
//   flag or environment variable supplied one.
// Results and errors are printed on stdout; tracing diagnostics go to stderr.

use clap::Parser;
use filestore_cli::actions::{self, ActionRequest};
use filestore_cli::api::FileStoreClient;
use filestore_cli::cli::{Action, Cli};
use filestore_cli::ui::{resolve_api_key, Shell, TermPrompter};
use std::io::{self, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.action {
        Some(action) => run_action(&cli, action),
        None => run_interactive(&cli),
    };
    match result {
        Ok(code) => code,
        Err(e) => {
            println!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins; otherwise warnings only, or debug output for this
/// crate with `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "filestore_cli=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run_action(cli: &Cli, action: Action) -> anyhow::Result<ExitCode> {
    let api_key = match cli.api_key() {
        Some(key) => key,
        None => {
            println!("Error: no API key. Pass --key or set GEMINI_API_KEY.");
            return Ok(ExitCode::FAILURE);
        }
    };
    let request = match ActionRequest::from_cli(action, cli) {
        Ok(request) => request,
        Err(usage) => {
            println!("{}", usage);
            return Ok(ExitCode::FAILURE);
        }
    };

    let client = FileStoreClient::new(cli.client_config(api_key))?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    actions::run(&client, &request, &cli.upload_options(false), &mut out)?;
    out.flush()?;
    Ok(ExitCode::SUCCESS)
}

fn run_interactive(cli: &Cli) -> anyhow::Result<ExitCode> {
    let mut prompter = TermPrompter;
    let api_key = match resolve_api_key(cli.api_key(), &mut prompter)? {
        Some(key) => key,
        None => {
            println!("API Key not provided. Exiting.");
            return Ok(ExitCode::FAILURE);
        }
    };

    let client = FileStoreClient::new(cli.client_config(&api_key))?;
    let mut shell = Shell::new(&client, prompter, cli.upload_options(true));
    shell.run(&mut io::stdout())?;
    Ok(ExitCode::SUCCESS)
}
