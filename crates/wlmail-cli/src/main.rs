mod cli;
mod cli_config;
mod cli_output;
mod editor;

use std::io;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wlmail_core::{Address, ComposeError, ComposeOutcome, Prompt, Session, compose};
use wlmail_store::{FormsDir, Mailbox};

use cli::{Cli, CliCommand};
use cli_config::load_config;
use cli_output::{output_error, output_ok};
use editor::ExternalEditor;

const LOG_ENV: &str = "WLMAIL_LOG";

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<ComposeOutcome> {
    let config = load_config(cli.config.as_deref())?;
    let mycall = config.mycall()?;
    let cmd = match cli.command {
        CliCommand::Compose(cmd) => cmd,
        CliCommand::ComposeForm(cmd) => {
            tracing::warn!("compose-form is deprecated, use `compose --template`");
            cmd
        }
    };

    let mailbox = Mailbox::new(&config.mailbox_path, mycall);
    let forms = FormsDir::new(&config.forms_path, mycall).with_vars(config.form_vars.clone());
    let mut editor = ExternalEditor::from_config(config.editor.as_deref());
    let mut outbox = mailbox.clone();
    // Keep stdout clean for the JSON line.
    let prompt = if cli.json {
        Prompt::new(io::stdin().lock(), io::stderr())
    } else {
        Prompt::stdio()
    };
    let mut session = Session::new(
        Address::new(mycall),
        prompt,
        &mut editor,
        &forms,
        &mut outbox,
    );
    let outcome = compose(cmd.into(), &mailbox, &mut session)?;
    tracing::info!(?outcome, "compose finished");
    Ok(outcome)
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let json = cli.json;
    match run(cli) {
        Ok(outcome) => {
            if json {
                let printed = serde_json::to_value(&outcome)
                    .map_err(anyhow::Error::from)
                    .and_then(output_ok);
                if let Err(err) = printed {
                    eprintln!("ERROR: {:#}", err);
                    return ExitCode::FAILURE;
                }
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            if json {
                let kind = err.downcast_ref::<ComposeError>().map(ComposeError::kind);
                if let Err(write_err) = output_error(&format!("{:#}", err), kind) {
                    eprintln!("ERROR: {:#}", err);
                    eprintln!("ERROR: {:#}", write_err);
                }
            } else {
                eprintln!("ERROR: {:#}", err);
            }
            ExitCode::FAILURE
        }
    }
}
