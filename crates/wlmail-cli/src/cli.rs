use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use wlmail_core::ComposeOptions;

#[derive(Parser, Debug)]
#[command(name = "wlmail", version, about = "Compose messages for a Winlink-style outbox")]
pub(crate) struct Cli {
    /// Read configuration from this file instead of the default locations.
    #[arg(long, global = true)]
    pub(crate) config: Option<PathBuf>,
    /// Print the outcome as a single JSON line.
    #[arg(long, global = true)]
    pub(crate) json: bool,
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub(crate) enum CliCommand {
    Compose(ComposeCmd),
    #[command(name = "compose-form", hide = true)]
    ComposeForm(ComposeCmd),
}

#[derive(Args, Debug, Clone, Default)]
pub(crate) struct ComposeCmd {
    #[arg(short = 'r', long)]
    from: Option<String>,
    #[arg(short, long)]
    subject: Option<String>,
    #[arg(short, long = "attachment")]
    attachments: Vec<PathBuf>,
    #[arg(short, long)]
    cc: Vec<String>,
    #[arg(long = "p2p-only")]
    p2p_only: bool,
    #[arg(long)]
    template: Option<String>,
    #[arg(long = "in-reply-to")]
    in_reply_to: Option<String>,
    #[arg(long)]
    redirect: Option<String>,
    recipients: Vec<String>,
}

impl From<ComposeCmd> for ComposeOptions {
    fn from(cmd: ComposeCmd) -> Self {
        Self {
            from: cmd.from,
            subject: cmd.subject,
            attachments: cmd.attachments,
            cc: cmd.cc,
            p2p_only: cmd.p2p_only,
            template: cmd.template,
            in_reply_to: cmd.in_reply_to,
            redirect: cmd.redirect,
            recipients: cmd.recipients,
        }
    }
}
