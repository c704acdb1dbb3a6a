use std::path::PathBuf;

use clap::{ArgAction, Parser};

/// Send the same message to every recipient in a list, once each, with a
/// pause between sends.
#[derive(Debug, Clone, Parser)]
#[command(name = "notify-mailer", version, about)]
pub struct Args {
    /// From header for emails, e.g. `ops@example.com` or `Ops <ops@example.com>`
    #[arg(long, env = "EMAIL_FROM")]
    pub from: String,

    /// Subject of emails
    #[arg(long)]
    pub subject: String,

    /// File containing the email body in plain text
    #[arg(long)]
    pub body: PathBuf,

    /// File listing the recipients: account descriptors (JSON) by default,
    /// or one email address per line with `--emails`
    #[arg(long)]
    pub to_file: PathBuf,

    /// `--to-file` contains email addresses instead of account descriptors
    #[arg(long)]
    pub emails: bool,

    /// Log messages instead of sending them
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub dry_run: bool,

    /// Milliseconds to wait between sends
    #[arg(long, default_value_t = 60_000, allow_negative_numbers = true)]
    pub sleep_ms: i64,

    /// Index of the destination list to start from
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub start: i64,

    /// Index of the destination list to stop before (0 = end of list)
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub end: i64,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,
}
