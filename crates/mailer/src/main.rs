use clap::Parser;

use bulkmail_common::config::AppConfig;
use bulkmail_mailer::app;
use bulkmail_mailer::args::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration first so `.env` values can back CLI flags
    let config = AppConfig::from_env()?;
    let args = Args::parse();

    // Initialize tracing
    app::init_tracing(args.log_json);

    tracing::info!("notify-mailer starting...");

    if let Err(e) = app::run(args, config).await {
        tracing::error!("notify-mailer failed: {e:#}");
        return Err(e);
    }

    Ok(())
}
