use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use bulkmail_common::clock::{Clock, SystemClock};
use bulkmail_common::config::AppConfig;
use bulkmail_common::db::connect_contact_store;
use bulkmail_common::types::{Destinations, EmailAddress};
use bulkmail_engine::delivery::{DeliveryEngine, DeliveryJob, DeliveryReport, pacing_from_millis};
use bulkmail_engine::interval::Interval;
use bulkmail_engine::resolver::{ContactResolver, PgAccountLookup};
use bulkmail_notifier::{Transport, select_transport};

use crate::args::Args;
use crate::input::{Recipients, load_body, load_recipients};

/// Install the global tracing subscriber.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("bulkmail_mailer=info,bulkmail_engine=info,bulkmail_notifier=info")
    });

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Load inputs, resolve recipients, pick the transport, and deliver.
pub async fn run(args: Args, config: AppConfig) -> anyhow::Result<DeliveryReport> {
    let from = EmailAddress::parse(&args.from).with_context(|| format!("Parsing {}", args.from))?;
    let body = load_body(&args.body)?;
    let recipients = load_recipients(&args.to_file, args.emails)?;
    let mut transport = select_transport(args.dry_run, from, &config)?;

    let destinations = match recipients {
        Recipients::Addresses(destinations) => destinations,
        Recipients::Descriptors(descriptors) => {
            let pool = connect_contact_store(&config).await?;
            let lookup = PgAccountLookup::new(pool);
            ContactResolver::new(&lookup)
                .resolve(descriptors)
                .await
                .context("Resolving emails")?
        }
    };

    deliver(
        &args,
        &body,
        &destinations,
        transport.as_mut(),
        Arc::new(SystemClock),
    )
    .await
}

/// Run the delivery engine over an already-resolved destination list.
pub async fn deliver(
    args: &Args,
    body: &str,
    destinations: &Destinations,
    transport: &mut dyn Transport,
    clock: Arc<dyn Clock>,
) -> anyhow::Result<DeliveryReport> {
    let pacing = pacing_from_millis(args.sleep_ms).context("mailer.send returned error")?;
    let job = DeliveryJob {
        destinations: destinations.as_slice(),
        checkpoint: Interval::new(args.start, args.end),
        pacing,
        subject: &args.subject,
        body,
    };

    let report = DeliveryEngine::new(clock)
        .run_connected(job, transport)
        .await
        .context("mailer.send returned error")?;

    tracing::info!(
        start = report.start,
        end = report.end,
        sent = report.sent,
        skipped = report.skipped,
        "Mailing finished"
    );
    Ok(report)
}
