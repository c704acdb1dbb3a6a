use async_trait::async_trait;

use bulkmail_common::config::AppConfig;
use bulkmail_common::types::EmailAddress;

use crate::dry_run::DryRunTransport;
use crate::error::TransportError;
use crate::resend::ResendTransport;

/// Outbound mail capability.
///
/// `connect` is called once before any send and `close` once afterwards, on
/// success and failure alike. Implementations own their timeout policy.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn connect(&mut self) -> Result<(), TransportError>;

    async fn send(&self, to: &[String], subject: &str, body: &str) -> Result<(), TransportError>;

    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Pick the transport for this run.
///
/// A real send needs `RESEND_API_KEY`; its absence is reported here, before
/// any destination is touched.
pub fn select_transport(
    dry_run: bool,
    from: EmailAddress,
    config: &AppConfig,
) -> anyhow::Result<Box<dyn Transport>> {
    if dry_run {
        tracing::info!(from = %from, "Dry run: messages will be logged, not sent");
        return Ok(Box::new(DryRunTransport::new(from)));
    }

    let api_key = config.resend_api_key.clone().ok_or_else(|| {
        anyhow::anyhow!("RESEND_API_KEY environment variable is required when not dry-running")
    })?;

    Ok(Box::new(ResendTransport::new(
        config.resend_api_url.clone(),
        api_key,
        from,
        std::time::Duration::from_secs(config.transport_timeout_secs),
    )))
}
