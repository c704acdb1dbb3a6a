use async_trait::async_trait;

use bulkmail_common::types::EmailAddress;

use crate::error::TransportError;
use crate::transport::Transport;

/// Logs each message at `info` and never touches the network.
#[derive(Debug, Clone)]
pub struct DryRunTransport {
    from: EmailAddress,
}

impl DryRunTransport {
    pub fn new(from: EmailAddress) -> Self {
        Self { from }
    }
}

#[async_trait]
impl Transport for DryRunTransport {
    async fn connect(&mut self) -> Result<(), TransportError> {
        tracing::info!("Dry run: connect");
        Ok(())
    }

    async fn send(&self, to: &[String], subject: &str, body: &str) -> Result<(), TransportError> {
        tracing::info!(
            from = %self.from,
            to = ?to,
            subject,
            body_len = body.len(),
            "Dry run: would send message"
        );
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        tracing::info!("Dry run: close");
        Ok(())
    }
}
