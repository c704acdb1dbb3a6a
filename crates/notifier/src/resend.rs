//! Resend HTTP API transport.
//!
//! Each `send` is one `POST {api_url}/emails` carrying a plain-text body.
//! The HTTP client is built by `connect` and dropped by `close`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use bulkmail_common::types::EmailAddress;

use crate::error::TransportError;
use crate::transport::Transport;

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: String,
    to: &'a [String],
    subject: &'a str,
    text: &'a str,
}

/// Delivers through the Resend HTTP API.
pub struct ResendTransport {
    api_url: String,
    api_key: String,
    from: EmailAddress,
    timeout: Duration,
    client: Option<reqwest::Client>,
}

impl ResendTransport {
    pub fn new(api_url: String, api_key: String, from: EmailAddress, timeout: Duration) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
            from,
            timeout,
            client: None,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/emails", self.api_url)
    }
}

/// Body of a rejected request; a body that cannot be read becomes empty.
async fn read_error_body(response: reqwest::Response) -> String {
    let status = response.status().as_u16();
    match response.text().await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(status, error = %e, "Could not read rejection body");
            String::new()
        }
    }
}

#[async_trait]
impl Transport for ResendTransport {
    async fn connect(&mut self) -> Result<(), TransportError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        self.client = Some(client);
        tracing::info!(api_url = %self.api_url, "Resend transport ready");
        Ok(())
    }

    async fn send(&self, to: &[String], subject: &str, body: &str) -> Result<(), TransportError> {
        let client = self.client.as_ref().ok_or(TransportError::NotConnected)?;

        let request = SendEmailRequest {
            from: self.from.to_string(),
            to,
            subject,
            text: body,
        };

        let response = client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = read_error_body(response).await;
            return Err(TransportError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(to = ?to, status = status.as_u16(), "Message accepted");
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        if self.client.take().is_some() {
            tracing::info!("Resend transport closed");
        }
        Ok(())
    }
}
