use thiserror::Error;

/// Failures raised by a mail transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connect failed: {0}")]
    Connect(String),

    #[error("transport used before connect")]
    NotConnected,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("message rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("close failed: {0}")]
    Close(String),
}
