//! Delivery engine: sequential, paced, checkpointed sending.
//!
//! A run:
//! 1. Validates the checkpoint against the destination list and the pacing
//! 2. Resolves the sentinel end (`0`) to the list length
//! 3. Sends to each non-blank address in `[start, end)`, in list order,
//!    pausing for `pacing` between consecutive successful sends
//! 4. Stops at the first transport failure, reporting its absolute index
//!
//! Earlier sends are never undone. Re-running with `start` set to the failing
//! index over the same list resumes without re-sending anything before it.

use std::sync::Arc;

use chrono::Duration;
use thiserror::Error;

use bulkmail_common::clock::Clock;
use bulkmail_common::error::ValidationError;
use bulkmail_notifier::{Transport, TransportError};

use crate::interval::Interval;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("invalid delivery job: {0}")]
    Validation(#[from] ValidationError),

    #[error("could not connect transport: {0}")]
    Connect(#[source] TransportError),

    #[error("sending to {address} (index {index}) failed: {source}; resume with start={index}")]
    Transport {
        index: usize,
        address: String,
        #[source]
        source: TransportError,
    },

    #[error("could not close transport: {0}")]
    Close(#[source] TransportError),
}

/// Everything a single run needs, borrowed from the caller.
#[derive(Debug, Clone)]
pub struct DeliveryJob<'a> {
    pub destinations: &'a [String],
    pub checkpoint: Interval,
    pub pacing: Duration,
    pub subject: &'a str,
    pub body: &'a str,
}

impl DeliveryJob<'_> {
    /// Checks that must all pass before the first send.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.checkpoint.validate()?;

        let count = self.destinations.len();
        if usize::try_from(self.checkpoint.start).map_or(true, |start| start > count) {
            return Err(ValidationError::StartBeyondDestinations {
                start: self.checkpoint.start,
                count,
            });
        }

        if self.pacing < Duration::zero() {
            return Err(ValidationError::NegativePacing(self.pacing.num_milliseconds()));
        }

        Ok(())
    }
}

/// Pacing from a user-supplied millisecond count, rejecting values that are
/// negative or that `Duration` cannot hold.
pub fn pacing_from_millis(ms: i64) -> Result<Duration, ValidationError> {
    if ms < 0 {
        return Err(ValidationError::NegativePacing(ms));
    }
    Duration::try_milliseconds(ms).ok_or(ValidationError::PacingOutOfRange(ms))
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReport {
    pub start: usize,
    pub end: usize,
    pub sent: usize,
    pub skipped: usize,
}

/// Warns when a connected transport is abandoned without `close`.
struct OpenTransport {
    closed: bool,
}

impl Drop for OpenTransport {
    fn drop(&mut self) {
        if !self.closed {
            tracing::warn!("Delivery cancelled mid-run; transport was not closed");
        }
    }
}

pub struct DeliveryEngine {
    clock: Arc<dyn Clock>,
}

impl DeliveryEngine {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Connect the transport, run the job, and close the transport.
    ///
    /// `close` runs whenever `connect` succeeded and the run returned, with
    /// or without an error. If both the run and `close` fail, the run's error
    /// is returned and the close error is logged.
    ///
    /// `close` is async and cannot run from `Drop`: if this future is dropped
    /// mid-run, the transport stays open and a warning is logged instead.
    pub async fn run_connected(
        &self,
        job: DeliveryJob<'_>,
        transport: &mut dyn Transport,
    ) -> Result<DeliveryReport, DeliveryError> {
        transport.connect().await.map_err(DeliveryError::Connect)?;
        let mut open = OpenTransport { closed: false };

        let result = self.run(job, &*transport).await;
        let closed = transport.close().await;
        open.closed = true;

        match (result, closed) {
            (Ok(report), Ok(())) => Ok(report),
            (Ok(_), Err(e)) => Err(DeliveryError::Close(e)),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close_err)) => {
                tracing::error!(error = %close_err, "Closing transport after failed run also failed");
                Err(e)
            }
        }
    }

    /// Walk the checkpoint slice and send to each non-blank destination.
    pub async fn run(
        &self,
        job: DeliveryJob<'_>,
        transport: &dyn Transport,
    ) -> Result<DeliveryReport, DeliveryError> {
        job.validate()?;

        let len = job.destinations.len();
        if job.checkpoint.end > 0 && job.checkpoint.end as u64 > len as u64 {
            tracing::warn!(
                end = job.checkpoint.end,
                destinations = len,
                "Checkpoint end is past the destination list, clamping"
            );
        }
        let (start, end) = job.checkpoint.bounds(len);
        let pause = job.pacing.to_std().unwrap_or_default();

        tracing::info!(
            checkpoint = %job.checkpoint,
            start,
            end,
            destinations = len,
            pacing_ms = job.pacing.num_milliseconds(),
            "Starting delivery run"
        );

        let started_at = self.clock.now();
        let mut sent = 0usize;
        let mut skipped = 0usize;

        for (index, destination) in job.destinations[start..end].iter().enumerate() {
            let index = start + index;
            let address = destination.trim();
            if address.is_empty() {
                skipped += 1;
                continue;
            }

            if sent > 0 && !pause.is_zero() {
                self.clock.sleep(pause).await;
            }

            let to = [address.to_string()];
            if let Err(source) = transport.send(&to, job.subject, job.body).await {
                tracing::error!(index, address, error = %source, "Send failed, stopping run");
                return Err(DeliveryError::Transport {
                    index,
                    address: address.to_string(),
                    source,
                });
            }

            sent += 1;
            tracing::info!(index, address, "Sent");
        }

        let elapsed = self.clock.now() - started_at;
        tracing::info!(
            sent,
            skipped,
            elapsed_secs = elapsed.num_seconds(),
            "Delivery run complete"
        );

        Ok(DeliveryReport {
            start,
            end,
            sent,
            skipped,
        })
    }
}
