//! Contact resolver: turns account descriptors into a destination list.
//!
//! For each descriptor:
//! 1. Fetch the freshest contact blob for its account id from the store
//! 2. Derive the email address from the blob (first `mailto:` entry)
//! 3. Collect non-blank emails into a set
//!
//! The set is rendered in byte-wise sorted order, so the same input always
//! yields the same list and checkpoint offsets survive re-resolution.

use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::PgPool;

use bulkmail_common::error::LookupError;
use bulkmail_common::types::{AccountId, Destinations, RecipientDescriptor};

/// Narrow view of the contact store: one row fetch by account id.
#[async_trait]
pub trait AccountLookup: Send + Sync {
    /// Return the current contact blob for `id`.
    async fn fetch_contact(&self, id: AccountId) -> Result<serde_json::Value, LookupError>;
}

/// `AccountLookup` over the `registrations` table.
pub struct PgAccountLookup {
    pool: PgPool,
}

impl PgAccountLookup {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountLookup for PgAccountLookup {
    async fn fetch_contact(&self, id: AccountId) -> Result<serde_json::Value, LookupError> {
        let row: Option<(Option<serde_json::Value>,)> = sqlx::query_as(
            r#"
            SELECT contact
            FROM registrations
            WHERE contact != 'null' AND id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some((Some(contact),)) => Ok(contact),
            _ => Err(LookupError::NotFound(id)),
        }
    }
}

/// Resolves descriptors to a deduplicated, sorted destination list.
pub struct ContactResolver<'a> {
    lookup: &'a dyn AccountLookup,
}

impl<'a> ContactResolver<'a> {
    pub fn new(lookup: &'a dyn AccountLookup) -> Self {
        Self { lookup }
    }

    /// Refresh every descriptor from the store and project it to an email.
    ///
    /// Any lookup failure aborts the whole resolution: no partial list is
    /// returned. Descriptors whose refreshed contact yields no email are
    /// skipped.
    pub async fn resolve(
        &self,
        descriptors: Vec<RecipientDescriptor>,
    ) -> Result<Destinations, LookupError> {
        let total = descriptors.len();
        let mut emails = BTreeSet::new();
        let mut skipped = 0usize;

        for mut descriptor in descriptors {
            let contact = self.lookup.fetch_contact(descriptor.id).await.inspect_err(|e| {
                tracing::error!(account_id = %descriptor.id, error = %e, "Contact lookup failed");
            })?;
            descriptor.refresh(Some(contact));

            if descriptor.email.trim().is_empty() {
                tracing::debug!(account_id = %descriptor.id, "No email in contact, skipping");
                skipped += 1;
                continue;
            }

            emails.insert(descriptor.email);
        }

        let destinations = Destinations::resolved(emails);
        tracing::info!(
            descriptors = total,
            skipped,
            destinations = destinations.len(),
            "Resolved contact emails"
        );
        Ok(destinations)
    }
}
