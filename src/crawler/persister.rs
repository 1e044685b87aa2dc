//! Document persistence
//!
//! Classifies a fetched document, writes it to the content store under its
//! deterministic key and produces the final output record.

use crate::crawler::extractor::DocumentRequest;
use crate::crawler::fetcher::FetchedResponse;
use crate::record::OutputRecord;
use crate::storage::{ContentStore, StoreResult, StoredDocument};

/// Stores a fetched document and returns the enriched record
///
/// Only called once the document fetch has fully completed, so an aborted
/// run never leaves a partial object behind. Store failures are returned to
/// the caller as-is; nothing is retried here.
pub async fn persist_document(
    store: &dyn ContentStore,
    bucket: &str,
    request: DocumentRequest,
    response: FetchedResponse,
) -> StoreResult<OutputRecord> {
    let document = StoredDocument::new(
        &request.record.identifier,
        bucket,
        &response.content_type,
        response.body,
    );

    document.write_to(store).await?;

    tracing::debug!(
        "Stored {} ({}, {} bytes) in {}",
        document.key,
        document.content_type,
        document.body.len(),
        document.bucket
    );

    Ok(OutputRecord {
        record: request.record,
        link_to_doc: request.link,
        storage_key: document.key,
        storage_bucket: document.bucket,
    })
}
