//! Crawler module: the crawl-extract-store pipeline
//!
//! This module contains the harvest logic, including:
//! - HTTP fetching with retry for transient failures
//! - Pagination discovery from a seed query's hit count
//! - Result page extraction into case records
//! - Document classification and persistence
//! - The coordinator that runs all of it as a task graph

mod coordinator;
mod discovery;
mod extractor;
mod fetcher;
mod persister;

pub use coordinator::{run_harvest, Coordinator, HarvestOutcome, StageOutcome, WorkItem};
pub use discovery::{page_count, page_requests, parse_hit_count, HitCount, PageRequest};
pub use extractor::{
    extract_page, partition_date, DocumentRequest, ExtractionError, ItemError, PageExtraction,
    ResultItems,
};
pub use fetcher::{
    build_http_client, fetch_url, format_user_agent, FetchError, FetchedResponse, RetryPolicy,
};
pub use persister::persist_document;

pub use crate::output::RunStats;
