//! Crawler coordinator - the harvest task graph
//!
//! Every fetch is an independent unit of work:
//! - `Seed`: fetch a query's first page and discover its result pages
//! - `Page`: fetch one results page and extract its items
//! - `Document`: fetch one document and persist it
//!
//! Units run on a `JoinSet` and report a [`StageOutcome`] back to the
//! coordinator, which logs it, updates the run statistics and spawns any
//! follow-up units. A semaphore caps the number of fetches in flight. Units
//! share nothing mutable except the content store.

use crate::config::RunContext;
use crate::crawler::discovery::{page_requests, parse_hit_count, HitCount, PageRequest};
use crate::crawler::extractor::{extract_page, DocumentRequest, ResultItems};
use crate::crawler::fetcher::{
    build_http_client, fetch_url, is_missing, FetchError, FetchedResponse, RetryPolicy,
};
use crate::crawler::persister::persist_document;
use crate::output::RunStats;
use crate::query::SearchQuery;
use crate::record::OutputRecord;
use crate::storage::{ContentStore, StoreError};
use crate::HarvestError;
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

/// A unit of work in the harvest task graph
#[derive(Debug, Clone)]
pub enum WorkItem {
    Seed { query: SearchQuery, url: String },
    Page(PageRequest),
    Document(DocumentRequest),
}

impl WorkItem {
    pub fn url(&self) -> &str {
        match self {
            Self::Seed { url, .. } => url,
            Self::Page(page) => &page.url,
            Self::Document(doc) => doc.link.as_str(),
        }
    }
}

/// What a finished unit of work reports back
#[derive(Debug)]
pub enum StageOutcome {
    Discovered {
        seed_url: String,
        hits: HitCount,
        pages: Vec<PageRequest>,
    },
    Extracted {
        page_url: String,
        items: ResultItems,
    },
    Stored(OutputRecord),
    FetchFailed(FetchError),
    StoreFailed {
        identifier: String,
        url: String,
        error: StoreError,
    },
}

/// Main harvest coordinator
///
/// Cheap to clone: every field is shared. Each spawned unit holds its own
/// clone.
#[derive(Clone)]
pub struct Coordinator {
    ctx: Arc<RunContext>,
    store: Arc<dyn ContentStore>,
    client: Client,
    fetch_slots: Arc<Semaphore>,
    retry: RetryPolicy,
}

impl Coordinator {
    /// Creates a coordinator for one run
    ///
    /// # Arguments
    ///
    /// * `ctx` - The immutable run context
    /// * `store` - Content store documents are written to
    pub fn new(ctx: RunContext, store: Arc<dyn ContentStore>) -> Result<Self, HarvestError> {
        let client = build_http_client(&ctx.crawler, &ctx.user_agent)?;
        let fetch_slots = Arc::new(Semaphore::new(ctx.crawler.max_concurrent_requests as usize));
        let retry = RetryPolicy::from(&ctx.crawler);

        Ok(Self {
            ctx: Arc::new(ctx),
            store,
            client,
            fetch_slots,
            retry,
        })
    }

    /// Runs the harvest to completion
    ///
    /// Ensures the bucket exists, seeds one unit per search query and keeps
    /// dispatching outcomes until no unit is left. Every stored document is
    /// sent to `sink`. Only store namespace failures abort the run; all other
    /// failures are scoped to their unit and counted in the returned stats.
    ///
    /// Dropping the returned future aborts every in-flight unit. No store
    /// write is issued before its document fetch has completed.
    pub async fn run(&self, sink: mpsc::Sender<OutputRecord>) -> Result<RunStats, HarvestError> {
        self.store.ensure_namespace(&self.ctx.bucket).await?;

        tracing::info!(
            "Starting harvest for {} into bucket {}",
            self.ctx.window,
            self.ctx.bucket
        );

        let mut stats = RunStats::default();
        let mut units = JoinSet::new();

        for query in self.ctx.queries() {
            let url = query.seed_url(&self.ctx.base_domain);
            stats.queries += 1;
            self.spawn(&mut units, WorkItem::Seed { query, url });
        }

        while let Some(joined) = units.join_next().await {
            match joined {
                Ok(outcome) => self.dispatch(outcome, &mut units, &sink, &mut stats).await,
                Err(e) => tracing::error!("Work unit aborted: {}", e),
            }
        }

        stats.log_summary();
        Ok(stats)
    }

    fn spawn(&self, units: &mut JoinSet<StageOutcome>, item: WorkItem) {
        let unit = self.clone();
        units.spawn(async move { unit.process(item).await });
    }

    /// Runs one unit of work
    async fn process(&self, item: WorkItem) -> StageOutcome {
        let response = match self.fetch(item.url()).await {
            Ok(response) => response,
            Err(e) => return StageOutcome::FetchFailed(e),
        };

        match item {
            WorkItem::Seed { url, .. } => {
                let hits = parse_hit_count(&response.text());
                let pages = page_requests(&url, hits, self.ctx.crawler.max_pages_per_query);
                StageOutcome::Discovered {
                    seed_url: url,
                    hits,
                    pages,
                }
            }
            WorkItem::Page(page) => StageOutcome::Extracted {
                items: extract_page(&response.text(), &self.ctx.base_domain),
                page_url: page.url,
            },
            WorkItem::Document(request) => {
                let identifier = request.record.identifier.clone();
                let url = request.link.to_string();
                match persist_document(self.store.as_ref(), &self.ctx.bucket, request, response)
                    .await
                {
                    Ok(record) => StageOutcome::Stored(record),
                    Err(error) => StageOutcome::StoreFailed {
                        identifier,
                        url,
                        error,
                    },
                }
            }
        }
    }

    /// Fetches a URL while holding one of the run's fetch slots
    async fn fetch(&self, url: &str) -> Result<FetchedResponse, FetchError> {
        let _slot = self
            .fetch_slots
            .acquire()
            .await
            .map_err(|_| FetchError::Network {
                url: url.to_string(),
                message: "fetch slots closed".to_string(),
            })?;

        tracing::debug!("Fetching {}", url);
        let response = fetch_url(&self.client, url, self.retry).await?;
        if response.final_url != url {
            tracing::debug!("{} redirected to {}", url, response.final_url);
        }
        Ok(response)
    }

    async fn dispatch(
        &self,
        outcome: StageOutcome,
        units: &mut JoinSet<StageOutcome>,
        sink: &mpsc::Sender<OutputRecord>,
        stats: &mut RunStats,
    ) {
        match outcome {
            StageOutcome::Discovered {
                seed_url,
                hits,
                pages,
            } => {
                match hits {
                    HitCount::Found(count) => tracing::info!(
                        "{} hits, {} pages for {}",
                        count,
                        pages.len(),
                        seed_url
                    ),
                    HitCount::NotFound => {
                        stats.queries_without_hits += 1;
                        tracing::info!("No hits found for {}", seed_url);
                    }
                }

                stats.pages_requested += pages.len() as u64;
                for page in pages {
                    self.spawn(units, WorkItem::Page(page));
                }
            }

            StageOutcome::Extracted { page_url, items } => match items {
                ResultItems::NotFound => {
                    stats.pages_without_items += 1;
                    tracing::info!("No items found for {}", page_url);
                }
                ResultItems::Found(extraction) => {
                    stats.items_found +=
                        (extraction.requests.len() + extraction.errors.len()) as u64;
                    stats.extraction_errors += extraction.errors.len() as u64;

                    for item_error in &extraction.errors {
                        tracing::warn!(
                            "Error while extracting item {} from {}: {}",
                            item_error.index,
                            page_url,
                            item_error.error
                        );
                        tracing::debug!("Offending fragment: {}", item_error.fragment);
                    }

                    for request in extraction.requests {
                        self.spawn(units, WorkItem::Document(request));
                    }
                }
            },

            StageOutcome::Stored(record) => {
                stats.documents_stored += 1;
                if sink.send(record).await.is_err() {
                    tracing::debug!("Output receiver closed, record dropped from stream");
                }
            }

            StageOutcome::FetchFailed(error) => {
                stats.fetch_errors += 1;
                if is_missing(&error) {
                    tracing::warn!("Not found, skipping: {}", error);
                } else {
                    tracing::warn!("Fetch failed, skipping: {}", error);
                }
            }

            StageOutcome::StoreFailed {
                identifier,
                url,
                error,
            } => {
                stats.store_errors += 1;
                tracing::error!(
                    "Failed to store document for {} ({}): {}",
                    identifier,
                    url,
                    error
                );
            }
        }
    }
}

/// Records and statistics of a completed run
#[derive(Debug, Clone)]
pub struct HarvestOutcome {
    pub records: Vec<OutputRecord>,
    pub stats: RunStats,
}

/// Runs a complete harvest and collects every output record
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use wrc_harvest::config::{load_config, RunContext};
/// use wrc_harvest::crawler::run_harvest;
/// use wrc_harvest::storage::MemoryContentStore;
/// use wrc_harvest::window::DateWindow;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let window = DateWindow::parse("01-01-2024", "31-01-2024")?;
/// let store = Arc::new(MemoryContentStore::new(&config.store.principal));
/// let outcome = run_harvest(RunContext::new(&config, window), store).await?;
/// println!("{} documents stored", outcome.records.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest(
    ctx: RunContext,
    store: Arc<dyn ContentStore>,
) -> Result<HarvestOutcome, HarvestError> {
    let coordinator = Coordinator::new(ctx, store)?;
    let (tx, mut rx) = mpsc::channel(64);

    let collector = tokio::spawn(async move {
        let mut records = Vec::new();
        while let Some(record) = rx.recv().await {
            records.push(record);
        }
        records
    });

    let result = coordinator.run(tx).await;
    // The sender was moved into `run` and is dropped by now, so the collector ends
    let records = collector.await.unwrap_or_default();

    Ok(HarvestOutcome {
        records,
        stats: result?,
    })
}
