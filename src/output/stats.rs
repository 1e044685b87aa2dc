//! Run statistics
//!
//! Counters kept by the coordinator while a run progresses, printed at the
//! end of the run.

/// Run statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Seed queries issued
    pub queries: u64,

    /// Seed queries whose first page had no hit-count header
    pub queries_without_hits: u64,

    /// Results pages requested across all queries
    pub pages_requested: u64,

    /// Results pages with no result items
    pub pages_without_items: u64,

    /// Result items seen on fetched pages
    pub items_found: u64,

    /// Items skipped because extraction failed
    pub extraction_errors: u64,

    /// Seed, page or document fetches that failed
    pub fetch_errors: u64,

    /// Documents fetched but not stored
    pub store_errors: u64,

    /// Documents stored and emitted as output records
    pub documents_stored: u64,
}

impl RunStats {
    /// Number of scoped failures of any kind
    pub fn failures(&self) -> u64 {
        self.extraction_errors + self.fetch_errors + self.store_errors
    }

    /// Logs the summary through `tracing`
    pub fn log_summary(&self) {
        tracing::info!(
            "Run summary: {} queries ({} without hits), {} pages ({} without items), {} items",
            self.queries,
            self.queries_without_hits,
            self.pages_requested,
            self.pages_without_items,
            self.items_found
        );
        tracing::info!(
            "Stored {} documents; {} extraction errors, {} fetch errors, {} store errors",
            self.documents_stored,
            self.extraction_errors,
            self.fetch_errors,
            self.store_errors
        );
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &RunStats) {
    println!("=== Harvest Statistics ===\n");

    println!("Discovery:");
    println!("  Queries: {}", stats.queries);
    println!("  Queries without hits: {}", stats.queries_without_hits);
    println!("  Pages requested: {}", stats.pages_requested);
    println!("  Pages without items: {}", stats.pages_without_items);
    println!("  Items found: {}", stats.items_found);
    println!();

    if stats.failures() > 0 {
        println!("Failures:");
        println!("  Extraction: {}", stats.extraction_errors);
        println!("  Fetch: {}", stats.fetch_errors);
        println!("  Store: {}", stats.store_errors);
        println!();
    }

    let success_rate = if stats.items_found > 0 {
        (stats.documents_stored as f64 / stats.items_found as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Stored: {} documents ({:.1}% of items found)",
        stats.documents_stored, success_rate
    );
}
