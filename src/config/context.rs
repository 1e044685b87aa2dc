use crate::config::types::{Config, CrawlerConfig, UserAgentConfig};
use crate::query::{build_queries, BodyCategory, SearchQuery};
use crate::window::DateWindow;

/// Immutable per-run context threaded through every pipeline stage
///
/// Built once from the loaded [`Config`] and the run's [`DateWindow`]; stages
/// receive it behind an `Arc` and never mutate it.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Scheme and host of the search site, without a trailing slash
    pub base_domain: String,

    /// Namespace documents are written into
    pub bucket: String,

    /// Body categories searched this run
    pub bodies: Vec<BodyCategory>,

    /// Date window this run covers
    pub window: DateWindow,

    pub crawler: CrawlerConfig,
    pub user_agent: UserAgentConfig,
}

impl RunContext {
    pub fn new(config: &Config, window: DateWindow) -> Self {
        Self {
            base_domain: config.site.base_domain.trim_end_matches('/').to_string(),
            bucket: config.store.bucket.clone(),
            bodies: config.site.bodies.clone(),
            window,
            crawler: config.crawler.clone(),
            user_agent: config.user_agent.clone(),
        }
    }

    /// The run's query set
    pub fn queries(&self) -> Vec<SearchQuery> {
        build_queries(self.window, &self.bodies)
    }

    /// Seed URLs for every query, in body-category order
    pub fn seed_urls(&self) -> Vec<String> {
        self.queries()
            .iter()
            .map(|q| q.seed_url(&self.base_domain))
            .collect()
    }
}
