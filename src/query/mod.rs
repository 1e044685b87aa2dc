//! Query Set Builder
//!
//! Turns a validated [`DateWindow`] into one search query per tribunal body
//! category. Each query renders to a fully-qualified seed URL on the search
//! site.

use crate::window::DateWindow;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Path of the decisions search page, relative to the site's base domain
pub const SEARCH_PATH: &str = "/en/search/";

/// A tribunal jurisdiction used as the `body` search filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BodyCategory(pub u32);

impl BodyCategory {
    /// The fixed body categories searched on every run
    pub const ALL: [BodyCategory; 4] = [
        BodyCategory(1),
        BodyCategory(2),
        BodyCategory(3),
        BodyCategory(15376),
    ];

    pub fn id(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for BodyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A search for one body category over the run's window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchQuery {
    pub body: BodyCategory,
    pub window: DateWindow,
}

impl SearchQuery {
    /// Renders the seed URL for this query
    ///
    /// `base_domain` is the scheme and host of the site with no trailing
    /// slash, e.g. `https://www.workplacerelations.ie`.
    pub fn seed_url(&self, base_domain: &str) -> String {
        format!(
            "{}{}?decisions=1&body={}&from={}&to={}",
            base_domain.trim_end_matches('/'),
            SEARCH_PATH,
            self.body,
            self.window.start_text(),
            self.window.end_text()
        )
    }
}

/// Builds the ordered query set for a window
///
/// The window has already been validated by its constructor, so building the
/// queries cannot fail.
pub fn build_queries(window: DateWindow, bodies: &[BodyCategory]) -> Vec<SearchQuery> {
    bodies
        .iter()
        .map(|&body| SearchQuery { body, window })
        .collect()
}
