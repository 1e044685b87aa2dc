//! Pagination discovery
//!
//! Reads the "hits found" header of a seed query's first results page and
//! turns it into one page request per results page.

use regex::Regex;
use scraper::{Html, Selector};

/// Results shown per page by the search site
pub const RESULTS_PER_PAGE: u64 = 10;

/// Outcome of reading the hit-count header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitCount {
    Found(u64),
    /// No header, or a header without any number in it
    NotFound,
}

/// A results page to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub url: String,
    pub page_number: u64,
}

/// Number of result pages for a hit count
///
/// Always `hits / 10 + 1`, so a query with zero hits still yields one page.
pub fn page_count(hits: u64) -> u64 {
    hits / RESULTS_PER_PAGE + 1
}

/// Parses the hit count from a results page
///
/// Takes the first non-blank text node directly inside a `searchhead`
/// element and returns the largest integer found in it. Numbers written with
/// thousands separators (`1,234`) are read as a single number.
pub fn parse_hit_count(html: &str) -> HitCount {
    let document = Html::parse_document(html);

    let Some(text) = hit_count_text(&document) else {
        return HitCount::NotFound;
    };

    match largest_integer(&text) {
        Some(hits) => HitCount::Found(hits),
        None => HitCount::NotFound,
    }
}

fn hit_count_text(document: &Html) -> Option<String> {
    let selector = Selector::parse("div[class*='searchhead']").ok()?;

    document
        .select(&selector)
        .flat_map(|element| element.children())
        .filter_map(|node| node.value().as_text().map(|t| t.trim().to_string()))
        .find(|t| !t.is_empty())
}

fn largest_integer(text: &str) -> Option<u64> {
    let re = Regex::new(r"\d{1,3}(?:,\d{3})+|\d+").ok()?;

    re.find_iter(text)
        .filter_map(|m| m.as_str().replace(',', "").parse::<u64>().ok())
        .max()
}

/// Builds the page requests for a seed query
///
/// Each page URL is the seed URL with a `pageNumber` parameter appended.
/// `NotFound` yields no requests at all. At most `max_pages` requests are
/// built; a hit count implying more is logged and truncated.
pub fn page_requests(seed_url: &str, hits: HitCount, max_pages: u64) -> Vec<PageRequest> {
    let HitCount::Found(hits) = hits else {
        return Vec::new();
    };

    let mut pages = page_count(hits);
    if pages > max_pages {
        tracing::warn!(
            "{} hits imply {} pages for {}, only requesting the first {}",
            hits,
            pages,
            seed_url,
            max_pages
        );
        pages = max_pages;
    }

    (1..=pages)
        .map(|page_number| PageRequest {
            url: page_url(seed_url, page_number),
            page_number,
        })
        .collect()
}

fn page_url(seed_url: &str, page_number: u64) -> String {
    let separator = if seed_url.contains('?') { '&' } else { '?' };
    format!("{}{}pageNumber={}", seed_url, separator, page_number)
}
