//! Result page extraction
//!
//! Parses one results page into case records and their document links.
//! Every result item is extracted independently: a broken item becomes an
//! [`ItemError`] and never prevents its siblings from being extracted.

use crate::record::{CaseRecord, DocumentLink};
use chrono::{Datelike, NaiveDate};
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

/// Display format of publish dates in the result list
pub const PUBLISH_DATE_FORMAT: &str = "%d/%m/%Y";

/// Why a single result item could not be extracted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("Identifier not found")]
    MissingIdentifier,

    #[error("Link to document not found")]
    MissingDocumentLink,

    #[error("Unparsable publish date '{0}'")]
    InvalidPublishDate(String),

    #[error("Unusable document link '{0}'")]
    InvalidDocumentLink(String),
}

/// A record whose document still has to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRequest {
    pub record: CaseRecord,
    pub link: DocumentLink,
}

/// A result item that failed extraction
#[derive(Debug, Clone)]
pub struct ItemError {
    /// Position of the item on its page, starting at 0
    pub index: usize,
    pub error: ExtractionError,
    /// Outer HTML of the offending item, for diagnostics
    pub fragment: String,
}

/// Everything extracted from one page
#[derive(Debug, Clone, Default)]
pub struct PageExtraction {
    pub requests: Vec<DocumentRequest>,
    pub errors: Vec<ItemError>,
}

/// Outcome of scanning a page for result items
#[derive(Debug, Clone)]
pub enum ResultItems {
    Found(PageExtraction),
    /// The page has no result items at all
    NotFound,
}

struct ItemSelectors {
    identifier: Selector,
    description: Selector,
    publish_date: Selector,
    document_link: Selector,
}

impl ItemSelectors {
    fn new() -> Option<Self> {
        Some(Self {
            identifier: Selector::parse("h2[class='title'] > a[title]").ok()?,
            description: Selector::parse("p[class='description']").ok()?,
            publish_date: Selector::parse("span[class='date']").ok()?,
            document_link: Selector::parse("a[class*='btn-primary'][href]").ok()?,
        })
    }
}

/// Extracts all result items from a results page
///
/// # Arguments
///
/// * `html` - The results page body
/// * `base_domain` - Site base used to absolutize relative document links
///
/// # Example
///
/// ```
/// use wrc_harvest::crawler::{extract_page, ResultItems};
///
/// let html = r#"<div class="search-list"><ul>
///   <li class="each-item">
///     <h2 class="title"><a title="ADJ-00001">ADJ-00001</a></h2>
///     <span class="date">14/02/2024</span>
///     <a class="btn btn-primary" href="/en/cases/adj-00001.html">View</a>
///   </li>
/// </ul></div>"#;
///
/// let ResultItems::Found(page) = extract_page(html, "https://www.workplacerelations.ie") else {
///     panic!("expected items");
/// };
/// assert_eq!(page.requests[0].record.identifier, "ADJ-00001");
/// ```
pub fn extract_page(html: &str, base_domain: &str) -> ResultItems {
    let document = Html::parse_document(html);

    let Ok(item_selector) = Selector::parse("div[class*='search-list'] li[class*='each-item']")
    else {
        return ResultItems::NotFound;
    };
    let Some(selectors) = ItemSelectors::new() else {
        return ResultItems::NotFound;
    };

    let mut extraction = PageExtraction::default();
    let mut seen = 0;

    for (index, item) in document.select(&item_selector).enumerate() {
        seen += 1;
        match extract_item(item, &selectors, base_domain) {
            Ok(request) => extraction.requests.push(request),
            Err(error) => extraction.errors.push(ItemError {
                index,
                error,
                fragment: item.html(),
            }),
        }
    }

    if seen == 0 {
        ResultItems::NotFound
    } else {
        ResultItems::Found(extraction)
    }
}

fn extract_item(
    item: ElementRef<'_>,
    selectors: &ItemSelectors,
    base_domain: &str,
) -> Result<DocumentRequest, ExtractionError> {
    let identifier = item
        .select(&selectors.identifier)
        .filter_map(|a| a.value().attr("title"))
        .map(str::trim)
        .find(|t| !t.is_empty())
        .ok_or(ExtractionError::MissingIdentifier)?
        .to_string();

    let description = first_text(item, &selectors.description);
    let publish_date = first_text(item, &selectors.publish_date);

    let partition_date = publish_date
        .as_deref()
        .map(partition_date)
        .transpose()?;

    let href = item
        .select(&selectors.document_link)
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .find(|h| !h.is_empty())
        .ok_or(ExtractionError::MissingDocumentLink)?;
    let link = DocumentLink::resolve(href, base_domain)
        .ok_or_else(|| ExtractionError::InvalidDocumentLink(href.to_string()))?;

    Ok(DocumentRequest {
        record: CaseRecord {
            identifier,
            description,
            publish_date,
            partition_date,
        },
        link,
    })
}

/// First non-blank text node directly under the first matching element
fn first_text(item: ElementRef<'_>, selector: &Selector) -> Option<String> {
    item.select(selector)
        .flat_map(|element| element.children())
        .filter_map(|node| node.value().as_text().map(|t| t.trim().to_string()))
        .find(|t| !t.is_empty())
}

/// Normalizes a `DD/MM/YYYY` publish date to the first of its month
pub fn partition_date(publish_date: &str) -> Result<NaiveDate, ExtractionError> {
    let date = NaiveDate::parse_from_str(publish_date.trim(), PUBLISH_DATE_FORMAT)
        .map_err(|_| ExtractionError::InvalidPublishDate(publish_date.to_string()))?;
    date.with_day(1)
        .ok_or_else(|| ExtractionError::InvalidPublishDate(publish_date.to_string()))
}
