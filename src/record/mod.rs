//! Case record data model
//!
//! Records are enriched append-only as they move through the pipeline: the
//! extractor produces a [`CaseRecord`] and a [`DocumentLink`], the persister
//! wraps both into an [`OutputRecord`] without rewriting any existing field.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use url::Url;

/// Metadata extracted from one search result item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseRecord {
    /// Case identifier, e.g. `ADJ-00012345`; never empty
    pub identifier: String,

    /// Short description shown in the result list
    pub description: Option<String>,

    /// Publish date as displayed (`DD/MM/YYYY`)
    pub publish_date: Option<String>,

    /// Publish date normalized to the first of its month
    pub partition_date: Option<NaiveDate>,
}

/// Absolute URL of a record's source document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DocumentLink(String);

impl DocumentLink {
    /// Resolves an extracted `href` against the site's base domain
    ///
    /// Absolute http(s) links are kept exactly as written; relative links are
    /// joined onto the base domain. Anything else (`mailto:`, `javascript:`,
    /// unparsable text) yields `None`.
    ///
    /// # Example
    ///
    /// ```
    /// use wrc_harvest::record::DocumentLink;
    ///
    /// let link = DocumentLink::resolve("/en/case/1", "https://www.workplacerelations.ie").unwrap();
    /// assert_eq!(link.as_str(), "https://www.workplacerelations.ie/en/case/1");
    /// ```
    pub fn resolve(href: &str, base_domain: &str) -> Option<Self> {
        let href = href.trim();
        match Url::parse(href) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Some(Self(href.to_string())),
            Ok(_) => None,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let joined = Url::parse(base_domain).ok()?.join(href).ok()?;
                Some(Self(joined.to_string()))
            }
            Err(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Final unit yielded by the pipeline for each stored document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputRecord {
    #[serde(flatten)]
    pub record: CaseRecord,
    pub link_to_doc: DocumentLink,
    pub storage_key: String,
    pub storage_bucket: String,
}
