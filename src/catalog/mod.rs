//! Remote show catalog access.
//!
//! This module provides the record types produced by catalog queries and the
//! trait every catalog backend implements. The only backend shipped is the
//! public TVMaze API.
mod tvmaze;
mod tvmaze_types;

pub use tvmaze::TvMazeProvider;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a show in the remote catalog.
pub type ShowId = u64;

/// Errors that can occur while talking to the remote catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Transport failure or an unsuccessful response to a search/listing
    #[error("Request failed: {0}")]
    Network(String),

    /// The requested show does not exist (or could not be fetched)
    #[error("Show not found: {0}")]
    NotFound(ShowId),

    /// The response body could not be parsed
    #[error("Failed to parse API response: {0}")]
    InvalidResponse(String),

    /// The search query was empty after trimming
    #[error("Invalid search query: {0:?}")]
    InvalidQuery(String),
}

/// A short catalog record as returned by searches and listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSummary {
    /// Catalog identifier
    pub id: ShowId,
    /// Display name of the show
    pub name: String,
    /// Thumbnail image, if the catalog has one
    pub thumbnail_url: Option<String>,
}

/// The full record of a single show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogDetail {
    pub id: ShowId,
    pub name: String,
    /// Medium resolution image
    pub thumbnail_url: Option<String>,
    /// Original resolution image
    pub poster_url: Option<String>,
    pub premiere_year: Option<i32>,
    pub genres: Vec<String>,
    pub rating_average: Option<f64>,
    pub network_name: Option<String>,
    /// Summary as delivered by the catalog (HTML)
    pub summary_html: Option<String>,
    pub status: Option<String>,
    pub kind: Option<String>,
    pub language: Option<String>,
    pub runtime_minutes: Option<u32>,
}

impl CatalogDetail {
    /// Returns the summary converted to plain text, if there is one.
    pub fn summary_text(&self) -> Option<String> {
        self.summary_html
            .as_deref()
            .map(|html| nanohtml2text::html2text(html).trim().to_string())
            .filter(|text| !text.is_empty())
    }
}

/// Trait for catalog backends.
///
/// Every call is a single best-effort round trip: no retries, no caching.
pub trait CatalogProvider {
    /// Searches shows by free text.
    ///
    /// Returns at most five summaries in the catalog's relevance order.
    ///
    /// # Errors
    ///
    /// `InvalidQuery` for empty input, `Network` on transport failure or an
    /// unsuccessful response.
    fn search_by_text(&self, query: &str) -> Result<Vec<CatalogSummary>, CatalogError>;

    /// Fetches the full record of a single show.
    ///
    /// # Errors
    ///
    /// `NotFound` if the catalog does not answer successfully, `Network` on
    /// transport failure.
    fn fetch_by_id(&self, id: ShowId) -> Result<CatalogDetail, CatalogError>;

    /// Lists popular shows that have an image, truncated to `limit`.
    ///
    /// Failures degrade to an empty list.
    fn list_popular(&self, limit: usize) -> Vec<CatalogSummary>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail_with_summary(summary: Option<&str>) -> CatalogDetail {
        CatalogDetail {
            id: 1,
            name: "Under the Dome".to_string(),
            thumbnail_url: None,
            poster_url: None,
            premiere_year: None,
            genres: Vec::new(),
            rating_average: None,
            network_name: None,
            summary_html: summary.map(str::to_string),
            status: None,
            kind: None,
            language: None,
            runtime_minutes: None,
        }
    }

    #[test]
    fn test_summary_text_strips_html() {
        let detail = detail_with_summary(Some("<p>Under the Dome is a town.</p>"));
        assert_eq!(
            detail.summary_text().as_deref(),
            Some("Under the Dome is a town.")
        );
    }

    #[test]
    fn test_summary_text_missing_or_blank() {
        assert_eq!(detail_with_summary(None).summary_text(), None);
        assert_eq!(detail_with_summary(Some("<p> </p>")).summary_text(), None);
    }
}
