/// TVMaze catalog provider implementation.
use super::tvmaze_types::{TvMazeSearchHit, TvMazeShow};
use super::{CatalogDetail, CatalogError, CatalogProvider, CatalogSummary, ShowId};
use crate::config::DEFAULT_API_BASE_URL;

/// Maximum number of results a text search returns.
pub const SEARCH_RESULT_LIMIT: usize = 5;

/// Catalog provider for the TVMaze API.
///
/// This provider talks to https://api.tvmaze.com (or a configured mirror)
/// using the show search, show lookup and show index endpoints.
pub struct TvMazeProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl TvMazeProvider {
    /// Creates a new TVMaze provider instance against the public API.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_API_BASE_URL)
    }

    /// Creates a provider talking to a different base URL.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Returns the base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn show_name(show: &TvMazeShow) -> String {
        show.name.clone().unwrap_or_else(|| "Unknown".to_string())
    }

    /// Converts a search hit to a summary with the medium image as thumbnail.
    fn convert_search_hit(hit: TvMazeSearchHit) -> CatalogSummary {
        let show = hit.show;
        CatalogSummary {
            id: show.id,
            name: Self::show_name(&show),
            thumbnail_url: show.image.and_then(|image| image.medium),
        }
    }

    /// Converts a listed show to a summary, preferring the original image.
    ///
    /// Returns None for shows without any image.
    fn convert_popular(show: TvMazeShow) -> Option<CatalogSummary> {
        let name = Self::show_name(&show);
        let image = show
            .image
            .and_then(|image| image.original.or(image.medium))?;

        Some(CatalogSummary {
            id: show.id,
            name,
            thumbnail_url: Some(image),
        })
    }

    /// Converts TVMaze show data to our internal CatalogDetail structure.
    fn convert_detail(show: TvMazeShow) -> CatalogDetail {
        let name = Self::show_name(&show);
        let (thumbnail_url, poster_url) = match show.image {
            Some(image) => (image.medium, image.original),
            None => (None, None),
        };

        CatalogDetail {
            id: show.id,
            name,
            thumbnail_url,
            poster_url,
            premiere_year: show.premiered.as_deref().and_then(parse_year),
            genres: show.genres.unwrap_or_default(),
            rating_average: show.rating.and_then(|rating| rating.average),
            network_name: show.network.and_then(|network| network.name),
            summary_html: show.summary,
            status: show.status,
            kind: show.kind,
            language: show.language,
            runtime_minutes: show.runtime,
        }
    }

    fn status_error(response: &reqwest::blocking::Response) -> CatalogError {
        CatalogError::Network(format!(
            "HTTP {} {}",
            response.status().as_u16(),
            response.status().canonical_reason().unwrap_or("Unknown")
        ))
    }
}

impl Default for TvMazeProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Extracts the year from a "YYYY-MM-DD" date.
fn parse_year(date: &str) -> Option<i32> {
    date.get(..4)?.parse().ok()
}

impl CatalogProvider for TvMazeProvider {
    fn search_by_text(&self, query: &str) -> Result<Vec<CatalogSummary>, CatalogError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CatalogError::InvalidQuery(query.to_string()));
        }

        let url = format!("{}/search/shows", self.base_url);

        // The query builder takes care of URL encoding
        let response = self
            .client
            .get(&url)
            .query(&[("q", query)])
            .send()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::status_error(&response));
        }

        let hits: Vec<TvMazeSearchHit> = response
            .json()
            .map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;

        Ok(hits
            .into_iter()
            .take(SEARCH_RESULT_LIMIT)
            .map(Self::convert_search_hit)
            .collect())
    }

    fn fetch_by_id(&self, id: ShowId) -> Result<CatalogDetail, CatalogError> {
        let url = format!("{}/shows/{}", self.base_url, id);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CatalogError::NotFound(id));
        }

        let show: TvMazeShow = response
            .json()
            .map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;

        Ok(Self::convert_detail(show))
    }

    fn list_popular(&self, limit: usize) -> Vec<CatalogSummary> {
        let url = format!("{}/shows", self.base_url);

        let shows: Result<Vec<TvMazeShow>, CatalogError> = self
            .client
            .get(&url)
            .send()
            .map_err(|e| CatalogError::Network(e.to_string()))
            .and_then(|response| {
                if response.status().is_success() {
                    response
                        .json()
                        .map_err(|e| CatalogError::InvalidResponse(e.to_string()))
                } else {
                    Err(Self::status_error(&response))
                }
            });

        match shows {
            Ok(shows) => shows
                .into_iter()
                .filter_map(Self::convert_popular)
                .take(limit)
                .collect(),
            Err(e) => {
                log::warn!("Failed to fetch popular shows: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOW_JSON: &str = r#"{
        "id": 169,
        "name": "Breaking Bad",
        "type": "Scripted",
        "language": "English",
        "genres": ["Drama", "Crime", "Thriller"],
        "status": "Ended",
        "runtime": 60,
        "premiered": "2008-01-20",
        "rating": {"average": 9.2},
        "network": {"id": 20, "name": "AMC"},
        "image": {
            "medium": "https://static.tvmaze.com/medium/0/2400.jpg",
            "original": "https://static.tvmaze.com/original/0/2400.jpg"
        },
        "summary": "<p><b>Breaking Bad</b> follows Walter White.</p>"
    }"#;

    #[test]
    fn test_convert_detail_full() {
        let show: TvMazeShow = serde_json::from_str(SHOW_JSON).unwrap();
        let detail = TvMazeProvider::convert_detail(show);

        assert_eq!(detail.id, 169);
        assert_eq!(detail.name, "Breaking Bad");
        assert_eq!(detail.premiere_year, Some(2008));
        assert_eq!(detail.genres, vec!["Drama", "Crime", "Thriller"]);
        assert_eq!(detail.rating_average, Some(9.2));
        assert_eq!(detail.network_name.as_deref(), Some("AMC"));
        assert_eq!(detail.kind.as_deref(), Some("Scripted"));
        assert_eq!(detail.runtime_minutes, Some(60));
        assert_eq!(
            detail.thumbnail_url.as_deref(),
            Some("https://static.tvmaze.com/medium/0/2400.jpg")
        );
        assert_eq!(
            detail.poster_url.as_deref(),
            Some("https://static.tvmaze.com/original/0/2400.jpg")
        );
    }

    #[test]
    fn test_convert_detail_tolerates_missing_and_null_fields() {
        let show: TvMazeShow = serde_json::from_str(
            r#"{"id": 7, "genres": null, "rating": {"average": null}, "network": null, "image": null}"#,
        )
        .unwrap();
        let detail = TvMazeProvider::convert_detail(show);

        assert_eq!(detail.id, 7);
        assert_eq!(detail.name, "Unknown");
        assert!(detail.genres.is_empty());
        assert_eq!(detail.rating_average, None);
        assert_eq!(detail.network_name, None);
        assert_eq!(detail.thumbnail_url, None);
        assert_eq!(detail.poster_url, None);
        assert_eq!(detail.premiere_year, None);
    }

    #[test]
    fn test_convert_search_hit_uses_medium_image() {
        let hits: Vec<TvMazeSearchHit> = serde_json::from_str(
            r#"[
                {"score": 0.9, "show": {"id": 1, "name": "Bref", "image": {"medium": "m.jpg", "original": "o.jpg"}}},
                {"score": 0.5, "show": {"id": 2, "name": "Brews", "image": null}}
            ]"#,
        )
        .unwrap();

        let summaries: Vec<CatalogSummary> = hits
            .into_iter()
            .map(TvMazeProvider::convert_search_hit)
            .collect();

        assert_eq!(summaries[0].thumbnail_url.as_deref(), Some("m.jpg"));
        assert_eq!(summaries[1].thumbnail_url, None);
        assert_eq!(summaries[1].name, "Brews");
    }

    #[test]
    fn test_convert_popular_skips_shows_without_image() {
        let shows: Vec<TvMazeShow> = serde_json::from_str(
            r#"[
                {"id": 1, "name": "A", "image": {"medium": "a-m.jpg", "original": "a-o.jpg"}},
                {"id": 2, "name": "B", "image": null},
                {"id": 3, "name": "C", "image": {"medium": "c-m.jpg", "original": null}}
            ]"#,
        )
        .unwrap();

        let popular: Vec<CatalogSummary> = shows
            .into_iter()
            .filter_map(TvMazeProvider::convert_popular)
            .collect();

        assert_eq!(popular.len(), 2);
        assert_eq!(popular[0].thumbnail_url.as_deref(), Some("a-o.jpg"));
        assert_eq!(popular[1].id, 3);
        assert_eq!(popular[1].thumbnail_url.as_deref(), Some("c-m.jpg"));
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year("2008-01-20"), Some(2008));
        assert_eq!(parse_year("19"), None);
        assert_eq!(parse_year("abcd-01-01"), None);
    }

    #[test]
    fn test_search_rejects_blank_query() {
        let provider = TvMazeProvider::with_base_url("http://127.0.0.1:9");
        let result = provider.search_by_text("   ");
        assert!(matches!(result, Err(CatalogError::InvalidQuery(_))));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let provider = TvMazeProvider::with_base_url("https://example.org/");
        assert_eq!(provider.base_url(), "https://example.org");
    }
}
