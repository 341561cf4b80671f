/// TVMaze API response types for deserialization.
///
/// These structures mirror the JSON response format from the TVMaze API.
/// Everything except the show id is optional, the API omits or nulls fields
/// freely.
use serde::Deserialize;

/// A single hit from the `/search/shows` endpoint.
#[derive(Debug, Deserialize)]
pub(super) struct TvMazeSearchHit {
    /// The matched show
    pub show: TvMazeShow,
}

/// A show as returned by `/shows`, `/shows/{id}` and inside search hits.
#[derive(Debug, Deserialize)]
pub(super) struct TvMazeShow {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<TvMazeImage>,
    /// Premiere date as "YYYY-MM-DD"
    #[serde(default)]
    pub premiered: Option<String>,
    #[serde(default)]
    pub genres: Option<Vec<String>>,
    #[serde(default)]
    pub rating: Option<TvMazeRating>,
    #[serde(default)]
    pub network: Option<TvMazeNetwork>,
    /// Summary in HTML format
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    /// Episode runtime in minutes
    #[serde(default)]
    pub runtime: Option<u32>,
}

/// Image links of a show.
#[derive(Debug, Deserialize)]
pub(super) struct TvMazeImage {
    #[serde(default)]
    pub medium: Option<String>,
    #[serde(default)]
    pub original: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TvMazeRating {
    #[serde(default)]
    pub average: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TvMazeNetwork {
    #[serde(default)]
    pub name: Option<String>,
}
