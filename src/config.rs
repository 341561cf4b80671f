//! Runtime configuration

use std::path::PathBuf;
use std::time::Duration;

/// Public TVMaze API endpoint
pub const DEFAULT_API_BASE_URL: &str = "https://api.tvmaze.com";

/// Settings shared by all components of a session
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the show catalog API
    pub api_base_url: String,
    /// Idle time after the last keystroke before a search is issued
    pub debounce_delay: Duration,
    /// Minimum number of characters (after trimming) that triggers a search
    pub min_query_len: usize,
    /// Maximum number of suggestions shown
    pub suggestion_limit: usize,
    /// Number of popular shows fetched for the background
    pub popular_limit: usize,
    /// Directory for persisted data, None selects the platform data directory
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            debounce_delay: Duration::from_millis(300),
            min_query_len: 2,
            suggestion_limit: 5,
            popular_limit: 30,
            data_dir: None,
        }
    }
}
