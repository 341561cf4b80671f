//! ShowScout - Discover TV shows from the terminal
//!
//! This library provides the core of a show discovery front-end: live search
//! suggestions with debouncing, a show detail loader, and a favorites list
//! that is persisted locally. Data comes from the public TVMaze catalog.

mod catalog;
mod config;
mod debounce;
mod detail;
mod favorites;
mod session;
mod storage;
mod suggestions;
mod temp;

// Re-export error types
pub use catalog::CatalogError;
pub use storage::StorageError;

pub use catalog::{CatalogDetail, CatalogProvider, CatalogSummary, ShowId, TvMazeProvider};
pub use config::{Config, DEFAULT_API_BASE_URL};
pub use debounce::{Debouncer, TimerHandle};
pub use detail::{DetailLoader, DetailState, DetailTicket};
pub use favorites::{FAVORITES_KEY, FavoriteEntry, FavoritesStore};
pub use session::{Session, SessionEvent};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use suggestions::{QueryTicket, SuggestionEngine, SuggestionPhase, SuggestionQueryState};

use thiserror::Error;

/// Top-level error type for ShowScout operations
#[derive(Debug, Error)]
pub enum ShowScoutError {
    /// Error talking to the show catalog
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Error accessing persistent storage
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Opens a session against the configured catalog and the persistent data
/// directory
///
/// Change notifications are passed to `notify`, which can be empty for
/// silent operation.
///
/// # Examples
///
/// ```no_run
/// use show_scout::{open_session, Config, SessionEvent};
///
/// let mut session = open_session(&Config::default(), |event| {
///     if let SessionEvent::DetailLoaded { detail } = event {
///         println!("Loaded {}", detail.name);
///     }
/// })
/// .unwrap();
///
/// session.open_detail(169);
/// ```
pub fn open_session<F>(
    config: &Config,
    notify: F,
) -> Result<Session<TvMazeProvider, FileStorage, F>, ShowScoutError>
where
    F: FnMut(SessionEvent),
{
    let storage = match &config.data_dir {
        Some(dir) => FileStorage::open(dir)?,
        None => FileStorage::open_default()?,
    };
    log::debug!("Using data directory {}", storage.dir().display());

    let provider = TvMazeProvider::with_base_url(&config.api_base_url);

    Ok(Session::new(provider, storage, config, notify))
}
