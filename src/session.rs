//! Browsing session
//!
//! A `Session` wires the suggestion engine, the detail loader and the
//! favorites store to a catalog provider and a storage backend. User actions
//! come in as method calls, state changes go out as [`SessionEvent`]s through
//! the callback given at construction. Network round trips run synchronously
//! inside the method that needs them.

use crate::catalog::{CatalogDetail, CatalogProvider, CatalogSummary, ShowId};
use crate::config::Config;
use crate::detail::{DetailLoader, DetailState};
use crate::favorites::{FavoriteEntry, FavoritesStore};
use crate::storage::KeyValueStorage;
use crate::suggestions::SuggestionEngine;
use std::time::Instant;

/// Change notification emitted by a session
///
/// These events allow front-ends to re-render exactly the part of the view
/// that changed.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The input text changed
    TextChanged { text: String },

    /// A suggestion search was issued
    SuggestionsLoading { query: String },

    /// A suggestion search result was applied
    SuggestionsUpdated {
        results: Vec<CatalogSummary>,
        open: bool,
    },

    /// The dropdown was opened or closed without new results
    DropdownToggled { open: bool },

    /// The raw input text was submitted
    Submitted { text: String },

    /// Loading the detail of a show started
    DetailLoading { id: ShowId },

    /// The detail of the selected show is available
    DetailLoaded { detail: CatalogDetail },

    /// Loading the detail of the selected show failed
    DetailFailed { id: ShowId, message: String },

    /// The detail view was closed
    DetailClosed,

    /// The favorites collection changed
    FavoritesChanged { entries: Vec<FavoriteEntry> },
}

pub struct Session<P, S, F>
where
    P: CatalogProvider,
    S: KeyValueStorage,
    F: FnMut(SessionEvent),
{
    provider: P,
    suggestions: SuggestionEngine,
    detail: DetailLoader,
    favorites: FavoritesStore<S>,
    popular_limit: usize,
    notify: F,
}

impl<P, S, F> Session<P, S, F>
where
    P: CatalogProvider,
    S: KeyValueStorage,
    F: FnMut(SessionEvent),
{
    /// Creates a session, loading the persisted favorites from `storage`
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use show_scout::{Config, MemoryStorage, Session, SessionEvent, TvMazeProvider};
    /// use std::time::Instant;
    ///
    /// let mut session = Session::new(
    ///     TvMazeProvider::new(),
    ///     MemoryStorage::new(),
    ///     &Config::default(),
    ///     |event| {
    ///         if let SessionEvent::SuggestionsUpdated { results, .. } = event {
    ///             for show in results {
    ///                 println!("{}", show.name);
    ///             }
    ///         }
    ///     },
    /// );
    ///
    /// session.text_changed("Breaking", Instant::now());
    /// while let Some(deadline) = session.next_deadline() {
    ///     std::thread::sleep(deadline.saturating_duration_since(Instant::now()));
    ///     session.tick(Instant::now());
    /// }
    /// ```
    pub fn new(provider: P, storage: S, config: &Config, notify: F) -> Self {
        Self {
            provider,
            suggestions: SuggestionEngine::new(config),
            detail: DetailLoader::new(),
            favorites: FavoritesStore::load(storage),
            popular_limit: config.popular_limit,
            notify,
        }
    }

    /// Handles a keystroke in the search input
    pub fn text_changed(&mut self, text: &str, now: Instant) {
        let was_open = self.suggestions.is_open();
        let had_results = !self.suggestions.results().is_empty();

        self.suggestions.text_changed(text, now);
        (self.notify)(SessionEvent::TextChanged {
            text: text.to_string(),
        });

        // Short input clears the suggestions right away
        if had_results && self.suggestions.results().is_empty() {
            self.emit_suggestions();
        } else if was_open != self.suggestions.is_open() {
            self.emit_dropdown();
        }
    }

    /// Runs the debounced search if it is due
    ///
    /// Returns whether a search was issued.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(ticket) = self.suggestions.poll(now) else {
            return false;
        };

        (self.notify)(SessionEvent::SuggestionsLoading {
            query: ticket.text().to_string(),
        });

        let outcome = self.provider.search_by_text(ticket.text());
        if self.suggestions.resolve(&ticket, outcome) {
            self.emit_suggestions();
        }
        true
    }

    /// Instant at which `tick` has work to do next
    pub fn next_deadline(&self) -> Option<Instant> {
        self.suggestions.next_deadline()
    }

    /// The search input regained focus
    pub fn focus(&mut self) {
        let was_open = self.suggestions.is_open();
        if self.suggestions.focus() != was_open {
            self.emit_dropdown();
        }
    }

    /// Pointer interaction outside of the dropdown
    pub fn dismiss(&mut self) {
        if self.suggestions.is_open() {
            self.suggestions.dismiss();
            self.emit_dropdown();
        }
    }

    /// Submits the raw input text
    pub fn submit(&mut self) -> String {
        let was_open = self.suggestions.is_open();
        let text = self.suggestions.submit();
        if was_open {
            self.emit_dropdown();
        }
        (self.notify)(SessionEvent::Submitted { text: text.clone() });
        text
    }

    /// Selects a suggestion and opens its detail view
    ///
    /// Returns the selected id, None for an invalid index.
    pub fn select_suggestion(&mut self, index: usize) -> Option<ShowId> {
        let id = self.suggestions.select(index)?;
        self.emit_dropdown();
        self.open_detail(id);
        Some(id)
    }

    /// Loads and shows the detail of a show
    pub fn open_detail(&mut self, id: ShowId) -> &DetailState {
        let ticket = self.detail.select(id);
        (self.notify)(SessionEvent::DetailLoading { id });

        let outcome = self.provider.fetch_by_id(id);
        if self.detail.resolve(ticket, outcome) {
            match self.detail.state() {
                DetailState::Loaded(detail) => {
                    let detail = detail.clone();
                    (self.notify)(SessionEvent::DetailLoaded { detail });
                }
                DetailState::Failed { id, message } => {
                    let event = SessionEvent::DetailFailed {
                        id: *id,
                        message: message.clone(),
                    };
                    (self.notify)(event);
                }
                _ => {}
            }
        }

        self.detail.state()
    }

    /// Closes the detail view
    pub fn close_detail(&mut self) {
        if self.detail.selected_id().is_some() {
            self.detail.close();
            (self.notify)(SessionEvent::DetailClosed);
        }
    }

    /// Adds the loaded show to the favorites, or removes it if it already is one
    ///
    /// Returns whether the show is a favorite afterwards, None if no detail is
    /// loaded.
    pub fn toggle_favorite(&mut self) -> Option<bool> {
        let detail = self.detail.loaded()?.clone();

        let result = if self.favorites.has(detail.id) {
            self.favorites.remove(detail.id)
        } else {
            self.favorites.add(&detail)
        };
        self.after_favorites_change(result);

        Some(self.favorites.has(detail.id))
    }

    /// Removes a favorite, e.g. from the favorites grid
    pub fn remove_favorite(&mut self, id: ShowId) {
        let result = self.favorites.remove(id);
        self.after_favorites_change(result);
    }

    /// Popular shows for the decorative background
    pub fn background(&self) -> Vec<CatalogSummary> {
        self.provider.list_popular(self.popular_limit)
    }

    pub fn suggestions(&self) -> &SuggestionEngine {
        &self.suggestions
    }

    pub fn detail(&self) -> &DetailState {
        self.detail.state()
    }

    pub fn favorites(&self) -> &[FavoriteEntry] {
        self.favorites.entries()
    }

    pub fn is_favorite(&self, id: ShowId) -> bool {
        self.favorites.has(id)
    }

    fn after_favorites_change(&mut self, result: Result<bool, crate::storage::StorageError>) {
        let changed = match result {
            Ok(changed) => changed,
            Err(e) => {
                // The in-memory collection already changed
                log::warn!("Failed to persist favorites: {}", e);
                true
            }
        };

        if changed {
            (self.notify)(SessionEvent::FavoritesChanged {
                entries: self.favorites.entries().to_vec(),
            });
        }
    }

    fn emit_suggestions(&mut self) {
        (self.notify)(SessionEvent::SuggestionsUpdated {
            results: self.suggestions.results().to_vec(),
            open: self.suggestions.is_open(),
        });
    }

    fn emit_dropdown(&mut self) {
        (self.notify)(SessionEvent::DropdownToggled {
            open: self.suggestions.is_open(),
        });
    }
}
