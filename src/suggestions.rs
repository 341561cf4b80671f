//! Search suggestion engine
//!
//! This module turns a stream of text changes into debounced catalog
//! searches and keeps the suggestion dropdown state. Every issued search is
//! tagged with a sequence number; a result is only applied if it belongs to
//! the latest search and the text it was issued for is still current. Late
//! results of superseded searches are dropped.
//!
//! The engine performs no I/O. The caller polls it for due searches, runs
//! them and hands the outcome back through [`SuggestionEngine::resolve`].

use crate::catalog::{CatalogError, CatalogSummary, ShowId};
use crate::config::Config;
use crate::debounce::Debouncer;
use std::time::Instant;

/// Lifecycle of the suggestion dropdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionPhase {
    /// Input too short, nothing to suggest
    Idle,
    /// Waiting for typing to pause
    Debouncing,
    /// Search issued, waiting for its result
    Querying,
    /// Results available
    Resolved,
    /// Latest search returned nothing (or failed)
    Empty,
}

/// A search the caller has to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTicket {
    seq: u64,
    text: String,
}

impl QueryTicket {
    /// Monotonic sequence number of this search
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Trimmed text to search for
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Snapshot of the visible suggestion state
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionQueryState {
    pub current_text: String,
    /// Sequence number of the search awaiting its result
    pub pending_query: Option<u64>,
    pub results: Vec<CatalogSummary>,
    pub is_loading: bool,
    pub is_open: bool,
}

pub struct SuggestionEngine {
    min_query_len: usize,
    limit: usize,
    debouncer: Debouncer<String>,
    current_text: String,
    last_seq: u64,
    pending_query: Option<u64>,
    results: Vec<CatalogSummary>,
    is_loading: bool,
    is_open: bool,
    phase: SuggestionPhase,
}

impl SuggestionEngine {
    pub fn new(config: &Config) -> Self {
        Self {
            min_query_len: config.min_query_len,
            limit: config.suggestion_limit,
            debouncer: Debouncer::new(config.debounce_delay),
            current_text: String::new(),
            last_seq: 0,
            pending_query: None,
            results: Vec::new(),
            is_loading: false,
            is_open: false,
            phase: SuggestionPhase::Idle,
        }
    }

    /// Handles a change of the input text
    ///
    /// Restarts the debounce delay. Any search already in flight loses its
    /// claim on the visible state. Input shorter than the minimum length
    /// clears and closes the suggestions immediately.
    pub fn text_changed(&mut self, text: &str, now: Instant) {
        self.current_text = text.to_string();
        self.pending_query = None;
        self.is_loading = false;

        let query = text.trim();
        if query.chars().count() < self.min_query_len {
            self.debouncer.cancel();
            self.results.clear();
            self.is_open = false;
            self.phase = SuggestionPhase::Idle;
            return;
        }

        self.debouncer.arm(query.to_string(), now);
        self.phase = SuggestionPhase::Debouncing;
    }

    /// Returns the search to run if the debounce delay has elapsed
    pub fn poll(&mut self, now: Instant) -> Option<QueryTicket> {
        let text = self.debouncer.fire_due(now)?;

        self.last_seq += 1;
        self.pending_query = Some(self.last_seq);
        self.is_loading = true;
        self.phase = SuggestionPhase::Querying;

        Some(QueryTicket {
            seq: self.last_seq,
            text,
        })
    }

    /// Instant at which the next search becomes due, if one is armed
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Applies the outcome of a search
    ///
    /// Returns false, leaving the state untouched, if the ticket is stale.
    /// Failures are treated as an empty result.
    pub fn resolve(
        &mut self,
        ticket: &QueryTicket,
        outcome: Result<Vec<CatalogSummary>, CatalogError>,
    ) -> bool {
        if self.pending_query != Some(ticket.seq) || self.current_text.trim() != ticket.text {
            log::debug!(
                "Discarding stale suggestions #{} for '{}'",
                ticket.seq,
                ticket.text
            );
            return false;
        }

        self.pending_query = None;
        self.is_loading = false;

        let mut results = outcome.unwrap_or_else(|e| {
            log::warn!("Suggestion search for '{}' failed: {}", ticket.text, e);
            Vec::new()
        });
        results.truncate(self.limit);

        if results.is_empty() {
            self.results.clear();
            self.is_open = false;
            self.phase = SuggestionPhase::Empty;
        } else {
            self.results = results;
            self.is_open = true;
            self.phase = SuggestionPhase::Resolved;
        }

        true
    }

    /// Reopens the dropdown if earlier results are still available
    ///
    /// Returns whether the dropdown is open afterwards.
    pub fn focus(&mut self) -> bool {
        if !self.results.is_empty() {
            self.is_open = true;
        }
        self.is_open
    }

    /// Closes the dropdown, e.g. on interaction outside of it
    pub fn dismiss(&mut self) {
        self.is_open = false;
    }

    /// Submits the raw input text, bypassing the suggestions
    pub fn submit(&mut self) -> String {
        self.end_input();
        self.current_text.clone()
    }

    /// Selects the suggestion at `index` and closes the dropdown
    ///
    /// Returns None without changing anything if there is no such suggestion.
    pub fn select(&mut self, index: usize) -> Option<ShowId> {
        let id = self.results.get(index)?.id;
        self.end_input();
        Some(id)
    }

    /// Closes the dropdown and drops any armed or in-flight search
    fn end_input(&mut self) {
        self.debouncer.cancel();
        self.pending_query = None;
        self.is_loading = false;
        self.is_open = false;

        if matches!(
            self.phase,
            SuggestionPhase::Debouncing | SuggestionPhase::Querying
        ) {
            self.phase = if self.results.is_empty() {
                SuggestionPhase::Idle
            } else {
                SuggestionPhase::Resolved
            };
        }
    }

    pub fn phase(&self) -> SuggestionPhase {
        self.phase
    }

    pub fn results(&self) -> &[CatalogSummary] {
        &self.results
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn current_text(&self) -> &str {
        &self.current_text
    }

    pub fn state(&self) -> SuggestionQueryState {
        SuggestionQueryState {
            current_text: self.current_text.clone(),
            pending_query: self.pending_query,
            results: self.results.clone(),
            is_loading: self.is_loading,
            is_open: self.is_open,
        }
    }
}
