//! Show detail loading
//!
//! Tracks the detail view of the currently selected show. Each selection
//! hands out a ticket; only the ticket of the latest selection may change the
//! state, so results for shows the user already navigated away from are
//! ignored.

use crate::catalog::{CatalogDetail, CatalogError, ShowId};

/// State of the detail view
#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    NoSelection,
    Loading { id: ShowId },
    Loaded(CatalogDetail),
    /// Loading failed, `message` is meant for the user
    Failed { id: ShowId, message: String },
}

/// A detail fetch the caller has to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailTicket {
    seq: u64,
    id: ShowId,
}

impl DetailTicket {
    pub fn id(&self) -> ShowId {
        self.id
    }
}

#[derive(Debug)]
pub struct DetailLoader {
    state: DetailState,
    last_seq: u64,
}

impl DetailLoader {
    pub fn new() -> Self {
        Self {
            state: DetailState::NoSelection,
            last_seq: 0,
        }
    }

    /// Selects a show and switches to `Loading`
    ///
    /// Any fetch issued for an earlier selection becomes stale.
    pub fn select(&mut self, id: ShowId) -> DetailTicket {
        self.last_seq += 1;
        self.state = DetailState::Loading { id };
        DetailTicket {
            seq: self.last_seq,
            id,
        }
    }

    /// Applies the outcome of a fetch
    ///
    /// Returns false, leaving the state untouched, if the ticket is stale.
    pub fn resolve(
        &mut self,
        ticket: DetailTicket,
        outcome: Result<CatalogDetail, CatalogError>,
    ) -> bool {
        let current = ticket.seq == self.last_seq
            && matches!(self.state, DetailState::Loading { id } if id == ticket.id);
        if !current {
            log::debug!("Discarding stale detail for show {}", ticket.id);
            return false;
        }

        self.state = match outcome {
            Ok(detail) => DetailState::Loaded(detail),
            Err(e) => {
                log::warn!("Failed to load show {}: {}", ticket.id, e);
                DetailState::Failed {
                    id: ticket.id,
                    message: failure_message(&e),
                }
            }
        };
        true
    }

    /// Clears the selection, dropping any fetch still in flight
    pub fn close(&mut self) {
        self.last_seq += 1;
        self.state = DetailState::NoSelection;
    }

    pub fn state(&self) -> &DetailState {
        &self.state
    }

    /// Id of the selected show, whatever its loading state
    pub fn selected_id(&self) -> Option<ShowId> {
        match &self.state {
            DetailState::NoSelection => None,
            DetailState::Loading { id } | DetailState::Failed { id, .. } => Some(*id),
            DetailState::Loaded(detail) => Some(detail.id),
        }
    }

    /// The loaded detail, if loading finished successfully
    pub fn loaded(&self) -> Option<&CatalogDetail> {
        match &self.state {
            DetailState::Loaded(detail) => Some(detail),
            _ => None,
        }
    }
}

impl Default for DetailLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn failure_message(error: &CatalogError) -> String {
    match error {
        CatalogError::NotFound(_) => "Failed to fetch show details".to_string(),
        other => other.to_string(),
    }
}
