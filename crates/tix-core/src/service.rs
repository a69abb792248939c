//! Ticket operations at the request boundary.
//!
//! [`TicketService`] wires validation, the entity model, the history
//! recorder and the reconciler to a [`TicketStore`]. Each call is one
//! request: update is a plain read-modify-write against the store with no
//! version check, so concurrent updates to one ticket are last-write-wins.

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::error::TicketError;
use crate::model::{NewTicket, Ticket};
use crate::reconcile::{self, TicketPatch};
use crate::store::{SortOrder, StoreError, TicketQuery, TicketStore};
use crate::validate::TicketInput;

/// Listing parameters as a caller supplies them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRequest {
    /// Exact status to match; empty means no filter.
    pub status: Option<String>,
    /// `latest` for last-updated order, anything else for newest-created.
    pub sort: Option<String>,
}

impl ListRequest {
    fn to_query(&self) -> TicketQuery {
        TicketQuery {
            status: self.status.clone().filter(|s| !s.is_empty()),
            sort: SortOrder::from_selector(self.sort.as_deref()),
        }
    }
}

pub struct TicketService<S, C> {
    store: S,
    clock: C,
}

impl<S: TicketStore, C: Clock> TicketService<S, C> {
    pub const fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Validate a creation payload and store a new pending ticket.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::Validation`] listing every missing or blank
    /// field (nothing is stored), or [`TicketError::Storage`] if the insert
    /// fails.
    pub fn create(&self, payload: &Value) -> Result<Ticket, TicketError> {
        let input = TicketInput::from_payload(payload)
            .map_err(|report| TicketError::Validation { errors: report.errors })?;

        let draft = NewTicket::new(
            &input.title,
            &input.description,
            input.contact,
            self.clock.now(),
        )?;
        debug!(title = %draft.title, contact = %draft.contact.name, "creating ticket");

        let ticket = self
            .store
            .insert(draft)
            .inspect_err(|err| log_store_failure("create", None, err))?;
        info!(ticket_id = %ticket.id, status = %ticket.status, "created ticket");
        Ok(ticket)
    }

    /// Tickets matching the optional status filter, in the requested order.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::Storage`] if the query fails.
    pub fn list(&self, request: &ListRequest) -> Result<Vec<Ticket>, TicketError> {
        let query = request.to_query();
        let tickets = self
            .store
            .find(&query)
            .inspect_err(|err| log_store_failure("list", None, err))?;
        debug!(count = tickets.len(), sort = %query.sort, "listed tickets");
        Ok(tickets)
    }

    /// One ticket by id.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::NotFound`] or [`TicketError::MalformedId`] as
    /// reported by the store.
    pub fn get(&self, id: &str) -> Result<Ticket, TicketError> {
        Ok(self
            .store
            .find_by_id(id)
            .inspect_err(|err| log_store_failure("get", Some(id), err))?)
    }

    /// Apply a partial update, recording history, and save.
    ///
    /// The patch is fully validated before the loaded ticket is touched, and
    /// the document is checked again before the single save, so a failure
    /// never reaches the store.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::NotFound`] / [`TicketError::MalformedId`] for an
    /// unknown or malformed id, [`TicketError::Validation`] for a bad patch,
    /// or [`TicketError::Storage`] if the save fails.
    pub fn update(&self, id: &str, payload: &Value) -> Result<Ticket, TicketError> {
        let mut ticket = self
            .store
            .find_by_id(id)
            .inspect_err(|err| log_store_failure("update", Some(id), err))?;
        let patch = TicketPatch::from_payload(payload)?.validate()?;
        if patch.is_empty() {
            debug!(ticket_id = %ticket.id, "empty patch, refreshing updatedAt only");
        }

        let changes = reconcile::reconcile(&mut ticket, &patch, self.clock.now());
        if let Err(err) = ticket.validate() {
            warn!(ticket_id = %ticket.id, error = %err, "refusing to save invalid ticket");
            return Err(err);
        }

        let saved = self
            .store
            .save(&ticket)
            .inspect_err(|err| log_store_failure("update", Some(id), err))?;
        info!(
            ticket_id = %saved.id,
            changes = %changes,
            entries = changes.entries(),
            status = %saved.status,
            "updated ticket"
        );
        Ok(saved)
    }
}

/// Persistence failures are logged for operators; unknown and malformed
/// ids are caller errors and stay quiet.
fn log_store_failure(operation: &'static str, ticket_id: Option<&str>, err: &StoreError) {
    if matches!(err, StoreError::NotFound { .. } | StoreError::MalformedId { .. }) {
        return;
    }
    error!(operation, ticket_id = ticket_id.unwrap_or("-"), error = %err, "ticket store failure");
}
