//! Ticket lifecycle: create, list, get, and update through the service,
//! checking history shape and persistence side effects.

use serde_json::{Value, json};
use std::cell::Cell;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;
use tix_core::clock::ManualClock;
use tix_core::model::{HistoryAction, NewTicket, Status, Ticket};
use tix_core::store::{SqliteStore, StoreError, TicketQuery, TicketStore};
use tix_core::{ErrorCode, ListRequest, TicketError, TicketService};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// Store wrapper that counts writes.
struct CountingStore {
    inner: SqliteStore,
    inserts: Cell<usize>,
    saves: Cell<usize>,
}

impl CountingStore {
    fn new() -> Self {
        Self {
            inner: SqliteStore::open_in_memory().expect("open store"),
            inserts: Cell::new(0),
            saves: Cell::new(0),
        }
    }

    fn writes(&self) -> usize {
        self.inserts.get() + self.saves.get()
    }
}

impl TicketStore for CountingStore {
    fn insert(&self, draft: NewTicket) -> Result<Ticket, StoreError> {
        self.inserts.set(self.inserts.get() + 1);
        self.inner.insert(draft)
    }

    fn find(&self, query: &TicketQuery) -> Result<Vec<Ticket>, StoreError> {
        self.inner.find(query)
    }

    fn find_by_id(&self, id: &str) -> Result<Ticket, StoreError> {
        self.inner.find_by_id(id)
    }

    fn save(&self, ticket: &Ticket) -> Result<Ticket, StoreError> {
        self.saves.set(self.saves.get() + 1);
        self.inner.save(ticket)
    }
}

type Svc = TicketService<CountingStore, ManualClock>;

fn service() -> Svc {
    TicketService::new(
        CountingStore::new(),
        ManualClock::new(1_700_000_000_000_000, 1_000_000),
    )
}

fn payload(title: &str) -> Value {
    json!({
        "title": title,
        "description": "Screen flickers after wake",
        "contactName": "Dana",
        "contactInfo": "dana@example.com",
    })
}

fn create(svc: &Svc, title: &str) -> Ticket {
    svc.create(&payload(title)).expect("create ticket")
}

fn ids(tickets: &[Ticket]) -> Vec<String> {
    tickets.iter().map(|t| t.id.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

#[test]
fn creation_with_any_blank_field_fails_and_stores_nothing() {
    let cases = [
        ("title", "Title is required"),
        ("description", "Description is required"),
        ("contactName", "Contact name is required"),
        ("contactInfo", "Contact information is required"),
    ];

    let svc = service();
    for (field, message) in cases {
        for blank in [Value::Null, json!(""), json!("   ")] {
            let mut body = payload("Flicker");
            body[field] = blank.clone();
            let err = svc.create(&body).expect_err("should fail");
            assert_eq!(err.code(), ErrorCode::ValidationFailed);
            assert_eq!(err.validation_errors(), [message], "field {field} = {blank}");
        }
    }

    assert_eq!(svc.store().inserts.get(), 0);
    assert!(svc.list(&ListRequest::default()).expect("list").is_empty());
}

#[test]
fn creation_records_exactly_one_created_entry() {
    let svc = service();
    let ticket = create(&svc, "  Flicker  ");

    assert_eq!(ticket.title, "Flicker");
    assert_eq!(ticket.status, Status::Pending);
    assert_eq!(ticket.history.len(), 1);

    let entry = &ticket.history[0];
    assert_eq!(entry.action, HistoryAction::Created);
    assert!(entry.old_value.is_none());
    assert_eq!(entry.timestamp, ticket.created_at);

    let snapshot = entry.new_value.as_ref().expect("newValue");
    assert_eq!(snapshot.title.as_deref(), Some("Flicker"));
    assert_eq!(snapshot.description.as_deref(), Some("Screen flickers after wake"));
    assert_eq!(snapshot.contact.as_ref(), Some(&ticket.contact));
    assert_eq!(snapshot.status, Some(Status::Pending));
}

// ---------------------------------------------------------------------------
// Updates
// ---------------------------------------------------------------------------

#[test]
fn empty_update_changes_only_updated_at() {
    let svc = service();
    let ticket = create(&svc, "Flicker");

    let updated = svc.update(ticket.id.as_str(), &json!({})).expect("update");

    assert_eq!(updated.title, ticket.title);
    assert_eq!(updated.description, ticket.description);
    assert_eq!(updated.contact, ticket.contact);
    assert_eq!(updated.status, ticket.status);
    assert_eq!(updated.history, ticket.history);
    assert!(updated.updated_at > ticket.updated_at);
    assert_eq!(svc.store().saves.get(), 1);
}

#[test]
fn status_only_update() {
    let svc = service();
    let ticket = create(&svc, "Flicker");

    let updated = svc
        .update(ticket.id.as_str(), &json!({"status": "resolved"}))
        .expect("update");

    assert_eq!(updated.history.len(), 2);
    let entry = &updated.history[1];
    assert_eq!(entry.action, HistoryAction::StatusUpdated);
    assert_eq!(
        entry.old_value.as_ref().and_then(|v| v.status),
        Some(Status::Pending)
    );
    assert_eq!(
        entry.new_value.as_ref().and_then(|v| v.status),
        Some(Status::Resolved)
    );
    assert_eq!(updated.title, ticket.title);
    assert_eq!(updated.description, ticket.description);
    assert_eq!(updated.contact, ticket.contact);
}

#[test]
fn information_only_update() {
    let svc = service();
    let ticket = create(&svc, "Flicker");

    let updated = svc
        .update(ticket.id.as_str(), &json!({"title": "New"}))
        .expect("update");

    let statuses = updated
        .history
        .iter()
        .filter(|e| e.action == HistoryAction::StatusUpdated)
        .count();
    assert_eq!(statuses, 0);
    assert_eq!(updated.history.len(), 2);

    let entry = &updated.history[1];
    assert_eq!(entry.action, HistoryAction::InformationUpdated);
    assert_eq!(
        entry.old_value.as_ref().and_then(|v| v.title.as_deref()),
        Some("Flicker")
    );
    assert_eq!(
        entry.new_value.as_ref().and_then(|v| v.title.as_deref()),
        Some("New")
    );
}

#[test]
fn combined_update_appends_status_then_information() {
    let svc = service();
    let ticket = create(&svc, "Flicker");

    let updated = svc
        .update(
            ticket.id.as_str(),
            &json!({"status": "accepted", "description": "X"}),
        )
        .expect("update");

    let actions: Vec<_> = updated.history.iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        [
            HistoryAction::Created,
            HistoryAction::StatusUpdated,
            HistoryAction::InformationUpdated,
        ]
    );
    assert_eq!(updated.status, Status::Accepted);
    assert_eq!(updated.description, "X");
}

#[test]
fn idempotent_patch_records_nothing() {
    let svc = service();
    let ticket = create(&svc, "Flicker");

    let updated = svc
        .update(ticket.id.as_str(), &json!({"title": "Flicker", "status": "pending"}))
        .expect("update");

    assert_eq!(updated.title, "Flicker");
    assert_eq!(updated.history.len(), 1);
}

#[test]
fn history_accumulates_across_updates() {
    let svc = service();
    let ticket = create(&svc, "Flicker");
    let id = ticket.id.as_str();

    svc.update(id, &json!({"status": "accepted"})).expect("accept");
    svc.update(id, &json!({"contactName": "Dana Q"})).expect("rename");
    let last = svc
        .update(id, &json!({"status": "resolved", "contactInfo": "555-0100"}))
        .expect("resolve");

    assert_eq!(last.history.len(), 5);
    let stored = svc.get(id).expect("get");
    assert_eq!(stored, last);
    assert_eq!(stored.created_at, ticket.created_at);
    let timestamps: Vec<_> = stored.history.iter().map(|e| e.timestamp).collect();
    assert!(timestamps.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn invalid_status_is_rejected_without_a_write() {
    let svc = service();
    let ticket = create(&svc, "Flicker");

    let err = svc
        .update(ticket.id.as_str(), &json!({"status": "archived"}))
        .expect_err("invalid status");
    assert_eq!(
        err.validation_errors(),
        ["status: `archived` is not a valid enum value"]
    );
    assert_eq!(svc.store().saves.get(), 0);
}

// ---------------------------------------------------------------------------
// Lookup failures
// ---------------------------------------------------------------------------

#[test]
fn not_found_on_get_and_update_causes_no_write() {
    let svc = service();
    create(&svc, "Flicker");
    let writes = svc.store().writes();

    let err = svc.get("tk-ffffffffffff").expect_err("missing");
    assert!(matches!(err, TicketError::NotFound { .. }));
    assert_eq!(err.code().http_status(), 404);

    let err = svc
        .update("tk-ffffffffffff", &json!({"status": "resolved"}))
        .expect_err("missing");
    assert!(matches!(err, TicketError::NotFound { .. }));
    assert_eq!(svc.store().writes(), writes);
}

#[test]
fn malformed_ids_surface_as_client_errors() {
    let svc = service();
    let err = svc.get("not-a-ticket").expect_err("malformed");
    assert_eq!(err.code(), ErrorCode::MalformedTicketId);
    assert_eq!(err.code().http_status(), 400);
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[test]
fn list_filter_returns_only_matching_status() {
    let svc = service();
    let a = create(&svc, "a");
    let b = create(&svc, "b");
    let c = create(&svc, "c");
    svc.update(b.id.as_str(), &json!({"status": "resolved"}))
        .expect("resolve");

    let pending = svc
        .list(&ListRequest {
            status: Some("pending".into()),
            sort: None,
        })
        .expect("list");

    let mut got = ids(&pending);
    got.sort();
    let mut want = ids(&[a, c]);
    want.sort();
    assert_eq!(got, want);
}

#[test]
fn default_sort_is_newest_created_first() {
    let svc = service();
    let a = create(&svc, "a");
    let b = create(&svc, "b");
    let c = create(&svc, "c");
    svc.update(a.id.as_str(), &json!({"title": "a2"}))
        .expect("touch a");

    let listed = svc.list(&ListRequest::default()).expect("list");
    assert_eq!(ids(&listed), ids(&[c, b, a]));
    assert!(listed.windows(2).all(|w| w[0].created_at > w[1].created_at));
}

#[test]
fn latest_sort_is_most_recently_updated_first() {
    let svc = service();
    let a = create(&svc, "a");
    let b = create(&svc, "b");
    let c = create(&svc, "c");
    svc.update(a.id.as_str(), &json!({"status": "accepted"}))
        .expect("touch a");

    let listed = svc
        .list(&ListRequest {
            status: None,
            sort: Some("latest".into()),
        })
        .expect("list");
    assert_eq!(ids(&listed), ids(&[a, c, b]));
    assert!(listed.windows(2).all(|w| w[0].updated_at > w[1].updated_at));

    let unknown = svc
        .list(&ListRequest {
            status: None,
            sort: Some("oldest".into()),
        })
        .expect("list");
    assert!(unknown.windows(2).all(|w| w[0].created_at > w[1].created_at));
}

// ---------------------------------------------------------------------------
// Storage failures
// ---------------------------------------------------------------------------

/// Store whose saves always fail at the database layer.
struct BrokenSaves {
    inner: SqliteStore,
}

impl TicketStore for BrokenSaves {
    fn insert(&self, draft: NewTicket) -> Result<Ticket, StoreError> {
        self.inner.insert(draft)
    }

    fn find(&self, query: &TicketQuery) -> Result<Vec<Ticket>, StoreError> {
        self.inner.find(query)
    }

    fn find_by_id(&self, id: &str) -> Result<Ticket, StoreError> {
        self.inner.find_by_id(id)
    }

    fn save(&self, _ticket: &Ticket) -> Result<Ticket, StoreError> {
        Err(StoreError::Backend(rusqlite::Error::QueryReturnedNoRows))
    }
}

/// In-memory sink for formatted log lines.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("log lock")).into_owned()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_writer(logs.clone())
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, logs.text())
}

#[test]
fn failed_save_is_logged_as_an_error_and_reported_as_server_failure() {
    let svc = TicketService::new(
        BrokenSaves {
            inner: SqliteStore::open_in_memory().expect("open store"),
        },
        ManualClock::new(1_700_000_000_000_000, 1_000_000),
    );

    let (result, logs) = with_captured_logs(|| {
        let ticket = svc.create(&payload("Flicker")).expect("create");
        svc.update(ticket.id.as_str(), &json!({"status": "resolved"}))
    });

    let err = result.expect_err("save should fail");
    assert!(matches!(err, TicketError::Storage(StoreError::Backend(_))));
    assert_eq!(err.code(), ErrorCode::StorageFailure);
    assert_eq!(err.code().http_status(), 500);

    let line = logs
        .lines()
        .find(|l| l.contains("ticket store failure"))
        .unwrap_or_else(|| panic!("no store failure logged in:\n{logs}"));
    assert!(line.contains("ERROR"), "{line}");
    assert!(line.contains("operation=\"update\""), "{line}");
}

#[test]
fn unknown_ids_are_not_logged_as_store_failures() {
    let svc = service();
    let (result, logs) = with_captured_logs(|| svc.get("tk-ffffffffffff"));

    assert!(matches!(result, Err(TicketError::NotFound { .. })));
    assert!(!logs.contains("ERROR"), "{logs}");
}
