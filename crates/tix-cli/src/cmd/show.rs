//! `tix show`: display one ticket with its full history.

use crate::cmd::open_service;
use crate::output::{OutputMode, fail, pretty_kv, pretty_rule, pretty_section, render_mode};
use chrono::{DateTime, Local, Utc};
use clap::Args;
use std::io::{self, Write};
use std::path::Path;
use tix_core::model::{HistoryAction, HistoryEntry, Ticket, ValueSnapshot};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Ticket ID, e.g. tk-0123456789ab.
    pub id: String,
}

fn local_time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Names of the fields carried by a snapshot, in document order.
fn snapshot_fields(snapshot: &ValueSnapshot) -> Vec<&'static str> {
    let mut fields = Vec::new();
    if snapshot.title.is_some() {
        fields.push("title");
    }
    if snapshot.description.is_some() {
        fields.push("description");
    }
    if snapshot.contact.is_some() {
        fields.push("contact");
    }
    if snapshot.status.is_some() {
        fields.push("status");
    }
    fields
}

fn describe_entry(entry: &HistoryEntry) -> String {
    match entry.action {
        HistoryAction::Created => "created".to_string(),
        HistoryAction::StatusUpdated => {
            let from = entry.old_value.as_ref().and_then(|v| v.status);
            let to = entry.new_value.as_ref().and_then(|v| v.status);
            match (from, to) {
                (Some(from), Some(to)) => format!("status {from} -> {to}"),
                _ => "status changed".to_string(),
            }
        }
        HistoryAction::InformationUpdated => {
            let (Some(old), Some(new)) = (&entry.old_value, &entry.new_value) else {
                return "information changed".to_string();
            };
            let mut changed = Vec::new();
            if old.title != new.title {
                changed.push("title");
            }
            if old.description != new.description {
                changed.push("description");
            }
            if old.contact != new.contact {
                changed.push("contact");
            }
            if changed.is_empty() {
                changed = snapshot_fields(new);
            }
            format!("information: {}", changed.join(", "))
        }
    }
}

/// Full human rendering of a ticket, shared by show/create/update.
pub fn write_ticket_pretty(ticket: &Ticket, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{}  {}", ticket.id, ticket.title)?;
    pretty_rule(w)?;
    pretty_kv(w, "Status", ticket.status.as_str())?;
    pretty_kv(
        w,
        "Contact",
        format!("{} <{}>", ticket.contact.name, ticket.contact.info),
    )?;
    pretty_kv(w, "Created", local_time(ticket.created_at))?;
    pretty_kv(w, "Updated", local_time(ticket.updated_at))?;

    writeln!(w)?;
    pretty_section(w, "Description")?;
    writeln!(w, "{}", ticket.description)?;

    writeln!(w)?;
    pretty_section(w, &format!("History ({})", ticket.history.len()))?;
    for entry in &ticket.history {
        writeln!(
            w,
            "{}  {:<20} {}",
            local_time(entry.timestamp),
            entry.action.as_str(),
            describe_entry(entry)
        )?;
    }
    Ok(())
}

/// One tab-separated line per ticket field, then one per history entry.
pub fn write_ticket_text(ticket: &Ticket, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "id\t{}", ticket.id)?;
    writeln!(w, "title\t{}", ticket.title)?;
    writeln!(w, "status\t{}", ticket.status)?;
    writeln!(w, "contact_name\t{}", ticket.contact.name)?;
    writeln!(w, "contact_info\t{}", ticket.contact.info)?;
    writeln!(w, "created_at\t{}", ticket.created_at.to_rfc3339())?;
    writeln!(w, "updated_at\t{}", ticket.updated_at.to_rfc3339())?;
    writeln!(w, "description\t{}", ticket.description.replace('\n', "\\n"))?;
    for entry in &ticket.history {
        writeln!(
            w,
            "history\t{}\t{}\t{}",
            entry.timestamp.to_rfc3339(),
            entry.action,
            describe_entry(entry)
        )?;
    }
    Ok(())
}

/// Render a ticket in the requested mode.
pub fn render_ticket(output: OutputMode, ticket: &Ticket) -> anyhow::Result<()> {
    render_mode(output, ticket, write_ticket_text, write_ticket_pretty)
}

/// Execute `tix show <id>`.
///
/// # Errors
///
/// Returns an error (after rendering it) if the project is not initialized,
/// the id is malformed or unknown, or output fails.
pub fn run_show(args: &ShowArgs, output: OutputMode, cwd: &Path) -> anyhow::Result<()> {
    let (service, _) = open_service(cwd, output)?;
    let ticket = service
        .get(args.id.trim())
        .map_err(|err| fail(output, &err))?;
    render_ticket(output, &ticket)
}
