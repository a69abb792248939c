//! `tix update`: apply a partial change to a ticket.

use crate::cmd::create::{parse_body, payload_from_fields};
use crate::cmd::open_service;
use crate::cmd::show::render_ticket;
use crate::output::{OutputMode, fail};
use clap::Args;
use serde_json::Value;
use std::path::Path;
use tix_core::TicketError;

#[derive(Args, Debug, Default)]
pub struct UpdateArgs {
    /// Ticket ID, e.g. tk-0123456789ab.
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub contact_name: Option<String>,

    #[arg(long)]
    pub contact_info: Option<String>,

    /// pending, accepted, resolved or rejected.
    #[arg(long)]
    pub status: Option<String>,

    /// Raw JSON patch with camelCase keys instead of individual flags.
    #[arg(
        long,
        conflicts_with_all = ["title", "description", "contact_name", "contact_info", "status"]
    )]
    pub body: Option<String>,
}

impl UpdateArgs {
    fn payload(&self) -> Result<Value, TicketError> {
        if let Some(raw) = &self.body {
            return parse_body(raw);
        }
        Ok(payload_from_fields(&[
            ("title", self.title.as_ref()),
            ("description", self.description.as_ref()),
            ("contactName", self.contact_name.as_ref()),
            ("contactInfo", self.contact_info.as_ref()),
            ("status", self.status.as_ref()),
        ]))
    }
}

/// Execute `tix update <id>`.
///
/// With no field flags the ticket is saved unchanged apart from its
/// last-updated time.
///
/// # Errors
///
/// Returns an error (after rendering it) if the ticket does not exist, the
/// id is malformed, the patch is invalid, or the save fails.
pub fn run_update(args: &UpdateArgs, output: OutputMode, cwd: &Path) -> anyhow::Result<()> {
    let payload = args.payload().map_err(|err| fail(output, &err))?;
    let (service, _) = open_service(cwd, output)?;
    let ticket = service
        .update(args.id.trim(), &payload)
        .map_err(|err| fail(output, &err))?;
    render_ticket(output, &ticket)
}
