//! `tix list`: tickets filtered by status, newest first.

use crate::cmd::open_service;
use crate::output::{OutputMode, fail, pretty_section, render_mode};
use clap::Args;
use std::io::{self, Write};
use std::path::Path;
use tix_core::ListRequest;
use tix_core::model::Ticket;

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Only tickets with exactly this status.
    #[arg(long)]
    pub status: Option<String>,

    /// `latest` orders by last update; `created` (default) by creation.
    #[arg(long)]
    pub sort: Option<String>,
}

impl ListArgs {
    /// The request to run, falling back to the project's default sort.
    fn request(&self, default_sort: Option<&str>) -> ListRequest {
        ListRequest {
            status: self.status.clone(),
            sort: self.sort.clone().or_else(|| default_sort.map(str::to_string)),
        }
    }
}

fn write_text(tickets: &[Ticket], w: &mut dyn Write) -> io::Result<()> {
    for t in tickets {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}",
            t.id,
            t.status,
            t.updated_at.to_rfc3339(),
            t.contact.name,
            t.title
        )?;
    }
    Ok(())
}

fn write_pretty(tickets: &[Ticket], w: &mut dyn Write) -> io::Result<()> {
    if tickets.is_empty() {
        return writeln!(w, "No tickets found.");
    }
    pretty_section(w, &format!("Tickets ({})", tickets.len()))?;
    for t in tickets {
        writeln!(
            w,
            "{:<16} {:<9} {:<16} {}",
            t.id.as_str(),
            t.status.as_str(),
            t.contact.name,
            t.title
        )?;
    }
    Ok(())
}

/// Execute `tix list`.
///
/// # Errors
///
/// Returns an error (after rendering it) if the project is not initialized
/// or the query fails.
pub fn run_list(args: &ListArgs, output: OutputMode, cwd: &Path) -> anyhow::Result<()> {
    let (service, config) = open_service(cwd, output)?;
    let request = args.request(config.list.default_sort.as_deref());
    let tickets = service.list(&request).map_err(|err| fail(output, &err))?;
    render_mode(output, tickets.as_slice(), write_text, write_pretty)
}
