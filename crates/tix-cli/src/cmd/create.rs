//! `tix create`: open a new ticket in the pending state.

use crate::cmd::open_service;
use crate::cmd::show::render_ticket;
use crate::output::{OutputMode, fail};
use clap::Args;
use serde_json::{Map, Value};
use std::path::Path;
use tix_core::TicketError;

#[derive(Args, Debug, Default)]
pub struct CreateArgs {
    /// Short summary of the problem.
    #[arg(long)]
    pub title: Option<String>,

    /// Full description of the problem.
    #[arg(long)]
    pub description: Option<String>,

    /// Reporter name.
    #[arg(long)]
    pub contact_name: Option<String>,

    /// How to reach the reporter (email, phone, ...).
    #[arg(long)]
    pub contact_info: Option<String>,

    /// Raw JSON payload with camelCase keys instead of individual flags.
    #[arg(
        long,
        conflicts_with_all = ["title", "description", "contact_name", "contact_info"]
    )]
    pub body: Option<String>,
}

/// Parse a `--body` argument into a JSON value.
pub fn parse_body(raw: &str) -> Result<Value, TicketError> {
    serde_json::from_str(raw).map_err(|err| TicketError::invalid(format!("body: {err}")))
}

/// Build a payload object from the flags that were given.
pub fn payload_from_fields(fields: &[(&str, Option<&String>)]) -> Value {
    let map: Map<String, Value> = fields
        .iter()
        .filter_map(|(key, value)| value.map(|v| ((*key).to_string(), Value::String(v.clone()))))
        .collect();
    Value::Object(map)
}

impl CreateArgs {
    fn payload(&self) -> Result<Value, TicketError> {
        if let Some(raw) = &self.body {
            return parse_body(raw);
        }
        Ok(payload_from_fields(&[
            ("title", self.title.as_ref()),
            ("description", self.description.as_ref()),
            ("contactName", self.contact_name.as_ref()),
            ("contactInfo", self.contact_info.as_ref()),
        ]))
    }
}

/// Execute `tix create`.
///
/// # Errors
///
/// Returns an error (after rendering it) if the project is not initialized,
/// any required field is missing or blank, or the insert fails.
pub fn run_create(args: &CreateArgs, output: OutputMode, cwd: &Path) -> anyhow::Result<()> {
    let payload = args.payload().map_err(|err| fail(output, &err))?;
    let (service, _) = open_service(cwd, output)?;
    let ticket = service.create(&payload).map_err(|err| fail(output, &err))?;
    render_ticket(output, &ticket)
}
