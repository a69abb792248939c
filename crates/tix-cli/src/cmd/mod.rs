pub mod create;
pub mod init;
pub mod list;
pub mod show;
pub mod update;

use crate::output::{CliError, OutputMode, fail, report};
use std::path::Path;
use tix_core::{ErrorCode, TicketError, TicketService};
use tix_core::clock::SystemClock;
use tix_core::config::{self, ProjectConfig};
use tix_core::store::SqliteStore;
use tracing::debug;

pub type Service = TicketService<SqliteStore, SystemClock>;

/// Open the ticket service for the project containing `cwd`.
///
/// Renders a structured error before returning `Err` when no `.tix/`
/// directory is found, the project config is malformed, or the database
/// cannot be opened.
pub fn open_service(cwd: &Path, output: OutputMode) -> anyhow::Result<(Service, ProjectConfig)> {
    let Some(root) = config::find_project_root(cwd) else {
        return Err(report(
            output,
            &CliError::from_code(
                ErrorCode::NotInitialized,
                "no .tix/ directory found in this directory or any parent",
            ),
        ));
    };

    let project_config = config::load_project_config(&root).map_err(|err| {
        report(
            output,
            &CliError::from_code(ErrorCode::ConfigParseError, format!("{err:#}")),
        )
    })?;

    let db_path = config::resolve_db_path(&root, &project_config);
    debug!(db = %db_path.display(), "opening ticket store");
    let store = SqliteStore::open(&db_path).map_err(|err| fail(output, &TicketError::from(err)))?;

    Ok((TicketService::new(store, SystemClock::new()), project_config))
}
