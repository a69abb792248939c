use crate::output::{CliError, OutputMode, render_mode, report};
use anyhow::{Context as _, Result};
use clap::Args;
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;
use tix_core::ErrorCode;
use tix_core::config::{self, DEFAULT_CONFIG_TOML, TIX_DIR};
use tix_core::store::SqliteStore;
use tracing::info;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Rewrite `.tix/config.toml` even if `.tix/` already exists.
    #[arg(long)]
    pub force: bool,
}

const GITIGNORE: &str = "*.db\n*.db-wal\n*.db-shm\n";

#[derive(Debug, Serialize)]
struct InitReport {
    project_dir: String,
    config: String,
    database: String,
}

/// Execute `tix init`. Creates the project skeleton:
///
/// ```text
/// .tix/
///   config.toml   (default project config)
///   .gitignore    (database files)
///   tix.db        (ticket store, migrated to the latest schema)
/// ```
///
/// # Errors
///
/// Returns an error if `.tix/` already exists and `--force` is not set,
/// or if any filesystem or database operation fails.
pub fn run_init(args: &InitArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let tix_dir = project_root.join(TIX_DIR);

    if tix_dir.exists() && !args.force {
        return Err(report(
            output,
            &CliError::from_code(ErrorCode::AlreadyInitialized, ".tix/ already exists"),
        ));
    }

    std::fs::create_dir_all(&tix_dir)
        .with_context(|| format!("Failed to create {}", tix_dir.display()))?;

    let config_path = tix_dir.join("config.toml");
    std::fs::write(&config_path, DEFAULT_CONFIG_TOML)
        .with_context(|| format!("Failed to write config: {}", config_path.display()))?;

    let gitignore_path = tix_dir.join(".gitignore");
    std::fs::write(&gitignore_path, GITIGNORE)
        .with_context(|| format!("Failed to write .gitignore: {}", gitignore_path.display()))?;

    let project_config = config::load_project_config(project_root)?;
    let db_path = config::resolve_db_path(project_root, &project_config);
    SqliteStore::open(&db_path)
        .with_context(|| format!("Failed to create database: {}", db_path.display()))?;
    info!(db = %db_path.display(), "initialized ticket store");

    let report = InitReport {
        project_dir: tix_dir.display().to_string(),
        config: config_path.display().to_string(),
        database: db_path.display().to_string(),
    };
    render_mode(
        output,
        &report,
        |r, w| writeln!(w, "{}\t{}", r.project_dir, r.database),
        write_pretty,
    )
}

fn write_pretty(report: &InitReport, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "✓ Initialized .tix/ project structure.")?;
    writeln!(w)?;
    writeln!(w, "  Config:   {}", report.config)?;
    writeln!(w, "  Database: {}", report.database)?;
    writeln!(w)?;
    writeln!(w, "Next steps:")?;
    writeln!(w, "  Open your first ticket:")?;
    writeln!(
        w,
        "    tix create --title \"Printer jam\" --description \"Tray 2 jams\" \\"
    )?;
    writeln!(
        w,
        "      --contact-name \"Ana\" --contact-info \"ana@example.com\""
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_creates_config_and_database() {
        let dir = tempfile::tempdir().expect("temp dir");
        run_init(&InitArgs { force: false }, OutputMode::Text, dir.path()).expect("init");

        let tix = dir.path().join(".tix");
        assert!(tix.join("config.toml").is_file());
        assert!(tix.join(".gitignore").is_file());
        assert!(tix.join("tix.db").is_file());
    }

    #[test]
    fn second_init_requires_force() {
        let dir = tempfile::tempdir().expect("temp dir");
        run_init(&InitArgs { force: false }, OutputMode::Text, dir.path()).expect("init");
        assert!(run_init(&InitArgs { force: false }, OutputMode::Text, dir.path()).is_err());
        run_init(&InitArgs { force: true }, OutputMode::Text, dir.path()).expect("force init");
    }
}
