use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Project state directory.
pub const TIX_DIR: &str = ".tix";
/// Environment override for the database location.
pub const DB_ENV: &str = "TIX_DB";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub list: ListConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database file, relative to `.tix/` unless absolute.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListConfig {
    /// Sort selector used when the caller gives none (`created` or `latest`).
    #[serde(default)]
    pub default_sort: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("tix.db")
}

/// Walk up from `start` to the first directory holding `.tix/`.
#[must_use]
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(TIX_DIR).is_dir())
        .map(Path::to_path_buf)
}

/// Load `.tix/config.toml`, falling back to defaults when absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(TIX_DIR).join("config.toml");
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load `<config_dir>/tix/config.toml`, falling back to defaults when absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("tix/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Database path: `TIX_DB` if set, else the configured path under `.tix/`.
#[must_use]
pub fn resolve_db_path(project_root: &Path, config: &ProjectConfig) -> PathBuf {
    resolve_db_path_inner(project_root, config, env::var(DB_ENV).ok())
}

fn resolve_db_path_inner(
    project_root: &Path,
    config: &ProjectConfig,
    env_db: Option<String>,
) -> PathBuf {
    if let Some(raw) = env_db.filter(|v| !v.trim().is_empty()) {
        return PathBuf::from(raw);
    }
    project_root.join(TIX_DIR).join(&config.store.path)
}

/// Template written by `tix init`.
pub const DEFAULT_CONFIG_TOML: &str = "[store]\n\
    path = \"tix.db\"\n\
    \n\
    [list]\n\
    # created | latest\n\
    default_sort = \"created\"\n";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_template_parses_to_defaults() {
        let parsed: ProjectConfig = toml::from_str(DEFAULT_CONFIG_TOML).expect("parse template");
        assert_eq!(parsed.store, StoreConfig::default());
        assert_eq!(parsed.list.default_sort.as_deref(), Some("created"));
    }

    #[test]
    fn missing_project_config_uses_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let cfg = load_project_config(dir.path()).expect("load");
        assert_eq!(cfg, ProjectConfig::default());
    }

    #[test]
    fn malformed_project_config_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::create_dir_all(dir.path().join(TIX_DIR)).expect("mkdir");
        std::fs::write(dir.path().join(".tix/config.toml"), "[store\npath=").expect("write");
        let err = load_project_config(dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse"));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let parsed: ProjectConfig = toml::from_str("[list]\ndefault_sort = \"latest\"\n").expect("parse");
        assert_eq!(parsed.store.path, PathBuf::from("tix.db"));
        assert_eq!(parsed.list.default_sort.as_deref(), Some("latest"));
    }

    #[test]
    fn db_path_prefers_env_override() {
        let root = Path::new("/srv/helpdesk");
        let cfg = ProjectConfig::default();
        assert_eq!(
            resolve_db_path_inner(root, &cfg, None),
            PathBuf::from("/srv/helpdesk/.tix/tix.db")
        );
        assert_eq!(
            resolve_db_path_inner(root, &cfg, Some("/tmp/other.db".into())),
            PathBuf::from("/tmp/other.db")
        );
        assert_eq!(
            resolve_db_path_inner(root, &cfg, Some("  ".into())),
            PathBuf::from("/srv/helpdesk/.tix/tix.db")
        );
    }

    #[test]
    fn project_root_is_found_from_nested_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::create_dir_all(dir.path().join(".tix")).expect("mkdir");
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).expect("mkdir nested");
        assert_eq!(find_project_root(&nested).as_deref(), Some(dir.path()));
    }
}
