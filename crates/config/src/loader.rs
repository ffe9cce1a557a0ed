use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::VermieterConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "vermieter.toml",
    "vermieter.yaml",
    "vermieter.yml",
    "vermieter.json",
];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<VermieterConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw).map_err(|e| anyhow::anyhow!("{}: {e}", path.display()))?;
    parse_config(&raw, path)
}

/// Discover and load config from standard locations, then apply environment
/// overrides.
///
/// Search order:
/// 1. `config_dir` when given (e.g. `--config-dir`)
/// 2. `./vermieter.{toml,yaml,yml,json}` (project-local)
/// 3. `~/.config/vermieter/vermieter.{toml,yaml,yml,json}` (user-global)
///
/// Falls back to `VermieterConfig::default()` if no file is found or the file
/// does not parse.
pub fn discover_and_load(config_dir: Option<&Path>) -> VermieterConfig {
    let mut config = VermieterConfig::default();
    if let Some(path) = find_config_file(config_dir) {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => config = cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    config
}

/// Apply `VERMIETER_*` environment overrides on top of file values.
pub fn apply_env_overrides(config: &mut VermieterConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(bind) = lookup("VERMIETER_BIND") {
        config.server.bind = bind;
    }
    if let Some(port) = lookup("VERMIETER_PORT") {
        match port.parse() {
            Ok(port) => config.server.port = port,
            Err(e) => warn!(value = %port, error = %e, "ignoring invalid VERMIETER_PORT"),
        }
    }
    if let Some(env) = lookup("VERMIETER_ENV") {
        config.server.production = env.eq_ignore_ascii_case("production");
    }
    if let Some(path) = lookup("VERMIETER_DATABASE") {
        config.database.path = Some(PathBuf::from(path));
    }
}

fn find_config_file(config_dir: Option<&Path>) -> Option<PathBuf> {
    let mut dirs = Vec::with_capacity(3);
    if let Some(dir) = config_dir {
        dirs.push(dir.to_path_buf());
    }
    dirs.push(PathBuf::from("."));
    if let Some(dir) = user_config_dir() {
        dirs.push(dir);
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILENAMES.iter().map(move |name| dir.join(name)))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/vermieter/`).
pub fn user_config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "vermieter").map(|d| d.config_dir().to_path_buf())
}

/// Returns the data directory, preferring an explicit override.
pub fn data_dir(data_dir: Option<&Path>) -> PathBuf {
    if let Some(dir) = data_dir {
        return dir.to_path_buf();
    }
    directories::ProjectDirs::from("", "", "vermieter")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".vermieter"))
}

/// Resolve the SQLite database file for `config`.
pub fn database_path(config: &VermieterConfig, data_dir_override: Option<&Path>) -> PathBuf {
    config
        .database
        .path
        .clone()
        .unwrap_or_else(|| data_dir(data_dir_override).join("vermieter.db"))
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<VermieterConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}
