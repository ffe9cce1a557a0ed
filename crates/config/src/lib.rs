//! Configuration loading and env substitution.
//!
//! Config files: `vermieter.toml`, `vermieter.yaml`, or `vermieter.json`
//! Searched in `--config-dir`, then `./`, then `~/.config/vermieter/`.
//!
//! Supports `${VAR}` and `${VAR:-fallback}` substitution; an unset variable
//! without a fallback fails the load.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{
        apply_env_overrides, data_dir, database_path, discover_and_load, load_config,
        user_config_dir,
    },
    schema::{AuthConfig, DatabaseConfig, ServerConfig, VermieterConfig},
};
