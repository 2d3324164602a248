//! Glue between global flags and the shared config crate.

use std::path::{Path, PathBuf};

use automultisite_config::{Config, load_config, resolve_web_root};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Working directory the project config and web root discovery start from.
pub fn working_dir() -> Result<PathBuf, CliError> {
    Ok(std::env::current_dir()?)
}

/// Layered config for the current working directory.
pub fn load() -> Result<(Config, PathBuf), CliError> {
    let cwd = working_dir()?;
    let cfg = load_config(&cwd)?;
    Ok((cfg, cwd))
}

/// Web root from `--web-root`, the config, or discovery, in that order.
pub fn web_root(global: &GlobalOpts, cfg: &Config, cwd: &Path) -> Result<PathBuf, CliError> {
    let root = resolve_web_root(global.web_root.as_deref(), cfg, cwd)?;
    tracing::debug!(web_root = %root.display(), "using web root");
    Ok(root)
}
