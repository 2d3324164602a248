//! Shared configuration for automultisite.
//!
//! Layered TOML settings (built-in defaults, user file, project file,
//! `AUTOMULTISITE_*` environment) and web-root discovery. Core never reads
//! these files: callers turn a [`Config`] into a `ProjectLayout` and
//! `ResolveOptions` and hand those in.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use automultisite_core::{
    DEFAULT_PREFIX, DEFAULT_SERVER_PREFIX, ProjectLayout, ResolveOptions, SettingsSchema,
};

/// Project-local config file name, looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "automultisite.toml";

/// Prefix of configuration environment variables. Nested keys use `__`,
/// e.g. `AUTOMULTISITE_LAYOUT__REGISTRY_FILE`.
pub const ENV_PREFIX: &str = "AUTOMULTISITE_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("no web root found (looked for a 'sites' directory in {} and {})",
        start.display(), start.join("web").display())]
    WebRootNotFound { start: PathBuf },

    #[error("web root {} is not usable", path.display())]
    InvalidWebRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Prefix of subsite directory names.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Prepended to the directory name in resolved aliases.
    #[serde(default)]
    pub alias_prefix: String,

    /// Server part of resolved aliases (default: request host, then
    /// `localhost`).
    pub server_prefix: Option<String>,

    /// Host used for new registry URIs when no existing record shows the
    /// convention.
    #[serde(default = "default_fallback_host")]
    pub fallback_host: String,

    /// Web root; discovered from the working directory when unset.
    pub web_root: Option<PathBuf>,

    /// Settings key that receives the config sync directory.
    #[serde(default)]
    pub schema: SettingsSchema,

    /// File locations inside the project.
    #[serde(default)]
    pub layout: Layout,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            alias_prefix: String::new(),
            server_prefix: None,
            fallback_host: default_fallback_host(),
            web_root: None,
            schema: SettingsSchema::default(),
            layout: Layout::default(),
        }
    }
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.into()
}
fn default_fallback_host() -> String {
    DEFAULT_SERVER_PREFIX.into()
}

/// Relative file locations. Everything is relative to the web root except
/// `registry_file`, which is relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Layout {
    pub sites_file: PathBuf,
    pub sites_template: PathBuf,
    pub settings_template: PathBuf,
    pub settings_file: String,
    pub registry_file: PathBuf,
}

impl Default for Layout {
    fn default() -> Self {
        let defaults = ProjectLayout::new("web");
        Self {
            sites_file: defaults.sites_file,
            sites_template: defaults.sites_template,
            settings_template: defaults.settings_template,
            settings_file: defaults.settings_file,
            registry_file: defaults.registry_file,
        }
    }
}

impl Config {
    /// Project layout rooted at `web_root`, with configured file locations.
    pub fn project_layout(&self, web_root: PathBuf) -> ProjectLayout {
        ProjectLayout {
            sites_file: self.layout.sites_file.clone(),
            sites_template: self.layout.sites_template.clone(),
            settings_template: self.layout.settings_template.clone(),
            settings_file: self.layout.settings_file.clone(),
            registry_file: self.layout.registry_file.clone(),
            ..ProjectLayout::new(web_root)
        }
    }

    /// Resolver naming options from config.
    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            prefix: self.prefix.clone(),
            alias_prefix: self.alias_prefix.clone(),
            server_prefix: self.server_prefix.clone(),
        }
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

// ── Config file paths ───────────────────────────────────────────────

/// Resolve the user config file path via XDG / platform conventions.
pub fn user_config_path() -> PathBuf {
    ProjectDirs::from("com", "automultisite", "automultisite").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("automultisite");
    p
}

/// Project config file for a working directory.
pub fn project_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(PROJECT_CONFIG_FILE)
}

// ── Config loading ──────────────────────────────────────────────────

/// Defaults overlaid with each TOML file in order. Missing files are
/// skipped.
fn file_figment(files: &[PathBuf]) -> Figment {
    files.iter().fold(
        Figment::new().merge(Serialized::defaults(Config::default())),
        |figment, path| figment.merge(Toml::file(path)),
    )
}

/// Load the full Config: defaults, user file, project file, environment.
pub fn load_config(project_dir: &Path) -> Result<Config, ConfigError> {
    let figment = file_figment(&[user_config_path(), project_config_path(project_dir)])
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Web root discovery ──────────────────────────────────────────────

/// Pick the web root: explicit path, then configured path, then discovery
/// from `cwd`. Relative paths are taken relative to `cwd`. The result is
/// canonical, since it ends up in alias records.
pub fn resolve_web_root(
    explicit: Option<&Path>,
    config: &Config,
    cwd: &Path,
) -> Result<PathBuf, ConfigError> {
    let candidate = match explicit.or(config.web_root.as_deref()) {
        Some(path) => cwd.join(path),
        None => discover_web_root(cwd)?,
    };

    std::fs::canonicalize(&candidate).map_err(|source| ConfigError::InvalidWebRoot {
        path: candidate,
        source,
    })
}

/// `start` if it holds a `sites` directory, else `start/web` if that does.
pub fn discover_web_root(start: &Path) -> Result<PathBuf, ConfigError> {
    [start.to_path_buf(), start.join("web")]
        .into_iter()
        .find(|dir| dir.join("sites").is_dir())
        .ok_or_else(|| ConfigError::WebRootNotFound {
            start: start.to_path_buf(),
        })
}
