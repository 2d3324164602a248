// ── Settings composition ──
//
// Derives per-site overrides from a site directory path. `compose` is pure
// and returns a typed `SiteOverrides`; callers merge it into their own
// `SettingsContainers` with `apply`, touching only the containers they
// actually carry.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Separator used when the base database name is a single word.
pub const DEFAULT_DATABASE_SEPARATOR: char = '_';

/// Key of the sync directory in the legacy `config_directories` container.
pub const SYNC_DIRECTORY_KEY: &str = "sync";

/// Which settings key receives the config sync directory.
///
/// The host framework moved this setting between releases, so the caller
/// states which one its settings file targets.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SettingsSchema {
    /// `settings.config_sync_directory`.
    #[default]
    ConfigSyncDirectory,
    /// `config_directories["sync"]`.
    ConfigDirectories,
}

/// Everything the composer decides for one site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteOverrides {
    pub site_key: String,
    /// Suffixed database name, when a base name was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_name: Option<String>,
    pub schema: SettingsSchema,
    pub config_sync_directory: PathBuf,
    pub file_public_path: PathBuf,
    pub file_temporary_path: PathBuf,
    pub site_name: String,
}

/// Site key of a site directory: its basename without `prefix`.
pub fn site_key<'a>(site_path: &'a Path, prefix: &str) -> Result<&'a str, CoreError> {
    let invalid = || CoreError::InvalidSiteDirectory {
        path: site_path.to_path_buf(),
        prefix: prefix.to_owned(),
    };

    let dir_name = site_path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(invalid)?;

    match dir_name.strip_prefix(prefix) {
        Some(key) if !key.is_empty() => Ok(key),
        _ => Err(invalid()),
    }
}

/// First character of `name` that is not an ASCII alphanumeric, or `_`.
pub fn database_separator(name: &str) -> char {
    name.chars()
        .find(|c| !c.is_ascii_alphanumeric())
        .unwrap_or(DEFAULT_DATABASE_SEPARATOR)
}

/// `proj_db` + `alpha` -> `proj_db_alpha`; `proj-db` -> `proj-db-alpha`;
/// `projdb` -> `projdb_alpha`.
pub fn suffixed_database_name(base: &str, site_key: &str) -> String {
    format!("{base}{}{site_key}", database_separator(base))
}

/// Compose the overrides for the site at `site_path`.
pub fn compose(
    site_path: &Path,
    base_database: Option<&str>,
    schema: SettingsSchema,
    prefix: &str,
) -> Result<SiteOverrides, CoreError> {
    let key = site_key(site_path, prefix)?;
    let files = site_path.join("files");

    Ok(SiteOverrides {
        site_key: key.to_owned(),
        database_name: base_database.map(|base| suffixed_database_name(base, key)),
        schema,
        config_sync_directory: site_path.join("config").join("sync"),
        file_temporary_path: files.join("tmp"),
        file_public_path: files,
        site_name: format!("Subsite {key}"),
    })
}

// ── Settings containers ─────────────────────────────────────────────

/// Default database connection parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseParams {
    pub database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,
}

/// Site settings touched by the composer, plus anything else the caller
/// keeps alongside them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsStore {
    pub file_public_path: Option<PathBuf>,
    pub config_sync_directory: Option<PathBuf>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

/// Configuration overrides touched by the composer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigOverrides {
    pub file_temporary_path: Option<PathBuf>,
    pub site_name: Option<String>,
}

/// The caller's settings containers. A `None` container is left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsContainers {
    pub database: Option<DatabaseParams>,
    pub config_directories: Option<BTreeMap<String, PathBuf>>,
    pub settings: Option<SettingsStore>,
    pub config: Option<ConfigOverrides>,
}

impl SettingsContainers {
    /// Merge `overrides` into the containers that are present.
    ///
    /// Every field is an overwrite, so applying the same overrides twice
    /// leaves the same state.
    pub fn apply(&mut self, overrides: &SiteOverrides) {
        if let Some(database) = self.database.as_mut() {
            if database.database.is_some() {
                if let Some(ref name) = overrides.database_name {
                    database.database = Some(name.clone());
                }
            }
        }

        if overrides.schema == SettingsSchema::ConfigDirectories {
            if let Some(dirs) = self.config_directories.as_mut() {
                dirs.insert(
                    SYNC_DIRECTORY_KEY.to_owned(),
                    overrides.config_sync_directory.clone(),
                );
            }
        }

        if let Some(settings) = self.settings.as_mut() {
            settings.file_public_path = Some(overrides.file_public_path.clone());
            if overrides.schema == SettingsSchema::ConfigSyncDirectory {
                settings.config_sync_directory = Some(overrides.config_sync_directory.clone());
            }
        }

        if let Some(config) = self.config.as_mut() {
            config.file_temporary_path = Some(overrides.file_temporary_path.clone());
            config.site_name = Some(overrides.site_name.clone());
        }
    }

    /// Compose from the current database name and apply in one step.
    ///
    /// Not idempotent for the database name: a second call suffixes the
    /// already-suffixed name again. Call once per bootstrap.
    pub fn configure(
        &mut self,
        site_path: &Path,
        schema: SettingsSchema,
        prefix: &str,
    ) -> Result<SiteOverrides, CoreError> {
        let base = self
            .database
            .as_ref()
            .and_then(|db| db.database.as_deref());
        let overrides = compose(site_path, base, schema, prefix)?;
        self.apply(&overrides);
        Ok(overrides)
    }
}
