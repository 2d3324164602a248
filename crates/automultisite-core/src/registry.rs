// ── Alias registry ──
//
// The site alias file tooling reads to find each subsite: a YAML mapping of
// alias name -> { root, uri, ... }. It is read whole and rewritten whole;
// record order and any keys this crate does not model are preserved.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// One alias entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AliasRecord {
    /// Absolute path of the web root serving the site.
    #[serde(default)]
    pub root: PathBuf,
    /// URI tooling passes as `--uri=` when targeting the site.
    #[serde(default)]
    pub uri: String,
    /// Keys carried through untouched (`paths`, `options`, ...).
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_yaml::Value>,
}

impl AliasRecord {
    pub fn new(root: impl Into<PathBuf>, uri: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            uri: uri.into(),
            extra: IndexMap::new(),
        }
    }
}

/// In-memory copy of an alias registry file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AliasRegistry {
    records: IndexMap<String, AliasRecord>,
}

impl AliasRegistry {
    /// Read and parse `path`. An empty (or whitespace-only) file is an
    /// empty registry.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let text = std::fs::read_to_string(path).map_err(|source| CoreError::RegistryRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| CoreError::RegistryParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse registry YAML.
    pub fn parse(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let records: Option<IndexMap<String, AliasRecord>> = serde_yaml::from_str(text)?;
        Ok(Self {
            records: records.unwrap_or_default(),
        })
    }

    /// Serialize the whole registry.
    pub fn to_yaml(&self) -> Result<String, CoreError> {
        if self.records.is_empty() {
            return Ok(String::new());
        }
        serde_yaml::to_string(&self.records).map_err(CoreError::RegistrySerialize)
    }

    /// Rewrite `path` with the whole registry.
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        let yaml = self.to_yaml()?;
        std::fs::write(path, yaml).map_err(|source| CoreError::RegistryWrite {
            path: path.to_path_buf(),
            source,
        })
    }

    /// URI template shared by existing subsites: the `uri` of the first
    /// record (in file order) that contains `prefix`, cut just after it.
    ///
    /// `example.com.local-beta` with prefix `local-` -> `example.com.local-`.
    pub fn base_uri(&self, prefix: &str) -> Option<&str> {
        self.records.values().find_map(|record| {
            record
                .uri
                .find(prefix)
                .map(|idx| &record.uri[..idx + prefix.len()])
        })
    }

    /// Insert or replace the record under `key`, returning any previous one.
    pub fn upsert(&mut self, key: impl Into<String>, record: AliasRecord) -> Option<AliasRecord> {
        self.records.insert(key.into(), record)
    }

    pub fn get(&self, key: &str) -> Option<&AliasRecord> {
        self.records.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AliasRecord)> {
        self.records.iter()
    }
}
