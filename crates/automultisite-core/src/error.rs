// ── Core error types ──
//
// Failures raised while resolving, composing, or reading the alias registry.
// Provisioning has its own error type (`ProvisionError`) because it also
// carries rollback state; it wraps these where a registry read fails.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for resolution, composition, and registry I/O.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Resolution errors ────────────────────────────────────────────
    #[error("Cannot list sites directory {}", path.display())]
    SitesDirUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No site URI available: headless invocation has no --uri= argument")]
    MissingUri,

    #[error("Invalid site URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },

    // ── Composition errors ───────────────────────────────────────────
    #[error("Site directory {} does not carry the '{prefix}' prefix", path.display())]
    InvalidSiteDirectory { path: PathBuf, prefix: String },

    // ── Registry errors ──────────────────────────────────────────────
    #[error("Cannot read alias registry {}", path.display())]
    RegistryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Alias registry {} is not a valid alias mapping", path.display())]
    RegistryParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Cannot write alias registry {}", path.display())]
    RegistryWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot serialize alias registry")]
    RegistrySerialize(#[source] serde_yaml::Error),
}
