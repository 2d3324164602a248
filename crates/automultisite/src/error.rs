//! CLI error types with miette diagnostics.
//!
//! Maps core, provisioning and config errors into user-facing errors with
//! actionable help text and stable exit codes.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use automultisite_config::ConfigError;
use automultisite_core::{Collision, CoreError, ProvisionError, ProvisionStep, Rollback};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Provisioning ─────────────────────────────────────────────────

    #[error("{}", join_lines(.collisions))]
    #[diagnostic(
        code(automultisite::collision),
        help("Nothing was changed. Pick another site key, or remove the existing entries first.")
    )]
    Collision { collisions: Vec<Collision> },

    #[error("Subsite setup stopped while {step}")]
    #[diagnostic(
        code(automultisite::setup_incomplete),
        severity(Warning)
    )]
    SetupIncomplete {
        step: ProvisionStep,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
        #[help]
        advice: String,
    },

    // ── Resolution ───────────────────────────────────────────────────

    #[error("No site URI to resolve")]
    #[diagnostic(
        code(automultisite::missing_uri),
        help("Pass --uri <url>, or set SIMPLETEST_BASE_URL.")
    )]
    MissingUri,

    #[error("Sites directory {} cannot be listed", path.display())]
    #[diagnostic(
        code(automultisite::sites_dir),
        help("Check the path, or point --web-root / --sites-dir at the right place.")
    )]
    SitesDirUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Web root not found")]
    #[diagnostic(
        code(automultisite::no_web_root),
        help(
            "Run from the project or web root, pass --web-root, or set web_root in {config}.\n\
             {reason}"
        )
    )]
    NoWebRoot { reason: String, config: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(automultisite::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(code(automultisite::config))]
    Config(Box<ConfigError>),

    #[error(transparent)]
    #[diagnostic(code(automultisite::core))]
    Core(#[from] CoreError),

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn join_lines(collisions: &[Collision]) -> String {
    collisions
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

fn rollback_help(rollback: &Rollback) -> String {
    if rollback.is_clean() {
        return format!(
            "Completed steps were undone ({} paths). Fix the cause and run the command again.",
            rollback.undone.len()
        );
    }
    let leftover = rollback
        .leftover
        .iter()
        .map(|p| format!("  {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");
    format!("These paths could not be cleaned up and must be removed by hand:\n{leftover}")
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Collision { .. } => exit_code::CONFLICT,
            Self::NoWebRoot { .. } | Self::SitesDirUnreadable { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::MissingUri => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── Library error → CliError mapping ─────────────────────────────────

impl From<ProvisionError> for CliError {
    fn from(err: ProvisionError) -> Self {
        match err {
            ProvisionError::InvalidSiteKey { key, reason } => CliError::Validation {
                field: "site_key".into(),
                reason: format!("'{key}' {reason}"),
            },
            ProvisionError::InvalidPrefix { prefix, reason } => CliError::Validation {
                field: "prefix".into(),
                reason: format!("'{prefix}' {reason}"),
            },
            ProvisionError::Collision { collisions } => CliError::Collision { collisions },
            ProvisionError::Setup {
                step,
                path,
                source,
                rollback,
            } => CliError::SetupIncomplete {
                step,
                source: format!("{}: {source}", path.display()).into(),
                advice: rollback_help(&rollback),
            },
            ProvisionError::Registry {
                step,
                source,
                rollback,
            } => CliError::SetupIncomplete {
                step,
                source: Box::new(source),
                advice: rollback_help(&rollback),
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::WebRootNotFound { .. } | ConfigError::InvalidWebRoot { .. } => {
                CliError::NoWebRoot {
                    reason: err.to_string(),
                    config: automultisite_config::PROJECT_CONFIG_FILE.into(),
                }
            }
            other => CliError::Config(Box::new(other)),
        }
    }
}

/// Resolution errors get dedicated diagnostics; the rest pass through.
pub fn from_resolve(err: CoreError) -> CliError {
    match err {
        CoreError::MissingUri => CliError::MissingUri,
        CoreError::SitesDirUnreadable { path, source } => {
            CliError::SitesDirUnreadable { path, source }
        }
        other => CliError::Core(other),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn setup_failure(rollback: Rollback) -> CliError {
        CliError::from(ProvisionError::Setup {
            step: ProvisionStep::SeedSettingsFile,
            path: PathBuf::from("/srv/web/sites/default/default.settings.php"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
            rollback,
        })
    }

    #[test]
    fn leftover_paths_are_listed_for_manual_cleanup() {
        let err = setup_failure(Rollback {
            undone: vec![PathBuf::from("/srv/web/local-alpha")],
            leftover: vec![PathBuf::from("/srv/web/sites/local-alpha")],
        });
        let CliError::SetupIncomplete { ref advice, .. } = err else {
            panic!("expected setup failure, got {err:?}");
        };
        assert!(advice.contains("must be removed by hand"), "{advice}");
        assert!(advice.contains("  /srv/web/sites/local-alpha"), "{advice}");
        assert!(!advice.contains("  /srv/web/local-alpha"), "{advice}");
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn clean_rollback_counts_undone_paths() {
        let err = setup_failure(Rollback {
            undone: vec![PathBuf::from("a"), PathBuf::from("b")],
            leftover: Vec::new(),
        });
        let CliError::SetupIncomplete { ref advice, .. } = err else {
            panic!("expected setup failure, got {err:?}");
        };
        assert!(advice.contains("(2 paths)"), "{advice}");
    }

    #[test]
    fn invalid_prefix_is_a_usage_error() {
        let err = CliError::from(ProvisionError::InvalidPrefix {
            prefix: "../".into(),
            reason: "must not contain path separators",
        });
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }
}
