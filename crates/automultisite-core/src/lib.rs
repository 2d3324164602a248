// automultisite-core: site-directory resolution, settings composition, and
// subsite provisioning for multi-site web roots.

pub mod composer;
pub mod context;
pub mod error;
pub mod glue;
pub mod layout;
pub mod provision;
pub mod registry;
pub mod resolver;

// ── Primary re-exports ──────────────────────────────────────────────
pub use composer::{
    ConfigOverrides, DatabaseParams, SettingsContainers, SettingsSchema, SettingsStore,
    SiteOverrides, compose,
};
pub use context::RequestContext;
pub use error::CoreError;
pub use layout::ProjectLayout;
pub use provision::{Collision, ProvisionError, ProvisionReport, ProvisionStep, Provisioner, Rollback};
pub use registry::{AliasRecord, AliasRegistry};
pub use resolver::{
    DEFAULT_PREFIX, DEFAULT_SERVER_PREFIX, ResolveOptions, SitesMap, resolve, site_directories,
};
