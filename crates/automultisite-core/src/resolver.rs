// ── Alias resolution ──
//
// Builds the host framework's sites map (alias -> site directory) from a
// scan of the sites directory. The map is rebuilt on every call and never
// cached: it reflects the directory listing at scan time.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use crate::context::{RequestContext, strip_site_segment};
use crate::error::CoreError;

/// Default prefix of subsite directory names.
pub const DEFAULT_PREFIX: &str = "local-";

/// Server part of an alias when neither an explicit prefix nor a `Host`
/// header is available.
pub const DEFAULT_SERVER_PREFIX: &str = "localhost";

/// Alias -> site directory name, ordered by alias.
pub type SitesMap = BTreeMap<String, String>;

/// Naming knobs for a resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Prefix every site directory name starts with.
    pub prefix: String,
    /// Prepended to the directory name in the final alias segment.
    pub alias_prefix: String,
    /// Server part of the alias. `None` derives it from the context.
    pub server_prefix: Option<String>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.into(),
            alias_prefix: String::new(),
            server_prefix: None,
        }
    }
}

impl ResolveOptions {
    /// Server prefix in effect for `context`: explicit option, then the
    /// `Host` header of a served request, then `localhost`.
    pub fn effective_server_prefix<'a>(&'a self, context: &'a RequestContext) -> &'a str {
        self.server_prefix
            .as_deref()
            .or_else(|| {
                if context.headless {
                    None
                } else {
                    context.host_name()
                }
            })
            .unwrap_or(DEFAULT_SERVER_PREFIX)
    }
}

/// Resolve the sites map for `context` from the subsite directories under
/// `sites_dir`.
///
/// An unreadable sites directory or a headless context without a URI is an
/// error, never an empty map: an empty map would silently route every
/// request to the default site.
pub fn resolve(
    sites_dir: &Path,
    context: &RequestContext,
    options: &ResolveOptions,
) -> Result<SitesMap, CoreError> {
    let base_path = context.base_path()?;
    let root_path = strip_site_segment(&base_path, &options.prefix);
    let segments: Vec<&str> = root_path.split('/').filter(|s| !s.is_empty()).collect();
    let server_prefix = options.effective_server_prefix(context);

    debug!(
        base_path = %base_path,
        root_path = %root_path,
        server_prefix = %server_prefix,
        "resolving site aliases"
    );

    let mut sites = SitesMap::new();
    for name in site_directories(sites_dir, &options.prefix)? {
        let alias = site_alias(server_prefix, &segments, &options.alias_prefix, &name);
        if let Some(previous) = sites.insert(alias.clone(), name) {
            debug!(alias = %alias, replaced = %previous, "alias collision, last directory wins");
        }
    }

    Ok(sites)
}

/// Names of the subsite directories directly under `sites_dir`, sorted.
///
/// Skips anything that is not a directory (symlinks to directories count),
/// does not start with `prefix`, starts with a dot, or is not valid UTF-8.
pub fn site_directories(sites_dir: &Path, prefix: &str) -> Result<Vec<String>, CoreError> {
    let unreadable = |source| CoreError::SitesDirUnreadable {
        path: sites_dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in std::fs::read_dir(sites_dir).map_err(unreadable)? {
        let entry = entry.map_err(unreadable)?;

        let Ok(name) = entry.file_name().into_string() else {
            debug!(entry = ?entry.file_name(), "skipping non-UTF-8 entry");
            continue;
        };
        if !name.starts_with(prefix) || name.starts_with('.') {
            continue;
        }
        if !entry.path().is_dir() {
            continue;
        }
        names.push(name);
    }

    names.sort();
    Ok(names)
}

/// `server.seg1.seg2.<alias_prefix><dir_name>`
pub fn site_alias(server_prefix: &str, segments: &[&str], alias_prefix: &str, dir_name: &str) -> String {
    let last = format!("{alias_prefix}{dir_name}");
    let mut pieces: Vec<&str> = Vec::with_capacity(segments.len() + 2);
    pieces.push(server_prefix);
    pieces.extend_from_slice(segments);
    pieces.push(&last);
    pieces.join(".")
}
