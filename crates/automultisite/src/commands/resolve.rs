//! `multisite:resolve` handler.

use serde::Serialize;
use tabled::Tabled;

use automultisite_core::{RequestContext, resolve};

use crate::cli::{GlobalOpts, ResolveArgs};
use crate::error::{self, CliError};
use crate::{config, output};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Debug, Serialize, Tabled)]
struct SiteEntry {
    #[tabled(rename = "Alias")]
    alias: String,
    #[tabled(rename = "Directory")]
    directory: String,
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ResolveArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (cfg, cwd) = config::load()?;

    let sites_dir = match args.sites_dir {
        Some(dir) => cwd.join(dir),
        None => config::web_root(global, &cfg, &cwd)?.join("sites"),
    };

    // An explicit --uri wins over SIMPLETEST_BASE_URL.
    let context = match args.uri {
        Some(uri) => RequestContext::headless([format!("--uri={uri}")]),
        None => RequestContext::from_process(),
    };

    let mut options = cfg.resolve_options();
    if let Some(prefix) = args.prefix {
        options.prefix = prefix;
    }
    if let Some(alias_prefix) = args.alias_prefix {
        options.alias_prefix = alias_prefix;
    }
    if args.server_prefix.is_some() {
        options.server_prefix = args.server_prefix;
    }

    let sites = resolve(&sites_dir, &context, &options).map_err(error::from_resolve)?;
    tracing::info!(count = sites.len(), sites_dir = %sites_dir.display(), "resolved sites map");

    let entries: Vec<SiteEntry> = sites
        .into_iter()
        .map(|(alias, directory)| SiteEntry { alias, directory })
        .collect();

    let out = output::render_list(
        &global.output,
        &entries,
        |e| SiteEntry {
            alias: e.alias.clone(),
            directory: e.directory.clone(),
        },
        |e| format!("{}\t{}", e.alias, e.directory),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
