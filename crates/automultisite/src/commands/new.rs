//! `multisite:new` handler.

use std::path::PathBuf;

use serde::Serialize;

use automultisite_core::{ProvisionReport, Provisioner};

use crate::cli::{GlobalOpts, NewArgs};
use crate::error::CliError;
use crate::{config, output};

/// Serializable view of a provisioning run.
#[derive(Debug, Serialize)]
struct NewSite {
    site_key: String,
    folder: String,
    site_dir: PathBuf,
    root_link: PathBuf,
    sites_file_seeded: bool,
    registry: PathBuf,
    root: PathBuf,
    uri: String,
    /// URI of the registry record this run replaced, if any.
    replaced_uri: Option<String>,
}

impl From<&ProvisionReport> for NewSite {
    fn from(r: &ProvisionReport) -> Self {
        Self {
            site_key: r.site_key.clone(),
            folder: r.folder.clone(),
            site_dir: r.site_dir.clone(),
            root_link: r.root_link.clone(),
            sites_file_seeded: r.sites_file_seeded,
            registry: r.registry_path.clone(),
            root: r.record.root.clone(),
            uri: r.record.uri.clone(),
            replaced_uri: r.replaced_record.as_ref().map(|p| p.uri.clone()),
        }
    }
}

pub fn handle(args: NewArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (cfg, cwd) = config::load()?;
    let web_root = config::web_root(global, &cfg, &cwd)?;

    let provisioner = Provisioner::new(cfg.project_layout(web_root))
        .with_prefix(args.prefix.unwrap_or_else(|| cfg.prefix.clone()))
        .with_fallback_host(cfg.fallback_host.clone());

    let report = provisioner.provision(&args.site_key)?;

    let color = output::should_color(&global.color);
    let view = NewSite::from(&report);
    let out = output::render_single(
        &global.output,
        &view,
        |v| {
            let headline = output::success(
                &format!("New subsite created with site folder '{}'.", v.folder),
                color,
            );
            let mut pairs = vec![
                ("Site directory", v.site_dir.display().to_string()),
                ("Web root link", v.root_link.display().to_string()),
                ("Alias registry", v.registry.display().to_string()),
                ("URI", v.uri.clone()),
            ];
            if let Some(ref previous) = v.replaced_uri {
                pairs.push(("Replaced record", format!("'{}' (was {previous})", v.site_key)));
            }
            let details = output::detail_lines(&pairs);
            format!("{headline}\n{details}")
        },
        |v| v.folder.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
