//! `multisite:settings` handler.

use automultisite_core::{CoreError, SettingsSchema, SiteOverrides, compose};

use crate::cli::{GlobalOpts, SchemaArg, SettingsArgs};
use crate::error::CliError;
use crate::{config, output};

impl From<SchemaArg> for SettingsSchema {
    fn from(arg: SchemaArg) -> Self {
        match arg {
            SchemaArg::ConfigSyncDirectory => Self::ConfigSyncDirectory,
            SchemaArg::ConfigDirectories => Self::ConfigDirectories,
        }
    }
}

fn detail(o: &SiteOverrides) -> String {
    let sync_key = match o.schema {
        SettingsSchema::ConfigSyncDirectory => "settings.config_sync_directory",
        SettingsSchema::ConfigDirectories => "config_directories.sync",
    };

    let mut pairs = vec![("site key", o.site_key.clone())];
    if let Some(ref db) = o.database_name {
        pairs.push(("databases.default.database", db.clone()));
    }
    pairs.extend([
        (sync_key, o.config_sync_directory.display().to_string()),
        ("settings.file_public_path", o.file_public_path.display().to_string()),
        ("config.file_temporary_path", o.file_temporary_path.display().to_string()),
        ("config.site_name", o.site_name.clone()),
    ]);
    output::detail_lines(&pairs)
}

pub fn handle(args: SettingsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (cfg, _cwd) = config::load()?;

    let schema = args.schema.map_or(cfg.schema, SettingsSchema::from);
    let prefix = args.prefix.unwrap_or_else(|| cfg.prefix.clone());

    let overrides = compose(&args.site_path, args.database.as_deref(), schema, &prefix)
        .map_err(|err| match err {
            CoreError::InvalidSiteDirectory { .. } => CliError::Validation {
                field: "site_path".into(),
                reason: err.to_string(),
            },
            other => CliError::Core(other),
        })?;

    let out = output::render_single(&global.output, &overrides, detail, |o| {
        o.database_name.clone().unwrap_or_else(|| o.site_key.clone())
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
