//! Config subcommand handlers.

use std::path::PathBuf;

use serde::Serialize;
use tabled::Tabled;

use automultisite_config::{project_config_path, user_config_path};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::{config, output};

#[derive(Debug, Serialize, Tabled)]
struct ConfigFile {
    #[tabled(rename = "Scope")]
    scope: &'static str,
    #[tabled(rename = "Path", display_with = "display_path")]
    path: PathBuf,
    #[tabled(rename = "Exists")]
    exists: bool,
}

#[allow(clippy::ptr_arg)]
fn display_path(path: &PathBuf) -> String {
    path.display().to_string()
}

impl ConfigFile {
    fn new(scope: &'static str, path: PathBuf) -> Self {
        let exists = path.is_file();
        Self {
            scope,
            path,
            exists,
        }
    }
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let (cfg, _cwd) = config::load()?;
            let out = match global.output {
                OutputFormat::Table | OutputFormat::Plain => {
                    cfg.to_toml().map_err(|e| CliError::Config(Box::new(e)))?
                }
                _ => output::render_single(&global.output, &cfg, |_| String::new(), |_| {
                    String::new()
                })?,
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            let cwd = config::working_dir()?;
            let files = [
                ConfigFile::new("user", user_config_path()),
                ConfigFile::new("project", project_config_path(&cwd)),
            ];
            let out = output::render_list(
                &global.output,
                &files,
                |f| ConfigFile::new(f.scope, f.path.clone()),
                |f| f.path.display().to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
