// ── Bootstrap glue ──
//
// Fixed snippets appended to the host framework's generated files so that
// every request runs alias resolution and settings composition.

use std::io::Write;
use std::path::Path;

/// Appended to the sites bootstrap file when it is first seeded.
pub const SITES_GLUE: &str = r"
// This needs to be defined as a workaround for Drush.
$sites = [];

\Automultisites\Sites::addLocalSites($sites, $app_root);
";

/// Appended to each new subsite's settings file.
pub const SETTINGS_GLUE: &str = r"
Automultisites\Settings::configureSiteSettings(
  $app_root,
  $site_path,
  $databases,
  $settings,
  $config
);
";

/// Append `glue` to the end of `path`.
pub fn append(path: &Path, glue: &str) -> std::io::Result<()> {
    let mut file = std::fs::OpenOptions::new().append(true).open(path)?;
    file.write_all(glue.as_bytes())
}
