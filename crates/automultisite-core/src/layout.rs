// ── Project layout ──
//
// Where the provisioner finds and creates things. Relative paths are
// resolved against the web root, except the registry which lives under the
// project root (the web root's parent).

use std::path::{Path, PathBuf};

/// Conventional locations inside a multi-site project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub web_root: PathBuf,
    pub project_root: PathBuf,
    /// Sites bootstrap file, relative to the web root.
    pub sites_file: PathBuf,
    /// Template the sites bootstrap file is seeded from.
    pub sites_template: PathBuf,
    /// Template each subsite settings file is seeded from.
    pub settings_template: PathBuf,
    /// Settings file name inside a site directory.
    pub settings_file: String,
    /// Alias registry, relative to the project root.
    pub registry_file: PathBuf,
}

impl ProjectLayout {
    /// Default layout for `web_root`.
    pub fn new(web_root: impl Into<PathBuf>) -> Self {
        let web_root = web_root.into();
        let project_root = web_root
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| web_root.clone(), Path::to_path_buf);

        Self {
            web_root,
            project_root,
            sites_file: PathBuf::from("sites/sites.php"),
            sites_template: PathBuf::from("sites/example.sites.php"),
            settings_template: PathBuf::from("sites/default/default.settings.php"),
            settings_file: "settings.php".into(),
            registry_file: PathBuf::from("drush/sites/local.site.yml"),
        }
    }

    pub fn sites_dir(&self) -> PathBuf {
        self.web_root.join("sites")
    }

    /// `sites/<folder>` under the web root.
    pub fn site_dir(&self, folder: &str) -> PathBuf {
        self.sites_dir().join(folder)
    }

    /// `<folder>` directly under the web root, the self-referential link.
    pub fn root_link(&self, folder: &str) -> PathBuf {
        self.web_root.join(folder)
    }

    pub fn sites_file_path(&self) -> PathBuf {
        self.web_root.join(&self.sites_file)
    }

    pub fn sites_template_path(&self) -> PathBuf {
        self.web_root.join(&self.sites_template)
    }

    pub fn settings_template_path(&self) -> PathBuf {
        self.web_root.join(&self.settings_template)
    }

    pub fn registry_path(&self) -> PathBuf {
        self.project_root.join(&self.registry_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_root_is_web_root_parent() {
        let layout = ProjectLayout::new("/srv/project/web");
        assert_eq!(layout.project_root, PathBuf::from("/srv/project"));
        assert_eq!(
            layout.registry_path(),
            PathBuf::from("/srv/project/drush/sites/local.site.yml")
        );
        assert_eq!(
            layout.site_dir("local-a"),
            PathBuf::from("/srv/project/web/sites/local-a")
        );
        assert_eq!(layout.root_link("local-a"), PathBuf::from("/srv/project/web/local-a"));
    }

    #[test]
    fn bare_relative_web_root_is_its_own_project_root() {
        let layout = ProjectLayout::new("web");
        assert_eq!(layout.project_root, PathBuf::from("web"));
    }
}
