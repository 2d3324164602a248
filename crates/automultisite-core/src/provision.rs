// ── Subsite provisioning ──
//
// Creates the on-disk scaffold for a new subsite and registers its alias.
// Collisions are detected before anything is touched. Every mutation after
// that is journaled, and a failure in any later step undoes the completed
// ones in reverse order.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::glue;
use crate::layout::ProjectLayout;
use crate::registry::{AliasRecord, AliasRegistry};
use crate::resolver::{DEFAULT_PREFIX, DEFAULT_SERVER_PREFIX};

// ── Errors ──────────────────────────────────────────────────────────

/// A provisioning step, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ProvisionStep {
    #[strum(serialize = "seeding the sites bootstrap file")]
    SeedSitesFile,
    #[strum(serialize = "creating the web root symlink")]
    CreateSymlink,
    #[strum(serialize = "creating the site directory")]
    CreateSiteDirectory,
    #[strum(serialize = "seeding the site settings file")]
    SeedSettingsFile,
    #[strum(serialize = "creating the alias registry")]
    CreateRegistry,
    #[strum(serialize = "reading the alias registry")]
    LoadRegistry,
    #[strum(serialize = "writing the alias registry")]
    WriteRegistry,
}

/// What already occupies a target path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Collision {
    /// `sites/<folder>` exists.
    SiteDirectory { folder: String, path: PathBuf },
    /// `<folder>` exists directly under the web root.
    RootEntry { folder: String, path: PathBuf },
}

impl Collision {
    pub fn path(&self) -> &Path {
        match self {
            Self::SiteDirectory { path, .. } | Self::RootEntry { path, .. } => path,
        }
    }
}

impl fmt::Display for Collision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SiteDirectory { folder, .. } => write!(f, "Site folder {folder} already exists."),
            Self::RootEntry { folder, .. } => {
                write!(f, "File {folder} already exists in the web root.")
            }
        }
    }
}

fn describe_collisions(collisions: &[Collision]) -> String {
    collisions
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Outcome of undoing a failed provisioning run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rollback {
    /// Paths removed or restored.
    pub undone: Vec<PathBuf>,
    /// Paths that could not be undone and are still on disk.
    pub leftover: Vec<PathBuf>,
}

impl Rollback {
    pub fn is_clean(&self) -> bool {
        self.leftover.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Invalid site key '{key}': {reason}")]
    InvalidSiteKey { key: String, reason: &'static str },

    #[error("Invalid folder prefix '{prefix}': {reason}")]
    InvalidPrefix {
        prefix: String,
        reason: &'static str,
    },

    #[error("{}", describe_collisions(.collisions))]
    Collision { collisions: Vec<Collision> },

    #[error("Failed {step} at {}", path.display())]
    Setup {
        step: ProvisionStep,
        path: PathBuf,
        #[source]
        source: io::Error,
        rollback: Rollback,
    },

    #[error("Failed {step}")]
    Registry {
        step: ProvisionStep,
        #[source]
        source: CoreError,
        rollback: Rollback,
    },
}

impl ProvisionError {
    /// Rollback state, for failures that happened after mutation began.
    pub fn rollback(&self) -> Option<&Rollback> {
        match self {
            Self::Setup { rollback, .. } | Self::Registry { rollback, .. } => Some(rollback),
            Self::InvalidSiteKey { .. } | Self::InvalidPrefix { .. } | Self::Collision { .. } => {
                None
            }
        }
    }
}

/// A step failure before rollback has run.
enum StepFailure {
    Io {
        step: ProvisionStep,
        path: PathBuf,
        source: io::Error,
    },
    Registry {
        step: ProvisionStep,
        source: CoreError,
    },
}

impl StepFailure {
    fn io(step: ProvisionStep, path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::Io {
            step,
            path: path.to_path_buf(),
            source,
        }
    }

    fn into_error(self, rollback: Rollback) -> ProvisionError {
        match self {
            Self::Io { step, path, source } => ProvisionError::Setup {
                step,
                path,
                source,
                rollback,
            },
            Self::Registry { step, source } => ProvisionError::Registry {
                step,
                source,
                rollback,
            },
        }
    }
}

// ── Journal ─────────────────────────────────────────────────────────

#[derive(Debug)]
enum Undo {
    RemoveFile(PathBuf),
    RemoveLink(PathBuf),
    RemoveDir(PathBuf),
    RestoreFile { path: PathBuf, contents: Vec<u8> },
}

impl Undo {
    fn path(&self) -> &Path {
        match self {
            Self::RemoveFile(path)
            | Self::RemoveLink(path)
            | Self::RemoveDir(path)
            | Self::RestoreFile { path, .. } => path,
        }
    }

    fn run(&self) -> io::Result<()> {
        match self {
            Self::RemoveFile(path) => fs::remove_file(path),
            Self::RemoveLink(path) => remove_link(path),
            Self::RemoveDir(path) => fs::remove_dir_all(path),
            Self::RestoreFile { path, contents } => fs::write(path, contents),
        }
    }
}

/// Completed mutations, in order.
#[derive(Debug, Default)]
struct Journal {
    entries: Vec<Undo>,
}

impl Journal {
    fn record(&mut self, undo: Undo) {
        debug!(path = %undo.path().display(), "journaled");
        self.entries.push(undo);
    }

    fn rollback(self) -> Rollback {
        let mut rollback = Rollback::default();
        for undo in self.entries.into_iter().rev() {
            match undo.run() {
                Ok(()) => {
                    warn!(path = %undo.path().display(), "rolled back");
                    rollback.undone.push(undo.path().to_path_buf());
                }
                Err(err) => {
                    warn!(path = %undo.path().display(), error = %err, "rollback failed");
                    rollback.leftover.push(undo.path().to_path_buf());
                }
            }
        }
        rollback
    }
}

// ── Provisioner ─────────────────────────────────────────────────────

/// What a successful run created.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisionReport {
    pub site_key: String,
    /// `<prefix><site_key>`.
    pub folder: String,
    pub site_dir: PathBuf,
    pub root_link: PathBuf,
    /// `true` when the sites bootstrap file was created by this run.
    pub sites_file_seeded: bool,
    pub registry_path: PathBuf,
    pub record: AliasRecord,
    /// A registry record under the same key existed and was replaced.
    pub replaced_record: Option<AliasRecord>,
}

/// Scaffolds subsites inside one project.
#[derive(Debug, Clone)]
pub struct Provisioner {
    layout: ProjectLayout,
    prefix: String,
    fallback_host: String,
}

impl Provisioner {
    pub fn new(layout: ProjectLayout) -> Self {
        Self {
            layout,
            prefix: DEFAULT_PREFIX.into(),
            fallback_host: DEFAULT_SERVER_PREFIX.into(),
        }
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Host used for the URI when no existing record shows the convention.
    #[must_use]
    pub fn with_fallback_host(mut self, host: impl Into<String>) -> Self {
        self.fallback_host = host.into();
        self
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Create the subsite `site_key`.
    pub fn provision(&self, site_key: &str) -> Result<ProvisionReport, ProvisionError> {
        validate_prefix(&self.prefix)?;
        validate_site_key(site_key)?;
        let folder = format!("{}{site_key}", self.prefix);

        let collisions = self.collisions(&folder);
        if !collisions.is_empty() {
            return Err(ProvisionError::Collision { collisions });
        }

        let mut journal = Journal::default();
        match self.scaffold(site_key, &folder, &mut journal) {
            Ok(report) => {
                info!(folder = %report.folder, uri = %report.record.uri, "subsite provisioned");
                Ok(report)
            }
            Err(failure) => Err(failure.into_error(journal.rollback())),
        }
    }

    /// Existing entries that `folder` would clobber.
    pub fn collisions(&self, folder: &str) -> Vec<Collision> {
        let mut collisions = Vec::new();

        let site_dir = self.layout.site_dir(folder);
        if entry_exists(&site_dir) {
            collisions.push(Collision::SiteDirectory {
                folder: folder.to_owned(),
                path: site_dir,
            });
        }

        let link = self.layout.root_link(folder);
        if entry_exists(&link) {
            collisions.push(Collision::RootEntry {
                folder: folder.to_owned(),
                path: link,
            });
        }

        collisions
    }

    fn scaffold(
        &self,
        site_key: &str,
        folder: &str,
        journal: &mut Journal,
    ) -> Result<ProvisionReport, StepFailure> {
        let sites_file_seeded = self.ensure_sites_file(journal)?;
        let root_link = self.create_root_link(folder, journal)?;
        let site_dir = self.create_site_dir(folder, journal)?;
        let registry_path = self.ensure_registry(journal)?;

        let mut registry = AliasRegistry::load(&registry_path).map_err(|source| {
            StepFailure::Registry {
                step: ProvisionStep::LoadRegistry,
                source,
            }
        })?;

        let base_uri = registry.base_uri(&self.prefix).map_or_else(
            || format!("{}.{}", self.fallback_host, self.prefix),
            str::to_owned,
        );
        let record = AliasRecord::new(&self.layout.web_root, format!("{base_uri}{site_key}"));

        let replaced_record = registry.upsert(site_key, record.clone());
        if let Some(ref previous) = replaced_record {
            warn!(key = %site_key, previous_uri = %previous.uri, "replacing existing alias record");
        }

        // Snapshot the file so a failed rewrite can put it back.
        if let Ok(contents) = fs::read(&registry_path) {
            journal.record(Undo::RestoreFile {
                path: registry_path.clone(),
                contents,
            });
        }
        registry
            .save(&registry_path)
            .map_err(|source| StepFailure::Registry {
                step: ProvisionStep::WriteRegistry,
                source,
            })?;
        info!(path = %registry_path.display(), key = %site_key, "alias registry updated");

        Ok(ProvisionReport {
            site_key: site_key.to_owned(),
            folder: folder.to_owned(),
            site_dir,
            root_link,
            sites_file_seeded,
            registry_path,
            record,
            replaced_record,
        })
    }

    /// Seed the sites bootstrap file from its template if it is missing.
    fn ensure_sites_file(&self, journal: &mut Journal) -> Result<bool, StepFailure> {
        let sites_file = self.layout.sites_file_path();
        if entry_exists(&sites_file) {
            debug!(path = %sites_file.display(), "sites bootstrap file already present");
            return Ok(false);
        }

        let template = self.layout.sites_template_path();
        fs::copy(&template, &sites_file)
            .map_err(StepFailure::io(ProvisionStep::SeedSitesFile, &template))?;
        journal.record(Undo::RemoveFile(sites_file.clone()));

        glue::append(&sites_file, glue::SITES_GLUE)
            .map_err(StepFailure::io(ProvisionStep::SeedSitesFile, &sites_file))?;
        info!(path = %sites_file.display(), "seeded sites bootstrap file");
        Ok(true)
    }

    /// `<web_root>/<folder>` -> `.`
    fn create_root_link(&self, folder: &str, journal: &mut Journal) -> Result<PathBuf, StepFailure> {
        let link = self.layout.root_link(folder);
        create_link(Path::new("."), &link)
            .map_err(StepFailure::io(ProvisionStep::CreateSymlink, &link))?;
        journal.record(Undo::RemoveLink(link.clone()));
        info!(path = %link.display(), "created web root symlink");
        Ok(link)
    }

    /// `sites/<folder>/` with a seeded settings file.
    fn create_site_dir(&self, folder: &str, journal: &mut Journal) -> Result<PathBuf, StepFailure> {
        let site_dir = self.layout.site_dir(folder);
        fs::create_dir(&site_dir)
            .map_err(StepFailure::io(ProvisionStep::CreateSiteDirectory, &site_dir))?;
        journal.record(Undo::RemoveDir(site_dir.clone()));

        let template = self.layout.settings_template_path();
        let settings = site_dir.join(&self.layout.settings_file);
        fs::copy(&template, &settings)
            .map_err(StepFailure::io(ProvisionStep::SeedSettingsFile, &template))?;
        glue::append(&settings, glue::SETTINGS_GLUE)
            .map_err(StepFailure::io(ProvisionStep::SeedSettingsFile, &settings))?;
        info!(path = %site_dir.display(), "created site directory");
        Ok(site_dir)
    }

    /// Make sure the registry file and its parent directories exist.
    fn ensure_registry(&self, journal: &mut Journal) -> Result<PathBuf, StepFailure> {
        let path = self.layout.registry_path();
        if path.exists() {
            return Ok(path);
        }

        if let Some(parent) = path.parent() {
            if let Some(top) = first_missing_ancestor(parent) {
                fs::create_dir_all(parent)
                    .map_err(StepFailure::io(ProvisionStep::CreateRegistry, parent))?;
                journal.record(Undo::RemoveDir(top));
            }
        }

        fs::write(&path, "").map_err(StepFailure::io(ProvisionStep::CreateRegistry, &path))?;
        journal.record(Undo::RemoveFile(path.clone()));
        info!(path = %path.display(), "created alias registry");
        Ok(path)
    }
}

/// Site keys become path components and alias keys; keep them tame.
pub fn validate_site_key(key: &str) -> Result<(), ProvisionError> {
    let invalid = |reason| ProvisionError::InvalidSiteKey {
        key: key.to_owned(),
        reason,
    };

    if key.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if key.starts_with('-') {
        return Err(invalid("must not start with '-'"));
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(invalid("only ASCII letters, digits, '-' and '_' are allowed"));
    }
    Ok(())
}

/// The prefix is the first half of the folder name, so it must stay inside
/// a single path component that the resolver does not skip.
pub fn validate_prefix(prefix: &str) -> Result<(), ProvisionError> {
    let invalid = |reason| ProvisionError::InvalidPrefix {
        prefix: prefix.to_owned(),
        reason,
    };

    if prefix.starts_with('.') {
        return Err(invalid("must not start with '.'"));
    }
    if prefix.contains(['/', '\\']) {
        return Err(invalid("must not contain path separators"));
    }
    if prefix.contains("..") {
        return Err(invalid("must not contain '..'"));
    }
    if prefix.chars().any(char::is_control) {
        return Err(invalid("must not contain control characters"));
    }
    Ok(())
}

/// `true` for anything at `path`, including dangling symlinks.
fn entry_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Outermost ancestor of `dir` (inclusive) that does not exist yet.
fn first_missing_ancestor(dir: &Path) -> Option<PathBuf> {
    let mut missing = None;
    for ancestor in dir.ancestors() {
        if ancestor.as_os_str().is_empty() || entry_exists(ancestor) {
            break;
        }
        missing = Some(ancestor.to_path_buf());
    }
    missing
}

#[cfg(unix)]
fn create_link(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_link(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}

#[cfg(unix)]
fn remove_link(link: &Path) -> io::Result<()> {
    fs::remove_file(link)
}

#[cfg(windows)]
fn remove_link(link: &Path) -> io::Result<()> {
    fs::remove_dir(link)
}

#[cfg(all(test, unix))]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    const SETTINGS_TEMPLATE: &str = "<?php\n// default settings\n";
    const SITES_TEMPLATE: &str = "<?php\n// example sites\n";

    struct Project {
        tmp: TempDir,
    }

    impl Project {
        fn new() -> Self {
            let tmp = TempDir::new().unwrap();
            let web = tmp.path().join("web");
            fs::create_dir_all(web.join("sites/default")).unwrap();
            fs::write(web.join("sites/default/default.settings.php"), SETTINGS_TEMPLATE).unwrap();
            fs::write(web.join("sites/example.sites.php"), SITES_TEMPLATE).unwrap();
            Self { tmp }
        }

        fn root(&self) -> &Path {
            self.tmp.path()
        }

        fn web(&self) -> PathBuf {
            self.root().join("web")
        }

        fn provisioner(&self) -> Provisioner {
            Provisioner::new(ProjectLayout::new(self.web()))
        }

        fn registry(&self) -> PathBuf {
            self.root().join("drush/sites/local.site.yml")
        }

        /// Every entry under the project root with its file contents or
        /// link target.
        fn snapshot(&self) -> BTreeMap<PathBuf, String> {
            let mut out = BTreeMap::new();
            let mut stack = vec![self.root().to_path_buf()];
            while let Some(dir) = stack.pop() {
                for entry in fs::read_dir(&dir).unwrap() {
                    let path = entry.unwrap().path();
                    let meta = fs::symlink_metadata(&path).unwrap();
                    let value = if meta.file_type().is_symlink() {
                        format!("-> {}", fs::read_link(&path).unwrap().display())
                    } else if meta.is_dir() {
                        stack.push(path.clone());
                        "<dir>".to_string()
                    } else {
                        fs::read_to_string(&path).unwrap()
                    };
                    out.insert(path, value);
                }
            }
            out
        }
    }

    #[test]
    fn provisions_full_scaffold() {
        let project = Project::new();
        let report = project.provisioner().provision("alpha").unwrap();

        assert_eq!(report.folder, "local-alpha");
        assert!(report.sites_file_seeded);
        assert_eq!(report.replaced_record, None);

        let link = project.web().join("local-alpha");
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(&link).unwrap(), PathBuf::from("."));

        let settings = fs::read_to_string(project.web().join("sites/local-alpha/settings.php")).unwrap();
        assert!(settings.starts_with(SETTINGS_TEMPLATE));
        assert!(settings.ends_with(glue::SETTINGS_GLUE));

        let sites = fs::read_to_string(project.web().join("sites/sites.php")).unwrap();
        assert_eq!(sites, format!("{SITES_TEMPLATE}{}", glue::SITES_GLUE));
    }

    #[test]
    fn empty_registry_gets_generic_uri() {
        let project = Project::new();
        let report = project.provisioner().provision("alpha").unwrap();

        assert_eq!(report.record.uri, "localhost.local-alpha");
        assert_eq!(report.record.root, project.web());

        let registry = AliasRegistry::load(&project.registry()).unwrap();
        assert_eq!(registry.get("alpha").unwrap().uri, "localhost.local-alpha");
    }

    #[test]
    fn fallback_follows_prefix_and_host() {
        let project = Project::new();
        let report = project
            .provisioner()
            .with_prefix("dev-")
            .with_fallback_host("example.test")
            .provision("alpha")
            .unwrap();

        assert_eq!(report.folder, "dev-alpha");
        assert_eq!(report.record.uri, "example.test.dev-alpha");
    }

    #[test]
    fn existing_record_sets_uri_convention() {
        let project = Project::new();
        fs::create_dir_all(project.registry().parent().unwrap()).unwrap();
        fs::write(
            project.registry(),
            "beta:\n  root: /srv/web\n  uri: example.com.local-beta\n",
        )
        .unwrap();

        let report = project.provisioner().provision("gamma").unwrap();
        assert_eq!(report.record.uri, "example.com.local-gamma");

        let registry = AliasRegistry::load(&project.registry()).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("beta").unwrap().uri, "example.com.local-beta");
    }

    #[test]
    fn second_run_collides_without_changes() {
        let project = Project::new();
        project.provisioner().provision("alpha").unwrap();
        let before = project.snapshot();

        let err = project.provisioner().provision("alpha").unwrap_err();
        match err {
            ProvisionError::Collision { ref collisions } => {
                assert_eq!(collisions.len(), 2);
                assert!(matches!(collisions[0], Collision::SiteDirectory { .. }));
                assert!(matches!(collisions[1], Collision::RootEntry { .. }));
            }
            other => panic!("expected collision, got {other:?}"),
        }
        assert_eq!(project.snapshot(), before);
    }

    #[test]
    fn dangling_root_entry_still_collides() {
        let project = Project::new();
        std::os::unix::fs::symlink("/nonexistent", project.web().join("local-alpha")).unwrap();
        let before = project.snapshot();

        let err = project.provisioner().provision("alpha").unwrap_err();
        assert!(matches!(err, ProvisionError::Collision { ref collisions } if collisions.len() == 1));
        assert_eq!(project.snapshot(), before);
    }

    #[test]
    fn existing_sites_file_is_left_alone() {
        let project = Project::new();
        fs::write(project.web().join("sites/sites.php"), "<?php\n// mine\n").unwrap();

        let report = project.provisioner().provision("alpha").unwrap();
        assert!(!report.sites_file_seeded);
        assert_eq!(
            fs::read_to_string(project.web().join("sites/sites.php")).unwrap(),
            "<?php\n// mine\n"
        );
    }

    #[test]
    fn registry_failure_rolls_back_scaffold() {
        let project = Project::new();
        // A plain file where the registry directory should go.
        fs::write(project.root().join("drush"), "").unwrap();
        let before = project.snapshot();

        let err = project.provisioner().provision("alpha").unwrap_err();
        match err {
            ProvisionError::Setup {
                step, ref rollback, ..
            } => {
                assert_eq!(step, ProvisionStep::CreateRegistry);
                assert!(rollback.is_clean());
                assert_eq!(rollback.undone.len(), 3);
            }
            other => panic!("expected setup failure, got {other:?}"),
        }
        assert_eq!(project.snapshot(), before);
    }

    #[test]
    fn missing_settings_template_rolls_back() {
        let project = Project::new();
        fs::remove_file(project.web().join("sites/default/default.settings.php")).unwrap();
        let before = project.snapshot();

        let err = project.provisioner().provision("alpha").unwrap_err();
        assert!(matches!(
            err,
            ProvisionError::Setup {
                step: ProvisionStep::SeedSettingsFile,
                ..
            }
        ));
        assert_eq!(project.snapshot(), before);
    }

    #[test]
    fn malformed_registry_rolls_back_and_keeps_file() {
        let project = Project::new();
        fs::create_dir_all(project.registry().parent().unwrap()).unwrap();
        fs::write(project.registry(), "- not\n- a map\n").unwrap();
        let before = project.snapshot();

        let err = project.provisioner().provision("alpha").unwrap_err();
        assert!(matches!(
            err,
            ProvisionError::Registry {
                step: ProvisionStep::LoadRegistry,
                ..
            }
        ));
        assert!(err.rollback().unwrap().is_clean());
        assert_eq!(project.snapshot(), before);
    }

    #[test]
    fn existing_registry_key_is_reported_as_replaced() {
        let project = Project::new();
        fs::create_dir_all(project.registry().parent().unwrap()).unwrap();
        fs::write(
            project.registry(),
            "alpha:\n  root: /old/web\n  uri: old.local-alpha\n",
        )
        .unwrap();

        let report = project.provisioner().provision("alpha").unwrap();
        assert_eq!(report.replaced_record.unwrap().uri, "old.local-alpha");
        assert_eq!(report.record.uri, "old.local-alpha");
        assert_eq!(report.record.root, project.web());
    }

    #[test]
    fn escaping_prefixes_are_rejected_before_mutation() {
        let project = Project::new();
        let before = project.snapshot();
        for prefix in ["../", "a/", "x\\", ".hidden-", "a..b"] {
            let err = project
                .provisioner()
                .with_prefix(prefix)
                .provision("alpha")
                .unwrap_err();
            assert!(matches!(err, ProvisionError::InvalidPrefix { .. }), "{prefix}");
            assert!(err.rollback().is_none());
        }
        assert_eq!(project.snapshot(), before);
        assert!(!project.root().join("alpha").exists());
    }

    #[test]
    fn plain_and_empty_prefixes_are_accepted() {
        for prefix in ["", "local-", "dev_", "site."] {
            assert!(validate_prefix(prefix).is_ok(), "{prefix}");
        }
    }

    #[test]
    fn failed_undo_steps_are_reported_as_leftover() {
        let project = Project::new();
        let kept = project.web().join("sites/local-alpha");
        fs::create_dir(&kept).unwrap();
        let gone = project.web().join("never-created");

        let mut journal = Journal::default();
        journal.record(Undo::RemoveDir(kept.clone()));
        journal.record(Undo::RemoveFile(gone.clone()));

        let rollback = journal.rollback();
        assert!(!rollback.is_clean());
        assert_eq!(rollback.leftover, vec![gone]);
        assert_eq!(rollback.undone, vec![kept.clone()]);
        assert!(!kept.exists());
    }

    #[test]
    fn invalid_keys_are_rejected_before_mutation() {
        let project = Project::new();
        let before = project.snapshot();
        for key in ["", "../evil", "a/b", "-x", "sp ace"] {
            let err = project.provisioner().provision(key).unwrap_err();
            assert!(matches!(err, ProvisionError::InvalidSiteKey { .. }), "{key}");
        }
        assert_eq!(project.snapshot(), before);
    }
}
