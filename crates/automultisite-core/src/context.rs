// ── Request context ──
//
// Everything the resolver needs to know about the current invocation,
// captured once up front. Resolution code never reads argv or the process
// environment itself; `RequestContext::from_process` is the only place that
// does.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use url::Url;

use crate::error::CoreError;

/// Environment variable carrying the base URL of a headless test run.
pub const TEST_BASE_URL_VAR: &str = "SIMPLETEST_BASE_URL";

/// CGI variable holding the logical path of the entry script.
pub const SCRIPT_NAME_VAR: &str = "SCRIPT_NAME";

/// CGI variable holding the request's `Host` header.
pub const HTTP_HOST_VAR: &str = "HTTP_HOST";

/// CGI variable whose presence marks a served (non-headless) request.
pub const GATEWAY_INTERFACE_VAR: &str = "GATEWAY_INTERFACE";

const URI_FLAG: &str = "--uri=";
const INSTALLER_SEGMENT: &str = "/core";

/// Snapshot of the execution context a resolution runs in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// `true` for command-line tooling and test runners, `false` when
    /// serving an HTTP request.
    pub headless: bool,
    /// Invocation arguments, scanned for `--uri=` in headless mode.
    pub args: Vec<String>,
    /// Explicit base URL override used by headless test runs.
    pub test_base_url: Option<String>,
    /// Logical path of the entry script (e.g. `/sub/local-foo/index.php`).
    pub script_name: Option<String>,
    /// Value of the `Host` header, possibly with a port.
    pub host: Option<String>,
}

impl RequestContext {
    /// A headless context with the given invocation arguments.
    pub fn headless<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headless: true,
            args: args.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// A served context for the given entry script and `Host` header.
    pub fn served(script_name: impl Into<String>, host: Option<String>) -> Self {
        Self {
            headless: false,
            script_name: Some(script_name.into()),
            host,
            ..Self::default()
        }
    }

    /// Attach a test base URL override.
    pub fn with_test_base_url(mut self, url: impl Into<String>) -> Self {
        self.test_base_url = Some(url.into());
        self
    }

    /// Capture the context of the running process.
    pub fn from_process() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        Self {
            headless: std::env::var_os(GATEWAY_INTERFACE_VAR).is_none(),
            args: std::env::args().collect(),
            test_base_url: var(TEST_BASE_URL_VAR),
            script_name: var(SCRIPT_NAME_VAR),
            host: var(HTTP_HOST_VAR),
        }
    }

    /// The site URI a headless invocation targets: the test override if
    /// set, otherwise the value of the first `--uri=` argument.
    pub fn site_uri(&self) -> Option<&str> {
        self.test_base_url.as_deref().or_else(|| {
            self.args
                .iter()
                .find_map(|arg| arg.strip_prefix(URI_FLAG))
        })
    }

    /// The `Host` header without any port suffix.
    pub fn host_name(&self) -> Option<&str> {
        let host = self.host.as_deref()?.trim();
        if host.is_empty() {
            return None;
        }
        // Bracketed IPv6 literal, e.g. `[::1]:8080`.
        if host.starts_with('[') {
            return host.find(']').map(|end| &host[..=end]);
        }
        host.split(':').next().filter(|h| !h.is_empty())
    }

    /// Path component of the current request, before any subsite segment
    /// is stripped.
    pub fn base_path(&self) -> Result<String, CoreError> {
        if self.headless {
            let uri = self.site_uri().ok_or(CoreError::MissingUri)?;
            return uri_path(uri);
        }

        let script = self.script_name.as_deref().unwrap_or("/");
        Ok(strip_installer_segment(script_dir(script)).to_owned())
    }
}

/// Parse a site URI and return its percent-decoded path. Drush-style URIs
/// often omit the scheme, so those are read as `http://`. Dot segments are
/// normalised by the parser.
pub fn uri_path(uri: &str) -> Result<String, CoreError> {
    let invalid = |reason: url::ParseError| CoreError::InvalidUri {
        uri: uri.to_owned(),
        reason: reason.to_string(),
    };

    let url = match Url::parse(uri) {
        Ok(url) if !url.cannot_be_a_base() => url,
        Ok(_) | Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("http://{uri}")).map_err(invalid)?
        }
        Err(err) => return Err(invalid(err)),
    };

    percent_decode_str(url.path())
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|err| CoreError::InvalidUri {
            uri: uri.to_owned(),
            reason: format!("path is not valid UTF-8 once decoded: {err}"),
        })
}

/// Directory portion of a URL-style script path.
fn script_dir(script: &str) -> &str {
    match script.rfind('/') {
        Some(0) => "/",
        Some(idx) => &script[..idx],
        None => "",
    }
}

/// Drop an installer segment (`/core`, `/core/...`) and everything after it.
fn strip_installer_segment(dir: &str) -> &str {
    for (idx, _) in dir.match_indices(INSTALLER_SEGMENT) {
        let rest = &dir[idx + INSTALLER_SEGMENT.len()..];
        if rest.is_empty() || (rest.starts_with('/') && rest.len() > 1) {
            return &dir[..idx];
        }
    }
    dir
}

/// Drop the first `/<prefix>...` segment and everything after it, leaving
/// the path of the multi-site root.
pub fn strip_site_segment<'a>(path: &'a str, prefix: &str) -> &'a str {
    let needle = format!("/{prefix}");
    for (idx, _) in path.match_indices(needle.as_str()) {
        if path.len() > idx + needle.len() {
            return &path[..idx];
        }
    }
    path
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn headless_uri_comes_from_first_uri_flag() {
        let ctx = RequestContext::headless([
            "drush",
            "status",
            "--uri=http://example.com/sub/local-alpha",
            "--uri=http://other.test/",
        ]);
        assert_eq!(ctx.site_uri(), Some("http://example.com/sub/local-alpha"));
        assert_eq!(ctx.base_path().unwrap(), "/sub/local-alpha");
    }

    #[test]
    fn test_base_url_wins_over_arguments() {
        let ctx = RequestContext::headless(["--uri=http://example.com/ignored"])
            .with_test_base_url("http://localhost/tests");
        assert_eq!(ctx.base_path().unwrap(), "/tests");
    }

    #[test]
    fn headless_without_uri_is_fatal() {
        let ctx = RequestContext::headless(["drush", "status"]);
        assert!(matches!(ctx.base_path(), Err(CoreError::MissingUri)));
    }

    #[test]
    fn schemeless_uri_is_read_as_http() {
        assert_eq!(uri_path("example.com/sub/local-alpha").unwrap(), "/sub/local-alpha");
        assert_eq!(uri_path("localhost.local-alpha").unwrap(), "/");
        assert_eq!(uri_path("localhost:8080/sub").unwrap(), "/sub");
    }

    #[test]
    fn served_path_is_script_directory() {
        let ctx = RequestContext::served("/sub/local-alpha/index.php", None);
        assert_eq!(ctx.base_path().unwrap(), "/sub/local-alpha");

        let ctx = RequestContext::served("/index.php", None);
        assert_eq!(ctx.base_path().unwrap(), "/");
    }

    #[test]
    fn served_installer_path_is_trimmed() {
        let ctx = RequestContext::served("/sub/core/install.php", None);
        assert_eq!(ctx.base_path().unwrap(), "/sub");

        let ctx = RequestContext::served("/sub/core/modules/system/tests/x.php", None);
        assert_eq!(ctx.base_path().unwrap(), "/sub");

        let ctx = RequestContext::served("/sub/corepack/index.php", None);
        assert_eq!(ctx.base_path().unwrap(), "/sub/corepack");
    }

    #[test]
    fn site_segment_is_stripped_from_first_match() {
        assert_eq!(strip_site_segment("/sub/local-alpha", "local-"), "/sub");
        assert_eq!(strip_site_segment("/sub/local-alpha/x/local-b", "local-"), "/sub");
        assert_eq!(strip_site_segment("/sub/local-", "local-"), "/sub/local-");
        assert_eq!(strip_site_segment("/sub", "local-"), "/sub");
    }

    #[test]
    fn host_name_drops_port() {
        let host = |h: &str| RequestContext::served("/index.php", Some(h.into()));
        assert_eq!(host("example.com:8080").host_name(), Some("example.com"));
        assert_eq!(host("example.com").host_name(), Some("example.com"));
        assert_eq!(host("[::1]:8080").host_name(), Some("[::1]"));
        assert_eq!(host("  ").host_name(), None);
    }

    #[test]
    fn bare_ipv6_host_has_no_name() {
        let ctx = RequestContext::served("/index.php", Some("::1".into()));
        assert_eq!(ctx.host_name(), None);
        assert_eq!(
            crate::resolver::ResolveOptions::default().effective_server_prefix(&ctx),
            "localhost"
        );
    }

    #[test]
    fn uri_path_is_percent_decoded() {
        assert_eq!(uri_path("http://example.com/a%20b/local-x").unwrap(), "/a b/local-x");
        assert_eq!(uri_path("example.com/a b").unwrap(), "/a b");
        assert!(matches!(
            uri_path("http://example.com/%FF"),
            Err(CoreError::InvalidUri { .. })
        ));
    }
}
