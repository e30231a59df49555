//! ignore patterns for untracked reporting
//!
//! patterns are shell globs matched the way `fnmatch(3)` does with
//! `FNM_PATHNAME | FNM_LEADING_DIR`: `*` never crosses a `/`, and a pattern
//! that matches a leading directory of a path matches the whole path. so
//! `/proc/*` covers `/proc/1` as well as everything below it.

use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use glob::{MatchOptions, Pattern};

use crate::error::{Error, Result};

/// paths that are expected to differ from any package on a running system
pub const DEFAULT_IGNORES: &[&str] = &[
    "/dev/*",
    "/etc/ssl/certs/*",
    "/proc/*",
    "/root/*",
    "/run/*",
    "/sys/*",
    "/tmp/*",
    "/srv/http/*",
    "/var/cache/fontconfig/*",
    "/var/cache/pacman/pkg/*",
    "/var/log/*",
    "/var/spool/*",
    "/var/tmp/*",
];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// compiled, ordered set of ignore patterns
#[derive(Clone, Debug, Default)]
pub struct IgnoreSet {
    patterns: Vec<Pattern>,
}

impl IgnoreSet {
    /// compile patterns, failing on the first invalid one
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                let p = p.as_ref();
                Pattern::new(p).map_err(|e| Error::InvalidPattern {
                    pattern: p.to_string(),
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// the built-in [`DEFAULT_IGNORES`]
    pub fn defaults() -> Self {
        // the built-in list is known to compile
        Self::new(DEFAULT_IGNORES).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// patterns in the order they were given
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(|p| p.as_str())
    }

    /// should this absolute path be left out of untracked reporting
    pub fn is_ignored(&self, path: &Path) -> bool {
        if self.patterns.is_empty() {
            return false;
        }

        let path = String::from_utf8_lossy(path.as_os_str().as_bytes());
        let ignored = leading_dirs(&path).any(|candidate| {
            self.patterns
                .iter()
                .any(|pattern| pattern.matches_with(candidate, MATCH_OPTIONS))
        });
        ignored
    }
}

/// the path itself plus every proper prefix that ends right before a `/`
fn leading_dirs(path: &str) -> impl Iterator<Item = &str> {
    path.match_indices('/')
        .map(|(i, _)| i)
        .filter(|&i| i > 0)
        .map(move |i| &path[..i])
        .chain(std::iter::once(path))
}
