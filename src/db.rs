//! read-only access to the pacman local package database
//!
//! layout: `<db>/local/<name>-<version>/desc` holds `%NAME%` and `%VERSION%`
//! sections, and `<db>/local/<name>-<version>/mtree` is the gzipped manifest.

use std::fmt;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tracing::{debug, warn};

use crate::error::{Error, IoResultExt, Result};

/// an installed package
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Package {
    pub name: String,
    pub version: String,
}

impl Package {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.name, self.version)
    }
}

/// handle to a pacman database directory
#[derive(Debug)]
pub struct PackageDb {
    path: PathBuf,
}

impl PackageDb {
    /// open the database rooted at `path` (e.g. `/var/lib/pacman`)
    pub fn open(path: &Path) -> Result<Self> {
        if !path.join("local").is_dir() {
            return Err(Error::NoDatabase(path.to_path_buf()));
        }

        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn local_path(&self) -> PathBuf {
        self.path.join("local")
    }

    /// all installed packages, sorted by name
    ///
    /// entries without a readable, well-formed `desc` are skipped.
    pub fn packages(&self) -> Result<Vec<Package>> {
        let local = self.local_path();
        let mut packages = Vec::new();

        for dirent in fs::read_dir(&local).with_path(&local)? {
            let dirent = dirent.with_path(&local)?;
            let path = dirent.path();
            if !path.is_dir() {
                continue;
            }

            let desc_path = path.join("desc");
            let desc = match fs::read_to_string(&desc_path) {
                Ok(desc) => desc,
                Err(e) => {
                    warn!(path = %desc_path.display(), error = %e, "cannot read package description");
                    continue;
                }
            };

            match parse_desc(&desc) {
                Some(package) => packages.push(package),
                None => warn!(path = %desc_path.display(), "package description lacks name or version"),
            }
        }

        packages.sort();
        debug!(count = packages.len(), "listed installed packages");
        Ok(packages)
    }

    /// where the gzipped mtree of a package lives
    pub fn mtree_path(&self, package: &Package) -> PathBuf {
        self.local_path().join(package.to_string()).join("mtree")
    }

    /// decompress a package's mtree into `buffer`
    ///
    /// the buffer is cleared first; its allocation is kept so one buffer can
    /// serve every package of a scan.
    pub fn read_mtree(&self, package: &Package, buffer: &mut Vec<u8>) -> Result<()> {
        let path = self.mtree_path(package);
        buffer.clear();

        let unavailable = |source| Error::ManifestUnavailable {
            package: package.to_string(),
            path: path.clone(),
            source,
        };

        let file = File::open(&path).map_err(unavailable)?;
        GzDecoder::new(file)
            .read_to_end(buffer)
            .map_err(unavailable)?;
        Ok(())
    }
}

/// pull `%NAME%` and `%VERSION%` out of a desc file
fn parse_desc(desc: &str) -> Option<Package> {
    let mut name = None;
    let mut version = None;

    let mut lines = desc.lines();
    while let Some(line) = lines.next() {
        match line.trim() {
            "%NAME%" => name = lines.next().map(|v| v.trim().to_string()),
            "%VERSION%" => version = lines.next().map(|v| v.trim().to_string()),
            _ => {}
        }
    }

    match (name, version) {
        (Some(name), Some(version)) if !name.is_empty() && !version.is_empty() => {
            Some(Package { name, version })
        }
        _ => None,
    }
}
