//! pkgdiff - compare installed pacman packages against the filesystem
//!
//! every installed package ships an mtree manifest in the local package
//! database. pkgdiff reads those manifests and checks each record against
//! what is actually on disk, then walks the rest of the filesystem for files
//! that no package claims.
//!
//! # Core concepts
//!
//! - **FsTree**: a lazily listed snapshot of the filesystem, one directory read at a time
//! - **Manifest**: the parsed mtree records of one package
//! - **Finding**: a missing, modified or untracked path
//!
//! # Comparison order
//!
//! type, mode, uid, gid, then size and md5 for regular files or the link
//! target for symlinks. only the first mismatch of a record is reported.
//!
//! # Example usage
//!
//! ```no_run
//! use pkgdiff::{ops, CheckOptions, FsTree, IgnoreSet, Md5Hasher, PackageDb};
//! use std::path::Path;
//!
//! let db = PackageDb::open(Path::new("/var/lib/pacman")).unwrap();
//! let mut tree = FsTree::open("/");
//! let report = ops::scan(
//!     &db,
//!     &mut tree,
//!     &CheckOptions::default(),
//!     &IgnoreSet::defaults(),
//!     &Md5Hasher,
//! )
//! .unwrap();
//!
//! for finding in &report.findings {
//!     println!("{}", finding);
//! }
//! ```

mod config;
mod db;
mod error;
mod hash;
mod ignore;

pub mod fs;
pub mod mtree;
pub mod ops;
pub mod types;

pub use config::{CheckOptions, Config, DEFAULT_DB_PATH, DEFAULT_ROOT};
pub use db::{Package, PackageDb};
pub use error::{Error, Result};
pub use fs::{EntryId, FsTree};
pub use hash::{compute_file_md5, ContentHasher, Md5Digest, Md5Hasher};
pub use ignore::{IgnoreSet, DEFAULT_IGNORES};
pub use mtree::ManifestEntry;
pub use ops::ScanReport;
pub use types::{Field, Finding};
