use tracing::{debug, info, warn};

use crate::config::CheckOptions;
use crate::db::{Package, PackageDb};
use crate::error::{Error, Result};
use crate::fs::tree::FsTree;
use crate::hash::ContentHasher;
use crate::ignore::IgnoreSet;
use crate::mtree;
use crate::ops::untracked::collect_untracked;
use crate::ops::verify::verify_package;
use crate::types::Finding;

/// scan report
#[derive(Debug, Default)]
pub struct ScanReport {
    /// findings in discovery order
    pub findings: Vec<Finding>,
    /// distinct entries claimed by at least one manifest record
    pub tracked: usize,
    pub untracked: usize,
    pub missing: usize,
    pub modified: usize,
    /// packages whose mtree could not be read
    pub skipped: Vec<Package>,
}

impl ScanReport {
    /// append a finding and bump its counter
    pub fn record(&mut self, finding: Finding) {
        match finding {
            Finding::Missing { .. } => self.missing += 1,
            Finding::Modified { .. } => self.modified += 1,
            Finding::Untracked { .. } => self.untracked += 1,
        }
        self.findings.push(finding);
    }

    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// compare every installed package with the tree, then collect what is left
///
/// a package without a readable mtree is logged and skipped. io errors while
/// walking the tree abort the scan.
pub fn scan(
    db: &PackageDb,
    tree: &mut FsTree,
    options: &CheckOptions,
    ignores: &IgnoreSet,
    hasher: &dyn ContentHasher,
) -> Result<ScanReport> {
    let mut report = ScanReport::default();
    let packages = db.packages()?;
    info!(packages = packages.len(), root = %tree.storage_root().display(), "scanning");

    let mut buffer = Vec::new();
    for package in packages {
        match db.read_mtree(&package, &mut buffer) {
            Ok(()) => {}
            Err(e @ Error::ManifestUnavailable { .. }) => {
                warn!(package = %package, error = %e, "skipping package");
                report.skipped.push(package);
                continue;
            }
            Err(e) => return Err(e),
        }

        let records = mtree::parse(&buffer);
        debug!(package = %package, records = records.len(), "verifying");
        verify_package(tree, &records, options, hasher, &mut report)?;
    }

    collect_untracked(tree, ignores, &mut report)?;
    info!(
        tracked = report.tracked,
        missing = report.missing,
        modified = report.modified,
        untracked = report.untracked,
        "scan finished"
    );
    Ok(report)
}
