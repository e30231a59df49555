use tracing::debug;

use crate::error::Result;
use crate::fs::tree::{EntryId, FsTree};
use crate::ignore::IgnoreSet;
use crate::ops::scan::ScanReport;
use crate::types::Finding;

/// report every entry no manifest claimed
///
/// matched entries are descended into. an unmatched directory is reported
/// once as a whole and its contents are never listed. ignored paths produce
/// nothing.
pub fn collect_untracked(
    tree: &mut FsTree,
    ignores: &IgnoreSet,
    report: &mut ScanReport,
) -> Result<()> {
    let root = tree.root();
    walk(tree, root, ignores, report)
}

fn walk(
    tree: &mut FsTree,
    dir: EntryId,
    ignores: &IgnoreSet,
    report: &mut ScanReport,
) -> Result<()> {
    for child in tree.children(dir)? {
        if tree.is_matched(child) {
            walk(tree, child, ignores, report)?;
            continue;
        }

        let path = tree.path_of(child);
        if ignores.is_ignored(&path) {
            debug!(path = %path.display(), "ignored");
            continue;
        }

        report.record(Finding::Untracked {
            is_dir: tree.entry(child).is_directory(),
            path,
        });
    }

    Ok(())
}
