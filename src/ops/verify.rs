use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use tracing::warn;

use crate::config::CheckOptions;
use crate::error::Result;
use crate::fs::tree::{EntryId, FsTree};
use crate::hash::ContentHasher;
use crate::mtree::{Keyword, ManifestEntry};
use crate::ops::scan::ScanReport;
use crate::types::{Field, Finding};

/// manifest records that describe the package itself, not installed files
pub const METADATA_PATHS: &[&str] = &["/.PKGINFO", "/.INSTALL", "/.CHANGELOG", "/.BUILDINFO"];

fn is_metadata_path(path: &Path) -> bool {
    METADATA_PATHS.iter().any(|m| path == Path::new(m))
}

/// check one package's manifest records against the tree
///
/// every record that resolves marks its tree entry as tracked (once per
/// entry, however many records point at it) and yields at most one finding.
pub fn verify_package(
    tree: &mut FsTree,
    records: &[ManifestEntry],
    options: &CheckOptions,
    hasher: &dyn ContentHasher,
    report: &mut ScanReport,
) -> Result<()> {
    for record in records {
        if is_metadata_path(record.path()) {
            continue;
        }

        let Some(id) = tree.resolve(record.path())? else {
            report.record(Finding::Missing {
                path: record.path().to_path_buf(),
            });
            continue;
        };

        if tree.mark_matched(id) {
            report.tracked += 1;
        }

        if let Some(finding) = compare(tree, id, record, options, hasher) {
            report.record(finding);
        }
    }

    Ok(())
}

/// compare a record with its tree entry
///
/// fields are checked in a fixed order (type, mode, uid, gid, then size and
/// md5 for regular files or the target for symlinks) and the first mismatch
/// wins. the content hash is only computed once the size matched.
pub fn compare(
    tree: &FsTree,
    id: EntryId,
    record: &ManifestEntry,
    options: &CheckOptions,
    hasher: &dyn ContentHasher,
) -> Option<Finding> {
    let entry = tree.entry(id);

    let actual_type = entry.file_type().mtree_name();
    if let Some(finding) = mismatch(record, Field::Type, Keyword::Type, actual_type.as_bytes()) {
        return Some(finding);
    }

    if !options.skip_mode {
        let actual = format!("{:o}", entry.mode() & 0o7777);
        if let Some(finding) = mismatch(record, Field::Mode, Keyword::Mode, actual.as_bytes()) {
            return Some(finding);
        }
    }

    if !options.skip_uid {
        let actual = entry.uid().to_string();
        if let Some(finding) = mismatch(record, Field::Uid, Keyword::Uid, actual.as_bytes()) {
            return Some(finding);
        }
    }

    if !options.skip_gid {
        let actual = entry.gid().to_string();
        if let Some(finding) = mismatch(record, Field::Gid, Keyword::Gid, actual.as_bytes()) {
            return Some(finding);
        }
    }

    if let Some(size) = entry.size() {
        let actual = size.to_string();
        if let Some(finding) = mismatch(record, Field::Size, Keyword::Size, actual.as_bytes()) {
            return Some(finding);
        }

        if !options.skip_md5 {
            let path = tree.storage_path(id);
            match hasher.md5_hex(&path) {
                Ok(actual) => {
                    return mismatch(record, Field::Md5, Keyword::Md5Digest, actual.as_bytes())
                }
                Err(e) => warn!(path = %path.display(), error = %e, "cannot hash file"),
            }
        }
    } else if let Some(target) = entry.link_target() {
        return mismatch(record, Field::Link, Keyword::Link, target.as_bytes());
    }

    None
}

/// a `Modified` finding if the record's value differs from `actual`
///
/// a keyword missing from the record compares as the empty string.
fn mismatch(
    record: &ManifestEntry,
    field: Field,
    keyword: Keyword,
    actual: &[u8],
) -> Option<Finding> {
    let expected = record.value(keyword);
    if expected == actual {
        return None;
    }

    Some(Finding::Modified {
        path: record.path().to_path_buf(),
        field,
        expected: String::from_utf8_lossy(expected).into_owned(),
        actual: String::from_utf8_lossy(actual).into_owned(),
    })
}
