//! the diff engine: package manifests against the live tree

mod scan;
mod untracked;
mod verify;

pub use scan::{scan, ScanReport};
pub use untracked::collect_untracked;
pub use verify::{compare, verify_package, METADATA_PATHS};
