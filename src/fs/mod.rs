pub mod read;
pub mod tree;

pub use read::{read_symlink_target, FileMetadata, FileType};
pub use tree::{ChildIds, Children, Entry, EntryId, EntryKind, FsTree};
