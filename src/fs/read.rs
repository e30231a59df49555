use std::ffi::{CString, OsString};
use std::fs::{self, Metadata};
use std::io;
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::os::unix::fs::{FileTypeExt, MetadataExt};
use std::path::Path;

use nix::libc;

use crate::error::{IoResultExt, Result};

/// file type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Regular,
    Directory,
    Symlink,
    BlockDevice,
    CharDevice,
    Fifo,
    Socket,
}

impl FileType {
    /// detect file type from metadata
    pub fn from_metadata(meta: &Metadata) -> Self {
        let ft = meta.file_type();
        if ft.is_file() {
            FileType::Regular
        } else if ft.is_dir() {
            FileType::Directory
        } else if ft.is_symlink() {
            FileType::Symlink
        } else if ft.is_block_device() {
            FileType::BlockDevice
        } else if ft.is_char_device() {
            FileType::CharDevice
        } else if ft.is_fifo() {
            FileType::Fifo
        } else if ft.is_socket() {
            FileType::Socket
        } else {
            // fallback, shouldn't happen
            FileType::Regular
        }
    }

    /// the name mtree uses for this type in its `type=` keyword
    pub fn mtree_name(&self) -> &'static str {
        match self {
            FileType::Regular => "file",
            FileType::Directory => "dir",
            FileType::Symlink => "link",
            FileType::BlockDevice => "block",
            FileType::CharDevice => "char",
            FileType::Fifo => "fifo",
            FileType::Socket => "socket",
        }
    }
}

/// metadata for a filesystem entry
#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub file_type: FileType,
    pub uid: u32,
    pub gid: u32,
    /// full st_mode, including the file type bits
    pub mode: u32,
    pub size: u64,
    /// modification time in seconds since the epoch
    pub mtime: i64,
}

impl FileMetadata {
    /// read metadata from path (does not follow symlinks)
    pub fn from_path(path: &Path) -> Result<Self> {
        let meta = fs::symlink_metadata(path).with_path(path)?;
        Ok(Self::from_std_metadata(&meta))
    }

    /// create from std::fs::Metadata
    pub fn from_std_metadata(meta: &Metadata) -> Self {
        Self {
            file_type: FileType::from_metadata(meta),
            uid: meta.uid(),
            gid: meta.gid(),
            mode: meta.mode(),
            size: meta.len(),
            mtime: meta.mtime(),
        }
    }
}

/// read symlink target
///
/// the buffer starts at `probable_len` (the link's reported st_size), or
/// PATH_MAX when the filesystem reports zero, and doubles for as long as
/// readlink fills it completely. the raw io error is returned so callers
/// can tell permission problems apart from real failures.
pub fn read_symlink_target(path: &Path, probable_len: u64) -> io::Result<OsString> {
    let c_path = CString::new(path.as_os_str().as_bytes())?;

    let mut capacity = match usize::try_from(probable_len) {
        Ok(0) | Err(_) => libc::PATH_MAX as usize,
        Ok(len) => len,
    };
    let mut buffer: Vec<u8> = Vec::new();

    loop {
        // one extra byte so a full buffer means "possibly truncated"
        buffer.reserve_exact(capacity + 1);
        let read = unsafe {
            libc::readlink(
                c_path.as_ptr(),
                buffer.as_mut_ptr() as *mut libc::c_char,
                capacity + 1,
            )
        };
        if read < 0 {
            return Err(io::Error::last_os_error());
        }

        let read = read as usize;
        if read > capacity {
            capacity *= 2;
            continue;
        }

        // SAFETY: readlink initialized exactly `read` bytes of the buffer
        unsafe { buffer.set_len(read) };
        buffer.shrink_to_fit();
        return Ok(OsString::from_vec(buffer));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::symlink;
    use tempfile::tempdir;

    #[test]
    fn test_file_type_regular() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("file.txt");
        fs::write(&path, "content").unwrap();

        let meta = FileMetadata::from_path(&path).unwrap();
        assert_eq!(meta.file_type, FileType::Regular);
        assert_eq!(meta.size, 7);
    }

    #[test]
    fn test_file_type_directory() {
        let dir = tempdir().unwrap();
        let subdir = dir.path().join("subdir");
        fs::create_dir(&subdir).unwrap();

        let meta = FileMetadata::from_path(&subdir).unwrap();
        assert_eq!(meta.file_type, FileType::Directory);
    }

    #[test]
    fn test_file_type_symlink() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("target");
        let link = dir.path().join("link");
        fs::write(&target, "content").unwrap();
        symlink(&target, &link).unwrap();

        let meta = FileMetadata::from_path(&link).unwrap();
        assert_eq!(meta.file_type, FileType::Symlink);
    }

    #[test]
    fn test_mtree_names() {
        assert_eq!(FileType::Regular.mtree_name(), "file");
        assert_eq!(FileType::Directory.mtree_name(), "dir");
        assert_eq!(FileType::Symlink.mtree_name(), "link");
        assert_eq!(FileType::BlockDevice.mtree_name(), "block");
        assert_eq!(FileType::CharDevice.mtree_name(), "char");
        assert_eq!(FileType::Fifo.mtree_name(), "fifo");
        assert_eq!(FileType::Socket.mtree_name(), "socket");
    }

    #[test]
    fn test_metadata_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("file.txt");
        fs::write(&path, "content").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        let meta = FileMetadata::from_path(&path).unwrap();
        assert_eq!(meta.mode & 0o7777, 0o640);
    }

    #[test]
    fn test_read_symlink_target() {
        let dir = tempdir().unwrap();
        let link = dir.path().join("link");
        symlink("/some/target/path", &link).unwrap();

        let target = read_symlink_target(&link, 17).unwrap();
        assert_eq!(target, OsString::from("/some/target/path"));
    }

    #[test]
    fn test_read_symlink_target_grows_buffer() {
        let dir = tempdir().unwrap();
        let link = dir.path().join("link");
        let long = "x".repeat(300);
        symlink(&long, &link).unwrap();

        // deliberately undersized guess forces several retries
        let target = read_symlink_target(&link, 4).unwrap();
        assert_eq!(target, OsString::from(long));
    }

    #[test]
    fn test_read_symlink_target_zero_hint() {
        let dir = tempdir().unwrap();
        let link = dir.path().join("link");
        symlink("../lib", &link).unwrap();

        let target = read_symlink_target(&link, 0).unwrap();
        assert_eq!(target, OsString::from("../lib"));
    }

    #[test]
    fn test_read_symlink_target_not_a_link() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("file");
        fs::write(&path, "x").unwrap();

        let err = read_symlink_target(&path, 0).unwrap_err();
        assert_eq!(err.raw_os_error(), Some(libc::EINVAL));
    }
}
