use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use md5::{Digest, Md5};

/// MD5 digest, the format of the mtree `md5digest` keyword
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Md5Digest([u8; 16]);

impl Md5Digest {
    /// lowercase hex, 32 characters
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Md5Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Md5Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Md5Digest({})", self.to_hex())
    }
}

/// stream a file through MD5
pub fn compute_file_md5(path: &Path) -> io::Result<Md5Digest> {
    let mut file = File::open(path)?;
    let mut hasher = Md5::new();
    let mut buffer = vec![0u8; 64 * 1024];

    loop {
        let read = match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..read]);
    }

    Ok(Md5Digest(hasher.finalize().into()))
}

/// produces content digests for files on disk
///
/// the diff engine only calls this after every cheaper check has passed.
pub trait ContentHasher {
    /// lowercase hex MD5 of the file at `path`
    fn md5_hex(&self, path: &Path) -> io::Result<String>;
}

/// hashes files by reading them from disk
#[derive(Clone, Copy, Debug, Default)]
pub struct Md5Hasher;

impl ContentHasher for Md5Hasher {
    fn md5_hex(&self, path: &Path) -> io::Result<String> {
        compute_file_md5(path).map(|digest| digest.to_hex())
    }
}
