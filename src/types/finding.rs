use std::fmt;
use std::path::{Path, PathBuf};

/// the field whose comparison failed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Type,
    Mode,
    Uid,
    Gid,
    Size,
    Md5,
    Link,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Type => "type",
            Field::Mode => "mode",
            Field::Uid => "uid",
            Field::Gid => "gid",
            Field::Size => "size",
            Field::Md5 => "md5",
            Field::Link => "link",
        };
        f.write_str(name)
    }
}

/// one result of a scan
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Finding {
    /// listed in a manifest, absent on disk
    Missing { path: PathBuf },
    /// present, but the first compared field differs
    Modified {
        path: PathBuf,
        field: Field,
        expected: String,
        actual: String,
    },
    /// on disk, claimed by no manifest, not ignored
    Untracked { path: PathBuf, is_dir: bool },
}

impl Finding {
    pub fn path(&self) -> &Path {
        match self {
            Finding::Missing { path }
            | Finding::Modified { path, .. }
            | Finding::Untracked { path, .. } => path,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Finding::Missing { .. } => "[missing]",
            Finding::Modified { .. } => "[modified]",
            Finding::Untracked { .. } => "[untracked]",
        }
    }

    /// the part of the report line after the tag
    pub fn detail(&self) -> String {
        match self {
            Finding::Missing { path } => path.display().to_string(),
            Finding::Modified {
                path,
                field,
                expected,
                actual,
            } => format!("{} {} != {}: {}", field, expected, actual, path.display()),
            Finding::Untracked { path, is_dir } => {
                format!("{}{}", path.display(), if *is_dir { "/" } else { "" })
            }
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<11} {}", self.tag(), self.detail())
    }
}
