use std::fmt;
use std::path::{Path, PathBuf};

const KEYWORD_COUNT: usize = 9;

/// the fixed set of mtree keywords this tool understands
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Keyword {
    Time,
    Mode,
    Size,
    Type,
    Uid,
    Gid,
    Link,
    Md5Digest,
    Sha256Digest,
}

impl Keyword {
    pub const ALL: [Keyword; KEYWORD_COUNT] = [
        Keyword::Time,
        Keyword::Mode,
        Keyword::Size,
        Keyword::Type,
        Keyword::Uid,
        Keyword::Gid,
        Keyword::Link,
        Keyword::Md5Digest,
        Keyword::Sha256Digest,
    ];

    /// exact, case-sensitive match against the keyword names
    pub fn parse(name: &[u8]) -> Option<Self> {
        match name {
            b"time" => Some(Keyword::Time),
            b"mode" => Some(Keyword::Mode),
            b"size" => Some(Keyword::Size),
            b"type" => Some(Keyword::Type),
            b"uid" => Some(Keyword::Uid),
            b"gid" => Some(Keyword::Gid),
            b"link" => Some(Keyword::Link),
            b"md5digest" => Some(Keyword::Md5Digest),
            b"sha256digest" => Some(Keyword::Sha256Digest),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Time => "time",
            Keyword::Mode => "mode",
            Keyword::Size => "size",
            Keyword::Type => "type",
            Keyword::Uid => "uid",
            Keyword::Gid => "gid",
            Keyword::Link => "link",
            Keyword::Md5Digest => "md5digest",
            Keyword::Sha256Digest => "sha256digest",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// keyword -> value table, one slot per keyword
///
/// values are raw bytes since escape decoding can produce anything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Keywords {
    values: [Option<Vec<u8>>; KEYWORD_COUNT],
}

impl Keywords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, keyword: Keyword) -> Option<&[u8]> {
        self.values[keyword.index()].as_deref()
    }

    pub fn has(&self, keyword: Keyword) -> bool {
        self.values[keyword.index()].is_some()
    }

    pub fn set(&mut self, keyword: Keyword, value: impl Into<Vec<u8>>) {
        self.values[keyword.index()] = Some(value.into());
    }

    pub fn unset(&mut self, keyword: Keyword) {
        self.values[keyword.index()] = None;
    }

    pub fn clear(&mut self) {
        self.values = Default::default();
    }

    /// keywords that currently hold a value, in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (Keyword, &[u8])> {
        Keyword::ALL
            .iter()
            .filter_map(move |&k| self.get(k).map(|v| (k, v)))
    }
}

/// running `/set` state while a manifest is scanned
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Defaults {
    pub keywords: Keywords,
}

impl Defaults {
    pub fn new() -> Self {
        Self::default()
    }
}

/// one file record of a parsed manifest
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManifestEntry {
    path: PathBuf,
    pub keywords: Keywords,
}

impl ManifestEntry {
    /// start a record from the current defaults
    pub fn new(path: impl Into<PathBuf>, defaults: &Defaults) -> Self {
        Self {
            path: path.into(),
            keywords: defaults.keywords.clone(),
        }
    }

    /// absolute path of the file this record describes
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, keyword: Keyword) -> Option<&[u8]> {
        self.keywords.get(keyword)
    }

    /// value of a keyword; an absent keyword reads as empty
    pub fn value(&self, keyword: Keyword) -> &[u8] {
        self.get(keyword).unwrap_or_default()
    }
}
