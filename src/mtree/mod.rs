//! pacman mtree manifests
//!
//! a manifest is a line-oriented list of file records. `/set` and `/unset`
//! directives maintain defaults that every following `./path` record starts
//! from; keywords given on the record itself win.

mod entry;
mod parse;

pub use entry::{Defaults, Keyword, Keywords, ManifestEntry};
pub use parse::{decode_octal, parse};
