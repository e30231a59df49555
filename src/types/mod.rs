mod finding;

pub use finding::{Field, Finding};
