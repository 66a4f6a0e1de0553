//! Tag registry: the `tag -> (file, style)` table loaded from a `tags` file.

pub mod classify;
pub mod registry;

pub use classify::classify;
pub use registry::{AnchorMarkup, LinkEntry, Registry, ResolvedLink, fragment};
