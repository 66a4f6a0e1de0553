//! Document building.
//!
//! The [`Builder`] consumes the scanner's token stream and groups it into
//! paragraphs, preformatted blocks and tables. Table rows and columns are
//! inferred when a table closes, after which the form-specific fixups run.

pub mod builder;
pub mod directive;
pub mod filter;
pub mod fixup;
pub mod table;

pub use builder::{BuildOptions, Builder, Built};
pub use directive::{ColumnSpec, Directive, TableDirective, TableForm};
pub use table::{TableInProgress, column_index};
