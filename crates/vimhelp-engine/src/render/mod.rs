//! # Renderers
//!
//! - **`html`**: inline HTML fragment, links resolved through the registry
//! - **`xml`**: lossless element tree, and [`xml::parse`] to read it back
//! - **`text`**: the help-file source form, the inverse of scan and build

pub mod html;
pub mod text;
pub mod xml;

use crate::diagnostic::Diagnostic;

/// Renderer output together with the problems found while producing it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rendered {
    pub output: String,
    pub diagnostics: Vec<Diagnostic>,
}

pub use html::HtmlRenderer;
