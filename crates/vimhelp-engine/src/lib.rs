pub mod building;
pub mod diagnostic;
pub mod io;
pub mod models;
pub mod render;
pub mod scanning;
pub mod tags;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use building::{BuildOptions, Builder, Built};
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use io::*;
pub use models::{Block, Document, LinkStyle, Run};
pub use render::{HtmlRenderer, Rendered};
pub use scanning::{ScanRules, Token, TokenKind, scan};
pub use tags::Registry;

use render::{text, xml};

/// The whole pipeline, scan then build then render, over one tag registry.
///
/// The registry is read-only after construction, so one converter can be
/// shared by every document of a batch.
pub struct Converter {
    registry: Registry,
    rules: ScanRules,
    options: BuildOptions,
}

impl Converter {
    pub fn new(registry: Registry, rules: ScanRules, options: BuildOptions) -> Self {
        Self {
            registry,
            rules,
            options,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn convert<S: AsRef<str>>(&self, filename: &str, lines: &[S]) -> Built {
        let tokens = scan(&self.rules, filename, lines);
        Builder::build(&self.registry, self.options, tokens)
    }

    pub fn to_html<S: AsRef<str>>(&self, filename: &str, lines: &[S]) -> Rendered {
        let built = self.convert(filename, lines);
        let mut rendered = HtmlRenderer::new(&self.registry).render(&built.document);
        let mut diagnostics = built.diagnostics;
        diagnostics.append(&mut rendered.diagnostics);
        Rendered {
            output: rendered.output,
            diagnostics,
        }
    }

    pub fn to_xml<S: AsRef<str>>(&self, filename: &str, lines: &[S]) -> Rendered {
        let built = self.convert(filename, lines);
        Rendered {
            output: xml::render(&built.document),
            diagnostics: built.diagnostics,
        }
    }

    pub fn to_text<S: AsRef<str>>(&self, filename: &str, lines: &[S]) -> Rendered {
        let built = self.convert(filename, lines);
        Rendered {
            output: text::render(&built.document),
            diagnostics: built.diagnostics,
        }
    }
}
