use serde::Serialize;

use crate::models::LinkStyle;

/// Kinds of non-fatal problem found while building or rendering a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum DiagnosticKind {
    #[error("unknown markup command {0:?}")]
    UnknownMarkupCommand(String),
    #[error("link style mismatch for {tag:?}: registered {registered}, requested {requested}")]
    LinkStyleMismatch {
        tag: String,
        registered: LinkStyle,
        requested: LinkStyle,
    },
    #[error("unrecognized token {0:?}")]
    UnrecognizedToken(String),
    #[error("malformed table directive: {0}")]
    MalformedTableDirective(String),
    #[error("index table row has no pipe link in its tag column")]
    IndexRowWithoutPipeLink,
    #[error("ref table row starts its description without an anchor")]
    RefRowWithoutAnchor,
}

/// A located [`DiagnosticKind`].
///
/// `line` is the 1-based source line, or 0 when the problem is not tied to
/// one (renderer diagnostics).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub file: String,
    pub line: i32,
    pub source_line: String,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn new(
        file: impl Into<String>,
        line: i32,
        source_line: impl Into<String>,
        kind: DiagnosticKind,
    ) -> Self {
        let diagnostic = Self {
            file: file.into(),
            line,
            source_line: source_line.into(),
            kind,
        };
        log::warn!("{diagnostic}");
        diagnostic
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}:{}", self.kind, self.file, self.line)?;
        if !self.source_line.is_empty() {
            write!(f, " '{}'", self.source_line)?;
        }
        Ok(())
    }
}
