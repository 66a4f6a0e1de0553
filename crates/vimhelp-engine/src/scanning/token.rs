use serde::Serialize;

/// Column used by tokens that have no position on their line.
pub const NO_COLUMN: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // whole-line kinds
    Header,
    Ruler,
    Graphic,
    Section,
    Title,
    Example,
    // words
    Pipe,
    Star,
    Opt,
    Ctrl,
    Special,
    Note,
    Url,
    Word,
    Chars,
    // line ends
    Newline,
    BlankLine,
    // control
    Markup,
    StartLine,
    StartFile,
    Eof,
}

/// Coarse grouping of token kinds used by the builder's dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCategory {
    Pre,
    Word,
    Eol,
    Control,
    Eof,
}

impl TokenKind {
    pub fn category(self) -> TokenCategory {
        use TokenKind::*;
        match self {
            Header | Ruler | Graphic | Section | Title | Example => TokenCategory::Pre,
            Pipe | Star | Opt | Ctrl | Special | Note | Url | Word | Chars => TokenCategory::Word,
            Newline | BlankLine => TokenCategory::Eol,
            Markup | StartLine | StartFile => TokenCategory::Control,
            Eof => TokenCategory::Eof,
        }
    }

    pub fn is_eol(self) -> bool {
        self.category() == TokenCategory::Eol
    }

    /// Name used for the `t` attribute in XML and in debug output.
    pub fn as_str(self) -> &'static str {
        use TokenKind::*;
        match self {
            Header => "header",
            Ruler => "ruler",
            Graphic => "graphic",
            Section => "section",
            Title => "title",
            Example => "example",
            Pipe => "pipe",
            Star => "star",
            Opt => "opt",
            Ctrl => "ctrl",
            Special => "special",
            Note => "note",
            Url => "url",
            Word => "word",
            Chars => "chars",
            Newline => "newline",
            BlankLine => "blankline",
            Markup => "markup",
            StartLine => "start_line",
            StartFile => "start_file",
            Eof => "eof",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        use TokenKind::*;
        let kind = match name {
            "header" => Header,
            "ruler" => Ruler,
            "graphic" => Graphic,
            "section" => Section,
            "title" => Title,
            "example" => Example,
            "pipe" => Pipe,
            "star" => Star,
            "opt" => Opt,
            "ctrl" => Ctrl,
            "special" => Special,
            "note" => Note,
            "url" => Url,
            "word" => Word,
            "chars" => Chars,
            "newline" => Newline,
            "blankline" => BlankLine,
            "markup" => Markup,
            "start_line" => StartLine,
            "start_file" => StartFile,
            "eof" => Eof,
            _ => return None,
        };
        Some(kind)
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One typed fragment of a scanned line.
///
/// `column` is the 0-based character offset of the token on its tab-expanded
/// line. End-of-line and end-of-file tokens use [`NO_COLUMN`]; `start-line`
/// carries the 1-based line number instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub column: i32,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, column: i32) -> Self {
        Self {
            kind,
            text: text.into(),
            column,
        }
    }

    pub fn newline(marks: impl Into<String>) -> Self {
        Self::new(TokenKind::Newline, marks, NO_COLUMN)
    }

    pub fn blank_line() -> Self {
        Self::new(TokenKind::BlankLine, "", NO_COLUMN)
    }

    pub fn eof() -> Self {
        Self::new(TokenKind::Eof, "", NO_COLUMN)
    }

    pub fn category(&self) -> TokenCategory {
        self.kind.category()
    }
}
