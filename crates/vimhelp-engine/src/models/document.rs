use serde::Serialize;

use crate::building::directive::{ColumnSpec, TableForm};
use crate::scanning::TokenKind;

/// How a tag reference is displayed.
///
/// `Link` is the pipe form (`|tag|`); the others are assigned from the shape
/// of the tag itself when the registry is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LinkStyle {
    Link,
    Option,
    Ctrl,
    Special,
    Hidden,
}

impl LinkStyle {
    /// Value of the `t` attribute in the XML form.
    pub fn as_str(self) -> &'static str {
        match self {
            LinkStyle::Link => "pipe",
            LinkStyle::Option => "opt",
            LinkStyle::Ctrl => "ctrl",
            LinkStyle::Special => "special",
            LinkStyle::Hidden => "hidden",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pipe" | "link" => Some(LinkStyle::Link),
            "opt" => Some(LinkStyle::Option),
            "ctrl" => Some(LinkStyle::Ctrl),
            "special" => Some(LinkStyle::Special),
            "hidden" => Some(LinkStyle::Hidden),
            _ => None,
        }
    }

    /// CSS class used by the HTML renderer.
    pub fn css_class(self) -> &'static str {
        match self {
            LinkStyle::Link => "l",
            LinkStyle::Option => "o",
            LinkStyle::Ctrl => "k",
            LinkStyle::Special => "s",
            LinkStyle::Hidden => "d",
        }
    }

    /// The style a link-like token asks for at its use site.
    pub fn requested_by(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Pipe => Some(LinkStyle::Link),
            TokenKind::Opt => Some(LinkStyle::Option),
            TokenKind::Ctrl => Some(LinkStyle::Ctrl),
            TokenKind::Special => Some(LinkStyle::Special),
            _ => None,
        }
    }
}

impl std::fmt::Display for LinkStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kinds of preformatted block, one per line-level token kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PreKind {
    Header,
    Ruler,
    Graphic,
    Section,
    Title,
    Example,
}

impl PreKind {
    pub fn token_kind(self) -> TokenKind {
        match self {
            PreKind::Header => TokenKind::Header,
            PreKind::Ruler => TokenKind::Ruler,
            PreKind::Graphic => TokenKind::Graphic,
            PreKind::Section => TokenKind::Section,
            PreKind::Title => TokenKind::Title,
            PreKind::Example => TokenKind::Example,
        }
    }

    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Header => Some(PreKind::Header),
            TokenKind::Ruler => Some(PreKind::Ruler),
            TokenKind::Graphic => Some(PreKind::Graphic),
            TokenKind::Section => Some(PreKind::Section),
            TokenKind::Title => Some(PreKind::Title),
            TokenKind::Example => Some(PreKind::Example),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.token_kind().as_str()
    }
}

/// End of a physical line inside a block or cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LineBreak {
    /// A break that must survive whitespace folding (`<br>`).
    pub hard: bool,
    /// The line ended with the `>` that opens an example block.
    pub opens_example: bool,
    /// The line started with the `<` that closes an example block.
    pub closes_example: bool,
}

impl LineBreak {
    pub fn soft() -> Self {
        Self::default()
    }

    pub fn hard() -> Self {
        Self {
            hard: true,
            ..Self::default()
        }
    }

    /// Rebuilds the break from the text of an end-of-line token.
    pub fn from_marks(marks: &str) -> Self {
        Self {
            hard: false,
            opens_example: marks.contains('>'),
            closes_example: marks.contains('<'),
        }
    }
}

/// Inline content of a paragraph or table cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Run {
    Text(String),
    /// A reference to a registered tag. `display` differs from `tag` only
    /// after an index-table fixup retargets the link.
    Link {
        tag: String,
        style: LinkStyle,
        display: String,
        file: String,
    },
    Anchor {
        tag: String,
    },
    Emphasis {
        kind: TokenKind,
        text: String,
    },
    LineBreak(LineBreak),
}

impl Run {
    pub fn is_text(&self) -> bool {
        matches!(self, Run::Text(_))
    }

    pub fn is_line_break(&self) -> bool {
        matches!(self, Run::LineBreak(_))
    }

    /// Text without any source decoration; line breaks count as `\n`.
    pub fn content(&self) -> &str {
        match self {
            Run::Text(text) => text,
            Run::Link { display, .. } => display,
            Run::Anchor { tag } => tag,
            Run::Emphasis { text, .. } => text,
            Run::LineBreak(_) => "\n",
        }
    }
}

/// Appends `run`, merging it into a trailing text run when both are text.
pub fn push_run(runs: &mut Vec<Run>, run: Run) {
    if let Run::Text(text) = &run {
        if text.is_empty() {
            return;
        }
        if let Some(Run::Text(last)) = runs.last_mut() {
            last.push_str(text);
            return;
        }
    }
    runs.push(run);
}

/// Concatenated plain content of a run list.
pub fn plain_content(runs: &[Run]) -> String {
    runs.iter().map(Run::content).collect()
}

pub type Cell = Vec<Run>;
pub type Row = Vec<Cell>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Paragraph {
    /// `None` for running text, otherwise the preformatted kind.
    pub kind: Option<PreKind>,
    pub runs: Vec<Run>,
}

impl Paragraph {
    pub fn new(kind: Option<PreKind>) -> Self {
        Self { kind, runs: vec![] }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    /// The directive text the table was opened with.
    pub markup: String,
    pub form: TableForm,
    /// `key=value` options from the directive, in source order.
    pub attributes: Vec<(String, String)>,
    pub columns: Vec<ColumnSpec>,
    pub rows: Vec<Row>,
}

impl Table {
    /// Index of the first column carrying `label`.
    pub fn find_column(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.has_label(label))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Document {
    pub filename: String,
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            blocks: vec![],
        }
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            Block::Paragraph(_) => None,
        })
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_run_merges_adjacent_text() {
        let mut runs = vec![];
        push_run(&mut runs, Run::Text("Use".into()));
        push_run(&mut runs, Run::Text(" ".into()));
        push_run(&mut runs, Run::LineBreak(LineBreak::soft()));
        push_run(&mut runs, Run::Text("next".into()));
        assert_eq!(
            runs,
            vec![
                Run::Text("Use ".into()),
                Run::LineBreak(LineBreak::soft()),
                Run::Text("next".into()),
            ]
        );
    }

    #[test]
    fn push_run_drops_empty_text() {
        let mut runs = vec![];
        push_run(&mut runs, Run::Text(String::new()));
        assert!(runs.is_empty());
    }

    #[test]
    fn line_break_marks() {
        let b = LineBreak::from_marks("<>");
        assert!(b.opens_example && b.closes_example && !b.hard);
        assert_eq!(LineBreak::from_marks(""), LineBreak::soft());
    }

    #[test]
    fn plain_content_counts_breaks_as_newlines() {
        let runs = vec![
            Run::Anchor { tag: "x".into() },
            Run::LineBreak(LineBreak::soft()),
            Run::Text("or".into()),
        ];
        assert_eq!(plain_content(&runs), "x\nor");
    }
}
