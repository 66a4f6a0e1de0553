//! Help-file text from a built document.
//!
//! Blocks share one line buffer, since a physical line can be split across a
//! preformatted block and the paragraph that follows it (a section heading
//! and its anchor).

use crate::models::{Block, Document, LineBreak, LinkStyle, PreKind, Run, Table};
use crate::scanning::TokenKind;

pub fn render(document: &Document) -> String {
    let mut writer = Writer::default();
    for block in &document.blocks {
        match block {
            Block::Paragraph(p) => {
                for run in &p.runs {
                    writer.run(p.kind, run);
                }
            }
            Block::Table(t) => writer.table(t),
        }
    }
    writer.finish()
}

#[derive(Default)]
struct Writer {
    out: String,
    line: String,
}

impl Writer {
    fn run(&mut self, kind: Option<PreKind>, run: &Run) {
        match run {
            Run::Text(text) => match kind {
                Some(pre) => push_pre(&mut self.line, pre, text),
                None => self.line.push_str(text),
            },
            Run::LineBreak(b) => self.end_line(*b),
            other => push_inline(&mut self.line, other),
        }
    }

    fn end_line(&mut self, b: LineBreak) {
        let line = std::mem::take(&mut self.line);
        self.out.push_str(&marked_line(line, b));
        self.out.push('\n');
    }

    fn table(&mut self, table: &Table) {
        if !self.line.is_empty() {
            self.end_line(LineBreak::soft());
        }
        self.out.push_str(&format!("#*#{}#*#\n", table.markup));
        for row in &table.rows {
            let cells: Vec<Vec<String>> = row.iter().map(|cell| cell_lines(cell)).collect();
            let height = cells.iter().map(Vec::len).min().unwrap_or(0);
            for i in 0..height {
                for cell in &cells {
                    self.out.push_str(&cell[i]);
                }
                self.out.push('\n');
            }
        }
    }

    fn finish(mut self) -> String {
        if !self.line.is_empty() {
            self.end_line(LineBreak::soft());
        }
        self.out
    }
}

/// Splits a cell into its physical lines, without line ends.
fn cell_lines(cell: &[Run]) -> Vec<String> {
    let mut lines = vec![];
    let mut line = String::new();
    for run in cell {
        match run {
            Run::LineBreak(b) => lines.push(marked_line(std::mem::take(&mut line), *b)),
            Run::Text(text) => line.push_str(text),
            other => push_inline(&mut line, other),
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

fn marked_line(mut line: String, b: LineBreak) -> String {
    if b.closes_example {
        line.insert(0, '<');
    }
    if b.opens_example {
        line.push('>');
    }
    line
}

fn push_pre(line: &mut String, kind: PreKind, text: &str) {
    line.push_str(text);
    match kind {
        PreKind::Header => line.push('~'),
        PreKind::Graphic => line.push_str(" `"),
        _ => {}
    }
}

fn push_inline(line: &mut String, run: &Run) {
    match run {
        Run::Link {
            tag,
            style: LinkStyle::Link,
            ..
        } => {
            line.push('|');
            line.push_str(tag);
            line.push('|');
        }
        Run::Link { display, .. } => line.push_str(display),
        Run::Anchor { tag } => {
            line.push('*');
            line.push_str(tag);
            line.push('*');
        }
        Run::Emphasis {
            kind: TokenKind::Pipe,
            text,
        } => {
            line.push('|');
            line.push_str(text);
            line.push('|');
        }
        Run::Emphasis { kind, text } => match PreKind::from_token(*kind) {
            Some(pre) => push_pre(line, pre, text),
            None => line.push_str(text),
        },
        Run::Text(text) => line.push_str(text),
        Run::LineBreak(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::building::{BuildOptions, Builder};
    use crate::scanning::{ScanRules, scan};
    use crate::tags::Registry;
    use pretty_assertions::assert_eq;

    fn round_trip(lines: &[&str], options: BuildOptions) -> String {
        let registry = Registry::load(["window\twindows.txt", "'ts'\toptions.txt"]);
        let tokens = scan(&ScanRules::default(), "t.txt", lines);
        render(&Builder::build(&registry, options, tokens).document)
    }

    #[test]
    fn test_plain_lines_round_trip() {
        let lines = [
            "*intro.txt*  For Vim version 8.2.  Last change: 2020",
            "",
            "INTRO  *intro*",
            "Use CTRL-W to split *win-split* see |window| and |nowhere|.",
            "Heading~",
            "Set 'ts' or 'nosuch' and see <CR> and [count].",
            "Note: http://www.vim.org/ box `",
            "==============================",
        ];
        let expected = lines.join("\n") + "\n";
        assert_eq!(round_trip(&lines, BuildOptions::default()), expected);
    }

    #[test]
    fn test_example_markers_are_restored() {
        let lines = ["Try: >", "    :help", "", "\tindented", "<Done", ">"];
        assert_eq!(
            round_trip(&lines, BuildOptions::default()),
            "Try: >\n    :help\n\n        indented\n<Done\n>\n"
        );
    }

    #[test]
    fn test_table_lines_are_zipped() {
        let lines = ["#*#table 1 10#*#", "a        one", "b        two", "", "after"];
        assert_eq!(
            round_trip(&lines, BuildOptions::default()),
            "#*#table 1 10#*#\na        one\nb        two\n\nafter\n"
        );
    }
}
