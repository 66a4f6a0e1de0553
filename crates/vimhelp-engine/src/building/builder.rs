use super::directive::Directive;
use super::table::TableInProgress;
use super::{filter, fixup};
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::models::{Block, Document, LineBreak, LinkStyle, Paragraph, PreKind, Run, push_run};
use crate::scanning::{NO_COLUMN, Token, TokenCategory, TokenKind};
use crate::tags::Registry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Run the form-specific column fixups on closed tables.
    pub table_fixups: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self { table_fixups: true }
    }
}

/// Result of one builder run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Built {
    pub document: Document,
    pub diagnostics: Vec<Diagnostic>,
}

/// Assembles paragraphs, preformatted blocks and tables from a token stream.
pub struct Builder<'r> {
    registry: &'r Registry,
    options: BuildOptions,
    document: Document,
    current: Option<Paragraph>,
    table: Option<TableInProgress>,
    after_blank_line: bool,
    line: i32,
    source_line: String,
    diagnostics: Vec<Diagnostic>,
}

impl<'r> Builder<'r> {
    pub fn new(registry: &'r Registry, options: BuildOptions) -> Self {
        Self {
            registry,
            options,
            document: Document::default(),
            current: None,
            table: None,
            after_blank_line: false,
            line: 0,
            source_line: String::new(),
            diagnostics: vec![],
        }
    }

    /// Filters and builds a complete token list.
    pub fn build(registry: &'r Registry, options: BuildOptions, tokens: Vec<Token>) -> Built {
        let mut builder = Self::new(registry, options);
        for token in filter::apply(tokens, registry) {
            builder.push(token);
        }
        builder.finish()
    }

    pub fn push(&mut self, token: Token) {
        match token.kind {
            TokenKind::StartFile => return self.start_file(token.text),
            TokenKind::StartLine => {
                self.line = token.column;
                self.source_line = token.text;
                return;
            }
            TokenKind::Markup => return self.markup(&token.text),
            _ => {}
        }

        if self.table.as_ref().is_some_and(|t| t.closes_on(&token)) {
            self.close_table();
        }

        match token.category() {
            TokenCategory::Eol => {
                if token.kind == TokenKind::BlankLine {
                    self.after_blank_line = true;
                }
                let run = Run::LineBreak(LineBreak::from_marks(&token.text));
                self.add_line_break(token.kind, run);
            }
            TokenCategory::Pre => self.add_pre(token),
            TokenCategory::Word => {
                if self.after_blank_line {
                    self.flush_current();
                    self.after_blank_line = false;
                }
                let run = self.word_run(&token);
                self.add_word(token.kind, run, token.column);
            }
            TokenCategory::Eof | TokenCategory::Control => {}
        }
    }

    pub fn finish(mut self) -> Built {
        self.close_table();
        self.flush_current();
        Built {
            document: self.document,
            diagnostics: self.diagnostics,
        }
    }

    fn start_file(&mut self, filename: String) {
        self.close_table();
        self.flush_current();
        self.document = Document::new(filename);
        self.after_blank_line = false;
        self.line = 0;
        self.source_line.clear();
    }

    fn markup(&mut self, markup: &str) {
        match Directive::parse(markup) {
            Directive::StopTable => self.close_table(),
            Directive::Table(directive, problems) => {
                self.close_table();
                self.flush_current();
                for problem in problems {
                    self.report(DiagnosticKind::MalformedTableDirective(problem));
                }
                self.table = Some(TableInProgress::new(directive, self.line));
            }
            Directive::FilterScan { .. } | Directive::StopFilterScan => {}
            Directive::Unknown(command) => self.report(DiagnosticKind::UnknownMarkupCommand(command)),
        }
    }

    fn word_run(&mut self, token: &Token) -> Run {
        let text = &token.text;
        match token.kind {
            TokenKind::Chars => Run::Text(text.clone()),
            TokenKind::Star => Run::Anchor { tag: text.clone() },
            TokenKind::Word | TokenKind::Pipe | TokenKind::Opt | TokenKind::Ctrl | TokenKind::Special => {
                let registry = self.registry;
                let requested = LinkStyle::requested_by(token.kind);
                match registry.resolve_link(text, requested) {
                    Some(link) => {
                        if link.mismatch
                            && let Some(requested) = requested
                        {
                            self.report(DiagnosticKind::LinkStyleMismatch {
                                tag: text.clone(),
                                registered: link.entry.style,
                                requested,
                            });
                        }
                        Run::Link {
                            tag: text.clone(),
                            style: link.style,
                            display: text.clone(),
                            file: link.entry.target_file.clone(),
                        }
                    }
                    None if token.kind == TokenKind::Word => Run::Text(text.clone()),
                    None => Run::Emphasis {
                        kind: token.kind,
                        text: text.clone(),
                    },
                }
            }
            kind => Run::Emphasis {
                kind,
                text: text.clone(),
            },
        }
    }

    fn add_line_break(&mut self, kind: TokenKind, run: Run) {
        if let Some(table) = self.table.as_mut() {
            table.push(kind, run, NO_COLUMN);
            return;
        }
        self.current
            .get_or_insert_with(|| Paragraph::new(None))
            .runs
            .push(run);
    }

    fn add_pre(&mut self, token: Token) {
        let Some(kind) = PreKind::from_token(token.kind) else {
            return;
        };
        if let Some(table) = self.table.as_mut() {
            let run = Run::Emphasis {
                kind: token.kind,
                text: token.text,
            };
            table.push(token.kind, run, token.column);
            return;
        }
        // each pre token keeps its own run so renderers can wrap it
        self.paragraph_of(Some(kind)).runs.push(Run::Text(token.text));
    }

    fn add_word(&mut self, kind: TokenKind, run: Run, column: i32) {
        if let Some(table) = self.table.as_mut() {
            table.push(kind, run, column);
            return;
        }
        push_run(&mut self.paragraph_of(None).runs, run);
    }

    /// The open paragraph when it has `kind`, else a new one.
    fn paragraph_of(&mut self, kind: Option<PreKind>) -> &mut Paragraph {
        if self.current.as_ref().is_some_and(|p| p.kind != kind) {
            self.flush_current();
        }
        self.current.get_or_insert_with(|| Paragraph::new(kind))
    }

    fn flush_current(&mut self) {
        if let Some(paragraph) = self.current.take() {
            self.document.blocks.push(Block::Paragraph(paragraph));
        }
    }

    fn close_table(&mut self) {
        let Some(open) = self.table.take() else {
            return;
        };
        self.flush_current();
        let line = open.line;
        let mut table = open.build();
        if self.options.table_fixups {
            for kind in fixup::apply(&mut table) {
                self.diagnostics.push(Diagnostic::new(
                    self.document.filename.clone(),
                    line,
                    table.markup.clone(),
                    kind,
                ));
            }
        }
        log::debug!(
            "{}: {} table at line {} with {} rows",
            self.document.filename,
            table.form.as_str(),
            line,
            table.rows.len()
        );
        self.document.blocks.push(Block::Table(table));
    }

    fn report(&mut self, kind: DiagnosticKind) {
        self.diagnostics.push(Diagnostic::new(
            self.document.filename.clone(),
            self.line,
            self.source_line.clone(),
            kind,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::building::directive::TableForm;
    use crate::scanning::{ScanRules, scan};
    use pretty_assertions::assert_eq;

    fn registry() -> Registry {
        Registry::load(["window\twindows.txt", "'wrap'\toptions.txt", "foo\tindex.txt"])
    }

    fn build(lines: &[&str]) -> Built {
        let registry = registry();
        let tokens = scan(&ScanRules::default(), "test.txt", lines);
        Builder::build(&registry, BuildOptions::default(), tokens)
    }

    fn nl() -> Run {
        Run::LineBreak(LineBreak::soft())
    }

    #[test]
    fn test_scenario_line() {
        let built = build(&["Use CTRL-W to split *win-split* see |window|"]);
        assert_eq!(built.document.filename, "test.txt");
        assert_eq!(
            built.document.blocks,
            vec![Block::Paragraph(Paragraph {
                kind: None,
                runs: vec![
                    Run::Text("Use ".into()),
                    Run::Emphasis {
                        kind: TokenKind::Ctrl,
                        text: "CTRL-W".into()
                    },
                    Run::Text(" to split ".into()),
                    Run::Anchor {
                        tag: "win-split".into()
                    },
                    Run::Text(" see ".into()),
                    Run::Link {
                        tag: "window".into(),
                        style: LinkStyle::Link,
                        display: "window".into(),
                        file: "windows.txt".into(),
                    },
                    nl(),
                ],
            })]
        );
        assert!(built.diagnostics.is_empty());
    }

    #[test]
    fn test_blank_line_splits_paragraphs() {
        let built = build(&["one", "", "two"]);
        assert_eq!(
            built.document.blocks,
            vec![
                Block::Paragraph(Paragraph {
                    kind: None,
                    runs: vec![Run::Text("one".into()), nl(), nl()],
                }),
                Block::Paragraph(Paragraph {
                    kind: None,
                    runs: vec![Run::Text("two".into()), nl()],
                }),
            ]
        );
    }

    #[test]
    fn test_preformatted_lines_group_by_kind() {
        let built = build(&["Head~", "More~", "text"]);
        assert_eq!(
            built.document.blocks,
            vec![
                Block::Paragraph(Paragraph {
                    kind: Some(PreKind::Header),
                    runs: vec![
                        Run::Text("Head".into()),
                        nl(),
                        Run::Text("More".into()),
                        nl()
                    ],
                }),
                Block::Paragraph(Paragraph {
                    kind: None,
                    runs: vec![Run::Text("text".into()), nl()],
                }),
            ]
        );
    }

    #[test]
    fn test_example_markers_reach_line_breaks() {
        let built = build(&["See: >", "  ex", "<"]);
        let breaks: Vec<LineBreak> = built
            .document
            .blocks
            .iter()
            .flat_map(|b| match b {
                Block::Paragraph(p) => p.runs.clone(),
                Block::Table(_) => vec![],
            })
            .filter_map(|r| match r {
                Run::LineBreak(b) => Some(b),
                _ => None,
            })
            .collect();
        assert_eq!(breaks.len(), 3);
        assert!(breaks[0].opens_example);
        assert!(breaks[2].closes_example);
    }

    #[test]
    fn test_unknown_markup_is_reported() {
        let built = build(&["#*#bogus#*#", "text"]);
        assert_eq!(built.diagnostics.len(), 1);
        assert_eq!(
            built.diagnostics[0].kind,
            DiagnosticKind::UnknownMarkupCommand("bogus".into())
        );
        assert_eq!(built.diagnostics[0].line, 1);
    }

    #[test]
    fn test_style_mismatch_keeps_registered_style() {
        let registry = Registry::load(["<window>\twindows.txt"]);
        let mut builder = Builder::new(&registry, BuildOptions::default());
        builder.push(Token::new(TokenKind::StartFile, "a.txt", 0));
        builder.push(Token::new(TokenKind::Ctrl, "<window>", 0));
        let built = builder.finish();
        assert_eq!(built.diagnostics.len(), 1);
        let Block::Paragraph(p) = &built.document.blocks[0] else {
            panic!("expected paragraph");
        };
        assert!(matches!(
            p.runs[0],
            Run::Link {
                style: LinkStyle::Special,
                ..
            }
        ));
    }

    #[test]
    fn test_simple_table_closes_on_blank_line() {
        let built = build(&[
            "#*#table 1 10#*#",
            "a        one",
            "b        two",
            "",
            "after",
        ]);
        let blocks = &built.document.blocks;
        assert_eq!(blocks.len(), 3);
        let Block::Table(table) = &blocks[0] else {
            panic!("expected table");
        };
        assert_eq!(table.form, TableForm::Simple);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(
            table.rows[1],
            vec![
                vec![Run::Text("b        ".into()), nl()],
                vec![Run::Text("two".into()), nl()],
            ]
        );
    }

    #[test]
    fn test_ref_table_runs_until_stop_directive() {
        let built = build(&[
            "#*#table:ref 1:command 20:desc#*#",
            "dd                 *dd*",
            "                   Delete a line.",
            "",
            "yy                 *yy*",
            "                   Yank a line.",
            "#*#table:stop-table#*#",
            "after",
        ]);
        let tables: Vec<_> = built.document.tables().collect();
        assert_eq!(tables.len(), 1);
        let rows = &tables[0].rows;
        assert_eq!(rows.len(), 2);
        // anchors moved into the new first column
        assert_eq!(rows[0][0], vec![Run::Anchor { tag: "dd".into() }, Run::LineBreak(LineBreak::hard())]);
        assert_eq!(rows[0].len(), 3);
        assert!(built.diagnostics.is_empty());
    }

    #[test]
    fn test_fixups_can_be_disabled() {
        let registry = registry();
        let tokens = scan(
            &ScanRules::default(),
            "index.txt",
            &["#*#table:form=index 1:tag 10:command#*#", "|foo|    bar"],
        );
        let built = Builder::build(&registry, BuildOptions { table_fixups: false }, tokens);
        let table = built.document.tables().next().unwrap();
        assert_eq!(table.rows[0].len(), 2);

        let tokens = scan(
            &ScanRules::default(),
            "index.txt",
            &["#*#table:form=index 1:tag 10:command#*#", "|foo|    bar"],
        );
        let built = Builder::build(&registry, BuildOptions::default(), tokens);
        let table = built.document.tables().next().unwrap();
        assert_eq!(
            table.rows[0],
            vec![vec![Run::Link {
                tag: "foo".into(),
                style: LinkStyle::Link,
                display: "bar".into(),
                file: "index.txt".into(),
            }]]
        );
    }
}
