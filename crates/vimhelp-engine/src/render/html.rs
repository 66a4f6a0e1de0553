use std::sync::OnceLock;

use html_escape::{encode_double_quoted_attribute, encode_text};
use regex::Regex;

use super::Rendered;
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::models::{Block, Cell, Document, LinkStyle, Paragraph, PreKind, Run, Table};
use crate::scanning::TokenKind;
use crate::tags::{Registry, fragment};

/// Renders documents as inline HTML. Page chrome is left to the caller.
pub struct HtmlRenderer<'r> {
    registry: &'r Registry,
}

impl<'r> HtmlRenderer<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    pub fn render(&self, document: &Document) -> Rendered {
        let mut pass = Pass {
            registry: self.registry,
            filename: &document.filename,
            out: String::new(),
            diagnostics: vec![],
        };
        for block in &document.blocks {
            match block {
                Block::Paragraph(p) => pass.paragraph(p),
                Block::Table(t) => pass.table(t),
            }
        }
        Rendered {
            output: pass.out,
            diagnostics: pass.diagnostics,
        }
    }
}

struct Pass<'a> {
    registry: &'a Registry,
    filename: &'a str,
    out: String,
    diagnostics: Vec<Diagnostic>,
}

impl Pass<'_> {
    fn paragraph(&mut self, paragraph: &Paragraph) {
        for run in &paragraph.runs {
            let html = match (paragraph.kind, run) {
                (Some(kind), Run::Text(text)) => pre_span(kind, text),
                _ => self.run(run),
            };
            self.out.push_str(&html);
        }
    }

    fn table(&mut self, table: &Table) {
        self.out
            .push_str(&format!("<table class=\"{}\">\n", table.form.as_str()));
        for row in &table.rows {
            self.out.push_str("<tr>");
            for cell in row {
                let html = self.cell(cell);
                self.out.push_str("<td>");
                self.out.push_str(&html);
                self.out.push_str("</td>");
            }
            self.out.push_str("</tr>\n");
        }
        self.out.push_str("</table>\n");
    }

    /// Soft breaks join lines with a space, whitespace runs fold to a single
    /// space and hard breaks become `<br>`.
    fn cell(&mut self, cell: &Cell) -> String {
        let mut segments = vec![String::new()];
        for run in cell {
            match run {
                Run::LineBreak(b) if b.hard => segments.push(String::new()),
                Run::LineBreak(_) => push_segment(&mut segments, " "),
                other => {
                    let html = self.run(other);
                    push_segment(&mut segments, &html);
                }
            }
        }
        segments
            .iter()
            .map(|s| collapse_whitespace(s))
            .collect::<Vec<_>>()
            .join("<br>")
    }

    fn run(&mut self, run: &Run) -> String {
        match run {
            Run::Text(text) => encode_text(text).into_owned(),
            Run::Link {
                tag, style, display, ..
            } => self.link(tag, *style, display),
            Run::Anchor { tag } => format!(
                r#"<a name="{}" class="t">{}</a>"#,
                fragment(tag),
                encode_text(tag)
            ),
            Run::Emphasis { kind, text } => self.emphasis(*kind, text),
            Run::LineBreak(_) => "\n".to_string(),
        }
    }

    fn link(&self, tag: &str, style: LinkStyle, display: &str) -> String {
        let requested = (style == LinkStyle::Link).then_some(LinkStyle::Link);
        if display == tag {
            return self.registry.render_link(tag, requested);
        }
        match self.registry.resolve(tag) {
            Some(entry) => format!(
                r#"<a href="{}" class="{}">{}</a>"#,
                entry.markup(tag).href,
                style.css_class(),
                encode_text(display)
            ),
            None => format!(
                r#"<span class="{}">{}</span>"#,
                style.css_class(),
                encode_text(display)
            ),
        }
    }

    fn emphasis(&mut self, kind: TokenKind, text: &str) -> String {
        if let Some(pre) = PreKind::from_token(kind) {
            return pre_span(pre, text);
        }
        match kind {
            TokenKind::Note => format!(r#"<span class="n">{}</span>"#, encode_text(text)),
            TokenKind::Url => format!(
                r#"<a class="u" href="{}">{}</a>"#,
                encode_double_quoted_attribute(text),
                encode_text(text)
            ),
            TokenKind::Pipe | TokenKind::Opt | TokenKind::Ctrl | TokenKind::Special => {
                let css = LinkStyle::requested_by(kind).map_or("d", LinkStyle::css_class);
                format!(r#"<span class="{css}">{}</span>"#, encode_text(text))
            }
            other => {
                self.diagnostics.push(Diagnostic::new(
                    self.filename,
                    0,
                    text,
                    DiagnosticKind::UnrecognizedToken(other.as_str().to_string()),
                ));
                encode_text(text).into_owned()
            }
        }
    }
}

fn pre_span(kind: PreKind, text: &str) -> String {
    match kind {
        PreKind::Header => format!(r#"<span class="h">{}</span>"#, encode_text(text)),
        PreKind::Ruler => format!(r#"<span class="h">{text}</span>"#),
        PreKind::Graphic => encode_text(text).into_owned(),
        PreKind::Example => format!(r#"<span class="e">{}</span>"#, encode_text(text)),
        PreKind::Section => format!(r#"<span class="c">{text}</span>"#),
        PreKind::Title => format!(r#"<span class="i">{}</span>"#, encode_text(text)),
    }
}

fn push_segment(segments: &mut [String], html: &str) {
    if let Some(last) = segments.last_mut() {
        last.push_str(html);
    }
}

/// Every whitespace run, edges included, becomes one space.
fn collapse_whitespace(s: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("invalid whitespace regex"))
        .replace_all(s, " ")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::building::{BuildOptions, Builder};
    use crate::models::LineBreak;
    use crate::scanning::{ScanRules, scan};
    use insta::assert_snapshot;

    fn registry() -> Registry {
        Registry::load([
            "window\twindows.txt",
            "'ts'\toptions.txt",
            "windows.txt\twindows.txt",
            "foo\tindex.txt",
        ])
    }

    fn html(registry: &Registry, lines: &[&str]) -> Rendered {
        let tokens = scan(&ScanRules::default(), "test.txt", lines);
        let built = Builder::build(registry, BuildOptions::default(), tokens);
        HtmlRenderer::new(registry).render(&built.document)
    }

    #[test]
    fn test_scenario_line() {
        let r = registry();
        let out = html(&r, &["Use CTRL-W to split *win-split* see |window|"]);
        assert_snapshot!(out.output.trim_end(), @r#"Use <span class="k">CTRL-W</span> to split <a name="win-split" class="t">win-split</a> see <a href="windows.txt.html#window" class="l">window</a>"#);
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_preformatted_spans() {
        let r = registry();
        let out = html(&r, &["Intro~", "See: >", "  if a < b", "<done"]);
        assert_eq!(
            out.output,
            "<span class=\"h\">Intro</span>\nSee: \n<span class=\"e\">  if a &lt; b</span>\ndone\n"
        );
    }

    #[test]
    fn test_known_option_and_whole_file_link() {
        let r = registry();
        let out = html(&r, &["set 'ts' in |windows.txt|"]);
        assert_eq!(
            out.output,
            "set <a href=\"options.txt.html#%27ts%27\" class=\"o\">'ts'</a> in \
             <a href=\"windows.txt.html\" class=\"l\">windows.txt</a>\n"
        );
    }

    #[test]
    fn test_unknown_pipe_becomes_span() {
        let r = registry();
        let out = html(&r, &["|nowhere|"]);
        assert_eq!(out.output, "<span class=\"l\">nowhere</span>\n");
    }

    #[test]
    fn test_retargeted_link_shows_display_text() {
        let r = registry();
        let pass = HtmlRenderer::new(&r);
        let doc = Document {
            filename: "index.txt".into(),
            blocks: vec![Block::Paragraph(Paragraph {
                kind: None,
                runs: vec![Run::Link {
                    tag: "foo".into(),
                    style: LinkStyle::Link,
                    display: "bar".into(),
                    file: "index.txt".into(),
                }],
            })],
        };
        assert_eq!(
            pass.render(&doc).output,
            r#"<a href="index.txt.html#foo" class="l">bar</a>"#
        );
    }

    #[test]
    fn test_unexpected_emphasis_is_reported() {
        let r = registry();
        let doc = Document {
            filename: "a.txt".into(),
            blocks: vec![Block::Paragraph(Paragraph {
                kind: None,
                runs: vec![Run::Emphasis {
                    kind: TokenKind::Chars,
                    text: "a&b".into(),
                }],
            })],
        };
        let out = HtmlRenderer::new(&r).render(&doc);
        assert_eq!(out.output, "a&amp;b");
        assert_eq!(
            out.diagnostics[0].kind,
            DiagnosticKind::UnrecognizedToken("chars".into())
        );
    }

    #[test]
    fn test_table_cells_fold_whitespace() {
        let r = registry();
        let soft = Run::LineBreak(LineBreak::soft());
        let hard = Run::LineBreak(LineBreak::hard());
        let doc = Document {
            filename: "a.txt".into(),
            blocks: vec![Block::Table(Table {
                markup: "table:ref 1:command 20:desc".into(),
                form: crate::building::TableForm::Ref,
                attributes: vec![],
                columns: vec![],
                rows: vec![vec![
                    vec![Run::Text(":s   ".into()), hard.clone(), Run::Text(":x".into()), hard],
                    vec![
                        Run::Text("one  ".into()),
                        soft.clone(),
                        Run::Text("   two".into()),
                        soft,
                    ],
                ]],
            })],
        };
        assert_eq!(
            HtmlRenderer::new(&r).render(&doc).output,
            "<table class=\"ref\">\n<tr><td>:s <br>:x<br></td><td>one two </td></tr>\n</table>\n"
        );
    }
}
