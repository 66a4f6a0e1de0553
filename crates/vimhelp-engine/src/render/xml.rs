//! Lossless XML form of a document.
//!
//! ```xml
//! <vimhelp filename="intro.txt">
//! <p>see <link t="pipe" filename="windows.txt" linkto="window">window</link><nl/>
//! </p>
//! <pre t="example">  :help<nl eg="&lt;"/>
//! </pre>
//! <table markup="table:ref 1:command 20:desc" form="ref"><tr><td>...</td></tr></table>
//! </vimhelp>
//! ```
//!
//! Each `<nl/>` or `<br/>` is followed by a newline for readability; the
//! reader drops it again. Characters XML 1.0 cannot carry, such as the form
//! feeds between help sections, are written as `<c v="12"/>`; inside
//! attributes they become U+FFFD. A table keeps its directive text, from which the
//! reader recovers its form, attributes and columns.

use html_escape::{encode_double_quoted_attribute, encode_text};
use roxmltree::Node;

use crate::building::TableDirective;
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::models::{
    Block, Cell, Document, LineBreak, LinkStyle, Paragraph, PreKind, Row, Run, Table, push_run,
};
use crate::scanning::TokenKind;

const ROOT: &str = "vimhelp";

#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    #[error("XML parsing error: {0}")]
    Parse(#[from] roxmltree::Error),
    #[error("root element is <{0}>, expected <vimhelp>")]
    UnexpectedRoot(String),
}

/// A document read back from XML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    pub document: Document,
    pub diagnostics: Vec<Diagnostic>,
}

pub fn render(document: &Document) -> String {
    let mut out = format!(
        "<{ROOT} filename=\"{}\">\n",
        attribute(&document.filename)
    );
    for block in &document.blocks {
        match block {
            Block::Paragraph(p) => {
                match p.kind {
                    Some(kind) => out.push_str(&format!("<pre t=\"{}\">", kind.as_str())),
                    None => out.push_str("<p>"),
                }
                write_runs(&mut out, &p.runs);
                out.push_str(if p.kind.is_some() { "</pre>\n" } else { "</p>\n" });
            }
            Block::Table(t) => write_table(&mut out, t),
        }
    }
    out.push_str(&format!("</{ROOT}>\n"));
    out
}

fn write_table(out: &mut String, table: &Table) {
    let columns: Vec<String> = table
        .columns
        .iter()
        .map(|c| c.start_offset.to_string())
        .collect();
    out.push_str(&format!(
        "<table markup=\"{}\" form=\"{}\" columns=\"{}\">",
        attribute(&table.markup),
        table.form.as_str(),
        columns.join(" ")
    ));
    for row in &table.rows {
        out.push_str("<tr>");
        for cell in row {
            out.push_str("<td>");
            write_runs(out, cell);
            out.push_str("</td>");
        }
        out.push_str("</tr>");
    }
    out.push_str("</table>\n");
}

fn write_runs(out: &mut String, runs: &[Run]) {
    for run in runs {
        match run {
            Run::Text(text) => push_text(out, text),
            Run::Link {
                tag,
                style,
                display,
                file,
            } => {
                out.push_str(&format!(
                    "<link t=\"{}\" filename=\"{}\" linkto=\"{}\">",
                    style.as_str(),
                    attribute(file),
                    attribute(tag)
                ));
                push_text(out, display);
                out.push_str("</link>");
            }
            Run::Anchor { tag } => {
                out.push_str("<anchor t=\"star\">");
                push_text(out, tag);
                out.push_str("</anchor>");
            }
            Run::Emphasis { kind, text } => {
                out.push_str(&format!("<em t=\"{}\">", kind.as_str()));
                push_text(out, text);
                out.push_str("</em>");
            }
            Run::LineBreak(b) => {
                out.push_str(if b.hard { "<br" } else { "<nl" });
                let marks = example_marks(*b);
                if !marks.is_empty() {
                    out.push_str(&format!(" eg=\"{}\"", attribute(&marks)));
                }
                out.push_str("/>\n");
            }
        }
    }
}

/// Tab and newline pass through; carriage returns would be normalized away
/// by the reader.
fn is_plain_xml_char(c: char) -> bool {
    !matches!(
        c,
        '\u{0}'..='\u{8}' | '\u{b}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}'
    )
}

fn push_text(out: &mut String, text: &str) {
    let mut start = 0;
    for (i, c) in text.char_indices() {
        if !is_plain_xml_char(c) {
            out.push_str(&encode_text(&text[start..i]));
            out.push_str(&format!("<c v=\"{}\"/>", u32::from(c)));
            start = i + c.len_utf8();
        }
    }
    out.push_str(&encode_text(&text[start..]));
}

fn attribute(text: &str) -> String {
    let safe: String = text
        .chars()
        .map(|c| {
            if is_plain_xml_char(c) {
                c
            } else {
                char::REPLACEMENT_CHARACTER
            }
        })
        .collect();
    encode_double_quoted_attribute(&safe).into_owned()
}

fn example_marks(b: LineBreak) -> String {
    let mut marks = String::new();
    if b.closes_example {
        marks.push('<');
    }
    if b.opens_example {
        marks.push('>');
    }
    marks
}

/// Reads a document written by [`render`].
pub fn parse(source: &str) -> Result<Parsed, XmlError> {
    let xml = roxmltree::Document::parse(source)?;
    let root = xml.root_element();
    if root.tag_name().name() != ROOT {
        return Err(XmlError::UnexpectedRoot(root.tag_name().name().to_string()));
    }

    let mut reader = Reader {
        document: Document::new(root.attribute("filename").unwrap_or_default()),
        diagnostics: vec![],
    };
    for node in root.children().filter(Node::is_element) {
        reader.block(node);
    }
    Ok(Parsed {
        document: reader.document,
        diagnostics: reader.diagnostics,
    })
}

struct Reader {
    document: Document,
    diagnostics: Vec<Diagnostic>,
}

impl Reader {
    fn block(&mut self, node: Node) {
        let block = match node.tag_name().name() {
            "p" => Block::Paragraph(Paragraph {
                kind: None,
                runs: self.runs(node),
            }),
            "pre" => {
                let t = node.attribute("t").unwrap_or_default();
                let kind = TokenKind::from_name(t).and_then(PreKind::from_token);
                if kind.is_none() {
                    self.unrecognized(t, "");
                }
                Block::Paragraph(Paragraph {
                    kind,
                    runs: self.runs(node),
                })
            }
            "table" => Block::Table(self.table(node)),
            other => {
                self.unrecognized(other, &text_content(node));
                return;
            }
        };
        self.document.blocks.push(block);
    }

    fn table(&mut self, node: Node) -> Table {
        let (directive, _) = TableDirective::parse(node.attribute("markup").unwrap_or_default());
        let rows: Vec<Row> = node
            .children()
            .filter(|n| n.has_tag_name("tr"))
            .map(|tr| {
                tr.children()
                    .filter(|n| n.has_tag_name("td"))
                    .map(|td| self.runs(td))
                    .collect()
            })
            .collect();
        Table {
            markup: directive.markup,
            form: directive.form,
            attributes: directive.attributes,
            columns: directive.columns,
            rows,
        }
    }

    fn runs(&mut self, node: Node) -> Cell {
        let mut runs = vec![];
        let mut after_break = false;
        for child in node.children() {
            if child.is_text() {
                let text = child.text().unwrap_or_default();
                let text = if after_break {
                    text.strip_prefix('\n').unwrap_or(text)
                } else {
                    text
                };
                push_run(&mut runs, Run::Text(text.to_string()));
                after_break = false;
                continue;
            }
            if !child.is_element() {
                continue;
            }
            let name = child.tag_name().name();
            after_break = matches!(name, "nl" | "br");
            let run = match name {
                "nl" | "br" => {
                    let mut b = LineBreak::from_marks(child.attribute("eg").unwrap_or_default());
                    b.hard = name == "br";
                    Run::LineBreak(b)
                }
                "c" => match char_ref(child) {
                    Some(c) => Run::Text(c.to_string()),
                    None => {
                        self.unrecognized("c", "");
                        continue;
                    }
                },
                "link" => self.link(child),
                "anchor" => Run::Anchor {
                    tag: text_content(child),
                },
                "em" => {
                    let t = child.attribute("t").unwrap_or_default();
                    match TokenKind::from_name(t) {
                        Some(kind) => Run::Emphasis {
                            kind,
                            text: text_content(child),
                        },
                        None => {
                            self.unrecognized(t, "");
                            Run::Text(text_content(child))
                        }
                    }
                }
                other => {
                    let text = text_content(child);
                    self.unrecognized(other, &text);
                    Run::Text(text)
                }
            };
            push_run(&mut runs, run);
        }
        runs
    }

    fn link(&mut self, node: Node) -> Run {
        let display = text_content(node);
        let t = node.attribute("t").unwrap_or_default();
        let style = LinkStyle::from_name(t).unwrap_or_else(|| {
            self.unrecognized(t, &display);
            LinkStyle::Hidden
        });
        Run::Link {
            tag: node.attribute("linkto").unwrap_or(&display).to_string(),
            style,
            file: node.attribute("filename").unwrap_or_default().to_string(),
            display,
        }
    }

    fn unrecognized(&mut self, name: &str, text: &str) {
        self.diagnostics.push(Diagnostic::new(
            self.document.filename.clone(),
            0,
            text,
            DiagnosticKind::UnrecognizedToken(name.to_string()),
        ));
    }
}

fn text_content(node: Node) -> String {
    node.descendants()
        .filter_map(|n| {
            if n.has_tag_name("c") {
                char_ref(n).map(String::from)
            } else {
                n.text().filter(|_| n.is_text()).map(str::to_string)
            }
        })
        .collect()
}

fn char_ref(node: Node) -> Option<char> {
    node.attribute("v")?.parse::<u32>().ok().and_then(char::from_u32)
}
