use insta::assert_snapshot;
use pretty_assertions::assert_eq;
use rstest::rstest;
use vimhelp_engine::building::{TableDirective, TableForm, column_index};
use vimhelp_engine::models::{LineBreak, LinkStyle, Run};
use vimhelp_engine::render::{text, xml};
use vimhelp_engine::{BuildOptions, Converter, Registry, ScanRules, read_lines, read_tags};

fn fixture_path(name: &str) -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn converter() -> Converter {
    let registry = read_tags(&fixture_path("tags")).unwrap();
    Converter::new(registry, ScanRules::default(), BuildOptions::default())
}

fn sample() -> Vec<String> {
    read_lines(&fixture_path("sample.txt")).unwrap()
}

#[test]
fn fixture_round_trips_to_text() {
    let lines = sample();
    let out = converter().to_text("sample.txt", &lines);
    assert_eq!(out.output, lines.join("\n") + "\n");
    assert!(out.diagnostics.is_empty());
}

#[test]
fn fixture_round_trips_through_xml() {
    let lines = sample();
    let conv = converter();
    let xml_out = conv.to_xml("sample.txt", &lines).output;
    let parsed = xml::parse(&xml_out).unwrap();
    assert!(parsed.diagnostics.is_empty());
    assert_eq!(text::render(&parsed.document), lines.join("\n") + "\n");
}

#[test]
fn output_is_deterministic() {
    let lines = sample();
    let first = converter();
    let second = converter();
    assert_eq!(
        first.to_html("sample.txt", &lines),
        second.to_html("sample.txt", &lines)
    );
    assert_eq!(
        first.to_xml("sample.txt", &lines),
        first.to_xml("sample.txt", &lines)
    );
}

#[test]
fn rendering_tracks_referenced_tags() {
    let lines = sample();
    let conv = converter();
    conv.to_html("sample.txt", &lines);
    // anchors define tags, they do not reference them
    assert_eq!(
        conv.registry().unreferenced(),
        vec!["i_CTRL-@", "sample", "sample-INTRO", "sample.txt", "win-split"]
    );
}

#[rstest]
#[case(20, 1)]
#[case(40, 3)]
#[case(0, 0)]
fn column_assignment_is_monotonic(#[case] column: i32, #[case] expected: usize) {
    let (directive, problems) = TableDirective::parse("table 1 17 33 36");
    assert!(problems.is_empty());
    let starts: Vec<i32> = directive
        .columns
        .iter()
        .map(|c| c.start_column())
        .collect();
    assert_eq!(column_index(&starts, column), expected);
}

#[test]
fn index_table_folds_tag_into_command() {
    let lines = [
        "#*#table:form=index 1:tag 17:command 33:opt:note 36:desc#*#",
        "|i_CTRL-@|      CTRL-@             insert previously inserted text",
        "",
        "after",
    ];
    let conv = converter();
    let built = conv.convert("index.txt", &lines);
    assert!(built.diagnostics.is_empty());

    let table = built.document.tables().next().unwrap();
    assert_eq!(table.form, TableForm::Index);
    assert_eq!(table.rows.len(), 1);
    let row = &table.rows[0];
    assert_eq!(row.len(), 3);
    assert_eq!(
        row[0],
        vec![Run::Link {
            tag: "i_CTRL-@".into(),
            style: LinkStyle::Link,
            display: "CTRL-@".into(),
            file: "insert.txt".into(),
        }]
    );

    let html = conv.to_html("index.txt", &lines).output;
    assert_snapshot!(html.trim_end(), @r#"
    <table class="index">
    <tr><td><a href="insert.txt.html#i_CTRL-%40" class="l">CTRL-@</a></td><td> </td><td>insert previously inserted text </td></tr>
    </table>

    after
    "#);
}

#[test]
fn ref_table_or_line_continues_entry() {
    let lines = [
        "#*#table:ref 1:command 10:extra-or 20:desc#*#",
        ":abc     or        *:abc*",
        ":xyz               *:xyz*",
        "                   Does abc.",
    ];
    let built = converter().convert("ref.txt", &lines);
    let table = built.document.tables().next().unwrap();
    assert_eq!(table.rows.len(), 1);

    let hard = Run::LineBreak(LineBreak::hard());
    assert_eq!(
        table.rows[0][0],
        vec![
            Run::Anchor { tag: ":abc".into() },
            hard.clone(),
            Run::Anchor { tag: ":xyz".into() },
            hard,
        ]
    );
    // the extra-or column is gone, anchors come first
    assert_eq!(table.rows[0].len(), 3);
    assert!(built.diagnostics.is_empty());
}

#[test]
fn unknown_tags_render_without_links() {
    let registry = Registry::default();
    assert_eq!(registry.render_link("nonexistent-tag", None), "nonexistent-tag");
    assert_eq!(
        registry.render_link("<nope>", Some(LinkStyle::Option)),
        r#"<span class="o">&lt;nope&gt;</span>"#
    );
}

#[test]
fn scenario_line() {
    let registry = Registry::load(["window\twindows.txt"]);
    let conv = Converter::new(registry, ScanRules::default(), BuildOptions::default());
    let lines = ["Use CTRL-W to split *win-split* see |window|"];

    let built = conv.convert("a.txt", &lines);
    let vimhelp_engine::Block::Paragraph(p) = &built.document.blocks[0] else {
        panic!("expected a paragraph");
    };
    assert_eq!(p.runs[0], Run::Text("Use ".into()));
    assert_eq!(
        p.runs[3],
        Run::Anchor {
            tag: "win-split".into()
        }
    );

    let html = conv.to_html("a.txt", &lines).output;
    assert!(html.contains(r#"<a name="win-split" class="t">win-split</a>"#));
    assert!(html.contains(r#"<a href="windows.txt.html#window" class="l">window</a>"#));
}

#[test]
fn unknown_markup_is_reported_not_fatal() {
    let out = converter().to_html("a.txt", &["#+#frobnicate#+#kept"]);
    assert_eq!(out.output, "kept\n");
    assert_eq!(out.diagnostics.len(), 1);
    assert_eq!(out.diagnostics[0].line, 1);
}
