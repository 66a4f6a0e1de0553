//! Column fixups run on a table after its rows are built.
//!
//! - `index`: the pipe link in the `tag` column is folded into the `command`
//!   column and the tag column is dropped.
//! - `ref`: command line breaks become hard breaks, and the anchors that open
//!   the `desc` column move into a new first column.

use super::directive::TableForm;
use crate::diagnostic::DiagnosticKind;
use crate::models::{Cell, LinkStyle, Run, Table, plain_content, push_run};

pub fn apply(table: &mut Table) -> Vec<DiagnosticKind> {
    match table.form {
        TableForm::Index => fix_index(table),
        TableForm::Ref => fix_ref(table),
        TableForm::Simple => vec![],
    }
}

fn fix_index(table: &mut Table) -> Vec<DiagnosticKind> {
    let (Some(tag_idx), Some(command_idx)) = (table.find_column("tag"), table.find_column("command"))
    else {
        return vec![];
    };

    let mut problems = vec![];
    for row in &mut table.rows {
        let link = row[tag_idx].iter().find(|run| !run.is_text());
        let Some(Run::Link {
            tag,
            style: LinkStyle::Link,
            file,
            ..
        }) = link
        else {
            problems.push(DiagnosticKind::IndexRowWithoutPipeLink);
            continue;
        };
        let retargeted = Run::Link {
            tag: tag.clone(),
            style: LinkStyle::Link,
            display: plain_content(&row[command_idx]).trim().to_string(),
            file: file.clone(),
        };
        row[command_idx] = vec![retargeted];
        row.remove(tag_idx);
    }
    problems
}

fn fix_ref(table: &mut Table) -> Vec<DiagnosticKind> {
    let command_idx = table.find_column("command");
    let desc_idx = table.find_column("desc");
    let extra_or_idx = table.find_column("extra-or");

    if let Some(idx) = command_idx {
        for row in &mut table.rows {
            harden_command_breaks(&mut row[idx]);
        }
    }

    let mut problems = vec![];
    if let Some(idx) = desc_idx {
        for row in &mut table.rows {
            let (anchors, orphaned) = split_leading_anchors(&mut row[idx]);
            if orphaned {
                problems.push(DiagnosticKind::RefRowWithoutAnchor);
            }
            if let Some(or_idx) = extra_or_idx {
                row.remove(or_idx);
            }
            row.insert(0, anchors);
        }
    }
    problems
}

/// Marks a break hard when the text since the previous break has
/// non-whitespace content.
fn harden_command_breaks(cell: &mut Cell) {
    let mut since = String::new();
    for run in cell.iter_mut() {
        match run {
            Run::LineBreak(b) => {
                if since.chars().any(|c| !c.is_whitespace()) {
                    b.hard = true;
                }
                since.clear();
            }
            other => since.push_str(other.content()),
        }
    }
}

/// Moves the anchors that open a description, and the breaks that end
/// their lines, out of `desc`.
///
/// Returns the moved runs and whether non-anchor content was found where
/// anchors were expected.
fn split_leading_anchors(desc: &mut Cell) -> (Cell, bool) {
    let Some(first) = desc.iter().position(|run| !run.is_text()) else {
        return (vec![], false);
    };

    let mut seen: String = plain_content(&desc[..first]);
    let mut saw_anchor = false;
    let mut any_anchor = false;
    let mut last_moved = None;

    let mut i = first;
    while i < desc.len() {
        let tail_end = desc[i + 1..]
            .iter()
            .position(|run| !run.is_text())
            .map_or(desc.len(), |p| i + 1 + p);
        let tail = plain_content(&desc[i + 1..tail_end]);

        match &mut desc[i] {
            Run::Anchor { .. } => {
                saw_anchor = true;
                any_anchor = true;
                seen.push_str(&tail);
            }
            Run::LineBreak(b) => {
                if saw_anchor {
                    b.hard = true;
                    saw_anchor = false;
                }
                seen = tail;
            }
            other => {
                seen.push_str(other.content());
                seen.push_str(&tail);
            }
        }

        if seen.chars().any(|c| !c.is_whitespace()) {
            if matches!(desc[i], Run::LineBreak(b) if b.hard) {
                last_moved = Some(i);
            }
            break;
        }
        last_moved = Some(i);
        i = tail_end;
    }

    let Some(last) = last_moved else {
        return (vec![], false);
    };
    if !any_anchor {
        return (vec![], true);
    }

    let moved: Cell = desc.drain(first..=last).collect();
    let rest = std::mem::take(desc);
    for run in rest {
        push_run(desc, run);
    }
    (moved, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::building::directive::TableDirective;
    use crate::models::LineBreak;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> Run {
        Run::Text(s.to_string())
    }

    fn nl() -> Run {
        Run::LineBreak(LineBreak::soft())
    }

    fn br() -> Run {
        Run::LineBreak(LineBreak::hard())
    }

    fn anchor(tag: &str) -> Run {
        Run::Anchor { tag: tag.to_string() }
    }

    fn table(markup: &str, rows: Vec<Vec<Cell>>) -> Table {
        let (d, _) = TableDirective::parse(markup);
        Table {
            markup: d.markup,
            form: d.form,
            attributes: d.attributes,
            columns: d.columns,
            rows,
        }
    }

    fn pipe_link(tag: &str) -> Run {
        Run::Link {
            tag: tag.to_string(),
            style: LinkStyle::Link,
            display: tag.to_string(),
            file: "index.txt".to_string(),
        }
    }

    #[test]
    fn test_index_folds_tag_link_into_command() {
        let mut t = table(
            "table:form=index 1:tag 17:command 36:desc",
            vec![vec![
                vec![pipe_link("foo"), nl()],
                vec![text("bar  "), nl()],
                vec![text("does bar"), nl()],
            ]],
        );
        let problems = apply(&mut t);
        assert!(problems.is_empty());
        assert_eq!(
            t.rows,
            vec![vec![
                vec![Run::Link {
                    tag: "foo".into(),
                    style: LinkStyle::Link,
                    display: "bar".into(),
                    file: "index.txt".into(),
                }],
                vec![text("does bar"), nl()],
            ]]
        );
    }

    #[test]
    fn test_index_row_without_pipe_link_is_kept() {
        let row = vec![vec![text("x"), nl()], vec![text("bar"), nl()]];
        let mut t = table("table:form=index 1:tag 17:command", vec![row.clone()]);
        let problems = apply(&mut t);
        assert_eq!(problems, vec![DiagnosticKind::IndexRowWithoutPipeLink]);
        assert_eq!(t.rows, vec![row]);
    }

    #[test]
    fn test_command_breaks_harden_after_text() {
        let mut cell = vec![text(":s"), nl(), text("   "), nl(), text("x"), nl()];
        harden_command_breaks(&mut cell);
        assert_eq!(cell, vec![text(":s"), br(), text("   "), nl(), text("x"), br()]);
    }

    #[test]
    fn test_desc_anchors_move_to_new_column() {
        let mut desc = vec![
            text(" "),
            anchor("a"),
            text(" "),
            anchor("b"),
            nl(),
            text("   Does things."),
            nl(),
        ];
        let (anchors, orphaned) = split_leading_anchors(&mut desc);
        assert!(!orphaned);
        assert_eq!(anchors, vec![anchor("a"), text(" "), anchor("b"), br()]);
        assert_eq!(desc, vec![text("    Does things."), nl()]);
    }

    #[test]
    fn test_desc_without_anchor_is_reported() {
        let mut desc = vec![nl(), text("  "), nl(), text("plain"), nl()];
        let before = desc.clone();
        let (anchors, orphaned) = split_leading_anchors(&mut desc);
        assert!(anchors.is_empty());
        assert!(orphaned);
        assert_eq!(desc, before);
    }

    #[test]
    fn test_ref_fixup_reorders_columns() {
        let mut t = table(
            "table:ref 1:command 10:extra-or 20:desc",
            vec![vec![
                vec![text("dd"), nl()],
                vec![nl()],
                vec![anchor("dd"), nl(), text("delete"), nl()],
            ]],
        );
        let problems = apply(&mut t);
        assert!(problems.is_empty());
        assert_eq!(
            t.rows,
            vec![vec![
                vec![anchor("dd"), br()],
                vec![text("dd"), br()],
                vec![text("delete"), nl()],
            ]]
        );
    }
}
