//! Row and column inference for tables.
//!
//! While a table is open every token is buffered together with its column.
//! When it closes the buffer is cut into rows by the form's row-start rule
//! and each token lands in the column whose start is closest to its left.

use super::directive::{TableDirective, TableForm};
use crate::models::{Row, Run, Table, plain_content, push_run};
use crate::scanning::{Token, TokenCategory, TokenKind};

/// A token held back while its table is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffered {
    pub kind: TokenKind,
    pub run: Run,
    pub column: i32,
}

impl Buffered {
    fn is_eol(&self) -> bool {
        self.kind.is_eol()
    }

    /// Non-empty text made only of whitespace; line ends count as blank.
    fn is_blank(&self) -> bool {
        match &self.run {
            Run::Text(s) => !s.is_empty() && s.chars().all(char::is_whitespace),
            Run::LineBreak(_) => true,
            _ => false,
        }
    }
}

#[derive(Debug)]
pub struct TableInProgress {
    pub directive: TableDirective,
    /// Source line of the opening directive.
    pub line: i32,
    buffer: Vec<Buffered>,
}

impl TableInProgress {
    pub fn new(directive: TableDirective, line: i32) -> Self {
        Self {
            directive,
            line,
            buffer: vec![],
        }
    }

    pub fn form(&self) -> TableForm {
        self.directive.form
    }

    /// Whether `token` ends the table before it is buffered.
    pub fn closes_on(&self, token: &Token) -> bool {
        match self.form() {
            TableForm::Simple | TableForm::Index => matches!(
                token.category(),
                TokenCategory::Pre | TokenCategory::Eof
            ) || token.kind == TokenKind::BlankLine,
            TableForm::Ref => {
                token.kind == TokenKind::Eof || token.kind == TokenKind::Ruler
            }
        }
    }

    pub fn push(&mut self, kind: TokenKind, run: Run, column: i32) {
        self.buffer.push(Buffered { kind, run, column });
    }

    pub fn build(self) -> Table {
        let rows = RowResolver::new(&self.directive, &self.buffer).resolve();
        let TableDirective {
            markup,
            form,
            attributes,
            columns,
        } = self.directive;
        Table {
            markup,
            form,
            attributes,
            columns,
            rows,
        }
    }
}

struct RowResolver<'a> {
    form: TableForm,
    starts: Vec<i32>,
    buffer: &'a [Buffered],
    after_blank_line: bool,
    /// Last buffer index already examined by the ref rule.
    checked: Option<usize>,
    extra_or: Option<usize>,
}

impl<'a> RowResolver<'a> {
    fn new(directive: &TableDirective, buffer: &'a [Buffered]) -> Self {
        Self {
            form: directive.form,
            starts: directive.columns.iter().map(|c| c.start_column()).collect(),
            buffer,
            after_blank_line: false,
            checked: None,
            extra_or: directive.columns.iter().position(|c| c.has_label("extra-or")),
        }
    }

    fn resolve(mut self) -> Vec<Row> {
        let width = self.starts.len();
        let mut rows = vec![];
        let mut current: Option<Row> = None;

        for idx in 0..self.buffer.len() {
            if self.starts_row(idx, current.as_ref())
                && let Some(row) = current.take()
            {
                rows.push(row);
            }
            let row = current.get_or_insert_with(|| vec![Vec::new(); width]);

            let token = &self.buffer[idx];
            if token.is_eol() {
                for cell in row.iter_mut() {
                    push_run(cell, token.run.clone());
                }
            } else {
                push_run(&mut row[self.column_index(token.column)], token.run.clone());
            }
            self.after_blank_line = token.kind == TokenKind::BlankLine;
        }
        rows.extend(current);
        rows
    }

    /// Greatest column whose start is at or left of `column`.
    fn column_index(&self, column: i32) -> usize {
        column_index(&self.starts, column)
    }

    fn starts_row(&mut self, idx: usize, current: Option<&Row>) -> bool {
        match self.form {
            TableForm::Simple => self.starts_simple_row(idx),
            TableForm::Index => self.starts_simple_row(idx) || self.starts_index_row(idx),
            TableForm::Ref => self.starts_ref_row(idx, current),
        }
    }

    fn starts_simple_row(&self, idx: usize) -> bool {
        let token = &self.buffer[idx];
        token.column == self.starts[0] && !token.is_blank()
    }

    /// A token at column 0 directly followed by one in the second column.
    fn starts_index_row(&self, idx: usize) -> bool {
        let token = &self.buffer[idx];
        if token.column != 0 || token.is_eol() {
            return false;
        }
        match self.buffer.get(idx + 1) {
            Some(next) => !next.is_eol() && self.column_index(next.column) == 1,
            None => false,
        }
    }

    /// A reference entry starts on a line holding an anchor, or on a line
    /// that begins in the first column right after a blank line. A line that
    /// follows an "or" in the extra-or column continues the entry.
    fn starts_ref_row(&mut self, idx: usize, current: Option<&Row>) -> bool {
        if self.checked.is_some_and(|checked| idx <= checked) {
            return false;
        }

        let mut new_entry_ok = true;
        if let (Some(or_col), Some(row)) = (self.extra_or, current) {
            let content = plain_content(&row[or_col]);
            let lines: Vec<&str> = content.split('\n').collect();
            if lines.len() > 1 && lines[lines.len() - 2].trim() == "or" {
                new_entry_ok = false;
            }
        }

        let mut new_entry = false;
        let mut i = idx;
        while let Some(token) = self.buffer.get(i) {
            if token.is_eol() {
                break;
            }
            if new_entry_ok {
                let starts_line = match &token.run {
                    Run::Text(s) => s.chars().next().is_some_and(|c| !c.is_whitespace()),
                    _ => true,
                };
                if matches!(token.run, Run::Anchor { .. })
                    || (token.column == self.starts[0] && self.after_blank_line && starts_line)
                {
                    new_entry = true;
                }
            }
            i += 1;
        }
        self.checked = Some(i);
        new_entry
    }
}

/// Index of the greatest start that is `<= column`, or 0 when `column` is
/// left of every start.
pub fn column_index(starts: &[i32], column: i32) -> usize {
    starts.iter().rposition(|&s| s <= column).unwrap_or(0)
}
