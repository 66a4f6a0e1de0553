//! In-line markup directives (`#*#table:form=index 1:tag 17:command#*#`).
//!
//! A directive's first whitespace-separated word holds colon-separated parts;
//! the first part names the command. The remaining words of a `table`
//! directive describe its columns as `OFFSET:label:label`.

use serde::Serialize;

pub const TABLE: &str = "table";
pub const STOP_TABLE: &str = "stop-table";
pub const FILTER_SCAN: &str = "filter-scan";
pub const STOP_FILTER_SCAN: &str = "stop-filter-scan";

/// Row inference and fixup policy of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TableForm {
    #[default]
    Simple,
    Index,
    Ref,
}

impl TableForm {
    pub fn as_str(self) -> &'static str {
        match self {
            TableForm::Simple => "simple",
            TableForm::Index => "index",
            TableForm::Ref => "ref",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "simple" => Some(TableForm::Simple),
            "index" => Some(TableForm::Index),
            "ref" => Some(TableForm::Ref),
            _ => None,
        }
    }
}

/// One column group of a table directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    /// 1-based character offset where the column starts.
    pub start_offset: i32,
    pub labels: Vec<String>,
}

impl ColumnSpec {
    pub fn new(start_offset: i32, labels: &[&str]) -> Self {
        Self {
            start_offset,
            labels: labels.iter().map(|l| l.to_string()).collect(),
        }
    }

    /// 0-based token column of the column start.
    pub fn start_column(&self) -> i32 {
        self.start_offset - 1
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDirective {
    pub markup: String,
    pub form: TableForm,
    pub attributes: Vec<(String, String)>,
    pub columns: Vec<ColumnSpec>,
}

impl TableDirective {
    /// Parses a `table` directive. Column groups that cannot be used are
    /// dropped and described in the returned problem list.
    pub fn parse(markup: &str) -> (Self, Vec<String>) {
        let parts = markup_parts(markup);

        let mut attributes: Vec<(String, String)> = vec![];
        let mut bare_form = None;
        for part in parts.iter().skip(1) {
            match part.split_once('=') {
                Some((key, value)) => {
                    if !attributes.iter().any(|(k, _)| k == key) {
                        attributes.push((key.to_string(), value.to_string()));
                    }
                }
                None => bare_form = bare_form.or(TableForm::from_name(part)),
            }
        }
        let form = attributes
            .iter()
            .find(|(k, _)| k == "form")
            .and_then(|(_, v)| TableForm::from_name(v))
            .or(bare_form)
            .unwrap_or_default();

        let mut problems = vec![];
        let mut columns: Vec<ColumnSpec> = vec![];
        for group in markup.split_whitespace().skip(1) {
            let mut fields = group.split(':');
            let offset = fields.next().unwrap_or_default();
            let Ok(start_offset) = offset.parse::<i32>() else {
                problems.push(format!("column offset {offset:?} is not a number"));
                continue;
            };
            if start_offset < 1 {
                problems.push(format!("column offset {start_offset} is before the line start"));
                continue;
            }
            if let Some(prev) = columns.last()
                && prev.start_offset >= start_offset
            {
                problems.push(format!(
                    "column offset {start_offset} does not follow {}",
                    prev.start_offset
                ));
                continue;
            }
            columns.push(ColumnSpec {
                start_offset,
                labels: fields.map(str::to_string).collect(),
            });
        }
        if columns.is_empty() {
            columns.push(ColumnSpec::new(1, &[]));
        }

        let directive = Self {
            markup: markup.to_string(),
            form,
            attributes,
            columns,
        };
        (directive, problems)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Table(TableDirective, Vec<String>),
    StopTable,
    /// Start of a filter-scan region; `ref` is set when the directive asks
    /// for reference filtering.
    FilterScan { by_ref: bool },
    StopFilterScan,
    Unknown(String),
}

/// Colon-separated parts of a directive's first word.
pub fn markup_parts(markup: &str) -> Vec<&str> {
    markup
        .split_whitespace()
        .next()
        .map(|w| w.split(':').collect())
        .unwrap_or_default()
}

impl Directive {
    pub fn parse(markup: &str) -> Self {
        let parts = markup_parts(markup);
        match parts.first().copied() {
            Some(TABLE) if parts.contains(&STOP_TABLE) => Directive::StopTable,
            Some(TABLE) => {
                let (table, problems) = TableDirective::parse(markup);
                Directive::Table(table, problems)
            }
            Some(FILTER_SCAN) => Directive::FilterScan {
                by_ref: parts.get(1).is_some_and(|p| p.contains("ref")),
            },
            Some(STOP_FILTER_SCAN) => Directive::StopFilterScan,
            _ => Directive::Unknown(markup.to_string()),
        }
    }
}
