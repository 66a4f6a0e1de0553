use std::collections::VecDeque;

use super::patterns::{
    self, ScanRules, START_SKIP, STOP_SKIP, SKIP_LINE, trim_token,
};
use super::tabs::expand_tabs;
use super::token::{Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExamplePhase {
    /// The current line ended with the `>` that opens the block.
    JustEntered,
    Continuing,
}

/// Scanner state carried between physical lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Normal,
    InExample(ExamplePhase),
    /// Dropping lines until the stop sentinel; remembers whether an example
    /// block was open when the region started.
    SkippingToStop { in_example: bool },
}

/// Turns the lines of one document into a token stream.
///
/// The stream opens with `start-file`, gives every kept line a `start-line`
/// token and ends with a single `end-of-file`.
pub struct Scanner<'r, I> {
    rules: &'r ScanRules,
    lines: I,
    filename: String,
    state: ScanState,
    lnum: i32,
    pending: VecDeque<Token>,
    started: bool,
    finished: bool,
}

impl<'r, I, S> Scanner<'r, I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    pub fn new(rules: &'r ScanRules, filename: impl Into<String>, lines: I) -> Self {
        Self {
            rules,
            lines,
            filename: filename.into(),
            state: ScanState::Normal,
            lnum: 0,
            pending: VecDeque::new(),
            started: false,
            finished: false,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    fn scan_line(&mut self, raw: &str) {
        self.lnum += 1;

        if raw.starts_with(SKIP_LINE) {
            return;
        }
        if raw.starts_with(STOP_SKIP) {
            if let ScanState::SkippingToStop { in_example } = self.state {
                self.state = if in_example {
                    ScanState::InExample(ExamplePhase::Continuing)
                } else {
                    ScanState::Normal
                };
            }
            return;
        }
        if matches!(self.state, ScanState::SkippingToStop { .. }) {
            return;
        }
        if raw.starts_with(START_SKIP) {
            self.state = ScanState::SkippingToStop {
                in_example: matches!(self.state, ScanState::InExample(_)),
            };
            return;
        }

        let line_tabs = raw.trim_end_matches(['\r', '\n']);
        let mut line = expand_tabs(line_tabs, self.rules.tab_stop());
        self.emit(TokenKind::StartLine, line.clone(), self.lnum);

        if self.extract_markup(&mut line) {
            return;
        }
        let line = patterns::deleted_chars().replace_all(&line, "").into_owned();

        if line.trim().is_empty() {
            self.pending.push_back(Token::blank_line());
            return;
        }

        if patterns::horizontal_rule().is_match(&line) {
            self.emit(TokenKind::Ruler, line, 0);
            self.pending.push_back(Token::newline(""));
            return;
        }

        let mut line = line;
        let mut col_offset = 0usize;
        let mut marks = String::new();

        if self.state == ScanState::InExample(ExamplePhase::Continuing) {
            if line.starts_with(|c: char| !c.is_whitespace()) {
                self.state = ScanState::Normal;
                if line.starts_with('<') {
                    line.remove(0);
                    col_offset = 1;
                    marks.push('<');
                }
            } else {
                self.emit(TokenKind::Example, line, 0);
                self.pending.push_back(Token::newline(""));
                return;
            }
        }

        if patterns::example_start().is_match(line_tabs) {
            self.state = ScanState::InExample(ExamplePhase::JustEntered);
            line.pop();
            marks.push('>');
        }

        let mut rest = line.as_str();
        if patterns::section_heading().is_match(line_tabs)
            && let Some(heading) = patterns::section_heading()
                .captures(&line)
                .and_then(|caps| caps.get(1))
        {
            self.emit(TokenKind::Section, heading.as_str(), col_offset as i32);
            col_offset += heading.as_str().chars().count();
            rest = &line[heading.end()..];
        }

        let words = self.tokenize(rest, col_offset);
        self.pending.extend(words);
        self.pending.push_back(Token::newline(marks));

        if self.state == ScanState::InExample(ExamplePhase::JustEntered) {
            self.state = ScanState::InExample(ExamplePhase::Continuing);
        }
    }

    /// Removes every markup directive from `line`, left to right, emitting
    /// one token per directive. Returns true when the line must be dropped.
    fn extract_markup(&mut self, line: &mut String) -> bool {
        let mut delete_line = false;
        let mut pos = 0;
        while let Some(caps) = patterns::markup_directive().captures_at(line, pos) {
            let Some(whole) = caps.get(0) else { break };
            let (text, deleting) = match (caps.get(1), caps.get(2)) {
                (Some(m), _) => (m.as_str().to_string(), false),
                (None, Some(m)) => (m.as_str().to_string(), true),
                (None, None) => break,
            };
            let range = whole.range();
            self.emit(TokenKind::Markup, text, 0);
            delete_line |= deleting;
            pos = range.start;
            line.replace_range(range, "");
        }
        delete_line
    }

    fn tokenize(&self, line: &str, col_offset: usize) -> Vec<Token> {
        let mut out = vec![];
        let column = |chars: usize| (chars + col_offset) as i32;

        let (mut last, mut last_col) = (0usize, 0usize);
        let (mut pos, mut col) = (0usize, 0usize);
        while pos < line.len() {
            match self.rules.match_word(line, pos) {
                Some((kind, len)) if len > 0 => {
                    if pos > last {
                        out.push(Token::new(TokenKind::Chars, &line[last..pos], column(last_col)));
                    }
                    let text = &line[pos..pos + len];
                    out.push(Token::new(kind, trim_token(kind, text), column(col)));
                    col += text.chars().count();
                    pos += len;
                    last = pos;
                    last_col = col;
                }
                _ => {
                    pos += line[pos..].chars().next().map_or(1, char::len_utf8);
                    col += 1;
                }
            }
        }
        if last < line.len() {
            out.push(Token::new(TokenKind::Chars, &line[last..], column(last_col)));
        }
        out
    }

    fn emit(&mut self, kind: TokenKind, text: impl Into<String>, column: i32) {
        self.pending.push_back(Token::new(kind, text, column));
    }
}

impl<I, S> Iterator for Scanner<'_, I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if !self.started {
            self.started = true;
            return Some(Token::new(TokenKind::StartFile, self.filename.clone(), 0));
        }
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(token);
            }
            if self.finished {
                return None;
            }
            match self.lines.next() {
                Some(line) => self.scan_line(line.as_ref()),
                None => {
                    self.finished = true;
                    self.pending.push_back(Token::eof());
                }
            }
        }
    }
}

/// Scans a whole document into a token list.
pub fn scan<S: AsRef<str>>(rules: &ScanRules, filename: &str, lines: &[S]) -> Vec<Token> {
    Scanner::new(rules, filename, lines.iter()).collect()
}
