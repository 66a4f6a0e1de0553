//! Regular expressions of the help-file dialect.
//!
//! Word patterns are anchored with `\A` and applied to the tail of a line
//! starting at the candidate position. The dialect relies on a few
//! look-around conditions the `regex` crate does not support; those are
//! checked by hand in [`ScanRules::match_word`].

use std::sync::OnceLock;

use regex::Regex;

use super::TokenKind;

pub const DEFAULT_TITLE_PATTERN: &str = r"Vim version [0-9.a-z]+|VIM REFERENCE.*";
pub const DEFAULT_TAB_STOP: usize = 8;

/// Line prefix that drops a single line.
pub const SKIP_LINE: &str = "DOC-DEL";
/// Line prefix that starts dropping lines.
pub const START_SKIP: &str = "START-DOC-DEL";
/// Line prefix that ends a dropped region.
pub const STOP_SKIP: &str = "STOP-DOC-DEL";

macro_rules! static_regex {
    ($name:ident, $pattern:expr) => {
        pub(crate) fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).expect(concat!("invalid regex ", stringify!($name))))
        }
    };
}

static_regex!(pipe_word, r"\A\|[#-)!+-~]+\|");
static_regex!(star_word, r"\A\*[#-)!+-~]+\*");
static_regex!(opt_word, r"\A'(?:[a-z]{2,}|t_..)'");
static_regex!(ctrl_word, r"\ACTRL-(?:W_)?(?:[\w\[\]^+-<>=@]|<[A-Za-z]+?>)?");
static_regex!(
    special_word,
    r"\A(?:<.*?>|\{.*?\}|\[(?:range|line|count|offset|\+?cmd|[-+]?num|\+\+opt|arg|arg(?:uments)|ident|addr|group)\])"
);
static_regex!(special_after_space, r"\A\[[-a-z^A-Z0-9_]{2,}\]");
static_regex!(note_word, r"\AN(?:ote|OTE)[sS]?:?");
static_regex!(url_word, r#"\A(?:https?|ftp)://[^'"<> \t]+[a-zA-Z0-9/]"#);
static_regex!(plain_word, r"\A[!#-)+-\{\}~]+");

static_regex!(horizontal_rule, r"\A[-=]{3,}.*[-=]{3}\z");
static_regex!(example_start, r"\A(?:.* )?>\z");
static_regex!(section_heading, r"\A([-A-Z .][-A-Z0-9 .()]*)\s+\*");
static_regex!(markup_directive, r"#\+#(.*?)#\+#|#\*#(.*?)#\*#");
static_regex!(deleted_chars, r"#-#.*?#-#");
static_regex!(tag_line, r"\A(\S+)\s+(\S+)");

fn default_title() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile_title(DEFAULT_TITLE_PATTERN).expect("invalid default title regex"))
}

fn compile_title(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"\A(?:{pattern})"))
}

/// Per-batch scanning configuration.
#[derive(Debug, Clone)]
pub struct ScanRules {
    title: Regex,
    tab_stop: usize,
}

impl Default for ScanRules {
    fn default() -> Self {
        Self {
            title: default_title().clone(),
            tab_stop: DEFAULT_TAB_STOP,
        }
    }
}

impl ScanRules {
    /// Builds rules with an optional replacement for the title pattern.
    pub fn new(title_pattern: Option<&str>, tab_stop: usize) -> Result<Self, regex::Error> {
        let title = match title_pattern {
            Some(pattern) => compile_title(pattern)?,
            None => default_title().clone(),
        };
        Ok(Self { title, tab_stop })
    }

    pub fn tab_stop(&self) -> usize {
        self.tab_stop
    }

    /// Tries the word patterns in priority order at byte offset `pos` of
    /// `line`; returns the kind and byte length of the first that matches.
    pub fn match_word(&self, line: &str, pos: usize) -> Option<(TokenKind, usize)> {
        let rest = &line[pos..];
        let prev = line[..pos].chars().next_back();

        if pos == 0 {
            if line.ends_with('~') {
                return Some((TokenKind::Header, line.len()));
            }
            if line.ends_with(" `") {
                return Some((TokenKind::Graphic, line.len()));
            }
        }

        if prev != Some('\\')
            && let Some(m) = pipe_word().find(rest)
        {
            return Some((TokenKind::Pipe, m.end()));
        }
        if let Some(m) = star_word().find(rest) {
            let next = rest[m.end()..].chars().next();
            if next.is_none_or(char::is_whitespace) {
                return Some((TokenKind::Star, m.end()));
            }
        }
        if let Some(m) = opt_word().find(rest) {
            return Some((TokenKind::Opt, m.end()));
        }
        if let Some(m) = ctrl_word().find(rest) {
            return Some((TokenKind::Ctrl, m.end()));
        }
        if let Some(m) = special_word().find(rest) {
            return Some((TokenKind::Special, m.end()));
        }
        if prev.is_some_and(char::is_whitespace)
            && let Some(m) = special_after_space().find(rest)
        {
            return Some((TokenKind::Special, m.end()));
        }
        if let Some(m) = self.title.find(rest).filter(|m| !m.is_empty()) {
            return Some((TokenKind::Title, m.end()));
        }

        let tail = [
            (TokenKind::Note, note_word()),
            (TokenKind::Url, url_word()),
            (TokenKind::Word, plain_word()),
        ];
        tail.into_iter()
            .find_map(|(kind, re)| re.find(rest).map(|m| (kind, m.end())))
    }
}

/// Strips the delimiters a token kind carries in the source.
pub fn trim_token(kind: TokenKind, text: &str) -> &str {
    match kind {
        TokenKind::Pipe | TokenKind::Star => &text[1..text.len() - 1],
        TokenKind::Header => &text[..text.len() - 1],
        TokenKind::Graphic => &text[..text.len() - 2],
        _ => text,
    }
}
