//! Filter-scan regions.
//!
//! Between `#*#filter-scan:ref#*#` and `#*#stop-filter-scan#*#` only lines
//! that reference a registered tag with a pipe link or option word are kept.
//! A region without a stop directive runs to the end of the file.

use super::directive::{Directive, markup_parts, STOP_FILTER_SCAN};
use crate::scanning::{Token, TokenKind};
use crate::tags::Registry;

fn starts_region(token: &Token) -> bool {
    token.kind == TokenKind::Markup
        && matches!(Directive::parse(&token.text), Directive::FilterScan { by_ref: true })
}

fn stops_region(token: &Token) -> bool {
    token.kind == TokenKind::Markup && markup_parts(&token.text).first() == Some(&STOP_FILTER_SCAN)
}

fn is_reference(token: &Token, registry: &Registry) -> bool {
    matches!(token.kind, TokenKind::Pipe | TokenKind::Opt) && registry.contains(&token.text)
}

/// Drops the unreferenced lines of every filter-scan region.
///
/// A line here is every token after the previous line end up to and
/// including its own line end, control tokens included.
pub fn apply(tokens: Vec<Token>, registry: &Registry) -> Vec<Token> {
    if !tokens.iter().any(starts_region) {
        return tokens;
    }

    let mut out = Vec::with_capacity(tokens.len());
    let mut line: Vec<Token> = vec![];
    let mut in_region = false;
    let mut has_link = false;
    let mut dropped = 0usize;

    for token in tokens {
        if !in_region {
            in_region = starts_region(&token);
            out.push(token);
            continue;
        }
        if token.kind == TokenKind::Eof || stops_region(&token) {
            out.append(&mut line);
            out.push(token);
            in_region = false;
            has_link = false;
            continue;
        }

        has_link |= is_reference(&token, registry);
        let ends_line = token.kind.is_eol();
        line.push(token);
        if ends_line {
            if has_link {
                out.append(&mut line);
            } else {
                dropped += 1;
                line.clear();
            }
            has_link = false;
        }
    }
    out.append(&mut line);

    log::debug!("filter-scan dropped {dropped} lines");
    out
}
