use crate::models::LinkStyle;
use crate::scanning::patterns::{ctrl_word, opt_word, special_word};

/// Picks the display style of a registered tag from its spelling.
///
/// The option, keystroke and special-bracket patterns are tried in that
/// order against the start of the tag; anything else is `Hidden`.
pub fn classify(tag: &str) -> LinkStyle {
    if opt_word().is_match(tag) {
        LinkStyle::Option
    } else if ctrl_word().is_match(tag) {
        LinkStyle::Ctrl
    } else if special_word().is_match(tag) {
        LinkStyle::Special
    } else {
        LinkStyle::Hidden
    }
}
