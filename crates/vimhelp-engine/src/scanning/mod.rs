//! # Line Scanning
//!
//! Turns the physical lines of one help file into a flat token stream.
//!
//! - **`token`**: `Token`, `TokenKind` and the coarse `TokenCategory`
//! - **`patterns`**: the dialect's regular expressions and `ScanRules`
//! - **`tabs`**: tab expansion, which fixes every downstream column
//! - **`scanner`**: the per-document state machine (skip regions, example
//!   blocks, markup directives)

pub mod patterns;
pub mod scanner;
pub mod tabs;
pub mod token;

pub use patterns::ScanRules;
pub use scanner::{ExamplePhase, ScanState, Scanner, scan};
pub use token::{NO_COLUMN, Token, TokenCategory, TokenKind};
