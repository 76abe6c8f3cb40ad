//! A parser and Concrete Syntax Tree (CST) library for Go-shaped source.
//!
//! This crate parses the statically typed, curly-brace language handled by
//! the coverage instrumenter into a CST that preserves all whitespace and
//! comments for round-trip code generation.
//!
//! # Overview
//!
//! - **Parsing**: Parse a source file into a CST with [`parse_file`], or a
//!   single expression with [`parse_expression`].
//! - **Code Generation**: Convert the CST back to source with the
//!   [`Codegen`] trait or the [`to_source`] helper. An unmodified tree
//!   reproduces its input byte-for-byte.
//! - **Node identity**: Every expression and statement carries a [`NodeId`]
//!   assigned in pre-order, so callers can keep side tables about nodes
//!   without holding references into the tree.
//! - **Rendering**: [`render`] and [`render_eq`] produce the normalized
//!   single-line form of an expression used in coverage records.
//!
//! # Quick Start
//!
//! ```
//! use condcov_syntax::{parse_file, to_source};
//!
//! let source = "package main\n\nfunc main() {\n\tprintln(1)\n}\n";
//! let file = parse_file(source).expect("parse error");
//!
//! // Round-trip: convert back to source
//! assert_eq!(to_source(&file), source);
//! ```

use std::cmp::max;

// ============================================================================
// Public modules and re-exports
// ============================================================================

/// Tokenizer with automatic semicolon insertion and trivia capture.
pub mod tokenizer;
pub use tokenizer::{tokenize, Pos, TokError, TokKind, Token};

/// CST node types.
pub mod nodes;
pub use nodes::*;

mod parser;
pub use parser::{ParseError, Parser};

/// Normalized expression rendering for coverage records.
pub mod render;
pub use render::{render, render_eq, render_eq_nil};

use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Any failure while turning source text into a CST.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("{0}")]
    Tokenize(#[from] TokError),
    #[error("{0}")]
    Parse(#[from] ParseError),
}

impl SyntaxError {
    /// The position the failure points at.
    pub fn pos(&self) -> Pos {
        match self {
            SyntaxError::Tokenize(e) => e.pos(),
            SyntaxError::Parse(e) => e.pos,
        }
    }
}

// ============================================================================
// Parsing functions
// ============================================================================

/// Parses a source file into a CST.
///
/// A leading UTF-8 BOM is stripped before tokenizing.
///
/// # Example
///
/// ```
/// use condcov_syntax::parse_file;
///
/// let file = parse_file("package p\n").expect("parse error");
/// assert_eq!(file.package_name(), "p");
/// ```
pub fn parse_file(source: &str) -> Result<decl::File, SyntaxError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let tokens = tokenize(source)?;
    Ok(Parser::new(tokens).parse_file()?)
}

/// Parses a single expression.
///
/// # Example
///
/// ```
/// use condcov_syntax::{parse_expression, render};
///
/// let expr = parse_expression("a &&  b").expect("parse error");
/// assert_eq!(render(&expr), "a && b");
/// ```
pub fn parse_expression(text: &str) -> Result<expr::Expr, SyntaxError> {
    let tokens = tokenize(text)?;
    Ok(Parser::new(tokens).parse_expression_input()?)
}

// ============================================================================
// Error formatting
// ============================================================================

/// Returns the byte offset of the beginning of line `n` (1-indexed).
fn bol_offset(source: &str, n: i32) -> usize {
    if n <= 1 {
        return 0;
    }
    source
        .match_indices('\n')
        .nth((n - 2) as usize)
        .map(|(index, _)| index + 1)
        .unwrap_or_else(|| source.len())
}

/// Formats a syntax error into a human-readable string with source context.
///
/// # Arguments
///
/// * `err` - The error to format.
/// * `source` - The source text the error came from.
/// * `label` - A label for the error (e.g., file name).
pub fn prettify_error(err: &SyntaxError, source: &str, label: &str) -> String {
    use annotate_snippets::{Level, Renderer, Snippet};

    let pos = err.pos();
    let context = 1i32;
    let line = pos.line as i32;
    let line_start = max(1, line - context) as usize;
    let start_offset = bol_offset(source, line - context);
    let end_offset = bol_offset(source, line + context + 1);
    let snippet = &source[start_offset..end_offset];

    let bol = bol_offset(source, line);
    let start = (bol + (pos.col as usize).saturating_sub(1)).saturating_sub(start_offset);
    let start = start.min(snippet.len().saturating_sub(1));
    let end = (start + 1).min(snippet.len());
    let start = start.min(end);

    let message = err.to_string();
    let rendered = Renderer::styled()
        .render(
            Level::Error.title(label).snippet(
                Snippet::source(snippet)
                    .line_start(line_start)
                    .fold(false)
                    .annotations(vec![Level::Error.span(start..end).label(&message)]),
            ),
        )
        .to_string();
    rendered
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_minimal_file() {
        let file = parse_file("package main\n").expect("parse error");
        assert_eq!(file.package_name(), "main");
        assert!(file.decls.is_empty());
    }

    #[test]
    fn strips_bom() {
        let file = parse_file("\u{feff}package main\n").expect("parse error");
        assert_eq!(file.package_name(), "main");
    }

    #[test]
    fn expression_input_rejects_trailing_tokens() {
        assert!(parse_expression("a + b").is_ok());
        assert!(parse_expression("a + b c").is_err());
    }

    #[test]
    fn error_carries_position() {
        let err = parse_file("package main\n\nfunc f( {\n").unwrap_err();
        assert_eq!(err.pos().line, 3);
    }

    #[test]
    fn prettify_mentions_expectation() {
        let source = "package main\n\nfunc f( {\n";
        let err = parse_file(source).unwrap_err();
        let pretty = prettify_error(&err, source, "bad.go");
        assert!(pretty.contains("bad.go"));
        assert!(pretty.contains("expected"));
    }

    #[test]
    fn bol_offset_first_line() {
        assert_eq!(0, bol_offset("hello", 1));
        assert_eq!(0, bol_offset("hello\nhello", 0));
    }

    #[test]
    fn bol_offset_second_line() {
        assert_eq!(6, bol_offset("hello\nhello", 2));
        assert_eq!(6, bol_offset("hello\nhello\nhello", 2));
    }

    #[test]
    fn bol_offset_past_end() {
        assert_eq!(5, bol_offset("hello", 3));
    }
}
