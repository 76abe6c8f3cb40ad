//! Tokenizer for Go-shaped source.
//!
//! Tokens carry their exact leading trivia (whitespace and comments), so a
//! token stream printed back in order reproduces the input byte-for-byte.
//! Comments are never tokens; build-constraint and directive comments ride
//! along as trivia and survive rewriting untouched.
//!
//! Automatic semicolon insertion follows the target language's rule: a
//! virtual `Semi` token (empty text) is synthesized at a newline when the
//! previous token can end a statement. Virtual semicolons print as nothing.
//!
//! `//line file:N` directives at the start of a line override the file and
//! line reported for subsequent tokens. The instrumenter uses this to
//! recognize generated code (positions pointing at non-`.go` inputs).

use thiserror::Error;

/// A 1-based source position (line and byte column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pos {
    pub line: u32,
    pub col: u32,
}

impl Pos {
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Token kinds.
///
/// All compound assignment operators (`+=`, `&^=`, ...) share the
/// [`TokKind::OpAssign`] kind; the parser treats them uniformly and the
/// concrete spelling lives in the token text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokKind {
    Ident,
    Int,
    Float,
    Rune,
    Str,
    RawStr,

    // Keywords
    Package,
    Import,
    Func,
    Return,
    Var,
    Const,
    Type,
    Struct,
    Interface,
    Map,
    Chan,
    If,
    Else,
    For,
    Range,
    Switch,
    Case,
    Default,
    Select,
    Break,
    Continue,
    Goto,
    Fallthrough,
    Go,
    Defer,

    // Operators and delimiters
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    Pipe,
    Caret,
    Shl,
    Shr,
    AmpCaret,
    AndAnd,
    OrOr,
    Not,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Assign,
    Define,
    OpAssign,
    Arrow,
    Inc,
    Dec,
    LParen,
    RParen,
    LBrack,
    RBrack,
    LBrace,
    RBrace,
    Comma,
    Semi,
    Colon,
    Dot,
    Ellipsis,

    Eof,
}

impl TokKind {
    /// True for kinds after which a newline inserts a semicolon.
    fn ends_statement(self) -> bool {
        matches!(
            self,
            TokKind::Ident
                | TokKind::Int
                | TokKind::Float
                | TokKind::Rune
                | TokKind::Str
                | TokKind::RawStr
                | TokKind::Break
                | TokKind::Continue
                | TokKind::Fallthrough
                | TokKind::Return
                | TokKind::Inc
                | TokKind::Dec
                | TokKind::RParen
                | TokKind::RBrack
                | TokKind::RBrace
        )
    }

    /// True for the comparison operators `== != < <= > >=`.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            TokKind::EqEq
                | TokKind::NotEq
                | TokKind::Lt
                | TokKind::Le
                | TokKind::Gt
                | TokKind::Ge
        )
    }

    /// True for literal kinds.
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokKind::Int | TokKind::Float | TokKind::Rune | TokKind::Str | TokKind::RawStr
        )
    }
}

/// A lexical token with its leading trivia.
///
/// `leading` holds the exact whitespace and comments between the previous
/// token and this one; printing `leading` then `text` for every token in
/// order reproduces the source. A virtual semicolon has empty `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokKind,
    pub text: String,
    pub leading: String,
    pub pos: Pos,
    /// Overriding file from a `//line` directive, if one is in effect.
    pub file: Option<Box<str>>,
}

impl Token {
    /// A synthesized token with no trivia and a chosen position.
    pub fn synth(kind: TokKind, text: impl Into<String>, pos: Pos) -> Self {
        Self {
            kind,
            text: text.into(),
            leading: String::new(),
            pos,
            file: None,
        }
    }

    /// Replace the leading trivia, for synthesized tokens that need
    /// explicit spacing.
    pub fn with_leading(mut self, leading: impl Into<String>) -> Self {
        self.leading = leading.into();
        self
    }
}

/// Tokenizer errors, each carrying the offending position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokError {
    #[error("{pos}: unterminated string literal")]
    UnterminatedString { pos: Pos },
    #[error("{pos}: unterminated rune literal")]
    UnterminatedRune { pos: Pos },
    #[error("{pos}: unterminated comment")]
    UnterminatedComment { pos: Pos },
    #[error("{pos}: invalid character {ch:?}")]
    InvalidChar { pos: Pos, ch: char },
}

impl TokError {
    pub fn pos(&self) -> Pos {
        match self {
            TokError::UnterminatedString { pos }
            | TokError::UnterminatedRune { pos }
            | TokError::UnterminatedComment { pos }
            | TokError::InvalidChar { pos, .. } => *pos,
        }
    }
}

fn keyword_kind(ident: &str) -> Option<TokKind> {
    Some(match ident {
        "package" => TokKind::Package,
        "import" => TokKind::Import,
        "func" => TokKind::Func,
        "return" => TokKind::Return,
        "var" => TokKind::Var,
        "const" => TokKind::Const,
        "type" => TokKind::Type,
        "struct" => TokKind::Struct,
        "interface" => TokKind::Interface,
        "map" => TokKind::Map,
        "chan" => TokKind::Chan,
        "if" => TokKind::If,
        "else" => TokKind::Else,
        "for" => TokKind::For,
        "range" => TokKind::Range,
        "switch" => TokKind::Switch,
        "case" => TokKind::Case,
        "default" => TokKind::Default,
        "select" => TokKind::Select,
        "break" => TokKind::Break,
        "continue" => TokKind::Continue,
        "goto" => TokKind::Goto,
        "fallthrough" => TokKind::Fallthrough,
        "go" => TokKind::Go,
        "defer" => TokKind::Defer,
        _ => return None,
    })
}

/// Tokenizes a whole file.
pub fn tokenize(src: &str) -> Result<Vec<Token>, TokError> {
    Lexer::new(src).run()
}

struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    offset: usize,
    line: u32,
    col: u32,
    /// Trivia accumulated since the last token.
    pending: String,
    /// Kind of the last emitted significant token, for semicolon insertion.
    last_kind: Option<TokKind>,
    tokens: Vec<Token>,
    /// `//line` override: file and the line to report for the next source line.
    override_file: Option<String>,
    override_delta: i64,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            offset: 0,
            line: 1,
            col: 1,
            pending: String::new(),
            last_kind: None,
            tokens: Vec::new(),
            override_file: None,
            override_delta: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.offset).copied()
    }

    fn peek_at(&self, n: usize) -> Option<u8> {
        self.bytes.get(self.offset + n).copied()
    }

    /// Advance one byte, maintaining line/col. Multi-byte UTF-8
    /// continuation bytes keep the column moving by bytes, matching the
    /// target language's byte-based columns.
    fn bump(&mut self) -> u8 {
        let b = self.bytes[self.offset];
        self.offset += 1;
        if b == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        b
    }

    fn reported_pos(&self) -> Pos {
        let line = (self.line as i64 + self.override_delta).max(1) as u32;
        Pos::new(line, self.col)
    }

    fn emit(&mut self, kind: TokKind, text: String, pos: Pos) {
        self.tokens.push(Token {
            kind,
            text,
            leading: std::mem::take(&mut self.pending),
            pos,
            file: self.override_file.as_deref().map(Box::from),
        });
        self.last_kind = Some(kind);
    }

    /// Insert a virtual semicolon if the last token can end a statement.
    fn maybe_insert_semi(&mut self) {
        if self.last_kind.is_some_and(|k| k.ends_statement()) {
            let pos = self.reported_pos();
            self.tokens.push(Token {
                kind: TokKind::Semi,
                text: String::new(),
                leading: std::mem::take(&mut self.pending),
                pos,
                file: self.override_file.as_deref().map(Box::from),
            });
            self.last_kind = Some(TokKind::Semi);
        }
    }

    /// Handle a `//line file:N[:C]` directive that starts at column 1.
    fn apply_line_directive(&mut self, comment: &str, at_col: u32) {
        if at_col != 1 {
            return;
        }
        let Some(rest) = comment.strip_prefix("//line ") else {
            return;
        };
        let rest = rest.trim_end();
        // The trailing one or two colon-separated numeric fields are
        // line[:col]; everything before them is the file name.
        let Some((head, last)) = rest.rsplit_once(':') else {
            return;
        };
        let Ok(last_num) = last.parse::<i64>() else {
            return;
        };
        let (file, target) = match head.rsplit_once(':') {
            Some((head2, mid)) => match mid.parse::<i64>() {
                // file:line:col form; the column is ignored.
                Ok(line) => (head2, line),
                Err(_) => (head, last_num),
            },
            None => (head, last_num),
        };
        // The directive applies starting with the next source line.
        self.override_file = Some(file.to_string());
        self.override_delta = target - (self.line as i64 + 1);
    }

    fn run(mut self) -> Result<Vec<Token>, TokError> {
        loop {
            self.skip_trivia()?;
            let Some(b) = self.peek() else {
                self.maybe_insert_semi();
                let pos = self.reported_pos();
                self.emit(TokKind::Eof, String::new(), pos);
                return Ok(self.tokens);
            };
            let pos = self.reported_pos();
            match b {
                b'A'..=b'Z' | b'a'..=b'z' | b'_' | 0x80.. => self.scan_ident_or_keyword(pos),
                b'0'..=b'9' => self.scan_number(pos),
                b'.' => {
                    if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
                        self.scan_number(pos);
                    } else if self.peek_at(1) == Some(b'.') && self.peek_at(2) == Some(b'.') {
                        self.bump();
                        self.bump();
                        self.bump();
                        self.emit(TokKind::Ellipsis, "...".into(), pos);
                    } else {
                        self.bump();
                        self.emit(TokKind::Dot, ".".into(), pos);
                    }
                }
                b'"' => self.scan_string(pos)?,
                b'`' => self.scan_raw_string(pos)?,
                b'\'' => self.scan_rune(pos)?,
                _ => self.scan_operator(pos)?,
            }
        }
    }

    /// Consume whitespace and comments into `pending`, inserting virtual
    /// semicolons at newlines as required.
    fn skip_trivia(&mut self) -> Result<(), TokError> {
        loop {
            match self.peek() {
                Some(b'\n') => {
                    self.maybe_insert_semi();
                    self.bump();
                    self.pending.push('\n');
                }
                Some(b' ') | Some(b'\t') | Some(b'\r') => {
                    let b = self.bump();
                    self.pending.push(b as char);
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    let at_col = self.col;
                    let start = self.offset;
                    while self.peek().is_some_and(|b| b != b'\n') {
                        self.bump();
                    }
                    let comment = self.src[start..self.offset].to_string();
                    self.apply_line_directive(&comment, at_col);
                    self.pending.push_str(&comment);
                }
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    let pos = self.reported_pos();
                    let start = self.offset;
                    self.bump();
                    self.bump();
                    let mut closed = false;
                    let mut saw_newline = false;
                    while let Some(b) = self.peek() {
                        if b == b'\n' {
                            saw_newline = true;
                        }
                        if b == b'*' && self.peek_at(1) == Some(b'/') {
                            self.bump();
                            self.bump();
                            closed = true;
                            break;
                        }
                        self.bump();
                    }
                    if !closed {
                        return Err(TokError::UnterminatedComment { pos });
                    }
                    // A comment containing newlines acts as a newline.
                    if saw_newline {
                        let comment = self.src[start..self.offset].to_string();
                        self.pending.push_str(&comment);
                        self.maybe_insert_semi();
                    } else {
                        let comment = self.src[start..self.offset].to_string();
                        self.pending.push_str(&comment);
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn scan_ident_or_keyword(&mut self, pos: Pos) {
        let start = self.offset;
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80)
        {
            self.bump();
        }
        let text = self.src[start..self.offset].to_string();
        let kind = keyword_kind(&text).unwrap_or(TokKind::Ident);
        self.emit(kind, text, pos);
    }

    fn scan_number(&mut self, pos: Pos) {
        let start = self.offset;
        let mut is_float = false;
        if self.peek() == Some(b'0')
            && self
                .peek_at(1)
                .is_some_and(|b| matches!(b, b'x' | b'X' | b'b' | b'B' | b'o' | b'O'))
        {
            self.bump();
            self.bump();
            while self
                .peek()
                .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'.')
            {
                if self.peek() == Some(b'.') {
                    is_float = true;
                }
                self.bump();
            }
        } else {
            while self.peek().is_some_and(|b| b.is_ascii_digit() || b == b'_') {
                self.bump();
            }
            if self.peek() == Some(b'.') && self.peek_at(1) != Some(b'.') {
                is_float = true;
                self.bump();
                while self.peek().is_some_and(|b| b.is_ascii_digit() || b == b'_') {
                    self.bump();
                }
            }
            if self.peek().is_some_and(|b| matches!(b, b'e' | b'E')) {
                is_float = true;
                self.bump();
                if self.peek().is_some_and(|b| matches!(b, b'+' | b'-')) {
                    self.bump();
                }
                while self.peek().is_some_and(|b| b.is_ascii_digit() || b == b'_') {
                    self.bump();
                }
            }
        }
        // Imaginary suffix.
        if self.peek() == Some(b'i') {
            is_float = true;
            self.bump();
        }
        let text = self.src[start..self.offset].to_string();
        let kind = if is_float { TokKind::Float } else { TokKind::Int };
        self.emit(kind, text, pos);
    }

    fn scan_string(&mut self, pos: Pos) -> Result<(), TokError> {
        let start = self.offset;
        self.bump(); // opening quote
        loop {
            match self.peek() {
                None | Some(b'\n') => return Err(TokError::UnterminatedString { pos }),
                Some(b'\\') => {
                    self.bump();
                    if self.peek().is_some() {
                        self.bump();
                    }
                }
                Some(b'"') => {
                    self.bump();
                    break;
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
        let text = self.src[start..self.offset].to_string();
        self.emit(TokKind::Str, text, pos);
        Ok(())
    }

    fn scan_raw_string(&mut self, pos: Pos) -> Result<(), TokError> {
        let start = self.offset;
        self.bump(); // opening backquote
        loop {
            match self.peek() {
                None => return Err(TokError::UnterminatedString { pos }),
                Some(b'`') => {
                    self.bump();
                    break;
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
        let text = self.src[start..self.offset].to_string();
        self.emit(TokKind::RawStr, text, pos);
        Ok(())
    }

    fn scan_rune(&mut self, pos: Pos) -> Result<(), TokError> {
        let start = self.offset;
        self.bump(); // opening quote
        loop {
            match self.peek() {
                None | Some(b'\n') => return Err(TokError::UnterminatedRune { pos }),
                Some(b'\\') => {
                    self.bump();
                    if self.peek().is_some() {
                        self.bump();
                    }
                }
                Some(b'\'') => {
                    self.bump();
                    break;
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
        let text = self.src[start..self.offset].to_string();
        self.emit(TokKind::Rune, text, pos);
        Ok(())
    }

    fn scan_operator(&mut self, pos: Pos) -> Result<(), TokError> {
        let b = self.bump();
        let two = |l: &Self| l.peek();
        let (kind, text): (TokKind, String) = match b {
            b'+' => match two(self) {
                Some(b'+') => {
                    self.bump();
                    (TokKind::Inc, "++".into())
                }
                Some(b'=') => {
                    self.bump();
                    (TokKind::OpAssign, "+=".into())
                }
                _ => (TokKind::Plus, "+".into()),
            },
            b'-' => match two(self) {
                Some(b'-') => {
                    self.bump();
                    (TokKind::Dec, "--".into())
                }
                Some(b'=') => {
                    self.bump();
                    (TokKind::OpAssign, "-=".into())
                }
                _ => (TokKind::Minus, "-".into()),
            },
            b'*' => match two(self) {
                Some(b'=') => {
                    self.bump();
                    (TokKind::OpAssign, "*=".into())
                }
                _ => (TokKind::Star, "*".into()),
            },
            b'/' => match two(self) {
                Some(b'=') => {
                    self.bump();
                    (TokKind::OpAssign, "/=".into())
                }
                _ => (TokKind::Slash, "/".into()),
            },
            b'%' => match two(self) {
                Some(b'=') => {
                    self.bump();
                    (TokKind::OpAssign, "%=".into())
                }
                _ => (TokKind::Percent, "%".into()),
            },
            b'&' => match two(self) {
                Some(b'&') => {
                    self.bump();
                    (TokKind::AndAnd, "&&".into())
                }
                Some(b'^') => {
                    self.bump();
                    if self.peek() == Some(b'=') {
                        self.bump();
                        (TokKind::OpAssign, "&^=".into())
                    } else {
                        (TokKind::AmpCaret, "&^".into())
                    }
                }
                Some(b'=') => {
                    self.bump();
                    (TokKind::OpAssign, "&=".into())
                }
                _ => (TokKind::Amp, "&".into()),
            },
            b'|' => match two(self) {
                Some(b'|') => {
                    self.bump();
                    (TokKind::OrOr, "||".into())
                }
                Some(b'=') => {
                    self.bump();
                    (TokKind::OpAssign, "|=".into())
                }
                _ => (TokKind::Pipe, "|".into()),
            },
            b'^' => match two(self) {
                Some(b'=') => {
                    self.bump();
                    (TokKind::OpAssign, "^=".into())
                }
                _ => (TokKind::Caret, "^".into()),
            },
            b'<' => match two(self) {
                Some(b'-') => {
                    self.bump();
                    (TokKind::Arrow, "<-".into())
                }
                Some(b'<') => {
                    self.bump();
                    if self.peek() == Some(b'=') {
                        self.bump();
                        (TokKind::OpAssign, "<<=".into())
                    } else {
                        (TokKind::Shl, "<<".into())
                    }
                }
                Some(b'=') => {
                    self.bump();
                    (TokKind::Le, "<=".into())
                }
                _ => (TokKind::Lt, "<".into()),
            },
            b'>' => match two(self) {
                Some(b'>') => {
                    self.bump();
                    if self.peek() == Some(b'=') {
                        self.bump();
                        (TokKind::OpAssign, ">>=".into())
                    } else {
                        (TokKind::Shr, ">>".into())
                    }
                }
                Some(b'=') => {
                    self.bump();
                    (TokKind::Ge, ">=".into())
                }
                _ => (TokKind::Gt, ">".into()),
            },
            b'=' => match two(self) {
                Some(b'=') => {
                    self.bump();
                    (TokKind::EqEq, "==".into())
                }
                _ => (TokKind::Assign, "=".into()),
            },
            b'!' => match two(self) {
                Some(b'=') => {
                    self.bump();
                    (TokKind::NotEq, "!=".into())
                }
                _ => (TokKind::Not, "!".into()),
            },
            b':' => match two(self) {
                Some(b'=') => {
                    self.bump();
                    (TokKind::Define, ":=".into())
                }
                _ => (TokKind::Colon, ":".into()),
            },
            b'(' => (TokKind::LParen, "(".into()),
            b')' => (TokKind::RParen, ")".into()),
            b'[' => (TokKind::LBrack, "[".into()),
            b']' => (TokKind::RBrack, "]".into()),
            b'{' => (TokKind::LBrace, "{".into()),
            b'}' => (TokKind::RBrace, "}".into()),
            b',' => (TokKind::Comma, ",".into()),
            b';' => (TokKind::Semi, ";".into()),
            other => {
                return Err(TokError::InvalidChar {
                    pos,
                    ch: other as char,
                })
            }
        };
        self.emit(kind, text, pos);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokKind> {
        tokenize(src)
            .expect("tokenize error")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn roundtrip(src: &str) -> String {
        tokenize(src)
            .expect("tokenize error")
            .iter()
            .map(|t| format!("{}{}", t.leading, t.text))
            .collect()
    }

    #[test]
    fn simple_tokens() {
        assert_eq!(
            kinds("x := 1"),
            vec![
                TokKind::Ident,
                TokKind::Define,
                TokKind::Int,
                TokKind::Semi,
                TokKind::Eof
            ]
        );
    }

    #[test]
    fn semicolon_insertion_after_ident() {
        let ks = kinds("a\nb");
        assert_eq!(
            ks,
            vec![
                TokKind::Ident,
                TokKind::Semi,
                TokKind::Ident,
                TokKind::Semi,
                TokKind::Eof
            ]
        );
    }

    #[test]
    fn no_semicolon_after_operator() {
        let ks = kinds("a +\nb");
        assert_eq!(
            ks,
            vec![
                TokKind::Ident,
                TokKind::Plus,
                TokKind::Ident,
                TokKind::Semi,
                TokKind::Eof
            ]
        );
    }

    #[test]
    fn comments_are_trivia() {
        let toks = tokenize("a // hi\nb /* there */ c").expect("tokenize error");
        let idents: Vec<&str> = toks
            .iter()
            .filter(|t| t.kind == TokKind::Ident)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(idents, vec!["a", "b", "c"]);
        assert!(toks.iter().any(|t| t.leading.contains("// hi")));
        assert!(toks.iter().any(|t| t.leading.contains("/* there */")));
    }

    #[test]
    fn roundtrip_preserves_source() {
        let src = "package x\n\n// build helper\nfunc f(i int) bool {\n\treturn i > 0 // positive\n}\n";
        assert_eq!(roundtrip(src), src);
    }

    #[test]
    fn raw_string_keeps_newlines() {
        let src = "s := `a\nb`\n";
        assert_eq!(roundtrip(src), src);
        let toks = tokenize(src).expect("tokenize error");
        assert!(toks.iter().any(|t| t.kind == TokKind::RawStr));
    }

    #[test]
    fn positions_are_line_col() {
        let toks = tokenize("a\n  b").expect("tokenize error");
        let b = toks.iter().find(|t| t.text == "b").expect("token b");
        assert_eq!(b.pos, Pos::new(2, 3));
    }

    #[test]
    fn line_directive_overrides_file_and_line() {
        let src = "//line parser.y:10\na > 0\n";
        let toks = tokenize(src).expect("tokenize error");
        let a = toks.iter().find(|t| t.text == "a").expect("token a");
        assert_eq!(a.pos.line, 10);
        assert_eq!(a.file.as_deref(), Some("parser.y"));
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = tokenize("\"abc").expect_err("expected error");
        assert!(matches!(err, TokError::UnterminatedString { .. }));
    }

    #[test]
    fn compound_assignment_operators() {
        for op in ["+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<=", ">>=", "&^="] {
            let src = format!("x {} y", op);
            let toks = tokenize(&src).expect("tokenize error");
            let found = toks
                .iter()
                .find(|t| t.kind == TokKind::OpAssign)
                .unwrap_or_else(|| panic!("no OpAssign for {}", op));
            assert_eq!(found.text, op);
        }
    }

    #[test]
    fn eof_semicolon() {
        let ks = kinds("return 1");
        assert_eq!(ks.last(), Some(&TokKind::Eof));
        assert_eq!(ks[ks.len() - 2], TokKind::Semi);
    }
}
