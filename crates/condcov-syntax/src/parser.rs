//! Recursive descent parser.
//!
//! Binary expressions use precedence climbing over the token stream; the
//! rest is straight recursive descent. The parser assigns [`NodeId`]s in
//! pre-order as nodes are built.
//!
//! Composite-literal ambiguity: inside `if`/`for`/`switch` headers a `{`
//! after a bare (possibly qualified) type name opens the statement body,
//! not a composite literal. The `no_lit` flag tracks header context and is
//! cleared inside any parenthesized or bracketed subexpression, matching
//! the target language's own rule.

use thiserror::Error;

use crate::nodes::decl::{Decl, File, FuncDecl, GenDecl, ImportSpec, Receiver, Spec, TypeSpec, ValueSpec};
use crate::nodes::expr::*;
use crate::nodes::stmt::*;
use crate::nodes::traits::{NodeId, NodeIdGenerator};
use crate::tokenizer::{Pos, TokKind, Token};

/// A parse failure at a specific position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{pos}: expected {expected}, found {found}")]
pub struct ParseError {
    pub pos: Pos,
    pub expected: String,
    pub found: String,
}

pub type Result<T> = std::result::Result<T, ParseError>;

/// Binary operator precedence; 0 for non-operators.
fn prec(kind: TokKind) -> u8 {
    match kind {
        TokKind::OrOr => 1,
        TokKind::AndAnd => 2,
        TokKind::EqEq
        | TokKind::NotEq
        | TokKind::Lt
        | TokKind::Le
        | TokKind::Gt
        | TokKind::Ge => 3,
        TokKind::Plus | TokKind::Minus | TokKind::Pipe | TokKind::Caret => 4,
        TokKind::Star
        | TokKind::Slash
        | TokKind::Percent
        | TokKind::Shl
        | TokKind::Shr
        | TokKind::Amp
        | TokKind::AmpCaret => 5,
        _ => 0,
    }
}

fn starts_type(kind: TokKind) -> bool {
    matches!(
        kind,
        TokKind::Ident
            | TokKind::Star
            | TokKind::LBrack
            | TokKind::Map
            | TokKind::Chan
            | TokKind::Func
            | TokKind::Struct
            | TokKind::Interface
            | TokKind::LParen
            | TokKind::Arrow
            | TokKind::Ellipsis
    )
}

pub struct Parser {
    toks: Vec<Token>,
    idx: usize,
    ids: NodeIdGenerator,
    no_lit: bool,
}

impl Parser {
    pub fn new(toks: Vec<Token>) -> Self {
        Self {
            toks,
            idx: 0,
            ids: NodeIdGenerator::new(),
            no_lit: false,
        }
    }

    fn peek(&self) -> &Token {
        &self.toks[self.idx]
    }

    fn peek_kind(&self) -> TokKind {
        self.toks[self.idx].kind
    }

    fn peek_kind_at(&self, n: usize) -> TokKind {
        self.toks
            .get(self.idx + n)
            .map(|t| t.kind)
            .unwrap_or(TokKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.toks[self.idx].clone();
        if self.idx + 1 < self.toks.len() {
            self.idx += 1;
        }
        tok
    }

    fn next_id(&mut self) -> NodeId {
        self.ids.next_id()
    }

    fn error(&self, expected: &str) -> ParseError {
        let tok = self.peek();
        let found = if tok.kind == TokKind::Eof {
            "end of file".to_string()
        } else if tok.text.is_empty() {
            "newline".to_string()
        } else {
            format!("{:?}", tok.text)
        };
        ParseError {
            pos: tok.pos,
            expected: expected.to_string(),
            found,
        }
    }

    fn expect(&mut self, kind: TokKind, what: &str) -> Result<Token> {
        if self.peek_kind() == kind {
            Ok(self.advance())
        } else {
            Err(self.error(what))
        }
    }

    fn eat(&mut self, kind: TokKind) -> Option<Token> {
        if self.peek_kind() == kind {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Consume a statement terminator. A closing `)` or `}` (or EOF) may
    /// stand in for the semicolon without being consumed.
    fn expect_semi(&mut self) -> Result<Option<Token>> {
        match self.peek_kind() {
            TokKind::Semi => Ok(Some(self.advance())),
            TokKind::RParen | TokKind::RBrace | TokKind::Eof => Ok(None),
            _ => Err(self.error("';'")),
        }
    }

    fn with_no_lit<T>(&mut self, no_lit: bool, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let saved = self.no_lit;
        self.no_lit = no_lit;
        let out = f(self);
        self.no_lit = saved;
        out
    }

    // ========================================================================
    // File and declarations
    // ========================================================================

    /// Parse a standalone expression; all input must be consumed.
    pub fn parse_expression_input(mut self) -> Result<Expr> {
        let expr = self.parse_expr()?;
        self.eat(TokKind::Semi);
        if self.peek_kind() != TokKind::Eof {
            return Err(self.error("end of expression"));
        }
        Ok(expr)
    }

    pub fn parse_file(mut self) -> Result<File> {
        let package_tok = self.expect(TokKind::Package, "'package'")?;
        let name = self.parse_ident("package name")?;
        let semi = self.expect_semi()?;
        let mut decls = Vec::new();
        while self.peek_kind() != TokKind::Eof {
            decls.push(self.parse_decl()?);
        }
        let eof = self.advance();
        Ok(File {
            package_tok,
            name,
            semi,
            decls,
            eof,
            ids: self.ids,
        })
    }

    fn parse_ident(&mut self, what: &str) -> Result<Ident> {
        let tok = self.expect(TokKind::Ident, what)?;
        Ok(Ident {
            tok,
            node_id: self.next_id(),
        })
    }

    fn parse_decl(&mut self) -> Result<Decl> {
        match self.peek_kind() {
            TokKind::Func => Ok(Decl::Func(Box::new(self.parse_func_decl()?))),
            TokKind::Import | TokKind::Const | TokKind::Var | TokKind::Type => {
                Ok(Decl::Gen(Box::new(self.parse_gen_decl()?)))
            }
            _ => Err(self.error("declaration")),
        }
    }

    fn parse_func_decl(&mut self) -> Result<FuncDecl> {
        let func_tok = self.expect(TokKind::Func, "'func'")?;
        let node_id = self.next_id();
        let recv = if self.peek_kind() == TokKind::LParen {
            let lparen = self.advance();
            let param = self.parse_param_item()?;
            let rparen = self.expect(TokKind::RParen, "')'")?;
            Some(Receiver {
                lparen,
                param,
                rparen,
            })
        } else {
            None
        };
        let name = self.parse_ident("function name")?;
        let sig = self.parse_func_sig()?;
        let body = if self.peek_kind() == TokKind::LBrace {
            Some(self.parse_block()?)
        } else {
            None
        };
        let semi = self.expect_semi()?;
        Ok(FuncDecl {
            func_tok,
            recv,
            name,
            sig,
            body,
            semi,
            node_id,
        })
    }

    fn parse_func_sig(&mut self) -> Result<FuncSig> {
        let lparen = self.expect(TokKind::LParen, "'('")?;
        let mut params = Vec::new();
        let mut commas = Vec::new();
        while self.peek_kind() != TokKind::RParen {
            params.push(self.parse_param_item()?);
            match self.eat(TokKind::Comma) {
                Some(comma) => commas.push(comma),
                None => break,
            }
        }
        let rparen = self.expect(TokKind::RParen, "')'")?;
        let result = match self.peek_kind() {
            TokKind::LParen => {
                let lparen = self.advance();
                let mut params = Vec::new();
                let mut commas = Vec::new();
                while self.peek_kind() != TokKind::RParen {
                    params.push(self.parse_param_item()?);
                    match self.eat(TokKind::Comma) {
                        Some(comma) => commas.push(comma),
                        None => break,
                    }
                }
                let rparen = self.expect(TokKind::RParen, "')'")?;
                Some(FuncResult::Tuple {
                    lparen,
                    params,
                    commas,
                    rparen,
                })
            }
            kind if starts_type(kind) && kind != TokKind::LParen => {
                Some(FuncResult::Single(self.parse_type()?))
            }
            _ => None,
        };
        Ok(FuncSig {
            lparen,
            params,
            commas,
            rparen,
            result,
        })
    }

    /// One comma-separated parameter item: `[name] [...]type` or a bare
    /// type. Name grouping across commas is deliberately not resolved.
    fn parse_param_item(&mut self) -> Result<Param> {
        if self.peek_kind() == TokKind::Ellipsis {
            let ellipsis = self.advance();
            let ty = self.parse_type()?;
            return Ok(Param {
                name: None,
                ellipsis: Some(ellipsis),
                ty,
            });
        }
        let first = self.parse_type()?;
        if starts_type(self.peek_kind()) || self.peek_kind() == TokKind::Ellipsis {
            let name = match first {
                Expr::Ident(id) => id,
                _ => return Err(self.error("parameter name")),
            };
            let ellipsis = self.eat(TokKind::Ellipsis);
            let ty = self.parse_type()?;
            Ok(Param {
                name: Some(name),
                ellipsis,
                ty,
            })
        } else {
            Ok(Param {
                name: None,
                ellipsis: None,
                ty: first,
            })
        }
    }

    fn parse_gen_decl(&mut self) -> Result<GenDecl> {
        let tok = self.advance();
        let node_id = self.next_id();
        let kind = tok.kind;
        if self.peek_kind() == TokKind::LParen {
            let lparen = Some(self.advance());
            let mut specs = Vec::new();
            while self.peek_kind() != TokKind::RParen && self.peek_kind() != TokKind::Eof {
                // Stray semicolons between grouped specs.
                if self.peek_kind() == TokKind::Semi {
                    self.advance();
                    continue;
                }
                specs.push(self.parse_spec(kind, true)?);
            }
            let rparen = Some(self.expect(TokKind::RParen, "')'")?);
            let semi = self.expect_semi()?;
            Ok(GenDecl {
                tok,
                lparen,
                specs,
                rparen,
                semi,
                node_id,
            })
        } else {
            let spec = self.parse_spec(kind, false)?;
            let semi = self.expect_semi()?;
            Ok(GenDecl {
                tok,
                lparen: None,
                specs: vec![spec],
                rparen: None,
                semi,
                node_id,
            })
        }
    }

    fn parse_spec(&mut self, kind: TokKind, grouped: bool) -> Result<Spec> {
        let spec = match kind {
            TokKind::Import => {
                let name = match self.peek_kind() {
                    TokKind::Ident | TokKind::Dot => Some(self.advance()),
                    _ => None,
                };
                let path = match self.peek_kind() {
                    TokKind::Str | TokKind::RawStr => self.advance(),
                    _ => return Err(self.error("import path")),
                };
                let semi = if grouped { self.expect_semi()? } else { None };
                Spec::Import(ImportSpec { name, path, semi })
            }
            TokKind::Type => {
                let name = self.parse_ident("type name")?;
                let assign = self.eat(TokKind::Assign);
                let ty = self.parse_type()?;
                let semi = if grouped { self.expect_semi()? } else { None };
                Spec::Type(TypeSpec {
                    name,
                    assign,
                    ty,
                    semi,
                })
            }
            _ => {
                // const or var
                let mut names = vec![self.parse_ident("name")?];
                let mut commas = Vec::new();
                while let Some(comma) = self.eat(TokKind::Comma) {
                    commas.push(comma);
                    names.push(self.parse_ident("name")?);
                }
                let ty = if starts_type(self.peek_kind()) && self.peek_kind() != TokKind::Ellipsis
                {
                    Some(self.parse_type()?)
                } else {
                    None
                };
                let assign = self.eat(TokKind::Assign);
                let mut values = Vec::new();
                let mut value_commas = Vec::new();
                if assign.is_some() {
                    values.push(self.with_no_lit(false, |p| p.parse_expr())?);
                    while let Some(comma) = self.eat(TokKind::Comma) {
                        value_commas.push(comma);
                        values.push(self.with_no_lit(false, |p| p.parse_expr())?);
                    }
                }
                let semi = if grouped { self.expect_semi()? } else { None };
                Spec::Value(ValueSpec {
                    names,
                    commas,
                    ty,
                    assign,
                    values,
                    value_commas,
                    semi,
                })
            }
        };
        Ok(spec)
    }

    // ========================================================================
    // Statements
    // ========================================================================

    pub fn parse_block(&mut self) -> Result<Block> {
        let lbrace = self.expect(TokKind::LBrace, "'{'")?;
        let stmts = self.with_no_lit(false, |p| {
            let mut stmts = Vec::new();
            while p.peek_kind() != TokKind::RBrace && p.peek_kind() != TokKind::Eof {
                stmts.push(p.parse_stmt()?);
            }
            Ok(stmts)
        })?;
        let rbrace = self.expect(TokKind::RBrace, "'}'")?;
        Ok(Block {
            lbrace,
            stmts,
            rbrace,
        })
    }

    fn parse_stmt(&mut self) -> Result<Stmt> {
        match self.peek_kind() {
            TokKind::Const | TokKind::Var | TokKind::Type => {
                let decl = self.parse_gen_decl()?;
                let node_id = self.next_id();
                Ok(Stmt::Decl(Box::new(DeclStmt { decl, node_id })))
            }
            TokKind::Return => {
                let return_tok = self.advance();
                let node_id = self.next_id();
                let mut results = Vec::new();
                let mut commas = Vec::new();
                if !matches!(
                    self.peek_kind(),
                    TokKind::Semi | TokKind::RBrace | TokKind::Eof
                ) {
                    results.push(self.parse_expr()?);
                    while let Some(comma) = self.eat(TokKind::Comma) {
                        commas.push(comma);
                        results.push(self.parse_expr()?);
                    }
                }
                let semi = self.expect_semi()?;
                Ok(Stmt::Return(Box::new(ReturnStmt {
                    return_tok,
                    results,
                    commas,
                    semi,
                    node_id,
                })))
            }
            TokKind::If => {
                let stmt = self.parse_if()?;
                Ok(Stmt::If(Box::new(stmt)))
            }
            TokKind::For => self.parse_for(),
            TokKind::Switch => self.parse_switch(),
            TokKind::Select => self.parse_select(),
            TokKind::Go => {
                let go_tok = self.advance();
                let node_id = self.next_id();
                let call = self.parse_expr()?;
                let semi = self.expect_semi()?;
                Ok(Stmt::Go(Box::new(GoStmt {
                    go_tok,
                    call,
                    semi,
                    node_id,
                })))
            }
            TokKind::Defer => {
                let defer_tok = self.advance();
                let node_id = self.next_id();
                let call = self.parse_expr()?;
                let semi = self.expect_semi()?;
                Ok(Stmt::Defer(Box::new(DeferStmt {
                    defer_tok,
                    call,
                    semi,
                    node_id,
                })))
            }
            TokKind::Break | TokKind::Continue | TokKind::Goto | TokKind::Fallthrough => {
                let tok = self.advance();
                let node_id = self.next_id();
                let label = if self.peek_kind() == TokKind::Ident {
                    Some(self.parse_ident("label")?)
                } else {
                    None
                };
                let semi = self.expect_semi()?;
                Ok(Stmt::Branch(Box::new(BranchStmt {
                    tok,
                    label,
                    semi,
                    node_id,
                })))
            }
            TokKind::LBrace => {
                let node_id = self.next_id();
                let block = self.parse_block()?;
                let semi = self.expect_semi()?;
                Ok(Stmt::Block(Box::new(BlockStmt {
                    block,
                    semi,
                    node_id,
                })))
            }
            TokKind::Semi => {
                let semi = self.advance();
                let node_id = self.next_id();
                Ok(Stmt::Empty(Box::new(EmptyStmt { semi, node_id })))
            }
            TokKind::Ident if self.peek_kind_at(1) == TokKind::Colon => {
                let label = self.parse_ident("label")?;
                let colon = self.advance();
                let node_id = self.next_id();
                let stmt = if matches!(
                    self.peek_kind(),
                    TokKind::RBrace | TokKind::Case | TokKind::Default | TokKind::Eof
                ) {
                    None
                } else {
                    Some(self.parse_stmt()?)
                };
                Ok(Stmt::Labeled(Box::new(LabeledStmt {
                    label,
                    colon,
                    stmt,
                    node_id,
                })))
            }
            _ => {
                let mut stmt = self.parse_simple_stmt()?;
                let semi = self.expect_semi()?;
                attach_semi(&mut stmt, semi);
                Ok(stmt)
            }
        }
    }

    /// A simple statement without its terminating semicolon: expression,
    /// send, inc/dec, assignment or short declaration.
    fn parse_simple_stmt(&mut self) -> Result<Stmt> {
        let first = self.parse_expr()?;
        match self.peek_kind() {
            TokKind::Comma => {
                let mut lhs = vec![first];
                let mut lhs_commas = Vec::new();
                while let Some(comma) = self.eat(TokKind::Comma) {
                    lhs_commas.push(comma);
                    lhs.push(self.parse_expr()?);
                }
                let op = match self.peek_kind() {
                    TokKind::Assign | TokKind::Define | TokKind::OpAssign => self.advance(),
                    _ => return Err(self.error("'=' or ':='")),
                };
                self.finish_assign(lhs, lhs_commas, op)
            }
            TokKind::Assign | TokKind::Define | TokKind::OpAssign => {
                let op = self.advance();
                self.finish_assign(vec![first], Vec::new(), op)
            }
            TokKind::Arrow => {
                let arrow = self.advance();
                let node_id = self.next_id();
                let value = self.parse_expr()?;
                Ok(Stmt::Send(Box::new(SendStmt {
                    chan: first,
                    arrow,
                    value,
                    semi: None,
                    node_id,
                })))
            }
            TokKind::Inc | TokKind::Dec => {
                let op = self.advance();
                let node_id = self.next_id();
                Ok(Stmt::IncDec(Box::new(IncDecStmt {
                    expr: first,
                    op,
                    semi: None,
                    node_id,
                })))
            }
            _ => {
                let node_id = self.next_id();
                Ok(Stmt::Expr(Box::new(ExprStmt {
                    expr: first,
                    semi: None,
                    node_id,
                })))
            }
        }
    }

    fn finish_assign(
        &mut self,
        lhs: Vec<Expr>,
        lhs_commas: Vec<Token>,
        op: Token,
    ) -> Result<Stmt> {
        let node_id = self.next_id();
        let mut rhs = vec![self.parse_expr()?];
        let mut rhs_commas = Vec::new();
        while let Some(comma) = self.eat(TokKind::Comma) {
            rhs_commas.push(comma);
            rhs.push(self.parse_expr()?);
        }
        Ok(Stmt::Assign(Box::new(AssignStmt {
            lhs,
            lhs_commas,
            op,
            rhs,
            rhs_commas,
            semi: None,
            node_id,
        })))
    }

    fn parse_if(&mut self) -> Result<IfStmt> {
        let if_tok = self.expect(TokKind::If, "'if'")?;
        let node_id = self.next_id();
        let (init, init_semi, cond) = self.with_no_lit(true, |p| {
            let first = p.parse_simple_stmt()?;
            if p.peek_kind() == TokKind::Semi {
                let init_semi = Some(p.advance());
                let cond = p.parse_expr()?;
                Ok((Some(first), init_semi, cond))
            } else {
                match first {
                    Stmt::Expr(expr_stmt) => Ok((None, None, expr_stmt.expr)),
                    _ => Err(p.error("condition")),
                }
            }
        })?;
        let body = self.parse_block()?;
        let (else_tok, else_branch) = if self.peek_kind() == TokKind::Else {
            let else_tok = self.advance();
            let branch = if self.peek_kind() == TokKind::If {
                ElseBranch::If(Box::new(self.parse_if()?))
            } else {
                ElseBranch::Block(self.parse_block()?)
            };
            (Some(else_tok), Some(branch))
        } else {
            (None, None)
        };
        // A nested `else if` already consumed the terminator.
        let semi = match &else_branch {
            Some(ElseBranch::If(_)) => None,
            _ => self.expect_semi()?,
        };
        Ok(IfStmt {
            if_tok,
            init,
            init_semi,
            cond,
            body,
            else_tok,
            else_branch,
            semi,
            node_id,
        })
    }

    fn parse_for(&mut self) -> Result<Stmt> {
        let for_tok = self.expect(TokKind::For, "'for'")?;
        let node_id = self.next_id();
        let header = self.with_no_lit(true, |p| p.parse_for_header())?;
        let body = self.parse_block()?;
        let semi = self.expect_semi()?;
        Ok(Stmt::For(Box::new(ForStmt {
            for_tok,
            header,
            body,
            semi,
            node_id,
        })))
    }

    fn parse_for_header(&mut self) -> Result<ForHeader> {
        if self.peek_kind() == TokKind::LBrace {
            return Ok(ForHeader::Infinite);
        }
        if self.peek_kind() == TokKind::Range {
            let range_tok = self.advance();
            let x = self.parse_expr()?;
            return Ok(ForHeader::Range {
                lhs: Vec::new(),
                commas: Vec::new(),
                op: None,
                range_tok,
                x,
            });
        }
        if self.peek_kind() == TokKind::Semi {
            return self.parse_for_clause(None);
        }
        // Parse the first expression list; it may turn into a range
        // header, a three-clause header or a bare condition.
        let first = self.parse_expr()?;
        let mut lhs = vec![first];
        let mut commas = Vec::new();
        while let Some(comma) = self.eat(TokKind::Comma) {
            commas.push(comma);
            lhs.push(self.parse_expr()?);
        }
        match self.peek_kind() {
            TokKind::Define | TokKind::Assign => {
                let op = self.advance();
                if self.peek_kind() == TokKind::Range {
                    let range_tok = self.advance();
                    let x = self.parse_expr()?;
                    return Ok(ForHeader::Range {
                        lhs,
                        commas,
                        op: Some(op),
                        range_tok,
                        x,
                    });
                }
                let init = self.finish_assign(lhs, commas, op)?;
                if self.peek_kind() == TokKind::Semi {
                    return self.parse_for_clause(Some(Box::new(init)));
                }
                Err(self.error("';'"))
            }
            TokKind::Semi => {
                if lhs.len() != 1 {
                    return Err(self.error("condition"));
                }
                let node_id = self.next_id();
                let init = Stmt::Expr(Box::new(ExprStmt {
                    expr: lhs.pop().expect("one expression"),
                    semi: None,
                    node_id,
                }));
                self.parse_for_clause(Some(Box::new(init)))
            }
            TokKind::Inc | TokKind::Dec | TokKind::OpAssign | TokKind::Arrow => {
                // Send, inc/dec and compound assignment are only valid as
                // the init of a three-clause header.
                let stmt = match self.peek_kind() {
                    TokKind::Arrow => {
                        let arrow = self.advance();
                        let node_id = self.next_id();
                        let value = self.parse_expr()?;
                        Stmt::Send(Box::new(SendStmt {
                            chan: lhs.pop().expect("one expression"),
                            arrow,
                            value,
                            semi: None,
                            node_id,
                        }))
                    }
                    TokKind::OpAssign => {
                        let op = self.advance();
                        self.finish_assign(lhs, commas, op)?
                    }
                    _ => {
                        let op = self.advance();
                        let node_id = self.next_id();
                        Stmt::IncDec(Box::new(IncDecStmt {
                            expr: lhs.pop().expect("one expression"),
                            op,
                            semi: None,
                            node_id,
                        }))
                    }
                };
                if self.peek_kind() == TokKind::Semi {
                    return self.parse_for_clause(Some(Box::new(stmt)));
                }
                Err(self.error("';'"))
            }
            _ => {
                if lhs.len() != 1 {
                    return Err(self.error("'{'"));
                }
                Ok(ForHeader::Cond(lhs.pop().expect("one expression")))
            }
        }
    }

    /// The `; [cond] ; [post]` tail of a three-clause for header.
    fn parse_for_clause(&mut self, init: Option<Box<Stmt>>) -> Result<ForHeader> {
        let semi1 = self.expect(TokKind::Semi, "';'")?;
        let cond = if self.peek_kind() != TokKind::Semi {
            Some(self.parse_expr()?)
        } else {
            None
        };
        let semi2 = self.expect(TokKind::Semi, "';'")?;
        let post = if self.peek_kind() != TokKind::LBrace {
            Some(Box::new(self.parse_simple_stmt()?))
        } else {
            None
        };
        Ok(ForHeader::Clause {
            init,
            semi1,
            cond,
            semi2,
            post,
        })
    }

    fn parse_switch(&mut self) -> Result<Stmt> {
        let switch_tok = self.expect(TokKind::Switch, "'switch'")?;
        let node_id = self.next_id();
        let (init, init_semi, tag_stmt) = self.with_no_lit(true, |p| {
            if p.peek_kind() == TokKind::LBrace {
                return Ok((None, None, None));
            }
            let first = p.parse_simple_stmt()?;
            if p.peek_kind() == TokKind::Semi {
                let init_semi = Some(p.advance());
                if p.peek_kind() == TokKind::LBrace {
                    Ok((Some(first), init_semi, None))
                } else {
                    let second = p.parse_simple_stmt()?;
                    Ok((Some(first), init_semi, Some(second)))
                }
            } else {
                Ok((None, None, Some(first)))
            }
        })?;

        // Decide between an expression switch and a type switch from the
        // shape of the tag statement.
        let (bind, guard, tag) = match tag_stmt {
            None => (None, None, None),
            Some(Stmt::Expr(expr_stmt)) => match expr_stmt.expr {
                Expr::TypeAssert(assert) if assert.is_type_switch_guard() => {
                    (None, Some(Expr::TypeAssert(assert)), None)
                }
                expr => (None, None, Some(expr)),
            },
            Some(Stmt::Assign(assign)) => {
                let assign = *assign;
                if !assign.is_define() || assign.lhs.len() != 1 || assign.rhs.len() != 1 {
                    return Err(self.error("switch tag"));
                }
                let mut lhs = assign.lhs;
                let mut rhs = assign.rhs;
                let guard = rhs.pop().expect("one rhs");
                let guard_ok = matches!(
                    &guard,
                    Expr::TypeAssert(assert) if assert.is_type_switch_guard()
                );
                if !guard_ok {
                    return Err(self.error("type switch guard"));
                }
                let name = match lhs.pop().expect("one lhs") {
                    Expr::Ident(id) => id,
                    _ => return Err(self.error("identifier")),
                };
                (
                    Some(TypeSwitchBind {
                        name,
                        define: assign.op,
                    }),
                    Some(guard),
                    None,
                )
            }
            Some(_) => return Err(self.error("switch tag")),
        };

        let lbrace = self.expect(TokKind::LBrace, "'{'")?;
        let mut clauses = Vec::new();
        while matches!(self.peek_kind(), TokKind::Case | TokKind::Default) {
            clauses.push(self.parse_case_clause()?);
        }
        let rbrace = self.expect(TokKind::RBrace, "'}'")?;
        let semi = self.expect_semi()?;

        if let Some(guard) = guard {
            Ok(Stmt::TypeSwitch(Box::new(TypeSwitchStmt {
                switch_tok,
                init,
                init_semi,
                bind,
                guard,
                lbrace,
                clauses,
                rbrace,
                semi,
                node_id,
            })))
        } else {
            Ok(Stmt::Switch(Box::new(SwitchStmt {
                switch_tok,
                init,
                init_semi,
                tag,
                lbrace,
                clauses,
                rbrace,
                semi,
                node_id,
            })))
        }
    }

    fn parse_case_clause(&mut self) -> Result<CaseClause> {
        let case_tok = self.advance();
        let node_id = self.next_id();
        let mut exprs = Vec::new();
        let mut commas = Vec::new();
        if case_tok.kind == TokKind::Case {
            exprs.push(self.with_no_lit(false, |p| p.parse_expr())?);
            while let Some(comma) = self.eat(TokKind::Comma) {
                commas.push(comma);
                exprs.push(self.with_no_lit(false, |p| p.parse_expr())?);
            }
        }
        let colon = self.expect(TokKind::Colon, "':'")?;
        let stmts = self.with_no_lit(false, |p| {
            let mut stmts = Vec::new();
            while !matches!(
                p.peek_kind(),
                TokKind::Case | TokKind::Default | TokKind::RBrace | TokKind::Eof
            ) {
                stmts.push(p.parse_stmt()?);
            }
            Ok(stmts)
        })?;
        Ok(CaseClause {
            case_tok,
            exprs,
            commas,
            colon,
            stmts,
            node_id,
        })
    }

    fn parse_select(&mut self) -> Result<Stmt> {
        let select_tok = self.expect(TokKind::Select, "'select'")?;
        let node_id = self.next_id();
        let lbrace = self.expect(TokKind::LBrace, "'{'")?;
        let mut clauses = Vec::new();
        while matches!(self.peek_kind(), TokKind::Case | TokKind::Default) {
            let case_tok = self.advance();
            let clause_id = self.next_id();
            let comm = if case_tok.kind == TokKind::Case {
                Some(self.parse_simple_stmt()?)
            } else {
                None
            };
            let colon = self.expect(TokKind::Colon, "':'")?;
            let mut stmts = Vec::new();
            while !matches!(
                self.peek_kind(),
                TokKind::Case | TokKind::Default | TokKind::RBrace | TokKind::Eof
            ) {
                stmts.push(self.parse_stmt()?);
            }
            clauses.push(CommClause {
                case_tok,
                comm,
                colon,
                stmts,
                node_id: clause_id,
            });
        }
        let rbrace = self.expect(TokKind::RBrace, "'}'")?;
        let semi = self.expect_semi()?;
        Ok(Stmt::Select(Box::new(SelectStmt {
            select_tok,
            lbrace,
            clauses,
            rbrace,
            semi,
            node_id,
        })))
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    pub fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_binary(0)
    }

    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let p = prec(self.peek_kind());
            if p == 0 || p <= min_prec {
                return Ok(lhs);
            }
            let op = self.advance();
            let node_id = self.next_id();
            let rhs = self.parse_binary(p)?;
            lhs = Expr::Binary(Box::new(BinaryExpr {
                lhs,
                op,
                rhs,
                node_id,
            }));
        }
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        match self.peek_kind() {
            TokKind::Plus | TokKind::Minus | TokKind::Not | TokKind::Caret | TokKind::Amp => {
                let op = self.advance();
                let node_id = self.next_id();
                let operand = self.parse_unary()?;
                Ok(Expr::Unary(Box::new(UnaryExpr {
                    op,
                    operand,
                    node_id,
                })))
            }
            TokKind::Star => {
                let star = self.advance();
                let node_id = self.next_id();
                let x = self.parse_unary()?;
                Ok(Expr::Star(Box::new(StarExpr { star, x, node_id })))
            }
            TokKind::Arrow => {
                if self.peek_kind_at(1) == TokKind::Chan {
                    self.parse_type()
                } else {
                    let op = self.advance();
                    let node_id = self.next_id();
                    let operand = self.parse_unary()?;
                    Ok(Expr::Unary(Box::new(UnaryExpr {
                        op,
                        operand,
                        node_id,
                    })))
                }
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let mut expr = self.parse_operand()?;
        loop {
            match self.peek_kind() {
                TokKind::Dot => {
                    let dot = self.advance();
                    match self.peek_kind() {
                        TokKind::Ident => {
                            let sel = self.parse_ident("selector")?;
                            let node_id = self.next_id();
                            expr = Expr::Selector(Box::new(SelectorExpr {
                                x: expr,
                                dot,
                                sel,
                                node_id,
                            }));
                        }
                        TokKind::LParen => {
                            let lparen = self.advance();
                            let target = if self.peek_kind() == TokKind::Type {
                                TypeAssertTarget::TypeKeyword(self.advance())
                            } else {
                                TypeAssertTarget::Type(
                                    self.with_no_lit(false, |p| p.parse_type())?,
                                )
                            };
                            let rparen = self.expect(TokKind::RParen, "')'")?;
                            let node_id = self.next_id();
                            expr = Expr::TypeAssert(Box::new(TypeAssertExpr {
                                x: expr,
                                dot,
                                lparen,
                                target,
                                rparen,
                                node_id,
                            }));
                        }
                        _ => return Err(self.error("selector or '('")),
                    }
                }
                TokKind::LParen => {
                    let lparen = self.advance();
                    let node_id = self.next_id();
                    let (args, commas, ellipsis) = self.with_no_lit(false, |p| {
                        let mut args = Vec::new();
                        let mut commas = Vec::new();
                        let mut ellipsis = None;
                        while p.peek_kind() != TokKind::RParen {
                            args.push(p.parse_expr()?);
                            if p.peek_kind() == TokKind::Ellipsis {
                                ellipsis = Some(p.advance());
                            }
                            match p.eat(TokKind::Comma) {
                                Some(comma) => commas.push(comma),
                                None => break,
                            }
                        }
                        Ok((args, commas, ellipsis))
                    })?;
                    let rparen = self.expect(TokKind::RParen, "')'")?;
                    expr = Expr::Call(Box::new(CallExpr {
                        fun: expr,
                        lparen,
                        args,
                        commas,
                        ellipsis,
                        rparen,
                        node_id,
                    }));
                }
                TokKind::LBrack => {
                    let lbrack = self.advance();
                    let (low, colon1, high, colon2, max, is_index) =
                        self.with_no_lit(false, |p| {
                            let low = if p.peek_kind() != TokKind::Colon {
                                Some(p.parse_expr()?)
                            } else {
                                None
                            };
                            if p.peek_kind() == TokKind::RBrack {
                                return Ok((low, None, None, None, None, true));
                            }
                            let colon1 = Some(p.expect(TokKind::Colon, "':'")?);
                            let high = if !matches!(
                                p.peek_kind(),
                                TokKind::Colon | TokKind::RBrack
                            ) {
                                Some(p.parse_expr()?)
                            } else {
                                None
                            };
                            let (colon2, max) = if p.peek_kind() == TokKind::Colon {
                                let colon2 = p.advance();
                                let max = Some(p.parse_expr()?);
                                (Some(colon2), max)
                            } else {
                                (None, None)
                            };
                            Ok((low, colon1, high, colon2, max, false))
                        })?;
                    let rbrack = self.expect(TokKind::RBrack, "']'")?;
                    let node_id = self.next_id();
                    if is_index {
                        let index = low.ok_or_else(|| self.error("index expression"))?;
                        expr = Expr::Index(Box::new(IndexExpr {
                            x: expr,
                            lbrack,
                            index,
                            rbrack,
                            node_id,
                        }));
                    } else {
                        expr = Expr::Slice(Box::new(SliceExpr {
                            x: expr,
                            lbrack,
                            low,
                            colon1: colon1.expect("slice colon"),
                            high,
                            colon2,
                            max,
                            rbrack,
                            node_id,
                        }));
                    }
                }
                TokKind::LBrace if self.composite_allowed(&expr) => {
                    expr = self.parse_composite_body(Some(expr))?;
                }
                _ => return Ok(expr),
            }
        }
    }

    /// Whether a `{` after `expr` opens a composite literal.
    fn composite_allowed(&self, base: &Expr) -> bool {
        match base {
            Expr::Ident(_) | Expr::Selector(_) => !self.no_lit,
            Expr::ArrayType(_) | Expr::MapType(_) | Expr::StructType(_) => true,
            _ => false,
        }
    }

    fn parse_composite_body(&mut self, ty: Option<Expr>) -> Result<Expr> {
        let lbrace = self.expect(TokKind::LBrace, "'{'")?;
        let node_id = self.next_id();
        let (elts, commas) = self.with_no_lit(false, |p| {
            let mut elts = Vec::new();
            let mut commas = Vec::new();
            while p.peek_kind() != TokKind::RBrace && p.peek_kind() != TokKind::Eof {
                elts.push(p.parse_element()?);
                match p.eat(TokKind::Comma) {
                    Some(comma) => commas.push(comma),
                    None => break,
                }
            }
            Ok((elts, commas))
        })?;
        let rbrace = self.expect(TokKind::RBrace, "'}'")?;
        Ok(Expr::Composite(Box::new(CompositeLit {
            ty,
            lbrace,
            elts,
            commas,
            rbrace,
            node_id,
        })))
    }

    /// One composite-literal element: `value`, `key: value`, or a nested
    /// untyped literal `{...}`.
    fn parse_element(&mut self) -> Result<Expr> {
        let key_or_value = if self.peek_kind() == TokKind::LBrace {
            self.parse_composite_body(None)?
        } else {
            self.parse_expr()?
        };
        if self.peek_kind() == TokKind::Colon {
            let colon = self.advance();
            let node_id = self.next_id();
            let value = if self.peek_kind() == TokKind::LBrace {
                self.parse_composite_body(None)?
            } else {
                self.parse_expr()?
            };
            Ok(Expr::KeyValue(Box::new(KeyValueExpr {
                key: key_or_value,
                colon,
                value,
                node_id,
            })))
        } else {
            Ok(key_or_value)
        }
    }

    fn parse_operand(&mut self) -> Result<Expr> {
        match self.peek_kind() {
            TokKind::Ident => {
                let id = self.parse_ident("expression")?;
                Ok(Expr::Ident(id))
            }
            TokKind::Int | TokKind::Float | TokKind::Rune | TokKind::Str | TokKind::RawStr => {
                let tok = self.advance();
                let node_id = self.next_id();
                Ok(Expr::Lit(BasicLit { tok, node_id }))
            }
            TokKind::LParen => {
                let lparen = self.advance();
                let node_id = self.next_id();
                let inner = self.with_no_lit(false, |p| p.parse_expr())?;
                let rparen = self.expect(TokKind::RParen, "')'")?;
                Ok(Expr::Paren(Box::new(ParenExpr {
                    lparen,
                    inner,
                    rparen,
                    node_id,
                })))
            }
            TokKind::Func => {
                let func_tok = self.advance();
                let node_id = self.next_id();
                let sig = self.parse_func_sig()?;
                if self.peek_kind() == TokKind::LBrace {
                    let body = self.with_no_lit(false, |p| p.parse_block())?;
                    Ok(Expr::FuncLit(Box::new(FuncLit {
                        func_tok,
                        sig,
                        body,
                        node_id,
                    })))
                } else {
                    Ok(Expr::FuncType(Box::new(FuncType {
                        func_tok,
                        sig,
                        node_id,
                    })))
                }
            }
            TokKind::LBrack
            | TokKind::Map
            | TokKind::Chan
            | TokKind::Struct
            | TokKind::Interface => self.parse_type(),
            _ => Err(self.error("expression")),
        }
    }

    pub fn parse_type(&mut self) -> Result<Expr> {
        match self.peek_kind() {
            TokKind::Ident => {
                let mut expr = Expr::Ident(self.parse_ident("type")?);
                while self.peek_kind() == TokKind::Dot && self.peek_kind_at(1) == TokKind::Ident {
                    let dot = self.advance();
                    let sel = self.parse_ident("selector")?;
                    let node_id = self.next_id();
                    expr = Expr::Selector(Box::new(SelectorExpr {
                        x: expr,
                        dot,
                        sel,
                        node_id,
                    }));
                }
                Ok(expr)
            }
            TokKind::Star => {
                let star = self.advance();
                let node_id = self.next_id();
                let x = self.parse_type()?;
                Ok(Expr::Star(Box::new(StarExpr { star, x, node_id })))
            }
            TokKind::LParen => {
                let lparen = self.advance();
                let node_id = self.next_id();
                let inner = self.parse_type()?;
                let rparen = self.expect(TokKind::RParen, "')'")?;
                Ok(Expr::Paren(Box::new(ParenExpr {
                    lparen,
                    inner,
                    rparen,
                    node_id,
                })))
            }
            TokKind::LBrack => {
                let lbrack = self.advance();
                let node_id = self.next_id();
                let len = match self.peek_kind() {
                    TokKind::RBrack => None,
                    TokKind::Ellipsis => {
                        let tok = self.advance();
                        let ell_id = self.next_id();
                        Some(Expr::Ellipsis(Box::new(EllipsisExpr {
                            tok,
                            elem: None,
                            node_id: ell_id,
                        })))
                    }
                    _ => Some(self.with_no_lit(false, |p| p.parse_expr())?),
                };
                let rbrack = self.expect(TokKind::RBrack, "']'")?;
                let elem = self.parse_type()?;
                Ok(Expr::ArrayType(Box::new(ArrayType {
                    lbrack,
                    len,
                    rbrack,
                    elem,
                    node_id,
                })))
            }
            TokKind::Map => {
                let map_tok = self.advance();
                let node_id = self.next_id();
                let lbrack = self.expect(TokKind::LBrack, "'['")?;
                let key = self.parse_type()?;
                let rbrack = self.expect(TokKind::RBrack, "']'")?;
                let value = self.parse_type()?;
                Ok(Expr::MapType(Box::new(MapType {
                    map_tok,
                    lbrack,
                    key,
                    rbrack,
                    value,
                    node_id,
                })))
            }
            TokKind::Chan => {
                let chan_tok = self.advance();
                let node_id = self.next_id();
                let arrow_after = self.eat(TokKind::Arrow);
                let elem = self.parse_type()?;
                Ok(Expr::ChanType(Box::new(ChanType {
                    arrow_before: None,
                    chan_tok,
                    arrow_after,
                    elem,
                    node_id,
                })))
            }
            TokKind::Arrow => {
                let arrow = self.advance();
                let node_id = self.next_id();
                let chan_tok = self.expect(TokKind::Chan, "'chan'")?;
                let elem = self.parse_type()?;
                Ok(Expr::ChanType(Box::new(ChanType {
                    arrow_before: Some(arrow),
                    chan_tok,
                    arrow_after: None,
                    elem,
                    node_id,
                })))
            }
            TokKind::Func => {
                let func_tok = self.advance();
                let node_id = self.next_id();
                let sig = self.parse_func_sig()?;
                Ok(Expr::FuncType(Box::new(FuncType {
                    func_tok,
                    sig,
                    node_id,
                })))
            }
            TokKind::Struct => {
                let struct_tok = self.advance();
                let node_id = self.next_id();
                let (lbrace, body, rbrace) = self.parse_raw_body()?;
                Ok(Expr::StructType(Box::new(StructType {
                    struct_tok,
                    lbrace,
                    body,
                    rbrace,
                    node_id,
                })))
            }
            TokKind::Interface => {
                let interface_tok = self.advance();
                let node_id = self.next_id();
                let (lbrace, body, rbrace) = self.parse_raw_body()?;
                Ok(Expr::InterfaceType(Box::new(InterfaceType {
                    interface_tok,
                    lbrace,
                    body,
                    rbrace,
                    node_id,
                })))
            }
            _ => Err(self.error("type")),
        }
    }

    /// A balanced `{ ... }` token run for struct and interface bodies.
    fn parse_raw_body(&mut self) -> Result<(Token, Vec<Token>, Token)> {
        let lbrace = self.expect(TokKind::LBrace, "'{'")?;
        let mut body = Vec::new();
        let mut depth = 1usize;
        loop {
            match self.peek_kind() {
                TokKind::Eof => return Err(self.error("'}'")),
                TokKind::LBrace => {
                    depth += 1;
                    body.push(self.advance());
                }
                TokKind::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        let rbrace = self.advance();
                        return Ok((lbrace, body, rbrace));
                    }
                    body.push(self.advance());
                }
                _ => body.push(self.advance()),
            }
        }
    }
}

/// Attach a terminating semicolon to a simple statement.
fn attach_semi(stmt: &mut Stmt, semi: Option<Token>) {
    match stmt {
        Stmt::Expr(n) => n.semi = semi,
        Stmt::Send(n) => n.semi = semi,
        Stmt::IncDec(n) => n.semi = semi,
        Stmt::Assign(n) => n.semi = semi,
        Stmt::Return(n) => n.semi = semi,
        Stmt::Branch(n) => n.semi = semi,
        Stmt::Block(n) => n.semi = semi,
        Stmt::If(n) => n.semi = semi,
        Stmt::For(n) => n.semi = semi,
        Stmt::Switch(n) => n.semi = semi,
        Stmt::TypeSwitch(n) => n.semi = semi,
        Stmt::Select(n) => n.semi = semi,
        Stmt::Go(n) => n.semi = semi,
        Stmt::Defer(n) => n.semi = semi,
        Stmt::Decl(_) | Stmt::Labeled(_) | Stmt::Empty(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::traits::to_source;
    use crate::tokenizer::tokenize;

    fn parse(src: &str) -> File {
        let toks = tokenize(src).expect("tokenize error");
        Parser::new(toks)
            .parse_file()
            .unwrap_or_else(|e| panic!("{} doesn't parse: {}", src, e))
    }

    fn roundtrip(src: &str) {
        assert_eq!(to_source(&parse(src)), src, "round trip of {:?}", src);
    }

    #[test]
    fn roundtrip_functions_and_methods() {
        roundtrip("package p\n\nfunc f(a, b int) int {\n\treturn a + b\n}\n");
        roundtrip("package p\n\nfunc (t *T) m() bool {\n\treturn t.ok\n}\n");
        roundtrip("package p\n\nfunc f(xs ...int) (n int, err error) {\n\treturn\n}\n");
        roundtrip("package p\n\nfunc external()\n");
    }

    #[test]
    fn roundtrip_if_chains() {
        roundtrip(
            "package p\n\nfunc f(x int) int {\n\tif x > 0 {\n\t\treturn 1\n\t} else if x < 0 {\n\t\treturn -1\n\t} else {\n\t\treturn 0\n\t}\n}\n",
        );
        roundtrip("package p\n\nfunc f() {\n\tif v, ok := m[k]; ok {\n\t\tuse(v)\n\t}\n}\n");
    }

    #[test]
    fn roundtrip_for_variants() {
        roundtrip("package p\n\nfunc f() {\n\tfor {\n\t\tbreak\n\t}\n}\n");
        roundtrip("package p\n\nfunc f() {\n\tfor i := 0; i < 10; i++ {\n\t\tcontinue\n\t}\n}\n");
        roundtrip("package p\n\nfunc f() {\n\tfor x > 0 {\n\t\tx--\n\t}\n}\n");
        roundtrip("package p\n\nfunc f() {\n\tfor k, v := range m {\n\t\tuse(k, v)\n\t}\n}\n");
        roundtrip("package p\n\nfunc f() {\n\tfor range ticks {\n\t\tn++\n\t}\n}\n");
        roundtrip("package p\n\nfunc f() {\n\tfor ; x > 0; x-- {\n\t}\n}\n");
    }

    #[test]
    fn roundtrip_switches() {
        roundtrip(
            "package p\n\nfunc f(s string) int {\n\tswitch s {\n\tcase \"a\", \"b\":\n\t\treturn 1\n\tdefault:\n\t\treturn 0\n\t}\n}\n",
        );
        roundtrip(
            "package p\n\nfunc f() {\n\tswitch x := next(); x.kind {\n\tcase blue:\n\t}\n}\n",
        );
        roundtrip(
            "package p\n\nfunc f() {\n\tswitch {\n\tcase a && b:\n\t\tg()\n\t}\n}\n",
        );
    }

    #[test]
    fn roundtrip_type_switch() {
        roundtrip(
            "package p\n\nfunc f(x interface{}) {\n\tswitch v := x.(type) {\n\tcase int:\n\t\tuse(v)\n\tcase *T, nil:\n\tdefault:\n\t}\n}\n",
        );
        roundtrip(
            "package p\n\nfunc f(x interface{}) {\n\tswitch x.(type) {\n\tcase string:\n\t}\n}\n",
        );
    }

    #[test]
    fn roundtrip_select_and_channels() {
        roundtrip(
            "package p\n\nfunc f(ch chan int, done <-chan bool) {\n\tselect {\n\tcase v := <-ch:\n\t\tuse(v)\n\tcase ch <- 1:\n\tdefault:\n\t}\n}\n",
        );
        roundtrip("package p\n\nfunc f() {\n\tgo worker()\n\tdefer cleanup()\n}\n");
    }

    #[test]
    fn roundtrip_declarations() {
        roundtrip(
            "package p\n\nimport (\n\t\"fmt\"\n\tmyos \"os\"\n)\n\nvar (\n\ta = 1\n\tb, c int\n)\n\nconst answer = 42\n",
        );
        roundtrip(
            "package p\n\ntype Shape interface {\n\tArea() float64\n}\n\ntype point struct {\n\tx, y int\n}\n",
        );
        roundtrip("package p\n\ntype alias = point\n");
    }

    #[test]
    fn roundtrip_labels_and_goto() {
        roundtrip(
            "package p\n\nfunc f() {\nloop:\n\tfor {\n\t\tbreak loop\n\t}\n\tgoto loop\n}\n",
        );
    }

    #[test]
    fn roundtrip_expressions() {
        roundtrip(
            "package p\n\nvar x = a.b[i].c(1, \"two\", v...) + ys[1:2] - *p&m ^ (n % 3)\n",
        );
        roundtrip("package p\n\nvar f = func(a int) bool { return a > 0 }\n");
        roundtrip("package p\n\nvar m = map[string][]int{\"a\": {1, 2}}\n");
        roundtrip("package p\n\nvar t = T{x: 1, y: call(2)}\n")
    }

    #[test]
    fn roundtrip_preserves_comments() {
        roundtrip(
            "//go:build linux\n// +build linux\n\n// Package p does things.\npackage p\n\n// f is documented.\nfunc f() { /* inline */ }\n",
        );
    }

    #[test]
    fn header_brace_opens_body_not_literal() {
        let file = parse(
            "package p\n\nfunc f() {\n\tif x == y {\n\t\tg()\n\t}\n}\n",
        );
        let func = match &file.decls[0] {
            Decl::Func(f) => f,
            other => panic!("expected func, got {:?}", other),
        };
        let body = func.body.as_ref().expect("body");
        match &body.stmts[0] {
            Stmt::If(stmt) => {
                assert!(matches!(stmt.cond, Expr::Binary(_)));
                assert_eq!(stmt.body.stmts.len(), 1);
            }
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn parenthesized_literal_allowed_in_header() {
        roundtrip("package p\n\nfunc f() {\n\tif v := (T{1}); v.ok {\n\t\tg()\n\t}\n}\n");
    }

    #[test]
    fn type_switch_bind_is_recognized() {
        let file = parse(
            "package p\n\nfunc f(x interface{}) {\n\tswitch v := x.(type) {\n\tcase int:\n\t}\n}\n",
        );
        let func = match &file.decls[0] {
            Decl::Func(f) => f,
            other => panic!("expected func, got {:?}", other),
        };
        let body = func.body.as_ref().expect("body");
        match &body.stmts[0] {
            Stmt::TypeSwitch(stmt) => {
                let bind = stmt.bind.as_ref().expect("bind");
                assert_eq!(bind.name.tok.text, "v");
                assert_eq!(stmt.clauses.len(), 1);
            }
            other => panic!("expected type switch, got {:?}", other),
        }
    }

    #[test]
    fn error_reports_expected_and_found() {
        let toks = tokenize("package p\n\nfunc f(] {}\n").expect("tokenize error");
        let err = Parser::new(toks).parse_file().unwrap_err();
        assert!(err.to_string().contains("expected"));
        assert_eq!(err.pos.line, 3);
    }
}
