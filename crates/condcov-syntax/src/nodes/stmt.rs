//! Statement nodes.
//!
//! Every statement stores its terminating semicolon token when one was
//! consumed. Virtual semicolons (from semicolon insertion) have empty text,
//! so printing them is a no-op and round-trip output stays byte-identical.

use crate::nodes::decl::GenDecl;
use crate::nodes::expr::{Expr, Ident};
use crate::nodes::traits::{Codegen, CodegenState, NodeId};
use crate::tokenizer::{Pos, Token};

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expr(Box<ExprStmt>),
    Send(Box<SendStmt>),
    IncDec(Box<IncDecStmt>),
    Assign(Box<AssignStmt>),
    Decl(Box<DeclStmt>),
    Return(Box<ReturnStmt>),
    Branch(Box<BranchStmt>),
    Block(Box<BlockStmt>),
    If(Box<IfStmt>),
    For(Box<ForStmt>),
    Switch(Box<SwitchStmt>),
    TypeSwitch(Box<TypeSwitchStmt>),
    Select(Box<SelectStmt>),
    Labeled(Box<LabeledStmt>),
    Go(Box<GoStmt>),
    Defer(Box<DeferStmt>),
    Empty(Box<EmptyStmt>),
}

impl Stmt {
    pub fn node_id(&self) -> NodeId {
        match self {
            Stmt::Expr(n) => n.node_id,
            Stmt::Send(n) => n.node_id,
            Stmt::IncDec(n) => n.node_id,
            Stmt::Assign(n) => n.node_id,
            Stmt::Decl(n) => n.node_id,
            Stmt::Return(n) => n.node_id,
            Stmt::Branch(n) => n.node_id,
            Stmt::Block(n) => n.node_id,
            Stmt::If(n) => n.node_id,
            Stmt::For(n) => n.node_id,
            Stmt::Switch(n) => n.node_id,
            Stmt::TypeSwitch(n) => n.node_id,
            Stmt::Select(n) => n.node_id,
            Stmt::Labeled(n) => n.node_id,
            Stmt::Go(n) => n.node_id,
            Stmt::Defer(n) => n.node_id,
            Stmt::Empty(n) => n.node_id,
        }
    }

    /// The position of the statement's leftmost token.
    pub fn pos(&self) -> Pos {
        match self {
            Stmt::Expr(n) => n.expr.pos(),
            Stmt::Send(n) => n.chan.pos(),
            Stmt::IncDec(n) => n.expr.pos(),
            Stmt::Assign(n) => match n.lhs.first() {
                Some(e) => e.pos(),
                None => n.op.pos,
            },
            Stmt::Decl(n) => n.decl.tok.pos,
            Stmt::Return(n) => n.return_tok.pos,
            Stmt::Branch(n) => n.tok.pos,
            Stmt::Block(n) => n.block.lbrace.pos,
            Stmt::If(n) => n.if_tok.pos,
            Stmt::For(n) => n.for_tok.pos,
            Stmt::Switch(n) => n.switch_tok.pos,
            Stmt::TypeSwitch(n) => n.switch_tok.pos,
            Stmt::Select(n) => n.select_tok.pos,
            Stmt::Labeled(n) => n.label.tok.pos,
            Stmt::Go(n) => n.go_tok.pos,
            Stmt::Defer(n) => n.defer_tok.pos,
            Stmt::Empty(n) => n.semi.pos,
        }
    }
}

impl Codegen for Stmt {
    fn codegen(&self, state: &mut CodegenState) {
        match self {
            Stmt::Expr(n) => n.codegen(state),
            Stmt::Send(n) => n.codegen(state),
            Stmt::IncDec(n) => n.codegen(state),
            Stmt::Assign(n) => n.codegen(state),
            Stmt::Decl(n) => n.codegen(state),
            Stmt::Return(n) => n.codegen(state),
            Stmt::Branch(n) => n.codegen(state),
            Stmt::Block(n) => n.codegen(state),
            Stmt::If(n) => n.codegen(state),
            Stmt::For(n) => n.codegen(state),
            Stmt::Switch(n) => n.codegen(state),
            Stmt::TypeSwitch(n) => n.codegen(state),
            Stmt::Select(n) => n.codegen(state),
            Stmt::Labeled(n) => n.codegen(state),
            Stmt::Go(n) => n.codegen(state),
            Stmt::Defer(n) => n.codegen(state),
            Stmt::Empty(n) => n.codegen(state),
        }
    }
}

/// A braced statement list.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub lbrace: Token,
    pub stmts: Vec<Stmt>,
    pub rbrace: Token,
}

impl Codegen for Block {
    fn codegen(&self, state: &mut CodegenState) {
        state.tok(&self.lbrace);
        for stmt in &self.stmts {
            stmt.codegen(state);
        }
        state.tok(&self.rbrace);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub expr: Expr,
    pub semi: Option<Token>,
    pub node_id: NodeId,
}

impl Codegen for ExprStmt {
    fn codegen(&self, state: &mut CodegenState) {
        self.expr.codegen(state);
        self.semi.codegen(state);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SendStmt {
    pub chan: Expr,
    pub arrow: Token,
    pub value: Expr,
    pub semi: Option<Token>,
    pub node_id: NodeId,
}

impl Codegen for SendStmt {
    fn codegen(&self, state: &mut CodegenState) {
        self.chan.codegen(state);
        state.tok(&self.arrow);
        self.value.codegen(state);
        self.semi.codegen(state);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IncDecStmt {
    pub expr: Expr,
    pub op: Token,
    pub semi: Option<Token>,
    pub node_id: NodeId,
}

impl Codegen for IncDecStmt {
    fn codegen(&self, state: &mut CodegenState) {
        self.expr.codegen(state);
        state.tok(&self.op);
        self.semi.codegen(state);
    }
}

/// Assignment, compound assignment or short variable declaration,
/// distinguished by the operator token (`=`, `+=`, ..., `:=`).
#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub lhs: Vec<Expr>,
    pub lhs_commas: Vec<Token>,
    pub op: Token,
    pub rhs: Vec<Expr>,
    pub rhs_commas: Vec<Token>,
    pub semi: Option<Token>,
    pub node_id: NodeId,
}

impl AssignStmt {
    /// True for a `:=` short variable declaration.
    pub fn is_define(&self) -> bool {
        self.op.kind == crate::tokenizer::TokKind::Define
    }

    /// Names declared by a `:=`, ignoring the blank identifier.
    pub fn declared_names(&self) -> Vec<&str> {
        if !self.is_define() {
            return Vec::new();
        }
        self.lhs
            .iter()
            .filter_map(|e| match e {
                Expr::Ident(id) if id.name() != "_" => Some(id.name()),
                _ => None,
            })
            .collect()
    }
}

impl Codegen for AssignStmt {
    fn codegen(&self, state: &mut CodegenState) {
        for (i, lhs) in self.lhs.iter().enumerate() {
            lhs.codegen(state);
            if let Some(comma) = self.lhs_commas.get(i) {
                state.tok(comma);
            }
        }
        state.tok(&self.op);
        for (i, rhs) in self.rhs.iter().enumerate() {
            rhs.codegen(state);
            if let Some(comma) = self.rhs_commas.get(i) {
                state.tok(comma);
            }
        }
        self.semi.codegen(state);
    }
}

/// A `const`, `var` or `type` declaration in statement position.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclStmt {
    pub decl: GenDecl,
    pub node_id: NodeId,
}

impl Codegen for DeclStmt {
    fn codegen(&self, state: &mut CodegenState) {
        self.decl.codegen(state);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub return_tok: Token,
    pub results: Vec<Expr>,
    pub commas: Vec<Token>,
    pub semi: Option<Token>,
    pub node_id: NodeId,
}

impl Codegen for ReturnStmt {
    fn codegen(&self, state: &mut CodegenState) {
        state.tok(&self.return_tok);
        for (i, result) in self.results.iter().enumerate() {
            result.codegen(state);
            if let Some(comma) = self.commas.get(i) {
                state.tok(comma);
            }
        }
        self.semi.codegen(state);
    }
}

/// `break`, `continue`, `goto` or `fallthrough`.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchStmt {
    pub tok: Token,
    pub label: Option<Ident>,
    pub semi: Option<Token>,
    pub node_id: NodeId,
}

impl Codegen for BranchStmt {
    fn codegen(&self, state: &mut CodegenState) {
        state.tok(&self.tok);
        self.label.codegen(state);
        self.semi.codegen(state);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt {
    pub block: Block,
    pub semi: Option<Token>,
    pub node_id: NodeId,
}

impl Codegen for BlockStmt {
    fn codegen(&self, state: &mut CodegenState) {
        self.block.codegen(state);
        self.semi.codegen(state);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub if_tok: Token,
    pub init: Option<Stmt>,
    pub init_semi: Option<Token>,
    pub cond: Expr,
    pub body: Block,
    pub else_tok: Option<Token>,
    pub else_branch: Option<ElseBranch>,
    pub semi: Option<Token>,
    pub node_id: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElseBranch {
    If(Box<IfStmt>),
    Block(Block),
}

impl Codegen for ElseBranch {
    fn codegen(&self, state: &mut CodegenState) {
        match self {
            ElseBranch::If(stmt) => stmt.codegen(state),
            ElseBranch::Block(block) => block.codegen(state),
        }
    }
}

impl Codegen for IfStmt {
    fn codegen(&self, state: &mut CodegenState) {
        state.tok(&self.if_tok);
        self.init.codegen(state);
        self.init_semi.codegen(state);
        self.cond.codegen(state);
        self.body.codegen(state);
        self.else_tok.codegen(state);
        self.else_branch.codegen(state);
        self.semi.codegen(state);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub for_tok: Token,
    pub header: ForHeader,
    pub body: Block,
    pub semi: Option<Token>,
    pub node_id: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForHeader {
    /// `for { ... }`
    Infinite,
    /// `for cond { ... }`
    Cond(Expr),
    /// `for init; cond; post { ... }`
    Clause {
        init: Option<Box<Stmt>>,
        semi1: Token,
        cond: Option<Expr>,
        semi2: Token,
        post: Option<Box<Stmt>>,
    },
    /// `for [lhs :=|= ] range x { ... }`
    Range {
        lhs: Vec<Expr>,
        commas: Vec<Token>,
        op: Option<Token>,
        range_tok: Token,
        x: Expr,
    },
}

impl Codegen for ForHeader {
    fn codegen(&self, state: &mut CodegenState) {
        match self {
            ForHeader::Infinite => {}
            ForHeader::Cond(cond) => cond.codegen(state),
            ForHeader::Clause {
                init,
                semi1,
                cond,
                semi2,
                post,
            } => {
                init.codegen(state);
                state.tok(semi1);
                cond.codegen(state);
                state.tok(semi2);
                post.codegen(state);
            }
            ForHeader::Range {
                lhs,
                commas,
                op,
                range_tok,
                x,
            } => {
                for (i, e) in lhs.iter().enumerate() {
                    e.codegen(state);
                    if let Some(comma) = commas.get(i) {
                        state.tok(comma);
                    }
                }
                op.codegen(state);
                state.tok(range_tok);
                x.codegen(state);
            }
        }
    }
}

impl Codegen for ForStmt {
    fn codegen(&self, state: &mut CodegenState) {
        state.tok(&self.for_tok);
        self.header.codegen(state);
        self.body.codegen(state);
        self.semi.codegen(state);
    }
}

/// An expression switch; `tag` is absent for the tagless form.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStmt {
    pub switch_tok: Token,
    pub init: Option<Stmt>,
    pub init_semi: Option<Token>,
    pub tag: Option<Expr>,
    pub lbrace: Token,
    pub clauses: Vec<CaseClause>,
    pub rbrace: Token,
    pub semi: Option<Token>,
    pub node_id: NodeId,
}

impl Codegen for SwitchStmt {
    fn codegen(&self, state: &mut CodegenState) {
        state.tok(&self.switch_tok);
        self.init.codegen(state);
        self.init_semi.codegen(state);
        self.tag.codegen(state);
        state.tok(&self.lbrace);
        for clause in &self.clauses {
            clause.codegen(state);
        }
        state.tok(&self.rbrace);
        self.semi.codegen(state);
    }
}

/// One `case e1, e2:` or `default:` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseClause {
    pub case_tok: Token,
    pub exprs: Vec<Expr>,
    pub commas: Vec<Token>,
    pub colon: Token,
    pub stmts: Vec<Stmt>,
    pub node_id: NodeId,
}

impl CaseClause {
    pub fn is_default(&self) -> bool {
        self.case_tok.kind == crate::tokenizer::TokKind::Default
    }
}

impl Codegen for CaseClause {
    fn codegen(&self, state: &mut CodegenState) {
        state.tok(&self.case_tok);
        for (i, expr) in self.exprs.iter().enumerate() {
            expr.codegen(state);
            if let Some(comma) = self.commas.get(i) {
                state.tok(comma);
            }
        }
        state.tok(&self.colon);
        for stmt in &self.stmts {
            stmt.codegen(state);
        }
    }
}

/// The `v :=` binding of a type switch guard.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSwitchBind {
    pub name: Ident,
    pub define: Token,
}

impl Codegen for TypeSwitchBind {
    fn codegen(&self, state: &mut CodegenState) {
        self.name.codegen(state);
        state.tok(&self.define);
    }
}

/// `switch [init;] [v :=] x.(type) { ... }`.
///
/// `guard` is always a [`Expr::TypeAssert`] whose target is the `type`
/// keyword.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSwitchStmt {
    pub switch_tok: Token,
    pub init: Option<Stmt>,
    pub init_semi: Option<Token>,
    pub bind: Option<TypeSwitchBind>,
    pub guard: Expr,
    pub lbrace: Token,
    pub clauses: Vec<CaseClause>,
    pub rbrace: Token,
    pub semi: Option<Token>,
    pub node_id: NodeId,
}

impl TypeSwitchStmt {
    /// The expression being switched on (the `x` of `x.(type)`).
    pub fn guard_expr(&self) -> &Expr {
        match &self.guard {
            Expr::TypeAssert(assert) => &assert.x,
            other => other,
        }
    }
}

impl Codegen for TypeSwitchStmt {
    fn codegen(&self, state: &mut CodegenState) {
        state.tok(&self.switch_tok);
        self.init.codegen(state);
        self.init_semi.codegen(state);
        self.bind.codegen(state);
        self.guard.codegen(state);
        state.tok(&self.lbrace);
        for clause in &self.clauses {
            clause.codegen(state);
        }
        state.tok(&self.rbrace);
        self.semi.codegen(state);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStmt {
    pub select_tok: Token,
    pub lbrace: Token,
    pub clauses: Vec<CommClause>,
    pub rbrace: Token,
    pub semi: Option<Token>,
    pub node_id: NodeId,
}

impl Codegen for SelectStmt {
    fn codegen(&self, state: &mut CodegenState) {
        state.tok(&self.select_tok);
        state.tok(&self.lbrace);
        for clause in &self.clauses {
            clause.codegen(state);
        }
        state.tok(&self.rbrace);
        self.semi.codegen(state);
    }
}

/// One `case <comm>:` or `default:` clause of a select statement.
#[derive(Debug, Clone, PartialEq)]
pub struct CommClause {
    pub case_tok: Token,
    pub comm: Option<Stmt>,
    pub colon: Token,
    pub stmts: Vec<Stmt>,
    pub node_id: NodeId,
}

impl Codegen for CommClause {
    fn codegen(&self, state: &mut CodegenState) {
        state.tok(&self.case_tok);
        self.comm.codegen(state);
        state.tok(&self.colon);
        for stmt in &self.stmts {
            stmt.codegen(state);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabeledStmt {
    pub label: Ident,
    pub colon: Token,
    pub stmt: Option<Stmt>,
    pub node_id: NodeId,
}

impl Codegen for LabeledStmt {
    fn codegen(&self, state: &mut CodegenState) {
        self.label.codegen(state);
        state.tok(&self.colon);
        self.stmt.codegen(state);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoStmt {
    pub go_tok: Token,
    pub call: Expr,
    pub semi: Option<Token>,
    pub node_id: NodeId,
}

impl Codegen for GoStmt {
    fn codegen(&self, state: &mut CodegenState) {
        state.tok(&self.go_tok);
        self.call.codegen(state);
        self.semi.codegen(state);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeferStmt {
    pub defer_tok: Token,
    pub call: Expr,
    pub semi: Option<Token>,
    pub node_id: NodeId,
}

impl Codegen for DeferStmt {
    fn codegen(&self, state: &mut CodegenState) {
        state.tok(&self.defer_tok);
        self.call.codegen(state);
        self.semi.codegen(state);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmptyStmt {
    pub semi: Token,
    pub node_id: NodeId,
}

impl Codegen for EmptyStmt {
    fn codegen(&self, state: &mut CodegenState) {
        state.tok(&self.semi);
    }
}
