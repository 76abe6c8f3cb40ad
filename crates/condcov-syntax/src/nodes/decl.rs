//! Top-level declarations and the file node.

use crate::nodes::expr::{Expr, FuncSig, Ident, Param};
use crate::nodes::stmt::Block;
use crate::nodes::traits::{Codegen, CodegenState, NodeId, NodeIdGenerator};
use crate::tokenizer::{TokKind, Token};

#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Func(Box<FuncDecl>),
    Gen(Box<GenDecl>),
}

impl Codegen for Decl {
    fn codegen(&self, state: &mut CodegenState) {
        match self {
            Decl::Func(d) => d.codegen(state),
            Decl::Gen(d) => d.codegen(state),
        }
    }
}

/// A method receiver, `(name *T)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Receiver {
    pub lparen: Token,
    pub param: Param,
    pub rparen: Token,
}

impl Codegen for Receiver {
    fn codegen(&self, state: &mut CodegenState) {
        state.tok(&self.lparen);
        self.param.codegen(state);
        state.tok(&self.rparen);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub func_tok: Token,
    pub recv: Option<Receiver>,
    pub name: Ident,
    pub sig: FuncSig,
    /// Absent for assembly-backed declarations.
    pub body: Option<Block>,
    pub semi: Option<Token>,
    pub node_id: NodeId,
}

impl Codegen for FuncDecl {
    fn codegen(&self, state: &mut CodegenState) {
        state.tok(&self.func_tok);
        self.recv.codegen(state);
        self.name.codegen(state);
        self.sig.codegen(state);
        self.body.codegen(state);
        self.semi.codegen(state);
    }
}

/// An `import`, `const`, `var` or `type` declaration, possibly a
/// parenthesized group.
#[derive(Debug, Clone, PartialEq)]
pub struct GenDecl {
    pub tok: Token,
    pub lparen: Option<Token>,
    pub specs: Vec<Spec>,
    pub rparen: Option<Token>,
    pub semi: Option<Token>,
    pub node_id: NodeId,
}

impl GenDecl {
    pub fn is_const(&self) -> bool {
        self.tok.kind == TokKind::Const
    }
}

impl Codegen for GenDecl {
    fn codegen(&self, state: &mut CodegenState) {
        state.tok(&self.tok);
        self.lparen.codegen(state);
        for spec in &self.specs {
            spec.codegen(state);
        }
        self.rparen.codegen(state);
        self.semi.codegen(state);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Spec {
    Import(ImportSpec),
    Value(ValueSpec),
    Type(TypeSpec),
}

impl Codegen for Spec {
    fn codegen(&self, state: &mut CodegenState) {
        match self {
            Spec::Import(s) => s.codegen(state),
            Spec::Value(s) => s.codegen(state),
            Spec::Type(s) => s.codegen(state),
        }
    }
}

/// `[name|.] "path"`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSpec {
    /// A rename identifier or a `.` token.
    pub name: Option<Token>,
    pub path: Token,
    pub semi: Option<Token>,
}

impl ImportSpec {
    /// The unquoted import path.
    pub fn path_value(&self) -> &str {
        self.path.text.trim_matches('"')
    }
}

impl Codegen for ImportSpec {
    fn codegen(&self, state: &mut CodegenState) {
        self.name.codegen(state);
        state.tok(&self.path);
        self.semi.codegen(state);
    }
}

/// `names [type] [= values]` in a `const` or `var` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueSpec {
    pub names: Vec<Ident>,
    pub commas: Vec<Token>,
    pub ty: Option<Expr>,
    pub assign: Option<Token>,
    pub values: Vec<Expr>,
    pub value_commas: Vec<Token>,
    pub semi: Option<Token>,
}

impl Codegen for ValueSpec {
    fn codegen(&self, state: &mut CodegenState) {
        for (i, name) in self.names.iter().enumerate() {
            name.codegen(state);
            if let Some(comma) = self.commas.get(i) {
                state.tok(comma);
            }
        }
        self.ty.codegen(state);
        self.assign.codegen(state);
        for (i, value) in self.values.iter().enumerate() {
            value.codegen(state);
            if let Some(comma) = self.value_commas.get(i) {
                state.tok(comma);
            }
        }
        self.semi.codegen(state);
    }
}

/// `name [=] type` in a `type` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    pub name: Ident,
    /// Present for a type alias.
    pub assign: Option<Token>,
    pub ty: Expr,
    pub semi: Option<Token>,
}

impl Codegen for TypeSpec {
    fn codegen(&self, state: &mut CodegenState) {
        self.name.codegen(state);
        self.assign.codegen(state);
        self.ty.codegen(state);
        self.semi.codegen(state);
    }
}

/// A parsed source file.
///
/// The file keeps the [`NodeIdGenerator`] that assigned its node ids, so
/// later passes can synthesize nodes with fresh, non-colliding ids.
#[derive(Debug, Clone)]
pub struct File {
    pub package_tok: Token,
    pub name: Ident,
    pub semi: Option<Token>,
    pub decls: Vec<Decl>,
    /// End-of-file token; its leading trivia is the file's trailing trivia.
    pub eof: Token,
    pub ids: NodeIdGenerator,
}

impl File {
    pub fn package_name(&self) -> &str {
        self.name.name()
    }
}

impl Codegen for File {
    fn codegen(&self, state: &mut CodegenState) {
        state.tok(&self.package_tok);
        self.name.codegen(state);
        self.semi.codegen(state);
        for decl in &self.decls {
            decl.codegen(state);
        }
        state.tok(&self.eof);
    }
}
