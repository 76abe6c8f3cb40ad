//! Expression nodes.
//!
//! Types are expressions here, as in the target language's own syntax tree:
//! `[]byte`, `map[string]int` and `*T` all parse into the [`Expr`] union.
//! Struct and interface type bodies are kept as opaque balanced token runs;
//! nothing inside them can be a condition, and keeping them opaque preserves
//! their text exactly.

use crate::nodes::stmt::Block;
use crate::nodes::traits::{Codegen, CodegenState, NodeId};
use crate::tokenizer::{Pos, Token};

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(Ident),
    Lit(BasicLit),
    Unary(Box<UnaryExpr>),
    Binary(Box<BinaryExpr>),
    Paren(Box<ParenExpr>),
    Call(Box<CallExpr>),
    Selector(Box<SelectorExpr>),
    Index(Box<IndexExpr>),
    Slice(Box<SliceExpr>),
    TypeAssert(Box<TypeAssertExpr>),
    Composite(Box<CompositeLit>),
    KeyValue(Box<KeyValueExpr>),
    FuncLit(Box<FuncLit>),
    Star(Box<StarExpr>),
    Ellipsis(Box<EllipsisExpr>),
    ArrayType(Box<ArrayType>),
    MapType(Box<MapType>),
    ChanType(Box<ChanType>),
    FuncType(Box<FuncType>),
    StructType(Box<StructType>),
    InterfaceType(Box<InterfaceType>),
}

impl Expr {
    /// The leftmost token of the expression.
    pub fn first_token(&self) -> &Token {
        match self {
            Expr::Ident(n) => &n.tok,
            Expr::Lit(n) => &n.tok,
            Expr::Unary(n) => &n.op,
            Expr::Binary(n) => n.lhs.first_token(),
            Expr::Paren(n) => &n.lparen,
            Expr::Call(n) => n.fun.first_token(),
            Expr::Selector(n) => n.x.first_token(),
            Expr::Index(n) => n.x.first_token(),
            Expr::Slice(n) => n.x.first_token(),
            Expr::TypeAssert(n) => n.x.first_token(),
            Expr::Composite(n) => match &n.ty {
                Some(ty) => ty.first_token(),
                None => &n.lbrace,
            },
            Expr::KeyValue(n) => n.key.first_token(),
            Expr::FuncLit(n) => &n.func_tok,
            Expr::Star(n) => &n.star,
            Expr::Ellipsis(n) => &n.tok,
            Expr::ArrayType(n) => &n.lbrack,
            Expr::MapType(n) => &n.map_tok,
            Expr::ChanType(n) => match &n.arrow_before {
                Some(arrow) => arrow,
                None => &n.chan_tok,
            },
            Expr::FuncType(n) => &n.func_tok,
            Expr::StructType(n) => &n.struct_tok,
            Expr::InterfaceType(n) => &n.interface_tok,
        }
    }

    /// Mutable access to the leftmost token, for trivia transfer when an
    /// expression is moved into a synthesized wrapper.
    pub fn first_token_mut(&mut self) -> &mut Token {
        match self {
            Expr::Ident(n) => &mut n.tok,
            Expr::Lit(n) => &mut n.tok,
            Expr::Unary(n) => &mut n.op,
            Expr::Binary(n) => n.lhs.first_token_mut(),
            Expr::Paren(n) => &mut n.lparen,
            Expr::Call(n) => n.fun.first_token_mut(),
            Expr::Selector(n) => n.x.first_token_mut(),
            Expr::Index(n) => n.x.first_token_mut(),
            Expr::Slice(n) => n.x.first_token_mut(),
            Expr::TypeAssert(n) => n.x.first_token_mut(),
            Expr::Composite(n) => match &mut n.ty {
                Some(ty) => ty.first_token_mut(),
                None => &mut n.lbrace,
            },
            Expr::KeyValue(n) => n.key.first_token_mut(),
            Expr::FuncLit(n) => &mut n.func_tok,
            Expr::Star(n) => &mut n.star,
            Expr::Ellipsis(n) => &mut n.tok,
            Expr::ArrayType(n) => &mut n.lbrack,
            Expr::MapType(n) => &mut n.map_tok,
            Expr::ChanType(n) => match &mut n.arrow_before {
                Some(arrow) => arrow,
                None => &mut n.chan_tok,
            },
            Expr::FuncType(n) => &mut n.func_tok,
            Expr::StructType(n) => &mut n.struct_tok,
            Expr::InterfaceType(n) => &mut n.interface_tok,
        }
    }

    /// The position of the leftmost token.
    pub fn pos(&self) -> Pos {
        self.first_token().pos
    }

    /// The overriding file from a line directive, if one applies.
    pub fn file_override(&self) -> Option<&str> {
        self.first_token().file.as_deref()
    }

    pub fn node_id(&self) -> NodeId {
        match self {
            Expr::Ident(n) => n.node_id,
            Expr::Lit(n) => n.node_id,
            Expr::Unary(n) => n.node_id,
            Expr::Binary(n) => n.node_id,
            Expr::Paren(n) => n.node_id,
            Expr::Call(n) => n.node_id,
            Expr::Selector(n) => n.node_id,
            Expr::Index(n) => n.node_id,
            Expr::Slice(n) => n.node_id,
            Expr::TypeAssert(n) => n.node_id,
            Expr::Composite(n) => n.node_id,
            Expr::KeyValue(n) => n.node_id,
            Expr::FuncLit(n) => n.node_id,
            Expr::Star(n) => n.node_id,
            Expr::Ellipsis(n) => n.node_id,
            Expr::ArrayType(n) => n.node_id,
            Expr::MapType(n) => n.node_id,
            Expr::ChanType(n) => n.node_id,
            Expr::FuncType(n) => n.node_id,
            Expr::StructType(n) => n.node_id,
            Expr::InterfaceType(n) => n.node_id,
        }
    }

    /// True for `a == b`, `a != b`, `a < b`, `a <= b`, `a > b`, `a >= b`.
    pub fn is_comparison(&self) -> bool {
        match self {
            Expr::Binary(b) => b.op.kind.is_comparison(),
            _ => false,
        }
    }
}

impl Codegen for Expr {
    fn codegen(&self, state: &mut CodegenState) {
        match self {
            Expr::Ident(n) => n.codegen(state),
            Expr::Lit(n) => n.codegen(state),
            Expr::Unary(n) => n.codegen(state),
            Expr::Binary(n) => n.codegen(state),
            Expr::Paren(n) => n.codegen(state),
            Expr::Call(n) => n.codegen(state),
            Expr::Selector(n) => n.codegen(state),
            Expr::Index(n) => n.codegen(state),
            Expr::Slice(n) => n.codegen(state),
            Expr::TypeAssert(n) => n.codegen(state),
            Expr::Composite(n) => n.codegen(state),
            Expr::KeyValue(n) => n.codegen(state),
            Expr::FuncLit(n) => n.codegen(state),
            Expr::Star(n) => n.codegen(state),
            Expr::Ellipsis(n) => n.codegen(state),
            Expr::ArrayType(n) => n.codegen(state),
            Expr::MapType(n) => n.codegen(state),
            Expr::ChanType(n) => n.codegen(state),
            Expr::FuncType(n) => n.codegen(state),
            Expr::StructType(n) => n.codegen(state),
            Expr::InterfaceType(n) => n.codegen(state),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub tok: Token,
    pub node_id: NodeId,
}

impl Ident {
    pub fn name(&self) -> &str {
        &self.tok.text
    }
}

impl Codegen for Ident {
    fn codegen(&self, state: &mut CodegenState) {
        state.tok(&self.tok);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BasicLit {
    pub tok: Token,
    pub node_id: NodeId,
}

impl Codegen for BasicLit {
    fn codegen(&self, state: &mut CodegenState) {
        state.tok(&self.tok);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub op: Token,
    pub operand: Expr,
    pub node_id: NodeId,
}

impl Codegen for UnaryExpr {
    fn codegen(&self, state: &mut CodegenState) {
        state.tok(&self.op);
        self.operand.codegen(state);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub lhs: Expr,
    pub op: Token,
    pub rhs: Expr,
    pub node_id: NodeId,
}

impl Codegen for BinaryExpr {
    fn codegen(&self, state: &mut CodegenState) {
        self.lhs.codegen(state);
        state.tok(&self.op);
        self.rhs.codegen(state);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParenExpr {
    pub lparen: Token,
    pub inner: Expr,
    pub rparen: Token,
    pub node_id: NodeId,
}

impl Codegen for ParenExpr {
    fn codegen(&self, state: &mut CodegenState) {
        state.tok(&self.lparen);
        self.inner.codegen(state);
        state.tok(&self.rparen);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub fun: Expr,
    pub lparen: Token,
    pub args: Vec<Expr>,
    /// Separating commas; may include a trailing comma.
    pub commas: Vec<Token>,
    /// `f(xs...)` variadic marker, printed after the last argument.
    pub ellipsis: Option<Token>,
    pub rparen: Token,
    pub node_id: NodeId,
}

impl Codegen for CallExpr {
    fn codegen(&self, state: &mut CodegenState) {
        self.fun.codegen(state);
        state.tok(&self.lparen);
        for (i, arg) in self.args.iter().enumerate() {
            arg.codegen(state);
            if i + 1 == self.args.len() {
                if let Some(ellipsis) = &self.ellipsis {
                    state.tok(ellipsis);
                }
            }
            if let Some(comma) = self.commas.get(i) {
                state.tok(comma);
            }
        }
        state.tok(&self.rparen);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectorExpr {
    pub x: Expr,
    pub dot: Token,
    pub sel: Ident,
    pub node_id: NodeId,
}

impl Codegen for SelectorExpr {
    fn codegen(&self, state: &mut CodegenState) {
        self.x.codegen(state);
        state.tok(&self.dot);
        self.sel.codegen(state);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpr {
    pub x: Expr,
    pub lbrack: Token,
    pub index: Expr,
    pub rbrack: Token,
    pub node_id: NodeId,
}

impl Codegen for IndexExpr {
    fn codegen(&self, state: &mut CodegenState) {
        self.x.codegen(state);
        state.tok(&self.lbrack);
        self.index.codegen(state);
        state.tok(&self.rbrack);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SliceExpr {
    pub x: Expr,
    pub lbrack: Token,
    pub low: Option<Expr>,
    pub colon1: Token,
    pub high: Option<Expr>,
    pub colon2: Option<Token>,
    pub max: Option<Expr>,
    pub rbrack: Token,
    pub node_id: NodeId,
}

impl Codegen for SliceExpr {
    fn codegen(&self, state: &mut CodegenState) {
        self.x.codegen(state);
        state.tok(&self.lbrack);
        self.low.codegen(state);
        state.tok(&self.colon1);
        self.high.codegen(state);
        if let Some(colon2) = &self.colon2 {
            state.tok(colon2);
        }
        self.max.codegen(state);
        state.tok(&self.rbrack);
    }
}

/// The parenthesized target of a type assertion: a type, or the `type`
/// keyword inside a type switch guard.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeAssertTarget {
    Type(Expr),
    TypeKeyword(Token),
}

impl Codegen for TypeAssertTarget {
    fn codegen(&self, state: &mut CodegenState) {
        match self {
            TypeAssertTarget::Type(ty) => ty.codegen(state),
            TypeAssertTarget::TypeKeyword(tok) => state.tok(tok),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeAssertExpr {
    pub x: Expr,
    pub dot: Token,
    pub lparen: Token,
    pub target: TypeAssertTarget,
    pub rparen: Token,
    pub node_id: NodeId,
}

impl TypeAssertExpr {
    /// True for the `x.(type)` guard form.
    pub fn is_type_switch_guard(&self) -> bool {
        matches!(self.target, TypeAssertTarget::TypeKeyword(_))
    }
}

impl Codegen for TypeAssertExpr {
    fn codegen(&self, state: &mut CodegenState) {
        self.x.codegen(state);
        state.tok(&self.dot);
        state.tok(&self.lparen);
        self.target.codegen(state);
        state.tok(&self.rparen);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositeLit {
    /// Absent for nested literals whose type is implied (`{1, 2}`).
    pub ty: Option<Expr>,
    pub lbrace: Token,
    pub elts: Vec<Expr>,
    pub commas: Vec<Token>,
    pub rbrace: Token,
    pub node_id: NodeId,
}

impl Codegen for CompositeLit {
    fn codegen(&self, state: &mut CodegenState) {
        self.ty.codegen(state);
        state.tok(&self.lbrace);
        for (i, elt) in self.elts.iter().enumerate() {
            elt.codegen(state);
            if let Some(comma) = self.commas.get(i) {
                state.tok(comma);
            }
        }
        state.tok(&self.rbrace);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyValueExpr {
    pub key: Expr,
    pub colon: Token,
    pub value: Expr,
    pub node_id: NodeId,
}

impl Codegen for KeyValueExpr {
    fn codegen(&self, state: &mut CodegenState) {
        self.key.codegen(state);
        state.tok(&self.colon);
        self.value.codegen(state);
    }
}

/// One parameter item: an optional name, an optional `...`, and a type.
///
/// Name grouping (`a, b int`) is not resolved; each comma-separated item
/// stands alone, which round-trips exactly and is all the instrumenter
/// needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Option<Ident>,
    pub ellipsis: Option<Token>,
    pub ty: Expr,
}

impl Codegen for Param {
    fn codegen(&self, state: &mut CodegenState) {
        self.name.codegen(state);
        if let Some(ellipsis) = &self.ellipsis {
            state.tok(ellipsis);
        }
        self.ty.codegen(state);
    }
}

/// A function signature: parameter list and optional result.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncSig {
    pub lparen: Token,
    pub params: Vec<Param>,
    pub commas: Vec<Token>,
    pub rparen: Token,
    pub result: Option<FuncResult>,
}

impl Codegen for FuncSig {
    fn codegen(&self, state: &mut CodegenState) {
        state.tok(&self.lparen);
        for (i, param) in self.params.iter().enumerate() {
            param.codegen(state);
            if let Some(comma) = self.commas.get(i) {
                state.tok(comma);
            }
        }
        state.tok(&self.rparen);
        self.result.codegen(state);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FuncResult {
    /// A single unparenthesized result type.
    Single(Expr),
    /// A parenthesized result list.
    Tuple {
        lparen: Token,
        params: Vec<Param>,
        commas: Vec<Token>,
        rparen: Token,
    },
}

impl Codegen for FuncResult {
    fn codegen(&self, state: &mut CodegenState) {
        match self {
            FuncResult::Single(ty) => ty.codegen(state),
            FuncResult::Tuple {
                lparen,
                params,
                commas,
                rparen,
            } => {
                state.tok(lparen);
                for (i, param) in params.iter().enumerate() {
                    param.codegen(state);
                    if let Some(comma) = commas.get(i) {
                        state.tok(comma);
                    }
                }
                state.tok(rparen);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncLit {
    pub func_tok: Token,
    pub sig: FuncSig,
    pub body: Block,
    pub node_id: NodeId,
}

impl Codegen for FuncLit {
    fn codegen(&self, state: &mut CodegenState) {
        state.tok(&self.func_tok);
        self.sig.codegen(state);
        self.body.codegen(state);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StarExpr {
    pub star: Token,
    pub x: Expr,
    pub node_id: NodeId,
}

impl Codegen for StarExpr {
    fn codegen(&self, state: &mut CodegenState) {
        state.tok(&self.star);
        self.x.codegen(state);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EllipsisExpr {
    pub tok: Token,
    pub elem: Option<Expr>,
    pub node_id: NodeId,
}

impl Codegen for EllipsisExpr {
    fn codegen(&self, state: &mut CodegenState) {
        state.tok(&self.tok);
        self.elem.codegen(state);
    }
}

/// `[N]T` when `len` is present, `[]T` otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayType {
    pub lbrack: Token,
    pub len: Option<Expr>,
    pub rbrack: Token,
    pub elem: Expr,
    pub node_id: NodeId,
}

impl Codegen for ArrayType {
    fn codegen(&self, state: &mut CodegenState) {
        state.tok(&self.lbrack);
        self.len.codegen(state);
        state.tok(&self.rbrack);
        self.elem.codegen(state);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapType {
    pub map_tok: Token,
    pub lbrack: Token,
    pub key: Expr,
    pub rbrack: Token,
    pub value: Expr,
    pub node_id: NodeId,
}

impl Codegen for MapType {
    fn codegen(&self, state: &mut CodegenState) {
        state.tok(&self.map_tok);
        state.tok(&self.lbrack);
        self.key.codegen(state);
        state.tok(&self.rbrack);
        self.value.codegen(state);
    }
}

/// `chan T`, `chan<- T` or `<-chan T`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChanType {
    pub arrow_before: Option<Token>,
    pub chan_tok: Token,
    pub arrow_after: Option<Token>,
    pub elem: Expr,
    pub node_id: NodeId,
}

impl Codegen for ChanType {
    fn codegen(&self, state: &mut CodegenState) {
        if let Some(arrow) = &self.arrow_before {
            state.tok(arrow);
        }
        state.tok(&self.chan_tok);
        if let Some(arrow) = &self.arrow_after {
            state.tok(arrow);
        }
        self.elem.codegen(state);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncType {
    pub func_tok: Token,
    pub sig: FuncSig,
    pub node_id: NodeId,
}

impl Codegen for FuncType {
    fn codegen(&self, state: &mut CodegenState) {
        state.tok(&self.func_tok);
        self.sig.codegen(state);
    }
}

/// A struct type literal; the body is an opaque balanced token run.
#[derive(Debug, Clone, PartialEq)]
pub struct StructType {
    pub struct_tok: Token,
    pub lbrace: Token,
    pub body: Vec<Token>,
    pub rbrace: Token,
    pub node_id: NodeId,
}

impl Codegen for StructType {
    fn codegen(&self, state: &mut CodegenState) {
        state.tok(&self.struct_tok);
        state.tok(&self.lbrace);
        for tok in &self.body {
            state.tok(tok);
        }
        state.tok(&self.rbrace);
    }
}

/// An interface type literal; the body is an opaque balanced token run.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceType {
    pub interface_tok: Token,
    pub lbrace: Token,
    pub body: Vec<Token>,
    pub rbrace: Token,
    pub node_id: NodeId,
}

impl Codegen for InterfaceType {
    fn codegen(&self, state: &mut CodegenState) {
        state.tok(&self.interface_tok);
        state.tok(&self.lbrace);
        for tok in &self.body {
            state.tok(tok);
        }
        state.tok(&self.rbrace);
    }
}
