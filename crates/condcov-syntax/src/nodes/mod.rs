//! CST node definitions.

pub mod decl;
pub mod expr;
pub mod stmt;
pub mod traits;

pub use decl::{Decl, File, FuncDecl, GenDecl, ImportSpec, Receiver, Spec, TypeSpec, ValueSpec};
pub use expr::{
    ArrayType, BasicLit, BinaryExpr, CallExpr, ChanType, CompositeLit, EllipsisExpr, Expr,
    FuncLit, FuncResult, FuncSig, FuncType, Ident, IndexExpr, InterfaceType, KeyValueExpr,
    MapType, Param, ParenExpr, SelectorExpr, SliceExpr, StarExpr, StructType, TypeAssertExpr,
    TypeAssertTarget, UnaryExpr,
};
pub use stmt::{
    AssignStmt, Block, BlockStmt, BranchStmt, CaseClause, CommClause, DeclStmt, DeferStmt,
    ElseBranch, EmptyStmt, ExprStmt, ForHeader, ForStmt, GoStmt, IfStmt, IncDecStmt, LabeledStmt,
    ReturnStmt, SelectStmt, SendStmt, Stmt, SwitchStmt, TypeSwitchBind, TypeSwitchStmt,
};
pub use traits::{to_source, token_texts, Codegen, CodegenState, NodeId, NodeIdGenerator};
