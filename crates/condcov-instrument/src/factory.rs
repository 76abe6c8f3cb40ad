//! Constructors for synthesized syntax fragments.
//!
//! Every fabricated token is tagged with the source position of the
//! construct it logically replaces, so the coverage table and any later
//! diagnostics keep pointing at the pre-rewrite code. Leading trivia is
//! chosen explicitly by the caller; nothing here inherits trivia by
//! accident.

use condcov_syntax::nodes::expr::{
    BinaryExpr, CallExpr, Expr, Ident, ParenExpr, TypeAssertExpr, TypeAssertTarget,
};
use condcov_syntax::nodes::stmt::{AssignStmt, Block, BlockStmt, CaseClause, Stmt, SwitchStmt};
use condcov_syntax::nodes::traits::NodeIdGenerator;
use condcov_syntax::tokenizer::{Pos, TokKind, Token};

/// The name of the unexported cover hook in the generated runtime.
pub const COVER_FUNC: &str = "condcovCover";

/// A plain synthesized identifier expression.
pub fn ident(name: &str, pos: Pos, ids: &mut NodeIdGenerator) -> Expr {
    Expr::Ident(Ident {
        tok: Token::synth(TokKind::Ident, name, pos),
        node_id: ids.next_id(),
    })
}

/// An identifier token with explicit leading trivia, for statement heads.
pub fn ident_tok(name: &str, leading: &str, pos: Pos) -> Token {
    Token::synth(TokKind::Ident, name, pos).with_leading(leading)
}

fn int_lit(value: usize, pos: Pos, ids: &mut NodeIdGenerator) -> Expr {
    Expr::Lit(condcov_syntax::nodes::expr::BasicLit {
        tok: Token::synth(TokKind::Int, value.to_string(), pos),
        node_id: ids.next_id(),
    })
}

/// Whether `expr`, used as an operand of a synthesized `==`, needs
/// parentheses to keep its meaning.
fn needs_paren(expr: &Expr) -> bool {
    match expr {
        Expr::Binary(b) => matches!(
            b.op.kind,
            TokKind::OrOr
                | TokKind::AndAnd
                | TokKind::EqEq
                | TokKind::NotEq
                | TokKind::Lt
                | TokKind::Le
                | TokKind::Gt
                | TokKind::Ge
        ),
        _ => false,
    }
}

fn parenthesize(mut expr: Expr, ids: &mut NodeIdGenerator) -> Expr {
    let pos = expr.pos();
    expr.first_token_mut().leading = String::new();
    Expr::Paren(Box::new(ParenExpr {
        lparen: Token::synth(TokKind::LParen, "(", pos),
        inner: expr,
        rparen: Token::synth(TokKind::RParen, ")", pos),
        node_id: ids.next_id(),
    }))
}

/// `cover(idx, expr)`, taking over the wrapped expression's leading trivia
/// so the call sits exactly where the expression used to.
pub fn cover_call(idx: usize, mut expr: Expr, ids: &mut NodeIdGenerator) -> Expr {
    let pos = expr.pos();
    let leading = std::mem::take(&mut expr.first_token_mut().leading);
    let fun = Expr::Ident(Ident {
        tok: Token::synth(TokKind::Ident, COVER_FUNC, pos).with_leading(leading),
        node_id: ids.next_id(),
    });
    let mut arg = expr;
    arg.first_token_mut().leading = " ".to_string();
    Expr::Call(Box::new(CallExpr {
        fun,
        lparen: Token::synth(TokKind::LParen, "(", pos),
        args: vec![int_lit(idx, pos, ids), arg],
        commas: vec![Token::synth(TokKind::Comma, ",", pos)],
        ellipsis: None,
        rparen: Token::synth(TokKind::RParen, ")", pos),
        node_id: ids.next_id(),
    }))
}

/// `temp == rhs`, with the original expression moved into the right-hand
/// side and parenthesized when its top-level form binds no tighter than
/// the equality.
pub fn eq_with_temp(temp: &str, mut rhs: Expr, ids: &mut NodeIdGenerator) -> Expr {
    let pos = rhs.pos();
    let leading = std::mem::take(&mut rhs.first_token_mut().leading);
    if needs_paren(&rhs) {
        rhs = parenthesize(rhs, ids);
    }
    rhs.first_token_mut().leading = " ".to_string();
    Expr::Binary(Box::new(BinaryExpr {
        lhs: Expr::Ident(Ident {
            tok: Token::synth(TokKind::Ident, temp, pos).with_leading(leading),
            node_id: ids.next_id(),
        }),
        op: Token::synth(TokKind::EqEq, "==", pos).with_leading(" "),
        rhs,
        node_id: ids.next_id(),
    }))
}

/// `temp == nil` with explicit leading trivia on the first token.
pub fn eq_nil(temp: &str, leading: &str, pos: Pos, ids: &mut NodeIdGenerator) -> Expr {
    Expr::Binary(Box::new(BinaryExpr {
        lhs: Expr::Ident(Ident {
            tok: ident_tok(temp, leading, pos),
            node_id: ids.next_id(),
        }),
        op: Token::synth(TokKind::EqEq, "==", pos).with_leading(" "),
        rhs: ident("nil", pos, ids).with_space(),
        node_id: ids.next_id(),
    }))
}

trait WithSpace {
    fn with_space(self) -> Self;
}

impl WithSpace for Expr {
    fn with_space(mut self) -> Self {
        self.first_token_mut().leading = " ".to_string();
        self
    }
}

/// `temp.(ty)` where `ty` is moved out of the original case clause.
pub fn type_assert(temp: &str, mut ty: Expr, pos: Pos, ids: &mut NodeIdGenerator) -> Expr {
    ty.first_token_mut().leading = String::new();
    Expr::TypeAssert(Box::new(TypeAssertExpr {
        x: ident(temp, pos, ids),
        dot: Token::synth(TokKind::Dot, ".", pos),
        lparen: Token::synth(TokKind::LParen, "(", pos),
        target: TypeAssertTarget::Type(ty),
        rparen: Token::synth(TokKind::RParen, ")", pos),
        node_id: ids.next_id(),
    }))
}

/// `name := rhs` on its own line with the given leading trivia.
pub fn define(
    name: &str,
    leading: &str,
    mut rhs: Expr,
    pos: Pos,
    ids: &mut NodeIdGenerator,
) -> Stmt {
    rhs.first_token_mut().leading = " ".to_string();
    Stmt::Assign(Box::new(AssignStmt {
        lhs: vec![Expr::Ident(Ident {
            tok: ident_tok(name, leading, pos),
            node_id: ids.next_id(),
        })],
        lhs_commas: Vec::new(),
        op: Token::synth(TokKind::Define, ":=", pos).with_leading(" "),
        rhs: vec![rhs],
        rhs_commas: Vec::new(),
        semi: None,
        node_id: ids.next_id(),
    }))
}

/// `_, name := rhs` — the two-value form used for type tests.
pub fn define_second(
    name: &str,
    leading: &str,
    rhs: Expr,
    pos: Pos,
    ids: &mut NodeIdGenerator,
) -> Stmt {
    Stmt::Assign(Box::new(AssignStmt {
        lhs: vec![
            Expr::Ident(Ident {
                tok: ident_tok("_", leading, pos),
                node_id: ids.next_id(),
            }),
            Expr::Ident(Ident {
                tok: ident_tok(name, " ", pos),
                node_id: ids.next_id(),
            }),
        ],
        lhs_commas: vec![Token::synth(TokKind::Comma, ",", pos)],
        op: Token::synth(TokKind::Define, ":=", pos).with_leading(" "),
        rhs: vec![rhs.with_space()],
        rhs_commas: Vec::new(),
        semi: None,
        node_id: ids.next_id(),
    }))
}

/// `_ = name` — a throwaway use that keeps a binding from being flagged
/// as unused.
pub fn discard(name: &str, leading: &str, pos: Pos, ids: &mut NodeIdGenerator) -> Stmt {
    Stmt::Assign(Box::new(AssignStmt {
        lhs: vec![Expr::Ident(Ident {
            tok: ident_tok("_", leading, pos),
            node_id: ids.next_id(),
        })],
        lhs_commas: Vec::new(),
        op: Token::synth(TokKind::Assign, "=", pos).with_leading(" "),
        rhs: vec![ident(name, pos, ids).with_space()],
        rhs_commas: Vec::new(),
        semi: None,
        node_id: ids.next_id(),
    }))
}

/// A tagless `switch { ... }` reusing the original clauses.
pub fn tagless_switch(
    leading: &str,
    indent: &str,
    clauses: Vec<CaseClause>,
    pos: Pos,
    ids: &mut NodeIdGenerator,
) -> Stmt {
    Stmt::Switch(Box::new(SwitchStmt {
        switch_tok: Token::synth(TokKind::Switch, "switch", pos).with_leading(leading),
        init: None,
        init_semi: None,
        tag: None,
        lbrace: Token::synth(TokKind::LBrace, "{", pos).with_leading(" "),
        clauses,
        rbrace: Token::synth(TokKind::RBrace, "}", pos)
            .with_leading(format!("\n{indent}")),
        semi: None,
        node_id: ids.next_id(),
    }))
}

/// A block statement that wraps fabricated statements, taking over the
/// replaced statement's leading trivia for its opening brace.
pub fn block(
    leading: String,
    indent: &str,
    stmts: Vec<Stmt>,
    pos: Pos,
    ids: &mut NodeIdGenerator,
) -> Stmt {
    Stmt::Block(Box::new(BlockStmt {
        block: Block {
            lbrace: Token::synth(TokKind::LBrace, "{", pos).with_leading(leading),
            stmts,
            rbrace: Token::synth(TokKind::RBrace, "}", pos)
                .with_leading(format!("\n{indent}")),
        },
        semi: None,
        node_id: ids.next_id(),
    }))
}

/// The whitespace after the last newline of `leading`: the indentation of
/// the token that carries it.
pub fn indent_of(leading: &str) -> String {
    match leading.rfind('\n') {
        Some(i) => leading[i + 1..].to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use condcov_syntax::{parse_expression, to_source};

    fn gen() -> NodeIdGenerator {
        let mut ids = NodeIdGenerator::new();
        // Skip past ids a real parse would have used.
        for _ in 0..1000 {
            ids.next_id();
        }
        ids
    }

    #[test]
    fn cover_call_keeps_leading_trivia() {
        let mut ids = gen();
        let mut expr = parse_expression("i > 0").expect("parse");
        expr.first_token_mut().leading = " ".to_string();
        let wrapped = cover_call(3, expr, &mut ids);
        assert_eq!(to_source(&wrapped), " condcovCover(3, i > 0)");
    }

    #[test]
    fn eq_parenthesizes_loose_rhs() {
        let mut ids = gen();
        let expr = parse_expression("a && b").expect("parse");
        let eq = eq_with_temp("condcov_t_0", expr, &mut ids);
        assert_eq!(to_source(&eq), "condcov_t_0 == (a && b)");

        let tight = parse_expression("call(i)").expect("parse");
        let eq = eq_with_temp("condcov_t_0", tight, &mut ids);
        assert_eq!(to_source(&eq), "condcov_t_0 == call(i)");
    }

    #[test]
    fn define_and_discard_render() {
        let mut ids = gen();
        let pos = Pos::new(1, 1);
        let rhs = parse_expression("x").expect("parse");
        let stmt = define("condcov_t_0", "\n\t", rhs, pos, &mut ids);
        assert_eq!(to_source(&stmt), "\n\tcondcov_t_0 := x");

        let throwaway = discard("condcov_t_0", "\n\t", pos, &mut ids);
        assert_eq!(to_source(&throwaway), "\n\t_ = condcov_t_0");
    }

    #[test]
    fn two_value_type_test_renders() {
        let mut ids = gen();
        let pos = Pos::new(4, 2);
        let ty = parse_expression("MyType").expect("parse");
        let assert_expr = type_assert("condcov_t_0", ty, pos, &mut ids);
        let stmt = define_second("condcov_t_1", "\n\t", assert_expr, pos, &mut ids);
        assert_eq!(to_source(&stmt), "\n\t_, condcov_t_1 := condcov_t_0.(MyType)");
    }

    #[test]
    fn indent_of_trailing_line() {
        assert_eq!(indent_of("\n\t\t"), "\t\t");
        assert_eq!(indent_of(" "), "");
        assert_eq!(indent_of("// c\n    "), "    ");
    }
}
