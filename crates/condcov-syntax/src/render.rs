//! Normalized expression rendering.
//!
//! Coverage records carry a condition's source text. That text must be
//! stable and single-line regardless of how the input was formatted, so
//! it is rebuilt here with canonical single spacing instead of going
//! through the trivia-preserving printer.

use crate::nodes::expr::{Expr, FuncResult, FuncSig, Param, TypeAssertTarget};
use crate::nodes::traits::token_texts;
use crate::tokenizer::TokKind;

/// Render `expr` in normalized single-space form.
pub fn render(expr: &Expr) -> String {
    let mut out = String::new();
    write_expr(&mut out, expr);
    out
}

/// Render the synthetic equality `lhs == rhs` used for switch rewrites.
///
/// Operands whose top-level operator binds no tighter than `==` are
/// parenthesized, so `s` and `a && b` become `"s == (a && b)"`.
pub fn render_eq(lhs: &Expr, rhs: &Expr) -> String {
    let mut out = String::new();
    write_operand(&mut out, lhs);
    out.push_str(" == ");
    write_operand(&mut out, rhs);
    out
}

/// Like [`render_eq`] with a literal `nil` right-hand side.
pub fn render_eq_nil(lhs: &Expr) -> String {
    let mut out = String::new();
    write_operand(&mut out, lhs);
    out.push_str(" == nil");
    out
}

fn write_operand(out: &mut String, expr: &Expr) {
    if binds_no_tighter_than_eq(expr) {
        out.push('(');
        write_expr(out, expr);
        out.push(')');
    } else {
        write_expr(out, expr);
    }
}

fn binds_no_tighter_than_eq(expr: &Expr) -> bool {
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

fn write_expr(out: &mut String, expr: &Expr) {
    match expr {
        Expr::Ident(n) => out.push_str(&n.tok.text),
        Expr::Lit(n) => out.push_str(&n.tok.text),
        Expr::Unary(n) => {
            out.push_str(&n.op.text);
            write_expr(out, &n.operand);
        }
        Expr::Binary(n) => {
            write_expr(out, &n.lhs);
            out.push(' ');
            out.push_str(&n.op.text);
            out.push(' ');
            write_expr(out, &n.rhs);
        }
        Expr::Paren(n) => {
            out.push('(');
            write_expr(out, &n.inner);
            out.push(')');
        }
        Expr::Call(n) => {
            write_expr(out, &n.fun);
            out.push('(');
            for (i, arg) in n.args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_expr(out, arg);
            }
            if n.ellipsis.is_some() {
                out.push_str("...");
            }
            out.push(')');
        }
        Expr::Selector(n) => {
            write_expr(out, &n.x);
            out.push('.');
            out.push_str(&n.sel.tok.text);
        }
        Expr::Index(n) => {
            write_expr(out, &n.x);
            out.push('[');
            write_expr(out, &n.index);
            out.push(']');
        }
        Expr::Slice(n) => {
            write_expr(out, &n.x);
            out.push('[');
            if let Some(low) = &n.low {
                write_expr(out, low);
            }
            out.push(':');
            if let Some(high) = &n.high {
                write_expr(out, high);
            }
            if n.colon2.is_some() {
                out.push(':');
                if let Some(max) = &n.max {
                    write_expr(out, max);
                }
            }
            out.push(']');
        }
        Expr::TypeAssert(n) => {
            write_expr(out, &n.x);
            out.push_str(".(");
            match &n.target {
                TypeAssertTarget::Type(ty) => write_expr(out, ty),
                TypeAssertTarget::TypeKeyword(_) => out.push_str("type"),
            }
            out.push(')');
        }
        Expr::Composite(n) => {
            if let Some(ty) = &n.ty {
                write_expr(out, ty);
            }
            out.push('{');
            for (i, elt) in n.elts.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_expr(out, elt);
            }
            out.push('}');
        }
        Expr::KeyValue(n) => {
            write_expr(out, &n.key);
            out.push_str(": ");
            write_expr(out, &n.value);
        }
        Expr::FuncLit(n) => {
            out.push_str("func");
            write_sig(out, &n.sig);
            out.push(' ');
            // Bodies keep statements intact but lose their layout.
            write_tokens(out, &token_texts(&n.body));
        }
        Expr::Star(n) => {
            out.push('*');
            write_expr(out, &n.x);
        }
        Expr::Ellipsis(n) => {
            out.push_str("...");
            if let Some(elem) = &n.elem {
                write_expr(out, elem);
            }
        }
        Expr::ArrayType(n) => {
            out.push('[');
            if let Some(len) = &n.len {
                write_expr(out, len);
            }
            out.push(']');
            write_expr(out, &n.elem);
        }
        Expr::MapType(n) => {
            out.push_str("map[");
            write_expr(out, &n.key);
            out.push(']');
            write_expr(out, &n.value);
        }
        Expr::ChanType(n) => {
            if n.arrow_before.is_some() {
                out.push_str("<-");
            }
            if n.arrow_after.is_some() {
                out.push_str("chan<- ");
            } else {
                out.push_str("chan ");
            }
            write_expr(out, &n.elem);
        }
        Expr::FuncType(n) => {
            out.push_str("func");
            write_sig(out, &n.sig);
        }
        Expr::StructType(n) => {
            out.push_str("struct");
            write_tokens(out, &struct_body_texts(&n.body));
        }
        Expr::InterfaceType(n) => {
            out.push_str("interface");
            write_tokens(out, &struct_body_texts(&n.body));
        }
    }
}

fn write_sig(out: &mut String, sig: &FuncSig) {
    out.push('(');
    for (i, param) in sig.params.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_param(out, param);
    }
    out.push(')');
    match &sig.result {
        None => {}
        Some(FuncResult::Single(ty)) => {
            out.push(' ');
            write_expr(out, ty);
        }
        Some(FuncResult::Tuple { params, .. }) => {
            out.push_str(" (");
            for (i, param) in params.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_param(out, param);
            }
            out.push(')');
        }
    }
}

fn write_param(out: &mut String, param: &Param) {
    if let Some(name) = &param.name {
        out.push_str(&name.tok.text);
        out.push(' ');
    }
    if param.ellipsis.is_some() {
        out.push_str("...");
    }
    write_expr(out, &param.ty);
}

fn struct_body_texts(body: &[crate::tokenizer::Token]) -> Vec<String> {
    let mut texts = vec!["{".to_string()];
    texts.extend(body.iter().map(|t| t.text.clone()));
    texts.push("}".to_string());
    texts
}

/// Join bare token texts with minimal spacing. Virtual semicolons are
/// restored as explicit `;` so one-line output stays parseable.
fn write_tokens(out: &mut String, texts: &[String]) {
    let mut prev: Option<&str> = None;
    for text in texts {
        let text = if text.is_empty() { ";" } else { text.as_str() };
        if let Some(prev) = prev {
            if needs_space(prev, text) {
                out.push(' ');
            }
        }
        out.push_str(text);
        prev = Some(text);
    }
}

fn needs_space(prev: &str, next: &str) -> bool {
    if matches!(prev, "(" | "[" | ".") {
        return false;
    }
    if matches!(next, "(" | "[" | ")" | "]" | "," | ";" | ".") {
        return false;
    }
    if matches!(prev, "," | ";" | "{") || next == "{" || next == "}" {
        return true;
    }
    let wordlike = |c: char| c.is_alphanumeric() || c == '_' || c == '"' || c == '`';
    prev.chars().last().map(wordlike).unwrap_or(false)
        && next.chars().next().map(wordlike).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::tokenizer::tokenize;

    fn expr(src: &str) -> Expr {
        let toks = tokenize(src).expect("tokenize");
        let mut parser = Parser::new(toks);
        parser.parse_expr().expect("parse")
    }

    #[test]
    fn renders_with_single_spaces() {
        assert_eq!(render(&expr("a  &&   b")), "a && b");
        assert_eq!(render(&expr("f( x,y )")), "f(x, y)");
        assert_eq!(render(&expr("! ok")), "!ok");
        assert_eq!(render(&expr("m[ k ] > 0")), "m[k] > 0");
    }

    #[test]
    fn renders_selectors_and_asserts() {
        assert_eq!(render(&expr("a.b.c")), "a.b.c");
        assert_eq!(render(&expr("x.(MyType)")), "x.(MyType)");
        assert_eq!(render(&expr("x.(*pkg.T)")), "x.(*pkg.T)");
    }

    #[test]
    fn eq_parenthesizes_loose_operands() {
        assert_eq!(render_eq(&expr("s"), &expr("a && b")), "s == (a && b)");
        assert_eq!(render_eq(&expr("s"), &expr("a > b")), "s == (a > b)");
        assert_eq!(render_eq(&expr("s"), &expr("call(i)")), "s == call(i)");
        assert_eq!(render_eq(&expr("s"), &expr("\"one\"")), "s == \"one\"");
    }

    #[test]
    fn eq_nil() {
        assert_eq!(render_eq_nil(&expr("v")), "v == nil");
    }

    #[test]
    fn renders_slices_and_composites() {
        assert_eq!(render(&expr("xs[1:2]")), "xs[1:2]");
        assert_eq!(render(&expr("xs[a : b : c]")), "xs[a:b:c]");
        assert_eq!(render(&expr("T{ a , b }")), "T{a, b}");
        assert_eq!(render(&expr("map[string]int{\"a\": 1}")), "map[string]int{\"a\": 1}");
    }
}
