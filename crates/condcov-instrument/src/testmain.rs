//! Rewriting of a user-supplied test-main function.
//!
//! The generated runtime persists its counts when the test binary is about
//! to exit. Without a `TestMain` the bootstrap file supplies one; when the
//! package already has its own, it is rewritten in place: a load call is
//! inserted at the top of the body, and the argument of every exit call is
//! routed through the finish hook so counts are written with the real exit
//! code.
//!
//! ```text
//! func TestMain(m *testing.M) {          func TestMain(m *testing.M) {
//!     setup()                                condcovLoad()
//!     os.Exit(m.Run())              =>       setup()
//! }                                          os.Exit(condcovFinish(m.Run()))
//! }
//! ```

use std::path::Path;

use condcov_syntax::nodes::decl::{Decl, File, FuncDecl};
use condcov_syntax::nodes::expr::{CallExpr, Expr, Ident};
use condcov_syntax::nodes::stmt::{Block, ElseBranch, ExprStmt, ForHeader, IfStmt, Stmt};
use condcov_syntax::nodes::traits::NodeIdGenerator;
use condcov_syntax::tokenizer::{TokKind, Token};
use tracing::debug;

use crate::error::{InstrumentError, Result};
use crate::factory;

/// The load hook inserted at the top of a rewritten test-main body.
pub const LOAD_FUNC: &str = "condcovLoad";
/// The finish hook wrapped around exit codes.
pub const FINISH_FUNC: &str = "condcovFinish";

/// True when `file` declares a plain `func TestMain(...)`.
pub fn has_test_main(file: &File) -> bool {
    file.decls.iter().any(|d| is_test_main(d))
}

fn is_test_main(decl: &Decl) -> bool {
    matches!(decl, Decl::Func(f) if f.recv.is_none() && f.name.name() == "TestMain")
}

/// Rewrite the `TestMain` in `file`, if any. Returns whether one was found.
///
/// A `TestMain` that never calls `os.Exit` cannot flush the counts, so it
/// is rejected rather than silently losing coverage data.
pub fn rewrite_test_main(file: &mut File, path: &Path) -> Result<bool> {
    let ids = &mut file.ids;
    for decl in &mut file.decls {
        if !is_test_main(decl) {
            continue;
        }
        let Decl::Func(func) = decl else { unreachable!() };
        let Some(body) = &mut func.body else {
            continue;
        };
        let exits = wrap_exit_calls(body, ids);
        if exits == 0 {
            return Err(InstrumentError::UnsupportedConstruct {
                file: path.to_path_buf(),
                pos: func.func_tok.pos,
                message: "TestMain does not call os.Exit, cannot persist coverage data"
                    .to_string(),
            });
        }
        insert_load_call(func, ids);
        debug!(?path, exits, "rewrote TestMain");
        return Ok(true);
    }
    Ok(false)
}

/// Prepend `condcovLoad()` to the body, indented like the first statement.
fn insert_load_call(func: &mut FuncDecl, ids: &mut NodeIdGenerator) {
    let body = func.body.as_mut().expect("checked by caller");
    let pos = func.func_tok.pos;
    let leading = match body.stmts.first() {
        Some(stmt) => format!("\n{}", stmt_indent(stmt)),
        None => "\n\t".to_string(),
    };
    let fun = Expr::Ident(Ident {
        tok: factory::ident_tok(LOAD_FUNC, &leading, pos),
        node_id: ids.next_id(),
    });
    let call = Expr::Call(Box::new(CallExpr {
        fun,
        lparen: Token::synth(TokKind::LParen, "(", pos),
        args: Vec::new(),
        commas: Vec::new(),
        ellipsis: None,
        rparen: Token::synth(TokKind::RParen, ")", pos),
        node_id: ids.next_id(),
    }));
    body.stmts.insert(
        0,
        Stmt::Expr(Box::new(ExprStmt {
            expr: call,
            semi: None,
            node_id: ids.next_id(),
        })),
    );
}

fn stmt_indent(stmt: &Stmt) -> String {
    // All statement heads start with a token whose leading trivia carries
    // the indentation; Expr covers the common case and the fallback is a
    // single tab.
    match stmt {
        Stmt::Expr(n) => factory::indent_of(&n.expr.first_token().leading),
        _ => "\t".to_string(),
    }
}

fn is_os_exit(expr: &Expr) -> bool {
    match expr {
        Expr::Selector(sel) => {
            matches!(&sel.x, Expr::Ident(id) if id.name() == "os") && sel.sel.name() == "Exit"
        }
        _ => false,
    }
}

/// Wrap the argument of every `os.Exit(code)` in the finish hook,
/// returning how many calls were rewritten.
fn wrap_exit_calls(block: &mut Block, ids: &mut NodeIdGenerator) -> usize {
    let mut wrapped = 0;
    for stmt in &mut block.stmts {
        wrapped += wrap_in_stmt(stmt, ids);
    }
    wrapped
}

fn wrap_in_stmt(stmt: &mut Stmt, ids: &mut NodeIdGenerator) -> usize {
    match stmt {
        Stmt::Expr(n) => wrap_in_expr(&mut n.expr, ids),
        Stmt::Assign(n) => n.rhs.iter_mut().map(|e| wrap_in_expr(e, ids)).sum(),
        Stmt::Return(n) => n.results.iter_mut().map(|e| wrap_in_expr(e, ids)).sum(),
        Stmt::Block(n) => wrap_exit_calls(&mut n.block, ids),
        Stmt::If(n) => wrap_in_if(n, ids),
        Stmt::For(n) => {
            let mut count = wrap_exit_calls(&mut n.body, ids);
            if let ForHeader::Clause {
                init: Some(init), ..
            } = &mut n.header
            {
                count += wrap_in_stmt(init, ids);
            }
            count
        }
        Stmt::Switch(n) => n
            .clauses
            .iter_mut()
            .flat_map(|c| c.stmts.iter_mut())
            .map(|s| wrap_in_stmt(s, ids))
            .sum(),
        Stmt::TypeSwitch(n) => n
            .clauses
            .iter_mut()
            .flat_map(|c| c.stmts.iter_mut())
            .map(|s| wrap_in_stmt(s, ids))
            .sum(),
        Stmt::Select(n) => n
            .clauses
            .iter_mut()
            .flat_map(|c| c.stmts.iter_mut())
            .map(|s| wrap_in_stmt(s, ids))
            .sum(),
        Stmt::Labeled(n) => match &mut n.stmt {
            Some(inner) => wrap_in_stmt(inner, ids),
            None => 0,
        },
        Stmt::Defer(n) => wrap_in_expr(&mut n.call, ids),
        Stmt::Go(n) => wrap_in_expr(&mut n.call, ids),
        _ => 0,
    }
}

fn wrap_in_if(stmt: &mut IfStmt, ids: &mut NodeIdGenerator) -> usize {
    let mut count = wrap_exit_calls(&mut stmt.body, ids);
    match &mut stmt.else_branch {
        Some(ElseBranch::If(inner)) => count += wrap_in_if(inner, ids),
        Some(ElseBranch::Block(block)) => count += wrap_exit_calls(block, ids),
        None => {}
    }
    count
}

fn wrap_in_expr(expr: &mut Expr, ids: &mut NodeIdGenerator) -> usize {
    match expr {
        Expr::Call(call) if is_os_exit(&call.fun) && call.args.len() == 1 => {
            let pos = call.args[0].pos();
            let mut arg = std::mem::replace(&mut call.args[0], factory::ident("_", pos, ids));
            let leading = std::mem::take(&mut arg.first_token_mut().leading);
            let fun = Expr::Ident(Ident {
                tok: factory::ident_tok(FINISH_FUNC, &leading, pos),
                node_id: ids.next_id(),
            });
            call.args[0] = Expr::Call(Box::new(CallExpr {
                fun,
                lparen: Token::synth(TokKind::LParen, "(", pos),
                args: vec![arg],
                commas: Vec::new(),
                ellipsis: None,
                rparen: Token::synth(TokKind::RParen, ")", pos),
                node_id: ids.next_id(),
            }));
            1
        }
        Expr::Call(call) => {
            let mut count = wrap_in_expr(&mut call.fun, ids);
            count += call
                .args
                .iter_mut()
                .map(|a| wrap_in_expr(a, ids))
                .sum::<usize>();
            count
        }
        Expr::Paren(n) => wrap_in_expr(&mut n.inner, ids),
        Expr::FuncLit(n) => wrap_exit_calls(&mut n.body, ids),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use condcov_syntax::nodes::traits::to_source;
    use condcov_syntax::parse_file;

    #[test]
    fn rewrites_direct_exit() {
        let src = "package p\n\nfunc TestMain(m *testing.M) {\n\tsetup()\n\tos.Exit(m.Run())\n}\n";
        let mut file = parse_file(src).expect("parse");
        let found = rewrite_test_main(&mut file, Path::new("main_test.go")).expect("rewrite");
        assert!(found);
        let out = to_source(&file);
        assert!(out.contains("{\n\tcondcovLoad()\n\tsetup()"));
        assert!(out.contains("os.Exit(condcovFinish(m.Run()))"));
    }

    #[test]
    fn rewrites_exit_inside_deferred_literal() {
        let src = "package p\n\nfunc TestMain(m *testing.M) {\n\tcode := m.Run()\n\tdefer func() {\n\t\tos.Exit(code)\n\t}()\n\tteardown()\n}\n";
        let mut file = parse_file(src).expect("parse");
        rewrite_test_main(&mut file, Path::new("main_test.go")).expect("rewrite");
        let out = to_source(&file);
        assert!(out.contains("os.Exit(condcovFinish(code))"));
    }

    #[test]
    fn missing_exit_is_rejected() {
        let src = "package p\n\nfunc TestMain(m *testing.M) {\n\tm.Run()\n}\n";
        let mut file = parse_file(src).expect("parse");
        let err = rewrite_test_main(&mut file, Path::new("main_test.go")).unwrap_err();
        assert!(err.to_string().contains("os.Exit"));
    }

    #[test]
    fn files_without_test_main_are_untouched() {
        let src = "package p\n\nfunc TestFoo(t *testing.T) {\n\tos.Exit(1)\n}\n";
        let mut file = parse_file(src).expect("parse");
        let found = rewrite_test_main(&mut file, Path::new("foo_test.go")).expect("rewrite");
        assert!(!found);
        assert_eq!(to_source(&file), src);
        assert!(!has_test_main(&file));
    }
}
