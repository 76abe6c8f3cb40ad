//! Replace pass: wrap planned expressions in cover calls.
//!
//! The walk runs in source order, and condition indices are handed out in
//! walk order, so the coverage table lists conditions exactly as they
//! appear in the file. When a planned node is wrapped, the walk continues
//! inside the moved original, which is how a short-circuit condition ends
//! up covered both as a whole and per operand:
//!
//! ```text
//! if a > 0 && b { ... }
//! if condcovCover(0, condcovCover(1, a > 0) && condcovCover(2, b)) { ... }
//! ```

use condcov_syntax::nodes::decl::{Decl, File, GenDecl, Spec};
use condcov_syntax::nodes::expr::Expr;
use condcov_syntax::nodes::stmt::{Block, ElseBranch, ForHeader, IfStmt, Stmt};
use condcov_syntax::nodes::traits::NodeIdGenerator;
use tracing::debug;

use crate::factory;
use crate::plan::Plans;
use crate::table::CoverageTable;

/// Run the replace pass, consuming `plans` and filling `table`.
pub fn replace_file(file: &mut File, plans: &mut Plans, table: &mut CoverageTable) {
    let ids = &mut file.ids;
    let mut rep = Replace { plans, table, ids };
    for decl in &mut file.decls {
        match decl {
            Decl::Func(func) => {
                if let Some(body) = &mut func.body {
                    rep.block(body);
                }
            }
            Decl::Gen(gen) => rep.gen_decl(gen),
        }
    }
    debug!(conditions = table.len(), "wrapped conditions");
}

struct Replace<'a> {
    plans: &'a mut Plans,
    table: &'a mut CoverageTable,
    ids: &'a mut NodeIdGenerator,
}

impl Replace<'_> {
    fn visit(&mut self, expr: &mut Expr) {
        if let Some(plan) = self.plans.take(expr.node_id()) {
            let idx = self.table.add(plan.start, plan.text);
            let pos = expr.pos();
            let orig = std::mem::replace(expr, factory::ident("_", pos, self.ids));
            *expr = factory::cover_call(idx, orig, self.ids);
            // Operands of the moved original may be planned too.
            if let Expr::Call(call) = expr {
                if let Some(arg) = call.args.last_mut() {
                    self.descend(arg);
                }
            }
            return;
        }
        self.descend(expr);
    }

    fn descend(&mut self, expr: &mut Expr) {
        match expr {
            Expr::Ident(_) | Expr::Lit(_) | Expr::Ellipsis(_) => {}
            Expr::Unary(n) => self.visit(&mut n.operand),
            Expr::Binary(n) => {
                self.visit(&mut n.lhs);
                self.visit(&mut n.rhs);
            }
            Expr::Paren(n) => self.visit(&mut n.inner),
            Expr::Call(n) => {
                self.visit(&mut n.fun);
                for arg in &mut n.args {
                    self.visit(arg);
                }
            }
            Expr::Selector(n) => self.visit(&mut n.x),
            Expr::Index(n) => {
                self.visit(&mut n.x);
                self.visit(&mut n.index);
            }
            Expr::Slice(n) => {
                self.visit(&mut n.x);
                for e in [&mut n.low, &mut n.high, &mut n.max].into_iter().flatten() {
                    self.visit(e);
                }
            }
            Expr::TypeAssert(n) => self.visit(&mut n.x),
            Expr::Composite(n) => {
                for elt in &mut n.elts {
                    self.visit(elt);
                }
            }
            Expr::KeyValue(n) => {
                self.visit(&mut n.key);
                self.visit(&mut n.value);
            }
            Expr::FuncLit(n) => self.block(&mut n.body),
            Expr::Star(n) => self.visit(&mut n.x),
            Expr::ArrayType(_)
            | Expr::MapType(_)
            | Expr::ChanType(_)
            | Expr::FuncType(_)
            | Expr::StructType(_)
            | Expr::InterfaceType(_) => {}
        }
    }

    fn gen_decl(&mut self, decl: &mut GenDecl) {
        if decl.is_const() {
            return;
        }
        for spec in &mut decl.specs {
            if let Spec::Value(value) = spec {
                for expr in &mut value.values {
                    self.visit(expr);
                }
            }
        }
    }

    fn block(&mut self, block: &mut Block) {
        for stmt in &mut block.stmts {
            self.stmt(stmt);
        }
    }

    fn stmts(&mut self, stmts: &mut [Stmt]) {
        for stmt in stmts {
            self.stmt(stmt);
        }
    }

    fn stmt(&mut self, stmt: &mut Stmt) {
        match stmt {
            Stmt::Expr(n) => self.visit(&mut n.expr),
            Stmt::Send(n) => {
                self.visit(&mut n.chan);
                self.visit(&mut n.value);
            }
            Stmt::IncDec(n) => self.visit(&mut n.expr),
            Stmt::Assign(n) => {
                for e in &mut n.lhs {
                    self.visit(e);
                }
                for e in &mut n.rhs {
                    self.visit(e);
                }
            }
            Stmt::Decl(n) => self.gen_decl(&mut n.decl),
            Stmt::Return(n) => {
                for e in &mut n.results {
                    self.visit(e);
                }
            }
            Stmt::Branch(_) | Stmt::Empty(_) => {}
            Stmt::Block(n) => self.block(&mut n.block),
            Stmt::If(n) => self.if_stmt(n),
            Stmt::For(n) => {
                match &mut n.header {
                    ForHeader::Infinite => {}
                    ForHeader::Cond(cond) => self.visit(cond),
                    ForHeader::Clause {
                        init, cond, post, ..
                    } => {
                        if let Some(init) = init {
                            self.stmt(init);
                        }
                        if let Some(cond) = cond {
                            self.visit(cond);
                        }
                        if let Some(post) = post {
                            self.stmt(post);
                        }
                    }
                    ForHeader::Range { lhs, x, .. } => {
                        for e in lhs {
                            self.visit(e);
                        }
                        self.visit(x);
                    }
                }
                self.block(&mut n.body);
            }
            Stmt::Switch(n) => {
                if let Some(init) = &mut n.init {
                    self.stmt(init);
                }
                if let Some(tag) = &mut n.tag {
                    self.visit(tag);
                }
                for clause in &mut n.clauses {
                    for e in &mut clause.exprs {
                        self.visit(e);
                    }
                    self.stmts(&mut clause.stmts);
                }
            }
            Stmt::TypeSwitch(n) => {
                if let Some(init) = &mut n.init {
                    self.stmt(init);
                }
                if let Expr::TypeAssert(assert) = &mut n.guard {
                    self.visit(&mut assert.x);
                }
                for clause in &mut n.clauses {
                    self.stmts(&mut clause.stmts);
                }
            }
            Stmt::Select(n) => {
                for clause in &mut n.clauses {
                    if let Some(comm) = &mut clause.comm {
                        self.stmt(comm);
                    }
                    self.stmts(&mut clause.stmts);
                }
            }
            Stmt::Labeled(n) => {
                if let Some(inner) = &mut n.stmt {
                    self.stmt(inner);
                }
            }
            Stmt::Go(n) => self.visit(&mut n.call),
            Stmt::Defer(n) => self.visit(&mut n.call),
        }
    }

    fn if_stmt(&mut self, stmt: &mut IfStmt) {
        if let Some(init) = &mut stmt.init {
            self.stmt(init);
        }
        self.visit(&mut stmt.cond);
        self.block(&mut stmt.body);
        match &mut stmt.else_branch {
            Some(ElseBranch::If(inner)) => self.if_stmt(inner),
            Some(ElseBranch::Block(block)) => self.block(block),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mark::{mark_file, Marks};
    use crate::plan::plan_file;
    use crate::prepare::prepare_file;
    use condcov_syntax::nodes::traits::to_source;
    use condcov_syntax::parse_file;

    fn instrumented(src: &str, branch: bool) -> (String, CoverageTable) {
        let mut file = parse_file(src).expect("parse");
        let mut marks = Marks::new();
        mark_file(&file, branch, &mut marks);
        prepare_file(&mut file, &mut marks);
        let mut plans = Plans::new();
        plan_file(&file, "demo.go", &mut marks, &mut plans);
        let mut table = CoverageTable::new();
        replace_file(&mut file, &mut plans, &mut table);
        assert!(plans.is_empty(), "all plans must be consumed");
        (to_source(&file), table)
    }

    #[test]
    fn wraps_whole_condition_and_operands() {
        let src = "package p\n\nfunc f(a int, b bool) {\n\tif a > 0 && b {\n\t}\n}\n";
        let (out, table) = instrumented(src, false);
        assert!(out.contains(
            "if condcovCover(0, condcovCover(1, a > 0) && condcovCover(2, b)) {"
        ));
        assert_eq!(table.len(), 3);
        assert_eq!(table.conditions()[0].text, "a > 0 && b");
        assert_eq!(table.conditions()[1].text, "a > 0");
        assert_eq!(table.conditions()[2].text, "b");
    }

    #[test]
    fn branch_mode_wraps_only_the_whole() {
        let src = "package p\n\nfunc f(a int, b bool) {\n\tif a > 0 && b {\n\t}\n}\n";
        let (out, table) = instrumented(src, true);
        assert!(out.contains("if condcovCover(0, a > 0 && b) {"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn indices_follow_source_order() {
        let src = "package p\n\nfunc f(a, b int) {\n\tif a > 0 {\n\t}\n\tif b > 0 {\n\t}\n}\n";
        let (_, table) = instrumented(src, false);
        assert_eq!(table.conditions()[0].text, "a > 0");
        assert_eq!(table.conditions()[0].start, "demo.go:4:5");
        assert_eq!(table.conditions()[1].text, "b > 0");
        assert_eq!(table.conditions()[1].start, "demo.go:6:5");
    }

    #[test]
    fn rewritten_switch_cases_are_wrapped_with_original_text() {
        let src = "package p\n\nfunc f(s string) {\n\tswitch s {\n\tcase \"one\":\n\t}\n}\n";
        let (out, table) = instrumented(src, false);
        assert!(out.contains("case condcovCover(0, condcov_t_0 == \"one\"):"));
        assert_eq!(table.conditions()[0].text, "s == \"one\"");
    }

    #[test]
    fn unmodified_code_round_trips() {
        let src = "package p\n\n// nothing to instrument\nfunc f() {\n\tprintln(\"hi\")\n}\n";
        let (out, table) = instrumented(src, false);
        assert_eq!(out, src);
        assert!(table.is_empty());
    }

    #[test]
    fn const_initializers_stay_constant() {
        let src = "package p\n\nconst ok = 1 > 0\n";
        let (out, table) = instrumented(src, false);
        assert_eq!(out, src);
        assert!(table.is_empty());
    }
}
