//! Plan pass: reify marks into substitution plans.
//!
//! A second walk over the file drains the mark set in source order. Each
//! mark becomes a plan carrying the printable start location of the
//! original code and the normalized text to record. The replace pass later
//! consumes plans in its own in-order walk, which is what fixes condition
//! indices to source order.
//!
//! The generated-code guard lives here: when a line directive points a
//! marked expression into a file without the source suffix (a generator's
//! input), no plan is created and the expression stays untouched.

use std::collections::HashMap;

use condcov_syntax::nodes::decl::{Decl, File, GenDecl, Spec};
use condcov_syntax::nodes::expr::Expr;
use condcov_syntax::nodes::stmt::{Block, ElseBranch, ForHeader, Stmt};
use condcov_syntax::nodes::traits::NodeId;
use condcov_syntax::render::render;
use tracing::debug;

use crate::mark::Marks;

/// A pending expression substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// `"<path>:<line>:<col>"` into the pre-rewrite source.
    pub start: String,
    /// Normalized source rendering recorded in the coverage table.
    pub text: String,
}

/// All pending substitutions for one file, keyed by node.
#[derive(Debug, Default)]
pub struct Plans {
    map: HashMap<NodeId, Plan>,
}

impl Plans {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self, id: NodeId) -> Option<Plan> {
        self.map.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Drain `marks` into `plans` by walking `file` in source order.
///
/// Every mark is consumed: it either becomes a plan or is dropped by the
/// generated-code guard.
pub fn plan_file(file: &File, path: &str, marks: &mut Marks, plans: &mut Plans) {
    let mut planner = Planner { path, marks, plans };
    for decl in &file.decls {
        match decl {
            Decl::Func(func) => {
                if let Some(body) = &func.body {
                    planner.block(body);
                }
            }
            Decl::Gen(gen) => planner.gen_decl(gen),
        }
    }
    debug!(
        path,
        plans = planner.plans.len(),
        leftover_marks = planner.marks.len(),
        "planned file"
    );
}

struct Planner<'a> {
    path: &'a str,
    marks: &'a mut Marks,
    plans: &'a mut Plans,
}

impl Planner<'_> {
    fn visit(&mut self, expr: &Expr) {
        if let Some(text_override) = self.marks.take(expr.node_id()) {
            let file = expr.file_override().unwrap_or(self.path);
            if std::path::Path::new(file)
                .extension()
                .is_some_and(|ext| ext == "go")
            {
                let plan = Plan {
                    start: format!("{}:{}", file, expr.pos()),
                    text: text_override.unwrap_or_else(|| render(expr)),
                };
                self.plans.map.insert(expr.node_id(), plan);
            } else {
                debug!(file, "generated-code guard: leaving condition unwrapped");
            }
        }
        self.descend(expr);
    }

    fn descend(&mut self, expr: &Expr) {
        match expr {
            Expr::Ident(_) | Expr::Lit(_) | Expr::Ellipsis(_) => {}
            Expr::Unary(n) => self.visit(&n.operand),
            Expr::Binary(n) => {
                self.visit(&n.lhs);
                self.visit(&n.rhs);
            }
            Expr::Paren(n) => self.visit(&n.inner),
            Expr::Call(n) => {
                self.visit(&n.fun);
                for arg in &n.args {
                    self.visit(arg);
                }
            }
            Expr::Selector(n) => self.visit(&n.x),
            Expr::Index(n) => {
                self.visit(&n.x);
                self.visit(&n.index);
            }
            Expr::Slice(n) => {
                self.visit(&n.x);
                for e in [&n.low, &n.high, &n.max].into_iter().flatten() {
                    self.visit(e);
                }
            }
            Expr::TypeAssert(n) => self.visit(&n.x),
            Expr::Composite(n) => {
                for elt in &n.elts {
                    self.visit(elt);
                }
            }
            Expr::KeyValue(n) => {
                self.visit(&n.key);
                self.visit(&n.value);
            }
            Expr::FuncLit(n) => self.block(&n.body),
            Expr::Star(n) => self.visit(&n.x),
            Expr::ArrayType(_)
            | Expr::MapType(_)
            | Expr::ChanType(_)
            | Expr::FuncType(_)
            | Expr::StructType(_)
            | Expr::InterfaceType(_) => {}
        }
    }

    fn gen_decl(&mut self, decl: &GenDecl) {
        if decl.is_const() {
            return;
        }
        for spec in &decl.specs {
            if let Spec::Value(value) = spec {
                for expr in &value.values {
                    self.visit(expr);
                }
            }
        }
    }

    fn block(&mut self, block: &Block) {
        for stmt in &block.stmts {
            self.stmt(stmt);
        }
    }

    fn stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.stmt(stmt);
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(n) => self.visit(&n.expr),
            Stmt::Send(n) => {
                self.visit(&n.chan);
                self.visit(&n.value);
            }
            Stmt::IncDec(n) => self.visit(&n.expr),
            Stmt::Assign(n) => {
                for e in &n.lhs {
                    self.visit(e);
                }
                for e in &n.rhs {
                    self.visit(e);
                }
            }
            Stmt::Decl(n) => self.gen_decl(&n.decl),
            Stmt::Return(n) => {
                for e in &n.results {
                    self.visit(e);
                }
            }
            Stmt::Branch(_) | Stmt::Empty(_) => {}
            Stmt::Block(n) => self.block(&n.block),
            Stmt::If(n) => self.if_stmt(n),
            Stmt::For(n) => {
                match &n.header {
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
                self.block(&n.body);
            }
            Stmt::Switch(n) => {
                if let Some(init) = &n.init {
                    self.stmt(init);
                }
                if let Some(tag) = &n.tag {
                    self.visit(tag);
                }
                for clause in &n.clauses {
                    for e in &clause.exprs {
                        self.visit(e);
                    }
                    self.stmts(&clause.stmts);
                }
            }
            Stmt::TypeSwitch(n) => {
                if let Some(init) = &n.init {
                    self.stmt(init);
                }
                self.visit(n.guard_expr());
                for clause in &n.clauses {
                    self.stmts(&clause.stmts);
                }
            }
            Stmt::Select(n) => {
                for clause in &n.clauses {
                    if let Some(comm) = &clause.comm {
                        self.stmt(comm);
                    }
                    self.stmts(&clause.stmts);
                }
            }
            Stmt::Labeled(n) => {
                if let Some(inner) = &n.stmt {
                    self.stmt(inner);
                }
            }
            Stmt::Go(n) => self.visit(&n.call),
            Stmt::Defer(n) => self.visit(&n.call),
        }
    }

    fn if_stmt(&mut self, stmt: &condcov_syntax::nodes::stmt::IfStmt) {
        if let Some(init) = &stmt.init {
            self.stmt(init);
        }
        self.visit(&stmt.cond);
        self.block(&stmt.body);
        match &stmt.else_branch {
            Some(ElseBranch::If(inner)) => self.if_stmt(inner),
            Some(ElseBranch::Block(block)) => self.block(block),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mark::mark_file;
    use condcov_syntax::parse_file;

    fn plans_for(src: &str) -> (condcov_syntax::decl::File, Plans) {
        let file = parse_file(src).expect("parse");
        let mut marks = Marks::new();
        mark_file(&file, false, &mut marks);
        let mut plans = Plans::new();
        plan_file(&file, "demo.go", &mut marks, &mut plans);
        assert!(marks.is_empty(), "marks must be fully drained");
        (file, plans)
    }

    #[test]
    fn every_mark_becomes_one_plan() {
        let src = "package p\n\nfunc f(i int) {\n\t_ = i > 0\n\tpos := i > 0\n\t_ = pos\n}\n";
        let (_, plans) = plans_for(src);
        assert_eq!(plans.len(), 2);
    }

    #[test]
    fn plan_records_position_and_text() {
        let src = "package p\n\nfunc f(i int) {\n\t_ = i > 0\n}\n";
        let (file, mut plans) = plans_for(src);
        // Fish out the planned node to check its record.
        let mut found = None;
        for id in 0..file.ids.count() {
            if let Some(plan) = plans.take(condcov_syntax::NodeId(id)) {
                found = Some(plan);
            }
        }
        let plan = found.expect("one plan");
        assert_eq!(plan.text, "i > 0");
        assert_eq!(plan.start, "demo.go:4:6");
    }

    #[test]
    fn line_directive_guard_drops_non_source_positions() {
        let src = "package p\n\n//line grammar.y:10\nfunc f(i int) {\n\t_ = i > 0\n}\n";
        let (_, plans) = plans_for(src);
        assert!(plans.is_empty());
    }
}
