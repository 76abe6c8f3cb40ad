//! Mark pass: decide which expressions are conditions to instrument.
//!
//! The pass only records intent, keyed by [`NodeId`]; actual substitution
//! happens in the replace pass. Controlling conditions (`if`, `for`, case
//! expressions of a tagless switch) are marked as a whole. In condition
//! coverage mode, short-circuit operators are additionally decomposed so
//! each atomic predicate is observed separately, and any comparison
//! anywhere in instrumentable code is marked. Branch coverage mode
//! suppresses the decomposition and the generic comparison rule.

use std::collections::HashMap;

use condcov_syntax::nodes::decl::{Decl, File, GenDecl, Spec};
use condcov_syntax::nodes::expr::Expr;
use condcov_syntax::nodes::stmt::{Block, CaseClause, ElseBranch, ForHeader, Stmt};
use condcov_syntax::nodes::traits::NodeId;
use condcov_syntax::tokenizer::TokKind;

/// The set of expressions marked for instrumentation.
///
/// A mark may carry an explicit text override; plain marks render their
/// text from the node when they are planned. Overrides are added by the
/// prepare pass for fabricated nodes whose recorded text must refer to
/// the original source (`"s == (a && b)"`, `"x == nil"`).
#[derive(Debug, Default)]
pub struct Marks {
    map: HashMap<NodeId, Option<String>>,
}

impl Marks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&mut self, id: NodeId) {
        self.map.entry(id).or_insert(None);
    }

    pub fn mark_with_text(&mut self, id: NodeId, text: String) {
        self.map.insert(id, Some(text));
    }

    pub fn is_marked(&self, id: NodeId) -> bool {
        self.map.contains_key(&id)
    }

    /// Drain the mark for `id`, returning its text override if any.
    pub fn take(&mut self, id: NodeId) -> Option<Option<String>> {
        self.map.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Run the mark pass over a whole file.
pub fn mark_file(file: &File, branch_coverage: bool, marks: &mut Marks) {
    let mut marker = Marker {
        marks,
        branch_coverage,
    };
    for decl in &file.decls {
        match decl {
            Decl::Func(func) => {
                if let Some(body) = &func.body {
                    marker.block(body);
                }
            }
            Decl::Gen(gen) => marker.gen_decl(gen),
        }
    }
}

struct Marker<'a> {
    marks: &'a mut Marks,
    branch_coverage: bool,
}

impl Marker<'_> {
    fn gen_decl(&mut self, decl: &GenDecl) {
        // Wrapping inside a constant declaration would demote it from a
        // compile-time constant.
        if decl.is_const() {
            return;
        }
        for spec in &decl.specs {
            if let Spec::Value(value) = spec {
                for expr in &value.values {
                    self.expr(expr);
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
            Stmt::Expr(n) => self.expr(&n.expr),
            Stmt::Send(n) => {
                self.expr(&n.chan);
                self.expr(&n.value);
            }
            Stmt::IncDec(n) => self.expr(&n.expr),
            Stmt::Assign(n) => {
                for e in &n.lhs {
                    self.expr(e);
                }
                for e in &n.rhs {
                    self.expr(e);
                }
            }
            Stmt::Decl(n) => self.gen_decl(&n.decl),
            Stmt::Return(n) => {
                for e in &n.results {
                    self.expr(e);
                }
            }
            Stmt::Branch(_) | Stmt::Empty(_) => {}
            Stmt::Block(n) => self.block(&n.block),
            Stmt::If(n) => self.if_stmt(n),
            Stmt::For(n) => {
                match &n.header {
                    ForHeader::Infinite => {}
                    ForHeader::Cond(cond) => self.cond(cond),
                    ForHeader::Clause {
                        init, cond, post, ..
                    } => {
                        if let Some(init) = init {
                            self.stmt(init);
                        }
                        if let Some(cond) = cond {
                            self.cond(cond);
                        }
                        if let Some(post) = post {
                            self.stmt(post);
                        }
                    }
                    ForHeader::Range { lhs, x, .. } => {
                        for e in lhs {
                            self.expr(e);
                        }
                        self.expr(x);
                    }
                }
                self.block(&n.body);
            }
            Stmt::Switch(n) => {
                if let Some(init) = &n.init {
                    self.stmt(init);
                }
                match &n.tag {
                    // Tagged switch: the prepare pass rewrites the case
                    // expressions into equalities; here only nested
                    // conditions inside them are interesting.
                    Some(tag) => {
                        self.expr(tag);
                        for clause in &n.clauses {
                            self.clause_exprs_generic(clause);
                            self.stmts(&clause.stmts);
                        }
                    }
                    // Tagless switch: every case expression is a
                    // controlling condition.
                    None => {
                        for clause in &n.clauses {
                            for e in &clause.exprs {
                                self.cond(e);
                            }
                            self.stmts(&clause.stmts);
                        }
                    }
                }
            }
            Stmt::TypeSwitch(n) => {
                if let Some(init) = &n.init {
                    self.stmt(init);
                }
                self.expr(n.guard_expr());
                for clause in &n.clauses {
                    self.stmts(&clause.stmts);
                }
            }
            // Select statements are left to the language's own coverage
            // tooling; their bodies are still walked.
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
            Stmt::Go(n) => self.expr(&n.call),
            Stmt::Defer(n) => self.expr(&n.call),
        }
    }

    fn if_stmt(&mut self, stmt: &condcov_syntax::nodes::stmt::IfStmt) {
        if let Some(init) = &stmt.init {
            self.stmt(init);
        }
        self.cond(&stmt.cond);
        self.block(&stmt.body);
        match &stmt.else_branch {
            Some(ElseBranch::If(inner)) => self.if_stmt(inner),
            Some(ElseBranch::Block(block)) => self.block(block),
            None => {}
        }
    }

    fn clause_exprs_generic(&mut self, clause: &CaseClause) {
        for e in &clause.exprs {
            self.expr(e);
        }
    }

    /// A controlling condition position.
    fn cond(&mut self, expr: &Expr) {
        if self.branch_coverage {
            self.marks.mark(expr.node_id());
            self.descend(expr);
            return;
        }
        match expr {
            Expr::Paren(n) => self.cond(&n.inner),
            Expr::Unary(n) if n.op.kind == TokKind::Not => self.cond(&n.operand),
            Expr::Binary(n)
                if matches!(n.op.kind, TokKind::AndAnd | TokKind::OrOr) =>
            {
                // The whole short-circuit condition is observed, and so is
                // each of its atomic operands.
                self.marks.mark(expr.node_id());
                self.operand(&n.lhs);
                self.operand(&n.rhs);
            }
            _ => {
                self.marks.mark(expr.node_id());
                self.descend(expr);
            }
        }
    }

    /// An operand of a decomposed short-circuit operator.
    fn operand(&mut self, expr: &Expr) {
        match expr {
            Expr::Paren(n) => self.operand(&n.inner),
            Expr::Unary(n) if n.op.kind == TokKind::Not => self.operand(&n.operand),
            Expr::Binary(n)
                if matches!(n.op.kind, TokKind::AndAnd | TokKind::OrOr) =>
            {
                self.operand(&n.lhs);
                self.operand(&n.rhs);
            }
            _ => {
                self.marks.mark(expr.node_id());
                self.descend(expr);
            }
        }
    }

    /// Generic expression position.
    fn expr(&mut self, expr: &Expr) {
        if !self.branch_coverage {
            match expr {
                Expr::Unary(n) if n.op.kind == TokKind::Not => {
                    self.operand(&n.operand);
                    return;
                }
                Expr::Binary(n)
                    if matches!(n.op.kind, TokKind::AndAnd | TokKind::OrOr) =>
                {
                    self.operand(&n.lhs);
                    self.operand(&n.rhs);
                    return;
                }
                Expr::Binary(n) if n.op.kind.is_comparison() => {
                    self.marks.mark(expr.node_id());
                }
                _ => {}
            }
        }
        self.descend(expr);
    }

    /// Walk into sub-expressions without marking the node itself.
    fn descend(&mut self, expr: &Expr) {
        match expr {
            Expr::Ident(_) | Expr::Lit(_) | Expr::Ellipsis(_) => {}
            Expr::Unary(n) => self.expr(&n.operand),
            Expr::Binary(n) => {
                self.expr(&n.lhs);
                self.expr(&n.rhs);
            }
            Expr::Paren(n) => self.expr(&n.inner),
            Expr::Call(n) => {
                self.expr(&n.fun);
                for arg in &n.args {
                    self.expr(arg);
                }
            }
            Expr::Selector(n) => self.expr(&n.x),
            Expr::Index(n) => {
                self.expr(&n.x);
                self.expr(&n.index);
            }
            Expr::Slice(n) => {
                self.expr(&n.x);
                for e in [&n.low, &n.high, &n.max].into_iter().flatten() {
                    self.expr(e);
                }
            }
            Expr::TypeAssert(n) => self.expr(&n.x),
            Expr::Composite(n) => {
                for elt in &n.elts {
                    self.expr(elt);
                }
            }
            Expr::KeyValue(n) => {
                self.expr(&n.key);
                self.expr(&n.value);
            }
            Expr::FuncLit(n) => self.block(&n.body),
            Expr::Star(n) => self.expr(&n.x),
            Expr::ArrayType(_)
            | Expr::MapType(_)
            | Expr::ChanType(_)
            | Expr::FuncType(_)
            | Expr::StructType(_)
            | Expr::InterfaceType(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use condcov_syntax::parse_file;

    fn marked_count(src: &str, branch: bool) -> usize {
        let file = parse_file(src).expect("parse");
        let mut marks = Marks::new();
        mark_file(&file, branch, &mut marks);
        marks.len()
    }

    #[test]
    fn comparisons_in_expressions_are_marked() {
        let src = "package p\n\nfunc f(i int) {\n\t_ = i > 0\n\tpos := i > 0\n\t_ = pos\n}\n";
        assert_eq!(marked_count(src, false), 2);
        assert_eq!(marked_count(src, true), 0);
    }

    #[test]
    fn if_condition_decomposes_plus_whole() {
        let src = "package p\n\nfunc f(a int, b string) {\n\tif a > 0 && b == \"positive\" {\n\t}\n}\n";
        assert_eq!(marked_count(src, false), 3);
        assert_eq!(marked_count(src, true), 1);
    }

    #[test]
    fn negations_collapse_to_their_operand() {
        let src = "package p\n\nfunc f(a, b, c bool) {\n\t_ = !!!a\n\t_ = !b && c\n}\n";
        // `a`, then `b` and `c`.
        assert_eq!(marked_count(src, false), 3);
        assert_eq!(marked_count(src, true), 0);
    }

    #[test]
    fn marks_answer_membership_by_node_id() {
        let src = "package p\n\nfunc f(i int) {\n\tif i > 0 {\n\t}\n}\n";
        let file = parse_file(src).expect("parse");
        let mut marks = Marks::new();
        mark_file(&file, false, &mut marks);
        let marked: Vec<condcov_syntax::NodeId> = (0..file.ids.count())
            .map(condcov_syntax::NodeId)
            .filter(|id| marks.is_marked(*id))
            .collect();
        assert_eq!(marked.len(), 1);
        assert!(!marks.is_marked(condcov_syntax::NodeId(file.ids.count())));
    }

    #[test]
    fn const_decls_are_not_descended() {
        let src = "package p\n\nconst big = 1 > 0\n\nvar v = 1 > 0\n";
        assert_eq!(marked_count(src, false), 1);
    }

    #[test]
    fn for_clause_and_nested_if() {
        let src = "package p\n\nfunc f(b []byte, a byte) bool {\n\tfor i := 0; i < len(b); i++ {\n\t\tif b[i] == a {\n\t\t\treturn true\n\t\t}\n\t}\n\tfor {\n\t}\n\treturn false\n}\n";
        assert_eq!(marked_count(src, false), 2);
        assert_eq!(marked_count(src, true), 2);
    }

    #[test]
    fn tagless_switch_cases_are_conditions() {
        let src = "package p\n\nfunc f(a, b bool) {\n\tswitch {\n\tcase a && b:\n\tcase a:\n\t}\n}\n";
        // a && b whole, a, b, then the second clause's a.
        assert_eq!(marked_count(src, false), 4);
        assert_eq!(marked_count(src, true), 2);
    }

    #[test]
    fn tagged_switch_cases_only_mark_nested_conditions() {
        let src = "package p\n\nfunc f(s string, i int) {\n\tswitch s {\n\tcase \"one\", name(i > 0):\n\t}\n}\n";
        assert_eq!(marked_count(src, false), 1);
        assert_eq!(marked_count(src, true), 0);
    }
}
