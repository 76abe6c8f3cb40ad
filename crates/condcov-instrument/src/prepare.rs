//! Prepare pass: statement-level rewrites that run between marking and
//! planning.
//!
//! Switch statements with a tag and type switches have no expression that
//! could be wrapped in a cover call directly, so they are rewritten into a
//! block that evaluates the tag exactly once into a temporary and a tagless
//! switch whose case expressions are ordinary boolean conditions. Those
//! fabricated conditions are marked here with an explicit text override, so
//! the coverage table keeps describing the original source (`s == "one"`,
//! `x == nil`) rather than the rewritten form.

use condcov_syntax::nodes::decl::{Decl, File, GenDecl, Spec};
use condcov_syntax::nodes::expr::Expr;
use condcov_syntax::nodes::stmt::{Block, ElseBranch, EmptyStmt, ForHeader, IfStmt, Stmt};
use condcov_syntax::nodes::traits::NodeIdGenerator;
use condcov_syntax::tokenizer::{Pos, TokKind, Token};
use condcov_syntax::{render_eq, render_eq_nil};

use crate::factory;
use crate::mark::Marks;

/// Run the prepare pass over a whole file.
///
/// Temporaries are named `condcov_t_<n>`; the counter restarts at each
/// top-level function so the names stay short.
pub fn prepare_file(file: &mut File, marks: &mut Marks) {
    let ids = &mut file.ids;
    let mut prep = Prepare {
        marks,
        ids,
        counter: 0,
    };
    for decl in &mut file.decls {
        match decl {
            Decl::Func(func) => {
                prep.counter = 0;
                if let Some(body) = &mut func.body {
                    prep.block(body);
                }
            }
            Decl::Gen(gen) => prep.gen_decl(gen),
        }
    }
}

struct Prepare<'a> {
    marks: &'a mut Marks,
    ids: &'a mut NodeIdGenerator,
    counter: u32,
}

fn is_nil(expr: &Expr) -> bool {
    matches!(expr, Expr::Ident(id) if id.name() == "nil")
}

/// The leading trivia slot of a simple statement's first token. Covers
/// everything that can appear as a switch header init.
fn stmt_leading_mut(stmt: &mut Stmt) -> Option<&mut String> {
    match stmt {
        Stmt::Expr(n) => Some(&mut n.expr.first_token_mut().leading),
        Stmt::Send(n) => Some(&mut n.chan.first_token_mut().leading),
        Stmt::IncDec(n) => Some(&mut n.expr.first_token_mut().leading),
        Stmt::Assign(n) => match n.lhs.first_mut() {
            Some(e) => Some(&mut e.first_token_mut().leading),
            None => Some(&mut n.op.leading),
        },
        Stmt::Decl(n) => Some(&mut n.decl.tok.leading),
        Stmt::Empty(n) => Some(&mut n.semi.leading),
        _ => None,
    }
}

impl Prepare<'_> {
    fn temp(&mut self) -> String {
        let n = self.counter;
        self.counter += 1;
        format!("condcov_t_{n}")
    }

    fn placeholder(&mut self) -> Stmt {
        Stmt::Empty(Box::new(EmptyStmt {
            semi: Token::synth(TokKind::Semi, "", Pos::new(0, 0)),
            node_id: self.ids.next_id(),
        }))
    }

    /// Move a header init into the surrounding block, followed by a
    /// `_ = name` per declared name so a binding the cases no longer
    /// mention stays used.
    fn push_init(&mut self, init: Option<Stmt>, lead: &str, pos: Pos, out: &mut Vec<Stmt>) {
        let Some(mut init) = init else { return };
        let names: Vec<String> = match &init {
            Stmt::Assign(a) => a.declared_names().iter().map(|s| s.to_string()).collect(),
            _ => Vec::new(),
        };
        if let Some(leading) = stmt_leading_mut(&mut init) {
            *leading = lead.to_string();
        }
        out.push(init);
        for name in names {
            out.push(factory::discard(&name, lead, pos, self.ids));
        }
    }

    /// `switch init; tag { case e: }` becomes a block that binds the tag
    /// once and compares the temporary in a tagless switch.
    fn rewrite_tagged(&mut self, stmt: &mut Stmt) {
        let placeholder = self.placeholder();
        let Stmt::Switch(sw) = std::mem::replace(stmt, placeholder) else {
            unreachable!("caller matched a tagged switch");
        };
        let mut sw = *sw;
        let pos = sw.switch_tok.pos;
        let leading = std::mem::take(&mut sw.switch_tok.leading);
        let outer = factory::indent_of(&leading);
        let lead = format!("\n{outer}\t");
        let inner = format!("{outer}\t");

        let Some(tag) = sw.tag.take() else {
            unreachable!("caller matched a tagged switch");
        };
        // Recorded texts refer to the original tag, not the temporary.
        let texts: Vec<Vec<String>> = sw
            .clauses
            .iter()
            .map(|c| c.exprs.iter().map(|e| render_eq(&tag, e)).collect())
            .collect();

        let temp = self.temp();
        let mut stmts = Vec::new();
        self.push_init(sw.init.take(), &lead, pos, &mut stmts);
        stmts.push(factory::define(&temp, &lead, tag, pos, self.ids));

        let mut any_case_expr = false;
        for (clause, clause_texts) in sw.clauses.iter_mut().zip(texts) {
            for (e, text) in clause.exprs.iter_mut().zip(clause_texts) {
                any_case_expr = true;
                let orig = std::mem::replace(e, factory::ident("_", pos, self.ids));
                let eq = factory::eq_with_temp(&temp, orig, self.ids);
                self.marks.mark_with_text(eq.node_id(), text);
                *e = eq;
            }
        }
        if !any_case_expr {
            stmts.push(factory::discard(&temp, &lead, pos, self.ids));
        }
        stmts.push(factory::tagless_switch(&lead, &inner, sw.clauses, pos, self.ids));

        *stmt = factory::block(leading, &outer, stmts, pos, self.ids);
        if let Stmt::Block(b) = stmt {
            b.semi = sw.semi;
        }
        // Clause bodies may hold further switches.
        self.stmt(stmt);
    }

    /// `switch [v :=] x.(type) { case T: }` becomes a block that binds the
    /// guard once, runs a two-value assertion per case type, and switches
    /// over the resulting booleans.
    fn rewrite_type_switch(&mut self, stmt: &mut Stmt) {
        let placeholder = self.placeholder();
        let Stmt::TypeSwitch(sw) = std::mem::replace(stmt, placeholder) else {
            unreachable!("caller matched a type switch");
        };
        let mut sw = *sw;
        let pos = sw.switch_tok.pos;
        let leading = std::mem::take(&mut sw.switch_tok.leading);
        let outer = factory::indent_of(&leading);
        let lead = format!("\n{outer}\t");
        let inner = format!("{outer}\t");

        let guard_x = match sw.guard {
            Expr::TypeAssert(assert) => assert.x,
            other => other,
        };
        let texts: Vec<Vec<String>> = sw
            .clauses
            .iter()
            .map(|c| {
                c.exprs
                    .iter()
                    .map(|e| {
                        if is_nil(e) {
                            render_eq_nil(&guard_x)
                        } else {
                            render_eq(&guard_x, e)
                        }
                    })
                    .collect()
            })
            .collect();

        let mut stmts = Vec::new();
        self.push_init(sw.init.take(), &lead, pos, &mut stmts);
        let tag_temp = self.temp();
        stmts.push(factory::define(&tag_temp, &lead, guard_x, pos, self.ids));

        let bind = sw.bind.map(|b| b.name.name().to_string());
        let mut used = bind.is_some() && !sw.clauses.is_empty();

        for (clause, clause_texts) in sw.clauses.iter_mut().zip(texts) {
            // A clause naming exactly one concrete type rebinds the guard
            // at that type; any other shape keeps the interface value.
            let single_ty = match clause.exprs.as_slice() {
                [only] if !is_nil(only) => Some(only.clone()),
                _ => None,
            };
            for (e, text) in clause.exprs.iter_mut().zip(clause_texts) {
                used = true;
                let temp = self.temp();
                let case_leading = std::mem::take(&mut e.first_token_mut().leading);
                let orig = std::mem::replace(e, factory::ident("_", pos, self.ids));
                let test = if is_nil(&orig) {
                    let eq = factory::eq_nil(&tag_temp, "", pos, self.ids);
                    factory::define(&temp, &lead, eq, pos, self.ids)
                } else {
                    let assert = factory::type_assert(&tag_temp, orig, pos, self.ids);
                    factory::define_second(&temp, &lead, assert, pos, self.ids)
                };
                stmts.push(test);
                let mut flag = factory::ident(&temp, pos, self.ids);
                flag.first_token_mut().leading = case_leading;
                self.marks.mark_with_text(flag.node_id(), text);
                *e = flag;
            }
            if let Some(name) = &bind {
                let rhs = match single_ty {
                    Some(ty) => factory::type_assert(&tag_temp, ty, pos, self.ids),
                    None => factory::ident(&tag_temp, pos, self.ids),
                };
                clause.stmts.insert(0, factory::define(name, &lead, rhs, pos, self.ids));
                clause.stmts.insert(1, factory::discard(name, &lead, pos, self.ids));
            }
        }
        if !used {
            stmts.push(factory::discard(&tag_temp, &lead, pos, self.ids));
        }
        stmts.push(factory::tagless_switch(&lead, &inner, sw.clauses, pos, self.ids));

        *stmt = factory::block(leading, &outer, stmts, pos, self.ids);
        if let Stmt::Block(b) = stmt {
            b.semi = sw.semi;
        }
        self.stmt(stmt);
    }

    // === Walkers ===========================================================

    fn gen_decl(&mut self, decl: &mut GenDecl) {
        for spec in &mut decl.specs {
            if let Spec::Value(value) = spec {
                for expr in &mut value.values {
                    self.expr(expr);
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
        if matches!(stmt, Stmt::Switch(sw) if sw.tag.is_some()) {
            self.rewrite_tagged(stmt);
            return;
        }
        if matches!(stmt, Stmt::TypeSwitch(_)) {
            self.rewrite_type_switch(stmt);
            return;
        }
        match stmt {
            Stmt::Expr(n) => self.expr(&mut n.expr),
            Stmt::Send(n) => {
                self.expr(&mut n.chan);
                self.expr(&mut n.value);
            }
            Stmt::IncDec(n) => self.expr(&mut n.expr),
            Stmt::Assign(n) => {
                for e in &mut n.lhs {
                    self.expr(e);
                }
                for e in &mut n.rhs {
                    self.expr(e);
                }
            }
            Stmt::Decl(n) => self.gen_decl(&mut n.decl),
            Stmt::Return(n) => {
                for e in &mut n.results {
                    self.expr(e);
                }
            }
            Stmt::Branch(_) | Stmt::Empty(_) => {}
            Stmt::Block(n) => self.block(&mut n.block),
            Stmt::If(n) => self.if_stmt(n),
            Stmt::For(n) => {
                match &mut n.header {
                    ForHeader::Infinite => {}
                    ForHeader::Cond(cond) => self.expr(cond),
                    ForHeader::Clause {
                        init, cond, post, ..
                    } => {
                        if let Some(init) = init {
                            self.stmt(init);
                        }
                        if let Some(cond) = cond {
                            self.expr(cond);
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
                self.block(&mut n.body);
            }
            Stmt::Switch(n) => {
                // Tagless; tagged switches were rewritten above.
                if let Some(init) = &mut n.init {
                    self.stmt(init);
                }
                for clause in &mut n.clauses {
                    for e in &mut clause.exprs {
                        self.expr(e);
                    }
                    self.stmts(&mut clause.stmts);
                }
            }
            Stmt::TypeSwitch(_) => unreachable!("rewritten above"),
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
            Stmt::Go(n) => self.expr(&mut n.call),
            Stmt::Defer(n) => self.expr(&mut n.call),
        }
    }

    fn if_stmt(&mut self, stmt: &mut IfStmt) {
        if let Some(init) = &mut stmt.init {
            self.stmt(init);
        }
        self.expr(&mut stmt.cond);
        self.block(&mut stmt.body);
        match &mut stmt.else_branch {
            Some(ElseBranch::If(inner)) => self.if_stmt(inner),
            Some(ElseBranch::Block(block)) => self.block(block),
            None => {}
        }
    }

    /// Walk into function literals; other expressions hold no statements.
    fn expr(&mut self, expr: &mut Expr) {
        match expr {
            Expr::Ident(_) | Expr::Lit(_) | Expr::Ellipsis(_) => {}
            Expr::Unary(n) => self.expr(&mut n.operand),
            Expr::Binary(n) => {
                self.expr(&mut n.lhs);
                self.expr(&mut n.rhs);
            }
            Expr::Paren(n) => self.expr(&mut n.inner),
            Expr::Call(n) => {
                self.expr(&mut n.fun);
                for arg in &mut n.args {
                    self.expr(arg);
                }
            }
            Expr::Selector(n) => self.expr(&mut n.x),
            Expr::Index(n) => {
                self.expr(&mut n.x);
                self.expr(&mut n.index);
            }
            Expr::Slice(n) => {
                self.expr(&mut n.x);
                for e in [&mut n.low, &mut n.high, &mut n.max].into_iter().flatten() {
                    self.expr(e);
                }
            }
            Expr::TypeAssert(n) => self.expr(&mut n.x),
            Expr::Composite(n) => {
                for elt in &mut n.elts {
                    self.expr(elt);
                }
            }
            Expr::KeyValue(n) => {
                self.expr(&mut n.key);
                self.expr(&mut n.value);
            }
            Expr::FuncLit(n) => self.block(&mut n.body),
            Expr::Star(n) => self.expr(&mut n.x),
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
    use crate::mark::mark_file;
    use condcov_syntax::nodes::traits::to_source;
    use condcov_syntax::parse_file;

    fn prepared(src: &str) -> (String, Marks) {
        let mut file = parse_file(src).expect("parse");
        let mut marks = Marks::new();
        mark_file(&file, false, &mut marks);
        prepare_file(&mut file, &mut marks);
        (to_source(&file), marks)
    }

    #[test]
    fn tagged_switch_binds_tag_once() {
        let src = "package p\n\nfunc f(s string) {\n\tswitch s {\n\tcase \"one\":\n\t\tprintln(1)\n\t}\n}\n";
        let (out, marks) = prepared(src);
        assert_eq!(
            out,
            "package p\n\nfunc f(s string) {\n\t{\n\t\tcondcov_t_0 := s\n\t\tswitch {\n\tcase condcov_t_0 == \"one\":\n\t\tprintln(1)\n\t\t}\n\t}\n}\n"
        );
        assert_eq!(marks.len(), 1);
    }

    #[test]
    fn tagged_switch_init_names_are_discarded() {
        let src = "package p\n\nfunc f() {\n\tswitch s := get(); s {\n\tcase \"one\":\n\t}\n}\n";
        let (out, _) = prepared(src);
        assert!(out.contains("\n\t\ts := get()\n\t\t_ = s\n\t\tcondcov_t_0 := s"));
        assert!(out.contains("case condcov_t_0 == \"one\":"));
    }

    #[test]
    fn tag_without_case_exprs_is_still_used() {
        let src = "package p\n\nfunc f(s string) {\n\tswitch s {\n\tdefault:\n\t}\n}\n";
        let (out, marks) = prepared(src);
        assert!(out.contains("condcov_t_0 := s\n\t\t_ = condcov_t_0"));
        assert!(marks.is_empty());
    }

    #[test]
    fn type_switch_runs_eager_type_tests() {
        let src = "package p\n\nfunc f(x interface{}) {\n\tswitch v := x.(type) {\n\tcase int:\n\t\tprintln(v)\n\tdefault:\n\t\tprintln(v)\n\t}\n}\n";
        let (out, marks) = prepared(src);
        assert!(out.contains("condcov_t_0 := x"));
        assert!(out.contains("_, condcov_t_1 := condcov_t_0.(int)"));
        assert!(out.contains("case condcov_t_1:"));
        assert!(out.contains("v := condcov_t_0.(int)\n\t\t_ = v"));
        // The default clause keeps the interface value.
        assert!(out.contains("v := condcov_t_0\n\t\t_ = v"));
        assert_eq!(marks.len(), 1);
    }

    #[test]
    fn type_switch_nil_case_compares_against_nil() {
        let src = "package p\n\nfunc f(x interface{}) {\n\tswitch x.(type) {\n\tcase nil:\n\tcase int, string:\n\t}\n}\n";
        let (out, marks) = prepared(src);
        assert!(out.contains("condcov_t_1 := condcov_t_0 == nil"));
        assert!(out.contains("_, condcov_t_2 := condcov_t_0.(int)"));
        assert!(out.contains("_, condcov_t_3 := condcov_t_0.(string)"));
        assert!(out.contains("case condcov_t_2, condcov_t_3:"));
        assert_eq!(marks.len(), 3);
    }

    #[test]
    fn nested_switch_in_clause_body_is_rewritten() {
        let src = "package p\n\nfunc f(a, b int) {\n\tswitch a {\n\tcase 1:\n\t\tswitch b {\n\t\tcase 2:\n\t\t}\n\t}\n}\n";
        let (out, _) = prepared(src);
        assert!(out.contains("condcov_t_0 := a"));
        assert!(out.contains("condcov_t_1 := b"));
    }

    #[test]
    fn tagless_switch_is_left_alone() {
        let src = "package p\n\nfunc f(a int) {\n\tswitch {\n\tcase a > 0:\n\t}\n}\n";
        let (out, _) = prepared(src);
        assert_eq!(out, src);
    }
}
