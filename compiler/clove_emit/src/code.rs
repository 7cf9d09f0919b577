//! Expression and statement printing.
//!
//! Lowered nodes map one-to-one onto C++ forms; nothing here decides
//! semantics. Statement expressions (`LowExpr::Block`) use the GNU
//! `({ ...; result; })` form.

use clove_ir::{LowArena, LowExpr, LowId, LowRange, LowStmt, LowStmtId, UnaryOp};

use crate::emitter::{Emitter, InlineEmitter};
use crate::names::{escape, Spelling};

pub(crate) struct CodePrinter<'a> {
    pub arena: &'a LowArena,
    pub names: Spelling<'a>,
}

impl<'a> CodePrinter<'a> {
    pub fn new(arena: &'a LowArena, names: Spelling<'a>) -> Self {
        CodePrinter { arena, names }
    }

    pub fn expr_string(&self, id: LowId) -> String {
        let mut out = String::new();
        self.expr(id, &mut out);
        out
    }

    fn args(&self, range: LowRange, out: &mut String) {
        out.push('(');
        for (i, &arg) in self.arena.list(range).iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.expr(arg, out);
        }
        out.push(')');
    }

    pub fn expr(&self, id: LowId, out: &mut String) {
        let names = &self.names;
        match self.arena.kind(id) {
            LowExpr::Int(value) => {
                out.push_str(&value.to_string());
                if i32::try_from(*value).is_err() {
                    out.push_str("LL");
                }
            }
            LowExpr::Float(bits) => out.push_str(&float_literal(f64::from_bits(*bits))),
            LowExpr::Bool(value) => out.push_str(if *value { "true" } else { "false" }),
            LowExpr::Char(c) => {
                if c.is_ascii() {
                    out.push('\'');
                    out.push_str(&escape(&c.to_string(), '\''));
                    out.push('\'');
                } else {
                    out.push_str(&format!("(char) {}", u32::from(*c)));
                }
            }
            LowExpr::Str(text) => {
                out.push_str(&names.runtime_fn("literal"));
                out.push_str("(\"");
                out.push_str(&escape(names.name(*text), '"'));
                out.push_str("\")");
            }
            LowExpr::Null => {
                out.push_str(&names.runtime_fn("null"));
                out.push_str("()");
            }
            LowExpr::Local(name) => out.push_str(names.name(*name)),
            LowExpr::Field { object, field } => {
                self.expr(*object, out);
                out.push_str("->");
                out.push_str(names.name(*field));
            }
            LowExpr::StaticField { class, field } => {
                out.push_str(&names.struct_name(*class));
                out.push_str("::");
                out.push_str(names.name(*field));
            }
            LowExpr::ArrayLength(array) => {
                self.expr(*array, out);
                out.push_str("->length");
            }
            LowExpr::Index { array, index } => {
                out.push_str("(*");
                self.expr(*array, out);
                out.push_str(")[");
                self.expr(*index, out);
                out.push(']');
            }
            LowExpr::Assign { target, value } => {
                self.expr(*target, out);
                out.push_str(" = ");
                self.expr(*value, out);
            }
            LowExpr::Binary { op, left, right } => {
                out.push('(');
                self.expr(*left, out);
                out.push(' ');
                out.push_str(op.as_symbol());
                out.push(' ');
                self.expr(*right, out);
                out.push(')');
            }
            LowExpr::Unary { op, operand } => self.unary(*op, *operand, out),
            LowExpr::Cast { ty, expr } => {
                if ty.is_reference() {
                    out.push_str(&names.runtime_fn("java_cast"));
                    out.push('<');
                    out.push_str(&names.ty(ty));
                    out.push_str(">(");
                    self.expr(*expr, out);
                    out.push(')');
                } else {
                    out.push_str("((");
                    out.push_str(&names.ty(ty));
                    out.push_str(") ");
                    self.expr(*expr, out);
                    out.push(')');
                }
            }
            LowExpr::InstanceOf { expr, class } => {
                out.push_str(&names.runtime_fn("instanceOf"));
                out.push('(');
                self.expr(*expr, out);
                out.push_str(", ");
                out.push_str(&names.struct_name(*class));
                out.push_str("::__class())");
            }
            LowExpr::Alloc { class } => {
                out.push_str("new ");
                out.push_str(&names.struct_name(*class));
                out.push_str("()");
            }
            LowExpr::InitCall { class, args } => {
                out.push_str(&names.struct_name(*class));
                out.push_str("::__init");
                self.args(*args, out);
            }
            LowExpr::VirtualCall {
                receiver,
                slot,
                args,
            } => {
                self.expr(*receiver, out);
                out.push_str("->__vptr->");
                out.push_str(names.name(*slot));
                self.args(*args, out);
            }
            LowExpr::QualifiedCall {
                class,
                method,
                args,
            } => {
                out.push_str(&names.struct_name(*class));
                out.push_str("::");
                out.push_str(names.name(*method));
                self.args(*args, out);
            }
            LowExpr::DirectCall {
                receiver,
                method,
                args,
            }
            | LowExpr::UnresolvedCall {
                receiver,
                method,
                args,
            } => {
                if receiver.is_valid() {
                    self.expr(*receiver, out);
                    out.push_str("->");
                }
                out.push_str(names.name(*method));
                self.args(*args, out);
            }
            LowExpr::Check { kind, args } => {
                out.push_str(&names.runtime_fn(kind.runtime_name()));
                self.args(*args, out);
            }
            LowExpr::ArrayAlloc { elem, length } => {
                out.push_str("new ");
                out.push_str(&names.array_struct(elem));
                out.push('(');
                self.expr(*length, out);
                out.push(')');
            }
            LowExpr::TypeIdentity { class } => {
                out.push_str(&names.struct_name(*class));
                out.push_str("::__class()");
            }
            LowExpr::Print { args, newline } => {
                out.push_str("std::cout");
                for &arg in self.arena.list(*args) {
                    out.push_str(" << ");
                    self.expr(arg, out);
                }
                if *newline {
                    out.push_str(" << std::endl");
                }
            }
            LowExpr::Block { stmts, result } => {
                out.push_str("({ ");
                let mut inline = InlineEmitter::new(out);
                for &stmt in self.arena.stmt_list(*stmts) {
                    self.stmt(stmt, 0, &mut inline);
                }
                if result.is_valid() {
                    self.expr(*result, out);
                    out.push_str("; ");
                }
                out.push_str("})");
            }
        }
    }

    fn unary(&self, op: UnaryOp, operand: LowId, out: &mut String) {
        match op {
            UnaryOp::Neg | UnaryOp::Not => {
                out.push('(');
                out.push_str(if op == UnaryOp::Neg { "-" } else { "!" });
                self.expr(operand, out);
                out.push(')');
            }
            UnaryOp::PreInc | UnaryOp::PreDec => {
                out.push_str(if op == UnaryOp::PreInc { "++" } else { "--" });
                self.expr(operand, out);
            }
            UnaryOp::PostInc | UnaryOp::PostDec => {
                self.expr(operand, out);
                out.push_str(if op == UnaryOp::PostInc { "++" } else { "--" });
            }
        }
    }

    /// Print one statement at `level`, ending with a line break.
    pub fn stmt<E: Emitter>(&self, id: LowStmtId, level: usize, out: &mut E) {
        match self.arena.stmt(id) {
            LowStmt::Expr(expr) => {
                out.emit_indent(level);
                out.emit(&self.expr_string(*expr));
                out.emit(";");
                out.emit_newline();
            }
            LowStmt::Local { .. } => {
                out.emit_indent(level);
                out.emit(&self.local(id));
                out.emit(";");
                out.emit_newline();
            }
            LowStmt::Block(_) => {
                out.emit_indent(level);
                out.emit("{");
                out.emit_newline();
                self.children(id, level + 1, out);
                out.emit_indent(level);
                out.emit("}");
                out.emit_newline();
            }
            LowStmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                out.emit_indent(level);
                out.emit("if (");
                out.emit(&self.expr_string(*cond));
                out.emit(") {");
                out.emit_newline();
                self.children(*then_branch, level + 1, out);
                out.emit_indent(level);
                out.emit("}");
                if else_branch.is_valid() {
                    out.emit(" else {");
                    out.emit_newline();
                    self.children(*else_branch, level + 1, out);
                    out.emit_indent(level);
                    out.emit("}");
                }
                out.emit_newline();
            }
            LowStmt::While { cond, body } => {
                out.emit_indent(level);
                out.emit("while (");
                out.emit(&self.expr_string(*cond));
                out.emit(") {");
                out.emit_newline();
                self.children(*body, level + 1, out);
                out.emit_indent(level);
                out.emit("}");
                out.emit_newline();
            }
            LowStmt::For {
                init,
                cond,
                update,
                body,
            } => {
                let init: Vec<String> = self
                    .arena
                    .stmt_list(*init)
                    .iter()
                    .map(|&stmt| self.for_clause(stmt))
                    .collect();
                let update: Vec<String> = self
                    .arena
                    .list(*update)
                    .iter()
                    .map(|&expr| self.expr_string(expr))
                    .collect();
                out.emit_indent(level);
                out.emit("for (");
                out.emit(&init.join(", "));
                out.emit("; ");
                if cond.is_valid() {
                    out.emit(&self.expr_string(*cond));
                }
                out.emit("; ");
                out.emit(&update.join(", "));
                out.emit(") {");
                out.emit_newline();
                self.children(*body, level + 1, out);
                out.emit_indent(level);
                out.emit("}");
                out.emit_newline();
            }
            LowStmt::Return(value) => {
                out.emit_indent(level);
                if value.is_valid() {
                    out.emit("return ");
                    out.emit(&self.expr_string(*value));
                    out.emit(";");
                } else {
                    out.emit("return;");
                }
                out.emit_newline();
            }
        }
    }

    /// Statements of a body or branch; a lone statement is its own list.
    pub fn children<E: Emitter>(&self, id: LowStmtId, level: usize, out: &mut E) {
        if !id.is_valid() {
            return;
        }
        match self.arena.stmt(id) {
            LowStmt::Block(range) => {
                for &stmt in self.arena.stmt_list(*range) {
                    self.stmt(stmt, level, out);
                }
            }
            _ => self.stmt(id, level, out),
        }
    }

    /// `T name = init`, without the terminator.
    fn local(&self, id: LowStmtId) -> String {
        match self.arena.stmt(id) {
            LowStmt::Local { name, ty, init } => {
                let mut out = format!("{} {}", self.names.ty(ty), self.names.name(*name));
                if init.is_valid() {
                    out.push_str(" = ");
                    self.expr(*init, &mut out);
                }
                out
            }
            _ => String::new(),
        }
    }

    fn for_clause(&self, id: LowStmtId) -> String {
        match self.arena.stmt(id) {
            LowStmt::Local { .. } => self.local(id),
            LowStmt::Expr(expr) => self.expr_string(*expr),
            _ => String::new(),
        }
    }
}

fn float_literal(value: f64) -> String {
    if value.is_nan() {
        "(0.0 / 0.0)".to_owned()
    } else if value.is_infinite() {
        if value > 0.0 {
            "(1.0 / 0.0)".to_owned()
        } else {
            "(-1.0 / 0.0)".to_owned()
        }
    } else {
        format!("{value:?}")
    }
}
