use crate::ast::*;

pub fn to_sexp(program: &Program) -> String {
    let mut buf = String::new();
    for stmt in &program.body.statements {
        sexp_stmt(&mut buf, stmt);
        buf.push('\n');
    }
    buf
}

pub fn to_json(program: &Program) -> String {
    serde_json::to_string_pretty(program).expect("AST should be serializable")
}

fn sexp_stmt(buf: &mut String, stmt: &Stmt) {
    match stmt {
        Stmt::Expression(e) => sexp_expr(buf, &e.expression),
        Stmt::Var(v) => {
            buf.push_str("(var ");
            buf.push_str(&v.name);
            buf.push(' ');
            sexp_expr(buf, &v.value);
            buf.push(')');
        }
        Stmt::Print(p) => {
            buf.push_str("(print");
            for arg in &p.arguments {
                buf.push(' ');
                sexp_expr(buf, arg);
            }
            buf.push(')');
        }
        Stmt::Return(r) => {
            buf.push_str("(return ");
            sexp_expr(buf, &r.value);
            buf.push(')');
        }
        Stmt::Block(b) => {
            buf.push_str("(block");
            for stmt in &b.statements {
                buf.push(' ');
                sexp_stmt(buf, stmt);
            }
            buf.push(')');
        }
        Stmt::If(i) => {
            buf.push_str("(if ");
            sexp_expr(buf, &i.condition);
            buf.push(' ');
            sexp_stmt(buf, &i.then_branch);
            if let Some(ref else_branch) = i.else_branch {
                buf.push(' ');
                sexp_stmt(buf, else_branch);
            }
            buf.push(')');
        }
        Stmt::While(w) => {
            buf.push_str("(while ");
            sexp_expr(buf, &w.condition);
            buf.push(' ');
            sexp_stmt(buf, &w.body);
            buf.push(')');
        }
        Stmt::For(f) => {
            buf.push_str("(for ");
            sexp_stmt(buf, &f.initializer);
            buf.push(' ');
            sexp_expr(buf, &f.condition);
            buf.push(' ');
            sexp_stmt(buf, &f.step);
            buf.push(' ');
            sexp_stmt(buf, &f.body);
            buf.push(')');
        }
        Stmt::Function(f) => {
            buf.push_str("(fun ");
            buf.push_str(&f.name);
            buf.push_str(" (");
            buf.push_str(&f.params.join(" "));
            buf.push_str(") ");
            sexp_stmt(buf, &f.body);
            buf.push(')');
        }
    }
}

fn sexp_expr(buf: &mut String, expr: &Expr) {
    match expr {
        Expr::Binary(b) => {
            buf.push('(');
            buf.push_str(&b.operator.to_string());
            buf.push(' ');
            sexp_expr(buf, &b.left);
            buf.push(' ');
            sexp_expr(buf, &b.right);
            buf.push(')');
        }
        Expr::Unary(u) => {
            buf.push('(');
            buf.push_str(&u.operator.to_string());
            buf.push(' ');
            sexp_expr(buf, &u.operand);
            buf.push(')');
        }
        Expr::Literal(l) => match &l.value {
            LiteralValue::Number(n) => buf.push_str(&format!("{n}")),
            LiteralValue::String(s) => {
                buf.push('"');
                buf.push_str(s);
                buf.push('"');
            }
        },
        Expr::Variable(v) => buf.push_str(&v.name),
        Expr::Call(c) => {
            buf.push_str("(call ");
            sexp_expr(buf, &c.callee);
            for arg in &c.arguments {
                buf.push(' ');
                sexp_expr(buf, arg);
            }
            buf.push(')');
        }
    }
}
