pub mod callable;
pub mod environment;
pub mod value;

use std::io::Write;
use std::rc::Rc;

use crate::ast::*;
use crate::error::RuntimeError;
use crate::interpreter::callable::{Builtin, Callable, UserFunction};
use crate::interpreter::environment::Environment;
use crate::interpreter::value::Value;
use crate::scanner::token::Span;

/// Nested user calls allowed before the run is aborted.
pub const MAX_CALL_DEPTH: usize = 200;

/// How a statement finished.
#[derive(Debug, Clone)]
pub enum Flow {
    Normal,
    /// A `प्रत्यावर्तयतु` is unwinding to the nearest call, carrying its
    /// value (or none, when the returned expression produced none).
    Return(Option<Value>),
}

pub struct Interpreter {
    environment: Environment,
    output: Vec<String>,
    /// Writer for print output (allows testing without stdout)
    writer: Box<dyn Write>,
    depth: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_writer(Box::new(std::io::stdout()))
    }

    /// Create an interpreter that prints to `writer` instead of stdout.
    pub fn with_writer(writer: Box<dyn Write>) -> Self {
        let mut environment = Environment::new();
        environment.define(
            Builtin::Print.name(),
            Value::Function(Callable::Builtin(Builtin::Print)),
        );

        Self {
            environment,
            output: Vec::new(),
            writer,
            depth: 0,
        }
    }

    /// Run a program against this interpreter's environment. Bindings made
    /// by the program remain visible to later calls.
    pub fn interpret(&mut self, program: &Program) -> Result<(), RuntimeError> {
        if let Flow::Return(_) = self.execute_block(&program.body)? {
            tracing::debug!("return at top level ended the program");
        }
        Ok(())
    }

    /// Every line printed so far, in order.
    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<Flow, RuntimeError> {
        match stmt {
            Stmt::Expression(e) => {
                self.evaluate(&e.expression)?;
                Ok(Flow::Normal)
            }
            Stmt::Var(v) => {
                let value = self.evaluate_value(&v.value)?;
                self.environment.define(&v.name, value);
                Ok(Flow::Normal)
            }
            Stmt::Print(p) => {
                let name = Builtin::Print.name();
                let callee = self.environment.get(name).ok_or_else(|| {
                    RuntimeError::with_span(format!("undefined name '{name}'"), p.span)
                })?;
                let args = self.evaluate_arguments(&p.arguments)?;
                self.call_value(name, callee, args, p.span)?;
                Ok(Flow::Normal)
            }
            Stmt::Return(r) => {
                let value = self.evaluate(&r.value)?;
                Ok(Flow::Return(value))
            }
            Stmt::Block(b) => self.execute_block(b),
            Stmt::If(i) => {
                if self.condition(&i.condition)? {
                    self.execute(&i.then_branch)
                } else if let Some(ref else_branch) = i.else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::While(w) => {
                while self.condition(&w.condition)? {
                    if let flow @ Flow::Return(_) = self.execute(&w.body)? {
                        return Ok(flow);
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::For(f) => {
                if let flow @ Flow::Return(_) = self.execute(&f.initializer)? {
                    return Ok(flow);
                }
                while self.condition(&f.condition)? {
                    if let flow @ Flow::Return(_) = self.execute(&f.body)? {
                        return Ok(flow);
                    }
                    if let flow @ Flow::Return(_) = self.execute(&f.step)? {
                        return Ok(flow);
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::Function(f) => {
                let function = UserFunction {
                    declaration: Rc::new(f.clone()),
                };
                self.environment
                    .define(&f.name, Value::Function(Callable::User(function)));
                Ok(Flow::Normal)
            }
        }
    }

    /// Run statements in order, stopping at the first return.
    fn execute_block(&mut self, block: &BlockStmt) -> Result<Flow, RuntimeError> {
        for stmt in &block.statements {
            if let flow @ Flow::Return(_) = self.execute(stmt)? {
                return Ok(flow);
            }
        }
        Ok(Flow::Normal)
    }

    /// Evaluate an expression; calls may produce no value.
    fn evaluate(&mut self, expr: &Expr) -> Result<Option<Value>, RuntimeError> {
        match expr {
            Expr::Literal(l) => Ok(Some(match &l.value {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::String(s) => Value::Str(s.clone()),
            })),
            Expr::Variable(v) => self.environment.get(&v.name).map(Some).ok_or_else(|| {
                RuntimeError::with_span(format!("undefined name '{}'", v.name), v.span)
            }),
            Expr::Binary(b) => {
                // Left-associative chains nest down the left operand; walk
                // that spine with a loop so long chains don't recurse.
                let mut spine = vec![b];
                let mut leftmost = b.left.as_ref();
                while let Expr::Binary(inner) = leftmost {
                    spine.push(inner);
                    leftmost = inner.left.as_ref();
                }
                let mut acc = self.evaluate_value(leftmost)?;
                for node in spine.iter().rev() {
                    let right = self.evaluate_value(&node.right)?;
                    acc = arithmetic(node.operator, &acc, &right, node.span)?;
                }
                Ok(Some(acc))
            }
            Expr::Unary(u) => match (u.operator, self.evaluate_value(&u.operand)?) {
                (UnaryOp::Negate, Value::Number(n)) => Ok(Some(Value::Number(-n))),
                (UnaryOp::Negate, other) => Err(RuntimeError::with_span(
                    format!("operand must be a number, found {}", other.type_name()),
                    u.span,
                )),
            },
            Expr::Call(c) => {
                let callee = self.evaluate_value(&c.callee)?;
                let args = self.evaluate_arguments(&c.arguments)?;
                let name = match c.callee.as_ref() {
                    Expr::Variable(v) => v.name.as_str(),
                    _ => "expression",
                };
                self.call_value(name, callee, args, c.span)
            }
        }
    }

    /// Evaluate an expression whose result must be a value.
    fn evaluate_value(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        self.evaluate(expr)?.ok_or_else(|| {
            RuntimeError::with_span("expression produced no value", expr.span())
        })
    }

    fn evaluate_arguments(&mut self, arguments: &[Expr]) -> Result<Vec<Value>, RuntimeError> {
        arguments.iter().map(|arg| self.evaluate_value(arg)).collect()
    }

    fn condition(&mut self, expr: &Expr) -> Result<bool, RuntimeError> {
        let value = self.evaluate_value(expr)?;
        value.is_truthy().ok_or_else(|| {
            RuntimeError::with_span(
                format!("condition must be a number, found {}", value.type_name()),
                expr.span(),
            )
        })
    }

    fn call_value(
        &mut self,
        name: &str,
        callee: Value,
        args: Vec<Value>,
        call_site_span: Span,
    ) -> Result<Option<Value>, RuntimeError> {
        let func = match callee {
            Value::Function(func) => func,
            other => {
                return Err(RuntimeError::with_span(
                    format!("'{name}' is not callable ({})", other.type_name()),
                    call_site_span,
                ));
            }
        };

        if let Some(arity) = func.arity()
            && args.len() != arity
        {
            return Err(RuntimeError::with_span(
                format!("expected {arity} arguments but got {}", args.len()),
                call_site_span,
            ));
        }

        match func {
            Callable::Builtin(builtin) => self.call_builtin(builtin, &args),
            Callable::User(user_fn) => self.call_user(&user_fn, args, call_site_span),
        }
    }

    fn call_builtin(
        &mut self,
        builtin: Builtin,
        args: &[Value],
    ) -> Result<Option<Value>, RuntimeError> {
        match builtin {
            Builtin::Print => {
                let text = args
                    .iter()
                    .map(Value::to_string)
                    .collect::<Vec<_>>()
                    .join(" ");
                writeln!(self.writer, "{text}")
                    .map_err(|e| RuntimeError::new(format!("failed to write output: {e}")))?;
                self.output.push(text);
                Ok(None)
            }
        }
    }

    /// Environment-swap call: the body runs on the caller's environment with
    /// the parameters bound on top, and the caller's environment is put back
    /// afterwards, so nothing the body binds survives the call.
    fn call_user(
        &mut self,
        user_fn: &UserFunction,
        args: Vec<Value>,
        call_site_span: Span,
    ) -> Result<Option<Value>, RuntimeError> {
        let declaration = &user_fn.declaration;
        if self.depth >= MAX_CALL_DEPTH {
            return Err(RuntimeError::with_span(
                format!("maximum call depth of {MAX_CALL_DEPTH} exceeded"),
                call_site_span,
            ));
        }
        tracing::trace!(function = %declaration.name, args = args.len(), "call");

        let saved = self.environment.clone();
        for (param, arg) in declaration.params.iter().zip(args) {
            self.environment.define(param, arg);
        }

        self.depth += 1;
        let result = self.execute(&declaration.body);
        self.depth -= 1;
        self.environment = saved;
        tracing::trace!(function = %declaration.name, "environment restored");

        match result? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(None),
        }
    }
}

fn arithmetic(op: BinaryOp, left: &Value, right: &Value, span: Span) -> Result<Value, RuntimeError> {
    let (Value::Number(a), Value::Number(b)) = (left, right) else {
        return Err(RuntimeError::with_span(
            format!(
                "operands must be numbers, found {} {op} {}",
                left.type_name(),
                right.type_name()
            ),
            span,
        ));
    };
    let (a, b) = (*a, *b);
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Subtract => a - b,
        BinaryOp::Multiply => a * b,
        BinaryOp::Divide => {
            if b == 0.0 {
                return Err(RuntimeError::with_span("division by zero", span));
            }
            (a / b).floor()
        }
        BinaryOp::Modulo => {
            if b == 0.0 {
                return Err(RuntimeError::with_span("modulo by zero", span));
            }
            // Result takes the sign of the divisor.
            let r = a % b;
            if r != 0.0 && (r < 0.0) != (b < 0.0) { r + b } else { r }
        }
    };
    Ok(Value::Number(result))
}
