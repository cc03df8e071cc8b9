use crate::ast::*;
use crate::error::CompileError;
use crate::scanner::token::{Keyword, Literal, Span, Token, TokenKind};

/// Statements and parenthesized or argument expressions may nest this deep.
pub const MAX_NESTING_DEPTH: usize = 200;

/// Recursive-descent parser with one token of lookahead. After an error it
/// skips to the next statement boundary and keeps going, so one run reports
/// every syntax error it can find.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    depth: usize,
    errors: Vec<CompileError>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            current: 0,
            depth: 0,
            errors: Vec::new(),
        }
    }

    pub fn parse(mut self) -> Result<Program, Vec<CompileError>> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            match self.statement() {
                Ok(stmt) => {
                    statements.push(stmt);
                    self.match_token(TokenKind::Semicolon);
                }
                Err(e) => {
                    self.errors.push(e);
                    self.synchronize();
                }
            }
        }
        tracing::debug!(
            statements = statements.len(),
            errors = self.errors.len(),
            "parse finished"
        );
        if self.errors.is_empty() {
            let span = Span::new(0, self.current_span().offset);
            Ok(Program {
                body: BlockStmt { statements, span },
            })
        } else {
            Err(self.errors)
        }
    }

    fn statement(&mut self) -> Result<Stmt, CompileError> {
        self.nested(Self::statement_kind)
    }

    fn statement_kind(&mut self) -> Result<Stmt, CompileError> {
        match self.peek().kind {
            TokenKind::Keyword(Keyword::Begin) => self.block_statement(),
            TokenKind::Keyword(Keyword::Var) => self.var_statement(),
            TokenKind::Keyword(Keyword::If) => self.if_statement(),
            TokenKind::Keyword(Keyword::While) => self.while_statement(),
            TokenKind::Keyword(Keyword::Function) => self.function_declaration(),
            TokenKind::Keyword(Keyword::Return) => self.return_statement(),
            TokenKind::Keyword(Keyword::Print) => self.print_statement(),
            _ => self.expression_statement(),
        }
    }

    fn block_statement(&mut self) -> Result<Stmt, CompileError> {
        let start = self.current_span();
        self.advance(); // consume 'प्रारभ्य'
        let mut statements = Vec::new();
        while !self.check(TokenKind::Keyword(Keyword::End)) && !self.is_at_end() {
            statements.push(self.statement()?);
            self.match_token(TokenKind::Semicolon);
        }
        self.consume(
            TokenKind::Keyword(Keyword::End),
            "'समाप्य' to close block",
        )?;
        let span = self.span_from(start);
        Ok(Stmt::Block(BlockStmt { statements, span }))
    }

    fn var_statement(&mut self) -> Result<Stmt, CompileError> {
        let start = self.current_span();
        self.advance(); // consume 'चर'
        let name = self.expect_identifier("variable name")?;
        self.consume(TokenKind::Equal, "'=' after variable name")?;
        let value = self.expression()?;
        let span = self.span_from(start);
        Ok(Stmt::Var(VarStmt { name, value, span }))
    }

    fn if_statement(&mut self) -> Result<Stmt, CompileError> {
        let start = self.current_span();
        self.advance(); // consume 'यदि'
        let condition = self.expression()?;
        self.consume(TokenKind::Keyword(Keyword::Then), "'तदा' after condition")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.match_token(TokenKind::Keyword(Keyword::Else)) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        let span = self.span_from(start);
        Ok(Stmt::If(IfStmt {
            condition,
            then_branch,
            else_branch,
            span,
        }))
    }

    fn while_statement(&mut self) -> Result<Stmt, CompileError> {
        let start = self.current_span();
        self.advance(); // consume 'पर्यंतम्'
        let condition = self.expression()?;
        self.consume(
            TokenKind::Keyword(Keyword::Then),
            "'तदा' after loop condition",
        )?;
        let body = Box::new(self.statement()?);
        let span = self.span_from(start);
        Ok(Stmt::While(WhileStmt {
            condition,
            body,
            span,
        }))
    }

    fn function_declaration(&mut self) -> Result<Stmt, CompileError> {
        let start = self.current_span();
        self.advance(); // consume 'प्रत्याययतु'
        let name = self.expect_identifier("function name")?;

        self.consume(TokenKind::LeftParen, "'(' after function name")?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                params.push(self.expect_identifier("parameter name")?);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "')' after parameters")?;

        let body = Box::new(self.statement()?);
        let span = self.span_from(start);
        Ok(Stmt::Function(FunctionDecl {
            name,
            params,
            body,
            span,
        }))
    }

    fn return_statement(&mut self) -> Result<Stmt, CompileError> {
        let start = self.current_span();
        self.advance(); // consume 'प्रत्यावर्तयतु'
        let value = self.expression()?;
        let span = self.span_from(start);
        Ok(Stmt::Return(ReturnStmt { value, span }))
    }

    fn print_statement(&mut self) -> Result<Stmt, CompileError> {
        let start = self.current_span();
        self.advance(); // consume 'लिखतु'
        self.consume(TokenKind::LeftParen, "'(' after 'लिखतु'")?;
        let arguments = self.arguments()?;
        let span = self.span_from(start);
        Ok(Stmt::Print(PrintStmt { arguments, span }))
    }

    fn expression_statement(&mut self) -> Result<Stmt, CompileError> {
        let expression = self.expression()?;
        let span = expression.span();
        Ok(Stmt::Expression(ExprStmt { expression, span }))
    }

    /// Comma-separated expressions up to and including the closing `)`.
    fn arguments(&mut self) -> Result<Vec<Expr>, CompileError> {
        let mut arguments = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                arguments.push(self.expression()?);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "')' after arguments")?;
        Ok(arguments)
    }

    fn expression(&mut self) -> Result<Expr, CompileError> {
        self.nested(Self::sum)
    }

    // expr := term (("+" | "-") term)*
    fn sum(&mut self) -> Result<Expr, CompileError> {
        let mut expr = self.term()?;
        while let Some(op) = self.match_binary_op(&[TokenKind::Plus, TokenKind::Minus]) {
            let right = self.term()?;
            expr = binary(expr, op, right);
        }
        Ok(expr)
    }

    // term := factor (("*" | "/" | "%") factor)*
    fn term(&mut self) -> Result<Expr, CompileError> {
        let mut expr = self.factor()?;
        while let Some(op) =
            self.match_binary_op(&[TokenKind::Star, TokenKind::Slash, TokenKind::Percent])
        {
            let right = self.factor()?;
            expr = binary(expr, op, right);
        }
        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr, CompileError> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Int | TokenKind::Float => {
                self.advance();
                let value = match token.literal {
                    Some(Literal::Int(n)) => n as f64,
                    Some(Literal::Float(n)) => n,
                    _ => {
                        return Err(CompileError::parse(
                            format!("malformed number literal '{}'", token.lexeme),
                            token.span.offset,
                            token.span.len.max(1),
                        ));
                    }
                };
                Ok(Expr::Literal(LiteralExpr {
                    value: LiteralValue::Number(value),
                    span: token.span,
                }))
            }
            TokenKind::String => {
                self.advance();
                Ok(Expr::Literal(LiteralExpr {
                    value: LiteralValue::String(token.lexeme),
                    span: token.span,
                }))
            }
            TokenKind::Identifier => {
                self.advance();
                let callee = Expr::Variable(VariableExpr {
                    name: token.lexeme,
                    span: token.span,
                });
                if self.match_token(TokenKind::LeftParen) {
                    let arguments = self.arguments()?;
                    let span = self.span_from(token.span);
                    Ok(Expr::Call(CallExpr {
                        callee: Box::new(callee),
                        arguments,
                        span,
                    }))
                } else {
                    Ok(callee)
                }
            }
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.expression()?;
                self.consume(TokenKind::RightParen, "')' after expression")?;
                Ok(expr)
            }
            _ => Err(CompileError::parse(
                format!("expected expression, found {}", describe(&token)),
                token.span.offset,
                token.span.len.max(1),
            )),
        }
    }

    // --- Helper methods ---

    /// Run `rule` one nesting level deeper, failing once the source nests
    /// past [`MAX_NESTING_DEPTH`].
    fn nested<T>(
        &mut self,
        rule: impl FnOnce(&mut Self) -> Result<T, CompileError>,
    ) -> Result<T, CompileError> {
        if self.depth >= MAX_NESTING_DEPTH {
            let token = self.peek();
            return Err(CompileError::parse(
                format!("nesting deeper than {MAX_NESTING_DEPTH} levels"),
                token.span.offset,
                token.span.len.max(1),
            ));
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        &self.tokens[self.current - 1]
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_binary_op(&mut self, kinds: &[TokenKind]) -> Option<BinaryOp> {
        for &kind in kinds {
            if self.check(kind) {
                self.advance();
                return token_to_binary_op(kind);
            }
        }
        None
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> Result<&Token, CompileError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let token = self.peek();
            Err(CompileError::parse(
                format!("expected {message}, found {}", describe(token)),
                token.span.offset,
                token.span.len.max(1),
            ))
        }
    }

    fn expect_identifier(&mut self, context: &str) -> Result<String, CompileError> {
        if self.check(TokenKind::Identifier) {
            let token = self.advance().clone();
            Ok(token.lexeme)
        } else {
            let token = self.peek();
            Err(CompileError::parse(
                format!("expected {context}, found {}", describe(token)),
                token.span.offset,
                token.span.len.max(1),
            ))
        }
    }

    fn current_span(&self) -> Span {
        self.peek().span
    }

    fn previous_span(&self) -> Span {
        self.tokens[self.current.saturating_sub(1)].span
    }

    fn span_from(&self, start: Span) -> Span {
        start.to(self.previous_span())
    }

    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            let previous = self.tokens[self.current - 1].kind;
            if matches!(
                previous,
                TokenKind::Semicolon | TokenKind::Keyword(Keyword::End)
            ) {
                return;
            }
            if let TokenKind::Keyword(keyword) = self.peek().kind
                && keyword.starts_statement()
            {
                return;
            }
            self.advance();
        }
    }
}

fn binary(left: Expr, operator: BinaryOp, right: Expr) -> Expr {
    let span = left.span().to(right.span());
    Expr::Binary(BinaryExpr {
        left: Box::new(left),
        operator,
        right: Box::new(right),
        span,
    })
}

fn token_to_binary_op(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Plus => Some(BinaryOp::Add),
        TokenKind::Minus => Some(BinaryOp::Subtract),
        TokenKind::Star => Some(BinaryOp::Multiply),
        TokenKind::Slash => Some(BinaryOp::Divide),
        TokenKind::Percent => Some(BinaryOp::Modulo),
        _ => None,
    }
}

fn describe(token: &Token) -> String {
    match token.kind {
        TokenKind::Eof => "end of input".to_string(),
        _ => format!("'{}'", token.lexeme),
    }
}
