#[cfg(test)]
mod tests;

use yapl_ast::*;
use yapl_diags::{Diagnostic, DiagnosticSink};
use yapl_lexer::{Lexer, Location, Span, Token, TokenWithSpan};

struct SyntaxError {
    message: String,
    location: Location,
    span: Span,
}

type ParseResult<T> = Result<T, SyntaxError>;

/// Recursive-descent parser for YAPL.
///
/// Syntax errors never abort the parse: each one is reported to the sink, the
/// parser skips ahead to a synchronization point and leaves an error node in the
/// tree. `number_of_syntax_errors` tells callers whether the tree can be trusted.
pub struct Parser {
    tokens: Vec<TokenWithSpan>,
    lexical_errors: Vec<TokenWithSpan>,
    pending: Vec<SyntaxError>,
    current: usize,
    syntax_errors: usize,
}

impl Parser {
    pub fn new(input: &str) -> Self {
        let (lexical_errors, tokens): (Vec<_>, Vec<_>) = Lexer::new(input)
            .tokenize()
            .into_iter()
            .partition(|t| matches!(t.token, Token::Error(_)));

        Self {
            tokens,
            lexical_errors,
            pending: Vec::new(),
            current: 0,
            syntax_errors: 0,
        }
    }

    pub fn number_of_syntax_errors(&self) -> usize {
        self.syntax_errors
    }

    pub fn parse(&mut self, sink: &mut dyn DiagnosticSink) -> Program {
        for error in std::mem::take(&mut self.lexical_errors) {
            self.record(SyntaxError {
                message: error.token.to_string(),
                location: error.location,
                span: error.span,
            });
        }

        let mut items = Vec::new();

        while !self.is_at_end() {
            let start = self.current;
            let result = if self.check(&Token::Class) {
                self.parse_class().map(Item::Class)
            } else {
                self.parse_feature().map(Item::Feature)
            };

            match result {
                Ok(item) => {
                    items.push(item);
                    if let Err(err) = self.consume(Token::Semicolon, "expected ';' after declaration") {
                        self.record(err);
                    }
                }
                Err(err) => {
                    self.record(err);
                    self.synchronize(false);
                    self.ensure_progress(start);
                    items.push(Item::Error(self.error_node(start)));
                }
            }
        }

        // Lexical errors were queued first; report everything in source order.
        let mut pending = std::mem::take(&mut self.pending);
        pending.sort_by_key(|err| err.span.start);
        for err in pending {
            sink.emit(Diagnostic::syntax_error(err.message, err.location, err.span));
        }

        let end = self.current_span().end;
        log::debug!(
            "parsed {} top-level item(s) with {} syntax error(s)",
            items.len(),
            self.syntax_errors
        );

        Program {
            items,
            span: Span::new(0, end),
        }
    }

    fn record(&mut self, err: SyntaxError) {
        log::debug!("syntax error at {}:{}: {}", err.location.line, err.location.column, err.message);
        self.syntax_errors += 1;
        self.pending.push(err);
    }

    fn parse_class(&mut self) -> ParseResult<ClassDecl> {
        let start = self.current_span();
        self.consume(Token::Class, "expected 'class'")?;

        let name = self.consume_type_id("expected class name")?;

        let parent = if self.match_token(&Token::Inherits) {
            Some(self.consume_type_id("expected parent class name after 'inherits'")?)
        } else {
            None
        };

        self.consume(Token::LeftBrace, "expected '{' after class header")?;

        // Feature-level errors are recovered here so one bad feature does not
        // take the whole class with it.
        let mut features = Vec::new();

        while !self.check(&Token::RightBrace) && !self.is_at_end() {
            let feature_start = self.current;
            match self.parse_feature() {
                Ok(feature) => {
                    features.push(feature);
                    if let Err(err) = self.consume(Token::Semicolon, "expected ';' after feature") {
                        self.record(err);
                        self.synchronize(true);
                    }
                }
                Err(err) => {
                    self.record(err);
                    self.synchronize(true);
                    self.ensure_progress(feature_start);
                    features.push(Feature::Error(self.error_node(feature_start)));
                }
            }
        }

        self.consume(Token::RightBrace, "expected '}' to close class body")?;

        Ok(ClassDecl {
            name,
            parent,
            features,
            span: start.to(self.previous_span()),
        })
    }

    fn parse_feature(&mut self) -> ParseResult<Feature> {
        let name = self.consume_object_id("expected attribute or method name")?;

        if self.match_token(&Token::LeftParen) {
            let formals = self.parse_formals()?;
            self.consume(Token::RightParen, "expected ')' after formal parameters")?;
            self.consume(Token::Colon, "expected ':' before method return type")?;
            let return_type = self.consume_type_id("expected method return type")?;
            self.consume(Token::LeftBrace, "expected '{' before method body")?;
            let body = self.parse_expression()?;
            self.consume(Token::RightBrace, "expected '}' after method body")?;

            let span = name.span.to(self.previous_span());
            return Ok(Feature::Method(Method {
                name,
                formals,
                return_type,
                body,
                span,
            }));
        }

        self.consume(Token::Colon, "expected ':' after attribute name")?;
        let ty = self.consume_type_id("expected attribute type")?;

        let init = if self.match_token(&Token::Assign) {
            Some(self.parse_expression()?)
        } else {
            None
        };

        let span = name.span.to(self.previous_span());
        Ok(Feature::Attribute(Attribute { name, ty, init, span }))
    }

    fn parse_formals(&mut self) -> ParseResult<Vec<Formal>> {
        let mut formals = Vec::new();

        if !self.check(&Token::RightParen) {
            loop {
                let name = self.consume_object_id("expected parameter name")?;
                self.consume(Token::Colon, "expected ':' after parameter name")?;
                let ty = self.consume_type_id("expected parameter type")?;
                let span = name.span.to(ty.span);
                formals.push(Formal { name, ty, span });

                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
        }

        Ok(formals)
    }

    fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.parse_assignment()
    }

    // Assignment is right-associative, so chains nest to the right.
    fn parse_assignment(&mut self) -> ParseResult<Expression> {
        if !(matches!(self.peek().token, Token::ObjectId(_))
            && matches!(self.peek_next(), Some(Token::Assign)))
        {
            return self.parse_not();
        }

        let target = self.consume_object_id("expected assignment target")?;
        self.advance();

        let value = self.parse_assignment()?;
        let span = target.span.to(value.span());
        Ok(Expression::Assignment {
            target,
            value: Box::new(value),
            span,
        })
    }

    fn parse_not(&mut self) -> ParseResult<Expression> {
        if self.match_token(&Token::Not) {
            let start = self.previous_span();
            let operand = self.parse_not()?;
            let span = start.to(operand.span());
            return Ok(Expression::Not {
                operand: Box::new(operand),
                span,
            });
        }

        self.parse_comparison()
    }

    // Comparisons do not chain: `a < b < c` is a syntax error.
    fn parse_comparison(&mut self) -> ParseResult<Expression> {
        let left = self.parse_additive()?;

        if let Some(op) = self.match_tokens(&[Token::LessEq, Token::Less, Token::Eq]) {
            let op = match op {
                Token::Less => BinaryOp::Less,
                Token::LessEq => BinaryOp::LessEqual,
                Token::Eq => BinaryOp::Equal,
                _ => unreachable!(),
            };
            let right = self.parse_additive()?;
            let span = left.span().to(right.span());
            return Ok(Expression::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
                span,
            });
        }

        Ok(left)
    }

    fn parse_additive(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_multiplicative()?;

        while let Some(op) = self.match_tokens(&[Token::Plus, Token::Minus]) {
            let op = match op {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Subtract,
                _ => unreachable!(),
            };
            let right = self.parse_multiplicative()?;
            let span = expr.span().to(right.span());
            expr = Expression::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
                span,
            };
        }

        Ok(expr)
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_unary()?;

        while let Some(op) = self.match_tokens(&[Token::Star, Token::Slash]) {
            let op = match op {
                Token::Star => BinaryOp::Multiply,
                Token::Slash => BinaryOp::Divide,
                _ => unreachable!(),
            };
            let right = self.parse_unary()?;
            let span = expr.span().to(right.span());
            expr = Expression::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
                span,
            };
        }

        Ok(expr)
    }

    fn parse_unary(&mut self) -> ParseResult<Expression> {
        if let Some(op) = self.match_tokens(&[Token::IsVoid, Token::Tilde]) {
            let start = self.previous_span();
            let op = match op {
                Token::IsVoid => UnaryOp::IsVoid,
                Token::Tilde => UnaryOp::Complement,
                _ => unreachable!(),
            };
            let operand = self.parse_unary()?;
            let span = start.to(operand.span());
            return Ok(Expression::Unary {
                op,
                operand: Box::new(operand),
                span,
            });
        }

        self.parse_dispatch()
    }

    fn parse_dispatch(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_primary()?;

        loop {
            let static_type = if self.match_token(&Token::At) {
                Some(self.consume_type_id("expected type name after '@'")?)
            } else if self.check(&Token::Dot) {
                None
            } else {
                break;
            };

            self.consume(Token::Dot, "expected '.' in dispatch")?;
            let method = self.consume_object_id("expected method name after '.'")?;
            self.consume(Token::LeftParen, "expected '(' after method name")?;
            let args = self.parse_arguments()?;
            self.consume(Token::RightParen, "expected ')' after arguments")?;

            let span = expr.span().to(self.previous_span());
            expr = Expression::Dispatch {
                receiver: Some(Box::new(expr)),
                static_type,
                method,
                args,
                span,
            };
        }

        Ok(expr)
    }

    fn parse_arguments(&mut self) -> ParseResult<Vec<Expression>> {
        let mut args = Vec::new();

        if !self.check(&Token::RightParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
        }

        Ok(args)
    }

    fn parse_primary(&mut self) -> ParseResult<Expression> {
        if self.match_token(&Token::True) {
            return Ok(Expression::Literal(Literal::Bool(true, self.previous_span())));
        }

        if self.match_token(&Token::False) {
            return Ok(Expression::Literal(Literal::Bool(false, self.previous_span())));
        }

        if let Some(Token::IntLiteral(n)) = self.match_if(|t| matches!(t, Token::IntLiteral(_))) {
            return Ok(Expression::Literal(Literal::Integer(n, self.previous_span())));
        }

        if let Some(Token::StringLiteral(s)) = self.match_if(|t| matches!(t, Token::StringLiteral(_))) {
            return Ok(Expression::Literal(Literal::String(s, self.previous_span())));
        }

        if let Some(Token::ObjectId(name)) = self.match_if(|t| matches!(t, Token::ObjectId(_))) {
            let ident = Ident::new(name, self.previous_span());

            if self.match_token(&Token::LeftParen) {
                let args = self.parse_arguments()?;
                self.consume(Token::RightParen, "expected ')' after arguments")?;
                let span = ident.span.to(self.previous_span());
                return Ok(Expression::Dispatch {
                    receiver: None,
                    static_type: None,
                    method: ident,
                    args,
                    span,
                });
            }

            return Ok(Expression::Identifier(ident));
        }

        if self.match_token(&Token::LeftParen) {
            let start = self.previous_span();
            let inner = self.parse_expression()?;
            self.consume(Token::RightParen, "expected ')' after expression")?;
            return Ok(Expression::Paren {
                inner: Box::new(inner),
                span: start.to(self.previous_span()),
            });
        }

        if self.check(&Token::LeftBrace) {
            return self.parse_block();
        }

        if self.match_token(&Token::If) {
            let start = self.previous_span();
            let condition = self.parse_expression()?;
            self.consume(Token::Then, "expected 'then' after condition")?;
            let then_branch = self.parse_expression()?;
            self.consume(Token::Else, "expected 'else' branch")?;
            let else_branch = self.parse_expression()?;
            self.consume(Token::Fi, "expected 'fi' to close 'if'")?;
            return Ok(Expression::If {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
                span: start.to(self.previous_span()),
            });
        }

        if self.match_token(&Token::While) {
            let start = self.previous_span();
            let condition = self.parse_expression()?;
            self.consume(Token::Loop, "expected 'loop' after condition")?;
            let body = self.parse_expression()?;
            self.consume(Token::Pool, "expected 'pool' to close 'while'")?;
            return Ok(Expression::While {
                condition: Box::new(condition),
                body: Box::new(body),
                span: start.to(self.previous_span()),
            });
        }

        if self.match_token(&Token::Let) {
            return self.parse_let();
        }

        if self.match_token(&Token::New) {
            let start = self.previous_span();
            let ty = self.consume_type_id("expected type name after 'new'")?;
            let span = start.to(ty.span);
            return Ok(Expression::New { ty, span });
        }

        Err(self.error_at_current("expected expression"))
    }

    fn parse_block(&mut self) -> ParseResult<Expression> {
        let start = self.current_span();
        self.consume(Token::LeftBrace, "expected '{'")?;

        let mut body = Vec::new();

        loop {
            let expr_start = self.current;
            match self.parse_expression() {
                Ok(expr) => {
                    body.push(expr);
                    if let Err(err) = self.consume(Token::Semicolon, "expected ';' after expression in block") {
                        self.record(err);
                        self.synchronize(true);
                    }
                }
                Err(err) => {
                    self.record(err);
                    self.synchronize(true);
                    self.ensure_progress(expr_start);
                    body.push(Expression::Error(self.error_node(expr_start)));
                }
            }

            if self.check(&Token::RightBrace) || self.is_at_end() {
                break;
            }
        }

        self.consume(Token::RightBrace, "expected '}' to close block")?;

        Ok(Expression::Block {
            body,
            span: start.to(self.previous_span()),
        })
    }

    fn parse_let(&mut self) -> ParseResult<Expression> {
        let start = self.previous_span();
        let mut bindings = Vec::new();

        loop {
            let name = self.consume_object_id("expected identifier in 'let'")?;
            self.consume(Token::Colon, "expected ':' after let identifier")?;
            let ty = self.consume_type_id("expected type in 'let' binding")?;
            let init = if self.match_token(&Token::Assign) {
                Some(self.parse_expression()?)
            } else {
                None
            };
            let span = name.span.to(self.previous_span());
            bindings.push(LetBinding { name, ty, init, span });

            if !self.match_token(&Token::Comma) {
                break;
            }
        }

        self.consume(Token::In, "expected 'in' after let bindings")?;
        let body = self.parse_expression()?;
        let span = start.to(body.span());

        Ok(Expression::Let {
            bindings,
            body: Box::new(body),
            span,
        })
    }

    /// Skip to just past the next `;` at the current nesting depth. With
    /// `stop_at_close` the scan halts in front of an unmatched `}` so the
    /// enclosing class or block can close normally.
    fn synchronize(&mut self, stop_at_close: bool) {
        let mut depth = 0usize;

        while !self.is_at_end() {
            match self.peek().token {
                Token::Semicolon if depth == 0 => {
                    self.advance();
                    return;
                }
                Token::LeftBrace => depth += 1,
                Token::RightBrace if depth == 0 => {
                    if stop_at_close {
                        return;
                    }
                }
                Token::RightBrace => depth -= 1,
                Token::Class if depth == 0 && !stop_at_close => return,
                _ => {}
            }
            self.advance();
        }
    }

    fn ensure_progress(&mut self, start: usize) {
        if self.current == start && !self.is_at_end() && !self.check(&Token::RightBrace) {
            self.advance();
        }
    }

    fn error_node(&self, start: usize) -> ErrorNode {
        if start >= self.current {
            let span = self.tokens[start.min(self.tokens.len() - 1)].span;
            return ErrorNode { text: String::new(), span };
        }

        let consumed = &self.tokens[start..self.current];
        let text = consumed
            .iter()
            .map(|t| t.token.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        let span = consumed[0].span.to(consumed[consumed.len() - 1].span);

        ErrorNode { text, span }
    }

    // Helper methods

    fn peek_next(&self) -> Option<&Token> {
        self.tokens.get(self.current + 1).map(|t| &t.token)
    }

    fn match_token(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_tokens(&mut self, tokens: &[Token]) -> Option<Token> {
        for token in tokens {
            if self.check(token) {
                let matched = self.peek().token.clone();
                self.advance();
                return Some(matched);
            }
        }
        None
    }

    fn match_if<F>(&mut self, predicate: F) -> Option<Token>
    where
        F: Fn(&Token) -> bool,
    {
        if !self.is_at_end() && predicate(&self.peek().token) {
            let token = self.peek().token.clone();
            self.advance();
            Some(token)
        } else {
            None
        }
    }

    fn check(&self, token: &Token) -> bool {
        if self.is_at_end() {
            false
        } else {
            std::mem::discriminant(&self.peek().token) == std::mem::discriminant(token)
        }
    }

    fn advance(&mut self) -> &TokenWithSpan {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek().token, Token::Eof)
    }

    fn peek(&self) -> &TokenWithSpan {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &TokenWithSpan {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn current_span(&self) -> Span {
        self.peek().span
    }

    fn previous_span(&self) -> Span {
        self.previous().span
    }

    fn error_at_current(&self, message: &str) -> SyntaxError {
        let token = self.peek();
        SyntaxError {
            message: format!("{}, found '{}'", message, token.token),
            location: token.location,
            span: token.span,
        }
    }

    fn consume(&mut self, token: Token, message: &str) -> ParseResult<()> {
        if self.check(&token) {
            self.advance();
            Ok(())
        } else {
            Err(self.error_at_current(message))
        }
    }

    fn consume_object_id(&mut self, message: &str) -> ParseResult<Ident> {
        if let Token::ObjectId(name) = &self.peek().token {
            let ident = Ident::new(name.clone(), self.peek().span);
            self.advance();
            Ok(ident)
        } else {
            Err(self.error_at_current(message))
        }
    }

    fn consume_type_id(&mut self, message: &str) -> ParseResult<Ident> {
        if let Token::TypeId(name) = &self.peek().token {
            let ident = Ident::new(name.clone(), self.peek().span);
            self.advance();
            Ok(ident)
        } else {
            Err(self.error_at_current(message))
        }
    }
}
