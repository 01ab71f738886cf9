use crate::language::{
    ast::{BinaryOp, Expr, Method},
    errors::{SyntaxError, SyntaxErrors},
    lexer::lex,
    span::Span,
    token::{Token, TokenKind},
};

/// Parses a full expression. The whole input must be consumed; trailing
/// tokens are a syntax error.
pub fn parse(source: &str) -> Result<Expr, SyntaxErrors> {
    if source.trim().is_empty() {
        let span = Span::new(0, source.len());
        return Err(SyntaxErrors::new(vec![SyntaxError::new(
            "Expression cannot be empty",
            span,
        )]));
    }

    let tokens = match lex(source) {
        Ok(tokens) => tokens,
        Err(errors) => {
            let errs = errors
                .into_iter()
                .map(|err| SyntaxError::new(err.message, err.span))
                .collect();
            return Err(SyntaxErrors::new(errs));
        }
    };
    Parser::new(tokens).parse()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn parse(mut self) -> Result<Expr, SyntaxErrors> {
        let result = self.parse_expression().and_then(|expr| {
            if self.is_eof() {
                Ok(expr)
            } else {
                let found = self.peek_kind().map(|k| k.describe());
                Err(self.error_here(&format!(
                    "Unexpected {} after expression",
                    found.unwrap_or_else(|| "token".to_string())
                )))
            }
        });
        result.map_err(|err| SyntaxErrors::new(vec![err]))
    }

    // Precedence, loosest first: ?: , or, and, comparisons, method calls.
    fn parse_expression(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_ternary()
    }

    fn parse_ternary(&mut self) -> Result<Expr, SyntaxError> {
        let condition = self.parse_or()?;
        if !self.matches(TokenKind::Question) {
            return Ok(condition);
        }
        let then_branch = self.parse_ternary()?;
        if !self.matches(TokenKind::Colon) {
            return Err(self
                .error_here("Ternary `?` has no matching `:`")
                .with_help("every `?` needs a `:` separating the two branches"));
        }
        let else_branch = self.parse_ternary()?;
        let span = condition.span().union(else_branch.span());
        Ok(Expr::Ternary {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
            span,
        })
    }

    fn parse_or(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_and()?;
        while self.matches(TokenKind::Or) {
            let right = self.parse_and()?;
            let span = left.span().union(right.span());
            left = Expr::Binary {
                op: BinaryOp::Or,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, SyntaxError> {
        let mut left = self.parse_comparison()?;
        while self.matches(TokenKind::And) {
            let right = self.parse_comparison()?;
            let span = left.span().union(right.span());
            left = Expr::Binary {
                op: BinaryOp::And,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, SyntaxError> {
        let left = self.parse_postfix()?;
        let op = match self.peek_kind() {
            Some(TokenKind::EqEq) => BinaryOp::Eq,
            Some(TokenKind::BangEq) => BinaryOp::NotEq,
            Some(TokenKind::Lt) => BinaryOp::Lt,
            Some(TokenKind::LtEq) => BinaryOp::LtEq,
            Some(TokenKind::Gt) => BinaryOp::Gt,
            Some(TokenKind::GtEq) => BinaryOp::GtEq,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_postfix()?;
        let span = left.span().union(right.span());
        Ok(Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
            span,
        })
    }

    fn parse_postfix(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.parse_primary()?;
        while self.matches(TokenKind::Dot) {
            let (name, name_span) = self.expect_identifier("Expected method name after '.'")?;
            let Some(method) = Method::from_name(&name) else {
                return Err(SyntaxError::new(
                    format!("Unknown method `{}`", name),
                    name_span,
                )
                .with_help("supported methods are length(), equals(), concat() and substring()"));
            };
            self.expect(TokenKind::LParen)?;
            let mut args = Vec::new();
            if !self.check(TokenKind::RParen) {
                loop {
                    args.push(self.parse_expression()?);
                    if self.matches(TokenKind::Comma) {
                        continue;
                    }
                    break;
                }
            }
            let end = self.expect(TokenKind::RParen)?.span.end;
            if args.len() != method.arity() {
                return Err(SyntaxError::new(
                    format!(
                        "`{}` takes {} argument{} but received {}",
                        method.name(),
                        method.arity(),
                        if method.arity() == 1 { "" } else { "s" },
                        args.len()
                    ),
                    Span::new(name_span.start, end),
                ));
            }
            let span = Span::new(expr.span().start, end);
            expr = Expr::MethodCall {
                receiver: Box::new(expr),
                method,
                args,
                span,
            };
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        match self.peek_kind() {
            Some(TokenKind::Get) => self.parse_get_call(),
            Some(TokenKind::String(value)) => {
                let span = self.advance().span;
                Ok(Expr::Str(value, span))
            }
            Some(TokenKind::Integer(value)) => {
                let span = self.advance().span;
                Ok(Expr::Int(value, span))
            }
            Some(TokenKind::True) => {
                let span = self.advance().span;
                Ok(Expr::Bool(true, span))
            }
            Some(TokenKind::False) => {
                let span = self.advance().span;
                Ok(Expr::Bool(false, span))
            }
            Some(TokenKind::Null) => {
                let span = self.advance().span;
                Ok(Expr::Null(span))
            }
            Some(TokenKind::LParen) => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            _ => Err(self.error_here("Unexpected token in expression")),
        }
    }

    fn parse_get_call(&mut self) -> Result<Expr, SyntaxError> {
        let start = self.expect(TokenKind::Get)?.span.start;
        self.expect(TokenKind::LParen)?;
        let name = match self.peek_kind() {
            Some(TokenKind::String(name)) => {
                self.advance();
                name
            }
            _ => {
                return Err(self
                    .error_here("Expected quoted variable name in get()")
                    .with_help("write get('name') or get(\"name\")"));
            }
        };
        let end = self.expect(TokenKind::RParen)?.span.end;
        Ok(Expr::Get {
            name,
            span: Span::new(start, end),
        })
    }

    fn expect_identifier(&mut self, msg: &str) -> Result<(String, Span), SyntaxError> {
        match self.peek_kind() {
            Some(TokenKind::Identifier(name)) => {
                let span = self.advance().span;
                Ok((name, span))
            }
            _ => Err(self.error_here(msg)),
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<&Token, SyntaxError> {
        if self.check(kind.clone()) {
            Ok(self.advance())
        } else {
            Err(self.error_here(&format!("Expected {}", kind.describe())))
        }
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind.clone()) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        matches!(self.peek_kind(), Some(tk) if tk == kind)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.tokens.get(self.pos).map(|t| t.kind.clone())
    }

    fn advance(&mut self) -> &Token {
        let token = self
            .tokens
            .get(self.pos)
            .unwrap_or_else(|| self.tokens.last().expect("token stream always ends in Eof"));
        self.pos = (self.pos + 1).min(self.tokens.len());
        token
    }

    fn is_eof(&self) -> bool {
        matches!(self.peek_kind(), Some(TokenKind::Eof) | None)
    }

    fn error_here(&self, message: &str) -> SyntaxError {
        let span = self
            .tokens
            .get(self.pos)
            .map(|t| t.span)
            .unwrap_or_else(|| {
                self.tokens
                    .last()
                    .map(|t| t.span)
                    .unwrap_or_else(|| Span::new(0, 0))
            });
        SyntaxError::new(message.to_string(), span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::ast::collect_variables;

    fn parse_ok(source: &str) -> Expr {
        parse(source).expect("expression should parse")
    }

    fn first_error(source: &str) -> SyntaxError {
        let errs = parse(source).expect_err("expression should not parse");
        errs.errors.into_iter().next().expect("at least one error")
    }

    #[test]
    fn parses_get_with_either_quote_style() {
        assert!(matches!(parse_ok("get('a')"), Expr::Get { name, .. } if name == "a"));
        assert!(matches!(parse_ok("get(\"a\")"), Expr::Get { name, .. } if name == "a"));
    }

    #[test]
    fn method_chain_nests_left_to_right() {
        let expr = parse_ok("get('a').concat(' ').concat(get('b'))");
        let Expr::MethodCall {
            receiver, method, ..
        } = expr
        else {
            panic!("expected method call");
        };
        assert_eq!(method, Method::Concat);
        assert!(matches!(*receiver, Expr::MethodCall { .. }));
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let expr = parse_ok("true or false and false");
        let Expr::Binary {
            op: BinaryOp::Or,
            right,
            ..
        } = expr
        else {
            panic!("expected top-level or");
        };
        assert!(matches!(
            *right,
            Expr::Binary {
                op: BinaryOp::And,
                ..
            }
        ));
    }

    #[test]
    fn comparison_binds_tighter_than_and() {
        let expr = parse_ok("get('a') != null and get('b') != null");
        assert!(matches!(
            expr,
            Expr::Binary {
                op: BinaryOp::And,
                ..
            }
        ));
    }

    #[test]
    fn nested_ternary_associates_to_the_right() {
        let expr = parse_ok("get('x').equals('1') ? 'one' : get('x').equals('2') ? 'two' : 'other'");
        let Expr::Ternary { else_branch, .. } = expr else {
            panic!("expected ternary");
        };
        assert!(matches!(*else_branch, Expr::Ternary { .. }));
    }

    #[test]
    fn question_without_colon_is_a_hard_error() {
        let err = first_error("get('a') ? 'x'");
        assert!(err.message.contains("no matching `:`"));
    }

    #[test]
    fn unknown_method_is_rejected() {
        let err = first_error("get('a').upper()");
        assert!(err.message.contains("Unknown method"));
    }

    #[test]
    fn wrong_arity_is_rejected() {
        let err = first_error("get('a').substring(1)");
        assert!(err.message.contains("2 arguments"));
    }

    #[test]
    fn empty_expression_is_rejected() {
        let err = first_error("   ");
        assert!(err.message.contains("empty"));
    }

    #[test]
    fn trailing_tokens_are_rejected() {
        let err = first_error("get('a') get('b')");
        assert!(err.message.contains("after expression"));
    }

    #[test]
    fn variables_deduplicate_in_first_seen_order() {
        let expr = parse_ok("get('b').concat(get('a')).concat(get('b'))");
        assert_eq!(collect_variables(&expr), vec!["b", "a"]);
    }
}
