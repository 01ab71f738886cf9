use crate::language::span::Span;

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Identifier(String),
    Integer(i64),
    String(String),

    Get,
    And,
    Or,
    True,
    False,
    Null,

    EqEq,
    BangEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Question,
    Colon,
    Dot,
    Comma,

    LParen,
    RParen,

    Eof,
}

impl TokenKind {
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Identifier(name) => format!("identifier `{name}`"),
            TokenKind::Integer(value) => format!("integer `{value}`"),
            TokenKind::String(_) => "string literal".to_string(),
            TokenKind::Get => "`get`".to_string(),
            TokenKind::And => "`and`".to_string(),
            TokenKind::Or => "`or`".to_string(),
            TokenKind::True => "`true`".to_string(),
            TokenKind::False => "`false`".to_string(),
            TokenKind::Null => "`null`".to_string(),
            TokenKind::EqEq => "`==`".to_string(),
            TokenKind::BangEq => "`!=`".to_string(),
            TokenKind::Lt => "`<`".to_string(),
            TokenKind::LtEq => "`<=`".to_string(),
            TokenKind::Gt => "`>`".to_string(),
            TokenKind::GtEq => "`>=`".to_string(),
            TokenKind::Question => "`?`".to_string(),
            TokenKind::Colon => "`:`".to_string(),
            TokenKind::Dot => "`.`".to_string(),
            TokenKind::Comma => "`,`".to_string(),
            TokenKind::LParen => "`(`".to_string(),
            TokenKind::RParen => "`)`".to_string(),
            TokenKind::Eof => "end of expression".to_string(),
        }
    }
}
