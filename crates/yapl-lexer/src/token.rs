use std::fmt;
use yapl_diags::{Location, Span};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    Class,
    Inherits,
    If,
    Then,
    Else,
    Fi,
    While,
    Loop,
    Pool,
    Let,
    In,
    New,
    IsVoid,
    Not,
    True,
    False,

    // Identifiers and literals
    TypeId(String),
    ObjectId(String),
    IntLiteral(i64),
    StringLiteral(String),

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Tilde,
    Less,
    LessEq,
    Eq,
    Assign,

    // Punctuation
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Colon,
    Semicolon,
    Comma,
    Dot,
    At,

    // Special
    Error(String),
    Eof,
}

impl Token {
    /// Keywords are case-insensitive, except that `true` and `false` must start
    /// with a lowercase letter.
    pub fn keyword_from_str(s: &str) -> Option<Token> {
        let lower = s.to_ascii_lowercase();
        let starts_lower = s.starts_with(|c: char| c.is_ascii_lowercase());

        match lower.as_str() {
            "class" => Some(Token::Class),
            "inherits" => Some(Token::Inherits),
            "if" => Some(Token::If),
            "then" => Some(Token::Then),
            "else" => Some(Token::Else),
            "fi" => Some(Token::Fi),
            "while" => Some(Token::While),
            "loop" => Some(Token::Loop),
            "pool" => Some(Token::Pool),
            "let" => Some(Token::Let),
            "in" => Some(Token::In),
            "new" => Some(Token::New),
            "isvoid" => Some(Token::IsVoid),
            "not" => Some(Token::Not),
            "true" if starts_lower => Some(Token::True),
            "false" if starts_lower => Some(Token::False),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Class => write!(f, "class"),
            Token::Inherits => write!(f, "inherits"),
            Token::If => write!(f, "if"),
            Token::Then => write!(f, "then"),
            Token::Else => write!(f, "else"),
            Token::Fi => write!(f, "fi"),
            Token::While => write!(f, "while"),
            Token::Loop => write!(f, "loop"),
            Token::Pool => write!(f, "pool"),
            Token::Let => write!(f, "let"),
            Token::In => write!(f, "in"),
            Token::New => write!(f, "new"),
            Token::IsVoid => write!(f, "isvoid"),
            Token::Not => write!(f, "not"),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::TypeId(name) | Token::ObjectId(name) => write!(f, "{}", name),
            Token::IntLiteral(n) => write!(f, "{}", n),
            Token::StringLiteral(s) => write!(f, "{:?}", s),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Tilde => write!(f, "~"),
            Token::Less => write!(f, "<"),
            Token::LessEq => write!(f, "<="),
            Token::Eq => write!(f, "="),
            Token::Assign => write!(f, "<-"),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::LeftBrace => write!(f, "{{"),
            Token::RightBrace => write!(f, "}}"),
            Token::Colon => write!(f, ":"),
            Token::Semicolon => write!(f, ";"),
            Token::Comma => write!(f, ","),
            Token::Dot => write!(f, "."),
            Token::At => write!(f, "@"),
            Token::Error(message) => write!(f, "{}", message),
            Token::Eof => write!(f, "<EOF>"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TokenWithSpan {
    pub token: Token,
    pub span: Span,
    pub location: Location,
}
