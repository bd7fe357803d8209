mod token;
#[cfg(test)]
mod tests;

pub use token::{Token, TokenWithSpan};
pub use yapl_diags::{Location, Span};

/// Spans are character offsets into the source, which is what `ariadne` expects.
/// Lexical faults never abort: they become `Token::Error` and the parser reports them.
pub struct Lexer {
    input: Vec<char>,
    current: usize,
    line: usize,
    line_start: usize,
    tokens: Vec<TokenWithSpan>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            current: 0,
            line: 1,
            line_start: 0,
            tokens: Vec::new(),
        }
    }

    pub fn tokenize(mut self) -> Vec<TokenWithSpan> {
        loop {
            self.skip_whitespace();
            if self.is_at_end() {
                break;
            }

            let start = self.current;
            let location = self.location();

            match self.advance() {
                '+' => self.add_token(Token::Plus, start, location),
                '-' => {
                    if self.peek() == Some('-') {
                        self.skip_line_comment();
                    } else {
                        self.add_token(Token::Minus, start, location);
                    }
                }
                '*' => {
                    if self.peek() == Some(')') {
                        self.advance();
                        self.add_token(Token::Error("unmatched '*)'".to_string()), start, location);
                    } else {
                        self.add_token(Token::Star, start, location);
                    }
                }
                '/' => self.add_token(Token::Slash, start, location),
                '~' => self.add_token(Token::Tilde, start, location),
                '(' => {
                    if self.peek() == Some('*') {
                        self.advance();
                        self.skip_block_comment(start, location);
                    } else {
                        self.add_token(Token::LeftParen, start, location);
                    }
                }
                ')' => self.add_token(Token::RightParen, start, location),
                '{' => self.add_token(Token::LeftBrace, start, location),
                '}' => self.add_token(Token::RightBrace, start, location),
                ';' => self.add_token(Token::Semicolon, start, location),
                ',' => self.add_token(Token::Comma, start, location),
                '.' => self.add_token(Token::Dot, start, location),
                '@' => self.add_token(Token::At, start, location),
                '=' => self.add_token(Token::Eq, start, location),
                ':' => {
                    if self.peek() == Some('=') {
                        self.advance();
                        self.add_token(Token::Assign, start, location);
                    } else {
                        self.add_token(Token::Colon, start, location);
                    }
                }
                '<' => {
                    if self.peek() == Some('=') {
                        self.advance();
                        self.add_token(Token::LessEq, start, location);
                    } else if self.peek() == Some('-') {
                        self.advance();
                        self.add_token(Token::Assign, start, location);
                    } else {
                        self.add_token(Token::Less, start, location);
                    }
                }
                '"' => self.scan_string(start, location),
                c if c.is_ascii_digit() => self.scan_number(start, location),
                c if c.is_ascii_alphabetic() => self.scan_identifier(start, location),
                c => {
                    self.add_token(
                        Token::Error(format!("token recognition error at: '{}'", c)),
                        start,
                        location,
                    );
                }
            }
        }

        let location = self.location();
        self.add_token(Token::Eof, self.current, location);
        self.tokens
    }

    fn advance(&mut self) -> char {
        let c = self.input[self.current];
        self.current += 1;
        if c == '\n' {
            self.line += 1;
            self.line_start = self.current;
        }
        c
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.current).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.input.get(self.current + 1).copied()
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.input.len()
    }

    fn location(&self) -> Location {
        Location::new(self.line, self.current - self.line_start)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while self.peek() != Some('\n') && !self.is_at_end() {
            self.advance();
        }
    }

    // Block comments nest.
    fn skip_block_comment(&mut self, start: usize, location: Location) {
        let mut depth = 1;

        while depth > 0 {
            match (self.peek(), self.peek_next()) {
                (None, _) => {
                    self.add_token(Token::Error("EOF in comment".to_string()), start, location);
                    return;
                }
                (Some('('), Some('*')) => {
                    self.advance();
                    self.advance();
                    depth += 1;
                }
                (Some('*'), Some(')')) => {
                    self.advance();
                    self.advance();
                    depth -= 1;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn scan_string(&mut self, start: usize, location: Location) {
        let mut text = String::new();

        loop {
            match self.peek() {
                None => {
                    self.add_token(
                        Token::Error("EOF in string constant".to_string()),
                        start,
                        location,
                    );
                    return;
                }
                Some('\n') => {
                    self.add_token(
                        Token::Error("unterminated string constant".to_string()),
                        start,
                        location,
                    );
                    self.advance();
                    return;
                }
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    if let Some(escaped) = self.peek() {
                        self.advance();
                        text.push(match escaped {
                            'n' => '\n',
                            't' => '\t',
                            'b' => '\u{8}',
                            'f' => '\u{c}',
                            c => c,
                        });
                    }
                }
                Some(_) => {
                    text.push(self.advance());
                }
            }
        }

        self.add_token(Token::StringLiteral(text), start, location);
    }

    fn scan_number(&mut self, start: usize, location: Location) {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }

        let num_str: String = self.input[start..self.current].iter().collect();

        let token = match num_str.parse::<i64>() {
            Ok(value) => Token::IntLiteral(value),
            Err(_) => Token::Error(format!("integer literal '{}' is out of range", num_str)),
        };

        self.add_token(token, start, location);
    }

    fn scan_identifier(&mut self, start: usize, location: Location) {
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }

        let text: String = self.input[start..self.current].iter().collect();

        let token = Token::keyword_from_str(&text).unwrap_or_else(|| {
            if text.starts_with(|c: char| c.is_ascii_uppercase()) {
                Token::TypeId(text)
            } else {
                Token::ObjectId(text)
            }
        });

        self.add_token(token, start, location);
    }

    fn add_token(&mut self, token: Token, start: usize, location: Location) {
        let span = Span::new(start, self.current);
        self.tokens.push(TokenWithSpan { token, span, location });
    }
}
