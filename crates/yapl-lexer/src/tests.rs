#[cfg(test)]
mod tests {
    use crate::{Lexer, Location, Span, Token};

    fn tokenize(input: &str) -> Vec<Token> {
        let lexer = Lexer::new(input);
        lexer.tokenize()
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn test_keywords() {
        let input = "class inherits if then else fi while loop pool let in new isvoid not true false";
        let tokens = tokenize(input);

        assert_eq!(tokens, vec![
            Token::Class,
            Token::Inherits,
            Token::If,
            Token::Then,
            Token::Else,
            Token::Fi,
            Token::While,
            Token::Loop,
            Token::Pool,
            Token::Let,
            Token::In,
            Token::New,
            Token::IsVoid,
            Token::Not,
            Token::True,
            Token::False,
            Token::Eof,
        ]);
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        let tokens = tokenize("CLASS Inherits NoT tRUE True");

        assert_eq!(tokens, vec![
            Token::Class,
            Token::Inherits,
            Token::Not,
            Token::True,
            Token::TypeId("True".to_string()),
            Token::Eof,
        ]);
    }

    #[test]
    fn test_identifiers_split_by_case() {
        let tokens = tokenize("Main counter_1 String x");

        assert_eq!(tokens, vec![
            Token::TypeId("Main".to_string()),
            Token::ObjectId("counter_1".to_string()),
            Token::TypeId("String".to_string()),
            Token::ObjectId("x".to_string()),
            Token::Eof,
        ]);
    }

    #[test]
    fn test_operators() {
        let tokens = tokenize("+ - * / ~ < <= = <- := : ; , . @ ( ) { }");

        assert_eq!(tokens, vec![
            Token::Plus,
            Token::Minus,
            Token::Star,
            Token::Slash,
            Token::Tilde,
            Token::Less,
            Token::LessEq,
            Token::Eq,
            Token::Assign,
            Token::Assign,
            Token::Colon,
            Token::Semicolon,
            Token::Comma,
            Token::Dot,
            Token::At,
            Token::LeftParen,
            Token::RightParen,
            Token::LeftBrace,
            Token::RightBrace,
            Token::Eof,
        ]);
    }

    #[test]
    fn test_numbers_and_strings() {
        let tokens = tokenize(r#"42 0 "hello" "tab\there""#);

        assert_eq!(tokens, vec![
            Token::IntLiteral(42),
            Token::IntLiteral(0),
            Token::StringLiteral("hello".to_string()),
            Token::StringLiteral("tab\there".to_string()),
            Token::Eof,
        ]);
    }

    #[test]
    fn test_comments_are_skipped() {
        let input = "x -- trailing comment\n(* block (* nested *) still *) y";
        let tokens = tokenize(input);

        assert_eq!(tokens, vec![
            Token::ObjectId("x".to_string()),
            Token::ObjectId("y".to_string()),
            Token::Eof,
        ]);
    }

    #[test]
    fn test_unknown_character_becomes_error_token() {
        let tokens = tokenize("x # y");

        assert_eq!(tokens, vec![
            Token::ObjectId("x".to_string()),
            Token::Error("token recognition error at: '#'".to_string()),
            Token::ObjectId("y".to_string()),
            Token::Eof,
        ]);
    }

    #[test]
    fn test_unterminated_string() {
        let tokens = tokenize("\"abc\nx");

        assert_eq!(tokens, vec![
            Token::Error("unterminated string constant".to_string()),
            Token::ObjectId("x".to_string()),
            Token::Eof,
        ]);
    }

    #[test]
    fn test_unclosed_comment() {
        let tokens = tokenize("x (* never closed");

        assert_eq!(tokens, vec![
            Token::ObjectId("x".to_string()),
            Token::Error("EOF in comment".to_string()),
            Token::Eof,
        ]);
    }

    #[test]
    fn test_integer_overflow_is_an_error_token() {
        let tokens = tokenize("99999999999999999999");
        assert!(matches!(&tokens[0], Token::Error(msg) if msg.contains("out of range")));
    }

    #[test]
    fn test_spans_and_locations() {
        let tokens = Lexer::new("class A {\n  x : Int;\n};").tokenize();

        assert_eq!(tokens[0].span, Span::new(0, 5));
        assert_eq!(tokens[0].location, Location::new(1, 0));

        // `x` on the second line
        assert_eq!(tokens[3].token, Token::ObjectId("x".to_string()));
        assert_eq!(tokens[3].span, Span::new(12, 13));
        assert_eq!(tokens[3].location, Location::new(2, 2));

        // `Int`
        assert_eq!(tokens[5].location, Location::new(2, 6));
    }
}
