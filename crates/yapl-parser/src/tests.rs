#[cfg(test)]
mod tests {
    use crate::Parser;
    use yapl_ast::*;
    use yapl_diags::{DiagnosticKind, Diagnostics, Location, Span};

    fn parse(input: &str) -> (Program, Diagnostics, usize) {
        let mut diagnostics = Diagnostics::new();
        let mut parser = Parser::new(input);
        let program = parser.parse(&mut diagnostics);
        (program, diagnostics, parser.number_of_syntax_errors())
    }

    fn parse_ok(input: &str) -> Program {
        let (program, diagnostics, errors) = parse(input);
        assert_eq!(errors, 0, "unexpected syntax errors: {:?}", diagnostics);
        program
    }

    fn class(program: &Program, index: usize) -> &ClassDecl {
        match &program.items[index] {
            Item::Class(class) => class,
            other => panic!("Expected class, got {:?}", other),
        }
    }

    fn attribute_init(feature: &Feature) -> &Expression {
        match feature {
            Feature::Attribute(Attribute { init: Some(init), .. }) => init,
            other => panic!("Expected initialized attribute, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_class_with_features() {
        let program = parse_ok(r#"
            class Main inherits IO {
                x : Int;
                name : String <- "yapl";
                add(a : Int, b : Int) : Int { a + b };
            };
        "#);

        assert_eq!(program.items.len(), 1);
        let main = class(&program, 0);
        assert_eq!(main.name.name, "Main");
        assert_eq!(main.parent.as_ref().map(|p| p.name.as_str()), Some("IO"));
        assert_eq!(main.features.len(), 3);

        let (name, ty) = main.features[0].declaration().unwrap();
        assert_eq!((name.name.as_str(), ty.name.as_str()), ("x", "Int"));

        match &main.features[2] {
            Feature::Method(method) => {
                assert_eq!(method.name.name, "add");
                assert_eq!(method.formals.len(), 2);
                assert_eq!(method.return_type.name, "Int");
                assert!(matches!(method.body, Expression::Binary { op: BinaryOp::Add, .. }));
            }
            other => panic!("Expected method, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_top_level_feature() {
        let program = parse_ok("y : Boolean <- not true;");

        match &program.items[0] {
            Item::Feature(feature) => {
                assert!(matches!(attribute_init(feature), Expression::Not { .. }));
            }
            other => panic!("Expected feature, got {:?}", other),
        }
    }

    #[test]
    fn test_assignment_chain_nests_to_the_right() {
        let program = parse_ok("class A { f() : Int { a <- b := 3 }; };");

        let body = match &class(&program, 0).features[0] {
            Feature::Method(method) => &method.body,
            other => panic!("Expected method, got {:?}", other),
        };

        let (outer, inner) = match body {
            Expression::Assignment { target, value, .. } => (target, value.as_ref()),
            other => panic!("Expected assignment, got {:?}", other),
        };
        assert_eq!(outer.name, "a");

        match inner {
            Expression::Assignment { target, value, span } => {
                assert_eq!(target.name, "b");
                assert!(matches!(**value, Expression::Literal(Literal::Integer(3, _))));
                assert_eq!(*span, Span::new(27, 33));
            }
            other => panic!("Expected nested assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_precedence() {
        let program = parse_ok("x : Boolean <- not 1 + 2 * 3 < 4;");
        let init = match &program.items[0] {
            Item::Feature(feature) => attribute_init(feature),
            other => panic!("Expected feature, got {:?}", other),
        };

        // not ((1 + (2 * 3)) < 4)
        let Expression::Not { operand, .. } = init else { panic!("Expected not") };
        let Expression::Binary { left, op: BinaryOp::Less, .. } = &**operand else {
            panic!("Expected comparison")
        };
        let Expression::Binary { right, op: BinaryOp::Add, .. } = &**left else {
            panic!("Expected addition")
        };
        assert!(matches!(**right, Expression::Binary { op: BinaryOp::Multiply, .. }));
    }

    #[test]
    fn test_parse_compound_expressions() {
        let program = parse_ok(r#"
            class A {
                run() : Object {
                    {
                        if x < 1 then x else ~x fi;
                        while isvoid o loop o <- new A pool;
                        let i : Int <- 0, s : String in s.concat("a");
                        self@A.run();
                        (x);
                    }
                };
            };
        "#);

        let Feature::Method(method) = &class(&program, 0).features[0] else {
            panic!("Expected method")
        };
        let Expression::Block { body, .. } = &method.body else { panic!("Expected block") };

        assert_eq!(body.len(), 5);
        assert!(matches!(body[0], Expression::If { .. }));
        assert!(matches!(body[1], Expression::While { .. }));
        match &body[2] {
            Expression::Let { bindings, body, .. } => {
                assert_eq!(bindings.len(), 2);
                assert!(bindings[0].init.is_some());
                assert!(bindings[1].init.is_none());
                assert!(matches!(**body, Expression::Dispatch { receiver: Some(_), .. }));
            }
            other => panic!("Expected let, got {:?}", other),
        }
        match &body[3] {
            Expression::Dispatch { static_type, method, .. } => {
                assert_eq!(static_type.as_ref().map(|t| t.name.as_str()), Some("A"));
                assert_eq!(method.name, "run");
            }
            other => panic!("Expected dispatch, got {:?}", other),
        }
        assert!(matches!(body[4], Expression::Paren { .. }));
    }

    #[test]
    fn test_missing_semicolon_is_reported_with_location() {
        let (_, diagnostics, errors) = parse("class A {\n  x : Int\n};");

        assert_eq!(errors, 1);
        let diag = diagnostics.iter().next().unwrap();
        assert_eq!(diag.kind, DiagnosticKind::SyntaxError);
        assert_eq!(diag.location, Some(Location::new(3, 0)));
        assert_eq!(diag.message, "expected ';' after feature, found '}'");
    }

    #[test]
    fn test_bad_feature_becomes_error_node() {
        let (program, _, errors) = parse(r#"
            class A {
                x : Int <- ;
                y : String;
            };
        "#);

        assert_eq!(errors, 1);
        let a = class(&program, 0);
        assert_eq!(a.features.len(), 2);
        assert!(matches!(a.features[0], Feature::Error(_)));
        assert!(matches!(a.features[1], Feature::Attribute(_)));
    }

    #[test]
    fn test_block_recovers_per_expression() {
        let (program, _, errors) = parse("class A { f() : Int { { 1 + ; 2; } }; };");

        assert_eq!(errors, 1);
        let Feature::Method(method) = &class(&program, 0).features[0] else {
            panic!("Expected method")
        };
        let Expression::Block { body, .. } = &method.body else { panic!("Expected block") };
        assert_eq!(body.len(), 2);
        match &body[0] {
            Expression::Error(node) => assert_eq!(node.text, "1 + ;"),
            other => panic!("Expected error node, got {:?}", other),
        }
        assert!(matches!(body[1], Expression::Literal(Literal::Integer(2, _))));
    }

    #[test]
    fn test_lexical_errors_count_as_syntax_errors() {
        let (program, diagnostics, errors) = parse("x : Int <- 1 # 2;");

        assert!(errors >= 1);
        insta::assert_snapshot!(
            diagnostics.iter().next().unwrap().to_string(),
            @"syntax error at line 1, column 13: token recognition error at: '#'"
        );
        assert!(!program.items.is_empty());
    }

    #[test]
    fn test_syntax_errors_are_reported_in_source_order() {
        let (_, diagnostics, errors) = parse("class A {\n  x : Int\n};\ny : Int <- 1 # 2;");

        assert!(errors >= 2);
        let reported: Vec<_> = diagnostics.iter().map(|d| (d.location, d.message.as_str())).collect();
        assert_eq!(reported[0], (Some(Location::new(3, 0)), "expected ';' after feature, found '}'"));
        assert_eq!(reported[1], (Some(Location::new(4, 13)), "token recognition error at: '#'"));
    }

    #[test]
    fn test_comparison_does_not_chain() {
        let (_, diagnostics, errors) = parse("x : Boolean <- 1 < 2 < 3;");
        assert!(errors > 0);
        assert_eq!(
            diagnostics.iter().next().unwrap().message,
            "expected ';' after declaration, found '<'"
        );
    }

    #[test]
    fn test_empty_program() {
        let program = parse_ok("   -- nothing here\n");
        assert!(program.items.is_empty());
    }
}
