#[cfg(test)]
mod parser_tests {
    use rox::ast::{Expr, Stmt};
    use rox::ast_printer::AstPrinter;
    use rox::error::LoxError;
    use rox::parser::Parser;
    use rox::scanner::Scanner;
    use rox::token::Token;

    fn parse(source: &str) -> Result<Vec<Stmt>, Vec<LoxError>> {
        let tokens: Vec<Token> = Scanner::new(source).map(|t| t.unwrap()).collect();
        Parser::new(tokens).parse()
    }

    fn assert_ast(source: &str, expected: &[&str]) {
        let statements = parse(source).unwrap_or_else(|errors| {
            panic!(
                "unexpected parse errors: {:?}",
                errors.iter().map(|e| e.to_string()).collect::<Vec<_>>()
            )
        });
        let printed: Vec<String> = statements.iter().map(AstPrinter::print_stmt).collect();

        assert_eq!(printed, expected);
    }

    fn parse_errors(source: &str) -> Vec<String> {
        match parse(source) {
            Ok(_) => panic!("expected parse errors for {:?}", source),
            Err(errors) => errors.iter().map(|e| e.to_string()).collect(),
        }
    }

    #[test]
    fn test_parser_01_precedence() {
        assert_ast(
            "1 + 2 * 3 - 4 / 2;",
            &["(; (- (+ 1.0 (* 2.0 3.0)) (/ 4.0 2.0)))"],
        );
        assert_ast(
            "!true == -1 < 2 or nil and false;",
            &["(; (or (== (! true) (< (- 1.0) 2.0)) (and nil false)))"],
        );
        assert_ast("(1 + 2) * 3.5;", &["(; (* (group (+ 1.0 2.0)) 3.5))"]);
    }

    #[test]
    fn test_parser_02_assignment_is_right_associative() {
        assert_ast("a = b = \"c\";", &["(; (= a (= b c)))"]);
        assert_ast("obj.field.inner = 1;", &["(; (= (. (. obj field) inner) 1.0))"]);
    }

    #[test]
    fn test_parser_03_calls_and_properties() {
        assert_ast(
            "f(1, g(2))(3).name;",
            &["(; (. (call (call f 1.0 (call g 2.0)) 3.0) name))"],
        );
        assert_ast("this.x;", &["(; (. this x))"]);
        assert_ast("super.speak();", &["(; (call (super speak)))"]);
    }

    #[test]
    fn test_parser_04_declarations() {
        assert_ast(
            "var a; var b = 1; fun add(x, y) { return x + y; } class B < A { m() { return; } }",
            &[
                "(var a)",
                "(var b 1.0)",
                "(fun add (x y) (return (+ x y)))",
                "(class B < A (fun m () (return)))",
            ],
        );
    }

    #[test]
    fn test_parser_05_control_flow() {
        assert_ast(
            "if (a) print 1; else { print 2; } while (true) break; execute \"lib.lox\";",
            &[
                "(if a (print 1.0) (block (print 2.0)))",
                "(while true (break))",
                "(execute lib.lox)",
            ],
        );
    }

    #[test]
    fn test_parser_06_for_is_desugared() {
        assert_ast(
            "for (var i = 0; i < 3; i = i + 1) print i;",
            &["(block (var i 0.0) (while (< i 3.0) (block (print i) (; (= i (+ i 1.0))))))"],
        );
        assert_ast("for (;;) break;", &["(while true (break))"]);
    }

    #[test]
    fn test_parser_07_resolvable_nodes_get_distinct_ids() {
        let statements = parse("a; a;").unwrap();

        let ids: Vec<_> = statements
            .iter()
            .map(|stmt| match stmt {
                Stmt::Expression(Expr::Variable { id, .. }) => *id,
                other => panic!("unexpected statement {:?}", other),
            })
            .collect();

        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn test_parser_08_missing_semicolon() {
        assert_eq!(
            parse_errors("print 1"),
            vec!["[line 1] Error at end: Expected ';' after value."]
        );
    }

    #[test]
    fn test_parser_09_invalid_assignment_target() {
        assert_eq!(
            parse_errors("1 + 2 = 3;"),
            vec!["[line 1] Error at '=': Invalid assignment target."]
        );
    }

    #[test]
    fn test_parser_10_recovers_and_reports_every_error() {
        let errors = parse_errors("var = 1;\nprint 2;\nprint );\nvar ok = 3;");

        assert_eq!(
            errors,
            vec![
                "[line 1] Error at '=': Expected variable name.",
                "[line 3] Error at ')': Expected expression.",
            ]
        );
    }

    #[test]
    fn test_parser_11_too_many_arguments_is_soft() {
        let errors = parse_errors("f(1, 2, 3, 4, 5, 6, 7, 8, 9);\nprint ;");

        assert_eq!(errors.len(), 2);
        assert!(errors[0].ends_with("Cannot have more than 8 arguments."));
        assert_eq!(errors[1], "[line 2] Error at ';': Expected expression.");
    }

    #[test]
    fn test_parser_12_too_many_parameters() {
        let errors = parse_errors("fun f(a, b, c, d, e, f, g, h, i) {}");

        assert_eq!(
            errors,
            vec!["[line 1] Error at 'i': Cannot have more than 8 parameters."]
        );
    }

    #[test]
    fn test_parser_13_expression_printer() {
        let statements = parse("-(1.5) * \"s\";").unwrap();

        match &statements[0] {
            Stmt::Expression(expr) => {
                assert_eq!(AstPrinter::print(expr), "(* (- (group 1.5)) s)")
            }
            other => panic!("unexpected statement {:?}", other),
        }
    }
}
