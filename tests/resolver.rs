#[cfg(test)]
mod resolver_tests {
    use std::io;

    use rox::ast::{Expr, LiteralValue, Stmt};
    use rox::interpreter::Interpreter;
    use rox::parser::Parser;
    use rox::resolver::{Diagnostics, Resolver};
    use rox::scanner::Scanner;
    use rox::token::Token;

    fn resolve(source: &str) -> Diagnostics {
        let tokens = Scanner::new(source).map(|t| t.unwrap()).collect();
        let statements = Parser::new(tokens).parse().unwrap();
        let mut interpreter = Interpreter::with_output(Box::new(io::sink()));

        Resolver::new(&mut interpreter).resolve(&statements)
    }

    fn errors(source: &str) -> Vec<String> {
        resolve(source).errors.iter().map(|e| e.to_string()).collect()
    }

    fn warnings(source: &str) -> Vec<String> {
        resolve(source).warnings.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_resolver_01_clean_program() {
        let diagnostics = resolve(
            r#"
            class A { init(x) { this.x = x; } get() { return this.x; } }
            class B < A { get() { return super.get() + 1; } }
            fun outer() {
                var n = 0;
                fun inner() { n = n + 1; return n; }
                return inner;
            }
            while (true) { break; }
            "#,
        );

        assert!(!diagnostics.has_errors(), "{:?}", diagnostics.errors);
        assert!(diagnostics.warnings.is_empty(), "{:?}", diagnostics.warnings);
    }

    #[test]
    fn test_resolver_02_top_level_return() {
        assert_eq!(
            errors("return 1;"),
            vec!["[line 1] Error at 'return': Cannot return from top-level code."]
        );
    }

    #[test]
    fn test_resolver_03_initializer_return() {
        assert_eq!(
            errors("class A { init() { return 1; } }"),
            vec!["[line 1] Error at 'return': Cannot return a value from an initializer."]
        );
        assert!(errors("class A { init() { return; } }").is_empty());
    }

    #[test]
    fn test_resolver_04_this_and_super_outside_class() {
        assert_eq!(
            errors("print this;\nfun f() { return super.m; }"),
            vec![
                "[line 1] Error at 'this': Cannot use 'this' outside of a class.",
                "[line 2] Error at 'super': Cannot use 'super' outside of a class.",
            ]
        );
    }

    #[test]
    fn test_resolver_05_super_without_superclass() {
        assert_eq!(
            errors("class A { m() { return super.m(); } }"),
            vec!["[line 1] Error at 'super': Cannot use 'super' in a class with no superclass."]
        );
    }

    #[test]
    fn test_resolver_06_self_inheritance() {
        assert_eq!(
            errors("class A < A {}"),
            vec!["[line 1] Error at 'A': A class cannot inherit from itself."]
        );
    }

    #[test]
    fn test_resolver_06b_superclass_must_be_a_name() {
        // Only reachable from an AST built by hand.
        let statements = vec![Stmt::Class {
            name: Token::identifier("A", 3),
            superclass: Some(Expr::Literal(LiteralValue::Number(1.0))),
            methods: vec![],
        }];
        let mut interpreter = Interpreter::with_output(Box::new(io::sink()));
        let diagnostics = Resolver::new(&mut interpreter).resolve(&statements);

        let errors: Vec<String> = diagnostics.errors.iter().map(|e| e.to_string()).collect();
        assert_eq!(
            errors,
            vec!["[line 3] Error at 'A': Superclass must be a class name."]
        );
    }

    #[test]
    fn test_resolver_07_break_outside_loop() {
        assert_eq!(
            errors("break;"),
            vec!["[line 1] Error at 'break': Cannot break outside of loop."]
        );
        // A function body is not inside the loop that declares it.
        assert_eq!(
            errors("while (true) { fun f() { break; } f(); }"),
            vec!["[line 1] Error at 'break': Cannot break outside of loop."]
        );
        assert!(errors("while (true) { if (true) { break; } }").is_empty());
    }

    #[test]
    fn test_resolver_08_redeclaration() {
        assert!(errors("var a = 1; var a = 2;").is_empty());
        assert_eq!(
            errors("{ var a = 1; var a = 2; print a; }"),
            vec!["[line 1] Error at 'a': Variable with this name already declared in this scope."]
        );
        assert_eq!(
            errors("fun f(a, a) { print a; }"),
            vec!["[line 1] Error at 'a': Variable with this name already declared in this scope."]
        );
    }

    #[test]
    fn test_resolver_09_own_initializer() {
        assert_eq!(
            errors("var a = 1; { var a = a; print a; }"),
            vec!["[line 1] Error at 'a': Cannot read local variable in its own initializer."]
        );
        assert!(errors("var a = a;").is_empty());
    }

    #[test]
    fn test_resolver_10_all_errors_are_collected() {
        assert_eq!(errors("return;\nbreak;\nprint this;").len(), 3);
    }

    #[test]
    fn test_resolver_11_unused_locals_warn_in_line_order() {
        assert_eq!(
            warnings("{\n  var b = 1;\n  var a = 2;\n  var used = 3;\n  print used;\n}"),
            vec![
                "[line 2] Warning: Variable 'b' declared but never used.",
                "[line 3] Warning: Variable 'a' declared but never used.",
            ]
        );
    }

    #[test]
    fn test_resolver_11b_nested_scope_warnings_follow_source_order() {
        assert_eq!(
            warnings("{\n  var a = 1;\n  {\n    var b = 2;\n  }\n  fun f(c) {}\n}"),
            vec![
                "[line 2] Warning: Variable 'a' declared but never used.",
                "[line 4] Warning: Variable 'b' declared but never used.",
                "[line 6] Warning: Variable 'c' declared but never used.",
                "[line 6] Warning: Variable 'f' declared but never used.",
            ]
        );
    }

    #[test]
    fn test_resolver_12_unused_parameters_and_assignment_counts_as_use() {
        assert_eq!(
            warnings("fun f(x, y) {\n  y = 1;\n}"),
            vec!["[line 1] Warning: Variable 'x' declared but never used."]
        );
    }

    #[test]
    fn test_resolver_13_warnings_do_not_make_errors() {
        let diagnostics = resolve("{ var unused; }");

        assert!(!diagnostics.has_errors());
        assert_eq!(diagnostics.warnings.len(), 1);
    }
}
