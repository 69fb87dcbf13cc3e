use log::trace;
use serde::Serialize;
use std::fmt;
use std::mem;

/// The different kinds of tokens recognized by the Lox scanner.
///
/// Variants without data represent single‑character or keyword tokens.
/// `STRING(String)` and `NUMBER(f64)` carry their literal values.
/// `IDENTIFIER` is used for user‑defined names.
/// `EOF` marks the end of input.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Serialize)]
pub enum TokenType {
    /// '('
    LEFT_PAREN,

    /// ')'
    RIGHT_PAREN,

    /// '{'
    LEFT_BRACE,

    /// '}'
    RIGHT_BRACE,

    /// ','
    COMMA,

    /// '.'
    DOT,

    /// '-'
    MINUS,

    /// '+'
    PLUS,

    /// ';'
    SEMICOLON,

    /// '/'
    SLASH,

    /// '*'
    STAR,

    /// '!'
    BANG,

    /// '!='
    BANG_EQUAL,

    /// '='
    EQUAL,

    /// '=='
    EQUAL_EQUAL,

    /// '>'
    GREATER,

    /// '>='
    GREATER_EQUAL,

    /// '<'
    LESS,

    /// '<='
    LESS_EQUAL,

    /// A user‑defined identifier
    IDENTIFIER,

    /// A string literal (contents without quotes)
    STRING(String),

    /// A numeric literal
    #[serde(rename = "NUMBER")]
    NUMBER(f64),

    /// 'and'
    AND,

    /// 'break'
    BREAK,

    /// 'class'
    CLASS,

    /// 'else'
    ELSE,

    /// 'execute'
    EXECUTE,

    /// 'false'
    FALSE,

    /// 'fun'
    FUN,

    /// 'for'
    FOR,

    /// 'if'
    IF,

    /// 'nil'
    NIL,

    /// 'or'
    OR,

    /// 'print'
    PRINT,

    /// 'return'
    RETURN,

    /// 'super'
    SUPER,

    /// 'this'
    THIS,

    /// 'true'
    TRUE,

    /// 'var'
    VAR,

    /// 'while'
    WHILE,

    /// End‑of‑file marker
    EOF,
}

impl TokenType {
    /// Variant name without payload, as printed by `rox tokenize`.
    pub fn name(&self) -> &'static str {
        match self {
            TokenType::STRING(_) => "STRING",
            TokenType::NUMBER(_) => "NUMBER",
            TokenType::LEFT_PAREN => "LEFT_PAREN",
            TokenType::RIGHT_PAREN => "RIGHT_PAREN",
            TokenType::LEFT_BRACE => "LEFT_BRACE",
            TokenType::RIGHT_BRACE => "RIGHT_BRACE",
            TokenType::COMMA => "COMMA",
            TokenType::DOT => "DOT",
            TokenType::MINUS => "MINUS",
            TokenType::PLUS => "PLUS",
            TokenType::SEMICOLON => "SEMICOLON",
            TokenType::SLASH => "SLASH",
            TokenType::STAR => "STAR",
            TokenType::BANG => "BANG",
            TokenType::BANG_EQUAL => "BANG_EQUAL",
            TokenType::EQUAL => "EQUAL",
            TokenType::EQUAL_EQUAL => "EQUAL_EQUAL",
            TokenType::GREATER => "GREATER",
            TokenType::GREATER_EQUAL => "GREATER_EQUAL",
            TokenType::LESS => "LESS",
            TokenType::LESS_EQUAL => "LESS_EQUAL",
            TokenType::IDENTIFIER => "IDENTIFIER",
            TokenType::AND => "AND",
            TokenType::BREAK => "BREAK",
            TokenType::CLASS => "CLASS",
            TokenType::ELSE => "ELSE",
            TokenType::EXECUTE => "EXECUTE",
            TokenType::FALSE => "FALSE",
            TokenType::FUN => "FUN",
            TokenType::FOR => "FOR",
            TokenType::IF => "IF",
            TokenType::NIL => "NIL",
            TokenType::OR => "OR",
            TokenType::PRINT => "PRINT",
            TokenType::RETURN => "RETURN",
            TokenType::SUPER => "SUPER",
            TokenType::THIS => "THIS",
            TokenType::TRUE => "TRUE",
            TokenType::VAR => "VAR",
            TokenType::WHILE => "WHILE",
            TokenType::EOF => "EOF",
        }
    }
}

impl PartialEq for TokenType {
    /// Two TokenTypes are equal if they share the same variant
    /// (ignoring any inner data). Uses `mem::discriminant` to compare.
    fn eq(&self, other: &Self) -> bool {
        let same: bool = mem::discriminant(self) == mem::discriminant(other);

        trace!("TokenType {:?} == {:?}: {}", self, other, same);

        same
    }
}

/// A scanned token, including its type, the original lexeme,
/// and the line number where it was found.
///
/// The lexeme is owned so that AST nodes (and the closures built from them)
/// can outlive the source buffer, e.g. across REPL lines.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Token {
    /// The category of this token.
    pub token_type: TokenType,

    /// The exact substring from the source that produced this token.
    pub lexeme: String,

    /// 1‑based line number in the source.
    pub line: usize,
}

impl Token {
    /// Create a new Token with the given type, lexeme, and line.
    pub fn new<S: Into<String>>(token_type: TokenType, lexeme: S, line: usize) -> Self {
        let lexeme: String = lexeme.into();

        trace!(
            "Creating new token: type={:?}, lexeme={}, line={}",
            token_type,
            lexeme,
            line
        );

        Self {
            token_type,
            lexeme,
            line,
        }
    }

    /// Synthetic identifier token, used for `this`/`super` bindings and tests.
    pub fn identifier<S: Into<String>>(name: S, line: usize) -> Self {
        Self::new(TokenType::IDENTIFIER, name, line)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 3 → "3.0", 3.14 → "3.14", strings verbatim, everything else "null".
        let literal: String = match &self.token_type {
            TokenType::STRING(s) => s.clone(),
            TokenType::NUMBER(n) => {
                if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
                    let mut buf: itoa::Buffer = itoa::Buffer::new();
                    format!("{}.0", buf.format(*n as i64))
                } else {
                    n.to_string()
                }
            }
            _ => "null".to_string(),
        };

        write!(f, "{} {} {}", self.token_type.name(), self.lexeme, literal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_types_compare_by_variant() {
        assert_eq!(TokenType::NUMBER(1.0), TokenType::NUMBER(2.0));
        assert_eq!(
            TokenType::STRING("a".into()),
            TokenType::STRING("b".into())
        );
        assert_ne!(TokenType::PLUS, TokenType::MINUS);
    }

    #[test]
    fn display_matches_tokenize_format() {
        assert_eq!(
            Token::new(TokenType::NUMBER(3.0), "3", 1).to_string(),
            "NUMBER 3 3.0"
        );
        assert_eq!(
            Token::new(TokenType::NUMBER(3.25), "3.25", 1).to_string(),
            "NUMBER 3.25 3.25"
        );
        assert_eq!(
            Token::new(TokenType::STRING("hi".into()), "\"hi\"", 1).to_string(),
            "STRING \"hi\" hi"
        );
        assert_eq!(Token::new(TokenType::EOF, "", 1).to_string(), "EOF  null");
    }
}
