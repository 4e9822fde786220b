//! The small expression grammar understood inside `{{ }}` blocks.
//!
//! The spec's interface contract names three forms: `{{ .variable }}`
//! (a dotted path), `{{ index x 0 }}` (a function call with a bare,
//! un-dotted first argument), and `{{ funcName arg1 arg2 }}` (a function
//! call over string/path arguments). This grammar supports exactly
//! those three, nothing more — no pipes, no `range`/`if` blocks, no
//! parenthesized sub-calls. Any engine satisfying the same three forms
//! is an equivalent implementation per §4.D.
//!
//! A bare, undotted argument (the `x` in `index x 0`) is treated as
//! shorthand for the one-segment path `.x` — Go's template language
//! resolves `x` there as a locally-bound pipeline variable, which this
//! engine does not model; reading it as a top-level variable is the
//! closest equivalent and is sufficient for every example in the spec.

use serde_json::Value;

use crate::error::TemplateError;
use crate::position::Position;

/// One segment of a dotted path: a map key or an array index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

/// A parsed `{{ }}` expression, ready to evaluate against an [`Evaluator`](crate::Evaluator).
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `.a.b.0`
    Path(Vec<PathSegment>),
    /// A string, number, or bool literal argument.
    Literal(Value),
    /// `funcName arg1 arg2 ...`
    Call { name: String, args: Vec<Expr> },
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Str(String),
    Num(f64),
    Bool(bool),
    Path(Vec<PathSegment>),
    Ident(String),
}

fn tokenize(content: &str, position: Position) -> Result<Vec<Token>, TemplateError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = content.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i].is_whitespace() {
            i += 1;
            continue;
        }
        if chars[i] == '"' {
            let mut s = String::new();
            i += 1;
            let mut closed = false;
            while i < chars.len() {
                match chars[i] {
                    '"' => {
                        closed = true;
                        i += 1;
                        break;
                    }
                    '\\' if i + 1 < chars.len() => {
                        s.push(chars[i + 1]);
                        i += 2;
                    }
                    c => {
                        s.push(c);
                        i += 1;
                    }
                }
            }
            if !closed {
                return Err(TemplateError::ParseError {
                    position,
                    message: "unterminated string literal".to_string(),
                });
            }
            tokens.push(Token::Str(s));
            continue;
        }
        let start = i;
        while i < chars.len() && !chars[i].is_whitespace() {
            i += 1;
        }
        let word: String = chars[start..i].iter().collect();
        tokens.push(classify_word(&word));
    }
    Ok(tokens)
}

fn classify_word(word: &str) -> Token {
    if word == "true" {
        return Token::Bool(true);
    }
    if word == "false" {
        return Token::Bool(false);
    }
    if let Ok(n) = word.parse::<f64>() {
        return Token::Num(n);
    }
    if let Some(rest) = word.strip_prefix('.') {
        return Token::Path(parse_path_segments(rest));
    }
    Token::Ident(word.to_string())
}

fn parse_path_segments(rest: &str) -> Vec<PathSegment> {
    if rest.is_empty() {
        return Vec::new();
    }
    rest.split('.')
        .map(|seg| match seg.parse::<usize>() {
            Ok(n) => PathSegment::Index(n),
            Err(_) => PathSegment::Field(seg.to_string()),
        })
        .collect()
}

fn token_to_arg(token: Token) -> Expr {
    match token {
        Token::Str(s) => Expr::Literal(Value::String(s)),
        Token::Num(n) => Expr::Literal(
            serde_json::Number::from_f64(n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
        ),
        Token::Bool(b) => Expr::Literal(Value::Bool(b)),
        Token::Path(segments) => Expr::Path(segments),
        // Bare identifier used as an argument: shorthand for `.ident`.
        Token::Ident(name) => Expr::Path(vec![PathSegment::Field(name)]),
    }
}

/// Parse the trimmed content of one `{{ ... }}` block.
pub fn parse_expression(content: &str, position: Position) -> Result<Expr, TemplateError> {
    let tokens = tokenize(content, position)?;
    if tokens.is_empty() {
        return Err(TemplateError::ParseError {
            position,
            message: "empty expression".to_string(),
        });
    }
    if tokens.len() == 1 {
        return Ok(match tokens.into_iter().next().unwrap() {
            Token::Str(s) => Expr::Literal(Value::String(s)),
            Token::Num(n) => Expr::Literal(
                serde_json::Number::from_f64(n)
                    .map(Value::Number)
                    .unwrap_or(Value::Null),
            ),
            Token::Bool(b) => Expr::Literal(Value::Bool(b)),
            Token::Path(segments) => Expr::Path(segments),
            Token::Ident(name) => Expr::Call {
                name,
                args: Vec::new(),
            },
        });
    }
    let mut iter = tokens.into_iter();
    let head = iter.next().unwrap();
    let name = match head {
        Token::Ident(name) => name,
        _ => {
            return Err(TemplateError::ParseError {
                position,
                message: "a multi-token expression must start with a function name".to_string(),
            });
        }
    };
    let args = iter.map(token_to_arg).collect();
    Ok(Expr::Call { name, args })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Expr {
        parse_expression(s, Position::start()).unwrap()
    }

    #[test]
    fn parses_simple_path() {
        assert_eq!(
            p(".variable_actions_a"),
            Expr::Path(vec![PathSegment::Field("variable_actions_a".into())])
        );
    }

    #[test]
    fn parses_nested_path_with_index() {
        assert_eq!(
            p(".items.0.name"),
            Expr::Path(vec![
                PathSegment::Field("items".into()),
                PathSegment::Index(0),
                PathSegment::Field("name".into()),
            ])
        );
    }

    #[test]
    fn parses_function_call_with_string_arg() {
        assert_eq!(
            p("param \"name\""),
            Expr::Call {
                name: "param".into(),
                args: vec![Expr::Literal(Value::String("name".into()))],
            }
        );
    }

    #[test]
    fn parses_index_with_bare_identifier() {
        assert_eq!(
            p("index x 0"),
            Expr::Call {
                name: "index".into(),
                args: vec![
                    Expr::Path(vec![PathSegment::Field("x".into())]),
                    Expr::Literal(Value::Number(0.into())),
                ],
            }
        );
    }

    #[test]
    fn parses_bare_function_call_with_no_args() {
        assert_eq!(
            p("now"),
            Expr::Call {
                name: "now".into(),
                args: vec![],
            }
        );
    }

    #[test]
    fn rejects_unterminated_string() {
        assert!(parse_expression("param \"name", Position::start()).is_err());
    }

    #[test]
    fn rejects_empty_expression() {
        assert!(parse_expression("   ", Position::start()).is_err());
    }

    #[test]
    fn rejects_trailing_tokens_after_literal() {
        assert!(parse_expression("\"a\" \"b\"", Position::start()).is_err());
    }
}
