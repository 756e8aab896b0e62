#![forbid(unsafe_code)]

use mc_ast::{BinaryOp, Expr, UnaryOp};
use thiserror::Error;

/// Hard cap on parser recursion, independent of any evaluation limit.
/// Input length is already bounded by the caller, but a string like
/// `((((…` must not be able to overflow the stack before validation runs.
const MAX_PARSE_DEPTH: usize = 200;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("unsupported construct: {0}")]
    UnsupportedOperation(String),
    #[error("unsupported argument: {0}")]
    UnsupportedArgument(String),
}

/// Rewrite display symbols to their canonical spellings: `×` → `*`,
/// `÷` → `/`, `√` → `sqrt`, and the typographic minus U+2212 → `-`.
/// Applying the rewrite twice yields the same string.
#[must_use]
pub fn normalize(input: &str) -> String {
    if !input.chars().any(|c| matches!(c, '×' | '÷' | '√' | '−')) {
        return input.to_owned();
    }
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '×' => out.push('*'),
            '÷' => out.push('/'),
            '√' => out.push_str("sqrt"),
            '−' => out.push('-'),
            other => out.push(other),
        }
    }
    out
}

/// Parse a normalized expression string into an `Expr` AST.
///
/// Syntax:
///   expr   → add
///   add    → mul ( ("+" | "-") mul )*
///   mul    → unary ( ("*" | "/" | "%") unary )*
///   unary  → ("+" | "-") unary | power
///   power  → atom ( ("^" | "**") unary )?      (right-associative)
///   atom   → NUMBER | IDENT | IDENT "(" args ")" | "(" expr ")"
///   args   → expr ( "," expr )* | ε
///
/// Anything the grammar cannot express — string literals, brackets,
/// attribute access, comparison operators, statement keywords — is
/// rejected during tokenization or parsing and never reaches a tree.
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize(input)?;
    let mut pos = 0;
    let result = parse_add(&tokens, &mut pos, 0)?;
    if pos < tokens.len() {
        if tokens[pos] == Token::Equals {
            return Err(ParseError::UnsupportedOperation(
                "assignment is not allowed".to_owned(),
            ));
        }
        return Err(ParseError::Syntax(format!(
            "unexpected token at position {pos}: {:?}",
            tokens[pos]
        )));
    }
    Ok(result)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    // Grouping
    LParen,
    RParen,
    Comma,
    // Recognized so keyword arguments and assignment get a precise error
    Equals,
}

/// Statement and expression keywords of the source language the chat
/// frontend originally embedded. None of them are part of this grammar;
/// naming them here turns `lambda x` or `import os` into a targeted
/// rejection instead of a puzzling unknown-identifier error.
const FORBIDDEN_KEYWORDS: &[&str] = &[
    "and", "assert", "break", "class", "continue", "def", "del", "elif", "else", "except", "exec",
    "finally", "for", "from", "global", "if", "import", "in", "is", "lambda", "not", "or", "pass",
    "raise", "return", "try", "while", "with", "yield",
];

fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        match c {
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                if i + 1 < chars.len() && chars[i + 1] == '*' {
                    tokens.push(Token::Caret);
                    i += 2;
                } else {
                    tokens.push(Token::Star);
                    i += 1;
                }
            }
            '/' => {
                if i + 1 < chars.len() && chars[i + 1] == '/' {
                    return Err(ParseError::UnsupportedOperation(
                        "floor division is not supported; use / and round".to_owned(),
                    ));
                }
                tokens.push(Token::Slash);
                i += 1;
            }
            '%' => {
                tokens.push(Token::Percent);
                i += 1;
            }
            '^' => {
                tokens.push(Token::Caret);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            '=' => {
                tokens.push(Token::Equals);
                i += 1;
            }
            '\'' | '"' => {
                return Err(ParseError::UnsupportedOperation(
                    "string literals are not allowed".to_owned(),
                ));
            }
            '[' | ']' => {
                return Err(ParseError::UnsupportedOperation(
                    "subscripts and list literals are not allowed".to_owned(),
                ));
            }
            '{' | '}' => {
                return Err(ParseError::UnsupportedOperation(
                    "brace literals are not allowed".to_owned(),
                ));
            }
            ':' | ';' => {
                return Err(ParseError::UnsupportedOperation(format!(
                    "'{c}' is not allowed; only arithmetic expressions are supported"
                )));
            }
            '<' | '>' | '!' | '&' | '|' | '~' | '@' => {
                return Err(ParseError::UnsupportedOperation(format!(
                    "operator '{c}' is not allowed; only + - * / % ^ are supported"
                )));
            }
            '.' if !next_is_digit(&chars, i + 1) || follows_value(&tokens) => {
                return Err(ParseError::UnsupportedOperation(
                    "attribute access is not allowed".to_owned(),
                ));
            }
            _ if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| ParseError::Syntax(format!("invalid number: {literal}")))?;
                tokens.push(Token::Number(value));
            }
            _ if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                if word.starts_with("__") {
                    return Err(ParseError::UnsupportedOperation(format!(
                        "reserved identifier: {word}"
                    )));
                }
                if FORBIDDEN_KEYWORDS.contains(&word.as_str()) {
                    return Err(ParseError::UnsupportedOperation(format!(
                        "keyword '{word}' is not allowed"
                    )));
                }
                tokens.push(Token::Ident(word));
            }
            _ => {
                return Err(ParseError::Syntax(format!("unexpected character: '{c}'")));
            }
        }
    }
    Ok(tokens)
}

fn next_is_digit(chars: &[char], i: usize) -> bool {
    chars.get(i).is_some_and(char::is_ascii_digit)
}

/// A `.` directly after an identifier, closing parenthesis, or number is
/// attribute-access syntax, not the start of a fractional literal.
fn follows_value(tokens: &[Token]) -> bool {
    matches!(
        tokens.last(),
        Some(Token::Ident(_) | Token::RParen | Token::Number(_))
    )
}

fn check_depth(depth: usize) -> Result<(), ParseError> {
    if depth > MAX_PARSE_DEPTH {
        return Err(ParseError::Syntax(
            "expression nests too deeply".to_owned(),
        ));
    }
    Ok(())
}

fn parse_add(tokens: &[Token], pos: &mut usize, depth: usize) -> Result<Expr, ParseError> {
    check_depth(depth)?;
    let mut left = parse_mul(tokens, pos, depth)?;
    while *pos < tokens.len() {
        let op = match tokens[*pos] {
            Token::Plus => BinaryOp::Add,
            Token::Minus => BinaryOp::Sub,
            _ => break,
        };
        *pos += 1;
        let right = parse_mul(tokens, pos, depth)?;
        left = Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        };
    }
    Ok(left)
}

fn parse_mul(tokens: &[Token], pos: &mut usize, depth: usize) -> Result<Expr, ParseError> {
    let mut left = parse_unary(tokens, pos, depth)?;
    while *pos < tokens.len() {
        let op = match tokens[*pos] {
            Token::Star => BinaryOp::Mul,
            Token::Slash => BinaryOp::Div,
            Token::Percent => BinaryOp::Rem,
            _ => break,
        };
        *pos += 1;
        let right = parse_unary(tokens, pos, depth)?;
        left = Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        };
    }
    Ok(left)
}

fn parse_unary(tokens: &[Token], pos: &mut usize, depth: usize) -> Result<Expr, ParseError> {
    check_depth(depth)?;
    if *pos < tokens.len() {
        let op = match tokens[*pos] {
            Token::Minus => Some(UnaryOp::Neg),
            Token::Plus => Some(UnaryOp::Plus),
            _ => None,
        };
        if let Some(op) = op {
            *pos += 1;
            let operand = parse_unary(tokens, pos, depth + 1)?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }
    }
    parse_power(tokens, pos, depth)
}

/// `^` is right-associative and binds tighter than a leading unary sign,
/// so `-2^2` is `-(2^2)` while the exponent itself may carry a sign.
fn parse_power(tokens: &[Token], pos: &mut usize, depth: usize) -> Result<Expr, ParseError> {
    let base = parse_atom(tokens, pos, depth)?;
    if *pos < tokens.len() && tokens[*pos] == Token::Caret {
        *pos += 1;
        let exponent = parse_unary(tokens, pos, depth + 1)?;
        return Ok(Expr::Binary {
            op: BinaryOp::Pow,
            left: Box::new(base),
            right: Box::new(exponent),
        });
    }
    Ok(base)
}

fn parse_atom(tokens: &[Token], pos: &mut usize, depth: usize) -> Result<Expr, ParseError> {
    if *pos >= tokens.len() {
        return Err(ParseError::Syntax("unexpected end of expression".to_owned()));
    }
    match &tokens[*pos] {
        Token::Number(value) => {
            let value = *value;
            *pos += 1;
            Ok(Expr::Number { value })
        }
        Token::Ident(name) => {
            let name = name.clone();
            *pos += 1;
            if *pos < tokens.len() && tokens[*pos] == Token::LParen {
                *pos += 1; // skip '('
                let args = parse_args(tokens, pos, depth + 1)?;
                return Ok(Expr::Call { func: name, args });
            }
            Ok(Expr::Ident { name })
        }
        Token::LParen => {
            *pos += 1; // skip '('
            let inner = parse_add(tokens, pos, depth + 1)?;
            if *pos >= tokens.len() || tokens[*pos] != Token::RParen {
                return Err(ParseError::Syntax("expected closing ')'".to_owned()));
            }
            *pos += 1; // skip ')'
            Ok(inner)
        }
        Token::Equals => Err(ParseError::UnsupportedOperation(
            "assignment is not allowed".to_owned(),
        )),
        other => Err(ParseError::Syntax(format!("unexpected token: {other:?}"))),
    }
}

/// Parse a call argument list, cursor positioned just past the opening
/// parenthesis. Empty lists parse; arity is the evaluator's concern.
fn parse_args(tokens: &[Token], pos: &mut usize, depth: usize) -> Result<Vec<Expr>, ParseError> {
    let mut args = Vec::new();
    if *pos < tokens.len() && tokens[*pos] == Token::RParen {
        *pos += 1;
        return Ok(args);
    }
    loop {
        if let (Some(Token::Ident(name)), Some(Token::Equals)) =
            (tokens.get(*pos), tokens.get(*pos + 1))
        {
            return Err(ParseError::UnsupportedArgument(format!(
                "keyword argument '{name}=' is not supported"
            )));
        }
        let arg = parse_add(tokens, pos, depth)?;
        if *pos < tokens.len() && tokens[*pos] == Token::Equals {
            return Err(ParseError::UnsupportedArgument(
                "keyword arguments are not supported".to_owned(),
            ));
        }
        args.push(arg);
        match tokens.get(*pos) {
            Some(Token::Comma) => {
                *pos += 1;
            }
            Some(Token::RParen) => {
                *pos += 1;
                return Ok(args);
            }
            _ => {
                return Err(ParseError::Syntax(
                    "expected ',' or ')' in argument list".to_owned(),
                ));
            }
        }
    }
}
