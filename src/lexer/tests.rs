//! Unit tests for the lexer module.
//!
//! This module contains tests for tokenization including:
//! - Keywords and identifiers
//! - Numeric literals (integers and floats)
//! - Operators and punctuation
//! - Comments
//! - Error cases

use super::{lexer::tokenize, tokens::TokenKind};

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source.to_string(), Some("test.sora".to_string()))
        .unwrap()
        .iter()
        .map(|token| token.kind)
        .collect()
}

#[test]
fn test_tokenize_keywords() {
    let source = "func let mut if else while return break continue maybe null true false as _";
    assert_eq!(
        kinds(source),
        vec![
            TokenKind::Func,
            TokenKind::Let,
            TokenKind::Mut,
            TokenKind::If,
            TokenKind::Else,
            TokenKind::While,
            TokenKind::Return,
            TokenKind::Break,
            TokenKind::Continue,
            TokenKind::Maybe,
            TokenKind::Null,
            TokenKind::True,
            TokenKind::False,
            TokenKind::As,
            TokenKind::Underscore,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_identifiers() {
    let source = "foo bar baz_123 _underscore CamelCase".to_string();
    let tokens = tokenize(source, Some("test.sora".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[0].value, "foo");
    assert_eq!(tokens[2].value, "baz_123");
    assert_eq!(tokens[3].kind, TokenKind::Identifier);
    assert_eq!(tokens[3].value, "_underscore");
    assert_eq!(tokens[4].value, "CamelCase");
    assert_eq!(tokens[5].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_numbers() {
    let source = "42 3.14 0 100.5".to_string();
    let tokens = tokenize(source, Some("test.sora".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::IntegerLiteral);
    assert_eq!(tokens[0].value, "42");
    assert_eq!(tokens[1].kind, TokenKind::FloatLiteral);
    assert_eq!(tokens[1].value, "3.14");
    assert_eq!(tokens[2].kind, TokenKind::IntegerLiteral);
    assert_eq!(tokens[3].kind, TokenKind::FloatLiteral);
}

#[test]
fn test_tokenize_tuple_member_access() {
    assert_eq!(
        kinds("t.0"),
        vec![
            TokenKind::Identifier,
            TokenKind::Dot,
            TokenKind::IntegerLiteral,
            TokenKind::EOF
        ]
    );
}

#[test]
fn test_tokenize_operators() {
    let source = "+ - * / % == != < <= > >= && || ! = & -> : ? ; , .";
    assert_eq!(
        kinds(source),
        vec![
            TokenKind::Plus,
            TokenKind::Dash,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Percent,
            TokenKind::Equals,
            TokenKind::NotEquals,
            TokenKind::Less,
            TokenKind::LessEquals,
            TokenKind::Greater,
            TokenKind::GreaterEquals,
            TokenKind::And,
            TokenKind::Or,
            TokenKind::Not,
            TokenKind::Assignment,
            TokenKind::Amp,
            TokenKind::Arrow,
            TokenKind::Colon,
            TokenKind::Question,
            TokenKind::Semicolon,
            TokenKind::Comma,
            TokenKind::Dot,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_skips_comments() {
    let source = "let x // the answer\n= 42";
    assert_eq!(
        kinds(source),
        vec![
            TokenKind::Let,
            TokenKind::Identifier,
            TokenKind::Assignment,
            TokenKind::IntegerLiteral,
            TokenKind::EOF
        ]
    );
}

#[test]
fn test_token_spans() {
    let source = "func f(x: i32)".to_string();
    let tokens = tokenize(source, Some("test.sora".to_string())).unwrap();

    assert_eq!(tokens[0].span.start.0, 0);
    assert_eq!(tokens[0].span.end.0, 4);
    assert_eq!(tokens[1].span.start.0, 5);
    assert_eq!(tokens[3].value, "x");
    assert_eq!(tokens[3].span.start.0, 7);
    assert_eq!(tokens[5].span.start.0, 10);
    assert_eq!(tokens[5].span.end.0, 13);
    assert_eq!(*tokens[0].span.start.1, "test.sora");
}

#[test]
fn test_tokenize_unrecognised_character() {
    let result = tokenize("let x = @".to_string(), None);
    let error = result.err().unwrap();

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert_eq!(error.get_position().0, 8);
}

#[test]
fn test_token_debug() {
    let tokens = tokenize("x 1".to_string(), None).unwrap();
    assert_eq!(tokens[0].debug(), "Identifier (x)");
    assert_eq!(tokens[2].debug(), "EOF ()");
}
