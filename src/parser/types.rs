//! Type parsing implementation.
//!
//! This module handles parsing of type annotations. It supports:
//!
//! - Named types (identifiers)
//! - Tuple and parenthesized types
//! - Reference types, `&T` and `&mut T`
//! - Maybe types, `maybe T`

use std::{collections::HashMap, rc::Rc};

use crate::{
    ast::{
        ast::TypeReprId,
        types::{TypeRepr, TypeReprKind},
    },
    errors::errors::Error,
    lexer::tokens::TokenKind,
    Position,
};

use super::parser::Parser;

/// Type alias for type null denotation handler functions.
pub type TypeNUDHandler = fn(&mut Parser) -> Result<TypeReprId, Error>;

/// Type alias for type NUD lookup table.
pub type TypeNUDLookup = HashMap<TokenKind, TypeNUDHandler>;

/// Initializes the type parsing lookup table.
pub fn create_token_type_lookups(parser: &mut Parser) {
    parser.type_nud(TokenKind::Identifier, parse_identifier_type);
    parser.type_nud(TokenKind::OpenParen, parse_tuple_type);
    parser.type_nud(TokenKind::Amp, parse_reference_type);
    parser.type_nud(TokenKind::And, parse_reference_type);
    parser.type_nud(TokenKind::Maybe, parse_maybe_type);
}

fn add_type_repr(parser: &mut Parser, kind: TypeReprKind, start: Position) -> TypeReprId {
    let span = parser.span_from(start);
    parser.ast.add_type_repr(TypeRepr { kind, span })
}

pub fn parse_identifier_type(parser: &mut Parser) -> Result<TypeReprId, Error> {
    let token = parser.expect(TokenKind::Identifier)?;
    Ok(add_type_repr(
        parser,
        TypeReprKind::Identifier(token.value),
        token.span.start,
    ))
}

/// `()`, `(T)` or `(T, U, ...)`.
pub fn parse_tuple_type(parser: &mut Parser) -> Result<TypeReprId, Error> {
    let start = parser.expect(TokenKind::OpenParen)?.span.start;

    let mut elements = vec![];
    let mut saw_comma = false;
    while parser.current_token_kind() != TokenKind::CloseParen {
        elements.push(parse_type(parser)?);
        if parser.current_token_kind() != TokenKind::Comma {
            break;
        }
        parser.advance();
        saw_comma = true;
    }
    parser.expect(TokenKind::CloseParen)?;

    let kind = match elements.as_slice() {
        [single] if !saw_comma => TypeReprKind::Paren(*single),
        [_] => {
            return Err(parser.unexpected_token_detailed(
                "single-element tuple types are not allowed, remove the trailing comma",
            ))
        }
        _ => TypeReprKind::Tuple(elements),
    };
    Ok(add_type_repr(parser, kind, start))
}

/// `&T`, `&mut T`, and `&&T` which the lexer reads as a single `&&`.
pub fn parse_reference_type(parser: &mut Parser) -> Result<TypeReprId, Error> {
    let token = parser.advance().clone();
    let start = token.span.start.clone();

    let is_mut = parser.current_token_kind() == TokenKind::Mut;
    if is_mut {
        parser.advance();
    }
    let sub = parse_type(parser)?;

    if token.kind == TokenKind::And {
        let inner_start = Position(start.0 + 1, Rc::clone(&start.1));
        let inner = add_type_repr(parser, TypeReprKind::Reference { sub, is_mut }, inner_start);
        return Ok(add_type_repr(
            parser,
            TypeReprKind::Reference {
                sub: inner,
                is_mut: false,
            },
            start,
        ));
    }

    Ok(add_type_repr(parser, TypeReprKind::Reference { sub, is_mut }, start))
}

pub fn parse_maybe_type(parser: &mut Parser) -> Result<TypeReprId, Error> {
    let start = parser.expect(TokenKind::Maybe)?.span.start;
    let sub = parse_type(parser)?;
    Ok(add_type_repr(parser, TypeReprKind::Maybe(sub), start))
}

pub fn parse_type(parser: &mut Parser) -> Result<TypeReprId, Error> {
    let token_kind = parser.current_token_kind();
    match parser.get_type_nud_lookup().get(&token_kind) {
        Some(nud) => {
            let nud = *nud;
            nud(parser)
        }
        None => Err(parser.unexpected_token_detailed("expected a type")),
    }
}
