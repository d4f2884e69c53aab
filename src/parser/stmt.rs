use crate::{
    ast::{
        ast::{AstNode, DeclId, PatternId, StmtId},
        declarations::{Decl, DeclKind, FuncDecl, LetDecl, ParamDecl, VarDecl},
        patterns::{Pattern, PatternKind},
        statements::{BlockStmt, IfStmt, Stmt, StmtCondition, StmtKind, WhileStmt},
    },
    errors::errors::Error,
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
    Position,
};

use super::{parser::Parser, types::parse_type};

fn add_stmt(parser: &mut Parser, kind: StmtKind, start: Position) -> StmtId {
    let span = parser.span_from(start);
    parser.ast.add_stmt(Stmt { kind, span })
}

fn add_pattern(parser: &mut Parser, kind: PatternKind, start: Position) -> PatternId {
    let span = parser.span_from(start);
    parser.ast.add_pattern(Pattern { kind, span })
}

/// Statements may be followed by any number of `;`.
pub fn skip_separators(parser: &mut Parser) {
    while parser.current_token_kind() == TokenKind::Semicolon {
        parser.advance();
    }
}

pub fn parse_stmt(parser: &mut Parser) -> Result<AstNode, Error> {
    let handler = parser
        .get_stmt_lookup()
        .get(&parser.current_token_kind())
        .copied();
    if let Some(handler) = handler {
        return handler(parser);
    }

    let expr = parse_expr(parser, BindingPower::Default)?;
    Ok(AstNode::Expr(expr))
}

//===- Patterns -------------------------------------------------------------===//

fn parse_pattern(parser: &mut Parser, is_mut: bool) -> Result<PatternId, Error> {
    let token = parser.current_token().clone();
    let start = token.span.start.clone();

    match token.kind {
        TokenKind::Mut => {
            parser.advance();
            let sub = parse_pattern(parser, true)?;
            Ok(add_pattern(parser, PatternKind::Mut(sub), start))
        }
        TokenKind::Underscore => {
            parser.advance();
            Ok(add_pattern(parser, PatternKind::Discard, start))
        }
        TokenKind::Identifier => {
            parser.advance();
            let var = parser.ast.add_decl(Decl::new(
                DeclKind::Var(VarDecl {
                    identifier: token.value,
                    is_mut,
                }),
                token.span,
                true,
            ));
            Ok(add_pattern(parser, PatternKind::Var(var), start))
        }
        TokenKind::OpenParen => {
            parser.advance();
            let mut elements = vec![];
            let mut saw_comma = false;
            while parser.current_token_kind() != TokenKind::CloseParen {
                elements.push(parse_pattern(parser, is_mut)?);
                if parser.current_token_kind() != TokenKind::Comma {
                    break;
                }
                parser.advance();
                saw_comma = true;
            }
            parser.expect(TokenKind::CloseParen)?;

            let kind = match elements.as_slice() {
                [single] if !saw_comma => PatternKind::Paren(*single),
                [_] => {
                    return Err(parser.unexpected_token_detailed(
                        "single-element tuple patterns are not allowed, remove the trailing comma",
                    ))
                }
                _ => PatternKind::Tuple(elements),
            };
            Ok(add_pattern(parser, kind, start))
        }
        _ => Err(parser.unexpected_token_detailed("expected a pattern")),
    }
}

//===- Declarations ---------------------------------------------------------===//

/// `let pattern [: type] [= initializer]`
pub fn parse_let_decl(parser: &mut Parser) -> Result<DeclId, Error> {
    let start = parser.expect(TokenKind::Let)?.span.start;

    let mut pattern = parse_pattern(parser, false)?;
    if parser.current_token_kind() == TokenKind::Colon {
        parser.advance();
        let type_repr = parse_type(parser)?;
        let pattern_start = parser.ast.pattern(pattern).span.start.clone();
        pattern = add_pattern(
            parser,
            PatternKind::Typed {
                sub: pattern,
                type_repr,
            },
            pattern_start,
        );
    }

    let initializer = if parser.current_token_kind() == TokenKind::Assignment {
        parser.advance();
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };

    let span = parser.span_from(start);
    Ok(parser.ast.add_decl(Decl::new(
        DeclKind::Let(LetDecl {
            pattern,
            initializer,
        }),
        span,
        true,
    )))
}

pub fn parse_let_decl_stmt(parser: &mut Parser) -> Result<AstNode, Error> {
    parse_let_decl(parser).map(AstNode::Decl)
}

/// `func name(param: type, ...) [-> type] { ... }`
pub fn parse_func_decl(parser: &mut Parser, is_local: bool) -> Result<DeclId, Error> {
    let start = parser.expect(TokenKind::Func)?.span.start;

    let error = parser.unexpected_token_detailed("expected a function name");
    let identifier = parser.expect_error(TokenKind::Identifier, Some(error))?.value;

    parser.expect(TokenKind::OpenParen)?;

    let mut params = Vec::new();
    while parser.current_token_kind() != TokenKind::CloseParen {
        let name = parser.expect(TokenKind::Identifier)?;
        parser.expect(TokenKind::Colon)?;
        let type_repr = parse_type(parser)?;
        let span = parser.span_from(name.span.start.clone());
        params.push(parser.ast.add_decl(Decl::new(
            DeclKind::Param(ParamDecl {
                identifier: name.value,
                type_repr,
            }),
            span,
            true,
        )));

        if parser.current_token_kind() != TokenKind::Comma {
            break;
        }
        parser.advance();
    }

    parser.expect(TokenKind::CloseParen)?;

    let return_type = if parser.current_token_kind() == TokenKind::Arrow {
        parser.advance();
        Some(parse_type(parser)?)
    } else {
        None
    };

    let body = parse_block(parser)?;

    let span = parser.span_from(start);
    Ok(parser.ast.add_decl(Decl::new(
        DeclKind::Func(FuncDecl {
            identifier,
            params,
            return_type,
            body: Some(body),
        }),
        span,
        is_local,
    )))
}

pub fn parse_func_decl_stmt(parser: &mut Parser) -> Result<AstNode, Error> {
    parse_func_decl(parser, true).map(AstNode::Decl)
}

//===- Statements -----------------------------------------------------------===//

pub fn parse_block(parser: &mut Parser) -> Result<StmtId, Error> {
    let start = parser.expect(TokenKind::OpenCurly)?.span.start;

    let mut elements = Vec::new();
    skip_separators(parser);
    while parser.current_token_kind() != TokenKind::CloseCurly {
        if !parser.has_tokens() {
            return Err(parser.unexpected_token_detailed("expected '}' to close the block"));
        }
        elements.push(parse_stmt(parser)?);
        skip_separators(parser);
    }

    parser.expect(TokenKind::CloseCurly)?;

    Ok(add_stmt(parser, StmtKind::Block(BlockStmt { elements }), start))
}

pub fn parse_block_stmt(parser: &mut Parser) -> Result<AstNode, Error> {
    parse_block(parser).map(AstNode::Stmt)
}

fn parse_condition(parser: &mut Parser) -> Result<StmtCondition, Error> {
    if parser.current_token_kind() == TokenKind::Let {
        return Ok(StmtCondition::LetDecl(parse_let_decl(parser)?));
    }
    Ok(StmtCondition::Expr(parse_expr(parser, BindingPower::Default)?))
}

fn parse_if(parser: &mut Parser) -> Result<StmtId, Error> {
    let start = parser.expect(TokenKind::If)?.span.start;

    let condition = parse_condition(parser)?;
    let then_body = parse_block(parser)?;

    let else_body = if parser.current_token_kind() == TokenKind::Else {
        parser.advance();
        if parser.current_token_kind() == TokenKind::If {
            Some(parse_if(parser)?)
        } else {
            Some(parse_block(parser)?)
        }
    } else {
        None
    };

    Ok(add_stmt(
        parser,
        StmtKind::If(IfStmt {
            condition,
            then_body,
            else_body,
        }),
        start,
    ))
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<AstNode, Error> {
    parse_if(parser).map(AstNode::Stmt)
}

pub fn parse_while_stmt(parser: &mut Parser) -> Result<AstNode, Error> {
    let start = parser.expect(TokenKind::While)?.span.start;

    let condition = parse_condition(parser)?;
    let body = parse_block(parser)?;

    Ok(AstNode::Stmt(add_stmt(
        parser,
        StmtKind::While(WhileStmt { condition, body }),
        start,
    )))
}

/// `return` has no value when followed by `}`, `;` or the end of the file.
pub fn parse_return_stmt(parser: &mut Parser) -> Result<AstNode, Error> {
    let start = parser.expect(TokenKind::Return)?.span.start;

    let value = match parser.current_token_kind() {
        TokenKind::CloseCurly | TokenKind::Semicolon | TokenKind::EOF => None,
        _ => Some(parse_expr(parser, BindingPower::Default)?),
    };

    Ok(AstNode::Stmt(add_stmt(parser, StmtKind::Return(value), start)))
}

pub fn parse_break_stmt(parser: &mut Parser) -> Result<AstNode, Error> {
    let start = parser.expect(TokenKind::Break)?.span.start;
    Ok(AstNode::Stmt(add_stmt(parser, StmtKind::Break, start)))
}

pub fn parse_continue_stmt(parser: &mut Parser) -> Result<AstNode, Error> {
    let start = parser.expect(TokenKind::Continue)?.span.start;
    Ok(AstNode::Stmt(add_stmt(parser, StmtKind::Continue, start)))
}
