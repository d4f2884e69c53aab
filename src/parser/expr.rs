use std::rc::Rc;

use crate::{
    ast::{
        ast::ExprId,
        expressions::{BinaryOp, DeclRefExpr, Expr, ExprKind, UnaryOp},
    },
    errors::errors::Error,
    lexer::tokens::TokenKind,
    Position, Span,
};

use super::{lookups::BindingPower, parser::Parser, types::parse_type};

fn add_expr(parser: &mut Parser, kind: ExprKind, start: Position) -> ExprId {
    let span = parser.span_from(start);
    parser.ast.add_expr(Expr::new(kind, span))
}

fn start_of(parser: &Parser, expr: ExprId) -> Position {
    parser.ast.expr(expr).span.start.clone()
}

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<ExprId, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let nud = match parser.get_nud_lookup().get(&token_kind) {
        Some(nud) => *nud,
        None => return Err(parser.unexpected_token()),
    };

    let mut left = nud(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    while parser.current_binding_power() > bp {
        let token_kind = parser.current_token_kind();
        let led = match parser.get_led_lookup().get(&token_kind) {
            Some(led) => *led,
            None => return Err(parser.unexpected_token()),
        };

        let led_bp = parser.current_binding_power();
        left = led(parser, left, led_bp)?;
    }

    Ok(left)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<ExprId, Error> {
    let token = parser.advance().clone();
    let kind = match token.kind {
        TokenKind::IntegerLiteral => ExprKind::IntegerLiteral(token.value),
        TokenKind::FloatLiteral => ExprKind::FloatLiteral(token.value),
        TokenKind::True => ExprKind::BooleanLiteral(true),
        TokenKind::False => ExprKind::BooleanLiteral(false),
        TokenKind::Null => ExprKind::NullLiteral,
        TokenKind::Underscore => ExprKind::Discard,
        TokenKind::Identifier => ExprKind::DeclRef(DeclRefExpr::new(token.value)),
        _ => return Err(parser.unexpected_token()),
    };

    Ok(add_expr(parser, kind, token.span.start))
}

pub fn parse_binary_expr(
    parser: &mut Parser,
    left: ExprId,
    bp: BindingPower,
) -> Result<ExprId, Error> {
    let operator_token = parser.advance().clone();
    let op = match operator_token.kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Dash => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Rem,
        TokenKind::Equals => BinaryOp::Eq,
        TokenKind::NotEquals => BinaryOp::NotEq,
        TokenKind::Less => BinaryOp::Less,
        TokenKind::LessEquals => BinaryOp::LessEq,
        TokenKind::Greater => BinaryOp::Greater,
        TokenKind::GreaterEquals => BinaryOp::GreaterEq,
        TokenKind::And => BinaryOp::And,
        TokenKind::Or => BinaryOp::Or,
        _ => return Err(parser.unexpected_token()),
    };

    let right = parse_expr(parser, bp)?;
    let start = start_of(parser, left);

    Ok(add_expr(
        parser,
        ExprKind::Binary {
            op,
            lhs: left,
            rhs: right,
        },
        start,
    ))
}

/// `-x`, `!x`, `*x`, `&x`, `&mut x`. `&&x` is two address-of operators.
pub fn parse_prefix_expr(parser: &mut Parser) -> Result<ExprId, Error> {
    let operator_token = parser.advance().clone();
    let start = operator_token.span.start.clone();

    let op = match operator_token.kind {
        TokenKind::Dash => UnaryOp::Minus,
        TokenKind::Not => UnaryOp::Not,
        TokenKind::Star => UnaryOp::Deref,
        TokenKind::Amp | TokenKind::And => parse_address_of(parser),
        _ => return Err(parser.unexpected_token()),
    };

    if operator_token.kind == TokenKind::And {
        let inner_start = Position(start.0 + 1, Rc::clone(&start.1));
        let rhs = parse_expr(parser, BindingPower::Unary)?;
        let inner = add_expr(parser, ExprKind::Unary { op, sub: rhs }, inner_start);
        return Ok(add_expr(
            parser,
            ExprKind::Unary {
                op: UnaryOp::AddressOf,
                sub: inner,
            },
            start,
        ));
    }

    let rhs = parse_expr(parser, BindingPower::Unary)?;
    Ok(add_expr(parser, ExprKind::Unary { op, sub: rhs }, start))
}

fn parse_address_of(parser: &mut Parser) -> UnaryOp {
    if parser.current_token_kind() == TokenKind::Mut {
        parser.advance();
        UnaryOp::AddressOfMut
    } else {
        UnaryOp::AddressOf
    }
}

pub fn parse_assignment_expr(
    parser: &mut Parser,
    left: ExprId,
    _bp: BindingPower,
) -> Result<ExprId, Error> {
    parser.advance();
    // Right associative.
    let rhs = parse_expr(parser, BindingPower::Default)?;
    let start = start_of(parser, left);

    Ok(add_expr(
        parser,
        ExprKind::Binary {
            op: BinaryOp::Assign,
            lhs: left,
            rhs,
        },
        start,
    ))
}

/// `c ? a : b`. The else branch may itself be a conditional.
pub fn parse_conditional_expr(
    parser: &mut Parser,
    left: ExprId,
    _bp: BindingPower,
) -> Result<ExprId, Error> {
    parser.advance();
    let then_expr = parse_expr(parser, BindingPower::Default)?;
    if parser.current_token_kind() != TokenKind::Colon {
        return Err(parser.unexpected_token_detailed(
            "expected ':' after the first branch of a conditional expression",
        ));
    }
    parser.advance();
    let else_expr = parse_expr(parser, BindingPower::Assignment)?;
    let start = start_of(parser, left);

    Ok(add_expr(
        parser,
        ExprKind::Conditional {
            condition: left,
            then_expr,
            else_expr,
        },
        start,
    ))
}

pub fn parse_force_unwrap_expr(
    parser: &mut Parser,
    left: ExprId,
    _bp: BindingPower,
) -> Result<ExprId, Error> {
    parser.advance();
    let start = start_of(parser, left);
    Ok(add_expr(parser, ExprKind::ForceUnwrap(left), start))
}

/// `()`, `(x)` or `(x, y, ...)`.
pub fn parse_grouping_expr(parser: &mut Parser) -> Result<ExprId, Error> {
    let start = parser.advance().span.start.clone();

    let mut elements = vec![];
    let mut saw_comma = false;
    while parser.current_token_kind() != TokenKind::CloseParen {
        elements.push(parse_expr(parser, BindingPower::Default)?);
        if parser.current_token_kind() != TokenKind::Comma {
            break;
        }
        parser.advance();
        saw_comma = true;
    }
    parser.expect(TokenKind::CloseParen)?;

    let kind = match elements.as_slice() {
        [single] if !saw_comma => ExprKind::Paren(*single),
        [_] => {
            return Err(parser.unexpected_token_detailed(
                "single-element tuples are not allowed, remove the trailing comma",
            ))
        }
        _ => ExprKind::Tuple(elements),
    };
    Ok(add_expr(parser, kind, start))
}

pub fn parse_call_expr(
    parser: &mut Parser,
    left: ExprId,
    _bp: BindingPower,
) -> Result<ExprId, Error> {
    parser.advance();

    let mut args = vec![];
    while parser.current_token_kind() != TokenKind::CloseParen {
        args.push(parse_expr(parser, BindingPower::Default)?);
        if parser.current_token_kind() != TokenKind::Comma {
            break;
        }
        parser.advance();
    }

    parser.expect(TokenKind::CloseParen)?;
    let start = start_of(parser, left);

    Ok(add_expr(parser, ExprKind::Call { callee: left, args }, start))
}

/// `x.name`, `x.0` and `r->0`. The lexer reads `t.0.1` as `t`, `.`, `0.1`,
/// so a float literal after the operator is two member accesses.
pub fn parse_member_expr(
    parser: &mut Parser,
    left: ExprId,
    _bp: BindingPower,
) -> Result<ExprId, Error> {
    let is_arrow = parser.advance().kind == TokenKind::Arrow;
    let start = start_of(parser, left);

    let token = parser.current_token().clone();
    match token.kind {
        TokenKind::Identifier | TokenKind::IntegerLiteral => {
            parser.advance();
            Ok(add_expr(
                parser,
                ExprKind::Member {
                    base: left,
                    member: token.value,
                    is_arrow,
                },
                start,
            ))
        }
        TokenKind::FloatLiteral => {
            parser.advance();
            let (first, second) = token
                .value
                .split_once('.')
                .ok_or_else(|| parser.unexpected_token())?;
            let first_end = Position(
                token.span.start.0 + first.len() as u32,
                Rc::clone(&token.span.start.1),
            );
            let inner = parser.ast.add_expr(Expr::new(
                ExprKind::Member {
                    base: left,
                    member: first.to_string(),
                    is_arrow,
                },
                Span::new(start.clone(), first_end),
            ));
            Ok(add_expr(
                parser,
                ExprKind::Member {
                    base: inner,
                    member: second.to_string(),
                    is_arrow: false,
                },
                start,
            ))
        }
        _ => Err(parser.unexpected_token_detailed("expected a member name")),
    }
}

pub fn parse_cast_expr(
    parser: &mut Parser,
    left: ExprId,
    _bp: BindingPower,
) -> Result<ExprId, Error> {
    parser.advance();
    let to = parse_type(parser)?;
    let start = start_of(parser, left);

    Ok(add_expr(parser, ExprKind::Cast { sub: left, to }, start))
}
