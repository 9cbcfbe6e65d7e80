use mana_ast::{
    BinaryOp, Block, Expr, ExprKind, FStringPart, Literal, MatchArm, Parameter, TypeName, UnaryOp,
};
use mana_lexer::Token;

use crate::ParseError;

use super::Parser;

impl<'a> Parser<'a> {
    pub(super) fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_null_coalesce()
    }

    fn parse_null_coalesce(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_range()?;
        while self.check(&Token::QuestionQuestion) {
            let pos = self.current_pos();
            self.advance();
            let right = self.parse_range()?;
            left = Expr::new(
                pos,
                ExprKind::NullCoalesce {
                    left: Box::new(left),
                    right: Box::new(right),
                },
            );
        }
        Ok(left)
    }

    fn parse_range(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_or()?;
        if self.check(&Token::DotDot) || self.check(&Token::DotDotEq) {
            let pos = self.current_pos();
            let inclusive = self.check(&Token::DotDotEq);
            self.advance();
            let end = if self.at_expr_start() {
                Some(Box::new(self.parse_or()?))
            } else {
                None
            };
            return Ok(Expr::new(
                pos,
                ExprKind::Range {
                    start: Some(Box::new(left)),
                    end,
                    inclusive,
                },
            ));
        }
        Ok(left)
    }

    fn at_expr_start(&self) -> bool {
        !matches!(
            self.peek(),
            None | Some(Token::Semicolon)
                | Some(Token::RParen)
                | Some(Token::RBracket)
                | Some(Token::RBrace)
                | Some(Token::Comma)
        )
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_left(Self::parse_and, &[(Token::OrOr, BinaryOp::Or)])
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_left(Self::parse_bit_or, &[(Token::AndAnd, BinaryOp::And)])
    }

    fn parse_bit_or(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_left(Self::parse_bit_xor, &[(Token::Pipe, BinaryOp::BitOr)])
    }

    fn parse_bit_xor(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_left(Self::parse_bit_and, &[(Token::Caret, BinaryOp::BitXor)])
    }

    fn parse_bit_and(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_left(Self::parse_equality, &[(Token::Amp, BinaryOp::BitAnd)])
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_left(
            Self::parse_relational,
            &[(Token::EqEq, BinaryOp::Eq), (Token::NotEq, BinaryOp::NotEq)],
        )
    }

    fn parse_relational(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_left(
            Self::parse_shift,
            &[
                (Token::Lt, BinaryOp::Lt),
                (Token::Gt, BinaryOp::Gt),
                (Token::LtEq, BinaryOp::Le),
                (Token::GtEq, BinaryOp::Ge),
            ],
        )
    }

    fn parse_shift(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_left(
            Self::parse_additive,
            &[(Token::Shl, BinaryOp::Shl), (Token::Shr, BinaryOp::Shr)],
        )
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_left(
            Self::parse_multiplicative,
            &[(Token::Plus, BinaryOp::Add), (Token::Minus, BinaryOp::Sub)],
        )
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_left(
            Self::parse_cast,
            &[
                (Token::Star, BinaryOp::Mul),
                (Token::Slash, BinaryOp::Div),
                (Token::Percent, BinaryOp::Mod),
            ],
        )
    }

    /// Shared left-associative binary-operator loop: `next(); while op
    /// matches one of `ops`, consume it and fold in `next()` again.`
    fn parse_binary_left(
        &mut self,
        next: fn(&mut Self) -> Result<Expr, ParseError>,
        ops: &[(Token, BinaryOp)],
    ) -> Result<Expr, ParseError> {
        let mut left = next(self)?;
        'outer: loop {
            for (tok, op) in ops {
                if self.check(tok) {
                    let pos = self.current_pos();
                    self.advance();
                    let right = next(self)?;
                    left = Expr::new(
                        pos,
                        ExprKind::Binary {
                            op: *op,
                            left: Box::new(left),
                            right: Box::new(right),
                        },
                    );
                    continue 'outer;
                }
            }
            break;
        }
        Ok(left)
    }

    fn parse_cast(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_unary()?;
        while self.matches(&Token::As) {
            let pos = expr.pos;
            let target_type = self.parse_type_name()?;
            expr = Expr::new(
                pos,
                ExprKind::Cast {
                    expr: Box::new(expr),
                    target_type,
                },
            );
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let pos = self.current_pos();
        let op = match self.peek() {
            Some(Token::Minus) => Some(UnaryOp::Neg),
            Some(Token::Bang) => Some(UnaryOp::Not),
            Some(Token::Tilde) => Some(UnaryOp::BitNot),
            Some(Token::Amp) => Some(UnaryOp::Ref),
            Some(Token::Star) => Some(UnaryOp::Deref),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr::new(
                pos,
                ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
            ));
        }
        if self.matches(&Token::Await) {
            let operand = self.parse_unary()?;
            return Ok(Expr::new(pos, ExprKind::Await(Box::new(operand))));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.matches(&Token::Dot) {
                let pos = self.current_pos();
                if let Some(Token::IntLiteral(_)) = self.peek() {
                    let index = match self.advance() {
                        Some(Token::IntLiteral(n)) => n as u32,
                        _ => unreachable!(),
                    };
                    expr = Expr::new(
                        pos,
                        ExprKind::TupleIndex {
                            base: Box::new(expr),
                            index,
                        },
                    );
                    continue;
                }
                let name = self.expect_ident()?;
                if self.check(&Token::LParen) {
                    let args = self.parse_call_args()?;
                    expr = Expr::new(
                        pos,
                        ExprKind::MethodCall {
                            receiver: Box::new(expr),
                            method: name,
                            args,
                        },
                    );
                } else {
                    expr = Expr::new(
                        pos,
                        ExprKind::MemberAccess {
                            base: Box::new(expr),
                            field: name,
                        },
                    );
                }
                continue;
            }
            if self.matches(&Token::QuestionDot) {
                let pos = self.current_pos();
                let field = self.expect_ident()?;
                let access = Expr::new(
                    pos,
                    ExprKind::MemberAccess {
                        base: Box::new(expr),
                        field,
                    },
                );
                expr = Expr::new(pos, ExprKind::OptionalChain(Box::new(access)));
                continue;
            }
            if self.matches(&Token::Question) {
                let pos = expr.pos;
                expr = Expr::new(pos, ExprKind::Try(Box::new(expr)));
                continue;
            }
            if self.check(&Token::LParen) {
                let pos = expr.pos;
                let args = self.parse_call_args()?;
                expr = Expr::new(
                    pos,
                    ExprKind::Call {
                        callee: Box::new(expr),
                        args,
                    },
                );
                continue;
            }
            if self.matches(&Token::LBracket) {
                let pos = expr.pos;
                expr = self.parse_index_or_slice(expr, pos)?;
                continue;
            }
            break;
        }
        Ok(expr)
    }

    fn parse_index_or_slice(
        &mut self,
        base: Expr,
        pos: mana_ast::SourcePos,
    ) -> Result<Expr, ParseError> {
        let start = if self.check(&Token::DotDot) || self.check(&Token::DotDotEq) {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };
        if self.matches(&Token::DotDot) || self.matches(&Token::DotDotEq) {
            let end = if self.check(&Token::RBracket) {
                None
            } else {
                Some(Box::new(self.parse_expr()?))
            };
            self.expect(Token::RBracket)?;
            return Ok(Expr::new(
                pos,
                ExprKind::Slice {
                    base: Box::new(base),
                    start,
                    end,
                },
            ));
        }
        self.expect(Token::RBracket)?;
        Ok(Expr::new(
            pos,
            ExprKind::Index {
                base: Box::new(base),
                index: start.ok_or_else(|| self.error("expected index expression"))?,
            },
        ))
    }

    fn parse_call_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.expect(Token::LParen)?;
        let mut args = Vec::new();
        if !self.check(&Token::RParen) {
            loop {
                args.push(self.parse_expr()?);
                if self.matches(&Token::Comma) {
                    continue;
                }
                break;
            }
        }
        self.expect(Token::RParen)?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let pos = self.current_pos();
        match self.peek().cloned() {
            Some(Token::IntLiteral(n)) => {
                self.advance();
                Ok(Expr::new(pos, ExprKind::Literal(Literal::Int(n))))
            }
            Some(Token::FloatLiteral(f)) => {
                self.advance();
                Ok(Expr::new(pos, ExprKind::Literal(Literal::Float(f))))
            }
            Some(Token::StringLiteral(s)) => {
                self.advance();
                Ok(Expr::new(pos, ExprKind::Literal(Literal::Str(s))))
            }
            Some(Token::FStringLiteral(s)) => {
                self.advance();
                Ok(Expr::new(pos, ExprKind::FormattedString(split_fstring(&s))))
            }
            Some(Token::True) => {
                self.advance();
                Ok(Expr::new(pos, ExprKind::Literal(Literal::Bool(true))))
            }
            Some(Token::False) => {
                self.advance();
                Ok(Expr::new(pos, ExprKind::Literal(Literal::Bool(false))))
            }
            Some(Token::None) => {
                self.advance();
                Ok(Expr::new(pos, ExprKind::NoneLiteral))
            }
            Some(Token::SelfLower) => {
                self.advance();
                Ok(Expr::new(pos, ExprKind::SelfExpr))
            }
            Some(Token::LParen) => {
                self.advance();
                if self.matches(&Token::RParen) {
                    return Ok(Expr::new(pos, ExprKind::Tuple(vec![])));
                }
                let first = self.parse_expr()?;
                if self.matches(&Token::Comma) {
                    let mut items = vec![first];
                    if !self.check(&Token::RParen) {
                        loop {
                            items.push(self.parse_expr()?);
                            if self.matches(&Token::Comma) {
                                continue;
                            }
                            break;
                        }
                    }
                    self.expect(Token::RParen)?;
                    Ok(Expr::new(pos, ExprKind::Tuple(items)))
                } else {
                    self.expect(Token::RParen)?;
                    Ok(first)
                }
            }
            Some(Token::LBracket) => {
                self.advance();
                let mut items = Vec::new();
                if !self.check(&Token::RBracket) {
                    loop {
                        items.push(self.parse_expr()?);
                        if self.matches(&Token::Comma) {
                            continue;
                        }
                        break;
                    }
                }
                self.expect(Token::RBracket)?;
                Ok(Expr::new(pos, ExprKind::ArrayLiteral(items)))
            }
            Some(Token::Pipe) => self.parse_closure(),
            Some(Token::Match) => self.parse_match_expr(),
            Some(Token::If) => self.parse_if_expr(),
            Some(Token::Ident(_)) => self.parse_ident_led_primary(pos),
            other => Err(self.error(format!("expected expression, found {:?}", other))),
        }
    }

    fn parse_ident_led_primary(&mut self, pos: mana_ast::SourcePos) -> Result<Expr, ParseError> {
        let first = self.expect_ident()?;
        if self.check(&Token::ColonColon) {
            let mut path = vec![first];
            while self.matches(&Token::ColonColon) {
                path.push(self.expect_ident()?);
            }
            if self.check(&Token::LParen) {
                let args = self.parse_call_args()?;
                return Ok(Expr::new(
                    pos,
                    ExprKind::EnumPattern {
                        path: path.clone(),
                        fields: args,
                    },
                ));
            }
            return Ok(Expr::new(pos, ExprKind::ScopeAccess(path)));
        }
        if self.allow_struct_literal && first.starts_with(char::is_uppercase) {
            if let Some(Token::LBrace) = self.peek() {
                return self.parse_struct_literal(pos, first);
            }
        }
        Ok(Expr::new(pos, ExprKind::Identifier(first)))
    }

    fn parse_struct_literal(
        &mut self,
        pos: mana_ast::SourcePos,
        name: String,
    ) -> Result<Expr, ParseError> {
        self.expect(Token::LBrace)?;
        let mut fields = Vec::new();
        if !self.check(&Token::RBrace) {
            loop {
                let field_name = self.expect_ident()?;
                self.expect(Token::Colon)?;
                let value = self.parse_expr()?;
                fields.push((field_name, value));
                if self.matches(&Token::Comma) {
                    continue;
                }
                break;
            }
        }
        self.expect(Token::RBrace)?;
        Ok(Expr::new(
            pos,
            ExprKind::StructLiteral {
                type_name: TypeName::new(name),
                fields,
            },
        ))
    }

    fn parse_closure(&mut self) -> Result<Expr, ParseError> {
        let pos = self.current_pos();
        self.expect(Token::Pipe)?;
        let mut params = Vec::new();
        if !self.check(&Token::Pipe) {
            loop {
                let name = self.expect_ident()?;
                let type_name = if self.matches(&Token::Colon) {
                    self.parse_type_name()?
                } else {
                    TypeName::new("_")
                };
                params.push(Parameter {
                    name,
                    type_name,
                    default: None,
                });
                if self.matches(&Token::Comma) {
                    continue;
                }
                break;
            }
        }
        self.expect(Token::Pipe)?;
        let body = self.parse_block()?;
        Ok(Expr::new(
            pos,
            ExprKind::Closure {
                params,
                body: Box::new(body),
            },
        ))
    }

    fn parse_match_expr(&mut self) -> Result<Expr, ParseError> {
        let pos = self.current_pos();
        self.expect(Token::Match)?;
        let scrutinee = Box::new(self.with_struct_literal_disabled(Self::parse_expr)?);
        self.expect(Token::LBrace)?;
        let mut arms = Vec::new();
        while !self.check(&Token::RBrace) {
            let pattern = self.parse_pattern()?;
            let guard = if self.matches(&Token::If) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            self.expect(Token::FatArrow)?;
            let body = self.parse_expr()?;
            arms.push(MatchArm {
                pattern,
                guard,
                body,
            });
            if !self.matches(&Token::Comma) && !self.check(&Token::RBrace) {
                break;
            }
        }
        self.expect(Token::RBrace)?;
        Ok(Expr::new(pos, ExprKind::Match { scrutinee, arms }))
    }

    fn parse_pattern(&mut self) -> Result<Expr, ParseError> {
        let pos = self.current_pos();
        match self.peek().cloned() {
            Some(Token::Underscore) => {
                self.advance();
                Ok(Expr::new(pos, ExprKind::Identifier("_".into())))
            }
            Some(Token::None) => {
                self.advance();
                Ok(Expr::new(pos, ExprKind::NoneLiteral))
            }
            Some(Token::IntLiteral(n)) => {
                self.advance();
                Ok(Expr::new(pos, ExprKind::Literal(Literal::Int(n))))
            }
            Some(Token::StringLiteral(s)) => {
                self.advance();
                Ok(Expr::new(pos, ExprKind::Literal(Literal::Str(s))))
            }
            Some(Token::True) => {
                self.advance();
                Ok(Expr::new(pos, ExprKind::Literal(Literal::Bool(true))))
            }
            Some(Token::False) => {
                self.advance();
                Ok(Expr::new(pos, ExprKind::Literal(Literal::Bool(false))))
            }
            Some(Token::Ident(name)) if name == "Some" => {
                self.advance();
                self.expect(Token::LParen)?;
                let inner = self.parse_pattern()?;
                self.expect(Token::RParen)?;
                Ok(Expr::new(
                    pos,
                    ExprKind::OptionPattern {
                        is_some: true,
                        inner: Some(Box::new(inner)),
                    },
                ))
            }
            Some(Token::Ident(name)) if name == "None" => {
                self.advance();
                Ok(Expr::new(
                    pos,
                    ExprKind::OptionPattern {
                        is_some: false,
                        inner: None,
                    },
                ))
            }
            Some(Token::Ident(_)) => {
                let first = self.expect_ident()?;
                if self.check(&Token::ColonColon) {
                    let mut path = vec![first];
                    while self.matches(&Token::ColonColon) {
                        path.push(self.expect_ident()?);
                    }
                    let fields = if self.matches(&Token::LParen) {
                        let mut fields = Vec::new();
                        if !self.check(&Token::RParen) {
                            loop {
                                fields.push(self.parse_pattern()?);
                                if self.matches(&Token::Comma) {
                                    continue;
                                }
                                break;
                            }
                        }
                        self.expect(Token::RParen)?;
                        fields
                    } else {
                        Vec::new()
                    };
                    Ok(Expr::new(pos, ExprKind::EnumPattern { path, fields }))
                } else {
                    Ok(Expr::new(pos, ExprKind::Identifier(first)))
                }
            }
            other => Err(self.error(format!("expected pattern, found {:?}", other))),
        }
    }

    /// Shared by statement- and expression-position `if`.
    pub(super) fn parse_if_common(
        &mut self,
    ) -> Result<(Expr, Block, Option<Block>), ParseError> {
        self.expect(Token::If)?;
        let cond = self.with_struct_literal_disabled(Self::parse_expr)?;
        let then_branch = self.parse_block()?;
        let else_branch = if self.matches(&Token::Else) {
            if self.check(&Token::If) {
                let (c, t, e) = self.parse_if_common()?;
                let mut stmts = Vec::new();
                let inner_pos = self.current_pos();
                stmts.push(mana_ast::Stmt::new(
                    inner_pos,
                    mana_ast::StmtKind::If {
                        cond: c,
                        then_branch: t,
                        else_branch: e,
                    },
                ));
                Some(Block::new(stmts))
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };
        Ok((cond, then_branch, else_branch))
    }

    fn parse_if_expr(&mut self) -> Result<Expr, ParseError> {
        let pos = self.current_pos();
        let (cond, then_branch, else_branch) = self.parse_if_common()?;
        Ok(Expr::new(
            pos,
            ExprKind::IfExpression {
                cond: Box::new(cond),
                then_branch: Box::new(then_branch),
                else_branch: else_branch.map(Box::new),
            },
        ))
    }

    pub(super) fn with_struct_literal_disabled<T>(
        &mut self,
        f: fn(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let prev = self.allow_struct_literal;
        self.allow_struct_literal = false;
        let result = f(self);
        self.allow_struct_literal = prev;
        result
    }
}

/// Splits a decoded f-string body into literal text and `{identifier}`
/// interpolation parts. Only bare identifiers are supported as interpolated
/// expressions; this mirrors the external, opaque status of full expression
/// interpolation for this front-end.
fn split_fstring(body: &str) -> Vec<FStringPart> {
    let mut parts = Vec::new();
    let mut rest = body;
    let mut text = String::new();
    while let Some(open) = rest.find('{') {
        text.push_str(&rest[..open]);
        rest = &rest[open + 1..];
        if let Some(close) = rest.find('}') {
            if !text.is_empty() {
                parts.push(FStringPart::Text(std::mem::take(&mut text)));
            }
            let ident = rest[..close].trim().to_string();
            parts.push(FStringPart::Expr(Expr::new(
                mana_ast::SourcePos::unknown(),
                ExprKind::Identifier(ident),
            )));
            rest = &rest[close + 1..];
        } else {
            text.push('{');
            text.push_str(rest);
            rest = "";
            break;
        }
    }
    text.push_str(rest);
    if !text.is_empty() || parts.is_empty() {
        parts.push(FStringPart::Text(text));
    }
    parts
}
