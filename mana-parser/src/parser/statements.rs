use mana_ast::{BinaryOp, Block, Stmt, StmtKind, VarBinding};
use mana_lexer::Token;

use crate::ParseError;

use super::Parser;

impl<'a> Parser<'a> {
    pub(super) fn parse_block(&mut self) -> Result<Block, ParseError> {
        self.expect(Token::LBrace)?;
        let mut statements = Vec::new();
        while !self.check(&Token::RBrace) {
            statements.push(self.parse_statement()?);
        }
        self.expect(Token::RBrace)?;
        Ok(Block::new(statements))
    }

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.current_pos();
        match self.peek() {
            Some(Token::LBrace) => Ok(Stmt::new(pos, StmtKind::Scope(self.parse_block()?))),
            Some(Token::Let) => self.parse_var_decl_stmt(pos),
            Some(Token::Return) => {
                self.advance();
                let value = if self.check(&Token::Semicolon) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.expect(Token::Semicolon)?;
                Ok(Stmt::new(pos, StmtKind::Return(value)))
            }
            Some(Token::Break) => {
                self.advance();
                self.expect(Token::Semicolon)?;
                Ok(Stmt::new(pos, StmtKind::Break))
            }
            Some(Token::Continue) => {
                self.advance();
                self.expect(Token::Semicolon)?;
                Ok(Stmt::new(pos, StmtKind::Continue))
            }
            Some(Token::Defer) => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(Token::Semicolon)?;
                Ok(Stmt::new(pos, StmtKind::Defer(expr)))
            }
            Some(Token::If) => {
                let (cond, then_branch, else_branch) = self.parse_if_common()?;
                Ok(Stmt::new(
                    pos,
                    StmtKind::If {
                        cond,
                        then_branch,
                        else_branch,
                    },
                ))
            }
            Some(Token::While) => {
                self.advance();
                let cond = self.with_struct_literal_disabled(Self::parse_expr)?;
                let body = self.parse_block()?;
                Ok(Stmt::new(pos, StmtKind::While { cond, body }))
            }
            Some(Token::Loop) => {
                self.advance();
                let body = self.parse_block()?;
                Ok(Stmt::new(pos, StmtKind::Loop(body)))
            }
            Some(Token::For) => self.parse_for_stmt(pos),
            _ => self.parse_assign_or_expr_stmt(pos),
        }
    }

    fn parse_var_decl_stmt(&mut self, pos: mana_ast::SourcePos) -> Result<Stmt, ParseError> {
        let binding = self.parse_var_binding()?;
        self.expect(Token::Semicolon)?;
        Ok(Stmt::new(pos, StmtKind::VarDecl(binding)))
    }

    pub(super) fn parse_var_binding(&mut self) -> Result<VarBinding, ParseError> {
        self.expect(Token::Let)?;
        let is_mut = self.matches(&Token::Mut);
        let name = self.expect_ident()?;
        let type_name = if self.matches(&Token::Colon) {
            Some(self.parse_type_name()?)
        } else {
            None
        };
        let init = if self.matches(&Token::Eq) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(VarBinding {
            name,
            type_name,
            is_mut,
            init,
        })
    }

    fn parse_for_stmt(&mut self, pos: mana_ast::SourcePos) -> Result<Stmt, ParseError> {
        self.expect(Token::For)?;
        // Disambiguate `for x in iterable { }` from `for (init; cond; post) { }`.
        if self.check(&Token::LParen) {
            self.advance();
            let init = if self.check(&Token::Semicolon) {
                None
            } else {
                Some(Box::new(self.parse_for_clause_stmt()?))
            };
            self.expect(Token::Semicolon)?;
            let cond = if self.check(&Token::Semicolon) {
                None
            } else {
                Some(self.parse_expr()?)
            };
            self.expect(Token::Semicolon)?;
            let post = if self.check(&Token::RParen) {
                None
            } else {
                Some(Box::new(self.parse_for_clause_stmt()?))
            };
            self.expect(Token::RParen)?;
            let body = self.parse_block()?;
            return Ok(Stmt::new(
                pos,
                StmtKind::For {
                    init,
                    cond,
                    post,
                    body,
                },
            ));
        }
        let binding = self.expect_ident()?;
        self.expect(Token::In)?;
        let iterable = self.with_struct_literal_disabled(Self::parse_expr)?;
        let body = self.parse_block()?;
        Ok(Stmt::new(
            pos,
            StmtKind::ForIn {
                binding,
                iterable,
                body,
            },
        ))
    }

    /// A bare statement usable inside a classic `for (...; ...; ...)` header:
    /// either a `let` binding or an assignment/expression, with no trailing
    /// semicolon consumed by the callee (the header supplies the separators).
    fn parse_for_clause_stmt(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.current_pos();
        if self.check(&Token::Let) {
            let binding = self.parse_var_binding()?;
            return Ok(Stmt::new(pos, StmtKind::VarDecl(binding)));
        }
        let target = self.parse_expr()?;
        if self.matches(&Token::Eq) {
            let value = self.parse_expr()?;
            return Ok(Stmt::new(pos, StmtKind::Assign { target, value }));
        }
        Ok(Stmt::new(pos, StmtKind::ExprStmt(target)))
    }

    fn parse_assign_or_expr_stmt(&mut self, pos: mana_ast::SourcePos) -> Result<Stmt, ParseError> {
        let target = self.parse_expr()?;
        let compound = match self.peek() {
            Some(Token::PlusEq) => Some(BinaryOp::Add),
            Some(Token::MinusEq) => Some(BinaryOp::Sub),
            Some(Token::StarEq) => Some(BinaryOp::Mul),
            Some(Token::SlashEq) => Some(BinaryOp::Div),
            Some(Token::PercentEq) => Some(BinaryOp::Mod),
            _ => None,
        };
        if let Some(op) = compound {
            self.advance();
            let rhs = self.parse_expr()?;
            self.expect(Token::Semicolon)?;
            let value = mana_ast::Expr::new(
                pos,
                mana_ast::ExprKind::Binary {
                    op,
                    left: Box::new(target.clone()),
                    right: Box::new(rhs),
                },
            );
            return Ok(Stmt::new(pos, StmtKind::Assign { target, value }));
        }
        if self.matches(&Token::Eq) {
            let value = self.parse_expr()?;
            self.expect(Token::Semicolon)?;
            return Ok(Stmt::new(pos, StmtKind::Assign { target, value }));
        }
        self.expect(Token::Semicolon)?;
        Ok(Stmt::new(pos, StmtKind::ExprStmt(target)))
    }
}
