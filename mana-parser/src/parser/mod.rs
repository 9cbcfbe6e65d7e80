use mana_ast::SourcePos;
use mana_lexer::{LexError, Token, TokenSpan};

use crate::ParseError;

mod expressions;
mod items;
mod statements;
mod types;

/// Hand-written recursive-descent parser over an eagerly-lexed token stream.
pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<TokenSpan>,
    current: usize,
    /// Disabled while parsing an `if`/`while`/`for` condition, so that `Ident {`
    /// is read as the start of a block rather than a struct literal.
    allow_struct_literal: bool,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Result<Self, ParseError> {
        let tokens = mana_lexer::tokenize(source).map_err(|e: LexError| match e {
            LexError::InvalidToken(start, _end) => {
                let pos = Self::pos_at(source, start);
                ParseError::LexerError(format!("invalid token at {}:{}", pos.line, pos.column))
            }
        })?;
        Ok(Self {
            source,
            tokens,
            current: 0,
            allow_struct_literal: true,
        })
    }

    fn pos_at(source: &str, byte_offset: usize) -> SourcePos {
        let mut line = 1u32;
        let mut column = 1u32;
        for ch in source[..byte_offset.min(source.len())].chars() {
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        SourcePos::new(line, column)
    }

    fn current_pos(&self) -> SourcePos {
        match self.tokens.get(self.current) {
            Some(t) => Self::pos_at(self.source, t.span.start),
            None => Self::pos_at(self.source, self.source.len()),
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.current).map(|t| &t.token)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.current).map(|t| t.token.clone());
        if tok.is_some() {
            self.current += 1;
        }
        tok
    }

    /// Checks the next token's *kind*, ignoring any payload it carries.
    fn check(&self, expected: &Token) -> bool {
        self.peek()
            .map(|t| std::mem::discriminant(t) == std::mem::discriminant(expected))
            .unwrap_or(false)
    }

    fn matches(&mut self, expected: &Token) -> bool {
        if self.check(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        let pos = self.current_pos();
        ParseError::SyntaxError {
            line: pos.line,
            column: pos.column,
            message: message.into(),
        }
    }

    fn expect(&mut self, expected: Token) -> Result<Token, ParseError> {
        if self.check(&expected) {
            Ok(self.advance().expect("checked above"))
        } else {
            Err(self.error(format!("expected {:?}, found {:?}", expected, self.peek())))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.peek() {
            Some(Token::Ident(_)) => match self.advance() {
                Some(Token::Ident(name)) => Ok(name),
                _ => unreachable!(),
            },
            other => Err(self.error(format!("expected identifier, found {:?}", other))),
        }
    }

    /// Like `expect_ident`, but also accepts `Self` as a type-position name.
    fn expect_ident_or_self(&mut self) -> Result<String, ParseError> {
        if self.matches(&Token::SelfUpper) {
            return Ok("Self".to_string());
        }
        self.expect_ident()
    }

    /// Consumes any run of leading `///` doc-comment tokens, joining their
    /// text with newlines. Returns `None` if there were none.
    fn take_doc(&mut self) -> Option<String> {
        let mut lines = Vec::new();
        while let Some(Token::DocComment(_)) = self.peek() {
            if let Some(Token::DocComment(text)) = self.advance() {
                lines.push(text);
            }
        }
        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }
}
