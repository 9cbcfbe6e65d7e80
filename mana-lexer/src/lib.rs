//! Tokenizer for `.mana` source text.
//!
//! This crate is a collaborator of the loader, not its concern: the loader
//! only ever calls [`Lexer::new`] and drains the iterator. Token shapes here
//! exist to let the parser build the AST defined in `mana-ast`.

use logos::Logos;
use std::ops::Range;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//(?:[^/\n][^\n]*)?")]
#[logos(skip r"/\*([^*]|\*[^/])*\*/")]
pub enum Token {
    // Keywords
    #[token("pub")]
    Pub,
    #[token("fn")]
    Fn,
    #[token("struct")]
    Struct,
    #[token("enum")]
    Enum,
    #[token("variant")]
    Variant,
    #[token("trait")]
    Trait,
    #[token("impl")]
    Impl,
    #[token("for")]
    For,
    #[token("in")]
    In,
    #[token("type")]
    Type,
    #[token("import")]
    Import,
    #[token("use")]
    Use,
    #[token("as")]
    As,
    #[token("let")]
    Let,
    #[token("mut")]
    Mut,
    #[token("const")]
    Const,
    #[token("static")]
    Static,
    #[token("extern")]
    Extern,
    #[token("async")]
    Async,
    #[token("await")]
    Await,
    #[token("test")]
    Test,
    #[token("where")]
    Where,
    #[token("return")]
    Return,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("loop")]
    Loop,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("defer")]
    Defer,
    #[token("match")]
    Match,
    #[token("self")]
    SelfLower,
    #[token("Self")]
    SelfUpper,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("none")]
    None,

    // Literals
    #[regex(r"///[^\n]*", |lex| lex.slice()[3..].trim().to_string())]
    DocComment(String),
    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    FloatLiteral(f64),
    #[regex(r"[0-9][0-9_]*", |lex| lex.slice().replace('_', "").parse::<i64>().ok())]
    IntLiteral(i64),
    #[regex(r#""([^"\\]|\\.)*""#, |lex| unescape_string(lex.slice()))]
    StringLiteral(String),
    #[regex(r#"f"([^"\\]|\\.)*""#, |lex| unescape_string(&lex.slice()[1..]))]
    FStringLiteral(String),
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    // Punctuation & operators
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token("::")]
    ColonColon,
    #[token(":")]
    Colon,
    #[token("->")]
    Arrow,
    #[token("=>")]
    FatArrow,
    #[token("..=")]
    DotDotEq,
    #[token("..")]
    DotDot,
    #[token("?.")]
    QuestionDot,
    #[token("??")]
    QuestionQuestion,
    #[token(".")]
    Dot,
    #[token("?")]
    Question,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("=")]
    Eq,
    #[token("_")]
    Underscore,
}

fn unescape_string(raw: &str) -> Option<String> {
    let inner = raw.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            '"' => out.push('"'),
            '\\' => out.push('\\'),
            '0' => out.push('\0'),
            'u' => {
                let hex: String = chars.by_ref().take(4).collect();
                let code = u32::from_str_radix(&hex, 16).ok()?;
                out.push(char::from_u32(code)?);
            }
            other => out.push(other),
        }
    }
    Some(out)
}

/// A token paired with its byte range in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenSpan {
    pub token: Token,
    pub span: Range<usize>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LexError {
    #[error("invalid token at byte offset {0}..{1}")]
    InvalidToken(usize, usize),
}

/// Tokenizes `.mana` source text. `tokenize(text) -> token stream` in the
/// vocabulary the loader and parser share.
pub struct Lexer<'source> {
    inner: logos::Lexer<'source, Token>,
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source str) -> Self {
        Self {
            inner: Token::lexer(source),
        }
    }
}

impl<'source> Iterator for Lexer<'source> {
    type Item = Result<TokenSpan, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.inner.next()?;
        let span = self.inner.span();
        match result {
            Ok(token) => Some(Ok(TokenSpan { token, span })),
            Err(()) => Some(Err(LexError::InvalidToken(span.start, span.end))),
        }
    }
}

/// Tokenizes the whole input eagerly, failing on the first invalid token.
pub fn tokenize(source: &str) -> Result<Vec<TokenSpan>, LexError> {
    Lexer::new(source).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source)
            .expect("source should lex")
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn keywords_and_punctuation() {
        let tokens = kinds("pub fn f() -> i32 { }");
        assert_eq!(
            tokens,
            vec![
                Token::Pub,
                Token::Fn,
                Token::Ident("f".into()),
                Token::LParen,
                Token::RParen,
                Token::Arrow,
                Token::Ident("i32".into()),
                Token::LBrace,
                Token::RBrace,
            ]
        );
    }

    #[test]
    fn int_and_float_literals() {
        let tokens = kinds("42 3.14 1_000");
        assert_eq!(
            tokens,
            vec![
                Token::IntLiteral(42),
                Token::FloatLiteral(3.14),
                Token::IntLiteral(1000),
            ]
        );
    }

    #[test]
    fn string_literal_with_escapes() {
        let tokens = kinds(r#""line\nbreak""#);
        assert_eq!(tokens, vec![Token::StringLiteral("line\nbreak".into())]);
    }

    #[test]
    fn formatted_string_literal() {
        let tokens = kinds(r#"f"hi {name}""#);
        assert_eq!(tokens, vec![Token::FStringLiteral("hi {name}".into())]);
    }

    #[test]
    fn module_path_operator() {
        let tokens = kinds("std::io::file");
        assert_eq!(
            tokens,
            vec![
                Token::Ident("std".into()),
                Token::ColonColon,
                Token::Ident("io".into()),
                Token::ColonColon,
                Token::Ident("file".into()),
            ]
        );
    }

    #[test]
    fn doc_comment_is_captured() {
        let tokens = kinds("/// does the thing\nfn f() {}");
        assert_eq!(tokens[0], Token::DocComment("does the thing".into()));
    }

    #[test]
    fn line_and_block_comments_are_skipped() {
        let tokens = kinds("// leading\nfn f() {} /* trailing */");
        assert_eq!(tokens[0], Token::Fn);
    }

    #[test]
    fn invalid_token_is_reported() {
        let err = tokenize("fn f() { $ }").unwrap_err();
        assert!(matches!(err, LexError::InvalidToken(_, _)));
    }
}
