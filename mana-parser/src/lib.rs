//! Recursive-descent parser turning a `.mana` token stream into an `AstModule`.
//!
//! This crate is the loader's other external collaborator: `parse(tokens) ->
//! AstModule | parse-error`. It has no knowledge of module resolution, caching,
//! or cycle detection — those live in `mana-loader`.

use mana_ast::AstModule;
use thiserror::Error;

mod parser;
pub use parser::Parser;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("{line}:{column}: {message}")]
    SyntaxError {
        line: u32,
        column: u32,
        message: String,
    },
    #[error("lexer error: {0}")]
    LexerError(String),
}

/// Parses the full contents of a module's source text.
///
/// `module_name` becomes the resulting [`AstModule`]'s name; the loader is
/// the one that knows what a module's canonical name should be, so it is
/// threaded in rather than guessed here.
pub fn parse(source: &str, module_name: &str) -> Result<AstModule, ParseError> {
    let mut parser = Parser::new(source)?;
    parser.parse_module(module_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_happy_path_function() {
        let module = parse("pub fn f() -> i32 { return 0; }", "a").expect("should parse");
        assert_eq!(module.decls.len(), 1);
    }
}
