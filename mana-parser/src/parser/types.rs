use mana_ast::{TraitBoundConstraint, TypeName};
use mana_lexer::Token;

use crate::ParseError;

use super::Parser;

impl<'a> Parser<'a> {
    /// Parses a (possibly dotted, possibly generic) type name into its
    /// opaque textual form, e.g. `Vec<std::io::Handle>`.
    pub(super) fn parse_type_name(&mut self) -> Result<TypeName, ParseError> {
        let mut text = String::new();
        if self.matches(&Token::Amp) {
            text.push('&');
        }
        text.push_str(&self.expect_ident_or_self()?);
        while self.check(&Token::ColonColon) {
            self.advance();
            text.push_str("::");
            text.push_str(&self.expect_ident()?);
        }
        if self.matches(&Token::Lt) {
            text.push('<');
            let mut args = Vec::new();
            loop {
                args.push(self.parse_type_name()?.0);
                if self.matches(&Token::Comma) {
                    continue;
                }
                break;
            }
            self.expect(Token::Gt)?;
            text.push_str(&args.join(", "));
            text.push('>');
        }
        if self.matches(&Token::LBracket) {
            self.expect(Token::RBracket)?;
            text.push_str("[]");
        }
        Ok(TypeName::new(text))
    }

    /// `<T: Trait + Trait2, U>` following a function or struct name.
    pub(super) fn parse_generic_params(
        &mut self,
    ) -> Result<(Vec<String>, Vec<TraitBoundConstraint>), ParseError> {
        let mut names = Vec::new();
        let mut constraints = Vec::new();
        if !self.matches(&Token::Lt) {
            return Ok((names, constraints));
        }
        loop {
            let name = self.expect_ident()?;
            names.push(name.clone());
            if self.matches(&Token::Colon) {
                let traits = self.parse_trait_bound_list()?;
                constraints.push(TraitBoundConstraint {
                    type_param: name,
                    traits,
                });
            }
            if self.matches(&Token::Comma) {
                continue;
            }
            break;
        }
        self.expect(Token::Gt)?;
        Ok((names, constraints))
    }

    fn parse_trait_bound_list(&mut self) -> Result<Vec<String>, ParseError> {
        let mut traits = vec![self.expect_ident()?];
        while self.matches(&Token::Plus) {
            traits.push(self.expect_ident()?);
        }
        Ok(traits)
    }

    /// `where T: Display, U: Clone + Debug`, merged into a function's
    /// existing constraint list by the caller.
    pub(super) fn parse_where_clause(&mut self) -> Result<Vec<TraitBoundConstraint>, ParseError> {
        let mut constraints = Vec::new();
        if !self.matches(&Token::Where) {
            return Ok(constraints);
        }
        loop {
            let type_param = self.expect_ident()?;
            self.expect(Token::Colon)?;
            let traits = self.parse_trait_bound_list()?;
            constraints.push(TraitBoundConstraint { type_param, traits });
            if self.matches(&Token::Comma) {
                continue;
            }
            break;
        }
        Ok(constraints)
    }
}
