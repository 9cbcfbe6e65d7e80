use mana_ast::{
    AstModule, Decl, DeclKind, EnumDecl, EnumVariant, EnumVariantShape, Field, FuncDecl,
    FuncFlags, GlobalVarDecl, ImplConst, ImplDecl, ImportDecl, Parameter, SourcePos, StructDecl,
    TraitDecl, TraitMethodSig, TypeAliasDecl, TypeName, UseDecl,
};
use mana_lexer::Token;

use crate::ParseError;

use super::Parser;

impl<'a> Parser<'a> {
    pub fn parse_module(&mut self, name: &str) -> Result<AstModule, ParseError> {
        let mut decls = Vec::new();
        while !self.is_at_end() {
            decls.push(self.parse_top_level_decl()?);
        }
        Ok(AstModule::new(name, SourcePos::new(1, 1), decls))
    }

    fn parse_top_level_decl(&mut self) -> Result<Decl, ParseError> {
        let doc = self.take_doc();
        let pos = self.current_pos();
        let is_pub = self.matches(&Token::Pub);

        match self.peek() {
            Some(Token::Import) => Ok(Decl::new(pos, doc, DeclKind::Import(self.parse_import()?))),
            Some(Token::Use) => Ok(Decl::new(
                pos,
                doc,
                DeclKind::Use(self.parse_use(is_pub)?),
            )),
            Some(Token::Struct) => Ok(Decl::new(
                pos,
                doc,
                DeclKind::Struct(self.parse_struct(is_pub)?),
            )),
            Some(Token::Enum) => Ok(Decl::new(
                pos,
                doc,
                DeclKind::Enum(self.parse_enum(is_pub, false)?),
            )),
            Some(Token::Variant) => Ok(Decl::new(
                pos,
                doc,
                DeclKind::Enum(self.parse_enum(is_pub, true)?),
            )),
            Some(Token::Trait) => Ok(Decl::new(
                pos,
                doc,
                DeclKind::Trait(self.parse_trait(is_pub)?),
            )),
            Some(Token::Impl) => Ok(Decl::new(pos, doc, DeclKind::Impl(self.parse_impl()?))),
            Some(Token::Type) => Ok(Decl::new(
                pos,
                doc,
                DeclKind::TypeAlias(self.parse_type_alias(is_pub)?),
            )),
            Some(Token::Let) => Ok(Decl::new(
                pos,
                doc,
                DeclKind::GlobalVar(self.parse_global_var(is_pub)?),
            )),
            Some(Token::Fn)
            | Some(Token::Async)
            | Some(Token::Static)
            | Some(Token::Test)
            | Some(Token::Extern) => Ok(Decl::new(
                pos,
                doc,
                DeclKind::Func(self.parse_func(is_pub)?),
            )),
            other => Err(self.error(format!("expected top-level declaration, found {:?}", other))),
        }
    }

    fn parse_import(&mut self) -> Result<ImportDecl, ParseError> {
        self.expect(Token::Import)?;
        let (name, is_file_import) = match self.peek().cloned() {
            Some(Token::StringLiteral(path)) => {
                self.advance();
                (path, true)
            }
            _ => {
                let mut path = self.expect_ident()?;
                while self.matches(&Token::ColonColon) {
                    path.push_str("::");
                    path.push_str(&self.expect_ident()?);
                }
                (path, false)
            }
        };
        self.expect(Token::Semicolon)?;
        Ok(ImportDecl { name, is_file_import })
    }

    fn parse_use(&mut self, is_pub: bool) -> Result<UseDecl, ParseError> {
        self.expect(Token::Use)?;
        let mut path = vec![self.expect_ident()?];
        let mut selective = None;
        let mut is_glob = false;
        loop {
            if !self.matches(&Token::ColonColon) {
                break;
            }
            if self.matches(&Token::Star) {
                is_glob = true;
                break;
            }
            if self.matches(&Token::LBrace) {
                let mut names = vec![self.expect_ident()?];
                while self.matches(&Token::Comma) {
                    if self.check(&Token::RBrace) {
                        break;
                    }
                    names.push(self.expect_ident()?);
                }
                self.expect(Token::RBrace)?;
                selective = Some(names);
                break;
            }
            path.push(self.expect_ident()?);
        }
        let alias = if self.matches(&Token::As) {
            Some(self.expect_ident()?)
        } else {
            None
        };
        self.expect(Token::Semicolon)?;
        Ok(UseDecl {
            path,
            selective,
            alias,
            is_glob,
            is_pub,
        })
    }

    fn parse_struct(&mut self, is_pub: bool) -> Result<StructDecl, ParseError> {
        self.expect(Token::Struct)?;
        let name = self.expect_ident()?;
        let (generic_params, _constraints) = self.parse_generic_params()?;
        self.expect(Token::LBrace)?;
        let mut fields = Vec::new();
        while !self.check(&Token::RBrace) {
            self.take_doc();
            fields.push(self.parse_field()?);
            if !self.matches(&Token::Comma) {
                break;
            }
        }
        self.expect(Token::RBrace)?;
        Ok(StructDecl {
            name,
            generic_params,
            fields,
            is_pub,
        })
    }

    fn parse_field(&mut self) -> Result<Field, ParseError> {
        let name = self.expect_ident()?;
        self.expect(Token::Colon)?;
        let type_name = self.parse_type_name()?;
        let default = if self.matches(&Token::Eq) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(Field {
            name,
            type_name,
            default,
        })
    }

    fn parse_enum(&mut self, is_pub: bool, declared_as_variant: bool) -> Result<EnumDecl, ParseError> {
        if declared_as_variant {
            self.expect(Token::Variant)?;
        } else {
            self.expect(Token::Enum)?;
        }
        let name = self.expect_ident()?;
        self.expect(Token::LBrace)?;
        let mut variants = Vec::new();
        while !self.check(&Token::RBrace) {
            variants.push(self.parse_enum_variant()?);
            if !self.matches(&Token::Comma) {
                break;
            }
        }
        self.expect(Token::RBrace)?;
        Ok(EnumDecl {
            name,
            variants,
            is_pub,
            declared_as_variant,
        })
    }

    fn parse_enum_variant(&mut self) -> Result<EnumVariant, ParseError> {
        let name = self.expect_ident()?;
        if self.matches(&Token::LParen) {
            let mut types = Vec::new();
            if !self.check(&Token::RParen) {
                loop {
                    types.push(self.parse_type_name()?);
                    if !self.matches(&Token::Comma) {
                        break;
                    }
                }
            }
            self.expect(Token::RParen)?;
            return Ok(EnumVariant {
                name,
                shape: EnumVariantShape::Tuple(types),
            });
        }
        if self.matches(&Token::LBrace) {
            let mut fields = Vec::new();
            while !self.check(&Token::RBrace) {
                fields.push(self.parse_field()?);
                if !self.matches(&Token::Comma) {
                    break;
                }
            }
            self.expect(Token::RBrace)?;
            return Ok(EnumVariant {
                name,
                shape: EnumVariantShape::Struct(fields),
            });
        }
        let discriminant = if self.matches(&Token::Eq) {
            match self.advance() {
                Some(Token::IntLiteral(n)) => Some(n),
                other => return Err(self.error(format!("expected integer discriminant, found {:?}", other))),
            }
        } else {
            None
        };
        Ok(EnumVariant {
            name,
            shape: EnumVariantShape::Unit(discriminant),
        })
    }

    fn parse_trait(&mut self, is_pub: bool) -> Result<TraitDecl, ParseError> {
        self.expect(Token::Trait)?;
        let name = self.expect_ident()?;
        self.expect(Token::LBrace)?;
        let mut associated_types = Vec::new();
        let mut methods = Vec::new();
        while !self.check(&Token::RBrace) {
            self.take_doc();
            if self.matches(&Token::Type) {
                associated_types.push(self.expect_ident()?);
                self.expect(Token::Semicolon)?;
                continue;
            }
            methods.push(self.parse_trait_method_sig()?);
        }
        self.expect(Token::RBrace)?;
        Ok(TraitDecl {
            name,
            associated_types,
            methods,
            is_pub,
        })
    }

    fn parse_trait_method_sig(&mut self) -> Result<TraitMethodSig, ParseError> {
        self.expect(Token::Fn)?;
        let name = self.expect_ident()?;
        self.expect(Token::LParen)?;
        let mut takes_self = false;
        let mut params = Vec::new();
        if !self.check(&Token::RParen) {
            loop {
                if self.check(&Token::SelfLower) && params.is_empty() {
                    self.advance();
                    takes_self = true;
                } else {
                    params.push(self.parse_parameter()?);
                }
                if !self.matches(&Token::Comma) {
                    break;
                }
            }
        }
        self.expect(Token::RParen)?;
        let return_type = if self.matches(&Token::Arrow) {
            Some(self.parse_type_name()?)
        } else {
            None
        };
        let default_body = if self.check(&Token::LBrace) {
            Some(self.parse_block()?)
        } else {
            self.expect(Token::Semicolon)?;
            None
        };
        Ok(TraitMethodSig {
            name,
            params,
            return_type,
            takes_self,
            default_body,
        })
    }

    fn parse_impl(&mut self) -> Result<ImplDecl, ParseError> {
        self.expect(Token::Impl)?;
        let first = self.expect_ident()?;
        let (trait_name, type_name) = if self.matches(&Token::For) {
            let concrete = self.parse_type_name()?;
            (Some(first), concrete)
        } else {
            (None, TypeName::new(first))
        };
        self.expect(Token::LBrace)?;
        let mut associated_type_assignments = Vec::new();
        let mut methods = Vec::new();
        let mut consts = Vec::new();
        while !self.check(&Token::RBrace) {
            self.take_doc();
            if self.matches(&Token::Type) {
                let alias = self.expect_ident()?;
                self.expect(Token::Eq)?;
                let concrete = self.parse_type_name()?;
                self.expect(Token::Semicolon)?;
                associated_type_assignments.push((alias, concrete));
                continue;
            }
            if self.matches(&Token::Const) {
                let name = self.expect_ident()?;
                self.expect(Token::Colon)?;
                let type_name = self.parse_type_name()?;
                self.expect(Token::Eq)?;
                let init = self.parse_expr()?;
                self.expect(Token::Semicolon)?;
                consts.push(ImplConst {
                    name,
                    type_name,
                    init,
                });
                continue;
            }
            let mut method = self.parse_func(false)?;
            method.receiver_type = Some(type_name.clone());
            methods.push(method);
        }
        self.expect(Token::RBrace)?;
        Ok(ImplDecl {
            trait_name,
            type_name,
            associated_type_assignments,
            methods,
            consts,
        })
    }

    fn parse_type_alias(&mut self, is_pub: bool) -> Result<TypeAliasDecl, ParseError> {
        self.expect(Token::Type)?;
        let alias_name = self.expect_ident()?;
        self.expect(Token::Eq)?;
        let target_type = self.parse_type_name()?;
        self.expect(Token::Semicolon)?;
        Ok(TypeAliasDecl {
            alias_name,
            target_type,
            is_pub,
        })
    }

    fn parse_global_var(&mut self, is_pub: bool) -> Result<GlobalVarDecl, ParseError> {
        let var = self.parse_var_binding()?;
        self.expect(Token::Semicolon)?;
        Ok(GlobalVarDecl { var, is_pub })
    }

    fn parse_func(&mut self, is_pub: bool) -> Result<FuncDecl, ParseError> {
        let mut flags = FuncFlags {
            is_pub,
            ..Default::default()
        };
        loop {
            match self.peek() {
                Some(Token::Async) => {
                    flags.is_async = true;
                    self.advance();
                }
                Some(Token::Static) => {
                    flags.is_static = true;
                    self.advance();
                }
                Some(Token::Test) => {
                    flags.is_test = true;
                    self.advance();
                }
                Some(Token::Extern) => {
                    flags.is_extern = true;
                    self.advance();
                }
                _ => break,
            }
        }
        self.expect(Token::Fn)?;
        let first = self.expect_ident()?;
        let (receiver_type, name) = if self.matches(&Token::Dot) {
            (Some(TypeName::new(first)), self.expect_ident()?)
        } else {
            (None, first)
        };
        let (generic_params, mut constraints) = self.parse_generic_params()?;
        self.expect(Token::LParen)?;
        let mut params = Vec::new();
        if !self.check(&Token::RParen) {
            loop {
                if self.check(&Token::SelfLower) && params.is_empty() {
                    self.advance();
                    flags.has_self = true;
                } else {
                    params.push(self.parse_parameter()?);
                }
                if !self.matches(&Token::Comma) {
                    break;
                }
            }
        }
        self.expect(Token::RParen)?;
        let return_type = if self.matches(&Token::Arrow) {
            Some(self.parse_type_name()?)
        } else {
            None
        };
        constraints.extend(self.parse_where_clause()?);
        let body = if flags.is_extern {
            self.expect(Token::Semicolon)?;
            None
        } else {
            Some(self.parse_block()?)
        };
        Ok(FuncDecl {
            name,
            receiver_type,
            generic_params,
            constraints,
            params,
            return_type,
            body,
            flags,
        })
    }

    fn parse_parameter(&mut self) -> Result<Parameter, ParseError> {
        let name = self.expect_ident()?;
        self.expect(Token::Colon)?;
        let type_name = self.parse_type_name()?;
        let default = if self.matches(&Token::Eq) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(Parameter {
            name,
            type_name,
            default,
        })
    }
}
