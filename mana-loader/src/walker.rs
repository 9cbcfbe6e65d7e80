//! AST walker (spec.md §4.5): one visitor hook per top-level declaration
//! kind, plus a [`DocWalker`] consumer that groups a module's public API
//! by kind for documentation generation.

use mana_ast::{AstModule, DeclKind, EnumDecl, FuncDecl, StructDecl, TraitDecl, TypeAliasDecl};

/// One hook per declaration kind a module can contain. `ImplDecl` and
/// `UseDecl`/`ImportDecl` are intentionally excluded: they carry no
/// independent public surface of their own to visit (impls attach to a
/// type that is visited separately; imports are module wiring, not a
/// declaration).
pub trait DeclVisitor {
    fn visit_func(&mut self, _decl: &FuncDecl) {}
    fn visit_struct(&mut self, _decl: &StructDecl) {}
    fn visit_enum(&mut self, _decl: &EnumDecl) {}
    fn visit_trait(&mut self, _decl: &TraitDecl) {}
    fn visit_type_alias(&mut self, _decl: &TypeAliasDecl) {}
}

/// Dispatches each of `module`'s declarations to the matching visitor hook,
/// in source order.
pub fn walk_module(module: &AstModule, visitor: &mut dyn DeclVisitor) {
    for decl in &module.decls {
        match &decl.kind {
            DeclKind::Func(f) => visitor.visit_func(f),
            DeclKind::Struct(s) => visitor.visit_struct(s),
            DeclKind::Enum(e) => visitor.visit_enum(e),
            DeclKind::Trait(t) => visitor.visit_trait(t),
            DeclKind::TypeAlias(t) => visitor.visit_type_alias(t),
            DeclKind::GlobalVar(_) | DeclKind::Impl(_) | DeclKind::Import(_) | DeclKind::Use(_) => {}
        }
    }
}

/// One documented declaration, ready for rendering.
#[derive(Debug, Clone)]
pub struct DocEntry {
    pub name: String,
    pub doc: Option<String>,
    pub signature: String,
}

/// Groups a module's public declarations by kind, in the fixed order type
/// aliases, structs, enums, traits, functions — preserving source order
/// within each group.
#[derive(Debug, Default)]
pub struct DocWalker {
    pub type_aliases: Vec<DocEntry>,
    pub structs: Vec<DocEntry>,
    pub enums: Vec<DocEntry>,
    pub traits: Vec<DocEntry>,
    pub functions: Vec<DocEntry>,
}

impl DocWalker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walks `module` and collects its public declarations, grouped and
    /// ordered for documentation output.
    pub fn collect(module: &AstModule) -> Self {
        let mut walker = Self::new();
        for decl in &module.decls {
            if !decl.is_public() {
                continue;
            }
            match &decl.kind {
                DeclKind::TypeAlias(t) => walker.visit_type_alias(t),
                DeclKind::Struct(s) => walker.visit_struct(s),
                DeclKind::Enum(e) => walker.visit_enum(e),
                DeclKind::Trait(t) => walker.visit_trait(t),
                DeclKind::Func(f) => walker.visit_func(f),
                DeclKind::GlobalVar(_) | DeclKind::Impl(_) | DeclKind::Import(_) | DeclKind::Use(_) => {}
            }
            if let Some(doc) = &decl.doc {
                walker.attach_doc(decl.name(), doc);
            }
        }
        walker
    }

    /// Renders the collected entries as Markdown, in the fixed group order,
    /// mirroring `original_source/backend-cpp/DocGenerator.cpp`'s section
    /// headings.
    pub fn to_markdown(&self, module_name: &str) -> String {
        let mut out = String::new();
        out.push_str(&format!("# Module `{module_name}`\n\n"));
        Self::render_section(&mut out, "Type Aliases", &self.type_aliases);
        Self::render_section(&mut out, "Structs", &self.structs);
        Self::render_section(&mut out, "Enums", &self.enums);
        Self::render_section(&mut out, "Traits", &self.traits);
        Self::render_section(&mut out, "Functions", &self.functions);
        out
    }

    fn render_section(out: &mut String, title: &str, entries: &[DocEntry]) {
        if entries.is_empty() {
            return;
        }
        out.push_str(&format!("## {title}\n\n"));
        for entry in entries {
            out.push_str(&format!("### `{}`\n\n", entry.name));
            out.push_str(&format!("```\n{}\n```\n\n", entry.signature));
            if let Some(doc) = &entry.doc {
                out.push_str(doc);
                out.push_str("\n\n");
            }
        }
    }

    fn attach_doc(&mut self, name: Option<&str>, doc: &str) {
        let Some(name) = name else { return };
        for entry in self
            .type_aliases
            .iter_mut()
            .chain(self.structs.iter_mut())
            .chain(self.enums.iter_mut())
            .chain(self.traits.iter_mut())
            .chain(self.functions.iter_mut())
        {
            if entry.name == name && entry.doc.is_none() {
                entry.doc = Some(doc.to_string());
            }
        }
    }
}

fn func_signature(f: &FuncDecl) -> String {
    let params = f
        .params
        .iter()
        .map(|p| format!("{}: {}", p.name, p.type_name))
        .collect::<Vec<_>>()
        .join(", ");
    match &f.return_type {
        Some(ret) => format!("fn {}({params}) -> {ret}", f.name),
        None => format!("fn {}({params})", f.name),
    }
}

impl DeclVisitor for DocWalker {
    fn visit_func(&mut self, decl: &FuncDecl) {
        self.functions.push(DocEntry {
            name: decl.name.clone(),
            doc: None,
            signature: func_signature(decl),
        });
    }

    fn visit_struct(&mut self, decl: &StructDecl) {
        self.structs.push(DocEntry {
            name: decl.name.clone(),
            doc: None,
            signature: format!("struct {}", decl.name),
        });
    }

    fn visit_enum(&mut self, decl: &EnumDecl) {
        self.enums.push(DocEntry {
            name: decl.name.clone(),
            doc: None,
            signature: format!("enum {}", decl.name),
        });
    }

    fn visit_trait(&mut self, decl: &TraitDecl) {
        self.traits.push(DocEntry {
            name: decl.name.clone(),
            doc: None,
            signature: format!("trait {}", decl.name),
        });
    }

    fn visit_type_alias(&mut self, decl: &TypeAliasDecl) {
        self.type_aliases.push(DocEntry {
            name: decl.alias_name.clone(),
            doc: None,
            signature: format!("type {} = {}", decl.alias_name, decl.target_type),
        });
    }
}
