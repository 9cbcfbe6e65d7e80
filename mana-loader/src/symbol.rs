//! The symbol table (spec.md §3/§4.3): a per-module mapping from exported
//! name to its [`Symbol`], built by walking a module's top-level
//! declarations once parsing succeeds.

use std::collections::HashMap;

use mana_ast::{AstModule, Decl, DeclKind, NodeKind};

/// What kind of declaration a [`Symbol`] names. Mirrors the subset of
/// [`NodeKind`] that can be a top-level public declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Function,
    Struct,
    Enum,
    Trait,
    TypeAlias,
    Variable,
}

/// A minimal reference to a symbol's type, resolved no further than
/// "is this a struct or an enum" — full type resolution is out of this
/// crate's scope (spec.md Non-goals).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Named(String),
    Unknown,
}

/// One exported declaration. `source_module` is always the module that
/// declared it directly; re-exports (`pub use`) are not materialized into
/// new symbols (see DESIGN.md).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub type_ref: TypeRef,
    pub is_public: bool,
    pub source_module: String,
}

fn type_ref_for_decl(kind: &DeclKind) -> TypeRef {
    match kind {
        // Functions and type aliases are left unresolved here (spec.md §4.3:
        // "unknown for functions and type aliases") — filled in by a later
        // analysis pass, same as `original_source/frontend/ModuleLoader.cpp`'s
        // `register_exports` (`Type::unknown()` at both call sites).
        DeclKind::Func(_) => TypeRef::Unknown,
        DeclKind::TypeAlias(_) => TypeRef::Unknown,
        DeclKind::GlobalVar(g) => g
            .var
            .type_name
            .as_ref()
            .map(|t| TypeRef::Named(t.0.clone()))
            .unwrap_or(TypeRef::Unknown),
        DeclKind::Struct(s) => TypeRef::Named(s.name.clone()),
        DeclKind::Enum(e) => TypeRef::Named(e.name.clone()),
        DeclKind::Trait(t) => TypeRef::Named(t.name.clone()),
        DeclKind::Impl(_) | DeclKind::Import(_) | DeclKind::Use(_) => TypeRef::Unknown,
    }
}

fn symbol_kind_for_decl(kind: &DeclKind) -> Option<SymbolKind> {
    match kind {
        DeclKind::Func(_) => Some(SymbolKind::Function),
        DeclKind::GlobalVar(_) => Some(SymbolKind::Variable),
        DeclKind::Struct(_) => Some(SymbolKind::Struct),
        DeclKind::Enum(_) => Some(SymbolKind::Enum),
        DeclKind::Trait(_) => Some(SymbolKind::Trait),
        DeclKind::TypeAlias(_) => Some(SymbolKind::TypeAlias),
        DeclKind::Impl(_) | DeclKind::Import(_) | DeclKind::Use(_) => None,
    }
}

/// Outcome of registering one module's exports: the symbols that won, plus
/// the names that collided (for the caller to report as diagnostics).
pub struct ExportRegistration {
    pub exports: HashMap<String, Symbol>,
    pub duplicates: Vec<String>,
}

/// Walks `module`'s top-level declarations and builds its export table
/// (spec.md §4.3: "for each declaration whose `is_public` predicate is
/// true", first declaration of a given name wins, later ones are reported
/// as duplicates rather than overwriting).
pub fn register_exports(module: &AstModule) -> ExportRegistration {
    let mut exports = HashMap::new();
    let mut duplicates = Vec::new();

    for decl in &module.decls {
        if !decl.is_public() {
            continue;
        }
        let Some(name) = decl_export_name(decl) else {
            continue;
        };
        let Some(kind) = symbol_kind_for_decl(&decl.kind) else {
            continue;
        };
        if exports.contains_key(&name) {
            duplicates.push(name);
            continue;
        }
        exports.insert(
            name.clone(),
            Symbol {
                name,
                kind,
                type_ref: type_ref_for_decl(&decl.kind),
                is_public: true,
                source_module: module.name.clone(),
            },
        );
    }

    ExportRegistration { exports, duplicates }
}

fn decl_export_name(decl: &Decl) -> Option<String> {
    match decl.node_kind() {
        NodeKind::Import | NodeKind::Use => None,
        _ => decl.name().map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mana_parser::parse;

    #[test]
    fn public_struct_and_function_are_exported() {
        let source = r#"
            pub struct Point {
                x: i32,
                y: i32,
            }

            fn helper() {}

            pub fn make_origin() -> Point {
                return Point { x: 0, y: 0 };
            }
        "#;
        let module = parse(source, "geo").expect("parses");
        let registration = register_exports(&module);
        assert!(registration.duplicates.is_empty());
        assert_eq!(
            registration.exports.get("Point").map(|s| s.kind),
            Some(SymbolKind::Struct)
        );
        assert_eq!(
            registration.exports.get("make_origin").map(|s| s.kind),
            Some(SymbolKind::Function)
        );
        assert!(!registration.exports.contains_key("helper"));
    }

    #[test]
    fn public_global_var_exports_as_variable() {
        let source = "pub let count: i32 = 0;\n";
        let module = parse(source, "counters").expect("parses");
        let registration = register_exports(&module);
        assert_eq!(
            registration.exports.get("count").map(|s| s.kind),
            Some(SymbolKind::Variable)
        );
    }

    #[test]
    fn duplicate_public_names_are_reported_and_first_wins() {
        let source = r#"
            pub fn conflict() -> i32 { return 1; }
            pub struct conflict { field: i32 }
        "#;
        let module = parse(source, "dup").expect("parses");
        let registration = register_exports(&module);
        assert_eq!(registration.duplicates, vec!["conflict".to_string()]);
        assert_eq!(
            registration.exports.get("conflict").map(|s| s.kind),
            Some(SymbolKind::Function)
        );
    }
}
