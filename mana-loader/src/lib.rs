//! Module loading and symbol resolution for `.mana` sources.
//!
//! This crate is the front-end's core: given a module path or a file on
//! disk, it locates the source, hands it to [`mana_parser`], builds the
//! module's export table, and recursively resolves its dependencies,
//! caching everything and rejecting import cycles.

mod config;
mod loader;
mod paths;
mod symbol;
mod walker;

pub use config::LoaderConfig;
pub use loader::{LoadError, LoadedModule, Loader};
pub use paths::{
    is_valid_module_path, join_module_path, module_name, parent_module, split_module_path,
};
pub use symbol::{Symbol, SymbolKind, TypeRef};
pub use walker::{DeclVisitor, DocEntry, DocWalker, walk_module};
