//! AST data model for the `.mana` language front-end.
//!
//! The taxonomy is a single closed enumeration of node kinds (see [`NodeKind`]).
//! Rather than storing a `kind` tag alongside each node (which can drift out of
//! sync with the actual payload), every node's kind is *derived* from its Rust
//! enum variant via `node_kind()`. A node whose kind disagrees with its variant
//! is therefore not representable, let alone constructible.

use serde::{Deserialize, Serialize};

/// Source position of a node: 1-based line, 1-based column. `(0, 0)` marks an
/// unknown or synthesized position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourcePos {
    pub line: u32,
    pub column: u32,
}

impl SourcePos {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    pub fn unknown() -> Self {
        Self::default()
    }
}

/// The closed set of AST node kinds. New kinds require a coordinated change
/// across the parser and every walker that matches on this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Module,

    // Declarations
    FuncDecl,
    GlobalVarDecl,
    StructDecl,
    EnumDecl,
    TraitDecl,
    ImplDecl,
    TypeAliasDecl,
    ImportDecl,
    UseDecl,

    // Statements
    Block,
    If,
    While,
    For,
    ForIn,
    Break,
    Continue,
    Defer,
    Assign,
    VarDecl,
    Scope,
    Return,
    ExprStmt,
    Loop,

    // Expressions
    Identifier,
    Literal,
    Call,
    MethodCall,
    Binary,
    Unary,
    Index,
    ArrayLiteral,
    MemberAccess,
    StructLiteral,
    ScopeAccess,
    SelfExpr,
    Match,
    Closure,
    Try,
    OptionalChain,
    NullCoalesce,
    Await,
    Range,
    Tuple,
    TupleIndex,
    FormattedString,
    NoneLiteral,
    OptionPattern,
    EnumPattern,
    Cast,
    IfExpression,
    Slice,
}

/// A bare type name. The loader and AST do not model a type system; this is
/// an opaque string captured verbatim by the parser, resolved by later passes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeName(pub String);

impl TypeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TypeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A function/closure/method parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub type_name: TypeName,
    pub default: Option<Expr>,
}

/// One `where`-style constraint binding a generic parameter to a non-empty
/// set of required traits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitBoundConstraint {
    pub type_param: String,
    pub traits: Vec<String>,
}

// ---------------------------------------------------------------------------
// Module container
// ---------------------------------------------------------------------------

/// A named container of top-level declarations. Owns its declarations;
/// destroyed along with the loader cache that holds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AstModule {
    pub name: String,
    pub pos: SourcePos,
    pub decls: Vec<Decl>,
}

impl AstModule {
    pub fn new(name: impl Into<String>, pos: SourcePos, decls: Vec<Decl>) -> Self {
        Self {
            name: name.into(),
            pos,
            decls,
        }
    }

    pub fn node_kind(&self) -> NodeKind {
        NodeKind::Module
    }
}

// ---------------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FuncFlags {
    pub is_pub: bool,
    pub is_async: bool,
    pub is_static: bool,
    pub is_test: bool,
    pub is_extern: bool,
    pub has_self: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncDecl {
    pub name: String,
    /// Non-empty ⇒ this function is a method on the named type.
    pub receiver_type: Option<TypeName>,
    pub generic_params: Vec<String>,
    pub constraints: Vec<TraitBoundConstraint>,
    pub params: Vec<Parameter>,
    pub return_type: Option<TypeName>,
    /// `None` for `extern` declarations, which have no body.
    pub body: Option<Block>,
    pub flags: FuncFlags,
}

impl FuncDecl {
    /// A non-empty `receiver_type` makes this a method.
    pub fn is_method(&self) -> bool {
        self.receiver_type.is_some()
    }

    /// `is_instance_method` ⇔ `has_self`.
    pub fn is_instance_method(&self) -> bool {
        self.flags.has_self
    }

    pub fn is_generic(&self) -> bool {
        !self.generic_params.is_empty()
    }
}

/// A `let`-style binding, shared between top-level `GlobalVarDecl` and the
/// statement-level `VarDecl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarBinding {
    pub name: String,
    pub type_name: Option<TypeName>,
    pub is_mut: bool,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalVarDecl {
    pub var: VarBinding,
    pub is_pub: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub type_name: TypeName,
    pub default: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructDecl {
    pub name: String,
    pub generic_params: Vec<String>,
    pub fields: Vec<Field>,
    pub is_pub: bool,
}

/// An enum variant's shape. The three forms are mutually exclusive by
/// construction: a variant cannot simultaneously carry a discriminant, a
/// tuple payload, and named fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EnumVariantShape {
    Unit(Option<i64>),
    Tuple(Vec<TypeName>),
    Struct(Vec<Field>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumVariant {
    pub name: String,
    pub shape: EnumVariantShape,
}

impl EnumVariant {
    pub fn has_data(&self) -> bool {
        !matches!(self.shape, EnumVariantShape::Unit(_))
    }

    pub fn is_tuple_variant(&self) -> bool {
        matches!(self.shape, EnumVariantShape::Tuple(_))
    }

    pub fn is_struct_variant(&self) -> bool {
        matches!(self.shape, EnumVariantShape::Struct(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDecl {
    pub name: String,
    pub variants: Vec<EnumVariant>,
    pub is_pub: bool,
    /// Whether the declaration used the `variant` keyword rather than `enum`
    /// (a purely syntactic distinction; the resulting shape is identical).
    pub declared_as_variant: bool,
}

impl EnumDecl {
    pub fn has_data_variants(&self) -> bool {
        self.variants.iter().any(EnumVariant::has_data)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitMethodSig {
    pub name: String,
    pub params: Vec<Parameter>,
    pub return_type: Option<TypeName>,
    pub takes_self: bool,
    pub default_body: Option<Block>,
}

impl TraitMethodSig {
    pub fn has_default(&self) -> bool {
        self.default_body.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitDecl {
    pub name: String,
    pub associated_types: Vec<String>,
    pub methods: Vec<TraitMethodSig>,
    pub is_pub: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImplConst {
    pub name: String,
    pub type_name: TypeName,
    pub init: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImplDecl {
    /// Empty ⇒ inherent impl.
    pub trait_name: Option<String>,
    pub type_name: TypeName,
    pub associated_type_assignments: Vec<(String, TypeName)>,
    pub methods: Vec<FuncDecl>,
    pub consts: Vec<ImplConst>,
}

impl ImplDecl {
    pub fn is_trait_impl(&self) -> bool {
        self.trait_name.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeAliasDecl {
    pub alias_name: String,
    pub target_type: TypeName,
    pub is_pub: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportDecl {
    /// A bare module name, or (when `is_file_import`) a quoted file path.
    pub name: String,
    pub is_file_import: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseDecl {
    pub path: Vec<String>,
    pub selective: Option<Vec<String>>,
    pub alias: Option<String>,
    pub is_glob: bool,
    /// `pub use` — a re-export.
    pub is_pub: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeclKind {
    Func(FuncDecl),
    GlobalVar(GlobalVarDecl),
    Struct(StructDecl),
    Enum(EnumDecl),
    Trait(TraitDecl),
    Impl(ImplDecl),
    TypeAlias(TypeAliasDecl),
    Import(ImportDecl),
    Use(UseDecl),
}

/// A declaration. Every declaration may carry a doc comment; the loader
/// treats its contents as opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decl {
    pub pos: SourcePos,
    pub doc: Option<String>,
    pub kind: DeclKind,
}

impl Decl {
    pub fn new(pos: SourcePos, doc: Option<String>, kind: DeclKind) -> Self {
        Self { pos, doc, kind }
    }

    pub fn node_kind(&self) -> NodeKind {
        match &self.kind {
            DeclKind::Func(_) => NodeKind::FuncDecl,
            DeclKind::GlobalVar(_) => NodeKind::GlobalVarDecl,
            DeclKind::Struct(_) => NodeKind::StructDecl,
            DeclKind::Enum(_) => NodeKind::EnumDecl,
            DeclKind::Trait(_) => NodeKind::TraitDecl,
            DeclKind::Impl(_) => NodeKind::ImplDecl,
            DeclKind::TypeAlias(_) => NodeKind::TypeAliasDecl,
            DeclKind::Import(_) => NodeKind::ImportDecl,
            DeclKind::Use(_) => NodeKind::UseDecl,
        }
    }

    pub fn has_doc(&self) -> bool {
        self.doc.is_some()
    }

    /// The declared name, where the declaration kind has exactly one.
    /// `ImplDecl` has no name of its own (it is keyed by its target type).
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            DeclKind::Func(f) => Some(&f.name),
            DeclKind::GlobalVar(g) => Some(&g.var.name),
            DeclKind::Struct(s) => Some(&s.name),
            DeclKind::Enum(e) => Some(&e.name),
            DeclKind::Trait(t) => Some(&t.name),
            DeclKind::TypeAlias(t) => Some(&t.alias_name),
            DeclKind::Import(i) => Some(&i.name),
            DeclKind::Use(_) | DeclKind::Impl(_) => None,
        }
    }

    /// Whether this declaration is part of its module's public export table.
    pub fn is_public(&self) -> bool {
        match &self.kind {
            DeclKind::Func(f) => f.flags.is_pub,
            DeclKind::GlobalVar(g) => g.is_pub,
            DeclKind::Struct(s) => s.is_pub,
            DeclKind::Enum(e) => e.is_pub,
            DeclKind::Trait(t) => t.is_pub,
            DeclKind::TypeAlias(t) => t.is_pub,
            DeclKind::Use(u) => u.is_pub,
            DeclKind::Import(_) | DeclKind::Impl(_) => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<Stmt>,
}

impl Block {
    pub fn new(statements: Vec<Stmt>) -> Self {
        Self { statements }
    }

    pub fn empty() -> Self {
        Self {
            statements: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    Block(Block),
    If {
        cond: Expr,
        then_branch: Block,
        else_branch: Option<Block>,
    },
    While {
        cond: Expr,
        body: Block,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        post: Option<Box<Stmt>>,
        body: Block,
    },
    ForIn {
        binding: String,
        iterable: Expr,
        body: Block,
    },
    Break,
    Continue,
    Defer(Expr),
    Assign {
        target: Expr,
        value: Expr,
    },
    VarDecl(VarBinding),
    /// An explicit nested scope (a bare `{ ... }` used as a statement).
    Scope(Block),
    Return(Option<Expr>),
    ExprStmt(Expr),
    Loop(Block),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    pub pos: SourcePos,
    pub kind: StmtKind,
}

impl Stmt {
    pub fn new(pos: SourcePos, kind: StmtKind) -> Self {
        Self { pos, kind }
    }

    pub fn node_kind(&self) -> NodeKind {
        match &self.kind {
            StmtKind::Block(_) => NodeKind::Block,
            StmtKind::If { .. } => NodeKind::If,
            StmtKind::While { .. } => NodeKind::While,
            StmtKind::For { .. } => NodeKind::For,
            StmtKind::ForIn { .. } => NodeKind::ForIn,
            StmtKind::Break => NodeKind::Break,
            StmtKind::Continue => NodeKind::Continue,
            StmtKind::Defer(_) => NodeKind::Defer,
            StmtKind::Assign { .. } => NodeKind::Assign,
            StmtKind::VarDecl(_) => NodeKind::VarDecl,
            StmtKind::Scope(_) => NodeKind::Scope,
            StmtKind::Return(_) => NodeKind::Return,
            StmtKind::ExprStmt(_) => NodeKind::ExprStmt,
            StmtKind::Loop(_) => NodeKind::Loop,
        }
    }
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Not,
    BitNot,
    Ref,
    Deref,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FStringPart {
    Text(String),
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchArm {
    /// The pattern is itself an expression (e.g. an `OptionPattern` or
    /// `EnumPattern` node); the language does not define a separate pattern
    /// grammar from its expression grammar.
    pub pattern: Expr,
    pub guard: Option<Expr>,
    pub body: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    Identifier(String),
    Literal(Literal),
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    MethodCall {
        receiver: Box<Expr>,
        method: String,
        args: Vec<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    ArrayLiteral(Vec<Expr>),
    MemberAccess {
        base: Box<Expr>,
        field: String,
    },
    StructLiteral {
        type_name: TypeName,
        fields: Vec<(String, Expr)>,
    },
    ScopeAccess(Vec<String>),
    SelfExpr,
    Match {
        scrutinee: Box<Expr>,
        arms: Vec<MatchArm>,
    },
    Closure {
        params: Vec<Parameter>,
        body: Box<Block>,
    },
    Try(Box<Expr>),
    OptionalChain(Box<Expr>),
    NullCoalesce {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Await(Box<Expr>),
    Range {
        start: Option<Box<Expr>>,
        end: Option<Box<Expr>>,
        inclusive: bool,
    },
    Tuple(Vec<Expr>),
    TupleIndex {
        base: Box<Expr>,
        index: u32,
    },
    FormattedString(Vec<FStringPart>),
    NoneLiteral,
    OptionPattern {
        is_some: bool,
        inner: Option<Box<Expr>>,
    },
    EnumPattern {
        path: Vec<String>,
        fields: Vec<Expr>,
    },
    Cast {
        expr: Box<Expr>,
        target_type: TypeName,
    },
    IfExpression {
        cond: Box<Expr>,
        then_branch: Box<Block>,
        else_branch: Option<Box<Block>>,
    },
    Slice {
        base: Box<Expr>,
        start: Option<Box<Expr>>,
        end: Option<Box<Expr>>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    pub pos: SourcePos,
    pub kind: ExprKind,
}

impl Expr {
    pub fn new(pos: SourcePos, kind: ExprKind) -> Self {
        Self { pos, kind }
    }

    pub fn node_kind(&self) -> NodeKind {
        match &self.kind {
            ExprKind::Identifier(_) => NodeKind::Identifier,
            ExprKind::Literal(_) => NodeKind::Literal,
            ExprKind::Call { .. } => NodeKind::Call,
            ExprKind::MethodCall { .. } => NodeKind::MethodCall,
            ExprKind::Binary { .. } => NodeKind::Binary,
            ExprKind::Unary { .. } => NodeKind::Unary,
            ExprKind::Index { .. } => NodeKind::Index,
            ExprKind::ArrayLiteral(_) => NodeKind::ArrayLiteral,
            ExprKind::MemberAccess { .. } => NodeKind::MemberAccess,
            ExprKind::StructLiteral { .. } => NodeKind::StructLiteral,
            ExprKind::ScopeAccess(_) => NodeKind::ScopeAccess,
            ExprKind::SelfExpr => NodeKind::SelfExpr,
            ExprKind::Match { .. } => NodeKind::Match,
            ExprKind::Closure { .. } => NodeKind::Closure,
            ExprKind::Try(_) => NodeKind::Try,
            ExprKind::OptionalChain(_) => NodeKind::OptionalChain,
            ExprKind::NullCoalesce { .. } => NodeKind::NullCoalesce,
            ExprKind::Await(_) => NodeKind::Await,
            ExprKind::Range { .. } => NodeKind::Range,
            ExprKind::Tuple(_) => NodeKind::Tuple,
            ExprKind::TupleIndex { .. } => NodeKind::TupleIndex,
            ExprKind::FormattedString(_) => NodeKind::FormattedString,
            ExprKind::NoneLiteral => NodeKind::NoneLiteral,
            ExprKind::OptionPattern { .. } => NodeKind::OptionPattern,
            ExprKind::EnumPattern { .. } => NodeKind::EnumPattern,
            ExprKind::Cast { .. } => NodeKind::Cast,
            ExprKind::IfExpression { .. } => NodeKind::IfExpression,
            ExprKind::Slice { .. } => NodeKind::Slice,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos() -> SourcePos {
        SourcePos::new(1, 1)
    }

    #[test]
    fn node_kind_matches_decl_variant() {
        let d = Decl::new(
            pos(),
            None,
            DeclKind::Func(FuncDecl {
                name: "f".into(),
                receiver_type: None,
                generic_params: vec![],
                constraints: vec![],
                params: vec![],
                return_type: None,
                body: Some(Block::empty()),
                flags: FuncFlags::default(),
            }),
        );
        assert_eq!(d.node_kind(), NodeKind::FuncDecl);
    }

    #[test]
    fn method_vs_instance_method() {
        let mut flags = FuncFlags::default();
        flags.has_self = true;
        let f = FuncDecl {
            name: "len".into(),
            receiver_type: Some(TypeName::new("Vector2")),
            generic_params: vec![],
            constraints: vec![],
            params: vec![],
            return_type: Some(TypeName::new("f64")),
            body: Some(Block::empty()),
            flags,
        };
        assert!(f.is_method());
        assert_eq!(f.is_instance_method(), f.flags.has_self);
    }

    #[test]
    fn enum_variant_shapes_are_mutually_exclusive() {
        let unit = EnumVariant {
            name: "None".into(),
            shape: EnumVariantShape::Unit(None),
        };
        let tuple = EnumVariant {
            name: "Some".into(),
            shape: EnumVariantShape::Tuple(vec![TypeName::new("T")]),
        };
        let structured = EnumVariant {
            name: "Point".into(),
            shape: EnumVariantShape::Struct(vec![Field {
                name: "x".into(),
                type_name: TypeName::new("f64"),
                default: None,
            }]),
        };
        assert!(!unit.has_data());
        assert!(tuple.is_tuple_variant() && !tuple.is_struct_variant());
        assert!(structured.is_struct_variant() && !structured.is_tuple_variant());
    }

    #[test]
    fn public_predicate_by_decl_kind() {
        let import = Decl::new(
            pos(),
            None,
            DeclKind::Import(ImportDecl {
                name: "std::io".into(),
                is_file_import: false,
            }),
        );
        assert!(!import.is_public());

        let alias = Decl::new(
            pos(),
            None,
            DeclKind::TypeAlias(TypeAliasDecl {
                alias_name: "Id".into(),
                target_type: TypeName::new("i64"),
                is_pub: true,
            }),
        );
        assert!(alias.is_public());
    }

    #[test]
    fn doc_comment_round_trips() {
        let d = Decl::new(
            pos(),
            Some("computes the thing".into()),
            DeclKind::TypeAlias(TypeAliasDecl {
                alias_name: "Id".into(),
                target_type: TypeName::new("i64"),
                is_pub: false,
            }),
        );
        assert!(d.has_doc());
        assert_eq!(d.doc.as_deref(), Some("computes the thing"));
    }

    #[test]
    fn serialization_round_trips() {
        let module = AstModule::new(
            "a",
            pos(),
            vec![Decl::new(
                pos(),
                None,
                DeclKind::Struct(StructDecl {
                    name: "V".into(),
                    generic_params: vec![],
                    fields: vec![],
                    is_pub: true,
                }),
            )],
        );
        let json = serde_json::to_string(&module).expect("serialize module");
        let back: AstModule = serde_json::from_str(&json).expect("deserialize module");
        assert_eq!(module, back);
    }
}
