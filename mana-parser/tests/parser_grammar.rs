use mana_ast::{DeclKind, EnumVariantShape, ExprKind, StmtKind};
use mana_parser::parse;

#[test]
fn parses_struct_with_generics_and_defaults() {
    let source = r#"
        pub struct Pair<T> {
            left: T,
            right: T,
            tag: i32 = 0,
        }
    "#;
    let module = parse(source, "pairs").expect("should parse");
    assert_eq!(module.decls.len(), 1);
    let DeclKind::Struct(s) = &module.decls[0].kind else {
        panic!("expected StructDecl, got {:?}", module.decls[0].kind);
    };
    assert_eq!(s.name, "Pair");
    assert_eq!(s.generic_params, vec!["T".to_string()]);
    assert_eq!(s.fields.len(), 3);
    assert!(s.fields[2].default.is_some());
    assert!(s.is_pub);
}

#[test]
fn parses_enum_with_mixed_variant_shapes() {
    let source = r#"
        pub enum Shape {
            Circle(f64),
            Rectangle { width: f64, height: f64 },
            Empty = 0,
        }
    "#;
    let module = parse(source, "shapes").expect("should parse");
    let DeclKind::Enum(e) = &module.decls[0].kind else {
        panic!("expected EnumDecl");
    };
    assert_eq!(e.variants.len(), 3);
    assert!(matches!(e.variants[0].shape, EnumVariantShape::Tuple(_)));
    assert!(matches!(e.variants[1].shape, EnumVariantShape::Struct(_)));
    assert!(matches!(e.variants[2].shape, EnumVariantShape::Unit(Some(0))));
    assert!(e.has_data_variants());
    assert!(!e.declared_as_variant);
}

#[test]
fn parses_variant_keyword_as_syntactic_enum_alias() {
    let source = "variant Status { Active, Inactive }\n";
    let module = parse(source, "status").expect("should parse");
    let DeclKind::Enum(e) = &module.decls[0].kind else {
        panic!("expected EnumDecl");
    };
    assert!(e.declared_as_variant);
    assert_eq!(e.variants.len(), 2);
}

#[test]
fn parses_trait_with_associated_type_and_default_method() {
    let source = r#"
        pub trait Container {
            type Item;

            fn len(self) -> i32;

            fn is_empty(self) -> bool {
                return self.len() == 0;
            }
        }
    "#;
    let module = parse(source, "container").expect("should parse");
    let DeclKind::Trait(t) = &module.decls[0].kind else {
        panic!("expected TraitDecl");
    };
    assert_eq!(t.associated_types, vec!["Item".to_string()]);
    assert_eq!(t.methods.len(), 2);
    assert!(t.methods[0].takes_self);
    assert!(!t.methods[0].has_default());
    assert!(t.methods[1].has_default());
}

#[test]
fn parses_inherent_and_trait_impls() {
    let source = r#"
        impl Vector2 {
            fn new(x: f64, y: f64) -> Vector2 {
                return Vector2 { x: x, y: y };
            }
        }

        impl Display for Vector2 {
            type Output = string;

            const PRECISION: i32 = 2;

            fn format(self) -> string {
                return "vector";
            }
        }
    "#;
    let module = parse(source, "vectors").expect("should parse");
    assert_eq!(module.decls.len(), 2);

    let DeclKind::Impl(inherent) = &module.decls[0].kind else {
        panic!("expected ImplDecl");
    };
    assert!(!inherent.is_trait_impl());
    assert_eq!(inherent.type_name.as_str(), "Vector2");
    assert_eq!(inherent.methods.len(), 1);
    assert_eq!(inherent.methods[0].receiver_type.as_ref().unwrap().as_str(), "Vector2");

    let DeclKind::Impl(trait_impl) = &module.decls[1].kind else {
        panic!("expected ImplDecl");
    };
    assert!(trait_impl.is_trait_impl());
    assert_eq!(trait_impl.trait_name.as_deref(), Some("Display"));
    assert_eq!(trait_impl.associated_type_assignments.len(), 1);
    assert_eq!(trait_impl.consts.len(), 1);
}

#[test]
fn parses_generic_function_with_where_clause() {
    let source = r#"
        pub fn max<T>(a: T, b: T) -> T where T: Ord {
            if a > b {
                return a;
            }
            return b;
        }
    "#;
    let module = parse(source, "cmp").expect("should parse");
    let DeclKind::Func(f) = &module.decls[0].kind else {
        panic!("expected FuncDecl");
    };
    assert_eq!(f.generic_params, vec!["T".to_string()]);
    assert_eq!(f.constraints.len(), 1);
    assert_eq!(f.constraints[0].type_param, "T");
    assert_eq!(f.constraints[0].traits, vec!["Ord".to_string()]);
    assert!(!f.is_method());
}

#[test]
fn parses_method_with_explicit_receiver_and_flags() {
    let source = "pub async fn Future.poll(self) -> bool { return true; }\n";
    let module = parse(source, "futures").expect("should parse");
    let DeclKind::Func(f) = &module.decls[0].kind else {
        panic!("expected FuncDecl");
    };
    assert!(f.is_method());
    assert_eq!(f.receiver_type.as_ref().unwrap().as_str(), "Future");
    assert!(f.is_instance_method());
    assert!(f.flags.is_async);
    assert!(f.flags.is_pub);
}

#[test]
fn parses_extern_function_with_no_body() {
    let source = "extern fn puts(s: string) -> i32;\n";
    let module = parse(source, "libc").expect("should parse");
    let DeclKind::Func(f) = &module.decls[0].kind else {
        panic!("expected FuncDecl");
    };
    assert!(f.flags.is_extern);
    assert!(f.body.is_none());
}

#[test]
fn parses_use_decl_with_selective_import_and_alias() {
    let source = "use std::collections::{HashMap, HashSet} as collections;\n";
    let module = parse(source, "m").expect("should parse");
    let DeclKind::Use(u) = &module.decls[0].kind else {
        panic!("expected UseDecl");
    };
    assert_eq!(u.path, vec!["std".to_string(), "collections".to_string()]);
    assert_eq!(
        u.selective,
        Some(vec!["HashMap".to_string(), "HashSet".to_string()])
    );
    assert_eq!(u.alias.as_deref(), Some("collections"));
    assert!(!u.is_glob);
}

#[test]
fn parses_pub_use_glob_reexport() {
    let source = "pub use std::io::*;\n";
    let module = parse(source, "m").expect("should parse");
    let DeclKind::Use(u) = &module.decls[0].kind else {
        panic!("expected UseDecl");
    };
    assert!(u.is_glob);
    assert!(u.is_pub);
}

#[test]
fn parses_file_import_with_quoted_path() {
    let source = r#"import "./sibling.mana";"#;
    let module = parse(source, "m").expect("should parse");
    let DeclKind::Import(i) = &module.decls[0].kind else {
        panic!("expected ImportDecl");
    };
    assert!(i.is_file_import);
    assert_eq!(i.name, "./sibling.mana");
}

#[test]
fn parses_bare_module_import() {
    let source = "import std::io;\n";
    let module = parse(source, "m").expect("should parse");
    let DeclKind::Import(i) = &module.decls[0].kind else {
        panic!("expected ImportDecl");
    };
    assert!(!i.is_file_import);
    assert_eq!(i.name, "std::io");
}

#[test]
fn parses_match_expression_with_option_and_enum_patterns() {
    let source = r#"
        pub fn describe(x: Option<i32>) -> string {
            return match x {
                Some(n) if n > 0 => "positive",
                Some(n) => "non-positive",
                None => "nothing",
            };
        }
    "#;
    let module = parse(source, "m").expect("should parse");
    let DeclKind::Func(f) = &module.decls[0].kind else {
        panic!("expected FuncDecl");
    };
    let body = f.body.as_ref().expect("has body");
    let StmtKind::Return(Some(ret)) = &body.statements[0].kind else {
        panic!("expected return statement");
    };
    let ExprKind::Match { arms, .. } = &ret.kind else {
        panic!("expected match expression");
    };
    assert_eq!(arms.len(), 3);
    assert!(arms[0].guard.is_some());
    assert!(matches!(
        arms[0].pattern.kind,
        ExprKind::OptionPattern { is_some: true, .. }
    ));
    assert!(matches!(
        arms[2].pattern.kind,
        ExprKind::OptionPattern { is_some: false, .. }
    ));
}

#[test]
fn parses_closures_ranges_and_try_operator() {
    let source = r#"
        pub fn work() -> i32 {
            let add = |a: i32, b: i32| { return a + b; };
            let slice = 0..10;
            let value = risky()?;
            return add(value, slice.0);
        }
    "#;
    let module = parse(source, "m").expect("should parse");
    let DeclKind::Func(f) = &module.decls[0].kind else {
        panic!("expected FuncDecl");
    };
    let body = f.body.as_ref().expect("has body");
    assert_eq!(body.statements.len(), 4);
    let StmtKind::VarDecl(closure_binding) = &body.statements[0].kind else {
        panic!("expected var decl");
    };
    assert!(matches!(
        closure_binding.init.as_ref().unwrap().kind,
        ExprKind::Closure { .. }
    ));
    let StmtKind::VarDecl(range_binding) = &body.statements[1].kind else {
        panic!("expected var decl");
    };
    assert!(matches!(
        range_binding.init.as_ref().unwrap().kind,
        ExprKind::Range { inclusive: false, .. }
    ));
    let StmtKind::VarDecl(try_binding) = &body.statements[2].kind else {
        panic!("expected var decl");
    };
    assert!(matches!(try_binding.init.as_ref().unwrap().kind, ExprKind::Try(_)));
}

#[test]
fn parses_formatted_string_interpolation() {
    let source = r#"pub fn greet(name: string) -> string { return f"hello {name}!"; }"#;
    let module = parse(source, "m").expect("should parse");
    let DeclKind::Func(f) = &module.decls[0].kind else {
        panic!("expected FuncDecl");
    };
    let body = f.body.as_ref().expect("has body");
    let StmtKind::Return(Some(ret)) = &body.statements[0].kind else {
        panic!("expected return");
    };
    let ExprKind::FormattedString(parts) = &ret.kind else {
        panic!("expected formatted string");
    };
    assert_eq!(parts.len(), 3);
}

#[test]
fn parses_for_loop_and_for_in_loop() {
    let source = r#"
        pub fn sums() -> i32 {
            let mut total = 0;
            for (let mut i = 0; i < 10; i = i + 1) {
                total = total + i;
            }
            for item in items {
                total = total + item;
            }
            return total;
        }
    "#;
    let module = parse(source, "m").expect("should parse");
    let DeclKind::Func(f) = &module.decls[0].kind else {
        panic!("expected FuncDecl");
    };
    let body = f.body.as_ref().expect("has body");
    assert!(matches!(body.statements[1].kind, StmtKind::For { .. }));
    assert!(matches!(body.statements[2].kind, StmtKind::ForIn { .. }));
}

#[test]
fn parses_compound_assignment_as_desugared_binary() {
    let source = "pub fn bump() -> i32 { let mut x = 0; x += 1; return x; }\n";
    let module = parse(source, "m").expect("should parse");
    let DeclKind::Func(f) = &module.decls[0].kind else {
        panic!("expected FuncDecl");
    };
    let body = f.body.as_ref().expect("has body");
    let StmtKind::Assign { value, .. } = &body.statements[1].kind else {
        panic!("expected assignment");
    };
    assert!(matches!(value.kind, ExprKind::Binary { op: mana_ast::BinaryOp::Add, .. }));
}

#[test]
fn struct_literal_is_suppressed_in_condition_position() {
    // `Flag` is capitalized, which is exactly the shape `parse_struct_literal`
    // looks for (`Ident {`). In condition position it must still parse as a
    // bare identifier followed by the `if`'s block, not a struct literal that
    // then chokes trying to read `return` as a field name.
    let source = r#"
        pub fn check(Flag: bool) -> i32 {
            if Flag {
                return 1;
            } else {
                return 0;
            }
        }
    "#;
    let module = parse(source, "m").expect("should parse");
    let DeclKind::Func(f) = &module.decls[0].kind else {
        panic!("expected FuncDecl");
    };
    let body = f.body.as_ref().expect("has body");
    let StmtKind::If { cond, then_branch, else_branch, .. } = &body.statements[0].kind else {
        panic!("expected if statement");
    };
    assert!(matches!(&cond.kind, ExprKind::Identifier(name) if name == "Flag"));
    assert_eq!(then_branch.statements.len(), 1);
    assert!(else_branch.is_some());
}

#[test]
fn doc_comments_attach_to_the_following_declaration() {
    let source = "/// Computes the length.\n/// Always non-negative.\npub fn len() -> i32 { return 0; }\n";
    let module = parse(source, "m").expect("should parse");
    assert_eq!(
        module.decls[0].doc.as_deref(),
        Some("Computes the length.\nAlways non-negative.")
    );
}

#[test]
fn reports_syntax_error_with_line_and_column() {
    let source = "pub fn broken(\n";
    let err = parse(source, "m").expect_err("should fail to parse");
    let message = err.to_string();
    assert!(message.contains('2'), "expected error to point past the unterminated line: {message}");
}
