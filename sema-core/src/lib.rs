//! Sema Core - Fundamental types
//!
//! This crate provides the types shared by the extension framework, the
//! bundled plugins and the analysis host:
//! - `ExtensionPointName`, `AnnotationFqn`, `SessionId`: identity values
//! - `Declaration`, `Expression`: the minimal IR checkers inspect
//! - `Diagnostic`: checker findings
//! - `ExtensionError`: configuration and factory failures

mod name;
mod ir;
mod diagnostic;
mod error;

pub use name::{ExtensionPointName, AnnotationFqn, SessionId};
pub use ir::{
    Annotated, ResolvedAnnotation, Module, SourceFile,
    Declaration, DeclarationKind, Expression, ExpressionKind,
};
pub use diagnostic::{Diagnostic, Severity};
pub use error::{ExtensionError, codes};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Annotated, AnnotationFqn, Declaration, DeclarationKind, Diagnostic,
        Expression, ExpressionKind, ExtensionError, ExtensionPointName,
        ResolvedAnnotation, SessionId, Severity,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    mod name_tests {
        use super::*;

        #[test]
        fn test_static_and_owned_point_names_are_equal() {
            let owned = ExtensionPointName::new("ExtensionCheckers");
            assert_eq!(owned, ExtensionPointName::ADDITIONAL_CHECKERS);

            let mut set = std::collections::HashSet::new();
            set.insert(ExtensionPointName::ADDITIONAL_CHECKERS);
            assert!(set.contains(&owned));
        }

        #[test]
        fn test_annotation_short_name() {
            assert_eq!(AnnotationFqn::new("lang.annotation.Deprecated").short_name(), "Deprecated");
            assert_eq!(AnnotationFqn::new("Foo").short_name(), "Foo");
        }

        #[test]
        fn test_session_ids_are_unique() {
            let a = SessionId::next();
            let b = SessionId::next();
            assert_ne!(a, b);
            assert!(b.get() > a.get());
        }
    }

    mod ir_tests {
        use super::*;

        #[test]
        fn test_annotated_lookup() {
            let decl = Declaration::function("run")
                .with_annotation(ResolvedAnnotation::new("app.Marker").with_meta("lang.RequiresOptIn"));

            assert!(decl.has_annotation(&AnnotationFqn::new("app.Marker")));
            assert!(!decl.has_annotation(&AnnotationFqn::new("lang.RequiresOptIn")));

            let marker = decl.find_annotation(&AnnotationFqn::new("app.Marker")).unwrap();
            assert!(marker.is_meta_annotated_with(&AnnotationFqn::new("lang.RequiresOptIn")));
        }

        #[test]
        fn test_call_builders_ignore_non_calls() {
            let lit = Expression::literal("1").with_argument(Expression::literal("2"));
            assert!(lit.children().is_empty());

            let call = Expression::call("f")
                .with_argument(Expression::literal("1"))
                .with_argument(Expression::call("g"));
            assert_eq!(call.children().len(), 2);
            assert_eq!(call.describe(), "f()");
        }

        #[test]
        fn test_module_from_json() {
            let json = r#"{
                "name": "demo",
                "files": [{
                    "path": "src/a.kt",
                    "declarations": [{
                        "name": "Widget",
                        "kind": "class",
                        "annotations": [{ "fqn": "lang.Deprecated" }],
                        "members": [{
                            "name": "render",
                            "kind": "function",
                            "body": [
                                { "kind": "call", "callee": "draw",
                                  "callee_annotations": [{ "fqn": "lang.Pure" }] },
                                { "kind": "property_access", "property": "size" }
                            ]
                        }]
                    }]
                }]
            }"#;
            let module: Module = serde_json::from_str(json).unwrap();
            let widget = &module.files[0].declarations[0];
            assert_eq!(widget.kind, DeclarationKind::Class);
            assert!(widget.has_annotation(&AnnotationFqn::new("lang.Deprecated")));

            let render = &widget.members[0];
            assert_eq!(render.body.len(), 2);
            match &render.body[0].kind {
                ExpressionKind::Call { callee, callee_annotations, .. } => {
                    assert_eq!(callee, "draw");
                    assert_eq!(callee_annotations[0].fqn.as_str(), "lang.Pure");
                }
                other => panic!("expected call, got {:?}", other),
            }
        }
    }

    mod error_tests {
        use super::*;

        #[test]
        fn test_codes_and_root_cause() {
            let err = ExtensionError::FactoryFailed {
                point: ExtensionPointName::ADDITIONAL_CHECKERS,
                factory: "naming".to_string(),
                source: Box::new(ExtensionError::EmptyFilter),
            };
            assert_eq!(err.code(), codes::FACTORY_FAILED);
            assert_eq!(err.root_cause().code(), codes::EMPTY_FILTER);
            assert!(err.is_configuration());

            let plugin = ExtensionError::plugin("purity", "index unavailable");
            assert!(!plugin.is_configuration());
            assert_eq!(plugin.to_string(), "plugin `purity`: index unavailable");
        }

        #[test]
        fn test_diagnostic_display() {
            let d = Diagnostic::warning("NAMING_CLASS", "class name should start uppercase")
                .in_file("src/a.kt")
                .on_element("widget");
            assert_eq!(
                d.to_string(),
                "src/a.kt: warning [NAMING_CLASS] class name should start uppercase (at widget)"
            );
            assert!(!d.is_error());
        }
    }
}
