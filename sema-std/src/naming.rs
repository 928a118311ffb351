//! Naming conventions

use crate::codes;
use sema_plugin::prelude::*;

pub struct NamingPlugin;

pub struct ClassNameChecker;
pub struct FunctionNameChecker;

fn starts_with(name: &str, upper: bool) -> bool {
    match name.chars().find(|c| *c != '_') {
        Some(c) if upper => c.is_uppercase(),
        Some(c) => c.is_lowercase(),
        None => true,
    }
}

impl DeclarationChecker for ClassNameChecker {
    fn name(&self) -> &str {
        "naming.class"
    }

    fn check(&self, declaration: &Declaration, ctx: &mut CheckerContext<'_>) {
        if !starts_with(&declaration.name, true) {
            ctx.report(Diagnostic::warning(
                codes::NAMING_CLASS,
                format!("class name `{}` should start with an uppercase letter", declaration.name),
            ));
        }
    }
}

impl DeclarationChecker for FunctionNameChecker {
    fn name(&self) -> &str {
        "naming.function"
    }

    fn check(&self, declaration: &Declaration, ctx: &mut CheckerContext<'_>) {
        if !starts_with(&declaration.name, false) {
            ctx.report(Diagnostic::warning(
                codes::NAMING_FUNCTION,
                format!("function name `{}` should start with a lowercase letter", declaration.name),
            ));
        }
    }
}

impl ExtensionFactory for NamingPlugin {
    fn meta(&self) -> FactoryMeta {
        FactoryMeta {
            name: "naming",
            description: "Class and function naming conventions",
        }
    }

    fn create(&self, session: &Session) -> Result<Extension, ExtensionError> {
        let checkers = CheckerSet::new(
            DeclarationCheckers::new()
                .with_class(ClassNameChecker)
                .with_function(FunctionNameChecker),
            ExpressionCheckers::new(),
        );
        Ok(Extension::additional_checkers(session, checkers))
    }
}
