//! Calls to deprecated declarations

use crate::{annotations, codes};
use sema_plugin::prelude::*;

pub struct DeprecationPlugin;

pub struct DeprecatedCallChecker {
    deprecated: AnnotationFqn,
}

impl DeprecatedCallChecker {
    pub fn new() -> Self {
        Self { deprecated: AnnotationFqn::new(annotations::DEPRECATED) }
    }
}

impl Default for DeprecatedCallChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpressionChecker for DeprecatedCallChecker {
    fn name(&self) -> &str {
        "deprecation.call"
    }

    fn check(&self, expression: &Expression, ctx: &mut CheckerContext<'_>) {
        let ExpressionKind::Call { callee, callee_annotations, .. } = &expression.kind else {
            return;
        };
        if callee_annotations.iter().any(|a| a.fqn == self.deprecated) {
            ctx.report(Diagnostic::warning(
                codes::DEPRECATED_CALL,
                format!("call to deprecated `{}`", callee),
            ));
        }
    }
}

impl ExtensionFactory for DeprecationPlugin {
    fn meta(&self) -> FactoryMeta {
        FactoryMeta {
            name: "deprecation",
            description: "Warns on calls to declarations marked deprecated",
        }
    }

    fn create(&self, session: &Session) -> Result<Extension, ExtensionError> {
        let checkers = CheckerSet::new(
            DeclarationCheckers::new(),
            ExpressionCheckers::new().with_call(DeprecatedCallChecker::new()),
        );
        Ok(Extension::additional_checkers(session, checkers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sema_plugin::DiagnosticReporter;

    fn run(expression: &Expression) -> Vec<Diagnostic> {
        let session = Session::default();
        let mut reporter = DiagnosticReporter::default();
        let mut ctx = CheckerContext::new(&session, "a.kt", &mut reporter);
        DeprecatedCallChecker::new().check(expression, &mut ctx);
        reporter.into_diagnostics()
    }

    #[test]
    fn test_deprecated_callee() {
        let call = Expression::call("oldApi").with_callee_annotation(ResolvedAnnotation::new(annotations::DEPRECATED));
        let found = run(&call);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].code, codes::DEPRECATED_CALL);
        assert!(found[0].message.contains("oldApi"));
    }

    #[test]
    fn test_plain_callee_and_non_calls() {
        assert!(run(&Expression::call("newApi")).is_empty());
        assert!(run(&Expression::property_access("size")).is_empty());
    }
}
