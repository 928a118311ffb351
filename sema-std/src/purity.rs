//! Purity contracts
//!
//! Only declarations marked pure and the direct body expressions of such
//! declarations are visited.

use crate::{annotations, codes};
use sema_plugin::prelude::*;

pub struct PurityPlugin;

/// Purity only means something on functions
pub struct PureTargetChecker;

/// Calls from a pure body must target pure functions
pub struct ImpureCallChecker {
    pure: AnnotationFqn,
}

impl ImpureCallChecker {
    pub fn new() -> Self {
        Self { pure: AnnotationFqn::new(annotations::PURE) }
    }
}

impl Default for ImpureCallChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl DeclarationChecker for PureTargetChecker {
    fn name(&self) -> &str {
        "purity.target"
    }

    fn check(&self, declaration: &Declaration, ctx: &mut CheckerContext<'_>) {
        if declaration.kind != DeclarationKind::Function {
            ctx.report(Diagnostic::warning(
                codes::PURE_TARGET,
                format!("@Pure has no effect on {} `{}`", declaration.kind.as_str(), declaration.name),
            ));
        }
    }
}

impl ExpressionChecker for ImpureCallChecker {
    fn name(&self) -> &str {
        "purity.call"
    }

    fn check(&self, expression: &Expression, ctx: &mut CheckerContext<'_>) {
        let ExpressionKind::Call { callee, callee_annotations, .. } = &expression.kind else {
            return;
        };
        if !callee_annotations.iter().any(|a| a.fqn == self.pure) {
            ctx.report(Diagnostic::error(
                codes::IMPURE_CALL,
                format!("pure function calls non-pure `{}`", callee),
            ));
        }
    }
}

impl ExtensionFactory for PurityPlugin {
    fn meta(&self) -> FactoryMeta {
        FactoryMeta {
            name: "purity",
            description: "Checks declarations marked pure",
        }
    }

    fn create(&self, session: &Session) -> Result<Extension, ExtensionError> {
        let filter = ApplicabilityFilter::filtered()
            .directly(annotations::PURE)
            .children(annotations::PURE)
            .build()?;
        let checkers = CheckerSet::new(
            DeclarationCheckers::new().with_basic(PureTargetChecker),
            ExpressionCheckers::new().with_call(ImpureCallChecker::new()),
        );
        Ok(Extension::additional_checkers_filtered(session, filter, checkers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sema_plugin::{DiagnosticReporter, Mode, NodeAnnotations};

    #[test]
    fn test_filter_targets_pure_and_its_children() {
        let session = Session::default();
        let ext = PurityPlugin.create(&session).unwrap();
        assert_eq!(ext.mode(), Mode::Filtered);

        let pure = vec![ResolvedAnnotation::new(annotations::PURE)];
        assert!(ext.filter().applies_to(&NodeAnnotations::new(&pure, None)));
        assert!(ext.filter().applies_to(&NodeAnnotations::new(&[], Some(pure.as_slice()))));
        assert!(!ext.filter().applies_to(&NodeAnnotations::new(&[], None)));
    }

    #[test]
    fn test_impure_call() {
        let session = Session::default();
        let mut reporter = DiagnosticReporter::default();
        let mut ctx = CheckerContext::new(&session, "a.kt", &mut reporter);

        let checker = ImpureCallChecker::new();
        checker.check(&Expression::call("log"), &mut ctx);
        checker.check(
            &Expression::call("square").with_callee_annotation(ResolvedAnnotation::new(annotations::PURE)),
            &mut ctx,
        );
        checker.check(&Expression::literal("1"), &mut ctx);

        let found = reporter.into_diagnostics();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].code, codes::IMPURE_CALL);
        assert!(found[0].is_error());
    }

    #[test]
    fn test_pure_on_class() {
        let session = Session::default();
        let mut reporter = DiagnosticReporter::default();
        let mut ctx = CheckerContext::new(&session, "a.kt", &mut reporter);
        PureTargetChecker.check(&Declaration::class("Math").annotated(annotations::PURE), &mut ctx);
        PureTargetChecker.check(&Declaration::function("sq").annotated(annotations::PURE), &mut ctx);
        assert_eq!(reporter.diagnostics().len(), 1);
        assert_eq!(reporter.diagnostics()[0].code, codes::PURE_TARGET);
    }
}
