//! Opt-in markers
//!
//! A marker is any annotation whose class is itself annotated
//! `@RequiresOptIn`. Two extensions: one filtered by the meta-annotation
//! that reports marked declarations, one unfiltered that reports calls to
//! marked callees made without an explicit `@OptIn`.

use crate::{annotations, codes};
use sema_plugin::prelude::*;

pub struct OptInMarkersPlugin;
pub struct OptInUsagePlugin;

pub struct MarkedDeclarationChecker {
    requires_opt_in: AnnotationFqn,
}

pub struct MarkedCallChecker {
    requires_opt_in: AnnotationFqn,
    opt_in: AnnotationFqn,
}

impl MarkedDeclarationChecker {
    pub fn new() -> Self {
        Self { requires_opt_in: AnnotationFqn::new(annotations::REQUIRES_OPT_IN) }
    }
}

impl Default for MarkedDeclarationChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkedCallChecker {
    pub fn new() -> Self {
        Self {
            requires_opt_in: AnnotationFqn::new(annotations::REQUIRES_OPT_IN),
            opt_in: AnnotationFqn::new(annotations::OPT_IN),
        }
    }
}

impl Default for MarkedCallChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl DeclarationChecker for MarkedDeclarationChecker {
    fn name(&self) -> &str {
        "opt_in.marked"
    }

    fn check(&self, declaration: &Declaration, ctx: &mut CheckerContext<'_>) {
        for marker in declaration.annotations.iter().filter(|a| a.is_meta_annotated_with(&self.requires_opt_in)) {
            ctx.report(Diagnostic::info(
                codes::OPT_IN_REQUIRED,
                format!("`{}` requires opt-in via @{}", declaration.name, marker.fqn.short_name()),
            ));
        }
    }
}

impl ExpressionChecker for MarkedCallChecker {
    fn name(&self) -> &str {
        "opt_in.usage"
    }

    fn check(&self, expression: &Expression, ctx: &mut CheckerContext<'_>) {
        let ExpressionKind::Call { callee, callee_annotations, .. } = &expression.kind else {
            return;
        };
        if expression.has_annotation(&self.opt_in) {
            return;
        }
        if let Some(marker) = callee_annotations.iter().find(|a| a.is_meta_annotated_with(&self.requires_opt_in)) {
            ctx.report(Diagnostic::warning(
                codes::OPT_IN_USAGE,
                format!("call to `{}` needs @OptIn({})", callee, marker.fqn.short_name()),
            ));
        }
    }
}

impl ExtensionFactory for OptInMarkersPlugin {
    fn meta(&self) -> FactoryMeta {
        FactoryMeta {
            name: "opt_in.markers",
            description: "Reports declarations carrying opt-in markers",
        }
    }

    fn create(&self, session: &Session) -> Result<Extension, ExtensionError> {
        let filter = ApplicabilityFilter::filtered()
            .meta(annotations::REQUIRES_OPT_IN, MetaAnnotationMode::AnnotatedElement)
            .build()?;
        let checkers = CheckerSet::new(
            DeclarationCheckers::new().with_basic(MarkedDeclarationChecker::new()),
            ExpressionCheckers::new(),
        );
        Ok(Extension::additional_checkers_filtered(session, filter, checkers))
    }
}

impl ExtensionFactory for OptInUsagePlugin {
    fn meta(&self) -> FactoryMeta {
        FactoryMeta {
            name: "opt_in.usage",
            description: "Warns on calls to opt-in APIs without @OptIn",
        }
    }

    fn create(&self, session: &Session) -> Result<Extension, ExtensionError> {
        let checkers = CheckerSet::new(
            DeclarationCheckers::new(),
            ExpressionCheckers::new().with_call(MarkedCallChecker::new()),
        );
        Ok(Extension::additional_checkers(session, checkers))
    }
}
