//! Rule dispatch over one source file
//!
//! Declarations are visited depth-first, members before body expressions.
//! For every node the extensions run in registration order, and each runs
//! its basic rules before its kind-specific ones. A rule is skipped when the
//! filter of the extension that contributed it rejects the node.

use sema_core::{Declaration, Expression, ResolvedAnnotation, SourceFile};
use sema_plugin::{CheckerContext, CompositeCheckerSet, NodeAnnotations};
use tracing::trace;

pub struct Dispatcher<'a> {
    composite: &'a CompositeCheckerSet,
}

impl<'a> Dispatcher<'a> {
    pub fn new(composite: &'a CompositeCheckerSet) -> Self {
        Self { composite }
    }

    pub fn check_file(&self, file: &SourceFile, ctx: &mut CheckerContext<'_>) {
        if self.composite.is_empty() {
            return;
        }
        for declaration in &file.declarations {
            self.visit_declaration(declaration, None, ctx);
        }
    }

    fn visit_declaration(
        &self,
        declaration: &Declaration,
        parent: Option<&[ResolvedAnnotation]>,
        ctx: &mut CheckerContext<'_>,
    ) {
        ctx.enter_declaration(&declaration.name);

        let lookup = NodeAnnotations::new(&declaration.annotations, parent);
        for scoped in self.composite.declarations().applicable(declaration.kind) {
            if !scoped.extension().filter().applies_to(&lookup) {
                trace!(checker = scoped.checker().name(), element = %ctx.element_path(), "skipped by filter");
                continue;
            }
            ctx.set_checker(scoped.checker().name());
            scoped.checker().check(declaration, ctx);
        }

        for member in &declaration.members {
            self.visit_declaration(member, Some(&declaration.annotations), ctx);
        }
        for expression in &declaration.body {
            self.visit_expression(expression, &declaration.annotations, ctx);
        }

        ctx.exit_declaration();
    }

    fn visit_expression(&self, expression: &Expression, parent: &[ResolvedAnnotation], ctx: &mut CheckerContext<'_>) {
        let lookup = NodeAnnotations::new(&expression.annotations, Some(parent));
        for scoped in self.composite.expressions().applicable(expression) {
            if !scoped.extension().filter().applies_to(&lookup) {
                continue;
            }
            ctx.set_checker(scoped.checker().name());
            scoped.checker().check(expression, ctx);
        }

        for child in expression.children() {
            self.visit_expression(child, &expression.annotations, ctx);
        }
    }
}
