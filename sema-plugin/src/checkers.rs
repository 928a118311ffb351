//! Checker sets and their composition
//!
//! A plugin contributes a `CheckerSet`. Sets compose by ordered union:
//! every contributed rule is kept and runs, in contribution order.

use crate::{DeclarationChecker, Extension, ExpressionChecker};
use sema_core::{DeclarationKind, Expression, ExpressionKind, ExtensionPointName};
use std::fmt;
use std::sync::Arc;

/// Declaration rules, bucketed by declaration kind
#[derive(Clone, Default)]
pub struct DeclarationCheckers {
    /// Run on every declaration
    pub basic: Vec<Arc<dyn DeclarationChecker>>,
    pub class: Vec<Arc<dyn DeclarationChecker>>,
    pub function: Vec<Arc<dyn DeclarationChecker>>,
    pub property: Vec<Arc<dyn DeclarationChecker>>,
}

impl DeclarationCheckers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_basic<C: DeclarationChecker + 'static>(mut self, checker: C) -> Self {
        self.basic.push(Arc::new(checker));
        self
    }

    pub fn with_class<C: DeclarationChecker + 'static>(mut self, checker: C) -> Self {
        self.class.push(Arc::new(checker));
        self
    }

    pub fn with_function<C: DeclarationChecker + 'static>(mut self, checker: C) -> Self {
        self.function.push(Arc::new(checker));
        self
    }

    pub fn with_property<C: DeclarationChecker + 'static>(mut self, checker: C) -> Self {
        self.property.push(Arc::new(checker));
        self
    }

    pub fn for_kind(&self, kind: DeclarationKind) -> &[Arc<dyn DeclarationChecker>] {
        match kind {
            DeclarationKind::Class => &self.class,
            DeclarationKind::Function => &self.function,
            DeclarationKind::Property => &self.property,
        }
    }

    /// All rules: basic first, then class, function, property
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn DeclarationChecker>> {
        self.basic.iter().chain(&self.class).chain(&self.function).chain(&self.property)
    }

    pub fn len(&self) -> usize {
        self.basic.len() + self.class.len() + self.function.len() + self.property.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append every rule of `other` after the rules already present
    pub fn extend_from(&mut self, other: &DeclarationCheckers) {
        self.basic.extend(other.basic.iter().cloned());
        self.class.extend(other.class.iter().cloned());
        self.function.extend(other.function.iter().cloned());
        self.property.extend(other.property.iter().cloned());
    }
}

impl fmt::Debug for DeclarationCheckers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter().map(|c| c.name())).finish()
    }
}

/// Expression rules, bucketed by expression kind
#[derive(Clone, Default)]
pub struct ExpressionCheckers {
    /// Run on every expression
    pub basic: Vec<Arc<dyn ExpressionChecker>>,
    pub call: Vec<Arc<dyn ExpressionChecker>>,
    pub property_access: Vec<Arc<dyn ExpressionChecker>>,
}

impl ExpressionCheckers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_basic<C: ExpressionChecker + 'static>(mut self, checker: C) -> Self {
        self.basic.push(Arc::new(checker));
        self
    }

    pub fn with_call<C: ExpressionChecker + 'static>(mut self, checker: C) -> Self {
        self.call.push(Arc::new(checker));
        self
    }

    pub fn with_property_access<C: ExpressionChecker + 'static>(mut self, checker: C) -> Self {
        self.property_access.push(Arc::new(checker));
        self
    }

    /// Kind-specific rules; literals only get the basic ones
    pub fn for_expression(&self, expression: &Expression) -> &[Arc<dyn ExpressionChecker>] {
        match expression.kind {
            ExpressionKind::Call { .. } => &self.call,
            ExpressionKind::PropertyAccess { .. } => &self.property_access,
            ExpressionKind::Literal { .. } => &[],
        }
    }

    /// All rules: basic first, then call, property access
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ExpressionChecker>> {
        self.basic.iter().chain(&self.call).chain(&self.property_access)
    }

    pub fn len(&self) -> usize {
        self.basic.len() + self.call.len() + self.property_access.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn extend_from(&mut self, other: &ExpressionCheckers) {
        self.basic.extend(other.basic.iter().cloned());
        self.call.extend(other.call.iter().cloned());
        self.property_access.extend(other.property_access.iter().cloned());
    }
}

impl fmt::Debug for ExpressionCheckers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter().map(|c| c.name())).finish()
    }
}

/// Payload of the additional-checkers extension point
#[derive(Debug, Clone, Default)]
pub struct CheckerSet {
    pub declarations: DeclarationCheckers,
    pub expressions: ExpressionCheckers,
}

impl CheckerSet {
    pub fn new(declarations: DeclarationCheckers, expressions: ExpressionCheckers) -> Self {
        Self { declarations, expressions }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty() && self.expressions.is_empty()
    }

    /// Ordered union: rules of `self`, then rules of `other`
    pub fn union(&self, other: &CheckerSet) -> CheckerSet {
        let mut merged = self.clone();
        merged.declarations.extend_from(&other.declarations);
        merged.expressions.extend_from(&other.expressions);
        merged
    }
}

/// A rule together with the extension that contributed it
pub struct Scoped<C: ?Sized> {
    extension: Arc<Extension>,
    checker: Arc<C>,
}

impl<C: ?Sized> Scoped<C> {
    pub fn extension(&self) -> &Extension {
        &self.extension
    }

    pub fn checker(&self) -> &C {
        &self.checker
    }
}

impl<C: ?Sized> Clone for Scoped<C> {
    fn clone(&self) -> Self {
        Self { extension: Arc::clone(&self.extension), checker: Arc::clone(&self.checker) }
    }
}

pub type ScopedDeclarationChecker = Scoped<dyn DeclarationChecker>;
pub type ScopedExpressionChecker = Scoped<dyn ExpressionChecker>;

/// Declaration rules of one extension
#[derive(Clone, Default)]
struct DeclarationRun {
    basic: Vec<ScopedDeclarationChecker>,
    class: Vec<ScopedDeclarationChecker>,
    function: Vec<ScopedDeclarationChecker>,
    property: Vec<ScopedDeclarationChecker>,
}

impl DeclarationRun {
    fn new(extension: &Arc<Extension>, checkers: &DeclarationCheckers) -> Self {
        let scope = |c: &Arc<dyn DeclarationChecker>| Scoped { extension: Arc::clone(extension), checker: Arc::clone(c) };
        Self {
            basic: checkers.basic.iter().map(scope).collect(),
            class: checkers.class.iter().map(scope).collect(),
            function: checkers.function.iter().map(scope).collect(),
            property: checkers.property.iter().map(scope).collect(),
        }
    }

    fn for_kind(&self, kind: DeclarationKind) -> &[ScopedDeclarationChecker] {
        match kind {
            DeclarationKind::Class => &self.class,
            DeclarationKind::Function => &self.function,
            DeclarationKind::Property => &self.property,
        }
    }

    fn len(&self) -> usize {
        self.basic.len() + self.class.len() + self.function.len() + self.property.len()
    }
}

/// Declaration rules of every extension, one run per extension
#[derive(Clone, Default)]
pub struct ComposedDeclarationCheckers {
    runs: Vec<DeclarationRun>,
}

impl ComposedDeclarationCheckers {
    fn add(&mut self, extension: &Arc<Extension>, checkers: &DeclarationCheckers) {
        self.runs.push(DeclarationRun::new(extension, checkers));
    }

    /// Rules that run on a declaration of `kind`
    ///
    /// Extension by extension in registration order; within one extension
    /// the basic rules come before the kind-specific ones.
    pub fn applicable(&self, kind: DeclarationKind) -> impl Iterator<Item = &ScopedDeclarationChecker> {
        self.runs.iter().flat_map(move |run| run.basic.iter().chain(run.for_kind(kind)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScopedDeclarationChecker> {
        self.runs
            .iter()
            .flat_map(|run| run.basic.iter().chain(&run.class).chain(&run.function).chain(&run.property))
    }

    pub fn len(&self) -> usize {
        self.runs.iter().map(DeclarationRun::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Expression rules of one extension
#[derive(Clone, Default)]
struct ExpressionRun {
    basic: Vec<ScopedExpressionChecker>,
    call: Vec<ScopedExpressionChecker>,
    property_access: Vec<ScopedExpressionChecker>,
}

impl ExpressionRun {
    fn new(extension: &Arc<Extension>, checkers: &ExpressionCheckers) -> Self {
        let scope = |c: &Arc<dyn ExpressionChecker>| Scoped { extension: Arc::clone(extension), checker: Arc::clone(c) };
        Self {
            basic: checkers.basic.iter().map(scope).collect(),
            call: checkers.call.iter().map(scope).collect(),
            property_access: checkers.property_access.iter().map(scope).collect(),
        }
    }

    fn for_expression(&self, expression: &Expression) -> &[ScopedExpressionChecker] {
        match expression.kind {
            ExpressionKind::Call { .. } => &self.call,
            ExpressionKind::PropertyAccess { .. } => &self.property_access,
            ExpressionKind::Literal { .. } => &[],
        }
    }

    fn len(&self) -> usize {
        self.basic.len() + self.call.len() + self.property_access.len()
    }
}

/// Expression rules of every extension, one run per extension
#[derive(Clone, Default)]
pub struct ComposedExpressionCheckers {
    runs: Vec<ExpressionRun>,
}

impl ComposedExpressionCheckers {
    fn add(&mut self, extension: &Arc<Extension>, checkers: &ExpressionCheckers) {
        self.runs.push(ExpressionRun::new(extension, checkers));
    }

    pub fn applicable<'a>(&'a self, expression: &'a Expression) -> impl Iterator<Item = &'a ScopedExpressionChecker> {
        self.runs.iter().flat_map(move |run| run.basic.iter().chain(run.for_expression(expression)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScopedExpressionChecker> {
        self.runs
            .iter()
            .flat_map(|run| run.basic.iter().chain(&run.call).chain(&run.property_access))
    }

    pub fn len(&self) -> usize {
        self.runs.iter().map(ExpressionRun::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Every registered extension's checkers for one point, in registration order
pub struct CompositeCheckerSet {
    point: ExtensionPointName,
    extensions: Vec<Arc<Extension>>,
    declarations: ComposedDeclarationCheckers,
    expressions: ComposedExpressionCheckers,
}

impl CompositeCheckerSet {
    pub fn empty(point: ExtensionPointName) -> Self {
        Self::compose(point, Vec::new())
    }

    /// Fold the extensions' payloads; order of `extensions` is kept
    pub fn compose(point: ExtensionPointName, extensions: Vec<Arc<Extension>>) -> Self {
        let mut declarations = ComposedDeclarationCheckers::default();
        let mut expressions = ComposedExpressionCheckers::default();
        for extension in &extensions {
            let checkers = extension.checkers();
            declarations.add(extension, &checkers.declarations);
            expressions.add(extension, &checkers.expressions);
        }
        Self { point, extensions, declarations, expressions }
    }

    pub fn point(&self) -> &ExtensionPointName {
        &self.point
    }

    pub fn extensions(&self) -> &[Arc<Extension>] {
        &self.extensions
    }

    pub fn declarations(&self) -> &ComposedDeclarationCheckers {
        &self.declarations
    }

    pub fn expressions(&self) -> &ComposedExpressionCheckers {
        &self.expressions
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty() && self.expressions.is_empty()
    }

    /// True if some contributing extension filters by annotations
    pub fn requires_annotations(&self) -> bool {
        self.extensions.iter().any(|e| !e.filter().is_all())
    }

    pub fn declaration_checker_names(&self) -> Vec<&str> {
        self.declarations.iter().map(|s| s.checker().name()).collect()
    }

    pub fn expression_checker_names(&self) -> Vec<&str> {
        self.expressions.iter().map(|s| s.checker().name()).collect()
    }
}

impl fmt::Debug for CompositeCheckerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeCheckerSet")
            .field("point", &self.point)
            .field("extensions", &self.extensions.len())
            .field("declarations", &self.declaration_checker_names())
            .field("expressions", &self.expression_checker_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CheckerContext, Session};
    use sema_core::Declaration;

    struct Rule(&'static str);

    impl DeclarationChecker for Rule {
        fn name(&self) -> &str {
            self.0
        }
        fn check(&self, _declaration: &Declaration, _ctx: &mut CheckerContext<'_>) {}
    }

    impl ExpressionChecker for Rule {
        fn name(&self) -> &str {
            self.0
        }
        fn check(&self, _expression: &Expression, _ctx: &mut CheckerContext<'_>) {}
    }

    fn names(checkers: &DeclarationCheckers) -> Vec<&str> {
        checkers.iter().map(|c| c.name()).collect()
    }

    #[test]
    fn test_union_keeps_both_sides_in_order() {
        let a = CheckerSet::new(
            DeclarationCheckers::new().with_basic(Rule("a1")).with_class(Rule("a2")),
            ExpressionCheckers::new().with_call(Rule("ae")),
        );
        let b = CheckerSet::new(
            DeclarationCheckers::new().with_basic(Rule("b1")),
            ExpressionCheckers::new().with_call(Rule("be")),
        );

        let merged = a.union(&b);
        assert_eq!(names(&merged.declarations), vec!["a1", "b1", "a2"]);
        let expr: Vec<&str> = merged.expressions.iter().map(|c| c.name()).collect();
        assert_eq!(expr, vec!["ae", "be"]);
        // Inputs untouched
        assert_eq!(a.declarations.len(), 2);
        assert_eq!(b.declarations.len(), 1);
    }

    #[test]
    fn test_union_does_not_deduplicate() {
        let a = CheckerSet::new(DeclarationCheckers::new().with_basic(Rule("same")), ExpressionCheckers::new());
        let merged = a.union(&a);
        assert_eq!(names(&merged.declarations), vec!["same", "same"]);
    }

    #[test]
    fn test_kind_buckets() {
        let decls = DeclarationCheckers::new()
            .with_basic(Rule("any"))
            .with_function(Rule("fun"))
            .with_property(Rule("prop"));
        assert_eq!(decls.for_kind(DeclarationKind::Function).len(), 1);
        assert!(decls.for_kind(DeclarationKind::Class).is_empty());

        let exprs = ExpressionCheckers::new().with_call(Rule("call")).with_property_access(Rule("get"));
        assert_eq!(exprs.for_expression(&Expression::call("f"))[0].name(), "call");
        assert!(exprs.for_expression(&Expression::literal("1")).is_empty());
    }

    #[test]
    fn test_composite_applicable_order() {
        let session = Session::default();
        let first = Arc::new(Extension::additional_checkers(
            &session,
            CheckerSet::new(
                DeclarationCheckers::new().with_function(Rule("f1")).with_basic(Rule("b1")),
                ExpressionCheckers::new().with_basic(Rule("eb1")).with_call(Rule("ec1")),
            ),
        ));
        let second = Arc::new(Extension::additional_checkers(
            &session,
            CheckerSet::new(
                DeclarationCheckers::new().with_basic(Rule("b2")).with_class(Rule("c2")),
                ExpressionCheckers::new().with_call(Rule("ec2")),
            ),
        ));

        let composite = CompositeCheckerSet::compose(
            ExtensionPointName::ADDITIONAL_CHECKERS,
            vec![first, second],
        );
        let on_function: Vec<&str> = composite
            .declarations()
            .applicable(DeclarationKind::Function)
            .map(|s| s.checker().name())
            .collect();
        assert_eq!(on_function, vec!["b1", "f1", "b2"]);

        let call = Expression::call("g");
        let on_call: Vec<&str> = composite.expressions().applicable(&call).map(|s| s.checker().name()).collect();
        assert_eq!(on_call, vec!["eb1", "ec1", "ec2"]);
        assert!(!composite.requires_annotations());
    }
}
