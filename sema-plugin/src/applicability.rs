//! Applicability filters
//!
//! An extension declares which nodes it cares about with three annotation
//! sets and a mode. `Mode::All` short-circuits before any annotation is
//! looked at, so extensions that do not filter never pay for annotation
//! lookup.

use sema_core::{AnnotationFqn, ExtensionError, ResolvedAnnotation};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Applies to every node
    All,
    /// Applies only to nodes matched by the annotation sets
    Filtered,
}

/// Reach of a meta-annotation entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetaAnnotationMode {
    /// Only the element carrying the meta-annotated annotation
    AnnotatedElement,
    /// The element and its direct children
    AnnotatedAndChildren,
}

impl MetaAnnotationMode {
    pub fn for_children(self) -> bool {
        matches!(self, MetaAnnotationMode::AnnotatedAndChildren)
    }
}

/// Annotation access for a node under analysis
///
/// Implementations may compute annotations lazily; filters in `Mode::All`
/// never call into it.
pub trait AnnotationLookup {
    fn node_annotations(&self) -> &[ResolvedAnnotation];

    /// Annotations of the syntactic parent, empty for top-level nodes
    fn parent_annotations(&self) -> &[ResolvedAnnotation];
}

/// Borrowed annotations of a node and its parent
#[derive(Debug, Clone, Copy)]
pub struct NodeAnnotations<'a> {
    pub node: &'a [ResolvedAnnotation],
    pub parent: &'a [ResolvedAnnotation],
}

impl<'a> NodeAnnotations<'a> {
    pub fn new(node: &'a [ResolvedAnnotation], parent: Option<&'a [ResolvedAnnotation]>) -> Self {
        Self { node, parent: parent.unwrap_or(&[]) }
    }
}

impl AnnotationLookup for NodeAnnotations<'_> {
    fn node_annotations(&self) -> &[ResolvedAnnotation] {
        self.node
    }

    fn parent_annotations(&self) -> &[ResolvedAnnotation] {
        self.parent
    }
}

/// Which declarations and expressions an extension applies to
///
/// Only constructible through validating constructors: a `Filtered` filter
/// always has at least one annotation to filter on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicabilityFilter {
    mode: Mode,
    directly_applicable: HashSet<AnnotationFqn>,
    children_applicable: HashSet<AnnotationFqn>,
    meta_annotations: HashMap<AnnotationFqn, MetaAnnotationMode>,
}

impl ApplicabilityFilter {
    /// Unconditional filter with no annotation sets
    pub fn all() -> Self {
        Self {
            mode: Mode::All,
            directly_applicable: HashSet::new(),
            children_applicable: HashSet::new(),
            meta_annotations: HashMap::new(),
        }
    }

    pub fn filtered() -> FilterBuilder {
        FilterBuilder::default()
    }

    pub fn new(
        mode: Mode,
        directly_applicable: HashSet<AnnotationFqn>,
        children_applicable: HashSet<AnnotationFqn>,
        meta_annotations: HashMap<AnnotationFqn, MetaAnnotationMode>,
    ) -> Result<Self, ExtensionError> {
        let filter = Self { mode, directly_applicable, children_applicable, meta_annotations };
        if filter.mode == Mode::Filtered && filter.has_no_criteria() {
            return Err(ExtensionError::EmptyFilter);
        }
        Ok(filter)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_all(&self) -> bool {
        self.mode == Mode::All
    }

    pub fn directly_applicable_annotations(&self) -> &HashSet<AnnotationFqn> {
        &self.directly_applicable
    }

    pub fn children_applicable_annotations(&self) -> &HashSet<AnnotationFqn> {
        &self.children_applicable
    }

    pub fn meta_annotations(&self) -> &HashMap<AnnotationFqn, MetaAnnotationMode> {
        &self.meta_annotations
    }

    fn has_no_criteria(&self) -> bool {
        self.directly_applicable.is_empty()
            && self.children_applicable.is_empty()
            && self.meta_annotations.is_empty()
    }

    pub fn applies_to(&self, node: &dyn AnnotationLookup) -> bool {
        match self.mode {
            Mode::All => true,
            Mode::Filtered => self.matches(node),
        }
    }

    fn matches(&self, node: &dyn AnnotationLookup) -> bool {
        let own = node.node_annotations();
        if own.iter().any(|a| self.directly_applicable.contains(&a.fqn)) {
            return true;
        }
        if own.iter().any(|a| self.meta_match(a, false)) {
            return true;
        }

        let parent = node.parent_annotations();
        parent.iter().any(|a| self.children_applicable.contains(&a.fqn) || self.meta_match(a, true))
    }

    fn meta_match(&self, annotation: &ResolvedAnnotation, from_parent: bool) -> bool {
        annotation.meta.iter().any(|meta| match self.meta_annotations.get(meta) {
            Some(mode) => !from_parent || mode.for_children(),
            None => false,
        })
    }
}

impl Default for ApplicabilityFilter {
    fn default() -> Self {
        Self::all()
    }
}

/// Builder for `Mode::Filtered` filters
#[derive(Debug, Clone, Default)]
pub struct FilterBuilder {
    directly_applicable: HashSet<AnnotationFqn>,
    children_applicable: HashSet<AnnotationFqn>,
    meta_annotations: HashMap<AnnotationFqn, MetaAnnotationMode>,
}

impl FilterBuilder {
    pub fn directly(mut self, fqn: impl Into<AnnotationFqn>) -> Self {
        self.directly_applicable.insert(fqn.into());
        self
    }

    pub fn children(mut self, fqn: impl Into<AnnotationFqn>) -> Self {
        self.children_applicable.insert(fqn.into());
        self
    }

    pub fn meta(mut self, fqn: impl Into<AnnotationFqn>, mode: MetaAnnotationMode) -> Self {
        self.meta_annotations.insert(fqn.into(), mode);
        self
    }

    pub fn build(self) -> Result<ApplicabilityFilter, ExtensionError> {
        ApplicabilityFilter::new(
            Mode::Filtered,
            self.directly_applicable,
            self.children_applicable,
            self.meta_annotations,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingLookup {
        node: Vec<ResolvedAnnotation>,
        parent: Vec<ResolvedAnnotation>,
        lookups: Cell<usize>,
    }

    impl CountingLookup {
        fn new(node: &[&str]) -> Self {
            Self {
                node: node.iter().map(|n| ResolvedAnnotation::new(*n)).collect(),
                parent: Vec::new(),
                lookups: Cell::new(0),
            }
        }
    }

    impl AnnotationLookup for CountingLookup {
        fn node_annotations(&self) -> &[ResolvedAnnotation] {
            self.lookups.set(self.lookups.get() + 1);
            &self.node
        }

        fn parent_annotations(&self) -> &[ResolvedAnnotation] {
            self.lookups.set(self.lookups.get() + 1);
            &self.parent
        }
    }

    fn annotations(names: &[&str]) -> Vec<ResolvedAnnotation> {
        names.iter().map(|n| ResolvedAnnotation::new(*n)).collect()
    }

    #[test]
    fn test_all_mode_applies_without_lookup() {
        let filter = ApplicabilityFilter::all();
        let cases: [&[&str]; 3] = [&[], &["Foo"], &["Foo", "Bar", "Baz"]];
        for names in cases {
            let node = CountingLookup::new(names);
            assert!(filter.applies_to(&node));
            assert_eq!(node.lookups.get(), 0, "ALL mode must not look up annotations");
        }
    }

    #[test]
    fn test_filtered_directly_applicable() {
        let filter = ApplicabilityFilter::filtered().directly("Foo").build().unwrap();
        assert_eq!(filter.mode(), Mode::Filtered);

        let foo = annotations(&["Foo"]);
        let bar = annotations(&["Bar"]);
        assert!(filter.applies_to(&NodeAnnotations::new(&foo, None)));
        assert!(!filter.applies_to(&NodeAnnotations::new(&[], None)));
        assert!(!filter.applies_to(&NodeAnnotations::new(&bar, None)));
    }

    #[test]
    fn test_filtered_children_applicable() {
        let filter = ApplicabilityFilter::filtered().children("Pure").build().unwrap();
        let pure = annotations(&["Pure"]);

        assert!(filter.applies_to(&NodeAnnotations::new(&[], Some(pure.as_slice()))));
        // The annotated element itself is not a child of itself
        assert!(!filter.applies_to(&NodeAnnotations::new(&pure, None)));
    }

    #[test]
    fn test_meta_annotation_modes() {
        let marker = vec![ResolvedAnnotation::new("app.Experimental").with_meta("lang.RequiresOptIn")];

        let element_only = ApplicabilityFilter::filtered()
            .meta("lang.RequiresOptIn", MetaAnnotationMode::AnnotatedElement)
            .build()
            .unwrap();
        assert!(element_only.applies_to(&NodeAnnotations::new(&marker, None)));
        assert!(!element_only.applies_to(&NodeAnnotations::new(&[], Some(marker.as_slice()))));

        let with_children = ApplicabilityFilter::filtered()
            .meta("lang.RequiresOptIn", MetaAnnotationMode::AnnotatedAndChildren)
            .build()
            .unwrap();
        assert!(with_children.applies_to(&NodeAnnotations::new(&marker, None)));
        assert!(with_children.applies_to(&NodeAnnotations::new(&[], Some(marker.as_slice()))));
    }

    #[test]
    fn test_multiple_criteria_apply_once() {
        let filter = ApplicabilityFilter::filtered()
            .directly("Foo")
            .children("Foo")
            .meta("Meta", MetaAnnotationMode::AnnotatedElement)
            .build()
            .unwrap();
        let node = vec![ResolvedAnnotation::new("Foo").with_meta("Meta")];
        let parent = annotations(&["Foo"]);
        assert!(filter.applies_to(&NodeAnnotations::new(&node, Some(parent.as_slice()))));
    }

    #[test]
    fn test_filtered_without_criteria_is_rejected() {
        let err = ApplicabilityFilter::filtered().build().unwrap_err();
        assert!(matches!(err, ExtensionError::EmptyFilter));

        let err = ApplicabilityFilter::new(Mode::Filtered, HashSet::new(), HashSet::new(), HashMap::new())
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_all_mode_with_empty_sets_is_valid() {
        let filter = ApplicabilityFilter::new(Mode::All, HashSet::new(), HashSet::new(), HashMap::new()).unwrap();
        assert_eq!(filter, ApplicabilityFilter::default());
    }
}
