//! Minimal intermediate representation
//!
//! Only what checkers and applicability filters need: declarations,
//! expressions, and the annotations already resolved on each node. Each
//! resolved annotation also lists the annotations its own class carries
//! (its meta-annotations), as supplied by annotation resolution.

use crate::AnnotationFqn;
use serde::{Deserialize, Serialize};

/// An annotation occurrence on a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAnnotation {
    pub fqn: AnnotationFqn,
    /// Annotations present on the annotation class itself
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meta: Vec<AnnotationFqn>,
}

impl ResolvedAnnotation {
    pub fn new(fqn: impl Into<AnnotationFqn>) -> Self {
        Self { fqn: fqn.into(), meta: Vec::new() }
    }

    pub fn with_meta(mut self, meta: impl Into<AnnotationFqn>) -> Self {
        self.meta.push(meta.into());
        self
    }

    pub fn is_meta_annotated_with(&self, fqn: &AnnotationFqn) -> bool {
        self.meta.iter().any(|m| m == fqn)
    }
}

/// Anything carrying resolved annotations
pub trait Annotated {
    fn annotations(&self) -> &[ResolvedAnnotation];

    fn has_annotation(&self, fqn: &AnnotationFqn) -> bool {
        self.annotations().iter().any(|a| &a.fqn == fqn)
    }

    fn find_annotation(&self, fqn: &AnnotationFqn) -> Option<&ResolvedAnnotation> {
        self.annotations().iter().find(|a| &a.fqn == fqn)
    }
}

/// A compilation unit handed to the analyzer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    #[serde(default)]
    pub files: Vec<SourceFile>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), files: Vec::new() }
    }

    pub fn with_file(mut self, file: SourceFile) -> Self {
        self.files.push(file);
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: String,
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

impl SourceFile {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), declarations: Vec::new() }
    }

    pub fn with_declaration(mut self, declaration: Declaration) -> Self {
        self.declarations.push(declaration);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    Class,
    Function,
    Property,
}

impl DeclarationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DeclarationKind::Class => "class",
            DeclarationKind::Function => "function",
            DeclarationKind::Property => "property",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclarationKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<ResolvedAnnotation>,
    /// Nested declarations (class members, local functions)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<Declaration>,
    /// Top-level expressions of the body or initializer
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub body: Vec<Expression>,
}

impl Declaration {
    pub fn new(kind: DeclarationKind, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            annotations: Vec::new(),
            members: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(DeclarationKind::Class, name)
    }

    pub fn function(name: impl Into<String>) -> Self {
        Self::new(DeclarationKind::Function, name)
    }

    pub fn property(name: impl Into<String>) -> Self {
        Self::new(DeclarationKind::Property, name)
    }

    pub fn with_annotation(mut self, annotation: ResolvedAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn annotated(self, fqn: impl Into<AnnotationFqn>) -> Self {
        self.with_annotation(ResolvedAnnotation::new(fqn))
    }

    pub fn with_member(mut self, member: Declaration) -> Self {
        self.members.push(member);
        self
    }

    pub fn with_body(mut self, expression: Expression) -> Self {
        self.body.push(expression);
        self
    }
}

impl Annotated for Declaration {
    fn annotations(&self) -> &[ResolvedAnnotation] {
        &self.annotations
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExpressionKind {
    Call {
        callee: String,
        /// Annotations of the resolved callee declaration
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        callee_annotations: Vec<ResolvedAnnotation>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        arguments: Vec<Expression>,
    },
    PropertyAccess {
        property: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        receiver: Option<Box<Expression>>,
    },
    Literal {
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expression {
    #[serde(flatten)]
    pub kind: ExpressionKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<ResolvedAnnotation>,
}

impl Expression {
    pub fn new(kind: ExpressionKind) -> Self {
        Self { kind, annotations: Vec::new() }
    }

    pub fn call(callee: impl Into<String>) -> Self {
        Self::new(ExpressionKind::Call {
            callee: callee.into(),
            callee_annotations: Vec::new(),
            arguments: Vec::new(),
        })
    }

    pub fn property_access(property: impl Into<String>) -> Self {
        Self::new(ExpressionKind::PropertyAccess { property: property.into(), receiver: None })
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self::new(ExpressionKind::Literal { value: value.into() })
    }

    pub fn with_annotation(mut self, annotation: ResolvedAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Add an annotation to the resolved callee. No effect on non-calls.
    pub fn with_callee_annotation(mut self, annotation: ResolvedAnnotation) -> Self {
        if let ExpressionKind::Call { callee_annotations, .. } = &mut self.kind {
            callee_annotations.push(annotation);
        }
        self
    }

    /// Add an argument. No effect on non-calls.
    pub fn with_argument(mut self, argument: Expression) -> Self {
        if let ExpressionKind::Call { arguments, .. } = &mut self.kind {
            arguments.push(argument);
        }
        self
    }

    pub fn with_receiver(mut self, expression: Expression) -> Self {
        if let ExpressionKind::PropertyAccess { receiver, .. } = &mut self.kind {
            *receiver = Some(Box::new(expression));
        }
        self
    }

    /// Directly nested expressions, in source order
    pub fn children(&self) -> Vec<&Expression> {
        match &self.kind {
            ExpressionKind::Call { arguments, .. } => arguments.iter().collect(),
            ExpressionKind::PropertyAccess { receiver, .. } => receiver.iter().map(|r| r.as_ref()).collect(),
            ExpressionKind::Literal { .. } => Vec::new(),
        }
    }

    /// Short label used in diagnostics
    pub fn describe(&self) -> String {
        match &self.kind {
            ExpressionKind::Call { callee, .. } => format!("{}()", callee),
            ExpressionKind::PropertyAccess { property, .. } => property.clone(),
            ExpressionKind::Literal { value } => value.clone(),
        }
    }
}

impl Annotated for Expression {
    fn annotations(&self) -> &[ResolvedAnnotation] {
        &self.annotations
    }
}
