//! Sema Plugin System
//!
//! Provides the extension-point machinery plugins use to contribute
//! additional checkers to semantic analysis:
//! - Extensions (contract header + payload, bound to one session)
//! - Factories (one extension per session)
//! - Applicability filters (which nodes an extension cares about)
//! - The per-session service that composes every contribution

mod applicability;
mod checkers;
mod context;
mod extension;
mod registry;
mod traits;

pub use applicability::{
    AnnotationLookup, ApplicabilityFilter, FilterBuilder,
    MetaAnnotationMode, Mode, NodeAnnotations,
};
pub use checkers::{
    CheckerSet, DeclarationCheckers, ExpressionCheckers,
    CompositeCheckerSet, ComposedDeclarationCheckers, ComposedExpressionCheckers,
    Scoped, ScopedDeclarationChecker, ScopedExpressionChecker,
};
pub use context::{CheckerContext, DiagnosticReporter, Session, SessionConfig};
pub use extension::{Extension, ExtensionHeader, ExtensionPayload};
pub use registry::{ExtensionRegistrar, ExtensionService};
pub use traits::{
    DeclarationChecker, ExpressionChecker,
    ExtensionFactory, FactoryMeta, FnFactory, factory_fn,
};

/// Re-export core types for plugin authors
pub mod prelude {
    pub use crate::{
        ApplicabilityFilter, CheckerContext, CheckerSet, DeclarationChecker,
        DeclarationCheckers, ExpressionChecker, ExpressionCheckers, Extension,
        ExtensionFactory, FactoryMeta, MetaAnnotationMode, Session,
    };
    pub use sema_core::prelude::*;
}
