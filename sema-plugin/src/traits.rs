//! Plugin traits

use crate::{CheckerContext, Extension, Session};
use sema_core::{Declaration, Expression, ExtensionError};
use serde::Serialize;

/// Rule run against declarations
pub trait DeclarationChecker: Send + Sync {
    fn name(&self) -> &str;
    fn check(&self, declaration: &Declaration, ctx: &mut CheckerContext<'_>);
}

/// Rule run against expressions
pub trait ExpressionChecker: Send + Sync {
    fn name(&self) -> &str;
    fn check(&self, expression: &Expression, ctx: &mut CheckerContext<'_>);
}

/// Metadata for an extension factory
#[derive(Debug, Clone, Serialize)]
pub struct FactoryMeta {
    pub name: &'static str,
    pub description: &'static str,
}

/// Builds one extension per session
///
/// `create` is called at most once per session for each registration. A
/// factory may allocate fresh state on every call but must not share
/// mutable state between sessions, which can run concurrently.
pub trait ExtensionFactory: Send + Sync {
    fn meta(&self) -> FactoryMeta;
    fn create(&self, session: &Session) -> Result<Extension, ExtensionError>;
}

/// Factory backed by a closure
pub struct FnFactory<F> {
    name: &'static str,
    create: F,
}

impl<F> ExtensionFactory for FnFactory<F>
where
    F: Fn(&Session) -> Result<Extension, ExtensionError> + Send + Sync,
{
    fn meta(&self) -> FactoryMeta {
        FactoryMeta { name: self.name, description: "" }
    }

    fn create(&self, session: &Session) -> Result<Extension, ExtensionError> {
        (self.create)(session)
    }
}

/// Wrap a closure as a named factory
pub fn factory_fn<F>(name: &'static str, create: F) -> FnFactory<F>
where
    F: Fn(&Session) -> Result<Extension, ExtensionError> + Send + Sync,
{
    FnFactory { name, create }
}
