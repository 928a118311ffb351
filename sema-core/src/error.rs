//! Extension framework errors
//!
//! Every variant is fatal for the session that hit it. Configuration errors
//! are plugin authoring defects; a factory failure aborts composition of the
//! whole extension point. Nothing here is retried.

use crate::{ExtensionPointName, SessionId};
use thiserror::Error;

/// Standard error codes (machine-readable)
pub mod codes {
    pub const EMPTY_FILTER: &str = "EMPTY_FILTER";
    pub const REGISTRATION_CLOSED: &str = "REGISTRATION_CLOSED";
    pub const POINT_MISMATCH: &str = "POINT_MISMATCH";
    pub const FOREIGN_SESSION: &str = "FOREIGN_SESSION";
    pub const FACTORY_FAILED: &str = "FACTORY_FAILED";
    pub const PLUGIN: &str = "PLUGIN_ERROR";
}

#[derive(Debug, Error)]
pub enum ExtensionError {
    #[error("FILTERED applicability declared without any annotation to filter on")]
    EmptyFilter,

    #[error("extension point `{point}` is closed: its composite has already been read")]
    RegistrationClosed { point: ExtensionPointName },

    #[error("factory `{factory}` registered for `{expected}` produced an extension for `{actual}`")]
    PointMismatch {
        factory: String,
        expected: ExtensionPointName,
        actual: ExtensionPointName,
    },

    #[error("factory `{factory}` produced an extension bound to session {actual}, expected {expected}")]
    ForeignSession {
        factory: String,
        expected: SessionId,
        actual: SessionId,
    },

    #[error("factory `{factory}` failed for extension point `{point}`: {source}")]
    FactoryFailed {
        point: ExtensionPointName,
        factory: String,
        #[source]
        source: Box<ExtensionError>,
    },

    #[error("plugin `{plugin}`: {message}")]
    Plugin { plugin: String, message: String },
}

impl ExtensionError {
    /// Error raised by a plugin while building its session-scoped state
    pub fn plugin(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Plugin { plugin: plugin.into(), message: message.into() }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ExtensionError::EmptyFilter => codes::EMPTY_FILTER,
            ExtensionError::RegistrationClosed { .. } => codes::REGISTRATION_CLOSED,
            ExtensionError::PointMismatch { .. } => codes::POINT_MISMATCH,
            ExtensionError::ForeignSession { .. } => codes::FOREIGN_SESSION,
            ExtensionError::FactoryFailed { .. } => codes::FACTORY_FAILED,
            ExtensionError::Plugin { .. } => codes::PLUGIN,
        }
    }

    /// True for plugin authoring defects, as opposed to failures raised by a
    /// plugin at construction time.
    pub fn is_configuration(&self) -> bool {
        match self {
            ExtensionError::EmptyFilter
            | ExtensionError::RegistrationClosed { .. }
            | ExtensionError::PointMismatch { .. }
            | ExtensionError::ForeignSession { .. } => true,
            ExtensionError::FactoryFailed { source, .. } => source.is_configuration(),
            ExtensionError::Plugin { .. } => false,
        }
    }

    /// Innermost error, unwrapping factory failures
    pub fn root_cause(&self) -> &ExtensionError {
        match self {
            ExtensionError::FactoryFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
