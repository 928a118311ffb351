//! Identity values
//!
//! Extension point names, annotation names and session ids are lookup keys:
//! they are compared and hashed, never mutated.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Name of one extension point kind, e.g. `ExtensionCheckers`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionPointName(Cow<'static, str>);

impl ExtensionPointName {
    /// The point plugins use to contribute additional declaration and
    /// expression checkers.
    pub const ADDITIONAL_CHECKERS: ExtensionPointName = ExtensionPointName::from_static("ExtensionCheckers");

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExtensionPointName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExtensionPointName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Fully-qualified name of an annotation class
///
/// Opaque to the extension framework: only equality and hashing matter.
/// Backed by a shared string so that cloning into filter sets is cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationFqn(Arc<str>);

impl AnnotationFqn {
    pub fn new(fqn: impl AsRef<str>) -> Self {
        Self(Arc::from(fqn.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last segment of the name (`lang.Deprecated` -> `Deprecated`)
    pub fn short_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for AnnotationFqn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AnnotationFqn {
    fn from(fqn: &str) -> Self {
        Self::new(fqn)
    }
}

impl From<String> for AnnotationFqn {
    fn from(fqn: String) -> Self {
        Self(Arc::from(fqn))
    }
}

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique id of an analysis session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(u64);

impl SessionId {
    /// Allocate a fresh id. Ids are never reused within a process.
    pub fn next() -> Self {
        Self(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
