//! Session and checker context

use sema_core::{Diagnostic, SessionId};
use serde::{Deserialize, Serialize};

/// Per-analysis settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub module_name: String,
    /// Number of files analysed concurrently against the session
    pub parallel_files: usize,
    /// Stop recording diagnostics past this count
    pub max_diagnostics: Option<usize>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            module_name: "main".to_string(),
            parallel_files: 1,
            max_diagnostics: None,
        }
    }
}

impl SessionConfig {
    pub fn with_module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = name.into();
        self
    }

    pub fn with_parallel_files(mut self, parallel_files: usize) -> Self {
        self.parallel_files = parallel_files.max(1);
        self
    }

    pub fn with_max_diagnostics(mut self, max: Option<usize>) -> Self {
        self.max_diagnostics = max;
        self
    }
}

/// Lifetime scope of one analysis run
///
/// Every extension and every cached composite belongs to exactly one
/// session and is dropped with it.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    config: SessionConfig,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self { id: SessionId::next(), config }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

/// Collects diagnostics up to an optional limit
#[derive(Debug, Default)]
pub struct DiagnosticReporter {
    diagnostics: Vec<Diagnostic>,
    limit: Option<usize>,
    dropped: usize,
}

impl DiagnosticReporter {
    pub fn new(limit: Option<usize>) -> Self {
        Self { diagnostics: Vec::new(), limit, dropped: 0 }
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        match self.limit {
            Some(limit) if self.diagnostics.len() >= limit => self.dropped += 1,
            _ => self.diagnostics.push(diagnostic),
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Diagnostics discarded because of the limit
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// Context passed to checkers
///
/// Fills in file, element path and checker name on every reported
/// diagnostic.
pub struct CheckerContext<'a> {
    session: &'a Session,
    file: &'a str,
    path: Vec<String>,
    checker: Option<String>,
    reporter: &'a mut DiagnosticReporter,
}

impl<'a> CheckerContext<'a> {
    pub fn new(session: &'a Session, file: &'a str, reporter: &'a mut DiagnosticReporter) -> Self {
        Self { session, file, path: Vec::new(), checker: None, reporter }
    }

    pub fn session(&self) -> &Session {
        self.session
    }

    pub fn file(&self) -> &str {
        self.file
    }

    /// Dotted path of the declaration being visited
    pub fn element_path(&self) -> String {
        self.path.join(".")
    }

    /// Names of the enclosing declarations, outermost first
    pub fn containing_declarations(&self) -> &[String] {
        &self.path
    }

    pub fn enter_declaration(&mut self, name: &str) {
        self.path.push(name.to_string());
    }

    pub fn exit_declaration(&mut self) {
        self.path.pop();
    }

    pub fn set_checker(&mut self, name: &str) {
        self.checker = Some(name.to_string());
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        let mut diagnostic = diagnostic.in_file(self.file);
        if diagnostic.element.is_none() && !self.path.is_empty() {
            diagnostic = diagnostic.on_element(self.element_path());
        }
        if let Some(ref checker) = self.checker {
            diagnostic = diagnostic.from_checker(checker.clone());
        }
        self.reporter.report(diagnostic);
    }
}
