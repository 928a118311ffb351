//! Sema - Semantic analysis host
//!
//! Opens one session per analysis, seeds its extension service from a
//! registrar, reads the composite checker set once and dispatches every
//! rule over every file of the module.

mod dispatch;

pub use dispatch::Dispatcher;

use sema_core::{Diagnostic, ExtensionError, Module, Severity, SessionId, SourceFile};
use sema_plugin::{
    CheckerContext, CompositeCheckerSet, DiagnosticReporter, ExtensionRegistrar, ExtensionService,
    Session, SessionConfig,
};
use serde::Serialize;
use std::sync::Arc;
use std::thread;
use tracing::{debug, info};

/// Outcome of analysing one module
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub session: SessionId,
    pub module: String,
    /// In file order, then visit order within each file
    pub diagnostics: Vec<Diagnostic>,
    /// Diagnostics discarded past `max_diagnostics`
    pub dropped: usize,
}

impl AnalysisResult {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == severity).count()
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty() && self.dropped == 0
    }
}

/// Main analysis engine
pub struct Analyzer {
    registrar: Arc<ExtensionRegistrar>,
    config: SessionConfig,
}

impl Analyzer {
    pub fn new(registrar: ExtensionRegistrar) -> Self {
        Self {
            registrar: Arc::new(registrar),
            config: SessionConfig::default(),
        }
    }

    pub fn with_standard_plugins() -> Self {
        Self::new(sema_std::standard_registrar())
    }

    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn registrar(&self) -> &ExtensionRegistrar {
        &self.registrar
    }

    /// New session with a service seeded from the registrar
    ///
    /// Hosts that register session-local factories do so on the returned
    /// service, then pass it to `analyze_in`.
    pub fn open_session(&self) -> ExtensionService {
        let session = Arc::new(Session::new(self.config.clone()));
        ExtensionService::for_session(session, &self.registrar)
    }

    pub fn analyze(&self, module: &Module) -> Result<AnalysisResult, ExtensionError> {
        let service = self.open_session();
        self.analyze_in(&service, module)
    }

    /// Analyse `module` against an already opened session
    pub fn analyze_in(&self, service: &ExtensionService, module: &Module) -> Result<AnalysisResult, ExtensionError> {
        let session = service.session();
        let composite = service.additional_checkers()?;
        info!(
            session = %session.id(),
            module = %module.name,
            files = module.files.len(),
            rules = composite.declarations().len() + composite.expressions().len(),
            "analysis started"
        );

        let config = session.config();
        let reports = if config.parallel_files > 1 && module.files.len() > 1 {
            check_parallel(session, &composite, &module.files, config.parallel_files)
        } else {
            module.files.iter().map(|file| check_file(session, &composite, file)).collect()
        };

        let mut diagnostics = Vec::new();
        let mut dropped = 0;
        for report in reports {
            dropped += report.dropped;
            diagnostics.extend(report.diagnostics);
        }
        if let Some(limit) = config.max_diagnostics {
            if diagnostics.len() > limit {
                dropped += diagnostics.len() - limit;
                diagnostics.truncate(limit);
            }
        }

        info!(session = %session.id(), diagnostics = diagnostics.len(), dropped, "analysis finished");
        Ok(AnalysisResult {
            session: session.id(),
            module: module.name.clone(),
            diagnostics,
            dropped,
        })
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::with_standard_plugins()
    }
}

struct FileReport {
    diagnostics: Vec<Diagnostic>,
    dropped: usize,
}

fn check_file(session: &Session, composite: &CompositeCheckerSet, file: &SourceFile) -> FileReport {
    let mut reporter = DiagnosticReporter::new(session.config().max_diagnostics);
    let mut ctx = CheckerContext::new(session, &file.path, &mut reporter);
    Dispatcher::new(composite).check_file(file, &mut ctx);

    debug!(file = %file.path, diagnostics = reporter.diagnostics().len(), "file checked");
    let dropped = reporter.dropped();
    FileReport { diagnostics: reporter.into_diagnostics(), dropped }
}

/// Files split into contiguous chunks, one scoped thread per chunk
fn check_parallel(
    session: &Session,
    composite: &CompositeCheckerSet,
    files: &[SourceFile],
    jobs: usize,
) -> Vec<FileReport> {
    let chunk_size = files.len().div_ceil(jobs);
    thread::scope(|scope| {
        let handles: Vec<_> = files
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || {
                    chunk.iter().map(|file| check_file(session, composite, file)).collect::<Vec<_>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|handle| match handle.join() {
                Ok(reports) => reports,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    })
}
