//! Sema command-line checker
//!
//! Reads a module as JSON, analyses it with the selected bundled plugins
//! and writes the diagnostics to stdout.
//!
//! Environment:
//! - SEMA_PLUGINS: default for `--plugins`
//! - SEMA_JOBS: default for `--jobs`
//! - SEMA_LOG: log filter, `warn` when unset

mod config;

use anyhow::{Context, Result};
use clap::Parser;
use config::{Args, OutputFormat};
use sema::{AnalysisResult, Analyzer};
use sema_core::Module;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let env_filter = EnvFilter::try_from_env("SEMA_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn read_module(path: &Path) -> Result<Module> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).context("failed to read module from stdin")?;
        buf
    } else {
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?
    };
    serde_json::from_str(&content).with_context(|| format!("invalid module JSON in {}", path.display()))
}

fn render_text(result: &AnalysisResult) -> String {
    let mut out = String::new();
    for diagnostic in &result.diagnostics {
        out.push_str(&diagnostic.to_string());
        out.push('\n');
    }
    if result.dropped > 0 {
        out.push_str(&format!("... {} more diagnostics not shown\n", result.dropped));
    }
    out
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging();

    if args.list_plugins {
        for name in sema_std::STANDARD_PLUGINS {
            println!("{}", name);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let path = args.module.as_deref().context("no module given")?;
    let module = read_module(path)?;
    debug!(module = %module.name, files = module.files.len(), "module loaded");

    let registrar = args.registrar()?;
    let analyzer = Analyzer::new(registrar).with_config(args.session_config(&module.name));
    let result = analyzer.analyze(&module).context("checker composition failed")?;
    info!(diagnostics = result.diagnostics.len(), "done");

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => print!("{}", render_text(&result)),
    }

    Ok(if result.has_errors() { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sema_core::{Declaration, SourceFile};

    #[test]
    fn test_module_json_shape() {
        let json = r#"{
            "name": "shop",
            "files": [{
                "path": "cart.kt",
                "declarations": [{
                    "name": "cart",
                    "kind": "class",
                    "members": [{
                        "name": "total",
                        "kind": "function",
                        "annotations": [{ "fqn": "lang.Pure" }],
                        "body": [{ "kind": "call", "callee": "log" }]
                    }]
                }]
            }]
        }"#;
        let module: Module = serde_json::from_str(json).unwrap();
        let result = Analyzer::with_standard_plugins().analyze(&module).unwrap();
        let found: Vec<&str> = result.diagnostics.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(found, vec!["NAMING_CLASS", "IMPURE_CALL"]);
    }

    #[test]
    fn test_render_text() {
        let module = Module::new("m").with_file(SourceFile::new("a.kt").with_declaration(Declaration::class("a")));
        let result = Analyzer::with_standard_plugins().analyze(&module).unwrap();
        let text = render_text(&result);
        assert!(text.starts_with("a.kt: warning [NAMING_CLASS]"));
        assert_eq!(text.lines().count(), 1);
    }
}
