//! Command-line arguments and their resolution

use clap::{Parser, ValueEnum};
use sema_plugin::{ExtensionRegistrar, SessionConfig};
use sema_std::UnknownPlugin;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

/// Run the bundled checkers over a module description.
#[derive(Parser, Debug)]
#[command(name = "sema-check")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Module JSON file, `-` for stdin.
    #[arg(required_unless_present = "list_plugins")]
    pub module: Option<PathBuf>,

    /// Plugins to load, comma separated. Defaults to every bundled plugin.
    #[arg(long, env = "SEMA_PLUGINS", value_delimiter = ',')]
    pub plugins: Vec<String>,

    /// Files analysed concurrently.
    #[arg(short, long, env = "SEMA_JOBS", default_value_t = 1)]
    pub jobs: usize,

    /// Stop recording diagnostics past this count.
    #[arg(long)]
    pub max_diagnostics: Option<usize>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Print the bundled plugin names and exit.
    #[arg(long)]
    pub list_plugins: bool,
}

impl Args {
    /// Plugin names with empty entries removed
    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.trim()).filter(|p| !p.is_empty()).collect()
    }

    pub fn registrar(&self) -> Result<ExtensionRegistrar, UnknownPlugin> {
        let names = self.plugin_names();
        if names.is_empty() {
            return Ok(sema_std::standard_registrar());
        }
        sema_std::load_plugins(ExtensionRegistrar::new(), names.as_slice())
    }

    pub fn session_config(&self, module_name: &str) -> SessionConfig {
        SessionConfig::default()
            .with_module_name(module_name)
            .with_parallel_files(self.jobs)
            .with_max_diagnostics(self.max_diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sema_core::ExtensionPointName;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("sema-check").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["module.json"]);
        assert_eq!(args.module, Some(PathBuf::from("module.json")));
        assert_eq!(args.format, OutputFormat::Json);

        let config = args.session_config("shop");
        assert_eq!(config.module_name, "shop");
        assert_eq!(config.max_diagnostics, None);
    }

    #[test]
    fn test_plugin_selection() {
        let args = parse(&["m.json", "--plugins", "purity,naming"]);
        assert_eq!(args.plugin_names(), vec!["purity", "naming"]);
        let registrar = args.registrar().unwrap();
        assert_eq!(
            registrar.factory_names(&ExtensionPointName::ADDITIONAL_CHECKERS),
            vec!["purity", "naming"]
        );

        let unknown = parse(&["m.json", "--plugins", "naming,typo"]);
        assert_eq!(unknown.registrar().unwrap_err().name, "typo");
    }

    #[test]
    fn test_jobs_and_limit() {
        let args = parse(&["m.json", "--jobs", "0", "--max-diagnostics", "10", "--format", "text"]);
        let config = args.session_config("m");
        assert_eq!(config.parallel_files, 1);
        assert_eq!(config.max_diagnostics, Some(10));
        assert_eq!(args.format, OutputFormat::Text);
    }

    #[test]
    fn test_module_required_unless_listing() {
        assert!(Args::try_parse_from(["sema-check"]).is_err());
        let args = parse(&["--list-plugins"]);
        assert!(args.list_plugins);
        assert!(args.module.is_none());
    }
}
