//! Sema Standard Plugins

pub mod annotations;
pub mod naming;
pub mod deprecation;
pub mod purity;
pub mod opt_in;

use sema_plugin::ExtensionRegistrar;
use thiserror::Error;

/// Diagnostic codes reported by the bundled checkers
pub mod codes {
    pub const NAMING_CLASS: &str = "NAMING_CLASS";
    pub const NAMING_FUNCTION: &str = "NAMING_FUNCTION";
    pub const DEPRECATED_CALL: &str = "DEPRECATED_CALL";
    pub const PURE_TARGET: &str = "PURE_TARGET";
    pub const IMPURE_CALL: &str = "IMPURE_CALL";
    pub const OPT_IN_REQUIRED: &str = "OPT_IN_REQUIRED";
    pub const OPT_IN_USAGE: &str = "OPT_IN_USAGE";
}

/// Names accepted by `load_plugins`, in load order
pub const STANDARD_PLUGINS: &[&str] = &["naming", "deprecation", "purity", "opt_in"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown plugin `{name}` (available: {})", STANDARD_PLUGINS.join(", "))]
pub struct UnknownPlugin {
    pub name: String,
}

fn load_plugin(registrar: ExtensionRegistrar, name: &str) -> Result<ExtensionRegistrar, UnknownPlugin> {
    let registrar = match name {
        "naming" => registrar.with_additional_checkers(naming::NamingPlugin),
        "deprecation" => registrar.with_additional_checkers(deprecation::DeprecationPlugin),
        "purity" => registrar.with_additional_checkers(purity::PurityPlugin),
        "opt_in" => registrar
            .with_additional_checkers(opt_in::OptInMarkersPlugin)
            .with_additional_checkers(opt_in::OptInUsagePlugin),
        other => return Err(UnknownPlugin { name: other.to_string() }),
    };
    Ok(registrar)
}

/// Load the named plugins into registrar, in the order given
pub fn load_plugins<S: AsRef<str>>(registrar: ExtensionRegistrar, names: &[S]) -> Result<ExtensionRegistrar, UnknownPlugin> {
    names.iter().try_fold(registrar, |registrar, name| load_plugin(registrar, name.as_ref().trim()))
}

/// Load every bundled plugin into registrar
pub fn load_standard_plugins(registrar: ExtensionRegistrar) -> ExtensionRegistrar {
    registrar
        .with_additional_checkers(naming::NamingPlugin)
        .with_additional_checkers(deprecation::DeprecationPlugin)
        .with_additional_checkers(purity::PurityPlugin)
        .with_additional_checkers(opt_in::OptInMarkersPlugin)
        .with_additional_checkers(opt_in::OptInUsagePlugin)
}

/// Create registrar with every bundled plugin
pub fn standard_registrar() -> ExtensionRegistrar {
    load_standard_plugins(ExtensionRegistrar::new())
}
