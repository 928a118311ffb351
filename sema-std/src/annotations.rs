//! Well-known annotation names

pub const DEPRECATED: &str = "lang.Deprecated";
pub const PURE: &str = "lang.Pure";
pub const REQUIRES_OPT_IN: &str = "lang.RequiresOptIn";
pub const OPT_IN: &str = "lang.OptIn";
