//! Config field path used in diagnostics.

use owo_colors::OwoColorize;
use std::fmt;

/// A dotted path into `mlg.toml`, e.g. `theme.default`.
///
/// Sections expose their paths as associated constants:
///
/// ```ignore
/// diag.error(ThemeConfig::DEFAULT, "not an available theme");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath(pub &'static str);

impl FieldPath {
    #[inline]
    pub const fn new(path: &'static str) -> Self {
        Self(path)
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_args!("`{}`", self.0).bright_blue())
    }
}
