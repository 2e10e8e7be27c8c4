//! Exported entry points and how to find them.

use std::ffi::CStr;

/// One way of locating an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// By exported name.
    Name(&'static CStr),
    /// By export-table ordinal (Windows only).
    Ordinal(u16),
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resolution::Name(name) => write!(f, "name {}", name.to_string_lossy()),
            Resolution::Ordinal(ordinal) => write!(f, "ordinal {}", ordinal),
        }
    }
}

/// A required export, with resolution strategies tried in order.
#[derive(Debug, Clone, Copy)]
pub struct EntryPoint {
    pub label: &'static str,
    pub strategies: &'static [Resolution],
}

impl EntryPoint {
    /// Human-readable description listing every strategy.
    pub fn describe(&self) -> String {
        let tried = self
            .strategies
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        format!("{} ({})", self.label, tried)
    }
}

/// `const char *HMVersion(void)`, exported as ordinal 1 by older builds.
pub const VERSION_STRING: EntryPoint = EntryPoint {
    label: "HMVersion",
    strategies: &[Resolution::Name(c"HMVersion"), Resolution::Ordinal(1)],
};

/// `uint32_t HMVersionInt(void)`, exported as ordinal 2 by older builds.
pub const VERSION_INT: EntryPoint = EntryPoint {
    label: "HMVersionInt",
    strategies: &[Resolution::Name(c"HMVersionInt"), Resolution::Ordinal(2)],
};
