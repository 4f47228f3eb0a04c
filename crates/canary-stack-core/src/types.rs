//! Element type and origin metadata.

use serde::Serialize;
use std::fmt;

/// The stack element type.
pub type Element = f64;

/// Where and how a stack was created. Used only in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Provenance {
    /// Declared variable name.
    pub name: &'static str,
    /// Source file of the construction site.
    pub file: &'static str,
    /// Source line of the construction site.
    pub line: u32,
    /// Enclosing function of the construction site.
    pub function: &'static str,
}

impl Provenance {
    /// Create provenance from explicit parts.
    pub const fn new(
        name: &'static str,
        file: &'static str,
        line: u32,
        function: &'static str,
    ) -> Self {
        Self {
            name,
            file,
            line,
            function,
        }
    }

    /// Provenance for stacks built without a declared name.
    pub const UNKNOWN: Self = Self::new("<anonymous>", "<unknown>", 0, "<unknown>");
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} born at {}: {} ({})", self.name, self.file, self.line, self.function)
    }
}

/// The call site that triggered a check or a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CallSite {
    pub file: &'static str,
    pub line: u32,
    /// The stack operation in progress (`push`, `pop`, ...).
    pub operation: &'static str,
}

impl CallSite {
    pub const fn new(file: &'static str, line: u32, operation: &'static str) -> Self {
        Self {
            file,
            line,
            operation,
        }
    }

    /// Capture the caller's location. Propagates through `#[track_caller]` frames.
    #[track_caller]
    pub fn caller(operation: &'static str) -> Self {
        let location = std::panic::Location::caller();
        Self::new(location.file(), location.line(), operation)
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.file, self.line, self.operation)
    }
}

#[doc(hidden)]
pub fn type_name_of<T>(_: T) -> &'static str {
    std::any::type_name::<T>()
}

/// Expands to the path of the enclosing function.
#[macro_export]
macro_rules! function_name {
    () => {{
        fn here() {}
        let name = $crate::types::type_name_of(here);
        let name = name.strip_suffix("::here").unwrap_or(name);
        name.strip_suffix("::{{closure}}").unwrap_or(name)
    }};
}

/// Capture [`Provenance`] for a variable name at the invocation site.
#[macro_export]
macro_rules! provenance {
    ($name:ident) => {
        $crate::types::Provenance::new(
            ::core::stringify!($name),
            ::core::file!(),
            ::core::line!(),
            $crate::function_name!(),
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_name() {
        let name = crate::function_name!();
        assert!(name.ends_with("tests::test_function_name"), "got {name}");
    }

    #[test]
    fn test_provenance_macro() {
        let provenance = crate::provenance!(stk);
        assert_eq!(provenance.name, "stk");
        assert!(provenance.file.ends_with("types.rs"));
        assert!(provenance.function.ends_with("test_provenance_macro"));
        assert!(provenance.line > 0);
    }

    #[test]
    fn test_call_site_caller() {
        let site = CallSite::caller("push");
        assert_eq!(site.operation, "push");
        assert_eq!(site.line, line!() - 2);
    }

    #[test]
    fn test_provenance_display() {
        let p = Provenance::new("stk", "main.rs", 12, "main");
        assert_eq!(p.to_string(), "stk born at main.rs: 12 (main)");
    }
}
