use serde::Serialize;
use std::path::PathBuf;

use crate::symbol::Symbol;

/// Where activating a tree node should take the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationTarget {
    pub file: PathBuf,
    /// 0-indexed line.
    pub line: u32,
}

impl NavigationTarget {
    /// Tool lines are 1-based; editors want 0-based.
    pub fn from_symbol(symbol: &Symbol) -> Self {
        Self {
            file: PathBuf::from(&symbol.file),
            line: symbol.line.saturating_sub(1),
        }
    }
}

/// `go test` invocation for one test, or for the whole package when `name` is `None`.
pub fn test_command(name: Option<&str>) -> Vec<String> {
    let mut argv = vec!["go".to_string(), "test".to_string()];
    if let Some(name) = name.filter(|n| !n.is_empty()) {
        argv.push("-run".to_string());
        argv.push(format!("^{name}$"));
    }
    argv
}

/// `go test -bench` invocation for one benchmark, or all of them.
pub fn benchmark_command(name: Option<&str>) -> Vec<String> {
    let pattern = match name.filter(|n| !n.is_empty()) {
        Some(name) => format!("^{name}$"),
        None => ".".to_string(),
    };
    vec!["go".to_string(), "test".to_string(), "-bench".to_string(), pattern]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::SymbolKind;

    #[test]
    fn test_command_filters_by_exact_name() {
        assert_eq!(test_command(Some("TestAdd")).join(" "), "go test -run ^TestAdd$");
        assert_eq!(test_command(None).join(" "), "go test");
    }

    #[test]
    fn benchmark_command_defaults_to_all() {
        assert_eq!(benchmark_command(Some("BenchmarkAdd")).join(" "), "go test -bench ^BenchmarkAdd$");
        assert_eq!(benchmark_command(None).join(" "), "go test -bench .");
    }

    #[test]
    fn navigation_line_never_underflows() {
        let s = Symbol::new("x", SymbolKind::Var).with_location("/w/a.go", 0);
        assert_eq!(NavigationTarget::from_symbol(&s).line, 0);
        let s = Symbol::new("x", SymbolKind::Var).with_location("/w/a.go", 1);
        assert_eq!(NavigationTarget::from_symbol(&s).line, 0);
    }
}
