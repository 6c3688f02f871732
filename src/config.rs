use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the optional per-workspace settings file.
pub const CONFIG_FILE_NAME: &str = ".go-outliner.json";

/// Where the symbol extraction tool lives and how to keep it current.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Binary name searched on GOPATH/GOROOT/$HOME/go/PATH.
    pub name: String,
    /// Explicit binary path; skips the search when set.
    pub path: Option<PathBuf>,
    /// Minimum accepted `-version` output, in the tool's own "Label X.Y.Z" form.
    pub min_version: String,
    /// Toolchain binary used for `install`.
    pub installer: String,
    pub install_package: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            name: "go-outliner".to_string(),
            path: None,
            min_version: "Version 0.3.0".to_string(),
            installer: "go".to_string(),
            install_package: "github.com/766b/go-outliner@latest".to_string(),
        }
    }
}

/// File naming conventions of the source ecosystem.
///
/// Both comparisons are case-insensitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// A directory is worth extracting only if it holds a file with this extension.
    pub source_extension: String,
    /// Symbols from files ending with this suffix are test-file symbols.
    pub test_suffix: String,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            source_extension: ".go".to_string(),
            test_suffix: "_test.go".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewsConfig {
    pub test_prefix: String,
    pub benchmark_prefix: String,
}

impl Default for ViewsConfig {
    fn default() -> Self {
        Self {
            test_prefix: "Test".to_string(),
            benchmark_prefix: "Benchmark".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tool: ToolConfig,
    pub files: FilesConfig,
    pub views: ViewsConfig,
    /// Verbose diagnostics on stderr (debug level unless RUST_LOG says otherwise).
    pub enable_debug_channel: bool,
}

pub fn load_config(root: &Path) -> Config {
    let primary = root.join(CONFIG_FILE_NAME);

    let text = std::fs::read_to_string(&primary);
    let Ok(text) = text else { return Config::default() };

    serde_json::from_str::<Config>(&text).unwrap_or_else(|e| {
        tracing::warn!("Ignoring {}: {}", primary.display(), e);
        Config::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let cfg = load_config(tmp.path());
        assert_eq!(cfg.tool.name, "go-outliner");
        assert_eq!(cfg.files.test_suffix, "_test.go");
        assert!(!cfg.enable_debug_channel);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            r#"{"tool": {"path": "/opt/bin/go-outliner"}, "enable_debug_channel": true}"#,
        )
        .unwrap();

        let cfg = load_config(tmp.path());
        assert_eq!(cfg.tool.path, Some(PathBuf::from("/opt/bin/go-outliner")));
        assert_eq!(cfg.tool.min_version, "Version 0.3.0");
        assert_eq!(cfg.views.benchmark_prefix, "Benchmark");
        assert!(cfg.enable_debug_channel);
    }

    #[test]
    fn garbage_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILE_NAME), "not json").unwrap();
        let cfg = load_config(tmp.path());
        assert_eq!(cfg.files.source_extension, ".go");
    }
}
