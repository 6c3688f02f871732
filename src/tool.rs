//! Boundary to the external `go-outliner` binary.
//!
//! The binary does the real parsing: `go-outliner <dir>` prints a JSON array
//! of symbol records, `go-outliner -version` prints `Version X.Y.Z`.

use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tokio::process::Command;

use crate::config::ToolConfig;
use crate::error::{OutlineError, Result};
use crate::symbol::{decode_symbols, Symbol};
use crate::version::sem_ver;

/// Anything that can turn a workspace directory into a symbol list.
#[async_trait]
pub trait SymbolSource: Send + Sync {
    async fn extract(&self, dir: &Path) -> Result<Vec<Symbol>>;
}

/// Finds tool binaries in the Go install locations and on PATH.
///
/// Hits are cached per tool name for the locator's lifetime.
pub struct ToolLocator {
    search_dirs: Vec<PathBuf>,
    cache: Mutex<HashMap<String, PathBuf>>,
}

impl ToolLocator {
    /// GOPATH and GOROOT entries, `$HOME/go`, then PATH entries.
    pub fn from_env() -> Self {
        let mut dirs = Vec::new();
        for var in ["GOPATH", "GOROOT"] {
            if let Some(value) = std::env::var_os(var) {
                dirs.extend(std::env::split_paths(&value));
            }
        }
        if let Some(home) = dirs::home_dir() {
            dirs.push(home.join("go"));
        }
        if let Some(value) = std::env::var_os("PATH") {
            dirs.extend(std::env::split_paths(&value));
        }
        Self::with_dirs(dirs)
    }

    pub fn with_dirs(dirs: Vec<PathBuf>) -> Self {
        Self {
            search_dirs: expand_bin_dirs(dirs),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn find(&self, tool: &str) -> Result<PathBuf> {
        if let Some(hit) = self.cache.lock().unwrap_or_else(PoisonError::into_inner).get(tool) {
            return Ok(hit.clone());
        }

        let missing = || OutlineError::ToolMissing { tool: tool.to_string() };
        let paths: OsString = std::env::join_paths(&self.search_dirs).map_err(|_| missing())?;
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let found = which::which_in(tool, Some(paths), cwd).map_err(|_| {
            tracing::debug!("Could not find {tool:?}");
            missing()
        })?;

        tracing::debug!("Found {tool:?} at {}", found.display());
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(tool.to_string(), found.clone());
        Ok(found)
    }
}

/// Each directory, plus its `bin/` child unless it already is a `bin` directory.
fn expand_bin_dirs(dirs: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut out = Vec::with_capacity(dirs.len() * 2);
    for dir in dirs {
        if dir.as_os_str().is_empty() {
            continue;
        }
        let is_bin = dir
            .file_name()
            .map(|n| n.to_string_lossy().eq_ignore_ascii_case("bin"))
            .unwrap_or(false);
        if !is_bin {
            let bin = dir.join("bin");
            out.push(dir);
            out.push(bin);
        } else {
            out.push(dir);
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionStatus {
    Current { have: String },
    Outdated { have: String, want: String },
}

/// argv that (re)installs the extraction tool.
pub fn install_command(config: &ToolConfig) -> Vec<String> {
    vec![
        config.installer.clone(),
        "install".to_string(),
        config.install_package.clone(),
    ]
}

pub struct GoOutliner {
    bin: PathBuf,
    config: ToolConfig,
}

impl GoOutliner {
    /// Use the configured path when set, otherwise search for `config.name`.
    pub fn locate(config: &ToolConfig, locator: &ToolLocator) -> Result<Self> {
        let bin = match &config.path {
            Some(path) if path.is_file() => path.clone(),
            Some(path) => {
                tracing::warn!("Configured tool path {} does not exist", path.display());
                return Err(OutlineError::ToolMissing {
                    tool: config.name.clone(),
                });
            }
            None => locator.find(&config.name)?,
        };
        Ok(Self {
            bin,
            config: config.clone(),
        })
    }

    pub fn bin(&self) -> &Path {
        &self.bin
    }

    /// Raw `-version` output.
    pub async fn version(&self) -> Result<String> {
        let output = Command::new(&self.bin)
            .arg("-version")
            .output()
            .await
            .map_err(|e| OutlineError::ToolFailed {
                tool: self.config.name.clone(),
                detail: e.to_string(),
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() || !stderr.trim().is_empty() {
            tracing::debug!("{} -version: {} {}", self.config.name, output.status, stderr.trim());
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    pub async fn check_version(&self) -> Result<VersionStatus> {
        let have = self.version().await?;
        let want = self.config.min_version.clone();
        tracing::debug!("Tool version check: want (min) {want}; have {}", have.trim());

        if sem_ver(&have, &want) == Ordering::Less {
            Ok(VersionStatus::Outdated { have, want })
        } else {
            Ok(VersionStatus::Current { have })
        }
    }

    /// Run the installer; the installer itself must be locatable.
    pub async fn install(config: &ToolConfig, locator: &ToolLocator) -> Result<()> {
        let argv = install_command(config);
        let installer = locator.find(&argv[0])?;
        tracing::info!("Executing {} {}", installer.display(), argv[1..].join(" "));

        let output = Command::new(&installer)
            .args(&argv[1..])
            .output()
            .await
            .map_err(|e| OutlineError::ToolFailed {
                tool: config.installer.clone(),
                detail: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(OutlineError::ToolFailed {
                tool: config.installer.clone(),
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SymbolSource for GoOutliner {
    async fn extract(&self, dir: &Path) -> Result<Vec<Symbol>> {
        let failed = |detail: String| OutlineError::ExtractionFailed {
            dir: dir.to_path_buf(),
            detail,
        };

        let output = Command::new(&self.bin)
            .arg(dir)
            .output()
            .await
            .map_err(|e| failed(e.to_string()))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(failed(format!("{}\n\nAdditional Info:\n{}", output.status, stderr.trim())));
        }
        if !stderr.trim().is_empty() {
            tracing::warn!("{} wrote to stderr for {}: {}", self.config.name, dir.display(), stderr.trim());
        }

        decode_symbols(&String::from_utf8_lossy(&output.stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bin_subdirectory_is_added_once() {
        let dirs = expand_bin_dirs(vec![
            PathBuf::from("/home/u/go"),
            PathBuf::from("/usr/local/bin"),
            PathBuf::new(),
        ]);
        assert_eq!(
            dirs,
            vec![
                PathBuf::from("/home/u/go"),
                PathBuf::from("/home/u/go/bin"),
                PathBuf::from("/usr/local/bin"),
            ]
        );
    }

    #[test]
    fn missing_tool_is_reported() {
        let tmp = tempfile::TempDir::new().unwrap();
        let locator = ToolLocator::with_dirs(vec![tmp.path().to_path_buf()]);
        let err = locator.find("go-outliner-does-not-exist").unwrap_err();
        assert!(matches!(err, OutlineError::ToolMissing { .. }));
    }

    #[test]
    fn configured_path_must_exist() {
        let config = ToolConfig {
            path: Some(PathBuf::from("/definitely/not/here/go-outliner")),
            ..ToolConfig::default()
        };
        let locator = ToolLocator::with_dirs(vec![]);
        assert!(matches!(
            GoOutliner::locate(&config, &locator),
            Err(OutlineError::ToolMissing { .. })
        ));
    }

    #[test]
    fn install_uses_go_install() {
        assert_eq!(
            install_command(&ToolConfig::default()).join(" "),
            "go install github.com/766b/go-outliner@latest"
        );
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        fn fake_tool(dir: &Path, name: &str, script: &str) -> PathBuf {
            let path = dir.join(name);
            std::fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[test]
        fn locator_finds_and_caches() {
            let tmp = tempfile::TempDir::new().unwrap();
            let bin_dir = tmp.path().join("bin");
            std::fs::create_dir(&bin_dir).unwrap();
            let tool = fake_tool(&bin_dir, "go-outliner", "exit 0");

            // Only the parent is listed; bin/ is searched implicitly.
            let locator = ToolLocator::with_dirs(vec![tmp.path().to_path_buf()]);
            assert_eq!(locator.find("go-outliner").unwrap(), tool);

            std::fs::remove_file(&tool).unwrap();
            assert_eq!(locator.find("go-outliner").unwrap(), tool);
        }

        #[tokio::test]
        async fn extract_decodes_stdout() {
            let tmp = tempfile::TempDir::new().unwrap();
            let bin = fake_tool(
                tmp.path(),
                "go-outliner",
                r#"echo '[{"label":"Foo","type":"type","receiver":"","file":"a.go","start":0,"end":1,"line":1}]'"#,
            );
            let config = ToolConfig {
                path: Some(bin),
                ..ToolConfig::default()
            };
            let tool = GoOutliner::locate(&config, &ToolLocator::with_dirs(vec![])).unwrap();
            let symbols = tool.extract(tmp.path()).await.unwrap();
            assert_eq!(symbols.len(), 1);
            assert_eq!(symbols[0].label, "Foo");
        }

        #[tokio::test]
        async fn failing_tool_is_extraction_failure() {
            let tmp = tempfile::TempDir::new().unwrap();
            let bin = fake_tool(tmp.path(), "go-outliner", "echo 'no Go files' >&2\nexit 1");
            let config = ToolConfig {
                path: Some(bin),
                ..ToolConfig::default()
            };
            let tool = GoOutliner::locate(&config, &ToolLocator::with_dirs(vec![])).unwrap();
            let err = tool.extract(tmp.path()).await.unwrap_err();
            match err {
                OutlineError::ExtractionFailed { detail, .. } => assert!(detail.contains("no Go files")),
                other => panic!("unexpected error: {other}"),
            }
        }

        #[tokio::test]
        async fn outdated_version_is_detected() {
            let tmp = tempfile::TempDir::new().unwrap();
            let bin = fake_tool(tmp.path(), "go-outliner", "echo 'Version 0.2.9'");
            let config = ToolConfig {
                path: Some(bin),
                ..ToolConfig::default()
            };
            let tool = GoOutliner::locate(&config, &ToolLocator::with_dirs(vec![])).unwrap();
            assert!(matches!(tool.check_version().await.unwrap(), VersionStatus::Outdated { .. }));
        }
    }
}
