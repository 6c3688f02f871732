//! Decides when the symbol store must be refreshed, and guards it against
//! late results.
//!
//! Every refresh takes a request number. A result is applied only if no
//! newer request was issued while it was being extracted; switching the
//! workspace issues a new request too, so a slow extraction for the old
//! directory can never overwrite the new one.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::FilesConfig;
use crate::scanner::{has_source_files, ScanOptions};
use crate::store::SymbolStore;
use crate::tool::SymbolSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// The requested directory already is the workspace root.
    Unchanged,
    /// No path given and no workspace root set yet.
    NoWorkspace,
    /// Store replaced with this many symbols.
    Applied(usize),
    /// The directory has no source files; the store was cleared.
    NoQualifyingFiles,
    /// A newer request was issued before this one finished; its result was dropped.
    Superseded,
    /// Store left unchanged.
    DirectoryReadFailed(String),
    /// Store left unchanged.
    ExtractionFailed(String),
}

#[derive(Default)]
struct RequestState {
    root: Option<PathBuf>,
    latest: u64,
}

pub struct ReloadController<S> {
    source: S,
    store: Arc<SymbolStore>,
    source_extension: String,
    state: Mutex<RequestState>,
}

impl<S: SymbolSource> ReloadController<S> {
    pub fn new(source: S, store: Arc<SymbolStore>, files: &FilesConfig) -> Self {
        Self {
            source,
            store,
            source_extension: files.source_extension.clone(),
            state: Mutex::new(RequestState::default()),
        }
    }

    pub fn store(&self) -> &Arc<SymbolStore> {
        &self.store
    }

    pub fn workspace_root(&self) -> Option<PathBuf> {
        self.state().root.clone()
    }

    /// Reload for `path` (a file selects its directory), or refresh the
    /// current root when `path` is `None`.
    pub async fn reload(&self, path: Option<&Path>) -> ReloadOutcome {
        let (seq, dir) = {
            let mut state = self.state();
            match path {
                Some(path) => {
                    let dir = workspace_dir(path);
                    if state.root.as_deref() == Some(dir.as_path()) {
                        return ReloadOutcome::Unchanged;
                    }
                    tracing::debug!(
                        "Changing working directory from {} to {}",
                        state.root.as_deref().map(|p| p.display().to_string()).unwrap_or_default(),
                        dir.display()
                    );
                    state.root = Some(dir.clone());
                    self.store.clear();
                    state.latest += 1;
                    (state.latest, dir)
                }
                None => {
                    let Some(dir) = state.root.clone() else {
                        return ReloadOutcome::NoWorkspace;
                    };
                    state.latest += 1;
                    (state.latest, dir)
                }
            }
        };

        self.refresh_dir(seq, &dir).await
    }

    pub async fn refresh(&self) -> ReloadOutcome {
        self.reload(None).await
    }

    async fn refresh_dir(&self, seq: u64, dir: &Path) -> ReloadOutcome {
        let opts = ScanOptions {
            dir: dir.to_path_buf(),
            source_extension: self.source_extension.clone(),
        };

        match has_source_files(&opts) {
            Err(e) => {
                tracing::warn!("Reading directory: {}; Error: {e}", dir.display());
                return ReloadOutcome::DirectoryReadFailed(e.to_string());
            }
            Ok(false) => {
                return self.apply(seq, || {
                    self.store.clear();
                    tracing::info!("Reading directory: {}; Contains no source files", dir.display());
                    ReloadOutcome::NoQualifyingFiles
                });
            }
            Ok(true) => {}
        }

        match self.source.extract(dir).await {
            Err(e) => {
                tracing::warn!("{e}");
                ReloadOutcome::ExtractionFailed(e.to_string())
            }
            Ok(symbols) => self.apply(seq, move || {
                let count = symbols.len();
                self.store.replace(symbols);
                tracing::info!("Reading directory: {}; Results: {count}", dir.display());
                ReloadOutcome::Applied(count)
            }),
        }
    }

    /// Run `update` only if `seq` is still the newest request. The state lock
    /// is held throughout so no newer request can slip in between.
    fn apply(&self, seq: u64, update: impl FnOnce() -> ReloadOutcome) -> ReloadOutcome {
        let state = self.state();
        if state.latest != seq {
            tracing::debug!("Dropping result of request {seq}; request {} is newer", state.latest);
            return ReloadOutcome::Superseded;
        }
        update()
    }

    fn state(&self) -> MutexGuard<'_, RequestState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A file path selects its parent directory; anything else is taken as a directory.
fn workspace_dir(path: &Path) -> PathBuf {
    if path.is_file() {
        if let Some(parent) = path.parent() {
            return parent.to_path_buf();
        }
    }
    path.to_path_buf()
}
