use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use crate::error::{OutlineError, Result};

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub dir: PathBuf,
    /// Matched case-insensitively against file names, e.g. ".go".
    pub source_extension: String,
}

fn dir_error(dir: &Path, source: std::io::Error) -> OutlineError {
    OutlineError::DirectoryRead {
        dir: dir.to_path_buf(),
        source,
    }
}

fn has_extension(path: &Path, extension_lower: &str) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().to_lowercase().ends_with(extension_lower))
        .unwrap_or(false)
}

/// Source files directly inside `opts.dir` (no recursion, nothing ignored), sorted.
pub fn source_files(opts: &ScanOptions) -> Result<Vec<PathBuf>> {
    let meta = std::fs::metadata(&opts.dir).map_err(|e| dir_error(&opts.dir, e))?;
    if !meta.is_dir() {
        return Err(dir_error(&opts.dir, std::io::Error::other("not a directory")));
    }

    let extension = opts.source_extension.to_lowercase();
    let walker = WalkBuilder::new(&opts.dir)
        .standard_filters(false)
        .max_depth(Some(1))
        .build();

    let mut files = Vec::new();
    for item in walker {
        let dent = match item {
            Ok(d) => d,
            Err(e) if e.depth().unwrap_or(0) == 0 => {
                let msg = e.to_string();
                let io = e.into_io_error().unwrap_or_else(|| std::io::Error::other(msg));
                return Err(dir_error(&opts.dir, io));
            }
            Err(_) => continue,
        };

        if dent.depth() == 0 || !dent.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }
        if has_extension(dent.path(), &extension) {
            files.push(dent.into_path());
        }
    }

    files.sort();
    Ok(files)
}

pub fn has_source_files(opts: &ScanOptions) -> Result<bool> {
    Ok(!source_files(opts)?.is_empty())
}
