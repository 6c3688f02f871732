use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, OutlineError>;

#[derive(Debug, Error)]
pub enum OutlineError {
    /// Extraction or helper binary is not installed anywhere we look.
    #[error("missing tool: {tool}")]
    ToolMissing { tool: String },

    /// A helper invocation (version query, install) did not succeed.
    #[error("{tool} failed: {detail}")]
    ToolFailed { tool: String, detail: String },

    #[error("symbol extraction failed for {}: {detail}", .dir.display())]
    ExtractionFailed { dir: PathBuf, detail: String },

    #[error("cannot read directory {}: {source}", .dir.display())]
    DirectoryRead {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The tool printed something that is not a JSON array of records.
    #[error("malformed tool output: {0}")]
    MalformedOutput(#[from] serde_json::Error),

    #[error("malformed symbol record #{index}: {reason}")]
    MalformedRecord { index: usize, reason: String },
}
