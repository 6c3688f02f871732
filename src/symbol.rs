use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{OutlineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Type,
    Func,
    Var,
    Const,
    /// Synthetic grouping nodes, and records whose kind could not be decoded.
    #[default]
    None,
}

impl SymbolKind {
    /// Category roots of the main outline, in display order.
    pub const CATEGORIES: [SymbolKind; 4] = [SymbolKind::Type, SymbolKind::Func, SymbolKind::Var, SymbolKind::Const];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "type" => Some(SymbolKind::Type),
            "func" => Some(SymbolKind::Func),
            "var" => Some(SymbolKind::Var),
            "const" => Some(SymbolKind::Const),
            _ => None,
        }
    }

    /// Label of the category root grouping this kind.
    pub fn root_label(self) -> Option<&'static str> {
        match self {
            SymbolKind::Type => Some("Types"),
            SymbolKind::Func => Some("Functions"),
            SymbolKind::Var => Some("Variables"),
            SymbolKind::Const => Some("Constants"),
            SymbolKind::None => None,
        }
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SymbolKind::Type => write!(f, "type"),
            SymbolKind::Func => write!(f, "func"),
            SymbolKind::Var => write!(f, "var"),
            SymbolKind::Const => write!(f, "const"),
            SymbolKind::None => write!(f, "none"),
        }
    }
}

/// One source symbol as reported by the extraction tool, or a synthetic node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Symbol {
    pub label: String,
    #[serde(rename = "type")]
    pub kind: SymbolKind,
    /// Type the function is declared on; empty for free functions and non-functions.
    pub receiver: String,
    pub file: String,
    /// Byte offsets of the declaration.
    pub start: u64,
    pub end: u64,
    /// 1-based line of the declaration.
    pub line: u32,
    /// Set only on synthetic category roots. Real symbols always carry `None`.
    pub root_category: SymbolKind,
}

pub const NO_RESULTS_LABEL: &str = "No results.";
pub const UNKNOWN_LABEL: &str = "unknown";

impl Symbol {
    pub fn new(label: impl Into<String>, kind: SymbolKind) -> Self {
        Self {
            label: label.into(),
            kind,
            ..Self::default()
        }
    }

    pub fn with_receiver(mut self, receiver: impl Into<String>) -> Self {
        self.receiver = receiver.into();
        self
    }

    pub fn with_location(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = file.into();
        self.line = line;
        self
    }

    /// Category root for `kind`.
    pub fn root(kind: SymbolKind) -> Self {
        Self {
            label: kind.root_label().unwrap_or_default().to_string(),
            root_category: kind,
            ..Self::default()
        }
    }

    pub fn placeholder() -> Self {
        Self::new(NO_RESULTS_LABEL, SymbolKind::None)
    }

    /// Visible stand-in for a record that failed to decode.
    pub fn unknown(label: Option<&str>) -> Self {
        let label = label.filter(|l| !l.is_empty()).unwrap_or(UNKNOWN_LABEL);
        Self::new(label, SymbolKind::None)
    }

    pub fn is_root(&self) -> bool {
        self.root_category != SymbolKind::None
    }

    pub fn is_test_file(&self, test_suffix: &str) -> bool {
        !test_suffix.is_empty() && self.file.to_lowercase().ends_with(&test_suffix.to_lowercase())
    }

    /// Receiver this symbol nests under. Only functions nest; a receiver on
    /// any other kind is ignored.
    pub fn nesting_receiver(&self) -> Option<&str> {
        if self.kind == SymbolKind::Func && !self.receiver.is_empty() {
            Some(self.receiver.as_str())
        } else {
            None
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawSymbol {
    label: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    receiver: Option<String>,
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    start: Option<u64>,
    #[serde(default)]
    end: Option<u64>,
    #[serde(default)]
    line: Option<u32>,
}

/// Decode one record of the tool's JSON output.
pub fn decode_record(index: usize, value: &Value) -> Result<Symbol> {
    let malformed = |reason: String| OutlineError::MalformedRecord { index, reason };

    let raw: RawSymbol = serde_json::from_value(value.clone()).map_err(|e| malformed(e.to_string()))?;

    let label = raw
        .label
        .filter(|l| !l.is_empty())
        .ok_or_else(|| malformed("missing label".to_string()))?;
    let kind_text = raw.kind.ok_or_else(|| malformed("missing type".to_string()))?;
    let kind = SymbolKind::parse(&kind_text).ok_or_else(|| malformed(format!("unknown type {kind_text:?}")))?;

    Ok(Symbol {
        label,
        kind,
        receiver: raw.receiver.unwrap_or_default(),
        file: raw.file.unwrap_or_default(),
        start: raw.start.unwrap_or_default(),
        end: raw.end.unwrap_or_default(),
        line: raw.line.unwrap_or_default(),
        root_category: SymbolKind::None,
    })
}

/// Decode the full tool output. The output itself must be a JSON array;
/// individual bad records become "unknown" leaves instead of failing the batch.
pub fn decode_symbols(text: &str) -> Result<Vec<Symbol>> {
    let values: Vec<Value> = serde_json::from_str(text)?;

    let symbols = values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            decode_record(index, value).unwrap_or_else(|e| {
                tracing::warn!("{e}");
                Symbol::unknown(value.get("label").and_then(Value::as_str))
            })
        })
        .collect();

    Ok(symbols)
}
