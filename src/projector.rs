//! Symbol snapshot -> tree views.
//!
//! Three projections are derived from one sorted snapshot:
//!  - `Main`: non-test symbols grouped under Types/Functions/Variables/Constants,
//!    with methods nested under the type they are declared on.
//!  - `Tests` / `Benchmarks`: flat lists of test-file functions carrying the
//!    configured name prefix.
//!
//! Every function here is pure over its inputs; nothing is cached between calls.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::commands::NavigationTarget;
use crate::config::Config;
use crate::symbol::{Symbol, SymbolKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    Main,
    Tests,
    Benchmarks,
}

impl ViewKind {
    pub const ALL: [ViewKind; 3] = [ViewKind::Main, ViewKind::Tests, ViewKind::Benchmarks];

    pub fn name(self) -> &'static str {
        match self {
            ViewKind::Main => "Main",
            ViewKind::Tests => "Tests",
            ViewKind::Benchmarks => "Benchmarks",
        }
    }
}

/// Naming conventions the projections filter on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRules {
    pub test_suffix: String,
    pub test_prefix: String,
    pub benchmark_prefix: String,
}

impl ViewRules {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            test_suffix: cfg.files.test_suffix.clone(),
            test_prefix: cfg.views.test_prefix.clone(),
            benchmark_prefix: cfg.views.benchmark_prefix.clone(),
        }
    }

    /// The symbols `view` is built from, in snapshot order.
    pub fn select(&self, view: ViewKind, snapshot: &[Symbol]) -> Vec<Symbol> {
        snapshot.iter().filter(|s| self.belongs_to(view, s)).cloned().collect()
    }

    fn belongs_to(&self, view: ViewKind, s: &Symbol) -> bool {
        let is_test_file = s.is_test_file(&self.test_suffix);
        match view {
            ViewKind::Main => !is_test_file,
            ViewKind::Tests => is_test_file && s.kind == SymbolKind::Func && s.label.starts_with(&self.test_prefix),
            ViewKind::Benchmarks => {
                is_test_file && s.kind == SymbolKind::Func && s.label.starts_with(&self.benchmark_prefix)
            }
        }
    }
}

impl Default for ViewRules {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Collapsible {
    None,
    Collapsed,
}

/// A symbol as shown in a tree view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    #[serde(flatten)]
    pub symbol: Symbol,
    pub collapsible: Collapsible,
}

impl Node {
    pub fn leaf(symbol: Symbol) -> Self {
        Self {
            symbol,
            collapsible: Collapsible::None,
        }
    }

    fn collapsed(symbol: Symbol) -> Self {
        Self {
            symbol,
            collapsible: Collapsible::Collapsed,
        }
    }

    pub fn label(&self) -> &str {
        &self.symbol.label
    }

    pub fn is_expandable(&self) -> bool {
        self.collapsible == Collapsible::Collapsed
    }

    /// Navigation for activating the node; synthetic nodes have none.
    pub fn command(&self) -> Option<NavigationTarget> {
        if self.symbol.is_root() || self.symbol.file.is_empty() {
            return None;
        }
        Some(NavigationTarget::from_symbol(&self.symbol))
    }

    pub fn icon(&self) -> Option<&'static str> {
        if self.symbol.is_root() {
            return None;
        }
        match self.symbol.kind {
            SymbolKind::Type => Some("class"),
            SymbolKind::Var => Some("field"),
            SymbolKind::Const => Some("constant"),
            SymbolKind::Func => Some("method"),
            SymbolKind::None => None,
        }
    }

    pub fn context_value(&self) -> &'static str {
        "symbol"
    }
}

/// Main-outline index over one snapshot.
///
/// Test-file symbols are dropped up front; methods are indexed by receiver
/// once so expanding a type is a map lookup.
pub struct SymbolTree<'a> {
    symbols: Vec<&'a Symbol>,
    methods: HashMap<&'a str, Vec<&'a Symbol>>,
    type_labels: HashSet<&'a str>,
}

impl<'a> SymbolTree<'a> {
    pub fn new(snapshot: &'a [Symbol], rules: &ViewRules) -> Self {
        let symbols: Vec<&Symbol> = snapshot
            .iter()
            .filter(|s| !s.is_root() && !s.is_test_file(&rules.test_suffix))
            .collect();

        let mut methods: HashMap<&str, Vec<&Symbol>> = HashMap::new();
        let mut type_labels = HashSet::new();
        for &s in &symbols {
            if let Some(receiver) = s.nesting_receiver() {
                methods.entry(receiver).or_default().push(s);
            }
            if s.kind == SymbolKind::Type {
                type_labels.insert(s.label.as_str());
            }
        }

        Self {
            symbols,
            methods,
            type_labels,
        }
    }

    /// Top level of the main outline.
    pub fn roots(&self) -> Vec<Node> {
        if self.symbols.is_empty() {
            return vec![Node::leaf(Symbol::placeholder())];
        }

        let mut out: Vec<Node> = SymbolKind::CATEGORIES
            .into_iter()
            .filter(|kind| self.symbols.iter().any(|s| self.in_category(s, *kind)))
            .map(|kind| Node::collapsed(Symbol::root(kind)))
            .collect();

        // Undecodable records stay visible after the categories.
        out.extend(
            self.symbols
                .iter()
                .filter(|s| s.kind == SymbolKind::None)
                .map(|s| Node::leaf((*s).clone())),
        );
        out
    }

    /// Children of a root or of a type node. Anything else is a leaf.
    pub fn children(&self, parent: &Node) -> Vec<Node> {
        let category = parent.symbol.root_category;
        if category != SymbolKind::None {
            return self
                .symbols
                .iter()
                .filter(|s| self.in_category(s, category))
                .map(|s| self.node_for(s))
                .collect();
        }

        if parent.symbol.kind != SymbolKind::Type {
            return vec![];
        }
        self.methods
            .get(parent.symbol.label.as_str())
            .map(|methods| methods.iter().map(|s| Node::leaf((*s).clone())).collect())
            .unwrap_or_default()
    }

    fn node_for(&self, s: &Symbol) -> Node {
        if s.kind == SymbolKind::Type && self.methods.contains_key(s.label.as_str()) {
            Node::collapsed(s.clone())
        } else {
            Node::leaf(s.clone())
        }
    }

    fn in_category(&self, s: &Symbol, category: SymbolKind) -> bool {
        if s.kind != category {
            return false;
        }
        match s.nesting_receiver() {
            // Methods live under their type, unless the type is not in this snapshot.
            Some(receiver) => !self.type_labels.contains(receiver),
            None => true,
        }
    }
}

pub fn project_main(snapshot: &[Symbol], rules: &ViewRules) -> Vec<Node> {
    SymbolTree::new(snapshot, rules).roots()
}

/// Children of `parent` in the main outline of `snapshot`.
pub fn expand(snapshot: &[Symbol], rules: &ViewRules, parent: &Node) -> Vec<Node> {
    SymbolTree::new(snapshot, rules).children(parent)
}

pub fn project_tests(snapshot: &[Symbol], rules: &ViewRules) -> Vec<Node> {
    rules.select(ViewKind::Tests, snapshot).into_iter().map(Node::leaf).collect()
}

pub fn project_benchmarks(snapshot: &[Symbol], rules: &ViewRules) -> Vec<Node> {
    rules.select(ViewKind::Benchmarks, snapshot).into_iter().map(Node::leaf).collect()
}

pub fn project(view: ViewKind, snapshot: &[Symbol], rules: &ViewRules) -> Vec<Node> {
    match view {
        ViewKind::Main => project_main(snapshot, rules),
        ViewKind::Tests => project_tests(snapshot, rules),
        ViewKind::Benchmarks => project_benchmarks(snapshot, rules),
    }
}
