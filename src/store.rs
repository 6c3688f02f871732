//! The live symbol list and its per-view change notifications.
//!
//! The store holds exactly one snapshot. `replace` swaps it wholesale and
//! pushes the filtered symbol list of each view (main, tests, benchmarks) to
//! that view's `watch` channel while still holding the write lock, so every
//! subscriber observes replacements in the same order and never a mix of two.

use std::cmp::Ordering;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::watch;

use crate::projector::{ViewKind, ViewRules};
use crate::symbol::Symbol;

pub type Snapshot = Arc<Vec<Symbol>>;

pub struct SymbolStore {
    rules: ViewRules,
    current: RwLock<Snapshot>,
    main_tx: watch::Sender<Snapshot>,
    tests_tx: watch::Sender<Snapshot>,
    benchmarks_tx: watch::Sender<Snapshot>,
}

impl SymbolStore {
    pub fn new(rules: ViewRules) -> Self {
        let empty: Snapshot = Arc::new(Vec::new());
        Self {
            rules,
            current: RwLock::new(empty.clone()),
            main_tx: watch::Sender::new(empty.clone()),
            tests_tx: watch::Sender::new(empty.clone()),
            benchmarks_tx: watch::Sender::new(empty),
        }
    }

    pub fn rules(&self) -> &ViewRules {
        &self.rules
    }

    /// Sort by label (see [`compare_labels`]) and make `symbols` the current snapshot.
    pub fn replace(&self, mut symbols: Vec<Symbol>) {
        symbols.sort_by(|a, b| compare_labels(&a.label, &b.label));
        let snapshot: Snapshot = Arc::new(symbols);

        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = snapshot.clone();
        for view in ViewKind::ALL {
            let selected = Arc::new(self.rules.select(view, &snapshot));
            self.sender(view).send_replace(selected);
        }
        tracing::debug!("Symbol store replaced: {} symbols", snapshot.len());
    }

    pub fn clear(&self) {
        self.replace(Vec::new());
    }

    pub fn current(&self) -> Snapshot {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Receiver that yields the symbols of `view` after every replacement.
    pub fn subscribe(&self, view: ViewKind) -> watch::Receiver<Snapshot> {
        self.sender(view).subscribe()
    }

    fn sender(&self, view: ViewKind) -> &watch::Sender<Snapshot> {
        match view {
            ViewKind::Main => &self.main_tx,
            ViewKind::Tests => &self.tests_tx,
            ViewKind::Benchmarks => &self.benchmarks_tx,
        }
    }
}

/// Label collation: letters compare alphabetically ignoring case, and only
/// when two labels differ in case alone does lowercase come first. Underscores
/// sort before digits, digits before letters.
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    let primary = |s: &str| -> Vec<(u8, char)> {
        s.chars()
            .map(|c| {
                let class = if c.is_alphabetic() {
                    2
                } else if c.is_numeric() {
                    1
                } else {
                    0
                };
                (class, c.to_lowercase().next().unwrap_or(c))
            })
            .collect()
    };
    let case = |s: &str| -> Vec<bool> { s.chars().map(char::is_uppercase).collect() };

    primary(a)
        .cmp(&primary(b))
        .then_with(|| case(a).cmp(&case(b)))
        .then_with(|| a.cmp(b))
}

impl Default for SymbolStore {
    fn default() -> Self {
        Self::new(ViewRules::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::SymbolKind;

    fn sym(label: &str, file: &str) -> Symbol {
        Symbol::new(label, SymbolKind::Func).with_location(file, 1)
    }

    fn labels(snapshot: &[Symbol]) -> Vec<&str> {
        snapshot.iter().map(|s| s.label.as_str()).collect()
    }

    #[test]
    fn replace_sorts_by_label() {
        let store = SymbolStore::default();
        store.replace(vec![sym("b", "/w/a.go"), sym("B", "/w/a.go"), sym("a", "/w/a.go")]);
        assert_eq!(labels(&store.current()), vec!["a", "b", "B"]);
    }

    #[test]
    fn exported_and_unexported_names_interleave() {
        let store = SymbolStore::default();
        store.replace(vec![
            sym("newServer", "/w/a.go"),
            sym("Close", "/w/a.go"),
            sym("abort", "/w/a.go"),
            sym("B", "/w/a.go"),
            sym("b", "/w/a.go"),
            sym("a", "/w/a.go"),
        ]);
        assert_eq!(labels(&store.current()), vec!["a", "abort", "b", "B", "Close", "newServer"]);
    }

    #[test]
    fn underscores_and_digits_sort_before_letters() {
        assert_eq!(compare_labels("_init", "a"), Ordering::Less);
        assert_eq!(compare_labels("v2", "v_x"), Ordering::Greater);
        assert_eq!(compare_labels("x1", "xa"), Ordering::Less);
        assert_eq!(compare_labels("ServeHTTP", "serveHttp"), Ordering::Greater);
    }

    #[test]
    fn replace_notifies_each_view_with_its_symbols() {
        let store = SymbolStore::default();
        let mut main = store.subscribe(ViewKind::Main);
        let mut tests = store.subscribe(ViewKind::Tests);
        let mut benches = store.subscribe(ViewKind::Benchmarks);

        store.replace(vec![
            sym("New", "/w/a.go"),
            sym("TestNew", "/w/a_test.go"),
            sym("BenchmarkNew", "/w/a_test.go"),
        ]);

        assert!(main.has_changed().unwrap());
        assert!(tests.has_changed().unwrap());
        assert!(benches.has_changed().unwrap());
        assert_eq!(labels(&main.borrow_and_update()), vec!["New"]);
        assert_eq!(labels(&tests.borrow_and_update()), vec!["TestNew"]);
        assert_eq!(labels(&benches.borrow_and_update()), vec!["BenchmarkNew"]);
    }

    #[test]
    fn second_replace_fully_supersedes_first() {
        let store = SymbolStore::default();
        let main = store.subscribe(ViewKind::Main);
        store.replace(vec![sym("One", "/w/a.go"), sym("Two", "/w/a.go")]);
        store.replace(vec![sym("Three", "/w/b.go")]);
        assert_eq!(labels(&store.current()), vec!["Three"]);
        assert_eq!(labels(&main.borrow()), vec!["Three"]);
    }

    #[test]
    fn clear_empties_every_view() {
        let store = SymbolStore::default();
        let tests = store.subscribe(ViewKind::Tests);
        store.replace(vec![sym("TestX", "/w/x_test.go")]);
        store.clear();
        assert!(store.current().is_empty());
        assert!(tests.borrow().is_empty());
    }
}
