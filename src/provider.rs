use tokio::sync::watch;

use crate::projector::{Node, SymbolTree, ViewKind, ViewRules};
use crate::store::{Snapshot, SymbolStore};

/// Tree data for one view, kept current by the store's notification channel.
pub struct TreeProvider {
    view: ViewKind,
    rules: ViewRules,
    rx: watch::Receiver<Snapshot>,
}

impl TreeProvider {
    pub fn new(view: ViewKind, store: &SymbolStore) -> Self {
        Self {
            view,
            rules: store.rules().clone(),
            rx: store.subscribe(view),
        }
    }

    /// Host context key toggled by `is_populated`.
    pub fn context_key(&self) -> String {
        format!("showGoOutliner{}View", self.view.name())
    }

    /// Whether the view has anything to show.
    pub fn is_populated(&self) -> bool {
        !self.rx.borrow().is_empty()
    }

    /// True once if the store was replaced since the last call.
    pub fn take_change(&mut self) -> bool {
        let changed = self.rx.has_changed().unwrap_or(false);
        if changed {
            self.rx.mark_unchanged();
        }
        changed
    }

    /// Resolves when the store is next replaced; `false` if the store is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Top level when `parent` is `None`, otherwise the children of `parent`.
    pub fn children(&self, parent: Option<&Node>) -> Vec<Node> {
        let symbols = self.rx.borrow().clone();
        match (self.view, parent) {
            (ViewKind::Main, None) => SymbolTree::new(&symbols, &self.rules).roots(),
            (ViewKind::Main, Some(parent)) => SymbolTree::new(&symbols, &self.rules).children(parent),
            (_, None) => symbols.iter().cloned().map(Node::leaf).collect(),
            (_, Some(_)) => vec![],
        }
    }
}
