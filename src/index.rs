//! Page index: listing, category filtering, and embedding selection.
//!
//! [`PageIndex`] owns the fetched page listing, the backend-derived
//! two-level [`CategoryTree`], the current category filters, and the
//! selection set targeted for embedding. Filtering is a pure function of
//! the loaded pages and the two filters; the selection is only ever mutated
//! by explicit toggles and always stays a subset of the known page ids.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::client::BackendClient;
use crate::config::ConnectionConfig;
use crate::notify::Notifier;

/// One page of the external document source.
///
/// `path` is the ordered list of category labels above the page, root
/// first. Entries are immutable once fetched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageEntry {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub path: Vec<String>,
}

impl PageEntry {
    /// True when `label` is a component of this page's category path.
    #[must_use]
    pub fn path_contains(&self, label: &str) -> bool {
        self.path.iter().any(|component| component == label)
    }
}

/// Level-1 label → level-2 label → page count, as derived by the backend.
pub type CategoryTree = FxHashMap<String, FxHashMap<String, usize>>;

/// A hierarchical filter position: everything, or one category label.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    /// Matches every page unconditionally.
    #[default]
    All,
    /// Matches pages whose path contains this label.
    Label(String),
}

impl CategoryFilter {
    /// Builds a filter for one category label.
    #[must_use]
    pub fn label(label: impl Into<String>) -> Self {
        CategoryFilter::Label(label.into())
    }

    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, CategoryFilter::All)
    }

    fn as_label(&self) -> Option<&str> {
        match self {
            CategoryFilter::All => None,
            CategoryFilter::Label(label) => Some(label),
        }
    }

    fn matches(&self, page: &PageEntry) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Label(label) => page.path_contains(label),
        }
    }
}

/// Errors raised by index operations.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum IndexError {
    /// Fetch attempted before a successful source connection.
    #[error("no active source connection")]
    #[diagnostic(
        code(ragline::index::no_connection),
        help("Connect to the document source before fetching its page index.")
    )]
    NoConnection,

    /// The backend could not deliver the page listing.
    #[error("failed to fetch page index: {detail}")]
    #[diagnostic(code(ragline::index::fetch))]
    Fetch { detail: String },
}

/// The fetched page listing with filtering and selection state.
#[derive(Debug)]
pub struct PageIndex {
    pages: Vec<PageEntry>,
    tree: CategoryTree,
    level1: CategoryFilter,
    level2: CategoryFilter,
    selection: FxHashSet<String>,
    notifier: Notifier,
}

impl PageIndex {
    #[must_use]
    pub fn new(notifier: Notifier) -> Self {
        Self {
            pages: Vec::new(),
            tree: CategoryTree::default(),
            level1: CategoryFilter::All,
            level2: CategoryFilter::All,
            selection: FxHashSet::default(),
            notifier,
        }
    }

    /// Fetches the full page listing, replacing the entire index.
    ///
    /// On success the previous listing is dropped wholesale (no incremental
    /// merge), the selection is pruned to ids that still exist, and both
    /// filters reset. On failure the index reverts to "no index loaded".
    #[instrument(skip(self, client, config), err)]
    pub async fn fetch(
        &mut self,
        client: &BackendClient,
        config: &ConnectionConfig,
    ) -> Result<usize, IndexError> {
        match client.fetch_categories(config).await {
            Ok(payload) => {
                self.install_listing(payload.pages, payload.category_tree);
                tracing::info!(pages = self.pages.len(), "page index replaced");
                self.notifier
                    .success(format!("{}개의 문서를 불러왔습니다.", self.pages.len()));
                Ok(self.pages.len())
            }
            Err(error) => {
                let detail = error.detail();
                self.clear();
                self.notifier.error(detail.clone());
                Err(IndexError::Fetch { detail })
            }
        }
    }

    /// Installs a listing directly, applying the same atomic replacement
    /// rules as [`fetch`](Self::fetch): the previous listing is dropped
    /// wholesale, the selection is pruned to ids that still exist, and both
    /// filters reset. Useful for seeding an index without a backend.
    pub fn install_listing(&mut self, pages: Vec<PageEntry>, tree: CategoryTree) {
        let known: FxHashSet<&str> = pages.iter().map(|page| page.id.as_str()).collect();
        self.selection.retain(|id| known.contains(id.as_str()));
        self.pages = pages;
        self.tree = tree;
        self.level1 = CategoryFilter::All;
        self.level2 = CategoryFilter::All;
    }

    /// Drops the listing, tree, filters, and selection.
    pub fn clear(&mut self) {
        self.pages.clear();
        self.tree.clear();
        self.level1 = CategoryFilter::All;
        self.level2 = CategoryFilter::All;
        self.selection.clear();
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        !self.pages.is_empty()
    }

    #[must_use]
    pub fn pages(&self) -> &[PageEntry] {
        &self.pages
    }

    #[must_use]
    pub fn category_tree(&self) -> &CategoryTree {
        &self.tree
    }

    /// Sorted level-1 labels for listing in a filter control.
    #[must_use]
    pub fn level1_labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.tree.keys().map(String::as_str).collect();
        labels.sort_unstable();
        labels
    }

    /// Sorted level-2 labels under the current level-1 scope.
    ///
    /// Empty while level-1 is [`CategoryFilter::All`]: level-2 choices are
    /// only meaningful within a level-1 scope.
    #[must_use]
    pub fn level2_labels(&self) -> Vec<&str> {
        let Some(level1) = self.level1.as_label() else {
            return Vec::new();
        };
        let mut labels: Vec<&str> = self
            .tree
            .get(level1)
            .map(|children| children.keys().map(String::as_str).collect())
            .unwrap_or_default();
        labels.sort_unstable();
        labels
    }

    #[must_use]
    pub fn level1(&self) -> &CategoryFilter {
        &self.level1
    }

    #[must_use]
    pub fn level2(&self) -> &CategoryFilter {
        &self.level2
    }

    /// Sets the level-1 filter.
    ///
    /// Invariant: this always resets the level-2 filter to `All` — level-2
    /// choices are scoped to one level-1 category and would dangle
    /// otherwise.
    pub fn set_level1(&mut self, filter: CategoryFilter) {
        self.level1 = filter;
        self.level2 = CategoryFilter::All;
    }

    pub fn set_level2(&mut self, filter: CategoryFilter) {
        self.level2 = filter;
    }

    /// The pages visible under the current filters, in listing order.
    ///
    /// Pure with respect to (pages, level-1, level-2). Matching is by path
    /// containment, not exact position: a page passes a `Label` filter when
    /// the label appears anywhere in its category path.
    pub fn filtered_pages(&self) -> impl Iterator<Item = &PageEntry> {
        self.pages
            .iter()
            .filter(|page| self.level1.matches(page) && self.level2.matches(page))
    }

    /// Asks the backend to resolve the current filters to page ids.
    #[instrument(skip(self, client, config), err)]
    pub async fn filter_remote(
        &self,
        client: &BackendClient,
        config: &ConnectionConfig,
    ) -> Result<Vec<String>, IndexError> {
        match client
            .filter_pages(config, self.level1.as_label(), self.level2.as_label())
            .await
        {
            Ok(filtered) => {
                self.notifier
                    .success(format!("{}개 페이지 필터링 완료", filtered.count));
                Ok(filtered.page_ids)
            }
            Err(error) => {
                let detail = error.detail();
                self.notifier.error(detail.clone());
                Err(IndexError::Fetch { detail })
            }
        }
    }

    /// The current embedding selection.
    #[must_use]
    pub fn selection(&self) -> &FxHashSet<String> {
        &self.selection
    }

    #[must_use]
    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.contains(id)
    }

    /// Flips selection membership for a known page id.
    ///
    /// Unknown ids are ignored, keeping the selection a subset of the
    /// loaded listing.
    pub fn toggle(&mut self, id: &str) {
        if !self.pages.iter().any(|page| page.id == id) {
            return;
        }
        if !self.selection.remove(id) {
            self.selection.insert(id.to_owned());
        }
    }

    /// Selects or deselects every currently filtered page.
    ///
    /// This is itself a toggle scoped to the current filter: when every
    /// visible id is already selected they are all deselected, otherwise
    /// the visible ids are unioned in. Ids outside the current filter are
    /// untouched either way, and repeating the call under an unchanged
    /// filter restores the previous selection.
    pub fn select_all_filtered(&mut self) {
        let visible: Vec<String> = self
            .filtered_pages()
            .map(|page| page.id.clone())
            .collect();
        let all_selected = visible.iter().all(|id| self.selection.contains(id));
        if all_selected {
            for id in &visible {
                self.selection.remove(id);
            }
        } else {
            self.selection.extend(visible);
        }
    }
}
