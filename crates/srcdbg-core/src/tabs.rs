#![forbid(unsafe_code)]

//! Open source tabs and the active selection.
//!
//! [`TabStore`] is a pure reducer over `open`, `select`, `close_one` /
//! `close_many`, and `move_tab`. Tabs keep open order. The active selection
//! is always either absent or the id of a currently open tab.
//!
//! # Reselection on close
//!
//! Closing evaluates reselection once, after all removals of the batch:
//!
//! 1. Active tab survived: selection unchanged.
//! 2. Active tab removed: the nearest surviving tab to its right.
//! 3. Otherwise the nearest surviving tab to its left.
//! 4. Otherwise no selection.

use ahash::AHashSet;

use crate::location::SourceId;

/// A single open tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    source_id: SourceId,
    url: String,
}

impl Tab {
    #[must_use]
    pub fn new(source_id: impl Into<SourceId>, url: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            url: url.into(),
        }
    }

    #[must_use]
    pub fn source_id(&self) -> &SourceId {
        &self.source_id
    }

    /// URL used for display and close-by-URL lookups.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Ordered open tabs plus the active selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabStore {
    tabs: Vec<Tab>,
    active: Option<SourceId>,
}

impl TabStore {
    /// Empty store: no tabs, nothing selected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tab unless `source_id` is already open.
    ///
    /// Never changes the active selection. Returns `true` if a tab was added.
    pub fn open(&mut self, source_id: SourceId, url: impl Into<String>) -> bool {
        if self.contains(&source_id) {
            return false;
        }
        self.tabs.push(Tab {
            source_id,
            url: url.into(),
        });
        true
    }

    /// Make `source_id` the active tab.
    ///
    /// Ignored when the source is not open. Returns `true` if the selection
    /// changed.
    pub fn select(&mut self, source_id: &SourceId) -> bool {
        if !self.contains(source_id) {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                target: "srcdbg.tabs",
                source_id = %source_id,
                reason = crate::rejection::Rejection::InvalidSelection.as_str(),
                "select ignored"
            );
            return false;
        }
        if self.active.as_ref() == Some(source_id) {
            return false;
        }
        #[cfg(feature = "tracing")]
        Self::log_switch("select", self.active.as_ref(), Some(source_id));
        self.active = Some(source_id.clone());
        true
    }

    /// Close every tab whose URL equals `url`.
    pub fn close_one(&mut self, url: &str) -> bool {
        self.close_many([url]) > 0
    }

    /// Close every tab whose URL is in `urls`, as one atomic step.
    ///
    /// Returns the number of tabs removed.
    pub fn close_many<I, S>(&mut self, urls: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let doomed: AHashSet<String> = urls
            .into_iter()
            .map(|url| url.as_ref().to_owned())
            .collect();
        if doomed.is_empty() {
            return 0;
        }

        let removed: Vec<bool> = self
            .tabs
            .iter()
            .map(|tab| doomed.contains(tab.url.as_str()))
            .collect();
        let removed_count = removed.iter().filter(|&&gone| gone).count();
        if removed_count == 0 {
            return 0;
        }

        let active_index = self.active.as_ref().and_then(|id| self.index_of(id));
        let next_active = match active_index {
            Some(idx) if removed[idx] => {
                let right = (idx + 1..self.tabs.len()).find(|&j| !removed[j]);
                let left = || (0..idx).rev().find(|&j| !removed[j]);
                right
                    .or_else(left)
                    .map(|j| self.tabs[j].source_id.clone())
            }
            _ => self.active.clone(),
        };

        let mut flags = removed.iter();
        self.tabs.retain(|_| !flags.next().copied().unwrap_or(false));

        #[cfg(feature = "tracing")]
        if next_active != self.active {
            Self::log_switch("close", self.active.as_ref(), next_active.as_ref());
        }
        self.active = next_active;
        removed_count
    }

    /// Move the tab for `url` to `to_index`, clamped to the last position.
    ///
    /// The active selection is unaffected. Returns `true` if the order changed.
    pub fn move_tab(&mut self, url: &str, to_index: usize) -> bool {
        let Some(from) = self.tabs.iter().position(|tab| tab.url == url) else {
            return false;
        };
        let to = to_index.min(self.tabs.len().saturating_sub(1));
        if from == to {
            return false;
        }
        let tab = self.tabs.remove(from);
        self.tabs.insert(to, tab);
        true
    }

    /// Open tabs in order.
    #[must_use]
    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Id of the active source, if any.
    #[must_use]
    pub fn active(&self) -> Option<&SourceId> {
        self.active.as_ref()
    }

    /// The active tab, if any.
    #[must_use]
    pub fn active_tab(&self) -> Option<&Tab> {
        let active = self.active.as_ref()?;
        self.tabs.iter().find(|tab| &tab.source_id == active)
    }

    #[must_use]
    pub fn contains(&self, source_id: &SourceId) -> bool {
        self.index_of(source_id).is_some()
    }

    #[must_use]
    pub fn url_of(&self, source_id: &SourceId) -> Option<&str> {
        self.tabs
            .iter()
            .find(|tab| &tab.source_id == source_id)
            .map(|tab| tab.url.as_str())
    }

    fn index_of(&self, source_id: &SourceId) -> Option<usize> {
        self.tabs.iter().position(|tab| &tab.source_id == source_id)
    }

    #[cfg(feature = "tracing")]
    fn log_switch(reason: &str, from: Option<&SourceId>, to: Option<&SourceId>) {
        tracing::debug!(
            target: "srcdbg.tabs",
            message = "tabs.switch",
            reason,
            from = ?from.map(SourceId::as_str),
            to = ?to.map(SourceId::as_str)
        );
    }
}
