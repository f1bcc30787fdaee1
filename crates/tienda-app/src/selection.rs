// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ProductId;

/// What happens to checked rows when a new page of results lands.
/// `PageScoped` clears the set so stale ids from an earlier page cannot
/// linger; `Global` accumulates across pages for a prospective cross-page
/// bulk action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionPolicy {
    PageScoped,
    Global,
}

impl SelectionPolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PageScoped => "page_scoped",
            Self::Global => "global",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "page_scoped" => Some(Self::PageScoped),
            "global" => Some(Self::Global),
            _ => None,
        }
    }
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self::PageScoped
    }
}

/// Client-side set of checked catalog rows. Never contacts the store; bulk
/// actions over the set are not wired up yet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    policy: SelectionPolicy,
    checked: BTreeSet<ProductId>,
}

impl Selection {
    pub fn new(policy: SelectionPolicy) -> Self {
        Self {
            policy,
            checked: BTreeSet::new(),
        }
    }

    pub const fn policy(&self) -> SelectionPolicy {
        self.policy
    }

    pub fn is_checked(&self, id: ProductId) -> bool {
        self.checked.contains(&id)
    }

    pub fn count(&self) -> usize {
        self.checked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checked.is_empty()
    }

    pub fn toggle(&mut self, id: ProductId) {
        if !self.checked.remove(&id) {
            self.checked.insert(id);
        }
    }

    /// Pivot is "every currently visible row is already checked", not
    /// "anything is checked": a fully checked page empties the set, anything
    /// less checks the whole page.
    pub fn toggle_all(&mut self, visible: &[ProductId]) {
        let all_checked =
            !visible.is_empty() && visible.iter().all(|id| self.checked.contains(id));
        if all_checked {
            self.checked.clear();
        } else {
            self.checked = visible.iter().copied().collect();
        }
    }

    /// Called whenever a fresh page of rows replaces the visible set.
    pub fn on_page_loaded(&mut self) {
        if self.policy == SelectionPolicy::PageScoped {
            self.checked.clear();
        }
    }

    pub fn clear(&mut self) {
        self.checked.clear();
    }
}
