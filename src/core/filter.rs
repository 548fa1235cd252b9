use crate::core::dom::{Dom, NodeId, Selector};
use crate::core::renderer::{FILTER_ATTR, SECTION_CLASS, TAB_CLASS};
use serde::Serialize;
use std::fmt;

pub const ALL_KEY: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum FilterKey {
    All,
    Year(String),
}

impl FilterKey {
    pub fn parse(raw: &str) -> Self {
        if raw == ALL_KEY {
            FilterKey::All
        } else {
            FilterKey::Year(raw.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FilterKey::All => ALL_KEY,
            FilterKey::Year(year) => year,
        }
    }

    pub fn admits(&self, year: &str) -> bool {
        match self {
            FilterKey::All => true,
            FilterKey::Year(selected) => selected == year,
        }
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<FilterKey> for String {
    fn from(key: FilterKey) -> Self {
        key.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Changed,
    Unchanged,
    UnknownKey,
}

/// Single-select cohort filter. Owns the tab and section nodes it governs;
/// binding again after a re-render replaces both sets.
#[derive(Debug, Clone)]
pub struct FilterController {
    active: FilterKey,
    tabs: Vec<NodeId>,
    sections: Vec<NodeId>,
}

impl FilterController {
    pub fn bind(dom: &mut Dom, scope: NodeId) -> Self {
        let tabs = dom.query_all(scope, &Selector::class(TAB_CLASS).has_attr(FILTER_ATTR));
        let sections = dom.query_all(scope, &Selector::class(SECTION_CLASS));
        tracing::debug!(
            "Filter bound to {} tabs and {} sections",
            tabs.len(),
            sections.len()
        );

        let controller = Self {
            active: FilterKey::All,
            tabs,
            sections,
        };
        controller.apply(dom, false);
        controller
    }

    pub fn active(&self) -> &FilterKey {
        &self.active
    }

    pub fn tabs(&self) -> &[NodeId] {
        &self.tabs
    }

    pub fn sections(&self) -> &[NodeId] {
        &self.sections
    }

    /// Key of the tab node, when `node` is one of the bound tabs.
    pub fn key_of_tab(&self, dom: &Dom, node: NodeId) -> Option<FilterKey> {
        if !self.tabs.contains(&node) {
            return None;
        }
        dom.attr(node, FILTER_ATTR).map(FilterKey::parse)
    }

    pub fn select(&mut self, dom: &mut Dom, key: &FilterKey) -> Transition {
        if *key == self.active {
            return Transition::Unchanged;
        }
        let known = self
            .tabs
            .iter()
            .any(|tab| dom.attr(*tab, FILTER_ATTR) == Some(key.as_str()));
        if !known {
            tracing::warn!("Ignoring unknown filter key '{}'", key);
            return Transition::UnknownKey;
        }

        self.active = key.clone();
        self.apply(dom, true);
        tracing::debug!("Filter set to '{}'", self.active);
        Transition::Changed
    }

    pub fn visible_years(&self, dom: &Dom) -> Vec<String> {
        self.sections
            .iter()
            .filter(|s| !dom.is_hidden(**s))
            .filter_map(|s| dom.attr(*s, FILTER_ATTR).map(str::to_string))
            .collect()
    }

    fn apply(&self, dom: &mut Dom, reveal: bool) {
        for tab in &self.tabs {
            if dom.attr(*tab, FILTER_ATTR) == Some(self.active.as_str()) {
                dom.add_class(*tab, "active");
            } else {
                dom.remove_class(*tab, "active");
            }
        }

        for section in &self.sections {
            let year = dom.attr(*section, FILTER_ATTR).unwrap_or_default().to_string();
            if self.active.admits(&year) {
                dom.set_style(*section, "display", "block");
                if reveal {
                    dom.add_class(*section, "animate");
                    dom.add_class(*section, "show");
                }
            } else {
                dom.set_style(*section, "display", "none");
                dom.remove_class(*section, "show");
            }
        }
    }
}
