// SPDX-FileCopyrightText: 2026 Marginalia Contributors
// SPDX-License-Identifier: MIT

//! Tab strip state.
//!
//! A strip is built once from a `rst-tabs` container: title elements are
//! detached into the strip record (they become the tab labels), panes get the
//! built marker class and every pane but the selected one is hidden. Exactly
//! one tab is selected at all times.

use std::fmt;

use crate::model::{NodeId, PageDoc};
use crate::query;

pub const STRIP_CLASS: &str = "rst-tabs";
pub const PANE_CLASS: &str = "tab-content";
pub const PANE_BUILT_CLASS: &str = "tab-content-aplus";
pub const TITLE_CLASS: &str = "tab-title";
const HIDDEN_ATTR: &str = "hidden";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabError {
    NoPanes { container: NodeId },
    OutOfRange { index: usize, len: usize },
}

impl fmt::Display for TabError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPanes { container } => {
                write!(f, "tab strip {container} has no {PANE_CLASS} panes")
            }
            Self::OutOfRange { index, len } => {
                write!(f, "tab index {index} out of range (strip has {len} tabs)")
            }
        }
    }
}

impl std::error::Error for TabError {}

/// One tab: its pane element, its label, and the pane's optional dom id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pane: NodeId,
    title: String,
    dom_id: Option<String>,
}

impl Tab {
    pub fn pane(&self) -> NodeId {
        self.pane
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn dom_id(&self) -> Option<&str> {
        self.dom_id.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabStrip {
    container: NodeId,
    tabs: Vec<Tab>,
    selected: usize,
}

impl TabStrip {
    /// Builds the strip, detaching titles and hiding all panes but the first.
    pub fn build(doc: &mut PageDoc, container: NodeId) -> Result<Self, TabError> {
        let panes: Vec<NodeId> = doc
            .descendants(container)
            .into_iter()
            .filter(|&id| doc.has_class(id, PANE_CLASS))
            .collect();
        if panes.is_empty() {
            return Err(TabError::NoPanes { container });
        }

        let mut tabs = Vec::with_capacity(panes.len());
        for (index, &pane) in panes.iter().enumerate() {
            let title_el = doc
                .descendants(pane)
                .into_iter()
                .find(|&id| doc.has_class(id, TITLE_CLASS));
            let title = match title_el {
                Some(el) => {
                    let text = subtree_text(doc, el);
                    doc.detach(el);
                    text
                }
                None => String::new(),
            };
            doc.add_class(pane, PANE_BUILT_CLASS);
            if index > 0 {
                doc.set_attr(pane, HIDDEN_ATTR, "");
            }
            let dom_id = doc.attr(pane, "id").map(str::to_owned);
            tabs.push(Tab { pane, title, dom_id });
        }

        Ok(Self { container, tabs, selected: 0 })
    }

    /// Builds every strip on the page; containers without panes are reported.
    pub fn build_all(doc: &mut PageDoc) -> (Vec<TabStrip>, Vec<TabError>) {
        let mut strips = Vec::new();
        let mut errors = Vec::new();
        for container in query::nodes_with_class(doc, STRIP_CLASS) {
            match Self::build(doc, container) {
                Ok(strip) => strips.push(strip),
                Err(err) => errors.push(err),
            }
        }
        (strips, errors)
    }

    pub fn container(&self) -> NodeId {
        self.container
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_tab(&self) -> &Tab {
        &self.tabs[self.selected]
    }

    /// Shows the selected pane and hides every other one.
    pub fn select(&mut self, doc: &mut PageDoc, index: usize) -> Result<(), TabError> {
        if index >= self.tabs.len() {
            return Err(TabError::OutOfRange { index, len: self.tabs.len() });
        }
        for (ix, tab) in self.tabs.iter().enumerate() {
            if ix == index {
                doc.remove_attr(tab.pane, HIDDEN_ATTR);
            } else {
                doc.set_attr(tab.pane, HIDDEN_ATTR, "");
            }
        }
        self.selected = index;
        Ok(())
    }

    /// Selects the next tab, wrapping around.
    pub fn select_next(&mut self, doc: &mut PageDoc) {
        let next = (self.selected + 1) % self.tabs.len();
        // In-range by construction.
        let _ = self.select(doc, next);
    }

    pub fn is_hidden(&self, doc: &PageDoc, index: usize) -> bool {
        self.tabs
            .get(index)
            .is_some_and(|tab| doc.attr(tab.pane, HIDDEN_ATTR).is_some())
    }
}

/// Concatenated raw text below a node.
fn subtree_text(doc: &PageDoc, id: NodeId) -> String {
    let mut out = String::new();
    for descendant in doc.descendants(id) {
        if let Some(markup) = doc.raw_markup(descendant) {
            out.push_str(markup);
        }
    }
    out
}
