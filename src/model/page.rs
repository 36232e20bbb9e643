// SPDX-FileCopyrightText: 2026 Marginalia Contributors
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::ids::NodeId;

/// Element names rendered without a closing tag.
const VOID_TAGS: &[&str] = &["br", "hr", "img", "input"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeKind {
    Element(ElementData),
    /// Opaque markup. Replacement payloads land in the document as raw
    /// nodes; their content is never re-parsed.
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ElementData {
    tag: SmolStr,
    classes: Vec<SmolStr>,
    attrs: BTreeMap<SmolStr, String>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Node {
    parent: Option<NodeId>,
    kind: NodeKind,
}

/// An arena tree standing in for the rendered page.
///
/// Nodes are never freed: detaching a subtree (content replacement, tab title
/// removal) leaves its nodes in the arena, so `NodeId`s captured by fixed
/// target sets stay valid and class toggles on them become harmless no-ops —
/// the same observable behavior a rendered page gives stale element handles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageDoc {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl PageDoc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a document from its on-disk representation.
    pub fn from_spec(spec: PageSpec) -> Self {
        let mut doc = Self::new();
        for root in spec.roots {
            doc.push_spec(None, root);
        }
        doc
    }

    fn push_spec(&mut self, parent: Option<NodeId>, spec: NodeSpec) -> NodeId {
        match spec {
            NodeSpec::Element { tag, classes, attrs, children } => {
                let id = self.push_node(
                    parent,
                    NodeKind::Element(ElementData {
                        tag,
                        classes,
                        attrs,
                        children: Vec::new(),
                    }),
                );
                for child in children {
                    self.push_spec(Some(id), child);
                }
                id
            }
            NodeSpec::Raw { text } => self.push_node(parent, NodeKind::Raw(text)),
        }
    }

    fn push_node(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node { parent, kind });
        match parent {
            Some(parent_id) => {
                if let NodeKind::Element(el) = &mut self.nodes[parent_id.index()].kind {
                    el.children.push(id);
                }
            }
            None => self.roots.push(id),
        }
        id
    }

    pub fn push_element(&mut self, parent: Option<NodeId>, tag: &str, classes: &[&str]) -> NodeId {
        self.push_node(
            parent,
            NodeKind::Element(ElementData {
                tag: SmolStr::from(tag),
                classes: classes.iter().map(|class| SmolStr::from(*class)).collect(),
                attrs: BTreeMap::new(),
                children: Vec::new(),
            }),
        )
    }

    pub fn push_raw(&mut self, parent: Option<NodeId>, markup: &str) -> NodeId {
        self.push_node(parent, NodeKind::Raw(markup.to_owned()))
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.index()].kind {
            NodeKind::Element(el) => Some(el.tag.as_str()),
            NodeKind::Raw(_) => None,
        }
    }

    pub fn raw_markup(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.index()].kind {
            NodeKind::Raw(markup) => Some(markup.as_str()),
            NodeKind::Element(_) => None,
        }
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match &self.nodes[id.index()].kind {
            NodeKind::Element(el) => &el.children,
            NodeKind::Raw(_) => &[],
        }
    }

    pub fn classes(&self, id: NodeId) -> &[SmolStr] {
        match &self.nodes[id.index()].kind {
            NodeKind::Element(el) => &el.classes,
            NodeKind::Raw(_) => &[],
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.classes(id).iter().any(|existing| existing == class)
    }

    /// Adds a class; returns whether the class list changed.
    pub fn add_class(&mut self, id: NodeId, class: &str) -> bool {
        if self.has_class(id, class) {
            return false;
        }
        match &mut self.nodes[id.index()].kind {
            NodeKind::Element(el) => {
                el.classes.push(SmolStr::from(class));
                true
            }
            NodeKind::Raw(_) => false,
        }
    }

    /// Removes a class; returns whether the class list changed.
    pub fn remove_class(&mut self, id: NodeId, class: &str) -> bool {
        match &mut self.nodes[id.index()].kind {
            NodeKind::Element(el) => {
                let before = el.classes.len();
                el.classes.retain(|existing| existing != class);
                el.classes.len() != before
            }
            NodeKind::Raw(_) => false,
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[id.index()].kind {
            NodeKind::Element(el) => el.attrs.get(name).map(String::as_str),
            NodeKind::Raw(_) => None,
        }
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        if let NodeKind::Element(el) = &mut self.nodes[id.index()].kind {
            el.attrs.insert(SmolStr::from(name), value.into());
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> Option<String> {
        match &mut self.nodes[id.index()].kind {
            NodeKind::Element(el) => el.attrs.remove(name),
            NodeKind::Raw(_) => None,
        }
    }

    /// Whether the node is reachable from a document root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            match self.nodes[current.index()].parent {
                Some(parent) => current = parent,
                None => return self.roots.contains(&current),
            }
        }
    }

    /// All attached nodes in document order.
    pub fn document_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        for &root in &self.roots {
            self.collect_subtree(root, &mut order);
        }
        order
    }

    /// The subtree below `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        for &child in self.children(id) {
            self.collect_subtree(child, &mut order);
        }
        order
    }

    fn collect_subtree(&self, id: NodeId, out: &mut Vec<NodeId>) {
        out.push(id);
        for &child in self.children(id) {
            self.collect_subtree(child, out);
        }
    }

    /// Deterministic rendering of a node's content (children only, not the
    /// node itself). Class lists render in stored order, attributes in key
    /// order, so rendering the same tree twice is byte-identical.
    pub fn inner_markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.render_node(child, &mut out);
        }
        out
    }

    fn render_node(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.index()].kind {
            NodeKind::Raw(markup) => out.push_str(markup),
            NodeKind::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                if !el.classes.is_empty() {
                    out.push_str(" class=\"");
                    for (ix, class) in el.classes.iter().enumerate() {
                        if ix > 0 {
                            out.push(' ');
                        }
                        out.push_str(class);
                    }
                    out.push('"');
                }
                for (name, value) in &el.attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    push_attr_escaped(out, value);
                    out.push('"');
                }
                out.push('>');
                if VOID_TAGS.contains(&el.tag.as_str()) {
                    return;
                }
                for &child in &el.children {
                    self.render_node(child, out);
                }
                out.push_str("</");
                out.push_str(&el.tag);
                out.push('>');
            }
        }
    }

    /// Replaces a node's content with opaque markup. Existing children are
    /// detached (they remain in the arena); an empty string leaves the node
    /// without children.
    pub fn set_inner_markup(&mut self, id: NodeId, markup: &str) {
        let old_children = match &mut self.nodes[id.index()].kind {
            NodeKind::Element(el) => std::mem::take(&mut el.children),
            NodeKind::Raw(_) => return,
        };
        for child in old_children {
            self.nodes[child.index()].parent = None;
        }
        if !markup.is_empty() {
            self.push_node(Some(id), NodeKind::Raw(markup.to_owned()));
        }
    }

    /// Detaches a node from its parent (or from the root list).
    pub fn detach(&mut self, id: NodeId) {
        match self.nodes[id.index()].parent {
            Some(parent) => {
                if let NodeKind::Element(el) = &mut self.nodes[parent.index()].kind {
                    el.children.retain(|&child| child != id);
                }
                self.nodes[id.index()].parent = None;
            }
            None => self.roots.retain(|&root| root != id),
        }
    }
}

fn push_attr_escaped(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

/// On-disk node representation (`*.page.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeSpec {
    Element {
        tag: SmolStr,
        #[serde(default)]
        classes: Vec<SmolStr>,
        #[serde(default)]
        attrs: BTreeMap<SmolStr, String>,
        #[serde(default)]
        children: Vec<NodeSpec>,
    },
    Raw { text: String },
}

/// On-disk page representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSpec {
    #[serde(default)]
    pub roots: Vec<NodeSpec>,
}
