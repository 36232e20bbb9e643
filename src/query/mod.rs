// SPDX-FileCopyrightText: 2026 Marginalia Contributors
// SPDX-License-Identifier: MIT

//! Read-only selection over page documents.
//!
//! These are the class-scoped lookups the scan pass and the coordinator
//! sweeps are built on. All results are attached nodes in document order.

use crate::model::{NodeId, PageDoc};

/// All attached elements carrying `class`.
pub fn nodes_with_class(doc: &PageDoc, class: &str) -> Vec<NodeId> {
    doc.document_order()
        .into_iter()
        .filter(|&id| doc.has_class(id, class))
        .collect()
}

/// Annotation elements of the code-comment highlighter: `div` elements
/// classed `codecomment` + `container`, and inline `span.codecomment`.
pub fn code_comment_elements(doc: &PageDoc) -> Vec<NodeId> {
    doc.document_order()
        .into_iter()
        .filter(|&id| {
            if !doc.has_class(id, "codecomment") {
                return false;
            }
            match doc.tag(id) {
                Some("div") => doc.has_class(id, "container"),
                Some("span") => true,
                _ => false,
            }
        })
        .collect()
}

/// Annotation elements of the GUI highlighter: `div.guicomment.container`.
pub fn gui_comment_elements(doc: &PageDoc) -> Vec<NodeId> {
    doc.document_order()
        .into_iter()
        .filter(|&id| {
            doc.tag(id) == Some("div")
                && doc.has_class(id, "guicomment")
                && doc.has_class(id, "container")
        })
        .collect()
}

/// Elements carrying `target_class` anywhere below a container carrying
/// `container_class`, expanded with each match's descendants.
///
/// Matches come back in document order with duplicates removed, so the first
/// entry is the first matched element itself, never one of its children.
pub fn scoped_targets(doc: &PageDoc, container_class: &str, target_class: &str) -> Vec<NodeId> {
    let mut out = Vec::new();
    for container in nodes_with_class(doc, container_class) {
        for id in doc.descendants(container) {
            if !doc.has_class(id, target_class) {
                continue;
            }
            push_unique(&mut out, id);
            for descendant in doc.descendants(id) {
                push_unique(&mut out, descendant);
            }
        }
    }
    out
}

/// Figure images of a GUI example: `img` elements inside a `div.figure`
/// below the given container.
pub fn figure_images(doc: &PageDoc, container: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    for figure in doc.descendants(container) {
        if doc.tag(figure) != Some("div") || !doc.has_class(figure, "figure") {
            continue;
        }
        for id in doc.descendants(figure) {
            if doc.tag(id) == Some("img") {
                push_unique(&mut out, id);
            }
        }
    }
    out
}

fn push_unique(out: &mut Vec<NodeId>, id: NodeId) {
    if !out.contains(&id) {
        out.push(id);
    }
}
