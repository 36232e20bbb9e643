// SPDX-FileCopyrightText: 2026 Marginalia Contributors
// SPDX-License-Identifier: MIT

//! Headless line rendering of a page.
//!
//! Produces plain text lines carrying highlight flags derived from the class
//! vocabulary, so both the terminal viewer and the tests observe the same
//! surface without a real rendering target.

use crate::model::{NodeId, PageDoc};
use crate::ops::{
    COMMENT_HIGHLIGHTED, COMMENT_LOCKED, LOC_HIGHLIGHTED, LOC_INSERTED, LOC_LOCKED,
};

/// Tags that force a line break around their content.
const BLOCK_TAGS: &[&str] = &["body", "div", "figure", "li", "p", "pre", "ul"];

/// Visual state of one rendered span, as bits so styles can combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpanFlags(u8);

impl SpanFlags {
    pub const HIGHLIGHTED: SpanFlags = SpanFlags(0b001);
    pub const LOCKED: SpanFlags = SpanFlags(0b010);
    pub const INSERTED: SpanFlags = SpanFlags(0b100);

    pub fn contains(self, other: SpanFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: SpanFlags) {
        self.0 |= other.0;
    }

    pub fn union(self, other: SpanFlags) -> SpanFlags {
        SpanFlags(self.0 | other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn bits(self) -> u8 {
        self.0
    }
}

/// One run of text with a uniform visual state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSpan {
    pub text: String,
    pub flags: SpanFlags,
}

/// Renders the attached tree into lines of flagged spans.
///
/// Flags inherit downward: text inside a highlighted target renders
/// highlighted even when carried by a plain descendant. Images render as a
/// `[image: <src>]` placeholder so swaps stay visible in a terminal.
pub fn page_lines(doc: &PageDoc) -> Vec<Vec<LineSpan>> {
    let mut lines: Vec<Vec<LineSpan>> = vec![Vec::new()];
    for &root in doc.roots() {
        render_node(doc, root, SpanFlags::default(), &mut lines);
    }
    while lines.len() > 1 && lines.last().is_some_and(Vec::is_empty) {
        lines.pop();
    }
    lines
}

fn render_node(doc: &PageDoc, id: NodeId, inherited: SpanFlags, lines: &mut Vec<Vec<LineSpan>>) {
    if let Some(markup) = doc.raw_markup(id) {
        push_text(markup, inherited, lines);
        return;
    }

    if doc.attr(id, "hidden").is_some() {
        return;
    }
    let flags = inherited.union(node_flags(doc, id));
    let tag = doc.tag(id).unwrap_or_default();
    let block = BLOCK_TAGS.contains(&tag);

    if block {
        break_line(lines);
    }
    if tag == "img" {
        let src = doc.attr(id, "src").unwrap_or("?");
        push_text(&format!("[image: {src}]"), flags, lines);
    }
    for &child in doc.children(id) {
        render_node(doc, child, flags, lines);
    }
    if block {
        break_line(lines);
    }
}

fn node_flags(doc: &PageDoc, id: NodeId) -> SpanFlags {
    let mut flags = SpanFlags::default();
    if doc.has_class(id, LOC_HIGHLIGHTED) || doc.has_class(id, COMMENT_HIGHLIGHTED) {
        flags.insert(SpanFlags::HIGHLIGHTED);
    }
    if doc.has_class(id, LOC_LOCKED) || doc.has_class(id, COMMENT_LOCKED) {
        flags.insert(SpanFlags::LOCKED);
    }
    if doc.has_class(id, LOC_INSERTED) {
        flags.insert(SpanFlags::INSERTED);
    }
    flags
}

fn push_text(text: &str, flags: SpanFlags, lines: &mut Vec<Vec<LineSpan>>) {
    let mut pieces = text.split('\n');
    if let Some(first) = pieces.next() {
        push_span(first, flags, lines);
    }
    for piece in pieces {
        lines.push(Vec::new());
        push_span(piece, flags, lines);
    }
}

fn push_span(text: &str, flags: SpanFlags, lines: &mut Vec<Vec<LineSpan>>) {
    if text.is_empty() {
        return;
    }
    let line = lines.last_mut().expect("at least one line");
    line.push(LineSpan { text: text.to_owned(), flags });
}

fn break_line(lines: &mut Vec<Vec<LineSpan>>) {
    if lines.last().is_some_and(|line| !line.is_empty()) {
        lines.push(Vec::new());
    }
}

/// Joins rendered lines into plain text, dropping flags. Test helper surface.
pub fn lines_to_text(lines: &[Vec<LineSpan>]) -> String {
    lines
        .iter()
        .map(|line| line.iter().map(|span| span.text.as_str()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
