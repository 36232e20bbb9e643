// SPDX-FileCopyrightText: 2026 Marginalia Contributors
// SPDX-License-Identifier: MIT

//! Interaction operations over a scanned page.
//!
//! The coordinator is a small state machine driven by hover-enter,
//! hover-leave and click transitions. It owns the lock slot and the
//! per-comment content snapshots; every transition mutates the page document
//! and produces a minimal delta the viewer can use to refresh derived state.

mod gui;

use std::collections::BTreeMap;
use std::fmt;

use smol_str::SmolStr;

use crate::model::{CodeComment, CommentId, NodeId, PageDoc};
use crate::query;

pub use gui::GuiCoordinator;

/// Shared highlight marker on target elements.
pub const LOC_HIGHLIGHTED: &str = "loc-now-highlighted";
/// Lock marker on target elements.
pub const LOC_LOCKED: &str = "loc-now-locked";
/// Substitution marker on the first target element.
pub const LOC_INSERTED: &str = "loc-now-inserted";
/// Highlight marker on the annotation element itself.
pub const COMMENT_HIGHLIGHTED: &str = "comment-now-highlighted";
/// Lock marker on the annotation element itself.
pub const COMMENT_LOCKED: &str = "comment-now-locked";

/// The single lock slot: which comment, if any, currently holds the lock.
///
/// An explicitly owned value handed to (or built into) a coordinator, so
/// independent page sections can run isolated coordinators side by side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockSlot {
    current: Option<CommentId>,
}

impl LockSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&CommentId> {
        self.current.as_ref()
    }

    fn set(&mut self, comment_id: CommentId) {
        self.current = Some(comment_id);
    }

    fn clear(&mut self) {
        self.current = None;
    }

    fn clear_if(&mut self, comment_id: &CommentId) {
        if self.current.as_ref() == Some(comment_id) {
            self.current = None;
        }
    }
}

/// Minimal description of what one transition changed on the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightDelta {
    pub classes_added: Vec<(NodeId, SmolStr)>,
    pub classes_removed: Vec<(NodeId, SmolStr)>,
    pub content_replaced: Vec<NodeId>,
    pub content_restored: Vec<NodeId>,
    pub sources_swapped: Vec<NodeId>,
}

impl HighlightDelta {
    pub fn is_empty(&self) -> bool {
        self.classes_added.is_empty()
            && self.classes_removed.is_empty()
            && self.content_replaced.is_empty()
            && self.content_restored.is_empty()
            && self.sources_swapped.is_empty()
    }

    fn add_class(&mut self, doc: &mut PageDoc, node: NodeId, class: &str) {
        if doc.add_class(node, class) {
            self.classes_added.push((node, SmolStr::from(class)));
        }
    }

    fn remove_class(&mut self, doc: &mut PageDoc, node: NodeId, class: &str) {
        if doc.remove_class(node, class) {
            self.classes_removed.push((node, SmolStr::from(class)));
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractError {
    UnknownComment { comment_id: CommentId },
    MissingImageSource { comment_id: CommentId, node: NodeId },
}

impl fmt::Display for InteractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownComment { comment_id } => {
                write!(f, "no comment registered for id '{comment_id}'")
            }
            Self::MissingImageSource { comment_id, node } => {
                write!(f, "gui comment '{comment_id}': target {node} has no src attribute")
            }
        }
    }
}

impl std::error::Error for InteractError {}

/// Hover/lock state machine over the code comments of one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinator {
    comments: Vec<CodeComment>,
    lock: LockSlot,
    snapshots: BTreeMap<CommentId, String>,
}

impl Coordinator {
    pub fn new(comments: Vec<CodeComment>) -> Self {
        Self::with_lock(comments, LockSlot::new())
    }

    /// Builds a coordinator around an externally owned lock slot value.
    pub fn with_lock(comments: Vec<CodeComment>, lock: LockSlot) -> Self {
        Self { comments, lock, snapshots: BTreeMap::new() }
    }

    pub fn comments(&self) -> &[CodeComment] {
        &self.comments
    }

    pub fn lock(&self) -> &LockSlot {
        &self.lock
    }

    pub fn comment(&self, comment_id: &CommentId) -> Option<&CodeComment> {
        self.comments.iter().find(|c| c.comment_id() == comment_id)
    }

    fn find(&self, comment_id: &CommentId) -> Result<usize, InteractError> {
        self.comments
            .iter()
            .position(|c| c.comment_id() == comment_id)
            .ok_or_else(|| InteractError::UnknownComment { comment_id: comment_id.clone() })
    }

    /// Hover activation.
    ///
    /// Any other substituting comment that currently holds a lock is unlocked
    /// and reverted first, so at most one substitution is ever visually
    /// active; plain highlights are left alone and may stack freely.
    pub fn hover_enter(
        &mut self,
        doc: &mut PageDoc,
        comment_id: &CommentId,
    ) -> Result<HighlightDelta, InteractError> {
        let ix = self.find(comment_id)?;
        let mut delta = HighlightDelta::default();

        let locked_substituting: Vec<usize> = self
            .comments
            .iter()
            .enumerate()
            .filter(|(other, c)| {
                *other != ix
                    && c.replacement().is_some()
                    && doc.has_class(c.node(), COMMENT_LOCKED)
            })
            .map(|(other, _)| other)
            .collect();
        for other in locked_substituting {
            unlock_comment(&mut self.lock, &self.comments[other], doc, &mut delta);
            leave_comment(&self.snapshots, &self.comments[other], doc, &mut delta);
        }

        if let Some(payload) = self.comments[ix].replacement().map(str::to_owned) {
            // Second sweep over anything still marked locked. Redundant with
            // the pass above when class state is consistent; kept so a stray
            // locked marker cannot survive into the substitution.
            let still_locked: Vec<usize> = self
                .comments
                .iter()
                .enumerate()
                .filter(|(other, c)| *other != ix && doc.has_class(c.node(), COMMENT_LOCKED))
                .map(|(other, _)| other)
                .collect();
            for other in still_locked {
                unlock_comment(&mut self.lock, &self.comments[other], doc, &mut delta);
            }

            if let Some(first) = self.comments[ix].first_target() {
                delta.add_class(doc, first, LOC_INSERTED);
                let owner = self.comments[ix].comment_id().clone();
                self.snapshots.entry(owner).or_insert_with(|| doc.inner_markup(first));
                doc.set_inner_markup(first, &payload);
                delta.content_replaced.push(first);
            }
        }

        let comment = &self.comments[ix];
        for &target in comment.targets() {
            delta.add_class(doc, target, LOC_HIGHLIGHTED);
        }
        delta.add_class(doc, comment.node(), COMMENT_HIGHLIGHTED);
        Ok(delta)
    }

    /// Hover deactivation. Substituted content persists while locked.
    pub fn hover_leave(
        &mut self,
        doc: &mut PageDoc,
        comment_id: &CommentId,
    ) -> Result<HighlightDelta, InteractError> {
        let ix = self.find(comment_id)?;
        let mut delta = HighlightDelta::default();
        leave_comment(&self.snapshots, &self.comments[ix], doc, &mut delta);
        Ok(delta)
    }

    /// Lock toggle.
    ///
    /// Taking the lock sweeps locked markers off the whole document rather
    /// than just the slot's current owner, so the invariant recovers even
    /// from inconsistent class state.
    pub fn click(
        &mut self,
        doc: &mut PageDoc,
        comment_id: &CommentId,
    ) -> Result<HighlightDelta, InteractError> {
        let ix = self.find(comment_id)?;
        let mut delta = HighlightDelta::default();
        let comment = &self.comments[ix];

        if self.lock.current() == Some(comment.comment_id()) {
            for &target in comment.targets() {
                delta.remove_class(doc, target, LOC_LOCKED);
            }
            delta.remove_class(doc, comment.node(), COMMENT_LOCKED);
            self.lock.clear();
        } else {
            for node in query::nodes_with_class(doc, COMMENT_LOCKED) {
                delta.remove_class(doc, node, COMMENT_LOCKED);
            }
            for node in query::nodes_with_class(doc, LOC_LOCKED) {
                delta.remove_class(doc, node, LOC_LOCKED);
            }
            for &target in comment.targets() {
                delta.add_class(doc, target, LOC_LOCKED);
            }
            delta.add_class(doc, comment.node(), COMMENT_LOCKED);
            self.lock.set(comment.comment_id().clone());
        }
        Ok(delta)
    }

    /// Direct unlock transition.
    ///
    /// Clears this comment's locked markers and releases the slot if this
    /// comment holds it; never locks anything, unlike replaying a click.
    pub fn unlock(
        &mut self,
        doc: &mut PageDoc,
        comment_id: &CommentId,
    ) -> Result<HighlightDelta, InteractError> {
        let ix = self.find(comment_id)?;
        let mut delta = HighlightDelta::default();
        unlock_comment(&mut self.lock, &self.comments[ix], doc, &mut delta);
        Ok(delta)
    }
}

fn unlock_comment(
    lock: &mut LockSlot,
    comment: &CodeComment,
    doc: &mut PageDoc,
    delta: &mut HighlightDelta,
) {
    for &target in comment.targets() {
        delta.remove_class(doc, target, LOC_LOCKED);
    }
    delta.remove_class(doc, comment.node(), COMMENT_LOCKED);
    lock.clear_if(comment.comment_id());
}

/// The full mouse-leave transition: revert the substitution unless locked,
/// then drop the highlight markers.
fn leave_comment(
    snapshots: &BTreeMap<CommentId, String>,
    comment: &CodeComment,
    doc: &mut PageDoc,
    delta: &mut HighlightDelta,
) {
    if comment.replacement().is_some() && !doc.has_class(comment.node(), COMMENT_LOCKED) {
        restore_substitution(snapshots, comment, doc, delta);
    }
    for &target in comment.targets() {
        delta.remove_class(doc, target, LOC_HIGHLIGHTED);
    }
    delta.remove_class(doc, comment.node(), COMMENT_HIGHLIGHTED);
}

fn restore_substitution(
    snapshots: &BTreeMap<CommentId, String>,
    comment: &CodeComment,
    doc: &mut PageDoc,
    delta: &mut HighlightDelta,
) {
    let Some(first) = comment.first_target() else {
        return;
    };
    if let Some(original) = snapshots.get(comment.comment_id()) {
        doc.set_inner_markup(first, original);
        delta.content_restored.push(first);
    }
    delta.remove_class(doc, first, LOC_INSERTED);
}

#[cfg(test)]
mod tests;
