// SPDX-FileCopyrightText: 2026 Marginalia Contributors
// SPDX-License-Identifier: MIT

use smallvec::SmallVec;
use smol_str::SmolStr;

use super::ids::{CommentId, NodeId};

/// A code-comment annotation, fully resolved by the scan pass.
///
/// The target set is computed once and fixed for the comment's lifetime; it
/// holds every element carrying `loc<number>` inside the `ex-<example>`
/// container, expanded with each match's descendants, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeComment {
    comment_id: CommentId,
    node: NodeId,
    example: SmolStr,
    number: SmolStr,
    replacement: Option<String>,
    targets: SmallVec<[NodeId; 8]>,
}

impl CodeComment {
    pub fn new(
        node: NodeId,
        example: SmolStr,
        number: SmolStr,
        replacement: Option<String>,
        targets: SmallVec<[NodeId; 8]>,
    ) -> Self {
        let comment_id = CommentId::new(&example, &number);
        Self { comment_id, node, example, number, replacement, targets }
    }

    pub fn comment_id(&self) -> &CommentId {
        &self.comment_id
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn example(&self) -> &str {
        &self.example
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn replacement(&self) -> Option<&str> {
        self.replacement.as_deref()
    }

    pub fn targets(&self) -> &[NodeId] {
        &self.targets
    }

    /// The substitution target: the first matched element in document order.
    pub fn first_target(&self) -> Option<NodeId> {
        self.targets.first().copied()
    }
}

/// A GUI-figure annotation: hover-only, swaps figure image paths, no lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuiComment {
    comment_id: CommentId,
    node: NodeId,
    example: SmolStr,
    number: SmolStr,
    targets: SmallVec<[NodeId; 2]>,
}

impl GuiComment {
    pub fn new(
        node: NodeId,
        example: SmolStr,
        number: SmolStr,
        targets: SmallVec<[NodeId; 2]>,
    ) -> Self {
        let comment_id = CommentId::new(&example, &number);
        Self { comment_id, node, example, number, targets }
    }

    pub fn comment_id(&self) -> &CommentId {
        &self.comment_id
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn example(&self) -> &str {
        &self.example
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn targets(&self) -> &[NodeId] {
        &self.targets
    }

    pub fn first_target(&self) -> Option<NodeId> {
        self.targets.first().copied()
    }
}
