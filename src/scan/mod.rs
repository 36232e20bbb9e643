// SPDX-FileCopyrightText: 2026 Marginalia Contributors
// SPDX-License-Identifier: MIT

//! The one-time setup pass.
//!
//! Walks a page document, parses annotation class tokens and resolves each
//! comment's fixed target set into typed records. Configuration errors are
//! collected in the report and never abort the pass; a malformed annotation
//! must not cost the rest of the page its highlighting.

mod token;

use std::fmt;

use smol_str::SmolStr;

use crate::model::{CodeComment, GuiComment, NodeId, PageDoc};
use crate::query;

pub use token::{split_code_suffix, split_gui_suffix, COMMENT_PREFIX, GUI_INFIX};

/// Attribute carrying a comment's replacement payload.
pub const REPLACEMENT_ATTR: &str = "data-replacement";

/// Configuration errors found while scanning a page.
///
/// All of them are report-and-continue; none is fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// An annotation element with no `comment-` class token.
    MissingCommentToken { node: NodeId, classes: String },
    /// More than one `comment-` class token; the first one is used.
    AmbiguousCommentToken { node: NodeId, classes: String, count: usize },
    /// A code token with no hyphen after the prefix; the comment number
    /// degrades to the empty string.
    MissingNumberSeparator { node: NodeId, token: String },
    /// A GUI token without exactly one `at` infix; the comment is skipped.
    MalformedGuiToken { node: NodeId, token: String },
    /// No code locations matched the comment's scoped selector.
    EmptyTargetSet { node: NodeId, token: String },
    /// No figure images matched the GUI comment's container.
    EmptyGuiTargetSet { node: NodeId, token: String },
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCommentToken { node, classes } => {
                write!(f, "unexpected classes on comment {node}: no comment token in '{classes}'")
            }
            Self::AmbiguousCommentToken { node, classes, count } => write!(
                f,
                "unexpected classes on comment {node}: {count} comment tokens in '{classes}'"
            ),
            Self::MissingNumberSeparator { node, token } => write!(
                f,
                "comment token '{token}' on {node} has no number separator (using empty number)"
            ),
            Self::MalformedGuiToken { node, token } => {
                write!(f, "gui comment token '{token}' on {node} does not split at '{GUI_INFIX}'")
            }
            Self::EmptyTargetSet { node, token } => {
                write!(f, "no code locations match comment '{token}' on {node}")
            }
            Self::EmptyGuiTargetSet { node, token } => {
                write!(f, "no gui examples match comment '{token}' on {node}")
            }
        }
    }
}

impl std::error::Error for ScanError {}

/// Everything one scan pass produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    comments: Vec<CodeComment>,
    gui_comments: Vec<GuiComment>,
    errors: Vec<ScanError>,
}

impl ScanReport {
    pub fn comments(&self) -> &[CodeComment] {
        &self.comments
    }

    pub fn gui_comments(&self) -> &[GuiComment] {
        &self.gui_comments
    }

    pub fn errors(&self) -> &[ScanError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn into_parts(self) -> (Vec<CodeComment>, Vec<GuiComment>, Vec<ScanError>) {
        (self.comments, self.gui_comments, self.errors)
    }
}

/// Runs the setup pass over a page.
pub fn scan_page(doc: &PageDoc) -> ScanReport {
    let mut report = ScanReport::default();

    for node in query::code_comment_elements(doc) {
        let Some(token) = comment_token(doc, node, &mut report.errors) else {
            continue;
        };
        let suffix = &token[COMMENT_PREFIX.len()..];
        let (example, number) = match split_code_suffix(suffix) {
            Some(parts) => parts,
            None => {
                report.errors.push(ScanError::MissingNumberSeparator {
                    node,
                    token: token.to_string(),
                });
                (suffix, "")
            }
        };

        let container_class = format!("ex-{example}");
        let target_class = format!("loc{number}");
        let targets = query::scoped_targets(doc, &container_class, &target_class);
        if targets.is_empty() {
            report
                .errors
                .push(ScanError::EmptyTargetSet { node, token: token.to_string() });
        }

        let replacement = doc.attr(node, REPLACEMENT_ATTR).map(str::to_owned);
        report.comments.push(CodeComment::new(
            node,
            SmolStr::from(example),
            SmolStr::from(number),
            replacement,
            targets.into_iter().collect(),
        ));
    }

    for node in query::gui_comment_elements(doc) {
        let Some(token) = comment_token(doc, node, &mut report.errors) else {
            continue;
        };
        let suffix = &token[COMMENT_PREFIX.len()..];
        let Some((example, number)) = split_gui_suffix(suffix) else {
            report
                .errors
                .push(ScanError::MalformedGuiToken { node, token: token.to_string() });
            continue;
        };

        let container_class = format!("gui{example}");
        let mut targets = Vec::new();
        for container in query::nodes_with_class(doc, &container_class) {
            if !doc.has_class(container, "container") {
                continue;
            }
            for image in query::figure_images(doc, container) {
                if !targets.contains(&image) {
                    targets.push(image);
                }
            }
        }
        if targets.is_empty() {
            report
                .errors
                .push(ScanError::EmptyGuiTargetSet { node, token: token.to_string() });
        }

        report.gui_comments.push(GuiComment::new(
            node,
            SmolStr::from(example),
            SmolStr::from(number),
            targets.into_iter().collect(),
        ));
    }

    report
}

/// Extracts the identity token from an annotation element's class list.
///
/// Zero tokens skips the element, several degrade to the first; both are
/// reported.
fn comment_token(doc: &PageDoc, node: NodeId, errors: &mut Vec<ScanError>) -> Option<SmolStr> {
    let tokens: Vec<&SmolStr> = doc
        .classes(node)
        .iter()
        .filter(|class| class.starts_with(COMMENT_PREFIX))
        .collect();
    match tokens.len() {
        0 => {
            errors.push(ScanError::MissingCommentToken {
                node,
                classes: class_list(doc, node),
            });
            None
        }
        1 => Some(tokens[0].clone()),
        count => {
            errors.push(ScanError::AmbiguousCommentToken {
                node,
                classes: class_list(doc, node),
                count,
            });
            Some(tokens[0].clone())
        }
    }
}

fn class_list(doc: &PageDoc, node: NodeId) -> String {
    let classes: Vec<&str> = doc.classes(node).iter().map(SmolStr::as_str).collect();
    classes.join(" ")
}
