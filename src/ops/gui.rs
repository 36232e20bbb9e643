// SPDX-FileCopyrightText: 2026 Marginalia Contributors
// SPDX-License-Identifier: MIT

use crate::model::{CommentId, GuiComment, PageDoc};

use super::{HighlightDelta, InteractError, COMMENT_HIGHLIGHTED};

/// Hover-only highlighter for GUI figure comments.
///
/// The "substitution" is an image path swap derived from the current source
/// path, so there is nothing to snapshot and no lock affordance: mouse-leave
/// reconstructs the base filename instead of restoring saved state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuiCoordinator {
    comments: Vec<GuiComment>,
}

impl GuiCoordinator {
    pub fn new(comments: Vec<GuiComment>) -> Self {
        Self { comments }
    }

    pub fn comments(&self) -> &[GuiComment] {
        &self.comments
    }

    pub fn comment(&self, comment_id: &CommentId) -> Option<&GuiComment> {
        self.comments.iter().find(|c| c.comment_id() == comment_id)
    }

    fn find(&self, comment_id: &CommentId) -> Result<usize, InteractError> {
        self.comments
            .iter()
            .position(|c| c.comment_id() == comment_id)
            .ok_or_else(|| InteractError::UnknownComment { comment_id: comment_id.clone() })
    }

    pub fn hover_enter(
        &self,
        doc: &mut PageDoc,
        comment_id: &CommentId,
    ) -> Result<HighlightDelta, InteractError> {
        self.swap(doc, comment_id, true)
    }

    pub fn hover_leave(
        &self,
        doc: &mut PageDoc,
        comment_id: &CommentId,
    ) -> Result<HighlightDelta, InteractError> {
        self.swap(doc, comment_id, false)
    }

    fn swap(
        &self,
        doc: &mut PageDoc,
        comment_id: &CommentId,
        enter: bool,
    ) -> Result<HighlightDelta, InteractError> {
        let ix = self.find(comment_id)?;
        let comment = &self.comments[ix];
        let mut delta = HighlightDelta::default();

        if let Some(first) = comment.first_target() {
            let current = doc.attr(first, "src").ok_or_else(|| {
                InteractError::MissingImageSource { comment_id: comment_id.clone(), node: first }
            })?;
            let file_name = if enter {
                format!("gui{}_{}.png", comment.example(), comment.number())
            } else {
                format!("gui{}.png", comment.example())
            };
            let swapped = swap_file_name(current, &file_name);
            for &target in comment.targets() {
                doc.set_attr(target, "src", swapped.clone());
                delta.sources_swapped.push(target);
            }
        }

        if enter {
            delta.add_class(doc, comment.node(), COMMENT_HIGHLIGHTED);
        } else {
            delta.remove_class(doc, comment.node(), COMMENT_HIGHLIGHTED);
        }
        Ok(delta)
    }
}

/// Replaces the final path segment; a path with no `/` is replaced whole.
fn swap_file_name(path: &str, file_name: &str) -> String {
    match path.rfind('/') {
        Some(sep) => format!("{}/{}", &path[..sep], file_name),
        None => file_name.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::swap_file_name;

    #[test]
    fn swaps_only_the_final_segment() {
        assert_eq!(
            swap_file_name("/static/img/guifig1.png", "guifig1_2.png"),
            "/static/img/guifig1_2.png"
        );
    }

    #[test]
    fn bare_file_name_is_replaced_whole() {
        assert_eq!(swap_file_name("guifig1.png", "guifig1_2.png"), "guifig1_2.png");
    }
}
