// SPDX-FileCopyrightText: 2026 Marginalia Contributors
// SPDX-License-Identifier: MIT

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use marginalia::model::PageDoc;

/// Builds a page with `examples` code examples of `comments_per_example`
/// comments each. Every second comment carries a replacement payload, target
/// spans wrap one nested element so target sets exercise the descendant
/// expansion.
pub fn annotated_page(examples: usize, comments_per_example: usize) -> PageDoc {
    let mut doc = PageDoc::new();
    let body = doc.push_element(None, "body", &[]);

    for example in 0..examples {
        let container_class = format!("ex-bench{example}");
        let pre = doc.push_element(Some(body), "pre", &[container_class.as_str()]);
        for comment in 0..comments_per_example {
            let loc_class = format!("loc{comment}");
            let span = doc.push_element(Some(pre), "span", &[loc_class.as_str()]);
            let inner = doc.push_element(Some(span), "em", &[]);
            doc.push_raw(Some(inner), "let value = compute()");
            doc.push_raw(Some(pre), "\n");
        }

        for comment in 0..comments_per_example {
            let token = format!("comment-bench{example}-{comment}");
            let node =
                doc.push_element(Some(body), "span", &["codecomment", token.as_str()]);
            if comment % 2 == 0 {
                doc.set_attr(node, "data-replacement", "<b>let value = 42</b>");
            }
            doc.push_raw(Some(node), "explains the call");
        }
    }

    doc
}

/// Case sizes shared across the bench groups (keep IDs stable).
#[derive(Debug, Clone, Copy)]
pub enum Case {
    Small,
    Medium,
    Large,
}

impl Case {
    pub fn id(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }

    pub fn dimensions(self) -> (usize, usize) {
        match self {
            Self::Small => (4, 4),
            Self::Medium => (16, 8),
            Self::Large => (64, 16),
        }
    }

    pub fn page(self) -> PageDoc {
        let (examples, comments) = self.dimensions();
        annotated_page(examples, comments)
    }
}
