// SPDX-FileCopyrightText: 2026 Marginalia Contributors
// SPDX-License-Identifier: MIT

use super::page::PageDoc;

/// A small annotated page exercising every annotation kind: two code
/// comments (one substituting) over an `ex-demo` example, a GUI figure
/// comment, and a two-tab strip.
pub(crate) fn annotated_demo_page() -> PageDoc {
    let mut doc = PageDoc::new();

    let body = doc.push_element(None, "body", &[]);

    let example = doc.push_element(Some(body), "pre", &["ex-demo"]);
    let loc1 = doc.push_element(Some(example), "span", &["loc1"]);
    doc.push_raw(Some(loc1), "val x = 1");
    doc.push_raw(Some(example), "\n");
    let loc2 = doc.push_element(Some(example), "span", &["loc2"]);
    doc.push_raw(Some(loc2), "x + x");

    let substituting =
        doc.push_element(Some(body), "span", &["codecomment", "comment-demo-1"]);
    doc.set_attr(substituting, "data-replacement", "<b>val x: Int = 1</b>");
    doc.push_raw(Some(substituting), "x gets an explicit type");

    let plain = doc.push_element(Some(body), "span", &["codecomment", "comment-demo-2"]);
    doc.push_raw(Some(plain), "doubling x");

    let gui_comment = doc.push_element(
        Some(body),
        "div",
        &["guicomment", "container", "comment-fig1at2"],
    );
    doc.push_raw(Some(gui_comment), "the toolbar lights up");
    let gui_example = doc.push_element(Some(body), "div", &["guifig1", "container"]);
    let figure = doc.push_element(Some(gui_example), "div", &["figure"]);
    let img = doc.push_element(Some(figure), "img", &[]);
    doc.set_attr(img, "src", "/static/guifig1.png");

    let strip = doc.push_element(Some(body), "div", &["rst-tabs"]);
    let first_pane = doc.push_element(Some(strip), "div", &["tab-content"]);
    doc.set_attr(first_pane, "id", "tab-scala");
    let first_title = doc.push_element(Some(first_pane), "div", &["tab-title"]);
    doc.push_raw(Some(first_title), "Scala");
    doc.push_raw(Some(first_pane), "scala listing");
    let second_pane = doc.push_element(Some(strip), "div", &["tab-content"]);
    doc.set_attr(second_pane, "id", "tab-python");
    let second_title = doc.push_element(Some(second_pane), "div", &["tab-title"]);
    doc.push_raw(Some(second_title), "Python");
    doc.push_raw(Some(second_pane), "python listing");

    doc
}
