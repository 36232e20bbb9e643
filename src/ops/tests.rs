// SPDX-FileCopyrightText: 2026 Marginalia Contributors
// SPDX-License-Identifier: MIT

use crate::model::{CommentId, PageDoc};
use crate::query;
use crate::scan::scan_page;

use super::{
    Coordinator, GuiCoordinator, InteractError, COMMENT_HIGHLIGHTED, COMMENT_LOCKED,
    LOC_HIGHLIGHTED, LOC_INSERTED, LOC_LOCKED,
};

fn demo() -> (PageDoc, Coordinator, GuiCoordinator) {
    let doc = crate::model::fixtures::annotated_demo_page();
    let report = scan_page(&doc);
    assert!(!report.has_errors(), "demo page must scan clean: {:?}", report.errors());
    let (comments, gui_comments, _) = report.into_parts();
    (doc, Coordinator::new(comments), GuiCoordinator::new(gui_comments))
}

/// Two substituting comments over one example, for mutual-exclusion cases.
fn dual_substituting() -> (PageDoc, Coordinator) {
    let mut doc = PageDoc::new();
    let body = doc.push_element(None, "body", &[]);
    let example = doc.push_element(Some(body), "pre", &["ex-dual"]);
    let loc1 = doc.push_element(Some(example), "span", &["loc1"]);
    doc.push_raw(Some(loc1), "one");
    let loc2 = doc.push_element(Some(example), "span", &["loc2"]);
    doc.push_raw(Some(loc2), "two");

    let first = doc.push_element(Some(body), "span", &["codecomment", "comment-dual-1"]);
    doc.set_attr(first, "data-replacement", "<em>ONE</em>");
    let second = doc.push_element(Some(body), "span", &["codecomment", "comment-dual-2"]);
    doc.set_attr(second, "data-replacement", "<em>TWO</em>");

    let report = scan_page(&doc);
    assert!(!report.has_errors(), "errors: {:?}", report.errors());
    let (comments, _, _) = report.into_parts();
    (doc, Coordinator::new(comments))
}

fn id(example: &str, number: &str) -> CommentId {
    CommentId::new(example, number)
}

fn locked_comment_count(doc: &PageDoc) -> usize {
    query::nodes_with_class(doc, COMMENT_LOCKED).len()
}

#[test]
fn hover_substitutes_and_marks_targets() {
    let (mut doc, mut coordinator, _) = demo();
    let comment = coordinator.comment(&id("demo", "1")).expect("comment").clone();
    let first = comment.first_target().expect("first target");

    let delta = coordinator.hover_enter(&mut doc, &id("demo", "1")).expect("hover");
    assert_eq!(doc.inner_markup(first), "<b>val x: Int = 1</b>");
    assert!(doc.has_class(first, LOC_INSERTED));
    assert!(doc.has_class(first, LOC_HIGHLIGHTED));
    for &target in comment.targets() {
        // Raw text nodes carry no classes; every element target is marked.
        if doc.tag(target).is_some() {
            assert!(doc.has_class(target, LOC_HIGHLIGHTED));
        }
    }
    assert!(doc.has_class(comment.node(), COMMENT_HIGHLIGHTED));
    assert_eq!(delta.content_replaced, vec![first]);
}

#[test]
fn hover_then_leave_restores_content_byte_identical() {
    let (mut doc, mut coordinator, _) = demo();
    let comment = coordinator.comment(&id("demo", "1")).expect("comment").clone();
    let first = comment.first_target().expect("first target");
    let original = doc.inner_markup(first);

    coordinator.hover_enter(&mut doc, &id("demo", "1")).expect("hover");
    let delta = coordinator.hover_leave(&mut doc, &id("demo", "1")).expect("leave");

    assert_eq!(doc.inner_markup(first), original);
    assert!(!doc.has_class(first, LOC_INSERTED));
    assert!(!doc.has_class(first, LOC_HIGHLIGHTED));
    assert!(!doc.has_class(comment.node(), COMMENT_HIGHLIGHTED));
    assert_eq!(delta.content_restored, vec![first]);
}

#[test]
fn plain_comment_hover_never_touches_content() {
    let (mut doc, mut coordinator, _) = demo();
    let comment = coordinator.comment(&id("demo", "2")).expect("comment").clone();
    let first = comment.first_target().expect("first target");
    let original = doc.inner_markup(first);

    coordinator.hover_enter(&mut doc, &id("demo", "2")).expect("hover");
    assert_eq!(doc.inner_markup(first), original);
    assert!(!doc.has_class(first, LOC_INSERTED));
    assert!(doc.has_class(first, LOC_HIGHLIGHTED));
}

#[test]
fn non_substituting_highlights_stack_freely() {
    let (mut doc, mut coordinator, _) = demo();
    coordinator.hover_enter(&mut doc, &id("demo", "1")).expect("hover 1");
    coordinator.hover_enter(&mut doc, &id("demo", "2")).expect("hover 2");

    let one = coordinator.comment(&id("demo", "1")).expect("comment").node();
    let two = coordinator.comment(&id("demo", "2")).expect("comment").node();
    assert!(doc.has_class(one, COMMENT_HIGHLIGHTED));
    assert!(doc.has_class(two, COMMENT_HIGHLIGHTED));
}

#[test]
fn click_toggles_lock_on_and_off() {
    let (mut doc, mut coordinator, _) = demo();
    let comment = coordinator.comment(&id("demo", "1")).expect("comment").clone();

    coordinator.click(&mut doc, &id("demo", "1")).expect("lock");
    assert_eq!(coordinator.lock().current(), Some(&id("demo", "1")));
    assert!(doc.has_class(comment.node(), COMMENT_LOCKED));
    for &target in comment.targets() {
        if doc.tag(target).is_some() {
            assert!(doc.has_class(target, LOC_LOCKED));
        }
    }

    coordinator.click(&mut doc, &id("demo", "1")).expect("unlock");
    assert_eq!(coordinator.lock().current(), None);
    assert!(!doc.has_class(comment.node(), COMMENT_LOCKED));
    assert_eq!(locked_comment_count(&doc), 0);
}

#[test]
fn lock_ownership_moves_fully_between_comments() {
    let (mut doc, mut coordinator, _) = demo();
    let first = coordinator.comment(&id("demo", "1")).expect("comment").clone();
    let second = coordinator.comment(&id("demo", "2")).expect("comment").clone();

    coordinator.click(&mut doc, &id("demo", "1")).expect("lock first");
    coordinator.click(&mut doc, &id("demo", "2")).expect("lock second");

    assert_eq!(coordinator.lock().current(), Some(&id("demo", "2")));
    assert!(!doc.has_class(first.node(), COMMENT_LOCKED));
    for &target in first.targets() {
        assert!(!doc.has_class(target, LOC_LOCKED));
    }
    assert!(doc.has_class(second.node(), COMMENT_LOCKED));
}

#[test]
fn at_most_one_comment_locked_across_any_click_sequence() {
    let (mut doc, mut coordinator, _) = demo();
    let sequence = [
        id("demo", "1"),
        id("demo", "2"),
        id("demo", "2"),
        id("demo", "1"),
        id("demo", "2"),
        id("demo", "1"),
        id("demo", "1"),
    ];
    for comment_id in &sequence {
        coordinator.click(&mut doc, comment_id).expect("click");
        let marked = locked_comment_count(&doc);
        assert!(marked <= 1, "lock invariant violated: {marked} locked comments");
        match coordinator.lock().current() {
            Some(owner) => {
                let node = coordinator.comment(owner).expect("owner").node();
                assert!(doc.has_class(node, COMMENT_LOCKED));
                assert_eq!(marked, 1);
            }
            None => assert_eq!(marked, 0),
        }
    }
}

#[test]
fn hovering_substituting_comment_unlocks_and_reverts_other() {
    let (mut doc, mut coordinator) = dual_substituting();
    let first = coordinator.comment(&id("dual", "1")).expect("comment").clone();
    let second = coordinator.comment(&id("dual", "2")).expect("comment").clone();
    let first_target = first.first_target().expect("target");
    let second_target = second.first_target().expect("target");

    coordinator.hover_enter(&mut doc, &id("dual", "1")).expect("hover first");
    coordinator.click(&mut doc, &id("dual", "1")).expect("lock first");
    coordinator.hover_leave(&mut doc, &id("dual", "1")).expect("leave first");
    // Locked: the substitution persists after mouse-leave.
    assert_eq!(doc.inner_markup(first_target), "<em>ONE</em>");

    coordinator.hover_enter(&mut doc, &id("dual", "2")).expect("hover second");
    assert_eq!(doc.inner_markup(first_target), "one");
    assert!(!doc.has_class(first.node(), COMMENT_LOCKED));
    assert_eq!(coordinator.lock().current(), None);
    assert_eq!(doc.inner_markup(second_target), "<em>TWO</em>");
}

#[test]
fn locked_substitution_survives_leave_until_unlock() {
    let (mut doc, mut coordinator) = dual_substituting();
    let comment = coordinator.comment(&id("dual", "1")).expect("comment").clone();
    let target = comment.first_target().expect("target");

    coordinator.hover_enter(&mut doc, &id("dual", "1")).expect("hover");
    coordinator.click(&mut doc, &id("dual", "1")).expect("lock");
    coordinator.hover_leave(&mut doc, &id("dual", "1")).expect("leave");
    assert_eq!(doc.inner_markup(target), "<em>ONE</em>");
    assert!(doc.has_class(target, LOC_INSERTED));

    coordinator.click(&mut doc, &id("dual", "1")).expect("unlock");
    coordinator.hover_leave(&mut doc, &id("dual", "1")).expect("leave again");
    assert_eq!(doc.inner_markup(target), "one");
    assert!(!doc.has_class(target, LOC_INSERTED));
}

#[test]
fn snapshot_is_captured_once_and_reused() {
    let (mut doc, mut coordinator) = dual_substituting();
    let comment = coordinator.comment(&id("dual", "1")).expect("comment").clone();
    let target = comment.first_target().expect("target");

    coordinator.hover_enter(&mut doc, &id("dual", "1")).expect("hover");
    coordinator.hover_leave(&mut doc, &id("dual", "1")).expect("leave");
    assert_eq!(doc.inner_markup(target), "one");

    // Outside mutation after the first capture is deliberately invisible to
    // the revert path: the original snapshot wins.
    doc.set_inner_markup(target, "mutated elsewhere");
    coordinator.hover_enter(&mut doc, &id("dual", "1")).expect("hover again");
    assert_eq!(doc.inner_markup(target), "<em>ONE</em>");
    coordinator.hover_leave(&mut doc, &id("dual", "1")).expect("leave again");
    assert_eq!(doc.inner_markup(target), "one");
}

#[test]
fn unlock_clears_stray_markers_without_releasing_other_owner() {
    let (mut doc, mut coordinator, _) = demo();
    let second = coordinator.comment(&id("demo", "2")).expect("comment").clone();

    coordinator.click(&mut doc, &id("demo", "1")).expect("lock first");
    // Stray marker that no transition produced.
    doc.add_class(second.node(), COMMENT_LOCKED);

    coordinator.unlock(&mut doc, &id("demo", "2")).expect("unlock second");
    assert!(!doc.has_class(second.node(), COMMENT_LOCKED));
    assert_eq!(coordinator.lock().current(), Some(&id("demo", "1")));
}

#[test]
fn empty_target_set_interactions_are_noops() {
    let mut doc = PageDoc::new();
    let body = doc.push_element(None, "body", &[]);
    let node = doc.push_element(Some(body), "span", &["codecomment", "comment-lone-1"]);
    doc.set_attr(node, "data-replacement", "<b>X</b>");

    let report = scan_page(&doc);
    assert!(report.has_errors());
    let (comments, _, _) = report.into_parts();
    let mut coordinator = Coordinator::new(comments);

    let delta = coordinator.hover_enter(&mut doc, &id("lone", "1")).expect("hover");
    assert_eq!(delta.content_replaced, Vec::new());
    assert!(doc.has_class(node, COMMENT_HIGHLIGHTED));
    coordinator.hover_leave(&mut doc, &id("lone", "1")).expect("leave");
    assert!(!doc.has_class(node, COMMENT_HIGHLIGHTED));
}

#[test]
fn unknown_comment_id_is_an_error() {
    let (mut doc, mut coordinator, _) = demo();
    let missing = id("demo", "9");
    let err = coordinator.hover_enter(&mut doc, &missing).expect_err("unknown id");
    assert_eq!(err, InteractError::UnknownComment { comment_id: missing });
}

#[test]
fn gui_hover_swaps_and_restores_image_sources() {
    let (mut doc, _, gui) = demo();
    let comment = gui.comment(&id("fig1", "2")).expect("gui comment").clone();
    let image = comment.first_target().expect("image");
    assert_eq!(doc.attr(image, "src"), Some("/static/guifig1.png"));

    gui.hover_enter(&mut doc, &id("fig1", "2")).expect("enter");
    assert_eq!(doc.attr(image, "src"), Some("/static/guifig1_2.png"));
    assert!(doc.has_class(comment.node(), COMMENT_HIGHLIGHTED));

    gui.hover_leave(&mut doc, &id("fig1", "2")).expect("leave");
    assert_eq!(doc.attr(image, "src"), Some("/static/guifig1.png"));
    assert!(!doc.has_class(comment.node(), COMMENT_HIGHLIGHTED));
}

#[test]
fn gui_target_without_source_is_an_error() {
    let mut doc = PageDoc::new();
    let body = doc.push_element(None, "body", &[]);
    doc.push_element(Some(body), "div", &["guicomment", "container", "comment-fig2at1"]);
    let container = doc.push_element(Some(body), "div", &["guifig2", "container"]);
    let figure = doc.push_element(Some(container), "div", &["figure"]);
    doc.push_element(Some(figure), "img", &[]);

    let report = scan_page(&doc);
    let (_, gui_comments, _) = report.into_parts();
    let gui = GuiCoordinator::new(gui_comments);

    let err = gui.hover_enter(&mut doc, &id("fig2", "1")).expect_err("missing src");
    assert!(matches!(err, InteractError::MissingImageSource { .. }));
}
