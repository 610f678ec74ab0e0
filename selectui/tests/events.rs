use crossterm::event::{
    Event as CrosstermEvent, KeyCode, KeyEvent, KeyModifiers, MouseButton as CtMouseButton,
    MouseEvent, MouseEventKind,
};

use selectui::{
    collect_focusable, hit_test, hit_test_focusable, Element, Event, FocusState, Key,
    LayoutResult, MouseButton, Rect,
};

fn create_layout(elements: &[(&str, Rect)]) -> LayoutResult {
    let mut layout = LayoutResult::new();
    for (id, rect) in elements {
        layout.insert(id.to_string(), *rect);
    }
    layout
}

fn key_press(code: KeyCode) -> CrosstermEvent {
    CrosstermEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn mouse(kind: MouseEventKind, column: u16, row: u16) -> CrosstermEvent {
    CrosstermEvent::Mouse(MouseEvent {
        kind,
        column,
        row,
        modifiers: KeyModifiers::NONE,
    })
}

// ============================================================================
// Hit Testing
// ============================================================================

#[test]
fn test_hit_test_point_inside() {
    let root = Element::box_()
        .id("root")
        .clickable(true)
        .child(Element::text("Click me").id("btn").clickable(true));

    let layout = create_layout(&[
        ("root", Rect::new(0, 0, 100, 50)),
        ("btn", Rect::new(10, 10, 30, 3)),
    ]);

    // Click inside btn
    assert_eq!(hit_test(&layout, &root, 15, 11), Some("btn".to_string()));

    // Click inside root but outside btn
    assert_eq!(hit_test(&layout, &root, 5, 5), Some("root".to_string()));

    // Click outside everything
    assert_eq!(hit_test(&layout, &root, 150, 150), None);
}

#[test]
fn test_hit_test_overlapping_elements() {
    // Later children should be "on top"
    let root = Element::box_()
        .id("root")
        .child(Element::box_().id("bottom").clickable(true))
        .child(Element::box_().id("top").clickable(true));

    let layout = create_layout(&[
        ("root", Rect::new(0, 0, 100, 100)),
        ("bottom", Rect::new(10, 10, 50, 50)),
        ("top", Rect::new(30, 30, 50, 50)), // Overlaps with bottom
    ]);

    // Click in overlapping region - top should win
    assert_eq!(hit_test(&layout, &root, 40, 40), Some("top".to_string()));

    // Click only in bottom (before overlap)
    assert_eq!(hit_test(&layout, &root, 15, 15), Some("bottom".to_string()));
}

#[test]
fn test_hit_test_only_clickable() {
    let root = Element::box_()
        .id("root")
        .child(Element::text("Not clickable").id("text"));

    let layout = create_layout(&[
        ("root", Rect::new(0, 0, 100, 50)),
        ("text", Rect::new(10, 10, 30, 3)),
    ]);

    // Click on non-clickable element returns None
    assert_eq!(hit_test(&layout, &root, 15, 11), None);
}

#[test]
fn test_hit_test_focusable() {
    let root = Element::box_()
        .id("root")
        .child(Element::text("Focusable").id("input").focusable(true))
        .child(Element::text("Not focusable").id("text"));

    let layout = create_layout(&[
        ("root", Rect::new(0, 0, 100, 50)),
        ("input", Rect::new(10, 10, 30, 3)),
        ("text", Rect::new(10, 20, 30, 3)),
    ]);

    assert_eq!(
        hit_test_focusable(&layout, &root, 15, 11),
        Some("input".to_string())
    );
    assert_eq!(hit_test_focusable(&layout, &root, 15, 21), None);
}

// ============================================================================
// Focus State
// ============================================================================

#[test]
fn test_focus_state_tracks_changes() {
    let mut focus = FocusState::new();

    assert_eq!(focus.focused(), None);

    // Focus an element
    assert!(focus.focus("input1"));
    assert_eq!(focus.focused(), Some("input1"));

    // Focus same element - no change
    assert!(!focus.focus("input1"));

    // Focus different element
    assert!(focus.focus("input2"));
    assert_eq!(focus.focused(), Some("input2"));
}

#[test]
fn test_focus_next_navigation() {
    let root = Element::box_()
        .child(Element::text("Input 1").id("input1").focusable(true))
        .child(Element::text("Input 2").id("input2").focusable(true))
        .child(Element::text("Input 3").id("input3").focusable(true));

    let mut focus = FocusState::new();

    assert_eq!(focus.focus_next(&root), Some("input1".to_string()));
    assert_eq!(focus.focus_next(&root), Some("input2".to_string()));
    assert_eq!(focus.focus_next(&root), Some("input3".to_string()));

    // Wrap around
    assert_eq!(focus.focus_next(&root), Some("input1".to_string()));
}

#[test]
fn test_focus_prev_navigation() {
    let root = Element::box_()
        .child(Element::text("Input 1").id("input1").focusable(true))
        .child(Element::text("Input 2").id("input2").focusable(true))
        .child(Element::text("Input 3").id("input3").focusable(true));

    let mut focus = FocusState::new();

    assert_eq!(focus.focus_prev(&root), Some("input3".to_string()));
    assert_eq!(focus.focus_prev(&root), Some("input2".to_string()));
    assert_eq!(focus.focus_prev(&root), Some("input1".to_string()));

    // Wrap around
    assert_eq!(focus.focus_prev(&root), Some("input3".to_string()));
}

#[test]
fn test_focus_no_focusable_elements() {
    let root = Element::box_()
        .child(Element::text("Not focusable").id("text1"))
        .child(Element::text("Also not").id("text2"));

    let mut focus = FocusState::new();

    assert_eq!(focus.focus_next(&root), None);
    assert_eq!(focus.focus_prev(&root), None);
}

#[test]
fn test_collect_focusable_order() {
    let root = Element::box_()
        .id("root")
        .focusable(true)
        .child(
            Element::box_()
                .id("group1")
                .child(Element::text("A").id("a").focusable(true))
                .child(Element::text("B").id("b").focusable(true)),
        )
        .child(Element::text("C").id("c").focusable(true));

    let focusable = collect_focusable(&root);
    assert_eq!(focusable, vec!["root", "a", "b", "c"]);
}

// ============================================================================
// Raw Event Translation
// ============================================================================

#[test]
fn test_tab_navigates_focus() {
    let root = Element::box_()
        .id("root")
        .child(Element::text("One").id("one").focusable(true))
        .child(Element::text("Two").id("two").focusable(true));
    let layout = create_layout(&[("root", Rect::new(0, 0, 10, 2))]);

    let mut focus = FocusState::new();
    let events = focus.process_events(&[key_press(KeyCode::Tab)], &root, &layout);

    assert_eq!(
        events,
        vec![Event::Focus {
            target: "one".to_string()
        }]
    );
    assert_eq!(focus.focused(), Some("one"));

    let events = focus.process_events(&[key_press(KeyCode::Tab)], &root, &layout);
    assert_eq!(
        events,
        vec![
            Event::Blur {
                target: "one".to_string()
            },
            Event::Focus {
                target: "two".to_string()
            },
        ]
    );
}

#[test]
fn test_captured_element_receives_tab() {
    let root = Element::box_()
        .id("root")
        .child(Element::text("Row").id("row").focusable(true).captures_input(true))
        .child(Element::text("Other").id("other").focusable(true));
    let layout = create_layout(&[("root", Rect::new(0, 0, 10, 2))]);

    let mut focus = FocusState::new();
    focus.focus("row");

    let events = focus.process_events(&[key_press(KeyCode::Tab)], &root, &layout);
    assert_eq!(
        events,
        vec![Event::Key {
            target: Some("row".to_string()),
            key: Key::Tab,
            modifiers: Default::default(),
        }]
    );
    // Focus stays put
    assert_eq!(focus.focused(), Some("row"));
}

#[test]
fn test_key_targets_focused_element() {
    let root = Element::box_()
        .id("root")
        .child(Element::text("One").id("one").focusable(true));
    let layout = create_layout(&[("root", Rect::new(0, 0, 10, 1))]);

    let mut focus = FocusState::new();
    focus.focus("one");

    let events = focus.process_events(&[key_press(KeyCode::Enter)], &root, &layout);
    assert_eq!(
        events,
        vec![Event::Key {
            target: Some("one".to_string()),
            key: Key::Enter,
            modifiers: Default::default(),
        }]
    );
}

#[test]
fn test_mouse_down_emits_click() {
    let root = Element::box_()
        .id("root")
        .child(Element::text("Button").id("btn").clickable(true));
    let layout = create_layout(&[
        ("root", Rect::new(0, 0, 20, 5)),
        ("btn", Rect::new(2, 2, 10, 1)),
    ]);

    let mut focus = FocusState::new();
    let events = focus.process_events(
        &[mouse(MouseEventKind::Down(CtMouseButton::Left), 3, 2)],
        &root,
        &layout,
    );

    assert_eq!(
        events,
        vec![Event::Click {
            target: Some("btn".to_string()),
            x: 3,
            y: 2,
            button: MouseButton::Left,
        }]
    );
}

#[test]
fn test_mouse_move_focuses_hovered_element() {
    let root = Element::box_()
        .id("root")
        .child(Element::text("Field").id("field").focusable(true));
    let layout = create_layout(&[
        ("root", Rect::new(0, 0, 20, 5)),
        ("field", Rect::new(0, 1, 10, 1)),
    ]);

    let mut focus = FocusState::new();
    let events = focus.process_events(&[mouse(MouseEventKind::Moved, 4, 1)], &root, &layout);

    assert_eq!(
        events,
        vec![Event::Focus {
            target: "field".to_string()
        }]
    );
    assert_eq!(focus.focused(), Some("field"));

    // Moving within the same element changes nothing
    let events = focus.process_events(&[mouse(MouseEventKind::Moved, 5, 1)], &root, &layout);
    assert!(events.is_empty());
}
