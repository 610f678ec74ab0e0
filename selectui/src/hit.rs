use crate::element::{Content, Element};
use crate::layout::LayoutResult;

/// Find the deepest clickable element at the given coordinates. Click
/// dispatch keys on this; a point covered by no clickable element becomes
/// an outside click.
pub fn hit_test(layout: &LayoutResult, root: &Element, x: u16, y: u16) -> Option<String> {
    deepest_match(layout, root, x, y, &|element| element.clickable)
}

/// Find the deepest focusable element at the given coordinates, for
/// focus-follows-mouse.
pub fn hit_test_focusable(
    layout: &LayoutResult,
    root: &Element,
    x: u16,
    y: u16,
) -> Option<String> {
    deepest_match(layout, root, x, y, &|element| element.focusable)
}

fn deepest_match(
    layout: &LayoutResult,
    element: &Element,
    x: u16,
    y: u16,
    accept: &dyn Fn(&Element) -> bool,
) -> Option<String> {
    let rect = layout.get(&element.id)?;

    if !rect.contains(x, y) {
        return None;
    }

    // Check children in reverse order (last rendered = on top)
    if let Content::Children(children) = &element.content {
        for child in children.iter().rev() {
            if let Some(id) = deepest_match(layout, child, x, y, accept) {
                return Some(id);
            }
        }
    }

    if accept(element) {
        Some(element.id.clone())
    } else {
        None
    }
}
