mod content;
mod node;

pub use content::Content;
pub use node::Element;

/// Find an element by ID in the tree.
pub fn find_element<'a>(root: &'a Element, id: &str) -> Option<&'a Element> {
    if root.id == id {
        return Some(root);
    }

    if let Content::Children(children) = &root.content {
        for child in children {
            if let Some(found) = find_element(child, id) {
                return Some(found);
            }
        }
    }

    None
}

/// Find an element by ID in the tree, mutably.
pub fn find_element_mut<'a>(root: &'a mut Element, id: &str) -> Option<&'a mut Element> {
    if root.id == id {
        return Some(root);
    }

    if let Content::Children(children) = &mut root.content {
        for child in children {
            if let Some(found) = find_element_mut(child, id) {
                return Some(found);
            }
        }
    }

    None
}

/// Replace the element with the given ID by `new`, keeping its position
/// among its siblings. Returns false (leaving the tree untouched) when no
/// element matches. The root itself cannot be replaced.
pub fn replace_element(root: &mut Element, id: &str, new: Element) -> bool {
    try_replace(root, id, new).is_ok()
}

fn try_replace(parent: &mut Element, id: &str, mut new: Element) -> Result<(), Element> {
    if let Content::Children(children) = &mut parent.content {
        if let Some(slot) = children.iter_mut().find(|child| child.id == id) {
            *slot = new;
            return Ok(());
        }
        for child in children.iter_mut() {
            match try_replace(child, id, new) {
                Ok(()) => return Ok(()),
                Err(back) => new = back,
            }
        }
    }
    Err(new)
}
