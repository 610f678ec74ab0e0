use std::fmt;

use thiserror::Error;

use crate::element::{find_element, find_element_mut, replace_element, Element};
use crate::event::{Event, Key, Modifiers};
use crate::focus::FocusState;
use crate::layout::LayoutResult;
use crate::text::display_width;

/// Class names applied to the synthesized markup. External stylesheets and
/// test harnesses key off these; the open modifier on the container is the
/// sole visual signal of panel visibility.
pub mod class {
    pub const ROOT: &str = "selectui";
    pub const TRIGGER: &str = "selectui-trigger";
    pub const OPTIONS: &str = "selectui-options";
    pub const OPTION: &str = "selectui-option";
    pub const OPEN: &str = "selectui-open";
}

/// Payload delivered to `on_select`, once per committed selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub content: String,
    pub value: String,
    pub index: usize,
}

pub type OnSelect = Box<dyn FnMut(&Selection)>;

/// Widget configuration. All fields default to off/absent.
#[derive(Default)]
pub struct SelectConfig {
    /// Called once per committed selection, never for hover navigation.
    pub on_select: Option<OnSelect>,
    /// Close the panel when a click lands outside the widget subtree.
    pub close_on_outside_click: bool,
    /// Mirror each row's content into its `title` attribute, and keep the
    /// trigger's `title` current on commit. Useful when options are wider
    /// than the widget.
    pub option_title_from_content: bool,
    /// Defer replacing the source element until the next `tick`. Avoids the
    /// widget grabbing focus on insertion when a tabindex is present.
    pub defer_replacement: bool,
}

impl fmt::Debug for SelectConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectConfig")
            .field("on_select", &self.on_select.is_some())
            .field("close_on_outside_click", &self.close_on_outside_click)
            .field("option_title_from_content", &self.option_title_from_content)
            .field("defer_replacement", &self.defer_replacement)
            .finish()
    }
}

/// Observable widget state. `current_index` and `hover_index` stay within
/// `0..option_count` whenever set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectState {
    pub is_open: bool,
    pub current_index: Option<usize>,
    pub hover_index: Option<usize>,
    pub selected_value: Option<String>,
}

/// Result of dispatching one event to the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    /// A selection was committed (`on_select` has already run).
    Selected(Selection),
    /// The event belonged to the widget and was consumed.
    Handled,
    /// The event was not for this widget.
    Ignored,
}

#[derive(Debug, Error)]
pub enum SelectError {
    #[error("no element matches selector {0:?}")]
    SelectorNotFound(String),
    #[error("source element {0:?} has no options")]
    NoOptions(String),
}

/// A select control rebuilt from plain elements so the host can style it
/// freely while keeping select-like behavior.
///
/// Construction synthesizes a parallel tree from a source element (one row
/// per source child), after which the widget owns selection and open state
/// exclusively. Events reach it as high-level [`Event`]s, either directly
/// through [`Select::handle_event`] or via [`Select::process_events`].
#[derive(Debug)]
pub struct Select {
    state: SelectState,
    config: SelectConfig,
    focus: FocusState,
    tree: Element,
    source_id: String,
    trigger_id: String,
    options_id: String,
    option_ids: Vec<String>,
    pending_replacement: bool,
    pending_scroll_reset: bool,
    destroyed: bool,
}

impl Select {
    /// Build a widget from the element matching `selector` (an element ID)
    /// in the given tree.
    pub fn from_selector(
        root: &Element,
        selector: &str,
        config: SelectConfig,
    ) -> Result<Self, SelectError> {
        let source = find_element(root, selector)
            .ok_or_else(|| SelectError::SelectorNotFound(selector.to_string()))?;
        Self::from_element(source, config)
    }

    /// Build a widget from a source element. One row is synthesized per
    /// source child; option order is fixed here for the widget's lifetime.
    pub fn from_element(source: &Element, config: SelectConfig) -> Result<Self, SelectError> {
        let source_options = source.child_elements();
        if source_options.is_empty() {
            return Err(SelectError::NoOptions(source.id.clone()));
        }

        let tab_index = source.get_attr("tabindex").cloned();

        // Last marked option wins, as the native control resolves duplicates.
        let marked = source_options
            .iter()
            .enumerate()
            .filter(|(_, option)| option.get_attr("selected").is_some())
            .map(|(index, _)| index)
            .last();
        let initial = marked.unwrap_or(0);

        let mut rows = Vec::with_capacity(source_options.len());
        for source_option in source_options {
            let content = source_option.text_content();
            let mut row = Element::text(content.clone())
                .class(class::OPTION)
                .focusable(true)
                .clickable(true)
                .captures_input(true);
            copy_attributes(source_option, &mut row);
            row.remove_attr("selected");
            if config.option_title_from_content {
                row.set_attr("title", content);
            }
            if let Some(tab_index) = &tab_index {
                row.set_attr("tabindex", tab_index.clone());
            }
            rows.push(row);
        }
        let option_ids: Vec<String> = rows.iter().map(|row| row.id.clone()).collect();

        let initial_content = rows[initial].text_content();
        let initial_value = rows[initial]
            .get_attr("data-value")
            .cloned()
            .unwrap_or_default();

        let mut trigger = Element::text(initial_content.clone())
            .class(class::TRIGGER)
            .focusable(true)
            .clickable(true);
        if let Some(tab_index) = &tab_index {
            trigger.set_attr("tabindex", tab_index.clone());
        }
        if config.option_title_from_content {
            trigger.set_attr("title", initial_content);
        }
        let trigger_id = trigger.id.clone();

        let options = Element::box_().class(class::OPTIONS).children(rows);
        let options_id = options.id.clone();

        let mut container = Element::box_().class(class::ROOT);
        copy_attributes(source, &mut container);
        container.set_attr("data-value", initial_value.clone());
        let tree = container.child(trigger).child(options);

        Ok(Self {
            state: SelectState {
                is_open: false,
                current_index: Some(initial),
                // Hover only exists once a marked selection or keyboard
                // navigation establishes it.
                hover_index: marked,
                selected_value: Some(initial_value),
            },
            config,
            focus: FocusState::new(),
            tree,
            source_id: source.id.clone(),
            trigger_id,
            options_id,
            option_ids,
            pending_replacement: false,
            pending_scroll_reset: false,
            destroyed: false,
        })
    }

    // Mounting

    /// Replace the source element in the host tree with the widget tree.
    /// With `defer_replacement` the swap is postponed to the next `tick`;
    /// returns whether the swap happened now.
    pub fn replace_in(&mut self, root: &mut Element) -> bool {
        if self.config.defer_replacement {
            self.pending_replacement = true;
            return false;
        }
        replace_element(root, &self.source_id, self.tree.clone())
    }

    /// Apply single-shot deferred work (the deferred source replacement and
    /// the post-hover scroll reset), then re-sync the mounted subtree.
    pub fn tick(&mut self, root: &mut Element) {
        if self.pending_scroll_reset {
            self.pending_scroll_reset = false;
            if let Some(options) = find_element_mut(&mut self.tree, &self.options_id) {
                options.scroll_top = 0;
            }
        }
        if self.pending_replacement {
            self.pending_replacement = false;
            if replace_element(root, &self.source_id, self.tree.clone()) {
                return;
            }
        }
        self.sync_into(root);
    }

    /// Push the current widget tree into the host tree. The mounted copy
    /// goes stale whenever state changes; hosts call this once per frame.
    pub fn sync_into(&self, root: &mut Element) -> bool {
        let mounted = self.tree.clone();
        replace_element(root, &self.tree.id, mounted)
    }

    // Event dispatch

    /// Dispatch one high-level event to the widget.
    pub fn handle_event(&mut self, event: &Event) -> SelectOutcome {
        if self.destroyed {
            return SelectOutcome::Ignored;
        }
        match event {
            Event::Click { target, .. } => self.handle_click(target.as_deref()),
            Event::Key {
                target: Some(target),
                key,
                modifiers,
            } if self.owns(target) => self.handle_key(*key, *modifiers),
            _ => SelectOutcome::Ignored,
        }
    }

    /// Translate raw terminal input through the widget's focus state and
    /// dispatch it. Returns the selections committed by this batch.
    pub fn process_events(
        &mut self,
        raw: &[crossterm::event::Event],
        root: &Element,
        layout: &LayoutResult,
    ) -> Vec<Selection> {
        let events = self.focus.process_events(raw, root, layout);
        let mut selections = Vec::new();
        for event in &events {
            if let SelectOutcome::Selected(selection) = self.handle_event(event) {
                selections.push(selection);
            }
        }
        selections
    }

    fn handle_click(&mut self, target: Option<&str>) -> SelectOutcome {
        match target {
            Some(id) if id == self.trigger_id => {
                self.toggle();
                SelectOutcome::Handled
            }
            Some(id) => {
                // Rows only accept clicks while the panel is shown; a host
                // may keep row rects in its layout when the panel is closed.
                if self.state.is_open {
                    if let Some(index) = self.option_ids.iter().position(|row| row == id) {
                        return self.commit(index);
                    }
                }
                if self.owns(id) {
                    // Clicks landing on container, panel padding, or rows of
                    // a closed panel.
                    return SelectOutcome::Ignored;
                }
                self.handle_outside_click()
            }
            None => self.handle_outside_click(),
        }
    }

    fn handle_outside_click(&mut self) -> SelectOutcome {
        if self.config.close_on_outside_click && self.state.is_open {
            self.close();
            SelectOutcome::Handled
        } else {
            SelectOutcome::Ignored
        }
    }

    fn handle_key(&mut self, key: Key, modifiers: Modifiers) -> SelectOutcome {
        if !self.state.is_open {
            return match key {
                Key::Enter => {
                    self.open();
                    self.focus_hovered_or_first();
                    SelectOutcome::Handled
                }
                _ => SelectOutcome::Ignored,
            };
        }

        match key {
            Key::Down => {
                self.hover_next();
                SelectOutcome::Handled
            }
            Key::Up => {
                self.hover_prev();
                SelectOutcome::Handled
            }
            Key::Tab if modifiers.shift => {
                self.hover_prev();
                SelectOutcome::Handled
            }
            Key::Tab => {
                self.hover_next();
                SelectOutcome::Handled
            }
            Key::BackTab => {
                self.hover_prev();
                SelectOutcome::Handled
            }
            Key::Enter => match self.state.hover_index {
                Some(index) => self.commit(index),
                None => {
                    self.close();
                    SelectOutcome::Handled
                }
            },
            Key::Escape => {
                // Escape discards hover changes rather than committing them.
                self.close();
                self.state.hover_index = self.state.current_index;
                SelectOutcome::Handled
            }
            _ => SelectOutcome::Ignored,
        }
    }

    // Hover navigation. Never commits and never fires `on_select`.

    fn hover_next(&mut self) {
        let last = self.option_ids.len() - 1;
        match self.state.hover_index {
            None => {
                self.state.hover_index = Some(0);
                // Deferred so the reset does not fight the host scrolling
                // the newly focused row into view.
                self.pending_scroll_reset = true;
            }
            Some(index) if index < last => self.state.hover_index = Some(index + 1),
            Some(_) => {}
        }
        self.focus_hovered();
    }

    fn hover_prev(&mut self) {
        if let Some(index) = self.state.hover_index {
            if index > 0 {
                self.state.hover_index = Some(index - 1);
            }
            self.focus_hovered();
        }
    }

    fn focus_hovered(&mut self) {
        if let Some(index) = self.state.hover_index {
            self.focus.focus(&self.option_ids[index]);
        }
    }

    fn focus_hovered_or_first(&mut self) {
        let index = self.state.hover_index.unwrap_or(0);
        self.focus.focus(&self.option_ids[index]);
    }

    // Selection protocol

    fn commit(&mut self, index: usize) -> SelectOutcome {
        let Some(row) = self.option_row(index) else {
            return SelectOutcome::Ignored;
        };
        let content = row.text_content();
        let value = row.get_attr("data-value").cloned().unwrap_or_default();
        log::debug!("[select] commit index={index} value={value:?}");

        self.state.current_index = Some(index);
        self.state.hover_index = Some(index);
        self.state.selected_value = Some(value.clone());

        self.apply_selection(&content, &value);
        self.close();

        let selection = Selection {
            content,
            value,
            index,
        };
        if let Some(on_select) = &mut self.config.on_select {
            on_select(&selection);
        }
        SelectOutcome::Selected(selection)
    }

    fn apply_selection(&mut self, content: &str, value: &str) {
        let set_title = self.config.option_title_from_content;
        if let Some(trigger) = find_element_mut(&mut self.tree, &self.trigger_id) {
            trigger.set_text(content);
            if set_title {
                trigger.set_attr("title", content);
            }
        }
        self.tree.set_attr("data-value", value);
    }

    fn apply_open_state(&mut self) {
        log::debug!("[select] {} open={}", self.tree.id, self.state.is_open);
        if self.state.is_open {
            self.tree.add_class(class::OPEN);
        } else {
            self.tree.remove_class(class::OPEN);
        }
    }

    // Public control surface

    pub fn is_open(&self) -> bool {
        self.state.is_open
    }

    pub fn open(&mut self) {
        if self.state.is_open {
            return;
        }
        self.state.is_open = true;
        self.apply_open_state();
    }

    /// Close the panel. Always returns focus to the trigger.
    pub fn close(&mut self) {
        if self.state.is_open {
            self.state.is_open = false;
            self.apply_open_state();
        }
        self.focus.focus(&self.trigger_id);
    }

    pub fn toggle(&mut self) {
        if self.state.is_open {
            self.close();
        } else {
            self.open();
        }
    }

    /// Index of the committed selection.
    pub fn index(&self) -> Option<usize> {
        self.state.current_index
    }

    /// Value of the committed selection.
    pub fn value(&self) -> Option<&str> {
        self.state.selected_value.as_deref()
    }

    /// Content of the committed selection.
    pub fn content(&self) -> Option<String> {
        let index = self.state.current_index?;
        self.option_row(index).map(Element::text_content)
    }

    /// Programmatically commit the option at `index`, routing through the
    /// same selection protocol as a click. Out-of-range is a silent no-op.
    pub fn set_index(&mut self, index: usize) {
        if index >= self.option_ids.len() {
            log::debug!(
                "[select] set_index {index} out of range ({} options)",
                self.option_ids.len()
            );
            return;
        }
        self.commit(index);
    }

    /// Stop all future event handling and drop the callback. The mounted
    /// markup stays in place; the source element is not restored.
    pub fn destroy(&mut self) {
        self.destroyed = true;
        self.config.on_select = None;
    }

    // Introspection

    pub fn state(&self) -> &SelectState {
        &self.state
    }

    pub fn focused(&self) -> Option<&str> {
        self.focus.focused()
    }

    /// The synthesized widget tree.
    pub fn view(&self) -> &Element {
        &self.tree
    }

    pub fn root_id(&self) -> &str {
        &self.tree.id
    }

    pub fn trigger_id(&self) -> &str {
        &self.trigger_id
    }

    pub fn options_id(&self) -> &str {
        &self.options_id
    }

    pub fn option_ids(&self) -> &[String] {
        &self.option_ids
    }

    pub fn option_count(&self) -> usize {
        self.option_ids.len()
    }

    /// Widest option row in terminal columns; a sizing hint for the host.
    pub fn intrinsic_width(&self) -> u16 {
        find_element(&self.tree, &self.options_id)
            .map(|options| {
                options
                    .child_elements()
                    .iter()
                    .map(|row| display_width(&row.text_content()))
                    .max()
                    .unwrap_or(0)
            })
            .unwrap_or(0)
    }

    fn option_row(&self, index: usize) -> Option<&Element> {
        let options = find_element(&self.tree, &self.options_id)?;
        options.child_elements().get(index)
    }

    fn owns(&self, id: &str) -> bool {
        find_element(&self.tree, id).is_some()
    }
}

/// Copy attributes from one element to another, renaming `value` to
/// `data-value` so the copy cannot collide with host form semantics.
fn copy_attributes(src: &Element, dest: &mut Element) {
    for (name, value) in &src.attrs {
        let name = if name == "value" { "data-value" } else { name.as_str() };
        dest.set_attr(name, value.clone());
    }
}
