pub mod element;
pub mod event;
pub mod focus;
pub mod hit;
pub mod layout;
pub mod select;
pub mod text;

pub use element::{find_element, find_element_mut, replace_element, Content, Element};
pub use event::{Event, Key, Modifiers, MouseButton};
pub use focus::{collect_focusable, FocusState};
pub use hit::{hit_test, hit_test_focusable};
pub use layout::{LayoutResult, Rect};
pub use select::{Select, SelectConfig, SelectError, SelectOutcome, SelectState, Selection};
