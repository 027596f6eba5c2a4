//! Bindable target interface
//!
//! The bindings never touch a rendering substrate directly. Everything they
//! need from an element goes through [`BindableTarget`]: attribute reads,
//! value/text/source accessors, a class toggle, event subscription and a
//! subtree scan. A browser backend and the in-memory
//! [`HeadlessElement`](crate::HeadlessElement) both implement it.

use std::fmt;
use std::sync::Arc;

/// Declarative attribute naming the outbound action
pub const ATTR_ACTION: &str = "data-action";
/// Declarative attribute naming the inbound signal (`name` or `signal:field`)
pub const ATTR_SIGNAL: &str = "data-signal";
/// Declarative attribute excluding an element from wiring
pub const ATTR_SKIPWIRE: &str = "data-skipwire";

/// Local interaction events a binding may listen to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Activation (button press)
    Click,
    /// Value committed (blur, enter, slider release)
    Change,
    /// Value changing live (slider drag)
    Input,
    /// Single keystroke released
    KeyUp,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Click => "click",
            EventKind::Change => "change",
            EventKind::Input => "input",
            EventKind::KeyUp => "keyup",
        };
        write!(f, "{}", name)
    }
}

/// Handle returned by [`BindableTarget::listen`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Local event callback
pub type EventHandler = Arc<dyn Fn() + Send + Sync>;

/// Shared handle to one element
pub type Target = Arc<dyn BindableTarget>;

/// One UI element as seen by the bindings
pub trait BindableTarget: Send + Sync {
    /// Lower-case tag name (`button`, `input`, `span`, ...)
    fn tag(&self) -> String;

    /// Raw attribute value
    fn attribute(&self, name: &str) -> Option<String>;

    /// Whether a binding already claimed this element
    fn is_bound(&self) -> bool;

    /// Claim this element for a binding
    fn mark_bound(&self);

    /// Displayed text content
    fn text(&self) -> String;

    fn set_text(&self, text: &str);

    /// Replace the content with markup
    fn set_markup(&self, markup: &str);

    /// Raw control value (inputs)
    fn value(&self) -> String;

    fn set_value(&self, value: &str);

    /// Image source reference
    fn src(&self) -> String;

    fn set_src(&self, src: &str);

    fn has_class(&self, class: &str) -> bool;

    /// Add (`on == true`) or remove a presentation class
    fn set_class(&self, class: &str, on: bool);

    /// Subscribe to a local event
    fn listen(&self, event: EventKind, handler: EventHandler) -> ListenerId;

    /// Remove a subscription; unknown ids are ignored
    fn unlisten(&self, id: ListenerId);

    /// Every element below this one, in document order
    fn descendants(&self) -> Vec<Target>;

    /// `id` attribute shortcut
    fn id(&self) -> Option<String> {
        self.attribute("id")
    }
}

/// Find an element by `id` within (and including) `root`
pub fn find_by_id(root: &Target, id: &str) -> Option<Target> {
    if root.id().as_deref() == Some(id) {
        return Some(root.clone());
    }
    root.descendants()
        .into_iter()
        .find(|el| el.id().as_deref() == Some(id))
}

/// Whether the element carries an explicit skip marker (`true`/`TRUE`/`1`)
pub fn is_skipped(target: &dyn BindableTarget) -> bool {
    match target.attribute(ATTR_SKIPWIRE) {
        Some(v) => v.eq_ignore_ascii_case("true") || v == "1",
        None => false,
    }
}
