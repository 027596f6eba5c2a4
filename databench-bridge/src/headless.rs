//! In-memory element tree
//!
//! [`HeadlessElement`] implements [`BindableTarget`] without a rendering
//! substrate. It keeps an attribute bag, a child list and a listener table,
//! and counts content writes so callers can observe re-renders.

use crate::target::{BindableTarget, EventHandler, EventKind, ListenerId, Target};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct ElementState {
    attributes: BTreeMap<String, String>,
    content: String,
    value: String,
    src: String,
    classes: BTreeSet<String>,
    content_writes: usize,
    value_writes: usize,
}

/// Headless element node
pub struct HeadlessElement {
    /// Lower-case tag
    tag: String,
    state: RwLock<ElementState>,
    children: RwLock<Vec<Arc<HeadlessElement>>>,
    listeners: RwLock<Vec<(ListenerId, EventKind, EventHandler)>>,
    next_listener: AtomicU64,
    bound: AtomicBool,
}

impl HeadlessElement {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            state: RwLock::new(ElementState::default()),
            children: RwLock::new(Vec::new()),
            listeners: RwLock::new(Vec::new()),
            next_listener: AtomicU64::new(0),
            bound: AtomicBool::new(false),
        }
    }

    /// Set an attribute; `value` also seeds the control value, `src` the source
    pub fn with_attr(self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_text(self, text: &str) -> Self {
        self.state.write().content = text.to_string();
        self
    }

    pub fn with_child(self, child: Arc<HeadlessElement>) -> Self {
        self.children.write().push(child);
        self
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        let mut state = self.state.write();
        match name {
            "value" => state.value = value.to_string(),
            "src" => state.src = value.to_string(),
            "class" => {
                state.classes = value.split_whitespace().map(str::to_string).collect();
            }
            _ => {}
        }
        state.attributes.insert(name.to_string(), value.to_string());
    }

    /// Append a child after construction (e.g. dynamically added content)
    pub fn append(&self, child: Arc<HeadlessElement>) {
        self.children.write().push(child);
    }

    /// Fire a local event on this element
    pub fn dispatch(&self, event: EventKind) {
        // Handlers may (un)subscribe while running
        let handlers: Vec<EventHandler> = self
            .listeners
            .read()
            .iter()
            .filter(|(_, kind, _)| *kind == event)
            .map(|(_, _, handler)| handler.clone())
            .collect();
        for handler in handlers {
            handler();
        }
    }

    /// Number of listeners registered for `event`
    pub fn listener_count(&self, event: EventKind) -> usize {
        self.listeners
            .read()
            .iter()
            .filter(|(_, kind, _)| *kind == event)
            .count()
    }

    /// How many times text/markup content was written
    pub fn content_writes(&self) -> usize {
        self.state.read().content_writes
    }

    /// How many times the control value was written
    pub fn value_writes(&self) -> usize {
        self.state.read().value_writes
    }

    fn collect_descendants(&self, out: &mut Vec<Target>) {
        for child in self.children.read().iter() {
            out.push(child.clone() as Target);
            child.collect_descendants(out);
        }
    }
}

impl BindableTarget for HeadlessElement {
    fn tag(&self) -> String {
        self.tag.clone()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.state.read().attributes.get(name).cloned()
    }

    fn is_bound(&self) -> bool {
        self.bound.load(Ordering::Acquire)
    }

    fn mark_bound(&self) {
        self.bound.store(true, Ordering::Release);
    }

    fn text(&self) -> String {
        self.state.read().content.clone()
    }

    fn set_text(&self, text: &str) {
        let mut state = self.state.write();
        state.content = text.to_string();
        state.content_writes += 1;
    }

    fn set_markup(&self, markup: &str) {
        self.set_text(markup);
    }

    fn value(&self) -> String {
        self.state.read().value.clone()
    }

    fn set_value(&self, value: &str) {
        let mut state = self.state.write();
        state.value = value.to_string();
        state.value_writes += 1;
    }

    fn src(&self) -> String {
        self.state.read().src.clone()
    }

    fn set_src(&self, src: &str) {
        self.state.write().src = src.to_string();
    }

    fn has_class(&self, class: &str) -> bool {
        self.state.read().classes.contains(class)
    }

    fn set_class(&self, class: &str, on: bool) {
        let mut state = self.state.write();
        if on {
            state.classes.insert(class.to_string());
        } else {
            state.classes.remove(class);
        }
    }

    fn listen(&self, event: EventKind, handler: EventHandler) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((id, event, handler));
        id
    }

    fn unlisten(&self, id: ListenerId) {
        self.listeners.write().retain(|(lid, _, _)| *lid != id);
    }

    fn descendants(&self) -> Vec<Target> {
        let mut out = Vec::new();
        self.collect_descendants(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_value_attribute_seeds_control_value() {
        let el = HeadlessElement::new("INPUT").with_attr("value", "1000");
        assert_eq!(el.tag(), "input");
        assert_eq!(el.value(), "1000");
        assert_eq!(el.value_writes(), 0);
    }

    #[test]
    fn test_descendants_in_document_order() {
        let inner = HeadlessElement::new("span").with_attr("id", "b").into_shared();
        let outer = HeadlessElement::new("div")
            .with_attr("id", "a")
            .with_child(inner)
            .into_shared();
        let root = HeadlessElement::new("body").with_child(outer).into_shared();
        root.append(HeadlessElement::new("img").with_attr("id", "c").into_shared());

        let ids: Vec<_> = root.descendants().iter().filter_map(|el| el.id()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_dispatch_and_unlisten() {
        let el = HeadlessElement::new("button");
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let id = el.listen(
            EventKind::Click,
            Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        el.dispatch(EventKind::Click);
        el.dispatch(EventKind::Change);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        el.unlisten(id);
        el.dispatch(EventKind::Click);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(el.listener_count(EventKind::Click), 0);
    }

    #[test]
    fn test_class_toggle() {
        let el = HeadlessElement::new("button").with_attr("class", "btn primary");
        assert!(el.has_class("btn"));
        el.set_class("disabled", true);
        assert!(el.has_class("disabled"));
        el.set_class("disabled", false);
        assert!(!el.has_class("disabled"));
    }
}
