//! Status banner widget
//!
//! Installed as the channel's error sink. Identical messages are counted
//! instead of repeated; a `None` message clears the banner.

use crate::channel::Channel;
use crate::data::stringify;
use crate::target::Target;
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;

/// Renders one distinct message with its occurrence count
pub type StatusFormat = Arc<dyn Fn(&str, usize) -> String + Send + Sync>;

/// Alert box markup, with a bold `(count)` prefix when repeated
pub fn default_alert(message: &str, count: usize) -> String {
    let count = if count > 1 {
        format!("<b>({})</b> ", count)
    } else {
        String::new()
    };
    format!("<div class=\"alert alert-danger\">{}{}</div>", count, message)
}

pub struct StatusLogWidget {
    target: Target,
    /// Occurrences by message, in first-seen order
    counts: RwLock<IndexMap<String, usize>>,
    format: RwLock<StatusFormat>,
}

impl StatusLogWidget {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            counts: RwLock::new(IndexMap::new()),
            format: RwLock::new(Arc::new(default_alert)),
        }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn set_format(&self, format: StatusFormat) {
        *self.format.write() = format;
        self.render();
    }

    /// Count a message, or clear everything on `None`
    pub fn add(&self, message: Option<&str>) {
        {
            let mut counts = self.counts.write();
            match message {
                Some(message) => *counts.entry(message.to_string()).or_insert(0) += 1,
                None => counts.clear(),
            }
        }
        self.render();
    }

    /// Structured variant of [`add`](Self::add); `null` clears
    pub fn add_value(&self, message: &Value) {
        match message {
            Value::Null => self.add(None),
            other => self.add(Some(&stringify(other))),
        }
    }

    /// Distinct messages with their counts
    pub fn counts(&self) -> Vec<(String, usize)> {
        self.counts
            .read()
            .iter()
            .map(|(message, count)| (message.clone(), *count))
            .collect()
    }

    pub fn render(&self) {
        let format = self.format.read().clone();
        let markup = self
            .counts
            .read()
            .iter()
            .map(|(message, count)| format(message, *count))
            .collect::<Vec<_>>()
            .join("\n");
        self.target.set_markup(&markup);
    }

    /// Become the channel's error sink
    pub fn attach(self: &Arc<Self>, channel: &dyn Channel) {
        let weak = Arc::downgrade(self);
        channel.set_error_sink(Arc::new(move |message: Option<&str>| {
            if let Some(status) = weak.upgrade() {
                status.add(message);
            }
        }));
    }
}
