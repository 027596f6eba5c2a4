//! Rolling log widget
//!
//! Records the configured signal categories in both directions:
//! - inbound messages, labeled `remote`
//! - outbound emissions seen through `pre_emit`, labeled `local`
//!
//! The buffer keeps the newest `limit_number` entries. Each rendered line is
//! `"<label>: <message>"`, cut to `limit_length` characters plus `" ..."`.

use crate::channel::Channel;
use crate::config::LogConfig;
use crate::data::stringify;
use crate::naming::WireSignal;
use crate::target::Target;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;

/// Label for messages received from the remote
pub const REMOTE_LABEL: &str = "remote";
/// Label for messages emitted locally
pub const LOCAL_LABEL: &str = "local";

const TRUNCATION_MARKER: &str = " ...";

/// One recorded message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    /// Left-padded source label
    pub source: String,
    pub message: String,
}

pub struct LogWidget {
    target: Target,
    entries: RwLock<VecDeque<LogLine>>,
    limit_number: usize,
    limit_length: usize,
    label_width: usize,
}

impl LogWidget {
    pub fn new(target: Target, config: &LogConfig) -> Self {
        Self {
            target,
            entries: RwLock::new(VecDeque::with_capacity(config.limit_number + 1)),
            limit_number: config.limit_number,
            limit_length: config.limit_length,
            label_width: config.label_width,
        }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Record a message and re-render
    pub fn add(&self, message: &Value, source: &str) {
        let line = LogLine {
            source: format!("{:>width$}", source, width = self.label_width),
            message: stringify(message),
        };
        {
            let mut entries = self.entries.write();
            entries.push_back(line);
            while entries.len() > self.limit_number {
                entries.pop_front();
            }
        }
        self.render();
    }

    /// Entries oldest first
    pub fn entries(&self) -> Vec<LogLine> {
        self.entries.read().iter().cloned().collect()
    }

    /// Rendered lines, truncated per entry
    pub fn lines(&self) -> Vec<String> {
        self.entries
            .read()
            .iter()
            .map(|entry| truncate(&format!("{}: {}", entry.source, entry.message), self.limit_length))
            .collect()
    }

    pub fn render(&self) {
        self.target.set_text(&self.lines().join("\n"));
    }

    /// Record `signals` inbound and outbound on `channel`
    pub fn attach(self: &Arc<Self>, channel: &dyn Channel, signals: &[String]) {
        for signal in signals {
            let weak = Arc::downgrade(self);
            channel.on(
                &WireSignal::Bare(signal.clone()),
                Arc::new(move |message: &Value| {
                    if let Some(log) = weak.upgrade() {
                        log.add(message, REMOTE_LABEL);
                    }
                }),
            );

            let weak = Arc::downgrade(self);
            channel.pre_emit(
                signal,
                Arc::new(move |message: Value| {
                    if let Some(log) = weak.upgrade() {
                        log.add(&message, LOCAL_LABEL);
                    }
                    message
                }),
            );
        }
    }
}

fn truncate(line: &str, limit: usize) -> String {
    if line.chars().count() <= limit {
        return line.to_string();
    }
    let mut cut: String = line.chars().take(limit).collect();
    cut.push_str(TRUNCATION_MARKER);
    cut
}
