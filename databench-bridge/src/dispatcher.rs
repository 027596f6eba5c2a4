//! Wiring orchestrator
//!
//! Scans a subtree and connects every qualifying element to a channel.
//! Elements are claimed with `mark_bound` before their binding is built, so
//! wiring the same subtree again only picks up elements added since.
//!
//! Order of one pass:
//! 1. status banner (`#databench-alerts` by default) becomes the error sink
//! 2. rolling log (`#log` by default)
//! 3. bindings, kind by kind in [`ElementKind::ALL`] order

use crate::binding::{Binding, ElementKind};
use crate::channel::Channel;
use crate::config::BridgeConfig;
use crate::error::{BridgeError, BridgeResult};
use crate::naming::{BindingNames, NameOrdinal};
use crate::target::{find_by_id, is_skipped, BindableTarget, Target};
use crate::widgets::{
    ImageBinding, LogWidget, RangeBinding, StatusLogWidget, TextDisplayBinding, TextInputBinding,
    TriggerBinding,
};
use parking_lot::RwLock;
use std::any::Any;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Binds a document's elements to channels
pub struct Wiring {
    /// Whole document; default scan root and label lookup scope
    document: Target,
    config: BridgeConfig,
    /// Fallback name counter shared by all kinds
    ordinal: NameOrdinal,
    bindings: RwLock<Vec<Arc<dyn Binding>>>,
    logs: RwLock<Vec<Arc<LogWidget>>>,
    status_logs: RwLock<Vec<Arc<StatusLogWidget>>>,
}

impl Wiring {
    /// Create a wiring context with default config
    pub fn new(document: Target) -> Self {
        Self::with_config(document, BridgeConfig::default())
    }

    pub fn with_config(document: Target, config: BridgeConfig) -> Self {
        Self {
            document,
            config,
            ordinal: NameOrdinal::new(),
            bindings: RwLock::new(Vec::new()),
            logs: RwLock::new(Vec::new()),
            status_logs: RwLock::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn ordinal(&self) -> &NameOrdinal {
        &self.ordinal
    }

    /// Wire the whole document
    pub fn wire_all(&self, channel: Arc<dyn Channel>) -> Arc<dyn Channel> {
        self.wire(channel, None)
    }

    /// Wire every unbound, non-skipped element in `root` (default: document)
    ///
    /// Returns the channel for chaining.
    pub fn wire(&self, channel: Arc<dyn Channel>, root: Option<&Target>) -> Arc<dyn Channel> {
        let root = root.cloned().unwrap_or_else(|| self.document.clone());
        let status = self.wire_status_log(&root, channel.as_ref());
        let log = self.wire_log(&root, channel.as_ref());

        let mut elements = vec![root.clone()];
        elements.extend(root.descendants());

        let mut created = 0;
        for kind in ElementKind::ALL {
            for element in &elements {
                if !kind.matches(element.as_ref()) || !claim(element.as_ref()) {
                    continue;
                }
                let names = BindingNames::resolve(element.as_ref(), &self.ordinal);
                debug!(
                    "Binding {} '{}' to {}",
                    kind, names.action_name, names.wire_signal
                );
                let binding = self.create_binding(kind, element.clone(), names);
                binding.clone().attach(channel.clone());
                self.bindings.write().push(binding);
                created += 1;
            }
        }

        info!(
            "Wired {} bindings (status banner: {}, log: {}), {} total",
            created,
            status,
            log,
            self.bindings.read().len()
        );
        channel
    }

    fn create_binding(&self, kind: ElementKind, target: Target, names: BindingNames) -> Arc<dyn Binding> {
        match kind {
            ElementKind::Trigger => Arc::new(TriggerBinding::new(
                target,
                names,
                &self.config.trigger.disabled_class,
            )),
            ElementKind::TextInput => Arc::new(TextInputBinding::new(target, names)),
            ElementKind::TextDisplay => Arc::new(TextDisplayBinding::new(target, names)),
            ElementKind::RangeInput => {
                let label = target.id().and_then(|id| self.find_label(&id));
                Arc::new(RangeBinding::new(target, names, label))
            }
            ElementKind::Image => Arc::new(ImageBinding::new(target, names)),
        }
    }

    /// `<label for=id>` anywhere in the document
    fn find_label(&self, id: &str) -> Option<Target> {
        let mut candidates = vec![self.document.clone()];
        candidates.extend(self.document.descendants());
        candidates
            .into_iter()
            .find(|el| el.tag() == "label" && el.attribute("for").as_deref() == Some(id))
    }

    fn wire_status_log(&self, root: &Target, channel: &dyn Channel) -> bool {
        let Some(element) = find_unclaimed(root, &self.config.status.element_id) else {
            return false;
        };
        let status = Arc::new(StatusLogWidget::new(element));
        status.attach(channel);
        self.status_logs.write().push(status);
        true
    }

    fn wire_log(&self, root: &Target, channel: &dyn Channel) -> bool {
        let Some(element) = find_unclaimed(root, &self.config.log.element_id) else {
            return false;
        };
        let log = Arc::new(LogWidget::new(element, &self.config.log));
        log.attach(channel, &self.config.log.signals);
        self.logs.write().push(log);
        true
    }

    /// Every binding created so far, in creation order
    pub fn bindings(&self) -> Vec<Arc<dyn Binding>> {
        self.bindings.read().clone()
    }

    /// First binding with this action name
    pub fn binding(&self, action_name: &str) -> Option<Arc<dyn Binding>> {
        self.bindings
            .read()
            .iter()
            .find(|b| b.action_name() == action_name)
            .cloned()
    }

    /// Typed lookup by action name, e.g. to install customization hooks
    pub fn find<T: Binding + Any>(&self, action_name: &str) -> Option<Arc<T>> {
        self.binding(action_name)?.into_any().downcast::<T>().ok()
    }

    /// Most recently wired rolling log
    pub fn log(&self) -> Option<Arc<LogWidget>> {
        self.logs.read().last().cloned()
    }

    /// Most recently wired status banner
    pub fn status_log(&self) -> Option<Arc<StatusLogWidget>> {
        self.status_logs.read().last().cloned()
    }
}

/// Claim an element unless it is already bound or marked to be skipped
fn claim(element: &dyn BindableTarget) -> bool {
    if element.is_bound() {
        return false;
    }
    if is_skipped(element) {
        debug!("Skipping <{}> marked data-skipwire", element.tag());
        return false;
    }
    element.mark_bound();
    true
}

fn find_unclaimed(root: &Target, id: &str) -> Option<Target> {
    let element = find_by_id(root, id)?;
    claim(element.as_ref()).then_some(element)
}

/// Builder for creating wiring contexts with custom configuration
pub struct WiringBuilder {
    document: Option<Target>,
    config: BridgeConfig,
    ordinal: Option<NameOrdinal>,
}

impl WiringBuilder {
    pub fn new() -> Self {
        Self {
            document: None,
            config: BridgeConfig::default(),
            ordinal: None,
        }
    }

    pub fn document(mut self, document: Target) -> Self {
        self.document = Some(document);
        self
    }

    pub fn config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    /// Config the built context will use
    pub fn current_config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Load config from a YAML, TOML or JSON file
    pub fn config_file(mut self, path: impl AsRef<Path>) -> BridgeResult<Self> {
        self.config = BridgeConfig::from_path(path)?;
        Ok(self)
    }

    /// Share a fallback name counter with another context
    pub fn ordinal(mut self, ordinal: NameOrdinal) -> Self {
        self.ordinal = Some(ordinal);
        self
    }

    pub fn build(self) -> BridgeResult<Wiring> {
        let document = self
            .document
            .ok_or(BridgeError::MissingDocument)?;

        let mut wiring = Wiring::with_config(document, self.config);
        if let Some(ordinal) = self.ordinal {
            wiring.ordinal = ordinal;
        }
        Ok(wiring)
    }
}

impl Default for WiringBuilder {
    fn default() -> Self {
        Self::new()
    }
}
