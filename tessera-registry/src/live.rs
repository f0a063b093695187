//! The in-memory form of the document tree.

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tessera_plugin::Descriptor;
use tessera_types::{Node, PluginRef};

/// A plugin slot bound to the descriptor that owns its state.
#[derive(Debug, Clone)]
pub struct LiveSlot {
    pub descriptor: Arc<Descriptor>,
    pub state: Value,
    pub state_i18n: Option<BTreeMap<String, Value>>,
}

/// A decoded document tree.
pub type LiveNode = Node<LiveSlot>;

impl LiveSlot {
    pub fn new(descriptor: Arc<Descriptor>, state: Value) -> Self {
        Self {
            descriptor,
            state,
            state_i18n: None,
        }
    }

    /// The identity this slot will be persisted under.
    pub fn plugin(&self) -> PluginRef {
        PluginRef::new(self.descriptor.name(), self.descriptor.version())
    }

    /// State for `lang`, falling back to the primary state when that
    /// language has no entry of its own.
    pub fn state_for(&self, lang: Option<&str>) -> &Value {
        lang.and_then(|lang| self.state_i18n.as_ref()?.get(lang))
            .unwrap_or(&self.state)
    }
}

impl PartialEq for LiveSlot {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.descriptor, &other.descriptor)
            && self.state == other.state
            && self.state_i18n == other.state_i18n
    }
}
