//! Conversion between the persisted and the live document tree.
//!
//! Decoding walks the persisted tree in preorder. Every content or layout
//! slot is resolved against the registry, migrated when a same-name plugin
//! at an equal or newer version is registered, and decoded by the owning
//! descriptor. Encoding is the mirror image and always writes the resolved
//! descriptor's identity, so a migrated slot is persisted under its new
//! version.

use crate::config::I18nErrorPolicy;
use crate::error::{CodecError, CodecResult};
use crate::live::{LiveNode, LiveSlot};
use crate::registry::{Registry, Resolution};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tessera_plugin::{Descriptor, migrate_traced, parse_version};
use tessera_types::{IdAssigner, Node, PluginRef, RawSlot, SlotKind, WireNode};
use tracing::{debug, warn};

/// How a persisted slot's state reaches its descriptor.
#[derive(Debug, Clone)]
enum Route {
    /// Decode as-is.
    Standard(Arc<Descriptor>),
    /// Run the descriptor's migrations from the declared version first.
    Migrate {
        descriptor: Arc<Descriptor>,
        declared: String,
    },
}

impl Route {
    /// Migration is attempted only when a same-name descriptor exists whose
    /// version is not older than the declared one. A declared value that is
    /// not a plain version cannot be ordered and counts as not newer.
    fn choose(resolution: Resolution, declared: &str) -> Self {
        let Some(mismatched) = resolution.mismatched else {
            return Self::Standard(resolution.matched);
        };
        let older = match (mismatched.semver(), parse_version(declared)) {
            (Some(registered), Ok(declared)) => *registered < declared,
            _ => false,
        };
        if older {
            Self::Standard(resolution.matched)
        } else {
            Self::Migrate {
                descriptor: mismatched,
                declared: declared.to_string(),
            }
        }
    }

    fn descriptor(&self) -> &Arc<Descriptor> {
        match self {
            Self::Standard(descriptor) | Self::Migrate { descriptor, .. } => descriptor,
        }
    }
}

/// Decodes and encodes document trees against a [`Registry`].
pub struct TreeCodec<'r> {
    registry: &'r Registry,
    ids: IdAssigner,
}

impl<'r> TreeCodec<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            ids: IdAssigner::new(registry.config().ids.strategy),
        }
    }

    // ================================================================
    // Decode
    // ================================================================

    /// Converts a persisted tree into a live one, minting ids for nodes
    /// that have none.
    pub fn decode_tree(&self, node: &WireNode) -> CodecResult<LiveNode> {
        let mut live = self.decode_node(node)?;
        self.ids.assign(&mut live);
        Ok(live)
    }

    fn decode_node(&self, node: &WireNode) -> CodecResult<LiveNode> {
        let mut live = LiveNode {
            id: node.id.clone(),
            size: node.size.clone(),
            inline: node.inline,
            is_draft: node.is_draft,
            is_draft_i18n: node.is_draft_i18n.clone(),
            ..Node::default()
        };

        let content = node.content.as_ref().filter(|s| !s.plugin.name.is_empty());
        let layout = node.layout.as_ref().filter(|s| !s.plugin.name.is_empty());
        match (content, layout) {
            (Some(content), layout) => {
                if let Some(layout) = layout {
                    warn!(
                        node = ?node.id,
                        content = %content.plugin.name,
                        layout = %layout.plugin.name,
                        "Cell has both content and layout, dropping layout"
                    );
                }
                live.content = Some(self.resolve_and_decode(SlotKind::Content, content)?);
            }
            (None, Some(layout)) => {
                live.layout = Some(self.resolve_and_decode(SlotKind::Layout, layout)?);
            }
            (None, None) => {}
        }

        if !node.rows.is_empty() {
            live.rows = self.decode_all(&node.rows)?;
        } else if !node.cells.is_empty() {
            live.cells = self.decode_all(&node.cells)?;
        }
        Ok(live)
    }

    fn decode_all(&self, nodes: &[WireNode]) -> CodecResult<Vec<LiveNode>> {
        nodes.iter().map(|n| self.decode_node(n)).collect()
    }

    /// Resolves a persisted slot's plugin and brings its state (and every
    /// per-language state) into live form.
    pub fn resolve_and_decode(&self, kind: SlotKind, slot: &RawSlot) -> CodecResult<LiveSlot> {
        let PluginRef { name, version } = &slot.plugin;
        let route = Route::choose(self.registry.resolve(kind, name, version), version);
        debug!(
            plugin = %name,
            declared = %version,
            resolved = %route.descriptor().version(),
            migrate = matches!(route, Route::Migrate { .. }),
            "Decoding slot"
        );

        let state = self.decode_state(&route, slot.state.clone())?;
        let state_i18n = slot
            .state_i18n
            .as_ref()
            .map(|states| self.per_language(states, |raw| self.decode_state(&route, raw)))
            .transpose()?;

        Ok(LiveSlot {
            descriptor: Arc::clone(route.descriptor()),
            state,
            state_i18n,
        })
    }

    /// The one path every state value takes on decode.
    fn decode_state(&self, route: &Route, raw: Value) -> CodecResult<Value> {
        let (descriptor, raw) = match route {
            Route::Standard(descriptor) => (descriptor, raw),
            Route::Migrate {
                descriptor,
                declared,
            } => {
                let report = migrate_traced(raw, Some(descriptor), declared);
                if self.registry.config().migrations.strict {
                    if let (Some(reached), Some(expected)) = (&report.reached, descriptor.semver()) {
                        if reached != expected {
                            return Err(CodecError::IncompleteMigration {
                                plugin: descriptor.name().to_string(),
                                reached: reached.to_string(),
                                expected: expected.to_string(),
                            });
                        }
                    }
                }
                (descriptor, report.state)
            }
        };
        descriptor.decode(raw).map_err(|source| CodecError::State {
            plugin: descriptor.name().to_string(),
            stage: "decode",
            source,
        })
    }

    /// Applies `transform` to each language's state, honouring the
    /// configured failure policy.
    fn per_language(
        &self,
        states: &BTreeMap<String, Value>,
        transform: impl Fn(Value) -> CodecResult<Value>,
    ) -> CodecResult<BTreeMap<String, Value>> {
        let mut out = BTreeMap::new();
        for (lang, raw) in states {
            match transform(raw.clone()) {
                Ok(state) => {
                    out.insert(lang.clone(), state);
                }
                Err(err) => match self.registry.config().i18n.on_error {
                    I18nErrorPolicy::Propagate => {
                        return Err(CodecError::Localized {
                            lang: lang.clone(),
                            source: Box::new(err),
                        });
                    }
                    I18nErrorPolicy::Skip => {
                        warn!(lang = %lang, error = %err, "Dropping localized state");
                    }
                },
            }
        }
        Ok(out)
    }

    // ================================================================
    // Encode
    // ================================================================

    /// Converts a live tree back into its persisted form.
    pub fn encode_tree(&self, node: &LiveNode) -> CodecResult<WireNode> {
        Ok(WireNode {
            id: node.id.clone(),
            size: node.size.clone(),
            inline: node.inline,
            is_draft: node.is_draft,
            is_draft_i18n: node.is_draft_i18n.clone(),
            content: node.content.as_ref().map(|s| self.encode_slot(s)).transpose()?,
            layout: node.layout.as_ref().map(|s| self.encode_slot(s)).transpose()?,
            rows: self.encode_all(&node.rows)?,
            cells: self.encode_all(&node.cells)?,
        })
    }

    fn encode_all(&self, nodes: &[LiveNode]) -> CodecResult<Vec<WireNode>> {
        nodes.iter().map(|n| self.encode_tree(n)).collect()
    }

    pub fn encode_slot(&self, slot: &LiveSlot) -> CodecResult<RawSlot> {
        let descriptor = &slot.descriptor;
        let encode = |state: Value| {
            descriptor.encode(state).map_err(|source| CodecError::State {
                plugin: descriptor.name().to_string(),
                stage: "encode",
                source,
            })
        };
        Ok(RawSlot {
            plugin: slot.plugin(),
            state: encode(slot.state.clone())?,
            state_i18n: slot
                .state_i18n
                .as_ref()
                .map(|states| self.per_language(states, encode))
                .transpose()?,
        })
    }

    // ================================================================
    // Instantiation
    // ================================================================

    /// Builds a fresh cell for `descriptor` with its initial state. Layout
    /// cells also get the descriptor's initial child rows.
    pub fn instantiate(&self, descriptor: &Arc<Descriptor>) -> CodecResult<LiveNode> {
        let slot = LiveSlot::new(Arc::clone(descriptor), descriptor.create_initial_state());
        let mut cell = LiveNode::cell();
        match descriptor.slot_kind() {
            SlotKind::Content => cell.content = Some(slot),
            SlotKind::Layout => {
                cell.layout = Some(slot);
                cell.rows = self.decode_all(&descriptor.create_initial_children())?;
            }
        }
        self.ids.assign(&mut cell);
        Ok(cell)
    }

    /// Builds a fresh cell for the first registered descriptor named `name`,
    /// or a placeholder cell when nothing by that name is registered.
    pub fn create_cell(&self, kind: SlotKind, name: &str) -> CodecResult<LiveNode> {
        let resolution = self.registry.resolve(kind, name, "*");
        self.instantiate(&resolution.matched)
    }

    /// Builds the cell for a native drop, if a native plugin is registered.
    pub fn create_native_cell(&self) -> CodecResult<Option<LiveNode>> {
        self.registry
            .native()
            .map(|native| self.instantiate(native))
            .transpose()
    }
}
