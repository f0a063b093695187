//! The plugin registry and version resolution.
//!
//! Content and layout descriptors live in ordered lists. Order is part of
//! the contract: resolution returns the first descriptor that fits, so an
//! earlier registration shadows a later one with the same name and a
//! compatible version.

use crate::codec::TreeCodec;
use crate::config::RegistryConfig;
use crate::error::CodecResult;
use crate::live::LiveNode;
use std::sync::{Arc, LazyLock};
use tessera_plugin::{Category, Descriptor, OpaqueHook, VersionRange};
use tessera_types::{SlotKind, WireNode};
use tracing::{debug, info, warn};

/// Name of the built-in content plugin every registry starts with.
pub const DEFAULT_CONTENT_PLUGIN: &str = "tessera/core/default";

/// Render payload of the built-in default content plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultContent;

static DEFAULT_CONTENT: LazyLock<Arc<Descriptor>> = LazyLock::new(|| {
    Arc::new(
        Descriptor::content(DEFAULT_CONTENT_PLUGIN, "0.0.1")
            .render(DefaultContent)
            .text("Empty cell")
            .hide_in_menu(true)
            .build()
            .expect("built-in default content descriptor is valid"),
    )
});

/// The built-in content descriptor.
pub fn default_content() -> Arc<Descriptor> {
    Arc::clone(&DEFAULT_CONTENT)
}

/// Outcome of [`Registry::resolve`].
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The first descriptor whose name and version fit, or a placeholder.
    pub matched: Arc<Descriptor>,
    /// When nothing fit the range: the first descriptor with the same name
    /// at any version.
    pub mismatched: Option<Arc<Descriptor>>,
}

/// Holds every known plugin descriptor.
///
/// Mutation takes `&mut self`; share a registry across threads behind the
/// embedding application's own lock.
pub struct Registry {
    content: Vec<Arc<Descriptor>>,
    layout: Vec<Arc<Descriptor>>,
    native: Option<Arc<Descriptor>>,
    missing_render: Option<OpaqueHook>,
    config: RegistryConfig,
}

impl Registry {
    /// An empty registry holding only the default content plugin.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            content: vec![default_content()],
            layout: Vec::new(),
            native: None,
            missing_render: None,
            config,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: RegistryConfig) {
        self.config = config;
    }

    // ================================================================
    // Registration
    // ================================================================

    /// Appends a descriptor to its category's list. A native descriptor
    /// replaces the current one.
    pub fn register(&mut self, descriptor: Descriptor) -> Arc<Descriptor> {
        let descriptor = Arc::new(descriptor);
        self.register_shared(Arc::clone(&descriptor));
        descriptor
    }

    pub fn register_shared(&mut self, descriptor: Arc<Descriptor>) {
        info!(
            plugin = %descriptor.name(),
            version = %descriptor.version(),
            category = %descriptor.category(),
            "Plugin registered"
        );
        match descriptor.category() {
            Category::Content => self.content.push(descriptor),
            Category::Layout => self.layout.push(descriptor),
            Category::Native => self.install_native(descriptor),
        }
    }

    fn install_native(&mut self, descriptor: Arc<Descriptor>) {
        if let Some(previous) = self.native.replace(descriptor) {
            debug!(plugin = %previous.name(), "Native plugin replaced");
        }
    }

    /// Removes every descriptor named `name` from one list.
    /// Returns how many were removed.
    pub fn unregister(&mut self, kind: SlotKind, name: &str) -> usize {
        let list = self.list_mut(kind);
        let before = list.len();
        list.retain(|d| d.name() != name);
        let removed = before - list.len();
        if removed > 0 {
            info!(plugin = %name, category = %kind, removed, "Plugin unregistered");
        }
        removed
    }

    /// Clears a list and registers `descriptors` in order. The content list
    /// always gets the default content plugin back first. Descriptors of
    /// another category are skipped. Returns how many were registered.
    pub fn replace_all(
        &mut self,
        kind: SlotKind,
        descriptors: impl IntoIterator<Item = Descriptor>,
    ) -> usize {
        let list = self.list_mut(kind);
        list.clear();
        if kind == SlotKind::Content {
            list.push(default_content());
        }
        let mut registered = 0;
        for descriptor in descriptors {
            if descriptor.category() != Category::from(kind) {
                warn!(
                    plugin = %descriptor.name(),
                    category = %descriptor.category(),
                    expected = %kind,
                    "Skipping descriptor of another category"
                );
                continue;
            }
            self.register(descriptor);
            registered += 1;
        }
        registered
    }

    /// Installs `descriptor` as the native plugin, whatever its category.
    pub fn set_native(&mut self, descriptor: Descriptor) -> Arc<Descriptor> {
        let descriptor = Arc::new(descriptor);
        info!(plugin = %descriptor.name(), "Native plugin set");
        self.install_native(Arc::clone(&descriptor));
        descriptor
    }

    pub fn clear_native(&mut self) -> Option<Arc<Descriptor>> {
        self.native.take()
    }

    /// Overrides what placeholders render for unresolvable plugins.
    pub fn set_missing_render(&mut self, render: OpaqueHook) {
        self.missing_render = Some(render);
    }

    // ================================================================
    // Lookup
    // ================================================================

    pub fn descriptors(&self, kind: SlotKind) -> &[Arc<Descriptor>] {
        match kind {
            SlotKind::Content => &self.content,
            SlotKind::Layout => &self.layout,
        }
    }

    /// Content descriptors for menu builders. Callers filter `hide_in_menu`.
    pub fn content(&self) -> &[Arc<Descriptor>] {
        &self.content
    }

    pub fn layout(&self) -> &[Arc<Descriptor>] {
        &self.layout
    }

    fn list_mut(&mut self, kind: SlotKind) -> &mut Vec<Arc<Descriptor>> {
        match kind {
            SlotKind::Content => &mut self.content,
            SlotKind::Layout => &mut self.layout,
        }
    }

    pub fn native(&self) -> Option<&Arc<Descriptor>> {
        self.native.as_ref()
    }

    pub fn has_native(&self) -> bool {
        self.native.is_some()
    }

    /// Every registered name, content first, in registration order.
    pub fn list_names(&self) -> Vec<&str> {
        self.content
            .iter()
            .chain(&self.layout)
            .map(|d| d.name())
            .collect()
    }

    /// Finds the descriptor for `name` at a version satisfying `range`.
    ///
    /// Never fails. When nothing satisfies the range, `matched` is a
    /// placeholder carrying the requested name and range, and `mismatched`
    /// holds the first same-name descriptor at another version, if any.
    pub fn resolve(&self, kind: SlotKind, name: &str, range: &str) -> Resolution {
        let list = self.descriptors(kind);
        let matched = VersionRange::parse(range).ok().and_then(|req| {
            list.iter()
                .find(|d| d.name() == name && d.semver().is_some_and(|v| req.matches(v)))
        });
        if let Some(matched) = matched {
            return Resolution {
                matched: Arc::clone(matched),
                mismatched: None,
            };
        }

        let mismatched = list.iter().find(|d| d.name() == name).cloned();
        match &mismatched {
            Some(other) => debug!(
                plugin = %name,
                requested = %range,
                registered = %other.version(),
                "No registered version satisfies the request"
            ),
            None => warn!(
                plugin = %name,
                version = %range,
                category = %kind,
                "Plugin not registered, using placeholder"
            ),
        }
        Resolution {
            matched: Arc::new(Descriptor::placeholder(
                kind,
                name,
                range,
                self.missing_render.clone(),
            )),
            mismatched,
        }
    }

    // ================================================================
    // Tree codec
    // ================================================================

    pub fn codec(&self) -> TreeCodec<'_> {
        TreeCodec::new(self)
    }

    pub fn decode_tree(&self, node: &WireNode) -> CodecResult<LiveNode> {
        self.codec().decode_tree(node)
    }

    pub fn encode_tree(&self, node: &LiveNode) -> CodecResult<WireNode> {
        self.codec().encode_tree(node)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
