//! Plugin descriptors.
//!
//! A [`Descriptor`] is the validated, immutable definition of one plugin
//! version. All three categories share the same struct; what differs is the
//! [`Capabilities`] variant, which carries only the fields that category
//! needs. Defaults are filled in by [`DescriptorBuilder`] at construction.

use crate::error::{DescriptorError, StateError};
use crate::migration::MigrationStep;
use crate::version::parse_version;
use semver::Version;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tessera_types::{SlotKind, WireNode};

/// Converts plugin state between its persisted and live forms.
pub type StateFn = Arc<dyn Fn(Value) -> Result<Value, StateError> + Send + Sync>;
/// Produces the state of a freshly inserted cell.
pub type InitialStateFn = Arc<dyn Fn() -> Value + Send + Sync>;
/// Produces the persisted rows a freshly inserted container starts with.
pub type InitialChildrenFn = Arc<dyn Fn() -> Vec<WireNode> + Send + Sync>;
/// A presentation-layer value (component, icon, callback) the core only
/// stores and hands back.
pub type OpaqueHook = Arc<dyn Any + Send + Sync>;

/// Which registry list a descriptor belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Content,
    Layout,
    /// The single descriptor used for drops from outside the editor.
    Native,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Layout => "layout",
            Self::Native => "native",
        }
    }
}

impl From<SlotKind> for Category {
    fn from(kind: SlotKind) -> Self {
        match kind {
            SlotKind::Content => Self::Content,
            SlotKind::Layout => Self::Layout,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category-specific capabilities.
#[derive(Clone)]
pub enum Capabilities {
    Content {
        /// May float left or right of its neighbours.
        is_inlineable: bool,
        /// Inlineable cells may be placed inside this one.
        allow_inline_neighbours: bool,
    },
    Layout {
        /// Content may be dropped next to this container.
        allow_neighbours: bool,
        initial_children: Option<InitialChildrenFn>,
    },
    Native {
        /// The slot the dropped cell is created with.
        creates: SlotKind,
        is_inlineable: bool,
        allow_inline_neighbours: bool,
        initial_children: Option<InitialChildrenFn>,
    },
}

/// A registered plugin definition.
#[derive(Clone)]
pub struct Descriptor {
    name: String,
    version: String,
    semver: Option<Version>,
    placeholder: bool,
    capabilities: Capabilities,
    text: Option<String>,
    description: Option<String>,
    hide_in_menu: bool,
    render: OpaqueHook,
    icon: Option<OpaqueHook>,
    hooks: BTreeMap<String, OpaqueHook>,
    encode: StateFn,
    decode: StateFn,
    initial_state: InitialStateFn,
    migrations: Vec<MigrationStep>,
}

impl Descriptor {
    pub fn content(name: impl Into<String>, version: impl Into<String>) -> DescriptorBuilder {
        DescriptorBuilder::new(Category::Content, name.into(), version.into())
    }

    pub fn layout(name: impl Into<String>, version: impl Into<String>) -> DescriptorBuilder {
        DescriptorBuilder::new(Category::Layout, name.into(), version.into())
    }

    pub fn native(name: impl Into<String>, version: impl Into<String>) -> DescriptorBuilder {
        DescriptorBuilder::new(Category::Native, name.into(), version.into())
    }

    /// Synthesizes the stand-in used when nothing with `name` is registered.
    ///
    /// The placeholder keeps the requested name and version verbatim (the
    /// version may be a range), passes state through untouched and renders
    /// `render`, or a [`MissingPlugin`] diagnostic when none is given.
    pub fn placeholder(
        kind: SlotKind,
        name: impl Into<String>,
        version: impl Into<String>,
        render: Option<OpaqueHook>,
    ) -> Self {
        let name = name.into();
        let version = version.into();
        let render = render.unwrap_or_else(|| {
            Arc::new(MissingPlugin {
                kind,
                name: name.clone(),
                version: version.clone(),
            })
        });
        let capabilities = match kind {
            SlotKind::Content => Capabilities::Content {
                is_inlineable: false,
                allow_inline_neighbours: false,
            },
            SlotKind::Layout => Capabilities::Layout {
                allow_neighbours: true,
                initial_children: None,
            },
        };
        Self {
            semver: parse_version(&version).ok(),
            name,
            version,
            placeholder: true,
            capabilities,
            text: None,
            description: None,
            hide_in_menu: true,
            render,
            icon: None,
            hooks: BTreeMap::new(),
            encode: identity(),
            decode: identity(),
            initial_state: empty_object(),
            migrations: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The version as written. Always a valid version for registered
    /// descriptors; a placeholder echoes whatever was requested.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn semver(&self) -> Option<&Version> {
        self.semver.as_ref()
    }

    pub fn category(&self) -> Category {
        match self.capabilities {
            Capabilities::Content { .. } => Category::Content,
            Capabilities::Layout { .. } => Category::Layout,
            Capabilities::Native { .. } => Category::Native,
        }
    }

    /// The cell slot this descriptor fills.
    pub fn slot_kind(&self) -> SlotKind {
        match self.capabilities {
            Capabilities::Content { .. } => SlotKind::Content,
            Capabilities::Layout { .. } => SlotKind::Layout,
            Capabilities::Native { creates, .. } => creates,
        }
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn hide_in_menu(&self) -> bool {
        self.hide_in_menu
    }

    pub fn render(&self) -> &OpaqueHook {
        &self.render
    }

    /// The render hook, if it has type `T`.
    pub fn render_as<T: Any>(&self) -> Option<&T> {
        self.render.downcast_ref::<T>()
    }

    pub fn icon(&self) -> Option<&OpaqueHook> {
        self.icon.as_ref()
    }

    /// A named interaction hook (`"focus"`, `"blur"`, `"remove-hotkey"`, ...).
    pub fn hook(&self, name: &str) -> Option<&OpaqueHook> {
        self.hooks.get(name)
    }

    pub fn is_inlineable(&self) -> bool {
        match self.capabilities {
            Capabilities::Content { is_inlineable, .. }
            | Capabilities::Native { is_inlineable, .. } => is_inlineable,
            Capabilities::Layout { .. } => false,
        }
    }

    pub fn allow_inline_neighbours(&self) -> bool {
        match self.capabilities {
            Capabilities::Content {
                allow_inline_neighbours,
                ..
            }
            | Capabilities::Native {
                allow_inline_neighbours,
                ..
            } => allow_inline_neighbours,
            Capabilities::Layout { .. } => false,
        }
    }

    pub fn allow_neighbours(&self) -> bool {
        match self.capabilities {
            Capabilities::Layout {
                allow_neighbours, ..
            } => allow_neighbours,
            _ => true,
        }
    }

    pub fn migrations(&self) -> &[MigrationStep] {
        &self.migrations
    }

    /// Live state to persisted state.
    pub fn encode(&self, state: Value) -> Result<Value, StateError> {
        (self.encode)(state)
    }

    /// Persisted state to live state.
    pub fn decode(&self, raw: Value) -> Result<Value, StateError> {
        (self.decode)(raw)
    }

    pub fn create_initial_state(&self) -> Value {
        (self.initial_state)()
    }

    /// Persisted rows a new container starts with. Always empty for content.
    pub fn create_initial_children(&self) -> Vec<WireNode> {
        match &self.capabilities {
            Capabilities::Layout {
                initial_children: Some(children),
                ..
            }
            | Capabilities::Native {
                initial_children: Some(children),
                ..
            } => children(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("category", &self.category())
            .field("placeholder", &self.placeholder)
            .field("migrations", &self.migrations)
            .finish_non_exhaustive()
    }
}

/// Render payload of a placeholder descriptor.
///
/// The presentation layer downcasts to this to show a diagnostic and offer
/// to delete the offending cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingPlugin {
    pub kind: SlotKind,
    pub name: String,
    pub version: String,
}

impl MissingPlugin {
    pub fn message(&self) -> String {
        format!(
            "The requested {} plugin '{}' ({}) could not be found.",
            self.kind, self.name, self.version
        )
    }
}

fn identity() -> StateFn {
    Arc::new(|raw: Value| -> Result<Value, StateError> { Ok(raw) })
}

fn empty_object() -> InitialStateFn {
    Arc::new(|| Value::Object(Default::default()))
}

/// Builds and validates a [`Descriptor`].
pub struct DescriptorBuilder {
    category: Category,
    name: String,
    version: String,
    text: Option<String>,
    description: Option<String>,
    hide_in_menu: bool,
    render: Option<OpaqueHook>,
    icon: Option<OpaqueHook>,
    hooks: BTreeMap<String, OpaqueHook>,
    encode: StateFn,
    decode: StateFn,
    initial_state: InitialStateFn,
    initial_children: Option<InitialChildrenFn>,
    is_inlineable: bool,
    allow_inline_neighbours: bool,
    allow_neighbours: bool,
    creates: SlotKind,
    migrations: Vec<MigrationStep>,
    /// First invalid step handed to [`Self::migrate`], reported by `build`.
    invalid_migration: Option<DescriptorError>,
}

impl DescriptorBuilder {
    fn new(category: Category, name: String, version: String) -> Self {
        Self {
            category,
            name,
            version,
            text: None,
            description: None,
            hide_in_menu: false,
            render: None,
            icon: None,
            hooks: BTreeMap::new(),
            encode: identity(),
            decode: identity(),
            initial_state: empty_object(),
            initial_children: None,
            is_inlineable: false,
            allow_inline_neighbours: false,
            allow_neighbours: true,
            creates: SlotKind::Content,
            migrations: Vec::new(),
            invalid_migration: None,
        }
    }

    /// Human-readable title shown in menus.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn hide_in_menu(mut self, hide: bool) -> Self {
        self.hide_in_menu = hide;
        self
    }

    /// The presentation component. Required.
    pub fn render<T: Any + Send + Sync>(mut self, render: T) -> Self {
        self.render = Some(Arc::new(render));
        self
    }

    pub fn render_hook(mut self, render: OpaqueHook) -> Self {
        self.render = Some(render);
        self
    }

    pub fn icon<T: Any + Send + Sync>(mut self, icon: T) -> Self {
        self.icon = Some(Arc::new(icon));
        self
    }

    pub fn hook<T: Any + Send + Sync>(mut self, name: impl Into<String>, hook: T) -> Self {
        self.hooks.insert(name.into(), Arc::new(hook));
        self
    }

    pub fn encode(
        mut self,
        encode: impl Fn(Value) -> Result<Value, StateError> + Send + Sync + 'static,
    ) -> Self {
        self.encode = Arc::new(encode);
        self
    }

    pub fn decode(
        mut self,
        decode: impl Fn(Value) -> Result<Value, StateError> + Send + Sync + 'static,
    ) -> Self {
        self.decode = Arc::new(decode);
        self
    }

    /// Routes state through `T` in both directions, so any persisted or live
    /// state that does not fit `T` is rejected.
    pub fn typed<T>(self) -> Self
    where
        T: Serialize + DeserializeOwned + 'static,
    {
        self.decode(|raw| Ok(serde_json::to_value(serde_json::from_value::<T>(raw)?)?))
            .encode(|state| Ok(serde_json::to_value(serde_json::from_value::<T>(state)?)?))
    }

    pub fn initial_state(mut self, initial: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        self.initial_state = Arc::new(initial);
        self
    }

    /// Rows a new container starts with. Ignored for content plugins.
    pub fn initial_children(
        mut self,
        children: impl Fn() -> Vec<WireNode> + Send + Sync + 'static,
    ) -> Self {
        self.initial_children = Some(Arc::new(children));
        self
    }

    pub fn inlineable(mut self, inlineable: bool) -> Self {
        self.is_inlineable = inlineable;
        self
    }

    pub fn allow_inline_neighbours(mut self, allow: bool) -> Self {
        self.allow_inline_neighbours = allow;
        self
    }

    pub fn allow_neighbours(mut self, allow: bool) -> Self {
        self.allow_neighbours = allow;
        self
    }

    /// For native descriptors: which slot the dropped cell gets.
    pub fn creates(mut self, kind: SlotKind) -> Self {
        self.creates = kind;
        self
    }

    pub fn migration(mut self, step: MigrationStep) -> Self {
        self.migrations.push(step);
        self
    }

    /// Adds a migration step in declaration order. An invalid range or
    /// target fails [`Self::build`].
    pub fn migrate(
        mut self,
        from_version_range: impl Into<String>,
        to_version: impl Into<String>,
        migrate: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        match MigrationStep::new(&from_version_range.into(), &to_version.into(), migrate) {
            Ok(step) => self.migrations.push(step),
            Err(err) => {
                self.invalid_migration.get_or_insert(err);
            }
        }
        self
    }

    pub fn build(self) -> Result<Descriptor, DescriptorError> {
        if self.name.trim().is_empty() {
            return Err(DescriptorError::MissingName);
        }
        let semver =
            parse_version(&self.version).map_err(|source| DescriptorError::InvalidVersion {
                name: self.name.clone(),
                version: self.version.clone(),
                source,
            })?;
        let Some(render) = self.render else {
            return Err(DescriptorError::MissingRender(self.name));
        };

        if let Some(err) = self.invalid_migration {
            return Err(err);
        }

        let capabilities = match self.category {
            Category::Content => Capabilities::Content {
                is_inlineable: self.is_inlineable,
                allow_inline_neighbours: self.allow_inline_neighbours,
            },
            Category::Layout => Capabilities::Layout {
                allow_neighbours: self.allow_neighbours,
                initial_children: self.initial_children,
            },
            Category::Native => Capabilities::Native {
                creates: self.creates,
                is_inlineable: self.is_inlineable,
                allow_inline_neighbours: self.allow_inline_neighbours,
                initial_children: self.initial_children,
            },
        };

        Ok(Descriptor {
            name: self.name,
            version: self.version,
            semver: Some(semver),
            placeholder: false,
            capabilities,
            text: self.text,
            description: self.description,
            hide_in_menu: self.hide_in_menu,
            render,
            icon: self.icon,
            hooks: self.hooks,
            encode: self.encode,
            decode: self.decode,
            initial_state: self.initial_state,
            migrations: self.migrations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_are_filled_in() {
        let d = Descriptor::layout("grid", "1.0.0").render(()).build().unwrap();
        assert_eq!(d.category(), Category::Layout);
        assert!(d.allow_neighbours());
        assert!(!d.is_inlineable());
        assert_eq!(d.create_initial_state(), json!({}));
        assert!(d.create_initial_children().is_empty());
        assert_eq!(d.decode(json!({"a": 1})).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn native_fills_the_slot_it_creates() {
        let d = Descriptor::native("drop", "0.1.0")
            .render(())
            .creates(SlotKind::Layout)
            .build()
            .unwrap();
        assert_eq!(d.category(), Category::Native);
        assert_eq!(d.slot_kind(), SlotKind::Layout);
    }

    #[test]
    fn placeholder_keeps_requested_identity() {
        let d = Descriptor::placeholder(SlotKind::Content, "x/y", "^9", None);
        assert!(d.is_placeholder());
        assert_eq!(d.version(), "^9");
        assert!(d.semver().is_none());
        let missing = d.render_as::<MissingPlugin>().unwrap();
        assert_eq!(missing.name, "x/y");
        assert!(missing.message().contains("content"));
    }
}
