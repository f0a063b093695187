//! The recursive row/cell tree.
//!
//! Persisted and live documents share one shape. [`Node<S>`] is generic over
//! the slot payload: [`RawSlot`] for the persisted form, a descriptor-bound
//! slot for the live form (see `tessera-registry`).

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Which slot of a cell a plugin fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    /// Leaf content (text, images, video, ...).
    Content,
    /// A container whose children live in the cell's `rows`.
    Layout,
}

impl SlotKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Layout => "layout",
        }
    }
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Floating placement of an inline cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Inline {
    Left,
    Right,
}

/// Plugin identity as written in a persisted slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginRef {
    #[serde(default)]
    pub name: String,
    /// A version or a version range. Missing means "any".
    #[serde(default = "any_version")]
    pub version: String,
}

fn any_version() -> String {
    "*".to_string()
}

impl PluginRef {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl Default for PluginRef {
    fn default() -> Self {
        Self {
            name: String::new(),
            version: any_version(),
        }
    }
}

/// A content or layout slot in persisted form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSlot {
    #[serde(default)]
    pub plugin: PluginRef,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub state: Value,
    /// Per-language state, keyed by language tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_i18n: Option<BTreeMap<String, Value>>,
}

impl RawSlot {
    pub fn new(plugin: PluginRef, state: Value) -> Self {
        Self {
            plugin,
            state,
            state_i18n: None,
        }
    }

    pub fn with_i18n(mut self, lang: impl Into<String>, state: Value) -> Self {
        self.state_i18n
            .get_or_insert_with(BTreeMap::new)
            .insert(lang.into(), state);
        self
    }
}

/// One node of the document tree.
///
/// A row carries `cells`; a cell carries either a `content` slot (leaf) or a
/// `layout` slot with nested `rows` (container). Empty `rows`/`cells` are
/// omitted from the persisted form, so their absence marks a leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node<S> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Kept as the exact JSON number so `6` never comes back as `6.0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline: Option<Inline>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_draft: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_draft_i18n: Option<BTreeMap<String, bool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<S>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<S>,
    #[serde(
        default,
        deserialize_with = "nullable_vec",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub rows: Vec<Node<S>>,
    #[serde(
        default,
        deserialize_with = "nullable_vec",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub cells: Vec<Node<S>>,
}

/// The persisted form of the document tree.
pub type WireNode = Node<RawSlot>;

fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl<S> Default for Node<S> {
    fn default() -> Self {
        Self {
            id: None,
            size: None,
            inline: None,
            is_draft: None,
            is_draft_i18n: None,
            content: None,
            layout: None,
            rows: Vec::new(),
            cells: Vec::new(),
        }
    }
}

impl<S> Node<S> {
    /// An empty cell.
    pub fn cell() -> Self {
        Self::default()
    }

    /// A row holding the given cells.
    pub fn row(cells: Vec<Node<S>>) -> Self {
        Self {
            cells,
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_size(mut self, size: impl Into<Number>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_inline(mut self, inline: Inline) -> Self {
        self.inline = Some(inline);
        self
    }

    pub fn with_content(mut self, slot: S) -> Self {
        self.content = Some(slot);
        self
    }

    pub fn with_layout(mut self, slot: S, rows: Vec<Node<S>>) -> Self {
        self.layout = Some(slot);
        self.rows = rows;
        self
    }

    /// The node's id, treating an empty string as absent.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// True when the node has neither rows nor cells.
    pub fn is_leaf(&self) -> bool {
        self.rows.is_empty() && self.cells.is_empty()
    }

    /// The children a tree walk visits: `rows` when present, otherwise `cells`.
    pub fn children(&self) -> &[Node<S>] {
        if self.rows.is_empty() {
            &self.cells
        } else {
            &self.rows
        }
    }

    pub fn children_mut(&mut self) -> &mut Vec<Node<S>> {
        if self.rows.is_empty() {
            &mut self.cells
        } else {
            &mut self.rows
        }
    }

    /// Visits this node and every descendant in preorder.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Node<S>)) {
        f(self);
        for child in self.children() {
            child.walk(f);
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_| count += 1);
        count
    }

    /// Ids of this subtree in preorder. Nodes without an id are skipped.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        self.walk(&mut |n| {
            if let Some(id) = n.id() {
                ids.push(id);
            }
        });
        ids
    }
}

impl WireNode {
    /// Parses a persisted document from JSON text.
    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_value(value: Value) -> crate::Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_value(&self) -> crate::Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}
