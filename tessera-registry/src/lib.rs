//! Plugin registry and document tree codec for Tessera.
//!
//! The [`Registry`] decides which plugin descriptor owns a persisted node,
//! and the [`TreeCodec`] uses it to convert between persisted
//! ([`WireNode`](tessera_types::WireNode)) and live ([`LiveNode`]) trees:
//!
//! ```
//! use serde_json::json;
//! use tessera_plugin::Descriptor;
//! use tessera_registry::Registry;
//! use tessera_types::WireNode;
//!
//! let mut registry = Registry::new();
//! registry.register(Descriptor::content("text", "1.0.0").render(()).build().unwrap());
//!
//! let doc = WireNode::from_value(json!({
//!     "rows": [{ "cells": [{ "content": {
//!         "plugin": { "name": "text", "version": "1.0.0" },
//!         "state": { "text": "hello" }
//!     }}]}]
//! })).unwrap();
//!
//! let live = registry.decode_tree(&doc).unwrap();
//! assert!(live.id.is_some());
//! let saved = registry.encode_tree(&live).unwrap();
//! assert_eq!(saved.rows[0].cells[0].content.as_ref().unwrap().state, json!({ "text": "hello" }));
//! ```
//!
//! Resolution never fails: a node naming an unknown plugin decodes to a
//! placeholder descriptor, so the rest of the document stays editable.

mod codec;
mod config;
mod error;
mod live;
mod registry;

pub use codec::TreeCodec;
pub use config::{I18nConfig, I18nErrorPolicy, IdConfig, MigrationConfig, RegistryConfig};
pub use error::{CodecError, CodecResult, ConfigError};
pub use live::{LiveNode, LiveSlot};
pub use registry::{DEFAULT_CONTENT_PLUGIN, DefaultContent, Registry, Resolution, default_content};
