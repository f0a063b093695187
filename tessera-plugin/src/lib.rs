//! Plugin descriptors for Tessera.
//!
//! - [`Descriptor`]: one validated plugin version (content, layout or native)
//! - [`MigrationStep`] / [`run_migrations`]: chained state upgrades
//! - [`VersionRange`]: the version range syntax persisted documents use
//!
//! Descriptors never look inside plugin state. They only route it through
//! the plugin's own encode, decode and migrate hooks.

mod descriptor;
mod error;
mod migration;
pub mod version;

pub use descriptor::{
    Capabilities, Category, Descriptor, DescriptorBuilder, InitialChildrenFn, InitialStateFn,
    MissingPlugin, OpaqueHook, StateFn,
};
pub use error::{DescriptorError, StateError};
pub use migration::{MigrateFn, MigrationReport, MigrationStep, migrate_traced, run_migrations};
pub use version::{VersionRange, parse_version, satisfies};

pub use semver::Version;
