//! State migrations between plugin versions.

use crate::descriptor::Descriptor;
use crate::error::DescriptorError;
use crate::version::{VersionRange, parse_version};
use semver::Version;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Transforms a persisted state value into the shape of a newer version.
pub type MigrateFn = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// One state-transition rule: state written by any version in
/// `from_version_range` becomes state for `to_version`.
#[derive(Clone)]
pub struct MigrationStep {
    from_version_range: VersionRange,
    to_version: Version,
    migrate: MigrateFn,
}

impl MigrationStep {
    pub fn new(
        from_version_range: &str,
        to_version: &str,
        migrate: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> Result<Self, DescriptorError> {
        let from_version_range = VersionRange::parse(from_version_range).map_err(|source| {
            DescriptorError::InvalidMigrationRange {
                range: from_version_range.to_string(),
                source,
            }
        })?;
        let to_version = parse_version(to_version).map_err(|source| {
            DescriptorError::InvalidMigrationTarget {
                version: to_version.to_string(),
                source,
            }
        })?;
        Ok(Self {
            from_version_range,
            to_version,
            migrate: Arc::new(migrate),
        })
    }

    pub fn from_version_range(&self) -> &VersionRange {
        &self.from_version_range
    }

    pub fn to_version(&self) -> &Version {
        &self.to_version
    }

    pub fn applies_to(&self, version: &Version) -> bool {
        self.from_version_range.matches(version)
    }

    pub fn apply(&self, raw: Value) -> Value {
        (self.migrate)(raw)
    }
}

impl fmt::Debug for MigrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationStep")
            .field("from_version_range", &self.from_version_range.as_str())
            .field("to_version", &self.to_version.to_string())
            .finish_non_exhaustive()
    }
}

/// What a migration run did.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationReport {
    pub state: Value,
    /// The version the state was last moved to. `None` when no run was
    /// attempted (no descriptor, or the declared version did not parse).
    pub reached: Option<Version>,
    /// Number of steps applied.
    pub applied: usize,
}

/// Brings `raw` from `declared_version` forward using `descriptor`'s steps.
///
/// See [`migrate_traced`] for the algorithm.
pub fn run_migrations(raw: Value, descriptor: Option<&Descriptor>, declared_version: &str) -> Value {
    migrate_traced(raw, descriptor, declared_version).state
}

/// Applies migration steps until none matches the current version.
///
/// Each round picks the first remaining step whose source range accepts the
/// current version, removes it from the pool, applies it and moves the
/// current version to the step's target. The pool shrinks every round, so
/// the loop runs at most once per step. Stopping does not imply the state
/// reached `descriptor.version()`; callers that care compare
/// [`MigrationReport::reached`].
pub fn migrate_traced(
    raw: Value,
    descriptor: Option<&Descriptor>,
    declared_version: &str,
) -> MigrationReport {
    let (Some(descriptor), Ok(mut current)) = (descriptor, parse_version(declared_version)) else {
        return MigrationReport {
            state: raw,
            reached: None,
            applied: 0,
        };
    };

    let mut pool: Vec<&MigrationStep> = descriptor.migrations().iter().collect();
    let mut state = raw;
    let mut applied = 0;

    loop {
        let Some(index) = pool.iter().position(|step| step.applies_to(&current)) else {
            break;
        };
        let step = pool.remove(index);
        debug!(
            plugin = %descriptor.name(),
            from = %current,
            to = %step.to_version(),
            "applying migration step"
        );
        state = step.apply(state);
        current = step.to_version().clone();
        applied += 1;
    }

    MigrationReport {
        state,
        reached: Some(current),
        applied,
    }
}
