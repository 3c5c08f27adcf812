//! Migration state of legacy records.
//!
//! A migrated legacy record is renamed to `<name>_thirdeye_migrated_<target id>`
//! and gets its `migrated_to` column set. Records tagged by older tooling only
//! carry the name suffix, so both are consulted.

use crate::types::{LegacyAlert, LegacyFunction};

/// Substring embedded in the name of every migrated legacy record.
pub const MIGRATED_TAG: &str = "_thirdeye_migrated";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationStatus {
    Active,
    Migrated(i64),
}

impl MigrationStatus {
    pub fn is_migrated(&self) -> bool {
        matches!(self, MigrationStatus::Migrated(_))
    }

    pub fn target_id(&self) -> Option<i64> {
        match self {
            MigrationStatus::Active => None,
            MigrationStatus::Migrated(id) => Some(*id),
        }
    }
}

/// The name carries the migration marker but no numeric target id after it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("name '{name}' carries the migration marker but no target id")]
pub struct InvalidMarker {
    pub name: String,
}

/// Legacy records that can be tagged as migrated.
pub trait Migratable {
    fn display_name(&self) -> &str;
    fn migrated_to(&self) -> Option<i64>;

    /// Resolves the state from `migrated_to`, falling back to the name marker.
    fn migration_status(&self) -> Result<MigrationStatus, InvalidMarker> {
        if let Some(id) = self.migrated_to() {
            return Ok(MigrationStatus::Migrated(id));
        }
        status_from_name(self.display_name())
    }
}

impl Migratable for LegacyFunction {
    fn display_name(&self) -> &str {
        &self.function_name
    }

    fn migrated_to(&self) -> Option<i64> {
        self.migrated_to
    }
}

impl Migratable for LegacyAlert {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn migrated_to(&self) -> Option<i64> {
        self.migrated_to
    }
}

/// Reads the migration state encoded in a record name.
///
/// # Examples
///
/// ```
/// use ruleport_common::status::{status_from_name, MigrationStatus};
///
/// assert_eq!(status_from_name("cpu_wow").unwrap(), MigrationStatus::Active);
/// assert_eq!(
///     status_from_name("cpu_wow_thirdeye_migrated_42").unwrap(),
///     MigrationStatus::Migrated(42)
/// );
/// ```
pub fn status_from_name(name: &str) -> Result<MigrationStatus, InvalidMarker> {
    if !name.contains(MIGRATED_TAG) {
        return Ok(MigrationStatus::Active);
    }
    name.rsplit('_')
        .next()
        .and_then(|suffix| suffix.parse::<i64>().ok())
        .map(MigrationStatus::Migrated)
        .ok_or_else(|| InvalidMarker {
            name: name.to_string(),
        })
}

/// Builds the name a legacy record gets once it has been migrated.
pub fn tagged_name(name: &str, target_id: i64) -> String {
    format!("{name}{MIGRATED_TAG}_{target_id}")
}

/// Strips the marker suffix, returning the name the record had before
/// migration.
pub fn original_name(name: &str) -> &str {
    match name.rfind(MIGRATED_TAG) {
        Some(idx) => &name[..idx],
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_name_round_trips() {
        let name = tagged_name("revenue_wow", 1234);
        assert_eq!(name, "revenue_wow_thirdeye_migrated_1234");
        assert_eq!(status_from_name(&name).unwrap(), MigrationStatus::Migrated(1234));
        assert_eq!(original_name(&name), "revenue_wow");
    }

    #[test]
    fn original_name_keeps_unmarked_names() {
        assert_eq!(original_name("page_views"), "page_views");
    }

    #[test]
    fn marker_without_id_is_rejected() {
        let err = status_from_name("x_thirdeye_migrated_").unwrap_err();
        assert!(err.to_string().contains("x_thirdeye_migrated_"));
    }
}
