//! Breakdown (asset instance) naming.
//!
//! Instance numbers are allocated per (asset, target entity) and never
//! reused. Display names are derived at query time and never stored.

use crate::error::CoreError;
use crate::hierarchy::EntityType;

/// Width instance numbers are zero-padded to in names and paths.
pub const INSTANCE_NUMBER_PADDING: usize = 4;

/// Display name for an instance of `asset_name`.
///
/// A lone instance is shown as the bare asset name; once the asset is placed
/// more than once in the same target, every instance carries its number.
///
/// ```
/// use kinetrack_core::breakdown::instance_display_name;
///
/// assert_eq!(instance_display_name("Rabbit", 1, 1), "Rabbit");
/// assert_eq!(instance_display_name("Rabbit", 2, 2), "Rabbit_0002");
/// ```
pub fn instance_display_name(asset_name: &str, number: i32, active_count: usize) -> String {
    if active_count <= 1 {
        asset_name.to_string()
    } else {
        numbered_instance_name(asset_name, number)
    }
}

/// Name of an instance with its number always shown.
pub fn numbered_instance_name(asset_name: &str, number: i32) -> String {
    format!("{asset_name}_{number:0width$}", width = INSTANCE_NUMBER_PADDING)
}

/// Validate that assets may be placed into a target of `target_type`.
pub fn validate_target_type(target_type: EntityType) -> Result<(), CoreError> {
    if target_type.accepts_asset_instances() {
        Ok(())
    } else {
        Err(CoreError::InvalidHierarchy(format!(
            "Assets can only be placed into shots or scenes, not a {target_type}"
        )))
    }
}

/// Validate that the placed entity is an asset.
pub fn validate_asset_type(entity_type: EntityType) -> Result<(), CoreError> {
    if entity_type == EntityType::Asset {
        Ok(())
    } else {
        Err(CoreError::InvalidHierarchy(format!(
            "Only assets can be placed into a breakdown, not a {entity_type}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_instance_uses_bare_name() {
        assert_eq!(instance_display_name("Rabbit", 1, 1), "Rabbit");
        assert_eq!(instance_display_name("Rabbit", 3, 1), "Rabbit");
        assert_eq!(instance_display_name("Rabbit", 1, 0), "Rabbit");
    }

    #[test]
    fn multiple_instances_are_numbered() {
        assert_eq!(instance_display_name("Rabbit", 1, 2), "Rabbit_0001");
        assert_eq!(instance_display_name("Rabbit", 12, 3), "Rabbit_0012");
        assert_eq!(numbered_instance_name("Rabbit", 7), "Rabbit_0007");
    }

    #[test]
    fn naming_is_recomputable() {
        let first = instance_display_name("Fox", 2, 2);
        assert_eq!(first, instance_display_name("Fox", 2, 2));
    }

    #[test]
    fn targets_are_shots_or_scenes() {
        assert!(validate_target_type(EntityType::Shot).is_ok());
        assert!(validate_target_type(EntityType::Scene).is_ok());
        assert!(validate_target_type(EntityType::Sequence).is_err());
        assert!(validate_target_type(EntityType::Asset).is_err());
    }

    #[test]
    fn placed_entity_must_be_asset() {
        assert!(validate_asset_type(EntityType::Asset).is_ok());
        assert!(validate_asset_type(EntityType::AssetType).is_err());
    }
}
