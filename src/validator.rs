//! Validation of token permission sets against the route catalog.

use crate::error::RouteError;
use crate::types::{PermissionSet, RouteCatalog};

/// Check that every group and every action in `permissions` exists in `catalog`.
///
/// Groups are checked in sorted order and actions in the order given, so the
/// first offending entry reported is stable.
pub fn validate(catalog: &RouteCatalog, permissions: &PermissionSet) -> Result<(), RouteError> {
    for (group, actions) in permissions.iter() {
        let routes = catalog
            .get(group)
            .ok_or_else(|| RouteError::InvalidPermissionGroup {
                group: group.to_string(),
            })?;

        if let Some(action) = actions.iter().find(|a| !routes.contains_action(a)) {
            return Err(RouteError::InvalidPermissionAction {
                group: group.to_string(),
                action: action.clone(),
            });
        }
    }

    Ok(())
}
