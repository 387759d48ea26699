use std::collections::HashSet;

use keyward_common::RoleId;

/// Check whether an actor holding `actor_roles` may run an admin command.
///
/// No configured admin role means no one is admin. Otherwise the actor must
/// hold exactly that role; role hierarchy is not consulted.
pub fn is_authorized(actor_roles: &HashSet<RoleId>, required: Option<&RoleId>) -> bool {
    required.is_some_and(|role| actor_roles.contains(role))
}
