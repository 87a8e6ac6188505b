//! Role Policy.

use std::fmt;
use std::sync::Arc;

use reef_security::Role;

/// Immutable, ordered set of role names accepted by a guard.
///
/// Built once when the guard is defined and never mutated afterwards;
/// cloning shares the same backing slice. Duplicates are dropped, first
/// occurrence wins the position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSet(Arc<[Role]>);

impl RoleSet {
    #[must_use]
    pub fn new<I, R>(roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Role>,
    {
        let mut unique: Vec<Role> = Vec::new();
        for role in roles {
            let role = role.into();
            if !unique.contains(&role) {
                unique.push(role);
            }
        }
        Self(unique.into())
    }

    #[must_use]
    pub fn empty() -> Self {
        Self(Arc::from(Vec::new()))
    }

    /// `{"admin"}`
    #[must_use]
    pub fn admin() -> Self {
        Self::new([Role::ADMIN])
    }

    /// `{"admin", "researcher"}`, also the privileged set of the ownership guard.
    #[must_use]
    pub fn staff() -> Self {
        Self::new([Role::ADMIN, Role::RESEARCHER])
    }

    #[must_use]
    pub fn contains(&self, role: &Role) -> bool {
        self.0.contains(role)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.0.iter()
    }
}

impl Default for RoleSet {
    fn default() -> Self {
        Self::empty()
    }
}

/// Joins the roles with `" or "` in configured order.
impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, role) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" or ")?;
            }
            f.write_str(role.as_str())?;
        }
        Ok(())
    }
}

/// True iff `user_role` is a member of `allowed_roles`.
///
/// An empty set permits nobody. Unknown roles are plain non-members.
#[must_use]
pub fn permits(user_role: &Role, allowed_roles: &RoleSet) -> bool {
    allowed_roles.contains(user_role)
}

/// User-facing message recorded when a role check denies a request.
#[must_use]
pub fn denial_message(allowed_roles: &RoleSet) -> String {
    format!("Access denied. This feature requires {allowed_roles} role.")
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn permits_iff_member() {
        let set = RoleSet::staff();

        assert!(permits(&Role::ADMIN, &set));
        assert!(permits(&Role::RESEARCHER, &set));
        assert!(!permits(&Role::MEMBER, &set));
        assert!(!permits(&Role::new("diver"), &set));
    }

    #[test]
    fn empty_set_permits_nobody() {
        let set = RoleSet::empty();

        for role in [Role::ADMIN, Role::RESEARCHER, Role::MEMBER, Role::new("")] {
            assert!(!permits(&role, &set), "{role} must not be permitted");
        }
    }

    #[test]
    fn role_set_keeps_order_and_drops_duplicates() {
        let set = RoleSet::new(["researcher", "admin", "researcher"]);

        assert_eq!(set.len(), 2);
        let names: Vec<&str> = set.iter().map(Role::as_str).collect();
        assert_eq!(names, ["researcher", "admin"]);
    }

    #[test]
    fn clones_share_the_same_roles() {
        let set = RoleSet::admin();
        let copy = set.clone();

        assert_eq!(set, copy);
        assert!(Arc::ptr_eq(&set.0, &copy.0));
    }

    #[test]
    fn denial_message_joins_roles_with_or() {
        assert_eq!(
            denial_message(&RoleSet::staff()),
            "Access denied. This feature requires admin or researcher role."
        );
        assert_eq!(
            denial_message(&RoleSet::admin()),
            "Access denied. This feature requires admin role."
        );
    }
}
