//! Configured role guard for resource views.

use std::future::Future;

use reef_security::{Principal, Role};

use crate::access::Access;
use crate::error::AccessError;
use crate::guard::{Guard, LoginRequired};
use crate::policy::{RoleSet, denial_message, permits};

/// Role guard attached to a view.
///
/// Evaluation order: login first, then [`test_func`](Self::test_func),
/// then [`handle_no_permission`](Self::handle_no_permission) on failure.
///
/// An empty `allowed_roles` (the default) permits every authenticated
/// requester. A view that forgets to configure roles is therefore open to
/// all logged-in users; see `ViewGuard::default`.
#[derive(Debug, Clone, Default)]
pub struct ViewGuard {
    allowed_roles: RoleSet,
}

impl ViewGuard {
    #[must_use]
    pub fn new<I, R>(roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Role>,
    {
        Self {
            allowed_roles: RoleSet::new(roles),
        }
    }

    #[must_use]
    pub fn admin_required() -> Self {
        Self {
            allowed_roles: RoleSet::admin(),
        }
    }

    #[must_use]
    pub fn researcher_or_admin() -> Self {
        Self {
            allowed_roles: RoleSet::staff(),
        }
    }

    #[must_use]
    pub fn allowed_roles(&self) -> &RoleSet {
        &self.allowed_roles
    }

    /// True iff no roles are configured or the principal's role is listed.
    #[must_use]
    pub fn test_func(&self, principal: &Principal) -> bool {
        if self.allowed_roles.is_empty() {
            return true;
        }
        principal
            .role()
            .is_some_and(|role| permits(role, &self.allowed_roles))
    }

    /// Denial for an authenticated requester, login redirect otherwise.
    #[must_use]
    pub fn handle_no_permission(&self, access: &Access) -> AccessError {
        if access.is_authenticated() {
            tracing::debug!(
                subject_id = %access.principal().subject_id(),
                allowed = %self.allowed_roles,
                path = access.path(),
                "View guard denied access"
            );
            access.deny(denial_message(&self.allowed_roles))
        } else {
            access.login_required()
        }
    }

    /// Run `handler` once the guard permits the request.
    ///
    /// # Errors
    ///
    /// Returns the guard's [`AccessError`] without invoking `handler`.
    pub async fn dispatch<F, Fut, T>(&self, access: &Access, handler: F) -> Result<T, AccessError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.check(access)?;
        Ok(handler().await)
    }
}

impl Guard for ViewGuard {
    fn check(&self, access: &Access) -> Result<(), AccessError> {
        if LoginRequired.check(access).is_err() {
            return Err(self.handle_no_permission(access));
        }
        if self.test_func(access.principal()) {
            Ok(())
        } else {
            Err(self.handle_no_permission(access))
        }
    }
}
