//! Guard trait and the function guard.

use std::future::Future;
use std::sync::Arc;

use reef_security::Role;

use crate::access::Access;
use crate::error::AccessError;
use crate::policy::{RoleSet, denial_message, permits};

/// A reusable synchronous check evaluated before a handler runs.
///
/// Guards are immutable once built and are shared between concurrent
/// requests; evaluating one never changes its state.
pub trait Guard: Send + Sync {
    /// Decide whether the request may proceed.
    ///
    /// # Errors
    ///
    /// - [`AccessError::LoginRequired`] when the requester must log in first
    /// - [`AccessError::PermissionDenied`] when the requester is not allowed
    fn check(&self, access: &Access) -> Result<(), AccessError>;
}

impl<G: Guard + ?Sized> Guard for Arc<G> {
    fn check(&self, access: &Access) -> Result<(), AccessError> {
        (**self).check(access)
    }
}

/// Requires an authenticated principal, nothing more.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoginRequired;

impl Guard for LoginRequired {
    fn check(&self, access: &Access) -> Result<(), AccessError> {
        if access.is_authenticated() {
            Ok(())
        } else {
            Err(access.login_required())
        }
    }
}

/// Function guard: login required, then the requester's role must be in
/// the configured set.
///
/// Unlike [`ViewGuard`](crate::ViewGuard), an empty set denies every
/// authenticated requester.
#[derive(Debug, Clone)]
pub struct RoleGuard {
    allowed_roles: RoleSet,
}

impl RoleGuard {
    #[must_use]
    pub fn new<I, R>(roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Role>,
    {
        Self::from_set(RoleSet::new(roles))
    }

    #[must_use]
    pub fn from_set(allowed_roles: RoleSet) -> Self {
        Self { allowed_roles }
    }

    #[must_use]
    pub fn allowed_roles(&self) -> &RoleSet {
        &self.allowed_roles
    }

    /// Run `handler` only if the guard permits the request.
    ///
    /// The handler's output is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns the guard's [`AccessError`] without invoking `handler`.
    pub async fn call<F, Fut, T>(&self, access: &Access, handler: F) -> Result<T, AccessError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.check(access)?;
        Ok(handler().await)
    }
}

impl Guard for RoleGuard {
    fn check(&self, access: &Access) -> Result<(), AccessError> {
        LoginRequired.check(access)?;

        let principal = access.principal();
        if principal
            .role()
            .is_some_and(|role| permits(role, &self.allowed_roles))
        {
            return Ok(());
        }

        tracing::debug!(
            subject_id = %principal.subject_id(),
            role = ?principal.role(),
            allowed = %self.allowed_roles,
            path = access.path(),
            "Role guard denied access"
        );
        Err(access.deny(denial_message(&self.allowed_roles)))
    }
}

/// `RoleGuard` accepting only `admin`.
#[must_use]
pub fn admin_required() -> RoleGuard {
    RoleGuard::from_set(RoleSet::admin())
}

/// `RoleGuard` accepting `admin` or `researcher`.
#[must_use]
pub fn researcher_or_admin_required() -> RoleGuard {
    RoleGuard::from_set(RoleSet::staff())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use reef_security::Principal;
    use tracing_test::traced_test;

    use super::*;
    use crate::messages::{FlashMessages, MessageLevel};

    fn access_as(principal: Principal, messages: &FlashMessages) -> Access {
        Access::new(principal, Arc::new(messages.clone()), "/research/")
    }

    fn user(role: Role) -> Principal {
        Principal::builder().username("tester").role(role).build()
    }

    #[tokio::test]
    async fn member_is_denied_with_message() {
        let messages = FlashMessages::new();
        let access = access_as(user(Role::MEMBER), &messages);
        let calls = AtomicUsize::new(0);

        let result = researcher_or_admin_required()
            .call(&access, || async {
                calls.fetch_add(1, Ordering::SeqCst);
            })
            .await;

        let err = result.unwrap_err();
        assert!(err.is_permission_denied());
        assert_eq!(calls.load(Ordering::SeqCst), 0, "handler must not run");

        let recorded = messages.snapshot();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].level, MessageLevel::Error);
        assert!(recorded[0].text.contains("admin or researcher"));
    }

    #[tokio::test]
    async fn admin_result_is_passed_through() {
        let messages = FlashMessages::new();
        let access = access_as(user(Role::ADMIN), &messages);

        let result = researcher_or_admin_required()
            .call(&access, || async { vec![1, 2, 3] })
            .await;

        assert_eq!(result.unwrap(), vec![1, 2, 3]);
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn anonymous_gets_login_redirect_not_denial() {
        let messages = FlashMessages::new();
        let access = access_as(Principal::anonymous(), &messages);

        for guard in [admin_required(), researcher_or_admin_required()] {
            let err = guard.call(&access, || async {}).await.unwrap_err();
            assert_eq!(
                err,
                AccessError::LoginRequired {
                    location: "/accounts/login/?next=/research/".to_owned()
                }
            );
        }
        assert!(messages.is_empty());
    }

    #[test]
    fn empty_role_guard_denies_everyone() {
        let messages = FlashMessages::new();
        let guard = RoleGuard::new(Vec::<Role>::new());

        for role in [Role::ADMIN, Role::RESEARCHER, Role::MEMBER] {
            let access = access_as(user(role), &messages);
            assert!(guard.check(&access).unwrap_err().is_permission_denied());
        }
    }

    #[test]
    fn presets_use_fixed_role_sets() {
        assert_eq!(admin_required().allowed_roles(), &RoleSet::new(["admin"]));
        assert_eq!(
            researcher_or_admin_required().allowed_roles(),
            &RoleSet::new(["admin", "researcher"])
        );
    }

    #[test]
    fn evaluation_is_idempotent_across_requests() {
        let guard = admin_required();

        for role in [Role::ADMIN, Role::MEMBER] {
            let first = access_as(user(role.clone()), &FlashMessages::new());
            let second = access_as(user(role), &FlashMessages::new());

            assert_eq!(
                guard.check(&first).is_ok(),
                guard.check(&second).is_ok(),
                "same role must yield the same decision"
            );
        }
    }

    #[test]
    #[traced_test]
    fn denial_is_logged_at_debug() {
        let messages = FlashMessages::new();
        let access = access_as(user(Role::MEMBER), &messages);

        let _ = admin_required().check(&access);

        assert!(logs_contain("Role guard denied access"));
    }

    #[test]
    fn unknown_role_is_denied_not_rejected() {
        let messages = FlashMessages::new();
        let access = access_as(user(Role::new("diver")), &messages);

        let err = admin_required().check(&access).unwrap_err();
        assert_eq!(
            err,
            AccessError::PermissionDenied {
                message: "Access denied. This feature requires admin role.".to_owned()
            }
        );
    }

    #[test]
    fn login_required_guard_only_checks_authentication() {
        let messages = FlashMessages::new();

        assert!(
            LoginRequired
                .check(&access_as(user(Role::new("anything")), &messages))
                .is_ok()
        );
        assert!(
            LoginRequired
                .check(&access_as(Principal::anonymous(), &messages))
                .unwrap_err()
                .is_login_required()
        );
    }
}
