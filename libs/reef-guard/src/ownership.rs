//! Ownership-or-staff guard.

use std::borrow::Cow;
use std::future::Future;

use async_trait::async_trait;
use reef_security::Principal;
use uuid::Uuid;

use crate::access::Access;
use crate::error::AccessError;
use crate::guard::{Guard, LoginRequired};
use crate::policy::{RoleSet, permits};

/// Owner field consulted when a view does not configure one.
pub const DEFAULT_OWNER_FIELD: &str = "user";

const NOT_OWNER_MESSAGE: &str = "You do not have permission to access this resource.";

/// A resource that records which user owns it.
pub trait OwnedResource {
    /// Owning subject stored under `field`.
    ///
    /// Returns `None` for fields the resource does not have.
    fn owner_ref(&self, field: &str) -> Option<Uuid>;
}

/// Object retrieval capability of a view.
#[async_trait]
pub trait ObjectLookup: Send + Sync {
    type Object: OwnedResource + Send;
    type Error: From<AccessError> + Send;

    /// Fetch the object the request targets.
    ///
    /// # Errors
    ///
    /// Whatever the underlying store reports, e.g. not found.
    async fn get_object(&self, id: Uuid) -> Result<Self::Object, Self::Error>;
}

/// Permits staff (`admin`, `researcher`) or the recorded owner of the
/// target object.
///
/// Wrong role and wrong owner produce the same generic message.
#[derive(Debug, Clone)]
pub struct OwnershipGuard {
    owner_field: Cow<'static, str>,
    staff_roles: RoleSet,
}

impl Default for OwnershipGuard {
    fn default() -> Self {
        Self {
            owner_field: Cow::Borrowed(DEFAULT_OWNER_FIELD),
            staff_roles: RoleSet::staff(),
        }
    }
}

impl OwnershipGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_owner_field(mut self, field: &'static str) -> Self {
        self.owner_field = Cow::Borrowed(field);
        self
    }

    #[must_use]
    pub fn owner_field(&self) -> &str {
        &self.owner_field
    }

    #[must_use]
    pub fn staff_roles(&self) -> &RoleSet {
        &self.staff_roles
    }

    /// Authenticated AND (staff OR owner of `object`).
    #[must_use]
    pub fn permits<O: OwnedResource + ?Sized>(&self, principal: &Principal, object: &O) -> bool {
        let Some(role) = principal.role() else {
            return false;
        };
        if permits(role, &self.staff_roles) {
            return true;
        }
        object.owner_ref(&self.owner_field) == Some(principal.subject_id())
    }

    /// Check `access` against an already loaded object.
    ///
    /// # Errors
    ///
    /// - [`AccessError::LoginRequired`] for anonymous requesters
    /// - [`AccessError::PermissionDenied`] for non-staff non-owners
    pub fn check_object<O: OwnedResource + ?Sized>(
        &self,
        access: &Access,
        object: &O,
    ) -> Result<(), AccessError> {
        LoginRequired.check(access)?;
        if self.permits(access.principal(), object) {
            return Ok(());
        }

        tracing::debug!(
            subject_id = %access.principal().subject_id(),
            owner_field = %self.owner_field,
            path = access.path(),
            "Ownership guard denied access"
        );
        Err(access.deny(NOT_OWNER_MESSAGE.to_owned()))
    }

    /// Login check, object lookup, then the ownership predicate.
    ///
    /// Returns the resolved object so the handler does not fetch it twice.
    ///
    /// # Errors
    ///
    /// Lookup errors are returned unchanged; guard failures are converted
    /// with `From<AccessError>`.
    pub async fn resolve<L: ObjectLookup + ?Sized>(
        &self,
        access: &Access,
        lookup: &L,
        id: Uuid,
    ) -> Result<L::Object, L::Error> {
        LoginRequired.check(access)?;
        let object = lookup.get_object(id).await?;
        self.check_object(access, &object)?;
        Ok(object)
    }

    /// [`resolve`](Self::resolve) then hand the object to `handler`.
    ///
    /// # Errors
    ///
    /// See [`resolve`](Self::resolve); the handler's own result is
    /// returned verbatim.
    pub async fn dispatch<L, F, Fut, T>(
        &self,
        access: &Access,
        lookup: &L,
        id: Uuid,
        handler: F,
    ) -> Result<T, L::Error>
    where
        L: ObjectLookup + ?Sized,
        F: FnOnce(L::Object) -> Fut,
        Fut: Future<Output = Result<T, L::Error>>,
    {
        let object = self.resolve(access, lookup, id).await?;
        handler(object).await
    }
}
