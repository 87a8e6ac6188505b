//! Ordered guard composition.

use std::fmt;
use std::sync::Arc;

use crate::access::Access;
use crate::error::AccessError;
use crate::guard::Guard;

/// Guards evaluated in insertion order; the first failure short-circuits.
///
/// ```ignore
/// let chain = GuardChain::new()
///     .with(LoginRequired)
///     .with(researcher_or_admin_required());
/// ```
#[derive(Clone, Default)]
pub struct GuardChain {
    guards: Vec<Arc<dyn Guard>>,
}

impl GuardChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, guard: impl Guard + 'static) -> Self {
        self.guards.push(Arc::new(guard));
        self
    }

    #[must_use]
    pub fn with_shared(mut self, guard: Arc<dyn Guard>) -> Self {
        self.guards.push(guard);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.guards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }
}

impl Guard for GuardChain {
    fn check(&self, access: &Access) -> Result<(), AccessError> {
        self.guards.iter().try_for_each(|guard| guard.check(access))
    }
}

impl fmt::Debug for GuardChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardChain")
            .field("len", &self.guards.len())
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use reef_security::{Principal, Role};

    use super::*;
    use crate::guard::{LoginRequired, admin_required};
    use crate::messages::FlashMessages;

    struct Counting(Arc<AtomicUsize>);

    impl Guard for Counting {
        fn check(&self, _access: &Access) -> Result<(), AccessError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn access(principal: Principal, messages: &FlashMessages) -> Access {
        Access::new(principal, Arc::new(messages.clone()), "/reefs/")
    }

    #[test]
    fn empty_chain_permits() {
        let messages = FlashMessages::new();
        assert!(
            GuardChain::new()
                .check(&access(Principal::anonymous(), &messages))
                .is_ok()
        );
    }

    #[test]
    fn first_failure_short_circuits() {
        let counter = Arc::new(AtomicUsize::new(0));
        let chain = GuardChain::new()
            .with(LoginRequired)
            .with(Counting(counter.clone()));
        let messages = FlashMessages::new();

        let err = chain
            .check(&access(Principal::anonymous(), &messages))
            .unwrap_err();

        assert!(err.is_login_required());
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn all_guards_run_when_permitted() {
        let counter = Arc::new(AtomicUsize::new(0));
        let chain = GuardChain::new()
            .with(Counting(counter.clone()))
            .with(admin_required())
            .with(Counting(counter.clone()));
        let messages = FlashMessages::new();

        chain
            .check(&access(Principal::builder().role(Role::ADMIN).build(), &messages))
            .unwrap();

        assert_eq!(chain.len(), 3);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn role_failure_after_login_is_denial() {
        let chain = GuardChain::new().with(LoginRequired).with(admin_required());
        let messages = FlashMessages::new();

        let err = chain
            .check(&access(Principal::builder().build(), &messages))
            .unwrap_err();

        assert!(err.is_permission_denied());
        assert_eq!(messages.len(), 1);
    }
}
