//! Per-request view of the requester handed to guards.

use std::fmt;
use std::sync::Arc;

use reef_security::Principal;

use crate::error::AccessError;
use crate::messages::{MessageLevel, MessageSink};

/// Login page used when no [`LoginUrl`](crate::LoginUrl) is configured.
pub const DEFAULT_LOGIN_URL: &str = "/accounts/login/";

/// Everything a guard may read or record while evaluating one request.
#[derive(Clone)]
pub struct Access {
    principal: Principal,
    messages: Arc<dyn MessageSink>,
    path: String,
    login_url: Arc<str>,
}

impl Access {
    #[must_use]
    pub fn new(
        principal: Principal,
        messages: Arc<dyn MessageSink>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            principal,
            messages,
            path: path.into(),
            login_url: Arc::from(DEFAULT_LOGIN_URL),
        }
    }

    #[must_use]
    pub fn with_login_url(mut self, login_url: Arc<str>) -> Self {
        self.login_url = login_url;
        self
    }

    #[must_use]
    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    #[must_use]
    pub fn messages(&self) -> &dyn MessageSink {
        self.messages.as_ref()
    }

    /// Requested path, used as the `next` target of login redirects.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.principal.is_authenticated()
    }

    /// Redirect-to-login outcome for this request.
    #[must_use]
    pub fn login_required(&self) -> AccessError {
        AccessError::LoginRequired {
            location: login_redirect(&self.login_url, &self.path),
        }
    }

    /// Record `message` as an error flash message and return the denial.
    #[must_use]
    pub fn deny(&self, message: String) -> AccessError {
        self.messages.add(MessageLevel::Error, message.clone());
        AccessError::PermissionDenied { message }
    }
}

impl fmt::Debug for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Access")
            .field("principal", &self.principal)
            .field("path", &self.path)
            .field("login_url", &self.login_url)
            .finish_non_exhaustive()
    }
}

/// Build `login_url?next=<path>`; `/` is kept unescaped in `next`.
#[must_use]
pub fn login_redirect(login_url: &str, next: &str) -> String {
    let separator = if login_url.contains('?') { '&' } else { '?' };
    let next = urlencoding::encode(next).replace("%2F", "/");
    format!("{login_url}{separator}next={next}")
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::messages::FlashMessages;

    #[test]
    fn login_redirect_appends_next() {
        assert_eq!(
            login_redirect("/accounts/login/", "/events/42/"),
            "/accounts/login/?next=/events/42/"
        );
        assert_eq!(
            login_redirect("/login?theme=dark", "/a b"),
            "/login?theme=dark&next=/a%20b"
        );
    }

    #[test]
    fn deny_records_error_message() {
        let messages = FlashMessages::new();
        let access = Access::new(
            Principal::builder().build(),
            Arc::new(messages.clone()),
            "/reefs/",
        );

        let err = access.deny("nope".to_owned());

        assert_eq!(
            err,
            AccessError::PermissionDenied {
                message: "nope".to_owned()
            }
        );
        assert_eq!(messages.snapshot()[0].text, "nope");
        assert_eq!(messages.snapshot()[0].level, MessageLevel::Error);
    }

    #[test]
    fn login_required_uses_configured_url() {
        let access = Access::new(
            Principal::anonymous(),
            Arc::new(FlashMessages::new()),
            "/articles/",
        )
        .with_login_url(Arc::from("/sso/start"));

        assert_eq!(
            access.login_required(),
            AccessError::LoginRequired {
                location: "/sso/start?next=/articles/".to_owned()
            }
        );
    }
}
