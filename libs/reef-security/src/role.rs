use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse-grained access level of an authenticated user.
///
/// Any string is a valid role. The well-known values are exposed as
/// constants; a value outside of them is never rejected, it simply never
/// matches a guard that does not list it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub const ADMIN: Role = Role::from_static("admin");
    pub const RESEARCHER: Role = Role::from_static("researcher");
    pub const MEMBER: Role = Role::from_static("member");

    /// Build a role from an owned or borrowed name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    #[must_use]
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for Role {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
