use uuid::Uuid;

/// Subject id carried by anonymous principals.
pub const ANONYMOUS_SUBJECT_ID: Uuid = Uuid::nil();

/// Username reported for anonymous principals.
pub const ANONYMOUS_USERNAME: &str = "anonymous";
