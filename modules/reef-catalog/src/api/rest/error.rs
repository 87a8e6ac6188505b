use axum::response::{IntoResponse, Response};
use http::StatusCode;
use reef_errors::Problem;
use reef_guard::AccessError;

use crate::domain::error::DomainError;

/// Map a domain error to an RFC 9457 Problem.
///
/// Handlers never go through this for access errors: [`IntoResponse`] lets
/// [`AccessError`] render itself so anonymous callers get the login
/// redirect. When called directly, a missing login maps to 401 rather than
/// a permission denial.
pub(crate) fn domain_error_to_problem(e: &DomainError) -> Problem {
    // Extract trace ID from current tracing span if available
    let trace_id = tracing::Span::current()
        .id()
        .map(|id| id.into_u64().to_string());

    let problem = match e {
        DomainError::NotFound { .. } => Problem::not_found(e.to_string()),
        DomainError::Validation { .. } => Problem::bad_request(e.to_string()),
        DomainError::ReefInUse { .. } => Problem::conflict(e.to_string()),
        DomainError::Access(AccessError::PermissionDenied { message }) => {
            Problem::forbidden(message.clone()).with_messages(vec![message.clone()])
        }
        DomainError::Access(AccessError::LoginRequired { .. }) => {
            Problem::new(StatusCode::UNAUTHORIZED, "Unauthorized", "Login required")
        }
    };
    problem.with_trace_id(trace_id)
}

/// Lets handlers return `Result<_, DomainError>` and use `?`.
impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        match self {
            Self::Access(access) => access.into_response(),
            other => domain_error_to_problem(&other).into_response(),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        let cases = [
            (DomainError::not_found("Event", Uuid::nil()), StatusCode::NOT_FOUND),
            (DomainError::validation("title", "cannot be empty"), StatusCode::BAD_REQUEST),
            (
                DomainError::ReefInUse {
                    id: Uuid::nil(),
                    events: 2,
                },
                StatusCode::CONFLICT,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn access_errors_keep_their_own_rendering() {
        let redirect = DomainError::from(AccessError::LoginRequired {
            location: "/accounts/login/?next=/events/".to_owned(),
        })
        .into_response();
        assert_eq!(redirect.status(), StatusCode::FOUND);

        let denied = DomainError::from(AccessError::PermissionDenied {
            message: "no".to_owned(),
        })
        .into_response();
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn login_required_problem_is_never_a_denial() {
        let err = DomainError::from(AccessError::LoginRequired {
            location: "/accounts/login/?next=/events/".to_owned(),
        });

        let problem = domain_error_to_problem(&err);
        assert_eq!(problem.status_code(), StatusCode::UNAUTHORIZED);

        let denied = domain_error_to_problem(&DomainError::from(AccessError::PermissionDenied {
            message: "Access denied.".to_owned(),
        }));
        assert_eq!(denied.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(denied.messages, vec!["Access denied.".to_owned()]);
    }
}
