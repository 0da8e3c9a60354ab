//! Map domain errors to RFC 9457 problems.

use axum::response::{IntoResponse, Response};

use crate::api::problem::{self, Problem};
use crate::domain::error::DomainError;

/// Map a domain error to its problem response.
///
/// Internal failures are logged here and answered with a generic detail;
/// everything else carries the domain message verbatim.
pub fn domain_error_to_problem(e: &DomainError) -> Problem {
    let trace_id = tracing::Span::current()
        .id()
        .map(|id| id.into_u64().to_string());

    let problem = match e {
        DomainError::NotFound { .. } => problem::not_found(e.to_string()).with_code("not_found"),
        DomainError::Forbidden { .. } => problem::forbidden(e.to_string()).with_code("forbidden"),
        DomainError::Unauthorized { .. } => {
            problem::unauthorized(e.to_string()).with_code("unauthorized")
        }
        DomainError::BadRequest { .. } => {
            problem::bad_request(e.to_string()).with_code("bad_request")
        }
        DomainError::InvalidArgument { .. } => {
            problem::bad_request(e.to_string()).with_code("invalid_argument")
        }
        DomainError::Conflict { .. } => problem::conflict(e.to_string()).with_code("conflict"),
        DomainError::WriteConflict { .. } => {
            problem::conflict("the record was modified concurrently, retry the request")
                .with_code("write_conflict")
        }
        DomainError::PartialUpdate { .. } => {
            tracing::error!(error = %e, "dual write left partial state");
            problem::internal_error(e.to_string()).with_code("partial_update")
        }
        DomainError::Upstream { .. } => {
            tracing::warn!(error = %e, "upstream provider failure");
            problem::bad_gateway(e.to_string()).with_code("upstream")
        }
        DomainError::Storage { .. } => {
            tracing::error!(error = %e, "storage error");
            problem::internal_error("an internal storage error occurred").with_code("storage")
        }
    };

    match trace_id {
        Some(id) => problem.with_trace_id(id),
        None => problem,
    }
}

impl From<DomainError> for Problem {
    fn from(e: DomainError) -> Self {
        domain_error_to_problem(&e)
    }
}

/// Handler error wrapper so `?` works on domain results.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

pub type ApiResult<T> = Result<T, ApiError>;

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        Problem::from(self.0).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::domain_error_to_problem;
    use crate::domain::error::DomainError;
    use http::StatusCode;

    #[test]
    fn taxonomy_maps_to_expected_status_codes() {
        let cases = [
            (DomainError::not_found("user"), StatusCode::NOT_FOUND),
            (DomainError::forbidden("no"), StatusCode::FORBIDDEN),
            (DomainError::unauthorized("no"), StatusCode::UNAUTHORIZED),
            (DomainError::bad_request("no"), StatusCode::BAD_REQUEST),
            (DomainError::invalid_argument("no"), StatusCode::BAD_REQUEST),
            (DomainError::conflict("taken"), StatusCode::CONFLICT),
            (DomainError::write_conflict("user"), StatusCode::CONFLICT),
            (
                DomainError::partial_update("a", "b", "why"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (DomainError::upstream("down"), StatusCode::BAD_GATEWAY),
            (
                DomainError::storage("broken"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(domain_error_to_problem(&error).status, expected);
        }
    }

    #[test]
    fn storage_detail_is_not_leaked() {
        let p = domain_error_to_problem(&DomainError::storage("secret dsn"));
        assert!(!p.detail.contains("secret dsn"));
    }
}
