//! REST surface: routes, handlers, DTOs, error mapping and extractors.

use std::sync::Arc;

use crate::domain::service::Service;
use crate::infra::auth::TokenIssuer;

pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;

pub use error::{ApiError, ApiResult};

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<Service>,
    pub tokens: Arc<TokenIssuer>,
}

impl AppState {
    #[must_use]
    pub fn new(service: Arc<Service>, tokens: Arc<TokenIssuer>) -> Self {
        Self { service, tokens }
    }
}
