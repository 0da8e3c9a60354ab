//! Eventbook domain module.
//!
//! Implements the event-planning backend: accounts and friendships, events
//! with admin/organizer roles, the invitation state machine (direct event
//! invites, join requests, friend requests), per-user notifications, and
//! the weather enrichment boundary.
//!
//! ## Layering
//!
//! - `api` - REST surface: routes, handlers, DTOs, problem responses, the
//!   `CurrentUser` extractor. Depends on `domain`, never the reverse.
//! - `domain` - models, error taxonomy, repository traits and the service
//!   layer holding all business rules.
//! - `infra` - document-store repositories, the auth provider (JWT +
//!   password hashing) and the Open-Meteo forecast client.

pub mod api;
pub mod domain;
pub mod infra;
