//! Route table. Routes orchestrate but don't contain business logic:
//! handlers call the domain service, DTOs shape the wire.

use axum::Router;
use axum::routing::{delete, get, post, put};

use super::AppState;
use super::handlers::{accounts, events, invitations, notifications, weather};

/// Build the module router with all routes registered.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Accounts
        .route("/users/register", post(accounts::register_user))
        .route("/token", post(accounts::login))
        .route("/users/me", get(accounts::me))
        .route("/users/logout", post(accounts::logout))
        .route("/users/update", put(accounts::update_account))
        .route("/users/delete", delete(accounts::delete_account))
        .route("/users", get(accounts::list_users))
        .route("/users/{username}", get(accounts::get_user_by_name))
        .route("/users/id/{user_id}", get(accounts::get_user_by_id))
        .route("/users/friends/remove", post(accounts::remove_friend))
        // Events
        .route("/events/register", post(events::register_event))
        .route("/events", get(events::list_events))
        .route(
            "/events/{event_id}",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/events/{event_id}/join", get(events::join_event))
        .route("/events/{event_id}/leave", delete(events::leave_event))
        .route(
            "/events/{event_id}/admin",
            put(events::add_admin).delete(events::remove_admin),
        )
        .route(
            "/events/{event_id}/ownership",
            put(events::transfer_ownership),
        )
        .route("/events/{event_id}/status", post(events::change_status))
        .route(
            "/events/{event_id}/approve_request",
            post(events::approve_request),
        )
        // Invitations
        .route("/invitations", post(invitations::give_invitation))
        .route(
            "/invitations/{invite_id}/answer",
            get(invitations::answer_invitation),
        )
        .route(
            "/invitations/{invitation_id}/revoke",
            delete(invitations::revoke_invitation),
        )
        // Notifications
        .route(
            "/notifications/{user_id}/notify",
            post(notifications::notify_user),
        )
        .route("/notifications", get(notifications::list_notifications))
        .route(
            "/notifications/{notification_id}",
            delete(notifications::delete_notification),
        )
        // Weather
        .route("/weather/data", get(weather::weather_data))
        .with_state(state)
}
