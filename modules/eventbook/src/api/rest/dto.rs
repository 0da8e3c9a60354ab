//! REST DTOs with serde/utoipa, and their conversions to and from the
//! domain models. Stored records never cross the API boundary directly;
//! in particular, password hashes and token counters stay internal.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::model::{
    Event, EventFilter, EventPatch, Invitation, InvitationKind, NewEvent, Notification,
    NotificationKind, Role, User,
};
use crate::infra::weather::{DailyForecast, ForecastDays};

/// Uniform `{message}` envelope for mutations.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ==================== Account DTOs ====================

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterUserReq {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RegisteredResponse {
    pub message: String,
    pub uid: Uuid,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginReq {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateAccountReq {
    pub username: String,
    pub email: String,
    /// Omit to keep the current password.
    #[serde(default)]
    pub password: Option<String>,
}

/// The caller's own view of their account.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MeDto {
    pub username: String,
    pub email: String,
    pub events_created: BTreeSet<Uuid>,
    pub events_participation: BTreeSet<Uuid>,
    pub active_invitations: Vec<InvitationDto>,
}

impl From<User> for MeDto {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            email: user.email,
            events_created: user.events_created,
            events_participation: user.events_participation,
            active_invitations: user
                .active_invitations
                .into_values()
                .map(InvitationDto::from)
                .collect(),
        }
    }
}

/// Public profile: no credentials, no inbox.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserProfileDto {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub friends: BTreeSet<Uuid>,
    pub events_created: BTreeSet<Uuid>,
    pub events_participation: BTreeSet<Uuid>,
}

impl From<User> for UserProfileDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            friends: user.friends,
            events_created: user.events_created,
            events_participation: user.events_participation,
        }
    }
}

/// Directory listing projection.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserSummaryDto {
    pub username: String,
    pub email: String,
}

impl From<User> for UserSummaryDto {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            email: user.email,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct FriendQuery {
    pub friend_id: Uuid,
}

// ==================== Event DTOs ====================

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateEventReq {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    pub start_time: i64,
    pub end_time: i64,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub public: bool,
}

impl From<CreateEventReq> for NewEvent {
    fn from(req: CreateEventReq) -> Self {
        Self {
            title: req.title,
            description: req.description,
            location: req.location,
            latitude: req.latitude,
            longitude: req.longitude,
            start_time: req.start_time,
            end_time: req.end_time,
            tags: req.tags,
            public: req.public,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventCreatedResponse {
    pub message: String,
    pub id_event: Uuid,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateEventReq {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub tags: Option<BTreeSet<String>>,
}

impl From<UpdateEventReq> for EventPatch {
    fn from(req: UpdateEventReq) -> Self {
        Self {
            title: req.title,
            description: req.description,
            location: req.location,
            latitude: req.latitude,
            longitude: req.longitude,
            start_time: req.start_time,
            end_time: req.end_time,
            tags: req.tags,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventDto {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub start_time: i64,
    pub end_time: i64,
    pub tags: BTreeSet<String>,
    pub public: bool,
    pub organizer_id: Uuid,
    pub organizer_name: String,
    pub admins: BTreeSet<Uuid>,
    pub participants: BTreeSet<Uuid>,
    pub requests_to_join: Vec<InvitationDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<Vec<DailyForecast>>,
}

impl From<Event> for EventDto {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            title: event.title,
            description: event.description,
            location: event.location,
            latitude: event.latitude,
            longitude: event.longitude,
            start_time: event.start_time,
            end_time: event.end_time,
            tags: event.tags,
            public: event.public,
            organizer_id: event.organizer_id,
            organizer_name: event.organizer_name,
            admins: event.admins,
            participants: event.participants,
            requests_to_join: event
                .requests_to_join
                .into_values()
                .map(InvitationDto::from)
                .collect(),
            weather: None,
        }
    }
}

impl EventDto {
    #[must_use]
    pub fn with_weather(mut self, weather: Option<Vec<DailyForecast>>) -> Self {
        self.weather = weather;
        self
    }
}

/// `GET /events` filter parameters, AND-combined.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct EventsQuery {
    pub title: Option<String>,
    pub location: Option<String>,
    pub organizer_name: Option<String>,
    /// Comma-separated list; an event matches when it carries any of them.
    pub tags: Option<String>,
    pub public: Option<bool>,
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
}

impl From<EventsQuery> for EventFilter {
    fn from(q: EventsQuery) -> Self {
        Self {
            title: q.title,
            location: q.location,
            organizer_name: q.organizer_name,
            tags: match q.tags {
                Some(raw) => raw
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_owned)
                    .collect(),
                None => Vec::new(),
            },
            public: q.public,
            start_date: q.start_date,
            end_date: q.end_date,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EventDetailQuery {
    /// Attach a forecast for this horizon; needs event coordinates.
    #[serde(default)]
    pub forecast_days: Option<ForecastDays>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct JoinResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AdminQuery {
    pub username: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RemoveAdminQuery {
    pub admin_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct OwnershipQuery {
    pub username: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StatusQuery {
    pub public: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ApproveRequestQuery {
    pub request_id: Uuid,
    pub approve: bool,
}

// ==================== Invitation DTOs ====================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvitationDto {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: InvitationKind,
    pub start_user: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_user: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = "date-time")]
    pub created_at: OffsetDateTime,
}

impl From<Invitation> for InvitationDto {
    fn from(inv: Invitation) -> Self {
        Self {
            id: inv.id,
            kind: inv.kind,
            start_user: inv.start_user,
            end_user: inv.end_user,
            event_id: inv.event_id,
            created_at: inv.created_at,
        }
    }
}

/// `POST /invitations` body. `start_user` is accepted for wire
/// compatibility but the authenticated caller always wins.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GiveInvitationReq {
    #[serde(default)]
    pub start_user: Option<Uuid>,
    #[serde(default)]
    pub end_user: Option<Uuid>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub event_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InviteResponse {
    pub message: String,
    pub invite_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AnswerQuery {
    pub answer: bool,
    #[serde(default)]
    pub event_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RevokeQuery {
    pub user_id: Uuid,
}

// ==================== Notification DTOs ====================

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NotificationDto {
    pub id: Uuid,
    pub notification_type: NotificationKind,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = "date-time")]
    pub created_at: OffsetDateTime,
    pub read: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<Uuid>,
}

impl From<Notification> for NotificationDto {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            notification_type: n.kind,
            message: n.message,
            created_at: n.created_at,
            read: n.read,
            event_id: n.event_id,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NotifyQuery {
    pub notification_type: NotificationKind,
    pub content: String,
}

// ==================== Weather DTOs ====================

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct WeatherQuery {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub time_interval: Option<ForecastDays>,
}
