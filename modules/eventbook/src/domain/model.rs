//! Persisted domain records and their invariant helpers.
//!
//! Relations are denormalized id-sets duplicated on both sides (friendship
//! lives in both users, participation in both user and event). The service
//! layer owns the dual-write discipline keeping the two sides consistent.
//! Pending invitations and notifications are id-keyed maps rather than
//! sets of structurally-hashed objects, so identity decides membership.

use std::collections::{BTreeMap, BTreeSet};

use eventbook_store::Document;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum InvitationKind {
    /// Direct invite to an event, pending on the invited user.
    Event,
    /// Friend request, pending on the invited user.
    Friend,
    /// Ask to join an event, pending on the event itself.
    Request,
}

impl std::str::FromStr for InvitationKind {
    type Err = UnknownInvitationKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "event" => Ok(Self::Event),
            "friend" => Ok(Self::Friend),
            "request" => Ok(Self::Request),
            other => Err(UnknownInvitationKind(other.to_owned())),
        }
    }
}

/// Rejected invitation kind string; callers map this to `InvalidArgument`.
#[derive(Debug, Clone)]
pub struct UnknownInvitationKind(pub String);

impl std::fmt::Display for UnknownInvitationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown invitation kind '{}'", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Invitation,
    EventUpdate,
    System,
}

/// A pending proposal linking an initiator, optionally a target user,
/// optionally an event. Removal from its collection is the terminal state;
/// no record of resolution is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Invitation {
    pub id: Uuid,
    pub kind: InvitationKind,
    pub start_user: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_user: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = "date-time")]
    pub created_at: OffsetDateTime,
}

impl Invitation {
    /// Build a new pending invitation with a derived id.
    #[must_use]
    pub fn new(
        kind: InvitationKind,
        start_user: Uuid,
        end_user: Option<Uuid>,
        event_id: Option<Uuid>,
    ) -> Self {
        let created_at = OffsetDateTime::now_utc();
        let salt: u64 = rand::random();
        Self {
            id: derive_invitation_id(start_user, end_user, event_id, created_at, salt),
            kind,
            start_user,
            end_user,
            event_id,
            created_at,
        }
    }

    /// Whether another pending invitation proposes the same thing: same
    /// kind, same initiator, same target user and event.
    #[must_use]
    pub fn is_duplicate_of(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.start_user == other.start_user
            && self.end_user == other.end_user
            && self.event_id == other.event_id
    }
}

/// Invitation ids are derived from the creation instant, the linked
/// parties and a random salt, digested so concurrent invitations between
/// the same parties cannot collide.
fn derive_invitation_id(
    start_user: Uuid,
    end_user: Option<Uuid>,
    event_id: Option<Uuid>,
    created_at: OffsetDateTime,
    salt: u64,
) -> Uuid {
    let mut hasher = Sha256::new();
    hasher.update(created_at.unix_timestamp_nanos().to_be_bytes());
    hasher.update(start_user.as_bytes());
    if let Some(end_user) = end_user {
        hasher.update(end_user.as_bytes());
    }
    if let Some(event_id) = event_id {
        hasher.update(event_id.as_bytes());
    }
    hasher.update(salt.to_be_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    Uuid::from_bytes(bytes)
}

/// Informational message owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = "date-time")]
    pub created_at: OffsetDateTime,
    #[serde(default)]
    pub read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<Uuid>,
}

impl Notification {
    #[must_use]
    pub fn new(
        user_id: Uuid,
        kind: NotificationKind,
        message: impl Into<String>,
        event_id: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            kind,
            message: message.into(),
            created_at: OffsetDateTime::now_utc(),
            read: false,
            event_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub role: Role,
    /// Monotonic counter embedded in issued tokens; bumping it on logout
    /// invalidates every previously issued token.
    #[serde(default)]
    pub token_version: u64,
    #[serde(default)]
    pub friends: BTreeSet<Uuid>,
    #[serde(default)]
    pub events_created: BTreeSet<Uuid>,
    #[serde(default)]
    pub events_participation: BTreeSet<Uuid>,
    /// Pending EVENT and FRIEND invitations targeting this user, by id.
    #[serde(default)]
    pub active_invitations: BTreeMap<Uuid, Invitation>,
    #[serde(default)]
    pub notifications: BTreeMap<Uuid, Notification>,
}

impl User {
    /// First pending invitation proposing the same thing as `candidate`.
    #[must_use]
    pub fn duplicate_invitation(&self, candidate: &Invitation) -> Option<&Invitation> {
        self.active_invitations
            .values()
            .find(|existing| existing.is_duplicate_of(candidate))
    }
}

impl Document for User {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    /// Optional coordinates for forecast enrichment; geocoding the
    /// location string is out of scope, callers supply these directly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Unix timestamps (seconds).
    pub start_time: i64,
    pub end_time: i64,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub public: bool,
    /// The creator-of-record. Only changed by ownership transfer.
    pub organizer_id: Uuid,
    pub organizer_name: String,
    #[serde(default)]
    pub admins: BTreeSet<Uuid>,
    #[serde(default)]
    pub participants: BTreeSet<Uuid>,
    /// Pending REQUEST invitations targeting this event, by id.
    #[serde(default)]
    pub requests_to_join: BTreeMap<Uuid, Invitation>,
}

impl Event {
    #[must_use]
    pub fn is_organizer(&self, user_id: Uuid) -> bool {
        self.organizer_id == user_id
    }

    #[must_use]
    pub fn is_admin_or_organizer(&self, user_id: Uuid) -> bool {
        self.is_organizer(user_id) || self.admins.contains(&user_id)
    }

    /// Pending join request from the given user, if any.
    #[must_use]
    pub fn pending_request_from(&self, user_id: Uuid) -> Option<&Invitation> {
        self.requests_to_join
            .values()
            .find(|inv| inv.start_user == user_id)
    }

    /// Organizer plus all admins, deduplicated.
    #[must_use]
    pub fn moderators(&self) -> BTreeSet<Uuid> {
        let mut out = self.admins.clone();
        out.insert(self.organizer_id);
        out
    }
}

impl Document for Event {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Input for event creation; ids, organizer and role sets are assigned by
/// the service.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub start_time: i64,
    pub end_time: i64,
    pub tags: BTreeSet<String>,
    pub public: bool,
}

/// Partial update of an event's descriptive fields. Role sets, visibility
/// and ownership have dedicated operations.
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub tags: Option<BTreeSet<String>>,
}

/// AND-combination of optional event list predicates. No predicate set
/// matches every event.
#[derive(Debug, Default, Clone)]
pub struct EventFilter {
    pub title: Option<String>,
    pub location: Option<String>,
    pub organizer_name: Option<String>,
    /// Match when any requested tag is present on the event.
    pub tags: Vec<String>,
    pub public: Option<bool>,
    /// Events starting at or after this unix timestamp.
    pub start_date: Option<i64>,
    /// Events ending at or before this unix timestamp.
    pub end_date: Option<i64>,
}

impl EventFilter {
    #[must_use]
    pub fn matches(&self, event: &Event) -> bool {
        if let Some(title) = &self.title {
            if &event.title != title {
                return false;
            }
        }
        if let Some(location) = &self.location {
            if &event.location != location {
                return false;
            }
        }
        if let Some(organizer_name) = &self.organizer_name {
            if &event.organizer_name != organizer_name {
                return false;
            }
        }
        if !self.tags.is_empty() && !self.tags.iter().any(|t| event.tags.contains(t)) {
            return false;
        }
        if let Some(public) = self.public {
            if event.public != public {
                return false;
            }
        }
        if let Some(start_date) = self.start_date {
            if event.start_time < start_date {
                return false;
            }
        }
        if let Some(end_date) = self.end_date {
            if event.end_time > end_date {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{Event, EventFilter, Invitation, InvitationKind};
    use std::collections::BTreeSet;
    use uuid::Uuid;

    fn sample_event() -> Event {
        let organizer = Uuid::new_v4();
        Event {
            id: Uuid::new_v4(),
            title: "Autumn meetup".to_owned(),
            description: String::new(),
            location: "Cluj".to_owned(),
            latitude: None,
            longitude: None,
            start_time: 1_700_000_000,
            end_time: 1_700_010_000,
            tags: BTreeSet::from(["tech".to_owned()]),
            public: true,
            organizer_id: organizer,
            organizer_name: "alice".to_owned(),
            admins: BTreeSet::from([organizer]),
            participants: BTreeSet::new(),
            requests_to_join: std::collections::BTreeMap::new(),
        }
    }

    #[test]
    fn derived_invitation_ids_do_not_collide() {
        let start = Uuid::new_v4();
        let end = Uuid::new_v4();
        let a = Invitation::new(InvitationKind::Friend, start, Some(end), None);
        let b = Invitation::new(InvitationKind::Friend, start, Some(end), None);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn duplicate_detection_ignores_id_and_time() {
        let start = Uuid::new_v4();
        let end = Uuid::new_v4();
        let a = Invitation::new(InvitationKind::Friend, start, Some(end), None);
        let b = Invitation::new(InvitationKind::Friend, start, Some(end), None);
        assert!(a.is_duplicate_of(&b));

        let other_kind = Invitation::new(InvitationKind::Event, start, Some(end), None);
        assert!(!a.is_duplicate_of(&other_kind));
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(EventFilter::default().matches(&sample_event()));
    }

    #[test]
    fn filter_combines_predicates_with_and() {
        let event = sample_event();

        let matching = EventFilter {
            title: Some("Autumn meetup".to_owned()),
            tags: vec!["tech".to_owned(), "absent".to_owned()],
            public: Some(true),
            start_date: Some(1_699_999_999),
            end_date: Some(1_700_010_000),
            ..EventFilter::default()
        };
        assert!(matching.matches(&event));

        let wrong_location = EventFilter {
            title: Some("Autumn meetup".to_owned()),
            location: Some("elsewhere".to_owned()),
            ..EventFilter::default()
        };
        assert!(!wrong_location.matches(&event));

        let too_late_start = EventFilter {
            start_date: Some(1_700_000_001),
            ..EventFilter::default()
        };
        assert!(!too_late_start.matches(&event));
    }

    #[test]
    fn organizer_is_always_a_moderator() {
        let mut event = sample_event();
        event.admins.clear();
        assert!(event.moderators().contains(&event.organizer_id));
        assert!(event.is_admin_or_organizer(event.organizer_id));
    }
}
