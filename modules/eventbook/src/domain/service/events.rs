//! Event registry: CRUD, listing filters, visibility and forecast
//! enrichment.

use std::collections::BTreeSet;

use tracing::{debug, info};
use uuid::Uuid;

use super::Service;
use crate::domain::error::DomainError;
use crate::domain::model::{Event, EventFilter, EventPatch, NewEvent, User};
use crate::infra::weather::{DailyForecast, ForecastDays};

/// Fails with `Forbidden` unless the user is the organizer or an admin.
pub(super) fn require_admin_or_organizer(event: &Event, user_id: Uuid) -> Result<(), DomainError> {
    if !event.is_admin_or_organizer(user_id) {
        return Err(DomainError::forbidden(
            "you do not have rights to manage this event",
        ));
    }
    Ok(())
}

impl Service {
    /// Create an event. The organizer becomes its first admin.
    pub fn create_event(&self, organizer: &User, new_event: NewEvent) -> Result<Uuid, DomainError> {
        self.validate_event_fields(&new_event.title, new_event.start_time, new_event.end_time)?;

        let id = self.fresh_event_id();
        let event = Event {
            id,
            title: new_event.title,
            description: new_event.description,
            location: new_event.location,
            latitude: new_event.latitude,
            longitude: new_event.longitude,
            start_time: new_event.start_time,
            end_time: new_event.end_time,
            tags: new_event.tags,
            public: new_event.public,
            organizer_id: organizer.id,
            organizer_name: organizer.username.clone(),
            admins: BTreeSet::from([organizer.id]),
            participants: BTreeSet::new(),
            requests_to_join: Default::default(),
        };
        self.events.insert(&event)?;

        // The organizer's created-set is the owning side of the relation.
        self.update_user_record(organizer.id, |user| {
            user.events_created.insert(id);
            Ok(())
        })
        .map_err(|e| {
            DomainError::partial_update(
                format!("event {id}"),
                format!("user {}", organizer.id),
                e.to_string(),
            )
        })?;

        info!(event_id = %id, organizer_id = %organizer.id, "event created");
        Ok(id)
    }

    pub fn get_event(&self, event_id: Uuid) -> Result<Event, DomainError> {
        debug!(event_id = %event_id, "looking up event");
        Ok(self.event_by_id(event_id)?.record)
    }

    /// Event detail with optional forecast enrichment. Forecast data is
    /// only attached when the caller asks for it and the event carries
    /// coordinates.
    pub async fn event_with_forecast(
        &self,
        event_id: Uuid,
        forecast_days: Option<ForecastDays>,
    ) -> Result<(Event, Option<Vec<DailyForecast>>), DomainError> {
        let event = self.get_event(event_id)?;
        let Some(days) = forecast_days else {
            return Ok((event, None));
        };
        let (Some(latitude), Some(longitude)) = (event.latitude, event.longitude) else {
            return Err(DomainError::bad_request(
                "event has no coordinates to fetch a forecast for",
            ));
        };
        let forecast = self.forecast.forecast(latitude, longitude, days).await?;
        Ok((event, Some(forecast)))
    }

    pub fn list_events(&self, filter: &EventFilter) -> Result<Vec<Event>, DomainError> {
        let mut events = self.events.find(filter)?;
        events.sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.id.cmp(&b.id)));
        debug!(matched = events.len(), "listed events");
        Ok(events)
    }

    /// Update an event's descriptive fields. Organizer or admin only.
    pub fn update_event(
        &self,
        event_id: Uuid,
        requester_id: Uuid,
        patch: EventPatch,
    ) -> Result<(), DomainError> {
        self.update_event_record(event_id, |event| {
            require_admin_or_organizer(event, requester_id)?;
            if let Some(title) = &patch.title {
                if title.trim().is_empty() {
                    return Err(DomainError::bad_request("title cannot be empty"));
                }
                event.title = title.clone();
            }
            if let Some(description) = &patch.description {
                event.description = description.clone();
            }
            if let Some(location) = &patch.location {
                event.location = location.clone();
            }
            if let Some(latitude) = patch.latitude {
                event.latitude = Some(latitude);
            }
            if let Some(longitude) = patch.longitude {
                event.longitude = Some(longitude);
            }
            if let Some(start_time) = patch.start_time {
                event.start_time = start_time;
            }
            if let Some(end_time) = patch.end_time {
                event.end_time = end_time;
            }
            if let Some(tags) = &patch.tags {
                event.tags = tags.clone();
            }
            if event.end_time < event.start_time {
                return Err(DomainError::bad_request("event cannot end before it starts"));
            }
            Ok(())
        })?;
        info!(event_id = %event_id, "event updated");
        Ok(())
    }

    /// Delete an event. Organizer only.
    pub fn delete_event(&self, event_id: Uuid, requester_id: Uuid) -> Result<(), DomainError> {
        let event = self.event_by_id(event_id)?.record;
        if !event.is_organizer(requester_id) {
            return Err(DomainError::forbidden(
                "only the organizer may delete this event",
            ));
        }
        self.events.remove(event_id)?;

        // Participant references are left to expire with their records;
        // the organizer's created-set is tidied best-effort.
        let cleanup = self.update_user_record(event.organizer_id, |user| {
            user.events_created.remove(&event_id);
            Ok(())
        });
        if let Err(e) = cleanup {
            debug!(error = %e, "organizer cleanup failed (continuing)");
        }

        info!(event_id = %event_id, "event deleted");
        Ok(())
    }

    /// Flip the public flag. Organizer or admin only.
    pub fn change_visibility(
        &self,
        event_id: Uuid,
        requester_id: Uuid,
        public: bool,
    ) -> Result<(), DomainError> {
        self.update_event_record(event_id, |event| {
            require_admin_or_organizer(event, requester_id)?;
            event.public = public;
            Ok(())
        })?;
        info!(event_id = %event_id, public, "event visibility changed");
        Ok(())
    }

    /// Raw forecast passthrough for the standalone weather endpoint.
    pub async fn weather_forecast(
        &self,
        latitude: f64,
        longitude: f64,
        days: ForecastDays,
    ) -> Result<Vec<DailyForecast>, DomainError> {
        self.forecast.forecast(latitude, longitude, days).await
    }

    fn validate_event_fields(
        &self,
        title: &str,
        start_time: i64,
        end_time: i64,
    ) -> Result<(), DomainError> {
        if title.trim().is_empty() {
            return Err(DomainError::bad_request("title cannot be empty"));
        }
        if title.len() > self.config.max_title_length {
            return Err(DomainError::bad_request(format!(
                "title too long: {} characters (max: {})",
                title.len(),
                self.config.max_title_length
            )));
        }
        if end_time < start_time {
            return Err(DomainError::bad_request("event cannot end before it starts"));
        }
        Ok(())
    }

    /// Collision-checked fresh event id.
    fn fresh_event_id(&self) -> Uuid {
        let mut id = Uuid::new_v4();
        while self.events.contains(id) {
            id = Uuid::new_v4();
        }
        id
    }
}
