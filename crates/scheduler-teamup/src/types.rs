//! Teamup API wire types.
//!
//! Read-side records decode tolerantly: only the fields the scheduler
//! projects are required, everything else may be missing, `null` or of an
//! unexpected type.

use chrono::{DateTime, FixedOffset, SecondsFormat};
use scheduler_core::Event;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Body of `GET /{calendar}/subcalendars`.
#[derive(Debug, Clone, Deserialize)]
pub struct SubcalendarListResponse {
    pub subcalendars: Vec<Subcalendar>,
}

/// A sub-calendar; rooms are modeled as sub-calendars named after the room.
#[derive(Debug, Clone, Deserialize)]
pub struct Subcalendar {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub active: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub color: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub overlap: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub readonly: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub creation_dt: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub update_dt: Option<String>,
}

/// Body of `GET /{calendar}/events`.
#[derive(Debug, Clone, Deserialize)]
pub struct EventListResponse {
    pub events: Vec<RemoteEvent>,
    #[serde(default, deserialize_with = "lenient")]
    pub timestamp: Option<i64>,
}

/// An event as Teamup returns it.
///
/// Only `start_dt` and `end_dt` are required. Any other field that is
/// missing, `null` or of an unexpected type decodes as `None`.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteEvent {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub remote_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub series_id: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub subcalendar_id: Option<i64>,
    pub start_dt: DateTime<FixedOffset>,
    pub end_dt: DateTime<FixedOffset>,
    #[serde(default, deserialize_with = "lenient")]
    pub all_day: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub who: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub rrule: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub ristart_dt: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub rsstart_dt: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub tz: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub version: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub readonly: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub creation_dt: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub update_dt: Option<String>,
}

/// Decodes any JSON value, yielding `None` when it does not fit `T`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

impl From<RemoteEvent> for Event {
    fn from(remote: RemoteEvent) -> Self {
        Event {
            title: remote.title.unwrap_or_default(),
            start_time: remote.start_dt,
            end_time: remote.end_dt,
        }
    }
}

/// Body of `POST /{calendar}/events`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventDraft {
    pub subcalendar_id: i64,
    pub start_dt: String,
    pub end_dt: String,
    pub all_day: bool,
    pub rrule: String,
    pub title: String,
    pub who: String,
    pub location: String,
    pub notes: String,
}

impl EventDraft {
    /// Draft for `event` on the given sub-calendar. Fields the platform
    /// event does not carry are left empty.
    pub fn new(subcalendar_id: i64, event: &Event) -> Self {
        Self {
            subcalendar_id,
            start_dt: format_timestamp(&event.start_time),
            end_dt: format_timestamp(&event.end_time),
            title: event.title.clone(),
            ..Self::default()
        }
    }
}

/// RFC 3339 with the original offset (`Z` for UTC) and as many fractional
/// digits as the value needs.
pub fn format_timestamp(dt: &DateTime<FixedOffset>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn test_full_event_record_decodes() {
        let json = serde_json::json!({
            "id": "1234567",
            "remote_id": null,
            "series_id": null,
            "subcalendar_id": 9,
            "start_dt": "2024-01-01T09:00:00-07:00",
            "end_dt": "2024-01-01T09:15:00-07:00",
            "all_day": false,
            "title": "Standup",
            "who": "",
            "location": "ITB 1010",
            "notes": "<p>daily</p>",
            "rrule": "FREQ=DAILY",
            "ristart_dt": null,
            "rsstart_dt": null,
            "tz": "America/Denver",
            "version": "5a1b2c",
            "readonly": false,
            "creation_dt": "2023-12-31T10:00:00+00:00",
            "update_dt": null,
            "attachments": [],
            "custom": {}
        });

        let remote: RemoteEvent = serde_json::from_value(json).unwrap();
        assert_eq!(remote.subcalendar_id, Some(9));
        assert_eq!(remote.series_id, None);
        assert_eq!(remote.tz.as_deref(), Some("America/Denver"));

        let event = Event::from(remote);
        assert_eq!(event.title, "Standup");
        assert_eq!(event.start_time, at("2024-01-01T09:00:00-07:00"));
        assert_eq!(event.start_time.offset().local_minus_utc(), -7 * 3600);
    }

    #[test]
    fn test_missing_times_rejected() {
        let result: Result<RemoteEvent, _> =
            serde_json::from_value(serde_json::json!({ "title": "No times" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_subcalendar_metadata_optional() {
        let list: SubcalendarListResponse = serde_json::from_value(serde_json::json!({
            "subcalendars": [
                {"id": 7, "name": "RoomA"},
                {"id": 9, "name": "RoomB", "active": true, "color": 17, "overlap": false,
                 "readonly": true, "creation_dt": "2020-01-01T00:00:00+00:00", "update_dt": null}
            ]
        }))
        .unwrap();
        assert_eq!(list.subcalendars.len(), 2);
        assert_eq!(list.subcalendars[0].active, None);
        assert_eq!(list.subcalendars[1].readonly, Some(true));
    }

    #[test]
    fn test_draft_serialization() {
        let event = Event::new(
            "Planning",
            at("2024-01-01T09:00:00Z"),
            at("2024-01-01T10:30:00Z"),
        );
        let json = serde_json::to_value(EventDraft::new(42, &event)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "subcalendar_id": 42,
                "start_dt": "2024-01-01T09:00:00Z",
                "end_dt": "2024-01-01T10:30:00Z",
                "all_day": false,
                "rrule": "",
                "title": "Planning",
                "who": "",
                "location": "",
                "notes": ""
            })
        );
    }

    #[test]
    fn test_format_timestamp_is_lossless() {
        for s in [
            "2024-01-01T09:00:00Z",
            "2024-06-30T23:59:59-06:00",
            "2024-02-29T12:00:00.123456789+05:30",
        ] {
            let dt = at(s);
            let formatted = format_timestamp(&dt);
            assert_eq!(formatted, s);
            assert_eq!(at(&formatted), dt);
        }
    }

    #[test]
    fn test_unexpected_field_types_tolerated() {
        let events: EventListResponse = serde_json::from_value(serde_json::json!({
            "events": [
                {
                    "title": "Odd",
                    "start_dt": "2024-01-01T09:00:00Z",
                    "end_dt": "2024-01-01T09:15:00Z",
                    "all_day": null,
                    "readonly": null,
                    "series_id": "abc",
                    "version": 3,
                    "subcalendar_id": [9],
                    "tz": 42
                },
                {
                    "title": null,
                    "start_dt": "2024-01-01T10:00:00Z",
                    "end_dt": "2024-01-01T10:30:00Z"
                }
            ],
            "timestamp": "1704100000"
        }))
        .unwrap();

        assert_eq!(events.events.len(), 2);
        let odd = &events.events[0];
        assert_eq!(odd.all_day, None);
        assert_eq!(odd.readonly, None);
        assert_eq!(odd.series_id, Some(serde_json::json!("abc")));
        assert_eq!(odd.version, Some(serde_json::json!(3)));
        assert_eq!(odd.subcalendar_id, None);
        assert_eq!(odd.tz, None);
        assert_eq!(events.timestamp, None);

        let projected: Vec<Event> = events.events.into_iter().map(Event::from).collect();
        assert_eq!(projected[0].title, "Odd");
        assert_eq!(projected[1].title, "");
    }

    #[test]
    fn test_subcalendar_null_metadata_tolerated() {
        let list: SubcalendarListResponse = serde_json::from_value(serde_json::json!({
            "subcalendars": [
                {"id": 7, "name": "RoomA", "active": null, "color": "red",
                 "overlap": null, "readonly": null, "creation_dt": 0}
            ]
        }))
        .unwrap();
        assert_eq!(list.subcalendars[0].id, 7);
        assert_eq!(list.subcalendars[0].color, None);
        assert_eq!(list.subcalendars[0].creation_dt, None);
    }
}
