//! Teamup API client bound to a single room.

use std::future::Future;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{RequestBuilder, Response};
use scheduler_core::config::TEAMUP_API_BASE;
use scheduler_core::{BackendError, BoxFuture, CalendarBackend, Event, TeamupConfig};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::error::TeamupError;
use crate::types::{EventDraft, EventListResponse, SubcalendarListResponse};

const TOKEN_HEADER: &str = "Teamup-Token";
const PASSWORD_HEADER: &str = "Teamup-Password";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Who the adapter talks to Teamup as, and which room it serves.
#[derive(Clone)]
pub struct Identity {
    pub api_key: String,
    pub password: Option<String>,
    /// Teamup calendar key (the account, not a room).
    pub calendar_id: String,
    /// Name of the sub-calendar representing the room.
    pub room_id: String,
}

impl Identity {
    pub fn new(
        api_key: impl Into<String>,
        calendar_id: impl Into<String>,
        room_id: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            password: None,
            calendar_id: calendar_id.into(),
            room_id: room_id.into(),
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        let password = password.into();
        self.password = (!password.is_empty()).then_some(password);
        self
    }

    fn validate(&self) -> Result<(), TeamupError> {
        if self.api_key.is_empty() {
            return Err(TeamupError::InvalidIdentity("api_key"));
        }
        if self.calendar_id.is_empty() {
            return Err(TeamupError::InvalidIdentity("calendar_id"));
        }
        if self.room_id.is_empty() {
            return Err(TeamupError::InvalidIdentity("room_id"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("calendar_id", &self.calendar_id)
            .field("room_id", &self.room_id)
            .field("has_password", &self.password.is_some())
            .finish_non_exhaustive()
    }
}

/// A room's calendar on Teamup.
///
/// Holds no mutable state: every operation resolves the room's sub-calendar
/// afresh, so clones can be used from any number of tasks at once.
#[derive(Debug, Clone)]
pub struct TeamupCalendar {
    client: reqwest::Client,
    identity: Identity,
    base_url: String,
}

impl TeamupCalendar {
    /// Creates a calendar with its own HTTP client.
    pub fn new(identity: Identity) -> Result<Self, TeamupError> {
        let client = reqwest::Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Self::with_client(identity, client)
    }

    /// Creates a calendar on a caller-supplied transport.
    pub fn with_client(identity: Identity, client: reqwest::Client) -> Result<Self, TeamupError> {
        identity.validate()?;
        Ok(Self {
            client,
            identity,
            base_url: TEAMUP_API_BASE.to_string(),
        })
    }

    /// Creates a calendar from the `[teamup]` configuration section.
    pub fn from_config(config: &TeamupConfig) -> Result<Self, TeamupError> {
        let mut identity = Identity::new(&config.api_key, &config.calendar_id, &config.room_id);
        if let Some(password) = config.effective_password() {
            identity = identity.with_password(password);
        }

        let mut builder = reqwest::Client::builder();
        if config.request_timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.request_timeout_secs));
        }

        Ok(Self::with_client(identity, builder.build()?)?.with_base_url(&config.base_url))
    }

    /// Points the calendar at another API host.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    fn url(&self, resource: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            urlencoding::encode(&self.identity.calendar_id),
            resource,
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(TOKEN_HEADER, &self.identity.api_key);
        match self.identity.password.as_deref() {
            Some(password) if !password.is_empty() => request.header(PASSWORD_HEADER, password),
            _ => request,
        }
    }

    /// Finds the id of the sub-calendar named after the room.
    #[instrument(
        skip(self, cancel),
        fields(calendar_id = %self.identity.calendar_id, room_id = %self.identity.room_id),
        level = "info"
    )]
    pub async fn subcalendar_id(&self, cancel: &CancellationToken) -> Result<i64, TeamupError> {
        let url = self.url("subcalendars");
        debug!(%url, "Sending request");
        let request = self.authorize(self.client.get(&url));

        let response = cancellable(cancel, request.send()).await?;
        let body = success_body(cancel, response).await?;

        let list: SubcalendarListResponse =
            serde_json::from_str(&body).map_err(TeamupError::Decode)?;

        list.subcalendars
            .iter()
            .find(|sub| sub.name == self.identity.room_id)
            .map(|sub| {
                debug!(subcalendar_id = sub.id, "Resolved room");
                sub.id
            })
            .ok_or_else(|| TeamupError::RoomNotFound(self.identity.room_id.clone()))
    }

    /// Lists the events scheduled in the room.
    #[instrument(
        skip(self, cancel),
        fields(calendar_id = %self.identity.calendar_id, room_id = %self.identity.room_id),
        level = "info"
    )]
    pub async fn get_events(&self, cancel: &CancellationToken) -> Result<Vec<Event>, TeamupError> {
        let subcalendar_id = self
            .subcalendar_id(cancel)
            .await
            .map_err(TeamupError::lookup)?;

        let url = self.url("events");
        debug!(%url, subcalendar_id, "Sending request");
        let request = self
            .authorize(self.client.get(&url))
            .header(CONTENT_TYPE, "application/json")
            .query(&[("subcalendarId[]", subcalendar_id.to_string())]);

        let response = cancellable(cancel, request.send()).await?;
        let body = success_body(cancel, response).await?;

        let resp: EventListResponse = serde_json::from_str(&body).map_err(TeamupError::Decode)?;
        debug!(count = resp.events.len(), "Fetched events");

        Ok(resp.events.into_iter().map(Event::from).collect())
    }

    /// Creates an event in the room.
    ///
    /// Not idempotent: submitting the same event twice creates two events.
    #[instrument(
        skip(self, cancel, event),
        fields(calendar_id = %self.identity.calendar_id, room_id = %self.identity.room_id, title = %event.title),
        level = "info"
    )]
    pub async fn create_event(
        &self,
        cancel: &CancellationToken,
        event: &Event,
    ) -> Result<(), TeamupError> {
        let subcalendar_id = self
            .subcalendar_id(cancel)
            .await
            .map_err(TeamupError::lookup)?;

        let draft = EventDraft::new(subcalendar_id, event);
        let body = serde_json::to_vec(&draft).map_err(TeamupError::Encode)?;

        let url = self.url("events");
        debug!(%url, subcalendar_id, "Sending request");
        let request = self
            .authorize(self.client.post(&url))
            .header(CONTENT_TYPE, "application/json")
            .body(body);

        let response = cancellable(cancel, request.send()).await?;
        success_body(cancel, response).await?;

        debug!(subcalendar_id, "Created event");
        Ok(())
    }
}

impl CalendarBackend for TeamupCalendar {
    fn name(&self) -> &str {
        "teamup"
    }

    fn get_events<'a>(
        &'a self,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Vec<Event>, BackendError>> {
        Box::pin(async move {
            TeamupCalendar::get_events(self, cancel)
                .await
                .map_err(BackendError::from)
        })
    }

    fn create_event<'a>(
        &'a self,
        cancel: &'a CancellationToken,
        event: Event,
    ) -> BoxFuture<'a, Result<(), BackendError>> {
        Box::pin(async move {
            TeamupCalendar::create_event(self, cancel, &event)
                .await
                .map_err(BackendError::from)
        })
    }
}

/// Races a transport future against the caller's token. An already-cancelled
/// token wins before the future is first polled, so no request goes out.
async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, TeamupError>
where
    F: Future<Output = Result<T, reqwest::Error>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(TeamupError::Cancelled),
        result = fut => result.map_err(TeamupError::from),
    }
}

/// Reads the body, failing with the status and raw text on non-2xx.
async fn success_body(cancel: &CancellationToken, response: Response) -> Result<String, TeamupError> {
    let status = response.status();
    let body = cancellable(cancel, response.text()).await?;

    if status.is_success() {
        Ok(body)
    } else {
        warn!(status = status.as_u16(), "Teamup returned an error status");
        debug!(%body, "Error response body");
        Err(TeamupError::RemoteService {
            status: status.as_u16(),
            body,
        })
    }
}
