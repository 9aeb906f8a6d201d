//! HTTP long-poll transport.
//!
//! `GET /me` authenticates, `GET /events` long-polls with a cursor, `POST /actions` sends.
//! Every request carries the bot token as a bearer credential.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use eventbot_core::{Action, BotError, Event, Result, Session, Transport};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::BotConfig;

/// Extra time allowed on top of the long-poll timeout before the request is abandoned.
const POLL_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct MeResponse {
    id: String,
    #[serde(default)]
    username: Option<String>,
}

/// Events stay raw so one undecodable element cannot poison the batch.
#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    events: Vec<Value>,
}

/// One element of a polled batch.
#[derive(Debug)]
enum Polled {
    Event(Event),
    /// Undecodable element with a readable id; only moves the cursor.
    Skipped(String),
}

/// Decodes each element on its own. Elements that fail are logged and skipped; those with a
/// string `id` are kept as [`Polled::Skipped`] so the cursor moves past them.
fn decode_batch(raw: Vec<Value>) -> Vec<Polled> {
    raw.into_iter()
        .filter_map(|value| {
            let id = value.get("id").and_then(Value::as_str).map(str::to_string);
            match serde_json::from_value::<Event>(value) {
                Ok(event) => Some(Polled::Event(event)),
                Err(e) => {
                    warn!(event_id = ?id, error = %e, "Skipping undecodable event");
                    id.map(Polled::Skipped)
                }
            }
        })
        .collect()
}

pub struct HttpTransport {
    http: Client,
    base_url: String,
    token: String,
    poll_interval: Duration,
    session: Option<Session>,
    buffer: VecDeque<Polled>,
    /// Id of the last event handed out; sent as `after` on the next poll.
    cursor: Option<String>,
}

impl HttpTransport {
    pub fn new(config: &BotConfig) -> Result<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| BotError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            poll_interval: config.poll_interval,
            session: None,
            buffer: VecDeque::new(),
            cursor: None,
        })
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn poll(&self) -> Result<Vec<Polled>> {
        let mut query = vec![("timeout", self.poll_interval.as_secs().to_string())];
        if let Some(after) = &self.cursor {
            query.push(("after", after.clone()));
        }

        let response = self
            .http
            .get(self.url("events"))
            .bearer_auth(&self.token)
            .query(&query)
            .timeout(self.poll_interval + POLL_GRACE)
            .send()
            .await
            .map_err(|e| BotError::ConnectionLost(format!("poll failed: {}", e)))?;

        let status = response.status();
        if is_auth_failure(status) {
            return Err(BotError::Auth(format!("poll rejected with {}", status)));
        }
        if !status.is_success() {
            return Err(BotError::ConnectionLost(format!("poll returned {}", status)));
        }

        let body: EventsResponse = response
            .json()
            .await
            .map_err(|e| BotError::ConnectionLost(format!("malformed event batch: {}", e)))?;
        Ok(decode_batch(body.events))
    }
}

fn is_auth_failure(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

async fn error_body(response: Response) -> String {
    let status = response.status();
    match response.text().await {
        Ok(body) if !body.trim().is_empty() => format!("{}: {}", status, body.trim()),
        _ => status.to_string(),
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn connect(&mut self) -> Result<Session> {
        self.session = None;
        self.buffer.clear();

        let response = self
            .http
            .get(self.url("me"))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| BotError::Network(format!("handshake failed: {}", e)))?;

        let status = response.status();
        if is_auth_failure(status) {
            return Err(BotError::Auth(error_body(response).await));
        }
        if !status.is_success() {
            return Err(BotError::Network(format!(
                "handshake returned {}",
                error_body(response).await
            )));
        }

        let me: MeResponse = response
            .json()
            .await
            .map_err(|e| BotError::Network(format!("malformed handshake response: {}", e)))?;

        let session = Session {
            self_id: me.id,
            username: me.username,
            connected_at: Utc::now(),
        };
        self.session = Some(session.clone());
        Ok(session)
    }

    async fn receive(&mut self) -> Result<Event> {
        loop {
            if self.session.is_none() {
                return Err(BotError::ConnectionLost("not connected".to_string()));
            }
            match self.buffer.pop_front() {
                Some(Polled::Event(event)) => {
                    self.cursor = Some(event.id.clone());
                    return Ok(event);
                }
                Some(Polled::Skipped(id)) => {
                    self.cursor = Some(id);
                    continue;
                }
                None => {}
            }

            let batch = self.poll().await?;
            if batch.is_empty() {
                tokio::time::sleep(self.poll_interval).await;
                continue;
            }
            debug!(count = batch.len(), "Received event batch");
            self.buffer.extend(batch);
        }
    }

    async fn send(&self, action: &Action) -> Result<()> {
        if self.session.is_none() {
            return Err(BotError::Network("not connected".to_string()));
        }

        let response = self
            .http
            .post(self.url("actions"))
            .bearer_auth(&self.token)
            .json(action)
            .send()
            .await
            .map_err(|e| BotError::Network(format!("send failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else if status.is_client_error() {
            Err(BotError::Rejected(error_body(response).await))
        } else {
            Err(BotError::Network(error_body(response).await))
        }
    }

    async fn close(&mut self) {
        if self.session.take().is_some() {
            info!("Transport session closed");
        }
        self.buffer.clear();
    }
}
