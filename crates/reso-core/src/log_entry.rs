//! Log entry records
//!
//! Three kinds of entries are kept by the service:
//! - [`SearchLog`]: a query typed into the search box
//! - [`ClickLog`]: a click on a product card
//! - [`ClientLog`]: a behavior event (pageview, scroll, click, hover, search)
//!   batched by the client-side tracker
//!
//! All records serialize with camelCase field names, which is what the
//! front-end consumes.

use crate::{Error, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Session id used when a request carries no `x-session-id` header
pub const ANONYMOUS_SESSION: &str = "anonymous";

/// Client address used when a request carries no `x-forwarded-for` header
pub const LOCAL_ADDRESS: &str = "localhost";

/// Common view over every stored record
pub trait LogRecord {
    /// Server-assigned entry id
    fn id(&self) -> &str;

    /// When the event happened
    fn timestamp(&self) -> DateTime<Utc>;

    /// Session or user the event belongs to, if known
    fn actor_id(&self) -> Option<&str>;

    /// Short kind label ("search", "click", or the client event type)
    fn kind(&self) -> &str;
}

/// Where a logged request came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOrigin {
    pub ip: String,
    pub user_agent: Option<String>,
    pub session_id: String,
}

impl Default for RequestOrigin {
    fn default() -> Self {
        Self {
            ip: LOCAL_ADDRESS.to_string(),
            user_agent: None,
            session_id: ANONYMOUS_SESSION.to_string(),
        }
    }
}

/// Generate a fresh entry id
pub fn new_log_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Parse an optional RFC 3339 timestamp, falling back to `now`
pub fn parse_timestamp(value: Option<&str>, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    match value {
        None => Ok(now),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|e| Error::InvalidTimestamp {
                value: raw.to_string(),
                reason: e.to_string(),
            }),
    }
}

/// Convert epoch milliseconds (as sent by the tracker) into a timestamp
pub fn from_epoch_millis(millis: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| Error::InvalidTimestamp {
            value: millis.to_string(),
            reason: "out of range".to_string(),
        })
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Body of `POST /api/log-search`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchInput {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchLog {
    pub id: String,
    pub query: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub ip: String,
    pub session_id: String,
}

impl SearchLog {
    pub fn from_input(input: SearchInput, origin: &RequestOrigin, now: DateTime<Utc>) -> Result<Self> {
        Ok(Self {
            id: new_log_id(),
            timestamp: parse_timestamp(input.timestamp.as_deref(), now)?,
            query: input.query,
            user_agent: origin.user_agent.clone(),
            ip: origin.ip.clone(),
            session_id: origin.session_id.clone(),
        })
    }

    /// The query with surrounding whitespace removed, if it has any content
    pub fn meaningful_query(&self) -> Option<&str> {
        self.query.as_deref().filter(|q| !q.trim().is_empty())
    }
}

impl LogRecord for SearchLog {
    fn id(&self) -> &str {
        &self.id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn actor_id(&self) -> Option<&str> {
        Some(&self.session_id)
    }

    fn kind(&self) -> &str {
        "search"
    }
}

// ---------------------------------------------------------------------------
// Click
// ---------------------------------------------------------------------------

/// Body of `POST /api/log-click`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickInput {
    #[serde(default)]
    pub product_id: Option<Value>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickLog {
    pub id: String,
    pub product_id: String,
    pub title: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub price: Option<Value>,
    pub url: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub ip: String,
    pub session_id: String,
}

impl ClickLog {
    /// Build a click entry; `productId` must be a non-empty string or a number
    pub fn from_input(input: ClickInput, origin: &RequestOrigin, now: DateTime<Utc>) -> Result<Self> {
        let product_id = match input.product_id {
            Some(Value::String(s)) if !s.trim().is_empty() => s,
            Some(Value::Number(n)) => n.to_string(),
            Some(_) | None => {
                return Err(Error::InvalidInput("productId is required".to_string()));
            }
        };

        Ok(Self {
            id: new_log_id(),
            product_id,
            title: input.title,
            brand: input.brand,
            category: input.category,
            price: input.price,
            url: input.url,
            timestamp: parse_timestamp(input.timestamp.as_deref(), now)?,
            user_agent: origin.user_agent.clone(),
            ip: origin.ip.clone(),
            session_id: origin.session_id.clone(),
        })
    }
}

impl LogRecord for ClickLog {
    fn id(&self) -> &str {
        &self.id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn actor_id(&self) -> Option<&str> {
        Some(&self.session_id)
    }

    fn kind(&self) -> &str {
        "click"
    }
}

// ---------------------------------------------------------------------------
// Client behavior
// ---------------------------------------------------------------------------

/// Kind of client-side behavior event
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ClientEventKind {
    Pageview,
    Scroll,
    Click,
    Hover,
    Search,
    Other(String),
}

impl ClientEventKind {
    pub fn as_str(&self) -> &str {
        match self {
            ClientEventKind::Pageview => "pageview",
            ClientEventKind::Scroll => "scroll",
            ClientEventKind::Click => "click",
            ClientEventKind::Hover => "hover",
            ClientEventKind::Search => "search",
            ClientEventKind::Other(other) => other,
        }
    }
}

impl From<String> for ClientEventKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pageview" => ClientEventKind::Pageview,
            "scroll" => ClientEventKind::Scroll,
            "click" => ClientEventKind::Click,
            "hover" => ClientEventKind::Hover,
            "search" => ClientEventKind::Search,
            _ => ClientEventKind::Other(value),
        }
    }
}

impl From<&str> for ClientEventKind {
    fn from(value: &str) -> Self {
        ClientEventKind::from(value.to_string())
    }
}

impl From<ClientEventKind> for String {
    fn from(kind: ClientEventKind) -> Self {
        match kind {
            ClientEventKind::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ClientEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event as produced by the client tracker
///
/// Batches use `ts` (epoch millis) and `ua`; single events posted by hand may
/// use `timestamp` (RFC 3339) and `userAgent` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedEvent {
    #[serde(rename = "type")]
    pub kind: ClientEventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, alias = "userAgent")]
    pub ua: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl TrackedEvent {
    /// When the event happened on the client; `now` if the client sent no time
    pub fn occurred_at(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        match self.ts {
            Some(millis) => from_epoch_millis(millis),
            None => parse_timestamp(self.timestamp.as_deref(), now),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientLog {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ClientEventKind,
    pub timestamp: DateTime<Utc>,
    pub user_id: Option<String>,
    pub url: Option<String>,
    pub user_agent: Option<String>,
    pub payload: Option<Value>,
    pub server_timestamp: DateTime<Utc>,
    pub ip: String,
}

impl ClientLog {
    pub fn from_event(event: TrackedEvent, origin: &RequestOrigin, now: DateTime<Utc>) -> Result<Self> {
        Ok(Self {
            id: new_log_id(),
            timestamp: event.occurred_at(now)?,
            kind: event.kind,
            user_id: event.user_id,
            url: event.url,
            // the tracker reports the browser's user agent, which beats the header
            user_agent: event.ua.or_else(|| origin.user_agent.clone()),
            payload: event.payload,
            server_timestamp: now,
            ip: origin.ip.clone(),
        })
    }

    pub fn is_pageview(&self) -> bool {
        self.kind == ClientEventKind::Pageview
    }
}

impl LogRecord for ClientLog {
    fn id(&self) -> &str {
        &self.id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn actor_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    fn kind(&self) -> &str {
        self.kind.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn origin() -> RequestOrigin {
        RequestOrigin {
            ip: "10.0.0.1".to_string(),
            user_agent: Some("test-agent".to_string()),
            session_id: "sess-1".to_string(),
        }
    }

    #[test]
    fn test_search_log_defaults_timestamp_to_now() {
        let now = Utc::now();
        let log = SearchLog::from_input(
            SearchInput {
                query: Some("iphone".to_string()),
                timestamp: None,
            },
            &origin(),
            now,
        )
        .unwrap();

        assert_eq!(log.timestamp, now);
        assert_eq!(log.session_id, "sess-1");
        assert_eq!(log.meaningful_query(), Some("iphone"));
    }

    #[test]
    fn test_search_log_rejects_bad_timestamp() {
        let result = SearchLog::from_input(
            SearchInput {
                query: None,
                timestamp: Some("yesterday".to_string()),
            },
            &origin(),
            Utc::now(),
        );
        assert!(matches!(result, Err(Error::InvalidTimestamp { .. })));
    }

    #[test]
    fn test_blank_query_is_not_meaningful() {
        let log = SearchLog::from_input(
            SearchInput {
                query: Some("   ".to_string()),
                timestamp: None,
            },
            &origin(),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(log.meaningful_query(), None);
    }

    #[test]
    fn test_click_accepts_numeric_product_id() {
        let input: ClickInput = serde_json::from_value(json!({
            "productId": 42,
            "title": "Sony WH-1000XM5",
            "category": "耳機"
        }))
        .unwrap();

        let log = ClickLog::from_input(input, &origin(), Utc::now()).unwrap();
        assert_eq!(log.product_id, "42");
        assert_eq!(log.category.as_deref(), Some("耳機"));
    }

    #[test]
    fn test_click_requires_product_id() {
        let input: ClickInput = serde_json::from_value(json!({"title": "x"})).unwrap();
        let result = ClickLog::from_input(input, &origin(), Utc::now());
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_click_log_serializes_camel_case() {
        let input: ClickInput = serde_json::from_value(json!({"productId": "1"})).unwrap();
        let log = ClickLog::from_input(input, &origin(), Utc::now()).unwrap();
        let value = serde_json::to_value(&log).unwrap();

        assert_eq!(value["productId"], "1");
        assert_eq!(value["sessionId"], "sess-1");
        assert_eq!(value["userAgent"], "test-agent");
    }

    #[test]
    fn test_client_event_kind_round_trips_unknown_types() {
        let kind: ClientEventKind = serde_json::from_value(json!("purchase")).unwrap();
        assert_eq!(kind, ClientEventKind::Other("purchase".to_string()));
        assert_eq!(serde_json::to_value(&kind).unwrap(), json!("purchase"));

        let kind: ClientEventKind = serde_json::from_value(json!("pageview")).unwrap();
        assert_eq!(kind, ClientEventKind::Pageview);
    }

    #[test]
    fn test_client_log_uses_epoch_millis() {
        let event: TrackedEvent = serde_json::from_value(json!({
            "type": "scroll",
            "ts": 1_700_000_000_000i64,
            "userId": "u-1",
            "url": "http://localhost/",
            "ua": "Mozilla/5.0",
            "payload": {"depth": 60}
        }))
        .unwrap();

        let now = Utc::now();
        let log = ClientLog::from_event(event, &origin(), now).unwrap();
        assert_eq!(log.timestamp.timestamp_millis(), 1_700_000_000_000);
        assert_eq!(log.server_timestamp, now);
        assert_eq!(log.user_agent.as_deref(), Some("Mozilla/5.0"));
        assert_eq!(log.actor_id(), Some("u-1"));
        assert_eq!(log.payload, Some(json!({"depth": 60})));
    }

    #[test]
    fn test_client_log_accepts_user_agent_alias() {
        let event: TrackedEvent = serde_json::from_value(json!({
            "type": "pageview",
            "timestamp": "2025-01-01T10:00:00Z",
            "userAgent": "curl/8"
        }))
        .unwrap();

        let log = ClientLog::from_event(event, &RequestOrigin::default(), Utc::now()).unwrap();
        assert!(log.is_pageview());
        assert_eq!(log.user_agent.as_deref(), Some("curl/8"));
        assert_eq!(log.ip, LOCAL_ADDRESS);
    }
}
