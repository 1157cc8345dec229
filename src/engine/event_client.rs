use std::time::Duration;

use anyhow::{anyhow, Context};
use reqwest::blocking::Client;
use serde::Serialize;

use crate::model::error::EngineError;
use crate::model::event::{EventPayload, RANDOM_EVENT_TYPE};

/// Wire request for the event generator. Field names match the backend's
/// expected JSON.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest<'a> {
    pub money: i64,
    pub reputation: i64,
    pub player_action: &'a str,
    pub context: &'a str,
}

/// One-shot client for `/random-event`. No local state, no retries: a failed
/// request means "no event produced" and the scheduler carries the pressure
/// forward.
pub struct EventRequestClient {
    client: Client,
    endpoint: String,
}

impl EventRequestClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("building event HTTP client")?;
        Ok(Self {
            client,
            endpoint: format!("{}/random-event", base_url.trim_end_matches('/')),
        })
    }

    pub fn request_event(&self, request: &EventRequest<'_>) -> Result<EventPayload, EngineError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .map_err(|e| EngineError::Backend(e.into()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| EngineError::Backend(e.into()))?;

        if !status.is_success() {
            return Err(EngineError::Backend(anyhow!(
                "event endpoint returned {status}: {body}"
            )));
        }

        parse_event_payload(&body)
    }
}

/// Validates a response body into an [`EventPayload`]. A body that is not
/// JSON at all is a backend failure; JSON that is not a `random_event` is a
/// malformed payload. Split out so validation is testable without a server.
pub fn parse_event_payload(body: &str) -> Result<EventPayload, EngineError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| EngineError::Backend(anyhow!("unparsable event body: {e}")))?;

    let payload: EventPayload =
        serde_json::from_value(value).map_err(|e| EngineError::MalformedPayload {
            reason: e.to_string(),
        })?;

    if payload.kind != RANDOM_EVENT_TYPE {
        return Err(EngineError::MalformedPayload {
            reason: format!("unexpected event type {:?}", payload.kind),
        });
    }

    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_payload_parses() {
        let body = r#"{"type":"random_event","title":"意外发现","description":"你在街上发现了一些有趣的东西..."}"#;
        let payload = parse_event_payload(body).unwrap();
        assert_eq!(payload.title, "意外发现");
        assert!(payload.effects.is_none());
    }

    #[test]
    fn missing_type_field_is_malformed() {
        let body = r#"{"title":"t","description":"d"}"#;
        assert!(matches!(
            parse_event_payload(body),
            Err(EngineError::MalformedPayload { .. })
        ));
    }

    #[test]
    fn wrong_type_value_is_malformed() {
        let body = r#"{"type":"weather","title":"t","description":"d"}"#;
        assert!(matches!(
            parse_event_payload(body),
            Err(EngineError::MalformedPayload { .. })
        ));
    }

    #[test]
    fn non_json_body_is_a_backend_error() {
        assert!(matches!(
            parse_event_payload("<html>502</html>"),
            Err(EngineError::Backend(_))
        ));
    }

    #[test]
    fn effects_are_picked_up_when_supplied() {
        let body = r#"{"type":"random_event","title":"t","description":"d","effects":{"money":20,"reputation":5}}"#;
        let payload = parse_event_payload(body).unwrap();
        let effects = payload.effects.unwrap();
        assert_eq!(effects.money, 20);
        assert_eq!(effects.reputation, 5);
    }
}
