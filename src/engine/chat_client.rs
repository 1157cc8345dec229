use std::io::{BufRead, BufReader};
use std::time::Duration;

use anyhow::{anyhow, Context};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::error::EngineError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest<'a> {
    message: &'a str,
    session_id: &'a str,
    event_context: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResetRequest<'a> {
    session_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    content: Option<String>,
    error: Option<String>,
}

/// The conversation transport: streams narrator replies for a turn and
/// resets server-side sessions. The optional `event_context` string biases
/// the narrator's next reply with a resolved event outcome.
pub struct ChatClient {
    client: Client,
    chat_endpoint: String,
    reset_endpoint: String,
}

impl ChatClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("building chat HTTP client")?;
        let base = base_url.trim_end_matches('/');
        Ok(Self {
            client,
            chat_endpoint: format!("{base}/chat"),
            reset_endpoint: format!("{base}/reset-game"),
        })
    }

    /// Sends one turn and reads the `data: {...}` event stream, invoking
    /// `on_chunk` for every content fragment. Returns the accumulated reply.
    pub fn send_turn(
        &self,
        message: &str,
        session_id: &str,
        event_context: &str,
        on_chunk: &mut dyn FnMut(&str),
    ) -> Result<String, EngineError> {
        let response = self
            .client
            .post(&self.chat_endpoint)
            .json(&ChatRequest {
                message,
                session_id,
                event_context,
            })
            .send()
            .map_err(|e| EngineError::Backend(e.into()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::Backend(anyhow!(
                "chat endpoint returned {status}"
            )));
        }

        let reader = BufReader::new(response);
        let mut reply = String::new();
        for line in reader.lines() {
            let line = line.map_err(|e| EngineError::Backend(e.into()))?;
            let Some(data) = line.strip_prefix("data: ") else {
                continue;
            };
            match serde_json::from_str::<StreamChunk>(data) {
                Ok(chunk) => {
                    if let Some(error) = chunk.error {
                        return Err(EngineError::Backend(anyhow!(
                            "chat stream reported: {error}"
                        )));
                    }
                    if let Some(content) = chunk.content {
                        reply.push_str(&content);
                        on_chunk(&content);
                    }
                }
                Err(e) => {
                    // Keep reading: a single garbled frame should not lose
                    // the rest of the reply.
                    warn!(error = %e, "skipping unparsable stream frame");
                }
            }
        }

        Ok(reply)
    }

    pub fn reset(&self, session_id: &str) -> Result<(), EngineError> {
        let response = self
            .client
            .post(&self.reset_endpoint)
            .json(&ResetRequest { session_id })
            .send()
            .map_err(|e| EngineError::Backend(e.into()))?;

        if !response.status().is_success() {
            return Err(EngineError::Backend(anyhow!(
                "reset endpoint returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}
