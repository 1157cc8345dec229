use serde::{Deserialize, Serialize};

pub const RANDOM_EVENT_TYPE: &str = "random_event";

/// A generated event as it comes off the wire. `kind` must equal
/// [`RANDOM_EVENT_TYPE`] for the payload to be accepted at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effects: Option<EventEffects>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEffects {
    #[serde(default)]
    pub money: i64,
    #[serde(default)]
    pub reputation: i64,
}

/// The player's resolution of a pending event. Consumed exactly once: it is
/// rendered into the context string of the next outgoing chat turn and then
/// discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct EventOutcome {
    pub title: String,
    pub description: String,
    pub user_response: String,
    pub effects: Option<EventEffects>,
}

impl EventOutcome {
    /// Renders the outcome as system-supplied context for the narrator,
    /// matching the transcript marker the narrator is prompted to honor.
    pub fn context_line(&self) -> String {
        let mut line = format!(
            "[系统] 随机事件\"{}\"发生：{}\n玩家的决定：{}",
            self.title, self.description, self.user_response
        );
        if let Some(effects) = &self.effects {
            line.push_str(&format!(
                "（金钱{}{}，声望{}{}）",
                if effects.money >= 0 { "+" } else { "" },
                effects.money,
                if effects.reputation >= 0 { "+" } else { "" },
                effects.reputation
            ));
        }
        line
    }
}
