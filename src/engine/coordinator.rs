use tracing::debug;

use crate::model::error::EngineError;
use crate::model::event::{EventOutcome, EventPayload};

/// Single-slot owner of the event the player is currently being asked about.
/// At most one event is pending; presenting a new one replaces any stale one.
#[derive(Debug, Default)]
pub struct EventCoordinator {
    pending: Option<EventPayload>,
}

impl EventCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Stores `payload` as the pending event.
    pub fn present(&mut self, payload: EventPayload) {
        if let Some(stale) = self.pending.replace(payload) {
            debug!(title = %stale.title, "replacing stale pending event");
        }
    }

    /// Consumes the pending event into an outcome carrying the player's
    /// response.
    pub fn resolve(&mut self, user_response: &str) -> Result<EventOutcome, EngineError> {
        let pending = self.pending.take().ok_or(EngineError::NoPendingEvent)?;
        Ok(EventOutcome {
            title: pending.title,
            description: pending.description,
            user_response: user_response.to_string(),
            effects: pending.effects,
        })
    }

    /// Drops the pending event without producing an outcome. Scheduler
    /// timing is unaffected; that is the caller's concern.
    pub fn dismiss(&mut self) -> bool {
        self.pending.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(title: &str) -> EventPayload {
        EventPayload {
            kind: "random_event".to_string(),
            title: title.to_string(),
            description: "描述".to_string(),
            effects: None,
        }
    }

    #[test]
    fn resolve_without_present_fails_and_changes_nothing() {
        let mut c = EventCoordinator::new();
        assert!(matches!(c.resolve("好"), Err(EngineError::NoPendingEvent)));
        assert!(!c.has_pending());
    }

    #[test]
    fn resolve_consumes_the_pending_event() {
        let mut c = EventCoordinator::new();
        c.present(payload("码头风波"));
        let outcome = c.resolve("上前调解").unwrap();
        assert_eq!(outcome.title, "码头风波");
        assert_eq!(outcome.user_response, "上前调解");
        assert!(!c.has_pending());
        assert!(matches!(c.resolve("再来"), Err(EngineError::NoPendingEvent)));
    }

    #[test]
    fn present_replaces_a_stale_event() {
        let mut c = EventCoordinator::new();
        c.present(payload("旧事件"));
        c.present(payload("新事件"));
        let outcome = c.resolve("好").unwrap();
        assert_eq!(outcome.title, "新事件");
    }

    #[test]
    fn dismiss_clears_without_an_outcome() {
        let mut c = EventCoordinator::new();
        c.present(payload("码头风波"));
        assert!(c.dismiss());
        assert!(!c.has_pending());
        assert!(!c.dismiss());
    }
}
