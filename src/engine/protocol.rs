use crate::model::event::{EventOutcome, EventPayload};
use crate::model::message::Message;

/// Frontend -> engine. Processed strictly in arrival order by the engine
/// thread, which is what rules out overlapping backend requests.
#[derive(Debug)]
pub enum EngineCommand {
    PlayerInput(String),
    EventResponse(String),
    DismissEvent,
    AdvanceDay,
    ResetGame,
    Shutdown,
}

/// Engine -> frontend. The engine never touches presentation; it only
/// announces what happened.
#[derive(Debug)]
pub enum EngineResponse {
    MessageAdded(Message),
    /// One streamed fragment of the narrator's in-progress reply.
    ReplyChunk(String),
    /// The full reply, once the stream has ended.
    ReplyCompleted(String),
    StatsChanged {
        money: i64,
        reputation: i64,
        days_remaining: u32,
    },
    /// A random event arrived and must be shown as a modal.
    EventReady(EventPayload),
    EventResolved(EventOutcome),
}
