pub mod chat_client;
pub mod classifier;
pub mod coordinator;
pub mod engine;
pub mod event_client;
pub mod protocol;
pub mod scheduler;
pub mod stats_parser;
