mod config;
mod engine;
mod model;
mod persist;

use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::engine::engine::Engine;
use crate::engine::protocol::{EngineCommand, EngineResponse};
use crate::model::message::Message;
use crate::persist::SaveStore;

/// One in-game day passes per real minute.
const DAY_TICK: Duration = Duration::from_secs(60);

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = config::load_config(&config::config_path());

    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();

    let store = SaveStore::at_default_location();
    let engine_config = config.clone();
    let engine_handle = thread::spawn(move || {
        match Engine::new(cmd_rx, resp_tx, engine_config, store) {
            Ok(mut engine) => engine.run(),
            Err(err) => error!(error = %err, "engine failed to start"),
        }
    });

    // Set when an event modal is up; the next input line answers it.
    let event_pending = Arc::new(AtomicBool::new(false));

    let printer_pending = Arc::clone(&event_pending);
    let printer = thread::spawn(move || render_responses(resp_rx, printer_pending));

    // The day ticker lives out here; the engine only reacts to AdvanceDay.
    let ticker_tx = cmd_tx.clone();
    thread::spawn(move || loop {
        thread::sleep(DAY_TICK);
        if ticker_tx.send(EngineCommand::AdvanceDay).is_err() {
            break;
        }
    });

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let text = line.trim();

        if event_pending.swap(false, Ordering::SeqCst) {
            let cmd = if text.is_empty() {
                EngineCommand::DismissEvent
            } else {
                EngineCommand::EventResponse(text.to_string())
            };
            if cmd_tx.send(cmd).is_err() {
                break;
            }
            continue;
        }

        let cmd = match text {
            "" => continue,
            "/quit" | "/exit" => break,
            "/reset" => EngineCommand::ResetGame,
            _ => EngineCommand::PlayerInput(text.to_string()),
        };
        if cmd_tx.send(cmd).is_err() {
            break;
        }
    }

    let _ = cmd_tx.send(EngineCommand::Shutdown);
    let _ = engine_handle.join();
    let _ = printer.join();
    Ok(())
}

fn render_responses(rx: mpsc::Receiver<EngineResponse>, event_pending: Arc<AtomicBool>) {
    while let Ok(response) = rx.recv() {
        match response {
            EngineResponse::MessageAdded(Message::Narrator(text)) => {
                println!("\n{text}\n");
            }
            EngineResponse::MessageAdded(Message::System(text)) => {
                println!("\n{text}");
            }
            // The player's own line is already on screen.
            EngineResponse::MessageAdded(Message::User(_)) => {}
            EngineResponse::ReplyChunk(chunk) => {
                print!("{chunk}");
                io::stdout().flush().ok();
            }
            EngineResponse::ReplyCompleted(_) => println!(),
            EngineResponse::StatsChanged {
                money,
                reputation,
                days_remaining,
            } => {
                println!("💰 {money}  ⭐ {reputation}  📅 {days_remaining}天");
            }
            EngineResponse::EventReady(event) => {
                println!("\n⚡ {}", event.title);
                println!("{}", event.description);
                println!("你打算怎么做？（直接回车关闭事件）");
                event_pending.store(true, Ordering::SeqCst);
            }
            EngineResponse::EventResolved(_) => {}
        }
    }
}
