use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use rand::rngs::ThreadRng;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::engine::chat_client::ChatClient;
use crate::engine::classifier::ActionClassifier;
use crate::engine::coordinator::EventCoordinator;
use crate::engine::event_client::{EventRequest, EventRequestClient};
use crate::engine::protocol::{EngineCommand, EngineResponse};
use crate::engine::scheduler::EventScheduler;
use crate::engine::stats_parser::parse_reported_stats;
use crate::model::action::ActionCategory;
use crate::model::error::EngineError;
use crate::model::game_state::GameState;
use crate::model::message::Message;
use crate::persist::SaveStore;

const WELCOME_MESSAGE: &str = "欢迎来到15世纪的佛罗伦萨！ 👋
你站在熙熙攘攘的街头，周围是古老的建筑和忙碌的商贩。你是一个初来乍到的冒险者，需要在这里建立自己的声望和财富。

💰金钱：100，⭐声望：0

你可以：
1. 成为一名商人，经营店铺，努力成为富甲一方的豪绅
2. 当一名雇佣兵，提供护卫服务，争取成为光荣的骑士
3. 加入地下帮派，赚取黑金，以反抗贵族
4. 成为一名寻宝者，探索充满宝藏的危机之境
5. 或者...告诉我你想以什么角色开始游戏？";

/// The session engine. Owns every piece of mutable game state and runs on
/// its own thread, draining commands in order. Because one command is fully
/// processed before the next is looked at, there is never more than one
/// backend request in flight.
pub struct Engine {
    rx: Receiver<EngineCommand>,
    tx: Sender<EngineResponse>,
    config: EngineConfig,
    state: GameState,
    scheduler: EventScheduler,
    classifier: ActionClassifier,
    coordinator: EventCoordinator,
    chat: ChatClient,
    events: EventRequestClient,
    store: SaveStore,
    session_id: String,
    /// Outcome context awaiting the next outgoing chat turn. Consumed once.
    pending_context: Option<String>,
    rng: ThreadRng,
}

impl Engine {
    pub fn new(
        rx: Receiver<EngineCommand>,
        tx: Sender<EngineResponse>,
        config: EngineConfig,
        store: SaveStore,
    ) -> anyhow::Result<Self> {
        let state = match store.load() {
            Ok(Some(state)) => {
                info!("loaded saved game");
                state
            }
            Ok(None) => GameState::default(),
            Err(err) => {
                // Non-fatal: play this session on defaults.
                warn!(error = %err, "save slot unreadable, starting fresh");
                GameState::default()
            }
        };

        let timeout = Duration::from_secs(config.request_timeout_secs);
        let chat = ChatClient::new(&config.base_url, timeout)?;
        let events = EventRequestClient::new(&config.base_url, timeout)?;
        let scheduler = EventScheduler::new(config.scheduler.clone());
        let classifier = ActionClassifier::new(config.keywords.clone());

        Ok(Self {
            rx,
            tx,
            config,
            state,
            scheduler,
            classifier,
            coordinator: EventCoordinator::new(),
            chat,
            events,
            store,
            session_id: new_session_id(),
            pending_context: None,
            rng: rand::thread_rng(),
        })
    }

    pub fn run(&mut self) {
        if !self.state.started {
            self.state.started = true;
            self.persist();
            self.send(EngineResponse::MessageAdded(Message::Narrator(
                WELCOME_MESSAGE.to_string(),
            )));
        }
        self.send_stats();

        while let Ok(cmd) = self.rx.recv() {
            match cmd {
                EngineCommand::PlayerInput(text) => self.handle_player_input(&text),
                EngineCommand::EventResponse(response) => self.handle_event_response(&response),
                EngineCommand::DismissEvent => {
                    if self.coordinator.dismiss() {
                        debug!("pending event dismissed");
                    }
                }
                EngineCommand::AdvanceDay => self.handle_advance_day(),
                EngineCommand::ResetGame => self.handle_reset(),
                EngineCommand::Shutdown => break,
            }
        }

        debug!(actions = ?self.classifier.seen_actions(), "distinct actions this session");
        self.persist();
    }

    fn handle_player_input(&mut self, text: &str) {
        self.send(EngineResponse::MessageAdded(Message::User(text.to_string())));

        let action = self.classifier.classify(text);
        let event_context = self.pending_context.take().unwrap_or_default();

        let reply = match self.send_chat_turn(text, &event_context) {
            Ok(reply) => Some(reply),
            Err(err) => {
                warn!(error = %err, "chat turn failed, retrying once");
                self.send(EngineResponse::MessageAdded(Message::System(
                    "发送消息时出错了，正在重试……".to_string(),
                )));
                thread::sleep(Duration::from_millis(self.config.chat_retry_delay_ms));
                match self.send_chat_turn(text, &event_context) {
                    Ok(reply) => Some(reply),
                    Err(err) => {
                        warn!(error = %err, "chat retry failed");
                        self.send(EngineResponse::MessageAdded(Message::System(
                            "发送消息时出错了，请稍后重试。".to_string(),
                        )));
                        None
                    }
                }
            }
        };

        let Some(reply) = reply else {
            return;
        };

        self.apply_reply(&reply);
        self.maybe_fire_event(action, text);
    }

    fn send_chat_turn(&self, message: &str, event_context: &str) -> Result<String, EngineError> {
        let tx = &self.tx;
        self.chat.send_turn(
            message,
            &self.session_id,
            event_context,
            &mut |chunk| {
                let _ = tx.send(EngineResponse::ReplyChunk(chunk.to_string()));
            },
        )
    }

    fn apply_reply(&mut self, reply: &str) {
        self.send(EngineResponse::ReplyCompleted(reply.to_string()));

        let reported = parse_reported_stats(reply);
        if reported.money.is_some() || reported.reputation.is_some() {
            self.state.apply_reported(reported.money, reported.reputation);
            self.persist();
            self.send_stats();
        }
    }

    fn maybe_fire_event(&mut self, action: ActionCategory, input: &str) {
        let count = self.scheduler.note_input();
        debug!(input_count = count, "scheduler input noted");

        if self.coordinator.has_pending() {
            // A modal is already up; no new firing decisions until it is
            // answered or dismissed.
            debug!("event pending, suppressing scheduler evaluation");
            return;
        }

        let roll = self.rng.gen::<f64>();
        debug!(
            roll,
            probability = self.scheduler.current_probability(),
            "evaluating event fire"
        );
        let decision = self.scheduler.decide(Instant::now(), roll);
        if !decision.should_fire() {
            return;
        }

        let request = EventRequest {
            money: self.state.money,
            reputation: self.state.reputation,
            player_action: action.as_str(),
            context: input,
        };
        match self.events.request_event(&request) {
            Ok(payload) => {
                self.scheduler.mark_fired(Instant::now());
                info!(title = %payload.title, "random event ready");
                self.coordinator.present(payload.clone());
                self.send(EngineResponse::EventReady(payload));
            }
            Err(err) => {
                // Invisible to the player; the scheduler was not advanced,
                // so the escalation pressure carries to the next input.
                warn!(error = %err, "event generation failed");
            }
        }
    }

    fn handle_event_response(&mut self, response: &str) {
        let outcome = match self.coordinator.resolve(response) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, "event response with nothing pending");
                self.send(EngineResponse::MessageAdded(Message::System(
                    "当前没有待处理的事件。".to_string(),
                )));
                return;
            }
        };

        if let Some(effects) = &outcome.effects {
            self.state.apply_effects(effects);
            self.persist();
            self.send_stats();
        }

        let context = outcome.context_line();
        self.send(EngineResponse::MessageAdded(Message::System(context.clone())));
        self.send(EngineResponse::EventResolved(outcome));

        // The player's decision becomes the next chat turn, carrying the
        // outcome as context for the narrator.
        self.pending_context = Some(context);
        self.handle_player_input(response);
    }

    fn handle_advance_day(&mut self) {
        if self.state.days_remaining == 0 {
            return;
        }
        self.state.advance_day();
        self.persist();
        self.send_stats();
    }

    fn handle_reset(&mut self) {
        if let Err(err) = self.chat.reset(&self.session_id) {
            // The local reset still goes ahead; the stale server session is
            // orphaned under the old id.
            warn!(error = %err, "server-side reset failed");
        }
        if let Err(err) = self.store.clear() {
            warn!(error = %err, "could not clear save slot");
        }

        self.state.reset();
        self.state.started = true;
        self.persist();

        self.session_id = new_session_id();
        self.scheduler = EventScheduler::new(self.config.scheduler.clone());
        self.coordinator.dismiss();
        self.pending_context = None;

        info!(session = %self.session_id, "game reset");
        self.send(EngineResponse::MessageAdded(Message::Narrator(
            WELCOME_MESSAGE.to_string(),
        )));
        self.send_stats();
    }

    fn persist(&self) {
        if let Err(err) = self.store.save(&self.state) {
            // Losing one write is better than blocking gameplay.
            warn!(error = %err, "saving game state failed");
        }
    }

    fn send_stats(&self) {
        self.send(EngineResponse::StatsChanged {
            money: self.state.money,
            reputation: self.state.reputation,
            days_remaining: self.state.days_remaining,
        });
    }

    fn send(&self, response: EngineResponse) {
        let _ = self.tx.send(response);
    }
}

fn new_session_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("session_{millis}")
}
