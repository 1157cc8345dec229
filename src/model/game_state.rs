use serde::{Deserialize, Serialize};

use crate::model::event::EventEffects;

/// Authoritative player state. Owned by the engine, persisted whole on every
/// mutation; everything outside the engine only ever sees clones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub money: i64,
    pub reputation: i64,
    pub days_remaining: u32,
    pub started: bool,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            money: 100,
            reputation: 0,
            days_remaining: 60,
            started: false,
        }
    }
}

impl GameState {
    pub fn change_money(&mut self, delta: i64) -> i64 {
        // No floor: debts are part of the game.
        self.money += delta;
        self.money
    }

    pub fn change_reputation(&mut self, delta: i64) -> i64 {
        self.reputation += delta;
        self.reputation
    }

    /// Absolute updates derived from the narrator's reply text. `None` means
    /// the reply did not mention that stat.
    pub fn apply_reported(&mut self, money: Option<i64>, reputation: Option<i64>) {
        if let Some(m) = money {
            self.money = m;
        }
        if let Some(r) = reputation {
            self.reputation = r;
        }
    }

    pub fn apply_effects(&mut self, effects: &EventEffects) {
        self.change_money(effects.money);
        self.change_reputation(effects.reputation);
    }

    pub fn advance_day(&mut self) {
        self.days_remaining = self.days_remaining.saturating_sub(1);
    }

    pub fn reset(&mut self) {
        *self = GameState::default();
    }
}
