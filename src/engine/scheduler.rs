use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub base_probability: f64,
    pub probability_increase: f64,
    pub max_probability: f64,
    pub min_interval_ms: u64,
    /// The input on which the one-shot cold-start event fires.
    pub first_event_input: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            base_probability: 0.2,
            probability_increase: 0.05,
            max_probability: 0.8,
            min_interval_ms: 50_000,
            first_event_input: 4,
        }
    }
}

impl SchedulerConfig {
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The one-shot cold-start fire. Unconditional, never repeated.
    FireFirst,
    /// The steady-state roll came in at or under the current probability.
    Fire,
    Skip,
}

impl Decision {
    pub fn should_fire(&self) -> bool {
        !matches!(self, Decision::Skip)
    }
}

/// Decides when to ask the backend for a random event.
///
/// Two regimes: until the cold-start event has fired, inputs are only
/// counted, and the `first_event_input`-th one fires unconditionally. After
/// that, each input past the cooldown rolls against an escalating
/// probability: every miss raises the odds by a fixed increment (capped), and
/// a successful fire resets them to base.
///
/// Session-scoped; never persisted. `decide` alone does not commit a fire:
/// the caller must report a successful backend round-trip via [`mark_fired`],
/// so a failed request leaves the timestamp and escalation pressure intact.
///
/// [`mark_fired`]: EventScheduler::mark_fired
#[derive(Debug)]
pub struct EventScheduler {
    config: SchedulerConfig,
    current_probability: f64,
    last_event_at: Option<Instant>,
    input_count: u32,
    fired_first_event: bool,
}

impl EventScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        let current_probability = config.base_probability;
        Self {
            config,
            current_probability,
            last_event_at: None,
            input_count: 0,
            fired_first_event: false,
        }
    }

    /// Counts a player input. Kept separate from [`decide`](Self::decide) so
    /// inputs still count while a modal suppresses evaluation.
    pub fn note_input(&mut self) -> u32 {
        self.input_count += 1;
        self.input_count
    }

    /// Evaluates one input. `roll` is a uniform sample in [0, 1) drawn by the
    /// caller. A miss escalates the probability; a cooldown skip changes
    /// nothing.
    pub fn decide(&mut self, now: Instant, roll: f64) -> Decision {
        if !self.fired_first_event {
            if self.input_count == self.config.first_event_input {
                // One-shot: latched even if the request ends up failing.
                self.fired_first_event = true;
                debug!(input = self.input_count, "cold-start event due");
                return Decision::FireFirst;
            }
            return Decision::Skip;
        }

        if let Some(last) = self.last_event_at {
            if now.duration_since(last) < self.config.min_interval() {
                debug!("within event cooldown, skipping evaluation");
                return Decision::Skip;
            }
        }

        if roll <= self.current_probability {
            debug!(roll, probability = self.current_probability, "event roll hit");
            return Decision::Fire;
        }

        self.current_probability = (self.current_probability
            + self.config.probability_increase)
            .min(self.config.max_probability);
        debug!(
            roll,
            probability = self.current_probability,
            "event roll missed, odds escalated"
        );
        Decision::Skip
    }

    /// Commits a fire after the backend delivered a valid event.
    pub fn mark_fired(&mut self, now: Instant) {
        self.current_probability = self.config.base_probability;
        self.last_event_at = Some(now);
    }

    pub fn current_probability(&self) -> f64 {
        self.current_probability
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler() -> EventScheduler {
        EventScheduler::new(SchedulerConfig::default())
    }

    /// Rolls that can never fire/always fire, for forcing a branch.
    const MISS: f64 = 0.99;
    const HIT: f64 = 0.0;

    #[test]
    fn first_event_fires_on_exactly_the_fourth_input() {
        let mut s = scheduler();
        let now = Instant::now();
        for _ in 0..3 {
            s.note_input();
            assert_eq!(s.decide(now, HIT), Decision::Skip);
        }
        s.note_input();
        assert_eq!(s.decide(now, MISS), Decision::FireFirst);
    }

    #[test]
    fn cold_start_never_reenters_even_after_a_failed_request() {
        let mut s = scheduler();
        let now = Instant::now();
        for _ in 0..4 {
            s.note_input();
            s.decide(now, MISS);
        }
        // Request failed: no mark_fired. Input 5 must be steady-state, not a
        // second unconditional fire.
        s.note_input();
        assert_eq!(s.decide(now, MISS), Decision::Skip);
        s.note_input();
        assert_eq!(s.decide(now, HIT), Decision::Fire);
    }

    #[test]
    fn probability_stays_within_bounds_under_any_miss_streak() {
        let mut s = scheduler();
        let t0 = Instant::now();
        for _ in 0..4 {
            s.note_input();
            s.decide(t0, MISS);
        }
        s.mark_fired(t0);

        let config = SchedulerConfig::default();
        for i in 0..100u32 {
            s.note_input();
            let now = t0 + config.min_interval() * (i + 1);
            s.decide(now, MISS);
            let p = s.current_probability();
            assert!(p >= config.base_probability);
            assert!(p <= config.max_probability);
        }
        assert_eq!(s.current_probability(), config.max_probability);
    }

    #[test]
    fn miss_escalates_by_exactly_the_increment() {
        let mut s = scheduler();
        let t0 = Instant::now();
        for _ in 0..4 {
            s.note_input();
            s.decide(t0, MISS);
        }
        s.mark_fired(t0);

        s.note_input();
        s.decide(t0 + Duration::from_millis(60_000), MISS);
        assert!((s.current_probability() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn fire_resets_probability_to_base() {
        let mut s = scheduler();
        let t0 = Instant::now();
        for _ in 0..4 {
            s.note_input();
            s.decide(t0, MISS);
        }
        s.mark_fired(t0);

        let later = t0 + Duration::from_millis(60_000);
        s.note_input();
        s.decide(later, MISS);
        s.note_input();
        assert_eq!(s.decide(later + Duration::from_millis(60_000), HIT), Decision::Fire);
        s.mark_fired(later + Duration::from_millis(60_000));
        assert_eq!(s.current_probability(), 0.2);
    }

    #[test]
    fn cooldown_blocks_fires_and_leaves_probability_untouched() {
        let mut s = scheduler();
        let t0 = Instant::now();
        for _ in 0..4 {
            s.note_input();
            s.decide(t0, MISS);
        }
        s.mark_fired(t0);

        // 49s later: inside the 50s cooldown, even a guaranteed roll skips
        // and nothing escalates.
        s.note_input();
        let p = s.current_probability();
        assert_eq!(s.decide(t0 + Duration::from_millis(49_000), HIT), Decision::Skip);
        assert_eq!(s.current_probability(), p);

        s.note_input();
        assert_eq!(s.decide(t0 + Duration::from_millis(50_000), HIT), Decision::Fire);
    }

    #[test]
    fn worked_scenario_from_the_tuning_sheet() {
        // base=0.2, inc=0.05, max=0.8, cooldown=50s.
        let mut s = scheduler();
        let t0 = Instant::now();

        // Inputs 1-3: nothing.
        for _ in 0..3 {
            s.note_input();
            assert_eq!(s.decide(t0, HIT), Decision::Skip);
        }
        // Input 4: unconditional, fires and succeeds at t=0.
        s.note_input();
        assert_eq!(s.decide(t0, MISS), Decision::FireFirst);
        s.mark_fired(t0);

        // t=60s, roll 0.9 > 0.2: miss, probability now 0.25.
        s.note_input();
        assert_eq!(s.decide(t0 + Duration::from_millis(60_000), 0.9), Decision::Skip);
        assert!((s.current_probability() - 0.25).abs() < 1e-12);

        // t=120s, roll 0.1 <= 0.25: fires, probability back to 0.2.
        s.note_input();
        assert_eq!(s.decide(t0 + Duration::from_millis(120_000), 0.1), Decision::Fire);
        s.mark_fired(t0 + Duration::from_millis(120_000));
        assert_eq!(s.current_probability(), 0.2);
    }

    #[test]
    fn failed_request_keeps_escalation_pressure() {
        let mut s = scheduler();
        let t0 = Instant::now();
        for _ in 0..4 {
            s.note_input();
            s.decide(t0, MISS);
        }
        s.mark_fired(t0);

        s.note_input();
        let later = t0 + Duration::from_millis(60_000);
        assert_eq!(s.decide(later, HIT), Decision::Fire);
        // Backend failed: caller does not mark_fired. The timestamp still
        // points at the last *successful* event, so the next input is not
        // pushed back into cooldown, and probability is unchanged.
        s.note_input();
        assert_eq!(s.decide(later + Duration::from_millis(1), HIT), Decision::Fire);
        assert_eq!(s.current_probability(), 0.2);
    }
}
