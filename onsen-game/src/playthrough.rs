//! Per play-through state and the turn-to-turn transition rules.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::proficiency::TurnState;
use crate::recovery::{RecoveryMonitor, VitalLedger};
use crate::rules::RecoveryRules;
use crate::snapshot::ActionKind;

/// How a snapshot's turn relates to the last one seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum TurnTransition {
    /// Next turn of the same play-through.
    Advance,
    /// Same turn shown again.
    Redisplay,
    /// A new play-through begins. `full` when it starts at turn 1.
    NewPlaythrough { full: bool },
}

/// Classify `turn` against the last turn of the running play-through.
#[must_use]
pub fn classify_transition(last_seen: Option<u32>, turn: u32) -> TurnTransition {
    match last_seen {
        Some(last) if turn == last => TurnTransition::Redisplay,
        Some(last) if last.checked_add(1) == Some(turn) => TurnTransition::Advance,
        _ if turn == 1 => TurnTransition::NewPlaythrough { full: true },
        _ => TurnTransition::NewPlaythrough { full: false },
    }
}

/// Turn states recorded so far, keyed by turn index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PlaythroughLedger {
    turns: BTreeMap<u32, TurnState>,
}

impl PlaythroughLedger {
    #[must_use]
    pub fn get(&self, turn: u32) -> Option<&TurnState> {
        self.turns.get(&turn)
    }

    /// Store a turn state, replacing any earlier state for that turn.
    ///
    /// A choice already recorded for the turn survives the replacement.
    pub fn insert(&mut self, mut state: TurnState) {
        if let Some(existing) = self.turns.get(&state.turn)
            && state.choice.is_none()
        {
            state.choice = existing.choice;
            state.failed = existing.failed;
        }
        self.turns.insert(state.turn, state);
    }

    /// Attach the player's choice to a recorded turn. Returns `false` when
    /// the turn was never recorded.
    pub fn record_choice(&mut self, turn: u32, kind: ActionKind, failed: bool) -> bool {
        match self.turns.get_mut(&turn) {
            Some(state) => {
                state.choice = Some(kind);
                state.failed = failed;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Everything the engine carries from one snapshot to the next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playthrough {
    pub ledger: PlaythroughLedger,
    pub vitals: VitalLedger,
    pub monitor: RecoveryMonitor,
    last_seen_turn: Option<u32>,
    full_game: bool,
}

impl Playthrough {
    /// Fresh play-through first seen at `turn`.
    ///
    /// The starting turn counts as seen even when it is an event screen, so
    /// the training screen of that same turn is a redisplay. A mid-game
    /// start only captures spending inside the capture window.
    #[must_use]
    pub fn start(turn: u32, full_game: bool, rules: &RecoveryRules) -> Self {
        let mut vitals = VitalLedger::default();
        vitals.set_capturing(!full_game && rules.captures_at(turn));
        Self {
            ledger: PlaythroughLedger::default(),
            vitals,
            monitor: RecoveryMonitor::default(),
            last_seen_turn: Some(turn),
            full_game,
        }
    }

    #[must_use]
    pub const fn last_seen_turn(&self) -> Option<u32> {
        self.last_seen_turn
    }

    pub fn mark_seen(&mut self, turn: u32) {
        self.last_seen_turn = Some(turn);
    }

    /// Whether this play-through was observed from turn 1.
    #[must_use]
    pub const fn is_full_game(&self) -> bool {
        self.full_game
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proficiency::Proficiency;
    use crate::rules::default_rules;

    fn turn_state(turn: u32) -> TurnState {
        TurnState::new(turn, [Proficiency::INITIAL; 5], [100; 5])
    }

    #[test]
    fn transitions_cover_the_three_cases() {
        assert_eq!(classify_transition(Some(4), 5), TurnTransition::Advance);
        assert_eq!(classify_transition(Some(5), 5), TurnTransition::Redisplay);
        assert_eq!(
            classify_transition(Some(9), 1),
            TurnTransition::NewPlaythrough { full: true }
        );
        assert_eq!(
            classify_transition(None, 1),
            TurnTransition::NewPlaythrough { full: true }
        );
        assert_eq!(
            classify_transition(Some(5), 9),
            TurnTransition::NewPlaythrough { full: false }
        );
        assert_eq!(
            classify_transition(Some(5), 3),
            TurnTransition::NewPlaythrough { full: false }
        );
        assert_eq!(
            classify_transition(None, 30),
            TurnTransition::NewPlaythrough { full: false }
        );
    }

    #[test]
    fn turn_one_redisplayed_is_not_a_restart() {
        assert_eq!(classify_transition(Some(1), 1), TurnTransition::Redisplay);
        let fresh = Playthrough::start(1, true, &default_rules().recovery);
        assert_eq!(
            classify_transition(fresh.last_seen_turn(), 1),
            TurnTransition::Redisplay
        );
    }

    #[test]
    fn choices_attach_to_recorded_turns() {
        let mut ledger = PlaythroughLedger::default();
        ledger.insert(turn_state(7));
        assert!(ledger.record_choice(7, ActionKind::Guts, true));
        assert!(!ledger.record_choice(8, ActionKind::Guts, false));
        let state = ledger.get(7).unwrap();
        assert_eq!(state.choice, Some(ActionKind::Guts));
        assert!(state.failed);
    }

    #[test]
    fn redisplay_keeps_the_recorded_choice() {
        let mut ledger = PlaythroughLedger::default();
        ledger.insert(turn_state(7));
        ledger.record_choice(7, ActionKind::Speed, false);
        ledger.insert(turn_state(7));
        assert_eq!(ledger.get(7).unwrap().choice, Some(ActionKind::Speed));
        ledger.insert(turn_state(8));
        assert!(ledger.get(8).unwrap().choice.is_none());
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn capture_depends_on_how_the_run_started() {
        let rules = &default_rules().recovery;
        assert!(!Playthrough::start(1, true, rules).vitals.is_capturing());
        assert!(Playthrough::start(30, false, rules).vitals.is_capturing());
        assert!(!Playthrough::start(2, false, rules).vitals.is_capturing());
        assert!(!Playthrough::start(75, false, rules).vitals.is_capturing());
        let fresh = Playthrough::start(30, false, rules);
        assert_eq!(fresh.vitals.spent(), 0);
        assert!(fresh.ledger.is_empty());
        assert!(!fresh.is_full_game());
        assert_eq!(fresh.last_seen_turn(), Some(30));
    }
}
