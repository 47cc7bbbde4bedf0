//! Turn engine: folds one snapshot into the play-through and reports on it.
//!
//! The engine owns all cross-turn state. A snapshot that starts a new
//! play-through gets a completely fresh state before any calculation runs.
use serde::{Deserialize, Serialize};

use crate::bonus::LinkBonuses;
use crate::constants::SKILL_POINT_WARNING;
use crate::extraction::{DigPowers, Extraction, compute_extraction};
use crate::gains::{ActionGains, revise_over_1200};
use crate::playthrough::{Playthrough, TurnTransition, classify_transition};
use crate::prediction::{Prediction, predict_remaining_turns, weighted_power};
use crate::proficiency::{LevelMismatch, Proficiency, TurnState, advance, reconcile};
use crate::recovery::{RecoveryEvent, action_probability};
use crate::result_log::RecoveryRecord;
use crate::roster::{CardCatalog, CharacterResolver, LinkRoster, friend_rarity, support_count};
use crate::rules::ScenarioRules;
use crate::snapshot::{ActionCandidate, ActionKind, OnsenData, TurnSnapshot, TurnStage};

/// Non-fatal observations about a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum TurnWarning {
    /// The turn does not follow the last one seen; state was rebuilt.
    Discontinuity { previous: Option<u32>, turn: u32 },
    /// Event or shop screen showing an already counted turn.
    RepeatTurn,
    /// At most one action can be taken this turn.
    NoTraining,
    /// Skill points are close to the cap.
    SkillPointsHigh { skill_points: i32 },
}

/// Derived numbers for one selectable action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionReport {
    pub kind: ActionKind,
    pub enabled: bool,
    pub failure_rate: u8,
    /// Level the game shows on the action.
    pub declared_level: u8,
    /// Tracked proficiency; `None` for non-training actions.
    pub proficiency: Option<Proficiency>,
    pub support_count: u32,
    pub shining_count: u32,
    /// Units this training would dig; `None` for non-training actions.
    pub extraction: Option<Extraction>,
    pub declared_dig: i32,
    pub gains: ActionGains,
    pub recovery_probability: f64,
}

/// Everything derived from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnReport {
    pub turn: u32,
    pub stage: TurnStage,
    pub transition: TurnTransition,
    pub actions: Vec<ActionReport>,
    /// Sum of the revised attributes.
    pub attribute_total: i32,
    /// Attribute change since the previous recorded turn, per slot.
    pub realized_gains: Option<[i32; 5]>,
    pub skill_points: i32,
    pub vital: i32,
    pub max_vital: i32,
    pub dig_powers: DigPowers,
    pub remaining_volume: u64,
    pub weighted_power: i32,
    /// Omitted once the dig window has closed.
    pub prediction: Option<Prediction>,
    pub dig_window_closed: bool,
    pub vital_spent: i32,
    pub recovery_guaranteed: bool,
    pub buff_is_super: bool,
    pub recovery_event: Option<RecoveryEvent>,
    pub reconciliation: Vec<LevelMismatch>,
    pub warnings: Vec<TurnWarning>,
}

impl TurnReport {
    /// Result log entry for a trigger no friend story explains.
    #[must_use]
    pub fn recovery_record(&self) -> Option<RecoveryRecord> {
        self.recovery_event.and_then(|event| event.record())
    }

    #[must_use]
    pub fn action(&self, kind: ActionKind) -> Option<&ActionReport> {
        self.actions.iter().find(|a| a.kind == kind)
    }

    #[must_use]
    pub fn has_mismatch(&self) -> bool {
        !self.reconciliation.is_empty()
    }
}

/// Stateful analyzer fed one snapshot at a time.
#[derive(Debug, Clone)]
pub struct TurnEngine<R = CardCatalog> {
    rules: ScenarioRules,
    resolver: R,
    playthrough: Option<Playthrough>,
}

impl<R> TurnEngine<R>
where
    R: CharacterResolver,
{
    #[must_use]
    pub const fn new(rules: ScenarioRules, resolver: R) -> Self {
        Self {
            rules,
            resolver,
            playthrough: None,
        }
    }

    #[must_use]
    pub const fn rules(&self) -> &ScenarioRules {
        &self.rules
    }

    #[must_use]
    pub const fn playthrough(&self) -> Option<&Playthrough> {
        self.playthrough.as_ref()
    }

    /// Record what the player did on `turn`. Returns `false` when the turn
    /// is unknown to the running play-through.
    pub fn record_choice(&mut self, turn: u32, kind: ActionKind, failed: bool) -> bool {
        self.playthrough
            .as_mut()
            .is_some_and(|p| p.ledger.record_choice(turn, kind, failed))
    }

    /// Add vital spending reported by the caller.
    pub fn record_vital_spent(&mut self, amount: i32) {
        if let Some(playthrough) = self.playthrough.as_mut() {
            playthrough.vitals.record_spend(amount);
        }
    }

    /// Fold `snapshot` into the play-through.
    ///
    /// Returns `None` for stages the engine does not analyze and for turns
    /// outside the calendar; the latter also drop the play-through.
    pub fn observe(&mut self, snapshot: &TurnSnapshot) -> Option<TurnReport> {
        let turn = snapshot.turn;
        if turn == 0 || turn > self.rules.horizon_turns {
            log::warn!("turn {turn} is outside the calendar; dropping play-through state");
            self.playthrough = None;
            return None;
        }
        let stage = snapshot.stage();
        if !stage.is_analyzed() {
            log::debug!("turn {turn}: stage not analyzed");
            return None;
        }

        let mut warnings = Vec::new();
        let last_seen = self.playthrough.as_ref().and_then(Playthrough::last_seen_turn);
        let transition = classify_transition(last_seen, turn);
        if let TurnTransition::NewPlaythrough { full } = transition {
            if full {
                log::info!("play-through started at turn 1");
            } else {
                log::warn!("turn jumped from {last_seen:?} to {turn}; starting a partial play-through");
                warnings.push(TurnWarning::Discontinuity {
                    previous: last_seen,
                    turn,
                });
            }
            self.playthrough = Some(Playthrough::start(turn, full, &self.rules.recovery));
        }
        let rules = &self.rules;
        let resolver = &self.resolver;
        let playthrough = self.playthrough.get_or_insert_with(|| {
            Playthrough::start(turn, false, &rules.recovery)
        });

        let rarity = friend_rarity(rules, resolver, &snapshot.deck);
        let friend_present = rarity != 0;
        let bathing = snapshot.bathing();
        let recovery_event = playthrough.monitor.observe(
            turn,
            bathing,
            &snapshot.recent_stories,
            rarity,
            &mut playthrough.vitals,
            &rules.recovery,
        );

        if snapshot.is_normal_state() {
            playthrough.vitals.observe_vital(snapshot.vital);
            playthrough.mark_seen(turn);
        } else {
            warnings.push(TurnWarning::RepeatTurn);
        }
        if turn == rules.recovery.capture_start_turn {
            playthrough.vitals.set_capturing(true);
        }

        let previous = turn
            .checked_sub(1)
            .and_then(|last| playthrough.ledger.get(last));
        let realized_gains =
            previous.map(|p| attribute_deltas(&p.attributes, &snapshot.attributes.current));
        let mut tracked = advance(previous, turn, &rules.proficiency);
        let reconciliation = if turn > 1 {
            reconcile(
                &mut tracked,
                &snapshot.training_levels,
                stage,
                &rules.proficiency,
            )
        } else {
            Vec::new()
        };
        if stage == TurnStage::Training {
            playthrough
                .ledger
                .insert(TurnState::new(turn, tracked, snapshot.attributes.current));
        }

        let pool = snapshot.active_pool();
        let roster = LinkRoster::new(snapshot.trainee_chara_id, &snapshot.deck);
        let bonuses = LinkBonuses::evaluate(rules, resolver, &roster);
        let table = snapshot.onsen.as_ref().and_then(OnsenData::dig_table);
        let dig_powers = DigPowers::resolve(table, bonuses);

        let actions = snapshot
            .actions
            .iter()
            .map(|candidate| {
                let slot = candidate.kind.training_index();
                let support = support_count(rules, &candidate.participants);
                let gains = ActionGains::of(candidate, snapshot);
                ActionReport {
                    kind: candidate.kind,
                    enabled: candidate.enabled,
                    failure_rate: candidate.failure_rate,
                    declared_level: candidate.level,
                    proficiency: slot.map(|s| tracked[s]),
                    support_count: support,
                    shining_count: shining_count(candidate),
                    extraction: slot.map(|_| compute_extraction(support, pool, &dig_powers)),
                    declared_dig: candidate.declared_dig,
                    recovery_probability: action_probability(
                        &playthrough.vitals,
                        gains.vital,
                        friend_present,
                        bathing,
                        &rules.recovery,
                    ),
                    gains,
                }
            })
            .collect();

        let weighted = weighted_power(pool, &dig_powers);
        let dig_window_closed = turn >= rules.prediction.dig_window_close_turn;
        let prediction = (!dig_window_closed)
            .then(|| predict_remaining_turns(pool, weighted, turn, &rules.prediction));

        if snapshot.enabled_actions() <= 1 {
            warnings.push(TurnWarning::NoTraining);
        }
        if snapshot.skill_points > SKILL_POINT_WARNING {
            warnings.push(TurnWarning::SkillPointsHigh {
                skill_points: snapshot.skill_points,
            });
        }

        Some(TurnReport {
            turn,
            stage,
            transition,
            actions,
            attribute_total: snapshot
                .attributes
                .current
                .iter()
                .map(|&v| revise_over_1200(v))
                .sum(),
            realized_gains,
            skill_points: snapshot.skill_points,
            vital: snapshot.vital,
            max_vital: snapshot.max_vital,
            dig_powers,
            remaining_volume: pool.map_or(0, |p| p.total_remaining()),
            weighted_power: weighted,
            prediction,
            dig_window_closed,
            vital_spent: playthrough.vitals.spent(),
            recovery_guaranteed: bathing.is_some_and(|b| b.recovery_guaranteed()),
            buff_is_super: playthrough.monitor.buff_is_super(),
            recovery_event,
            reconciliation,
            warnings,
        })
    }
}

fn attribute_deltas(before: &[i32; 5], after: &[i32; 5]) -> [i32; 5] {
    std::array::from_fn(|slot| after[slot].saturating_sub(before[slot]))
}

fn shining_count(candidate: &ActionCandidate) -> u32 {
    let count = candidate.participants.iter().filter(|p| p.shining).count();
    u32::try_from(count).unwrap_or(u32::MAX)
}
