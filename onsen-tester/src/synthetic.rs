//! Seeded synthetic play-throughs checked against engine invariants.
use onsen_game::{
    ActionCandidate, ActionKind, Attributes, BathingInfo, CharacterResolver, DigEffect, OnsenData,
    ParamDelta, ParamTarget, Participant, Prediction, RecoveryRecord, ResourcePool, ResultSink,
    Segment, TurnEngine, TurnReport, TurnSnapshot,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

const STRATA: [u32; 9] = [4, 5, 6, 7, 8, 10, 11, 12, 15];
const DECK: [u32; 6] = [30_028, 20_052, 30_190, 20_033, 30_076, 10_061];

#[derive(Debug, Clone, Serialize)]
pub struct SyntheticResult {
    pub seed: u64,
    pub run: u32,
    pub turns_analyzed: u32,
    pub units_dug: u64,
    pub first_prediction: Option<Prediction>,
    pub records: Vec<RecoveryRecord>,
    pub failures: Vec<String>,
    pub passed: bool,
}

/// Per-run RNG seed derived from the user seed and run index.
#[must_use]
pub fn run_seed(seed: u64, run: u32) -> u64 {
    seed.wrapping_mul(0x9E37_79B9_7F4A_7C15)
        .wrapping_add(u64::from(run))
}

/// Simulated game state the snapshots are drawn from.
struct World {
    rng: ChaCha8Rng,
    pool: ResourcePool,
    vital: i32,
    skill_points: i32,
    attributes: [i32; 5],
    bathing: BathingInfo,
}

impl World {
    fn new(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let segments = (0..rng.gen_range(3..=6))
            .map(|_| Segment {
                stratum_id: STRATA[rng.gen_range(0..STRATA.len())],
                remaining: rng.gen_range(20..=400),
            })
            .collect();
        Self {
            pool: ResourcePool {
                pool_id: 1,
                state: 2,
                segments,
            },
            vital: 100,
            skill_points: 120,
            attributes: [100; 5],
            bathing: BathingInfo {
                tickets: 1,
                effect_remaining: 0,
                superior_state: 0,
            },
            rng,
        }
    }

    fn candidate(&mut self, kind: ActionKind) -> ActionCandidate {
        let supports = self.rng.gen_range(0..=4u32);
        let mut participants: onsen_game::snapshot::Roster = (1..=supports)
            .map(|position| Participant {
                position,
                is_npc: false,
                shining: self.rng.gen_bool(0.3),
            })
            .collect();
        if self.rng.gen_bool(0.2) {
            participants.push(Participant {
                position: self.rng.gen_range(102..=103),
                is_npc: true,
                shining: false,
            });
        }
        let target = match kind {
            ActionKind::Speed => ParamTarget::Speed,
            ActionKind::Stamina => ParamTarget::Stamina,
            ActionKind::Power => ParamTarget::Power,
            ActionKind::Guts => ParamTarget::Guts,
            ActionKind::Wisdom | ActionKind::Other => ParamTarget::Wisdom,
        };
        let vital: i32 = if kind == ActionKind::Wisdom {
            self.rng.gen_range(0..=5)
        } else {
            -self.rng.gen_range(15..=25)
        };
        ActionCandidate {
            kind,
            enabled: self.rng.gen_bool(0.95),
            failure_rate: self.rng.gen_range(0..=30),
            level: 1,
            participants,
            params: vec![
                ParamDelta {
                    target,
                    value: self.rng.gen_range(5..=40),
                },
                ParamDelta {
                    target: ParamTarget::Vital,
                    value: vital,
                },
            ],
            scenario_params: vec![ParamDelta {
                target: ParamTarget::SkillPoints,
                value: self.rng.gen_range(0..=6),
            }],
            declared_dig: 0,
        }
    }

    fn snapshot(&mut self, turn: u32) -> TurnSnapshot {
        let actions = ActionKind::TRAININGS
            .iter()
            .map(|&kind| self.candidate(kind))
            .collect();
        let dig_effects = (0..3)
            .map(|_| DigEffect {
                item_level: 1,
                power: self.rng.gen_range(0..=60),
            })
            .collect();
        TurnSnapshot {
            turn,
            playing_state: 1,
            pending_stories: Vec::new(),
            recent_stories: Vec::new(),
            trainee_chara_id: 1054,
            deck: DECK.to_vec(),
            attributes: Attributes {
                current: self.attributes,
                max: [2000; 5],
            },
            skill_points: self.skill_points,
            vital: self.vital,
            max_vital: 100,
            motivation: 3,
            actions,
            training_levels: Vec::new(),
            onsen: Some(OnsenData {
                pools: vec![self.pool.clone()],
                dig_effects,
                bathing: Some(self.bathing),
            }),
        }
    }

    /// Remove `units` from the pool front to back.
    fn dig(&mut self, mut units: u32) -> u32 {
        let mut dug = 0;
        for segment in &mut self.pool.segments {
            let taken = units.min(segment.remaining);
            segment.remaining -= taken;
            units -= taken;
            dug += taken;
        }
        dug
    }

    fn step(&mut self, report: &TurnReport) -> (ActionKind, bool, u32) {
        let kind = ActionKind::TRAININGS[self.rng.gen_range(0..5)];
        let failed = self.rng.gen_bool(0.05);
        let action = report.action(kind);
        let mut dug = 0;
        if !failed && let Some(action) = action {
            for (slot, gain) in action.gains.attributes.iter().enumerate() {
                self.attributes[slot] = self.attributes[slot].saturating_add(*gain);
            }
            self.skill_points = self.skill_points.saturating_add(action.gains.skill_points);
            if let Some(extraction) = action.extraction {
                dug = self.dig(extraction.units);
            }
        }
        let drift: i32 = self.rng.gen_range(-25..=15);
        self.vital = (self.vital + drift).clamp(0, 100);

        if self.bathing.effect_remaining > 0 {
            self.bathing.effect_remaining -= 1;
        } else if self.bathing.tickets > 0 && self.rng.gen_bool(0.15) {
            self.bathing.tickets -= 1;
            self.bathing.effect_remaining = 2;
            self.bathing.superior_state = 0;
        }
        if self.bathing.superior_state == 0 && self.rng.gen_bool(0.05) {
            self.bathing.superior_state = 1;
            self.bathing.tickets = self.bathing.tickets.saturating_add(1);
        }
        if self.rng.gen_bool(0.1) {
            self.bathing.tickets = self.bathing.tickets.saturating_add(1).min(3);
        }
        (kind, failed, dug)
    }
}

/// Check one report against the pool it was computed from.
fn check_report(report: &TurnReport, pool: &ResourcePool, failures: &mut Vec<String>) {
    let turn = report.turn;
    let open: Vec<u32> = pool
        .segments
        .iter()
        .map(|s| s.remaining)
        .filter(|&v| v > 0)
        .collect();
    let dig_bound: u32 = open.iter().take(2).sum();

    for action in &report.actions {
        if let Some(p) = action.proficiency {
            if !(1..=5).contains(&p.level) || p.counter > 3 || (p.level == 5 && p.counter != 0) {
                failures.push(format!("turn {turn}: {} proficiency {p:?}", action.kind));
            }
        }
        if let Some(extraction) = action.extraction {
            if extraction.units > dig_bound {
                failures.push(format!(
                    "turn {turn}: {} digs {} past the two open segments ({dig_bound})",
                    action.kind, extraction.units
                ));
            }
            if extraction.overflow > extraction.units {
                failures.push(format!("turn {turn}: {} overflow exceeds units", action.kind));
            }
            if extraction.crossed_boundary() && open.len() < 2 {
                failures.push(format!(
                    "turn {turn}: {} overflows with no second open segment",
                    action.kind
                ));
            }
        }
        if !(0.0..=1.0).contains(&action.recovery_probability) {
            failures.push(format!(
                "turn {turn}: {} recovery probability {}",
                action.kind, action.recovery_probability
            ));
        }
    }

    match report.prediction {
        None if !report.dig_window_closed => {
            failures.push(format!("turn {turn}: prediction missing in the dig window"));
        }
        Some(_) if report.dig_window_closed => {
            failures.push(format!("turn {turn}: prediction after the dig window"));
        }
        Some(Prediction::AlreadyDone) if report.remaining_volume > 0 => {
            failures.push(format!("turn {turn}: done with volume left"));
        }
        Some(Prediction::Turns(0)) => {
            failures.push(format!("turn {turn}: zero-turn prediction"));
        }
        Some(Prediction::Turns(_)) if report.remaining_volume == 0 => {
            failures.push(format!("turn {turn}: turns predicted for an empty pool"));
        }
        _ => {}
    }

    if turn > 1 && report.realized_gains.is_none() {
        failures.push(format!("turn {turn}: no attribute gains against the previous turn"));
    }
    if report.vital_spent < 0 {
        failures.push(format!("turn {turn}: negative vital spent"));
    }
    if let Some(record) = report.recovery_record()
        && (record.turn != turn || record.spent_before < 0 || record.spent_after < 0)
    {
        failures.push(format!("turn {turn}: malformed recovery record {record:?}"));
    }
}

/// Play one synthetic game from turn 1 to the horizon.
pub fn run_synthetic<R, S>(
    engine: &mut TurnEngine<R>,
    seed: u64,
    run: u32,
    sink: &mut S,
) -> SyntheticResult
where
    R: CharacterResolver,
    S: ResultSink,
    S::Error: std::fmt::Display,
{
    let mut world = World::new(run_seed(seed, run));
    let horizon = engine.rules().horizon_turns;
    let mut result = SyntheticResult {
        seed,
        run,
        turns_analyzed: 0,
        units_dug: 0,
        first_prediction: None,
        records: Vec::new(),
        failures: Vec::new(),
        passed: false,
    };

    for turn in 1..=horizon {
        let snapshot = world.snapshot(turn);
        let Some(report) = engine.observe(&snapshot) else {
            result.failures.push(format!("turn {turn}: no report"));
            continue;
        };
        result.turns_analyzed += 1;
        if turn == 1 {
            result.first_prediction = report.prediction;
        }
        check_report(&report, &world.pool, &mut result.failures);
        if let Some(record) = report.recovery_record() {
            if let Err(err) = sink.append(&record) {
                log::error!("could not append recovery record: {err}");
            }
            result.records.push(record);
        }

        let (kind, failed, dug) = world.step(&report);
        result.units_dug += u64::from(dug);
        if !engine.record_choice(turn, kind, failed) {
            result
                .failures
                .push(format!("turn {turn}: choice was not recorded"));
        }
    }

    let tracked = engine.playthrough().map_or(0, |p| p.ledger.len());
    if u32::try_from(tracked).ok() != Some(horizon) {
        result
            .failures
            .push(format!("ledger holds {tracked} turns, expected {horizon}"));
    }
    result.passed = result.failures.is_empty();
    log::debug!(
        "seed {seed} run {run}: {} failures, {} units dug",
        result.failures.len(),
        result.units_dug
    );
    result
}
