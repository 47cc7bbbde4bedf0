//! Hidden training-level progression.
//!
//! The game shows each training's level but not the counter behind it. Every
//! successful use of a training adds one point; four points make a level.
//! Scripted calendar turns grant four points to every training at once. The
//! tracker rebuilds the counter from the previous turn's recorded choice and
//! corrects itself whenever the shown level disagrees.
use serde::{Deserialize, Serialize};

use crate::constants::MIN_LEVEL;
use crate::rules::ProficiencyRules;
use crate::snapshot::{ActionKind, TrainingLevel, TurnStage};

/// Level and sub-level counter of one training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proficiency {
    pub level: u8,
    pub counter: u8,
}

impl Default for Proficiency {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl Proficiency {
    pub const INITIAL: Self = Self {
        level: MIN_LEVEL,
        counter: 0,
    };

    /// Add counter points, rolling full levels over and capping at the maximum level.
    #[must_use]
    pub fn progressed(self, points: u8, rules: &ProficiencyRules) -> Self {
        let per_level = rules.counter_per_level.max(1);
        let mut level = self.level;
        let mut counter = self.counter.saturating_add(points);
        while counter >= per_level {
            counter -= per_level;
            level = level.saturating_add(1);
        }
        Self { level, counter }.capped(rules)
    }

    /// Clamp into the representable range; the top level carries no counter.
    #[must_use]
    pub fn capped(self, rules: &ProficiencyRules) -> Self {
        if self.is_maxed(rules) {
            Self {
                level: rules.max_level,
                counter: 0,
            }
        } else {
            Self {
                level: self.level.max(MIN_LEVEL),
                counter: self.counter,
            }
        }
    }

    #[must_use]
    pub fn is_maxed(&self, rules: &ProficiencyRules) -> bool {
        self.level >= rules.max_level
    }
}

/// Proficiency of all five trainings in attribute-slot order.
pub type ProficiencySet = [Proficiency; 5];

/// What the engine remembers about one turn of a play-through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    pub turn: u32,
    pub proficiency: ProficiencySet,
    /// Training the player picked this turn, once known.
    #[serde(default)]
    pub choice: Option<ActionKind>,
    #[serde(default)]
    pub failed: bool,
    #[serde(default)]
    pub attributes: [i32; 5],
}

impl TurnState {
    #[must_use]
    pub fn new(turn: u32, proficiency: ProficiencySet, attributes: [i32; 5]) -> Self {
        Self {
            turn,
            proficiency,
            choice: None,
            failed: false,
            attributes,
        }
    }

    /// Whether `kind` was trained successfully this turn.
    #[must_use]
    pub fn trained(&self, kind: ActionKind) -> bool {
        self.choice == Some(kind) && !self.failed
    }
}

/// Carry last turn's proficiency into `turn`.
///
/// Turn 1 always starts every training at level 1. A missing previous turn
/// carries level 1 with no progress.
#[must_use]
pub fn advance(
    previous: Option<&TurnState>,
    turn: u32,
    rules: &ProficiencyRules,
) -> ProficiencySet {
    if turn <= 1 {
        return [Proficiency::INITIAL; 5];
    }
    let last_turn = turn - 1;
    let frozen = rules.is_frozen(last_turn);
    let milestone = rules.is_milestone(turn);

    let mut next = [Proficiency::INITIAL; 5];
    for (slot, kind) in ActionKind::TRAININGS.iter().enumerate() {
        let carried = previous.map_or(Proficiency::INITIAL, |p| p.proficiency[slot]);
        let earned = previous.is_some_and(|p| p.trained(*kind)) && !frozen;
        let mut state = carried.progressed(u8::from(earned), rules);
        if milestone {
            state = state.progressed(rules.milestone_bonus, rules);
        }
        next[slot] = state;
    }
    next
}

/// Tracked level that disagreed with the level the game shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelMismatch {
    pub kind: ActionKind,
    pub predicted: Proficiency,
    pub actual: u8,
}

/// Overwrite tracked levels with the game's levels where they disagree.
///
/// Only regular training turns carry trustworthy levels; other stages leave
/// the tracked state untouched.
pub fn reconcile(
    tracked: &mut ProficiencySet,
    ground_truth: &[TrainingLevel],
    stage: TurnStage,
    rules: &ProficiencyRules,
) -> Vec<LevelMismatch> {
    if stage != TurnStage::Training {
        return Vec::new();
    }
    let mut mismatches = Vec::new();
    for (slot, kind) in ActionKind::TRAININGS.iter().enumerate() {
        let Some(actual) = ground_truth.iter().find(|l| l.kind == *kind).map(|l| l.level) else {
            continue;
        };
        let predicted = tracked[slot];
        if predicted.level == actual {
            continue;
        }
        log::warn!(
            "training level drift on {kind}: tracked lv{}(+{}), game shows lv{actual}",
            predicted.level,
            predicted.counter
        );
        tracked[slot] = Proficiency {
            level: actual,
            counter: 0,
        }
        .capped(rules);
        mismatches.push(LevelMismatch {
            kind: *kind,
            predicted,
            actual,
        });
    }
    mismatches
}
