//! Scenario rule tables: link characters, calendar milestones, recovery odds.
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

use crate::constants::{
    ASSUMED_SUPPORT_COUNT, CAPTURE_END_TURN, CAPTURE_START_TURN, COUNTER_PER_LEVEL,
    DIG_WINDOW_CLOSE_TURN, DIRECTOR_POSITION, FRIEND_CHARA_ID, FRIEND_RECOVERY_STORIES,
    FROZEN_TURN_RANGES, HORIZON_TURNS, LINK_BONUS_PERCENT, LINK_DIRT_CHARS, LINK_ROCK_CHARS,
    LINK_SAND_CHARS, MAX_LEVEL, MILESTONE_COUNTER_BONUS, MILESTONE_TURNS, PARTICIPATION_RATE,
    RECOVERY_PROBABILITIES, REPORTER_POSITION, THRESHOLD_WITH_FRIEND, THRESHOLD_WITHOUT_FRIEND,
};
use crate::snapshot::SegmentKind;

const DEFAULT_RULES_DATA: &str = include_str!("../assets/rules.json");

/// Errors raised when a rules file is malformed or violates its bounds.
#[derive(Debug, Error)]
pub enum RulesError {
    #[error("rules file could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must be between {min} and {max} (got {value})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("turn range {start}..={end} is inverted")]
    InvertedTurnRange { start: u32, end: u32 },
    #[error("prediction.horizon_turns ({prediction}) must match horizon_turns ({calendar})")]
    HorizonMismatch { calendar: u32, prediction: u32 },
}

/// Inclusive turn range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRange {
    pub start: u32,
    pub end: u32,
}

impl TurnRange {
    #[must_use]
    pub const fn contains(&self, turn: u32) -> bool {
        turn >= self.start && turn <= self.end
    }
}

/// Characters whose presence adds dig power on a segment type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkRules {
    pub sand: Vec<u32>,
    pub dirt: Vec<u32>,
    pub rock: Vec<u32>,
    pub bonus_percent: i32,
}

impl Default for LinkRules {
    fn default() -> Self {
        Self {
            sand: LINK_SAND_CHARS.to_vec(),
            dirt: LINK_DIRT_CHARS.to_vec(),
            rock: LINK_ROCK_CHARS.to_vec(),
            bonus_percent: LINK_BONUS_PERCENT,
        }
    }
}

impl LinkRules {
    /// Qualifying characters for a segment type; empty for unclassified segments.
    #[must_use]
    pub fn qualifying(&self, kind: SegmentKind) -> &[u32] {
        match kind {
            SegmentKind::Sand => self.sand.as_slice(),
            SegmentKind::Dirt => self.dirt.as_slice(),
            SegmentKind::Rock => self.rock.as_slice(),
            SegmentKind::Unclassified => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProficiencyRules {
    pub milestone_turns: Vec<u32>,
    pub frozen_ranges: Vec<TurnRange>,
    pub max_level: u8,
    pub counter_per_level: u8,
    pub milestone_bonus: u8,
}

impl Default for ProficiencyRules {
    fn default() -> Self {
        Self {
            milestone_turns: MILESTONE_TURNS.to_vec(),
            frozen_ranges: FROZEN_TURN_RANGES
                .iter()
                .map(|&(start, end)| TurnRange { start, end })
                .collect(),
            max_level: MAX_LEVEL,
            counter_per_level: COUNTER_PER_LEVEL,
            milestone_bonus: MILESTONE_COUNTER_BONUS,
        }
    }
}

impl ProficiencyRules {
    #[must_use]
    pub fn is_milestone(&self, turn: u32) -> bool {
        self.milestone_turns.contains(&turn)
    }

    #[must_use]
    pub fn is_frozen(&self, turn: u32) -> bool {
        self.frozen_ranges.iter().any(|r| r.contains(turn))
    }
}

/// Forward-looking assumptions for the completion estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionAssumptions {
    pub assumed_support_count: u32,
    pub participation_rate: f64,
    pub horizon_turns: u32,
    pub dig_window_close_turn: u32,
}

impl Default for PredictionAssumptions {
    fn default() -> Self {
        Self {
            assumed_support_count: ASSUMED_SUPPORT_COUNT,
            participation_rate: PARTICIPATION_RATE,
            horizon_turns: HORIZON_TURNS,
            dig_window_close_turn: DIG_WINDOW_CLOSE_TURN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryRules {
    pub friend_chara_id: u32,
    pub threshold_with_friend: f64,
    pub threshold_without_friend: f64,
    pub probabilities: [u32; 6],
    pub friend_recovery_stories: Vec<u32>,
    pub capture_start_turn: u32,
    pub capture_end_turn: u32,
}

impl Default for RecoveryRules {
    fn default() -> Self {
        Self {
            friend_chara_id: FRIEND_CHARA_ID,
            threshold_with_friend: THRESHOLD_WITH_FRIEND,
            threshold_without_friend: THRESHOLD_WITHOUT_FRIEND,
            probabilities: RECOVERY_PROBABILITIES,
            friend_recovery_stories: FRIEND_RECOVERY_STORIES.to_vec(),
            capture_start_turn: CAPTURE_START_TURN,
            capture_end_turn: CAPTURE_END_TURN,
        }
    }
}

impl RecoveryRules {
    #[must_use]
    pub const fn threshold(&self, friend_present: bool) -> f64 {
        if friend_present {
            self.threshold_with_friend
        } else {
            self.threshold_without_friend
        }
    }

    /// Whether a mid-game start falls inside the spending capture window.
    #[must_use]
    pub const fn captures_at(&self, turn: u32) -> bool {
        turn >= self.capture_start_turn && turn <= self.capture_end_turn
    }
}

/// Complete rule set for the scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRules {
    #[serde(default = "default_horizon")]
    pub horizon_turns: u32,
    #[serde(default)]
    pub link: LinkRules,
    #[serde(default = "default_staff_positions")]
    pub staff_positions: Vec<u32>,
    #[serde(default)]
    pub proficiency: ProficiencyRules,
    #[serde(default)]
    pub prediction: PredictionAssumptions,
    #[serde(default)]
    pub recovery: RecoveryRules,
}

fn default_horizon() -> u32 {
    HORIZON_TURNS
}

fn default_staff_positions() -> Vec<u32> {
    vec![DIRECTOR_POSITION, REPORTER_POSITION]
}

impl Default for ScenarioRules {
    fn default() -> Self {
        Self {
            horizon_turns: default_horizon(),
            link: LinkRules::default(),
            staff_positions: default_staff_positions(),
            proficiency: ProficiencyRules::default(),
            prediction: PredictionAssumptions::default(),
            recovery: RecoveryRules::default(),
        }
    }
}

impl ScenarioRules {
    /// Load the rules bundled with the crate, falling back to compiled defaults.
    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_RULES_DATA).unwrap_or_default()
    }

    /// Parse and validate a rules document.
    ///
    /// # Errors
    ///
    /// Returns `RulesError` when the JSON is malformed or a field is out of bounds.
    pub fn from_json(json: &str) -> Result<Self, RulesError> {
        let rules: Self = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Validate rule bounds.
    ///
    /// # Errors
    ///
    /// Returns `RulesError` when any field violates the documented bounds.
    pub fn validate(&self) -> Result<(), RulesError> {
        check_range("horizon_turns", f64::from(self.horizon_turns), 1.0, 1000.0)?;
        if self.prediction.horizon_turns != self.horizon_turns {
            return Err(RulesError::HorizonMismatch {
                calendar: self.horizon_turns,
                prediction: self.prediction.horizon_turns,
            });
        }
        check_range(
            "proficiency.max_level",
            f64::from(self.proficiency.max_level),
            1.0,
            f64::from(u8::MAX),
        )?;
        check_range(
            "proficiency.counter_per_level",
            f64::from(self.proficiency.counter_per_level),
            1.0,
            f64::from(u8::MAX),
        )?;
        check_range(
            "prediction.participation_rate",
            self.prediction.participation_rate,
            f64::MIN_POSITIVE,
            1.0,
        )?;
        check_range(
            "recovery.threshold_with_friend",
            self.recovery.threshold_with_friend,
            f64::MIN_POSITIVE,
            f64::MAX,
        )?;
        check_range(
            "recovery.threshold_without_friend",
            self.recovery.threshold_without_friend,
            f64::MIN_POSITIVE,
            f64::MAX,
        )?;
        for probability in self.recovery.probabilities {
            check_range("recovery.probabilities", f64::from(probability), 0.0, 100.0)?;
        }
        for range in &self.proficiency.frozen_ranges {
            if range.start > range.end {
                return Err(RulesError::InvertedTurnRange {
                    start: range.start,
                    end: range.end,
                });
            }
        }
        if self.recovery.capture_start_turn > self.recovery.capture_end_turn {
            return Err(RulesError::InvertedTurnRange {
                start: self.recovery.capture_start_turn,
                end: self.recovery.capture_end_turn,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn is_staff_position(&self, position: u32) -> bool {
        self.staff_positions.contains(&position)
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), RulesError> {
    if value.is_nan() || value < min || value > max {
        return Err(RulesError::RangeViolation {
            field,
            min,
            max,
            value,
        });
    }
    Ok(())
}

/// Shared bundled rules.
#[must_use]
pub fn default_rules() -> &'static ScenarioRules {
    static RULES: OnceLock<ScenarioRules> = OnceLock::new();
    RULES.get_or_init(ScenarioRules::load_from_static)
}
