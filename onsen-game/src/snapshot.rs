//! Typed view of one observed turn.
//!
//! Snapshots arrive already decoded; this module only describes their shape
//! and offers the small lookups the engine needs.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::constants::{
    DIG_EFFECT_ROWS, PLAYING_STATE_EVENT, PLAYING_STATE_NORMAL, POOL_STATE_DIGGING,
    STORY_BUFF_SELECTION, STORY_TEAM_SELECTION,
};

/// Participants fit inline for the usual training roster size.
pub type Roster = SmallVec<[Participant; 6]>;

/// The five attribute trainings plus everything else a turn may offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Speed,
    Stamina,
    Power,
    Guts,
    Wisdom,
    /// Outings, PR activities and other actions without an attribute slot.
    Other,
}

impl ActionKind {
    /// Attribute trainings in attribute-slot order.
    pub const TRAININGS: [Self; 5] = [
        Self::Speed,
        Self::Stamina,
        Self::Power,
        Self::Guts,
        Self::Wisdom,
    ];

    /// Attribute slot (0..5) for trainings, `None` for other actions.
    #[must_use]
    pub const fn training_index(self) -> Option<usize> {
        match self {
            Self::Speed => Some(0),
            Self::Stamina => Some(1),
            Self::Power => Some(2),
            Self::Guts => Some(3),
            Self::Wisdom => Some(4),
            Self::Other => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Speed => "speed",
            Self::Stamina => "stamina",
            Self::Power => "power",
            Self::Guts => "guts",
            Self::Wisdom => "wisdom",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the current snapshot asks of the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStage {
    /// Regular training turn with nothing pending.
    Training,
    /// Scenario team-card selection event.
    TeamSelection,
    /// Onsen buff selection event.
    BuffSelection,
    /// Anything else; the engine does not analyze these.
    Other,
}

impl TurnStage {
    #[must_use]
    pub fn classify(playing_state: u8, pending_stories: &[u32]) -> Self {
        if playing_state == PLAYING_STATE_NORMAL && pending_stories.is_empty() {
            Self::Training
        } else if playing_state == PLAYING_STATE_EVENT
            && pending_stories.contains(&STORY_BUFF_SELECTION)
        {
            Self::BuffSelection
        } else if playing_state == PLAYING_STATE_EVENT
            && pending_stories.contains(&STORY_TEAM_SELECTION)
        {
            Self::TeamSelection
        } else {
            Self::Other
        }
    }

    #[must_use]
    pub const fn is_analyzed(self) -> bool {
        !matches!(self, Self::Other)
    }
}

/// Target of a declared parameter change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamTarget {
    Speed,
    Stamina,
    Power,
    Guts,
    Wisdom,
    Vital,
    SkillPoints,
    #[serde(other)]
    Other,
}

impl ParamTarget {
    #[must_use]
    pub const fn attribute_index(self) -> Option<usize> {
        match self {
            Self::Speed => Some(0),
            Self::Stamina => Some(1),
            Self::Power => Some(2),
            Self::Guts => Some(3),
            Self::Wisdom => Some(4),
            Self::Vital | Self::SkillPoints | Self::Other => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDelta {
    pub target: ParamTarget,
    pub value: i32,
}

/// Roster entry for an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Deck slot for support cards, staff position for NPCs.
    pub position: u32,
    #[serde(default)]
    pub is_npc: bool,
    #[serde(default)]
    pub shining: bool,
}

/// One selectable action this turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCandidate {
    pub kind: ActionKind,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub failure_rate: u8,
    #[serde(default = "default_level")]
    pub level: u8,
    #[serde(default)]
    pub participants: Roster,
    /// Parameter changes as the command table declares them.
    #[serde(default)]
    pub params: Vec<ParamDelta>,
    /// Extra parameter changes granted by the scenario command table.
    #[serde(default)]
    pub scenario_params: Vec<ParamDelta>,
    /// Dig value shown by the game for this action.
    #[serde(default)]
    pub declared_dig: i32,
}

const fn default_enabled() -> bool {
    true
}

const fn default_level() -> u8 {
    1
}

/// Current and maximum value of the five base attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Attributes {
    pub current: [i32; 5],
    pub max: [i32; 5],
}

/// Authoritative training level shown by the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingLevel {
    pub kind: ActionKind,
    pub level: u8,
}

/// Segment type classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Sand,
    Dirt,
    Rock,
    Unclassified,
}

impl SegmentKind {
    /// Types that carry dig power, in dig-effect row order.
    pub const CLASSIFIED: [Self; 3] = [Self::Sand, Self::Dirt, Self::Rock];

    /// Classify a stratum id.
    #[must_use]
    pub const fn classify(stratum_id: u32) -> Self {
        match stratum_id {
            4 | 7 | 9 | 15 | 18 => Self::Sand,
            5 | 8 | 11 | 13 | 16 | 19 => Self::Dirt,
            6 | 10 | 12 | 14 | 17 | 20 => Self::Rock,
            _ => Self::Unclassified,
        }
    }

    /// Row of the dig-effect table holding this type's power.
    #[must_use]
    pub const fn effect_row(self) -> Option<usize> {
        match self {
            Self::Sand => Some(0),
            Self::Dirt => Some(1),
            Self::Rock => Some(2),
            Self::Unclassified => None,
        }
    }

    /// Stratum id used when a type's power is needed without a concrete segment.
    #[must_use]
    pub const fn representative_stratum(self) -> Option<u32> {
        match self {
            Self::Sand => Some(4),
            Self::Dirt => Some(5),
            Self::Rock => Some(6),
            Self::Unclassified => None,
        }
    }
}

/// A typed portion of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub stratum_id: u32,
    pub remaining: u32,
}

impl Segment {
    #[must_use]
    pub const fn kind(&self) -> SegmentKind {
        SegmentKind::classify(self.stratum_id)
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.remaining > 0
    }
}

/// One hot spring and its strata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ResourcePool {
    #[serde(default)]
    pub pool_id: u32,
    pub state: u8,
    #[serde(default)]
    pub segments: Vec<Segment>,
}

impl ResourcePool {
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.state == POOL_STATE_DIGGING
    }

    #[must_use]
    pub fn total_remaining(&self) -> u64 {
        self.segments.iter().map(|s| u64::from(s.remaining)).sum()
    }

    /// Index of the first segment still holding volume.
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.segments.iter().position(Segment::is_open)
    }

    /// Index of the first open segment strictly after `index`.
    #[must_use]
    pub fn next_open_after(&self, index: usize) -> Option<usize> {
        self.segments
            .iter()
            .enumerate()
            .skip(index + 1)
            .find(|(_, s)| s.is_open())
            .map(|(i, _)| i)
    }
}

/// Dig tool row: one per segment type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigEffect {
    #[serde(default)]
    pub item_level: u8,
    pub power: i32,
}

/// Onsen buff bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BathingInfo {
    #[serde(default)]
    pub tickets: u8,
    #[serde(default)]
    pub effect_remaining: u8,
    #[serde(default)]
    pub superior_state: u8,
}

impl BathingInfo {
    #[must_use]
    pub const fn recovery_guaranteed(&self) -> bool {
        self.superior_state > 0
    }
}

/// Scenario block of the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OnsenData {
    #[serde(default)]
    pub pools: Vec<ResourcePool>,
    #[serde(default)]
    pub dig_effects: Vec<DigEffect>,
    #[serde(default)]
    pub bathing: Option<BathingInfo>,
}

impl OnsenData {
    /// The pool currently being dug, if any.
    #[must_use]
    pub fn active_pool(&self) -> Option<&ResourcePool> {
        self.pools.iter().find(|p| p.is_active())
    }

    /// Dig-effect rows, or `None` when the table is incomplete.
    #[must_use]
    pub fn dig_table(&self) -> Option<&[DigEffect]> {
        (self.dig_effects.len() >= DIG_EFFECT_ROWS).then_some(self.dig_effects.as_slice())
    }
}

/// Immutable view of one observed turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnSnapshot {
    pub turn: u32,
    #[serde(default = "default_playing_state")]
    pub playing_state: u8,
    #[serde(default)]
    pub pending_stories: Vec<u32>,
    /// Stories that fired since the previous snapshot.
    #[serde(default)]
    pub recent_stories: Vec<u32>,
    #[serde(default)]
    pub trainee_chara_id: u32,
    /// Support card ids of the deck.
    #[serde(default)]
    pub deck: Vec<u32>,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub skill_points: i32,
    pub vital: i32,
    pub max_vital: i32,
    #[serde(default)]
    pub motivation: u8,
    #[serde(default)]
    pub actions: Vec<ActionCandidate>,
    #[serde(default)]
    pub training_levels: Vec<TrainingLevel>,
    #[serde(default)]
    pub onsen: Option<OnsenData>,
}

const fn default_playing_state() -> u8 {
    PLAYING_STATE_NORMAL
}

impl TurnSnapshot {
    #[must_use]
    pub fn stage(&self) -> TurnStage {
        TurnStage::classify(self.playing_state, &self.pending_stories)
    }

    #[must_use]
    pub const fn is_normal_state(&self) -> bool {
        self.playing_state == PLAYING_STATE_NORMAL
    }

    #[must_use]
    pub fn action(&self, kind: ActionKind) -> Option<&ActionCandidate> {
        self.actions.iter().find(|a| a.kind == kind)
    }

    #[must_use]
    pub fn active_pool(&self) -> Option<&ResourcePool> {
        self.onsen.as_ref().and_then(OnsenData::active_pool)
    }

    #[must_use]
    pub fn bathing(&self) -> Option<BathingInfo> {
        self.onsen.as_ref().and_then(|o| o.bathing)
    }

    #[must_use]
    pub fn enabled_actions(&self) -> usize {
        self.actions.iter().filter(|a| a.enabled).count()
    }
}
