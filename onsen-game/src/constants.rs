//! Centralized scenario constants for the onsen dig analysis.
//!
//! These values mirror the fixed rules of the scenario calendar and the dig
//! mini-game. `ScenarioRules` uses them as serde defaults so a rules file
//! only needs to name the fields it overrides.

// Calendar -----------------------------------------------------------------
pub(crate) const HORIZON_TURNS: u32 = 78;
pub(crate) const DIG_WINDOW_CLOSE_TURN: u32 = 72;
pub(crate) const MILESTONE_TURNS: [u32; 3] = [25, 37, 49];
pub(crate) const FROZEN_TURN_RANGES: [(u32, u32); 2] = [(37, 40), (61, 64)];

// Proficiency --------------------------------------------------------------
pub(crate) const MIN_LEVEL: u8 = 1;
pub(crate) const MAX_LEVEL: u8 = 5;
pub(crate) const COUNTER_PER_LEVEL: u8 = 4;
pub(crate) const MILESTONE_COUNTER_BONUS: u8 = 4;

// Dig ----------------------------------------------------------------------
pub(crate) const DIG_BASE_VALUE: i64 = 25;
pub(crate) const POOL_STATE_DIGGING: u8 = 2;
pub(crate) const DIG_EFFECT_ROWS: usize = 3;
pub(crate) const LINK_BONUS_PERCENT: i32 = 10;
pub(crate) const LINK_SAND_CHARS: [u32; 1] = [1003];
pub(crate) const LINK_DIRT_CHARS: [u32; 2] = [1026, 1080];
pub(crate) const LINK_ROCK_CHARS: [u32; 2] = [1099, 1100];
pub(crate) const DIRECTOR_POSITION: u32 = 102;
pub(crate) const REPORTER_POSITION: u32 = 103;

// Prediction ---------------------------------------------------------------
pub(crate) const ASSUMED_SUPPORT_COUNT: u32 = 2;
pub(crate) const PARTICIPATION_RATE: f64 = 0.75;

// Recovery -----------------------------------------------------------------
pub(crate) const FRIEND_CHARA_ID: u32 = 9050;
pub(crate) const CARD_RARITY_DIVISOR: u32 = 10_000;
pub(crate) const THRESHOLD_WITH_FRIEND: f64 = 42.5;
pub(crate) const THRESHOLD_WITHOUT_FRIEND: f64 = 50.0;
pub(crate) const RECOVERY_PROBABILITIES: [u32; 6] = [0, 10, 20, 30, 40, 100];
pub(crate) const RANK_DAMPENING: f64 = 4.0;
pub(crate) const FRIEND_RECOVERY_STORIES: [u32; 5] =
    [809_050_011, 809_050_012, 809_050_013, 809_050_014, 809_050_015];
pub(crate) const CAPTURE_START_TURN: u32 = 3;
pub(crate) const CAPTURE_END_TURN: u32 = 72;
pub(crate) const BUFF_FRESH_REMAINING: u8 = 2;

// Stages -------------------------------------------------------------------
pub(crate) const PLAYING_STATE_NORMAL: u8 = 1;
pub(crate) const PLAYING_STATE_EVENT: u8 = 5;
pub(crate) const STORY_BUFF_SELECTION: u32 = 400_010_112;
pub(crate) const STORY_TEAM_SELECTION: u32 = 830_241_003;

// Attributes ---------------------------------------------------------------
pub(crate) const ATTRIBUTE_REVISION_THRESHOLD: i32 = 1200;
pub(crate) const SKILL_POINT_WARNING: i32 = 9500;
