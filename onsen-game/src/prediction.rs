//! Estimate of how many turns remain until the active pool is dug out.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::DIG_BASE_VALUE;
use crate::extraction::DigPowers;
use crate::numbers::{
    ceil_div, ceil_f64_to_i64, i64_to_f64, saturate_to_i32, saturate_to_u32, scale_by_percent,
};
use crate::rules::PredictionAssumptions;
use crate::snapshot::{ResourcePool, SegmentKind};

/// Completion estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "turns")]
pub enum Prediction {
    /// Turns needed, counting the current one.
    Turns(u32),
    AlreadyDone,
    Unknown,
}

impl Prediction {
    #[must_use]
    pub const fn turns(&self) -> Option<u32> {
        match self {
            Self::Turns(turns) => Some(*turns),
            Self::AlreadyDone => Some(0),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Turns(turns) => write!(f, "{turns} turns"),
            Self::AlreadyDone => f.write_str("done"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

/// Remaining volume per segment type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct VolumeByKind {
    pub sand: u64,
    pub dirt: u64,
    pub rock: u64,
}

impl VolumeByKind {
    #[must_use]
    pub fn of(pool: &ResourcePool) -> Self {
        let mut volumes = Self::default();
        for segment in pool.segments.iter().filter(|s| s.is_open()) {
            let remaining = u64::from(segment.remaining);
            match segment.kind() {
                SegmentKind::Sand => volumes.sand += remaining,
                SegmentKind::Dirt => volumes.dirt += remaining,
                SegmentKind::Rock => volumes.rock += remaining,
                SegmentKind::Unclassified => {}
            }
        }
        volumes
    }

    /// Volume of one type; unclassified volume is never counted.
    #[must_use]
    pub const fn of_kind(&self, kind: SegmentKind) -> u64 {
        match kind {
            SegmentKind::Sand => self.sand,
            SegmentKind::Dirt => self.dirt,
            SegmentKind::Rock => self.rock,
            SegmentKind::Unclassified => 0,
        }
    }

    #[must_use]
    pub const fn total(&self) -> u64 {
        self.sand + self.dirt + self.rock
    }
}

/// Volume-weighted average dig power over the classified remaining volume.
///
/// Each type's power is taken at its representative stratum id. Returns 0
/// when nothing classified remains.
#[must_use]
pub fn weighted_power(pool: Option<&ResourcePool>, powers: &DigPowers) -> i32 {
    let Some(pool) = pool else {
        return 0;
    };
    let volumes = VolumeByKind::of(pool);
    let total = i64::try_from(volumes.total()).unwrap_or(i64::MAX);
    if total == 0 {
        return 0;
    }
    let weighted: i64 = SegmentKind::CLASSIFIED
        .into_iter()
        .filter_map(|kind| {
            let stratum = kind.representative_stratum()?;
            let volume = i64::try_from(volumes.of_kind(kind)).ok()?;
            Some(i64::from(powers.power_for_stratum(stratum)).saturating_mul(volume))
        })
        .fold(0_i64, i64::saturating_add);
    saturate_to_i32(weighted / total)
}

/// Estimate remaining turns for the pool at `current_turn`.
#[must_use]
pub fn predict_remaining_turns(
    pool: Option<&ResourcePool>,
    weighted_power: i32,
    current_turn: u32,
    assumptions: &PredictionAssumptions,
) -> Prediction {
    let Some(pool) = pool else {
        return Prediction::Unknown;
    };
    let total = i64::try_from(pool.total_remaining()).unwrap_or(i64::MAX);
    if total == 0 {
        return Prediction::AlreadyDone;
    }
    if current_turn == 0 || current_turn >= assumptions.horizon_turns {
        return Prediction::Unknown;
    }

    let base = DIG_BASE_VALUE + i64::from(assumptions.assumed_support_count);
    let per_action = scale_by_percent(base, weighted_power);
    if per_action <= 0 {
        return Prediction::Unknown;
    }
    let actions = ceil_div(total, per_action);
    let rate = assumptions.participation_rate;
    if rate.is_nan() || rate <= 0.0 {
        return Prediction::Unknown;
    }
    let turns = ceil_f64_to_i64(i64_to_f64(actions) / rate);
    Prediction::Turns(saturate_to_u32(turns))
}
