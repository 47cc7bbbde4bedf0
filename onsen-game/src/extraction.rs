//! Dig extraction: how many units one training removes from the active pool.
//!
//! The base value is `25 + support heads`. Dig power scales it per segment
//! type. When the current segment cannot absorb the whole amount, the part of
//! the base value that exhausts it is computed with ceiling rounding and the
//! leftover base value digs into the next open segment at that segment's
//! power. Only one boundary is ever crossed per action.
use serde::{Deserialize, Serialize};

use crate::bonus::LinkBonuses;
use crate::constants::DIG_BASE_VALUE;
use crate::numbers::{ceil_div, saturate_to_u32, scale_by_percent};
use crate::snapshot::{DigEffect, ResourcePool, SegmentKind};

/// Effective dig power per segment type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DigPowers {
    /// Tool power per type; `None` when the dig-effect table is missing.
    pub base: Option<[i32; 3]>,
    pub bonuses: LinkBonuses,
}

impl DigPowers {
    /// Combine the snapshot's dig-effect table with the link bonuses.
    #[must_use]
    pub fn resolve(table: Option<&[DigEffect]>, bonuses: LinkBonuses) -> Self {
        let base = table.and_then(|rows| match rows {
            [sand, dirt, rock, ..] => Some([sand.power, dirt.power, rock.power]),
            _ => None,
        });
        Self { base, bonuses }
    }

    /// Power for a segment type: tool power plus link bonus.
    ///
    /// A missing table or an unclassified segment yields 0.
    #[must_use]
    pub const fn power(&self, kind: SegmentKind) -> i32 {
        let Some(base) = self.base else {
            return 0;
        };
        match kind.effect_row() {
            Some(row) => base[row].saturating_add(self.bonuses.for_kind(kind)),
            None => 0,
        }
    }

    /// Power for a raw stratum id.
    #[must_use]
    pub const fn power_for_stratum(&self, stratum_id: u32) -> i32 {
        self.power(SegmentKind::classify(stratum_id))
    }
}

/// Units removed by one action, with the split across the segment boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Extraction {
    pub units: u32,
    /// Portion of `units` that landed in the next open segment.
    pub overflow: u32,
}

impl Extraction {
    /// Whether part of the dig landed past the current segment.
    #[must_use]
    pub const fn crossed_boundary(&self) -> bool {
        self.overflow > 0
    }
}

/// Base value of one training before dig power applies.
#[must_use]
pub fn base_value(support_count: u32) -> i64 {
    DIG_BASE_VALUE + i64::from(support_count)
}

/// Compute units removed from `pool` by a training with `support_count` heads.
///
/// Missing or exhausted pools yield zero.
#[must_use]
pub fn compute_extraction(
    support_count: u32,
    pool: Option<&ResourcePool>,
    powers: &DigPowers,
) -> Extraction {
    let Some(pool) = pool else {
        return Extraction::default();
    };
    let Some(current_index) = pool.current_index() else {
        return Extraction::default();
    };
    let base = base_value(support_count);
    let current = pool.segments[current_index];
    let current_remaining = i64::from(current.remaining);
    let first_power = powers.power(current.kind());
    let amount = scale_by_percent(base, first_power);

    if amount <= current_remaining {
        return Extraction {
            units: saturate_to_u32(amount),
            overflow: 0,
        };
    }

    let needed_base = ceil_div(
        current_remaining * 100,
        (i64::from(first_power) + 100).max(1),
    );
    let Some(next_index) = pool.next_open_after(current_index) else {
        return Extraction {
            units: current.remaining,
            overflow: 0,
        };
    };
    let next = pool.segments[next_index];
    let second_power = powers.power(next.kind());
    let overflow = scale_by_percent((base - needed_base).max(0), second_power)
        .clamp(0, i64::from(next.remaining));

    log::debug!(
        "dig crosses segment {current_index} -> {next_index}: base {base}, needed {needed_base}, power {first_power}% -> {second_power}%, overflow {overflow}"
    );

    let overflow = saturate_to_u32(overflow);
    Extraction {
        units: current.remaining.saturating_add(overflow),
        overflow,
    }
}
