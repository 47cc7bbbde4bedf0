//! Super recovery: spending ledger, trigger odds and trigger detection.
//!
//! Every point of vital spent since the last trigger moves the ledger toward
//! the next rank. Crossing a rank boundary on an action gives the full
//! tabled chance; staying inside a rank gives a quarter of it.
use serde::{Deserialize, Serialize};

use crate::constants::{BUFF_FRESH_REMAINING, RANK_DAMPENING};
use crate::numbers::floor_f64_to_i64;
use crate::result_log::RecoveryRecord;
use crate::rules::RecoveryRules;
use crate::snapshot::BathingInfo;

/// Rank of a spending total, clamped into the probability table.
#[must_use]
pub fn spend_rank(spent: i32, threshold: f64, rules: &RecoveryRules) -> usize {
    let top = rules.probabilities.len().saturating_sub(1);
    if threshold <= 0.0 {
        return 0;
    }
    let raw = floor_f64_to_i64(f64::from(spent) / threshold);
    usize::try_from(raw.max(0)).map_or(top, |rank| rank.min(top))
}

/// Chance that spending `extra` more vital triggers a recovery.
#[must_use]
pub fn trigger_probability(
    spent: i32,
    extra: i32,
    friend_present: bool,
    rules: &RecoveryRules,
) -> f64 {
    let threshold = rules.threshold(friend_present);
    let old_rank = spend_rank(spent, threshold, rules);
    let new_rank = spend_rank(spent.saturating_add(extra), threshold, rules);
    let percent = f64::from(rules.probabilities[new_rank]) / 100.0;
    if new_rank > old_rank {
        percent
    } else {
        percent / RANK_DAMPENING
    }
}

/// Probability shown for an action whose vital change is `vital_gain`.
///
/// Zero while a recovery is already guaranteed.
#[must_use]
pub fn action_probability(
    ledger: &VitalLedger,
    vital_gain: i32,
    friend_present: bool,
    bathing: Option<BathingInfo>,
    rules: &RecoveryRules,
) -> f64 {
    if bathing.is_some_and(|b| b.recovery_guaranteed()) {
        return 0.0;
    }
    let extra = vital_gain.saturating_neg().max(0);
    trigger_probability(ledger.spent(), extra, friend_present, rules)
}

/// Vital spent since the last recovery trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct VitalLedger {
    spent: i32,
    capturing: bool,
    last_vital: Option<i32>,
}

impl VitalLedger {
    #[must_use]
    pub const fn spent(&self) -> i32 {
        self.spent
    }

    #[must_use]
    pub const fn is_capturing(&self) -> bool {
        self.capturing
    }

    pub fn set_capturing(&mut self, capturing: bool) {
        self.capturing = capturing;
    }

    /// Add spending directly. Ignored while capture is off.
    pub fn record_spend(&mut self, amount: i32) {
        if self.capturing && amount > 0 {
            self.spent = self.spent.saturating_add(amount);
        }
    }

    /// Feed the vital of a normal-state snapshot; drops since the previous
    /// one count as spending.
    pub fn observe_vital(&mut self, vital: i32) {
        if let Some(previous) = self.last_vital {
            self.record_spend(previous - vital);
        }
        self.last_vital = Some(vital);
    }

    /// Zero the total and stop capturing until the next super buff.
    pub fn reset(&mut self) {
        self.spent = 0;
        self.capturing = false;
    }
}

/// How an observed trigger came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "source", content = "record")]
pub enum RecoveryEvent {
    /// A friend story granted the recovery.
    FriendProvided,
    /// Triggered by spending; worth a line in the result log.
    Spontaneous(RecoveryRecord),
}

impl RecoveryEvent {
    #[must_use]
    pub const fn record(&self) -> Option<RecoveryRecord> {
        match self {
            Self::FriendProvided => None,
            Self::Spontaneous(record) => Some(*record),
        }
    }
}

/// Watches bathing info between snapshots for triggers and buff changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RecoveryMonitor {
    last_bathing: Option<BathingInfo>,
    buff_is_super: bool,
    last_spent: i32,
}

impl RecoveryMonitor {
    /// Whether the running onsen buff came from a super recovery.
    #[must_use]
    pub const fn buff_is_super(&self) -> bool {
        self.buff_is_super
    }

    /// Compare `bathing` against the previous snapshot's and update the ledger.
    ///
    /// The first bathing info of a play-through only sets the baseline.
    pub fn observe(
        &mut self,
        turn: u32,
        bathing: Option<BathingInfo>,
        recent_stories: &[u32],
        friend_rarity: u32,
        ledger: &mut VitalLedger,
        rules: &RecoveryRules,
    ) -> Option<RecoveryEvent> {
        let current = bathing?;
        let Some(previous) = self.last_bathing.replace(current) else {
            self.last_spent = ledger.spent();
            return None;
        };

        let mut event = None;
        if previous.superior_state == 0 && current.superior_state > 0 {
            let friend = recent_stories
                .iter()
                .any(|story| rules.friend_recovery_stories.contains(story));
            event = Some(if friend {
                log::info!("turn {turn}: friend story granted a super recovery");
                RecoveryEvent::FriendProvided
            } else {
                let record = RecoveryRecord {
                    turn,
                    friend_rarity,
                    spent_before: self.last_spent,
                    spent_after: ledger.spent(),
                };
                log::info!(
                    "turn {turn}: super recovery triggered, vital spent {} -> {}",
                    record.spent_before,
                    record.spent_after
                );
                RecoveryEvent::Spontaneous(record)
            });
            ledger.reset();
        }

        if previous.effect_remaining == 0 && current.effect_remaining == BUFF_FRESH_REMAINING {
            log::debug!("turn {turn}: onsen buff started");
            if previous.superior_state > 0 {
                self.buff_is_super = true;
                ledger.set_capturing(true);
            }
        }
        if self.buff_is_super && current.effect_remaining == 0 && current.superior_state == 0 {
            self.buff_is_super = false;
        }

        self.last_spent = ledger.spent();
        event
    }
}
