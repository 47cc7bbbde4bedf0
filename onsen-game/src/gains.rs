//! Declared attribute, vital and skill-point changes of one action.
use serde::{Deserialize, Serialize};

use crate::constants::ATTRIBUTE_REVISION_THRESHOLD;
use crate::snapshot::{ActionCandidate, ParamTarget, TurnSnapshot};

/// Attribute value as the game scores it: every point above 1200 counts twice.
#[must_use]
pub const fn revise_over_1200(value: i32) -> i32 {
    if value > ATTRIBUTE_REVISION_THRESHOLD {
        value * 2 - ATTRIBUTE_REVISION_THRESHOLD
    } else {
        value
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ActionGains {
    /// Revised attribute gains in attribute-slot order.
    pub attributes: [i32; 5],
    /// Vital change, clamped to what the current vital allows.
    pub vital: i32,
    pub skill_points: i32,
}

impl ActionGains {
    /// Sum the candidate's declared and scenario deltas against the snapshot.
    #[must_use]
    pub fn of(candidate: &ActionCandidate, snapshot: &TurnSnapshot) -> Self {
        let mut raw = [0i32; 5];
        let mut vital = 0i32;
        let mut skill_points = 0i32;
        for delta in &candidate.params {
            match delta.target {
                ParamTarget::Vital => vital += delta.value,
                ParamTarget::SkillPoints => skill_points += delta.value,
                target => {
                    if let Some(slot) = target.attribute_index() {
                        raw[slot] += delta.value;
                    }
                }
            }
        }
        // The scenario table never moves vital.
        for delta in &candidate.scenario_params {
            match delta.target {
                ParamTarget::SkillPoints => skill_points += delta.value,
                target => {
                    if let Some(slot) = target.attribute_index() {
                        raw[slot] += delta.value;
                    }
                }
            }
        }

        let current = snapshot.attributes.current;
        let attributes = std::array::from_fn(|slot| {
            revise_over_1200(current[slot] + raw[slot]) - revise_over_1200(current[slot])
        });
        let vital = vital
            .min(snapshot.max_vital - snapshot.vital)
            .max(-snapshot.vital);
        Self {
            attributes,
            vital,
            skill_points,
        }
    }

    #[must_use]
    pub fn attribute_total(&self) -> i32 {
        self.attributes.iter().sum()
    }

    /// Attribute total plus skill points.
    #[must_use]
    pub fn total(&self) -> i32 {
        self.attribute_total() + self.skill_points
    }
}
