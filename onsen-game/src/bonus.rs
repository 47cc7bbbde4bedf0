//! Link bonus: extra dig power granted when certain characters come along.
use serde::{Deserialize, Serialize};

use crate::roster::{CharacterResolver, LinkRoster};
use crate::rules::ScenarioRules;
use crate::snapshot::SegmentKind;

/// Dig power bonus for one segment type. Unclassified segments never qualify.
#[must_use]
pub fn link_bonus<R>(
    rules: &ScenarioRules,
    resolver: &R,
    roster: &LinkRoster<'_>,
    kind: SegmentKind,
) -> i32
where
    R: CharacterResolver + ?Sized,
{
    let qualifying = rules.link.qualifying(kind);
    if !qualifying.is_empty() && roster.includes_any(resolver, qualifying) {
        rules.link.bonus_percent
    } else {
        0
    }
}

/// Link bonuses for every segment type, evaluated once per snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LinkBonuses {
    pub sand: i32,
    pub dirt: i32,
    pub rock: i32,
}

impl LinkBonuses {
    #[must_use]
    pub fn evaluate<R>(rules: &ScenarioRules, resolver: &R, roster: &LinkRoster<'_>) -> Self
    where
        R: CharacterResolver + ?Sized,
    {
        Self {
            sand: link_bonus(rules, resolver, roster, SegmentKind::Sand),
            dirt: link_bonus(rules, resolver, roster, SegmentKind::Dirt),
            rock: link_bonus(rules, resolver, roster, SegmentKind::Rock),
        }
    }

    #[must_use]
    pub const fn for_kind(&self, kind: SegmentKind) -> i32 {
        match kind {
            SegmentKind::Sand => self.sand,
            SegmentKind::Dirt => self.dirt,
            SegmentKind::Rock => self.rock,
            SegmentKind::Unclassified => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::CardCatalog;
    use crate::rules::default_rules;

    fn catalog() -> CardCatalog {
        CardCatalog::from_json(
            r#"{ "cards": [
                { "card_id": 30001, "chara_id": 1003 },
                { "card_id": 10042, "chara_id": 1003 },
                { "card_id": 20077, "chara_id": 1080 },
                { "card_id": 30110, "chara_id": 1055 }
            ] }"#,
        )
        .unwrap()
    }

    #[test]
    fn any_card_of_a_link_character_qualifies() {
        let rules = default_rules();
        let catalog = catalog();
        for card in [30001, 10042] {
            let deck = [card];
            let roster = LinkRoster::new(1001, &deck);
            assert_eq!(
                link_bonus(rules, &catalog, &roster, SegmentKind::Sand),
                10
            );
            assert_eq!(link_bonus(rules, &catalog, &roster, SegmentKind::Dirt), 0);
        }
    }

    #[test]
    fn trainee_identity_counts() {
        let rules = default_rules();
        let catalog = catalog();
        let roster = LinkRoster::new(1099, &[]);
        assert_eq!(link_bonus(rules, &catalog, &roster, SegmentKind::Rock), 10);
        assert_eq!(link_bonus(rules, &catalog, &roster, SegmentKind::Sand), 0);
    }

    #[test]
    fn unclassified_and_unknown_yield_zero() {
        let rules = default_rules();
        let catalog = catalog();
        let deck = [30001, 20077, 99999];
        let roster = LinkRoster::new(1003, &deck);
        assert_eq!(
            link_bonus(rules, &catalog, &roster, SegmentKind::Unclassified),
            0
        );
        let bonuses = LinkBonuses::evaluate(rules, &catalog, &roster);
        assert_eq!(
            bonuses,
            LinkBonuses {
                sand: 10,
                dirt: 10,
                rock: 0
            }
        );
        assert_eq!(bonuses.for_kind(SegmentKind::Unclassified), 0);
    }
}
