//! Support cards, the characters behind them, and who counts toward a training.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::constants::CARD_RARITY_DIVISOR;
use crate::rules::ScenarioRules;
use crate::snapshot::Participant;

/// Resolves a support card id to the character it belongs to.
///
/// Platform-specific callers back this with their card database.
pub trait CharacterResolver {
    fn character_of(&self, card_id: u32) -> Option<u32>;
}

impl<F> CharacterResolver for F
where
    F: Fn(u32) -> Option<u32>,
{
    fn character_of(&self, card_id: u32) -> Option<u32> {
        self(card_id)
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("card catalog could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("card {card_id} is listed twice")]
    DuplicateCard { card_id: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardEntry {
    pub card_id: u32,
    pub chara_id: u32,
}

/// JSON-backed card to character table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CardCatalog {
    by_card: HashMap<u32, u32>,
}

#[derive(Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    cards: Vec<CardEntry>,
}

impl CardCatalog {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a catalog from parsed entries.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateCard` when a card id appears twice.
    pub fn from_entries(entries: impl IntoIterator<Item = CardEntry>) -> Result<Self, CatalogError> {
        let mut by_card = HashMap::new();
        for entry in entries {
            if by_card.insert(entry.card_id, entry.chara_id).is_some() {
                return Err(CatalogError::DuplicateCard {
                    card_id: entry.card_id,
                });
            }
        }
        Ok(Self { by_card })
    }

    /// Load a catalog document of the form `{"cards": [{"card_id": .., "chara_id": ..}]}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or lists a card twice.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_str(json)?;
        Self::from_entries(document.cards)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_card.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_card.is_empty()
    }
}

impl CharacterResolver for CardCatalog {
    fn character_of(&self, card_id: u32) -> Option<u32> {
        self.by_card.get(&card_id).copied()
    }
}

/// Rarity tier encoded in a support card id.
#[must_use]
pub const fn card_rarity(card_id: u32) -> u32 {
    card_id / CARD_RARITY_DIVISOR
}

/// Who a play-through brings along: the trainee and the support deck.
#[derive(Debug, Clone, Copy)]
pub struct LinkRoster<'a> {
    pub trainee_chara_id: u32,
    pub deck: &'a [u32],
}

impl<'a> LinkRoster<'a> {
    #[must_use]
    pub const fn new(trainee_chara_id: u32, deck: &'a [u32]) -> Self {
        Self {
            trainee_chara_id,
            deck,
        }
    }

    /// Characters present, trainee first, unresolvable cards skipped.
    #[must_use]
    pub fn characters<R>(&self, resolver: &R) -> Vec<u32>
    where
        R: CharacterResolver + ?Sized,
    {
        std::iter::once(self.trainee_chara_id)
            .chain(
                self.deck
                    .iter()
                    .filter_map(|&card| resolver.character_of(card)),
            )
            .collect()
    }

    /// Whether the trainee or any card's owner is one of `wanted`.
    #[must_use]
    pub fn includes_any<R>(&self, resolver: &R, wanted: &[u32]) -> bool
    where
        R: CharacterResolver + ?Sized,
    {
        self.characters(resolver)
            .iter()
            .any(|chara| wanted.contains(chara))
    }
}

/// Heads counted toward a training, excluding the director and the reporter.
#[must_use]
pub fn support_count(rules: &ScenarioRules, participants: &[Participant]) -> u32 {
    let count = participants
        .iter()
        .filter(|p| !rules.is_staff_position(p.position))
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Rarity of the friend card in the deck, 0 when the deck has none.
#[must_use]
pub fn friend_rarity<R>(rules: &ScenarioRules, resolver: &R, deck: &[u32]) -> u32
where
    R: CharacterResolver + ?Sized,
{
    deck.iter()
        .find(|&&card| resolver.character_of(card) == Some(rules.recovery.friend_chara_id))
        .map_or(0, |&card| card_rarity(card))
}
