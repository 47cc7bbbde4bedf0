//! Onsen Dig Analysis Engine
//!
//! Platform-agnostic turn analysis for the onsen dig training scenario.
//! Feed decoded turn snapshots to a [`TurnEngine`] and read back proficiency,
//! dig, completion and recovery figures. No rendering or I/O lives here.

pub mod bonus;
pub mod constants;
pub mod engine;
pub mod extraction;
pub mod gains;
pub mod numbers;
pub mod playthrough;
pub mod prediction;
pub mod proficiency;
pub mod recovery;
pub mod result_log;
pub mod roster;
pub mod rules;
pub mod snapshot;

// Re-export commonly used types
pub use bonus::{LinkBonuses, link_bonus};
pub use engine::{ActionReport, TurnEngine, TurnReport, TurnWarning};
pub use extraction::{DigPowers, Extraction, compute_extraction};
pub use gains::{ActionGains, revise_over_1200};
pub use playthrough::{Playthrough, PlaythroughLedger, TurnTransition, classify_transition};
pub use prediction::{Prediction, predict_remaining_turns, weighted_power};
pub use proficiency::{LevelMismatch, Proficiency, ProficiencySet, TurnState, advance, reconcile};
pub use recovery::{
    RecoveryEvent, RecoveryMonitor, VitalLedger, action_probability, trigger_probability,
};
pub use result_log::{RecoveryRecord, ResultSink};
pub use roster::{
    CardCatalog, CardEntry, CatalogError, CharacterResolver, LinkRoster, card_rarity,
    friend_rarity, support_count,
};
pub use rules::{RulesError, ScenarioRules, default_rules};
pub use snapshot::{
    ActionCandidate, ActionKind, Attributes, BathingInfo, DigEffect, OnsenData, ParamDelta,
    ParamTarget, Participant, ResourcePool, Segment, SegmentKind, TrainingLevel, TurnSnapshot,
    TurnStage,
};

/// Trait for abstracting where rules and the card catalog come from
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the scenario rules
    ///
    /// # Errors
    ///
    /// Returns an error if the rules cannot be read or fail validation.
    fn load_rules(&self) -> Result<ScenarioRules, Self::Error>;

    /// Load the support card catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read or parsed.
    fn load_catalog(&self) -> Result<CardCatalog, Self::Error>;
}

impl TurnEngine<CardCatalog> {
    /// Build an engine from a platform data loader.
    ///
    /// # Errors
    ///
    /// Returns the loader's error if rules or catalog cannot be loaded.
    pub fn from_loader<L>(loader: &L) -> Result<Self, L::Error>
    where
        L: DataLoader,
    {
        let rules = loader.load_rules()?;
        let catalog = loader.load_catalog()?;
        Ok(Self::new(rules, catalog))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    #[derive(Clone, Copy, Default)]
    struct FixtureLoader;

    impl DataLoader for FixtureLoader {
        type Error = Infallible;

        fn load_rules(&self) -> Result<ScenarioRules, Self::Error> {
            Ok(ScenarioRules::load_from_static())
        }

        fn load_catalog(&self) -> Result<CardCatalog, Self::Error> {
            Ok(CardCatalog::empty())
        }
    }

    #[derive(Clone, Copy, Default)]
    struct BrokenLoader;

    impl DataLoader for BrokenLoader {
        type Error = RulesError;

        fn load_rules(&self) -> Result<ScenarioRules, Self::Error> {
            ScenarioRules::from_json("{ not json")
        }

        fn load_catalog(&self) -> Result<CardCatalog, Self::Error> {
            Ok(CardCatalog::empty())
        }
    }

    #[test]
    fn engine_builds_from_loader() {
        let engine = TurnEngine::from_loader(&FixtureLoader).unwrap();
        assert_eq!(engine.rules(), default_rules());
        assert!(engine.playthrough().is_none());
    }

    #[test]
    fn loader_errors_propagate() {
        let err = TurnEngine::from_loader(&BrokenLoader).unwrap_err();
        assert!(matches!(err, RulesError::Parse(_)));
    }
}
