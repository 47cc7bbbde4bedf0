use onsen_game::{
    ActionKind, CardCatalog, Extraction, Prediction, Proficiency, ScenarioRules, TurnEngine,
    TurnSnapshot, TurnStage, TurnTransition, TurnWarning,
};

fn load_catalog() -> CardCatalog {
    CardCatalog::from_json(include_str!("fixtures/cards.json")).unwrap()
}

fn load_snapshot() -> TurnSnapshot {
    serde_json::from_str(include_str!("fixtures/turn_snapshot.json")).unwrap()
}

#[test]
fn recorded_snapshot_produces_expected_report() {
    let mut engine = TurnEngine::new(ScenarioRules::load_from_static(), load_catalog());
    let report = engine.observe(&load_snapshot()).unwrap();

    assert_eq!(report.turn, 14);
    assert_eq!(report.stage, TurnStage::Training);
    assert_eq!(report.transition, TurnTransition::NewPlaythrough { full: false });
    assert!(report.warnings.contains(&TurnWarning::Discontinuity {
        previous: None,
        turn: 14
    }));

    // Deck carries a link character for every segment type.
    assert_eq!(report.dig_powers.power(onsen_game::SegmentKind::Sand), 30);
    assert_eq!(report.dig_powers.power(onsen_game::SegmentKind::Dirt), 20);
    assert_eq!(report.dig_powers.power(onsen_game::SegmentKind::Rock), 10);

    let expected = [
        (ActionKind::Speed, 2, 32),
        (ActionKind::Stamina, 1, 31),
        (ActionKind::Power, 2, 32),
        (ActionKind::Guts, 0, 30),
        (ActionKind::Wisdom, 1, 31),
    ];
    for (kind, support, units) in expected {
        let action = report.action(kind).unwrap();
        assert_eq!(action.support_count, support, "{kind}");
        assert_eq!(action.extraction.map(|e| e.units), Some(units), "{kind}");
    }
    assert_eq!(
        report.action(ActionKind::Speed).unwrap().extraction,
        Some(Extraction {
            units: 32,
            overflow: 20
        })
    );

    assert_eq!(report.remaining_volume, 382);
    assert_eq!(report.weighted_power, 14);
    assert_eq!(report.prediction, Some(Prediction::Turns(18)));
    assert!(!report.dig_window_closed);
}

#[test]
fn recorded_snapshot_reconciles_and_reports_gains() {
    let mut engine = TurnEngine::new(ScenarioRules::load_from_static(), load_catalog());
    let report = engine.observe(&load_snapshot()).unwrap();

    assert_eq!(report.reconciliation.len(), 1);
    assert_eq!(report.reconciliation[0].kind, ActionKind::Speed);
    assert_eq!(report.reconciliation[0].actual, 2);
    assert_eq!(
        report.action(ActionKind::Speed).unwrap().proficiency,
        Some(Proficiency {
            level: 2,
            counter: 0
        })
    );

    let speed = report.action(ActionKind::Speed).unwrap();
    assert_eq!(speed.gains.attributes, [24, 0, 7, 0, 0]);
    assert_eq!(speed.gains.vital, -19);
    assert_eq!(speed.gains.skill_points, 4);
    assert_eq!(speed.shining_count, 1);
    assert_eq!(report.action(ActionKind::Wisdom).unwrap().gains.vital, 5);
    assert_eq!(report.attribute_total, 1615);
}

#[test]
fn reports_serialize_for_downstream_tools() {
    let mut engine = TurnEngine::new(ScenarioRules::load_from_static(), load_catalog());
    let report = engine.observe(&load_snapshot()).unwrap();
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["turn"], 14);
    assert_eq!(value["prediction"]["status"], "turns");
    assert_eq!(value["prediction"]["turns"], 18);
    assert_eq!(value["transition"]["kind"], "new_playthrough");
    assert_eq!(value["actions"].as_array().map(Vec::len), Some(5));
}

#[test]
fn unknown_cards_drop_link_bonuses_but_keep_analysis() {
    let mut engine = TurnEngine::new(ScenarioRules::load_from_static(), CardCatalog::empty());
    let report = engine.observe(&load_snapshot()).unwrap();
    assert_eq!(report.dig_powers.bonuses, onsen_game::LinkBonuses::default());
    // floor(27 * 1.2) = 32 > 12; needed ceil(1200 / 120) = 10; floor(17 * 1.1) = 18
    assert_eq!(
        report.action(ActionKind::Speed).unwrap().extraction.map(|e| e.units),
        Some(30)
    );
}
