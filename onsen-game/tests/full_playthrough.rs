use onsen_game::{
    ActionCandidate, ActionKind, Attributes, BathingInfo, CardCatalog, DigEffect, OnsenData,
    Participant, Prediction, Proficiency, RecoveryRecord, ResourcePool, ResultSink, ScenarioRules,
    Segment, TurnEngine, TurnSnapshot, TurnTransition,
};

const HORIZON: u32 = 78;

fn training(kind: ActionKind) -> ActionCandidate {
    ActionCandidate {
        kind,
        enabled: true,
        failure_rate: 0,
        level: 1,
        participants: [1, 2]
            .into_iter()
            .map(|position| Participant {
                position,
                is_npc: false,
                shining: false,
            })
            .collect(),
        params: Vec::new(),
        scenario_params: Vec::new(),
        declared_dig: 0,
    }
}

fn snapshot(turn: u32, remaining: u32, vital: i32, superior_state: u8) -> TurnSnapshot {
    TurnSnapshot {
        turn,
        playing_state: 1,
        pending_stories: Vec::new(),
        recent_stories: Vec::new(),
        trainee_chara_id: 1054,
        deck: vec![20033, 30076],
        attributes: Attributes {
            current: [200; 5],
            max: [1200; 5],
        },
        skill_points: 100,
        vital,
        max_vital: 100,
        motivation: 3,
        actions: ActionKind::TRAININGS.iter().map(|&k| training(k)).collect(),
        training_levels: Vec::new(),
        onsen: Some(OnsenData {
            pools: vec![ResourcePool {
                pool_id: 1,
                state: 2,
                segments: vec![Segment {
                    stratum_id: 6,
                    remaining,
                }],
            }],
            dig_effects: vec![
                DigEffect {
                    item_level: 1,
                    power: 0,
                },
                DigEffect {
                    item_level: 1,
                    power: 0,
                },
                DigEffect {
                    item_level: 1,
                    power: 0,
                },
            ],
            bathing: Some(BathingInfo {
                tickets: 0,
                effect_remaining: 0,
                superior_state,
            }),
        }),
    }
}

fn level(proficiency: Option<Proficiency>) -> u8 {
    proficiency.map_or(0, |p| p.level)
}

#[test]
fn speed_every_turn_reaches_the_cap_and_stays_there() {
    let mut engine = TurnEngine::new(ScenarioRules::default(), CardCatalog::empty());
    let mut remaining = 2_000u32;
    for turn in 1..=HORIZON {
        let report = engine.observe(&snapshot(turn, remaining, 80, 0)).unwrap();
        let expected_transition = if turn == 1 {
            TurnTransition::NewPlaythrough { full: true }
        } else {
            TurnTransition::Advance
        };
        assert_eq!(report.transition, expected_transition, "turn {turn}");
        for action in &report.actions {
            let proficiency = action.proficiency.unwrap();
            assert!((1..=5).contains(&proficiency.level), "turn {turn}");
            assert!(proficiency.counter <= 3, "turn {turn}");
            if proficiency.level == 5 {
                assert_eq!(proficiency.counter, 0);
            }
        }
        let extraction = report.action(ActionKind::Speed).unwrap().extraction.unwrap();
        remaining = remaining.saturating_sub(extraction.units);
        engine.record_choice(turn, ActionKind::Speed, false);

        match turn {
            5 => assert_eq!(level(report.action(ActionKind::Speed).unwrap().proficiency), 2),
            // Guts is never trained; only the milestones move it.
            24 => assert_eq!(level(report.action(ActionKind::Guts).unwrap().proficiency), 1),
            25 => assert_eq!(level(report.action(ActionKind::Guts).unwrap().proficiency), 2),
            37 => assert_eq!(level(report.action(ActionKind::Guts).unwrap().proficiency), 3),
            49 => assert_eq!(level(report.action(ActionKind::Guts).unwrap().proficiency), 4),
            78 => {
                assert_eq!(level(report.action(ActionKind::Speed).unwrap().proficiency), 5);
                assert_eq!(level(report.action(ActionKind::Guts).unwrap().proficiency), 4);
            }
            _ => {}
        }
        assert!(report.reconciliation.is_empty());
    }
    assert_eq!(engine.playthrough().unwrap().ledger.len(), 78);
}

#[test]
fn pool_runs_dry_and_prediction_follows() {
    let mut engine = TurnEngine::new(ScenarioRules::default(), CardCatalog::empty());
    let mut remaining = 120u32;
    let mut previous_turns = u32::MAX;
    for turn in 1..=10 {
        let report = engine.observe(&snapshot(turn, remaining, 80, 0)).unwrap();
        match report.prediction {
            Some(Prediction::Turns(turns)) => {
                assert!(turns <= previous_turns);
                previous_turns = turns;
                assert!(remaining > 0);
            }
            Some(Prediction::AlreadyDone) => assert_eq!(remaining, 0),
            other => panic!("unexpected prediction {other:?} at turn {turn}"),
        }
        let units = report.action(ActionKind::Wisdom).unwrap().extraction.unwrap().units;
        assert!(units <= remaining);
        remaining -= units;
        engine.record_choice(turn, ActionKind::Wisdom, false);
    }
    assert_eq!(remaining, 0);
}

#[test]
fn spontaneous_triggers_reach_a_result_sink() {
    let mut engine = TurnEngine::new(ScenarioRules::default(), CardCatalog::empty());
    let mut sink: Vec<RecoveryRecord> = Vec::new();
    let vitals = [100, 90, 80, 60, 45, 30];
    for (turn, vital) in (1u32..).zip(vitals) {
        let report = engine.observe(&snapshot(turn, 500, vital, 0)).unwrap();
        assert!(report.recovery_record().is_none());
    }
    // Turn 3 opens capture: drops 80 -> 60 -> 45 -> 30 count.
    assert_eq!(engine.playthrough().unwrap().vitals.spent(), 50);

    let report = engine.observe(&snapshot(7, 500, 30, 1)).unwrap();
    let record = report.recovery_record().unwrap();
    ResultSink::append(&mut sink, &record).unwrap();
    assert_eq!(
        sink,
        vec![RecoveryRecord {
            turn: 7,
            friend_rarity: 0,
            spent_before: 35,
            spent_after: 50,
        }]
    );
    assert_eq!(sink[0].to_csv_line(), "7, 0, 35, 50\n");
    assert_eq!(report.vital_spent, 0);
    assert!(!engine.playthrough().unwrap().vitals.is_capturing());
}
