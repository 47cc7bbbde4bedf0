use onsen_game::rules::PredictionAssumptions;
use onsen_game::{
    DigPowers, LinkBonuses, Prediction, ResourcePool, Segment, compute_extraction,
    default_rules, predict_remaining_turns, trigger_probability,
};

fn pool(segments: &[(u32, u32)]) -> ResourcePool {
    ResourcePool {
        pool_id: 1,
        state: 2,
        segments: segments
            .iter()
            .map(|&(stratum_id, remaining)| Segment {
                stratum_id,
                remaining,
            })
            .collect(),
    }
}

fn powers(sand: i32, dirt: i32, rock: i32) -> DigPowers {
    DigPowers {
        base: Some([sand, dirt, rock]),
        bonuses: LinkBonuses::default(),
    }
}

#[test]
fn extraction_never_exceeds_two_segments() {
    let volumes = [0, 1, 7, 26, 27, 40, 300];
    let strata = [4, 5, 6, 21];
    for support in 0..=5 {
        for &first in &volumes {
            for &second in &volumes {
                for &third in &[0, 500] {
                    for &stratum in &strata {
                        let pool = pool(&[(stratum, first), (5, second), (6, third)]);
                        let result = compute_extraction(support, Some(&pool), &powers(35, 20, 60));
                        let open: Vec<u32> = [first, second, third]
                            .into_iter()
                            .filter(|&v| v > 0)
                            .collect();
                        let bound = open.iter().take(2).sum::<u32>();
                        assert!(
                            result.units <= bound,
                            "support {support} volumes {first}/{second}/{third}: {result:?}"
                        );
                        assert!(result.overflow <= result.units);
                    }
                }
            }
        }
    }
}

#[test]
fn unbounded_segment_matches_closed_form() {
    for power in 0..=200 {
        let pool = pool(&[(6, 1_000_000)]);
        let result = compute_extraction(0, Some(&pool), &powers(0, 0, power));
        let expected = u32::try_from(25 * (100 + power) / 100).unwrap();
        assert_eq!(result.units, expected, "power {power}");
        assert_eq!(result.overflow, 0);
    }
}

#[test]
fn documented_extraction_scenarios() {
    let single = pool(&[(4, 10)]);
    assert_eq!(compute_extraction(2, Some(&single), &powers(0, 0, 0)).units, 10);
    let double = pool(&[(4, 10), (5, 50)]);
    assert_eq!(compute_extraction(2, Some(&double), &powers(0, 0, 0)).units, 27);
}

#[test]
fn predictor_sentinels() {
    let assumptions = PredictionAssumptions::default();
    for turn in 0..=90 {
        let empty = pool(&[(4, 0), (5, 0)]);
        assert_eq!(
            predict_remaining_turns(Some(&empty), 10, turn, &assumptions),
            Prediction::AlreadyDone
        );
        let full = pool(&[(4, 10), (5, 50)]);
        let prediction = predict_remaining_turns(Some(&full), 10, turn, &assumptions);
        if turn == 0 || turn >= 78 {
            assert_eq!(prediction, Prediction::Unknown, "turn {turn}");
        } else {
            assert!(matches!(prediction, Prediction::Turns(n) if n > 0), "turn {turn}");
        }
        // A rate per action of zero or less can never finish.
        assert_eq!(
            predict_remaining_turns(Some(&full), -100, turn, &assumptions),
            Prediction::Unknown
        );
    }
}

#[test]
fn documented_recovery_scenarios() {
    let rules = &default_rules().recovery;
    assert!((trigger_probability(100, 50, false, rules) - 0.30).abs() < 1e-9);
    assert!((trigger_probability(100, 10, false, rules) - 0.05).abs() < 1e-9);
    assert!((trigger_probability(50, 40, false, rules) - 0.025).abs() < 1e-9);
}
