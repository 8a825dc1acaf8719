use rdmx_core::{
    Angle, CHANCE_NEIGHBOR_PROPORTION, ErrorCategory, Layout, Outcome, classify, delta,
    layout::DEFAULT_RADIUS,
};
use std::collections::HashMap;

fn layout() -> Layout {
    Layout::standard(DEFAULT_RADIUS).expect("standard layout is valid")
}

fn angle(deg: i64) -> Angle {
    Angle::new(deg).unwrap()
}

#[test]
fn target_zero_answered_at_sixty_is_a_neighbor_error() {
    let layout = layout();
    let key = &layout.target(angle(60)).keys[0];
    let outcome = classify(&layout, angle(0), key);

    assert!(!outcome.is_correct());
    assert_eq!(outcome.delta(), Some(60));
    assert_eq!(outcome.category(), Some(ErrorCategory::Neighbor));
}

#[test]
fn target_180_answered_at_zero_is_the_opposite_error() {
    let layout = layout();
    let key = &layout.target(angle(0)).keys[1];
    let outcome = classify(&layout, angle(180), key);

    assert!(!outcome.is_correct());
    assert_eq!(outcome.delta(), Some(180));
    assert_eq!(outcome.category(), Some(ErrorCategory::Opposite));
}

#[test]
fn every_identifier_has_exactly_one_owner() {
    let layout = layout();
    let mut owners: HashMap<&str, Vec<u16>> = HashMap::new();
    for target in layout.targets() {
        for key in &target.keys {
            owners.entry(key).or_default().push(target.angle.degrees());
        }
    }
    for (key, angles) in owners {
        assert_eq!(angles.len(), 1, "{key} owned by {angles:?}");
    }
}

#[test]
fn every_accepted_key_scores_against_its_own_target() {
    let layout = layout();
    for target in layout.targets() {
        for key in &target.keys {
            match classify(&layout, target.angle, key) {
                Outcome::Scored { chosen, correct, .. } => {
                    assert_eq!(chosen, target.angle);
                    assert!(correct);
                }
                Outcome::Unscored => panic!("{key} should be recognized"),
            }
        }
    }
}

#[test]
fn uniform_wrong_answers_give_the_chance_neighbor_share() {
    // Enumerate the five wrong answers for every target: exactly two are
    // neighbours, which is where the 40% reference comes from.
    let mut neighbors = 0usize;
    let mut errors = 0usize;
    for t in Angle::ALL {
        for r in Angle::ALL {
            if t == r {
                continue;
            }
            errors += 1;
            if delta(t, r).unsigned_abs() == 60 {
                neighbors += 1;
            }
        }
    }
    let share = neighbors as f64 / errors as f64;
    assert!((share - CHANCE_NEIGHBOR_PROPORTION).abs() < 1e-12);
}
