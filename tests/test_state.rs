use duel_cli::error::DuelError;
use duel_cli::state::{Choice, GameState, Player, Rules};

fn conserved(rules: &Rules, s: &GameState) -> bool {
    let b = rules.bound;
    let p1 = rules.view(s, Player::P1);
    let p2 = rules.view(s, Player::P2);
    p1.mine + p2.theirs == b && p2.mine + p1.theirs == b
}

#[test]
fn test_initial_state() {
    let rules = Rules::new(5);
    let s = rules.initial();
    assert_eq!(s, GameState::new(5, 0, Player::P1));
    assert!(!rules.is_terminal(&s));
    assert_eq!(rules.winner(&s), None);
}

#[test]
fn test_state_count() {
    assert_eq!(Rules::new(5).num_states(), 72);
    assert_eq!(Rules::new(1).num_states(), 8);
    assert_eq!(Rules::new(5).all_states().len(), 72);
}

#[test]
fn test_terminal_classification() {
    let rules = Rules::new(5);
    for turn in [Player::P1, Player::P2] {
        for t in 0..=5 {
            assert_eq!(rules.winner(&GameState::new(0, t, turn)), Some(Player::P1));
        }
        for m in 1..=5 {
            assert_eq!(rules.winner(&GameState::new(m, 5, turn)), Some(Player::P2));
        }
    }
}

#[test]
fn test_p1_shots() {
    let rules = Rules::new(5);
    let s = GameState::new(3, 2, Player::P1);
    assert_eq!(
        rules.apply(&s, Choice::Mine, true).unwrap(),
        GameState::new(2, 2, Player::P2)
    );
    assert_eq!(
        rules.apply(&s, Choice::Theirs, true).unwrap(),
        GameState::new(3, 1, Player::P2)
    );
}

#[test]
fn test_p2_shots_move_p1_counters() {
    let rules = Rules::new(5);
    let s = GameState::new(3, 2, Player::P2);
    // P2 empties its own counter: P1 collects the token.
    assert_eq!(
        rules.apply(&s, Choice::Mine, true).unwrap(),
        GameState::new(3, 3, Player::P1)
    );
    // P2 hands back a captured token: P1 gets it in mine.
    assert_eq!(
        rules.apply(&s, Choice::Theirs, true).unwrap(),
        GameState::new(4, 2, Player::P1)
    );
}

#[test]
fn test_turn_always_passes() {
    let rules = Rules::new(5);
    let s = GameState::new(3, 2, Player::P1);
    for success in [true, false] {
        assert_eq!(rules.apply(&s, Choice::Mine, success).unwrap().turn, Player::P2);
    }
}

#[test]
fn test_empty_counter_is_an_error() {
    let rules = Rules::new(5);
    let result = rules.apply(&rules.initial(), Choice::Theirs, true);
    assert!(matches!(
        result,
        Err(DuelError::CounterUnderflow {
            player: Player::P1,
            choice: Choice::Theirs
        })
    ));
    // P2 with nothing captured: p1_mine == B.
    let s = GameState::new(5, 1, Player::P2);
    assert!(rules.apply(&s, Choice::Theirs, true).is_err());
}

#[test]
fn test_conservation_after_every_apply() {
    let rules = Rules::new(5);
    for s in rules.all_states() {
        if rules.is_terminal(&s) {
            continue;
        }
        assert!(conserved(&rules, &s));
        for choice in [Choice::Mine, Choice::Theirs] {
            for success in [true, false] {
                if let Ok(next) = rules.apply(&s, choice, success) {
                    assert!(conserved(&rules, &next), "{} -> {}", s, next);
                    assert!(next.p1_mine <= 5 && next.p1_theirs <= 5);
                }
            }
        }
    }
}
