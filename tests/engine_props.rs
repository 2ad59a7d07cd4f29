use battleship_server::{
    Action, AttackMode, CellState, EngineConfig, Event, GridView, Match, MatchEngine, MatchId,
    Orientation, Phase, Player, PlayerId, TurnRule, STANDARD_FLEET,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Place { ship: usize, x: usize, y: usize, vertical: bool },
    Attack { x: usize, y: usize, mode: u8 },
    Chat,
    Leave,
}

fn op_strategy() -> impl Strategy<Value = (usize, Op)> {
    let op = prop_oneof![
        3 => (0..5usize, 0..11usize, 0..11usize, any::<bool>())
            .prop_map(|(ship, x, y, vertical)| Op::Place { ship, x, y, vertical }),
        8 => (0..11usize, 0..11usize, 0..3u8).prop_map(|(x, y, mode)| Op::Attack { x, y, mode }),
        1 => Just(Op::Chat),
        1 => Just(Op::Leave),
    ];
    // Actor 2 is never a participant.
    (0..3usize, op)
}

fn players() -> [PlayerId; 3] {
    [PlayerId::from("alice"), PlayerId::from("bob"), PlayerId::from("mallory")]
}

fn to_action(op: Op) -> Action {
    match op {
        Op::Place { ship, x, y, vertical } => Action::PlaceShip {
            x,
            y,
            ship_type: STANDARD_FLEET[ship].id().to_string(),
            orientation: Orientation::from_vertical(vertical),
        },
        Op::Attack { x, y, mode } => Action::Attack {
            x,
            y,
            mode: match mode {
                0 => AttackMode::Single,
                1 => AttackMode::SquareBlast,
                _ => AttackMode::RadarScan,
            },
        },
        Op::Chat => Action::Chat { text: "gl".to_string() },
        Op::Leave => Action::Leave,
    }
}

fn own_views(game: &Match) -> Vec<Option<Vec<Vec<CellState>>>> {
    players()
        .iter()
        .map(|p| game.player_state(p).map(|s| s.grid().view(GridView::Own)))
        .collect()
}

fn check_invariants(game: &Match) -> Result<(), TestCaseError> {
    prop_assert_eq!(game.turn_owner().is_some(), game.phase() == Phase::Battle);
    for player in players() {
        if let Some(state) = game.player_state(&player) {
            let expected: usize = state
                .placed_types()
                .map(|id| state.placed_of(id) * game.fleet().ship_type(id).unwrap().length())
                .sum();
            prop_assert_eq!(state.placed_ship_cells(), expected);
            prop_assert_eq!(state.grid().ship_cells_afloat() + state.grid().hit_count(), expected);
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn engine_invariants_hold_for_any_action_sequence(
        seed in any::<u64>(),
        bonus in any::<bool>(),
        abilities in any::<bool>(),
        preplace in any::<bool>(),
        ops in prop::collection::vec(op_strategy(), 0..250),
    ) {
        let mut engine = MatchEngine::new(EngineConfig {
            turn_rule: if bonus { TurnRule::BonusShotOnHit } else { TurnRule::Alternate },
            abilities_enabled: abilities,
            seed: Some(seed),
            ..EngineConfig::default()
        });
        let [alice, bob, _] = players();
        let (mut game, _) = engine.create_match(MatchId::new("prop"), Player::new(alice.clone(), "Alice"));
        engine.join_match(&mut game, Player::new(bob.clone(), "Bob")).unwrap();
        if preplace {
            for player in [&alice, &bob] {
                for (row, ship) in STANDARD_FLEET.iter().enumerate() {
                    engine
                        .place_ship(&mut game, player, 0, row * 2, ship.id(), Orientation::Horizontal)
                        .unwrap();
                }
            }
            prop_assert_eq!(game.phase(), Phase::Battle);
        }

        let mut ended = Vec::new();
        for (actor, op) in ops {
            let before_phase = game.phase();
            let before_views = own_views(&game);

            let events = engine.handle(&mut game, &players()[actor], to_action(op));

            prop_assert!(game.phase() >= before_phase);
            for (before, after) in before_views.iter().zip(own_views(&game)) {
                if let (Some(before), Some(after)) = (before, after) {
                    for (row_before, row_after) in before.iter().zip(&after) {
                        for (b, a) in row_before.iter().zip(row_after) {
                            if b.is_shot() {
                                prop_assert_eq!(b, a);
                            }
                        }
                    }
                }
            }
            check_invariants(&game)?;
            ended.extend(events.into_iter().filter_map(|d| match d.event {
                Event::MatchEnded { winner, .. } => Some(winner),
                _ => None,
            }));
        }

        prop_assert!(ended.len() <= 1);
        if let Some(winner) = ended.first() {
            prop_assert!(winner == &alice || winner == &bob);
            prop_assert_eq!(game.phase(), Phase::Finished);
            prop_assert_eq!(game.winner(), Some(winner));
        }
    }
}
