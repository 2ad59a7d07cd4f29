use battleship_server::{
    CellState, FleetRules, GridView, MatchError, MatchGrid, Orientation, ShotOutcome,
    STANDARD_FLEET,
};
use rand::{rngs::SmallRng, SeedableRng};

#[test]
fn new_grid_is_empty_and_bounded() {
    let grid = MatchGrid::new();
    assert_eq!(grid.size(), 10);
    assert!(grid.is_in_bounds(9, 9));
    assert!(!grid.is_in_bounds(10, 0));
    assert!(!grid.is_in_bounds(0, 10));
    assert_eq!(grid.cell_at(4, 4), Ok(CellState::Empty));
    assert_eq!(grid.cell_at(10, 3), Err(MatchError::OutOfBounds { x: 10, y: 3 }));
}

#[test]
fn place_ship_is_all_or_nothing() {
    let mut grid = MatchGrid::new();
    grid.place_ship(&[(2, 2), (3, 2)]).unwrap();
    assert_eq!(grid.cell_at(2, 2), Ok(CellState::Ship));
    assert_eq!(grid.cell_at(3, 2), Ok(CellState::Ship));

    // Second ship overlaps on (3, 2); (4, 2) must stay empty.
    assert_eq!(grid.place_ship(&[(4, 2), (3, 2)]), Err(MatchError::Overlap));
    assert_eq!(grid.cell_at(4, 2), Ok(CellState::Empty));

    // An off-grid cell rejects the whole ship.
    assert!(matches!(
        grid.place_ship(&[(9, 0), (10, 0)]),
        Err(MatchError::OutOfBounds { .. })
    ));
    assert_eq!(grid.cell_at(9, 0), Ok(CellState::Empty));
    assert_eq!(grid.ship_cells_afloat(), 2);
}

#[test]
fn shots_are_terminal() {
    let mut grid = MatchGrid::new();
    grid.place_ship(&[(0, 0)]).unwrap();

    assert_eq!(grid.apply_shot(0, 0), Ok(ShotOutcome::Hit));
    assert_eq!(grid.apply_shot(1, 0), Ok(ShotOutcome::Miss));
    assert_eq!(grid.cell_at(0, 0), Ok(CellState::Hit));
    assert_eq!(grid.cell_at(1, 0), Ok(CellState::Miss));

    assert_eq!(grid.apply_shot(0, 0), Err(MatchError::AlreadyShot { x: 0, y: 0 }));
    assert_eq!(grid.apply_shot(1, 0), Err(MatchError::AlreadyShot { x: 1, y: 0 }));
    assert_eq!(grid.cell_at(0, 0), Ok(CellState::Hit));

    // Shot water can no longer take a ship.
    assert_eq!(grid.place_ship(&[(1, 0)]), Err(MatchError::Overlap));
    assert_eq!(grid.hit_count(), 1);
    assert_eq!(grid.shot_count(), 2);
}

#[test]
fn opponent_view_hides_unhit_ships() {
    let mut grid = MatchGrid::new();
    grid.place_ship(&[(0, 0), (0, 1)]).unwrap();
    grid.apply_shot(0, 0).unwrap();
    grid.apply_shot(5, 5).unwrap();

    let own = grid.view(GridView::Own);
    let theirs = grid.view(GridView::Opponent);
    assert_eq!(own.len(), 10);
    assert!(own.iter().all(|row| row.len() == 10));

    assert_eq!(own[0][0], CellState::Hit);
    assert_eq!(own[1][0], CellState::Ship);
    assert_eq!(own[5][5], CellState::Miss);
    assert_eq!(theirs[0][0], CellState::Hit);
    assert_eq!(theirs[1][0], CellState::Empty);
    assert_eq!(theirs[5][5], CellState::Miss);
}

#[test]
fn ship_cells_around_clips_and_ignores_hits() {
    let mut grid = MatchGrid::new();
    grid.place_ship(&[(0, 0), (1, 0), (2, 0)]).unwrap();
    grid.apply_shot(1, 0).unwrap();

    assert_eq!(grid.ship_cells_around(0, 0, 1), Ok(1));
    assert_eq!(grid.ship_cells_around(1, 1, 1), Ok(2));
    assert_eq!(grid.ship_cells_around(9, 9, 1), Ok(0));
    assert!(grid.ship_cells_around(10, 0, 1).is_err());
}

#[test]
fn random_placement_fills_a_fleet() {
    let mut rng = SmallRng::seed_from_u64(42);
    let mut grid = MatchGrid::new();
    for ship in STANDARD_FLEET {
        let (x, y, orientation) = grid.random_placement(&mut rng, ship).unwrap();
        let cells = FleetRules::footprint(ship, x, y, orientation, grid.size()).unwrap();
        grid.place_ship(&cells).unwrap();
    }
    assert_eq!(grid.ship_cells_afloat(), FleetRules::standard().total_ship_cells());
}

#[test]
fn footprint_follows_orientation() {
    let cruiser = FleetRules::standard().ship_type("cruiser").unwrap();
    assert_eq!(
        FleetRules::footprint(cruiser, 1, 2, Orientation::Horizontal, 10),
        Ok(vec![(1, 2), (2, 2), (3, 2)])
    );
    assert_eq!(
        FleetRules::footprint(cruiser, 1, 2, Orientation::Vertical, 10),
        Ok(vec![(1, 2), (1, 3), (1, 4)])
    );
    assert_eq!(
        FleetRules::footprint(cruiser, 1, 8, Orientation::Vertical, 10),
        Err(MatchError::OutOfBounds { x: 1, y: 10 })
    );
    assert!(FleetRules::footprint(cruiser, usize::MAX, 0, Orientation::Horizontal, 10).is_err());
}
