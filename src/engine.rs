//! Match engine: the state machine that validates and applies actions.
//!
//! Every operation is synchronous and run-to-completion. Validation always
//! precedes mutation, so an `Err` leaves the [`Match`] untouched. Successful
//! operations return the addressed events the session layer must deliver.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use log::{debug, info};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::common::{MatchError, ShotOutcome};
use crate::config::{EngineConfig, TurnRule, GRID_SIZE};
use crate::events::{notice, AttackMode, Dispatch, EndReason, Event, GridView};
use crate::game::{Match, MatchId, Phase};
use crate::player::{Player, PlayerId};
use crate::ship::{FleetRules, Orientation};

/// Radius of the neighborhood a radar scan inspects (3×3).
const RADAR_RADIUS: usize = 1;

/// An inbound action from one participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Join { name: String },
    PlaceShip {
        x: usize,
        y: usize,
        ship_type: String,
        orientation: Orientation,
    },
    Attack { x: usize, y: usize, mode: AttackMode },
    Chat { text: String },
    Leave,
}

pub struct MatchEngine {
    config: EngineConfig,
    fleet: FleetRules,
    rng: SmallRng,
}

impl MatchEngine {
    /// Engine with the standard fleet.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_fleet(config, FleetRules::standard())
    }

    pub fn with_fleet(config: EngineConfig, fleet: FleetRules) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => entropy_rng(),
        };
        Self { config, fleet, rng }
    }

    /// Open a match for `host`. It leaves `Initializing` immediately and
    /// waits for an opponent.
    pub fn create_match(&mut self, id: MatchId, host: Player) -> (Match, Vec<Dispatch>) {
        let host_id = host.id.clone();
        let mut game = Match::new(id, host, self.fleet);
        game.advance_to(Phase::AwaitingOpponent);
        info!("match {}: created by {}", game.id(), host_id);
        let events = alloc::vec![
            Dispatch::to_player(&host_id, Event::PhaseChanged { phase: Phase::AwaitingOpponent }),
            Dispatch::to_player(&host_id, notice("Welcome to Battleship!")),
            Dispatch::to_player(&host_id, notice("Waiting for opponent to join...")),
        ];
        (game, events)
    }

    /// Apply `action`, turning a rejection into a notice for the actor.
    pub fn handle(&mut self, game: &mut Match, actor: &PlayerId, action: Action) -> Vec<Dispatch> {
        let result = match action {
            Action::Join { name } => self.join_match(game, Player::new(actor.clone(), name)),
            Action::PlaceShip {
                x,
                y,
                ship_type,
                orientation,
            } => self.place_ship(game, actor, x, y, &ship_type, orientation),
            Action::Attack { x, y, mode } => self.attack(game, actor, x, y, mode),
            Action::Chat { text } => self.send_chat(game, actor, &text),
            Action::Leave => self.leave_match(game, actor),
        };
        result.unwrap_or_else(|err| {
            debug!("match {}: rejected action from {}: {:?}", game.id(), actor, err);
            alloc::vec![Dispatch::to_player(actor, notice(err.to_string()))]
        })
    }

    /// Seat the second player and open ship placement.
    pub fn join_match(&mut self, game: &mut Match, player: Player) -> Result<Vec<Dispatch>, MatchError> {
        if game.phase() == Phase::Finished {
            return Err(MatchError::MatchOver);
        }
        if game.is_full() {
            return Err(MatchError::MatchFull);
        }
        if game.is_participant(&player.id) {
            return Err(MatchError::PlayerIdTaken(player.id));
        }
        if game.phase() != Phase::AwaitingOpponent {
            return Err(MatchError::WrongPhase(game.phase()));
        }

        let mut events = Vec::new();
        for host in game.players() {
            events.push(Dispatch::to_player(
                &host.id,
                notice(format!("{} has joined.", player.display_name)),
            ));
        }
        info!("match {}: {} joined", game.id(), player.id);
        game.add_player(player);
        game.reset_player_states(self.config.square_blast_charges, self.config.radar_scan_charges);
        game.advance_to(Phase::Placement);
        events.push(Dispatch::to_everyone(Event::PhaseChanged {
            phase: Phase::Placement,
        }));
        events.push(Dispatch::to_everyone(notice("Game started! Place your ships!")));
        Ok(events)
    }

    /// Place one ship for `player` with its origin at (`x`, `y`).
    pub fn place_ship(
        &mut self,
        game: &mut Match,
        player: &PlayerId,
        x: usize,
        y: usize,
        ship_type: &str,
        orientation: Orientation,
    ) -> Result<Vec<Dispatch>, MatchError> {
        ensure_phase(game, Phase::Placement)?;
        let state = game
            .player_state(player)
            .ok_or_else(|| MatchError::PlayerNotInMatch(player.clone()))?;
        let ship = game.fleet().ship_type(ship_type)?;
        if state.placed_of(ship.id()) >= ship.count() {
            return Err(MatchError::AlreadyPlaced(ship.id()));
        }
        let cells = FleetRules::footprint(ship, x, y, orientation, GRID_SIZE)?;

        let state = game
            .player_state_mut(player)
            .ok_or_else(|| MatchError::PlayerNotInMatch(player.clone()))?;
        state.grid_mut().place_ship(&cells)?;
        state.record_placement(ship);
        let own_cells = state.grid().view(GridView::Own);
        debug!(
            "match {}: {} placed {} at ({}, {}) {:?}",
            game.id(),
            player,
            ship.id(),
            x,
            y,
            orientation
        );

        let mut events = alloc::vec![
            Dispatch::to_player(player, Event::ShipPlaced { ship_type: ship.id().to_string() }),
            Dispatch::to_player(
                player,
                Event::GridUpdated {
                    view: GridView::Own,
                    cells: own_cells,
                },
            ),
        ];

        let fleet = *game.fleet();
        let everyone_ready = game.is_full()
            && game
                .players()
                .iter()
                .all(|p| game.player_state(&p.id).is_some_and(|s| s.has_placed_fleet(&fleet)));
        if everyone_ready {
            events.extend(self.begin_battle(game));
        }
        Ok(events)
    }

    /// Fire at the opponent's grid, or use an ability.
    pub fn attack(
        &mut self,
        game: &mut Match,
        player: &PlayerId,
        x: usize,
        y: usize,
        mode: AttackMode,
    ) -> Result<Vec<Dispatch>, MatchError> {
        ensure_phase(game, Phase::Battle)?;
        if !game.is_participant(player) {
            return Err(MatchError::PlayerNotInMatch(player.clone()));
        }
        if game.turn_owner() != Some(player) {
            return Err(MatchError::NotYourTurn);
        }
        let opponent = game
            .opponent_of(player)
            .cloned()
            .ok_or_else(|| MatchError::PlayerNotInMatch(player.clone()))?;
        self.ensure_ability(game, player, mode)?;

        match mode {
            AttackMode::Single => self.fire_single(game, player, &opponent, x, y),
            AttackMode::SquareBlast => self.fire_square_blast(game, player, &opponent, x, y),
            AttackMode::RadarScan => self.radar_scan(game, player, &opponent, x, y),
        }
    }

    /// Relay chat to both participants. No state changes.
    pub fn send_chat(&self, game: &Match, player: &PlayerId, text: &str) -> Result<Vec<Dispatch>, MatchError> {
        let sender = game
            .player(player)
            .ok_or_else(|| MatchError::PlayerNotInMatch(player.clone()))?;
        Ok(alloc::vec![Dispatch::to_everyone(Event::Chat {
            from: sender.display_name.clone(),
            text: text.to_string(),
        })])
    }

    /// Remove `player`. An unfinished match ends and the remaining player,
    /// if any, wins by forfeit. Repeated departures are no-ops.
    pub fn leave_match(&mut self, game: &mut Match, player: &PlayerId) -> Result<Vec<Dispatch>, MatchError> {
        if game.has_departed(player) {
            return Ok(Vec::new());
        }
        let left = game
            .remove_player(player)
            .ok_or_else(|| MatchError::PlayerNotInMatch(player.clone()))?;
        info!("match {}: {} left in phase {:?}", game.id(), left.id, game.phase());

        let mut events = alloc::vec![Dispatch::to_everyone(notice(format!(
            "{} has left the game.",
            left.display_name
        )))];
        if game.phase() == Phase::Finished {
            return Ok(events);
        }

        let winner = game.players().first().map(|p| p.id.clone());
        game.finish(winner.clone());
        events.push(Dispatch::to_everyone(Event::PhaseChanged {
            phase: Phase::Finished,
        }));
        if let Some(winner) = winner {
            events.push(Dispatch::to_player(
                &winner,
                Event::OpponentLeft {
                    player: left.id.clone(),
                    name: left.display_name.clone(),
                },
            ));
            events.push(Dispatch::to_player(
                &winner,
                notice("Game over - opponent disconnected!"),
            ));
            events.push(Dispatch::to_everyone(Event::MatchEnded {
                winner,
                reason: EndReason::Forfeit,
            }));
        }
        Ok(events)
    }

    fn begin_battle(&mut self, game: &mut Match) -> Vec<Dispatch> {
        let ids: Vec<PlayerId> = game.players().iter().map(|p| p.id.clone()).collect();
        let first = ids[self.rng.random_range(0..ids.len())].clone();
        game.start_battle(first.clone());
        info!("match {}: battle begins, {} shoots first", game.id(), first);

        let mut events = alloc::vec![
            Dispatch::to_everyone(Event::PhaseChanged { phase: Phase::Battle }),
            Dispatch::to_everyone(notice("All ships placed! Battle begins!")),
            Dispatch::to_everyone(Event::RoundAdvanced { round: game.round() }),
        ];
        events.extend(turn_events(&ids, &first));
        events
    }

    fn ensure_ability(&self, game: &Match, player: &PlayerId, mode: AttackMode) -> Result<(), MatchError> {
        if mode == AttackMode::Single {
            return Ok(());
        }
        if !self.config.abilities_enabled {
            return Err(MatchError::AbilityUnavailable(mode));
        }
        let state = game
            .player_state(player)
            .ok_or_else(|| MatchError::PlayerNotInMatch(player.clone()))?;
        let left = match mode {
            AttackMode::SquareBlast => state.square_blasts_left(),
            AttackMode::RadarScan => state.radar_scans_left(),
            AttackMode::Single => return Ok(()),
        };
        if left == 0 {
            return Err(MatchError::AbilityUnavailable(mode));
        }
        Ok(())
    }

    fn fire_single(
        &mut self,
        game: &mut Match,
        player: &PlayerId,
        opponent: &PlayerId,
        x: usize,
        y: usize,
    ) -> Result<Vec<Dispatch>, MatchError> {
        let target = game
            .player_state_mut(opponent)
            .ok_or_else(|| MatchError::PlayerNotInMatch(opponent.clone()))?;
        let outcome = target.grid_mut().apply_shot(x, y)?;
        if outcome.is_hit() {
            target.record_hit_taken();
        }
        debug!("match {}: {} fired at ({}, {}): {:?}", game.id(), player, x, y, outcome);

        let mut events = match outcome {
            ShotOutcome::Hit => alloc::vec![
                Dispatch::to_player(player, notice("Direct hit!")),
                Dispatch::to_player(opponent, notice("Your ship was hit!")),
            ],
            ShotOutcome::Miss => alloc::vec![
                Dispatch::to_player(player, notice("You hit water!")),
                Dispatch::to_player(opponent, notice("Enemy missed!")),
            ],
        };
        events.extend(self.conclude_shots(game, player, opponent, outcome.is_hit()));
        Ok(events)
    }

    fn fire_square_blast(
        &mut self,
        game: &mut Match,
        player: &PlayerId,
        opponent: &PlayerId,
        x: usize,
        y: usize,
    ) -> Result<Vec<Dispatch>, MatchError> {
        let grid = game
            .player_state(opponent)
            .ok_or_else(|| MatchError::PlayerNotInMatch(opponent.clone()))?
            .grid();
        if !grid.is_in_bounds(x, y) {
            return Err(MatchError::OutOfBounds { x, y });
        }
        let targets: Vec<(usize, usize)> = [(x, y), (x + 1, y), (x, y + 1), (x + 1, y + 1)]
            .into_iter()
            .filter(|&(cx, cy)| grid.cell_at(cx, cy).is_ok_and(|cell| !cell.is_shot()))
            .collect();
        if targets.is_empty() {
            return Err(MatchError::AlreadyShot { x, y });
        }

        if let Some(state) = game.player_state_mut(player) {
            state.spend_square_blast();
        }
        let target = game
            .player_state_mut(opponent)
            .ok_or_else(|| MatchError::PlayerNotInMatch(opponent.clone()))?;
        let mut hits = 0;
        for &(cx, cy) in &targets {
            if target.grid_mut().apply_shot(cx, cy)?.is_hit() {
                target.record_hit_taken();
                hits += 1;
            }
        }
        debug!(
            "match {}: {} square blast at ({}, {}) hit {} of {}",
            game.id(),
            player,
            x,
            y,
            hits,
            targets.len()
        );

        let mut events = alloc::vec![
            Dispatch::to_player(
                player,
                notice(format!("Square Blast hit {} of {} cells!", hits, targets.len())),
            ),
            Dispatch::to_player(
                opponent,
                notice(format!("Enemy Square Blast hit {} of your ship cells!", hits)),
            ),
        ];
        events.extend(self.conclude_shots(game, player, opponent, hits > 0));
        Ok(events)
    }

    fn radar_scan(
        &mut self,
        game: &mut Match,
        player: &PlayerId,
        opponent: &PlayerId,
        x: usize,
        y: usize,
    ) -> Result<Vec<Dispatch>, MatchError> {
        let ship_cells = game
            .player_state(opponent)
            .ok_or_else(|| MatchError::PlayerNotInMatch(opponent.clone()))?
            .grid()
            .ship_cells_around(x, y, RADAR_RADIUS)?;
        if let Some(state) = game.player_state_mut(player) {
            state.spend_radar_scan();
        }
        debug!("match {}: {} radar scan at ({}, {}) found {}", game.id(), player, x, y, ship_cells);

        let mut events = alloc::vec![
            Dispatch::to_player(player, Event::ScanResult { x, y, ship_cells }),
            Dispatch::to_player(
                player,
                notice(format!("Radar detects {} ship segment(s) nearby.", ship_cells)),
            ),
            Dispatch::to_player(opponent, notice("The enemy ran a radar scan.")),
        ];
        events.extend(self.advance_turn(game, player, opponent, false));
        Ok(events)
    }

    /// Grid updates for both sides, then victory or the next turn.
    fn conclude_shots(
        &mut self,
        game: &mut Match,
        player: &PlayerId,
        opponent: &PlayerId,
        hit: bool,
    ) -> Vec<Dispatch> {
        let total = game.fleet().total_ship_cells();
        let Some(target) = game.player_state(opponent) else {
            return Vec::new();
        };
        let mut events = alloc::vec![
            Dispatch::to_player(
                player,
                Event::GridUpdated {
                    view: GridView::Opponent,
                    cells: target.grid().view(GridView::Opponent),
                },
            ),
            Dispatch::to_player(
                opponent,
                Event::GridUpdated {
                    view: GridView::Own,
                    cells: target.grid().view(GridView::Own),
                },
            ),
        ];

        if target.hit_cells_taken() >= total {
            let winner_name = game
                .player(player)
                .map(|p| p.display_name.clone())
                .unwrap_or_else(|| player.to_string());
            game.finish(Some(player.clone()));
            info!("match {}: {} wins", game.id(), player);
            events.extend([
                Dispatch::to_everyone(Event::PhaseChanged {
                    phase: Phase::Finished,
                }),
                Dispatch::to_player(player, notice("Victory! You've destroyed all enemy ships!")),
                Dispatch::to_player(opponent, notice("Defeat! All your ships are destroyed!")),
                Dispatch::to_everyone(Event::MatchEnded {
                    winner: player.clone(),
                    reason: EndReason::Victory,
                }),
                Dispatch::to_everyone(notice(format!("{} wins!", winner_name))),
            ]);
            return events;
        }

        events.extend(self.advance_turn(game, player, opponent, hit));
        events
    }

    fn advance_turn(
        &mut self,
        game: &mut Match,
        player: &PlayerId,
        opponent: &PlayerId,
        hit: bool,
    ) -> Vec<Dispatch> {
        let keeps_turn = hit && self.config.turn_rule == TurnRule::BonusShotOnHit;
        let next = if keeps_turn { player } else { opponent };
        let round = game.next_round(next.clone());
        let mut events = alloc::vec![Dispatch::to_everyone(Event::RoundAdvanced { round })];
        events.extend(turn_events(&[player.clone(), opponent.clone()], next));
        events
    }
}

fn ensure_phase(game: &Match, expected: Phase) -> Result<(), MatchError> {
    match game.phase() {
        phase if phase == expected => Ok(()),
        Phase::Finished => Err(MatchError::MatchOver),
        phase => Err(MatchError::WrongPhase(phase)),
    }
}

fn turn_events(players: &[PlayerId], owner: &PlayerId) -> Vec<Dispatch> {
    players
        .iter()
        .map(|p| {
            Dispatch::to_player(
                p,
                Event::TurnChanged {
                    player: owner.clone(),
                    your_turn: p == owner,
                },
            )
        })
        .collect()
}

#[cfg(feature = "std")]
fn entropy_rng() -> SmallRng {
    let mut seed_rng = rand::rng();
    SmallRng::from_rng(&mut seed_rng)
}

#[cfg(not(feature = "std"))]
fn entropy_rng() -> SmallRng {
    SmallRng::seed_from_u64(0x5eed_ba77_1e5f_1ee7)
}
