use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::ops::BitOr;

use crate::{Cell, Minefield, Pos, Result};

/// Valid transitions:
/// - NotStarted -> Running
/// - NotStarted -> Won / Lost (a first open can end the game on its own)
/// - Running -> Won / Lost
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    NotStarted,
    Running,
    Won,
    Lost,
}

impl GameState {
    pub const fn is_initial(self) -> bool {
        matches!(self, Self::NotStarted)
    }

    /// The game is over; no further board mutation is accepted.
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::NotStarted
    }
}

/// Outcome of opening one or more cells.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OpenOutcome {
    NoChange,
    Opened,
    Exploded,
    Won,
}

impl OpenOutcome {
    /// Whether this outcome changed the board.
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

/// Merges per-neighbor outcomes when chording.
impl BitOr for OpenOutcome {
    type Output = OpenOutcome;

    fn bitor(self, rhs: Self) -> Self::Output {
        use OpenOutcome::*;
        match (self, rhs) {
            (Exploded, _) | (_, Exploded) => Exploded,
            (Won, _) | (_, Won) => Won,
            (Opened, _) | (_, Opened) => Opened,
            (NoChange, NoChange) => NoChange,
        }
    }
}

/// Outcome of toggling a flag.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlagOutcome {
    NoChange,
    Changed,
}

impl FlagOutcome {
    pub const fn has_update(self) -> bool {
        matches!(self, Self::Changed)
    }
}

/// A single board played from start to finish: the minefield, the
/// player-visible grid, and the state machine over both.
///
/// Redundant actions (opening an open or flagged cell, flagging an open
/// cell, chording with a mismatched flag count, anything after the game is
/// over) are silent no-ops, never errors. The only error an operation can
/// return is [`GameError::InvalidCoords`](crate::GameError::InvalidCoords)
/// for positions outside the board.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Game {
    minefield: Minefield,
    grid: Array2<Cell>,
    open_count: usize,
    flag_count: usize,
    state: GameState,
}

impl Game {
    pub fn new(minefield: Minefield) -> Self {
        let size = minefield.size();
        Self {
            minefield,
            grid: Array2::default(size),
            open_count: 0,
            flag_count: 0,
            state: GameState::default(),
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_over(&self) -> bool {
        self.state.is_final()
    }

    pub fn size(&self) -> Pos {
        self.minefield.size()
    }

    pub fn total_mines(&self) -> usize {
        self.minefield.mine_count()
    }

    pub fn cell_at(&self, pos: Pos) -> Cell {
        self.grid[pos]
    }

    pub fn flags_placed(&self) -> usize {
        self.flag_count
    }

    /// How many mines are still unflagged. Goes negative when the player
    /// places more flags than there are mines.
    pub fn mines_left(&self) -> isize {
        self.total_mines() as isize - self.flag_count as isize
    }

    /// True once every safe cell is open. Flags play no part in it.
    pub fn is_cleared(&self) -> bool {
        self.open_count == self.minefield.safe_cells()
    }

    /// Open a closed cell, cascading from it when it has no neighboring
    /// mines. Opening a flagged or already open cell changes nothing.
    pub fn open(&mut self, pos: Pos) -> Result<OpenOutcome> {
        let pos = self.minefield.validate_coords(pos)?;

        if self.state.is_final() {
            return Ok(OpenOutcome::NoChange);
        }

        Ok(match self.grid[pos] {
            Cell::Closed => self.open_cell(pos),
            _ => OpenOutcome::NoChange,
        })
    }

    /// Whether a chord on `pos` would open its remaining neighbors.
    pub fn is_chordable(&self, pos: Pos) -> bool {
        if self.state.is_final() {
            return false;
        }

        match self.grid[pos] {
            Cell::Open(count) => count > 0 && count == self.count_flagged(pos),
            _ => false,
        }
    }

    /// Open every closed neighbor of an open numbered cell whose flag count
    /// matches its number; each open follows the usual cascade semantics.
    ///
    /// The flags are taken at face value: a misplaced flag makes a matching
    /// chord open a real mine and lose the game.
    pub fn chord(&mut self, pos: Pos) -> Result<OpenOutcome> {
        let pos = self.minefield.validate_coords(pos)?;

        if self.state.is_final() {
            return Ok(OpenOutcome::NoChange);
        }

        Ok(match self.grid[pos] {
            Cell::Open(count) if count > 0 && count == self.count_flagged(pos) => self
                .minefield
                .iter_neighbors(pos)
                .map(|neighbor| self.open_cell(neighbor))
                .reduce(BitOr::bitor)
                .unwrap_or(OpenOutcome::NoChange),
            _ => OpenOutcome::NoChange,
        })
    }

    /// Flip the flag on a closed cell. There is no cap: flags may outnumber
    /// the mines. Open cells cannot be flagged.
    pub fn toggle_flag(&mut self, pos: Pos) -> Result<FlagOutcome> {
        let pos = self.minefield.validate_coords(pos)?;

        if self.state.is_final() {
            return Ok(FlagOutcome::NoChange);
        }

        Ok(match self.grid[pos] {
            Cell::Closed => {
                self.grid[pos] = Cell::Flagged;
                self.flag_count += 1;
                FlagOutcome::Changed
            }
            Cell::Flagged => {
                self.grid[pos] = Cell::Closed;
                self.flag_count -= 1;
                FlagOutcome::Changed
            }
            _ => FlagOutcome::NoChange,
        })
    }

    fn count_flagged(&self, pos: Pos) -> u8 {
        self.minefield
            .iter_neighbors(pos)
            .filter(|&neighbor| self.grid[neighbor] == Cell::Flagged)
            .count()
            .try_into()
            .unwrap()
    }

    /// Open a single cell and flood-fill from it when it has no neighboring
    /// mines.
    fn open_cell(&mut self, pos: Pos) -> OpenOutcome {
        use OpenOutcome::*;

        if self.state.is_final() {
            return NoChange;
        }

        match (self.grid[pos], self.minefield.contains_mine(pos)) {
            (Cell::Closed, true) => {
                self.grid[pos] = Cell::Exploded;
                log::debug!("opened a mine at {pos:?}");
                self.mark_ended(false);
                Exploded
            }
            (Cell::Closed, false) => {
                let count = self.minefield.neighbor_mines(pos);
                self.grid[pos] = Cell::Open(count);
                self.open_count += 1;
                log::debug!("opened cell at {pos:?}, neighbor mines: {count}");

                if count == 0 {
                    self.flood_fill(pos);
                }

                if self.is_cleared() {
                    self.mark_ended(true);
                    Won
                } else {
                    self.mark_started();
                    Opened
                }
            }
            _ => NoChange,
        }
    }

    /// Worklist traversal over the connected zero-count region plus its
    /// numbered border. The open state doubles as the visited marker, so the
    /// cascade cannot revisit a cell and terminates on any board, including
    /// one with no mines at all.
    ///
    /// A zero-count cell has no mine neighbors by definition, so the
    /// frontier never reaches a mine. Flagged cells stay closed and bound
    /// the cascade.
    fn flood_fill(&mut self, start: Pos) {
        let mut visited = HashSet::from([start]);
        let mut frontier: VecDeque<Pos> = self
            .minefield
            .iter_neighbors(start)
            .filter(|&pos| self.grid[pos] == Cell::Closed)
            .collect();
        log::trace!("flood-fill from {start:?}, initial frontier: {frontier:?}");

        while let Some(pos) = frontier.pop_front() {
            if !visited.insert(pos) {
                continue;
            }

            if self.grid[pos] != Cell::Closed {
                continue;
            }

            let count = self.minefield.neighbor_mines(pos);
            self.grid[pos] = Cell::Open(count);
            self.open_count += 1;
            log::trace!("cascade opened {pos:?}, neighbor mines: {count}");

            if count == 0 {
                frontier.extend(
                    self.minefield
                        .iter_neighbors(pos)
                        .filter(|&neighbor| self.grid[neighbor] == Cell::Closed)
                        .filter(|neighbor| !visited.contains(neighbor)),
                );
            }
        }
    }

    fn mark_started(&mut self) {
        if self.state.is_initial() {
            self.state = GameState::Running;
        }
    }

    fn mark_ended(&mut self, won: bool) {
        if self.state.is_final() {
            return;
        }

        self.state = if won { GameState::Won } else { GameState::Lost };
        log::debug!("game over: {:?}", self.state);
        if !won {
            self.reveal_mines();
        }
    }

    /// Annotate the board for the end-of-loss display: every remaining mine
    /// is shown open and misplaced flags are called out.
    fn reveal_mines(&mut self) {
        let (rows, cols) = self.minefield.size();
        for row in 0..rows {
            for col in 0..cols {
                let pos = (row, col);
                match self.grid[pos] {
                    Cell::Closed | Cell::Flagged if self.minefield.contains_mine(pos) => {
                        self.grid[pos] = Cell::Mine;
                    }
                    Cell::Flagged => {
                        self.grid[pos] = Cell::WrongFlag;
                    }
                    _ => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameError;

    fn game(size: Pos, mines: &[Pos]) -> Game {
        Game::new(Minefield::from_mine_coords(size, mines).unwrap())
    }

    #[test]
    fn opening_a_mine_loses_and_reveals_the_rest() {
        let mut game = game((3, 3), &[(0, 0), (2, 2)]);
        game.toggle_flag((1, 0)).unwrap();

        let outcome = game.open((2, 2)).unwrap();

        assert_eq!(outcome, OpenOutcome::Exploded);
        assert_eq!(game.state(), GameState::Lost);
        assert_eq!(game.cell_at((2, 2)), Cell::Exploded);
        assert_eq!(game.cell_at((0, 0)), Cell::Mine);
        assert_eq!(game.cell_at((1, 0)), Cell::WrongFlag);
    }

    #[test]
    fn cascade_opens_zero_region_and_numbered_border() {
        let mut game = game((3, 3), &[(2, 2)]);

        let outcome = game.open((0, 0)).unwrap();

        assert_eq!(outcome, OpenOutcome::Won);
        assert_eq!(game.cell_at((0, 0)), Cell::Open(0));
        assert_eq!(game.cell_at((1, 1)), Cell::Open(1));
        assert_eq!(game.cell_at((2, 2)), Cell::Closed);
    }

    #[test]
    fn corner_cascade_on_nine_by_nine_board_is_deterministic() {
        // Ten mines: the whole bottom row plus one above its right end.
        let mut mines: Vec<Pos> = (0..9).map(|col| (8, col)).collect();
        mines.push((7, 8));
        let mut game = game((9, 9), &mines);

        let outcome = game.open((0, 0)).unwrap();

        assert_eq!(outcome, OpenOutcome::Won);
        assert!(game.is_cleared());
        assert_eq!(game.cell_at((5, 4)), Cell::Open(0));
        assert_eq!(game.cell_at((6, 7)), Cell::Open(1));
        assert_eq!(game.cell_at((7, 0)), Cell::Open(2));
        assert_eq!(game.cell_at((7, 7)), Cell::Open(4));
        // Mines are not revealed on a win.
        assert_eq!(game.cell_at((8, 4)), Cell::Closed);
        assert_eq!(game.cell_at((7, 8)), Cell::Closed);
    }

    #[test]
    fn cascade_stops_at_flags() {
        let mut game = game((3, 3), &[(2, 2)]);
        game.toggle_flag((0, 1)).unwrap();

        let outcome = game.open((0, 0)).unwrap();

        assert_eq!(outcome, OpenOutcome::Opened);
        assert_eq!(game.cell_at((0, 1)), Cell::Flagged);
        assert!(!game.is_cleared());

        game.toggle_flag((0, 1)).unwrap();
        let outcome = game.open((0, 1)).unwrap();

        assert_eq!(outcome, OpenOutcome::Won);
    }

    #[test]
    fn mineless_board_cascade_terminates_and_wins() {
        let mut game = game((4, 4), &[]);

        let outcome = game.open((1, 1)).unwrap();

        assert_eq!(outcome, OpenOutcome::Won);
        assert!(game.is_cleared());
    }

    #[test]
    fn open_is_rejected_on_flagged_and_open_cells() {
        let mut game = game((2, 2), &[(1, 1)]);

        game.toggle_flag((0, 0)).unwrap();
        assert_eq!(game.open((0, 0)).unwrap(), OpenOutcome::NoChange);
        assert_eq!(game.cell_at((0, 0)), Cell::Flagged);

        game.toggle_flag((0, 0)).unwrap();
        assert_eq!(game.open((0, 0)).unwrap(), OpenOutcome::Opened);
        assert_eq!(game.open((0, 0)).unwrap(), OpenOutcome::NoChange);
    }

    #[test]
    fn chord_opens_exactly_the_unflagged_closed_neighbors() {
        let mut game = game((3, 4), &[(0, 1), (2, 1)]);

        assert_eq!(game.open((1, 1)).unwrap(), OpenOutcome::Opened);
        assert_eq!(game.cell_at((1, 1)), Cell::Open(2));

        game.toggle_flag((0, 1)).unwrap();
        game.toggle_flag((2, 1)).unwrap();
        assert!(game.is_chordable((1, 1)));

        let outcome = game.chord((1, 1)).unwrap();

        assert_eq!(outcome, OpenOutcome::Opened);
        for pos in [(0, 0), (0, 2), (1, 0), (1, 2), (2, 0), (2, 2)] {
            assert!(game.cell_at(pos).is_open(), "{pos:?} should be open");
        }
        // Flags stay put and cells beyond the neighborhood stay closed.
        assert_eq!(game.cell_at((0, 1)), Cell::Flagged);
        assert_eq!(game.cell_at((2, 1)), Cell::Flagged);
        for pos in [(0, 3), (1, 3), (2, 3)] {
            assert_eq!(game.cell_at(pos), Cell::Closed, "{pos:?}");
        }
    }

    #[test]
    fn chord_with_mismatched_flag_count_is_a_no_op() {
        let mut game = game((3, 4), &[(0, 1), (2, 1)]);
        game.open((1, 1)).unwrap();
        game.toggle_flag((0, 1)).unwrap();

        assert!(!game.is_chordable((1, 1)));
        assert_eq!(game.chord((1, 1)).unwrap(), OpenOutcome::NoChange);
        assert_eq!(game.cell_at((1, 0)), Cell::Closed);
    }

    #[test]
    fn chord_with_misplaced_flags_can_detonate() {
        let mut game = game((3, 4), &[(0, 1), (2, 1)]);
        game.open((1, 1)).unwrap();
        // Two flags match the count, but one of them sits on a safe cell.
        game.toggle_flag((0, 1)).unwrap();
        game.toggle_flag((0, 0)).unwrap();

        let outcome = game.chord((1, 1)).unwrap();

        assert_eq!(outcome, OpenOutcome::Exploded);
        assert_eq!(game.state(), GameState::Lost);
        assert_eq!(game.cell_at((2, 1)), Cell::Exploded);
        assert_eq!(game.cell_at((0, 0)), Cell::WrongFlag);
        assert_eq!(game.cell_at((0, 1)), Cell::Mine);
    }

    #[test]
    fn chord_requires_an_open_numbered_target() {
        let mut game = game((3, 4), &[(0, 1), (2, 1)]);

        assert_eq!(game.chord((1, 0)).unwrap(), OpenOutcome::NoChange);

        game.open((0, 3)).unwrap();
        assert_eq!(game.cell_at((0, 3)), Cell::Open(0));
        assert!(!game.is_chordable((0, 3)));
        assert_eq!(game.chord((0, 3)).unwrap(), OpenOutcome::NoChange);
    }

    #[test]
    fn toggle_flag_bookkeeping() {
        let mut game = game((2, 2), &[(0, 0)]);

        assert_eq!(game.toggle_flag((0, 1)).unwrap(), FlagOutcome::Changed);
        assert_eq!(game.flags_placed(), 1);
        assert_eq!(game.mines_left(), 0);

        // No cap: the counter is allowed to go negative.
        game.toggle_flag((1, 0)).unwrap();
        assert_eq!(game.mines_left(), -1);

        // Toggling twice is a net no-op.
        game.toggle_flag((1, 1)).unwrap();
        game.toggle_flag((1, 1)).unwrap();
        assert_eq!(game.cell_at((1, 1)), Cell::Closed);
        assert_eq!(game.flags_placed(), 2);

        game.open((1, 1)).unwrap();
        assert_eq!(game.toggle_flag((1, 1)).unwrap(), FlagOutcome::NoChange);
    }

    #[test]
    fn first_open_starts_the_game() {
        let mut game = game((3, 3), &[(2, 2)]);

        assert_eq!(game.state(), GameState::NotStarted);
        game.toggle_flag((0, 1)).unwrap();
        assert_eq!(game.state(), GameState::NotStarted);

        game.open((1, 2)).unwrap();
        assert_eq!(game.state(), GameState::Running);
    }

    #[test]
    fn lost_game_ignores_further_actions() {
        let mut game = game((2, 2), &[(0, 0)]);
        game.open((0, 0)).unwrap();
        assert_eq!(game.state(), GameState::Lost);

        assert_eq!(game.open((0, 1)).unwrap(), OpenOutcome::NoChange);
        assert_eq!(game.cell_at((0, 1)), Cell::Closed);
        assert_eq!(game.toggle_flag((0, 1)).unwrap(), FlagOutcome::NoChange);
        assert_eq!(game.chord((0, 1)).unwrap(), OpenOutcome::NoChange);
    }

    #[test]
    fn win_ignores_flags_entirely() {
        let mut game = game((2, 2), &[(0, 0)]);

        for pos in [(0, 1), (1, 0)] {
            assert_eq!(game.open(pos).unwrap(), OpenOutcome::Opened);
            assert!(!game.is_cleared());
        }

        // The mine is never flagged; opening the last safe cell still wins.
        assert_eq!(game.open((1, 1)).unwrap(), OpenOutcome::Won);
        assert_eq!(game.state(), GameState::Won);
        assert_eq!(game.toggle_flag((0, 0)).unwrap(), FlagOutcome::NoChange);
    }

    #[test]
    fn out_of_bounds_coordinates_are_an_error() {
        let mut game = game((3, 3), &[(2, 2)]);

        assert_eq!(game.open((3, 0)), Err(GameError::InvalidCoords));
        assert_eq!(game.chord((0, 3)), Err(GameError::InvalidCoords));
        assert_eq!(game.toggle_flag((9, 9)), Err(GameError::InvalidCoords));
    }

    #[test]
    fn game_survives_a_serialization_round_trip() {
        let mut game = game((3, 3), &[(2, 2)]);
        game.open((1, 2)).unwrap();
        game.toggle_flag((2, 2)).unwrap();

        let json = serde_json::to_string(&game).unwrap();
        let restored: Game = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, game);
    }
}
