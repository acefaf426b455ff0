use rand::prelude::*;

use crate::{
    Cell, Difficulty, FlagOutcome, Game, GameState, MinefieldGenerator, OpenOutcome, Pos,
    RandomMinefieldGenerator, Result, ScoreBoard,
};

/// Owns the active game and everything around it: the chosen difficulty,
/// the elapsed-time counter, and the best-times board.
///
/// There is exactly one live session at a time, constructed explicitly and
/// replaced wholesale on reset. The presentation adapter drives it through
/// the mutating operations and reads it through the accessors; it never
/// touches the board directly. Once the game is over, every action other
/// than [`new_game`](Self::new_game) and
/// [`change_difficulty`](Self::change_difficulty) is a silent no-op.
#[derive(Debug)]
pub struct GameSession {
    difficulty: Difficulty,
    game: Game,
    elapsed_secs: u32,
    scores: ScoreBoard,
}

impl GameSession {
    pub fn new(difficulty: Difficulty, scores: ScoreBoard) -> Self {
        Self::with_seed(difficulty, rand::rng().random(), scores)
    }

    /// Deterministic variant of [`GameSession::new`]: the same seed and
    /// difficulty always produce the same board.
    pub fn with_seed(difficulty: Difficulty, seed: u64, scores: ScoreBoard) -> Self {
        Self {
            difficulty,
            game: new_game_for(difficulty, seed),
            elapsed_secs: 0,
            scores,
        }
    }

    pub fn state(&self) -> GameState {
        self.game.state()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn size(&self) -> Pos {
        self.game.size()
    }

    pub fn cell_at(&self, pos: Pos) -> Cell {
        self.game.cell_at(pos)
    }

    /// Whole seconds played so far, as counted by [`tick`](Self::tick).
    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    pub fn flags_placed(&self) -> usize {
        self.game.flags_placed()
    }

    /// Mines minus flags; negative once the player over-flags.
    pub fn mines_left(&self) -> isize {
        self.game.mines_left()
    }

    pub fn total_mines(&self) -> usize {
        self.game.total_mines()
    }

    pub fn is_chordable(&self, pos: Pos) -> bool {
        self.game.is_chordable(pos)
    }

    /// Best recorded time for the current difficulty.
    pub fn best_time(&self) -> Option<u32> {
        self.scores.best(self.difficulty)
    }

    pub fn scores(&self) -> &ScoreBoard {
        &self.scores
    }

    pub fn open(&mut self, pos: Pos) -> Result<OpenOutcome> {
        if self.game.is_over() {
            return Ok(OpenOutcome::NoChange);
        }

        let outcome = self.game.open(pos)?;
        self.after_reveal(outcome);
        Ok(outcome)
    }

    pub fn chord(&mut self, pos: Pos) -> Result<OpenOutcome> {
        if self.game.is_over() {
            return Ok(OpenOutcome::NoChange);
        }

        let outcome = self.game.chord(pos)?;
        self.after_reveal(outcome);
        Ok(outcome)
    }

    pub fn toggle_flag(&mut self, pos: Pos) -> Result<FlagOutcome> {
        if self.game.is_over() {
            return Ok(FlagOutcome::NoChange);
        }

        self.game.toggle_flag(pos)
    }

    /// Once-per-second callback from the adapter's timer; only counts while
    /// the game is running. The adapter cancels its timer on a terminal
    /// transition and on reset, but a stray late tick is harmless.
    pub fn tick(&mut self) {
        if matches!(self.game.state(), GameState::Running) {
            self.elapsed_secs += 1;
        }
    }

    /// Discard the board and deal a fresh one with the current difficulty.
    pub fn new_game(&mut self) {
        self.reset(self.difficulty);
    }

    /// Switch presets and start over. Re-selecting the current difficulty
    /// changes nothing, the running board included.
    pub fn change_difficulty(&mut self, difficulty: Difficulty) {
        if difficulty != self.difficulty {
            self.reset(difficulty);
        }
    }

    fn reset(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.game = new_game_for(difficulty, rand::rng().random());
        self.elapsed_secs = 0;
        log::debug!("new {difficulty:?} game dealt");
    }

    fn after_reveal(&mut self, outcome: OpenOutcome) {
        if outcome == OpenOutcome::Won && self.scores.record(self.difficulty, self.elapsed_secs) {
            log::debug!(
                "new best time for {:?}: {}s",
                self.difficulty,
                self.elapsed_secs
            );
        }
    }

    #[cfg(test)]
    fn from_parts(difficulty: Difficulty, game: Game, scores: ScoreBoard) -> Self {
        Self {
            difficulty,
            game,
            elapsed_secs: 0,
            scores,
        }
    }
}

fn new_game_for(difficulty: Difficulty, seed: u64) -> Game {
    Game::new(RandomMinefieldGenerator::new(seed).generate(&difficulty.board_spec()))
}
