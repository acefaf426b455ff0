use ndarray::Array2;
use rand::prelude::*;

use crate::{BoardSpec, Minefield};

/// Strategy seam for producing mine layouts. Implementations consume
/// themselves so a generator can carry one-shot state such as a seed.
pub trait MinefieldGenerator {
    fn generate(self, spec: &BoardSpec) -> Minefield;
}

/// Draws positions uniformly at random, skipping any that already hold a
/// mine, until the requested count is placed. [`BoardSpec`] keeps the mine
/// count strictly below the cell count, so the rejection loop always
/// terminates.
///
/// The same seed and spec always produce the same minefield.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RandomMinefieldGenerator {
    seed: u64,
}

impl RandomMinefieldGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl MinefieldGenerator for RandomMinefieldGenerator {
    fn generate(self, spec: &BoardSpec) -> Minefield {
        let (rows, cols) = spec.size();
        let mut mines: Array2<bool> = Array2::default((rows, cols));
        let mut rng = SmallRng::seed_from_u64(self.seed);

        let mut placed = 0;
        while placed < spec.mines() {
            let pos = (rng.random_range(0..rows), rng.random_range(0..cols));
            if !mines[pos] {
                mines[pos] = true;
                placed += 1;
            }
        }

        log::debug!(
            "generated {}x{} minefield with {} mines from seed {}",
            rows,
            cols,
            placed,
            self.seed
        );
        Minefield::from_mine_mask(mines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Difficulty;

    #[test]
    fn places_exactly_the_requested_mine_count() {
        for difficulty in Difficulty::ALL {
            let spec = difficulty.board_spec();
            let field = RandomMinefieldGenerator::new(7).generate(&spec);

            assert_eq!(field.mine_count(), spec.mines(), "{difficulty:?}");
            assert_eq!(field.size(), spec.size());
        }
    }

    #[test]
    fn same_seed_reproduces_the_same_layout() {
        let spec = Difficulty::Beginner.board_spec();

        let first = RandomMinefieldGenerator::new(42).generate(&spec);
        let second = RandomMinefieldGenerator::new(42).generate(&spec);

        assert_eq!(first, second);
    }

    #[test]
    fn dense_board_still_terminates() {
        // 15 mines in 16 cells forces the rejection loop to retry a lot.
        let spec = BoardSpec::new(4, 4, 15).unwrap();
        let field = RandomMinefieldGenerator::new(3).generate(&spec);

        assert_eq!(field.mine_count(), 15);
        assert_eq!(field.safe_cells(), 1);
    }
}
