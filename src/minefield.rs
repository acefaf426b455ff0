use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::ops::Index;

use crate::{GameError, NeighborIter, Pos, Result};

/// Immutable mine placement plus the per-cell neighbor-mine counts derived
/// from it.
///
/// Counts are computed once, after placement and before any reveal; the
/// reveal engine only ever reads this structure. A fresh minefield is built
/// for every new game or difficulty change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Minefield {
    mines: Array2<bool>,
    counts: Array2<u8>,
    mine_count: usize,
}

impl Minefield {
    /// Wraps a mine mask, counting its mines and precomputing every cell's
    /// neighbor-mine count.
    pub fn from_mine_mask(mines: Array2<bool>) -> Self {
        let counts = compute_neighbor_counts(&mines);
        let mine_count = mines.iter().filter(|&&mine| mine).count();
        Self {
            mines,
            counts,
            mine_count,
        }
    }

    /// Exact layout from explicit mine positions, for reproducible boards.
    pub fn from_mine_coords(size: Pos, mine_coords: &[Pos]) -> Result<Self> {
        let mut mines: Array2<bool> = Array2::default(size);

        for &pos in mine_coords {
            if pos.0 >= size.0 || pos.1 >= size.1 {
                return Err(GameError::InvalidCoords);
            }
            mines[pos] = true;
        }

        Ok(Self::from_mine_mask(mines))
    }

    pub fn validate_coords(&self, pos: Pos) -> Result<Pos> {
        let (rows, cols) = self.size();
        if pos.0 < rows && pos.1 < cols {
            Ok(pos)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn size(&self) -> Pos {
        self.mines.dim()
    }

    pub fn total_cells(&self) -> usize {
        self.mines.len()
    }

    pub fn safe_cells(&self) -> usize {
        self.total_cells() - self.mine_count
    }

    pub fn mine_count(&self) -> usize {
        self.mine_count
    }

    pub fn contains_mine(&self, pos: Pos) -> bool {
        self.mines[pos]
    }

    /// Number of mines among the in-bounds neighbors of `pos`. Meaningful
    /// for display only on non-mine cells.
    pub fn neighbor_mines(&self, pos: Pos) -> u8 {
        self.counts[pos]
    }

    pub fn iter_neighbors(&self, pos: Pos) -> NeighborIter {
        NeighborIter::new(pos, self.size())
    }
}

impl Index<Pos> for Minefield {
    type Output = bool;

    fn index(&self, pos: Pos) -> &Self::Output {
        &self.mines[pos]
    }
}

fn compute_neighbor_counts(mines: &Array2<bool>) -> Array2<u8> {
    let bounds = mines.dim();
    let mut counts: Array2<u8> = Array2::zeros(bounds);

    for (pos, _) in mines.indexed_iter() {
        counts[pos] = NeighborIter::new(pos, bounds)
            .filter(|&neighbor| mines[neighbor])
            .count()
            .try_into()
            .unwrap();
    }

    counts
}
