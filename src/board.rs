use std::fmt;

use rand::{seq::SliceRandom, Rng};

use crate::{
    direction::Direction,
    logic::{self, Candidate, Grid, SIZE},
};

/// A single game's state: the grid plus the card queued to enter play after
/// the next swipe.
///
/// All randomness comes through the `rng` arguments, so a seeded generator
/// replays a game exactly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    grid: Grid,
    next_card: u32,
}

impl Board {
    /// Deals a fresh board: 2 or 3 cards of each face value 1, 2 and 3
    /// scattered over distinct cells (6 to 9 cards in total), and a queued
    /// next card drawn uniformly from those values.
    pub fn new(rng: &mut impl Rng) -> Self {
        let mut grid: Grid = [[None; SIZE]; SIZE];

        let mut positions: Vec<(usize, usize)> = (0..SIZE)
            .flat_map(|row| (0..SIZE).map(move |col| (row, col)))
            .collect();
        positions.shuffle(rng);

        let mut cells = positions.into_iter();
        for card in 1u32..=3 {
            let count = rng.gen_range(2usize..=3);
            for (row, col) in cells.by_ref().take(count) {
                grid[row][col] = Some(card);
            }
        }

        Self {
            grid,
            next_card: rng.gen_range(1..=3),
        }
    }

    /// Throws the current game away and deals a new one.
    pub fn reset(&mut self, rng: &mut impl Rng) {
        *self = Self::new(rng);
    }

    /// Rebuilds a board from known parts.
    pub fn from_parts(grid: Grid, next_card: u32) -> Self {
        Self { grid, next_card }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The card that will enter play after the next committed swipe.
    pub fn next_card(&self) -> u32 {
        self.next_card
    }

    pub fn score(&self) -> u64 {
        logic::score(&self.grid)
    }

    /// Whether any swipe can still change the board.
    pub fn can_move(&self) -> bool {
        logic::can_move(&self.grid)
    }

    /// Computes the outcome of a swipe without touching the board. The
    /// candidate does not include the queued card; `apply_move` places it.
    pub fn preview_move(&self, direction: Direction) -> Option<Candidate> {
        logic::try_move(self.grid, direction)
    }

    /// Commits a swipe: shifts and merges, drops the queued card into one of
    /// the freed slots, then queues a fresh card. Returns the committed grid,
    /// or `None` without any state change if the swipe is illegal.
    pub fn apply_move(&mut self, rng: &mut impl Rng, direction: Direction) -> Option<Grid> {
        let Candidate {
            mut grid,
            open_slots,
        } = logic::try_move(self.grid, direction)?;

        let &(row, col) = open_slots.choose(rng)?;
        grid[row][col] = Some(self.next_card);

        self.grid = grid;
        // The card just placed keeps the grid non-empty.
        self.next_card = logic::draw_card(rng, &self.grid).unwrap_or(1);

        Some(grid)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.grid {
            for (col, cell) in row.iter().enumerate() {
                if col > 0 {
                    f.write_str("\t")?;
                }
                match cell {
                    Some(card) => write!(f, "{card}")?,
                    None => f.write_str(".")?,
                }
            }
            writeln!(f)?;
        }

        write!(f, "next: {}", self.next_card)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    const N: Option<u32> = None;

    fn deadlocked() -> Grid {
        [
            [Some(1), Some(3), Some(6), Some(12)],
            [Some(3), Some(6), Some(12), Some(24)],
            [Some(6), Some(12), Some(24), Some(48)],
            [Some(12), Some(24), Some(48), Some(96)],
        ]
    }

    #[test]
    fn new_deals_two_or_three_of_each_starting_card() {
        for seed in 0..32 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let board = Board::new(&mut rng);

            let mut counts = [0usize; 4];
            for cell in board.grid().iter().flatten().flatten() {
                counts[*cell as usize] += 1;
            }

            for card in 1..=3 {
                assert!(
                    (2..=3).contains(&counts[card]),
                    "seed {seed}: {} cards of value {card}",
                    counts[card]
                );
            }

            let total: usize = counts.iter().sum();
            assert!((6..=9).contains(&total));
            assert!((1..=3).contains(&board.next_card()));
        }
    }

    #[test]
    fn new_is_deterministic_under_a_fixed_seed() {
        let a = Board::new(&mut ChaCha8Rng::seed_from_u64(7));
        let b = Board::new(&mut ChaCha8Rng::seed_from_u64(7));

        assert_eq!(a, b);
    }

    #[test]
    fn reset_matches_a_fresh_deal() {
        let mut board = Board::new(&mut ChaCha8Rng::seed_from_u64(3));
        board.reset(&mut ChaCha8Rng::seed_from_u64(11));

        assert_eq!(board, Board::new(&mut ChaCha8Rng::seed_from_u64(11)));
    }

    #[test]
    fn preview_never_mutates() {
        let board = Board::new(&mut ChaCha8Rng::seed_from_u64(5));
        let snapshot = board.clone();

        let first = board.preview_move(Direction::Left);
        let second = board.preview_move(Direction::Left);

        assert_eq!(first, second);
        assert_eq!(board, snapshot);
    }

    #[test]
    fn apply_move_places_the_queued_card() {
        let mut grid = [[N; SIZE]; SIZE];
        grid[0][0] = Some(1);
        grid[0][1] = Some(2);

        let mut board = Board::from_parts(grid, 3);
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        let committed = board.apply_move(&mut rng, Direction::Left).unwrap();

        assert_eq!(committed, *board.grid());
        assert_eq!(committed[0][0], Some(3));

        // The merge left one card; the queued 3 landed on the trailing edge.
        let placed: Vec<_> = (0..SIZE).filter(|&r| committed[r][3] == Some(3)).collect();
        assert_eq!(placed.len(), 1);

        let total = committed.iter().flatten().flatten().count();
        assert_eq!(total, 2);

        // Board maximum is 3, so the new queue holds 1, 2 or 3.
        assert!((1..=3).contains(&board.next_card()));
    }

    #[test]
    fn apply_move_on_a_dead_board_changes_nothing() {
        let mut board = Board::from_parts(deadlocked(), 1);
        let snapshot = board.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        assert!(!board.can_move());
        for direction in Direction::iter() {
            assert_eq!(board.apply_move(&mut rng, direction), None);
        }

        assert_eq!(board, snapshot);
    }

    #[test]
    fn apply_move_rejects_directions_with_no_event() {
        // Packed grid, mergeable only along columns.
        let grid = [
            [Some(1), Some(3), Some(6), Some(12)],
            [Some(2), Some(6), Some(12), Some(24)],
            [Some(1), Some(3), Some(6), Some(12)],
            [Some(2), Some(6), Some(12), Some(24)],
        ];

        let mut board = Board::from_parts(grid, 2);
        let snapshot = board.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(4);

        assert!(board.can_move());
        assert_eq!(board.apply_move(&mut rng, Direction::Left), None);
        assert_eq!(board, snapshot);

        assert!(board.apply_move(&mut rng, Direction::Up).is_some());
        assert_ne!(*board.grid(), grid);
    }

    #[test]
    fn display_lays_out_the_grid() {
        let mut grid = [[N; SIZE]; SIZE];
        grid[0][0] = Some(12);

        let board = Board::from_parts(grid, 2);
        let text = board.to_string();

        assert!(text.starts_with("12\t.\t.\t.\n"));
        assert!(text.ends_with("next: 2"));
    }
}
