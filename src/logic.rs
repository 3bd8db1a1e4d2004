use rand::Rng;
use thiserror::Error;

use crate::direction::Direction;

pub const SIZE: usize = 4;

/// Row-major grid of cells, row 0 at the top. `None` is an empty cell.
pub type Grid = [[Option<u32>; SIZE]; SIZE];

/// Outcome of a legal swipe: the shifted grid plus the cells freed along the
/// trailing edge, where the queued card can enter play.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub grid: Grid,
    pub open_slots: Vec<(usize, usize)>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("cannot draw a card for an empty board")]
pub struct EmptyBoard;

pub fn merged(a: u32, b: u32) -> Option<u32> {
    match (a, b) {
        (1, 2) | (2, 1) => Some(3),
        _ if a == b && a > 2 => Some(a + b),
        _ => None,
    }
}

const OFFSETS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// The contents of the 2 to 4 in-bounds cells orthogonally adjacent to
/// (`row`, `col`).
pub fn neighbors(grid: &Grid, row: usize, col: usize) -> impl Iterator<Item = Option<u32>> + '_ {
    OFFSETS.into_iter().filter_map(move |(dr, dc)| {
        let r = row.checked_add_signed(dr)?;
        let c = col.checked_add_signed(dc)?;

        grid.get(r)?.get(c).copied()
    })
}

/// Whether some swipe can still change the board: true iff any card has an
/// empty neighbor or a neighbor it merges with.
pub fn can_move(grid: &Grid) -> bool {
    (0..SIZE).any(|row| {
        (0..SIZE).any(|col| match grid[row][col] {
            Some(card) => neighbors(grid, row, col)
                .any(|cell| cell.map_or(true, |other| merged(card, other).is_some())),
            None => false,
        })
    })
}

fn transpose(grid: Grid) -> Grid {
    let mut out = grid;

    for (row, out_row) in out.iter_mut().enumerate() {
        for (col, cell) in out_row.iter_mut().enumerate() {
            *cell = grid[col][row];
        }
    }

    out
}

fn mirror(mut grid: Grid) -> Grid {
    for row in &mut grid {
        row.reverse();
    }

    grid
}

// Canonical direction. Each row is scanned from the leading (left) edge
// inward; the first empty cell or mergeable adjacent pair resolves, the tail
// shoves one step left and the trailing cell opens up. At most one event per
// row, and untriggered rows are left exactly as they were.
fn shove_left(mut grid: Grid) -> (Grid, Vec<usize>) {
    let mut open_rows = Vec::new();

    for (r, row) in grid.iter_mut().enumerate() {
        for col in 0..SIZE - 1 {
            if row[col].is_none() {
                for i in col..SIZE - 1 {
                    row[i] = row[i + 1];
                }
                row[SIZE - 1] = None;
                open_rows.push(r);
                break;
            }

            if let (Some(a), Some(b)) = (row[col], row[col + 1]) {
                if let Some(sum) = merged(a, b) {
                    row[col] = Some(sum);
                    for i in col + 1..SIZE - 1 {
                        row[i] = row[i + 1];
                    }
                    row[SIZE - 1] = None;
                    open_rows.push(r);
                    break;
                }
            }
        }
    }

    (grid, open_rows)
}

/// Applies a swipe to a grid value, leaving the original untouched.
///
/// Returns `None` when no move is possible at all, or when every line
/// perpendicular to `direction` is a no-op (packed with nothing mergeable),
/// so a `Some` result always reflects an actual event in that direction.
pub fn try_move(grid: Grid, direction: Direction) -> Option<Candidate> {
    if !can_move(&grid) {
        return None;
    }

    let (grid, open_slots): (Grid, Vec<_>) = match direction {
        Direction::Left => {
            let (grid, rows) = shove_left(grid);
            (grid, rows.into_iter().map(|r| (r, SIZE - 1)).collect())
        }
        Direction::Right => {
            let (grid, rows) = shove_left(mirror(grid));
            (mirror(grid), rows.into_iter().map(|r| (r, 0)).collect())
        }
        Direction::Up => {
            let (grid, cols) = shove_left(transpose(grid));
            (
                transpose(grid),
                cols.into_iter().map(|c| (SIZE - 1, c)).collect(),
            )
        }
        Direction::Down => {
            let (grid, cols) = shove_left(mirror(transpose(grid)));
            (
                transpose(mirror(grid)),
                cols.into_iter().map(|c| (0, c)).collect(),
            )
        }
    };

    (!open_slots.is_empty()).then_some(Candidate { grid, open_slots })
}

pub fn max_card(grid: &Grid) -> Option<u32> {
    grid.iter().flatten().flatten().copied().max()
}

/// Draws the card to enter play after an upcoming move. The pool holds six
/// low entries split between 1 and 2, plus one entry for every bonus value
/// 3 * 2^k up to the largest card currently on the board.
pub fn draw_card(rng: &mut impl Rng, grid: &Grid) -> Result<u32, EmptyBoard> {
    let max = max_card(grid).ok_or(EmptyBoard)?;

    let mut pool = vec![1, 2, 1, 2, 1, 2];
    if max >= 3 {
        pool.extend((0..=(max / 3).ilog2()).map(|k| 3u32 << k));
    }

    Ok(pool[rng.gen_range(0..pool.len())])
}

/// Total score: a card of value v >= 3 is worth 3^(log2(v / 3) + 1), so
/// 3 -> 3, 6 -> 9, 12 -> 27 and so on. Cards of value 1 and 2 are worth
/// nothing.
pub fn score(grid: &Grid) -> u64 {
    grid.iter()
        .flatten()
        .flatten()
        .filter(|&&card| card >= 3)
        .map(|&card| 3u64.pow((card / 3).ilog2() + 1))
        .sum()
}
