//! Grid model and board mechanics for the match-3 game.
//!
//! This module defines the game's fundamental components:
//! - `Tile`: the tile kinds plus the transient `Empty` marker used mid-resolution.
//! - `Position` / `SwapIntent`: coordinates and the unordered pair a player asks to exchange.
//! - `Board`: the grid itself, with match detection, clearing, gravity, refill and
//!   match-free generation.
//!
//! Game flow (score, cascade sequencing, the engine state machine) lives in [`crate::game`].
use log::{trace, warn};
use rand::rngs::SmallRng;
use rand::seq::{IteratorRandom, SliceRandom};
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::{BoardParseError, ConfigError};

/// Represents the content of a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tile {
    /// A cleared cell waiting for gravity and refill. Never present on a settled board.
    Empty,
    Cherry,
    Lemon,
    Grape,
    Watermelon,
    Pineapple,
}

impl Tile {
    /// Every playable kind, in the order a configuration with fewer kinds takes them.
    pub const KINDS: [Tile; 5] = [
        Tile::Cherry,
        Tile::Lemon,
        Tile::Grape,
        Tile::Watermelon,
        Tile::Pineapple,
    ];

    /// Whether this is the `Empty` marker rather than a playable kind.
    pub fn is_empty(&self) -> bool {
        *self == Tile::Empty
    }

    /// Converts the tile to its character representation.
    ///
    /// This is the format used by text boards (see [`crate::utils::board_from_str_array`]).
    ///
    /// # Examples
    ///
    /// ```
    /// use match3_engine::engine::Tile;
    /// assert_eq!(Tile::Cherry.to_char(), 'C');
    /// assert_eq!(Tile::Empty.to_char(), '.');
    /// ```
    pub fn to_char(&self) -> char {
        match self {
            Tile::Empty => '.',
            Tile::Cherry => 'C',
            Tile::Lemon => 'L',
            Tile::Grape => 'G',
            Tile::Watermelon => 'W',
            Tile::Pineapple => 'P',
        }
    }

    /// Inverse of [`Tile::to_char`].
    pub fn from_char(ch: char) -> Option<Tile> {
        match ch {
            '.' => Some(Tile::Empty),
            'C' => Some(Tile::Cherry),
            'L' => Some(Tile::Lemon),
            'G' => Some(Tile::Grape),
            'W' => Some(Tile::Watermelon),
            'P' => Some(Tile::Pineapple),
            _ => None,
        }
    }

    /// Picture shown by graphical front ends.
    pub fn symbol(&self) -> &'static str {
        match self {
            Tile::Empty => "  ",
            Tile::Cherry => "🍒",
            Tile::Lemon => "🍋",
            Tile::Grape => "🍇",
            Tile::Watermelon => "🍉",
            Tile::Pineapple => "🍍",
        }
    }

    /// Returns the ANSI background color code for terminal output.
    fn to_ansi_color_code(&self) -> &'static str {
        match self {
            Tile::Empty => "40",
            Tile::Cherry => "41",
            Tile::Watermelon => "42",
            Tile::Lemon => "43",
            Tile::Grape => "45",
            Tile::Pineapple => "46",
        }
    }
}

/// A cell coordinate. Rows grow downwards, columns to the right.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    /// Creates a position at row `row`, column `col`.
    pub fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }

    /// True when the two positions share an edge (Manhattan distance exactly 1).
    pub fn is_adjacent(&self, other: Position) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }
}

impl From<(usize, usize)> for Position {
    fn from((row, col): (usize, usize)) -> Self {
        Position { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A request to exchange two cells.
///
/// The pair is unordered: `SwapIntent::new(a, b) == SwapIntent::new(b, a)`.
/// Construction does not check adjacency or bounds; the engine does that when the
/// intent is submitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SwapIntent {
    first: Position,
    second: Position,
}

impl SwapIntent {
    /// Creates an intent to exchange `a` and `b`, in either order.
    ///
    /// # Arguments
    /// * `a`, `b` - The two cells, as `Position`s or `(row, col)` tuples.
    ///
    /// # Examples
    /// ```
    /// use match3_engine::engine::SwapIntent;
    /// assert_eq!(SwapIntent::new((0, 1), (0, 0)), SwapIntent::new((0, 0), (0, 1)));
    /// ```
    pub fn new(a: impl Into<Position>, b: impl Into<Position>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            SwapIntent { first: a, second: b }
        } else {
            SwapIntent { first: b, second: a }
        }
    }

    /// The two positions, smaller (row-major) first.
    pub fn positions(&self) -> (Position, Position) {
        (self.first, self.second)
    }

    /// True when the two cells share an edge.
    pub fn is_adjacent(&self) -> bool {
        self.first.is_adjacent(self.second)
    }
}

impl fmt::Display for SwapIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {}", self.first, self.second)
    }
}

/// Positions found by one detection pass. Ordered row-major, duplicates collapsed.
pub type MatchSet = BTreeSet<Position>;

/// Represents the game board as a 2D grid of `Tile`s.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    rows: usize,
    cols: usize,
    grid: Vec<Vec<Tile>>,
}

impl Board {
    /// Creates a board of the given size with every cell set to `Tile::Empty`.
    ///
    /// # Examples
    /// ```
    /// use match3_engine::engine::{Board, Tile};
    /// let board = Board::new_empty(6, 6);
    /// assert_eq!(board.get_tile(0, 0), Tile::Empty);
    /// ```
    pub fn new_empty(rows: usize, cols: usize) -> Self {
        Board {
            rows,
            cols,
            grid: vec![vec![Tile::Empty; cols]; rows],
        }
    }

    /// Generates a board with no horizontal or vertical run of three.
    ///
    /// Cells are filled in row-major order. Each cell draws uniformly among the
    /// `kinds` that would not complete a run with the two cells to its left or the
    /// two cells above it, which is the same distribution as redrawing until the
    /// candidate is acceptable. When a cell has no acceptable kind (possible with two
    /// kinds) generation steps back to the previous cell and tries its next untried
    /// kind, so a board is found whenever one exists.
    ///
    /// # Arguments
    /// * `rows`, `cols` - Board dimensions.
    /// * `kinds` - The kinds allowed on the board.
    /// * `rng` - Random source for every draw.
    ///
    /// # Errors
    /// `ConfigError::GenerationExhausted` if no match-free board can be built from
    /// `kinds`, which only happens with fewer than two kinds.
    pub fn new_random(
        rows: usize,
        cols: usize,
        kinds: &[Tile],
        rng: &mut impl Rng,
    ) -> Result<Self, ConfigError> {
        let mut board = Board::new_empty(rows, cols);
        let cells = rows * cols;
        // Untried kinds for every cell on the current path, drawn from the back.
        let mut untried: Vec<Vec<Tile>> = Vec::with_capacity(cells);
        let mut backtracks = 0u64;
        let mut idx = 0;

        while idx < cells {
            let (r, c) = (idx / cols, idx % cols);
            if untried.len() == idx {
                let mut options: Vec<Tile> = kinds
                    .iter()
                    .copied()
                    .filter(|&tile| !board.would_complete_run(r, c, tile))
                    .collect();
                options.shuffle(rng);
                untried.push(options);
            }

            match untried[idx].pop() {
                Some(tile) => {
                    board.grid[r][c] = tile;
                    idx += 1;
                }
                None => {
                    untried.pop();
                    board.grid[r][c] = Tile::Empty;
                    if idx == 0 {
                        return Err(ConfigError::GenerationExhausted { kinds: kinds.len() });
                    }
                    idx -= 1;
                    backtracks += 1;
                }
            }
        }

        if backtracks > 0 {
            trace!("generated {}x{} board after {} backtracks", rows, cols, backtracks);
        }
        Ok(board)
    }

    /// Like [`Board::new_random`] with a dedicated `SmallRng` seeded from `seed`,
    /// so the same seed always produces the same board.
    pub fn new_random_with_seed(
        rows: usize,
        cols: usize,
        kinds: &[Tile],
        seed: u64,
    ) -> Result<Self, ConfigError> {
        let mut rng = SmallRng::seed_from_u64(seed);
        Board::new_random(rows, cols, kinds, &mut rng)
    }

    /// Builds a board from rows of tiles.
    ///
    /// # Arguments
    /// * `grid` - Rows from top to bottom. `Tile::Empty` cells are allowed.
    ///
    /// # Errors
    /// Fails if there are no rows or the rows are not all the same length.
    pub fn from_grid(grid: Vec<Vec<Tile>>) -> Result<Self, BoardParseError> {
        let rows = grid.len();
        let cols = grid.first().map(Vec::len).ok_or(BoardParseError::NoRows)?;
        if let Some((row, r)) = grid.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(BoardParseError::RaggedRow {
                row,
                found: r.len(),
                expected: cols,
            });
        }
        Ok(Board { rows, cols, grid })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the tile at row `r`, column `c`.
    ///
    /// # Panics
    /// Panics if the coordinates are outside the board.
    pub fn get_tile(&self, r: usize, c: usize) -> Tile {
        self.grid[r][c]
    }

    /// Same as [`Board::get_tile`] addressed by `Position`.
    pub fn tile_at(&self, pos: Position) -> Tile {
        self.grid[pos.row][pos.col]
    }

    /// Checks whether `pos` lies on the board.
    ///
    /// # Returns
    /// `true` if `pos.row < rows` and `pos.col < cols`.
    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Exchanges two cells. Both positions must be on the board.
    pub fn swap(&mut self, a: Position, b: Position) {
        let held = self.grid[a.row][a.col];
        self.grid[a.row][a.col] = self.grid[b.row][b.col];
        self.grid[b.row][b.col] = held;
    }

    /// Every window of three aligned cells holding the same non-empty tile,
    /// horizontal windows first.
    fn matching_windows(&self) -> impl Iterator<Item = [Position; 3]> + '_ {
        let horizontal = (0..self.rows).flat_map(move |r| {
            (0..self.cols.saturating_sub(2)).map(move |c| {
                [
                    Position::new(r, c),
                    Position::new(r, c + 1),
                    Position::new(r, c + 2),
                ]
            })
        });
        let vertical = (0..self.cols).flat_map(move |c| {
            (0..self.rows.saturating_sub(2)).map(move |r| {
                [
                    Position::new(r, c),
                    Position::new(r + 1, c),
                    Position::new(r + 2, c),
                ]
            })
        });
        horizontal.chain(vertical).filter(move |window| {
            let tile = self.tile_at(window[0]);
            !tile.is_empty() && window.iter().all(|&p| self.tile_at(p) == tile)
        })
    }

    /// Finds every position that belongs to a horizontal or vertical run of three or more.
    ///
    /// Longer runs are covered by overlapping windows; the result is their union.
    /// An empty set means the board has no match.
    pub fn find_matches(&self) -> MatchSet {
        self.matching_windows().flatten().collect()
    }

    /// Cheaper form of `!find_matches().is_empty()`; stops at the first run.
    pub fn has_matches(&self) -> bool {
        self.matching_windows().next().is_some()
    }

    /// Sets every matched position to `Tile::Empty`.
    ///
    /// # Returns
    /// The number of distinct positions cleared, which is the score for this pass.
    pub fn clear_matches(&mut self, matches: &MatchSet) -> u32 {
        for pos in matches {
            self.grid[pos.row][pos.col] = Tile::Empty;
        }
        matches.len() as u32
    }

    /// Applies gravity to the board column by column.
    ///
    /// Tiles above an empty cell fall down to fill it. Relative order inside a
    /// column is preserved, and afterwards every `Empty` cell of a column sits
    /// above all of its tiles.
    pub fn apply_gravity(&mut self) {
        for c in 0..self.cols {
            // Lowest slot not yet claimed by a fallen tile.
            let mut empty_slot = self.rows;
            for r_check in (0..self.rows).rev() {
                if !self.grid[r_check][c].is_empty() {
                    empty_slot -= 1;
                    if r_check != empty_slot {
                        self.grid[empty_slot][c] = self.grid[r_check][c];
                        self.grid[r_check][c] = Tile::Empty;
                    }
                }
            }
        }
    }

    /// Fills every `Empty` cell with a random kind, column by column, top to bottom.
    ///
    /// Each new tile avoids completing a run with the two cells to its left or the
    /// two above it, judged on the board as it is at that moment. Runs with cells
    /// below or to the right are not prevented; the next cascade pass clears them.
    /// If no kind is acceptable (possible with two kinds) any kind is used.
    ///
    /// # Returns
    /// How many cells were filled.
    pub fn refill(&mut self, kinds: &[Tile], rng: &mut impl Rng) -> usize {
        let mut filled = 0;
        for c in 0..self.cols {
            for r in 0..self.rows {
                if !self.grid[r][c].is_empty() {
                    continue;
                }
                let tile = match self.draw_allowed(r, c, kinds, rng) {
                    Some(tile) => tile,
                    None => {
                        warn!("no run-free kind for ({}, {}), refilling unconstrained", r, c);
                        match kinds.iter().copied().choose(rng) {
                            Some(tile) => tile,
                            None => continue,
                        }
                    }
                };
                self.grid[r][c] = tile;
                filled += 1;
            }
        }
        filled
    }

    /// Whether placing `tile` at (`r`, `c`) would make it the third of a run with the
    /// two cells immediately to its left or the two immediately above.
    ///
    /// # Arguments
    /// * `r`, `c` - The cell being filled. Cells to its right and below are ignored.
    /// * `tile` - The candidate kind.
    pub fn would_complete_run(&self, r: usize, c: usize, tile: Tile) -> bool {
        let horizontal = c >= 2 && self.grid[r][c - 1] == tile && self.grid[r][c - 2] == tile;
        let vertical = r >= 2 && self.grid[r - 1][c] == tile && self.grid[r - 2][c] == tile;
        horizontal || vertical
    }

    fn draw_allowed(&self, r: usize, c: usize, kinds: &[Tile], rng: &mut impl Rng) -> Option<Tile> {
        kinds
            .iter()
            .copied()
            .filter(|&tile| !self.would_complete_run(r, c, tile))
            .choose(rng)
    }

    /// Number of `Empty` cells.
    pub fn empty_count(&self) -> usize {
        self.grid.iter().flatten().filter(|t| t.is_empty()).count()
    }

    /// A settled board has no empty cell and no match.
    pub fn is_settled(&self) -> bool {
        self.empty_count() == 0 && !self.has_matches()
    }

    /// Plain text rows, one character per cell, in the format accepted by
    /// [`crate::utils::board_from_str_array`].
    pub fn to_rows(&self) -> Vec<String> {
        self.grid
            .iter()
            .map(|row| row.iter().map(Tile::to_char).collect())
            .collect()
    }

    /// Renders the board for a terminal, with row and column numbers and ANSI colors.
    ///
    /// If `pos` is `Some`, that cell is marked with `<` after its letter.
    pub fn to_string_with_highlight(&self, pos: Option<Position>) -> String {
        let mut output = String::new();

        output.push_str("   ");
        for c_idx in 0..self.cols {
            output.push_str(&format!("{:<3}", c_idx));
        }
        output.push('\n');

        for r_idx in 0..self.rows {
            output.push_str(&format!("{:<3}", r_idx));

            for c_idx in 0..self.cols {
                let tile = self.grid[r_idx][c_idx];
                let marker = if pos == Some(Position::new(r_idx, c_idx)) {
                    '<'
                } else {
                    ' '
                };
                output.push_str(&format!(
                    "\x1b[1;{}m{}{}\x1b[m ",
                    tile.to_ansi_color_code(),
                    tile.to_char(),
                    marker
                ));
            }
            if r_idx + 1 < self.rows {
                output.push('\n');
            }
        }

        output
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_with_highlight(None))
    }
}
