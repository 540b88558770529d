use crate::engine::{Board, Tile};
use crate::error::BoardParseError;

/// Parses an array of string slices into a `Board`.
///
/// Each string slice is one row, starting from row 0. All rows must have the same
/// number of characters; that number becomes the board's column count.
///
/// Valid characters for tiles are:
/// - 'C': `Tile::Cherry`
/// - 'L': `Tile::Lemon`
/// - 'G': `Tile::Grape`
/// - 'W': `Tile::Watermelon`
/// - 'P': `Tile::Pineapple`
/// - '.': `Tile::Empty`
///
/// # Errors
/// - `BoardParseError::NoRows` if `s` is empty.
/// - `BoardParseError::RaggedRow` if a row's length differs from the first row's.
/// - `BoardParseError::UnknownTile` for any other character.
///
/// # Examples
/// ```
/// use match3_engine::utils::board_from_str_array;
/// use match3_engine::engine::Tile;
///
/// let board = board_from_str_array(&["CLG", "W.P"]).unwrap();
/// assert_eq!(board.rows(), 2);
/// assert_eq!(board.cols(), 3);
/// assert_eq!(board.get_tile(0, 0), Tile::Cherry);
/// assert_eq!(board.get_tile(1, 1), Tile::Empty);
///
/// assert!(board_from_str_array(&["CXG"]).is_err());
/// assert!(board_from_str_array(&["CLG", "CL"]).is_err());
/// ```
pub fn board_from_str_array(s: &[&str]) -> Result<Board, BoardParseError> {
    let mut grid = Vec::with_capacity(s.len());

    for (r, row_str) in s.iter().enumerate() {
        let row = row_str
            .chars()
            .enumerate()
            .map(|(c, ch)| {
                Tile::from_char(ch).ok_or(BoardParseError::UnknownTile { ch, row: r, col: c })
            })
            .collect::<Result<Vec<_>, _>>()?;
        grid.push(row);
    }

    Board::from_grid(grid)
}

/// Parses a text board as stored in a file: one row per line, blank lines and
/// surrounding whitespace ignored.
pub fn board_from_text(content: &str) -> Result<Board, BoardParseError> {
    let lines: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    board_from_str_array(&lines)
}
