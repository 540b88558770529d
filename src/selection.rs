//! Two-click swap input: the first click selects a tile, the second picks its partner.
use crate::engine::{Position, SwapIntent};

/// Tracks the currently selected tile for a presentation layer.
///
/// # Examples
/// ```
/// use match3_engine::engine::{Position, SwapIntent};
/// use match3_engine::selection::Selector;
///
/// let mut selector = Selector::new();
/// assert_eq!(selector.click(Position::new(2, 2)), None);
/// assert_eq!(selector.selected(), Some(Position::new(2, 2)));
/// assert_eq!(
///     selector.click(Position::new(2, 3)),
///     Some(SwapIntent::new((2, 2), (2, 3)))
/// );
/// assert_eq!(selector.selected(), None);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selector {
    selected: Option<Position>,
}

impl Selector {
    pub fn new() -> Self {
        Selector::default()
    }

    /// The tile waiting for a partner, if any.
    pub fn selected(&self) -> Option<Position> {
        self.selected
    }

    /// Handles a click on `pos`.
    ///
    /// With nothing selected, `pos` becomes the selection. Otherwise the selection
    /// is cleared, and an intent is returned if `pos` is adjacent to it. A click
    /// anywhere else (including the selected tile) only clears the selection.
    pub fn click(&mut self, pos: Position) -> Option<SwapIntent> {
        match self.selected.take() {
            None => {
                self.selected = Some(pos);
                None
            }
            Some(first) if first.is_adjacent(pos) => Some(SwapIntent::new(first, pos)),
            Some(_) => None,
        }
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }
}
