//! Swap search: which exchanges would produce a match, and strategies for picking one.
//!
//! Used for player hints, for detecting a board with no moves left, and by the
//! `autoplay` evaluator.
use crate::engine::{Board, Position, SwapIntent};

/// A strategy inspects a settled board and proposes a swap, together with the
/// value it assigned to that swap.
pub type StrategyFn = fn(&Board) -> Option<(usize, SwapIntent)>;

/// Every strategy in this module, by short name.
pub const STRATEGIES: [(&str, StrategyFn); 2] = [
    ("FIRST", choose_swap_first),
    ("GREEDY", choose_swap_greedy),
];

/// Number of positions the first cascade pass would clear if `intent` were played.
///
/// Returns 0 when the intent is out of bounds, not adjacent, or forms no match.
/// Later passes depend on random refill and are not counted.
pub fn count_immediate_clears(board: &Board, intent: SwapIntent) -> usize {
    let (a, b) = intent.positions();
    if !intent.is_adjacent() || !board.contains(a) || !board.contains(b) {
        return 0;
    }
    let mut trial = board.clone();
    trial.swap(a, b);
    trial.find_matches().len()
}

/// Lists every swap that would produce at least one match.
///
/// Each unordered pair is considered once (right and down neighbours), in
/// row-major order of the first position.
pub fn find_valid_swaps(board: &Board) -> Vec<SwapIntent> {
    let mut trial = board.clone();
    let mut swaps = Vec::new();

    for r in 0..board.rows() {
        for c in 0..board.cols() {
            let here = Position::new(r, c);
            let neighbours = [Position::new(r, c + 1), Position::new(r + 1, c)];
            for there in neighbours {
                if !board.contains(there) || board.tile_at(here) == board.tile_at(there) {
                    continue;
                }
                trial.swap(here, there);
                if trial.has_matches() {
                    swaps.push(SwapIntent::new(here, there));
                }
                trial.swap(here, there);
            }
        }
    }

    swaps
}

/// True if at least one swap on the board would produce a match.
pub fn has_valid_swap(board: &Board) -> bool {
    !find_valid_swaps(board).is_empty()
}

/// Chooses the first valid swap in row-major order.
///
/// # Returns
/// The number of positions it clears on the first pass and the swap, or `None`
/// if the board has no valid swap.
pub fn choose_swap_first(board: &Board) -> Option<(usize, SwapIntent)> {
    let intent = find_valid_swaps(board).into_iter().next()?;
    Some((count_immediate_clears(board, intent), intent))
}

/// Chooses the swap that clears the most positions on the first pass.
///
/// Ties keep the earliest swap in row-major order.
pub fn choose_swap_greedy(board: &Board) -> Option<(usize, SwapIntent)> {
    let mut best: Option<(usize, SwapIntent)> = None;
    for intent in find_valid_swaps(board) {
        let clears = count_immediate_clears(board, intent);
        if best.map_or(true, |(best_clears, _)| clears > best_clears) {
            best = Some((clears, intent));
        }
    }
    best
}
