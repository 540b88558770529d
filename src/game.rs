//! The board engine: owns one game's grid, score and random source, and drives
//! swaps through cascade resolution.
//!
//! Lifecycle: `Uninitialized -> Settled <-> Resolving -> Settled`. A swap that forms a
//! match moves the engine to `Resolving` until its [`Cascade`] settles. Swaps are
//! resolved either in one call ([`BoardEngine::request_swap`]) or step by step
//! ([`BoardEngine::request_swap_stepwise`]) for callers that animate each step.
use log::{debug, error, trace, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::config::EngineConfig;
use crate::engine::{Board, MatchSet, Position, SwapIntent};
use crate::error::{ConfigError, EngineError, InvalidSwap};
use crate::hints;

/// Lifecycle of a [`BoardEngine`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    /// No board yet, or the last game was discarded after a broken cascade.
    Uninitialized,
    /// The board is at rest: no empty cell and no match.
    Settled,
    /// A cascade is in progress.
    Resolving,
}

/// Result of a swap request that did not fail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SwapOutcome {
    /// The intent was out of bounds or not adjacent. Nothing changed.
    Rejected(InvalidSwap),
    /// The swap formed no match and was undone; `board` equals the board before the call.
    Reverted { board: Board },
    /// The swap formed a match and the board settled again.
    Resolved {
        board: Board,
        /// Sum over all passes of the positions cleared in that pass.
        score_delta: u32,
        /// Number of clear/gravity/refill passes run.
        cascades: u32,
    },
}

impl SwapOutcome {
    /// Score gained by the swap; 0 unless it resolved.
    pub fn score_delta(&self) -> u32 {
        match self {
            SwapOutcome::Resolved { score_delta, .. } => *score_delta,
            _ => 0,
        }
    }

    /// The settled board after the call, if the swap was not rejected.
    pub fn board(&self) -> Option<&Board> {
        match self {
            SwapOutcome::Rejected(_) => None,
            SwapOutcome::Reverted { board } | SwapOutcome::Resolved { board, .. } => Some(board),
        }
    }

    /// True for intents refused before touching the board.
    pub fn is_rejected(&self) -> bool {
        matches!(self, SwapOutcome::Rejected(_))
    }
}

/// What a single cascade step did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepKind {
    /// These positions were matched and are now `Empty`.
    Cleared(MatchSet),
    /// Tiles fell into the gaps.
    Gravity,
    /// Empty cells at the top of columns received new tiles.
    Refilled { filled: usize },
}

/// Snapshot taken after one clear, gravity or refill step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CascadeStep {
    /// 1-based pass this step belongs to.
    pub pass: u32,
    pub kind: StepKind,
    /// Board right after the step. May contain `Empty` cells.
    pub board: Board,
    /// Score gained by this swap so far, including this step.
    pub score_delta: u32,
}

/// Start of a step-by-step swap.
pub enum Stepwise<'a> {
    /// Rejected or reverted swaps have no steps.
    Done(SwapOutcome),
    Cascade(Cascade<'a>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Detect,
    Gravity,
    Refill,
    Done,
}

/// Lazy cascade resolution, yielding one [`CascadeStep`] per clear, gravity and refill.
///
/// The sequence is finite and single-pass. Dropping it before the end still runs the
/// remaining steps, so the engine is always left settled.
pub struct Cascade<'a> {
    engine: &'a mut BoardEngine,
    phase: Phase,
    passes: u32,
    score_delta: u32,
}

impl<'a> Cascade<'a> {
    fn new(engine: &'a mut BoardEngine) -> Self {
        engine.state = EngineState::Resolving;
        Cascade {
            engine,
            phase: Phase::Detect,
            passes: 0,
            score_delta: 0,
        }
    }

    /// Passes started so far.
    pub fn passes(&self) -> u32 {
        self.passes
    }

    /// Score gained so far.
    pub fn score_delta(&self) -> u32 {
        self.score_delta
    }

    /// Runs the remaining steps and returns what [`BoardEngine::request_swap`] would have.
    pub fn finish(mut self) -> Result<SwapOutcome, EngineError> {
        for step in self.by_ref() {
            step?;
        }
        Ok(SwapOutcome::Resolved {
            board: self.engine.board.clone(),
            score_delta: self.score_delta,
            cascades: self.passes,
        })
    }

    fn snapshot(&self, kind: StepKind) -> CascadeStep {
        CascadeStep {
            pass: self.passes,
            kind,
            board: self.engine.board.clone(),
            score_delta: self.score_delta,
        }
    }
}

impl Iterator for Cascade<'_> {
    type Item = Result<CascadeStep, EngineError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.phase {
            Phase::Done => None,
            Phase::Detect => {
                let matches = self.engine.board.find_matches();
                if matches.is_empty() {
                    self.phase = Phase::Done;
                    self.engine.state = EngineState::Settled;
                    debug!(
                        "cascade settled after {} passes, +{} (score {})",
                        self.passes, self.score_delta, self.engine.score
                    );
                    return None;
                }

                let limit = self.engine.config.max_cascade_passes;
                if self.passes >= limit {
                    self.phase = Phase::Done;
                    error!("cascade still matching after {} passes, discarding game", limit);
                    self.engine.discard();
                    return Some(Err(EngineError::CascadeLimitExceeded(limit)));
                }

                self.passes += 1;
                let cleared = self.engine.board.clear_matches(&matches);
                self.score_delta = self.score_delta.saturating_add(cleared);
                self.engine.score = self.engine.score.saturating_add(cleared);
                trace!("pass {}: cleared {} positions", self.passes, cleared);
                self.phase = Phase::Gravity;
                Some(Ok(self.snapshot(StepKind::Cleared(matches))))
            }
            Phase::Gravity => {
                self.engine.board.apply_gravity();
                self.phase = Phase::Refill;
                Some(Ok(self.snapshot(StepKind::Gravity)))
            }
            Phase::Refill => {
                let engine = &mut *self.engine;
                let filled = engine.board.refill(engine.config.kinds(), &mut engine.rng);
                trace!("pass {}: refilled {} cells", self.passes, filled);
                self.phase = Phase::Detect;
                Some(Ok(self.snapshot(StepKind::Refilled { filled })))
            }
        }
    }
}

impl Drop for Cascade<'_> {
    fn drop(&mut self) {
        while let Some(step) = self.next() {
            if let Err(err) = step {
                warn!("cascade failed while draining: {}", err);
            }
        }
    }
}

/// One game of match-3.
///
/// # Examples
/// ```
/// use match3_engine::config::EngineConfig;
/// use match3_engine::engine::SwapIntent;
/// use match3_engine::game::BoardEngine;
///
/// let mut engine = BoardEngine::with_seed(7);
/// engine.initialize(EngineConfig::default()).unwrap();
/// assert_eq!(engine.score(), 0);
///
/// let outcome = engine.request_swap(SwapIntent::new((0, 0), (5, 5))).unwrap();
/// assert!(outcome.is_rejected());
/// ```
#[derive(Clone, Debug)]
pub struct BoardEngine {
    config: EngineConfig,
    board: Board,
    score: u32,
    state: EngineState,
    rng: SmallRng,
}

impl Default for BoardEngine {
    fn default() -> Self {
        BoardEngine::new()
    }
}

impl BoardEngine {
    /// An uninitialized engine whose random source is seeded from the OS.
    pub fn new() -> Self {
        BoardEngine::with_rng(SmallRng::from_entropy())
    }

    /// An uninitialized engine with a reproducible random source.
    pub fn with_seed(seed: u64) -> Self {
        BoardEngine::with_rng(SmallRng::seed_from_u64(seed))
    }

    fn with_rng(rng: SmallRng) -> Self {
        BoardEngine {
            config: EngineConfig::default(),
            board: Board::new_empty(0, 0),
            score: 0,
            state: EngineState::Uninitialized,
            rng,
        }
    }

    /// Starts a new game on a freshly generated board with no pre-existing match.
    ///
    /// Resets the score to 0. On error nothing changes.
    pub fn initialize(&mut self, config: EngineConfig) -> Result<&Board, ConfigError> {
        config.validate()?;
        let board = Board::new_random(config.rows, config.cols, config.kinds(), &mut self.rng)?;
        debug!(
            "initialized {}x{} board with {} kinds",
            config.rows, config.cols, config.tile_kinds
        );
        Ok(self.install(config, board))
    }

    /// Starts a new game on a caller-supplied board.
    ///
    /// The board must match the configured dimensions, hold only configured kinds
    /// and contain no match. Resets the score to 0. On error nothing changes.
    pub fn load_board(&mut self, board: Board, config: EngineConfig) -> Result<&Board, ConfigError> {
        config.validate()?;
        if board.rows() != config.rows || board.cols() != config.cols {
            return Err(ConfigError::BoardShape {
                rows: config.rows,
                cols: config.cols,
                found_rows: board.rows(),
                found_cols: board.cols(),
            });
        }
        let kinds = config.kinds();
        for r in 0..board.rows() {
            for c in 0..board.cols() {
                let tile = board.get_tile(r, c);
                if !kinds.contains(&tile) {
                    return Err(ConfigError::ForeignTile {
                        tile,
                        pos: Position::new(r, c),
                    });
                }
            }
        }
        if board.has_matches() {
            return Err(ConfigError::UnsettledBoard);
        }
        debug!("loaded {}x{} board", config.rows, config.cols);
        Ok(self.install(config, board))
    }

    /// Starts over with the current configuration.
    pub fn restart(&mut self) -> Result<&Board, ConfigError> {
        let config = self.config;
        self.initialize(config)
    }

    fn install(&mut self, config: EngineConfig, board: Board) -> &Board {
        self.config = config;
        self.board = board;
        self.score = 0;
        self.state = EngineState::Settled;
        &self.board
    }

    fn discard(&mut self) {
        self.board = Board::new_empty(0, 0);
        self.state = EngineState::Uninitialized;
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// The configuration of the current game, or the default before the first one.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Total score of the current game. Saturates at `u32::MAX`.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// The settled board, or `None` before initialization.
    pub fn board(&self) -> Option<&Board> {
        match self.state {
            EngineState::Settled => Some(&self.board),
            _ => None,
        }
    }

    /// Checks bounds and adjacency without touching the board.
    ///
    /// # Returns
    /// `Ok(())` if both positions are on the board and share an edge, otherwise the
    /// first problem found. Bounds are checked before adjacency.
    pub fn validate_intent(&self, intent: SwapIntent) -> Result<(), InvalidSwap> {
        let (a, b) = intent.positions();
        for p in [a, b] {
            if !self.board.contains(p) {
                return Err(InvalidSwap::OutOfBounds(p));
            }
        }
        if !intent.is_adjacent() {
            return Err(InvalidSwap::NotAdjacent(a, b));
        }
        Ok(())
    }

    /// Plays a swap and resolves every cascade it triggers before returning.
    ///
    /// # Errors
    /// - `EngineError::Uninitialized` before [`BoardEngine::initialize`].
    /// - `EngineError::Resolving` if an earlier [`Cascade`] was leaked with `mem::forget`.
    /// - `EngineError::CascadeLimitExceeded` if the board never settled; the game is
    ///   discarded and the engine returns to `Uninitialized`.
    pub fn request_swap(&mut self, intent: SwapIntent) -> Result<SwapOutcome, EngineError> {
        match self.request_swap_stepwise(intent)? {
            Stepwise::Done(outcome) => Ok(outcome),
            Stepwise::Cascade(cascade) => cascade.finish(),
        }
    }

    /// Plays a swap, returning the cascade as a lazy sequence of steps.
    ///
    /// Consuming the whole sequence is equivalent to [`BoardEngine::request_swap`].
    pub fn request_swap_stepwise(
        &mut self,
        intent: SwapIntent,
    ) -> Result<Stepwise<'_>, EngineError> {
        match self.state {
            EngineState::Uninitialized => return Err(EngineError::Uninitialized),
            EngineState::Resolving => return Err(EngineError::Resolving),
            EngineState::Settled => {}
        }
        if let Err(reason) = self.validate_intent(intent) {
            debug!("rejected swap {}: {}", intent, reason);
            return Ok(Stepwise::Done(SwapOutcome::Rejected(reason)));
        }

        let (a, b) = intent.positions();
        self.board.swap(a, b);
        if !self.board.has_matches() {
            self.board.swap(a, b);
            debug!("swap {} formed no match, reverted", intent);
            return Ok(Stepwise::Done(SwapOutcome::Reverted {
                board: self.board.clone(),
            }));
        }

        debug!("swap {} committed", intent);
        Ok(Stepwise::Cascade(Cascade::new(self)))
    }

    /// Swaps that would form a match on the current board. Empty unless settled.
    pub fn valid_swaps(&self) -> Vec<SwapIntent> {
        match self.state {
            EngineState::Settled => hints::find_valid_swaps(&self.board),
            _ => Vec::new(),
        }
    }

    /// Whether the player has any swap left that forms a match.
    pub fn has_valid_swap(&self) -> bool {
        !self.valid_swaps().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Tile;
    use crate::utils::board_from_str_array;

    /// Swapping (0, 5) with (1, 5) completes "CCC" in the top-right corner and nothing
    /// else. Rows 1 and 2 differ in columns 3..=5, so the refill cannot start a new run.
    const ONE_RUN_BOARD: [&str; 6] = [
        "PWGCCL", "LCWPGC", "GPLWPG", "WLPGCL", "PGCLWP", "CWGPLG",
    ];

    /// Swapping (3, 0) with (3, 1) completes a vertical "CCC" at the bottom of column 0.
    /// The grape at (2, 0) then falls next to "GG" in row 5, forcing a second pass.
    const TWO_PASS_BOARD: [&str; 6] = ["WPL", "PWC", "GCW", "LCP", "CLG", "CGG"];

    fn loaded(rows: &[&str], max_cascade_passes: u32, seed: u64) -> BoardEngine {
        let board = board_from_str_array(rows).unwrap();
        let config = EngineConfig {
            rows: board.rows(),
            cols: board.cols(),
            tile_kinds: 5,
            max_cascade_passes,
        };
        let mut engine = BoardEngine::with_seed(seed);
        engine.load_board(board, config).unwrap();
        engine
    }

    #[test]
    fn test_new_engine_is_uninitialized() {
        let mut engine = BoardEngine::with_seed(1);
        assert_eq!(engine.state(), EngineState::Uninitialized);
        assert!(engine.board().is_none());
        assert_eq!(
            engine.request_swap(SwapIntent::new((0, 0), (0, 1))),
            Err(EngineError::Uninitialized)
        );
        assert!(engine.valid_swaps().is_empty());
    }

    #[test]
    fn test_initialize_produces_settled_board() {
        let mut engine = BoardEngine::with_seed(42);
        let board = engine.initialize(EngineConfig::default()).unwrap().clone();
        assert_eq!(board.rows(), 6);
        assert_eq!(board.cols(), 6);
        assert!(board.is_settled());
        assert_eq!(engine.state(), EngineState::Settled);
        assert_eq!(engine.score(), 0);
    }

    #[test]
    fn test_initialize_rejects_bad_config_and_stays_uninitialized() {
        let mut engine = BoardEngine::with_seed(42);
        let err = engine
            .initialize(EngineConfig {
                tile_kinds: 1,
                ..EngineConfig::default()
            })
            .unwrap_err();
        assert!(matches!(err, ConfigError::TileKinds { got: 1, .. }));
        assert_eq!(engine.state(), EngineState::Uninitialized);

        let err = engine.initialize(EngineConfig::square(2)).unwrap_err();
        assert!(matches!(err, ConfigError::GridTooSmall { .. }));
        assert_eq!(engine.state(), EngineState::Uninitialized);
    }

    #[test]
    fn test_initialize_large_two_kind_board() {
        for seed in 0..10 {
            let mut engine = BoardEngine::with_seed(seed);
            let config = EngineConfig {
                tile_kinds: 2,
                ..EngineConfig::square(30)
            };
            let board = engine.initialize(config).unwrap();
            assert!(board.is_settled(), "seed {} produced:\n{}", seed, board);
            assert_eq!(engine.state(), EngineState::Settled);
        }
    }

    #[test]
    fn test_seeded_engines_are_reproducible() {
        let mut a = BoardEngine::with_seed(5);
        let mut b = BoardEngine::with_seed(5);
        assert_eq!(
            a.initialize(EngineConfig::default()).unwrap(),
            b.initialize(EngineConfig::default()).unwrap()
        );
    }

    #[test]
    fn test_load_board_validation() {
        let mut engine = BoardEngine::with_seed(0);
        let board = board_from_str_array(&ONE_RUN_BOARD).unwrap();

        let err = engine
            .load_board(board.clone(), EngineConfig::square(5))
            .unwrap_err();
        assert!(matches!(err, ConfigError::BoardShape { found_rows: 6, .. }));

        let three_kinds = EngineConfig {
            tile_kinds: 3,
            ..EngineConfig::default()
        };
        let err = engine.load_board(board, three_kinds).unwrap_err();
        assert_eq!(
            err,
            ConfigError::ForeignTile {
                tile: Tile::Pineapple,
                pos: Position::new(0, 0)
            }
        );

        let matched = board_from_str_array(&["CCC", "LGW", "GWL"]).unwrap();
        assert_eq!(
            engine.load_board(matched, EngineConfig::square(3)),
            Err(ConfigError::UnsettledBoard)
        );

        let holes = board_from_str_array(&["C.L", "LGW", "GWL"]).unwrap();
        assert!(matches!(
            engine.load_board(holes, EngineConfig::square(3)),
            Err(ConfigError::ForeignTile {
                tile: Tile::Empty,
                ..
            })
        ));
        assert_eq!(engine.state(), EngineState::Uninitialized);
    }

    #[test]
    fn test_non_adjacent_swap_is_rejected() {
        let mut engine = loaded(&ONE_RUN_BOARD, 100, 0);
        let before = engine.board().unwrap().clone();
        let outcome = engine.request_swap(SwapIntent::new((0, 0), (5, 5))).unwrap();
        assert_eq!(
            outcome,
            SwapOutcome::Rejected(InvalidSwap::NotAdjacent(
                Position::new(0, 0),
                Position::new(5, 5)
            ))
        );
        assert_eq!(outcome.score_delta(), 0);
        assert_eq!(engine.board(), Some(&before));
        assert_eq!(engine.state(), EngineState::Settled);
    }

    #[test]
    fn test_out_of_bounds_swap_is_rejected() {
        let mut engine = loaded(&ONE_RUN_BOARD, 100, 0);
        let before = engine.board().unwrap().clone();
        let outcome = engine.request_swap(SwapIntent::new((0, 5), (0, 6))).unwrap();
        assert_eq!(
            outcome,
            SwapOutcome::Rejected(InvalidSwap::OutOfBounds(Position::new(0, 6)))
        );
        assert_eq!(engine.board(), Some(&before));
        assert_eq!(engine.score(), 0);
    }

    #[test]
    fn test_swap_with_itself_is_rejected() {
        let mut engine = loaded(&ONE_RUN_BOARD, 100, 0);
        let outcome = engine.request_swap(SwapIntent::new((2, 2), (2, 2))).unwrap();
        assert!(outcome.is_rejected());
    }

    #[test]
    fn test_non_matching_swap_reverts() {
        let mut engine = loaded(&ONE_RUN_BOARD, 100, 0);
        let before = engine.board().unwrap().clone();
        let outcome = engine.request_swap(SwapIntent::new((5, 0), (5, 1))).unwrap();
        assert_eq!(outcome, SwapOutcome::Reverted { board: before.clone() });
        assert_eq!(outcome.score_delta(), 0);
        assert_eq!(engine.board(), Some(&before));
        assert_eq!(engine.score(), 0);
    }

    #[test]
    fn test_single_run_scores_three() {
        let mut engine = loaded(&ONE_RUN_BOARD, 100, 3);
        let outcome = engine.request_swap(SwapIntent::new((0, 5), (1, 5))).unwrap();
        match &outcome {
            SwapOutcome::Resolved {
                board,
                score_delta,
                cascades,
            } => {
                assert_eq!(*score_delta, 3);
                assert_eq!(*cascades, 1);
                assert!(board.is_settled());
                // Everything below the cleared cells is untouched, with the swap applied.
                assert_eq!(board.to_rows()[1..], ONE_RUN_BOARD_AFTER_SWAP[1..]);
                assert_eq!(&board.to_rows()[0][..3], "PWG");
            }
            other => panic!("expected a resolved swap, got {:?}", other),
        }
        assert_eq!(engine.score(), 3);
        assert_eq!(engine.board(), outcome.board());
    }

    const ONE_RUN_BOARD_AFTER_SWAP: [&str; 6] = [
        "PWGCCC", "LCWPGL", "GPLWPG", "WLPGCL", "PGCLWP", "CWGPLG",
    ];

    #[test]
    fn test_gravity_triggered_second_pass() {
        let mut engine = loaded(&TWO_PASS_BOARD, 100, 11);
        let outcome = engine.request_swap(SwapIntent::new((3, 0), (3, 1))).unwrap();
        match outcome {
            SwapOutcome::Resolved {
                board,
                score_delta,
                cascades,
            } => {
                assert!(cascades >= 2);
                assert!(score_delta >= 6);
                assert!(board.is_settled());
            }
            other => panic!("expected a resolved swap, got {:?}", other),
        }
    }

    #[test]
    fn test_cascade_limit_discards_game() {
        let mut engine = loaded(&TWO_PASS_BOARD, 1, 11);
        let err = engine
            .request_swap(SwapIntent::new((3, 0), (3, 1)))
            .unwrap_err();
        assert_eq!(err, EngineError::CascadeLimitExceeded(1));
        assert_eq!(engine.state(), EngineState::Uninitialized);
        assert!(engine.board().is_none());

        // A restart recovers.
        let board = engine.restart().unwrap();
        assert_eq!(board.rows(), 6);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.state(), EngineState::Settled);
    }

    #[test]
    fn test_leaked_cascade_blocks_swaps_until_restart() {
        let mut engine = loaded(&TWO_PASS_BOARD, 100, 11);
        match engine
            .request_swap_stepwise(SwapIntent::new((3, 0), (3, 1)))
            .unwrap()
        {
            Stepwise::Cascade(cascade) => std::mem::forget(cascade),
            Stepwise::Done(outcome) => panic!("expected a cascade, got {:?}", outcome),
        }
        assert_eq!(engine.state(), EngineState::Resolving);
        assert!(engine.board().is_none());

        let err = engine
            .request_swap(SwapIntent::new((0, 0), (0, 1)))
            .unwrap_err();
        assert_eq!(err, EngineError::Resolving);
        assert_eq!(err.to_string(), "a cascade is still resolving");

        engine.restart().unwrap();
        assert_eq!(engine.state(), EngineState::Settled);
    }

    #[test]
    fn test_stepwise_sequence_shape() {
        let mut engine = loaded(&TWO_PASS_BOARD, 100, 11);
        let steps: Vec<CascadeStep> = match engine
            .request_swap_stepwise(SwapIntent::new((3, 0), (3, 1)))
            .unwrap()
        {
            Stepwise::Cascade(cascade) => cascade.map(Result::unwrap).collect(),
            Stepwise::Done(outcome) => panic!("expected a cascade, got {:?}", outcome),
        };

        assert!(steps.len() >= 6);
        assert_eq!(steps.len() % 3, 0);
        for (i, chunk) in steps.chunks(3).enumerate() {
            assert_eq!(chunk[0].pass, i as u32 + 1);
            assert!(matches!(chunk[0].kind, StepKind::Cleared(_)));
            assert_eq!(chunk[1].kind, StepKind::Gravity);
            assert!(matches!(chunk[2].kind, StepKind::Refilled { .. }));
        }

        match &steps[0].kind {
            StepKind::Cleared(matches) => {
                let expected: MatchSet = [(3, 0), (4, 0), (5, 0)]
                    .into_iter()
                    .map(Position::from)
                    .collect();
                assert_eq!(matches, &expected);
            }
            other => panic!("unexpected first step {:?}", other),
        }
        assert_eq!(steps[0].board.empty_count(), 3);
        assert_eq!(steps[1].board.to_rows()[5], "GGG");
        assert_eq!(steps[2].board.empty_count(), 0);

        let last = steps.last().unwrap();
        assert!(last.board.is_settled());
        assert_eq!(engine.score(), last.score_delta);
        assert_eq!(engine.state(), EngineState::Settled);
    }

    #[test]
    fn test_stepwise_matches_synchronous() {
        let intent = SwapIntent::new((3, 0), (3, 1));

        let mut sync_engine = loaded(&TWO_PASS_BOARD, 100, 21);
        let sync_outcome = sync_engine.request_swap(intent).unwrap();

        let mut lazy_engine = loaded(&TWO_PASS_BOARD, 100, 21);
        let lazy_outcome = match lazy_engine.request_swap_stepwise(intent).unwrap() {
            Stepwise::Cascade(mut cascade) => {
                // Look at one step, then let finish() run the rest.
                assert!(cascade.next().is_some());
                cascade.finish().unwrap()
            }
            Stepwise::Done(outcome) => outcome,
        };

        assert_eq!(sync_outcome, lazy_outcome);
        assert_eq!(sync_engine.score(), lazy_engine.score());
    }

    #[test]
    fn test_dropping_cascade_runs_it_to_completion() {
        let mut engine = loaded(&TWO_PASS_BOARD, 100, 4);
        if let Stepwise::Cascade(mut cascade) = engine
            .request_swap_stepwise(SwapIntent::new((3, 0), (3, 1)))
            .unwrap()
        {
            assert!(cascade.next().is_some());
            assert_eq!(cascade.passes(), 1);
            assert_eq!(cascade.score_delta(), 3);
        }
        assert_eq!(engine.state(), EngineState::Settled);
        assert!(engine.board().unwrap().is_settled());
        assert!(engine.score() >= 6);
    }

    #[test]
    fn test_restart_resets_score() {
        let mut engine = loaded(&ONE_RUN_BOARD, 100, 3);
        engine.request_swap(SwapIntent::new((0, 5), (1, 5))).unwrap();
        assert_eq!(engine.score(), 3);
        engine.restart().unwrap();
        assert_eq!(engine.score(), 0);
        assert!(engine.board().unwrap().is_settled());
    }

    #[test]
    fn test_valid_swaps_follow_board() {
        let engine = loaded(&ONE_RUN_BOARD, 100, 0);
        let swaps = engine.valid_swaps();
        assert!(swaps.contains(&SwapIntent::new((0, 5), (1, 5))));
        assert!(engine.has_valid_swap());
    }
}
