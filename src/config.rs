//! Game configuration: grid dimensions, tile variety and the cascade safety cap.

use crate::engine::Tile;
use crate::error::ConfigError;

/// Smallest grid side for which the "no run of three" rule is meaningful.
pub const MIN_GRID_SIDE: usize = 3;

/// Fewest tile kinds a game can be played with.
pub const MIN_TILE_KINDS: usize = 2;

/// Default board side.
pub const DEFAULT_GRID_SIDE: usize = 6;

/// Default upper bound on clear/gravity/refill passes per swap.
pub const DEFAULT_MAX_CASCADE_PASSES: u32 = 100;

static KIND_TABLE: [Tile; 5] = Tile::KINDS;

/// Parameters fixed for the lifetime of one game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    pub rows: usize,
    pub cols: usize,
    /// Number of distinct kinds in play; the first `tile_kinds` entries of [`Tile::KINDS`].
    pub tile_kinds: usize,
    /// A cascade that has not settled after this many passes is treated as a broken invariant.
    pub max_cascade_passes: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            rows: DEFAULT_GRID_SIDE,
            cols: DEFAULT_GRID_SIDE,
            tile_kinds: Tile::KINDS.len(),
            max_cascade_passes: DEFAULT_MAX_CASCADE_PASSES,
        }
    }
}

impl EngineConfig {
    /// A square grid with the remaining fields at their defaults.
    pub fn square(side: usize) -> Self {
        EngineConfig {
            rows: side,
            cols: side,
            ..EngineConfig::default()
        }
    }

    /// Checks that the configuration can produce a playable board.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows < MIN_GRID_SIDE || self.cols < MIN_GRID_SIDE {
            return Err(ConfigError::GridTooSmall {
                rows: self.rows,
                cols: self.cols,
                min: MIN_GRID_SIDE,
            });
        }
        if self.tile_kinds < MIN_TILE_KINDS || self.tile_kinds > Tile::KINDS.len() {
            return Err(ConfigError::TileKinds {
                got: self.tile_kinds,
                min: MIN_TILE_KINDS,
                max: Tile::KINDS.len(),
            });
        }
        if self.max_cascade_passes == 0 {
            return Err(ConfigError::ZeroCascadeLimit);
        }
        Ok(())
    }

    /// The kinds that may appear on the board.
    pub fn kinds(&self) -> &'static [Tile] {
        &KIND_TABLE[..self.tile_kinds.min(KIND_TABLE.len())]
    }
}
