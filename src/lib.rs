//! # Match-3 Engine Library
//!
//! This library provides the board logic of a match-3 tile game, independent of
//! any rendering surface. A presentation layer (DOM, canvas, terminal) creates a
//! [`game::BoardEngine`], calls `initialize`, then submits swap intents and draws
//! the settled board and score it gets back, or replays the per-step snapshots of
//! a cascade to animate it.
//!
//! It is used by two binaries:
//! - `human_player`: interactive play in a terminal.
//! - `autoplay`: plays seeded games with each hint strategy and reports average scores.
//!
//! ## Modules
//! - `engine`: tiles, positions, swap intents and the `Board` with its mechanics
//!   (match detection, clearing, gravity, refill, match-free generation).
//! - `game`: the `BoardEngine` state machine, scoring and cascade resolution.
//! - `config`: `EngineConfig` and its validation.
//! - `error`: error types.
//! - `selection`: two-click swap input.
//! - `hints`: valid-swap search and move-choosing strategies.
//! - `utils`: parsing boards from text.

pub mod config;
pub mod engine;
pub mod error;
pub mod game;
pub mod hints;
pub mod selection;
pub mod utils;
