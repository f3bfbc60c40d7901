//! Deterministic rules of a grid pursuit game.
//!
//! `pacman-core` defines the board ([`Grid`], [`Layout`]), agent poses,
//! snapshots ([`GameState`]) and the rule engine that turns a snapshot plus
//! one agent action into its successor. Nothing here performs I/O or uses
//! randomness; the runtime crate drives agents and time budgets on top.
//! All snapshot mutation flows through [`engine::GameEngine`].
pub mod action;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod state;

pub use action::{ActionTransition, Direction, GhostMove, MoveError, PacmanMove};
pub use config::GameConfig;
pub use engine::{ExecuteError, GameEngine, TransitionPhase, TransitionPhaseError};
pub use env::{AgentStart, Layout, LayoutError};
pub use error::{ErrorSeverity, GameError};
pub use state::{
    AgentRole, AgentState, Cell, Configuration, ExploredStates, GameState, GameStateData, Grid,
    GridError, PACMAN_INDEX, Position,
};
