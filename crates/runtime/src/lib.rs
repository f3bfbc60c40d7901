//! Runtime orchestration for pacman games.
//!
//! The core crate decides what a move does; this crate decides who moves
//! when, and for how long. Agents run on dedicated worker threads so a slow
//! or panicking agent can be cut off without taking the game down with it.
//!
//! Modules are organized by responsibility:
//! - [`controller`] hosts the turn scheduler and its builder
//! - [`api`] exposes the agent, rule policy and presenter seams
//! - [`repository`] and [`replay`] persist and reproduce finished games
//! - [`batch`] plays many games in a row and summarizes them
//! - [`workers`] keeps the per-agent threads internal to the crate
pub mod api;
pub mod batch;
pub mod config;
pub mod controller;
pub mod replay;
pub mod repository;

mod workers;

pub use api::{
    Agent, AgentFault, CallContext, CallPhase, Capabilities, ClassicRules, FaultKind,
    NullPresenter, Presenter, RandomAgent, Result, RulePolicy, RunStatus, RuntimeError,
    TextPresenter,
};
pub use batch::{BatchSummary, GameReport, run_games};
pub use config::{BatchOptions, ControllerConfig};
pub use controller::{Controller, ControllerBuilder, RunOutcome};
pub use replay::{ReplayError, replay};
pub use repository::{Recording, RepositoryError};
