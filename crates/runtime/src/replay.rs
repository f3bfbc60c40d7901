//! Deterministic reconstruction of a recorded game.
//!
//! The rule engine is a pure function of (state, agent, action), so feeding
//! the recorded actions into a fresh initial state reproduces every
//! intermediate snapshot exactly.

use thiserror::Error;
use tracing::{debug, info};

use pacman_core::{Direction, ExecuteError, GameState};

use crate::api::Presenter;
use crate::repository::Recording;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("recorded move {index} ({agent}, {action}) was rejected")]
    Engine {
        index: usize,
        agent: usize,
        action: Direction,
        #[source]
        source: ExecuteError,
    },

    #[error("replayed final state {actual} does not match recorded {expected}")]
    DigestMismatch { expected: String, actual: String },
}

/// Replays `recording`, presenting every snapshot.
///
/// Returns all snapshots in order, starting with the initial state.
pub fn replay(
    recording: &Recording,
    presenter: &mut dyn Presenter,
) -> Result<Vec<GameState>, ReplayError> {
    let mut state = recording.initial_state();
    presenter.initialize(&state);

    let mut states = Vec::with_capacity(recording.actions.len() + 1);
    states.push(state.clone());

    for (index, &(agent, action)) in recording.actions.iter().enumerate() {
        state = state
            .generate_successor(agent, action)
            .map_err(|source| ReplayError::Engine {
                index,
                agent,
                action,
                source,
            })?;
        presenter.update(&state);
        states.push(state.clone());
    }
    presenter.finish();

    if let Some(expected) = &recording.final_digest {
        let actual = state.data().digest_hex();
        if &actual != expected {
            return Err(ReplayError::DigestMismatch {
                expected: expected.clone(),
                actual,
            });
        }
        debug!(target: "runtime::replay", digest = %actual, "final state verified");
    }

    info!(
        target: "runtime::replay",
        moves = recording.actions.len(),
        score = state.score(),
        "replay finished"
    );
    Ok(states)
}
