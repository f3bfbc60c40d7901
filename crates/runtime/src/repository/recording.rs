use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use pacman_core::{Direction, GameConfig, GameState, Layout};

use crate::controller::Controller;
use crate::repository::{RepositoryError, Result};

/// A finished (or aborted) game in replayable form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub layout: Layout,
    pub config: GameConfig,
    pub num_agents: usize,
    /// `(agent, action)` in the order the moves were applied.
    pub actions: Vec<(usize, Direction)>,
    /// Hex SHA-256 of the last state, checked on replay when present.
    pub final_digest: Option<String>,
}

impl Recording {
    pub fn from_controller(controller: &Controller) -> Self {
        let state = controller.state();
        Self {
            layout: Layout::clone(state.data().layout()),
            config: *state.data().config(),
            num_agents: state.num_agents(),
            actions: controller.move_history().to_vec(),
            final_digest: Some(state.data().digest_hex()),
        }
    }

    /// Initial state this recording starts from.
    pub fn initial_state(&self) -> GameState {
        GameState::new(
            Arc::new(self.layout.clone()),
            self.num_agents.saturating_sub(1),
            self.config,
        )
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = if is_json(path) {
            serde_json::to_vec_pretty(self).map_err(|e| {
                RepositoryError::Json(format!("Failed to serialize recording: {}", e))
            })?
        } else {
            bincode::serialize(self).map_err(|e| RepositoryError::Serialization(e.to_string()))?
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, path)?;

        debug!(
            target: "runtime::replay",
            path = %path.display(),
            moves = self.actions.len(),
            "recording saved"
        );
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let recording: Self = if is_json(path) {
            serde_json::from_slice(&bytes)
                .map_err(|e| RepositoryError::Json(format!("Failed to parse recording: {}", e)))?
        } else {
            bincode::deserialize(&bytes)
                .map_err(|e| RepositoryError::Serialization(e.to_string()))?
        };

        if recording.num_agents == 0 {
            return Err(RepositoryError::CorruptedData(
                "recording has no agents".to_string(),
            ));
        }
        if let Some(&(agent, _)) = recording
            .actions
            .iter()
            .find(|(agent, _)| *agent >= recording.num_agents)
        {
            return Err(RepositoryError::CorruptedData(format!(
                "action for agent {agent} but only {} agents recorded",
                recording.num_agents
            )));
        }

        debug!(
            target: "runtime::replay",
            path = %path.display(),
            moves = recording.actions.len(),
            "recording loaded"
        );
        Ok(recording)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
