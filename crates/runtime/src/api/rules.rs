//! Rule policy: termination, crash reporting and time budgets.
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};

use pacman_core::{GameConfig, GameState, Layout, PACMAN_INDEX};

use super::agent::Agent;
use super::errors::{AgentFault, Result};
use super::presenter::Presenter;
use crate::config::ControllerConfig;
use crate::controller::Controller;

/// Run-level flags the controller exposes and the rule policy updates.
#[derive(Clone, Debug, Default)]
pub struct RunStatus {
    pub game_over: bool,
    pub agent_crashed: bool,
    pub agent_timeout: bool,
    pub fault: Option<AgentFault>,
}

/// Governs when a run ends and how much time each agent gets.
pub trait RulePolicy: Send {
    /// Called once with the initial state before any agent runs.
    fn initialize(&mut self, _state: &GameState) {}

    /// Inspects every new state; sets `status.game_over` to stop the run.
    fn process(&mut self, state: &GameState, status: &mut RunStatus);

    /// Reports that `agent` faulted and the run is ending.
    fn agent_crash(&mut self, status: &RunStatus, agent: usize);

    /// How far the game has progressed, in `[0, 1]`.
    fn progress(&self, state: &GameState) -> f64;

    fn max_startup_time(&self, agent: usize) -> Duration;

    fn move_timeout(&self, agent: usize) -> Duration;

    fn move_warning_time(&self, agent: usize) -> Duration;

    fn max_total_time(&self, agent: usize) -> Duration;

    fn max_warning_count(&self, agent: usize) -> u32;
}

/// Classic rules: the game ends on win or lose, and every agent gets the
/// same per-call budget with no slow-move allowance.
#[derive(Clone, Debug)]
pub struct ClassicRules {
    timeout: Duration,
    quiet: bool,
    initial_food: usize,
}

impl ClassicRules {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            quiet: false,
            initial_food: 0,
        }
    }

    /// Log outcomes at debug level (training games).
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sets up a controller for one game on `layout`.
    ///
    /// Ghost agents beyond the number of ghost starts in the layout are
    /// dropped; the first agent always plays pacman.
    pub fn new_game(
        &self,
        layout: Arc<Layout>,
        pacman: Box<dyn Agent>,
        mut ghosts: Vec<Box<dyn Agent>>,
        presenter: Box<dyn Presenter>,
        game_config: GameConfig,
        controller_config: ControllerConfig,
    ) -> Result<Controller> {
        ghosts.truncate(layout.num_ghosts());
        let state = GameState::new(layout, ghosts.len(), game_config);

        Controller::builder()
            .config(controller_config)
            .initial_state(state)
            .agents(std::iter::once(pacman).chain(ghosts))
            .boxed_presenter(presenter)
            .rules(self.clone())
            .build()
    }

    fn announce(&self, message: &str, score: i64) {
        if self.quiet {
            debug!(target: "runtime::rules", score, "{message}");
        } else {
            info!(target: "runtime::rules", score, "{message}");
        }
    }
}

impl Default for ClassicRules {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIMEOUT)
    }
}

impl RulePolicy for ClassicRules {
    fn initialize(&mut self, state: &GameState) {
        self.initial_food = state.num_food();
    }

    fn process(&mut self, state: &GameState, status: &mut RunStatus) {
        if state.is_win() {
            self.announce("Pacman emerges victorious!", state.score());
            status.game_over = true;
        } else if state.is_lose() {
            self.announce("Pacman died!", state.score());
            status.game_over = true;
        }
    }

    fn agent_crash(&mut self, _status: &RunStatus, agent: usize) {
        if agent == PACMAN_INDEX {
            error!(target: "runtime::rules", agent, "Pacman crashed");
        } else {
            error!(target: "runtime::rules", agent, "A ghost crashed");
        }
    }

    /// Fraction of the initial food eaten so far: 0.0 on a fresh board,
    /// rising to 1.0 once it is cleared. This is the complement of the
    /// share of food still remaining.
    fn progress(&self, state: &GameState) -> f64 {
        if self.initial_food == 0 {
            return 1.0;
        }
        let remaining = state.num_food().min(self.initial_food);
        1.0 - remaining as f64 / self.initial_food as f64
    }

    fn max_startup_time(&self, _agent: usize) -> Duration {
        self.timeout
    }

    fn move_timeout(&self, _agent: usize) -> Duration {
        self.timeout
    }

    fn move_warning_time(&self, _agent: usize) -> Duration {
        self.timeout
    }

    fn max_total_time(&self, _agent: usize) -> Duration {
        self.timeout
    }

    fn max_warning_count(&self, _agent: usize) -> u32 {
        0
    }
}
