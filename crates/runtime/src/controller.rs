//! Turn scheduler.
//!
//! The [`Controller`] owns the authoritative [`GameState`] and drives the
//! agents round-robin: optional observation, action, successor generation,
//! presentation, rule processing. Agents only ever receive copies of the
//! state, and every call is bounded by the budgets of the [`RulePolicy`].

use std::time::Duration;

use tracing::{debug, error, info, warn};

use pacman_core::{Direction, ExploredStates, GameError, GameState};

use crate::api::{
    Agent, AgentFault, CallPhase, Capabilities, ClassicRules, FaultKind, NullPresenter, Presenter,
    Result, RulePolicy, RunStatus, RuntimeError,
};
use crate::config::ControllerConfig;
use crate::workers::AgentHandle;

/// How a run ended.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Win { score: i64 },
    Lose { score: i64 },
    /// An agent faulted and the run was stopped early.
    Faulted { fault: AgentFault, score: i64 },
    /// The rule policy ended the run without a win or loss.
    Stopped { score: i64 },
}

impl RunOutcome {
    pub fn score(&self) -> i64 {
        match self {
            Self::Win { score }
            | Self::Lose { score }
            | Self::Faulted { score, .. }
            | Self::Stopped { score } => *score,
        }
    }

    pub fn is_win(&self) -> bool {
        matches!(self, Self::Win { .. })
    }

    pub fn is_faulted(&self) -> bool {
        matches!(self, Self::Faulted { .. })
    }
}

/// Drives one game from its initial state to a terminal outcome.
pub struct Controller {
    config: ControllerConfig,
    state: GameState,
    agents: Vec<AgentHandle>,
    presenter: Box<dyn Presenter>,
    rules: Box<dyn RulePolicy>,
    status: RunStatus,
    move_history: Vec<(usize, Direction)>,
    total_agent_times: Vec<Duration>,
    total_agent_time_warnings: Vec<u32>,
    num_moves: u64,
    explored: ExploredStates,
    started: bool,
}

impl Controller {
    pub fn builder() -> ControllerBuilder {
        ControllerBuilder::new()
    }

    /// Current authoritative state (the final state once the run is over).
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn move_history(&self) -> &[(usize, Direction)] {
        &self.move_history
    }

    pub fn status(&self) -> &RunStatus {
        &self.status
    }

    pub fn is_game_over(&self) -> bool {
        self.status.game_over
    }

    pub fn agent_crashed(&self) -> bool {
        self.status.agent_crashed
    }

    pub fn agent_timeout(&self) -> bool {
        self.status.agent_timeout
    }

    pub fn fault(&self) -> Option<&AgentFault> {
        self.status.fault.as_ref()
    }

    /// Completed rounds (every agent moved once).
    pub fn num_moves(&self) -> u64 {
        self.num_moves
    }

    pub fn total_agent_times(&self) -> &[Duration] {
        &self.total_agent_times
    }

    pub fn total_agent_time_warnings(&self) -> &[u32] {
        &self.total_agent_time_warnings
    }

    /// Diagnostics captured from a muted agent.
    pub fn agent_output(&self, agent: usize) -> Option<String> {
        self.agents.get(agent).and_then(AgentHandle::output)
    }

    pub fn progress(&self) -> f64 {
        if self.status.game_over {
            1.0
        } else {
            self.rules.progress(&self.state)
        }
    }

    pub fn explored(&self) -> &ExploredStates {
        &self.explored
    }

    pub fn reset_explored(&mut self) -> ExploredStates {
        std::mem::take(&mut self.explored)
    }

    pub fn outcome(&self) -> RunOutcome {
        let score = self.state.score();
        if let Some(fault) = &self.status.fault {
            RunOutcome::Faulted {
                fault: fault.clone(),
                score,
            }
        } else if self.state.is_win() {
            RunOutcome::Win { score }
        } else if self.state.is_lose() {
            RunOutcome::Lose { score }
        } else {
            RunOutcome::Stopped { score }
        }
    }

    /// Plays the game to completion.
    ///
    /// With fault isolation enabled, agent faults end the run and are reported
    /// through [`RunOutcome::Faulted`]; otherwise they are returned as
    /// [`RuntimeError::Agent`] immediately.
    pub async fn run(&mut self) -> Result<RunOutcome> {
        if self.started {
            return Err(RuntimeError::AlreadyRun);
        }
        self.started = true;

        let num_agents = self.agents.len();
        self.presenter.initialize(&self.state);
        self.rules.initialize(&self.state);
        self.num_moves = 0;
        info!(target: "runtime::controller", num_agents, "game starting");

        if let Err(error) = self.register_agents().await {
            self.on_error(error)?;
        }

        let mut agent_index = self.config.starting_index % num_agents.max(1);
        while !self.status.game_over && num_agents > 0 {
            if let Err(error) = self.play_turn(agent_index).await {
                self.on_error(error)?;
                break;
            }

            agent_index = (agent_index + 1) % num_agents;
            if agent_index == 0 {
                self.num_moves += 1;
            }
        }

        if let Err(error) = self.finalize_agents().await {
            self.presenter.finish();
            return Err(error);
        }
        self.presenter.finish();

        let outcome = self.outcome();
        info!(
            target: "runtime::controller",
            score = outcome.score(),
            moves = self.move_history.len(),
            crashed = self.status.agent_crashed,
            "game finished"
        );
        Ok(outcome)
    }

    async fn register_agents(&mut self) -> Result<()> {
        for index in 0..self.agents.len() {
            if !self.agents[index]
                .capabilities()
                .contains(Capabilities::REGISTER_INITIAL_STATE)
            {
                continue;
            }
            let budget = self.rules.max_startup_time(index);
            let timed = self.agents[index]
                .register_initial_state(self.state.clone(), budget)
                .await
                .map_err(|kind| AgentFault::new(index, CallPhase::Startup, kind))?;

            debug!(
                target: "runtime::controller",
                agent = index,
                elapsed = ?timed.elapsed,
                "agent registered"
            );
            self.total_agent_times[index] += timed.elapsed;
        }
        Ok(())
    }

    async fn play_turn(&mut self, index: usize) -> Result<()> {
        let timeout = self.rules.move_timeout(index);
        let mut move_time = Duration::ZERO;

        let observation = if self.agents[index]
            .capabilities()
            .contains(Capabilities::OBSERVE)
        {
            match self.agents[index].observe(self.state.clone(), timeout).await {
                Ok(timed) => {
                    move_time += timed.elapsed;
                    timed.value
                }
                Err(FaultKind::Timeout { .. }) => {
                    warn!(
                        target: "runtime::controller",
                        agent = index,
                        "observation timed out, using the unfiltered state"
                    );
                    move_time += timeout;
                    self.state.clone()
                }
                Err(kind) => {
                    return Err(AgentFault::new(index, CallPhase::Observation, kind).into());
                }
            }
        } else {
            self.state.clone()
        };

        let remaining = timeout.saturating_sub(move_time);
        let action = self.agents[index]
            .get_action(observation, remaining)
            .await
            .map_err(|kind| {
                let kind = match kind {
                    FaultKind::Timeout { .. } => FaultKind::Timeout { budget: timeout },
                    other => other,
                };
                AgentFault::new(index, CallPhase::Action, kind)
            })?;
        move_time += action.elapsed;

        self.charge_time(index, move_time)?;

        let next = self
            .state
            .generate_successor_tracked(index, action.value, &mut self.explored)
            .map_err(|error| {
                if error.is_terminal_state() {
                    RuntimeError::Engine(error)
                } else {
                    AgentFault::new(index, CallPhase::Action, FaultKind::IllegalAction(error))
                        .into()
                }
            })?;

        self.move_history.push((index, action.value));
        self.state = next;
        self.presenter.update(&self.state);
        self.rules.process(&self.state, &mut self.status);
        Ok(())
    }

    /// Adds `move_time` to the agent's account and enforces the slow-move and
    /// total-time limits.
    fn charge_time(&mut self, index: usize, move_time: Duration) -> Result<()> {
        if move_time > self.rules.move_warning_time(index) {
            self.total_agent_time_warnings[index] += 1;
            let warnings = self.total_agent_time_warnings[index];
            let limit = self.rules.max_warning_count(index);
            warn!(
                target: "runtime::controller",
                agent = index,
                elapsed = ?move_time,
                warnings,
                "slow move"
            );
            if warnings > limit {
                return Err(AgentFault::new(
                    index,
                    CallPhase::Action,
                    FaultKind::TooManyWarnings { warnings, limit },
                )
                .into());
            }
        }

        self.total_agent_times[index] += move_time;
        let total = self.total_agent_times[index];
        let budget = self.rules.max_total_time(index);
        if total > budget {
            return Err(AgentFault::new(
                index,
                CallPhase::Action,
                FaultKind::TotalTimeExceeded { total, budget },
            )
            .into());
        }
        Ok(())
    }

    async fn finalize_agents(&mut self) -> Result<()> {
        // An agent that timed out may still be busy; don't queue more work behind it.
        let busy = self
            .status
            .fault
            .as_ref()
            .filter(|fault| fault.kind.is_timeout())
            .map(|fault| fault.agent);

        for index in 0..self.agents.len() {
            if busy == Some(index)
                || !self.agents[index]
                    .capabilities()
                    .contains(Capabilities::FINAL)
            {
                continue;
            }
            let budget = self.rules.move_timeout(index);
            match self.agents[index]
                .final_state(self.state.clone(), budget)
                .await
            {
                Ok(timed) => self.total_agent_times[index] += timed.elapsed,
                Err(kind) => {
                    let fault = AgentFault::new(index, CallPhase::Final, kind);
                    if self.status.fault.is_some() && self.config.catch_exceptions {
                        warn!(
                            target: "runtime::controller",
                            %fault,
                            "additional fault after the run ended"
                        );
                        continue;
                    }
                    self.on_error(fault.into())?;
                }
            }
        }
        Ok(())
    }

    /// Records an agent fault when isolation is on; anything else propagates.
    fn on_error(&mut self, error: RuntimeError) -> Result<()> {
        let fault = match error {
            RuntimeError::Agent(fault) if self.config.catch_exceptions => fault,
            other => {
                if let RuntimeError::Engine(engine_error) = &other {
                    error!(
                        target: "runtime::controller",
                        code = engine_error.error_code(),
                        severity = engine_error.severity().as_str(),
                        "rule engine contract violated"
                    );
                }
                return Err(other);
            }
        };

        match &fault.kind {
            FaultKind::IllegalAction(execute_error) => warn!(
                target: "runtime::controller",
                agent = fault.agent,
                code = execute_error.error_code(),
                severity = execute_error.severity().as_str(),
                "{fault}"
            ),
            _ => warn!(target: "runtime::controller", agent = fault.agent, "{fault}"),
        }

        if fault.kind.is_timeout() || fault.kind.is_over_budget() {
            self.status.agent_timeout = true;
        }
        self.status.agent_crashed = true;
        self.status.game_over = true;
        self.rules.agent_crash(&self.status, fault.agent);
        self.status.fault = Some(fault);
        Ok(())
    }
}

/// Builder for [`Controller`].
pub struct ControllerBuilder {
    config: ControllerConfig,
    state: Option<GameState>,
    agents: Vec<Box<dyn Agent>>,
    presenter: Option<Box<dyn Presenter>>,
    rules: Option<Box<dyn RulePolicy>>,
}

impl ControllerBuilder {
    fn new() -> Self {
        Self {
            config: ControllerConfig::default(),
            state: None,
            agents: Vec::new(),
            presenter: None,
            rules: None,
        }
    }

    /// Override controller configuration
    pub fn config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn catch_exceptions(mut self, catch_exceptions: bool) -> Self {
        self.config.catch_exceptions = catch_exceptions;
        self
    }

    pub fn mute_agents(mut self, mute_agents: bool) -> Self {
        self.config.mute_agents = mute_agents;
        self
    }

    /// Provide initial game state
    pub fn initial_state(mut self, state: GameState) -> Self {
        self.state = Some(state);
        self
    }

    /// Append the agent for the next slot (pacman first, then pursuers).
    pub fn agent(mut self, agent: impl Agent + 'static) -> Self {
        self.agents.push(Box::new(agent));
        self
    }

    pub fn agents(mut self, agents: impl IntoIterator<Item = Box<dyn Agent>>) -> Self {
        self.agents.extend(agents);
        self
    }

    /// Defaults to [`NullPresenter`].
    pub fn presenter(mut self, presenter: impl Presenter + 'static) -> Self {
        self.presenter = Some(Box::new(presenter));
        self
    }

    pub fn boxed_presenter(mut self, presenter: Box<dyn Presenter>) -> Self {
        self.presenter = Some(presenter);
        self
    }

    /// Defaults to [`ClassicRules::default`].
    pub fn rules(mut self, rules: impl RulePolicy + 'static) -> Self {
        self.rules = Some(Box::new(rules));
        self
    }

    /// Spawns one worker thread per agent.
    pub fn build(self) -> Result<Controller> {
        let state = self.state.ok_or(RuntimeError::MissingInitialState)?;
        if self.agents.len() != state.num_agents() {
            return Err(RuntimeError::AgentCountMismatch {
                expected: state.num_agents(),
                provided: self.agents.len(),
            });
        }

        let mute = self.config.mute_agents;
        let agents = self
            .agents
            .into_iter()
            .enumerate()
            .map(|(index, agent)| AgentHandle::spawn(index, agent, mute))
            .collect::<Result<Vec<_>>>()?;
        let num_agents = agents.len();

        Ok(Controller {
            config: self.config,
            state,
            agents,
            presenter: self
                .presenter
                .unwrap_or_else(|| Box::new(NullPresenter)),
            rules: self
                .rules
                .unwrap_or_else(|| Box::new(ClassicRules::default())),
            status: RunStatus::default(),
            move_history: Vec::new(),
            total_agent_times: vec![Duration::ZERO; num_agents],
            total_agent_time_warnings: vec![0; num_agents],
            num_moves: 0,
            explored: ExploredStates::new(),
            started: false,
        })
    }
}
