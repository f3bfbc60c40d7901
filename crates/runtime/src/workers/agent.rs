//! Dedicated worker thread per agent.
//!
//! The controller never calls agent code directly. Each agent is moved onto
//! its own thread and driven through [`AgentCommand`]s; replies come back
//! over `oneshot` channels. When a deadline fires the controller drops the
//! reply receiver and flips the call's cancellation flag, so whatever the
//! overrunning callback eventually returns is thrown away.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use pacman_core::{Direction, GameState};

use crate::api::{Agent, CallContext, Capabilities, FaultKind, Result, RuntimeError};

use super::output::OutputSink;

type Reply<T> = oneshot::Sender<std::result::Result<T, FaultKind>>;

/// Commands accepted by an agent worker.
pub(crate) enum AgentCommand {
    RegisterInitialState {
        state: GameState,
        ctx: CallContext,
        reply: Reply<()>,
    },
    Observe {
        state: GameState,
        ctx: CallContext,
        reply: Reply<GameState>,
    },
    GetAction {
        state: GameState,
        ctx: CallContext,
        reply: Reply<Direction>,
    },
    Final {
        state: GameState,
        ctx: CallContext,
        reply: Reply<()>,
    },
}

impl AgentCommand {
    fn name(&self) -> &'static str {
        match self {
            Self::RegisterInitialState { .. } => "RegisterInitialState",
            Self::Observe { .. } => "Observe",
            Self::GetAction { .. } => "GetAction",
            Self::Final { .. } => "Final",
        }
    }

    fn ctx(&self) -> &CallContext {
        match self {
            Self::RegisterInitialState { ctx, .. }
            | Self::Observe { ctx, .. }
            | Self::GetAction { ctx, .. }
            | Self::Final { ctx, .. } => ctx,
        }
    }
}

/// Result of a call that finished in time.
#[derive(Debug)]
pub(crate) struct Timed<T> {
    pub(crate) value: T,
    pub(crate) elapsed: Duration,
}

/// Owns one agent and serves commands until the controller hangs up.
struct AgentWorker {
    index: usize,
    agent: Box<dyn Agent>,
    command_rx: mpsc::UnboundedReceiver<AgentCommand>,
    output: Option<OutputSink>,
}

impl AgentWorker {
    fn run(mut self) {
        while let Some(command) = self.command_rx.blocking_recv() {
            self.handle_command(command);
        }
        debug!(
            target: "runtime::worker",
            agent = self.index,
            "command channel closed, worker exiting"
        );
    }

    fn handle_command(&mut self, command: AgentCommand) {
        if command.ctx().is_cancelled() {
            debug!(
                target: "runtime::worker",
                agent = self.index,
                command = command.name(),
                "skipping command whose deadline already passed"
            );
            return;
        }

        let name = command.name();
        let delivered = match command {
            AgentCommand::RegisterInitialState { state, ctx, reply } => reply
                .send(self.invoke(|agent| agent.register_initial_state(&state, &ctx)))
                .is_ok(),
            AgentCommand::Observe { state, ctx, reply } => reply
                .send(self.invoke(|agent| agent.observe(state, &ctx)))
                .is_ok(),
            AgentCommand::GetAction { state, ctx, reply } => reply
                .send(self.invoke(|agent| agent.get_action(&state, &ctx)))
                .is_ok(),
            AgentCommand::Final { state, ctx: _, reply } => reply
                .send(self.invoke(|agent| agent.final_state(&state)))
                .is_ok(),
        };

        if !delivered {
            debug!(
                target: "runtime::worker",
                agent = self.index,
                command = name,
                "reply discarded (caller stopped waiting)"
            );
        }
    }

    /// Runs one callback with panics caught and, when muted, with its
    /// diagnostics routed into this agent's buffer.
    fn invoke<T>(
        &mut self,
        call: impl FnOnce(&mut dyn Agent) -> anyhow::Result<T>,
    ) -> std::result::Result<T, FaultKind> {
        let agent = self.agent.as_mut();
        let guarded = move || panic::catch_unwind(AssertUnwindSafe(|| call(agent)));

        let outcome = match &self.output {
            Some(sink) => tracing::subscriber::with_default(sink.subscriber(), guarded),
            None => guarded(),
        };

        match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(error)) => Err(FaultKind::Error(format!("{error:#}"))),
            Err(payload) => Err(FaultKind::Panic(panic_message(payload.as_ref()))),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Controller-side handle to an agent worker.
pub(crate) struct AgentHandle {
    index: usize,
    capabilities: Capabilities,
    command_tx: mpsc::UnboundedSender<AgentCommand>,
    output: Option<OutputSink>,
}

impl AgentHandle {
    /// Moves `agent` onto a new worker thread.
    pub(crate) fn spawn(index: usize, agent: Box<dyn Agent>, mute: bool) -> Result<Self> {
        let capabilities = agent.capabilities();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let output = mute.then(OutputSink::default);

        let worker = AgentWorker {
            index,
            agent,
            command_rx,
            output: output.clone(),
        };
        std::thread::Builder::new()
            .name(format!("agent-{index}"))
            .spawn(move || worker.run())
            .map_err(|source| RuntimeError::WorkerSpawn {
                agent: index,
                source,
            })?;

        debug!(target: "runtime::worker", agent = index, ?capabilities, "agent worker started");

        Ok(Self {
            index,
            capabilities,
            command_tx,
            output,
        })
    }

    pub(crate) fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub(crate) fn output(&self) -> Option<String> {
        self.output.as_ref().map(OutputSink::contents)
    }

    pub(crate) async fn register_initial_state(
        &self,
        state: GameState,
        budget: Duration,
    ) -> std::result::Result<Timed<()>, FaultKind> {
        self.call(budget, |ctx, reply| AgentCommand::RegisterInitialState {
            state,
            ctx,
            reply,
        })
        .await
    }

    pub(crate) async fn observe(
        &self,
        state: GameState,
        budget: Duration,
    ) -> std::result::Result<Timed<GameState>, FaultKind> {
        self.call(budget, |ctx, reply| AgentCommand::Observe { state, ctx, reply })
            .await
    }

    pub(crate) async fn get_action(
        &self,
        state: GameState,
        budget: Duration,
    ) -> std::result::Result<Timed<Direction>, FaultKind> {
        self.call(budget, |ctx, reply| AgentCommand::GetAction { state, ctx, reply })
            .await
    }

    pub(crate) async fn final_state(
        &self,
        state: GameState,
        budget: Duration,
    ) -> std::result::Result<Timed<()>, FaultKind> {
        self.call(budget, |ctx, reply| AgentCommand::Final { state, ctx, reply })
            .await
    }

    async fn call<T>(
        &self,
        budget: Duration,
        command: impl FnOnce(CallContext, Reply<T>) -> AgentCommand,
    ) -> std::result::Result<Timed<T>, FaultKind> {
        let ctx = CallContext::new(self.index, budget);
        let cancel = ctx.clone();
        let (reply_tx, reply_rx) = oneshot::channel();

        let started = Instant::now();
        self.command_tx
            .send(command(ctx, reply_tx))
            .map_err(|_| FaultKind::WorkerGone)?;

        match tokio::time::timeout(budget, reply_rx).await {
            Ok(Ok(Ok(value))) => Ok(Timed {
                value,
                elapsed: started.elapsed(),
            }),
            Ok(Ok(Err(kind))) => Err(kind),
            Ok(Err(_closed)) => Err(FaultKind::WorkerGone),
            Err(_elapsed) => {
                cancel.cancel();
                debug!(
                    target: "runtime::worker",
                    agent = self.index,
                    ?budget,
                    "call deadline passed"
                );
                Err(FaultKind::Timeout { budget })
            }
        }
    }
}
