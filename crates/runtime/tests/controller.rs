use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pacman_core::{Direction, GameConfig, GameState, Layout};
use pacman_runtime::{
    Agent, CallContext, CallPhase, Capabilities, ClassicRules, Controller, FaultKind, Presenter,
    RulePolicy, RunOutcome, RunStatus, RuntimeError,
};

const CORRIDOR: &str = "%%%%%\n%P..%\n%%%%%";
const WITH_GHOST: &str = "%%%%%%%\n%P..G.%\n%%%%%%%";

fn state(text: &str, ghosts: usize) -> GameState {
    let layout = Layout::from_text(text).expect("layout should parse");
    GameState::new(Arc::new(layout), ghosts, GameConfig::default())
}

async fn run(controller: &mut Controller) -> pacman_runtime::Result<RunOutcome> {
    tokio::time::timeout(Duration::from_secs(10), controller.run())
        .await
        .expect("run should finish")
}

/// Plays a fixed list of moves, then stands still.
struct Scripted(VecDeque<Direction>);

impl Scripted {
    fn new(moves: &[Direction]) -> Self {
        Self(moves.iter().copied().collect())
    }
}

impl Agent for Scripted {
    fn get_action(&mut self, _state: &GameState, _ctx: &CallContext) -> anyhow::Result<Direction> {
        Ok(self.0.pop_front().unwrap_or(Direction::Stop))
    }
}

/// Blocks well past any test budget.
struct Sleeper(Duration);

impl Agent for Sleeper {
    fn get_action(&mut self, _state: &GameState, _ctx: &CallContext) -> anyhow::Result<Direction> {
        std::thread::sleep(self.0);
        Ok(Direction::Stop)
    }
}

#[derive(Clone, Default)]
struct Recorder {
    scores: Arc<Mutex<Vec<i64>>>,
    finished: Arc<AtomicUsize>,
}

impl Presenter for Recorder {
    fn initialize(&mut self, state: &GameState) {
        self.scores.lock().unwrap().push(state.score());
    }

    fn update(&mut self, state: &GameState) {
        self.scores.lock().unwrap().push(state.score());
    }

    fn finish(&mut self) {
        self.finished.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn clearing_the_board_wins() {
    let presenter = Recorder::default();
    let mut controller = Controller::builder()
        .initial_state(state(CORRIDOR, 0))
        .agent(Scripted::new(&[Direction::East, Direction::East]))
        .presenter(presenter.clone())
        .build()
        .expect("controller should build");

    let outcome = run(&mut controller).await.expect("run should succeed");

    assert!(matches!(outcome, RunOutcome::Win { score: 520 }));
    assert_eq!(
        controller.move_history(),
        &[(0, Direction::East), (0, Direction::East)]
    );
    assert_eq!(controller.num_moves(), 2);
    assert!(!controller.agent_crashed());
    assert!(controller.state().legal_actions(0).is_empty());
    assert_eq!(controller.progress(), 1.0);
    assert_eq!(*presenter.scores.lock().unwrap(), vec![0, 10, 520]);
    assert_eq!(presenter.finished.load(Ordering::SeqCst), 1);
    // The final state is terminal and never expanded.
    assert_eq!(controller.explored().len(), 2);
}

/// A pursuer that never answers in time ends the run with a fault
/// attributed to it, and nothing it returns later is applied.
#[tokio::test]
async fn move_timeout_faults_the_slow_agent() {
    let mut controller = Controller::builder()
        .initial_state(state(WITH_GHOST, 1))
        .agent(Scripted::new(&[Direction::East]))
        .agent(Sleeper(Duration::from_millis(500)))
        .rules(ClassicRules::new(Duration::from_millis(50)))
        .build()
        .expect("controller should build");

    let outcome = run(&mut controller).await.expect("faults are isolated");

    let RunOutcome::Faulted { fault, score } = outcome else {
        panic!("expected a faulted run, got {outcome:?}");
    };
    assert_eq!(fault.agent, 1);
    assert_eq!(fault.phase, CallPhase::Action);
    assert!(fault.kind.is_timeout());
    assert_eq!(score, 10);
    assert_eq!(controller.move_history(), &[(0, Direction::East)]);
    assert!(controller.agent_timeout());
    assert!(controller.agent_crashed());

    // Give the worker time to finish; its late reply must be dropped.
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(controller.move_history().len(), 1);
    assert_eq!(controller.state().score(), 10);
}

#[tokio::test]
async fn illegal_action_is_attributed_to_the_agent() {
    let mut controller = Controller::builder()
        .initial_state(state(WITH_GHOST, 1))
        .agent(Scripted::new(&[Direction::North]))
        .agent(Scripted::new(&[]))
        .build()
        .expect("controller should build");

    let outcome = run(&mut controller).await.expect("faults are isolated");

    let fault = controller.fault().expect("fault should be recorded");
    assert_eq!(fault.agent, 0);
    match &fault.kind {
        FaultKind::IllegalAction(error) => assert!(error.is_illegal_action()),
        other => panic!("unexpected fault kind: {other:?}"),
    }
    assert!(outcome.is_faulted());
    assert!(!controller.agent_timeout());
    assert!(controller.move_history().is_empty());
}

#[tokio::test]
async fn faults_propagate_without_isolation() {
    let presenter = Recorder::default();
    let mut controller = Controller::builder()
        .initial_state(state(WITH_GHOST, 1))
        .agent(Scripted::new(&[Direction::North]))
        .agent(Scripted::new(&[]))
        .presenter(presenter.clone())
        .catch_exceptions(false)
        .build()
        .expect("controller should build");

    let err = run(&mut controller).await.unwrap_err();

    match err {
        RuntimeError::Agent(fault) => {
            assert_eq!(fault.agent, 0);
            assert!(matches!(fault.kind, FaultKind::IllegalAction(_)));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(controller.move_history().is_empty());
    assert_eq!(presenter.finished.load(Ordering::SeqCst), 0);
}

struct Failing;

impl Agent for Failing {
    fn get_action(&mut self, _state: &GameState, _ctx: &CallContext) -> anyhow::Result<Direction> {
        anyhow::bail!("no plan for this board")
    }
}

struct Panicking;

impl Agent for Panicking {
    fn get_action(&mut self, _state: &GameState, _ctx: &CallContext) -> anyhow::Result<Direction> {
        panic!("boom")
    }
}

#[tokio::test]
async fn agent_errors_and_panics_become_faults() {
    let mut failing = Controller::builder()
        .initial_state(state(CORRIDOR, 0))
        .agent(Failing)
        .build()
        .expect("controller should build");
    run(&mut failing).await.expect("faults are isolated");
    match &failing.fault().expect("fault").kind {
        FaultKind::Error(message) => assert!(message.contains("no plan")),
        other => panic!("unexpected fault kind: {other:?}"),
    }

    let mut panicking = Controller::builder()
        .initial_state(state(CORRIDOR, 0))
        .agent(Panicking)
        .build()
        .expect("controller should build");
    run(&mut panicking).await.expect("faults are isolated");
    match &panicking.fault().expect("fault").kind {
        FaultKind::Panic(message) => assert!(message.contains("boom")),
        other => panic!("unexpected fault kind: {other:?}"),
    }
}

/// Counts every optional callback it receives.
#[derive(Clone, Default)]
struct Hooks {
    registered: Arc<AtomicUsize>,
    observed: Arc<AtomicUsize>,
    finalized: Arc<AtomicUsize>,
}

impl Agent for Hooks {
    fn capabilities(&self) -> Capabilities {
        Capabilities::all()
    }

    fn register_initial_state(
        &mut self,
        _state: &GameState,
        _ctx: &CallContext,
    ) -> anyhow::Result<()> {
        self.registered.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn observe(&mut self, state: GameState, _ctx: &CallContext) -> anyhow::Result<GameState> {
        self.observed.fetch_add(1, Ordering::SeqCst);
        Ok(state)
    }

    fn get_action(&mut self, _state: &GameState, _ctx: &CallContext) -> anyhow::Result<Direction> {
        Ok(Direction::East)
    }

    fn final_state(&mut self, _state: &GameState) -> anyhow::Result<()> {
        self.finalized.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn optional_hooks_run_once_per_phase() {
    let hooks = Hooks::default();
    let mut controller = Controller::builder()
        .initial_state(state(CORRIDOR, 0))
        .agent(hooks.clone())
        .build()
        .expect("controller should build");

    let outcome = run(&mut controller).await.expect("run should succeed");

    assert!(outcome.is_win());
    assert_eq!(hooks.registered.load(Ordering::SeqCst), 1);
    assert_eq!(hooks.observed.load(Ordering::SeqCst), 2);
    assert_eq!(hooks.finalized.load(Ordering::SeqCst), 1);
}

struct SlowObserver;

impl Agent for SlowObserver {
    fn capabilities(&self) -> Capabilities {
        Capabilities::OBSERVE
    }

    fn observe(&mut self, state: GameState, _ctx: &CallContext) -> anyhow::Result<GameState> {
        std::thread::sleep(Duration::from_millis(300));
        Ok(state)
    }

    fn get_action(&mut self, _state: &GameState, _ctx: &CallContext) -> anyhow::Result<Direction> {
        Ok(Direction::East)
    }
}

/// The observation eats the whole move budget, so the action call that
/// follows has nothing left and times out.
#[tokio::test]
async fn slow_observation_uses_up_the_move_budget() {
    let mut controller = Controller::builder()
        .initial_state(state(CORRIDOR, 0))
        .agent(SlowObserver)
        .rules(ClassicRules::new(Duration::from_millis(50)))
        .build()
        .expect("controller should build");

    run(&mut controller).await.expect("faults are isolated");

    let fault = controller.fault().expect("fault");
    assert_eq!(fault.phase, CallPhase::Action);
    assert!(fault.kind.is_timeout());
    assert!(controller.move_history().is_empty());
}

struct Chatty;

impl Agent for Chatty {
    fn get_action(&mut self, state: &GameState, ctx: &CallContext) -> anyhow::Result<Direction> {
        tracing::info!(agent = ctx.agent(), score = state.score(), "thinking hard");
        Ok(Direction::East)
    }
}

#[tokio::test]
async fn muted_agents_write_into_their_own_buffer() {
    let mut controller = Controller::builder()
        .initial_state(state(CORRIDOR, 0))
        .agent(Chatty)
        .mute_agents(true)
        .build()
        .expect("controller should build");

    run(&mut controller).await.expect("run should succeed");

    let output = controller.agent_output(0).expect("output is captured");
    assert_eq!(output.matches("thinking hard").count(), 2);

    let mut loud = Controller::builder()
        .initial_state(state(CORRIDOR, 0))
        .agent(Chatty)
        .build()
        .expect("controller should build");
    run(&mut loud).await.expect("run should succeed");
    assert!(loud.agent_output(0).is_none());
}

/// Ends the game after a fixed number of moves, with configurable time
/// limits for every agent.
struct ShortGame {
    moves_left: usize,
    total: Duration,
    warning_time: Duration,
    max_warnings: u32,
}

impl ShortGame {
    fn new(moves_left: usize) -> Self {
        Self {
            moves_left,
            total: Duration::from_secs(5),
            warning_time: Duration::from_secs(1),
            max_warnings: 1,
        }
    }
}

impl RulePolicy for ShortGame {
    fn process(&mut self, _state: &GameState, status: &mut RunStatus) {
        self.moves_left = self.moves_left.saturating_sub(1);
        if self.moves_left == 0 {
            status.game_over = true;
        }
    }

    fn agent_crash(&mut self, _status: &RunStatus, _agent: usize) {}

    fn progress(&self, _state: &GameState) -> f64 {
        0.0
    }

    fn max_startup_time(&self, _agent: usize) -> Duration {
        Duration::from_secs(1)
    }

    fn move_timeout(&self, _agent: usize) -> Duration {
        Duration::from_secs(1)
    }

    fn move_warning_time(&self, _agent: usize) -> Duration {
        self.warning_time
    }

    fn max_total_time(&self, _agent: usize) -> Duration {
        self.total
    }

    fn max_warning_count(&self, _agent: usize) -> u32 {
        self.max_warnings
    }
}

#[tokio::test]
async fn rule_policy_can_stop_the_game() {
    let mut controller = Controller::builder()
        .initial_state(state(WITH_GHOST, 1))
        .agent(Scripted::new(&[Direction::East, Direction::West]))
        .agent(Scripted::new(&[Direction::East]))
        .rules(ShortGame::new(3))
        .build()
        .expect("controller should build");

    let outcome = run(&mut controller).await.expect("run should succeed");

    assert!(matches!(outcome, RunOutcome::Stopped { score: 10 }));
    assert_eq!(controller.move_history().len(), 3);
    assert_eq!(controller.num_moves(), 1);
    assert_eq!(controller.progress(), 1.0);
}

#[tokio::test]
async fn cumulative_time_budget_is_enforced() {
    let mut controller = Controller::builder()
        .initial_state(state(CORRIDOR, 0))
        .agent(Sleeper(Duration::from_millis(20)))
        .rules(ShortGame {
            total: Duration::from_millis(5),
            ..ShortGame::new(100)
        })
        .build()
        .expect("controller should build");

    run(&mut controller).await.expect("faults are isolated");

    let fault = controller.fault().expect("fault");
    assert!(matches!(fault.kind, FaultKind::TotalTimeExceeded { .. }));
    assert!(controller.agent_timeout());
    assert!(controller.move_history().is_empty());
    assert!(controller.total_agent_times()[0] >= Duration::from_millis(20));
}

/// Every move is slow; the second slow move exceeds the allowance of one.
#[tokio::test]
async fn too_many_slow_moves_fault_the_agent() {
    let mut controller = Controller::builder()
        .initial_state(state(CORRIDOR, 0))
        .agent(Sleeper(Duration::from_millis(20)))
        .rules(ShortGame {
            warning_time: Duration::from_millis(5),
            ..ShortGame::new(100)
        })
        .build()
        .expect("controller should build");

    run(&mut controller).await.expect("faults are isolated");

    let fault = controller.fault().expect("fault");
    assert_eq!(fault.agent, 0);
    assert!(matches!(
        fault.kind,
        FaultKind::TooManyWarnings {
            warnings: 2,
            limit: 1
        }
    ));
    assert!(controller.agent_timeout());
    assert_eq!(controller.total_agent_time_warnings(), &[2]);
    assert_eq!(controller.move_history(), &[(0, Direction::Stop)]);
}

struct SlowStarter;

impl Agent for SlowStarter {
    fn capabilities(&self) -> Capabilities {
        Capabilities::REGISTER_INITIAL_STATE
    }

    fn register_initial_state(
        &mut self,
        _state: &GameState,
        _ctx: &CallContext,
    ) -> anyhow::Result<()> {
        std::thread::sleep(Duration::from_millis(300));
        Ok(())
    }

    fn get_action(&mut self, _state: &GameState, _ctx: &CallContext) -> anyhow::Result<Direction> {
        Ok(Direction::East)
    }
}

#[tokio::test]
async fn startup_timeout_ends_the_run_before_any_move() {
    let mut controller = Controller::builder()
        .initial_state(state(CORRIDOR, 0))
        .agent(SlowStarter)
        .rules(ClassicRules::new(Duration::from_millis(50)))
        .build()
        .expect("controller should build");

    let outcome = run(&mut controller).await.expect("faults are isolated");

    assert!(outcome.is_faulted());
    let fault = controller.fault().expect("fault");
    assert_eq!(fault.agent, 0);
    assert_eq!(fault.phase, CallPhase::Startup);
    assert!(fault.kind.is_timeout());
    assert!(controller.agent_timeout());
    assert!(controller.move_history().is_empty());
    assert_eq!(controller.num_moves(), 0);
}

/// Wins the corridor, then fails in its final callback.
struct FailsAtTheEnd;

impl Agent for FailsAtTheEnd {
    fn capabilities(&self) -> Capabilities {
        Capabilities::FINAL
    }

    fn get_action(&mut self, _state: &GameState, _ctx: &CallContext) -> anyhow::Result<Direction> {
        Ok(Direction::East)
    }

    fn final_state(&mut self, _state: &GameState) -> anyhow::Result<()> {
        anyhow::bail!("could not save what it learned")
    }
}

#[tokio::test]
async fn final_hook_fault_is_recorded_with_isolation() {
    let presenter = Recorder::default();
    let mut controller = Controller::builder()
        .initial_state(state(CORRIDOR, 0))
        .agent(FailsAtTheEnd)
        .presenter(presenter.clone())
        .build()
        .expect("controller should build");

    let outcome = run(&mut controller).await.expect("faults are isolated");

    assert!(outcome.is_faulted());
    assert!(controller.state().is_win());
    let fault = controller.fault().expect("fault");
    assert_eq!(fault.phase, CallPhase::Final);
    assert!(matches!(&fault.kind, FaultKind::Error(message) if message.contains("could not save")));
    assert!(!controller.agent_timeout());
    assert_eq!(controller.move_history().len(), 2);
    assert_eq!(presenter.finished.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn final_hook_fault_propagates_after_finishing_presentation() {
    let presenter = Recorder::default();
    let mut controller = Controller::builder()
        .initial_state(state(CORRIDOR, 0))
        .agent(FailsAtTheEnd)
        .presenter(presenter.clone())
        .catch_exceptions(false)
        .build()
        .expect("controller should build");

    let err = run(&mut controller).await.unwrap_err();

    match err {
        RuntimeError::Agent(fault) => {
            assert_eq!(fault.agent, 0);
            assert_eq!(fault.phase, CallPhase::Final);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(controller.state().is_win());
    assert_eq!(presenter.finished.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn builder_checks_its_inputs() {
    let missing = Controller::builder().agent(Scripted::new(&[])).build();
    assert!(matches!(missing, Err(RuntimeError::MissingInitialState)));

    let mismatch = Controller::builder()
        .initial_state(state(WITH_GHOST, 1))
        .agent(Scripted::new(&[]))
        .build();
    assert!(matches!(
        mismatch,
        Err(RuntimeError::AgentCountMismatch {
            expected: 2,
            provided: 1
        })
    ));
}

#[tokio::test]
async fn a_controller_runs_only_once() {
    let mut controller = Controller::builder()
        .initial_state(state(CORRIDOR, 0))
        .agent(Scripted::new(&[Direction::East, Direction::East]))
        .build()
        .expect("controller should build");

    run(&mut controller).await.expect("first run");
    assert!(matches!(
        run(&mut controller).await,
        Err(RuntimeError::AlreadyRun)
    ));
}

#[tokio::test]
async fn new_game_drops_extra_ghosts() {
    let layout = Arc::new(Layout::from_text(WITH_GHOST).expect("layout"));
    let ghosts: Vec<Box<dyn Agent>> = vec![
        Box::new(Scripted::new(&[])),
        Box::new(Scripted::new(&[])),
        Box::new(Scripted::new(&[])),
    ];

    let controller = ClassicRules::default()
        .new_game(
            layout,
            Box::new(Scripted::new(&[])),
            ghosts,
            Box::new(pacman_runtime::NullPresenter),
            GameConfig::classic(),
            Default::default(),
        )
        .expect("game should build");

    assert_eq!(controller.state().num_agents(), 2);
}
