use std::fmt;
use std::sync::Arc;

use crate::action::{self, Direction};
use crate::config::GameConfig;
use crate::engine::{ExecuteError, GameEngine};
use crate::env::Layout;

use super::{AgentState, Cell, ExploredStates, GameStateData, Grid, PACMAN_INDEX, Position};

/// Immutable view of one snapshot handed to agents and the runtime.
///
/// Cloning is cheap: substructures are shared until a successor changes them.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GameState {
    data: GameStateData,
}

impl GameState {
    /// Initial state of a game on `layout` with up to `num_ghost_agents` pursuers.
    pub fn new(layout: Arc<Layout>, num_ghost_agents: usize, config: GameConfig) -> Self {
        Self::from_data(GameStateData::initial(layout, num_ghost_agents, config))
    }

    pub fn from_data(data: GameStateData) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &GameStateData {
        &self.data
    }

    /// Mutable access for building scenarios; other clones are unaffected.
    pub fn data_mut(&mut self) -> &mut GameStateData {
        &mut self.data
    }

    pub fn into_data(self) -> GameStateData {
        self.data
    }

    // ===== rules =====

    /// Actions `agent` may take; empty once the game is won or lost.
    pub fn legal_actions(&self, agent: usize) -> Vec<Direction> {
        action::legal_actions(&self.data, agent)
    }

    pub fn legal_pacman_actions(&self) -> Vec<Direction> {
        self.legal_actions(PACMAN_INDEX)
    }

    /// Snapshot after `agent` takes `action`.
    ///
    /// Fails with [`ExecuteError::TerminalState`] on a won or lost state and
    /// with an illegal-action error when `action` is not in
    /// [`GameState::legal_actions`]. `self` is never modified.
    pub fn generate_successor(
        &self,
        agent: usize,
        action: Direction,
    ) -> Result<GameState, ExecuteError> {
        let mut data = self.data.successor();
        GameEngine::new(&mut data).execute(agent, action)?;
        Ok(Self { data })
    }

    /// Like [`GameState::generate_successor`], recording `self` in `explored`.
    pub fn generate_successor_tracked(
        &self,
        agent: usize,
        action: Direction,
        explored: &mut ExploredStates,
    ) -> Result<GameState, ExecuteError> {
        let successor = self.generate_successor(agent, action)?;
        explored.record(self.clone());
        Ok(successor)
    }

    pub fn generate_pacman_successor(&self, action: Direction) -> Result<GameState, ExecuteError> {
        self.generate_successor(PACMAN_INDEX, action)
    }

    // ===== accessors =====

    pub fn num_agents(&self) -> usize {
        self.data.num_agents()
    }

    pub fn agent_state(&self, agent: usize) -> Option<&AgentState> {
        self.data.agent(agent)
    }

    pub fn pacman_state(&self) -> Option<&AgentState> {
        self.data.agent(PACMAN_INDEX)
    }

    pub fn pacman_position(&self) -> Option<Position> {
        self.pacman_state().map(AgentState::position)
    }

    pub fn ghost_states(&self) -> impl Iterator<Item = &AgentState> {
        self.data.agents().skip(1)
    }

    /// Pursuer by agent index (`1..num_agents`).
    pub fn ghost_state(&self, agent: usize) -> Option<&AgentState> {
        if agent == PACMAN_INDEX {
            return None;
        }
        self.data.agent(agent)
    }

    pub fn ghost_position(&self, agent: usize) -> Option<Position> {
        self.ghost_state(agent).map(AgentState::position)
    }

    pub fn ghost_positions(&self) -> Vec<Position> {
        self.ghost_states().map(AgentState::position).collect()
    }

    pub fn score(&self) -> i64 {
        self.data.score()
    }

    pub fn capsules(&self) -> &[Cell] {
        self.data.capsules()
    }

    pub fn num_food(&self) -> usize {
        self.data.food().count(true)
    }

    pub fn food(&self) -> &Grid {
        self.data.food()
    }

    pub fn walls(&self) -> &Grid {
        self.data.layout().walls()
    }

    pub fn has_food(&self, cell: Cell) -> bool {
        self.data.food().get(cell)
    }

    pub fn has_wall(&self, cell: Cell) -> bool {
        self.data.layout().is_wall(cell)
    }

    pub fn is_win(&self) -> bool {
        self.data.is_win()
    }

    pub fn is_lose(&self) -> bool {
        self.data.is_lose()
    }

    pub fn is_terminal(&self) -> bool {
        self.data.is_terminal()
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.data, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(board: &str, ghosts: usize) -> GameState {
        let layout = Layout::from_text(board).unwrap();
        GameState::new(Arc::new(layout), ghosts, GameConfig::default())
    }

    #[test]
    fn eating_last_food_wins() {
        let state = game("%%%%%\n%P.G%\n%%%%%", 1);

        let next = state.generate_successor(0, Direction::East).unwrap();

        assert_eq!(next.score(), 510);
        assert!(next.is_win());
        assert_eq!(next.data().food_eaten(), Some(Cell::new(2, 1)));
        assert!(next.legal_actions(0).is_empty());
        assert!(next.legal_actions(1).is_empty());
    }

    #[test]
    fn classic_config_charges_time() {
        let layout = Layout::from_text("%%%%%%\n%P..G%\n%%%%%%").unwrap();
        let state = GameState::new(Arc::new(layout), 1, GameConfig::classic());

        let next = state.generate_successor(0, Direction::East).unwrap();
        assert_eq!(next.score(), 9);

        let next = next.generate_successor(1, Direction::West).unwrap();
        assert_eq!(next.score(), 9);
    }

    #[test]
    fn terminal_state_rejects_successors() {
        let state = game("%%%%%\n%P.G%\n%%%%%", 1);
        let won = state.generate_successor(0, Direction::East).unwrap();

        let error = won.generate_successor(1, Direction::West).unwrap_err();
        assert!(error.is_terminal_state());

        let mut lost = state.clone();
        lost.data_mut().lose = true;
        assert!(lost.generate_successor(0, Direction::Stop).unwrap_err().is_terminal_state());
    }

    #[test]
    fn illegal_action_leaves_state_untouched() {
        let state = game("%%%%%\n%P.G%\n%%%%%", 1);
        let before = state.clone();

        let error = state.generate_successor(0, Direction::North).unwrap_err();

        assert!(error.is_illegal_action());
        assert_eq!(state, before);
        assert_eq!(state.data().agent_moved(), None);
    }

    #[test]
    fn unknown_agent_is_rejected() {
        let state = game("%%%%%\n%P.G%\n%%%%%", 1);
        assert_eq!(
            state.generate_successor(5, Direction::Stop).unwrap_err(),
            ExecuteError::UnknownAgent {
                agent: 5,
                num_agents: 2
            }
        );
    }

    #[test]
    fn pacman_may_stop_but_ghosts_may_not() {
        let state = game("%%%%%%%%\n%P . G %\n%%%%%%%%", 1);

        assert_eq!(
            state.legal_actions(0),
            vec![Direction::East, Direction::Stop]
        );
        assert_eq!(
            state.legal_actions(1),
            vec![Direction::East, Direction::West]
        );
    }

    #[test]
    fn ghost_at_dead_end_may_reverse() {
        let mut state = game("%%%%%\n%P.%%\n%%%G%\n%%% %\n%%%%%", 1);
        state.data_mut().agent_mut(1).unwrap().configuration.direction = Direction::North;

        assert_eq!(state.legal_actions(1), vec![Direction::South]);
    }

    #[test]
    fn ghost_does_not_reverse_in_corridor() {
        let mut state = game("%%%%%%%\n%P.  G%\n%%%%%%%", 1);
        let ghost = state.data_mut().agent_mut(1).unwrap();
        ghost.configuration.position = Position::new(4.0, 1.0);
        ghost.configuration.direction = Direction::West;

        assert_eq!(state.legal_actions(1), vec![Direction::West]);
    }

    #[test]
    fn scared_ghost_moves_half_a_cell_and_stays_committed() {
        let mut state = game("%%%%%%%\n%P.  G%\n%%%%%%%", 1);
        state.data_mut().agent_mut(1).unwrap().scared_timer = 5;

        let next = state.generate_successor(1, Direction::West).unwrap();
        assert_eq!(next.ghost_position(1), Some(Position::new(4.5, 1.0)));
        assert_eq!(next.ghost_state(1).unwrap().scared_timer, 4);
        assert_eq!(next.legal_actions(1), vec![Direction::West]);
    }

    #[test]
    fn scared_ghost_collision_scores_bonus() {
        let mut state = game("%%%%%%\n%P .G%\n%%%%%%", 1);
        let ghost = state.data_mut().agent_mut(1).unwrap();
        ghost.configuration.position = Position::new(2.0, 1.0);
        ghost.configuration.direction = Direction::West;
        ghost.scared_timer = 5;

        let next = state.generate_successor(1, Direction::West).unwrap();
        let ghost = next.ghost_state(1).unwrap();

        assert_eq!(next.score(), 200);
        assert_eq!(ghost.configuration, ghost.start);
        assert_eq!(ghost.scared_timer, 0);
        assert!(next.data().eaten()[1]);
        assert!(!next.is_terminal());
    }

    #[test]
    fn brave_ghost_collision_loses() {
        let mut state = game("%%%%%\n%P G%\n%%%%%", 1);
        state.data_mut().set_score(100);
        let ghost = state.data_mut().agent_mut(1).unwrap();
        ghost.configuration.position = Position::new(2.5, 1.0);
        ghost.configuration.direction = Direction::West;

        let next = state.generate_successor(1, Direction::West).unwrap();

        assert_eq!(next.score(), -400);
        assert!(next.is_lose());
        assert!(!next.is_win());
    }

    #[test]
    fn successor_shares_untouched_substructures() {
        let state = game("%%%%%%\n%P. G%\n%%%%%%", 1);
        let next = state.generate_successor(1, Direction::West).unwrap();

        assert!(Arc::ptr_eq(&state.data().food, &next.data().food));
        assert!(Arc::ptr_eq(&state.data().agents[0], &next.data().agents[0]));
        assert!(!Arc::ptr_eq(&state.data().agents[1], &next.data().agents[1]));

        let eaten = state.generate_successor(0, Direction::East).unwrap();
        assert!(!Arc::ptr_eq(&state.data().food, &eaten.data().food));
        assert_eq!(state.num_food(), 1);
        assert_eq!(eaten.num_food(), 0);
    }

    #[test]
    fn transitions_are_deterministic() {
        let state = game("%%%%%%%\n%Po.. %\n% %%% %\n%  G  %\n%%%%%%%", 1);
        let mut current = state.clone();
        let mut twin = state;

        for turn in 0..12 {
            let agent = turn % current.num_agents();
            let legal = current.legal_actions(agent);
            let Some(&action) = legal.first() else { break };
            let food_before = current.num_food();

            current = current.generate_successor(agent, action).unwrap();
            twin = twin.generate_successor(agent, action).unwrap();

            assert_eq!(current, twin);
            assert_eq!(current.data().digest(), twin.data().digest());
            assert!(current.num_food() <= food_before);
            if current.is_terminal() {
                break;
            }
        }
    }

    #[test]
    fn tracked_successor_records_predecessor() {
        let state = game("%%%%%\n%P.G%\n%%%%%", 1);
        let mut explored = ExploredStates::new();

        state
            .generate_successor_tracked(1, Direction::West, &mut explored)
            .unwrap();

        assert!(explored.contains(&state));
        assert_eq!(explored.reset().len(), 1);
        assert!(explored.is_empty());
    }

    #[test]
    fn renders_board_with_constant_ghost_glyph() {
        let state = game("%%%%%%%\n%P.oG.%\n%%%%%%%", 1);
        let next = state.generate_successor(0, Direction::East).unwrap();
        let mut facing_north = next.clone();
        facing_north.data_mut().agent_mut(1).unwrap().configuration.direction = Direction::North;

        assert_eq!(next.to_string(), "%%%%%%%\n% <oG.%\n%%%%%%%\nScore: 10");
        assert_eq!(facing_north.to_string(), next.to_string());
    }
}
