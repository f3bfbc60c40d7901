/// Scoring constants and tunable rule parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameConfig {
    /// Number of pursuer turns a capsule keeps every pursuer scared.
    pub scared_time: u32,
    /// Manhattan distance at or below which the mover and a pursuer collide.
    pub collision_tolerance: f64,
    /// Points deducted after every move of the primary mover.
    pub time_penalty: i64,
}

impl GameConfig {
    // ===== fixed scoring rules =====
    pub const FOOD_REWARD: i64 = 10;
    pub const WIN_BONUS: i64 = 500;
    pub const GHOST_EATEN_BONUS: i64 = 200;
    pub const DEATH_PENALTY: i64 = 500;

    // ===== movement =====
    pub const PACMAN_SPEED: f64 = 1.0;
    pub const GHOST_SPEED: f64 = 1.0;
    /// Distance from the nearest cell below which a position counts as grid-aligned.
    pub const GRID_TOLERANCE: f64 = 0.001;
    /// Manhattan radius within which the mover consumes food or a capsule.
    pub const CONSUME_RADIUS: f64 = 0.5;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_SCARED_TIME: u32 = 40;
    pub const DEFAULT_COLLISION_TOLERANCE: f64 = 0.7;
    pub const CLASSIC_TIME_PENALTY: i64 = 1;

    pub fn new() -> Self {
        Self {
            scared_time: Self::DEFAULT_SCARED_TIME,
            collision_tolerance: Self::DEFAULT_COLLISION_TOLERANCE,
            time_penalty: 0,
        }
    }

    /// Classic arcade scoring: every mover step costs a point.
    pub fn classic() -> Self {
        Self {
            time_penalty: Self::CLASSIC_TIME_PENALTY,
            ..Self::new()
        }
    }

    pub fn with_time_penalty(mut self, time_penalty: i64) -> Self {
        self.time_penalty = time_penalty;
        self
    }

    pub fn with_scared_time(mut self, scared_time: u32) -> Self {
        self.scared_time = scared_time;
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
