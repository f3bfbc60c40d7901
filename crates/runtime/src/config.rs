//! Controller and batch configuration loaders.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use pacman_core::GameConfig;

/// Knobs of a single game run.
#[derive(Clone, Debug)]
pub struct ControllerConfig {
    /// End the run gracefully on agent faults instead of returning an error.
    pub catch_exceptions: bool,
    /// Capture agent `tracing` output into per-agent buffers.
    pub mute_agents: bool,
    /// Agent index that takes the first turn.
    pub starting_index: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            catch_exceptions: true,
            mute_agents: false,
            starting_index: 0,
        }
    }
}

impl ControllerConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `PACMAN_CATCH_EXCEPTIONS` - Isolate agent faults (default: true)
    /// - `PACMAN_MUTE_AGENTS` - Capture agent diagnostics (default: false)
    /// - `PACMAN_STARTING_INDEX` - First agent to move (default: 0)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(catch) = read_env::<bool>("PACMAN_CATCH_EXCEPTIONS") {
            config.catch_exceptions = catch;
        }
        if let Some(mute) = read_env::<bool>("PACMAN_MUTE_AGENTS") {
            config.mute_agents = mute;
        } else if env::var("PACMAN_MUTE_AGENTS").is_ok() {
            // Accept a bare variable as "true"
            config.mute_agents = true;
        }
        if let Some(index) = read_env::<usize>("PACMAN_STARTING_INDEX") {
            config.starting_index = index;
        }

        config
    }
}

/// Options for [`crate::batch::run_games`].
#[derive(Clone, Debug)]
pub struct BatchOptions {
    pub num_games: usize,
    /// Leading games played silently and left out of the summary.
    pub num_training: usize,
    /// Per-call time budget handed to [`crate::ClassicRules`].
    pub timeout: Duration,
    pub game_config: GameConfig,
    pub controller: ControllerConfig,
    /// Directory to write one recording per scored game into.
    pub record_dir: Option<PathBuf>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            num_games: 1,
            num_training: 0,
            timeout: crate::ClassicRules::DEFAULT_TIMEOUT,
            game_config: GameConfig::classic(),
            controller: ControllerConfig::default(),
            record_dir: None,
        }
    }
}

impl BatchOptions {
    /// Construct options from process environment variables.
    ///
    /// Environment variables:
    /// - `PACMAN_NUM_GAMES` - Games to play (default: 1)
    /// - `PACMAN_NUM_TRAINING` - Silent training games (default: 0)
    /// - `PACMAN_TIMEOUT_SECS` - Per-call time budget in seconds (default: 30)
    /// - `PACMAN_RECORD_DIR` - Write recordings into this directory (default: off)
    /// - plus everything [`ControllerConfig::from_env`] reads
    pub fn from_env() -> Self {
        let mut options = Self {
            controller: ControllerConfig::from_env(),
            ..Self::default()
        };

        if let Some(games) = read_env::<usize>("PACMAN_NUM_GAMES") {
            options.num_games = games.max(1);
        }
        if let Some(training) = read_env::<usize>("PACMAN_NUM_TRAINING") {
            options.num_training = training;
        }
        if let Some(secs) = read_env::<f64>("PACMAN_TIMEOUT_SECS") {
            if let Ok(timeout) = Duration::try_from_secs_f64(secs) {
                options.timeout = timeout;
            }
        }
        options.record_dir = env::var("PACMAN_RECORD_DIR").ok().map(PathBuf::from);

        options
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
