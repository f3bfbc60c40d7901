//! Running many games in sequence.
//!
//! Each game gets fresh agents and a fresh presenter from the caller's
//! factories. Training games are played with a [`NullPresenter`] and quiet
//! rules and are left out of the summary. A game that fails to build or
//! run is reported and the batch moves on.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use tracing::{error, info, warn};

use pacman_core::Layout;

use crate::api::{Agent, ClassicRules, NullPresenter, Presenter, RuntimeError};
use crate::config::BatchOptions;
use crate::controller::{Controller, RunOutcome};
use crate::repository::Recording;

/// Result of one game in a batch.
#[derive(Debug)]
pub struct GameReport {
    pub index: usize,
    pub training: bool,
    pub outcome: Result<RunOutcome, RuntimeError>,
    pub moves: usize,
    /// Where the recording was written, if recording was enabled.
    pub recording: Option<PathBuf>,
}

impl GameReport {
    pub fn score(&self) -> Option<i64> {
        self.outcome.as_ref().ok().map(RunOutcome::score)
    }

    pub fn is_win(&self) -> bool {
        self.outcome.as_ref().is_ok_and(RunOutcome::is_win)
    }
}

/// Aggregate over the scored (non-training) games.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub reports: Vec<GameReport>,
}

impl BatchSummary {
    fn scored(&self) -> impl Iterator<Item = &GameReport> {
        self.reports.iter().filter(|report| !report.training)
    }

    pub fn num_scored(&self) -> usize {
        self.scored().count()
    }

    /// Scores of scored games that completed; failed games have none.
    pub fn scores(&self) -> Vec<i64> {
        self.scored().filter_map(GameReport::score).collect()
    }

    pub fn average_score(&self) -> f64 {
        let scores = self.scores();
        if scores.is_empty() {
            return 0.0;
        }
        scores.iter().sum::<i64>() as f64 / scores.len() as f64
    }

    pub fn wins(&self) -> usize {
        self.scored().filter(|report| report.is_win()).count()
    }

    pub fn win_rate(&self) -> f64 {
        match self.num_scored() {
            0 => 0.0,
            n => self.wins() as f64 / n as f64,
        }
    }

    /// `Win`/`Loss` per scored game, comma separated.
    pub fn record(&self) -> String {
        self.scored()
            .map(|report| if report.is_win() { "Win" } else { "Loss" })
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn failures(&self) -> usize {
        self.reports
            .iter()
            .filter(|report| report.outcome.is_err())
            .count()
    }
}

/// Plays `options.num_games` games on `layout`.
///
/// `agents(i)` must return pacman first, followed by pursuers; pursuers
/// beyond the layout's ghost count are dropped. `presenter(i)` is only
/// consulted for scored games.
pub async fn run_games<A, P>(
    layout: Arc<Layout>,
    mut agents: A,
    mut presenter: P,
    options: &BatchOptions,
) -> BatchSummary
where
    A: FnMut(usize) -> Vec<Box<dyn Agent>>,
    P: FnMut(usize) -> Box<dyn Presenter>,
{
    let mut summary = BatchSummary::default();

    for index in 0..options.num_games {
        let training = index < options.num_training;
        let rules = ClassicRules::new(options.timeout).quiet(training);
        let presenter: Box<dyn Presenter> = if training {
            Box::new(NullPresenter)
        } else {
            presenter(index)
        };

        let mut lineup = agents(index).into_iter();
        let report = match lineup.next() {
            Some(pacman) => {
                let built = rules.new_game(
                    Arc::clone(&layout),
                    pacman,
                    lineup.collect(),
                    presenter,
                    options.game_config,
                    options.controller.clone(),
                );
                match built {
                    Ok(controller) => play(index, training, controller, options).await,
                    Err(err) => failed(index, training, err),
                }
            }
            None => failed(
                index,
                training,
                RuntimeError::AgentCountMismatch {
                    expected: layout.num_ghosts() + 1,
                    provided: 0,
                },
            ),
        };
        summary.reports.push(report);
    }

    if summary.num_scored() > 0 {
        info!(
            target: "runtime::batch",
            average = summary.average_score(),
            scores = ?summary.scores(),
            wins = summary.wins(),
            games = summary.num_scored(),
            win_rate = summary.win_rate(),
            record = %summary.record(),
            "batch finished"
        );
    }
    summary
}

async fn play(
    index: usize,
    training: bool,
    mut controller: Controller,
    options: &BatchOptions,
) -> GameReport {
    let outcome = controller.run().await;
    if let Err(err) = &outcome {
        error!(target: "runtime::batch", game = index, error = %err, "game aborted");
    }

    let recording = match (&options.record_dir, training) {
        (Some(dir), false) => {
            let path = dir.join(format!(
                "recorded-game-{}-{}",
                index + 1,
                Local::now().format("%m-%d-%H-%M-%S")
            ));
            match Recording::from_controller(&controller).save(&path) {
                Ok(()) => Some(path),
                Err(err) => {
                    warn!(
                        target: "runtime::batch",
                        game = index,
                        error = %err,
                        "failed to save recording"
                    );
                    None
                }
            }
        }
        _ => None,
    };

    GameReport {
        index,
        training,
        outcome,
        moves: controller.move_history().len(),
        recording,
    }
}

fn failed(index: usize, training: bool, err: RuntimeError) -> GameReport {
    error!(target: "runtime::batch", game = index, error = %err, "game could not start");
    GameReport {
        index,
        training,
        outcome: Err(err),
        moves: 0,
        recording: None,
    }
}
