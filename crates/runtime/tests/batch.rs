use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tempfile::TempDir;

use pacman_core::{Direction, GameConfig, GameState, Layout};
use pacman_runtime::{
    Agent, BatchOptions, CallContext, NullPresenter, Presenter, RandomAgent, Recording, run_games,
};

const BOARD: &str = "%%%%%%%\n%P...G%\n%%%%%%%";

struct Crash;

impl Agent for Crash {
    fn get_action(&mut self, _state: &GameState, _ctx: &CallContext) -> anyhow::Result<Direction> {
        anyhow::bail!("crashed on purpose")
    }
}

fn layout() -> Arc<Layout> {
    Arc::new(Layout::from_text(BOARD).expect("layout should parse"))
}

fn options(num_games: usize, num_training: usize) -> BatchOptions {
    BatchOptions {
        num_games,
        num_training,
        timeout: Duration::from_secs(5),
        game_config: GameConfig::classic(),
        ..BatchOptions::default()
    }
}

#[tokio::test]
async fn training_games_are_left_out_of_the_summary() {
    let presented = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&presented);

    let summary = run_games(
        layout(),
        |i| -> Vec<Box<dyn Agent>> {
            vec![
                Box::new(RandomAgent::new(i as u64)),
                Box::new(RandomAgent::new(100 + i as u64)),
            ]
        },
        move |_| -> Box<dyn Presenter> {
            counter.fetch_add(1, Ordering::SeqCst);
            Box::new(NullPresenter)
        },
        &options(4, 2),
    )
    .await;

    assert_eq!(summary.reports.len(), 4);
    assert_eq!(summary.num_scored(), 2);
    assert_eq!(presented.load(Ordering::SeqCst), 2);
    assert!(summary.reports[..2].iter().all(|report| report.training));
    assert_eq!(summary.scores().len(), 2);
    assert_eq!(summary.record().split(", ").count(), 2);
    assert!((0.0..=1.0).contains(&summary.win_rate()));
}

/// One crashing game must not keep the rest of the batch from running.
#[tokio::test]
async fn a_faulted_game_does_not_stop_the_batch() {
    let summary = run_games(
        layout(),
        |i| -> Vec<Box<dyn Agent>> {
            let pacman: Box<dyn Agent> = if i == 0 {
                Box::new(Crash)
            } else {
                Box::new(RandomAgent::new(i as u64))
            };
            vec![pacman, Box::new(RandomAgent::new(42))]
        },
        |_| -> Box<dyn Presenter> { Box::new(NullPresenter) },
        &options(3, 0),
    )
    .await;

    assert_eq!(summary.reports.len(), 3);
    let first = summary.reports[0].outcome.as_ref().expect("faults are isolated");
    assert!(first.is_faulted());
    assert!(summary.reports[1..]
        .iter()
        .all(|report| report.outcome.as_ref().is_ok_and(|outcome| !outcome.is_faulted())));
    assert_eq!(summary.record().split(", ").next(), Some("Loss"));
}

#[tokio::test]
async fn scored_games_are_recorded() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut options = options(2, 1);
    options.record_dir = Some(temp_dir.path().to_path_buf());

    let summary = run_games(
        layout(),
        |i| -> Vec<Box<dyn Agent>> {
            vec![
                Box::new(RandomAgent::new(i as u64)),
                Box::new(RandomAgent::new(7)),
            ]
        },
        |_| -> Box<dyn Presenter> { Box::new(NullPresenter) },
        &options,
    )
    .await;

    assert!(summary.reports[0].recording.is_none());
    let path = summary.reports[1].recording.as_ref().expect("recording path");
    let name = path.file_name().and_then(|n| n.to_str()).expect("file name");
    assert!(name.starts_with("recorded-game-2-"));

    let recording = Recording::load(path).expect("recording should load");
    assert_eq!(recording.actions.len(), summary.reports[1].moves);
}

#[tokio::test]
async fn an_empty_lineup_is_reported_as_a_failure() {
    let summary = run_games(
        layout(),
        |_| Vec::new(),
        |_| -> Box<dyn Presenter> { Box::new(NullPresenter) },
        &options(2, 0),
    )
    .await;

    assert_eq!(summary.failures(), 2);
    assert!(summary.scores().is_empty());
    assert_eq!(summary.average_score(), 0.0);
}
