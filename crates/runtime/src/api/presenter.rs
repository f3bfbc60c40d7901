//! Presentation collaborator notified as the game progresses.
use tracing::info;

use pacman_core::GameState;

/// Receives every snapshot the controller produces. Return values are never
/// consumed, so presenters cannot influence play.
pub trait Presenter: Send {
    fn initialize(&mut self, state: &GameState);

    fn update(&mut self, state: &GameState);

    fn finish(&mut self);
}

/// Presenter that ignores everything (batch and training runs).
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn initialize(&mut self, _state: &GameState) {}

    fn update(&mut self, _state: &GameState) {}

    fn finish(&mut self) {}
}

/// Logs the rendered board through `tracing`.
#[derive(Clone, Debug)]
pub struct TextPresenter {
    /// Render only every n-th update; the last frame is always rendered.
    frame_interval: usize,
    updates: usize,
    last_frame: Option<String>,
}

impl TextPresenter {
    pub fn new(frame_interval: usize) -> Self {
        Self {
            frame_interval: frame_interval.max(1),
            updates: 0,
            last_frame: None,
        }
    }
}

impl Default for TextPresenter {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Presenter for TextPresenter {
    fn initialize(&mut self, state: &GameState) {
        self.updates = 0;
        info!(target: "runtime::display", "\n{state}");
    }

    fn update(&mut self, state: &GameState) {
        self.updates += 1;
        let frame = state.to_string();
        if self.updates % self.frame_interval == 0 {
            info!(target: "runtime::display", "\n{frame}");
            self.last_frame = None;
        } else {
            self.last_frame = Some(frame);
        }
    }

    fn finish(&mut self) {
        if let Some(frame) = self.last_frame.take() {
            info!(target: "runtime::display", "\n{frame}");
        }
    }
}
