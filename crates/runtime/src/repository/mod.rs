//! Persistence for finished games.
//!
//! A [`Recording`] captures everything needed to reproduce a game: the
//! layout, the game configuration and the ordered action history. Files
//! ending in `.json` are written as pretty JSON, anything else as bincode.

mod error;
mod recording;

pub use error::{RepositoryError, Result};
pub use recording::Recording;
