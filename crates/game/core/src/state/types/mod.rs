pub mod agent;
pub mod common;
pub mod grid;

pub use agent::{AgentRole, AgentState, Configuration};
pub use common::{Cell, Position};
pub use grid::{Grid, GridError};
