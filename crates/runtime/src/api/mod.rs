//! Public runtime API surface.
//!
//! This module gathers the types exposed to consumers of the runtime crate:
//! the agent capability interface, the presentation and rule-policy
//! collaborators, and the error types.

pub mod agent;
pub mod errors;
pub mod presenter;
pub mod rules;

pub use agent::{Agent, CallContext, Capabilities, RandomAgent};
pub use errors::{AgentFault, CallPhase, FaultKind, Result, RuntimeError};
pub use presenter::{NullPresenter, Presenter, TextPresenter};
pub use rules::{ClassicRules, RulePolicy, RunStatus};
