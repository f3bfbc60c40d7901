//! Static board description consumed by the engine.
//!
//! A [`Layout`] is produced by whatever loads boards (files, generators,
//! tests) and is treated as read-only by everything downstream.
mod layout;

#[cfg(any(test, feature = "fixtures"))]
mod fixtures;

pub use layout::{AgentStart, Layout, LayoutError};
