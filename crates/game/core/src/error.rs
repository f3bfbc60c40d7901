//! Common error infrastructure for pacman-core.
//!
//! Domain-specific errors (`GridError`, `MoveError`, `ExecuteError`) live next
//! to the code that raises them; this module only provides the shared
//! classification used by the runtime to decide how loudly to report them.

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Validation**: an agent supplied invalid input (e.g. an illegal action)
/// - **Internal**: the engine was driven outside its contract
/// - **Fatal**: a snapshot is inconsistent and cannot be played further
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Invalid input, should not retry without changes.
    Validation,

    /// Unexpected use of the engine, e.g. stepping a terminal state.
    /// These indicate bugs in the caller and should be investigated.
    Internal,

    /// Snapshot invariant violated.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all pacman-core errors.
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
