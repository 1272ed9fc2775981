//! Errors raised while building or driving a session.

use thiserror::Error;
use tokio::task::JoinError;

/// A required collaborator was not supplied to the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionBuildError {
    /// No map surface was supplied.
    #[error("a map surface is required")]
    MissingSurface,
    /// No text region for the instruction panel was supplied.
    #[error("an instruction panel region is required")]
    MissingInstructionPanel,
    /// No map matcher was supplied.
    #[error("a map matcher is required")]
    MissingMatcher,
    /// No alert sink was supplied.
    #[error("an alert sink is required")]
    MissingAlertSink,
}

/// Failure talking to a running session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session task has stopped and no longer accepts commands.
    #[error("session is closed")]
    Closed,
    /// The session task panicked or was cancelled.
    #[error("session task failed: {0}")]
    Task(#[from] JoinError),
}
