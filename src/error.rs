//! Error types surfaced by the solver.

use std::io;
use thiserror::Error;

/// Errors that abort a solver run or an instance load.
#[derive(Error, Debug)]
pub enum VrptwError {
    #[error("invalid configuration: {0}")]
    Configuration(String),
    #[error("failed to allocate {what}")]
    Allocation { what: &'static str },
    #[error("failed to initialize synchronization primitives")]
    SynchronizationInit,
    #[error("failed to spawn colony worker")]
    WorkerCreation(#[source] io::Error),
    #[error("colony worker panicked")]
    WorkerPanicked,
    #[error("customer(s) {0:?} cannot be served by an empty vehicle")]
    UnservableCustomers(Vec<usize>),
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("invalid solution encoding: {0}")]
    InvalidSolution(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl VrptwError {
    /// Process exit code for this error kind.
    pub fn code(&self) -> i32 {
        match self {
            VrptwError::Configuration(_) => 2,
            VrptwError::Allocation { .. } => 3,
            VrptwError::SynchronizationInit => 4,
            VrptwError::WorkerCreation(_) => 5,
            VrptwError::WorkerPanicked => 6,
            VrptwError::UnservableCustomers(_) => 7,
            VrptwError::Parse { .. } => 8,
            VrptwError::InvalidSolution(_) => 9,
            VrptwError::Io(_) => 10,
        }
    }
}

/// Raised by the search operators when the shared stop flag is observed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("search interrupted")]
pub struct Interrupted;
