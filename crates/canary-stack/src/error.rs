//! Error types for the facade.

use canary_stack_core::{ConfigError, IntegrityError, StackError};
use canary_stack_report::ReportError;
use thiserror::Error;

/// Recoverable errors from [`CanaryStack`](crate::CanaryStack) operations.
///
/// Integrity violations on a live stack do not show up here: they go to the
/// stack's [`FatalHandler`](crate::FatalHandler), which never returns.
#[derive(Debug, Error)]
pub enum Error {
    /// Pop on an empty stack. The stack is unchanged.
    #[error("pop from an empty stack")]
    Underflow,

    /// The allocator refused to grow the buffer. The stack is unchanged.
    #[error("allocation of {requested} slots failed")]
    AllocationFailed { requested: usize },

    /// The next capacity does not fit in `usize`.
    #[error("capacity {capacity} cannot grow by factor {factor}")]
    CapacityOverflow { capacity: usize, factor: usize },

    /// Rejected configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// A sink failed during an explicit report.
    #[error("report error: {0}")]
    Report(#[from] ReportError),

    /// A freshly built stack failed validation.
    #[error("stack corrupted during construction: {0}")]
    Corrupted(IntegrityError),
}

impl From<StackError> for Error {
    /// Conversion for errors raised before a stack exists. Live stacks route
    /// `Corrupted` through the fatal path instead.
    fn from(e: StackError) -> Self {
        match e {
            StackError::Corrupted(e) => Error::Corrupted(e),
            StackError::Underflow => Error::Underflow,
            StackError::AllocationFailed { requested } => Error::AllocationFailed { requested },
            StackError::CapacityOverflow { capacity, factor } => {
                Error::CapacityOverflow { capacity, factor }
            }
            StackError::InvalidConfig(e) => Error::InvalidConfig(e),
        }
    }
}

/// Result type for facade operations.
pub type Result<T> = std::result::Result<T, Error>;
