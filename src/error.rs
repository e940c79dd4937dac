//! Failure taxonomy for a password check.
//!
//! A redirect for insecure transport is not an error; the gate returns it
//! as a verdict and the request never reaches this type.

use thiserror::Error;

use crate::dispatch::DispatchOutcome;

#[derive(Debug, Error)]
pub enum CheckError {
    /// Empty or missing password. Never reaches the dispatcher.
    #[error("password is required")]
    PasswordRequired,

    /// Every candidate reported that its interpreter does not exist.
    #[error("no interpreter could be started: {}", .0.command)]
    DiscoveryExhausted(DispatchOutcome),

    /// The interpreter ran and the engine itself failed.
    #[error("engine exited with status {}: {}", .0.final_attempt.exit_code, .0.command)]
    EngineFailed(DispatchOutcome),

    /// Anything else, e.g. the output pipe could not be created.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CheckError {
    /// The dispatch outcome behind this error, if one exists.
    pub fn outcome(&self) -> Option<&DispatchOutcome> {
        match self {
            CheckError::DiscoveryExhausted(outcome) | CheckError::EngineFailed(outcome) => {
                Some(outcome)
            }
            CheckError::PasswordRequired | CheckError::Internal(_) => None,
        }
    }
}
