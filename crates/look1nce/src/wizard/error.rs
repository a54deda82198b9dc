//! Wizard error types.

use thiserror::Error;

use super::state::{InvalidTransition, WizardStage, WizardState};
use crate::error::ErrorKind;
use crate::gateway::GatewayError;
use crate::media::MediaError;

#[derive(Error, Debug)]
pub enum WizardError {
    /// Submit without an image. Rejected locally.
    #[error("Please upload or capture an image for the {stage} step")]
    MissingInput { stage: WizardStage },

    /// Acquiring media failed; the wizard state is unchanged.
    #[error(transparent)]
    Media(#[from] MediaError),

    /// The backend call failed; the wizard is now in a failed state.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// A backend call is already in flight.
    #[error("A request is already in progress ({state})")]
    CallOutstanding { state: WizardState },

    #[error("Cannot {action} while {state}")]
    InvalidAction {
        action: &'static str,
        state: WizardState,
    },

    /// The workflow was reset while the call was in flight; its result was discarded.
    #[error("Request superseded by a reset")]
    Superseded,

    /// Internal invariant breach.
    #[error("Precondition violated: {0}")]
    PreconditionViolation(String),
}

impl From<InvalidTransition> for WizardError {
    fn from(err: InvalidTransition) -> Self {
        WizardError::PreconditionViolation(err.to_string())
    }
}

impl WizardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WizardError::MissingInput { .. } => ErrorKind::MissingInput,
            WizardError::Media(e) => e.kind(),
            WizardError::Gateway(e) => e.kind(),
            WizardError::CallOutstanding { .. } => ErrorKind::CallOutstanding,
            WizardError::InvalidAction { .. } => ErrorKind::InvalidAction,
            WizardError::Superseded => ErrorKind::Superseded,
            WizardError::PreconditionViolation(_) => ErrorKind::PreconditionViolation,
        }
    }
}

/// Result type for wizard operations.
pub type Result<T> = std::result::Result<T, WizardError>;
