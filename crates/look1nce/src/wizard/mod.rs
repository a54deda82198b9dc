//! The three-stage try-on wizard.
//!
//! [`WizardState`] is a pure transition table; [`WizardController`] owns the
//! session data, talks to the backend and publishes snapshots.

pub mod controller;
pub mod error;
pub mod selection;
pub mod snapshot;
pub mod state;

pub use controller::{WizardController, WizardOptions};
pub use error::{Result, WizardError};
pub use selection::{GarmentSelection, PersonSelection, TryOnResult};
pub use snapshot::{FailureView, ResultView, SelectionView, WizardSnapshot};
pub use state::{FailedStage, InvalidTransition, WizardInput, WizardStage, WizardState};
