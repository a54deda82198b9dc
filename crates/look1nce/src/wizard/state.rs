//! Wizard states and the pure transition function.

use serde::Serialize;

/// The three user-facing wizard stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStage {
    ChooseGarment,
    UploadPerson,
    ViewResult,
}

impl WizardStage {
    /// 1-based position shown in step indicators.
    pub fn number(&self) -> u8 {
        match self {
            WizardStage::ChooseGarment => 1,
            WizardStage::UploadPerson => 2,
            WizardStage::ViewResult => 3,
        }
    }
}

impl std::fmt::Display for WizardStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WizardStage::ChooseGarment => write!(f, "Choose Outfit"),
            WizardStage::UploadPerson => write!(f, "Upload Photo"),
            WizardStage::ViewResult => write!(f, "See Result"),
        }
    }
}

/// Backend call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailedStage {
    Garment,
    Person,
    Synthesis,
}

impl std::fmt::Display for FailedStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailedStage::Garment => write!(f, "garment"),
            FailedStage::Person => write!(f, "person"),
            FailedStage::Synthesis => write!(f, "synthesis"),
        }
    }
}

/// Orchestrator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "failed", rename_all = "snake_case")]
pub enum WizardState {
    ChoosingGarment,
    AwaitingGarmentPreprocess,
    UploadingPerson,
    AwaitingPersonPreprocess,
    Synthesizing,
    ShowingResult,
    Failed(FailedStage),
}

impl WizardState {
    pub fn stage(&self) -> WizardStage {
        match self {
            WizardState::ChoosingGarment
            | WizardState::AwaitingGarmentPreprocess
            | WizardState::Failed(FailedStage::Garment) => WizardStage::ChooseGarment,
            WizardState::UploadingPerson
            | WizardState::AwaitingPersonPreprocess
            | WizardState::Failed(FailedStage::Person) => WizardStage::UploadPerson,
            WizardState::Synthesizing
            | WizardState::ShowingResult
            | WizardState::Failed(FailedStage::Synthesis) => WizardStage::ViewResult,
        }
    }

    /// True while a backend call for this state is outstanding.
    pub fn is_awaiting(&self) -> bool {
        matches!(
            self,
            WizardState::AwaitingGarmentPreprocess
                | WizardState::AwaitingPersonPreprocess
                | WizardState::Synthesizing
        )
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, WizardState::Failed(_))
    }

    /// Applies an input, returning the next state.
    pub fn next(self, input: WizardInput) -> Result<WizardState, InvalidTransition> {
        use WizardInput as I;
        use WizardState as S;

        let next = match (self, input) {
            (_, I::Reset) => S::ChoosingGarment,

            (S::ChoosingGarment, I::SubmitGarment) => S::AwaitingGarmentPreprocess,
            (S::AwaitingGarmentPreprocess, I::GarmentPreprocessed) => S::UploadingPerson,
            (S::AwaitingGarmentPreprocess, I::GarmentFailed) => S::Failed(FailedStage::Garment),

            (S::UploadingPerson, I::SubmitPerson) => S::AwaitingPersonPreprocess,
            (S::AwaitingPersonPreprocess, I::PersonPreprocessed) => S::Synthesizing,
            (S::AwaitingPersonPreprocess, I::PersonFailed) => S::Failed(FailedStage::Person),

            (S::Synthesizing, I::SynthesisSucceeded) => S::ShowingResult,
            (S::Synthesizing, I::SynthesisFailed) => S::Failed(FailedStage::Synthesis),

            (S::Failed(FailedStage::Garment), I::Retry) => S::ChoosingGarment,
            (S::Failed(FailedStage::Person), I::Retry) => S::UploadingPerson,
            (S::Failed(FailedStage::Synthesis), I::Retry) => S::Synthesizing,

            (from, input) => return Err(InvalidTransition { from, input }),
        };
        Ok(next)
    }
}

impl std::fmt::Display for WizardState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WizardState::ChoosingGarment => write!(f, "choosing garment"),
            WizardState::AwaitingGarmentPreprocess => write!(f, "awaiting garment preprocessing"),
            WizardState::UploadingPerson => write!(f, "uploading person"),
            WizardState::AwaitingPersonPreprocess => write!(f, "awaiting person preprocessing"),
            WizardState::Synthesizing => write!(f, "synthesizing"),
            WizardState::ShowingResult => write!(f, "showing result"),
            WizardState::Failed(stage) => write!(f, "failed ({})", stage),
        }
    }
}

/// Events driving the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardInput {
    SubmitGarment,
    GarmentPreprocessed,
    GarmentFailed,
    SubmitPerson,
    PersonPreprocessed,
    PersonFailed,
    SynthesisSucceeded,
    SynthesisFailed,
    Retry,
    Reset,
}

impl std::fmt::Display for WizardInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WizardInput::SubmitGarment => write!(f, "submit garment"),
            WizardInput::GarmentPreprocessed => write!(f, "garment preprocessed"),
            WizardInput::GarmentFailed => write!(f, "garment failed"),
            WizardInput::SubmitPerson => write!(f, "submit person"),
            WizardInput::PersonPreprocessed => write!(f, "person preprocessed"),
            WizardInput::PersonFailed => write!(f, "person failed"),
            WizardInput::SynthesisSucceeded => write!(f, "synthesis succeeded"),
            WizardInput::SynthesisFailed => write!(f, "synthesis failed"),
            WizardInput::Retry => write!(f, "retry"),
            WizardInput::Reset => write!(f, "reset"),
        }
    }
}

/// An input that has no transition from the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot {input} while {from}")]
pub struct InvalidTransition {
    pub from: WizardState,
    pub input: WizardInput,
}
