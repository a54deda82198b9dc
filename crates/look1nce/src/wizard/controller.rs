//! The try-on wizard orchestrator.
//!
//! All mutable wizard data lives in one [`Session`] behind a mutex that is
//! never held across an await. Every backend call records the session's run
//! number before it suspends; if the wizard was reset in the meantime the
//! response is dropped instead of being applied to the new run.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use log::{debug, error, info, warn};
use reqwest::Url;
use tokio::sync::broadcast;
use tracing::Instrument;

use super::error::{Result, WizardError};
use super::selection::{GarmentSelection, PersonSelection, TryOnResult};
use super::snapshot::{FailureView, ResultView, SelectionView, WizardSnapshot};
use super::state::{FailedStage, WizardInput, WizardStage, WizardState};
use crate::broadcast::{WizardBroadcaster, WizardEvent};
use crate::config::ClientConfig;
use crate::gateway::{GatewayError, TryOnBackend};
use crate::media::{MediaSource, PreviewRegistry};
use crate::model::{GarmentCategory, ProcessedPath, ResultPath};
use crate::narrator::{ProgressNarrator, DEFAULT_NARRATION_INTERVAL};

/// Wizard tuning knobs.
#[derive(Debug, Clone)]
pub struct WizardOptions {
    pub narration_interval: Duration,
    pub event_capacity: usize,
}

impl Default for WizardOptions {
    fn default() -> Self {
        Self {
            narration_interval: DEFAULT_NARRATION_INTERVAL,
            event_capacity: 64,
        }
    }
}

impl WizardOptions {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            narration_interval: config.narration_interval(),
            event_capacity: config.event_capacity,
        }
    }
}

/// Data of one workflow run.
struct Session {
    state: WizardState,
    run: u64,
    garment: GarmentSelection,
    person: PersonSelection,
    result: TryOnResult,
    failure: Option<FailureView>,
}

impl Session {
    fn new(run: u64) -> Self {
        Self {
            state: WizardState::ChoosingGarment,
            run,
            garment: GarmentSelection::default(),
            person: PersonSelection::default(),
            result: TryOnResult::default(),
            failure: None,
        }
    }

    fn apply(&mut self, input: WizardInput) -> Result<()> {
        let next = self.state.next(input)?;
        debug!("Wizard: {} --{}--> {}", self.state, input, next);
        self.state = next;
        Ok(())
    }

    fn ensure(&self, expected: WizardState, action: &'static str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else if self.state.is_awaiting() {
            Err(WizardError::CallOutstanding { state: self.state })
        } else {
            Err(WizardError::InvalidAction {
                action,
                state: self.state,
            })
        }
    }

    /// Both processed paths; present whenever synthesis is reachable.
    fn synthesis_inputs(&self) -> Result<SynthesisInputs> {
        let garment = self.garment.processed_path().cloned().ok_or_else(|| {
            WizardError::PreconditionViolation("synthesis without a processed garment".into())
        })?;
        let person = self.person.processed_path().cloned().ok_or_else(|| {
            WizardError::PreconditionViolation("synthesis without a processed person".into())
        })?;
        Ok(SynthesisInputs {
            garment,
            person,
            category: self.garment.category(),
        })
    }

    fn fail(&mut self, input: WizardInput, stage: FailedStage, err: &GatewayError) -> Result<()> {
        self.apply(input)?;
        self.failure = Some(FailureView::new(stage, err));
        Ok(())
    }
}

struct SynthesisInputs {
    garment: ProcessedPath,
    person: ProcessedPath,
    category: GarmentCategory,
}

/// Drives the three-stage try-on workflow against a backend.
///
/// Cloning yields another handle to the same wizard.
pub struct WizardController<B: TryOnBackend + ?Sized> {
    backend: Arc<B>,
    session: Arc<Mutex<Session>>,
    narrator: ProgressNarrator,
    previews: PreviewRegistry,
    events: WizardBroadcaster,
}

impl<B: TryOnBackend + ?Sized> Clone for WizardController<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            session: Arc::clone(&self.session),
            narrator: self.narrator.clone(),
            previews: self.previews.clone(),
            events: self.events.clone(),
        }
    }
}

impl<B: TryOnBackend + ?Sized> WizardController<B> {
    pub fn new(backend: Arc<B>, options: WizardOptions) -> Self {
        let events = WizardBroadcaster::new(options.event_capacity);
        let narrator = ProgressNarrator::new(options.narration_interval, Arc::new(events.clone()));
        Self {
            backend,
            session: Arc::new(Mutex::new(Session::new(0))),
            narrator,
            previews: PreviewRegistry::new(),
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Registry resolving the preview URLs found in snapshots.
    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WizardEvent> {
        self.events.subscribe()
    }

    pub fn state(&self) -> WizardState {
        self.lock().state
    }

    pub fn snapshot(&self) -> WizardSnapshot {
        let session = self.lock();
        self.snapshot_of(&session)
    }

    pub fn garment_processed_path(&self) -> Option<ProcessedPath> {
        self.lock().garment.processed_path().cloned()
    }

    pub fn person_processed_path(&self) -> Option<ProcessedPath> {
        self.lock().person.processed_path().cloned()
    }

    pub fn result_path(&self) -> Option<ResultPath> {
        self.lock().result.result_path().cloned()
    }

    /// URL of the composited image once synthesis succeeded.
    pub fn result_asset_url(&self) -> Option<Url> {
        let session = self.lock();
        session
            .result
            .result_path()
            .map(|p| self.backend.result_asset_url(p))
    }

    /// Current narration line while synthesis is outstanding.
    pub fn stage_label(&self) -> Option<String> {
        let session = self.lock();
        self.stage_label_of(&session)
    }

    fn stage_label_of(&self, session: &Session) -> Option<String> {
        if session.state == WizardState::Synthesizing {
            self.narrator.current_label().map(str::to_string)
        } else {
            None
        }
    }

    fn snapshot_of(&self, session: &Session) -> WizardSnapshot {
        let result_path = session.result.result_path();
        WizardSnapshot {
            state: session.state,
            stage: session.state.stage(),
            run: session.run,
            category: session.garment.category(),
            garment: SelectionView::new(
                session.garment.payload().is_some(),
                session.garment.preview(),
                session.garment.processed_path(),
            ),
            person: SelectionView::new(
                session.person.payload().is_some(),
                session.person.preview(),
                session.person.processed_path(),
            ),
            result: ResultView {
                result_path: result_path.map(|p| p.as_str().to_string()),
                result_url: result_path.map(|p| self.backend.result_asset_url(p).to_string()),
                stage_label: self.stage_label_of(session),
            },
            error: session.failure.clone(),
            timestamp: Utc::now(),
        }
    }

    fn publish(&self, session: &Session) -> WizardSnapshot {
        let snapshot = self.snapshot_of(session);
        self.events.send(WizardEvent::StateChanged(snapshot.clone()));
        snapshot
    }

    /// Selects the garment image, replacing any previous one.
    ///
    /// Media errors leave the wizard untouched.
    pub fn choose_garment(&self, source: MediaSource<'_>) -> Result<WizardSnapshot> {
        let mut session = self.lock();
        session.ensure(WizardState::ChoosingGarment, "choose a garment image")?;
        let media = source.acquire(&self.previews)?;
        session.garment.set_media(media);
        Ok(self.publish(&session))
    }

    /// Drops the selected garment image.
    pub fn clear_garment(&self) -> Result<WizardSnapshot> {
        let mut session = self.lock();
        session.ensure(WizardState::ChoosingGarment, "change the garment image")?;
        session.garment.clear_media();
        Ok(self.publish(&session))
    }

    pub fn set_category(&self, category: GarmentCategory) -> Result<WizardSnapshot> {
        let mut session = self.lock();
        session.ensure(WizardState::ChoosingGarment, "change the garment category")?;
        session.garment.set_category(category);
        Ok(self.publish(&session))
    }

    /// Selects the person photo from a file or the camera.
    pub fn choose_person(&self, source: MediaSource<'_>) -> Result<WizardSnapshot> {
        let mut session = self.lock();
        session.ensure(WizardState::UploadingPerson, "choose a person photo")?;
        let media = source.acquire(&self.previews)?;
        session.person.set_media(media);
        Ok(self.publish(&session))
    }

    /// Drops the selected person photo.
    pub fn clear_person(&self) -> Result<WizardSnapshot> {
        let mut session = self.lock();
        session.ensure(WizardState::UploadingPerson, "change the person photo")?;
        session.person.clear_media();
        Ok(self.publish(&session))
    }

    /// Sends the garment for preprocessing and advances to the person step.
    pub async fn submit_garment(&self) -> Result<WizardSnapshot> {
        let span = tracing::info_span!("wizard.submit_garment");

        let (run, payload, category) = {
            let mut session = self.lock();
            session.ensure(WizardState::ChoosingGarment, "submit a garment")?;
            let payload = session.garment.submittable().ok_or_else(|| {
                warn!("Garment submitted without an image");
                WizardError::MissingInput {
                    stage: WizardStage::ChooseGarment,
                }
            })?;
            session.apply(WizardInput::SubmitGarment)?;
            session.failure = None;
            self.publish(&session);
            (session.run, payload, session.garment.category())
        };

        let outcome = self
            .backend
            .preprocess_garment(payload, category)
            .instrument(span)
            .await;

        let mut session = self.lock();
        if session.run != run {
            debug!("Discarding garment preprocessing response from run {}", run);
            return Err(WizardError::Superseded);
        }

        match outcome {
            Ok(path) => {
                info!("Garment preprocessed: {}", path);
                session.garment.mark_processed(path).map_err(|p| {
                    WizardError::PreconditionViolation(format!("garment already processed ({})", p))
                })?;
                session.apply(WizardInput::GarmentPreprocessed)?;
                Ok(self.publish(&session))
            }
            Err(e) => {
                warn!("Garment preprocessing failed: {}", e);
                session.fail(WizardInput::GarmentFailed, FailedStage::Garment, &e)?;
                self.publish(&session);
                Err(e.into())
            }
        }
    }

    /// Sends the person photo for preprocessing, then runs synthesis.
    ///
    /// Resolves once synthesis has finished or failed.
    pub async fn submit_person(&self) -> Result<WizardSnapshot> {
        let span = tracing::info_span!("wizard.submit_person");

        let (run, payload) = {
            let mut session = self.lock();
            session.ensure(WizardState::UploadingPerson, "submit a person photo")?;
            let payload = session.person.submittable().ok_or_else(|| {
                warn!("Person submitted without an image");
                WizardError::MissingInput {
                    stage: WizardStage::UploadPerson,
                }
            })?;
            session.apply(WizardInput::SubmitPerson)?;
            session.failure = None;
            self.publish(&session);
            (session.run, payload)
        };

        let outcome = self
            .backend
            .preprocess_person(payload)
            .instrument(span)
            .await;

        let inputs = {
            let mut session = self.lock();
            if session.run != run {
                debug!("Discarding person preprocessing response from run {}", run);
                return Err(WizardError::Superseded);
            }

            match outcome {
                Ok(path) => {
                    info!("Person preprocessed: {}", path);
                    session.person.mark_processed(path).map_err(|p| {
                        WizardError::PreconditionViolation(format!(
                            "person already processed ({})",
                            p
                        ))
                    })?;
                    let inputs = session.synthesis_inputs().inspect_err(|e| error!("{}", e))?;
                    session.apply(WizardInput::PersonPreprocessed)?;
                    session.result = TryOnResult::new();
                    self.publish(&session);
                    self.narrator.start();
                    inputs
                }
                Err(e) => {
                    warn!("Person preprocessing failed: {}", e);
                    session.fail(WizardInput::PersonFailed, FailedStage::Person, &e)?;
                    self.publish(&session);
                    return Err(e.into());
                }
            }
        };

        self.run_synthesis(run, inputs).await
    }

    /// Retries the failed step.
    ///
    /// A failed synthesis is re-run with the stored processed paths. A failed
    /// preprocessing step returns to its selection step for a new submission.
    pub async fn retry(&self) -> Result<WizardSnapshot> {
        let (run, inputs) = {
            let mut session = self.lock();
            match session.state {
                WizardState::Failed(FailedStage::Garment) | WizardState::Failed(FailedStage::Person) => {
                    session.apply(WizardInput::Retry)?;
                    session.failure = None;
                    return Ok(self.publish(&session));
                }
                WizardState::Failed(FailedStage::Synthesis) => {
                    let inputs = session.synthesis_inputs().inspect_err(|e| error!("{}", e))?;
                    session.apply(WizardInput::Retry)?;
                    session.failure = None;
                    info!("Retrying synthesis");
                    self.publish(&session);
                    self.narrator.start();
                    (session.run, inputs)
                }
                state if state.is_awaiting() => return Err(WizardError::CallOutstanding { state }),
                state => {
                    return Err(WizardError::InvalidAction {
                        action: "retry",
                        state,
                    })
                }
            }
        };

        self.run_synthesis(run, inputs).await
    }

    async fn run_synthesis(&self, run: u64, inputs: SynthesisInputs) -> Result<WizardSnapshot> {
        let span = tracing::info_span!("wizard.synthesize", category = %inputs.category);
        let outcome = self
            .backend
            .synthesize(&inputs.garment, &inputs.person, inputs.category)
            .instrument(span)
            .await;

        let mut session = self.lock();
        if session.run != run {
            // Reset already silenced the narrator; a newer run may own it now.
            debug!("Discarding synthesis response from run {}", run);
            return Err(WizardError::Superseded);
        }
        self.narrator.cancel();

        match outcome {
            Ok(path) => {
                info!("Try-on result ready: {}", path);
                session.result.set_result(path);
                session.apply(WizardInput::SynthesisSucceeded)?;
                Ok(self.publish(&session))
            }
            Err(e) => {
                warn!("Synthesis failed: {}", e);
                session.fail(WizardInput::SynthesisFailed, FailedStage::Synthesis, &e)?;
                self.publish(&session);
                Err(e.into())
            }
        }
    }

    /// Discards all selections and results and returns to the first step.
    ///
    /// Responses to calls still in flight are ignored when they arrive.
    pub fn reset(&self) -> WizardSnapshot {
        let mut session = self.lock();
        self.narrator.cancel();
        let run = session.run + 1;
        *session = Session::new(run);
        info!("Wizard reset (run {})", run);
        self.publish(&session)
    }
}
