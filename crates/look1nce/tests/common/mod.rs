//! Shared test utilities for look1nce integration tests.
//!
//! This module provides:
//! - `MockBackend`, a scripted `TryOnBackend` that counts and records calls
//! - `Gate` for holding a backend call open until the test releases it
//! - small helpers for building media sources
//! - `stub_server`, a canned-response HTTP server for gateway tests

#![allow(dead_code)]

pub mod stub_server;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use image::{Rgb, RgbImage};
use reqwest::Url;
use tokio::sync::{broadcast, oneshot};

use look1nce::gateway::{self, ApiBase, GatewayError, GatewayOperation, TryOnBackend};
use look1nce::media::{CameraDevice, DeviceError, FileInput, ImagePayload, MediaSource};
use look1nce::model::{GarmentCategory, ProcessedPath, ResultPath};
use look1nce::{WizardController, WizardEvent, WizardOptions};

pub const GARMENT_PATH: &str = "g/1.png";
pub const PERSON_PATH: &str = "p/1.png";
pub const RESULT_PATH: &str = "r/1.png";

/// Arguments of one synthesize call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisCall {
    pub garment: String,
    pub person: String,
    pub category: GarmentCategory,
}

/// Test side of a held backend call.
pub struct Gate {
    /// Fires once the backend call has started.
    pub entered: oneshot::Receiver<()>,
    /// Lets the call complete.
    pub release: oneshot::Sender<()>,
}

struct HeldCall {
    entered: oneshot::Sender<()>,
    release: oneshot::Receiver<()>,
}

impl HeldCall {
    async fn wait(self) {
        let _ = self.entered.send(());
        let _ = self.release.await;
    }
}

fn gate_pair() -> (Gate, HeldCall) {
    let (entered_tx, entered_rx) = oneshot::channel();
    let (release_tx, release_rx) = oneshot::channel();
    (
        Gate {
            entered: entered_rx,
            release: release_tx,
        },
        HeldCall {
            entered: entered_tx,
            release: release_rx,
        },
    )
}

/// Scripted backend. Unscripted calls succeed with the fixed paths above.
pub struct MockBackend {
    base: ApiBase,
    garment_calls: AtomicUsize,
    person_calls: AtomicUsize,
    synthesis_calls: AtomicUsize,
    garment_payloads: Mutex<Vec<(ImagePayload, GarmentCategory)>>,
    person_payloads: Mutex<Vec<ImagePayload>>,
    synthesis_args: Mutex<Vec<SynthesisCall>>,
    garment_script: Mutex<VecDeque<gateway::Result<ProcessedPath>>>,
    person_script: Mutex<VecDeque<gateway::Result<ProcessedPath>>>,
    synthesis_script: Mutex<VecDeque<gateway::Result<ResultPath>>>,
    garment_gate: Mutex<Option<HeldCall>>,
    person_gate: Mutex<Option<HeldCall>>,
    synthesis_gate: Mutex<Option<HeldCall>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            base: ApiBase::parse("http://localhost:8000").expect("valid base"),
            garment_calls: AtomicUsize::new(0),
            person_calls: AtomicUsize::new(0),
            synthesis_calls: AtomicUsize::new(0),
            garment_payloads: Mutex::new(Vec::new()),
            person_payloads: Mutex::new(Vec::new()),
            synthesis_args: Mutex::new(Vec::new()),
            garment_script: Mutex::new(VecDeque::new()),
            person_script: Mutex::new(VecDeque::new()),
            synthesis_script: Mutex::new(VecDeque::new()),
            garment_gate: Mutex::new(None),
            person_gate: Mutex::new(None),
            synthesis_gate: Mutex::new(None),
        }
    }

    pub fn garment_calls(&self) -> usize {
        self.garment_calls.load(Ordering::SeqCst)
    }

    pub fn person_calls(&self) -> usize {
        self.person_calls.load(Ordering::SeqCst)
    }

    pub fn synthesis_calls(&self) -> usize {
        self.synthesis_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.garment_calls() + self.person_calls() + self.synthesis_calls()
    }

    pub fn garment_payloads(&self) -> Vec<(ImagePayload, GarmentCategory)> {
        self.garment_payloads.lock().unwrap().clone()
    }

    pub fn person_payloads(&self) -> Vec<ImagePayload> {
        self.person_payloads.lock().unwrap().clone()
    }

    pub fn synthesis_args(&self) -> Vec<SynthesisCall> {
        self.synthesis_args.lock().unwrap().clone()
    }

    pub fn script_garment(&self, outcome: gateway::Result<ProcessedPath>) {
        self.garment_script.lock().unwrap().push_back(outcome);
    }

    pub fn script_person(&self, outcome: gateway::Result<ProcessedPath>) {
        self.person_script.lock().unwrap().push_back(outcome);
    }

    pub fn script_synthesis(&self, outcome: gateway::Result<ResultPath>) {
        self.synthesis_script.lock().unwrap().push_back(outcome);
    }

    /// Holds the next garment call open until the gate is released.
    pub fn hold_garment(&self) -> Gate {
        let (gate, held) = gate_pair();
        *self.garment_gate.lock().unwrap() = Some(held);
        gate
    }

    pub fn hold_person(&self) -> Gate {
        let (gate, held) = gate_pair();
        *self.person_gate.lock().unwrap() = Some(held);
        gate
    }

    pub fn hold_synthesis(&self) -> Gate {
        let (gate, held) = gate_pair();
        *self.synthesis_gate.lock().unwrap() = Some(held);
        gate
    }
}

#[async_trait]
impl TryOnBackend for MockBackend {
    async fn preprocess_garment(
        &self,
        payload: ImagePayload,
        category: GarmentCategory,
    ) -> gateway::Result<ProcessedPath> {
        self.garment_calls.fetch_add(1, Ordering::SeqCst);
        self.garment_payloads
            .lock()
            .unwrap()
            .push((payload, category));
        let held = self.garment_gate.lock().unwrap().take();
        if let Some(held) = held {
            held.wait().await;
        }
        let scripted = self.garment_script.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(ProcessedPath::new(GARMENT_PATH).unwrap()))
    }

    async fn preprocess_person(&self, payload: ImagePayload) -> gateway::Result<ProcessedPath> {
        self.person_calls.fetch_add(1, Ordering::SeqCst);
        self.person_payloads.lock().unwrap().push(payload);
        let held = self.person_gate.lock().unwrap().take();
        if let Some(held) = held {
            held.wait().await;
        }
        let scripted = self.person_script.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(ProcessedPath::new(PERSON_PATH).unwrap()))
    }

    async fn synthesize(
        &self,
        garment: &ProcessedPath,
        person: &ProcessedPath,
        category: GarmentCategory,
    ) -> gateway::Result<ResultPath> {
        self.synthesis_calls.fetch_add(1, Ordering::SeqCst);
        self.synthesis_args.lock().unwrap().push(SynthesisCall {
            garment: garment.as_str().to_string(),
            person: person.as_str().to_string(),
            category,
        });
        let held = self.synthesis_gate.lock().unwrap().take();
        if let Some(held) = held {
            held.wait().await;
        }
        let scripted = self.synthesis_script.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(ResultPath::new(RESULT_PATH).unwrap()))
    }

    fn result_asset_url(&self, result_path: &ResultPath) -> Url {
        self.base.result_asset_url(result_path.as_str())
    }
}

/// Service failure with the given status and JSON detail.
pub fn upstream_failure(operation: GatewayOperation, status: u16, detail: &str) -> GatewayError {
    if (400..500).contains(&status) {
        GatewayError::UpstreamRejected {
            operation,
            status,
            detail: detail.to_string(),
        }
    } else {
        GatewayError::UpstreamUnavailable {
            operation,
            status: Some(status),
            detail: detail.to_string(),
        }
    }
}

/// Wizard over a fresh mock backend with the default 2 s narration.
pub fn wizard() -> (WizardController<MockBackend>, Arc<MockBackend>) {
    let backend = Arc::new(MockBackend::new());
    let wizard = WizardController::new(Arc::clone(&backend), WizardOptions::default());
    (wizard, backend)
}

pub fn png(name: &str, bytes: &[u8]) -> MediaSource<'static> {
    MediaSource::File(FileInput::new(name, Some("image/png".to_string()), bytes.to_vec()))
}

/// Camera that always returns the same frame.
pub struct StillCamera {
    pub frame: RgbImage,
}

impl StillCamera {
    pub fn new() -> Self {
        Self {
            frame: RgbImage::from_pixel(8, 6, Rgb([200, 40, 90])),
        }
    }
}

impl CameraDevice for StillCamera {
    fn grab_frame(&mut self) -> Result<Option<RgbImage>, DeviceError> {
        Ok(Some(self.frame.clone()))
    }

    fn name(&self) -> String {
        "still".to_string()
    }
}

/// Drains everything currently queued on a subscription.
pub fn drain(rx: &mut broadcast::Receiver<WizardEvent>) -> Vec<WizardEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Status labels among the given events.
pub fn status_labels(events: &[WizardEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            WizardEvent::Status { label, .. } => Some(label.clone()),
            _ => None,
        })
        .collect()
}

/// Waits well past any pending narration tick.
pub async fn let_time_pass(secs: u64) {
    tokio::time::sleep(Duration::from_secs(secs)).await;
}
