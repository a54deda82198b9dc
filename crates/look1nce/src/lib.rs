pub mod broadcast;
pub mod config;
pub mod error;
pub mod gateway;
pub mod media;
pub mod model;
pub mod narrator;
pub mod telemetry;
pub mod wizard;

pub use broadcast::{WizardBroadcaster, WizardEvent};
pub use config::{load_config, ClientConfig};
pub use error::{ConfigError, ErrorKind, Result, TryOnError};
pub use gateway::{ApiBase, GatewayError, HttpGateway, TryOnBackend};
pub use media::{CameraDevice, FileInput, ImagePayload, MediaError, MediaSource, PreviewRegistry};
pub use model::{GarmentCategory, ProcessedPath, ResultPath};
pub use narrator::{ProgressNarrator, StatusReporter, NARRATION};
pub use telemetry::init_logging;
pub use wizard::{
    FailedStage, WizardController, WizardError, WizardOptions, WizardSnapshot, WizardStage,
    WizardState,
};
