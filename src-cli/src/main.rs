use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context as _};
use clap::{Parser, Subcommand};
use log::{info, warn};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use look1nce::config::{load_config, ClientConfig};
use look1nce::media::{FileInput, MediaSource};
use look1nce::telemetry::{init_logging, DEFAULT_LOG_FILTER};
use look1nce::{
    FailedStage, GarmentCategory, HttpGateway, WizardController, WizardEvent, WizardOptions,
    WizardState,
};

#[derive(Parser, Debug)]
#[command(name = "look1nce", version, about = "Virtual try-on from the terminal")]
struct Cli {
    /// JSON client configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Try-on service base URL (overrides config and LOOK1NCE_API_URL).
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, global = true, default_value = DEFAULT_LOG_FILTER)]
    log_level: String,

    /// Write logs as JSON lines.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full try-on workflow once.
    Run(RunArgs),
    /// Check that the try-on service is up.
    Health,
    /// Delete uploaded and generated files on the service.
    Cleanup,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Garment image.
    #[arg(long)]
    garment: PathBuf,

    /// Garment category: upper_body, lower_body or dress.
    #[arg(long, default_value_t = GarmentCategory::UpperBody)]
    category: GarmentCategory,

    /// Photo of the person.
    #[arg(long)]
    person: Option<PathBuf>,

    /// Capture the person photo from this camera index instead.
    #[cfg(feature = "camera")]
    #[arg(long, conflicts_with = "person")]
    camera: Option<u32>,

    /// Extra synthesis attempts after a failure.
    #[arg(long, default_value_t = 0)]
    retries: u32,

    /// Save the result image here.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Print every wizard event as a JSON line on stdout.
    #[arg(long, default_value_t = false)]
    events_json: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.json_logs)?;

    let config = resolve_config(cli.config.as_ref(), cli.api_url.as_deref())?;
    let gateway = Arc::new(HttpGateway::from_config(&config)?);
    info!("Using try-on service at {}", gateway.base());

    match cli.cmd {
        Command::Run(args) => cmd_run(gateway, &config, args).await,
        Command::Health => cmd_health(&gateway).await,
        Command::Cleanup => cmd_cleanup(&gateway).await,
    }
}

fn resolve_config(path: Option<&PathBuf>, api_url: Option<&str>) -> anyhow::Result<ClientConfig> {
    let config = match path {
        Some(path) => load_config(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => ClientConfig::default(),
    };
    let mut config = config.with_env_overrides()?;
    if let Some(url) = api_url {
        config.api_base_url = url.to_string();
        config.validate()?;
    }
    Ok(config)
}

fn spawn_event_printer(
    wizard: &WizardController<HttpGateway>,
    as_json: bool,
) -> JoinHandle<()> {
    let mut rx = wizard.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) if as_json => match serde_json::to_string(&event) {
                    Ok(line) => println!("{}", line),
                    Err(e) => warn!("Failed to serialize event: {}", e),
                },
                Ok(WizardEvent::Status { label, .. }) => eprintln!("    {}", label),
                Ok(WizardEvent::StateChanged(snapshot)) => {
                    eprintln!(
                        "[{}/3 {}] {}",
                        snapshot.stage.number(),
                        snapshot.stage,
                        snapshot.state
                    );
                    if let Some(error) = snapshot.error {
                        eprintln!("    error: {}", error.message);
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!("Skipped {} wizard events", skipped),
                Err(RecvError::Closed) => break,
            }
        }
    })
}

async fn cmd_run(
    gateway: Arc<HttpGateway>,
    config: &ClientConfig,
    args: RunArgs,
) -> anyhow::Result<()> {
    let wizard = WizardController::new(Arc::clone(&gateway), WizardOptions::from_config(config));
    let printer = spawn_event_printer(&wizard, args.events_json);

    wizard.set_category(args.category)?;
    let garment = FileInput::from_path(&args.garment)
        .with_context(|| format!("read garment '{}'", args.garment.display()))?;
    wizard.choose_garment(MediaSource::File(garment))?;
    wizard.submit_garment().await?;

    choose_person(&wizard, &args)?;

    let mut outcome = wizard.submit_person().await;
    let mut attempts = 0;
    while outcome.is_err()
        && wizard.state() == WizardState::Failed(FailedStage::Synthesis)
        && attempts < args.retries
    {
        attempts += 1;
        warn!("Synthesis failed, retrying ({}/{})", attempts, args.retries);
        outcome = wizard.retry().await;
    }
    let snapshot = outcome?;

    let result_path = wizard
        .result_path()
        .context("service returned no result")?;
    if let Some(url) = snapshot.result.result_url {
        if !args.events_json {
            println!("{}", url);
        }
    }

    if let Some(out) = &args.out {
        let bytes = gateway.fetch_result(&result_path).await?;
        if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        std::fs::write(out, &bytes).with_context(|| format!("write '{}'", out.display()))?;
        eprintln!("wrote {}", out.display());
    }

    drop(wizard);
    let _ = tokio::time::timeout(Duration::from_secs(1), printer).await;
    Ok(())
}

#[cfg(not(feature = "camera"))]
fn choose_person(wizard: &WizardController<HttpGateway>, args: &RunArgs) -> anyhow::Result<()> {
    let Some(path) = &args.person else {
        bail!("--person is required");
    };
    let person = FileInput::from_path(path)
        .with_context(|| format!("read person photo '{}'", path.display()))?;
    wizard.choose_person(MediaSource::File(person))?;
    Ok(())
}

#[cfg(feature = "camera")]
fn choose_person(wizard: &WizardController<HttpGateway>, args: &RunArgs) -> anyhow::Result<()> {
    match (&args.person, args.camera) {
        (Some(path), _) => {
            let person = FileInput::from_path(path)
                .with_context(|| format!("read person photo '{}'", path.display()))?;
            wizard.choose_person(MediaSource::File(person))?;
        }
        (None, Some(index)) => {
            let mut camera = look1nce::media::NativeCamera::open(index)
                .with_context(|| format!("open camera {}", index))?;
            wizard.choose_person(MediaSource::Camera(&mut camera))?;
        }
        (None, None) => bail!("either --person or --camera is required"),
    }
    Ok(())
}

async fn cmd_health(gateway: &HttpGateway) -> anyhow::Result<()> {
    let status = gateway.health().await?;
    println!("{}", serde_json::to_string_pretty(&status)?);
    if !status.is_healthy() {
        bail!("service reports status '{}'", status.status);
    }
    Ok(())
}

async fn cmd_cleanup(gateway: &HttpGateway) -> anyhow::Result<()> {
    gateway.cleanup().await?;
    eprintln!("cleanup requested");
    Ok(())
}
