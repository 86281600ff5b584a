use anyhow::{Context, Result};
use clap::Parser;
use screen_recorder::capture::SyntheticCapture;
use screen_recorder::{
    CapabilityProfile, Config, DirectoryDownloader, InteractiveSave, LogView, PresetSaveDialog,
    Providers, SessionController, StatusIndicator, SyntheticEncoderFactory, UiCommand, ViewModel,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Headless scripted recording session using synthetic capture and encoding
#[derive(Debug, Parser)]
#[command(name = "screen-recorder", version)]
struct Args {
    /// Config file path (extension optional)
    #[arg(long, default_value = "config/screen-recorder")]
    config: String,

    /// How long to record before stopping
    #[arg(long, default_value_t = 3)]
    duration_secs: u64,

    /// Revoke the capture source after this many seconds instead of stopping
    #[arg(long)]
    revoke_after_secs: Option<u64>,

    /// Pick the save location before recording
    #[arg(long)]
    pre_select: bool,

    /// Behave like a host without interactive save (always download)
    #[arg(long)]
    no_interactive_save: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("Screen recorder v{}", env!("CARGO_PKG_VERSION"));
    info!("Downloads go to {:?}", cfg.save.downloads_path());

    let capture = Arc::new(SyntheticCapture::new("Synthetic Screen 1"));
    let encoders = Arc::new(SyntheticEncoderFactory::new(
        vec![
            "video/webm;codecs=vp8,opus".to_string(),
            "video/webm".to_string(),
        ],
        Duration::from_millis(500),
    ));
    let interactive_save: Option<Arc<dyn InteractiveSave>> = if args.no_interactive_save {
        None
    } else {
        Some(Arc::new(PresetSaveDialog::new(cfg.save.save_path())))
    };

    let mut profile = CapabilityProfile::desktop();
    profile.interactive_save_supported = !args.no_interactive_save;

    let view = Arc::new(LogView::new(true));
    let models = view.subscribe();
    let final_model = view.subscribe();

    let providers = Providers {
        capture: capture.clone(),
        encoders,
        interactive_save,
        downloader: Arc::new(DirectoryDownloader::new(cfg.save.downloads_path())),
    };

    let controller = SessionController::new(cfg, profile, providers, view);

    let (command_tx, command_rx) = mpsc::channel(16);
    let script = tokio::spawn(drive(args, command_tx, models, capture));

    let stats = controller.run(command_rx).await?;
    script.await.context("Script task panicked")??;

    info!("Final session stats: {}", serde_json::to_string(&stats)?);
    let model = final_model.borrow().clone();
    println!("{}", serde_json::to_string_pretty(&model)?);
    Ok(())
}

/// Send the scripted user actions, waiting for the view to catch up between them
async fn drive(
    args: Args,
    commands: mpsc::Sender<UiCommand>,
    mut models: watch::Receiver<Option<ViewModel>>,
    capture: Arc<SyntheticCapture>,
) -> Result<()> {
    if args.pre_select {
        commands.send(UiCommand::ChooseSaveLocation).await?;
    }

    commands.send(UiCommand::PickSource).await?;
    wait_for_status(&mut models, StatusIndicator::SourceReady).await?;

    commands.send(UiCommand::StartRecording).await?;
    wait_for_status(&mut models, StatusIndicator::Recording).await?;

    match args.revoke_after_secs {
        Some(secs) => {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            info!("Revoking capture source");
            if let Some(track) = capture.last_video_track() {
                track.revoke();
            }
        }
        None => {
            tokio::time::sleep(Duration::from_secs(args.duration_secs)).await;
            commands.send(UiCommand::StopRecording).await?;
        }
    }

    wait_for_status(&mut models, StatusIndicator::Ready).await?;
    commands.send(UiCommand::Shutdown).await?;
    Ok(())
}

async fn wait_for_status(
    models: &mut watch::Receiver<Option<ViewModel>>,
    status: StatusIndicator,
) -> Result<()> {
    tokio::time::timeout(
        Duration::from_secs(30),
        models.wait_for(|m| m.as_ref().is_some_and(|m| m.status == status)),
    )
    .await
    .with_context(|| format!("Timed out waiting for {:?}", status))?
    .context("Controller stopped")?;
    Ok(())
}
