use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use playhead::config::Config;
use playhead::core::{PlaybackCoordinator, PlaybackState};
use playhead::player::create_engine;
use playhead::utils::format_ms;

/// Headless demo: plays the URI given on the command line (or the
/// configured demo stream) and logs state transitions until the media
/// completes or fails.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("playhead=debug")),
        )
        .init();

    info!("Starting playhead");

    let config = Config::load()?;
    config.validate()?;

    let engine = create_engine(&config)?;
    let coordinator = PlaybackCoordinator::new(engine, &config.playback);

    let uri = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config.playback.demo_stream_url.clone());
    coordinator.start_playback(&uri).await?;

    let mut states = coordinator.playback_state().subscribe();
    loop {
        if !states.wait_for_change().await {
            break;
        }

        let state = coordinator.playback_state().get().await;
        let position = coordinator.current_position_ms().get().await;
        let duration = coordinator.video_duration_ms().get().await;
        info!(
            "Playback state {:?} at {} / {}",
            state,
            format_ms(position),
            format_ms(duration)
        );

        match state {
            PlaybackState::Completed => break,
            PlaybackState::Error => {
                if let Some(message) = coordinator.error().get().await {
                    error!("Playback failed: {}", message);
                }
                break;
            }
            _ => {}
        }
    }

    coordinator.shutdown().await?;
    Ok(())
}
