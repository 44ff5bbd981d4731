use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::PlaybackConfig;
use crate::core::Property;
use crate::player::{EngineEvent, EngineState, MediaEngine, SurfaceHandle};

/// Externally visible playback state. Transitions are driven solely by
/// engine events; commands never write it directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
    Paused,
    Buffering,
    Completed,
    Error,
}

impl PlaybackState {
    /// Media is loaded and play/pause intent applies.
    pub fn is_ready(&self) -> bool {
        matches!(self, PlaybackState::Playing | PlaybackState::Paused)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekDirection {
    Forward,
    Backward,
}

/// Transient indicator for a fast-forward/rewind step, cleared shortly
/// after being set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeekOverlay {
    pub direction: SeekDirection,
    pub seek_ms: u64,
}

/// Mediates between the external media engine and observers of playback
/// state: forwards commands to the engine, republishes engine events as
/// `Property` values, runs the periodic position tracker, and owns the
/// surface-attachment lifecycle.
#[derive(Clone)]
pub struct PlaybackCoordinator {
    engine: Arc<dyn MediaEngine>,
    is_player_active: Property<bool>,
    playback_state: Property<PlaybackState>,
    show_controls: Property<bool>,
    current_position_ms: Property<u64>,
    buffered_position_ms: Property<u64>,
    video_duration_ms: Property<u64>,
    playback_speed: Property<f32>,
    seek_overlay: Property<Option<SeekOverlay>>,
    error: Property<Option<String>>,
    current_surface: Arc<Mutex<Option<SurfaceHandle>>>,
    tracking_handle: Arc<Mutex<Option<JoinHandle<()>>>>,
    overlay_handle: Arc<Mutex<Option<JoinHandle<()>>>>,
    seek_step: u64,
    tick_interval: Duration,
    overlay_display: Duration,
    controls_hide_delay: Duration,
}

impl PlaybackCoordinator {
    pub fn new(engine: Arc<dyn MediaEngine>, config: &PlaybackConfig) -> Self {
        let coordinator = Self {
            engine,
            is_player_active: Property::new(false, "is_player_active"),
            playback_state: Property::new(PlaybackState::Idle, "playback_state"),
            show_controls: Property::new(true, "show_controls"),
            current_position_ms: Property::new(0, "current_position_ms"),
            buffered_position_ms: Property::new(0, "buffered_position_ms"),
            video_duration_ms: Property::new(0, "video_duration_ms"),
            playback_speed: Property::new(1.0, "playback_speed"),
            seek_overlay: Property::new(None, "seek_overlay"),
            error: Property::new(None, "error"),
            current_surface: Arc::new(Mutex::new(None)),
            tracking_handle: Arc::new(Mutex::new(None)),
            overlay_handle: Arc::new(Mutex::new(None)),
            seek_step: config.seek_step_ms,
            tick_interval: Duration::from_millis(config.position_tick_ms),
            overlay_display: Duration::from_millis(config.seek_overlay_display_ms),
            controls_hide_delay: Duration::from_secs(config.controls_hide_delay_secs),
        };
        coordinator.spawn_event_loop();
        coordinator
    }

    /// Drains the engine's event stream into `handle_engine_event`. The
    /// stream is take-once; a second coordinator on the same engine would
    /// see nothing.
    fn spawn_event_loop(&self) {
        let Some(mut events) = self.engine.take_events() else {
            warn!("Engine event stream already taken, coordinator will not observe the engine");
            return;
        };

        let this = self.clone();
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                this.handle_engine_event(event).await;
            }
            debug!("Engine event stream closed");
        });
    }

    async fn handle_engine_event(&self, event: EngineEvent) {
        match event {
            EngineEvent::StateChanged(state) => {
                let next = match state {
                    EngineState::Idle => PlaybackState::Idle,
                    EngineState::Buffering => {
                        self.show_controls.set(true).await;
                        PlaybackState::Buffering
                    }
                    // Play/pause intent arrives through IsPlayingChanged;
                    // keep the visible state to avoid a spurious flicker.
                    EngineState::Ready => self.playback_state.get().await,
                    EngineState::Ended => PlaybackState::Completed,
                };
                self.playback_state.set(next).await;

                match state {
                    EngineState::Ready => {
                        self.refresh_duration().await;
                        self.start_tracking_position().await;
                    }
                    _ => self.stop_tracking_position().await,
                }
            }
            EngineEvent::IsPlayingChanged(playing) => {
                let next = if playing {
                    PlaybackState::Playing
                } else {
                    PlaybackState::Paused
                };
                self.playback_state.set(next).await;
            }
            EngineEvent::Error(message) => {
                warn!("Engine reported playback error: {}", message);
                self.error.set(Some(message)).await;
                self.playback_state.set(PlaybackState::Error).await;
            }
            EngineEvent::MediaItemTransition | EngineEvent::TimelineChanged => {
                self.refresh_duration().await;
            }
        }
    }

    /// Loads the URI and begins playback. The player counts as active from
    /// here on, before the engine reaches `Playing`.
    pub async fn start_playback(&self, uri: &str) -> Result<()> {
        info!("Starting playback: {}", uri);
        self.error.set(None).await;

        if let Err(e) = self.load_and_play(uri).await {
            self.error.set(Some(e.to_string())).await;
            self.playback_state.set(PlaybackState::Error).await;
            return Err(e);
        }

        self.is_player_active.set(true).await;
        Ok(())
    }

    async fn load_and_play(&self, uri: &str) -> Result<()> {
        self.engine.load(uri).await?;
        self.engine.play().await?;
        Ok(())
    }

    pub async fn pause(&self) -> Result<()> {
        self.engine.set_play_when_ready(false).await
    }

    pub async fn resume(&self) -> Result<()> {
        self.engine.set_play_when_ready(true).await
    }

    pub async fn seek_to(&self, position_ms: u64) -> Result<()> {
        self.engine.seek(position_ms).await
    }

    /// Seeks forward by `delta_ms`. The upper bound is left to the engine,
    /// which clamps at the media duration.
    pub async fn fast_forward(&self, delta_ms: u64) -> Result<()> {
        let target = self.engine.position().await.saturating_add(delta_ms);
        self.engine.seek(target).await?;
        self.flash_seek_overlay(SeekDirection::Forward, delta_ms).await;
        Ok(())
    }

    /// Seeks backward by `delta_ms`, clamped at zero.
    pub async fn rewind(&self, delta_ms: u64) -> Result<()> {
        let target = self.engine.position().await.saturating_sub(delta_ms);
        self.engine.seek(target).await?;
        self.flash_seek_overlay(SeekDirection::Backward, delta_ms).await;
        Ok(())
    }

    /// Fast-forward by the configured step (double-tap affordance).
    pub async fn fast_forward_step(&self) -> Result<()> {
        self.fast_forward(self.seek_step).await
    }

    /// Rewind by the configured step (double-tap affordance).
    pub async fn rewind_step(&self) -> Result<()> {
        self.rewind(self.seek_step).await
    }

    pub async fn set_playback_speed(&self, rate: f32) -> Result<()> {
        self.engine.set_rate(rate).await?;
        self.playback_speed.set(rate).await;
        Ok(())
    }

    /// Binds the rendering surface. Re-attaching the current surface is a
    /// no-op; attaching a different one displaces the previous binding.
    pub async fn attach_surface(&self, surface: SurfaceHandle) -> Result<()> {
        let mut current = self.current_surface.lock().await;
        if *current == Some(surface) {
            return Ok(());
        }
        *current = Some(surface);
        self.engine.set_surface(Some(surface)).await
    }

    /// Unbinds the rendering surface. Detaching anything but the current
    /// surface is ignored.
    pub async fn detach_surface(&self, surface: SurfaceHandle) -> Result<()> {
        let mut current = self.current_surface.lock().await;
        if *current != Some(surface) {
            return Ok(());
        }
        *current = None;
        self.engine.set_surface(None).await
    }

    pub async fn show_playback_controls(&self) {
        self.show_controls.set(true).await;
    }

    /// Hiding is refused while buffering so the spinner stays reachable.
    pub async fn hide_playback_controls(&self) {
        if self.playback_state.get().await == PlaybackState::Buffering {
            return;
        }
        self.show_controls.set(false).await;
    }

    pub async fn toggle_playback_controls(&self) {
        if self.show_controls.get().await {
            self.hide_playback_controls().await;
        } else {
            self.show_playback_controls().await;
        }
    }

    /// Shows the controls and schedules an auto-hide after the configured
    /// delay. The hide obeys the same buffering refusal as
    /// `hide_playback_controls`.
    pub async fn show_controls_temporarily(&self) {
        self.show_controls.set(true).await;

        let show_controls = self.show_controls.clone();
        let playback_state = self.playback_state.clone();
        let delay = self.controls_hide_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if playback_state.get().await != PlaybackState::Buffering {
                show_controls.set(false).await;
            }
        });
    }

    /// Stops tracking and releases the engine. Must run before the
    /// coordinator is discarded so no render target or timer outlives it.
    pub async fn shutdown(&self) -> Result<()> {
        debug!("Shutting down playback coordinator");
        self.stop_tracking_position().await;
        if let Some(handle) = self.overlay_handle.lock().await.take() {
            handle.abort();
        }
        self.engine.release().await
    }

    async fn refresh_duration(&self) {
        let duration = self.engine.duration().await.unwrap_or(0);
        self.video_duration_ms.set(duration).await;
    }

    /// Starts the periodic position refresh. Each tick is gated on the
    /// engine actually playing, so a paused or buffering engine leaves the
    /// published positions untouched.
    async fn start_tracking_position(&self) {
        self.stop_tracking_position().await;

        let engine = self.engine.clone();
        let position = self.current_position_ms.clone();
        let buffered = self.buffered_position_ms.clone();
        let interval = self.tick_interval;
        let handle = tokio::spawn(async move {
            loop {
                if engine.is_playing().await {
                    position.set(engine.position().await).await;
                    buffered.set(engine.buffered_position().await).await;
                }
                tokio::time::sleep(interval).await;
            }
        });

        *self.tracking_handle.lock().await = Some(handle);
    }

    async fn stop_tracking_position(&self) {
        if let Some(handle) = self.tracking_handle.lock().await.take() {
            handle.abort();
        }
    }

    /// Publishes the overlay and schedules its clear, restarting the timer
    /// when a new step comes in before the previous one faded.
    async fn flash_seek_overlay(&self, direction: SeekDirection, seek_ms: u64) {
        self.seek_overlay
            .set(Some(SeekOverlay { direction, seek_ms }))
            .await;

        let mut slot = self.overlay_handle.lock().await;
        if let Some(handle) = slot.take() {
            handle.abort();
        }

        let overlay = self.seek_overlay.clone();
        let display = self.overlay_display;
        *slot = Some(tokio::spawn(async move {
            tokio::time::sleep(display).await;
            overlay.set(None).await;
        }));
    }

    pub fn is_player_active(&self) -> &Property<bool> {
        &self.is_player_active
    }

    pub fn playback_state(&self) -> &Property<PlaybackState> {
        &self.playback_state
    }

    pub fn show_controls(&self) -> &Property<bool> {
        &self.show_controls
    }

    pub fn current_position_ms(&self) -> &Property<u64> {
        &self.current_position_ms
    }

    pub fn buffered_position_ms(&self) -> &Property<u64> {
        &self.buffered_position_ms
    }

    pub fn video_duration_ms(&self) -> &Property<u64> {
        &self.video_duration_ms
    }

    pub fn playback_speed(&self) -> &Property<f32> {
        &self.playback_speed
    }

    pub fn seek_overlay(&self) -> &Property<Option<SeekOverlay>> {
        &self.seek_overlay
    }

    pub fn error(&self) -> &Property<Option<String>> {
        &self.error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playback_state_is_ready() {
        assert!(PlaybackState::Playing.is_ready());
        assert!(PlaybackState::Paused.is_ready());
        assert!(!PlaybackState::Idle.is_ready());
        assert!(!PlaybackState::Buffering.is_ready());
        assert!(!PlaybackState::Completed.is_ready());
        assert!(!PlaybackState::Error.is_ready());
    }

    #[test]
    fn test_seek_overlay_equality() {
        let forward = SeekOverlay {
            direction: SeekDirection::Forward,
            seek_ms: 10_000,
        };
        assert_eq!(
            forward,
            SeekOverlay {
                direction: SeekDirection::Forward,
                seek_ms: 10_000,
            }
        );
        assert_ne!(
            forward,
            SeekOverlay {
                direction: SeekDirection::Backward,
                seek_ms: 10_000,
            }
        );
    }
}
