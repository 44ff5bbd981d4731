use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Engine-side playback lifecycle as delivered on the event stream. `Ready`
/// carries no play/pause intent; that arrives through `IsPlayingChanged`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Buffering,
    Ready,
    Ended,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    StateChanged(EngineState),
    IsPlayingChanged(bool),
    Error(String),
    MediaItemTransition,
    TimelineChanged,
}

/// Opaque rendering target supplied by the embedding platform. The engine
/// never interprets the raw value beyond handing it to its video sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(u64);

impl SurfaceHandle {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_raw(&self) -> u64 {
        self.0
    }
}

/// Capability interface over the external media engine. The coordinator only
/// ever talks to this trait, so any engine implementation can be substituted.
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Loads and prepares the given media URI, replacing any current media.
    async fn load(&self, uri: &str) -> Result<()>;

    /// Begins playback of the loaded media.
    async fn play(&self) -> Result<()>;

    /// Toggles the play/pause intent without tearing down the loaded media.
    async fn set_play_when_ready(&self, play: bool) -> Result<()>;

    async fn seek(&self, position_ms: u64) -> Result<()>;

    async fn set_rate(&self, rate: f32) -> Result<()>;

    /// Binds (or with `None`, unbinds) the video rendering target.
    async fn set_surface(&self, surface: Option<SurfaceHandle>) -> Result<()>;

    async fn position(&self) -> u64;

    async fn buffered_position(&self) -> u64;

    /// `None` while the duration is not yet known.
    async fn duration(&self) -> Option<u64>;

    async fn is_playing(&self) -> bool;

    /// Tears the engine down. Must be called before the engine is discarded.
    async fn release(&self) -> Result<()>;

    /// Hands out the engine's event stream. Can only be taken once.
    fn take_events(&self) -> Option<mpsc::UnboundedReceiver<EngineEvent>>;
}
