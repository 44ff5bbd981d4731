// Playback coordination core: observable state containers, the playback
// coordinator, and the engine seam. Rendering and UI live with the embedder.

pub mod config;
pub mod constants;
pub mod core;
pub mod player;
pub mod utils;

pub use crate::config::Config;
pub use crate::core::{PlaybackCoordinator, PlaybackState, Property, SeekDirection, SeekOverlay};
pub use crate::player::{EngineEvent, EngineState, MediaEngine, SurfaceHandle};
