pub mod factory;
pub mod traits;

#[cfg(feature = "gstreamer")]
pub mod gstreamer_engine;

pub use factory::create_engine;
pub use traits::{EngineEvent, EngineState, MediaEngine, SurfaceHandle};

#[cfg(feature = "gstreamer")]
pub use gstreamer_engine::GStreamerEngine;
