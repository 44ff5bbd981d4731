use anyhow::Result;
use std::sync::Arc;

use crate::config::Config;
use crate::player::MediaEngine;

pub enum EngineBackend {
    GStreamer,
}

impl From<&str> for EngineBackend {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "gstreamer" => EngineBackend::GStreamer,
            other => {
                tracing::warn!("Unknown engine backend '{}', defaulting to GStreamer", other);
                EngineBackend::GStreamer
            }
        }
    }
}

/// Constructs the engine named by the config. Fails when the backend was
/// compiled out.
pub fn create_engine(config: &Config) -> Result<Arc<dyn MediaEngine>> {
    let backend = EngineBackend::from(config.playback.engine_backend.as_str());

    match backend {
        EngineBackend::GStreamer => {
            #[cfg(feature = "gstreamer")]
            {
                tracing::info!("Creating GStreamer engine backend");
                Ok(Arc::new(crate::player::GStreamerEngine::new()?))
            }
            #[cfg(not(feature = "gstreamer"))]
            {
                Err(crate::utils::errors::PlayerError::BackendUnavailable("gstreamer").into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_defaults_to_gstreamer() {
        assert!(matches!(
            EngineBackend::from("gstreamer"),
            EngineBackend::GStreamer
        ));
        assert!(matches!(
            EngineBackend::from("anything-else"),
            EngineBackend::GStreamer
        ));
    }

    #[cfg(not(feature = "gstreamer"))]
    #[test]
    fn test_create_engine_reports_compiled_out_backend() {
        let config = Config::default();
        let err = match create_engine(&config) {
            Ok(_) => panic!("expected create_engine to fail when backend is compiled out"),
            Err(e) => e,
        };
        assert!(err.to_string().contains("not available"));
    }
}
