use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("Playback error: {0}")]
    Playback(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Engine backend not available: {0}")]
    BackendUnavailable(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
