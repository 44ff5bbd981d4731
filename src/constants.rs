// Playback tuning constants - defaults for the config file fields

/// Stream played by the demo binary when no URI is given on the command line.
pub const DEMO_STREAM_URL: &str =
    "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/BigBuckBunny.mp4";

/// Double-tap style fast-forward/rewind step.
pub const DEFAULT_SEEK_STEP_MS: u64 = 10_000;

/// Position/buffered-position refresh cadence while playing.
pub const POSITION_TICK_INTERVAL_MS: u64 = 1_000;

/// How long the transient seek overlay stays visible.
pub const SEEK_OVERLAY_DISPLAY_MS: u64 = 800;

/// Auto-hide delay for temporarily shown playback controls.
pub const CONTROLS_HIDE_DELAY_SECS: u64 = 3;
