pub mod coordinator;
pub mod property;

pub use coordinator::{PlaybackCoordinator, PlaybackState, SeekDirection, SeekOverlay};
pub use property::{Property, PropertySubscriber};
