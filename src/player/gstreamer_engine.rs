use anyhow::{Context, Result};
use async_trait::async_trait;
use gstreamer as gst;
use gstreamer::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};

use crate::player::traits::{EngineEvent, EngineState, MediaEngine, SurfaceHandle};

/// playbin3-backed engine. Bus messages are projected onto the
/// `EngineEvent` vocabulary on a dedicated watcher thread; everything else
/// is a thin wrapper over pipeline state changes and queries.
pub struct GStreamerEngine {
    playbin: Mutex<Option<gst::Element>>,
    current_surface: Mutex<Option<SurfaceHandle>>,
    events_tx: mpsc::UnboundedSender<EngineEvent>,
    events_rx: Mutex<Option<mpsc::UnboundedReceiver<EngineEvent>>>,
    bus_quit: Mutex<Option<Arc<AtomicBool>>>,
}

impl GStreamerEngine {
    pub fn new() -> Result<Self> {
        debug!("Initializing GStreamer engine");
        gst::init().context("Failed to initialize GStreamer")?;

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Ok(Self {
            playbin: Mutex::new(None),
            current_surface: Mutex::new(None),
            events_tx,
            events_rx: Mutex::new(Some(events_rx)),
            bus_quit: Mutex::new(None),
        })
    }

    /// Watches the pipeline bus until told to quit. One watcher per loaded
    /// pipeline; loading new media retires the previous watcher.
    fn spawn_bus_watch(&self, bus: gst::Bus) {
        let quit = Arc::new(AtomicBool::new(false));
        if let Some(old) = self.bus_quit.lock().unwrap().replace(quit.clone()) {
            old.store(true, Ordering::Relaxed);
        }

        let events = self.events_tx.clone();
        std::thread::spawn(move || {
            let mut buffering = false;
            while !quit.load(Ordering::Relaxed) {
                let Some(msg) = bus.timed_pop(gst::ClockTime::from_mseconds(100)) else {
                    continue;
                };
                Self::dispatch_bus_message(&msg, &events, &mut buffering);
            }
            trace!("Bus watcher exiting");
        });
    }

    fn stop_bus_watch(&self) {
        if let Some(quit) = self.bus_quit.lock().unwrap().take() {
            quit.store(true, Ordering::Relaxed);
        }
    }

    fn dispatch_bus_message(
        msg: &gst::Message,
        events: &mpsc::UnboundedSender<EngineEvent>,
        buffering: &mut bool,
    ) {
        use gst::MessageView;

        match msg.view() {
            MessageView::Eos(_) => {
                info!("End of stream");
                let _ = events.send(EngineEvent::StateChanged(EngineState::Ended));
            }
            MessageView::Error(err) => {
                error!(
                    "Bus error from {:?}: {}",
                    err.src().map(|s| s.path_string()),
                    err.error()
                );
                let _ = events.send(EngineEvent::Error(err.error().to_string()));
            }
            MessageView::Buffering(b) => {
                let percent = b.percent();
                trace!("Buffering: {}%", percent);
                if percent < 100 {
                    if !*buffering {
                        *buffering = true;
                        let _ = events.send(EngineEvent::StateChanged(EngineState::Buffering));
                    }
                } else if *buffering {
                    *buffering = false;
                    let _ = events.send(EngineEvent::StateChanged(EngineState::Ready));
                }
            }
            MessageView::StateChanged(state_changed) => {
                // Only the playbin's own transitions reflect playback intent
                let from_playbin = state_changed
                    .src()
                    .map(|s| s.name().starts_with("playhead"))
                    .unwrap_or(false);
                if !from_playbin {
                    return;
                }

                match state_changed.current() {
                    gst::State::Playing => {
                        let _ = events.send(EngineEvent::StateChanged(EngineState::Ready));
                        let _ = events.send(EngineEvent::IsPlayingChanged(true));
                    }
                    gst::State::Paused => {
                        if state_changed.old() == gst::State::Playing {
                            let _ = events.send(EngineEvent::IsPlayingChanged(false));
                        } else {
                            // Preroll reached PAUSED: the media is ready
                            let _ = events.send(EngineEvent::StateChanged(EngineState::Ready));
                        }
                    }
                    gst::State::Ready | gst::State::Null => {
                        let _ = events.send(EngineEvent::StateChanged(EngineState::Idle));
                    }
                    _ => {}
                }
            }
            MessageView::DurationChanged(_) => {
                let _ = events.send(EngineEvent::TimelineChanged);
            }
            MessageView::StreamStart(_) => {
                let _ = events.send(EngineEvent::MediaItemTransition);
            }
            _ => {}
        }
    }

    fn bind_surface(playbin: &gst::Element, surface: Option<SurfaceHandle>) {
        use gstreamer_video::prelude::*;

        if let Some(overlay) = playbin.dynamic_cast_ref::<gstreamer_video::VideoOverlay>() {
            match surface {
                Some(handle) => unsafe { overlay.set_window_handle(handle.as_raw() as usize) },
                None => unsafe { overlay.set_window_handle(0) },
            }
            overlay.expose();
        } else {
            warn!("Pipeline does not expose a video overlay, surface binding skipped");
        }
    }
}

#[async_trait]
impl MediaEngine for GStreamerEngine {
    async fn load(&self, uri: &str) -> Result<()> {
        info!("Loading media: {}", uri);

        self.stop_bus_watch();
        if let Some(old) = self.playbin.lock().unwrap().take() {
            old.set_state(gst::State::Null)
                .context("Failed to tear down previous pipeline")?;
        }

        let playbin = gst::ElementFactory::make("playbin3")
            .name("playhead")
            .property("uri", uri)
            .build()
            .context("Failed to create playbin3 element")?;

        // A surface attached before this load carries over
        if let Some(surface) = *self.current_surface.lock().unwrap() {
            Self::bind_surface(&playbin, Some(surface));
        }

        let bus = playbin.bus().context("Pipeline has no bus")?;
        self.spawn_bus_watch(bus);

        // Preroll paused; actual playback starts with play()
        playbin
            .set_state(gst::State::Paused)
            .context("Failed to preroll pipeline")?;

        *self.playbin.lock().unwrap() = Some(playbin);
        Ok(())
    }

    async fn play(&self) -> Result<()> {
        if let Some(playbin) = self.playbin.lock().unwrap().as_ref() {
            playbin
                .set_state(gst::State::Playing)
                .context("Failed to start playback")?;
        }
        Ok(())
    }

    async fn set_play_when_ready(&self, play: bool) -> Result<()> {
        let target = if play {
            gst::State::Playing
        } else {
            gst::State::Paused
        };
        if let Some(playbin) = self.playbin.lock().unwrap().as_ref() {
            playbin
                .set_state(target)
                .context("Failed to change play/pause state")?;
        }
        Ok(())
    }

    async fn seek(&self, position_ms: u64) -> Result<()> {
        debug!("Seeking to {}ms", position_ms);
        if let Some(playbin) = self.playbin.lock().unwrap().as_ref() {
            playbin
                .seek_simple(
                    gst::SeekFlags::FLUSH | gst::SeekFlags::KEY_UNIT,
                    gst::ClockTime::from_mseconds(position_ms),
                )
                .context("Seek failed")?;
        }
        Ok(())
    }

    async fn set_rate(&self, rate: f32) -> Result<()> {
        debug!("Setting playback rate to {}", rate);
        if let Some(playbin) = self.playbin.lock().unwrap().as_ref() {
            let position = playbin
                .query_position::<gst::ClockTime>()
                .unwrap_or(gst::ClockTime::ZERO);
            playbin
                .seek(
                    rate as f64,
                    gst::SeekFlags::FLUSH | gst::SeekFlags::ACCURATE,
                    gst::SeekType::Set,
                    position,
                    gst::SeekType::None,
                    gst::ClockTime::NONE,
                )
                .context("Failed to change playback rate")?;
        }
        Ok(())
    }

    async fn set_surface(&self, surface: Option<SurfaceHandle>) -> Result<()> {
        *self.current_surface.lock().unwrap() = surface;
        if let Some(playbin) = self.playbin.lock().unwrap().as_ref() {
            Self::bind_surface(playbin, surface);
        }
        Ok(())
    }

    async fn position(&self) -> u64 {
        let playbin = self.playbin.lock().unwrap();
        playbin
            .as_ref()
            .and_then(|p| p.query_position::<gst::ClockTime>())
            .map(|pos| pos.mseconds())
            .unwrap_or(0)
    }

    async fn buffered_position(&self) -> u64 {
        let playbin_guard = self.playbin.lock().unwrap();
        let Some(playbin) = playbin_guard.as_ref() else {
            return 0;
        };

        let mut query = gst::query::Buffering::new(gst::Format::Percent);
        if playbin.query(&mut query) {
            let (_, percent) = query.result();
            if let Some(duration) = playbin.query_duration::<gst::ClockTime>() {
                return duration.mseconds() * percent.clamp(0, 100) as u64 / 100;
            }
        }

        // Without buffering info the playback position is the best floor
        playbin
            .query_position::<gst::ClockTime>()
            .map(|pos| pos.mseconds())
            .unwrap_or(0)
    }

    async fn duration(&self) -> Option<u64> {
        let playbin = self.playbin.lock().unwrap();
        playbin
            .as_ref()
            .and_then(|p| p.query_duration::<gst::ClockTime>())
            .map(|duration| duration.mseconds())
    }

    async fn is_playing(&self) -> bool {
        let playbin = self.playbin.lock().unwrap();
        match playbin.as_ref() {
            Some(p) => {
                let (_, current, _) = p.state(gst::ClockTime::ZERO);
                current == gst::State::Playing
            }
            None => false,
        }
    }

    async fn release(&self) -> Result<()> {
        debug!("Releasing GStreamer engine");
        self.stop_bus_watch();
        if let Some(playbin) = self.playbin.lock().unwrap().take() {
            playbin
                .set_state(gst::State::Null)
                .context("Failed to stop pipeline")?;
        }
        Ok(())
    }

    fn take_events(&self) -> Option<mpsc::UnboundedReceiver<EngineEvent>> {
        self.events_rx.lock().unwrap().take()
    }
}
