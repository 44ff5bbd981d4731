#![allow(dead_code)]

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::mpsc;

use playhead::player::{EngineEvent, MediaEngine, SurfaceHandle};

/// Every command the coordinator issued, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Load(String),
    Play,
    SetPlayWhenReady(bool),
    Seek(u64),
    SetRate(f32),
    SetSurface(Option<SurfaceHandle>),
    Release,
}

/// Scripted engine: records commands, reports whatever position/duration
/// the test sets, and emits events on demand.
pub struct FakeEngine {
    calls: Mutex<Vec<EngineCall>>,
    events_tx: mpsc::UnboundedSender<EngineEvent>,
    events_rx: Mutex<Option<mpsc::UnboundedReceiver<EngineEvent>>>,
    position_ms: AtomicU64,
    buffered_ms: AtomicU64,
    duration_ms: Mutex<Option<u64>>,
    playing: AtomicBool,
    fail_load: AtomicBool,
}

impl FakeEngine {
    pub fn new() -> Arc<Self> {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            events_tx,
            events_rx: Mutex::new(Some(events_rx)),
            position_ms: AtomicU64::new(0),
            buffered_ms: AtomicU64::new(0),
            duration_ms: Mutex::new(None),
            playing: AtomicBool::new(false),
            fail_load: AtomicBool::new(false),
        })
    }

    pub fn emit(&self, event: EngineEvent) {
        self.events_tx.send(event).expect("coordinator gone");
    }

    pub fn set_position(&self, ms: u64) {
        self.position_ms.store(ms, Ordering::SeqCst);
    }

    pub fn set_buffered(&self, ms: u64) {
        self.buffered_ms.store(ms, Ordering::SeqCst);
    }

    pub fn set_duration(&self, ms: Option<u64>) {
        *self.duration_ms.lock().unwrap() = ms;
    }

    pub fn set_playing(&self, playing: bool) {
        self.playing.store(playing, Ordering::SeqCst);
    }

    pub fn set_fail_load(&self, fail: bool) {
        self.fail_load.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self, pred: impl Fn(&EngineCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: EngineCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl MediaEngine for FakeEngine {
    async fn load(&self, uri: &str) -> Result<()> {
        self.record(EngineCall::Load(uri.to_string()));
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(anyhow!("media failed to load"));
        }
        Ok(())
    }

    async fn play(&self) -> Result<()> {
        self.record(EngineCall::Play);
        Ok(())
    }

    async fn set_play_when_ready(&self, play: bool) -> Result<()> {
        self.record(EngineCall::SetPlayWhenReady(play));
        Ok(())
    }

    async fn seek(&self, position_ms: u64) -> Result<()> {
        self.record(EngineCall::Seek(position_ms));
        Ok(())
    }

    async fn set_rate(&self, rate: f32) -> Result<()> {
        self.record(EngineCall::SetRate(rate));
        Ok(())
    }

    async fn set_surface(&self, surface: Option<SurfaceHandle>) -> Result<()> {
        self.record(EngineCall::SetSurface(surface));
        Ok(())
    }

    async fn position(&self) -> u64 {
        self.position_ms.load(Ordering::SeqCst)
    }

    async fn buffered_position(&self) -> u64 {
        self.buffered_ms.load(Ordering::SeqCst)
    }

    async fn duration(&self) -> Option<u64> {
        *self.duration_ms.lock().unwrap()
    }

    async fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    async fn release(&self) -> Result<()> {
        self.record(EngineCall::Release);
        Ok(())
    }

    fn take_events(&self) -> Option<mpsc::UnboundedReceiver<EngineEvent>> {
        self.events_rx.lock().unwrap().take()
    }
}
