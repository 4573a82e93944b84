use dinner_control::{Controller, Notice, RenderSurface, ViewModel, VoteSheet};
use dinner_core::wheel::{WheelLayout, WheelSegment};
use parking_lot::Mutex;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::broadcast;

/// Everything the controller draws, as pushed to stream subscribers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SurfaceEvent {
    View(ViewModel),
    Notice {
        text: String,
        notice: Notice,
    },
    Vote(VoteSheet),
    Wheel {
        segments: Vec<WheelSegment>,
    },
    SpinFrame {
        rotation_deg: f64,
    },
    CloseModal,
}

pub type EventTx = broadcast::Sender<SurfaceEvent>;

/// Forwards surface calls to the broadcast channel. Having no subscribers is fine.
pub struct BroadcastSurface {
    tx: EventTx,
}

impl BroadcastSurface {
    pub fn new(tx: EventTx) -> Self {
        Self { tx }
    }

    fn send(&self, event: SurfaceEvent) {
        let _ = self.tx.send(event);
    }
}

impl RenderSurface for BroadcastSurface {
    fn render(&mut self, view: &ViewModel) {
        self.send(SurfaceEvent::View(view.clone()));
    }

    fn notice(&mut self, notice: &Notice) {
        self.send(SurfaceEvent::Notice {
            text: notice.to_string(),
            notice: notice.clone(),
        });
    }

    fn show_vote(&mut self, sheet: &VoteSheet) {
        self.send(SurfaceEvent::Vote(sheet.clone()));
    }

    fn show_wheel(&mut self, layout: &WheelLayout) {
        self.send(SurfaceEvent::Wheel {
            segments: layout.segments.clone(),
        });
    }

    fn spin_frame(&mut self, rotation_deg: f64) {
        self.send(SurfaceEvent::SpinFrame { rotation_deg });
    }

    fn close_modal(&mut self) {
        self.send(SurfaceEvent::CloseModal);
    }
}

pub type DinnerController = Controller<BroadcastSurface, ChaCha8Rng>;
pub type SharedController = Arc<Mutex<DinnerController>>;

#[derive(Clone)]
pub struct AppState {
    pub controller: SharedController,
    pub event_tx: EventTx,
    pub seed: u64,
    /// Origin for the monotonic frame clock.
    pub started: Instant,
}
