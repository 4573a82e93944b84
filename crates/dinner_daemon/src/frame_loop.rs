use crate::state::AppState;
use std::time::Duration;

/// ~60 fps.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Feeds animation frames to the controller while a spin is in flight.
/// Idle ticks only check the flag.
pub async fn run_frame_loop(app: AppState) {
    let mut interval = tokio::time::interval(FRAME_INTERVAL);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        interval.tick().await;
        let mut controller = app.controller.lock();
        if controller.is_spinning() {
            controller.on_frame(app.started.elapsed());
        }
    }
}
