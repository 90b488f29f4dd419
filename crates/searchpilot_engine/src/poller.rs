use std::sync::Arc;
use std::time::Duration;

use pilot_logging::{pilot_debug, pilot_info};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::{ControlApi, EngineEvent, EventSink, Generation};

/// Polls job status every `period` until `cancel` fires.
///
/// The first tick is immediate. Failed ticks are skipped without an event;
/// the next period simply tries again. A request in flight when `cancel`
/// fires is allowed to finish, but its result is dropped. Callers must still
/// check the generation because an earlier event may already be queued.
pub async fn poll_status(
    api: Arc<dyn ControlApi>,
    generation: Generation,
    period: Duration,
    sink: Arc<dyn EventSink>,
    cancel: CancellationToken,
) {
    pilot_info!("Poller generation {} started ({:?})", generation, period);
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let result = api.status().await;
        if cancel.is_cancelled() {
            pilot_debug!("Dropping status that arrived after generation {} stopped", generation);
            break;
        }
        match result {
            Ok(status) => sink.emit(EngineEvent::StatusPolled { generation, status }),
            Err(err) => pilot_debug!("Poll tick missed (generation {}): {}", generation, err),
        }
    }
    pilot_info!("Poller generation {} stopped", generation);
}
