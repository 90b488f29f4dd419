use crate::EngineEvent;

/// Receives engine results. Called from runtime worker threads.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}
