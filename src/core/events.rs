use crate::core::{PipelineEvent, PipelineObserver};
use std::sync::Mutex;

/// Turns pipeline events into `tracing` log lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_event(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::ValidatorRegistered {
                processor,
                validator,
            } => tracing::debug!("🔧 {}: Added validator {}", processor, validator),
            PipelineEvent::TransformerRegistered {
                processor,
                transformer,
            } => tracing::debug!("🔧 {}: Added transformer {}", processor, transformer),
            PipelineEvent::RunStarted {
                processor,
                total_records,
            } => tracing::info!("🚀 {}: Starting processing of {} records", processor, total_records),
            PipelineEvent::RecordRejected {
                processor,
                index,
                validator,
                reason,
            } => tracing::debug!("⚠️ {}: Record {} rejected by {}: {}", processor, index, validator, reason),
            PipelineEvent::ValidationFailed {
                processor,
                failed_records,
            } => tracing::error!("❌ {}: Validation failed for {} records", processor, failed_records),
            PipelineEvent::TransformerApplied {
                processor,
                transformer,
                output_records,
            } => tracing::info!(
                "🔄 {}: Applied {} ({} records)",
                processor,
                transformer,
                output_records
            ),
            PipelineEvent::RunSucceeded {
                processor,
                processed_records,
            } => tracing::info!("✅ {}: Successfully processed {} records", processor, processed_records),
            PipelineEvent::RunFailed { processor, error } => {
                tracing::error!("❌ {}: {}", processor, error)
            }
        }
    }
}

/// Keeps every event in memory, for audit trails.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<PipelineEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|events| events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PipelineObserver for EventLog {
    fn on_event(&self, event: &PipelineEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

impl<T: PipelineObserver + ?Sized> PipelineObserver for std::sync::Arc<T> {
    fn on_event(&self, event: &PipelineEvent) {
        (**self).on_event(event)
    }
}
