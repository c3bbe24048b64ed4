use std::sync::Arc;

use engine_logging::{engine_error, engine_info};
use schedule_core::{NotifiableSet, SourceId};
use tokio::sync::mpsc;

use crate::dispatch::{DispatchError, NotificationStrategy};
use crate::reader::SourceReader;
use crate::store::SnapshotStore;
use crate::worker::{Clock, Outcome, SourceWorker};

/// What one run did, for logs and callers that want to look.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub checked: usize,
    pub unchanged: usize,
    pub failed: Vec<SourceId>,
    pub notified: Vec<SourceId>,
    pub deliveries: Vec<Result<(), DispatchError>>,
}

impl RunSummary {
    pub fn delivery_failures(&self) -> usize {
        self.deliveries.iter().filter(|r| r.is_err()).count()
    }
}

/// Checks every source in parallel, then hands the new slots to one strategy.
pub struct Orchestrator {
    worker: SourceWorker,
    strategy: Box<dyn NotificationStrategy>,
}

impl Orchestrator {
    pub fn new(
        reader: Arc<dyn SourceReader>,
        store: Arc<dyn SnapshotStore>,
        strategy: Box<dyn NotificationStrategy>,
    ) -> Self {
        Self {
            worker: SourceWorker::new(reader, store),
            strategy,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.worker = self.worker.with_clock(clock);
        self
    }

    /// Never fails; per-source and per-delivery errors end up in the log and the summary.
    pub async fn run(&self, source_ids: &[SourceId]) -> RunSummary {
        let outcomes = self.collect_outcomes(source_ids).await;

        let mut summary = RunSummary {
            checked: source_ids.len(),
            ..RunSummary::default()
        };
        let mut unaccounted: Vec<&SourceId> = source_ids.iter().collect();
        let mut notifiable: Vec<NotifiableSet> = Vec::new();
        for outcome in outcomes {
            if let Some(pos) = unaccounted.iter().position(|id| *id == outcome.source_id()) {
                unaccounted.remove(pos);
            }
            match outcome {
                // The worker already logged why.
                Outcome::Failed { source_id, .. } => summary.failed.push(source_id),
                Outcome::NoChange { .. } => summary.unchanged += 1,
                Outcome::Notifiable(set) => {
                    summary.notified.push(set.source.id.clone());
                    notifiable.push(set);
                }
            }
        }
        // A worker task that panicked never sent its outcome.
        for source_id in unaccounted {
            engine_error!("source={} check ended without an outcome", source_id);
            summary.failed.push(source_id.clone());
        }

        if notifiable.is_empty() {
            engine_info!(
                "run finished checked={} unchanged={} failed={} nothing to notify",
                summary.checked,
                summary.unchanged,
                summary.failed.len()
            );
            return summary;
        }

        summary.deliveries = self.strategy.dispatch(notifiable).await;
        engine_info!(
            "run finished checked={} unchanged={} failed={} notified={} via={} delivery_failures={}",
            summary.checked,
            summary.unchanged,
            summary.failed.len(),
            summary.notified.len(),
            self.strategy.name(),
            summary.delivery_failures()
        );
        summary
    }

    /// Fan out one task per id and wait for all of them, in completion order.
    async fn collect_outcomes(&self, source_ids: &[SourceId]) -> Vec<Outcome> {
        let expected = source_ids.len();
        let (tx, mut rx) = mpsc::channel(expected.max(1));

        for source_id in source_ids {
            let tx = tx.clone();
            let worker = self.worker.clone();
            let source_id = source_id.clone();
            tokio::spawn(async move {
                let outcome = worker.process(&source_id).await;
                // Capacity covers every worker, so this never waits on the receiver.
                let _ = tx.send(outcome).await;
            });
        }
        drop(tx);

        let mut outcomes = Vec::with_capacity(expected);
        for _ in 0..expected {
            // `None` once every sender is gone, including those of panicked tasks.
            match rx.recv().await {
                Some(outcome) => outcomes.push(outcome),
                None => break,
            }
        }
        outcomes
    }
}
