// ABOUTME: SyncDriver - runs one training-data synchronization cycle.
// ABOUTME: Fetches records, agrees on a cutoff, filters, and hands off to training.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;
use tracing::{debug, error, info, trace};

use super::{RecordSource, Trainer};
use crate::cutoff::{ConsensusCoordinator, CutoffState};
use crate::error::{FetchError, SyncError};
use crate::records;

/// Drives synchronization cycles, one at a time.
pub struct SyncDriver {
    source: Arc<dyn RecordSource>,
    coordinator: ConsensusCoordinator,
    trainer: Arc<dyn Trainer>,
    cycle: Mutex<()>,
    ready: AtomicBool,
}

impl SyncDriver {
    /// Create a driver from its collaborators.
    pub fn new(
        source: Arc<dyn RecordSource>,
        coordinator: ConsensusCoordinator,
        trainer: Arc<dyn Trainer>,
    ) -> Self {
        Self {
            source,
            coordinator,
            trainer,
            cycle: Mutex::new(()),
            ready: AtomicBool::new(false),
        }
    }

    /// The cutoff state shared with the coordinator.
    pub fn state(&self) -> &Arc<CutoffState> {
        self.coordinator.state()
    }

    /// Whether at least one cycle has handed data to the trainer.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Run one cycle and return how many records were handed to the trainer.
    ///
    /// A fetch failure aborts before the cutoff is touched. Concurrent calls
    /// wait for the running cycle to finish.
    pub async fn run(&self) -> Result<u64, SyncError> {
        let _cycle = self.cycle.lock().await;

        trace!("Retrieving data objects from persistence");
        let fetched = async {
            let items = self.source.order_items().await?;
            trace!(count = items.len(), "Retrieved order items");
            let orders = self.source.orders().await?;
            trace!(count = orders.len(), "Retrieved orders");
            Ok::<_, FetchError>((items, orders))
        }
        .await;

        let (items, orders) = match fetched {
            Ok(fetched) => fetched,
            Err(e) => {
                error!(error = %e, "Retrieving training data failed");
                return Err(e.into());
            }
        };

        let reconciliation = self.coordinator.reconcile(&orders).await?;
        let fetched_count = items.len() + orders.len();
        let set = records::filter(items, orders, reconciliation.cutoff)?;
        let count = set.len() as u64;
        debug!(
            fetched = fetched_count,
            kept = count,
            cutoff = ?reconciliation.cutoff,
            "Filtered training data"
        );

        self.trainer.train(set).await;
        self.ready.store(true, Ordering::Release);
        info!(records = count, "Finished training, ready for recommendation");

        Ok(count)
    }
}
