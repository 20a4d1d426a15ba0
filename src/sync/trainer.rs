// ABOUTME: Trainer trait - receives the filtered training set.
// ABOUTME: Training outcome is the trainer's business, not the cycle's.

use async_trait::async_trait;

use crate::records::TrainingSet;

/// Consumes a filtered training set.
#[async_trait]
pub trait Trainer: Send + Sync {
    async fn train(&self, set: TrainingSet);
}
