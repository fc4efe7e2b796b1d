//! Concurrent fan-out / fan-in of independent upstream lookups.
//!
//! [`Aggregator::resolve_all`] spawns one task per reference, waits for every
//! task to finish, and yields either every resolved item or a single
//! [`AggregationError`]. A batch is all-or-nothing: when any lookup fails the
//! items resolved by the other lookups are dropped.
//!
//! Tasks hand their results back through the [`JoinSet`], so the collected
//! items are only ever touched by the caller. Items are returned in completion
//! order; callers that display them must sort.

use crate::error::{AggregationError, UpstreamError};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Runs batches of upstream lookups with a cap on how many are in flight.
#[derive(Debug, Clone)]
pub struct Aggregator {
    max_in_flight: usize,
}

impl Aggregator {
    /// `max_in_flight` bounds concurrent lookups within one batch. Zero is
    /// treated as one.
    pub fn new(max_in_flight: usize) -> Self {
        Self {
            max_in_flight: max_in_flight.max(1),
        }
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Resolve every reference concurrently.
    ///
    /// The resolver is called exactly once per reference. All lookups run to
    /// completion even after one has failed. The first failure observed is
    /// returned; later ones are only logged.
    ///
    /// Dropping the returned future aborts lookups still in flight.
    pub async fn resolve_all<R, T, F, Fut>(
        &self,
        references: Vec<R>,
        resolver: F,
    ) -> Result<Vec<T>, AggregationError>
    where
        R: Send + 'static,
        T: Send + 'static,
        F: Fn(R) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, UpstreamError>> + Send + 'static,
    {
        let total = references.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        tracing::debug!(total, max_in_flight = self.max_in_flight, "resolving references");

        let resolver = Arc::new(resolver);
        let permits = Arc::new(Semaphore::new(self.max_in_flight));
        let mut join_set = JoinSet::new();

        for reference in references {
            let resolver = resolver.clone();
            let permits = permits.clone();

            join_set.spawn(async move {
                // The semaphore is never closed, so acquisition only fails if
                // that invariant is broken.
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|e| UpstreamError::Invalid(format!("lookup limiter closed: {}", e)))?;
                resolver(reference).await
            });
        }

        let mut resolved = Vec::with_capacity(total);
        let mut first_error = None;
        let mut failed = 0;

        while let Some(joined) = join_set.join_next().await {
            let result = joined.unwrap_or_else(|e| {
                Err(UpstreamError::Invalid(format!("lookup task failed: {}", e)))
            });

            match result {
                Ok(item) => resolved.push(item),
                Err(e) => {
                    failed += 1;
                    if first_error.is_none() {
                        first_error = Some(e);
                    } else {
                        tracing::warn!(error = %e, "additional lookup failure in batch");
                    }
                }
            }
        }

        match first_error {
            None => Ok(resolved),
            Some(first) => {
                tracing::error!(
                    failed,
                    total,
                    discarded = resolved.len(),
                    error = %first,
                    "lookup batch failed"
                );
                Err(AggregationError {
                    failed,
                    total,
                    first,
                })
            }
        }
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(16)
    }
}
