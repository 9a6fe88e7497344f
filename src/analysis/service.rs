//! Cached, cancellable analysis service
//!
//! Wraps the pure [`analyze_samples`](crate::analyze_samples) pipeline with a
//! bounded memo cache and per-key in-flight deduplication: when two callers
//! request the same key concurrently, the second waits on a condition
//! variable for the first one's result instead of recomputing (and instead of
//! polling a flag in a sleep loop).
//!
//! Cancellation is cooperative: the pipeline checks its token between stages
//! and a cancelled run returns [`AnalysisError::Cancelled`] without ever
//! writing a partial result into the cache.

use crate::analysis::cache::{CacheKey, MemoCache};
use crate::analysis::result::TrackAnalysis;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

/// Cooperative cancellation flag shared between a requester and its analysis
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token in the not-cancelled state
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; in-flight work observes it at its next check
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` when the token has been cancelled
    pub fn check(&self) -> Result<(), AnalysisError> {
        if self.is_cancelled() {
            Err(AnalysisError::Cancelled)
        } else {
            Ok(())
        }
    }
}

enum SlotState {
    Running,
    Finished(TrackAnalysis),
    Failed,
}

struct InFlightSlot {
    state: Mutex<SlotState>,
    done: Condvar,
}

/// Analysis service with an injected bounded cache
pub struct AnalysisService {
    config: AnalysisConfig,
    cache: Mutex<MemoCache>,
    in_flight: Mutex<HashMap<CacheKey, Arc<InFlightSlot>>>,
}

impl AnalysisService {
    /// Create a service around an explicitly constructed cache
    pub fn new(config: AnalysisConfig, cache: MemoCache) -> Self {
        Self {
            config,
            cache: Mutex::new(cache),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Analyze with memoization and in-flight deduplication
    ///
    /// Cache hits return immediately. Otherwise the first caller for a key
    /// runs the pipeline while later callers for the same key block until it
    /// finishes; if the leader fails or is cancelled, a waiter takes over.
    ///
    /// # Errors
    ///
    /// Propagates pipeline errors and returns `Cancelled` when `token` is
    /// cancelled. Results of cancelled or failed runs are never cached.
    pub fn analyze_cached(
        &self,
        key: &CacheKey,
        samples: &[f32],
        sample_rate: u32,
        token: &CancellationToken,
    ) -> Result<TrackAnalysis, AnalysisError> {
        loop {
            token.check()?;

            if let Some(hit) = lock(&self.cache).get(key) {
                log::debug!("Memo cache hit for {:?}", key);
                return Ok(hit);
            }

            let (slot, is_leader) = {
                let mut in_flight = lock(&self.in_flight);
                match in_flight.get(key) {
                    Some(slot) => (Arc::clone(slot), false),
                    None => {
                        let slot = Arc::new(InFlightSlot {
                            state: Mutex::new(SlotState::Running),
                            done: Condvar::new(),
                        });
                        in_flight.insert(key.clone(), Arc::clone(&slot));
                        (slot, true)
                    }
                }
            };

            if is_leader {
                let result =
                    crate::analyze_samples_cancellable(samples, sample_rate, &self.config, token);

                {
                    let mut state = lock(&slot.state);
                    *state = match &result {
                        Ok(analysis) => SlotState::Finished(analysis.clone()),
                        Err(_) => SlotState::Failed,
                    };
                    slot.done.notify_all();
                }
                lock(&self.in_flight).remove(key);

                if let Ok(analysis) = &result {
                    lock(&self.cache).insert(key.clone(), analysis.clone());
                }
                return result;
            }

            // Follower: wait for the leader's outcome
            let mut state = lock(&slot.state);
            while matches!(*state, SlotState::Running) {
                state = slot
                    .done
                    .wait(state)
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
            }
            match &*state {
                SlotState::Finished(analysis) => return Ok(analysis.clone()),
                // Leader failed or was cancelled; retry as the new leader
                SlotState::Failed => continue,
                SlotState::Running => unreachable!("condvar loop exited while running"),
            }
        }
    }

    /// Number of memoized results
    pub fn cache_len(&self) -> usize {
        lock(&self.cache).len()
    }

    /// Manually clear the memo cache
    pub fn clear_cache(&self) {
        lock(&self.cache).clear();
    }
}

/// Lock a mutex, recovering the guard when a panicking holder poisoned it
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
