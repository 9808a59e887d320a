//! Simulated device geolocation
//!
//! Replays scripted fixes with real (tokio) delays. One-shot requests pop
//! from a queue; each watch replays the watch script from its own task,
//! which `clear_watch` aborts.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use civic_core::domain::{LocationReading, PositionOptions, WatchId};
use civic_core::errors::{LocationError, LocationErrorKind};
use civic_core::services::{GeolocationProvider, PositionSink};
use civic_shared::Coordinate;
use tokio::task::JoinHandle;
use tracing::debug;

/// One scripted device answer delivered after `delay`
#[derive(Debug, Clone)]
pub struct SimulatedFix {
    pub delay: Duration,
    pub outcome: Result<(Coordinate, f64), LocationErrorKind>,
}

impl SimulatedFix {
    pub fn reading(delay: Duration, coordinate: Coordinate, accuracy_meters: f64) -> Self {
        Self {
            delay,
            outcome: Ok((coordinate, accuracy_meters)),
        }
    }

    pub fn error(delay: Duration, kind: LocationErrorKind) -> Self {
        Self {
            delay,
            outcome: Err(kind),
        }
    }

    fn into_result(self) -> Result<LocationReading, LocationError> {
        match self.outcome {
            Ok((coordinate, accuracy)) => Ok(LocationReading::new(
                coordinate.latitude,
                coordinate.longitude,
                accuracy,
            )),
            Err(kind) => Err(LocationError::new(kind, format!("simulated {}", kind))),
        }
    }
}

/// Scripted stand-in for a device geolocation API
#[derive(Default)]
pub struct SimulatedGeolocation {
    fixes: Mutex<VecDeque<SimulatedFix>>,
    watch_script: Vec<SimulatedFix>,
    watches: Mutex<HashMap<WatchId, JoinHandle<()>>>,
    next_watch_id: Mutex<u64>,
    requests: Mutex<Vec<PositionOptions>>,
    clear_calls: Mutex<u32>,
}

impl SimulatedGeolocation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers for successive one-shot requests
    pub fn with_fixes<I>(mut self, fixes: I) -> Self
    where
        I: IntoIterator<Item = SimulatedFix>,
    {
        self.fixes = Mutex::new(fixes.into_iter().collect());
        self
    }

    /// Updates replayed by every watch; delays are relative to the previous update
    pub fn with_watch_script<I>(mut self, script: I) -> Self
    where
        I: IntoIterator<Item = SimulatedFix>,
    {
        self.watch_script = script.into_iter().collect();
        self
    }

    /// Every request and watch fails with permission denied
    pub fn permission_denied() -> Self {
        let denied = SimulatedFix::error(Duration::ZERO, LocationErrorKind::PermissionDenied);
        Self::new()
            .with_fixes(std::iter::repeat(denied.clone()).take(16))
            .with_watch_script([denied])
    }

    /// Options of every one-shot request, in order
    pub fn requests(&self) -> Vec<PositionOptions> {
        lock(&self.requests).clone()
    }

    pub fn clear_calls(&self) -> u32 {
        *lock(&self.clear_calls)
    }

    /// Watches whose task is still registered
    pub fn active_watches(&self) -> usize {
        lock(&self.watches).len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl GeolocationProvider for SimulatedGeolocation {
    async fn current_position(
        &self,
        options: PositionOptions,
    ) -> Result<LocationReading, LocationError> {
        lock(&self.requests).push(options);
        let fix = lock(&self.fixes).pop_front();

        match fix {
            Some(fix) => {
                tokio::time::sleep(fix.delay).await;
                fix.into_result()
            }
            None => Err(LocationError::new(
                LocationErrorKind::PositionUnavailable,
                "No simulated fix available",
            )),
        }
    }

    async fn watch_position(
        &self,
        _options: PositionOptions,
        sink: PositionSink,
    ) -> Result<WatchId, LocationError> {
        let id = {
            let mut next = lock(&self.next_watch_id);
            *next += 1;
            WatchId(*next)
        };

        let script = self.watch_script.clone();
        let task = tokio::spawn(async move {
            for fix in script {
                tokio::time::sleep(fix.delay).await;
                if sink.send(fix.into_result()).is_err() {
                    return;
                }
            }
            // Keep the stream open like a device that has nothing new to report
            sink.closed().await;
        });

        lock(&self.watches).insert(id, task);
        debug!(watch_id = %id, "Simulated watch started");
        Ok(id)
    }

    fn clear_watch(&self, id: WatchId) {
        *lock(&self.clear_calls) += 1;
        if let Some(task) = lock(&self.watches).remove(&id) {
            task.abort();
        }
    }
}
