//! Bounded, cancellable position watch

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::domain::{LocationReading, WatchId};
use crate::errors::{LocationError, LocationErrorKind, LocationResult};

use super::traits::GeolocationProvider;

/// Why a watch stopped delivering readings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEnd {
    /// A reading met the accuracy target
    Accurate,
    /// The watch deadline passed
    TimedOut,
    /// [`WatchHandle::cancel`] was called
    Cancelled,
    /// The device reported an error
    DeviceError,
    /// The device closed the stream
    Closed,
    /// The watch was dropped before finishing
    Dropped,
}

impl fmt::Display for WatchEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::Accurate => "accurate",
            Self::TimedOut => "timed_out",
            Self::Cancelled => "cancelled",
            Self::DeviceError => "device_error",
            Self::Closed => "closed",
            Self::Dropped => "dropped",
        };
        f.write_str(reason)
    }
}

struct HandleInner {
    device: Arc<dyn GeolocationProvider>,
    watch_id: WatchId,
    /// `Some` while the device subscription is live
    end: Mutex<Option<WatchEnd>>,
    released: watch::Sender<bool>,
}

/// Shared cancellation handle for one device subscription
///
/// Releasing is idempotent: the device sees exactly one `clear_watch`
/// no matter how many clones cancel or which exit path runs first.
#[derive(Clone)]
pub struct WatchHandle {
    inner: Arc<HandleInner>,
}

impl WatchHandle {
    pub(crate) fn new(device: Arc<dyn GeolocationProvider>, watch_id: WatchId) -> Self {
        let (released, _) = watch::channel(false);
        Self {
            inner: Arc::new(HandleInner {
                device,
                watch_id,
                end: Mutex::new(None),
                released,
            }),
        }
    }

    pub fn watch_id(&self) -> WatchId {
        self.inner.watch_id
    }

    /// Stop the watch; later calls are no-ops
    ///
    /// Returns `true` if this call released the subscription.
    pub fn cancel(&self) -> bool {
        self.release(WatchEnd::Cancelled)
    }

    pub fn is_released(&self) -> bool {
        *self.inner.released.borrow()
    }

    /// Reason the subscription was released, if it was
    pub fn end_reason(&self) -> Option<WatchEnd> {
        *self.lock_end()
    }

    pub(crate) fn release(&self, reason: WatchEnd) -> bool {
        {
            let mut end = self.lock_end();
            if end.is_some() {
                return false;
            }
            *end = Some(reason);
        }

        self.inner.device.clear_watch(self.inner.watch_id);
        self.inner.released.send_replace(true);
        info!(
            watch_id = %self.inner.watch_id,
            reason = %reason,
            event = "location_watch_released",
            "Location watch released"
        );
        true
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.inner.released.subscribe()
    }

    fn lock_end(&self) -> std::sync::MutexGuard<'_, Option<WatchEnd>> {
        self.inner
            .end
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchHandle")
            .field("watch_id", &self.inner.watch_id)
            .field("end", &self.end_reason())
            .finish()
    }
}

enum Step {
    Released,
    Deadline,
    Update(Option<Result<LocationReading, LocationError>>),
}

/// Sequence of readings from a device watch
///
/// Ends after the first reading under the accuracy target (which is still
/// yielded), at the deadline, on cancel, after yielding a device error, or
/// when the device closes the stream. Dropping the watch releases it.
///
/// The deadline is enforced by a background task, so the subscription is
/// released on time even when nobody polls [`next`](Self::next).
pub struct LocationWatch {
    handle: WatchHandle,
    deadline_task: JoinHandle<()>,
    updates: mpsc::UnboundedReceiver<Result<LocationReading, LocationError>>,
    released: watch::Receiver<bool>,
    deadline: Instant,
    timeout: Duration,
    good_enough_meters: f64,
}

impl LocationWatch {
    pub(crate) fn new(
        handle: WatchHandle,
        updates: mpsc::UnboundedReceiver<Result<LocationReading, LocationError>>,
        timeout: Duration,
        good_enough_meters: f64,
    ) -> Self {
        let released = handle.subscribe();
        let deadline = Instant::now() + timeout;
        let deadline_task = spawn_deadline(handle.clone(), deadline);
        Self {
            handle,
            deadline_task,
            updates,
            released,
            deadline,
            timeout,
            good_enough_meters,
        }
    }

    /// Cancellation handle usable from other tasks
    pub fn handle(&self) -> WatchHandle {
        self.handle.clone()
    }

    pub fn cancel(&self) -> bool {
        self.handle.cancel()
    }

    pub fn end_reason(&self) -> Option<WatchEnd> {
        self.handle.end_reason()
    }

    /// Next reading, or `None` once the watch has ended
    pub async fn next(&mut self) -> Option<LocationResult<LocationReading>> {
        if self.handle.is_released() {
            return None;
        }

        let step = tokio::select! {
            biased;
            _ = self.released.changed() => Step::Released,
            _ = tokio::time::sleep_until(self.deadline) => Step::Deadline,
            update = self.updates.recv() => Step::Update(update),
        };

        match step {
            Step::Released => None,
            Step::Deadline => {
                self.handle.release(WatchEnd::TimedOut);
                None
            }
            Step::Update(None) => {
                self.handle.release(WatchEnd::Closed);
                None
            }
            Step::Update(Some(Ok(reading))) => {
                if reading.is_good_enough(self.good_enough_meters) {
                    self.handle.release(WatchEnd::Accurate);
                }
                Some(Ok(reading))
            }
            Step::Update(Some(Err(error))) => {
                self.handle.release(WatchEnd::DeviceError);
                Some(Err(error))
            }
        }
    }

    /// Drain the watch and keep the most accurate reading
    ///
    /// A device error after at least one reading is logged and the best
    /// reading so far is returned.
    pub async fn best_reading(mut self) -> LocationResult<LocationReading> {
        let mut best: Option<LocationReading> = None;

        while let Some(update) = self.next().await {
            match update {
                Ok(reading) => {
                    if best.map_or(true, |b| reading.accuracy_meters < b.accuracy_meters) {
                        best = Some(reading);
                    }
                }
                Err(error) => match best {
                    Some(_) => {
                        warn!(
                            kind = %error.kind,
                            error = %error.message,
                            event = "location_watch_error",
                            "Watch failed after readings; keeping best reading"
                        );
                    }
                    None => return Err(error),
                },
            }
        }

        best.ok_or_else(|| match self.end_reason() {
            Some(WatchEnd::TimedOut) | None => LocationError::timeout(self.timeout),
            Some(reason) => LocationError::new(
                LocationErrorKind::Unknown,
                format!("Watch ended ({}) without a reading", reason),
            ),
        })
    }
}

impl Drop for LocationWatch {
    fn drop(&mut self) {
        self.handle.release(WatchEnd::Dropped);
        self.deadline_task.abort();
    }
}

/// Release `handle` at `deadline` unless something else releases it first
fn spawn_deadline(handle: WatchHandle, deadline: Instant) -> JoinHandle<()> {
    let mut released = handle.subscribe();
    tokio::spawn(async move {
        tokio::select! {
            _ = released.changed() => {}
            _ = tokio::time::sleep_until(deadline) => {
                handle.release(WatchEnd::TimedOut);
            }
        }
    })
}
