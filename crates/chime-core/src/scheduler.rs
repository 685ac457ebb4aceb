use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::error::SchedulingDeclined;
use crate::models::{EventId, ReminderRequest};

/// Wall-clock source, epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now_millis(&self) -> i64 {
        (**self).now_millis()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn new(millis: i64) -> Self {
        Self {
            millis: AtomicI64::new(millis),
        }
    }

    pub fn set_millis(&self, millis: i64) {
        self.millis.store(millis, Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        let by = i64::try_from(by.as_millis()).unwrap_or(i64::MAX);
        self.millis.fetch_add(by, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}

/// One-shot wake-up facility keyed by event id.
///
/// Setting a wake-up for an id that already has one replaces it; an id never
/// has more than one pending wake-up.
pub trait TimerService: Send + Sync {
    fn set_exact(&self, event_id: EventId, deadline: Instant) -> Result<(), SchedulingDeclined>;

    /// Returns whether a pending wake-up was removed.
    fn cancel(&self, event_id: EventId) -> bool;

    /// Wake-ups registered and not yet cancelled.
    fn pending(&self) -> usize;
}

/// Timer service backed by tokio sleeps. Each expiry sends the event id
/// through the channel returned by [`TokioTimerService::new`].
#[derive(Debug)]
pub struct TokioTimerService {
    timers: Mutex<HashMap<EventId, JoinHandle<()>>>,
    fired: mpsc::UnboundedSender<EventId>,
}

impl TokioTimerService {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<EventId>) {
        let (fired, receiver) = mpsc::unbounded_channel();
        let service = Self {
            timers: Mutex::new(HashMap::new()),
            fired,
        };
        (service, receiver)
    }

    fn timers(&self) -> MutexGuard<'_, HashMap<EventId, JoinHandle<()>>> {
        self.timers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TimerService for TokioTimerService {
    fn set_exact(&self, event_id: EventId, deadline: Instant) -> Result<(), SchedulingDeclined> {
        if self.fired.is_closed() {
            return Err(SchedulingDeclined::ReceiverClosed(event_id));
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| SchedulingDeclined::NoRuntime(event_id))?;

        let sender = self.fired.clone();
        let task = runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            // Receiver gone means nobody is listening any more.
            let _ = sender.send(event_id);
        });

        if let Some(previous) = self.timers().insert(event_id, task) {
            previous.abort();
        }
        Ok(())
    }

    fn cancel(&self, event_id: EventId) -> bool {
        match self.timers().remove(&event_id) {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }

    fn pending(&self) -> usize {
        self.timers().len()
    }
}

impl Drop for TokioTimerService {
    fn drop(&mut self) {
        for (_, task) in self.timers().drain() {
            task.abort();
        }
    }
}

// Deadline used when the requested delay overflows the monotonic clock.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// AlarmScheduler: turns an absolute fire time into a monotonic one-shot wake-up.
#[derive(Debug)]
pub struct AlarmScheduler<T, C> {
    timer: T,
    clock: C,
}

impl<T: TimerService, C: Clock> AlarmScheduler<T, C> {
    pub fn new(timer: T, clock: C) -> Self {
        Self { timer, clock }
    }

    /// Registers a wake-up for `request`.
    ///
    /// # Returns
    /// * `Ok(true)` - The wake-up was handed to the timer service
    /// * `Ok(false)` - The fire time is not in the future; the request is dropped
    /// * `Err(SchedulingDeclined)` - The timer service refused the request
    pub fn schedule(&self, request: ReminderRequest) -> Result<bool, SchedulingDeclined> {
        let delay_ms = request.fire_at.saturating_mul(1000) - self.clock.now_millis();
        if delay_ms <= 0 {
            debug!(
                event_id = request.event_id,
                fire_at = request.fire_at,
                "dropping reminder that is already due"
            );
            return Ok(false);
        }

        let delay = Duration::from_millis(delay_ms.unsigned_abs());
        let now = Instant::now();
        let deadline = now.checked_add(delay).unwrap_or_else(|| now + FAR_FUTURE);
        self.timer.set_exact(request.event_id, deadline)?;
        info!(
            event_id = request.event_id,
            fire_at = request.fire_at,
            delay_secs = delay.as_secs(),
            "scheduled reminder"
        );
        Ok(true)
    }

    pub fn cancel(&self, event_id: EventId) -> bool {
        self.timer.cancel(event_id)
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct RecordingTimer {
        set: Mutex<Vec<(EventId, Instant)>>,
    }

    impl TimerService for RecordingTimer {
        fn set_exact(&self, event_id: EventId, deadline: Instant) -> Result<(), SchedulingDeclined> {
            self.set.lock().unwrap().push((event_id, deadline));
            Ok(())
        }

        fn cancel(&self, event_id: EventId) -> bool {
            let mut set = self.set.lock().unwrap();
            let before = set.len();
            set.retain(|(id, _)| *id != event_id);
            set.len() != before
        }

        fn pending(&self) -> usize {
            self.set.lock().unwrap().len()
        }
    }

    mod alarm_scheduler_tests {
        use super::*;

        #[test]
        fn test_past_and_present_requests_are_dropped() {
            let clock = ManualClock::new(1_000_000);
            let scheduler = AlarmScheduler::new(RecordingTimer::default(), clock);

            let now = ReminderRequest { event_id: 1, fire_at: 1_000 };
            let past = ReminderRequest { event_id: 2, fire_at: 999 };
            assert_eq!(scheduler.schedule(now), Ok(false));
            assert_eq!(scheduler.schedule(past), Ok(false));
            assert_eq!(scheduler.timer().pending(), 0);
        }

        #[test]
        fn test_future_request_uses_monotonic_deadline() {
            let clock = ManualClock::new(1_000_500);
            let scheduler = AlarmScheduler::new(RecordingTimer::default(), clock);
            let before = Instant::now();

            let request = ReminderRequest { event_id: 7, fire_at: 1_060 };
            assert_eq!(scheduler.schedule(request), Ok(true));

            let set = scheduler.timer().set.lock().unwrap();
            assert_eq!(set.len(), 1);
            let (id, deadline) = set[0];
            assert_eq!(id, 7);
            let delay = deadline.duration_since(before);
            assert!(delay >= Duration::from_millis(59_500));
            assert!(delay < Duration::from_millis(60_500));
        }

        #[test]
        fn test_cancel_forwards() {
            let scheduler = AlarmScheduler::new(RecordingTimer::default(), ManualClock::new(0));
            scheduler
                .schedule(ReminderRequest { event_id: 3, fire_at: 10 })
                .unwrap();
            assert!(scheduler.cancel(3));
            assert!(!scheduler.cancel(3));
        }
    }

    mod tokio_timer_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_replacing_a_wakeup_keeps_one_per_event() {
            let (timers, mut fired) = TokioTimerService::new();
            let start = Instant::now();

            timers.set_exact(1, start + Duration::from_secs(60)).unwrap();
            timers.set_exact(1, start + Duration::from_secs(120)).unwrap();
            timers.set_exact(2, start + Duration::from_secs(90)).unwrap();
            assert_eq!(timers.pending(), 2);

            assert_eq!(fired.recv().await, Some(2));
            assert!(Instant::now() >= start + Duration::from_secs(90));
            assert_eq!(fired.recv().await, Some(1));
            assert!(Instant::now() >= start + Duration::from_secs(120));
        }

        #[tokio::test(start_paused = true)]
        async fn test_cancelled_wakeup_never_fires() {
            let (timers, mut fired) = TokioTimerService::new();
            timers
                .set_exact(5, Instant::now() + Duration::from_secs(30))
                .unwrap();
            assert!(timers.cancel(5));
            assert_eq!(timers.pending(), 0);

            let waited = tokio::time::timeout(Duration::from_secs(600), fired.recv()).await;
            assert!(waited.is_err());
        }

        #[test]
        fn test_declines_without_runtime() {
            let (timers, _fired) = TokioTimerService::new();
            let result = timers.set_exact(9, Instant::now() + Duration::from_secs(1));
            assert_eq!(result, Err(SchedulingDeclined::NoRuntime(9)));
        }

        #[tokio::test]
        async fn test_declines_when_receiver_dropped() {
            let (timers, fired) = TokioTimerService::new();
            drop(fired);
            let result = timers.set_exact(4, Instant::now() + Duration::from_secs(1));
            assert_eq!(result, Err(SchedulingDeclined::ReceiverClosed(4)));
        }
    }
}
