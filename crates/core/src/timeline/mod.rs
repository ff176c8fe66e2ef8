use std::time::{Duration, Instant};

/// Monotonic time source reporting microseconds since it was created.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::start()
    }
}

impl MonotonicClock {
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }

    pub fn now_micros(&self) -> u64 {
        u64::try_from(self.elapsed().as_micros()).unwrap_or(u64::MAX)
    }
}

/// Handle returned by [`TimerQueue::add_timeout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Returned by timer callbacks: keep firing or drop the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    Break,
}

#[derive(Debug, Clone)]
struct ScheduledTimer<T> {
    id: TimerId,
    interval_micros: u64,
    due_micros: u64,
    payload: T,
}

/// Cooperative timeouts for a single-threaded event loop.
///
/// Nothing fires on its own: the host calls [`TimerQueue::fire_due`] with the
/// current monotonic time and routes each due timer by its payload. A timer
/// that returns [`ControlFlow::Continue`] is rescheduled one interval after
/// the dispatch time.
#[derive(Debug)]
pub struct TimerQueue<T> {
    timers: Vec<ScheduledTimer<T>>,
    next_id: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            timers: Vec::new(),
            next_id: 1,
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `payload` to fire every `interval`, first at `now + interval`.
    /// Intervals are at least one microsecond so a repeating timer always
    /// moves forward.
    pub fn add_timeout(&mut self, now_micros: u64, interval: Duration, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;

        let interval_micros = u64::try_from(interval.as_micros()).unwrap_or(u64::MAX).max(1);
        self.timers.push(ScheduledTimer {
            id,
            interval_micros,
            due_micros: now_micros.saturating_add(interval_micros),
            payload,
        });
        id
    }

    /// Cancels a pending timer. Returns false if it already finished.
    pub fn remove(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.id != id);
        self.timers.len() != before
    }

    pub fn contains(&self, id: TimerId) -> bool {
        self.timers.iter().any(|timer| timer.id == id)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Earliest due time among pending timers.
    pub fn next_due(&self) -> Option<u64> {
        self.timers.iter().map(|timer| timer.due_micros).min()
    }

    /// Dispatches every timer due at `now_micros`, earliest first. Returns the
    /// number of callbacks run.
    pub fn fire_due<F>(&mut self, now_micros: u64, mut dispatch: F) -> usize
    where
        F: FnMut(TimerId, &mut T) -> ControlFlow,
    {
        let mut due: Vec<(u64, TimerId)> = self
            .timers
            .iter()
            .filter(|timer| timer.due_micros <= now_micros)
            .map(|timer| (timer.due_micros, timer.id))
            .collect();
        due.sort_unstable();

        let mut fired = 0;
        for (_, id) in due {
            let Some(index) = self.timers.iter().position(|timer| timer.id == id) else {
                continue;
            };

            fired += 1;
            let timer = &mut self.timers[index];
            match dispatch(id, &mut timer.payload) {
                ControlFlow::Continue => {
                    timer.due_micros = now_micros.saturating_add(timer.interval_micros);
                }
                ControlFlow::Break => {
                    self.timers.remove(index);
                }
            }
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: u64 = 1_000;

    #[test]
    fn fires_only_when_due_and_reschedules() {
        let mut queue = TimerQueue::new();
        let id = queue.add_timeout(0, Duration::from_millis(30), "tick");

        assert_eq!(queue.fire_due(29 * MS, |_, _| ControlFlow::Continue), 0);
        assert_eq!(queue.next_due(), Some(30 * MS));

        let mut seen = Vec::new();
        queue.fire_due(31 * MS, |fired, payload| {
            seen.push((fired, *payload));
            ControlFlow::Continue
        });
        assert_eq!(seen, vec![(id, "tick")]);
        assert_eq!(queue.next_due(), Some(61 * MS));
    }

    #[test]
    fn break_drops_the_timer() {
        let mut queue = TimerQueue::new();
        let id = queue.add_timeout(0, Duration::from_millis(750), ());
        queue.fire_due(750 * MS, |_, _| ControlFlow::Break);
        assert!(!queue.contains(id));
        assert!(queue.is_empty());
    }

    #[test]
    fn removal_cancels_pending_timers() {
        let mut queue = TimerQueue::new();
        let first = queue.add_timeout(0, Duration::from_millis(10), 1);
        let second = queue.add_timeout(0, Duration::from_millis(20), 2);

        assert!(queue.remove(first));
        assert!(!queue.remove(first));

        let mut fired = Vec::new();
        queue.fire_due(100 * MS, |id, _| {
            fired.push(id);
            ControlFlow::Break
        });
        assert_eq!(fired, vec![second]);
    }

    #[test]
    fn dispatches_in_due_order() {
        let mut queue = TimerQueue::new();
        queue.add_timeout(0, Duration::from_millis(50), "late");
        queue.add_timeout(0, Duration::from_millis(10), "early");

        let mut order = Vec::new();
        queue.fire_due(60 * MS, |_, payload| {
            order.push(*payload);
            ControlFlow::Break
        });
        assert_eq!(order, vec!["early", "late"]);
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn zero_interval_still_advances() {
        let mut queue = TimerQueue::new();
        queue.add_timeout(0, Duration::ZERO, ());
        assert_eq!(queue.next_due(), Some(1));

        queue.fire_due(1, |_, _| ControlFlow::Continue);
        assert_eq!(queue.next_due(), Some(2));
    }

    #[test]
    fn clock_is_monotonic() {
        let clock = MonotonicClock::start();
        let first = clock.now_micros();
        let second = clock.now_micros();
        assert!(second >= first);
    }
}
