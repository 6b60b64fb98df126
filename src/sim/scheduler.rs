//! Cooperative frame/interval scheduler
//!
//! The host calls [`Scheduler::advance`] once per display frame with the
//! measured wall-clock delta, then drains [`Scheduler::poll`] and dispatches
//! each [`Fired`] to completion before polling again. Nothing runs
//! concurrently, so callbacks for a handle can never overlap.
//!
//! Ordering within one advance: due intervals/timeouts fire first, ordered by
//! due time (ties by handle age), then every frame loop that was live when the
//! advance began fires exactly once with the frame delta. Liveness is checked
//! at poll time, so stopping a handle mid-dispatch drops its pending fires.

use crate::consts::{MAX_ADVANCE_MS, MIN_INTERVAL_MS};

/// Opaque timer handle. Handles are never reused, so a stale handle can
/// only ever refer to a stopped timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq)]
enum Cadence {
    Frame,
    Interval { period_ms: f64, next_due_ms: f64 },
    Timeout { due_ms: f64 },
}

impl Cadence {
    fn due_ms(&self) -> Option<f64> {
        match *self {
            Cadence::Frame => None,
            Cadence::Interval { next_due_ms, .. } => Some(next_due_ms),
            Cadence::Timeout { due_ms } => Some(due_ms),
        }
    }
}

#[derive(Debug, Clone)]
struct Timer<T> {
    handle: TimerHandle,
    cadence: Cadence,
    tag: T,
}

/// What kind of callback fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FiredKind {
    Frame,
    Interval,
    Timeout,
}

/// A callback that is due, handed back to the caller to dispatch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fired<T> {
    pub handle: TimerHandle,
    pub kind: FiredKind,
    /// Tag given when the timer was started
    pub tag: T,
    /// Frame delta for frame loops, period for intervals, 0 for timeouts
    pub delta_ms: f64,
}

/// Virtual-clock scheduler; `T` is the caller's dispatch tag
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now_ms: f64,
    target_ms: f64,
    frame_delta_ms: f64,
    timers: Vec<Timer<T>>,
    pending_frames: Vec<TimerHandle>,
    next_handle: u64,
}

impl<T: Copy> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0.0,
            target_ms: 0.0,
            frame_delta_ms: 0.0,
            timers: Vec::new(),
            pending_frames: Vec::new(),
            next_handle: 1,
        }
    }

    /// Current virtual time
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Number of live timers of any kind
    pub fn live_count(&self) -> usize {
        self.timers.len()
    }

    pub fn is_active(&self, handle: TimerHandle) -> bool {
        self.timers.iter().any(|t| t.handle == handle)
    }

    fn insert(&mut self, cadence: Cadence, tag: T) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.timers.push(Timer { handle, cadence, tag });
        handle
    }

    /// Run `tag` once per display frame until stopped
    pub fn start_frame_loop(&mut self, tag: T) -> TimerHandle {
        self.insert(Cadence::Frame, tag)
    }

    /// Run `tag` every `period_ms`, first fire one period from now
    pub fn start_interval(&mut self, period_ms: f64, tag: T) -> TimerHandle {
        let period_ms = period_ms.max(MIN_INTERVAL_MS);
        let next_due_ms = self.now_ms + period_ms;
        self.insert(
            Cadence::Interval {
                period_ms,
                next_due_ms,
            },
            tag,
        )
    }

    /// Run `tag` once after `delay_ms`
    pub fn start_timeout(&mut self, delay_ms: f64, tag: T) -> TimerHandle {
        let due_ms = self.now_ms + delay_ms.max(0.0);
        self.insert(Cadence::Timeout { due_ms }, tag)
    }

    /// Stop any timer; stopping an already-stopped handle is a no-op
    pub fn stop(&mut self, handle: TimerHandle) {
        self.timers.retain(|t| t.handle != handle);
        self.pending_frames.retain(|h| *h != handle);
    }

    pub fn stop_frame_loop(&mut self, handle: TimerHandle) {
        self.stop(handle);
    }

    pub fn stop_interval(&mut self, handle: TimerHandle) {
        self.stop(handle);
    }

    /// Advance the virtual clock by a measured delta (clamped to `MAX_ADVANCE_MS`)
    ///
    /// Anything still undrained from the previous advance is settled first:
    /// intervals keep their due times, frame fires are dropped.
    pub fn advance(&mut self, delta_ms: f64) {
        let delta_ms = if delta_ms.is_finite() {
            delta_ms.clamp(0.0, MAX_ADVANCE_MS)
        } else {
            0.0
        };
        self.now_ms = self.now_ms.max(self.target_ms);
        self.target_ms = self.now_ms + delta_ms;
        self.frame_delta_ms = delta_ms;
        self.pending_frames = self
            .timers
            .iter()
            .filter(|t| t.cadence == Cadence::Frame)
            .map(|t| t.handle)
            .collect();
    }

    /// Next due callback for the current advance, if any
    pub fn poll(&mut self) -> Option<Fired<T>> {
        let next_timed = self
            .timers
            .iter()
            .enumerate()
            .filter_map(|(idx, t)| t.cadence.due_ms().map(|due| (idx, due)))
            .filter(|&(_, due)| due <= self.target_ms)
            .min_by(|a, b| {
                a.1.partial_cmp(&b.1)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| self.timers[a.0].handle.cmp(&self.timers[b.0].handle))
            })
            .map(|(idx, _)| idx);

        if let Some(idx) = next_timed {
            let timer = &mut self.timers[idx];
            let handle = timer.handle;
            let tag = timer.tag;
            return match timer.cadence {
                Cadence::Interval {
                    period_ms,
                    next_due_ms,
                } => {
                    self.now_ms = next_due_ms;
                    timer.cadence = Cadence::Interval {
                        period_ms,
                        next_due_ms: next_due_ms + period_ms,
                    };
                    Some(Fired {
                        handle,
                        kind: FiredKind::Interval,
                        tag,
                        delta_ms: period_ms,
                    })
                }
                Cadence::Timeout { due_ms } => {
                    self.now_ms = due_ms;
                    self.timers.remove(idx);
                    Some(Fired {
                        handle,
                        kind: FiredKind::Timeout,
                        tag,
                        delta_ms: 0.0,
                    })
                }
                Cadence::Frame => None,
            };
        }

        self.now_ms = self.target_ms;
        while !self.pending_frames.is_empty() {
            let handle = self.pending_frames.remove(0);
            if let Some(timer) = self.timers.iter().find(|t| t.handle == handle) {
                return Some(Fired {
                    handle,
                    kind: FiredKind::Frame,
                    tag: timer.tag,
                    delta_ms: self.frame_delta_ms,
                });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(s: &mut Scheduler<u8>) -> Vec<(FiredKind, u8)> {
        let mut out = Vec::new();
        while let Some(f) = s.poll() {
            out.push((f.kind, f.tag));
        }
        out
    }

    #[test]
    fn test_interval_fires_on_period() {
        let mut s = Scheduler::new();
        s.start_interval(1000.0, 1u8);
        s.advance(999.0);
        assert!(drain(&mut s).is_empty());
        s.advance(1.0);
        assert_eq!(drain(&mut s), vec![(FiredKind::Interval, 1)]);
    }

    #[test]
    fn test_intervals_before_frames_in_due_order() {
        let mut s = Scheduler::new();
        s.start_frame_loop(0u8);
        s.start_interval(420.0, 2);
        s.start_interval(1000.0, 1);
        s.advance(1000.0);
        assert_eq!(
            drain(&mut s),
            vec![
                (FiredKind::Interval, 2),
                (FiredKind::Interval, 2),
                (FiredKind::Interval, 1),
                (FiredKind::Frame, 0),
            ]
        );
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut s = Scheduler::new();
        let h = s.start_interval(10.0, 1u8);
        s.stop_interval(h);
        s.stop_interval(h);
        s.stop_frame_loop(h);
        assert_eq!(s.live_count(), 0);
        s.advance(100.0);
        assert!(drain(&mut s).is_empty());
    }

    #[test]
    fn test_stop_during_dispatch_cancels_pending_fires() {
        let mut s = Scheduler::new();
        let interval = s.start_interval(100.0, 1u8);
        let frame = s.start_frame_loop(2);
        s.advance(500.0);
        let first = s.poll().map(|f| f.tag);
        assert_eq!(first, Some(1));
        s.stop(interval);
        s.stop(frame);
        assert!(s.poll().is_none());
    }

    #[test]
    fn test_timeout_fires_once() {
        let mut s = Scheduler::new();
        s.start_timeout(700.0, 9u8);
        s.advance(1000.0);
        assert_eq!(drain(&mut s), vec![(FiredKind::Timeout, 9)]);
        s.advance(1000.0);
        assert!(drain(&mut s).is_empty());
        assert_eq!(s.live_count(), 0);
    }

    #[test]
    fn test_frame_loop_started_mid_dispatch_waits_for_next_advance() {
        let mut s = Scheduler::new();
        s.start_interval(10.0, 1u8);
        s.advance(10.0);
        assert_eq!(s.poll().map(|f| f.tag), Some(1));
        s.start_frame_loop(2);
        assert!(s.poll().is_none());
        s.advance(5.0);
        assert_eq!(drain(&mut s), vec![(FiredKind::Frame, 2)]);
    }

    #[test]
    fn test_advance_clamped() {
        let mut s = Scheduler::new();
        s.start_interval(1000.0, 1u8);
        s.advance(3_600_000.0);
        assert_eq!(drain(&mut s).len(), 1);
        assert!((s.now_ms() - MAX_ADVANCE_MS).abs() < 1e-9);
    }

    #[test]
    fn test_frame_delta_reported() {
        let mut s = Scheduler::new();
        s.start_frame_loop(0u8);
        s.advance(16.5);
        let fired = s.poll().map(|f| f.delta_ms);
        assert_eq!(fired, Some(16.5));
    }
}
