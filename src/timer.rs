use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::runtime::GameEvent;

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Running(u32),
    Expired,
}

/// Seconds left in a game, clamped at zero. A game lasts at least one second.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Countdown {
    duration_secs: u32,
    remaining_secs: u32,
}

impl Countdown {
    pub fn new(duration_secs: u32) -> Self {
        let duration_secs = duration_secs.max(1);
        Self {
            duration_secs,
            remaining_secs: duration_secs,
        }
    }

    pub fn reset(&mut self) {
        self.remaining_secs = self.duration_secs;
    }

    pub fn tick(&mut self) -> TickOutcome {
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            TickOutcome::Expired
        } else {
            TickOutcome::Running(self.remaining_secs)
        }
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }
}

/// Background thread sending one `Tick` per interval into the event channel.
///
/// Dropping or cancelling stops the thread and waits for it, so no tick is
/// sent afterwards.
#[derive(Debug)]
pub struct TickThread {
    generation: u64,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl TickThread {
    pub fn spawn(
        tx: Sender<GameEvent>,
        generation: u64,
        interval: Duration,
    ) -> std::io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name(format!("countdown-{generation}"))
            .spawn(move || {
                let mut deadline = Instant::now() + interval;
                loop {
                    let now = Instant::now();
                    if now < deadline {
                        thread::park_timeout(deadline - now);
                    }
                    if thread_stop.load(Ordering::Acquire) {
                        break;
                    }
                    // park_timeout may return early
                    if Instant::now() < deadline {
                        continue;
                    }
                    if tx.send(GameEvent::Tick { generation }).is_err() {
                        break;
                    }
                    deadline += interval;
                }
            })?;

        debug!(generation, "countdown thread started");

        Ok(Self {
            generation,
            stop,
            handle: Some(handle),
        })
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.stop.store(true, Ordering::Release);
            handle.thread().unpark();
            if handle.join().is_err() {
                warn!(generation = self.generation, "countdown thread panicked");
            } else {
                debug!(generation = self.generation, "countdown thread stopped");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for TickThread {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::{self, RecvTimeoutError};

    #[test]
    fn test_countdown_new() {
        let countdown = Countdown::new(60);

        assert_eq!(countdown.duration_secs(), 60);
        assert_eq!(countdown.remaining_secs(), 60);
    }

    #[test]
    fn test_countdown_zero_duration_lasts_one_second() {
        let mut countdown = Countdown::new(0);

        assert_eq!(countdown.duration_secs(), 1);
        assert_eq!(countdown.remaining_secs(), 1);
        assert_eq!(countdown.tick(), TickOutcome::Expired);
    }

    #[test]
    fn test_countdown_ticks_down_to_zero() {
        let mut countdown = Countdown::new(3);

        assert_eq!(countdown.tick(), TickOutcome::Running(2));
        assert_eq!(countdown.tick(), TickOutcome::Running(1));
        assert_eq!(countdown.tick(), TickOutcome::Expired);
        assert_eq!(countdown.remaining_secs(), 0);
    }

    #[test]
    fn test_countdown_never_goes_negative() {
        let mut countdown = Countdown::new(1);

        assert_eq!(countdown.tick(), TickOutcome::Expired);
        assert_eq!(countdown.tick(), TickOutcome::Expired);
        assert_eq!(countdown.remaining_secs(), 0);
    }

    #[test]
    fn test_countdown_reset() {
        let mut countdown = Countdown::new(5);
        countdown.tick();
        countdown.tick();

        countdown.reset();
        assert_eq!(countdown.remaining_secs(), 5);
    }

    #[test]
    fn test_tick_thread_sends_generation() {
        let (tx, rx) = mpsc::channel();
        let mut ticker = TickThread::spawn(tx, 7, Duration::from_millis(5)).unwrap();

        match rx.recv_timeout(Duration::from_secs(2)) {
            Ok(GameEvent::Tick { generation }) => assert_eq!(generation, 7),
            other => panic!("expected tick, got {other:?}"),
        }

        ticker.cancel();
        assert!(!ticker.is_running());
    }

    #[test]
    fn test_no_tick_after_cancel() {
        let (tx, rx) = mpsc::channel();
        let mut ticker = TickThread::spawn(tx, 1, Duration::from_millis(20)).unwrap();

        ticker.cancel();

        // drain anything sent before cancel returned
        while rx.try_recv().is_ok() {}

        // the sender was owned by the joined thread, so the channel is closed
        assert_eq!(
            rx.recv_timeout(Duration::from_millis(100)),
            Err(RecvTimeoutError::Disconnected)
        );
    }

    #[test]
    fn test_cancel_does_not_wait_for_interval() {
        let (tx, _rx) = mpsc::channel();
        let mut ticker = TickThread::spawn(tx, 1, Duration::from_secs(30)).unwrap();

        let started = Instant::now();
        ticker.cancel();

        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_drop_cancels() {
        let (tx, rx) = mpsc::channel();
        let ticker = TickThread::spawn(tx, 3, Duration::from_millis(10)).unwrap();

        drop(ticker);
        while rx.try_recv().is_ok() {}

        assert_eq!(
            rx.recv_timeout(Duration::from_millis(50)),
            Err(RecvTimeoutError::Disconnected)
        );
    }
}
