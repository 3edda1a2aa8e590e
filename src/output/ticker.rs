//! Frame timer shared by the animated renderers.
//!
//! # Design Decisions
//! - The frame lives behind one mutex shared by the strategy and the timer
//!   task, so event redraws and timer redraws never interleave
//! - A `live` flag checked under that mutex keeps a tick that races with
//!   `finish` from drawing over the final line
//! - Dropping the ticker drops the stop sender, which ends the task

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Something redrawn on every tick.
pub trait Frame: Send + 'static {
    fn render(&mut self);
}

struct Slot<F> {
    frame: F,
    live: bool,
}

/// Owns a frame and redraws it on a fixed period between poll events.
pub struct Ticker<F> {
    slot: Arc<Mutex<Slot<F>>>,
    stop: Option<oneshot::Sender<()>>,
}

impl<F: Frame> Ticker<F> {
    pub fn new(frame: F) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot { frame, live: false })),
            stop: None,
        }
    }

    /// Start redrawing every `period`.
    ///
    /// Outside a tokio runtime the frame only changes on poll events.
    pub fn start(&mut self, period: Duration) {
        if let Ok(mut slot) = self.slot.lock() {
            slot.live = true;
        }
        if self.stop.is_some() {
            return;
        }
        let Ok(runtime) = Handle::try_current() else {
            tracing::debug!("No async runtime, animation advances on poll events only");
            return;
        };

        let (stop, mut stopped) = oneshot::channel();
        let slot = Arc::clone(&self.slot);
        runtime.spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Ok(mut slot) = slot.lock() {
                            if slot.live {
                                slot.frame.render();
                            }
                        }
                    }
                    _ = &mut stopped => break,
                }
            }
        });
        self.stop = Some(stop);
    }

    /// Run `f` against the frame while the timer is held off.
    pub fn with<R>(&self, f: impl FnOnce(&mut F) -> R) -> Option<R> {
        self.slot.lock().ok().map(|mut slot| f(&mut slot.frame))
    }

    /// Stop the timer, then run `f` as the last thing drawn.
    pub fn finish<R>(&mut self, f: impl FnOnce(&mut F) -> R) -> Option<R> {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        self.slot.lock().ok().map(|mut slot| {
            slot.live = false;
            f(&mut slot.frame)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter(Arc<Mutex<u32>>);

    impl Frame for Counter {
        fn render(&mut self) {
            if let Ok(mut n) = self.0.lock() {
                *n += 1;
            }
        }
    }

    fn counted() -> (Ticker<Counter>, Arc<Mutex<u32>>) {
        let renders = Arc::new(Mutex::new(0));
        (Ticker::new(Counter(Arc::clone(&renders))), renders)
    }

    #[tokio::test(start_paused = true)]
    async fn renders_once_per_period() {
        let (mut ticker, renders) = counted();
        ticker.start(Duration::from_millis(100));

        time::sleep(Duration::from_millis(350)).await;
        assert_eq!(*renders.lock().unwrap(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn finish_stops_rendering() {
        let (mut ticker, renders) = counted();
        ticker.start(Duration::from_millis(100));
        time::sleep(Duration::from_millis(150)).await;

        ticker.finish(|_| ());
        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(*renders.lock().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_stops_rendering() {
        let (mut ticker, renders) = counted();
        ticker.start(Duration::from_millis(100));
        drop(ticker);

        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(*renders.lock().unwrap(), 0);
    }

    #[test]
    fn without_runtime_only_events_draw() {
        let (mut ticker, renders) = counted();
        ticker.start(Duration::from_millis(1));
        ticker.with(|frame| frame.render());
        assert_eq!(*renders.lock().unwrap(), 1);
    }
}
