//! Tick loop with an injectable stop condition.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, TryRecvError};

use crate::canvas::Frame;
use crate::demo::Demo;

/// Polled before every tick; returning `true` ends the loop.
pub trait StopSignal {
    fn should_stop(&mut self, ticks: u64) -> bool;
}

/// Stops after exactly this many ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickBudget(pub u64);

impl StopSignal for TickBudget {
    fn should_stop(&mut self, ticks: u64) -> bool {
        ticks >= self.0
    }
}

/// Shared flag another thread (or a signal handler) can raise.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl StopSignal for StopFlag {
    fn should_stop(&mut self, _ticks: u64) -> bool {
        self.is_raised()
    }
}

/// Wall-clock cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline(Instant);

impl Deadline {
    pub fn at(instant: Instant) -> Self {
        Self(instant)
    }

    pub fn after(duration: Duration) -> Self {
        Self(Instant::now() + duration)
    }

    pub fn instant(&self) -> Instant {
        self.0
    }
}

impl StopSignal for Deadline {
    fn should_stop(&mut self, _ticks: u64) -> bool {
        Instant::now() >= self.0
    }
}

/// Stops on the first message, or once every sender is gone.
impl StopSignal for Receiver<()> {
    fn should_stop(&mut self, _ticks: u64) -> bool {
        match self.try_recv() {
            Ok(()) | Err(TryRecvError::Disconnected) => true,
            Err(TryRecvError::Empty) => false,
        }
    }
}

impl<S: StopSignal + ?Sized> StopSignal for &mut S {
    fn should_stop(&mut self, ticks: u64) -> bool {
        (**self).should_stop(ticks)
    }
}

/// Runs step then draw, counting ticks across calls.
#[derive(Debug, Default)]
pub struct LoopDriver {
    ticks: u64,
}

impl LoopDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total ticks executed by this driver.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn tick(&mut self, demo: &mut dyn Demo, frame: &mut Frame) {
        demo.step();
        demo.draw(frame);
        self.ticks += 1;
    }

    /// Ticks until `stop` fires and returns how many ticks this call ran.
    /// The signal sees the count for this run, starting at zero.
    pub fn run<S: StopSignal + ?Sized>(
        &mut self,
        demo: &mut dyn Demo,
        frame: &mut Frame,
        stop: &mut S,
    ) -> u64 {
        let mut ran = 0;
        while !stop.should_stop(ran) {
            self.tick(demo, frame);
            ran += 1;
        }
        tracing::debug!(demo = demo.name(), ticks = ran, total = self.ticks, "loop stopped");
        ran
    }
}
