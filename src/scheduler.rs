use std::{sync::Arc, thread, time::{Duration, Instant}};
use tracing::debug;

use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::input::{sampler::Sampler, InputSource};

/// A fixed wall-clock schedule. Deadlines advance by exactly one period per
/// firing so the rate never drifts, and a late caller fires every missed
/// deadline in turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cadence {
    period: Duration,
    next: Duration,
}

impl Cadence {
    pub fn new(period: Duration) -> Cadence {
        Cadence { period, next: Duration::ZERO }
    }

    pub fn next(&self) -> Duration {
        self.next
    }

    pub fn is_due(&self, now: Duration) -> bool {
        now >= self.next
    }

    pub fn advance(&mut self) {
        self.next += self.period;
    }
}

/// How many ticks of each kind a call to [`Scheduler::step`] ran.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Ticks {
    pub sampled: usize,
    pub sent: usize,
}

/// Drives sampling and the heartbeat on one thread. Stops bypass the
/// scheduler entirely and go straight to the shared [`Dispatcher`].
pub struct Scheduler<S: InputSource> {
    sampler: Sampler<S>,
    dispatcher: Arc<Dispatcher>,
    controlled: u32,
    sample: Cadence,
    send: Cadence,
}

impl<S: InputSource> Scheduler<S> {
    pub fn new(sampler: Sampler<S>, dispatcher: Arc<Dispatcher>, controlled: u32, sample_period: Duration, send_period: Duration) -> Scheduler<S> {
        Scheduler {
            sampler,
            dispatcher,
            controlled,
            sample: Cadence::new(sample_period),
            send: Cadence::new(send_period),
        }
    }

    /// Runs every tick that is due at `now`, measured from the start of the
    /// loop, in deadline order. On a tie the sample runs first so the
    /// heartbeat carries the freshest state.
    pub fn step(&mut self, now: Duration) -> Result<Ticks> {
        let mut ticks = Ticks::default();

        loop {
            let sample_due = self.sample.is_due(now);
            let send_due = self.send.is_due(now);

            if sample_due && (!send_due || self.sample.next() <= self.send.next()) {
                self.sampler.tick(self.sample.next());
                self.sample.advance();
                ticks.sampled += 1;
            } else if send_due {
                self.heartbeat()?;
                self.send.advance();
                ticks.sent += 1;
            } else {
                break;
            }
        }

        Ok(ticks)
    }

    /// Time of the earliest pending tick.
    pub fn next_deadline(&self) -> Duration {
        self.sample.next().min(self.send.next())
    }

    /// Runs forever. Only an unregistered controlled robot can end the loop,
    /// and validated configuration rules that out.
    pub fn run(&mut self) -> Result<()> {
        let start = Instant::now();

        loop {
            let ticks = self.step(start.elapsed())?;
            if ticks.sampled > 1 || ticks.sent > 1 {
                debug!(sampled = ticks.sampled, sent = ticks.sent, "caught up on late ticks");
            }

            let wait = self.next_deadline().saturating_sub(start.elapsed());
            if !wait.is_zero() {
                thread::sleep(wait);
            }
        }
    }

    pub fn sampler(&self) -> &Sampler<S> {
        &self.sampler
    }

    pub fn sampler_mut(&mut self) -> &mut Sampler<S> {
        &mut self.sampler
    }

    fn heartbeat(&self) -> Result<()> {
        self.dispatcher.send(self.controlled, self.sampler.held())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cadence_fires_on_fixed_deadlines() {
        let mut cadence = Cadence::new(Duration::from_millis(20));

        assert!(cadence.is_due(Duration::ZERO));
        cadence.advance();
        assert!(!cadence.is_due(Duration::from_millis(19)));
        assert!(cadence.is_due(Duration::from_millis(20)));

        cadence.advance();
        cadence.advance();
        assert_eq!(cadence.next(), Duration::from_millis(60));
    }
}
