use jeflog::{pass, warn};
use std::time::Duration;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::state::{DeviceStatus, SharedState};
use super::InputSource;

/// Which physical button is the action button.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputMapping {
    learned: Option<usize>,
}

impl InputMapping {
    pub fn unlearned() -> InputMapping {
        InputMapping { learned: None }
    }

    /// Skips auto-learning entirely.
    pub fn forced(index: usize) -> InputMapping {
        InputMapping { learned: Some(index) }
    }

    pub fn index(&self) -> Option<usize> {
        self.learned
    }

    /// One-shot calibration: the lowest pressed index becomes the action
    /// button for the rest of the run. Returns the index only on the call
    /// that learned it.
    pub fn learn(&mut self, count: usize, mut pressed: impl FnMut(usize) -> bool) -> Option<usize> {
        if self.learned.is_some() {
            return None;
        }

        self.learned = (0..count).find(|&index| pressed(index));
        self.learned
    }
}

/// Turns a possibly absent gamepad into a single change-detected boolean.
pub struct Sampler<S: InputSource> {
    source: S,
    handle: Option<S::Handle>,
    mapping: InputMapping,
    held: bool,
    shared: SharedState,
    retry: Duration,
    last_attempt: Option<Duration>,
    announced_absent: bool,
}

impl<S: InputSource> Sampler<S> {
    pub fn new(source: S, mapping: InputMapping, retry: Duration, shared: SharedState) -> Sampler<S> {
        shared.set_held(false);
        shared.set_device(DeviceStatus::Absent);

        Sampler {
            source,
            handle: None,
            mapping,
            held: false,
            shared,
            retry,
            last_attempt: None,
            announced_absent: false,
        }
    }

    /// Tries to take the first available device. [`Error::DeviceAbsent`] is
    /// a status, not a failure: call again later.
    pub fn initialize(&mut self) -> Result<()> {
        self.source.refresh();

        if self.source.device_count() == 0 {
            return Err(Error::DeviceAbsent);
        }

        let handle = self.source.open(0).ok_or(Error::DeviceAbsent)?;
        let name = self.source.name(handle);

        pass!("Controller: {name}");
        if let Some(index) = self.mapping.index() {
            pass!("Action button fixed to index {index}.");
        } else {
            pass!("Press the button to use as the action button.");
        }

        self.handle = Some(handle);
        self.announced_absent = false;
        self.publish_status();

        Ok(())
    }

    /// Runs one sampling tick at `now` (time since the loop started). Without
    /// a device this only retries acquisition, at most once per retry interval.
    /// A device lost during the tick is retried from `now` on.
    /// Returns the new held value when it changed.
    pub fn tick(&mut self, now: Duration) -> Option<bool> {
        if self.handle.is_none() {
            let due = self.last_attempt.map_or(true, |last| now.saturating_sub(last) >= self.retry);
            if !due {
                return None;
            }

            self.last_attempt = Some(now);

            match self.initialize() {
                Ok(()) => {},
                Err(e) => {
                    if !self.announced_absent {
                        warn!("NO CONTROLLER FOUND, retrying every {} ms.", self.retry.as_millis());
                        self.announced_absent = true;
                    }

                    debug!("device acquisition failed: {e}");
                    return None;
                }
            }
        }

        let transition = self.sample().unwrap_or(None);
        if self.handle.is_none() {
            self.last_attempt = Some(now);
        }

        transition
    }

    /// Refreshes the device, learns the action button if still unknown and
    /// publishes a transition of the held state. A device that disappeared is
    /// released; the learned mapping is kept for the next one.
    pub fn sample(&mut self) -> Result<Option<bool>> {
        let handle = self.handle.ok_or(Error::DeviceAbsent)?;

        self.source.refresh();

        if self.is_lost(handle) {
            warn!("Controller disconnected, retrying every {} ms.", self.retry.as_millis());
            self.handle = None;
            self.announced_absent = true;
            self.shared.set_device(DeviceStatus::Absent);

            return Ok(self.publish_held(false));
        }

        let source = &self.source;
        let count = source.button_count(handle);
        if let Some(index) = self.mapping.learn(count, |index| source.button_state(handle, index).unwrap_or(false)) {
            pass!("Learned action button: index {index}.");
            self.publish_status();
        }

        let pressed = match self.mapping.index() {
            Some(index) => match self.source.button_state(handle, index) {
                Ok(pressed) => pressed,
                Err(e) => {
                    trace!("{e}, reading as released");
                    false
                }
            },
            None => false,
        };

        Ok(self.publish_held(pressed))
    }

    pub fn held(&self) -> bool {
        self.held
    }

    pub fn is_acquired(&self) -> bool {
        self.handle.is_some()
    }

    pub fn mapping(&self) -> InputMapping {
        self.mapping
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// No device left, or none of its buttons can be read.
    fn is_lost(&self, handle: S::Handle) -> bool {
        if self.source.device_count() == 0 {
            return true;
        }

        let count = self.source.button_count(handle);
        count > 0 && (0..count).all(|index| self.source.button_state(handle, index).is_err())
    }

    fn publish_held(&mut self, pressed: bool) -> Option<bool> {
        if pressed == self.held {
            return None;
        }

        self.held = pressed;
        self.shared.set_held(pressed);
        pass!("X BUTTON: {}", if pressed { "HELD" } else { "RELEASED" });

        Some(pressed)
    }

    fn publish_status(&self) {
        if let Some(handle) = self.handle {
            self.shared.set_device(DeviceStatus::Connected {
                name: self.source.name(handle),
                button: self.mapping.index(),
            });
        }
    }
}
