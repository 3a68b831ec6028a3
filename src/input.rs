pub mod gamepad;
pub mod sampler;

use crate::error::Result;

/// A source of physical input devices with digital buttons.
///
/// Reads go through the source rather than the handle because most input
/// libraries keep device state inside a single context object.
pub trait InputSource {
    type Handle: Copy;

    /// Pumps pending events so that following reads reflect the hardware.
    /// Must be called before each batch of [`InputSource::button_state`] reads.
    fn refresh(&mut self);

    fn device_count(&self) -> usize;

    fn open(&mut self, index: usize) -> Option<Self::Handle>;

    fn name(&self, handle: Self::Handle) -> String;

    fn button_count(&self, handle: Self::Handle) -> usize;

    /// Fails with [`crate::Error::DeviceRead`] when the device went away or
    /// `index` is out of range.
    fn button_state(&self, handle: Self::Handle, index: usize) -> Result<bool>;
}
