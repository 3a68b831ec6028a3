use std::fmt;
use std::sync::{atomic::{AtomicBool, Ordering}, Arc, Mutex, PoisonError};

/// What the operator sees about the input device.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DeviceStatus {
    #[default]
    Absent,
    Connected { name: String, button: Option<usize> },
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceStatus::Absent => write!(f, "no controller"),
            DeviceStatus::Connected { name, button: None } => write!(f, "{name} (press a button to bind it)"),
            DeviceStatus::Connected { name, button: Some(index) } => write!(f, "{name} (button {index})"),
        }
    }
}

/// State shared between the sampling loop and the operator shell. The
/// sampler is the only writer; everyone else reads.
#[derive(Clone, Debug, Default)]
pub struct SharedState {
    held: Arc<AtomicBool>,
    device: Arc<Mutex<DeviceStatus>>,
}

impl SharedState {
    pub fn new() -> SharedState {
        SharedState::default()
    }

    pub fn held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }

    pub(crate) fn set_held(&self, held: bool) {
        self.held.store(held, Ordering::Release);
    }

    pub fn device(&self) -> DeviceStatus {
        self.device
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn set_device(&self, status: DeviceStatus) {
        *self.device.lock().unwrap_or_else(PoisonError::into_inner) = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_observe_the_same_state() {
        let state = SharedState::new();
        let shell = state.clone();

        assert!(!shell.held());
        assert_eq!(shell.device(), DeviceStatus::Absent);

        state.set_held(true);
        state.set_device(DeviceStatus::Connected { name: "Pad".to_string(), button: Some(2) });

        assert!(shell.held());
        assert_eq!(shell.device().to_string(), "Pad (button 2)");
    }
}
