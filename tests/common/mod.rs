#![allow(dead_code)]

use padlink::{
    input::InputSource,
    registry::{Registry, RobotTarget},
    Error, Result,
};
use std::{cell::Cell, net::{SocketAddr, UdpSocket}, time::Duration};

/// Input source whose buttons are set by the test.
pub struct FakePad {
    pub connected: bool,
    pub buttons: Vec<bool>,
    pub refreshes: usize,
    attempts: Cell<usize>,
}

impl FakePad {
    pub fn connected(button_count: usize) -> FakePad {
        FakePad {
            connected: true,
            buttons: vec![false; button_count],
            refreshes: 0,
            attempts: Cell::new(0),
        }
    }

    pub fn absent(button_count: usize) -> FakePad {
        FakePad { connected: false, ..FakePad::connected(button_count) }
    }

    /// Holds exactly the given buttons.
    pub fn press(&mut self, pressed: &[usize]) {
        for (index, button) in self.buttons.iter_mut().enumerate() {
            *button = pressed.contains(&index);
        }
    }

    /// How many times a device was looked for.
    pub fn attempts(&self) -> usize {
        self.attempts.get()
    }
}

impl InputSource for FakePad {
    type Handle = ();

    fn refresh(&mut self) {
        self.refreshes += 1;
    }

    fn device_count(&self) -> usize {
        self.attempts.set(self.attempts.get() + 1);
        self.connected as usize
    }

    fn open(&mut self, index: usize) -> Option<()> {
        (self.connected && index == 0).then_some(())
    }

    fn name(&self, _handle: ()) -> String {
        "Fake Pad".to_string()
    }

    fn button_count(&self, _handle: ()) -> usize {
        self.buttons.len()
    }

    fn button_state(&self, _handle: (), index: usize) -> Result<bool> {
        if !self.connected {
            return Err(Error::DeviceRead { index });
        }

        self.buttons
            .get(index)
            .copied()
            .ok_or(Error::DeviceRead { index })
    }
}

/// A loopback socket standing in for a robot.
pub fn robot() -> (UdpSocket, SocketAddr) {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    socket.set_read_timeout(Some(Duration::from_secs(1))).unwrap();
    let address = socket.local_addr().unwrap();
    (socket, address)
}

pub fn registry(targets: &[(u32, SocketAddr)]) -> Registry {
    Registry::new(targets.iter().map(|&(id, address)| RobotTarget { id, address })).unwrap()
}

pub fn receive(socket: &UdpSocket) -> Vec<u8> {
    let mut buffer = [0; 64];
    let (size, _) = socket.recv_from(&mut buffer).unwrap();
    buffer[..size].to_vec()
}

pub fn is_silent(socket: &UdpSocket) -> bool {
    let mut buffer = [0; 64];
    socket.set_read_timeout(Some(Duration::from_millis(50))).unwrap();
    let silent = socket.recv_from(&mut buffer).is_err();
    socket.set_read_timeout(Some(Duration::from_secs(1))).unwrap();
    silent
}
