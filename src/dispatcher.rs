use jeflog::pass;
use std::{
	collections::HashMap,
	io::{Cursor, Write},
	net::UdpSocket,
	sync::{Mutex, PoisonError},
};
use tracing::{trace, warn};

use crate::error::{Error, Result};
use crate::registry::Registry;

/// Longest possible message: ten digits of id, a comma, the value and a newline.
pub const MAX_MESSAGE_LEN: usize = 13;

/// Writes `"<robot_id>,<value>\n"` into `buffer` and returns the used part.
pub fn encode(robot_id: u32, held: bool, buffer: &mut [u8; MAX_MESSAGE_LEN]) -> &[u8] {
	let mut cursor = Cursor::new(&mut buffer[..]);

	// cannot overflow: the buffer fits u32::MAX
	let _ = writeln!(cursor, "{robot_id},{}", held as u8);
	let length = cursor.position() as usize;

	&buffer[..length]
}

/// Last value sent to each robot. Only used to keep the console quiet.
#[derive(Debug, Default)]
pub struct DispatchRecord {
	last_sent: HashMap<u32, u8>,
}

impl DispatchRecord {
	/// Remembers `value` for `robot_id` and reports whether it differs from
	/// the previous one.
	pub fn note(&mut self, robot_id: u32, value: u8) -> bool {
		self.last_sent.insert(robot_id, value) != Some(value)
	}
}

/// Outcome of a single send.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sent {
	/// The datagram left this host.
	pub delivered: bool,
	/// A log line was printed because the value changed for this robot.
	pub logged: bool,
}

/// Fire-and-forget UDP sender for robot commands.
pub struct Dispatcher {
	registry: Registry,
	socket: UdpSocket,
	record: Mutex<DispatchRecord>,
}

impl Dispatcher {
	pub fn new(registry: Registry) -> Result<Dispatcher> {
		let socket = UdpSocket::bind("0.0.0.0:0")?;

		// a full send buffer must drop the command, never stall the loop
		socket.set_nonblocking(true)?;

		Ok(Dispatcher {
			registry,
			socket,
			record: Mutex::new(DispatchRecord::default()),
		})
	}

	pub fn registry(&self) -> &Registry {
		&self.registry
	}

	/// Sends the held state to one robot, exactly once, without retrying.
	/// Only an unregistered id is an error; transmission failures are
	/// logged and reported through [`Sent::delivered`].
	pub fn send(&self, robot_id: u32, held: bool) -> Result<Sent> {
		let address = self.registry.resolve(robot_id)?;

		let mut buffer = [0; MAX_MESSAGE_LEN];
		let message = encode(robot_id, held, &mut buffer);

		if let Err(e) = self.socket.send_to(message, address) {
			let e = Error::Transmission(e);
			warn!(robot_id, %address, "{e}");
			return Ok(Sent { delivered: false, logged: false });
		}

		trace!(robot_id, held, %address, "command sent");

		let value = held as u8;
		let logged = self.record
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.note(robot_id, value);

		if logged {
			pass!("Sent {robot_id},{value} to {address}.");
		}

		Ok(Sent { delivered: true, logged })
	}

	pub fn stop(&self, robot_id: u32) -> Result<Sent> {
		self.send(robot_id, false)
	}

	/// Stops every registered robot immediately. Returns how many stop
	/// commands were sent.
	pub fn stop_all(&self) -> usize {
		self.registry
			.ids()
			.filter_map(|robot_id| self.stop(robot_id).ok())
			.filter(|sent| sent.delivered)
			.count()
	}
}
