use jeflog::{fail, pass, warn};
use std::{io::{self, BufRead}, process, str::FromStr, sync::Arc, thread::{self, JoinHandle}};

use crate::dispatcher::Dispatcher;
use crate::state::SharedState;

/// Operator commands read from stdin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    StopAll,
    Stop(u32),
    Status,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Command, String> {
        let mut words = line.split_whitespace();

        let command = match (words.next(), words.next()) {
            (Some("stop"), None | Some("all")) => Command::StopAll,
            (Some("stop"), Some(id)) => id
                .parse()
                .map(Command::Stop)
                .map_err(|_| format!("'{id}' is not a robot id"))?,
            (Some("status"), None) => Command::Status,
            (Some("help"), None) => Command::Help,
            (Some("quit" | "exit"), None) => Command::Quit,
            _ => return Err(format!("unknown command '{}'", line.trim())),
        };

        if words.next().is_some() {
            return Err(format!("unexpected arguments in '{}'", line.trim()));
        }

        Ok(command)
    }
}

/// Runs a command against the dispatcher right away and returns the text to
/// show the operator. `Quit` is left to the caller.
pub fn execute(command: Command, dispatcher: &Dispatcher, shared: &SharedState) -> String {
    match command {
        Command::StopAll => {
            let sent = dispatcher.stop_all();
            format!("Stopped {sent} of {} robots.", dispatcher.registry().ids().count())
        },
        Command::Stop(id) => match dispatcher.stop(id) {
            Ok(sent) if sent.delivered => format!("Stopped robot {id}."),
            Ok(_) => format!("Stop for robot {id} could not be sent."),
            Err(e) => format!("Cannot stop: {e}."),
        },
        Command::Status => format!(
            "Controller: {}, X BUTTON: {}",
            shared.device(),
            if shared.held() { "HELD" } else { "RELEASED" },
        ),
        Command::Help => "commands: stop [all|<id>], status, help, quit".to_string(),
        Command::Quit => "Bye.".to_string(),
    }
}

/// Starts the stdin shell. Commands reach the dispatcher synchronously from
/// this thread, never through the scheduler.
pub fn spawn(dispatcher: Arc<Dispatcher>, shared: SharedState) -> JoinHandle<()> {
    thread::spawn(move || {
        let stdin = io::stdin();

        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    fail!("Could not read operator input: {e}");
                    break;
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            match line.parse::<Command>() {
                Ok(Command::Quit) => {
                    pass!("{}", execute(Command::Quit, &dispatcher, &shared));
                    process::exit(0);
                },
                Ok(command) => pass!("{}", execute(command, &dispatcher, &shared)),
                Err(e) => warn!("{e}"),
            }
        }
    })
}
