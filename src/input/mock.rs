// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::io;

use tokio::{sync::mpsc::Sender, task::JoinHandle};

use super::KeyEvent;

/// Replays a scripted sequence of key events, then stops.
pub struct Driver {
    events: Vec<KeyEvent>,
}

impl Driver {
    pub fn new(events: Vec<KeyEvent>) -> Driver {
        Driver { events }
    }
}

impl super::Driver for Driver {
    fn monitor_events(&self, events_tx: Sender<KeyEvent>) -> JoinHandle<Result<(), io::Error>> {
        let events = self.events.clone();
        tokio::task::spawn_blocking(move || {
            for event in events {
                events_tx
                    .blocking_send(event)
                    .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
            }
            Ok(())
        })
    }
}
