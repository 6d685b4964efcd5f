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
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io;

use rdev::{EventType, Key};
use tokio::{sync::mpsc::Sender, task::JoinHandle};
use tracing::{info, span, warn, Level};

use super::{KeyEvent, KeyId};

/// Listens to every key press on the system through rdev.
pub struct Driver {}

impl Driver {
    pub fn new() -> Driver {
        Driver {}
    }

    /// Converts an rdev event into a key event. Mouse events are ignored.
    fn to_key_event(event: &rdev::Event) -> Option<KeyEvent> {
        match event.event_type {
            EventType::KeyPress(key) => Some(KeyEvent::down(key_id(key), &key_name(key))),
            EventType::KeyRelease(key) => Some(KeyEvent::up(key_id(key), &key_name(key))),
            _ => None,
        }
    }
}

impl Default for Driver {
    fn default() -> Self {
        Self::new()
    }
}

/// The identity of a physical key. DefaultHasher::new() uses fixed keys, so the same
/// key maps to the same id on every run of the same build.
pub fn key_id(key: Key) -> KeyId {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    KeyId::new(hasher.finish())
}

/// The layout-independent name of the key, e.g. "Space", "KeyA" or "Unknown(191)".
pub fn key_name(key: Key) -> String {
    format!("{:?}", key)
}

impl super::Driver for Driver {
    fn monitor_events(&self, events_tx: Sender<KeyEvent>) -> JoinHandle<Result<(), io::Error>> {
        tokio::task::spawn_blocking(move || {
            let span = span!(Level::INFO, "keyboard hook");
            let _enter = span.enter();

            info!("Keyboard hook started.");

            rdev::listen(move |event| {
                if let Some(key_event) = Driver::to_key_event(&event) {
                    if events_tx.blocking_send(key_event).is_err() {
                        warn!("Listener is gone, dropping key event");
                    }
                }
            })
            .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("{:?}", e)))
        })
    }
}
