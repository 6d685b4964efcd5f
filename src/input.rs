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
use std::fmt;
use std::io;
use std::sync::Arc;

use tokio::{sync::mpsc::Sender, task::JoinHandle};

use crate::error::Error;

#[cfg(feature = "hook")]
pub mod hook;
#[cfg(test)]
pub mod mock;

/// A stable per-physical-key code, used as the seed for clip selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyId(u64);

impl KeyId {
    pub const fn new(code: u64) -> KeyId {
        KeyId(code)
    }

    pub fn code(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyEventKind {
    Down,
    Up,
}

/// A key transition reported by an input driver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub kind: KeyEventKind,
    pub key: KeyId,
    /// The symbolic key name, e.g. "Space" or "KeyA". Independent of keyboard layout.
    pub name: String,
}

impl KeyEvent {
    pub fn down(key: KeyId, name: &str) -> KeyEvent {
        KeyEvent {
            kind: KeyEventKind::Down,
            key,
            name: name.to_string(),
        }
    }

    pub fn up(key: KeyId, name: &str) -> KeyEvent {
        KeyEvent {
            kind: KeyEventKind::Up,
            key,
            name: name.to_string(),
        }
    }
}

/// A source of key events. Drivers forward events into the channel until they stop.
pub trait Driver: Send + Sync + 'static {
    fn monitor_events(&self, events_tx: Sender<KeyEvent>) -> JoinHandle<Result<(), io::Error>>;
}

/// Returns the global keyboard hook driver. Installing the hook may require elevated
/// permissions (root or the input group on Linux, accessibility access on macOS).
#[cfg(feature = "hook")]
pub fn hook_driver() -> Result<Arc<dyn Driver>, Error> {
    Ok(Arc::new(hook::Driver::new()))
}

#[cfg(not(feature = "hook"))]
pub fn hook_driver() -> Result<Arc<dyn Driver>, Error> {
    Err(Error::Input(
        "keyclack was built without the \"hook\" feature".to_string(),
    ))
}
