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
use std::{
    error::Error,
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use parking_lot::Mutex;
use tracing::info;

use super::Clip;

/// The sample rate mock devices report.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// A mock device. Doesn't actually play anything, but remembers what it was asked to play.
#[derive(Clone)]
pub struct Device {
    name: String,
    played: Arc<Mutex<Vec<String>>>,
    failing: Arc<AtomicBool>,
}

impl Device {
    /// Gets the given mock device.
    pub fn get(name: &str) -> Device {
        Device {
            name: name.to_string(),
            played: Arc::new(Mutex::new(Vec::new())),
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns the names of every clip played so far, in order.
    pub fn played(&self) -> Vec<String> {
        self.played.lock().clone()
    }

    /// When failing, every play request returns an error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }
}

impl super::Device for Device {
    fn play(&self, clip: &Clip) -> Result<(), Box<dyn Error>> {
        if self.failing.load(Ordering::Relaxed) {
            return Err(format!("mock device {} refused to play {}", self.name, clip.name()).into());
        }

        info!(device = self.name, clip = clip.name(), "Playing clip.");
        self.played.lock().push(clip.name().to_string());
        Ok(())
    }

    fn sample_rate(&self) -> u32 {
        DEFAULT_SAMPLE_RATE
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Mock)", self.name)
    }
}
