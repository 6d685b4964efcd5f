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
use serde::Deserialize;

const DEFAULT_MAX_VOICES: usize = 32;

/// A YAML representation of the audio output configuration.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct Audio {
    /// The audio device. Uses the host default output device when unset.
    /// Names starting with "mock" select a silent device.
    device: Option<String>,

    /// The maximum number of clips that may sound at once (default: 32).
    /// When exceeded, the oldest clip is cut off.
    max_voices: Option<usize>,
}

impl Audio {
    /// New will create a new Audio configuration for the given device.
    pub fn new(device: &str) -> Audio {
        Audio {
            device: Some(device.to_string()),
            max_voices: None,
        }
    }

    /// Replaces the device, keeping the rest of the configuration.
    pub fn set_device(&mut self, device: &str) {
        self.device = Some(device.to_string());
    }

    /// Returns the device from the configuration.
    pub fn device(&self) -> Option<&str> {
        self.device.as_deref()
    }

    /// Returns the polyphony limit, never less than one.
    pub fn max_voices(&self) -> usize {
        self.max_voices.unwrap_or(DEFAULT_MAX_VOICES).max(1)
    }
}
