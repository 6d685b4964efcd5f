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
use std::path::PathBuf;

/// Errors that stop keyclack from starting or keep the listener from running.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no sound set provided, usage: keyclack <sound_set> [volume_percent]")]
    MissingSoundSet,

    #[error("sound set '{name}' not found in {}", .root.display())]
    SoundSetNotFound { name: String, root: PathBuf },

    #[error("invalid volume '{0}': expected an integer percentage")]
    InvalidVolume(String),

    #[error("sound set {} has no clips outside of the override names", .0.display())]
    EmptyPool(PathBuf),

    #[error("failed to decode {}: {message}", .path.display())]
    Decode { path: PathBuf, message: String },

    #[error("failed to resample from {0} Hz to {1} Hz")]
    Resample(u32, u32),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("config load/parse error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("audio device error: {0}")]
    Audio(String),

    #[error("keyboard input error: {0}")]
    Input(String),
}
