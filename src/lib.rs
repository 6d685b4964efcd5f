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
//! Plays a mechanical keyboard sound every time a key is pressed.
//!
//! A sound set is a directory of clips. Every clip is decoded into the [`bank::SoundBank`]
//! at startup, and the [`dispatcher::KeyDispatcher`] maps each key press to one of them:
//! an override clip for the space bar or for every key if the set has one, otherwise a
//! clip chosen deterministically from the key's identity.

pub mod audio;
pub mod bank;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod input;
pub mod listener;
pub mod volume;
#[cfg(test)]
mod testutil;
