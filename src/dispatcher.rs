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
//! Turns key transitions into clip playback.
//!
//! The dispatcher tracks the last key reported down. A key-down for that same key is
//! an OS auto-repeat and is ignored; any key-up clears it. A key-down for a different
//! key (rollover) always plays.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, error};

use crate::audio::{Clip, Device};
use crate::bank::SoundBank;
use crate::config::Config;
use crate::error::Error;
use crate::input::{KeyEvent, KeyEventKind, KeyId};

/// Which branch produced a playback, with the name of the clip that was played.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Trigger {
    /// The primary key was pressed and the primary override clip played.
    Primary(String),
    /// The secondary override clip played for a non-primary key.
    Secondary(String),
    /// The clip selected for the key played.
    Selected(String),
}

/// Picks the clip for a key. The draw is seeded by the key identity alone, so the same
/// key always gets the same clip from the same pool.
pub fn select(key: KeyId, pool: &[Clip]) -> Option<&Clip> {
    let mut rng = StdRng::seed_from_u64(key.code());
    pool.choose(&mut rng)
}

/// Owns the loaded clips and the held-key state, and plays clips on key presses.
pub struct KeyDispatcher {
    device: Arc<dyn Device>,
    /// Clips eligible for per-key selection, in filename order. Never empty.
    pool: Vec<Clip>,
    primary_key: String,
    primary: Option<Clip>,
    secondary: Option<Clip>,
    /// The last key reported down, if it hasn't been released.
    held: Option<KeyId>,
}

impl KeyDispatcher {
    /// Creates a dispatcher from a fully loaded bank. Fails if no clip is left for
    /// per-key selection once the override clips are set aside.
    pub fn new(
        bank: SoundBank,
        config: &Config,
        device: Arc<dyn Device>,
    ) -> Result<KeyDispatcher, Error> {
        let pool = bank.pool(&config.reserved_prefixes());
        if pool.is_empty() {
            return Err(Error::EmptyPool(bank.dir().to_path_buf()));
        }

        let primary = bank.lookup_named(config.primary_override()).cloned();
        let secondary = bank.lookup_named(config.secondary_override()).cloned();
        debug!(
            pool = pool.len(),
            primary = primary.as_ref().map(|clip| clip.name()),
            secondary = secondary.as_ref().map(|clip| clip.name()),
            "Dispatcher ready"
        );

        Ok(KeyDispatcher {
            device,
            pool,
            primary_key: config.primary_key().to_string(),
            primary,
            secondary,
            held: None,
        })
    }

    /// Returns the clip selected for the key.
    pub fn select(&self, key: KeyId) -> &Clip {
        // The pool is checked to be non-empty on construction.
        select(key, &self.pool).unwrap_or(&self.pool[0])
    }

    /// Handles one key transition. Returns the trigger if playback was requested.
    /// Playback errors are logged and do not affect the held-key state.
    pub fn on_key_event(&mut self, event: &KeyEvent) -> Option<Trigger> {
        match event.kind {
            KeyEventKind::Up => {
                self.held = None;
                None
            }
            KeyEventKind::Down => {
                if self.held == Some(event.key) {
                    return None;
                }
                self.held = Some(event.key);

                let (trigger, clip) = self.resolve(event);
                debug!(key = %event.key, name = event.name, clip = clip.name(), "Key pressed");
                if let Err(e) = self.device.play(clip) {
                    error!(clip = clip.name(), err = %e, "Failed to play clip");
                }
                Some(trigger)
            }
        }
    }

    fn resolve(&self, event: &KeyEvent) -> (Trigger, &Clip) {
        if event.name.eq_ignore_ascii_case(&self.primary_key) {
            if let Some(primary) = &self.primary {
                return (Trigger::Primary(primary.name().to_string()), primary);
            }
        }

        if let Some(secondary) = &self.secondary {
            return (Trigger::Secondary(secondary.name().to_string()), secondary);
        }

        let clip = self.select(event.key);
        (Trigger::Selected(clip.name().to_string()), clip)
    }

    /// The key currently tracked as held.
    pub fn held(&self) -> Option<KeyId> {
        self.held
    }

    /// Number of clips available for per-key selection.
    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }
}
