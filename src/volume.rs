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
use std::str::FromStr;

use tracing::warn;

use crate::error::Error;

/// The volume used when none is given on the command line.
pub const DEFAULT_VOLUME_PERCENT: u32 = 100;

/// A playback volume scalar in [0.0, 1.0].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Volume(f32);

impl Volume {
    /// Converts an integer percentage into a volume. Percentages above 100 are clamped.
    pub fn from_percent(percent: u32) -> Volume {
        if percent > DEFAULT_VOLUME_PERCENT {
            warn!(percent, "Volume above 100%, clamping.");
        }
        Volume(percent.min(DEFAULT_VOLUME_PERCENT) as f32 / 100.0)
    }

    /// Returns the volume as a scalar.
    pub fn scalar(&self) -> f32 {
        self.0
    }
}

impl Default for Volume {
    fn default() -> Self {
        Volume::from_percent(DEFAULT_VOLUME_PERCENT)
    }
}

impl FromStr for Volume {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(Volume::from_percent)
            .map_err(|_| Error::InvalidVolume(s.to_string()))
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", (self.0 * 100.0).round() as u32)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_volume() {
        assert_eq!(0.5, "50".parse::<Volume>().unwrap().scalar());
        assert_eq!(0.0, "0".parse::<Volume>().unwrap().scalar());
        assert_eq!(1.0, " 100 ".parse::<Volume>().unwrap().scalar());
        assert_eq!(1.0, Volume::default().scalar());
    }

    #[test]
    fn test_volume_clamped() {
        assert_eq!(1.0, "150".parse::<Volume>().unwrap().scalar());
    }

    #[test]
    fn test_invalid_volume() {
        for input in ["abc", "12.5", "-10", ""] {
            match input.parse::<Volume>() {
                Err(Error::InvalidVolume(value)) => assert_eq!(input, value),
                other => panic!("expected invalid volume for {:?}, got {:?}", input, other),
            }
        }
    }

    #[test]
    fn test_display() {
        assert_eq!("75%", Volume::from_percent(75).to_string());
    }
}
