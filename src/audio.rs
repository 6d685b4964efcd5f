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
use std::{error::Error, fmt, sync::Arc, time::Duration};

use crate::config;

pub mod cpal;
pub mod decode;
pub mod mixer;
pub mod mock;

/// A decoded clip held entirely in memory. The sample data is shared, so cloning a
/// clip for every key press is cheap.
#[derive(Clone)]
pub struct Clip {
    /// The filename the clip was loaded from, including the extension.
    name: Arc<str>,
    /// Interleaved f32 samples.
    data: Arc<Vec<f32>>,
    channel_count: u16,
    sample_rate: u32,
    /// Playback volume in [0.0, 1.0].
    volume: f32,
}

impl Clip {
    pub fn new(
        name: &str,
        data: Vec<f32>,
        channel_count: u16,
        sample_rate: u32,
        volume: f32,
    ) -> Clip {
        Clip {
            name: Arc::from(name),
            data: Arc::new(data),
            channel_count: channel_count.max(1),
            sample_rate,
            volume: volume.clamp(0.0, 1.0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn channel_count(&self) -> u16 {
        self.channel_count
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.data.len() / self.channel_count as usize
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }

    /// Returns the memory size in bytes.
    pub fn memory_size(&self) -> usize {
        self.data.len() * std::mem::size_of::<f32>()
    }
}

impl fmt::Debug for Clip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clip")
            .field("name", &self.name)
            .field("channels", &self.channel_count)
            .field("sample_rate", &self.sample_rate)
            .field("duration_ms", &self.duration().as_millis())
            .field("volume", &self.volume)
            .finish()
    }
}

/// An audio output that plays clips fire-and-forget.
pub trait Device: fmt::Display + Send + Sync {
    /// Starts playing the clip and returns without waiting for it to finish.
    /// Clips played in quick succession overlap.
    fn play(&self, clip: &Clip) -> Result<(), Box<dyn Error>>;

    /// The output sample rate. Clips should be decoded to this rate.
    fn sample_rate(&self) -> u32;
}

/// Lists output devices known to cpal.
pub fn list_devices() -> Result<Vec<String>, Box<dyn Error>> {
    cpal::Device::list()
}

/// Gets the configured device, or the host default output device if none is named.
pub fn get_device(config: &config::Audio) -> Result<Arc<dyn Device>, Box<dyn Error>> {
    if let Some(device) = config.device() {
        if device.starts_with("mock") {
            return Ok(Arc::new(mock::Device::get(device)));
        }
    }

    Ok(Arc::new(cpal::Device::get(
        config.device(),
        config.max_voices(),
    )?))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_clip() {
        let clip = Clip::new("a.wav", vec![0.0; 882], 2, 44100, 1.5);
        assert_eq!("a.wav", clip.name());
        assert_eq!(441, clip.frames());
        assert_eq!(10, clip.duration().as_millis());
        assert_eq!(1.0, clip.volume());
        assert_eq!(882 * 4, clip.memory_size());

        let shared = clip.clone();
        assert!(std::ptr::eq(clip.data().as_ptr(), shared.data().as_ptr()));
    }

    #[test]
    fn test_get_mock_device() {
        let device = get_device(&config::Audio::new("mock-test")).unwrap();
        assert_eq!("mock-test (Mock)", device.to_string());
        assert_eq!(mock::DEFAULT_SAMPLE_RATE, device.sample_rate());
    }
}
