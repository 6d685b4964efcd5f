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

use std::{any::TypeId, error::Error, fs::File, path::PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::audio::Clip;

/// Frames in the click written by write_click.
pub const CLICK_FRAMES: usize = 441;

/// A tiny silent mono clip with the given name, for tests that never decode.
pub fn clip(name: &str, volume: f32) -> Clip {
    Clip::new(name, vec![0.0; 16], 1, 44100, volume)
}

/// Writes a wav file with one Vec of samples per channel. Samples are interleaved on
/// write.
pub fn write_wav<S: hound::Sample + Copy + 'static>(
    path: PathBuf,
    samples: Vec<Vec<S>>,
    sample_rate: u32,
) -> Result<(), Box<dyn Error>> {
    let (sample_format, bits_per_sample) = if TypeId::of::<S>() == TypeId::of::<f32>() {
        (SampleFormat::Float, 32)
    } else if TypeId::of::<S>() == TypeId::of::<i32>() {
        (SampleFormat::Int, 32)
    } else if TypeId::of::<S>() == TypeId::of::<i16>() {
        (SampleFormat::Int, 16)
    } else {
        return Err("Unsupported sample format".into());
    };

    let num_channels = samples.len();
    assert!(num_channels <= u16::MAX.into(), "Too many channels!");
    let frames = samples.iter().map(Vec::len).min().unwrap_or(0);

    let mut writer = WavWriter::new(
        File::create(path)?,
        WavSpec {
            channels: num_channels as u16,
            sample_rate,
            bits_per_sample,
            sample_format,
        },
    )?;
    for frame in 0..frames {
        for channel in &samples {
            writer.write_sample(channel[frame])?;
        }
    }
    writer.finalize()?;

    Ok(())
}

/// Writes a short decaying mono click, like a key switch bottoming out.
pub fn write_click(path: PathBuf, sample_rate: u32) -> Result<(), Box<dyn Error>> {
    let samples: Vec<i16> = (0..CLICK_FRAMES)
        .map(|i| {
            let decay = 1.0 - i as f32 / CLICK_FRAMES as f32;
            let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
            (sign * decay * 8000.0) as i16
        })
        .collect();
    write_wav(path, vec![samples], sample_rate)
}
