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
//! Decodes audio files fully into memory.
//!
//! Clips are short, so each file is decoded in one pass at startup and resampled to
//! the output rate with a sinc resampler.

use std::fs::File;
use std::io;
use std::path::Path;

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::{get_codecs, get_probe};
use tracing::{debug, warn};

use super::Clip;
use crate::bank::ClipLoader;
use crate::error::Error;

/// Input block size for the sinc resampler.
const INPUT_BLOCK_SIZE: usize = 1024;

/// Interleaved samples decoded from a file at its native rate.
pub struct Decoded {
    pub samples: Vec<f32>,
    pub channel_count: u16,
    pub sample_rate: u32,
}

/// Decodes the given file with symphonia. Supports WAV, MP3 and the other formats
/// symphonia was built with.
pub fn decode_file(path: &Path) -> Result<Decoded, Error> {
    let decode_error = |message: String| Error::Decode {
        path: path.to_path_buf(),
        message,
    };

    let file = File::open(path).map_err(|e| decode_error(e.to_string()))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    // Help the format registry guess the format.
    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(extension);
    }

    let probed = get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| decode_error(e.to_string()))?;
    let mut format_reader = probed.format;

    let track = format_reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| decode_error("no audio track found".to_string()))?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate;
    let mut channel_count = track.codec_params.channels.map(|c| c.count() as u16);

    let mut decoder = get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| decode_error(e.to_string()))?;

    let mut samples = Vec::new();
    loop {
        let packet = match format_reader.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(decode_error(e.to_string())),
        };
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate.get_or_insert(spec.rate);
                channel_count.get_or_insert(spec.channels.count() as u16);

                let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buffer.copy_interleaved_ref(decoded);
                samples.extend_from_slice(buffer.samples());
            }
            // A corrupt packet is skipped rather than failing the whole clip.
            Err(SymphoniaError::DecodeError(e)) => {
                warn!(path = ?path, err = e, "Skipping undecodable packet");
            }
            Err(e) => return Err(decode_error(e.to_string())),
        }
    }

    match (channel_count, sample_rate) {
        (Some(channel_count), Some(sample_rate)) if channel_count > 0 => Ok(Decoded {
            samples,
            channel_count,
            sample_rate,
        }),
        _ => Err(decode_error(
            "unable to determine channel count or sample rate".to_string(),
        )),
    }
}

/// Resamples interleaved samples from one rate to another. The output has
/// `frames * target_rate / source_rate` frames (rounded) and is aligned with the input:
/// the resampler delay is trimmed off the front.
pub fn resample(
    samples: &[f32],
    channel_count: u16,
    source_rate: u32,
    target_rate: u32,
) -> Result<Vec<f32>, Error> {
    if source_rate == target_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }
    let failed = || Error::Resample(source_rate, target_rate);
    if source_rate == 0 || target_rate == 0 {
        return Err(failed());
    }

    let channels = channel_count.max(1) as usize;
    let ratio = target_rate as f64 / source_rate as f64;
    let sinc_params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        oversampling_factor: 128,
        interpolation: SincInterpolationType::Linear,
        window: WindowFunction::BlackmanHarris2,
    };
    let mut resampler =
        SincFixedIn::<f32>::new(ratio, 1.0, sinc_params, INPUT_BLOCK_SIZE, channels)
            .map_err(|_| failed())?;

    // rubato works on planar audio.
    let frames = samples.len() / channels;
    let planar: Vec<Vec<f32>> = (0..channels)
        .map(|channel| {
            samples
                .chunks_exact(channels)
                .map(|frame| frame[channel])
                .collect()
        })
        .collect();

    let expected = (frames as f64 * ratio).round() as usize;
    let delay = resampler.output_delay();
    let mut output = vec![Vec::with_capacity(expected + delay); channels];
    let mut scratch = resampler.output_buffer_allocate(true);

    let mut position = 0;
    while position < frames {
        let needed = resampler.input_frames_next();
        let produced = if frames - position >= needed {
            let block: Vec<&[f32]> = planar
                .iter()
                .map(|channel| &channel[position..position + needed])
                .collect();
            let (consumed, produced) = resampler
                .process_into_buffer(block.as_slice(), scratch.as_mut_slice(), None)
                .map_err(|_| failed())?;
            position += consumed;
            produced
        } else {
            let block: Vec<&[f32]> = planar.iter().map(|channel| &channel[position..]).collect();
            let (_, produced) = resampler
                .process_partial_into_buffer(Some(block.as_slice()), scratch.as_mut_slice(), None)
                .map_err(|_| failed())?;
            position = frames;
            produced
        };
        append_planar(&mut output, &scratch, produced);
    }

    // Flush what is still inside the filter.
    while output[0].len() < expected + delay {
        let (_, produced) = resampler
            .process_partial_into_buffer(None::<&[&[f32]]>, scratch.as_mut_slice(), None)
            .map_err(|_| failed())?;
        if produced == 0 {
            break;
        }
        append_planar(&mut output, &scratch, produced);
    }

    let available = output[0].len().saturating_sub(delay).min(expected);
    let mut interleaved = Vec::with_capacity(available * channels);
    for frame in delay..delay + available {
        for channel in &output {
            interleaved.push(channel[frame]);
        }
    }
    Ok(interleaved)
}

fn append_planar(output: &mut [Vec<f32>], block: &[Vec<f32>], frames: usize) {
    for (channel, samples) in output.iter_mut().zip(block) {
        channel.extend_from_slice(&samples[..frames]);
    }
}

/// Loads clips from disk at a fixed output sample rate.
pub struct Decoder {
    target_sample_rate: u32,
}

impl Decoder {
    pub fn new(target_sample_rate: u32) -> Decoder {
        Decoder { target_sample_rate }
    }
}

impl ClipLoader for Decoder {
    fn load(&self, path: &Path, volume: f32) -> Result<Clip, Error> {
        let decoded = decode_file(path)?;
        let samples = if decoded.sample_rate != self.target_sample_rate {
            debug!(
                path = ?path,
                source_rate = decoded.sample_rate,
                target_rate = self.target_sample_rate,
                "Resampling clip"
            );
            resample(
                &decoded.samples,
                decoded.channel_count,
                decoded.sample_rate,
                self.target_sample_rate,
            )?
        } else {
            decoded.samples
        };

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Clip::new(
            &name,
            samples,
            decoded.channel_count,
            self.target_sample_rate,
            volume,
        ))
    }
}
