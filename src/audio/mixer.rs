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
// Sums overlapping clips into an interleaved output buffer. Used by the cpal output
// callback, and independent of any audio backend so it can be tested directly.
use std::collections::VecDeque;

use super::Clip;

/// One in-flight playback of a clip.
struct Voice {
    clip: Clip,
    /// The next frame to mix.
    frame: usize,
}

impl Voice {
    fn is_finished(&self) -> bool {
        self.frame >= self.clip.frames()
    }
}

/// Mixes active voices into output frames.
pub struct Mixer {
    voices: VecDeque<Voice>,
    num_channels: u16,
    max_voices: usize,
}

impl Mixer {
    /// Creates a new mixer for the given number of output channels.
    pub fn new(num_channels: u16, max_voices: usize) -> Self {
        Self {
            voices: VecDeque::with_capacity(max_voices),
            num_channels: num_channels.max(1),
            max_voices: max_voices.max(1),
        }
    }

    /// Starts a new voice. When the voice limit is reached the oldest voice is cut off.
    /// Returns the number of voices cut off. Runs on the output callback, so it must not
    /// log or allocate.
    pub fn add(&mut self, clip: Clip) -> usize {
        let mut stolen = 0;
        while self.voices.len() >= self.max_voices && self.voices.pop_front().is_some() {
            stolen += 1;
        }
        self.voices.push_back(Voice { clip, frame: 0 });
        stolen
    }

    /// Returns the number of voices still playing.
    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    /// Overwrites `output` (interleaved, `num_channels` wide) with the next block of
    /// mixed audio and drops voices that have finished.
    ///
    /// Mono clips are sent to every output channel. A mono output gets the average of
    /// the clip's channels. Otherwise channels are mapped one to one, wrapping when the
    /// output is wider than the clip.
    pub fn mix_into(&mut self, output: &mut [f32]) {
        output.fill(0.0);

        let out_channels = self.num_channels as usize;
        let frames = output.len() / out_channels;

        for voice in self.voices.iter_mut() {
            let clip_channels = voice.clip.channel_count() as usize;
            let to_mix = frames.min(voice.clip.frames().saturating_sub(voice.frame));
            let volume = voice.clip.volume();
            let data = voice.clip.data();

            for frame in 0..to_mix {
                let source = (voice.frame + frame) * clip_channels;
                let target = frame * out_channels;
                if out_channels == 1 {
                    let sum: f32 = data[source..source + clip_channels].iter().sum();
                    output[target] += sum / clip_channels as f32 * volume;
                    continue;
                }
                for channel in 0..out_channels {
                    output[target + channel] += data[source + channel % clip_channels] * volume;
                }
            }
            voice.frame += to_mix;
        }

        self.voices.retain(|voice| !voice.is_finished());

        for sample in output.iter_mut() {
            *sample = sample.clamp(-1.0, 1.0);
        }
    }
}
