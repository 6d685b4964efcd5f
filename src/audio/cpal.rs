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
        atomic::{AtomicUsize, Ordering},
        mpsc, Arc,
    },
    thread,
};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{debug, error, info, span, Level};

use super::{mixer::Mixer, Clip};

/// Frames mixed per pass of the output callback. Larger device buffers are mixed in
/// several passes.
const MIX_BLOCK_FRAMES: usize = 1024;

/// A small wrapper around a cpal::Device. The output stream lives on its own thread
/// and receives new voices over a channel, so play never waits on the audio callback.
pub struct Device {
    /// The name of the device.
    name: String,
    /// The host ID of the device.
    host_id: cpal::HostId,
    /// The output sample rate.
    sample_rate: u32,
    /// The number of output channels.
    channels: u16,
    /// Sends new voices to the output callback.
    voice_tx: crossbeam_channel::Sender<Clip>,
    /// Voices cut off by the voice limit since the last play.
    stolen: Arc<AtomicUsize>,
    /// Handle to the output thread (keeps the stream alive).
    _output_thread: thread::JoinHandle<()>,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Channels={}, Rate={}) ({})",
            self.name,
            self.channels,
            self.sample_rate,
            self.host_id.name()
        )
    }
}

impl Device {
    /// Lists the output devices of every available host.
    pub fn list() -> Result<Vec<String>, Box<dyn Error>> {
        let mut devices = Vec::new();
        for host_id in cpal::available_hosts() {
            let host = cpal::host_from_id(host_id)?;
            for device in host.output_devices()? {
                match device.description() {
                    Ok(description) => {
                        devices.push(format!("{} ({})", description.name(), host_id.name()))
                    }
                    Err(e) => error!(
                        host = host_id.name(),
                        err = e.to_string(),
                        "Unable to describe device"
                    ),
                }
            }
        }
        Ok(devices)
    }

    /// Opens the named output device (or the default output device) and starts its
    /// output stream.
    pub fn get(name: Option<&str>, max_voices: usize) -> Result<Device, Box<dyn Error>> {
        let host = cpal::default_host();
        let host_id = host.id();
        let device = match name {
            Some(name) => host
                .output_devices()?
                .find(|device| {
                    device
                        .description()
                        .map(|description| description.name() == name)
                        .unwrap_or(false)
                })
                .ok_or_else(|| format!("no output device named '{}'", name))?,
            None => host
                .default_output_device()
                .ok_or("no default output device")?,
        };
        let name = device.description()?.name().to_string();

        let supported = device.default_output_config()?;
        let sample_format = supported.sample_format();
        let config = supported.config();
        let sample_rate = config.sample_rate;
        let channels = config.channels;

        let (voice_tx, voice_rx) = crossbeam_channel::unbounded::<Clip>();
        let stolen = Arc::new(AtomicUsize::new(0));
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), String>>();

        // cpal streams are not Send on every platform, so the stream is built and
        // held on the thread that owns it.
        let output_thread = {
            let name = name.clone();
            let stolen = stolen.clone();
            thread::spawn(move || {
                let span = span!(Level::INFO, "audio output");
                let _enter = span.enter();

                let stream = match sample_format {
                    cpal::SampleFormat::F32 => {
                        build_stream::<f32>(&device, &config, voice_rx, max_voices, stolen)
                    }
                    cpal::SampleFormat::I16 => {
                        build_stream::<i16>(&device, &config, voice_rx, max_voices, stolen)
                    }
                    cpal::SampleFormat::U16 => {
                        build_stream::<u16>(&device, &config, voice_rx, max_voices, stolen)
                    }
                    cpal::SampleFormat::I32 => {
                        build_stream::<i32>(&device, &config, voice_rx, max_voices, stolen)
                    }
                    other => {
                        let _ = ready_tx.send(Err(format!("unsupported sample format {}", other)));
                        return;
                    }
                };

                let stream = match stream.and_then(|stream| {
                    stream
                        .play()
                        .map(|_| stream)
                        .map_err(|e| e.to_string())
                }) {
                    Ok(stream) => stream,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                info!(device = name, sample_rate, channels, "Output stream started");
                let _ = ready_tx.send(Ok(()));

                // Keep the stream alive for the life of the process.
                let _stream = stream;
                loop {
                    thread::park();
                }
            })
        };

        ready_rx
            .recv()
            .map_err(|_| "audio output thread exited before starting")??;

        Ok(Device {
            name,
            host_id,
            sample_rate,
            channels,
            voice_tx,
            stolen,
            _output_thread: output_thread,
        })
    }
}

/// Builds an output stream whose callback drains new voices and mixes them into the
/// device's native sample type.
fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    voice_rx: crossbeam_channel::Receiver<Clip>,
    max_voices: usize,
    stolen: Arc<AtomicUsize>,
) -> Result<cpal::Stream, String>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let mut mixer = Mixer::new(config.channels, max_voices);
    let mut scratch = vec![0.0f32; MIX_BLOCK_FRAMES * config.channels.max(1) as usize];

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                while let Ok(clip) = voice_rx.try_recv() {
                    let cut = mixer.add(clip);
                    if cut > 0 {
                        stolen.fetch_add(cut, Ordering::Relaxed);
                    }
                }

                for block in data.chunks_mut(scratch.len()) {
                    let mixed = &mut scratch[..block.len()];
                    mixer.mix_into(mixed);
                    for (dst, &src) in block.iter_mut().zip(mixed.iter()) {
                        *dst = T::from_sample(src);
                    }
                }
            },
            |err| error!("CPAL output stream error: {}", err),
            None,
        )
        .map_err(|e| e.to_string())
}

impl super::Device for Device {
    fn play(&self, clip: &Clip) -> Result<(), Box<dyn Error>> {
        let stolen = self.stolen.swap(0, Ordering::Relaxed);
        if stolen > 0 {
            debug!(stolen, "Voice limit reached, stopped the oldest voices");
        }

        self.voice_tx.send(clip.clone())?;
        Ok(())
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
