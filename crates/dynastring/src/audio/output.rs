//! Real-time audio output driving the per-sample simulation loop.
//!
//! The engine lives on the cpal callback thread and is advanced exactly
//! once per output frame: apply the pending wave speed, advance, rotate,
//! read the tap, limit. Control values arrive through single-value atomic
//! snapshots (single writer, single reader, applied at sample boundaries
//! only); discrete commands arrive through a bounded channel drained once
//! per callback. The display snapshot is published with `try_lock` so the
//! audio thread never blocks on the GUI.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{bounded, Sender};
use parking_lot::Mutex;
use tracing::{error, info, warn};

use crate::audio::limit;
use crate::error::{Result, StringError};
use crate::simulation::{DynamicString, StringConfig, WaveformSnapshot};

/// Single-writer/single-reader control snapshot shared with the UI.
///
/// `f64` values are exchanged through bit-cast atomics; the audio thread
/// loads each value once per sample boundary, so the grid-size derivation
/// can never observe a torn update.
#[derive(Debug)]
pub struct SharedControls {
    wave_speed_bits: AtomicU64,
    tap_position_bits: AtomicU64,
}

impl SharedControls {
    /// Create controls with initial values.
    pub fn new(wave_speed: f64, tap_position: f64) -> Self {
        Self {
            wave_speed_bits: AtomicU64::new(wave_speed.to_bits()),
            tap_position_bits: AtomicU64::new(tap_position.to_bits()),
        }
    }

    /// Store a new wave speed (UI side).
    pub fn set_wave_speed(&self, wave_speed: f64) {
        self.wave_speed_bits
            .store(wave_speed.to_bits(), Ordering::Relaxed);
    }

    /// Load the current wave speed (audio side).
    pub fn wave_speed(&self) -> f64 {
        f64::from_bits(self.wave_speed_bits.load(Ordering::Relaxed))
    }

    /// Store a new output tap position (UI side).
    pub fn set_tap_position(&self, ratio: f64) {
        self.tap_position_bits
            .store(ratio.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }

    /// Load the current output tap position (audio side).
    pub fn tap_position(&self) -> f64 {
        f64::from_bits(self.tap_position_bits.load(Ordering::Relaxed))
    }
}

/// Discrete commands from the UI, drained once per audio callback.
#[derive(Debug, Clone, Copy)]
pub enum EngineCommand {
    /// Zero the state and re-seed the initial excitation.
    Reset,
    /// Add a displacement pulse at a fractional position.
    Pluck {
        /// Position along the string in `[0, 1]`.
        ratio: f64,
        /// Peak displacement to add.
        amplitude: f64,
    },
    /// Enable or disable the displacement-correction stage.
    SetCorrection(bool),
}

/// Capacity of the command queue.
const COMMAND_CAPACITY: usize = 16;

/// Running audio output: owns the device stream and the engine inside its
/// callback.
pub struct AudioOutput {
    controls: Arc<SharedControls>,
    snapshot: Arc<Mutex<WaveformSnapshot>>,
    commands: Sender<EngineCommand>,
    sample_rate: u32,
    // Keep the stream alive for as long as the output exists.
    _stream: cpal::Stream,
}

impl AudioOutput {
    /// Open the default output device, rebuild the engine against the
    /// device sample rate and start the real-time loop.
    pub fn start(config: StringConfig) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| StringError::device("no default output device"))?;
        let device_name = device.name().unwrap_or_else(|_| "unknown".to_string());

        let supported = device
            .default_output_config()
            .map_err(|e| StringError::device(format!("failed to get device config: {}", e)))?;
        let sample_rate = supported.sample_rate().0;
        let channels = supported.channels() as usize;
        info!(
            "using output device: {} ({} Hz, {} channels)",
            device_name, sample_rate, channels
        );

        let config = config.with_sample_rate(sample_rate as f64)?;
        let mut string = DynamicString::new(config.clone())?;

        let controls = Arc::new(SharedControls::new(config.params.wave_speed, 0.2));
        let snapshot = Arc::new(Mutex::new(WaveformSnapshot::default()));
        let (command_tx, command_rx) = bounded::<EngineCommand>(COMMAND_CAPACITY);

        let controls_cb = controls.clone();
        let snapshot_cb = snapshot.clone();

        let stream_config = cpal::StreamConfig {
            channels: channels as u16,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    for command in command_rx.try_iter() {
                        match command {
                            EngineCommand::Reset => string.reset(),
                            EngineCommand::Pluck { ratio, amplitude } => {
                                string.inject(ratio, amplitude)
                            }
                            EngineCommand::SetCorrection(enabled) => {
                                string.set_displacement_correction(enabled)
                            }
                        }
                    }

                    let tap = controls_cb.tap_position();
                    for frame in data.chunks_mut(channels) {
                        string.set_wave_speed(controls_cb.wave_speed());
                        string.advance();
                        string.rotate();
                        let sample = limit(string.read_output(tap)) as f32;
                        for out in frame.iter_mut() {
                            *out = sample;
                        }
                    }

                    // Non-blocking publish of the display state; a
                    // contended lock just skips this buffer's snapshot.
                    if let Some(mut snap) = snapshot_cb.try_lock() {
                        string.snapshot_into(&mut snap);
                    }
                },
                move |err| {
                    error!("audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| StringError::device(format!("failed to build stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| StringError::device(format!("failed to start stream: {}", e)))?;

        info!("audio output started");

        Ok(Self {
            controls,
            snapshot,
            commands: command_tx,
            sample_rate,
            _stream: stream,
        })
    }

    /// Control snapshot shared with the audio thread.
    pub fn controls(&self) -> &Arc<SharedControls> {
        &self.controls
    }

    /// Most recent display snapshot.
    pub fn snapshot(&self) -> &Arc<Mutex<WaveformSnapshot>> {
        &self.snapshot
    }

    /// Send a command to the engine; full queues drop the command with a
    /// warning rather than block.
    pub fn send(&self, command: EngineCommand) {
        if self.commands.try_send(command).is_err() {
            warn!("engine command queue full, dropping {:?}", command);
        }
    }

    /// Sample rate the engine runs at.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// Run the full per-sample sequence without an audio device and collect
/// the limited output. Used by tests and WAV export.
pub fn render_offline(config: StringConfig, tap: f64, samples: usize) -> Result<Vec<f32>> {
    let mut string = DynamicString::new(config)?;
    let mut out = Vec::with_capacity(samples);
    for _ in 0..samples {
        string.advance();
        string.rotate();
        out.push(limit(string.read_output(tap)) as f32);
    }
    Ok(out)
}
