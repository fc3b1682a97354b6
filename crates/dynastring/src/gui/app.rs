//! Main iced application.

use std::time::Duration;

use iced::widget::{container, row, Canvas};
use iced::{Element, Length, Size, Subscription, Task, Theme};
use tracing::error;

use super::canvas::StringCanvas;
use super::controls;
use crate::audio::{AudioOutput, EngineCommand};
use crate::simulation::{StringConfig, WaveformSnapshot};

/// Default construction parameters for the demo instrument.
const DEFAULT_WAVE_SPEED: f64 = 600.0;
const DEFAULT_LENGTH: f64 = 1.0;
const DEFAULT_SAMPLE_RATE: f64 = 44_100.0;
const DEFAULT_MAX_POINTS: usize = 200;

/// Upper bound of the wave-speed slider.
const MAX_SLIDER_SPEED: f64 = 2_000.0;

/// Amplitude added by a canvas-click pluck.
const PLUCK_AMPLITUDE: f64 = 0.3;

/// The main application.
pub struct StringApp {
    audio: Option<AudioOutput>,
    audio_error: Option<String>,
    canvas: StringCanvas,
    stats: WaveformSnapshot,
    wave_speed: f64,
    min_speed: f64,
    tap_position: f64,
    correction_on: bool,
}

/// Messages for the application.
#[derive(Debug, Clone)]
pub enum Message {
    /// Wave-speed slider changed.
    SpeedChanged(f64),
    /// Output tap position slider changed.
    TapChanged(f64),
    /// Displacement correction toggled.
    CorrectionToggled(bool),
    /// Reset button pressed.
    Reset,
    /// User clicked the canvas at a fractional string position.
    CanvasClick(f64),
    /// Display refresh tick (~15 Hz).
    Tick,
}

impl StringApp {
    /// Build the engine, start the audio output and create the UI state.
    pub fn new() -> (Self, Task<Message>) {
        let config = StringConfig::new(
            DEFAULT_WAVE_SPEED,
            DEFAULT_LENGTH,
            DEFAULT_SAMPLE_RATE,
            DEFAULT_MAX_POINTS,
        )
        .expect("default configuration is valid");

        let (audio, audio_error, min_speed) = match AudioOutput::start(config.clone()) {
            Ok(audio) => {
                // The device dictates the rate; the slider's lower bound is
                // the speed at which the grid reaches capacity.
                let min = DEFAULT_LENGTH * audio.sample_rate() as f64 / DEFAULT_MAX_POINTS as f64;
                (Some(audio), None, min)
            }
            Err(e) => {
                error!("failed to start audio output: {}", e);
                (None, Some(e.to_string()), config.min_wave_speed())
            }
        };

        (
            Self {
                audio,
                audio_error,
                canvas: StringCanvas::new(),
                stats: WaveformSnapshot::default(),
                wave_speed: DEFAULT_WAVE_SPEED,
                min_speed,
                tap_position: 0.2,
                correction_on: true,
            },
            Task::none(),
        )
    }

    /// Application title.
    pub fn title(&self) -> String {
        format!(
            "Dynastring - {} points (alpha = {:.3})",
            self.stats.n_int, self.stats.alpha
        )
    }

    /// Handle messages.
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::SpeedChanged(speed) => {
                self.wave_speed = speed;
                if let Some(audio) = &self.audio {
                    audio.controls().set_wave_speed(speed);
                }
            }

            Message::TapChanged(ratio) => {
                self.tap_position = ratio;
                if let Some(audio) = &self.audio {
                    audio.controls().set_tap_position(ratio);
                }
            }

            Message::CorrectionToggled(enabled) => {
                self.correction_on = enabled;
                if let Some(audio) = &self.audio {
                    audio.send(EngineCommand::SetCorrection(enabled));
                }
            }

            Message::Reset => {
                if let Some(audio) = &self.audio {
                    audio.send(EngineCommand::Reset);
                }
            }

            Message::CanvasClick(ratio) => {
                if let Some(audio) = &self.audio {
                    audio.send(EngineCommand::Pluck {
                        ratio,
                        amplitude: PLUCK_AMPLITUDE,
                    });
                }
            }

            Message::Tick => {
                if let Some(audio) = &self.audio {
                    {
                        let snapshot = audio.snapshot().lock();
                        self.stats = snapshot.clone();
                    }
                    self.canvas.update_waveform(
                        &self.stats.u,
                        &self.stats.w,
                        self.stats.n,
                        self.stats.alpha,
                    );
                }
            }
        }

        Task::none()
    }

    /// Build the view.
    pub fn view(&self) -> Element<'_, Message> {
        let canvas = Canvas::new(&self.canvas)
            .width(Length::Fill)
            .height(Length::Fill);

        let panel = controls::view_controls(
            self.wave_speed,
            self.min_speed,
            MAX_SLIDER_SPEED,
            self.tap_position,
            self.correction_on,
            &self.stats,
            self.audio_error.as_deref(),
        );

        let content = row![
            container(canvas)
                .width(Length::FillPortion(3))
                .height(Length::Fill)
                .padding(10),
            container(panel)
                .width(Length::FillPortion(1))
                .height(Length::Fill)
                .padding(10),
        ];

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Display refresh subscription (~15 Hz).
    pub fn subscription(&self) -> Subscription<Message> {
        iced::time::every(Duration::from_millis(66)).map(|_| Message::Tick)
    }

    /// Theme.
    pub fn theme(&self) -> Theme {
        Theme::Dark
    }
}

impl Default for StringApp {
    fn default() -> Self {
        Self::new().0
    }
}

/// Run the application.
pub fn run() -> iced::Result {
    iced::application(StringApp::title, StringApp::update, StringApp::view)
        .subscription(StringApp::subscription)
        .theme(StringApp::theme)
        .window_size(Size::new(1100.0, 700.0))
        .antialiasing(true)
        .run_with(StringApp::new)
}
