//! Control panel widgets.

use iced::widget::{button, column, slider, text, toggler, vertical_space};
use iced::{Element, Length};

use super::app::Message;
use crate::simulation::WaveformSnapshot;

/// Build the controls panel.
pub fn view_controls(
    wave_speed: f64,
    min_speed: f64,
    max_speed: f64,
    tap_position: f64,
    correction_on: bool,
    stats: &WaveformSnapshot,
    audio_error: Option<&str>,
) -> Element<'static, Message> {
    let speed_section = column![
        text(format!("Wave Speed: {:.0} m/s", wave_speed)).size(14),
        slider(min_speed..=max_speed, wave_speed, Message::SpeedChanged).width(Length::Fill),
        text(format!(
            "({:.0} m/s fills the grid, {:.0} max)",
            min_speed, max_speed
        ))
        .size(11),
    ]
    .spacing(5);

    let tap_section = column![
        text(format!("Output Tap: {:.2} L", tap_position)).size(14),
        slider(0.0..=1.0, tap_position, Message::TapChanged)
            .step(0.01)
            .width(Length::Fill),
        text("(pickup position along the string)").size(11),
    ]
    .spacing(5);

    let correction_section = column![
        toggler(correction_on)
            .label("Displacement correction")
            .on_toggle(Message::CorrectionToggled),
        text("(keeps the junction consistent)").size(11),
    ]
    .spacing(5);

    let reset_btn = button(text("Reset").size(16))
        .on_press(Message::Reset)
        .width(80);

    let stats_panel = column![
        text("Grid").size(16),
        text(format!("N: {:.2} ({} points)", stats.n, stats.n_int)).size(12),
        text(format!("alpha: {:.4}", stats.alpha)).size(12),
        text(format!("M / Mw: {} / {}", stats.m, stats.mw)).size(12),
        text(format!("Speed in effect: {:.1} m/s", stats.wave_speed)).size(12),
        vertical_space().height(5),
        text("Health").size(16),
        text(format!("Energy: {:.4}", stats.total_energy)).size(12),
        text(format!("Transitions: {}", stats.transitions)).size(12),
        text(format!("Speed clamps: {}", stats.clamp_events)).size(12),
        text(format!("Rate violations: {}", stats.rate_violations)).size(12),
    ]
    .spacing(3);

    let instructions = column![
        text("Instructions").size(16),
        text("Click the string to pluck it").size(12),
        text("Sweep the speed to grow/shrink").size(12),
        text("the grid while audio runs").size(12),
    ]
    .spacing(3);

    let mut panel = column![
        text("Dynastring Controls").size(20),
        vertical_space().height(10),
        reset_btn,
        vertical_space().height(15),
        speed_section,
        vertical_space().height(15),
        tap_section,
        vertical_space().height(15),
        correction_section,
        vertical_space().height(15),
        stats_panel,
        vertical_space().height(15),
        instructions,
    ]
    .spacing(5)
    .width(Length::Fill);

    if let Some(error) = audio_error {
        panel = panel.push(vertical_space().height(15));
        panel = panel.push(text(format!("Audio unavailable: {}", error)).size(12));
    }

    panel.into()
}
