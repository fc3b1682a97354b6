//! Dynastring - dynamic-grid string synthesizer.
//!
//! Real-time 1D wave-equation FDTD synthesis on a grid that grows and
//! shrinks with the wave speed while audio is running.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p dynastring
//! ```

use dynastring::gui;

fn main() -> iced::Result {
    // Initialize tracing for debug output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dynastring=info".parse().unwrap()),
        )
        .init();

    tracing::info!("Starting Dynastring...");

    gui::run()
}
