//! # Dynastring
//!
//! Real-time physical-modeling string synthesizer built on a
//! finite-difference time-domain (FDTD) solver for the 1D wave equation on
//! a *dynamically resized* grid: the number of simulated points follows
//! the wave speed while audio is running, without discontinuities or
//! instability in the output.
//!
//! The string is modeled as two segments joined at a moving, fractionally
//! positioned junction. Each sample the engine re-derives the grid
//! quantities from the wave speed, inserts or removes a point when the
//! integer count crosses a boundary (synthesizing the new value with a
//! four-point interpolation stencil), forms quadratic ghost points across
//! the junction, applies the explicit leapfrog update and then corrects
//! the junction with a displacement-matching force.
//!
//! ## Architecture
//!
//! ```text
//! UI slider -> SharedControls -> [per sample] retune -> restructure ->
//!     ghost points -> scheme step -> junction correction -> rotate ->
//!     output tap -> limiter -> audio device
//! ```
//!
//! The per-sample path never allocates, locks or blocks; parameter
//! updates and display snapshots cross threads through single-value
//! atomic exchanges and non-blocking channels.
//!
//! ## Run
//!
//! ```bash
//! cargo run -p dynastring
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod audio;
pub mod error;
pub mod gui;
pub mod simulation;

pub use error::{Result, StringError};
pub use simulation::{
    CorrectionConfig, DynamicString, ExcitationConfig, GridLayout, SpeedRamp, StringConfig,
    StringParams, Transition, WaveformSnapshot,
};
