//! Iced GUI for the dynamic string synthesizer.

mod app;
mod canvas;
mod controls;

pub use app::{run, StringApp};
