//! Junction corrector: optional refinement of the two boundary values
//! after the raw scheme update.
//!
//! Two composable stages. Low-pass smoothing redistributes a fraction of
//! the junction mismatch symmetrically, with a gain that decays as the
//! junction approaches the next grid point. Displacement correction solves
//! a single force `F` from the closed-form balance of the updated mismatch
//! against a relaxation term on the previous slice, then applies
//! `±F·k²/h` to the two boundary values. With zero relaxation the
//! corrected mismatch is zero to numerical precision on every sample,
//! including transition samples.

/// Configuration of the junction corrector stages.
#[derive(Debug, Clone, Copy)]
pub struct CorrectionConfig {
    /// Enable the low-pass smoothing stage.
    pub smoothing: bool,
    /// Base gain of the smoothing stage.
    pub smoothing_gain: f64,
    /// Exponent applied to `(1 − alpha)` in the smoothing gain.
    pub smoothing_exponent: f64,
    /// Enable the displacement-correction stage.
    pub displacement: bool,
    /// Relaxation weight `beta` in `[0, 1)`; zero enforces exact junction
    /// consistency.
    pub relaxation: f64,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            smoothing: false,
            smoothing_gain: 1.0,
            smoothing_exponent: 2.0,
            displacement: true,
            relaxation: 0.0,
        }
    }
}

impl CorrectionConfig {
    /// Both stages disabled: the raw scheme output is used as-is.
    pub fn disabled() -> Self {
        Self {
            smoothing: false,
            displacement: false,
            ..Self::default()
        }
    }

    /// Enable or disable the smoothing stage.
    pub fn with_smoothing(mut self, enabled: bool) -> Self {
        self.smoothing = enabled;
        self
    }

    /// Enable or disable the displacement-correction stage.
    pub fn with_displacement(mut self, enabled: bool) -> Self {
        self.displacement = enabled;
        self
    }

    /// Set the relaxation weight, clamped into `[0, 1)`.
    pub fn with_relaxation(mut self, beta: f64) -> Self {
        self.relaxation = beta.clamp(0.0, 1.0 - f64::EPSILON);
        self
    }
}

/// The four junction values the corrector operates on.
#[derive(Debug, Clone, Copy)]
pub struct JunctionState {
    /// Segment 1's boundary value in the freshly computed slice.
    pub u_next: f64,
    /// Segment 2's boundary value in the freshly computed slice.
    pub w_next: f64,
    /// Segment 1's boundary value in the previous slice.
    pub u_prev: f64,
    /// Segment 2's boundary value in the previous slice.
    pub w_prev: f64,
}

/// Apply the configured corrector stages and return the corrected
/// `(u_next, w_next)` pair.
pub fn apply_correction(
    config: &CorrectionConfig,
    state: JunctionState,
    alpha: f64,
    h: f64,
    k: f64,
) -> (f64, f64) {
    let mut u = state.u_next;
    let mut w = state.w_next;

    if config.smoothing {
        let eta = w - u;
        let gain = config.smoothing_gain * (1.0 - alpha).max(0.0).powf(config.smoothing_exponent);
        u += 0.5 * gain * eta;
        w -= 0.5 * gain * eta;
    }

    if config.displacement {
        let eta_next = w - u;
        let eta_prev = state.w_prev - state.u_prev;
        let beta = config.relaxation;
        let force = (eta_next + beta * eta_prev) * h / (2.0 * k * k * (1.0 + beta));
        let scale = k * k / h;
        u += force * scale;
        w -= force * scale;
    }

    (u, w)
}
