//! String parameters and per-sample grid quantity derivation.
//!
//! The grid spacing is tied to the wave speed (`h = c·k`), so changing the
//! speed while audio runs changes the number of points the string needs.
//! [`GridTracker`] recomputes the derived quantities once per sample and
//! detects when the integer point count crosses a boundary, which the
//! string then turns into a point insertion or removal.

use crate::error::{Result, StringError};
use crate::simulation::correction::CorrectionConfig;

/// Guard distance kept between interpolation parameters and the poles of
/// the coefficient denominators.
pub(crate) const POLE_EPSILON: f64 = 1e-9;

/// Smallest integer point count the scheme can operate on: the junction
/// stencils reach two points into each segment.
pub const MIN_GRID_POINTS: usize = 4;

/// Nudge `value` away from `pole` if it is within [`POLE_EPSILON`] of it.
pub(crate) fn guard_pole(value: f64, pole: f64) -> f64 {
    if (value - pole).abs() < POLE_EPSILON {
        if value >= pole {
            pole + POLE_EPSILON
        } else {
            pole - POLE_EPSILON
        }
    } else {
        value
    }
}

/// Physical parameters of the simulated string.
#[derive(Debug, Clone, Copy)]
pub struct StringParams {
    /// Wave speed in m/s. Mutable at runtime, applied once per sample.
    pub wave_speed: f64,
    /// String length in meters. Fixed for a session.
    pub length: f64,
    /// Time step in seconds (one over the sample rate). Fixed.
    pub time_step: f64,
}

impl StringParams {
    /// Create validated parameters. All three values must be finite and
    /// strictly positive.
    pub fn new(wave_speed: f64, length: f64, time_step: f64) -> Result<Self> {
        for (name, value) in [
            ("wave_speed", wave_speed),
            ("length", length),
            ("time_step", time_step),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(StringError::config(format!(
                    "{} must be finite and positive, got {}",
                    name, value
                )));
            }
        }
        Ok(Self {
            wave_speed,
            length,
            time_step,
        })
    }

    /// Create parameters from a sample rate instead of a time step.
    pub fn from_sample_rate(wave_speed: f64, length: f64, sample_rate: f64) -> Result<Self> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(StringError::config(format!(
                "sample_rate must be finite and positive, got {}",
                sample_rate
            )));
        }
        Self::new(wave_speed, length, 1.0 / sample_rate)
    }
}

/// Shape of the raised-cosine pulse seeded into segment 1 at construction.
#[derive(Debug, Clone, Copy)]
pub struct ExcitationConfig {
    /// Pulse start as a fraction of segment 1's length.
    pub position: f64,
    /// Pulse width in points; `None` uses half of segment 1.
    pub width: Option<usize>,
    /// Peak displacement of the pulse. Zero leaves the string silent.
    pub amplitude: f64,
}

impl Default for ExcitationConfig {
    fn default() -> Self {
        Self {
            position: 0.2,
            width: None,
            amplitude: 1.0,
        }
    }
}

impl ExcitationConfig {
    /// No initial excitation (silent string).
    pub fn silent() -> Self {
        Self {
            amplitude: 0.0,
            ..Self::default()
        }
    }
}

/// Full construction-time configuration of the string engine.
#[derive(Debug, Clone)]
pub struct StringConfig {
    /// Physical parameters.
    pub params: StringParams,
    /// Fixed grid capacity; all buffers are allocated for this many points
    /// at construction and never resized.
    pub max_points: usize,
    /// Junction corrector configuration.
    pub correction: CorrectionConfig,
    /// Initial excitation pulse.
    pub excitation: ExcitationConfig,
}

impl StringConfig {
    /// Create a configuration from wave speed, length, sample rate and grid
    /// capacity.
    pub fn new(wave_speed: f64, length: f64, sample_rate: f64, max_points: usize) -> Result<Self> {
        let params = StringParams::from_sample_rate(wave_speed, length, sample_rate)?;
        if max_points < MIN_GRID_POINTS {
            return Err(StringError::config(format!(
                "max_points must be at least {}, got {}",
                MIN_GRID_POINTS, max_points
            )));
        }
        Ok(Self {
            params,
            max_points,
            correction: CorrectionConfig::default(),
            excitation: ExcitationConfig::default(),
        })
    }

    /// Replace the corrector configuration.
    pub fn with_correction(mut self, correction: CorrectionConfig) -> Self {
        self.correction = correction;
        self
    }

    /// Replace the excitation configuration.
    pub fn with_excitation(mut self, excitation: ExcitationConfig) -> Self {
        self.excitation = excitation;
        self
    }

    /// Rebuild the configuration against a different sample rate, keeping
    /// everything else. Used when the audio device dictates the rate.
    pub fn with_sample_rate(mut self, sample_rate: f64) -> Result<Self> {
        self.params = StringParams::from_sample_rate(
            self.params.wave_speed,
            self.params.length,
            sample_rate,
        )?;
        Ok(self)
    }

    /// Lowest admissible wave speed: the value at which the continuous
    /// point count reaches `max_points`.
    pub fn min_wave_speed(&self) -> f64 {
        self.params.length / (self.max_points as f64 * self.params.time_step)
    }

    /// Highest admissible wave speed: the value at which the grid shrinks
    /// to [`MIN_GRID_POINTS`].
    pub fn max_wave_speed(&self) -> f64 {
        self.params.length / (MIN_GRID_POINTS as f64 * self.params.time_step)
    }
}

/// Grid quantities derived from the current parameters, recomputed every
/// sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    /// Grid spacing, `h = c·k`.
    pub h: f64,
    /// Continuous point count, `N = L/h`.
    pub n: f64,
    /// Integer point count, `floor(N)`; drives all indexing.
    pub n_int: usize,
    /// Fractional remainder `N − floor(N)` in `[0, 1)`: the sub-spacing
    /// offset of the junction.
    pub alpha: f64,
    /// Courant number squared, `(c·k/h)²`. Structurally 1 here, asserted
    /// `≤ 1` as the stability invariant.
    pub lambda_sq: f64,
    /// Points owned by segment 1 (left of the junction).
    pub m: usize,
    /// Points owned by segment 2 (right of the junction).
    pub mw: usize,
}

impl GridLayout {
    /// Derive the full layout from the current parameters.
    pub fn derive(wave_speed: f64, length: f64, time_step: f64) -> Self {
        let h = wave_speed * time_step;
        let n = length / h;
        let n_int = n.floor() as usize;
        let alpha = n - n_int as f64;
        let lambda_sq = ((wave_speed * time_step) / h).powi(2);
        let (m, mw) = split_points(n_int);
        Self {
            h,
            n,
            n_int,
            alpha,
            lambda_sq,
            m,
            mw,
        }
    }

    /// Force the integer point count to `n_int`, clamping `alpha` into
    /// `[0, 1)` against it. Used when a sweep-rate violation is being
    /// limited to a single transition in one sample.
    fn clamp_to(&mut self, n_int: usize) {
        self.n_int = n_int;
        self.alpha = (self.n - n_int as f64).clamp(0.0, 1.0 - POLE_EPSILON);
        let (m, mw) = split_points(n_int);
        self.m = m;
        self.mw = mw;
    }
}

/// Split an integer point count across the two segments: segment 1 takes
/// the ceiling half, segment 2 the floor half, so `m + mw == n_int` always.
fn split_points(n_int: usize) -> (usize, usize) {
    ((n_int + 1) / 2, n_int / 2)
}

/// Direction of a point-count transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The integer point count increased; a point must be inserted.
    Grow,
    /// The integer point count decreased; a point must be removed.
    Shrink,
}

/// Outcome of one per-sample retune.
#[derive(Debug, Clone, Copy)]
pub struct Retune {
    /// Transition to apply this sample, if any.
    pub transition: Option<Transition>,
    /// Whether the requested wave speed had to be clamped to keep the grid
    /// within capacity.
    pub clamped: bool,
}

/// Per-sample tracker for the continuous grid size.
///
/// Owns the mutable wave speed. A new speed is *requested* at any time and
/// *applied* at the next [`retune`](GridTracker::retune), which is called
/// exactly once per sample, so the grid-size derivation can never observe a
/// torn parameter update.
#[derive(Debug)]
pub struct GridTracker {
    length: f64,
    time_step: f64,
    max_points: usize,
    wave_speed: f64,
    requested_speed: f64,
    layout: GridLayout,
    prev_n_int: usize,
    clamp_events: u64,
    rate_violations: u64,
}

impl GridTracker {
    /// Build a tracker and validate the initial grid against capacity and
    /// the stability invariant.
    pub fn new(config: &StringConfig) -> Result<Self> {
        let p = config.params;
        let layout = GridLayout::derive(p.wave_speed, p.length, p.time_step);
        if layout.n > config.max_points as f64 {
            return Err(StringError::capacity(format!(
                "initial grid needs {:.1} points but capacity is {}; raise the wave speed above {:.2} m/s",
                layout.n,
                config.max_points,
                config.min_wave_speed()
            )));
        }
        if layout.n_int < MIN_GRID_POINTS {
            return Err(StringError::config(format!(
                "initial grid has only {} points (minimum {}); lower the wave speed below {:.2} m/s",
                layout.n_int,
                MIN_GRID_POINTS,
                config.max_wave_speed()
            )));
        }
        if layout.lambda_sq > 1.0 + f64::EPSILON {
            return Err(StringError::instability(format!(
                "lambda^2 = {} exceeds 1",
                layout.lambda_sq
            )));
        }
        Ok(Self {
            length: p.length,
            time_step: p.time_step,
            max_points: config.max_points,
            wave_speed: p.wave_speed,
            requested_speed: p.wave_speed,
            prev_n_int: layout.n_int,
            layout,
            clamp_events: 0,
            rate_violations: 0,
        })
    }

    /// Request a new wave speed; takes effect at the next [`retune`]
    /// call. Safe to call every sample.
    ///
    /// [`retune`]: GridTracker::retune
    pub fn request_speed(&mut self, wave_speed: f64) {
        if wave_speed.is_finite() && wave_speed > 0.0 {
            self.requested_speed = wave_speed;
        }
    }

    /// Apply the pending wave speed and re-derive the grid quantities,
    /// reporting any transition. Called exactly once per sample, before
    /// the scheme step. Never allocates, locks or logs.
    pub fn retune(&mut self) -> Retune {
        let min_speed = self.length / (self.max_points as f64 * self.time_step);
        let max_speed = self.length / (MIN_GRID_POINTS as f64 * self.time_step);
        let mut clamped = false;
        let mut speed = self.requested_speed;
        if speed < min_speed {
            speed = min_speed;
            clamped = true;
        } else if speed > max_speed {
            speed = max_speed;
            clamped = true;
        }
        if clamped {
            self.clamp_events += 1;
        }
        self.wave_speed = speed;

        let mut layout = GridLayout::derive(speed, self.length, self.time_step);

        // At most one point boundary may be crossed per sample. A faster
        // sweep is a policy violation: count it, take a single step toward
        // the target and accept the larger error for this sample.
        let prev = self.prev_n_int;
        if layout.n_int > prev + 1 {
            self.rate_violations += 1;
            layout.clamp_to(prev + 1);
        } else if layout.n_int + 1 < prev {
            self.rate_violations += 1;
            layout.clamp_to(prev - 1);
        }

        let transition = match layout.n_int.cmp(&prev) {
            std::cmp::Ordering::Greater => Some(Transition::Grow),
            std::cmp::Ordering::Less => Some(Transition::Shrink),
            std::cmp::Ordering::Equal => None,
        };
        self.layout = layout;
        Retune {
            transition,
            clamped,
        }
    }

    /// Commit the sample: the current integer point count becomes the
    /// reference for the next sample's transition detection. Called from
    /// the time-slice rotation.
    pub fn commit(&mut self) {
        self.prev_n_int = self.layout.n_int;
    }

    /// Current derived grid quantities.
    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// Wave speed actually in effect (after any clamping).
    pub fn wave_speed(&self) -> f64 {
        self.wave_speed
    }

    /// String length in meters.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Time step in seconds.
    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    /// Number of times the requested speed was clamped to keep the grid in
    /// range.
    pub fn clamp_events(&self) -> u64 {
        self.clamp_events
    }

    /// Number of samples in which more than one point boundary was crossed.
    pub fn rate_violations(&self) -> u64 {
        self.rate_violations
    }
}

/// Linear per-sample wave-speed sweep over a fixed number of samples.
///
/// Sample `i` maps to `start + i·(end − start)/(len − 1)`; indices past the
/// end hold the final value.
#[derive(Debug, Clone, Copy)]
pub struct SpeedRamp {
    /// Wave speed at sample 0.
    pub start: f64,
    /// Wave speed at the last sample.
    pub end: f64,
    /// Number of samples the sweep spans.
    pub len: usize,
}

impl SpeedRamp {
    /// Create a sweep from `start` to `end` over `len` samples.
    pub fn new(start: f64, end: f64, len: usize) -> Self {
        Self { start, end, len }
    }

    /// Wave speed at the given sample index.
    pub fn value_at(&self, sample: usize) -> f64 {
        if self.len <= 1 || sample >= self.len {
            return self.end;
        }
        self.start + sample as f64 * (self.end - self.start) / (self.len as f64 - 1.0)
    }
}
