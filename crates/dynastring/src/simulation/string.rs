//! The dynamic two-segment string: grid storage, scheme stepping,
//! restructuring at transitions, excitation and the output tap.
//!
//! All buffers are allocated once at construction and never resized; the
//! per-sample path performs no allocation, locking or I/O. The one
//! non-constant-time operation is the O(mw) shift when a point enters or
//! leaves segment 2, bounded by the fixed capacity.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::info;

use crate::error::Result;
use crate::simulation::correction::{apply_correction, JunctionState};
use crate::simulation::interpolation::{QuadraticWeights, TransitionWeights};
use crate::simulation::physics::{GridLayout, GridTracker, StringConfig, Transition};

/// One contiguous range of grid points with three time-slice buffers.
///
/// The next/current/previous roles are mapped onto the three owned buffers
/// through a rotation phase; [`rotate`](Segment::rotate) reassigns the
/// roles in O(1) without copying a single sample. Only the live prefix of
/// each buffer is meaningful; the remainder is zero padding reserved for
/// growth.
#[derive(Debug)]
struct Segment {
    buffers: [Vec<f64>; 3],
    phase: u8,
}

impl Segment {
    fn new(capacity: usize) -> Self {
        Self {
            buffers: [
                vec![0.0; capacity],
                vec![0.0; capacity],
                vec![0.0; capacity],
            ],
            phase: 0,
        }
    }

    /// Mutable next slice together with shared current and previous slices.
    fn split_mut(&mut self) -> (&mut [f64], &[f64], &[f64]) {
        let [a, b, c] = &mut self.buffers;
        match self.phase {
            0 => (a, b, c),
            1 => (c, a, b),
            _ => (b, c, a),
        }
    }

    fn next(&self) -> &[f64] {
        &self.buffers[match self.phase {
            0 => 0,
            1 => 2,
            _ => 1,
        }]
    }

    fn next_mut(&mut self) -> &mut [f64] {
        let [a, b, c] = &mut self.buffers;
        match self.phase {
            0 => a,
            1 => c,
            _ => b,
        }
    }

    fn current(&self) -> &[f64] {
        &self.buffers[match self.phase {
            0 => 1,
            1 => 0,
            _ => 2,
        }]
    }

    fn previous(&self) -> &[f64] {
        &self.buffers[match self.phase {
            0 => 2,
            1 => 1,
            _ => 0,
        }]
    }

    /// Current and previous slices, both mutable: the pair touched by
    /// restructuring and excitation.
    fn current_previous_mut(&mut self) -> (&mut [f64], &mut [f64]) {
        let [a, b, c] = &mut self.buffers;
        match self.phase {
            0 => (b, c),
            1 => (a, b),
            _ => (c, a),
        }
    }

    /// Cyclically reassign the slice roles: previous becomes the next
    /// write target, current becomes previous, next becomes current.
    fn rotate(&mut self) {
        self.phase = (self.phase + 1) % 3;
    }

    fn clear(&mut self) {
        for buffer in &mut self.buffers {
            buffer.fill(0.0);
        }
        self.phase = 0;
    }
}

/// Read-only copy of the string state for display, refreshed from the
/// audio thread with a non-blocking lock.
#[derive(Debug, Clone, Default)]
pub struct WaveformSnapshot {
    /// Segment 1's live current-slice values.
    pub u: Vec<f64>,
    /// Segment 2's live current-slice values.
    pub w: Vec<f64>,
    /// Continuous point count.
    pub n: f64,
    /// Integer point count.
    pub n_int: usize,
    /// Fractional junction offset.
    pub alpha: f64,
    /// Segment 1 point count.
    pub m: usize,
    /// Segment 2 point count.
    pub mw: usize,
    /// Wave speed in effect.
    pub wave_speed: f64,
    /// Sum of squared current-slice displacements.
    pub total_energy: f64,
    /// Point-count transitions since construction.
    pub transitions: u64,
    /// Wave-speed clamp events since construction.
    pub clamp_events: u64,
    /// Sweep-rate violations since construction.
    pub rate_violations: u64,
}

/// Real-time dynamic-grid string model.
///
/// Drives the 1D wave equation over two segments joined at a moving,
/// fractionally positioned junction. The per-sample protocol is:
/// [`set_wave_speed`](DynamicString::set_wave_speed) (optional),
/// [`advance`](DynamicString::advance),
/// [`rotate`](DynamicString::rotate),
/// [`read_output`](DynamicString::read_output).
#[derive(Debug)]
pub struct DynamicString {
    tracker: GridTracker,
    config: StringConfig,
    u: Segment,
    w: Segment,
    /// Ghost value past segment 1's last point. Recomputed every sample;
    /// never part of persistent state.
    ghost_u: f64,
    /// Ghost value before segment 2's first point.
    ghost_w: f64,
    quad: QuadraticWeights,
    transitions: u64,
    tap_faults: AtomicU64,
}

impl DynamicString {
    /// Build the string, allocate both segments to fixed capacity, and
    /// seed the initial excitation.
    pub fn new(config: StringConfig) -> Result<Self> {
        let tracker = GridTracker::new(&config)?;
        let layout = *tracker.layout();

        // Segment capacities cover the largest admissible grid plus the
        // transient index reached while a grow is being applied.
        let u_capacity = (config.max_points + 1) / 2 + 2;
        let w_capacity = config.max_points / 2 + 2;

        let mut string = Self {
            tracker,
            u: Segment::new(u_capacity),
            w: Segment::new(w_capacity),
            ghost_u: 0.0,
            ghost_w: 0.0,
            quad: QuadraticWeights::new(layout.alpha),
            transitions: 0,
            tap_faults: AtomicU64::new(0),
            config,
        };
        string.excite();
        info!(
            "dynamic string: {:.1} points over {} m (h = {:.4} m, alpha = {:.3})",
            layout.n,
            string.config.params.length,
            layout.h,
            layout.alpha
        );
        Ok(string)
    }

    /// Request a new wave speed, applied at the next [`advance`]
    /// call. Safe to call every sample.
    ///
    /// [`advance`]: DynamicString::advance
    pub fn set_wave_speed(&mut self, wave_speed: f64) {
        self.tracker.request_speed(wave_speed);
    }

    /// Toggle the displacement-correction stage at runtime.
    pub fn set_displacement_correction(&mut self, enabled: bool) {
        self.config.correction.displacement = enabled;
    }

    /// Advance the simulation by one sample: apply the pending wave speed,
    /// re-derive the grid quantities, restructure on a transition, form
    /// the ghost points, step the scheme and correct the junction.
    pub fn advance(&mut self) {
        let before = *self.tracker.layout();
        let retune = self.tracker.retune();
        if let Some(transition) = retune.transition {
            self.transitions += 1;
            self.restructure(transition, &before);
        }
        debug_assert_eq!(
            self.tracker.layout().m + self.tracker.layout().mw,
            self.tracker.layout().n_int
        );
        self.compute_ghosts();
        self.step_scheme();
        self.correct_junction();
    }

    /// Cyclically advance the time-slice roles of both segments and commit
    /// the sample's integer point count. O(1), period 3.
    pub fn rotate(&mut self) {
        self.u.rotate();
        self.w.rotate();
        self.tracker.commit();
    }

    /// Displacement at a fractional position along the full string, read
    /// from the current slice of whichever segment owns the mapped index.
    ///
    /// Out-of-range ratios are clamped into `[0, 1]` and counted in
    /// [`tap_faults`](DynamicString::tap_faults).
    pub fn read_output(&self, ratio: f64) -> f64 {
        let clamped = if (0.0..=1.0).contains(&ratio) {
            ratio
        } else {
            self.tap_faults.fetch_add(1, Ordering::Relaxed);
            ratio.clamp(0.0, 1.0)
        };
        let layout = self.tracker.layout();
        let idx = (layout.n_int as f64 * clamped).floor() as usize;
        if idx <= layout.m {
            self.u.current()[idx]
        } else {
            self.w.current()[idx - layout.m - 1]
        }
    }

    /// Add a displacement pulse at a fractional position, into both the
    /// current and previous slices. Positions mapping to the fixed ends
    /// are ignored.
    pub fn inject(&mut self, ratio: f64, amplitude: f64) {
        let layout = *self.tracker.layout();
        let idx = (layout.n_int as f64 * ratio.clamp(0.0, 1.0)).floor() as usize;
        if idx == 0 {
            return;
        }
        if idx <= layout.m {
            let (current, previous) = self.u.current_previous_mut();
            current[idx] += amplitude;
            previous[idx] += amplitude;
        } else {
            let widx = idx - layout.m - 1;
            if widx < layout.mw {
                let (current, previous) = self.w.current_previous_mut();
                current[widx] += amplitude;
                previous[widx] += amplitude;
            }
        }
    }

    /// Zero all state and re-seed the construction-time excitation.
    pub fn reset(&mut self) {
        self.u.clear();
        self.w.clear();
        self.excite();
    }

    /// Current derived grid quantities.
    pub fn layout(&self) -> &GridLayout {
        self.tracker.layout()
    }

    /// Wave speed in effect after clamping.
    pub fn wave_speed(&self) -> f64 {
        self.tracker.wave_speed()
    }

    /// Live current-slice values of segment 1 (including both junction
    /// boundary points).
    pub fn segment_u(&self) -> &[f64] {
        &self.u.current()[..=self.tracker.layout().m]
    }

    /// Live current-slice values of segment 2.
    pub fn segment_w(&self) -> &[f64] {
        &self.w.current()[..=self.tracker.layout().mw]
    }

    /// Sum of squared current-slice displacements over both segments.
    pub fn total_energy(&self) -> f64 {
        let sum = |values: &[f64]| values.iter().map(|v| v * v).sum::<f64>();
        sum(self.segment_u()) + sum(self.segment_w())
    }

    /// Largest absolute current-slice displacement.
    pub fn max_displacement(&self) -> f64 {
        let peak = |values: &[f64]| values.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
        peak(self.segment_u()).max(peak(self.segment_w()))
    }

    /// Point-count transitions since construction.
    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    /// Wave-speed clamp events since construction.
    pub fn clamp_events(&self) -> u64 {
        self.tracker.clamp_events()
    }

    /// Sweep-rate violations since construction.
    pub fn rate_violations(&self) -> u64 {
        self.tracker.rate_violations()
    }

    /// Out-of-range output-tap reads since construction.
    pub fn tap_faults(&self) -> u64 {
        self.tap_faults.load(Ordering::Relaxed)
    }

    /// Copy the current state into a display snapshot, reusing the
    /// snapshot's buffers.
    pub fn snapshot_into(&self, out: &mut WaveformSnapshot) {
        let layout = self.tracker.layout();
        out.u.clear();
        out.u.extend_from_slice(self.segment_u());
        out.w.clear();
        out.w.extend_from_slice(self.segment_w());
        out.n = layout.n;
        out.n_int = layout.n_int;
        out.alpha = layout.alpha;
        out.m = layout.m;
        out.mw = layout.mw;
        out.wave_speed = self.tracker.wave_speed();
        out.total_energy = self.total_energy();
        out.transitions = self.transitions;
        out.clamp_events = self.tracker.clamp_events();
        out.rate_violations = self.tracker.rate_violations();
    }

    /// Seed the configured raised-cosine pulse into segment 1's current
    /// and previous slices.
    fn excite(&mut self) {
        let excitation = self.config.excitation;
        if excitation.amplitude == 0.0 {
            return;
        }
        let m = self.tracker.layout().m;
        let width = excitation.width.unwrap_or(m / 2).max(2);
        let start = ((m + 1) as f64 * excitation.position.clamp(0.0, 1.0)).floor() as usize;
        let end = (start + width).min(m);
        let (current, previous) = self.u.current_previous_mut();
        for l in start..end {
            let phase = (l - start) as f64 / width as f64;
            let value = 0.5
                * excitation.amplitude
                * (1.0 - (2.0 * std::f64::consts::PI * phase).cos());
            current[l] += value;
            previous[l] += value;
        }
    }

    /// Insert or remove one point across the junction. The inserted value
    /// comes from the four-point transition stencil evaluated against the
    /// pre-transition layout; parity of the new integer count decides
    /// which segment the point joins.
    fn restructure(&mut self, transition: Transition, before: &GridLayout) {
        let (m, mw) = (before.m, before.mw);
        let after = *self.tracker.layout();
        match transition {
            Transition::Grow => {
                // Fractional offset implied by the post-transition
                // boundary position.
                let length = self.tracker.length();
                let alpha_tick =
                    (length - mw as f64 * after.h - (m + 1) as f64 * after.h) / after.h;
                let weights = TransitionWeights::new(alpha_tick);

                // Gather the stencil before mutating either segment.
                let stencil_cur = [
                    self.u.current()[m - 1],
                    self.u.current()[m],
                    self.w.current()[0],
                    self.w.current()[1],
                ];
                let stencil_prev = [
                    self.u.previous()[m - 1],
                    self.u.previous()[m],
                    self.w.previous()[0],
                    self.w.previous()[1],
                ];

                if after.n_int % 2 == 1 {
                    // Odd count: the new point joins segment 1.
                    let (current, previous) = self.u.current_previous_mut();
                    current[m + 1] = weights.append_value(
                        stencil_cur[0],
                        stencil_cur[1],
                        stencil_cur[2],
                        stencil_cur[3],
                    );
                    previous[m + 1] = weights.append_value(
                        stencil_prev[0],
                        stencil_prev[1],
                        stencil_prev[2],
                        stencil_prev[3],
                    );
                } else {
                    // Even count: prepend to segment 2, shifting the live
                    // range up one slot. O(mw), the one non-constant-time
                    // operation on this path.
                    let value_cur = weights.prepend_value(
                        stencil_cur[0],
                        stencil_cur[1],
                        stencil_cur[2],
                        stencil_cur[3],
                    );
                    let value_prev = weights.prepend_value(
                        stencil_prev[0],
                        stencil_prev[1],
                        stencil_prev[2],
                        stencil_prev[3],
                    );
                    let (current, previous) = self.w.current_previous_mut();
                    current.copy_within(0..=mw, 1);
                    previous.copy_within(0..=mw, 1);
                    current[0] = value_cur;
                    previous[0] = value_prev;
                }
            }
            Transition::Shrink => {
                if after.n_int % 2 == 0 {
                    // Even count: segment 1 gives up its last point.
                    let (current, previous) = self.u.current_previous_mut();
                    current[m] = 0.0;
                    previous[m] = 0.0;
                } else {
                    // Odd count: segment 2 gives up its first point.
                    let (current, previous) = self.w.current_previous_mut();
                    current.copy_within(1..=mw, 0);
                    previous.copy_within(1..=mw, 0);
                    current[mw] = 0.0;
                    previous[mw] = 0.0;
                }
            }
        }
    }

    /// Recompute the quadratic weights and the two ghost values from the
    /// current slice.
    fn compute_ghosts(&mut self) {
        let layout = self.tracker.layout();
        let m = layout.m;
        self.quad = QuadraticWeights::new(layout.alpha);
        let u_cur = self.u.current();
        let w_cur = self.w.current();
        self.ghost_u = self.quad.ghost_after(u_cur[m], w_cur[0], w_cur[1]);
        self.ghost_w = self.quad.ghost_before(u_cur[m - 1], u_cur[m], w_cur[0]);
    }

    /// Explicit leapfrog update over both segments' interiors, with the
    /// ghost values standing in for the missing neighbor at the junction.
    /// The outer endpoints stay fixed at zero.
    fn step_scheme(&mut self) {
        let layout = *self.tracker.layout();
        let (m, mw, lambda_sq) = (layout.m, layout.mw, layout.lambda_sq);
        let (ghost_u, ghost_w) = (self.ghost_u, self.ghost_w);

        let (next, cur, prev) = self.u.split_mut();
        for l in 1..m {
            next[l] = 2.0 * cur[l] - prev[l] + lambda_sq * (cur[l + 1] - 2.0 * cur[l] + cur[l - 1]);
        }
        next[m] = 2.0 * cur[m] - prev[m] + lambda_sq * (ghost_u - 2.0 * cur[m] + cur[m - 1]);

        let (next, cur, prev) = self.w.split_mut();
        next[0] = 2.0 * cur[0] - prev[0] + lambda_sq * (cur[1] - 2.0 * cur[0] + ghost_w);
        for l in 1..mw {
            next[l] = 2.0 * cur[l] - prev[l] + lambda_sq * (cur[l + 1] - 2.0 * cur[l] + cur[l - 1]);
        }
    }

    /// Apply the configured corrector to the two freshly updated junction
    /// values.
    fn correct_junction(&mut self) {
        let correction = self.config.correction;
        if !correction.smoothing && !correction.displacement {
            return;
        }
        let layout = *self.tracker.layout();
        let m = layout.m;
        let state = JunctionState {
            u_next: self.u.next()[m],
            w_next: self.w.next()[0],
            u_prev: self.u.previous()[m],
            w_prev: self.w.previous()[0],
        };
        let (u_corrected, w_corrected) = apply_correction(
            &correction,
            state,
            layout.alpha,
            layout.h,
            self.tracker.time_step(),
        );
        self.u.next_mut()[m] = u_corrected;
        self.w.next_mut()[0] = w_corrected;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::correction::CorrectionConfig;
    use crate::simulation::physics::ExcitationConfig;

    fn reference_config() -> StringConfig {
        StringConfig::new(600.0, 1.0, 44_100.0, 200).unwrap()
    }

    fn silent_config(wave_speed: f64) -> StringConfig {
        StringConfig::new(wave_speed, 1.0, 44_100.0, 200)
            .unwrap()
            .with_excitation(ExcitationConfig::silent())
    }

    #[test]
    fn test_segment_rotation_has_period_three() {
        let mut segment = Segment::new(8);
        segment.buffers[0][0] = 1.0;
        segment.buffers[1][0] = 2.0;
        segment.buffers[2][0] = 3.0;

        let initial = (segment.next()[0], segment.current()[0], segment.previous()[0]);
        assert_eq!(initial, (1.0, 2.0, 3.0));

        segment.rotate();
        // Previous becomes the next write target; nothing was copied.
        assert_eq!(segment.next()[0], 3.0);
        assert_eq!(segment.current()[0], 1.0);
        assert_eq!(segment.previous()[0], 2.0);

        segment.rotate();
        segment.rotate();
        let cycled = (segment.next()[0], segment.current()[0], segment.previous()[0]);
        assert_eq!(cycled, initial, "three rotations must restore the roles");
    }

    #[test]
    fn test_construction_seeds_excitation() {
        let string = DynamicString::new(reference_config()).unwrap();

        assert_eq!(string.read_output(0.0), 0.0, "fixed end must stay at rest");
        assert!(
            string.read_output(0.2) != 0.0,
            "the seeded pulse must be visible at 0.2"
        );
        assert!(string.total_energy() > 0.0);
    }

    #[test]
    fn test_advance_keeps_point_count_invariant() {
        let mut string = DynamicString::new(reference_config()).unwrap();
        // Sweep slowly enough to stay within one boundary per sample.
        for sample in 0..2_000 {
            let speed = 600.0 - 0.02 * sample as f64;
            string.set_wave_speed(speed);
            string.advance();
            string.rotate();
            let layout = string.layout();
            assert_eq!(
                layout.m + layout.mw,
                layout.n_int,
                "invariant must hold at sample {}",
                sample
            );
        }
        assert!(string.transitions() > 0, "the sweep must cross boundaries");
        assert_eq!(string.rate_violations(), 0);
    }

    #[test]
    fn test_grow_shrink_round_trip_segment_two() {
        // n = 73.5: growing to 74 (even) routes the new point into
        // segment 2.
        let mut string = DynamicString::new(reference_config()).unwrap();
        let before = *string.tracker.layout();
        let u_boundary = string.u.current()[before.m];
        let w_boundary = string.w.current()[0];

        string.tracker.request_speed(44_100.0 / 74.2);
        let retune = string.tracker.retune();
        assert_eq!(retune.transition, Some(Transition::Grow));
        string.restructure(Transition::Grow, &before);
        assert_eq!(string.tracker.layout().mw, before.mw + 1);
        string.tracker.commit();

        let mid = *string.tracker.layout();
        string.tracker.request_speed(600.0);
        let retune = string.tracker.retune();
        assert_eq!(retune.transition, Some(Transition::Shrink));
        string.restructure(Transition::Shrink, &mid);
        string.tracker.commit();

        let after = *string.tracker.layout();
        assert_eq!(after.m, before.m);
        assert_eq!(after.mw, before.mw);
        assert!(
            (string.u.current()[after.m] - u_boundary).abs() < 1e-12,
            "segment 1 boundary must round-trip"
        );
        assert!(
            (string.w.current()[0] - w_boundary).abs() < 1e-12,
            "segment 2 boundary must round-trip"
        );
    }

    #[test]
    fn test_grow_shrink_round_trip_segment_one() {
        // n = 74.5: growing to 75 (odd) appends to segment 1.
        let config = StringConfig::new(44_100.0 / 74.5, 1.0, 44_100.0, 200).unwrap();
        let mut string = DynamicString::new(config).unwrap();
        let before = *string.tracker.layout();
        assert_eq!(before.n_int, 74);
        let u_boundary = string.u.current()[before.m];
        let w_boundary = string.w.current()[0];

        string.tracker.request_speed(44_100.0 / 75.2);
        let retune = string.tracker.retune();
        assert_eq!(retune.transition, Some(Transition::Grow));
        string.restructure(Transition::Grow, &before);
        assert_eq!(string.tracker.layout().m, before.m + 1);
        string.tracker.commit();

        let mid = *string.tracker.layout();
        string.tracker.request_speed(44_100.0 / 74.5);
        let retune = string.tracker.retune();
        assert_eq!(retune.transition, Some(Transition::Shrink));
        string.restructure(Transition::Shrink, &mid);
        string.tracker.commit();

        let after = *string.tracker.layout();
        assert_eq!(after.m, before.m);
        assert_eq!(after.mw, before.mw);
        assert!((string.u.current()[after.m] - u_boundary).abs() < 1e-12);
        assert!((string.w.current()[0] - w_boundary).abs() < 1e-12);
    }

    #[test]
    fn test_inserted_point_interpolates_smooth_field() {
        // Seed a linear ramp across the junction; the synthesized point
        // must land on the ramp (cubic interpolation is exact on it).
        let mut string = DynamicString::new(silent_config(600.0)).unwrap();
        let before = *string.tracker.layout();
        let m = before.m;
        for l in 0..=m {
            string.u.current_previous_mut().0[l] = l as f64;
            string.u.current_previous_mut().1[l] = l as f64;
        }
        for l in 0..=before.mw {
            let value = (m + 1 + l) as f64;
            string.w.current_previous_mut().0[l] = value;
            string.w.current_previous_mut().1[l] = value;
        }

        string.tracker.request_speed(44_100.0 / 74.2);
        string.tracker.retune();
        string.restructure(Transition::Grow, &before);

        // The new point was prepended to segment 2 between u[m] and the
        // old w[0]; on the monotone ramp it must land between them.
        let inserted = string.w.current()[0];
        assert!(
            inserted > m as f64 && inserted < (m + 1) as f64,
            "inserted value {} should sit between neighbors {} and {}",
            inserted,
            m,
            m + 1
        );
    }

    #[test]
    fn test_correction_reduces_junction_mismatch() {
        let base = silent_config(600.0);
        let corrected_config = base.clone().with_correction(CorrectionConfig::default());
        let raw_config = base.with_correction(CorrectionConfig::disabled());

        let mut corrected = DynamicString::new(corrected_config).unwrap();
        let mut raw = DynamicString::new(raw_config).unwrap();

        // A pulse on segment 1's boundary point leaves the two segments
        // mismatched across the junction.
        for string in [&mut corrected, &mut raw] {
            let m = string.layout().m;
            let ratio = (m as f64 + 0.5) / string.layout().n_int as f64;
            string.inject(ratio, 0.5);
            string.advance();
            string.rotate();
        }

        let mismatch = |s: &DynamicString| {
            let m = s.layout().m;
            (s.w.current()[0] - s.u.current()[m]).abs()
        };
        assert!(
            mismatch(&corrected) < mismatch(&raw),
            "correction must shrink the junction mismatch ({} vs {})",
            mismatch(&corrected),
            mismatch(&raw)
        );
        assert!(
            mismatch(&corrected) < 1e-10,
            "zero relaxation must pin the junction, got {}",
            mismatch(&corrected)
        );
    }

    #[test]
    fn test_output_tap_clamps_and_counts() {
        let string = DynamicString::new(reference_config()).unwrap();
        let inside = string.read_output(1.0);
        let outside = string.read_output(1.5);
        assert_eq!(inside, outside, "out-of-range ratios clamp to the end");
        assert_eq!(string.tap_faults(), 1);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut string = DynamicString::new(reference_config()).unwrap();
        let initial = string.read_output(0.2);
        for _ in 0..100 {
            string.advance();
            string.rotate();
        }
        string.reset();
        assert_eq!(string.read_output(0.2), initial);
    }

    #[test]
    fn test_snapshot_copies_live_ranges() {
        let string = DynamicString::new(reference_config()).unwrap();
        let mut snapshot = WaveformSnapshot::default();
        string.snapshot_into(&mut snapshot);

        let layout = string.layout();
        assert_eq!(snapshot.u.len(), layout.m + 1);
        assert_eq!(snapshot.w.len(), layout.mw + 1);
        assert_eq!(snapshot.n_int, layout.n_int);
        assert!(snapshot.total_energy > 0.0);
    }
}
