//! Junction interpolation coefficient sets.
//!
//! The two segments meet at a fractionally positioned junction, so the
//! difference scheme at each boundary point needs a virtual neighbor on
//! the other side. Two coefficient sets, both derived from local cubic
//! interpolation, serve that purpose: [`QuadraticWeights`] forms the two
//! ghost values every sample, and [`TransitionWeights`] synthesizes the
//! value of a newly inserted point on the sample where the grid grows.
//!
//! The coefficient denominators vanish at `alpha = −1` and
//! `alpha_tick ∈ {−2, −3}`; inputs are nudged away from those poles by an
//! epsilon guard. Within the operating ranges (both offsets live in
//! `[0, 1)`) no pole is reachable, but the guard keeps the computation
//! total for out-of-contract inputs.

use crate::simulation::physics::guard_pole;

/// Steady-state ghost-point weights for a junction at fractional offset
/// `alpha`. The three weights form a partition of unity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticWeights {
    /// Weight of the far point on the opposite segment.
    pub w0: f64,
    /// Weight of the near point on the opposite segment.
    pub w1: f64,
    /// Weight of the segment's own boundary point.
    pub w2: f64,
}

impl Default for QuadraticWeights {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl QuadraticWeights {
    /// Compute the weights for the given fractional junction offset.
    pub fn new(alpha: f64) -> Self {
        let alpha = guard_pole(alpha, -1.0);
        let ratio = (alpha - 1.0) / (alpha + 1.0);
        Self {
            w0: -ratio,
            w1: 1.0,
            w2: ratio,
        }
    }

    /// Ghost value one slot past segment 1's last real point, formed from
    /// that point and segment 2's first two points.
    pub fn ghost_after(&self, u_m: f64, w_0: f64, w_1: f64) -> f64 {
        u_m * self.w2 + w_0 * self.w1 + w_1 * self.w0
    }

    /// Ghost value one slot before segment 2's first real point, formed
    /// from segment 1's last two points and that point.
    pub fn ghost_before(&self, u_m_minus_1: f64, u_m: f64, w_0: f64) -> f64 {
        u_m_minus_1 * self.w0 + u_m * self.w1 + w_0 * self.w2
    }
}

/// Four-point coefficients used on a transition sample to synthesize the
/// newly inserted point from the two nearest existing points on each side.
///
/// `alpha_tick` is the fractional offset implied by the post-transition
/// boundary position; for an in-range transition it lies in `[0, 1)`.
/// On shrink no coefficients are needed: the departing point's value is
/// simply discarded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionWeights {
    coeffs: [f64; 4],
}

impl TransitionWeights {
    /// Compute the cubic-fit coefficients for the given offset.
    pub fn new(alpha_tick: f64) -> Self {
        let a = guard_pole(guard_pole(alpha_tick, -2.0), -3.0);
        Self {
            coeffs: [
                -a * (a + 1.0) / ((a + 2.0) * (a + 3.0)),
                2.0 * a / (a + 2.0),
                2.0 / (a + 2.0),
                -2.0 * a / ((a + 3.0) * (a + 2.0)),
            ],
        }
    }

    /// The raw coefficient set.
    pub fn coeffs(&self) -> [f64; 4] {
        self.coeffs
    }

    /// Value of a point appended after segment 1's last point.
    pub fn append_value(&self, u_m_minus_1: f64, u_m: f64, w_0: f64, w_1: f64) -> f64 {
        let c = self.coeffs;
        c[0] * u_m_minus_1 + c[1] * u_m + c[2] * w_0 + c[3] * w_1
    }

    /// Value of a point prepended before segment 2's first point: the same
    /// stencil applied mirrored.
    pub fn prepend_value(&self, u_m_minus_1: f64, u_m: f64, w_0: f64, w_1: f64) -> f64 {
        let c = self.coeffs;
        c[3] * u_m_minus_1 + c[2] * u_m + c[1] * w_0 + c[0] * w_1
    }
}
