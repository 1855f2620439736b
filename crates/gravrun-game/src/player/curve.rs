//! Easing curves for the run-speed ramp

use serde::{Deserialize, Serialize};

/// Monotonic curve mapping `[0, 1]` onto a speed multiplier in `[0, 1]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedCurve {
    /// `f(t) = t`
    Linear,
    /// Hermite ease-in/ease-out
    SmoothStep,
    /// Quadratic ease-out: fast start, gentle arrival
    EaseOut,
    /// Piecewise-linear `[t, value]` pairs, sorted by `t`
    Keyframes(Vec<[f32; 2]>),
}

impl Default for SpeedCurve {
    fn default() -> Self {
        Self::EaseOut
    }
}

impl SpeedCurve {
    /// Evaluate at `t`, clamped into `[0, 1]`
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Self::Linear => t,
            Self::SmoothStep => gravrun_core::math::smoothstep(t),
            Self::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Self::Keyframes(keys) => evaluate_keyframes(keys, t),
        }
    }

    /// Whether the curve is non-decreasing with values in `[0, 1]`
    pub fn is_monotonic(&self) -> bool {
        match self {
            Self::Keyframes(keys) => {
                !keys.is_empty()
                    && keys
                        .iter()
                        .all(|[t, v]| (0.0..=1.0).contains(t) && (0.0..=1.0).contains(v))
                    && keys.windows(2).all(|w| w[0][0] < w[1][0] && w[0][1] <= w[1][1])
            }
            _ => true,
        }
    }
}

fn evaluate_keyframes(keys: &[[f32; 2]], t: f32) -> f32 {
    let Some(first) = keys.first() else {
        return t;
    };
    if t <= first[0] {
        return first[1];
    }
    for pair in keys.windows(2) {
        let ([t0, v0], [t1, v1]) = (pair[0], pair[1]);
        if t <= t1 {
            let span = t1 - t0;
            let alpha = if span > 0.0 { (t - t0) / span } else { 1.0 };
            return v0 + (v1 - v0) * alpha;
        }
    }
    keys[keys.len() - 1][1]
}
