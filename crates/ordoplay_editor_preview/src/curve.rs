// SPDX-License-Identifier: MIT OR Apache-2.0
//! Blend curves mapping transition progress to blend weight.

use serde::{Deserialize, Serialize};

/// Interpolation mode between curve keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CurveInterpolation {
    /// Hold the key value until the next key
    Constant,
    /// Straight line to the next key
    #[default]
    Linear,
    /// Hermite spline with automatic tangents
    Smooth,
}

/// A key on a blend curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    /// Normalized progress in [0, 1]
    pub time: f32,
    /// Curve value at this key
    pub value: f32,
    /// Interpolation towards the next key
    pub interpolation: CurveInterpolation,
}

impl CurveKey {
    /// Create a linear key
    pub fn new(time: f32, value: f32) -> Self {
        Self {
            time,
            value,
            interpolation: CurveInterpolation::Linear,
        }
    }

    /// Set interpolation mode
    pub fn with_interpolation(mut self, mode: CurveInterpolation) -> Self {
        self.interpolation = mode;
        self
    }
}

/// Anything that can be sampled as a 1-D curve over [0, 1]
pub trait CurveSampler {
    /// Number of authored keys
    fn key_count(&self) -> usize;

    /// Sample the curve at `t`
    fn sample(&self, t: f32) -> f32;
}

/// Keyframed blend curve, sorted by time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "AuthoredCurve")]
pub struct BlendCurve {
    keys: Vec<CurveKey>,
}

/// Curve as stored in assets, before sorting and cleanup
#[derive(Deserialize)]
struct AuthoredCurve {
    keys: Vec<CurveKey>,
}

impl From<AuthoredCurve> for BlendCurve {
    fn from(authored: AuthoredCurve) -> Self {
        Self::from_keys(authored.keys)
    }
}

impl BlendCurve {
    /// Build a curve from authored keys; non-finite keys are dropped
    pub fn from_keys(keys: impl IntoIterator<Item = CurveKey>) -> Self {
        let mut keys: Vec<CurveKey> = keys
            .into_iter()
            .filter(|k| k.time.is_finite() && k.value.is_finite())
            .collect();
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }

    /// Linear fade from 1 to 0
    pub fn linear() -> Self {
        Self::from_keys([CurveKey::new(0.0, 1.0), CurveKey::new(1.0, 0.0)])
    }

    /// Smooth fade from 1 to 0
    pub fn ease_in_out() -> Self {
        Self::from_keys([
            CurveKey::new(0.0, 1.0).with_interpolation(CurveInterpolation::Smooth),
            CurveKey::new(1.0, 0.0).with_interpolation(CurveInterpolation::Smooth),
        ])
    }

    /// Add a key, keeping time order
    pub fn add_key(&mut self, key: CurveKey) {
        if key.time.is_finite() && key.value.is_finite() {
            self.keys.push(key);
            self.keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        }
    }

    /// All keys in time order
    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    /// Slope at key `idx`, Catmull-Rom style with flat end keys
    fn auto_tangent(&self, idx: usize) -> f32 {
        if idx == 0 || idx + 1 >= self.keys.len() {
            return 0.0;
        }
        let prev = &self.keys[idx - 1];
        let next = &self.keys[idx + 1];
        let span = next.time - prev.time;
        if span.abs() < 1e-6 {
            0.0
        } else {
            (next.value - prev.value) / span
        }
    }
}

impl CurveSampler for BlendCurve {
    fn key_count(&self) -> usize {
        self.keys.len()
    }

    fn sample(&self, t: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 0.0;
        };
        if t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        // First key strictly after t; guaranteed to exist and be > 0 here
        let next_idx = self.keys.iter().position(|k| k.time > t).unwrap_or(self.keys.len() - 1);
        let a = &self.keys[next_idx - 1];
        let b = &self.keys[next_idx];
        let span = b.time - a.time;
        if span.abs() < 1e-6 {
            return b.value;
        }
        let local = (t - a.time) / span;

        match a.interpolation {
            CurveInterpolation::Constant => a.value,
            CurveInterpolation::Linear => lerp(a.value, b.value, local),
            CurveInterpolation::Smooth => {
                let m0 = self.auto_tangent(next_idx - 1) * span;
                let m1 = self.auto_tangent(next_idx) * span;
                hermite(a.value, m0, b.value, m1, local)
            }
        }
    }
}

/// Stateless blend curve evaluation
pub struct BlendCurveEvaluator;

impl BlendCurveEvaluator {
    /// Evaluate `curve` at progress `t`; curves with fewer than two keys fall back to `1 - t`
    pub fn evaluate<C: CurveSampler + ?Sized>(curve: &C, t: f32) -> f32 {
        let t = if t.is_finite() {
            t.clamp(0.0, 1.0)
        } else {
            0.0
        };
        if curve.key_count() < 2 {
            return 1.0 - t;
        }
        curve.sample(t)
    }

    /// Sample `segments + 1` evenly spaced `[t, value]` points for drawing
    pub fn sample_polyline<C: CurveSampler + ?Sized>(curve: &C, segments: usize) -> Vec<[f32; 2]> {
        let segments = segments.max(1);
        (0..=segments)
            .map(|i| {
                let t = i as f32 / segments as f32;
                [t, Self::evaluate(curve, t)]
            })
            .collect()
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn hermite(p0: f32, m0: f32, p1: f32, m1: f32, t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;

    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;

    h00 * p0 + h10 * m0 + h01 * p1 + h11 * m1
}
