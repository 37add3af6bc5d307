// SPDX-License-Identifier: MIT OR Apache-2.0
//! Bezier paths for path-fly collision volumes.
//!
//! A path is authored as an ordered list of key points. Each consecutive pair
//! of key points forms one cubic segment whose inner control points are the
//! key points' handle offsets. Segments are spaced uniformly over `t`, so a
//! path with `n` key points spends `1 / (n - 1)` of its parameter range on each
//! segment regardless of the segment's length. [`BezierPathSampler::sample_by_distance`]
//! reparametrizes by arc length for constant-speed travel.

use crate::settings::clamp_arc_length_samples;
use serde::{Deserialize, Serialize};

/// Below this length a path is treated as a single point
const DEGENERATE_LENGTH: f32 = 1.0e-6;

/// How a key point's tangent handles behave in the authoring tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum HandleStyle {
    /// Left and right handles mirror each other
    #[default]
    Connected,
    /// Handles move independently
    Broken,
    /// No handles; the curve passes straight through the point
    NoHandles,
}

/// A key point on a bezier path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BezierPoint {
    /// Position relative to the path origin
    pub local_position: [f32; 3],
    /// Handle behavior
    pub handle_style: HandleStyle,
    /// Incoming tangent handle, relative to `local_position`
    pub left_handle: [f32; 3],
    /// Outgoing tangent handle, relative to `local_position`
    pub right_handle: [f32; 3],
}

impl BezierPoint {
    /// Create a key point with collapsed handles
    pub fn new(local_position: [f32; 3]) -> Self {
        Self {
            local_position,
            handle_style: HandleStyle::Connected,
            left_handle: [0.0; 3],
            right_handle: [0.0; 3],
        }
    }

    /// Set both tangent handles
    pub fn with_handles(mut self, left: [f32; 3], right: [f32; 3]) -> Self {
        self.left_handle = left;
        self.right_handle = right;
        self
    }

    /// Set the handle style
    pub fn with_handle_style(mut self, style: HandleStyle) -> Self {
        self.handle_style = style;
        self
    }

    /// Control point leading into this key point
    fn in_control(&self) -> [f32; 3] {
        match self.handle_style {
            HandleStyle::NoHandles => self.local_position,
            HandleStyle::Connected | HandleStyle::Broken => {
                Interpolation::add_vec3(self.local_position, self.left_handle)
            }
        }
    }

    /// Control point leaving this key point
    fn out_control(&self) -> [f32; 3] {
        match self.handle_style {
            HandleStyle::NoHandles => self.local_position,
            HandleStyle::Connected | HandleStyle::Broken => {
                Interpolation::add_vec3(self.local_position, self.right_handle)
            }
        }
    }
}

/// An authored bezier curve
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BezierCurve {
    /// Key points in authoring order
    pub key_points: Vec<BezierPoint>,
}

impl BezierCurve {
    /// Create an empty curve
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a curve from key points
    pub fn from_points(points: impl IntoIterator<Item = BezierPoint>) -> Self {
        Self {
            key_points: points.into_iter().collect(),
        }
    }

    /// Append a key point
    pub fn add_point(&mut self, point: BezierPoint) {
        self.key_points.push(point);
    }

    /// Get key point count
    pub fn len(&self) -> usize {
        self.key_points.len()
    }

    /// Whether the curve has no key points
    pub fn is_empty(&self) -> bool {
        self.key_points.is_empty()
    }
}

/// Read-only evaluator over an authored curve
#[derive(Debug, Clone, Default)]
pub struct BezierPathSampler<'a> {
    points: &'a [BezierPoint],
    /// Cumulative distances at uniform parameter steps, when arc-length sampling is enabled
    arc_lengths: Option<Vec<f32>>,
}

impl<'a> BezierPathSampler<'a> {
    /// Create a sampler over a curve; an unset curve samples as empty
    pub fn new(curve: Option<&'a BezierCurve>) -> Self {
        Self {
            points: curve.map(|c| c.key_points.as_slice()).unwrap_or_default(),
            arc_lengths: None,
        }
    }

    /// Precompute an arc-length table with `samples` steps
    ///
    /// `samples` is clamped to the range allowed by [`ClipSettings`](crate::settings::ClipSettings).
    pub fn with_arc_length(mut self, samples: usize) -> Self {
        self.arc_lengths = Some(self.arc_length_table(samples));
        self
    }

    /// Copy of the key points in authoring order
    pub fn control_points(&self) -> Vec<BezierPoint> {
        self.points.to_vec()
    }

    /// Get key point count
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether there is nothing to sample
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Evaluate the path at normalized parameter `t` (clamped to `[0, 1]`)
    ///
    /// Returns `None` only for an empty path.
    pub fn sample(&self, t: f32) -> Option<[f32; 3]> {
        let t = clamp_unit(t);
        match self.points {
            [] => None,
            [only] => Some(only.local_position),
            points => {
                let segments = points.len() - 1;
                let scaled = t * segments as f32;
                let index = (scaled.floor() as usize).min(segments - 1);
                let local = scaled - index as f32;
                let (a, b) = (&points[index], &points[index + 1]);

                Some(Interpolation::bezier_vec3(
                    a.local_position,
                    a.out_control(),
                    b.in_control(),
                    b.local_position,
                    local,
                ))
            }
        }
    }

    /// Approximate path length using a polyline of `samples` steps
    pub fn length(&self, samples: usize) -> f32 {
        match &self.arc_lengths {
            Some(table) => table.last().copied().unwrap_or(0.0),
            None => self.arc_length_table(samples).last().copied().unwrap_or(0.0),
        }
    }

    /// Evaluate the path at a fraction `t` of its total length
    ///
    /// Uses the precomputed table from [`Self::with_arc_length`], or builds a
    /// default one on the fly.
    pub fn sample_by_distance(&self, t: f32) -> Option<[f32; 3]> {
        let owned;
        let table = match &self.arc_lengths {
            Some(table) => table,
            None => {
                owned = self.arc_length_table(crate::settings::DEFAULT_ARC_LENGTH_SAMPLES);
                &owned
            }
        };

        let total = table.last().copied().unwrap_or(0.0);
        if total <= DEGENERATE_LENGTH {
            return self.sample(t);
        }

        let steps = table.len() - 1;
        let target = clamp_unit(t) * total;
        let upper = table.partition_point(|d| *d < target).clamp(1, steps);
        let lower = upper - 1;
        let span = table[upper] - table[lower];
        let fraction = if span > DEGENERATE_LENGTH {
            (target - table[lower]) / span
        } else {
            0.0
        };

        self.sample((lower as f32 + fraction) / steps as f32)
    }

    fn arc_length_table(&self, samples: usize) -> Vec<f32> {
        let steps = clamp_arc_length_samples(samples);
        let mut table = Vec::with_capacity(steps + 1);
        let Some(mut previous) = self.sample(0.0) else {
            return vec![0.0];
        };

        let mut travelled = 0.0;
        table.push(travelled);
        for step in 1..=steps {
            let Some(point) = self.sample(step as f32 / steps as f32) else {
                break;
            };
            travelled += Interpolation::distance_vec3(previous, point);
            table.push(travelled);
            previous = point;
        }
        table
    }
}

/// Clamp into `[0, 1]`, mapping NaN to 0
fn clamp_unit(t: f32) -> f32 {
    if t.is_nan() {
        0.0
    } else {
        t.clamp(0.0, 1.0)
    }
}

/// Interpolation and vector utilities
pub struct Interpolation;

impl Interpolation {
    /// Cubic bezier interpolation
    pub fn bezier(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        p0 * mt3 + 3.0 * p1 * mt2 * t + 3.0 * p2 * mt * t2 + p3 * t3
    }

    /// Cubic bezier interpolation per component
    pub fn bezier_vec3(p0: [f32; 3], p1: [f32; 3], p2: [f32; 3], p3: [f32; 3], t: f32) -> [f32; 3] {
        [
            Self::bezier(p0[0], p1[0], p2[0], p3[0], t),
            Self::bezier(p0[1], p1[1], p2[1], p3[1], t),
            Self::bezier(p0[2], p1[2], p2[2], p3[2], t),
        ]
    }

    /// Component-wise sum
    pub fn add_vec3(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
    }

    /// Scale a vector
    pub fn scale_vec3(v: [f32; 3], s: f32) -> [f32; 3] {
        [v[0] * s, v[1] * s, v[2] * s]
    }

    /// Euclidean distance
    pub fn distance_vec3(a: [f32; 3], b: [f32; 3]) -> f32 {
        let d = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
        (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt()
    }
}
