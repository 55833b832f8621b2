//! Piecewise-linear curves
//!
//! Curves are sorted lists of control points. They are used two ways:
//! as lookup tables (`evaluate`) and as unnormalized probability densities
//! (`sample_density`) for age and skill draws.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A single (x, y) control point
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub x: f32,
    pub y: f32,
}

impl CurvePoint {
    pub const fn new(x: f32, y: f32) -> Self {
        CurvePoint { x, y }
    }
}

impl From<[f32; 2]> for CurvePoint {
    fn from(p: [f32; 2]) -> Self {
        CurvePoint { x: p[0], y: p[1] }
    }
}

impl From<CurvePoint> for [f32; 2] {
    fn from(p: CurvePoint) -> Self {
        [p.x, p.y]
    }
}

/// Sorted control points with linear interpolation between them.
///
/// Serialized as a list of `[x, y]` pairs so data files stay compact.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<[f32; 2]>", into = "Vec<[f32; 2]>")]
pub struct SimpleCurve {
    points: Vec<CurvePoint>,
}

impl From<Vec<[f32; 2]>> for SimpleCurve {
    fn from(raw: Vec<[f32; 2]>) -> Self {
        SimpleCurve::new(raw.into_iter().map(CurvePoint::from).collect())
    }
}

impl From<SimpleCurve> for Vec<[f32; 2]> {
    fn from(curve: SimpleCurve) -> Self {
        curve.points.into_iter().map(<[f32; 2]>::from).collect()
    }
}

impl SimpleCurve {
    /// Build a curve, sorting the points by x.
    pub fn new(mut points: Vec<CurvePoint>) -> Self {
        points.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
        SimpleCurve { points }
    }

    /// Convenience constructor from `(x, y)` tuples.
    pub fn from_pairs(pairs: &[(f32, f32)]) -> Self {
        Self::new(pairs.iter().map(|&(x, y)| CurvePoint::new(x, y)).collect())
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Evaluate the curve at `x`, clamping to the end points outside the domain.
    pub fn evaluate(&self, x: f32) -> f32 {
        let (first, last) = match (self.points.first(), self.points.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return 0.0,
        };
        if x <= first.x {
            return first.y;
        }
        if x >= last.x {
            return last.y;
        }
        for pair in self.points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if x >= a.x && x <= b.x {
                let span = b.x - a.x;
                if span <= f32::EPSILON {
                    return b.y;
                }
                let t = (x - a.x) / span;
                return a.y + (b.y - a.y) * t;
            }
        }
        last.y
    }

    /// Highest y value among the control points.
    pub fn max_y(&self) -> f32 {
        self.points.iter().map(|p| p.y).fold(0.0, f32::max)
    }

    /// Draw an x value treating the curve as an unnormalized density.
    ///
    /// Consumes exactly two random values: one picks a segment by its area,
    /// the other inverts the trapezoid CDF inside that segment. Negative y
    /// values count as zero density. A curve with no area returns its first x.
    pub fn sample_density<R: Rng>(&self, rng: &mut R) -> f32 {
        let segment_pick: f32 = rng.gen();
        let within: f32 = rng.gen();

        let areas: Vec<f32> = self
            .points
            .windows(2)
            .map(|w| {
                let a = w[0].y.max(0.0);
                let b = w[1].y.max(0.0);
                (a + b) * 0.5 * (w[1].x - w[0].x)
            })
            .collect();
        let total: f32 = areas.iter().sum();
        if total <= 0.0 {
            return self.points.first().map(|p| p.x).unwrap_or(0.0);
        }

        let mut target = segment_pick * total;
        let mut index = areas.len() - 1;
        for (i, area) in areas.iter().enumerate() {
            if target < *area {
                index = i;
                break;
            }
            target -= area;
        }

        let lo = self.points[index];
        let hi = self.points[index + 1];
        let a = lo.y.max(0.0);
        let b = hi.y.max(0.0);
        let width = hi.x - lo.x;

        // Density inside the segment is proportional to a + (b - a) * t.
        let t = if (b - a).abs() < 1e-6 {
            within
        } else {
            let disc = a * a + (b - a) * within * (a + b);
            ((-a + disc.max(0.0).sqrt()) / (b - a)).clamp(0.0, 1.0)
        };
        lo.x + t * width
    }
}

/// Inclusive float range, serialized as `[min, max]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct FloatRange {
    pub min: f32,
    pub max: f32,
}

impl From<[f32; 2]> for FloatRange {
    fn from(r: [f32; 2]) -> Self {
        FloatRange { min: r[0], max: r[1] }
    }
}

impl From<FloatRange> for [f32; 2] {
    fn from(r: FloatRange) -> Self {
        [r.min, r.max]
    }
}

impl FloatRange {
    pub const fn new(min: f32, max: f32) -> Self {
        FloatRange { min, max }
    }

    pub fn includes(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Uniform draw inside the range (a degenerate range returns `min`).
    pub fn random_in_range<R: Rng>(&self, rng: &mut R) -> f32 {
        crate::rand_util::range_f32(rng, self.min, self.max)
    }
}

/// Inclusive integer range, serialized as `[min, max]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct IntRange {
    pub min: i32,
    pub max: i32,
}

impl From<[i32; 2]> for IntRange {
    fn from(r: [i32; 2]) -> Self {
        IntRange { min: r[0], max: r[1] }
    }
}

impl From<IntRange> for [i32; 2] {
    fn from(r: IntRange) -> Self {
        [r.min, r.max]
    }
}

impl IntRange {
    pub const fn new(min: i32, max: i32) -> Self {
        IntRange { min, max }
    }

    pub fn includes(&self, value: i32) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn random_in_range<R: Rng>(&self, rng: &mut R) -> i32 {
        if self.max <= self.min {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }
}
