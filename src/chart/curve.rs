//! Smooth interpolating curve through a time series

use std::fmt::Write as _;

use super::round_display;

/// Vertical inset reserved for value labels, split evenly above and below
pub const MARGIN: f64 = 30.0;

/// Every Nth sample carries a value label
pub const LABEL_STRIDE: usize = 4;

/// A point in chart space (origin top-left, y grows downwards)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Cubic Bezier segment between two consecutive samples
///
/// Both control points sit on the horizontal midpoint; the first keeps the
/// start's y and the second the end's y, so the segment never leaves the
/// vertical range spanned by its endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicSegment {
    pub start: Point,
    pub control1: Point,
    pub control2: Point,
    pub end: Point,
}

impl CubicSegment {
    fn between(start: Point, end: Point) -> Self {
        let mid_x = (start.x + end.x) / 2.0;
        Self {
            start,
            control1: Point::new(mid_x, start.y),
            control2: Point::new(mid_x, end.y),
            end,
        }
    }

    /// Evaluates the segment at `t` in [0, 1].
    pub fn at(&self, t: f64) -> Point {
        let u = 1.0 - t;
        let b0 = u * u * u;
        let b1 = 3.0 * u * u * t;
        let b2 = 3.0 * u * t * t;
        let b3 = t * t * t;
        Point::new(
            b0 * self.start.x + b1 * self.control1.x + b2 * self.control2.x + b3 * self.end.x,
            b0 * self.start.y + b1 * self.control1.y + b2 * self.control2.y + b3 * self.end.y,
        )
    }
}

/// A value label anchored above a sample
#[derive(Debug, Clone, PartialEq)]
pub struct CurveLabel {
    pub index: usize,
    pub anchor: Point,
    pub text: String,
}

/// Output of [`build_curve`]: one point per sample plus scaling metadata
#[derive(Debug, Clone, PartialEq)]
pub struct CurveGeometry {
    /// `points[i]` is the position of `samples[i]`
    pub points: Vec<Point>,
    pub min: f64,
    pub max: f64,
    pub width: f64,
    pub height: f64,
}

impl CurveGeometry {
    /// Geometry for an empty series; callers skip rendering it
    pub fn empty(width: f64, height: f64) -> Self {
        Self {
            points: Vec::new(),
            min: 0.0,
            max: 0.0,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Value range used for vertical scaling, guarded to 1 for flat series
    pub fn span(&self) -> f64 {
        scale_span(self.min, self.max)
    }

    /// Vertical position of a value under this geometry's scaling
    pub fn scale_y(&self, value: f64) -> f64 {
        scale_y(value, self.min, self.span(), self.height)
    }

    /// Cubic segments joining consecutive points
    pub fn segments(&self) -> Vec<CubicSegment> {
        self.points
            .windows(2)
            .map(|pair| CubicSegment::between(pair[0], pair[1]))
            .collect()
    }

    /// SVG path data for the stroke: `M x,y C c1 c2 end ...`
    pub fn path_data(&self) -> String {
        let Some(first) = self.points.first() else {
            return String::new();
        };

        let mut path = format!("M {},{}", first.x, first.y);
        for segment in self.segments() {
            let _ = write!(
                path,
                " C {},{} {},{} {},{}",
                segment.control1.x,
                segment.control1.y,
                segment.control2.x,
                segment.control2.y,
                segment.end.x,
                segment.end.y
            );
        }
        path
    }

    /// Stroke path closed down to the baseline for gradient shading
    pub fn area_path_data(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        format!(
            "{} L {},{} L 0,{} Z",
            self.path_data(),
            self.width,
            self.height,
            self.height
        )
    }

    /// Flattens the curve into a polyline with `steps` points per segment.
    ///
    /// Every sample point appears in the output unchanged.
    pub fn sample(&self, steps: usize) -> Vec<Point> {
        let steps = steps.max(1);
        let mut out = Vec::with_capacity(self.points.len().saturating_sub(1) * steps + 1);
        if let Some(first) = self.points.first() {
            out.push(*first);
        }
        for segment in self.segments() {
            for step in 1..steps {
                out.push(segment.at(step as f64 / steps as f64));
            }
            out.push(segment.end);
        }
        out
    }

    /// Labels for every [`LABEL_STRIDE`]th sample, placed 12 units above it
    pub fn labels(&self, samples: &[f64]) -> Vec<CurveLabel> {
        self.points
            .iter()
            .zip(samples)
            .enumerate()
            .filter(|(i, _)| i % LABEL_STRIDE == 0)
            .map(|(index, (point, value))| CurveLabel {
                index,
                anchor: Point::new(point.x, point.y - 12.0),
                text: format!("{}°", round_display(*value)),
            })
            .collect()
    }
}

fn scale_span(min: f64, max: f64) -> f64 {
    let span = max - min;
    if span == 0.0 {
        1.0
    } else {
        span
    }
}

fn scale_y(value: f64, min: f64, span: f64, height: f64) -> f64 {
    height - ((value - min) / span) * (height - MARGIN) - MARGIN / 2.0
}

/// Builds the curve geometry for `samples` inside a `width` x `height` box.
///
/// Sample `i` of `n` sits at `x = i / (n - 1) * width`; a single sample is
/// centred horizontally. An empty series yields [`CurveGeometry::empty`].
pub fn build_curve(samples: &[f64], width: f64, height: f64) -> CurveGeometry {
    if samples.is_empty() {
        return CurveGeometry::empty(width, height);
    }

    let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
    let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = scale_span(min, max);
    let last = samples.len() - 1;

    let points = samples
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let x = if last == 0 {
                width / 2.0
            } else {
                (i as f64 / last as f64) * width
            };
            Point::new(x, scale_y(*value, min, span, height))
        })
        .collect();

    CurveGeometry {
        points,
        min,
        max,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPS: [f64; 8] = [15.2, 14.8, 14.5, 16.0, 18.5, 22.5, 24.8, 21.5];

    #[test]
    fn test_points_pass_through_samples() {
        let geometry = build_curve(&TEMPS, 260.0, 100.0);
        assert_eq!(geometry.len(), TEMPS.len());
        for (point, value) in geometry.points.iter().zip(TEMPS.iter()) {
            assert_eq!(point.y, geometry.scale_y(*value));
        }
    }

    #[test]
    fn test_extremes_sit_on_margins() {
        let geometry = build_curve(&TEMPS, 260.0, 100.0);
        assert!((geometry.min - 14.5).abs() < 1e-9);
        assert!((geometry.max - 24.8).abs() < 1e-9);
        // min maps to height - margin/2, max to margin/2
        assert!((geometry.points[2].y - 85.0).abs() < 1e-9);
        assert!((geometry.points[6].y - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_horizontal_spacing_is_uniform() {
        let geometry = build_curve(&TEMPS, 70.0, 100.0);
        for (i, point) in geometry.points.iter().enumerate() {
            assert!((point.x - i as f64 * 10.0).abs() < 1e-9);
        }
        assert_eq!(geometry.points.last().map(|p| p.x), Some(70.0));
    }

    #[test]
    fn test_flat_series_is_finite() {
        let geometry = build_curve(&[10.0; 6], 260.0, 100.0);
        assert!(geometry
            .points
            .iter()
            .all(|p| p.x.is_finite() && p.y.is_finite()));
        assert!(geometry.points.iter().all(|p| (p.y - 85.0).abs() < 1e-9));
        assert!(geometry.sample(8).iter().all(|p| p.y.is_finite()));
    }

    #[test]
    fn test_single_sample_is_centred() {
        let geometry = build_curve(&[7.0], 260.0, 100.0);
        assert_eq!(geometry.points, vec![Point::new(130.0, 85.0)]);
        assert!(geometry.segments().is_empty());
        assert_eq!(geometry.path_data(), "M 130,85");
    }

    #[test]
    fn test_empty_series() {
        let geometry = build_curve(&[], 260.0, 100.0);
        assert!(geometry.is_empty());
        assert_eq!(geometry.path_data(), "");
        assert_eq!(geometry.area_path_data(), "");
        assert!(geometry.sample(4).is_empty());
    }

    #[test]
    fn test_segments_use_midpoint_controls() {
        let geometry = build_curve(&[0.0, 10.0], 100.0, 100.0);
        let segments = geometry.segments();
        assert_eq!(segments.len(), 1);
        let segment = segments[0];
        assert_eq!(segment.control1, Point::new(50.0, 85.0));
        assert_eq!(segment.control2, Point::new(50.0, 15.0));
        assert_eq!(
            geometry.path_data(),
            "M 0,85 C 50,85 50,15 100,15"
        );
    }

    #[test]
    fn test_area_path_closes_to_baseline() {
        let geometry = build_curve(&[0.0, 10.0], 100.0, 100.0);
        assert_eq!(
            geometry.area_path_data(),
            "M 0,85 C 50,85 50,15 100,15 L 100,100 L 0,100 Z"
        );
    }

    #[test]
    fn test_sampled_curve_stays_within_data_range() {
        let geometry = build_curve(&TEMPS, 260.0, 100.0);
        let top = geometry.points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let bottom = geometry
            .points
            .iter()
            .map(|p| p.y)
            .fold(f64::NEG_INFINITY, f64::max);
        for point in geometry.sample(16) {
            assert!(point.y >= top - 1e-9 && point.y <= bottom + 1e-9);
        }
    }

    #[test]
    fn test_sampled_curve_contains_every_point() {
        let geometry = build_curve(&TEMPS, 260.0, 100.0);
        let sampled = geometry.sample(5);
        assert_eq!(sampled.len(), (TEMPS.len() - 1) * 5 + 1);
        for (i, point) in geometry.points.iter().enumerate() {
            assert_eq!(sampled[i * 5], *point);
        }
    }

    #[test]
    fn test_build_is_deterministic() {
        let a = build_curve(&TEMPS, 260.0, 100.0);
        let b = build_curve(&TEMPS, 260.0, 100.0);
        assert_eq!(a, b);
        assert_eq!(a.path_data(), b.path_data());
    }

    #[test]
    fn test_labels_every_fourth_sample() {
        let geometry = build_curve(&TEMPS, 260.0, 100.0);
        let labels = geometry.labels(&TEMPS);
        let indices: Vec<usize> = labels.iter().map(|l| l.index).collect();
        assert_eq!(indices, vec![0, 4]);
        assert_eq!(labels[0].text, "15°");
        assert_eq!(labels[1].text, "19°");
        assert!((labels[0].anchor.y - (geometry.points[0].y - 12.0)).abs() < 1e-9);
    }
}
