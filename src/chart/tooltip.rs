//! Pointer-to-sample mapping for the curve tooltip

use super::{round_display, CurveGeometry, Point};

/// Tooltip for the sample nearest to the pointer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tooltip {
    /// Index into the sample series
    pub index: usize,
    /// Position of the sample on the curve
    pub position: Point,
    /// Rounded sample value
    pub value: i64,
}

/// Resolves the tooltip for a pointer at `pointer_x` (chart space).
///
/// The horizontal scale is uniform, so the index is found by inverting it
/// directly: `round(pointer_x / width * (n - 1))`, clamped to the series.
/// Returns `None` when the pointer lies outside `[0, width]` or there is
/// nothing to show.
pub fn resolve_tooltip(pointer_x: f64, geometry: &CurveGeometry, samples: &[f64]) -> Option<Tooltip> {
    let count = geometry.len().min(samples.len());
    if count == 0 || !pointer_x.is_finite() {
        return None;
    }
    if pointer_x < 0.0 || pointer_x > geometry.width {
        return None;
    }

    let last = count - 1;
    let index = if geometry.width > 0.0 {
        let raw = ((pointer_x / geometry.width) * last as f64).round();
        (raw.max(0.0) as usize).min(last)
    } else {
        0
    };

    Some(Tooltip {
        index,
        position: geometry.points[index],
        value: round_display(samples[index]),
    })
}
