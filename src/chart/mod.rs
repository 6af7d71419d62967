//! Temperature curve geometry and pointer mapping
//!
//! `curve` turns an ordered series of samples into a smooth interpolating path
//! inside a fixed coordinate box; `tooltip` maps a horizontal pointer offset in
//! that box back to the nearest sample.

pub mod curve;
pub mod tooltip;

pub use curve::{build_curve, CubicSegment, CurveGeometry, CurveLabel, Point};
pub use tooltip::{resolve_tooltip, Tooltip};

/// Rounds a sample for display, with halves rounding towards positive infinity.
pub fn round_display(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_display_halves_round_up() {
        assert_eq!(round_display(2.5), 3);
        assert_eq!(round_display(-2.5), -2);
        assert_eq!(round_display(-2.6), -3);
        assert_eq!(round_display(14.49), 14);
    }
}
