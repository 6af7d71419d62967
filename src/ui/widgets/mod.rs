//! Custom widgets

pub mod curve;

pub use curve::TemperatureCurve;
