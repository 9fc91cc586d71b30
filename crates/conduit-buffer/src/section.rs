//! Cross-section classification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Width and height closer than this (millimeters) make a circular section.
pub const CIRCULAR_TOLERANCE_MM: f64 = 1.0;

/// Shape of a conduit cross-section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionKind {
    /// Round pipe.
    Circular,
    /// Box culvert or duct.
    Rectangular,
}

impl SectionKind {
    /// DXF layer faces of this kind are drawn on.
    pub fn layer_name(self) -> &'static str {
        match self {
            SectionKind::Circular => "CONDUIT_CIRCULAR",
            SectionKind::Rectangular => "CONDUIT_RECTANGULAR",
        }
    }

    /// ACI color of the layer (1 = red, 5 = blue).
    pub fn color(self) -> i16 {
        match self {
            SectionKind::Circular => 1,
            SectionKind::Rectangular => 5,
        }
    }

    /// Both kinds, in layer-table order.
    pub fn all() -> [SectionKind; 2] {
        [SectionKind::Circular, SectionKind::Rectangular]
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionKind::Circular => write!(f, "Circular"),
            SectionKind::Rectangular => write!(f, "Rectangular"),
        }
    }
}

/// A classified cross-section with its display dimensions in millimeters.
///
/// Exactly one of `{width_mm, height_mm}` or `diameter_mm` is populated;
/// `height_mm` may still be `None` for a rectangle of unknown height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Section {
    /// Section shape.
    pub kind: SectionKind,
    /// Rectangular width.
    pub width_mm: Option<f64>,
    /// Rectangular height.
    pub height_mm: Option<f64>,
    /// Circular diameter.
    pub diameter_mm: Option<f64>,
}

impl Section {
    /// Classify a section from its width and optional height, both in millimeters.
    pub fn classify(width_mm: f64, height_mm: Option<f64>) -> Self {
        match height_mm {
            Some(h) if h > 0.0 && (width_mm - h).abs() < CIRCULAR_TOLERANCE_MM => Self {
                kind: SectionKind::Circular,
                width_mm: None,
                height_mm: None,
                diameter_mm: Some(h),
            },
            _ => Self {
                kind: SectionKind::Rectangular,
                width_mm: Some(width_mm),
                height_mm,
                diameter_mm: None,
            },
        }
    }

    /// Whether this is a circular section.
    pub fn is_circular(&self) -> bool {
        self.kind == SectionKind::Circular
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_dimensions_are_circular() {
        let s = Section::classify(300.0, Some(300.0));
        assert_eq!(s.kind, SectionKind::Circular);
        assert_eq!(s.diameter_mm, Some(300.0));
        assert_eq!(s.width_mm, None);
        assert_eq!(s.height_mm, None);
    }

    #[test]
    fn test_within_tolerance_is_circular() {
        let s = Section::classify(300.0, Some(300.6));
        assert!(s.is_circular());
        assert_eq!(s.diameter_mm, Some(300.6));
    }

    #[test]
    fn test_different_dimensions_are_rectangular() {
        let s = Section::classify(300.0, Some(450.0));
        assert_eq!(s.kind, SectionKind::Rectangular);
        assert_eq!(s.width_mm, Some(300.0));
        assert_eq!(s.height_mm, Some(450.0));
        assert_eq!(s.diameter_mm, None);
    }

    #[test]
    fn test_missing_height_is_rectangular() {
        let s = Section::classify(300.0, None);
        assert_eq!(s.kind, SectionKind::Rectangular);
        assert_eq!(s.width_mm, Some(300.0));
        assert_eq!(s.height_mm, None);
    }

    #[test]
    fn test_zero_height_is_never_circular() {
        let s = Section::classify(0.5, Some(0.0));
        assert_eq!(s.kind, SectionKind::Rectangular);
    }

    #[test]
    fn test_layers_differ_per_kind() {
        let [c, r] = SectionKind::all();
        assert_ne!(c.layer_name(), r.layer_name());
        assert_ne!(c.color(), r.color());
    }
}
