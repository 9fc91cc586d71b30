//! Linear dimension units for width and height attributes.

use serde::{Deserialize, Serialize};

/// Unit in which the width and height attributes are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionUnit {
    /// Millimeters.
    #[default]
    #[serde(alias = "mm")]
    Millimeters,
    /// Meters.
    #[serde(alias = "m")]
    Meters,
}

impl DimensionUnit {
    /// Factor that converts a value in this unit to meters.
    pub fn meters_factor(self) -> f64 {
        match self {
            DimensionUnit::Millimeters => 0.001,
            DimensionUnit::Meters => 1.0,
        }
    }

    /// Convert a value in this unit to meters.
    #[inline]
    pub fn to_meters(self, value: f64) -> f64 {
        value * self.meters_factor()
    }

    /// Convert a value in this unit to millimeters.
    #[inline]
    pub fn to_millimeters(self, value: f64) -> f64 {
        match self {
            DimensionUnit::Millimeters => value,
            DimensionUnit::Meters => value * 1000.0,
        }
    }

    /// Short label used in log lines.
    pub fn symbol(self) -> &'static str {
        match self {
            DimensionUnit::Millimeters => "mm",
            DimensionUnit::Meters => "m",
        }
    }
}
