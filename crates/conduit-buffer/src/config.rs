//! Run settings.

use crate::error::{ConduitError, Result};
use crate::units::DimensionUnit;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default number of buffer segments per quarter circle.
pub const DEFAULT_BUFFER_SEGMENTS: usize = 25;

/// Upper bound on buffer segments per quarter circle.
pub const MAX_BUFFER_SEGMENTS: usize = 1000;

/// File name of the 3D export inside the output folder.
pub const DXF_FILE_NAME: &str = "conduits_3d.dxf";

/// Conduit buffering parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Name of the numeric width attribute.
    pub width_field: String,
    /// Unit of the width and height attributes.
    pub unit: DimensionUnit,
    /// Wall thickness outside the conduit (m).
    pub wall_thickness: f64,
    /// Excavation width outside the conduit (m).
    pub excavation_width: f64,
    /// Buffer segments per quarter circle.
    pub buffer_segments: usize,
    /// Write a 3D DXF mesh of all conduits.
    pub export_3d: bool,
    /// Folder receiving the DXF file when `export_3d` is set.
    pub output_folder: Option<PathBuf>,
    /// Attribute names tried in order for the conduit height.
    pub height_fields: Vec<String>,
    /// Attribute holding the conduit identifier.
    pub id_field: String,
    /// Attribute names tried in order for the upstream invert elevation.
    pub start_invert_fields: Vec<String>,
    /// Attribute names tried in order for the downstream invert elevation.
    pub end_invert_fields: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width_field: "condwidth".into(),
            unit: DimensionUnit::Millimeters,
            wall_thickness: 0.15,
            excavation_width: 0.5,
            buffer_segments: DEFAULT_BUFFER_SEGMENTS,
            export_3d: false,
            output_folder: None,
            height_fields: names(&["condheight", "height", "alto"]),
            id_field: "id".into(),
            start_invert_fields: names(&["us_invert", "inv_start", "z_start"]),
            end_invert_fields: names(&["ds_invert", "inv_end", "z_end"]),
        }
    }
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Settings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if self.width_field.trim().is_empty() {
            return Err(ConduitError::InvalidSettings(
                "width_field must not be empty".into(),
            ));
        }
        if !(0.01..=2.0).contains(&self.wall_thickness) {
            return Err(ConduitError::InvalidSettings(
                "wall_thickness must be between 0.01 and 2.0 m".into(),
            ));
        }
        if !(0.1..=5.0).contains(&self.excavation_width) {
            return Err(ConduitError::InvalidSettings(
                "excavation_width must be between 0.1 and 5.0 m".into(),
            ));
        }
        if !(1..=MAX_BUFFER_SEGMENTS).contains(&self.buffer_segments) {
            return Err(ConduitError::InvalidSettings(format!(
                "buffer_segments must be between 1 and {}",
                MAX_BUFFER_SEGMENTS
            )));
        }
        if self.export_3d && self.output_folder.is_none() {
            return Err(ConduitError::InvalidSettings(
                "output_folder is required when export_3d is enabled".into(),
            ));
        }
        Ok(())
    }

    /// Path of the DXF export, if enabled.
    pub fn dxf_path(&self) -> Option<PathBuf> {
        if !self.export_3d {
            return None;
        }
        self.output_folder
            .as_ref()
            .map(|folder| folder.join(DXF_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.buffer_segments, 25);
        assert_eq!(settings.unit, DimensionUnit::Millimeters);
        assert!(settings.dxf_path().is_none());
    }

    #[test]
    fn test_wall_thickness_range() {
        let settings = Settings {
            wall_thickness: 2.5,
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let settings = Settings {
            wall_thickness: 0.0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_excavation_width_range() {
        let settings = Settings {
            excavation_width: 0.05,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_export_requires_folder() {
        let settings = Settings {
            export_3d: true,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConduitError::InvalidSettings(_))
        ));

        let settings = Settings {
            export_3d: true,
            output_folder: Some(PathBuf::from("out")),
            ..Default::default()
        };
        assert!(settings.validate().is_ok());
        assert_eq!(
            settings.dxf_path(),
            Some(PathBuf::from("out").join("conduits_3d.dxf"))
        );
    }

    #[test]
    fn test_segment_upper_bound() {
        let settings = Settings {
            buffer_segments: MAX_BUFFER_SEGMENTS,
            ..Default::default()
        };
        assert!(settings.validate().is_ok());

        let settings = Settings {
            buffer_segments: 4_000_000_000,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConduitError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_zero_segments_rejected() {
        let settings = Settings {
            buffer_segments: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }
}
