#![warn(missing_docs)]

//! Concentric buffers and 3D meshes for sewer and drainage conduits.
//!
//! Each conduit centerline becomes four planar layers (conduit body, wall
//! ring, excavation ring and solid total footprint) and, optionally, a
//! triangulated 3D pipe written to a DXF file.
//!
//! # Example
//!
//! ```ignore
//! use conduit_buffer::{BufferLayers, ConduitBuffer, LogFeedback, Settings};
//!
//! let source = /* any FeatureSource */;
//! let processor = ConduitBuffer::new(Settings::default())?;
//! let mut layers = BufferLayers::new();
//! let summary = processor.run(Some(&source), &mut layers, &mut LogFeedback::new())?;
//!
//! println!("{} conduits, {} skipped", summary.processed, summary.skipped);
//! ```

pub mod buffer;
pub mod config;
pub mod elevation;
pub mod error;
pub mod export;
pub mod feedback;
pub mod mesh;
pub mod records;
pub mod run;
pub mod section;
pub mod source;
pub mod units;

pub use buffer::{buffer_polyline, concentric_rings, polyline_length, BufferRingSet, RingParams};
pub use config::{Settings, DEFAULT_BUFFER_SEGMENTS, DXF_FILE_NAME, MAX_BUFFER_SEGMENTS};
pub use elevation::interpolate_elevations;
pub use error::{ConduitError, FeatureError, Result};
pub use export::{export_faces, mesh_document};
pub use feedback::{Feedback, LogFeedback};
pub use mesh::{
    tessellate_conduit, tessellate_segment, CrossSection, EndCaps, Face, FaceVertices, MeshSegment,
};
pub use records::{
    BufferLayers, ConduitPolygon, ExcavationPolygon, LayerSink, TotalPolygon, WallPolygon,
};
pub use run::{ConduitBuffer, ConduitOutput, RunSummary};
pub use section::{Section, SectionKind};
pub use source::{Feature, FeatureCollection, FeatureSource, FieldBinding, FieldValue};
pub use units::DimensionUnit;

/// Planar point in map units.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point in map units with elevation.
pub type Point3 = nalgebra::Point3<f64>;
