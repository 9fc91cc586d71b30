//! Output polygon records and the sinks that receive them.

use crate::section::SectionKind;
use geo::MultiPolygon;
use serde::Serialize;

/// Conduit body polygon.
#[derive(Debug, Clone, Serialize)]
pub struct ConduitPolygon {
    /// Conduit identifier.
    pub id: String,
    /// Section shape.
    pub section: SectionKind,
    /// Rectangular width (mm).
    pub width_mm: Option<f64>,
    /// Rectangular height (mm).
    pub height_mm: Option<f64>,
    /// Circular diameter (mm).
    pub diameter_mm: Option<f64>,
    /// Planar centerline length.
    pub length_m: f64,
    /// Polygon geometry.
    #[serde(skip)]
    pub geometry: MultiPolygon<f64>,
}

/// Wall ring polygon.
#[derive(Debug, Clone, Serialize)]
pub struct WallPolygon {
    /// Conduit identifier.
    pub id: String,
    /// Wall thickness (m).
    pub thickness_m: f64,
    /// Polygon geometry.
    #[serde(skip)]
    pub geometry: MultiPolygon<f64>,
}

/// Excavation ring polygon.
#[derive(Debug, Clone, Serialize)]
pub struct ExcavationPolygon {
    /// Conduit identifier.
    pub id: String,
    /// Excavation width outside the conduit (m).
    pub width_m: f64,
    /// Polygon geometry.
    #[serde(skip)]
    pub geometry: MultiPolygon<f64>,
}

/// Solid total footprint polygon.
#[derive(Debug, Clone, Serialize)]
pub struct TotalPolygon {
    /// Conduit identifier.
    pub id: String,
    /// Full footprint width (m).
    pub total_width_m: f64,
    /// Polygon geometry.
    #[serde(skip)]
    pub geometry: MultiPolygon<f64>,
}

/// Append-only receiver of the four output layers.
pub trait LayerSink {
    /// Add a conduit polygon.
    fn add_conduit(&mut self, record: ConduitPolygon);
    /// Add a wall polygon.
    fn add_wall(&mut self, record: WallPolygon);
    /// Add an excavation polygon.
    fn add_excavation(&mut self, record: ExcavationPolygon);
    /// Add a total footprint polygon.
    fn add_total(&mut self, record: TotalPolygon);
}

/// In-memory output layers.
#[derive(Debug, Clone, Default)]
pub struct BufferLayers {
    /// Conduit polygons.
    pub conduits: Vec<ConduitPolygon>,
    /// Wall polygons.
    pub walls: Vec<WallPolygon>,
    /// Excavation polygons.
    pub excavation: Vec<ExcavationPolygon>,
    /// Total footprint polygons.
    pub total: Vec<TotalPolygon>,
}

impl BufferLayers {
    /// Create empty layers.
    pub fn new() -> Self {
        Self::default()
    }
}

impl LayerSink for BufferLayers {
    fn add_conduit(&mut self, record: ConduitPolygon) {
        self.conduits.push(record);
    }

    fn add_wall(&mut self, record: WallPolygon) {
        self.walls.push(record);
    }

    fn add_excavation(&mut self, record: ExcavationPolygon) {
        self.excavation.push(record);
    }

    fn add_total(&mut self, record: TotalPolygon) {
        self.total.push(record);
    }
}
