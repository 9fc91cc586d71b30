//! Concentric offset buffers around a conduit centerline.
//!
//! A buffer with round caps and round joins equals the union of one stadium
//! (capsule) per polyline segment: consecutive capsules share the circle at
//! their common vertex, which produces the round join. Boolean union and
//! difference come from `geo`.

use crate::Point2;
use geo::{BooleanOps, Coord, LineString, MultiPolygon, Polygon};
use std::f64::consts::{FRAC_PI_2, PI};

/// Lengths below this are treated as zero.
const LENGTH_EPSILON: f64 = 1e-12;

/// Areas below this make a polygon empty.
const AREA_EPSILON: f64 = 1e-12;

/// The four polygons derived from one conduit.
#[derive(Debug, Clone)]
pub struct BufferRingSet {
    /// Conduit body at the nominal radius.
    pub conduit: MultiPolygon<f64>,
    /// Wall ring, `None` when it degenerates.
    pub wall: Option<MultiPolygon<f64>>,
    /// Excavation ring, `None` when it degenerates.
    pub excavation: Option<MultiPolygon<f64>>,
    /// Solid footprint out to the excavation edge.
    pub total: MultiPolygon<f64>,
    /// Radius of the total footprint.
    pub total_radius: f64,
}

impl BufferRingSet {
    /// Full width of the total footprint.
    pub fn total_width(&self) -> f64 {
        2.0 * self.total_radius
    }
}

/// Parameters of the concentric buffers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingParams {
    /// Conduit radius (m).
    pub radius: f64,
    /// Wall thickness outside the conduit (m).
    pub wall_thickness: f64,
    /// Excavation width outside the conduit (m).
    pub excavation_width: f64,
    /// Segments per quarter circle.
    pub segments: usize,
}

/// Compute conduit, wall, excavation and total polygons for a centerline.
pub fn concentric_rings(line: &[Point2], params: &RingParams) -> BufferRingSet {
    let conduit = buffer_polyline(line, params.radius, params.segments);

    let wall = ring(line, &conduit, params.radius, params.wall_thickness, params.segments);
    let excavation = ring(
        line,
        &conduit,
        params.radius,
        params.excavation_width,
        params.segments,
    );

    let total_radius = params.radius + params.excavation_width;
    let total = fill_holes(buffer_polyline(line, total_radius, params.segments));

    BufferRingSet {
        conduit,
        wall,
        excavation,
        total,
        total_radius,
    }
}

/// `buffer(radius + thickness) - conduit`, or `None` if it is empty.
fn ring(
    line: &[Point2],
    conduit: &MultiPolygon<f64>,
    radius: f64,
    thickness: f64,
    segments: usize,
) -> Option<MultiPolygon<f64>> {
    if thickness <= 0.0 {
        return None;
    }
    let outer = buffer_polyline(line, radius + thickness, segments);
    let ring = outer.difference(conduit);
    (!is_empty(&ring)).then_some(ring)
}

/// Buffer an open polyline with round caps and joins.
///
/// `segments` is the number of edges per quarter circle. Returns an empty
/// multipolygon for a non-positive radius or an empty line.
pub fn buffer_polyline(line: &[Point2], radius: f64, segments: usize) -> MultiPolygon<f64> {
    let segments = segments.max(1);
    if radius <= 0.0 || line.is_empty() {
        return MultiPolygon::new(Vec::new());
    }

    let capsules: Vec<Polygon<f64>> = line
        .windows(2)
        .filter(|w| (w[1] - w[0]).norm() > LENGTH_EPSILON)
        .map(|w| capsule(w[0], w[1], radius, segments))
        .collect();

    if capsules.is_empty() {
        // Every vertex coincides: the buffer of a point.
        return MultiPolygon::new(vec![disk(line[0], radius, segments)]);
    }

    let mut iter = capsules.into_iter();
    let mut result = MultiPolygon::new(iter.next().into_iter().collect());
    for capsule in iter {
        result = result.union(&MultiPolygon::new(vec![capsule]));
    }
    result
}

/// Stadium around the segment `a -> b`, counter-clockwise.
fn capsule(a: Point2, b: Point2, radius: f64, segments: usize) -> Polygon<f64> {
    let d = b - a;
    let heading = d.y.atan2(d.x);
    let steps = 2 * segments;

    let mut coords = Vec::with_capacity(2 * (steps + 1) + 1);
    // Arc around b from the right side to the left side, then around a back.
    push_arc(&mut coords, b, radius, heading - FRAC_PI_2, steps);
    push_arc(&mut coords, a, radius, heading + FRAC_PI_2, steps);
    coords.push(coords[0]);

    Polygon::new(LineString::from(coords), vec![])
}

/// Regular polygon approximating a circle.
fn disk(center: Point2, radius: f64, segments: usize) -> Polygon<f64> {
    let steps = 4 * segments;
    let mut coords: Vec<Coord<f64>> = (0..steps)
        .map(|i| {
            let a = 2.0 * PI * i as f64 / steps as f64;
            Coord {
                x: center.x + radius * a.cos(),
                y: center.y + radius * a.sin(),
            }
        })
        .collect();
    coords.push(coords[0]);
    Polygon::new(LineString::from(coords), vec![])
}

/// Half circle of `steps` edges starting at angle `start`.
fn push_arc(coords: &mut Vec<Coord<f64>>, center: Point2, radius: f64, start: f64, steps: usize) {
    for i in 0..=steps {
        let a = start + PI * i as f64 / steps as f64;
        coords.push(Coord {
            x: center.x + radius * a.cos(),
            y: center.y + radius * a.sin(),
        });
    }
}

/// Drop interior rings so the footprint is solid.
fn fill_holes(mp: MultiPolygon<f64>) -> MultiPolygon<f64> {
    let polygons: Vec<Polygon<f64>> = mp
        .into_iter()
        .map(|p| {
            let (exterior, _) = p.into_inner();
            Polygon::new(exterior, vec![])
        })
        .collect();
    if polygons.len() < 2 {
        return MultiPolygon::new(polygons);
    }
    // Filling holes can make an island overlap its former host; re-union.
    let mut iter = polygons.into_iter();
    let mut result = MultiPolygon::new(iter.next().into_iter().collect());
    for polygon in iter {
        result = result.union(&MultiPolygon::new(vec![polygon]));
    }
    result
}

/// Whether a multipolygon has no area.
pub fn is_empty(mp: &MultiPolygon<f64>) -> bool {
    use geo::Area;
    mp.0.is_empty() || mp.unsigned_area() < AREA_EPSILON
}

/// Planar length of a polyline.
pub fn polyline_length(line: &[Point2]) -> f64 {
    line.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
}
