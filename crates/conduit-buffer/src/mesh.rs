//! 3D face tessellation of conduit segments.
//!
//! Each polyline segment becomes a tube (circular sections) or a box
//! (rectangular sections) made of planar 3- and 4-vertex faces. Cross-sections
//! are built in the frame spanned by the in-plane perpendicular `p` of the
//! segment and the world Z axis, centered on the interpolated elevation. For
//! sloped pipes this gives a vertical section rather than one normal to the
//! 3D tangent; exported meshes depend on that.

use crate::section::{Section, SectionKind};
use crate::{Point2, Point3};
use conduit_buffer_dxf::{Face3D, Point3D};
use nalgebra::Vector3;
use std::f64::consts::PI;

/// Number of sides of the polygon approximating a circular section.
pub const CIRCLE_SEGMENTS: usize = 16;

/// Cross-section size in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CrossSection {
    /// Round pipe.
    Circular {
        /// Pipe radius.
        radius: f64,
    },
    /// Rectangular duct.
    Rectangular {
        /// Half of the width, along the in-plane perpendicular.
        half_width: f64,
        /// Half of the height, along Z.
        half_height: f64,
    },
}

impl CrossSection {
    /// Build from a classified section in millimeters.
    ///
    /// A rectangle of unknown height is meshed as a square duct.
    pub fn from_section(section: &Section) -> Self {
        let mm = |v: f64| v * 0.001;
        match section.kind {
            SectionKind::Circular => CrossSection::Circular {
                radius: mm(section.diameter_mm.unwrap_or_default()) / 2.0,
            },
            SectionKind::Rectangular => {
                let width = section.width_mm.unwrap_or_default();
                CrossSection::Rectangular {
                    half_width: mm(width) / 2.0,
                    half_height: mm(section.height_mm.unwrap_or(width)) / 2.0,
                }
            }
        }
    }

    /// Kind of section.
    pub fn kind(&self) -> SectionKind {
        match self {
            CrossSection::Circular { .. } => SectionKind::Circular,
            CrossSection::Rectangular { .. } => SectionKind::Rectangular,
        }
    }
}

/// Corners of a face in winding order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FaceVertices {
    /// Three corners.
    Triangle([Point3; 3]),
    /// Four corners.
    Quad([Point3; 4]),
}

impl FaceVertices {
    /// Corners as a slice.
    pub fn as_slice(&self) -> &[Point3] {
        match self {
            FaceVertices::Triangle(v) => v,
            FaceVertices::Quad(v) => v,
        }
    }
}

/// A planar face of 3 or 4 vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    corners: FaceVertices,
    /// Section kind, which fixes layer and color.
    pub kind: SectionKind,
}

impl Face {
    fn triangle(a: Point3, b: Point3, c: Point3, kind: SectionKind) -> Self {
        Self {
            corners: FaceVertices::Triangle([a, b, c]),
            kind,
        }
    }

    fn quad(a: Point3, b: Point3, c: Point3, d: Point3, kind: SectionKind) -> Self {
        Self {
            corners: FaceVertices::Quad([a, b, c, d]),
            kind,
        }
    }

    /// Corners in winding order.
    pub fn vertices(&self) -> &[Point3] {
        self.corners.as_slice()
    }

    /// Corners with their arity.
    pub fn corners(&self) -> &FaceVertices {
        &self.corners
    }

    /// DXF layer name.
    pub fn layer(&self) -> &'static str {
        self.kind.layer_name()
    }

    /// DXF color.
    pub fn color(&self) -> i16 {
        self.kind.color()
    }

    /// Convert into a DXF entity.
    pub fn to_dxf(&self) -> Face3D {
        let p = |v: &Point3| Point3D::new(v.x, v.y, v.z);
        match &self.corners {
            FaceVertices::Triangle(v) => {
                Face3D::triangle(v.each_ref().map(p), self.layer(), self.color())
            }
            FaceVertices::Quad(v) => Face3D::quad(v.each_ref().map(p), self.layer(), self.color()),
        }
    }
}

/// Which ends of a segment receive a cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EndCaps {
    /// Cap at the segment start.
    pub start: bool,
    /// Cap at the segment end.
    pub end: bool,
}

/// Faces produced for one polyline segment.
#[derive(Debug, Clone, Default)]
pub struct MeshSegment {
    /// Faces connecting the start and end sections.
    pub lateral: Vec<Face>,
    /// End-cap faces.
    pub caps: Vec<Face>,
}

impl MeshSegment {
    /// Total number of faces.
    pub fn len(&self) -> usize {
        self.lateral.len() + self.caps.len()
    }

    /// Whether no faces were produced.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All faces, lateral first.
    pub fn into_faces(self) -> Vec<Face> {
        let mut faces = self.lateral;
        faces.extend(self.caps);
        faces
    }
}

/// Tessellate one segment between two section centers.
///
/// Returns an empty segment when the two centers coincide in plan.
/// Rectangular boxes are always closed; `caps` only applies to circular
/// sections.
pub fn tessellate_segment(
    start: Point3,
    end: Point3,
    section: &CrossSection,
    caps: EndCaps,
) -> MeshSegment {
    let d = Vector3::new(end.x - start.x, end.y - start.y, 0.0);
    let len = d.norm();
    if len <= f64::EPSILON {
        return MeshSegment::default();
    }
    let p = Vector3::new(-d.y / len, d.x / len, 0.0);

    match *section {
        CrossSection::Circular { radius } => circular_segment(start, end, p, radius, caps),
        CrossSection::Rectangular {
            half_width,
            half_height,
        } => box_segment(start, end, p, half_width, half_height),
    }
}

fn circular_ring(center: Point3, p: Vector3<f64>, radius: f64) -> Vec<Point3> {
    (0..CIRCLE_SEGMENTS)
        .map(|j| {
            let a = 2.0 * PI * j as f64 / CIRCLE_SEGMENTS as f64;
            Point3::new(
                center.x + radius * p.x * a.cos(),
                center.y + radius * p.y * a.cos(),
                center.z + radius * a.sin(),
            )
        })
        .collect()
}

fn circular_segment(
    start: Point3,
    end: Point3,
    p: Vector3<f64>,
    radius: f64,
    caps: EndCaps,
) -> MeshSegment {
    let kind = SectionKind::Circular;
    let s = circular_ring(start, p, radius);
    let e = circular_ring(end, p, radius);
    let n = CIRCLE_SEGMENTS;

    let lateral = (0..n)
        .map(|j| {
            let k = (j + 1) % n;
            Face::quad(s[j], s[k], e[k], e[j], kind)
        })
        .collect();

    let mut cap_faces = Vec::new();
    if caps.start {
        // Reversed fan so the cap faces backwards along the pipe.
        cap_faces.extend((1..n - 1).map(|j| Face::triangle(s[0], s[j + 1], s[j], kind)));
    }
    if caps.end {
        cap_faces.extend((1..n - 1).map(|j| Face::triangle(e[0], e[j], e[j + 1], kind)));
    }

    MeshSegment {
        lateral,
        caps: cap_faces,
    }
}

/// Section corners: 0 = (-p, -z), 1 = (+p, -z), 2 = (+p, +z), 3 = (-p, +z).
fn box_corners(center: Point3, p: Vector3<f64>, hw: f64, hh: f64) -> [Point3; 4] {
    let z = Vector3::new(0.0, 0.0, 1.0);
    [
        center - p * hw - z * hh,
        center + p * hw - z * hh,
        center + p * hw + z * hh,
        center - p * hw + z * hh,
    ]
}

fn box_segment(start: Point3, end: Point3, p: Vector3<f64>, hw: f64, hh: f64) -> MeshSegment {
    let kind = SectionKind::Rectangular;
    let [s0, s1, s2, s3] = box_corners(start, p, hw, hh);
    let [e0, e1, e2, e3] = box_corners(end, p, hw, hh);

    let quads = [
        [s0, s3, s2, s1], // start cap
        [e0, e1, e2, e3], // end cap
        [s0, s1, e1, e0], // bottom
        [s3, e3, e2, s2], // top
        [s1, s2, e2, e1], // +p side
        [s0, e0, e3, s3], // -p side
    ];

    // Split every quad on its (v0, v2) diagonal.
    let lateral = quads
        .iter()
        .flat_map(|&[a, b, c, d]| [Face::triangle(a, b, c, kind), Face::triangle(a, c, d, kind)])
        .collect();

    MeshSegment {
        lateral,
        caps: Vec::new(),
    }
}

/// Tessellate a whole conduit polyline.
///
/// `elevations` holds one elevation per vertex. Zero-length segments are
/// skipped; circular caps go on the first and last segments that produce
/// faces.
pub fn tessellate_conduit(line: &[Point2], elevations: &[f64], section: &CrossSection) -> Vec<Face> {
    let centers: Vec<Point3> = line
        .iter()
        .zip(elevations)
        .map(|(p, &z)| Point3::new(p.x, p.y, z))
        .collect();

    let live: Vec<usize> = (0..centers.len().saturating_sub(1))
        .filter(|&i| (line[i + 1] - line[i]).norm() > f64::EPSILON)
        .collect();
    let (Some(&first), Some(&last)) = (live.first(), live.last()) else {
        return Vec::new();
    };

    live.iter()
        .flat_map(|&i| {
            let caps = EndCaps {
                start: i == first,
                end: i == last,
            };
            tessellate_segment(centers[i], centers[i + 1], section, caps).into_faces()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const N: usize = CIRCLE_SEGMENTS;

    fn pipe(radius: f64) -> CrossSection {
        CrossSection::Circular { radius }
    }

    fn duct() -> CrossSection {
        CrossSection::Rectangular {
            half_width: 0.5,
            half_height: 0.25,
        }
    }

    fn normal(face: &Face) -> Vector3<f64> {
        let v = face.vertices();
        (v[1] - v[0]).cross(&(v[2] - v[0]))
    }

    #[test]
    fn test_circular_segment_face_counts() {
        let start = Point3::new(0.0, 0.0, 0.0);
        let end = Point3::new(10.0, 0.0, -1.0);

        let open = tessellate_segment(start, end, &pipe(0.5), EndCaps::default());
        assert_eq!(open.lateral.len(), N);
        assert!(open.caps.is_empty());

        let capped = tessellate_segment(
            start,
            end,
            &pipe(0.5),
            EndCaps {
                start: true,
                end: true,
            },
        );
        assert_eq!(capped.caps.len(), 2 * (N - 2));
        assert!(capped.caps.iter().all(|f| f.vertices().len() == 3));
        assert!(capped.lateral.iter().all(|f| f.vertices().len() == 4));
    }

    #[test]
    fn test_circular_ring_uses_vertical_axis() {
        // Segment along +x: p = (0, 1, 0).
        let start = Point3::new(0.0, 0.0, 10.0);
        let end = Point3::new(4.0, 0.0, 9.0);
        let seg = tessellate_segment(start, end, &pipe(1.0), EndCaps::default());

        let first = &seg.lateral[0];
        assert_relative_eq!(first.vertices()[0].y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(first.vertices()[0].z, 10.0, epsilon = 1e-12);
        assert_relative_eq!(first.vertices()[0].x, 0.0, epsilon = 1e-12);

        // j = 4 is a quarter turn: straight up from the centre.
        let quarter = &seg.lateral[4];
        assert_relative_eq!(quarter.vertices()[0].y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(quarter.vertices()[0].z, 11.0, epsilon = 1e-12);
        // End ring is centred on the end elevation.
        assert_relative_eq!(quarter.vertices()[3].z, 10.0, epsilon = 1e-12);
        assert_relative_eq!(quarter.vertices()[3].x, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_lateral_faces_point_outward() {
        let seg = tessellate_segment(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(5.0, 0.0, 0.0),
            &pipe(1.0),
            EndCaps::default(),
        );
        for face in &seg.lateral {
            let centroid = face.vertices().iter().fold(Vector3::<f64>::zeros(), |acc, v| acc + v.coords) / 4.0;
            let radial = Vector3::new(0.0, centroid.y, centroid.z);
            assert!(normal(face).dot(&radial) > 0.0);
        }
    }

    #[test]
    fn test_caps_face_away_from_pipe() {
        let seg = tessellate_segment(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(5.0, 0.0, 0.0),
            &pipe(1.0),
            EndCaps {
                start: true,
                end: true,
            },
        );
        let (start_caps, end_caps) = seg.caps.split_at(N - 2);
        assert!(start_caps.iter().all(|f| normal(f).x < 0.0));
        assert!(end_caps.iter().all(|f| normal(f).x > 0.0));
    }

    #[test]
    fn test_box_segment_is_twelve_triangles() {
        let seg = tessellate_segment(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 3.0, 0.0),
            &duct(),
            EndCaps::default(),
        );
        assert_eq!(seg.len(), 12);
        assert!(seg.lateral.iter().all(|f| f.vertices().len() == 3));
        assert!(seg.lateral.iter().all(|f| f.kind == SectionKind::Rectangular));

        // Segment along +y: p = (-1, 0, 0); corners span x = +-0.5, z = +-0.25.
        let xs: Vec<f64> = seg.lateral.iter().flat_map(|f| f.vertices().iter().map(|v| v.x)).collect();
        let zs: Vec<f64> = seg.lateral.iter().flat_map(|f| f.vertices().iter().map(|v| v.z)).collect();
        assert_relative_eq!(xs.iter().cloned().fold(f64::MIN, f64::max), 0.5);
        assert_relative_eq!(zs.iter().cloned().fold(f64::MAX, f64::min), -0.25);
    }

    #[test]
    fn test_box_faces_point_outward() {
        let seg = tessellate_segment(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
            &duct(),
            EndCaps::default(),
        );
        let center = Vector3::new(2.0, 0.0, 0.0);
        for face in &seg.lateral {
            let centroid = face.vertices().iter().fold(Vector3::<f64>::zeros(), |acc, v| acc + v.coords) / 3.0;
            assert!(normal(face).dot(&(centroid - center)) > 0.0);
        }
    }

    #[test]
    fn test_zero_length_segment_is_skipped() {
        let p = Point3::new(1.0, 1.0, 0.0);
        let q = Point3::new(1.0, 1.0, 5.0);
        assert!(tessellate_segment(p, q, &pipe(0.3), EndCaps::default()).is_empty());
        assert!(tessellate_segment(p, q, &duct(), EndCaps::default()).is_empty());
    }

    #[test]
    fn test_conduit_caps_only_at_ends() {
        let line = vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
        ];
        let z = vec![5.0, 4.0, 4.0, 3.0];
        let faces = tessellate_conduit(&line, &z, &pipe(0.2));
        // Two live segments, lateral quads plus one fan at each end.
        assert_eq!(faces.len(), 2 * N + 2 * (N - 2));
        assert_eq!(faces.iter().filter(|f| f.vertices().len() == 3).count(), 2 * (N - 2));
    }

    #[test]
    fn test_rectangular_conduit_face_count() {
        let line = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 1.0),
        ];
        let faces = tessellate_conduit(&line, &[0.0, 0.0, 0.0], &duct());
        assert_eq!(faces.len(), 24);
    }

    #[test]
    fn test_degenerate_conduit_has_no_faces() {
        let line = vec![Point2::new(0.0, 0.0), Point2::new(0.0, 0.0)];
        assert!(tessellate_conduit(&line, &[0.0, 0.0], &pipe(0.2)).is_empty());
    }

    #[test]
    fn test_cross_section_from_section() {
        let round = CrossSection::from_section(&Section::classify(300.0, Some(300.0)));
        match round {
            CrossSection::Circular { radius } => assert_relative_eq!(radius, 0.15),
            other => panic!("unexpected section {:?}", other),
        }

        let square = CrossSection::from_section(&Section::classify(400.0, None));
        match square {
            CrossSection::Rectangular {
                half_width,
                half_height,
            } => {
                assert_relative_eq!(half_width, 0.2);
                assert_relative_eq!(half_height, 0.2);
            }
            other => panic!("unexpected section {:?}", other),
        }
    }

    #[test]
    fn test_face_to_dxf_keeps_layer() {
        let seg = tessellate_segment(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            &duct(),
            EndCaps::default(),
        );
        let dxf = seg.lateral[0].to_dxf();
        assert_eq!(dxf.layer, "CONDUIT_RECTANGULAR");
        assert_eq!(dxf.color, 5);
        assert_eq!(dxf.corners()[3], dxf.corners()[2]);
    }

    #[test]
    fn test_face_arity_survives_dxf_conversion() {
        let seg = tessellate_segment(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            &pipe(0.3),
            EndCaps {
                start: true,
                end: false,
            },
        );

        let quad = &seg.lateral[0];
        assert!(matches!(quad.corners(), FaceVertices::Quad(_)));
        let dxf = quad.to_dxf();
        assert_eq!(dxf.points().len(), 4);
        assert_eq!(dxf.corners()[3].x, quad.vertices()[3].x);

        let tri = &seg.caps[0];
        assert!(matches!(tri.corners(), FaceVertices::Triangle(_)));
        let dxf = tri.to_dxf();
        assert_eq!(dxf.points().len(), 3);
        assert_eq!(dxf.layer, "CONDUIT_CIRCULAR");
    }
}
