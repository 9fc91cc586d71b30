#![warn(missing_docs)]

//! Minimal DXF R12 writer for 3D face meshes.
//!
//! Emits only what conduit mesh export needs: a header, one LAYER table and a
//! flat list of `3DFACE` entities. The output is plain formatted text, so the
//! same sequence of faces always produces the same bytes.
//!
//! # Example
//!
//! ```no_run
//! use conduit_buffer_dxf::{DxfLayer, DxfMeshDocument, Face3D, Point3D};
//!
//! let mut doc = DxfMeshDocument::new();
//! doc.add_layer(DxfLayer::new("PIPES", 1));
//! doc.add_face(Face3D::triangle(
//!     [
//!         Point3D::new(0.0, 0.0, 0.0),
//!         Point3D::new(1.0, 0.0, 0.0),
//!         Point3D::new(0.0, 1.0, 0.0),
//!     ],
//!     "PIPES",
//!     1,
//! ));
//! doc.export("pipes.dxf").unwrap();
//! ```

use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// A 3D point for DXF export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point3D {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
}

impl Point3D {
    /// Create a new 3D point.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// An entry of the LAYER table.
#[derive(Debug, Clone, PartialEq)]
pub struct DxfLayer {
    /// Layer name.
    pub name: String,
    /// ACI color number.
    pub color: i16,
}

impl DxfLayer {
    /// Create a layer definition.
    pub fn new(name: impl Into<String>, color: i16) -> Self {
        Self {
            name: name.into(),
            color,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Corners {
    Triangle([Point3D; 3]),
    Quad([Point3D; 4]),
}

/// A planar face with three or four corners.
#[derive(Debug, Clone, PartialEq)]
pub struct Face3D {
    corners: Corners,
    /// Layer the face is drawn on.
    pub layer: String,
    /// ACI color number.
    pub color: i16,
}

impl Face3D {
    /// Create a triangular face.
    pub fn triangle(points: [Point3D; 3], layer: impl Into<String>, color: i16) -> Self {
        Self {
            corners: Corners::Triangle(points),
            layer: layer.into(),
            color,
        }
    }

    /// Create a quadrilateral face.
    pub fn quad(points: [Point3D; 4], layer: impl Into<String>, color: i16) -> Self {
        Self {
            corners: Corners::Quad(points),
            layer: layer.into(),
            color,
        }
    }

    /// Create a face from a point list, or `None` unless it has 3 or 4 points.
    pub fn from_points(points: Vec<Point3D>, layer: impl Into<String>, color: i16) -> Option<Self> {
        match points.as_slice() {
            &[a, b, c] => Some(Self::triangle([a, b, c], layer, color)),
            &[a, b, c, d] => Some(Self::quad([a, b, c, d], layer, color)),
            _ => None,
        }
    }

    /// The face corners as given.
    pub fn points(&self) -> &[Point3D] {
        match &self.corners {
            Corners::Triangle(p) => p,
            Corners::Quad(p) => p,
        }
    }

    /// The four corners written to the file.
    ///
    /// Triangles repeat their last corner in the fourth slot.
    pub fn corners(&self) -> [Point3D; 4] {
        match self.corners {
            Corners::Triangle([a, b, c]) => [a, b, c, c],
            Corners::Quad(p) => p,
        }
    }
}

/// DXF document builder for 3D face meshes.
///
/// Accumulates layers and faces, then writes them in insertion order.
#[derive(Debug, Clone, Default)]
pub struct DxfMeshDocument {
    layers: Vec<DxfLayer>,
    faces: Vec<Face3D>,
}

impl DxfMeshDocument {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a layer table entry.
    pub fn add_layer(&mut self, layer: DxfLayer) {
        self.layers.push(layer);
    }

    /// Add a face entity.
    pub fn add_face(&mut self, face: Face3D) {
        self.faces.push(face);
    }

    /// Add many face entities.
    pub fn extend_faces(&mut self, faces: impl IntoIterator<Item = Face3D>) {
        self.faces.extend(faces);
    }

    /// Number of layers in the table.
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Number of face entities.
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Render the whole document into memory.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.export_to_writer(&mut buf);
        buf
    }

    /// Export to a file.
    ///
    /// The document is rendered in memory, written to a sibling `.tmp` file
    /// and renamed over `path`, so readers never observe a half-written file.
    pub fn export(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        let tmp = temp_path(path);
        let bytes = self.to_bytes();

        let written = fs::File::create(&tmp).and_then(|mut file| {
            file.write_all(&bytes)?;
            file.sync_all()
        });
        if let Err(err) = written.and_then(|()| fs::rename(&tmp, path)) {
            let _ = fs::remove_file(&tmp);
            return Err(err);
        }
        Ok(())
    }

    /// Export to a writer.
    pub fn export_to_writer(&self, mut writer: impl Write) -> io::Result<()> {
        self.write_header(&mut writer)?;
        self.write_tables(&mut writer)?;
        self.write_entities(&mut writer)?;

        writeln!(writer, "0")?;
        writeln!(writer, "EOF")?;

        Ok(())
    }

    fn write_header(&self, writer: &mut impl Write) -> io::Result<()> {
        writeln!(writer, "0")?;
        writeln!(writer, "SECTION")?;
        writeln!(writer, "2")?;
        writeln!(writer, "HEADER")?;

        writeln!(writer, "9")?;
        writeln!(writer, "$ACADVER")?;
        writeln!(writer, "1")?;
        writeln!(writer, "AC1009")?; // DXF R12

        // Meters. Advisory only: R12 readers skip this R2000 variable.
        writeln!(writer, "9")?;
        writeln!(writer, "$INSUNITS")?;
        writeln!(writer, "70")?;
        writeln!(writer, "6")?;

        writeln!(writer, "0")?;
        writeln!(writer, "ENDSEC")?;

        Ok(())
    }

    fn write_tables(&self, writer: &mut impl Write) -> io::Result<()> {
        writeln!(writer, "0")?;
        writeln!(writer, "SECTION")?;
        writeln!(writer, "2")?;
        writeln!(writer, "TABLES")?;

        writeln!(writer, "0")?;
        writeln!(writer, "TABLE")?;
        writeln!(writer, "2")?;
        writeln!(writer, "LAYER")?;
        writeln!(writer, "70")?;
        writeln!(writer, "{}", self.layers.len())?;

        for layer in &self.layers {
            writeln!(writer, "0")?;
            writeln!(writer, "LAYER")?;
            writeln!(writer, "2")?;
            writeln!(writer, "{}", layer.name)?;
            writeln!(writer, "70")?;
            writeln!(writer, "0")?;
            writeln!(writer, "62")?;
            writeln!(writer, "{}", layer.color)?;
            writeln!(writer, "6")?;
            writeln!(writer, "CONTINUOUS")?;
        }

        writeln!(writer, "0")?;
        writeln!(writer, "ENDTAB")?;

        writeln!(writer, "0")?;
        writeln!(writer, "ENDSEC")?;

        Ok(())
    }

    fn write_entities(&self, writer: &mut impl Write) -> io::Result<()> {
        writeln!(writer, "0")?;
        writeln!(writer, "SECTION")?;
        writeln!(writer, "2")?;
        writeln!(writer, "ENTITIES")?;

        for face in &self.faces {
            write_face(writer, face)?;
        }

        writeln!(writer, "0")?;
        writeln!(writer, "ENDSEC")?;

        Ok(())
    }
}

fn write_face(writer: &mut impl Write, face: &Face3D) -> io::Result<()> {
    writeln!(writer, "0")?;
    writeln!(writer, "3DFACE")?;
    writeln!(writer, "8")?;
    writeln!(writer, "{}", face.layer)?;
    writeln!(writer, "62")?;
    writeln!(writer, "{}", face.color)?;

    // Corner i uses group codes 1i / 2i / 3i.
    for (i, p) in face.corners().iter().enumerate() {
        writeln!(writer, "1{}", i)?;
        writeln!(writer, "{:.6}", p.x)?;
        writeln!(writer, "2{}", i)?;
        writeln!(writer, "{:.6}", p.y)?;
        writeln!(writer, "3{}", i)?;
        writeln!(writer, "{:.6}", p.z)?;
    }

    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
