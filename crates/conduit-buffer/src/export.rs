//! DXF export of accumulated conduit faces.

use crate::mesh::Face;
use crate::section::SectionKind;
use conduit_buffer_dxf::{DxfLayer, DxfMeshDocument};
use std::io;
use std::path::Path;

/// Build the DXF document for a face sequence, preserving its order.
pub fn mesh_document(faces: &[Face]) -> DxfMeshDocument {
    let mut doc = DxfMeshDocument::new();
    for kind in SectionKind::all() {
        doc.add_layer(DxfLayer::new(kind.layer_name(), kind.color()));
    }
    doc.extend_faces(faces.iter().map(Face::to_dxf));
    doc
}

/// Write faces to `path`, creating the parent folder if needed.
pub fn export_faces(faces: &[Face], path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    mesh_document(faces).export(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{tessellate_conduit, CrossSection};
    use crate::Point2;

    fn faces() -> Vec<Face> {
        let line = vec![Point2::new(0.0, 0.0), Point2::new(2.0, 0.0)];
        let mut faces = tessellate_conduit(&line, &[1.0, 0.5], &CrossSection::Circular { radius: 0.1 });
        faces.extend(tessellate_conduit(
            &line,
            &[0.0, 0.0],
            &CrossSection::Rectangular {
                half_width: 0.2,
                half_height: 0.1,
            },
        ));
        faces
    }

    #[test]
    fn test_document_has_both_layers() {
        let doc = mesh_document(&faces());
        assert_eq!(doc.num_layers(), 2);
        assert_eq!(doc.num_faces(), 16 + 2 * 14 + 12);

        let text = String::from_utf8(doc.to_bytes()).unwrap();
        assert!(text.contains("CONDUIT_CIRCULAR"));
        assert!(text.contains("CONDUIT_RECTANGULAR"));
    }

    #[test]
    fn test_every_entity_has_four_corners() {
        let text = String::from_utf8(mesh_document(&faces()).to_bytes()).unwrap();
        let entities = text.matches("3DFACE").count();
        assert_eq!(text.matches("\n13\n").count(), entities);
        assert_eq!(text.matches("\n33\n").count(), entities);
    }

    #[test]
    fn test_export_creates_folder() {
        let dir = std::env::temp_dir().join("conduit_buffer_export").join("nested");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("conduits_3d.dxf");
        export_faces(&faces(), &path).unwrap();
        assert!(path.exists());
    }
}
