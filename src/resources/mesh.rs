use std::{
    io::{BufReader, Cursor},
    path::Path,
};

use crate::{data_structures::model::ModelVertex, error::AssetError};

/// Decoded geometry, ready to be uploaded.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

/// Parse Wavefront OBJ text into one indexed triangle list.
///
/// Faces are triangulated and every object in the file is merged into the
/// same list. Texture coordinates are flipped vertically (`v' = 1 - v`);
/// missing coordinates and normals are zero. `mtllib` references are ignored.
pub fn parse_obj(text: &str, path: &Path) -> Result<MeshData, AssetError> {
    let mut reader = BufReader::new(Cursor::new(text));
    let (models, _materials) = tobj::load_obj_buf(
        &mut reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |_| Ok(Default::default()),
    )
    .map_err(|source| AssetError::Obj {
        path: path.to_path_buf(),
        source,
    })?;

    let mut mesh = MeshData::default();
    for m in &models {
        let base = mesh.vertices.len() as u32;
        let positions = &m.mesh.positions;
        mesh.vertices.extend((0..positions.len() / 3).map(|i| ModelVertex {
            position: [positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2]],
            tex_coords: [
                m.mesh.texcoords.get(i * 2).map_or(0.0, |f| *f),
                1.0 - m.mesh.texcoords.get(i * 2 + 1).map_or(0.0, |f| *f),
            ],
            normal: [
                m.mesh.normals.get(i * 3).map_or(0.0, |f| *f),
                m.mesh.normals.get(i * 3 + 1).map_or(0.0, |f| *f),
                m.mesh.normals.get(i * 3 + 2).map_or(0.0, |f| *f),
            ],
        }));
        mesh.indices.extend(m.mesh.indices.iter().map(|i| base + i));
    }

    if mesh.indices.is_empty() {
        return Err(AssetError::EmptyModel {
            path: path.to_path_buf(),
        });
    }
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn quads_are_triangulated() {
        let mesh = parse_obj(QUAD, Path::new("quad.obj")).unwrap();
        assert_eq!(mesh.indices.len(), 6);
        assert_eq!(mesh.vertices.len(), 4);
    }

    #[test]
    fn texture_coordinates_are_flipped() {
        let mesh = parse_obj(QUAD, Path::new("quad.obj")).unwrap();
        let first = mesh.vertices.iter().find(|v| v.position == [0.0, 0.0, 0.0]).unwrap();
        assert_eq!(first.tex_coords, [0.0, 1.0]);
        assert_eq!(first.normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn text_without_faces_is_an_empty_model() {
        let err = parse_obj("v 0 0 0\nv 1 0 0\n", Path::new("points.obj")).unwrap_err();
        assert!(matches!(err, AssetError::EmptyModel { .. }));
    }
}
