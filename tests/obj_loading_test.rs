use std::path::Path;

use lumen_ngin::{error::AssetError, resources::mesh::parse_obj};

const CUBE: &str = "\
v -0.5 -0.5 0.5
v 0.5 -0.5 0.5
v 0.5 0.5 0.5
v -0.5 0.5 0.5
v -0.5 -0.5 -0.5
v 0.5 -0.5 -0.5
v 0.5 0.5 -0.5
v -0.5 0.5 -0.5
f 1 2 3
f 1 3 4
f 2 6 7
f 2 7 3
f 6 5 8
f 6 8 7
f 5 1 4
f 5 4 8
f 4 3 7
f 4 7 8
f 5 6 2
f 5 2 1
";

#[test]
fn cube_without_attributes_has_thirty_six_indices() {
    let mesh = parse_obj(CUBE, Path::new("cube.obj")).unwrap();
    assert_eq!(mesh.indices.len(), 36);
    assert_eq!(mesh.vertices.len(), 8);
    assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    assert!(mesh.vertices.iter().all(|v| v.normal == [0.0, 0.0, 0.0]));
}

#[test]
fn bundled_cube_is_a_closed_triangle_list() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/models/cube.obj");
    let text = std::fs::read_to_string(&path).expect("the cube ships with the crate");
    let mesh = parse_obj(&text, &path).unwrap();
    assert_eq!(mesh.indices.len(), 36);
    assert!(mesh.vertices.iter().all(|v| {
        let [x, y, z] = v.normal;
        ((x * x + y * y + z * z) - 1.0).abs() < 1e-4
    }));
    assert!(
        mesh.vertices
            .iter()
            .all(|v| (0.0..=1.0).contains(&v.tex_coords[0]) && (0.0..=1.0).contains(&v.tex_coords[1]))
    );
}

#[test]
fn garbage_is_reported_with_its_path() {
    let err = parse_obj("v 1 2 3\nf 1 2 x\n", Path::new("broken.obj")).unwrap_err();
    match err {
        AssetError::Obj { path, .. } | AssetError::EmptyModel { path } => {
            assert_eq!(path, Path::new("broken.obj"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}
