use crate::geom::{GeomContext, GeomMesh, LoftOptions, Point3, loft_mesh_with_context};

fn prism_profile(z: f64) -> Vec<Point3> {
    vec![
        Point3::new(0.0, 0.0, z),
        Point3::new(2.0, 0.0, z),
        Point3::new(0.0, 1.0, z),
        Point3::new(0.0, 0.0, z),
    ]
}

#[test]
fn lofted_prism_has_finite_vertices_and_valid_indices() {
    let p0 = prism_profile(0.0);
    let p1 = prism_profile(3.0);
    let profiles: Vec<&[Point3]> = vec![&p0, &p1];
    let mut ctx = GeomContext::new();
    let (mesh, diag, _) = loft_mesh_with_context(&profiles, LoftOptions::capped(), &mut ctx).unwrap();

    mesh.validate().expect("mesh validate");
    assert_eq!(diag.vertex_count, mesh.positions.len());
    assert_eq!(diag.triangle_count, mesh.indices.len() / 3);
    assert_eq!(diag.welded_vertex_count, 0);
    assert_eq!(diag.open_edge_count, 0);
    assert_eq!(diag.non_manifold_edge_count, 0);

    // Triangle area 1, height 3.
    assert!((mesh.volume() - 3.0).abs() < 1e-9);
    assert!((diag.enclosed_volume.unwrap() - 3.0).abs() < 1e-9);

    let normals = mesh.normals.as_ref().unwrap();
    assert_eq!(normals.len(), mesh.positions.len());
    for n in normals {
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        assert!((len - 1.0).abs() < 1e-9);
    }

    let bbox = mesh.bbox().unwrap();
    assert_eq!(bbox.min, Point3::new(0.0, 0.0, 0.0));
    assert_eq!(bbox.max, Point3::new(2.0, 1.0, 3.0));
}

#[test]
fn geom_mesh_validate_rejects_bad_buffers() {
    let mesh = GeomMesh::new(vec![[0.0, 0.0, 0.0]], vec![0]);
    assert!(mesh.validate().is_err());

    let mesh = GeomMesh::new(vec![[0.0, 0.0, 0.0]], vec![0, 1, 0]);
    assert!(mesh.validate().is_err());

    let mut mesh = GeomMesh::new(vec![[0.0, 0.0, 0.0]], vec![]);
    mesh.normals = Some(vec![]);
    assert!(mesh.validate().is_err());
}
