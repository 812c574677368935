use crate::geom::mesh::{count_edge_topology, fix_triangle_winding_consistency, weld_mesh_vertices};
use crate::geom::{Point3, Tolerance, signed_area2, triangulate_polygon};

#[test]
fn triangulate_polygon_covers_concave_notch() {
    // U-shaped outline, clockwise.
    let poly = [
        [0.0, 0.0],
        [0.0, 3.0],
        [1.0, 3.0],
        [1.0, 1.0],
        [2.0, 1.0],
        [2.0, 3.0],
        [3.0, 3.0],
        [3.0, 0.0],
    ];
    let tris = triangulate_polygon(&poly).unwrap();
    assert_eq!(tris.len(), poly.len() - 2);

    let total: f64 = tris
        .iter()
        .map(|t| signed_area2(&[poly[t[0]], poly[t[1]], poly[t[2]]]))
        .sum();
    assert!((total - signed_area2(&poly)).abs() < 1e-12);
    assert!(signed_area2(&poly) < 0.0);

    // No triangle may cover the notch centre.
    let notch = [1.5, 2.0];
    for t in &tris {
        let (a, b, c) = (poly[t[0]], poly[t[1]], poly[t[2]]);
        let s1 = signed_area2(&[a, b, notch]);
        let s2 = signed_area2(&[b, c, notch]);
        let s3 = signed_area2(&[c, a, notch]);
        let inside = (s1 < 0.0 && s2 < 0.0 && s3 < 0.0) || (s1 > 0.0 && s2 > 0.0 && s3 > 0.0);
        assert!(!inside, "triangle {t:?} covers the notch");
    }
}

#[test]
fn thin_lens_triangulates_with_consistent_winding() {
    // Cambered lens, upper surface then lower surface back to the nose.
    let n = 40;
    let mut poly = Vec::new();
    for i in 0..=n {
        let x = i as f64 / n as f64;
        poly.push([x, 0.02 + 0.06 * (x * (1.0 - x)).sqrt()]);
    }
    for i in (1..n).rev() {
        let x = i as f64 / n as f64;
        poly.push([x, 0.02 - 0.03 * (x * (1.0 - x)).sqrt()]);
    }

    let tris = triangulate_polygon(&poly).unwrap();
    assert_eq!(tris.len(), poly.len() - 2);

    let sign = signed_area2(&poly).signum();
    for t in &tris {
        let area = signed_area2(&[poly[t[0]], poly[t[1]], poly[t[2]]]);
        assert_eq!(area.signum(), sign);
    }
}

#[test]
fn weld_then_winding_fix_closes_split_tetrahedron() {
    // Each face carries its own copy of the vertices.
    let corners = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
    ];
    let faces = [[0usize, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];

    let mut points = Vec::new();
    let mut indices = Vec::new();
    for face in faces {
        for corner in face {
            indices.push(points.len() as u32);
            points.push(corners[corner]);
        }
    }

    let (welded, mut indices, merged) = weld_mesh_vertices(points, indices, Tolerance::default_geom());
    assert_eq!(welded.len(), 4);
    assert_eq!(merged, 8);

    fix_triangle_winding_consistency(&mut indices);
    let (open, non_manifold) = count_edge_topology(&indices);
    assert_eq!(open, 0);
    assert_eq!(non_manifold, 0);

    // Every edge is now traversed once in each direction.
    let mut directed = std::collections::HashSet::new();
    for tri in indices.chunks_exact(3) {
        for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
            assert!(directed.insert((a, b)), "edge {a}->{b} repeated");
        }
    }
}
