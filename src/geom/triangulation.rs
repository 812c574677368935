//! Ear-clipping triangulation for simple planar polygons.
//!
//! Airfoil sections are concave near the trailing edge on cambered profiles,
//! so cap faces are triangulated by clipping ears rather than by a Delaunay
//! pass over the vertex cloud. Output indices refer to the input polygon and
//! follow its orientation.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TriangulationError {
    #[error("polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),
    #[error("polygon has non-finite coordinates")]
    NonFinite,
    #[error("polygon has zero area")]
    ZeroArea,
    #[error("no ear found with {remaining} vertices remaining; polygon is likely self-intersecting")]
    NoEarFound { remaining: usize },
}

/// Twice the signed area of a polygon (positive for counter-clockwise).
#[must_use]
pub fn signed_area2(polygon: &[[f64; 2]]) -> f64 {
    let n = polygon.len();
    (0..n)
        .map(|i| {
            let a = polygon[i];
            let b = polygon[(i + 1) % n];
            a[0] * b[1] - b[0] * a[1]
        })
        .sum()
}

fn cross(o: [f64; 2], a: [f64; 2], b: [f64; 2]) -> f64 {
    (a[0] - o[0]) * (b[1] - o[1]) - (a[1] - o[1]) * (b[0] - o[0])
}

fn point_in_triangle(p: [f64; 2], a: [f64; 2], b: [f64; 2], c: [f64; 2], eps: f64) -> bool {
    // Triangle is counter-clockwise here; boundary points count as inside.
    cross(a, b, p) >= -eps && cross(b, c, p) >= -eps && cross(c, a, p) >= -eps
}

/// Triangulate a simple polygon given as an open loop (first point not repeated).
///
/// Triangles are returned with the same winding as the input polygon.
pub fn triangulate_polygon(polygon: &[[f64; 2]]) -> Result<Vec<[usize; 3]>, TriangulationError> {
    let n = polygon.len();
    if n < 3 {
        return Err(TriangulationError::TooFewVertices(n));
    }
    if polygon.iter().any(|p| !p[0].is_finite() || !p[1].is_finite()) {
        return Err(TriangulationError::NonFinite);
    }

    let area2 = signed_area2(polygon);
    if area2.abs() <= f64::EPSILON {
        return Err(TriangulationError::ZeroArea);
    }
    let ccw = area2 > 0.0;

    // Work on a counter-clockwise index ring.
    let mut ring: Vec<usize> = if ccw { (0..n).collect() } else { (0..n).rev().collect() };

    let scale = polygon
        .iter()
        .flat_map(|p| [p[0].abs(), p[1].abs()])
        .fold(0.0_f64, f64::max)
        .max(1.0);
    let eps = 1e-14 * scale * scale;

    let mut triangles = Vec::with_capacity(n - 2);
    let mut guard = 0usize;

    while ring.len() > 3 {
        let m = ring.len();
        let mut clipped = false;

        for i in 0..m {
            let ip = ring[(i + m - 1) % m];
            let ic = ring[i];
            let inx = ring[(i + 1) % m];
            let (a, b, c) = (polygon[ip], polygon[ic], polygon[inx]);

            let turn = cross(a, b, c);
            if turn.abs() <= eps {
                // Collinear vertex: drop it without emitting a sliver.
                ring.remove(i);
                clipped = true;
                break;
            }
            if turn < 0.0 {
                continue;
            }

            let blocked = ring.iter().any(|&j| {
                j != ip
                    && j != ic
                    && j != inx
                    && polygon[j] != a
                    && polygon[j] != b
                    && polygon[j] != c
                    && point_in_triangle(polygon[j], a, b, c, eps)
            });
            if blocked {
                continue;
            }

            triangles.push([ip, ic, inx]);
            ring.remove(i);
            clipped = true;
            break;
        }

        if !clipped {
            return Err(TriangulationError::NoEarFound { remaining: ring.len() });
        }
        guard += 1;
        if guard > n * n {
            return Err(TriangulationError::NoEarFound { remaining: ring.len() });
        }
    }

    if cross(polygon[ring[0]], polygon[ring[1]], polygon[ring[2]]).abs() > eps {
        triangles.push([ring[0], ring[1], ring[2]]);
    }

    if !ccw {
        for tri in &mut triangles {
            tri.swap(1, 2);
        }
    }

    Ok(triangles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri_area2(poly: &[[f64; 2]], t: [usize; 3]) -> f64 {
        cross(poly[t[0]], poly[t[1]], poly[t[2]])
    }

    #[test]
    fn test_square_gives_two_triangles() {
        let square = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let tris = triangulate_polygon(&square).unwrap();
        assert_eq!(tris.len(), 2);
        let total: f64 = tris.iter().map(|&t| tri_area2(&square, t)).sum();
        assert!((total - signed_area2(&square)).abs() < 1e-12);
    }

    #[test]
    fn test_clockwise_input_keeps_clockwise_triangles() {
        let square = [[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]];
        let tris = triangulate_polygon(&square).unwrap();
        assert!(tris.iter().all(|&t| tri_area2(&square, t) < 0.0));
    }

    #[test]
    fn test_concave_polygon_area_is_preserved() {
        // Arrow shape with a reflex vertex at (1, 1).
        let poly = [[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [1.0, 1.0], [0.0, 2.0]];
        let tris = triangulate_polygon(&poly).unwrap();
        assert_eq!(tris.len(), 3);
        let total: f64 = tris.iter().map(|&t| tri_area2(&poly, t)).sum();
        assert!((total - signed_area2(&poly)).abs() < 1e-12);
        assert!(tris.iter().all(|&t| tri_area2(&poly, t) > 0.0));
    }

    #[test]
    fn test_degenerate_inputs_are_rejected() {
        assert_eq!(
            triangulate_polygon(&[[0.0, 0.0], [1.0, 0.0]]),
            Err(TriangulationError::TooFewVertices(2))
        );
        assert_eq!(
            triangulate_polygon(&[[0.0, 0.0], [1.0, 0.0], [2.0, 0.0]]),
            Err(TriangulationError::ZeroArea)
        );
    }
}
