//! Ruled loft between section polylines.
//!
//! Profiles are connected point-to-point, so every profile must carry the same
//! number of points after duplicate cleaning. Closed profiles (first point
//! repeated at the end, within tolerance) can be capped at either end, which
//! turns a two-profile loft into a closed solid.

use super::diagnostics::GeomMeshDiagnostics;
use super::mesh::{GeomContext, GeomMesh, finalize_mesh};
use super::metrics::TimingBucket;
use super::triangulation::{TriangulationError, triangulate_polygon};
use super::{Point3, Tolerance, Vec3};

// ============================================================================
// Types and Options
// ============================================================================

/// Options controlling loft generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoftOptions {
    /// Cap the first profile. Requires closed profiles.
    pub cap_start: bool,
    /// Cap the last profile. Requires closed profiles.
    pub cap_end: bool,
    /// Reject profiles whose loop crosses itself.
    pub check_self_intersection: bool,
}

impl Default for LoftOptions {
    fn default() -> Self {
        Self {
            cap_start: false,
            cap_end: false,
            check_self_intersection: true,
        }
    }
}

impl LoftOptions {
    /// Options with caps on both ends.
    #[must_use]
    pub fn capped() -> Self {
        Self {
            cap_start: true,
            cap_end: true,
            ..Default::default()
        }
    }
}

/// Loft-specific diagnostics reported next to the mesh diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoftDiagnostics {
    /// Number of profiles lofted.
    pub profile_count: usize,
    /// Points per profile after cleaning.
    pub points_per_profile: usize,
    /// Whether the profiles were detected as closed loops.
    pub profiles_closed: bool,
    /// Consecutive duplicates and closing points removed during cleaning.
    pub removed_duplicate_points: usize,
    /// Triangles emitted for start and end caps.
    pub cap_triangle_count: usize,
}

/// Errors raised while validating profiles or building the loft.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum LoftError {
    #[error("loft requires at least 2 profiles, got {count}")]
    NotEnoughProfiles { count: usize },
    #[error("profile {index} has fewer than 2 points (has {point_count})")]
    ProfileTooShort { index: usize, point_count: usize },
    #[error("profile {index} contains non-finite coordinates at point {point_index}")]
    NonFinitePoint { index: usize, point_index: usize },
    #[error("profile {index} has {found} points, expected {expected}")]
    PointCountMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error(
        "profiles have mixed closed/open states: profile {first_closed_idx} is closed, profile {first_open_idx} is open"
    )]
    MixedClosedOpen {
        first_closed_idx: usize,
        first_open_idx: usize,
    },
    #[error("caps require closed profiles but profile {index} is open")]
    OpenProfile { index: usize },
    #[error("profile {index} intersects itself between segments {first_segment} and {second_segment}")]
    SelfIntersectingProfile {
        index: usize,
        first_segment: usize,
        second_segment: usize,
    },
    #[error("cap triangulation failed for profile {index}: {source}")]
    CapTriangulation {
        index: usize,
        #[source]
        source: TriangulationError,
    },
    #[error("degenerate profile {index} (too few distinct points or no supporting plane)")]
    DegenerateProfile { index: usize },
}

// ============================================================================
// Public API
// ============================================================================

/// Loft a ruled surface through `profiles` with the default tolerance.
///
/// ```ignore
/// use wingloft::geom::{Point3, loft_mesh, LoftOptions};
///
/// let root = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 0.0, 0.0),
/// ];
/// let tip: Vec<Point3> = root.iter().map(|p| Point3::new(p.x, p.y, 5.0)).collect();
/// let profiles: Vec<&[Point3]> = vec![&root, &tip];
/// let (mesh, diag, _) = loft_mesh(&profiles, LoftOptions::capped())?;
/// assert!(diag.is_valid_solid());
/// ```
pub fn loft_mesh(
    profiles: &[&[Point3]],
    options: LoftOptions,
) -> Result<(GeomMesh, GeomMeshDiagnostics, LoftDiagnostics), LoftError> {
    let mut ctx = GeomContext::new();
    loft_mesh_with_context(profiles, options, &mut ctx)
}

/// Loft with an explicit context for tolerance and timing.
///
/// Timing lands in `GeomMeshDiagnostics::timing` when the
/// `mesh_engine_metrics` feature is enabled.
pub fn loft_mesh_with_context(
    profiles: &[&[Point3]],
    options: LoftOptions,
    ctx: &mut GeomContext,
) -> Result<(GeomMesh, GeomMeshDiagnostics, LoftDiagnostics), LoftError> {
    let tol = ctx.tolerance;

    if profiles.len() < 2 {
        return Err(LoftError::NotEnoughProfiles { count: profiles.len() });
    }

    let cleaned = validate_and_clean_profiles(profiles, tol)?;

    let first_closed_idx = cleaned.iter().position(|p| p.closed);
    let first_open_idx = cleaned.iter().position(|p| !p.closed);
    let wants_caps = options.cap_start || options.cap_end;

    match (first_closed_idx, first_open_idx) {
        (Some(_), Some(open_idx)) if wants_caps => {
            return Err(LoftError::OpenProfile { index: open_idx });
        }
        (Some(first_closed_idx), Some(first_open_idx)) => {
            return Err(LoftError::MixedClosedOpen {
                first_closed_idx,
                first_open_idx,
            });
        }
        (None, Some(_)) if wants_caps => return Err(LoftError::OpenProfile { index: 0 }),
        _ => {}
    }
    let profiles_closed = first_open_idx.is_none();

    let expected = cleaned[0].points.len();
    if let Some((index, profile)) = cleaned
        .iter()
        .enumerate()
        .find(|(_, p)| p.points.len() != expected)
    {
        return Err(LoftError::PointCountMismatch {
            index,
            expected,
            found: profile.points.len(),
        });
    }

    if profiles_closed && options.check_self_intersection {
        for (index, profile) in cleaned.iter().enumerate() {
            check_self_intersection(index, &profile.points)?;
        }
    }

    let mut loft_diag = LoftDiagnostics {
        profile_count: cleaned.len(),
        points_per_profile: expected,
        profiles_closed,
        removed_duplicate_points: cleaned.iter().map(|p| p.removed).sum(),
        cap_triangle_count: 0,
    };

    let rows: Vec<&[Point3]> = cleaned.iter().map(|p| p.points.as_slice()).collect();
    let (vertices, mut indices) = ctx
        .metrics
        .time(TimingBucket::Loft, || build_loft_mesh(&rows, profiles_closed));

    if wants_caps {
        let side_len = indices.len();
        ctx.metrics.time(TimingBucket::Triangulation, || -> Result<(), LoftError> {
            let last = rows.len() - 1;
            if options.cap_start {
                add_profile_cap(&mut indices, rows[0], 0, 0, true)?;
            }
            if options.cap_end {
                add_profile_cap(&mut indices, rows[last], last, last * expected, false)?;
            }
            Ok(())
        })?;
        loft_diag.cap_triangle_count = (indices.len() - side_len) / 3;
    }

    let (mesh, mut mesh_diag) = finalize_mesh(vertices, indices, tol, &mut ctx.metrics);
    mesh_diag.timing = ctx.metrics.end();

    log::debug!(
        "loft: {} profiles x {} points, {}",
        loft_diag.profile_count,
        loft_diag.points_per_profile,
        mesh_diag.summary()
    );

    Ok((mesh, mesh_diag, loft_diag))
}

// ============================================================================
// Internal Helpers
// ============================================================================

struct CleanedProfile {
    points: Vec<Point3>,
    closed: bool,
    removed: usize,
}

fn validate_and_clean_profiles(
    profiles: &[&[Point3]],
    tol: Tolerance,
) -> Result<Vec<CleanedProfile>, LoftError> {
    let mut result = Vec::with_capacity(profiles.len());

    for (index, profile) in profiles.iter().enumerate() {
        if profile.len() < 2 {
            return Err(LoftError::ProfileTooShort {
                index,
                point_count: profile.len(),
            });
        }

        if let Some(point_index) = profile.iter().position(|pt| !pt.is_finite()) {
            return Err(LoftError::NonFinitePoint { index, point_index });
        }

        let mut cleaned: Vec<Point3> = Vec::with_capacity(profile.len());
        for pt in profile.iter().copied() {
            match cleaned.last() {
                Some(&last) if tol.approx_eq_point3(last, pt) => {}
                _ => cleaned.push(pt),
            }
        }

        let closed = cleaned.len() >= 3
            && tol.approx_eq_point3(cleaned[0], cleaned[cleaned.len() - 1]);
        if closed {
            cleaned.pop();
        }

        if cleaned.len() < 2 || (closed && cleaned.len() < 3) {
            return Err(LoftError::DegenerateProfile { index });
        }

        let removed = profile.len() - cleaned.len();
        result.push(CleanedProfile {
            points: cleaned,
            closed,
            removed,
        });
    }

    Ok(result)
}

fn build_loft_mesh(profiles: &[&[Point3]], profiles_closed: bool) -> (Vec<Point3>, Vec<u32>) {
    let num_profiles = profiles.len();
    let points_per_profile = profiles.first().map_or(0, |p| p.len());

    let vertices: Vec<Point3> = profiles.iter().flat_map(|p| p.iter().copied()).collect();

    let edge_count = if profiles_closed {
        points_per_profile
    } else {
        points_per_profile - 1
    };

    let mut indices = Vec::with_capacity((num_profiles - 1) * edge_count * 6);
    for row in 0..num_profiles - 1 {
        let next_row = row + 1;
        for col in 0..edge_count {
            let next_col = (col + 1) % points_per_profile;

            let i0 = (row * points_per_profile + col) as u32;
            let i1 = (row * points_per_profile + next_col) as u32;
            let i2 = (next_row * points_per_profile + next_col) as u32;
            let i3 = (next_row * points_per_profile + col) as u32;

            indices.extend_from_slice(&[i0, i1, i2]);
            indices.extend_from_slice(&[i0, i2, i3]);
        }
    }

    (vertices, indices)
}

/// Triangulate a closed profile in its own plane and append the triangles,
/// reusing the profile's loft vertices starting at `base`.
fn add_profile_cap(
    indices: &mut Vec<u32>,
    profile: &[Point3],
    index: usize,
    base: usize,
    flip_winding: bool,
) -> Result<(), LoftError> {
    let polygon = project_to_profile_plane(profile).ok_or(LoftError::DegenerateProfile { index })?;
    let triangles =
        triangulate_polygon(&polygon).map_err(|source| LoftError::CapTriangulation { index, source })?;

    let base = base as u32;
    for [a, b, c] in triangles {
        let (a, b, c) = (base + a as u32, base + b as u32, base + c as u32);
        if flip_winding {
            indices.extend_from_slice(&[a, c, b]);
        } else {
            indices.extend_from_slice(&[a, b, c]);
        }
    }
    Ok(())
}

/// Plane through the profile centroid with a Newell normal: `(origin, normal, x, y)`.
fn compute_profile_plane(profile: &[Point3]) -> Option<(Point3, Vec3, Vec3, Vec3)> {
    if profile.len() < 3 {
        return None;
    }

    let n = profile.len() as f64;
    let origin = profile.iter().fold(Point3::ORIGIN, |acc, p| {
        Point3::new(acc.x + p.x / n, acc.y + p.y / n, acc.z + p.z / n)
    });

    let mut normal = Vec3::ZERO;
    for (i, curr) in profile.iter().enumerate() {
        let next = profile[(i + 1) % profile.len()];
        normal = normal
            + Vec3::new(
                (curr.y - next.y) * (curr.z + next.z),
                (curr.z - next.z) * (curr.x + next.x),
                (curr.x - next.x) * (curr.y + next.y),
            );
    }
    let normal = normal.normalized()?;

    let arbitrary = if normal.x.abs() < 0.9 {
        Vec3::new(1.0, 0.0, 0.0)
    } else {
        Vec3::new(0.0, 1.0, 0.0)
    };
    let plane_x = normal.cross(arbitrary).normalized()?;
    let plane_y = normal.cross(plane_x);

    Some((origin, normal, plane_x, plane_y))
}

fn project_to_profile_plane(profile: &[Point3]) -> Option<Vec<[f64; 2]>> {
    let (origin, _, plane_x, plane_y) = compute_profile_plane(profile)?;
    Some(
        profile
            .iter()
            .map(|p| {
                let v = p.sub_point(origin);
                [v.dot(plane_x), v.dot(plane_y)]
            })
            .collect(),
    )
}

fn orient(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

fn segments_cross(a: [f64; 2], b: [f64; 2], c: [f64; 2], d: [f64; 2]) -> bool {
    let d1 = orient(c, d, a);
    let d2 = orient(c, d, b);
    let d3 = orient(a, b, c);
    let d4 = orient(a, b, d);
    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0)) && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}

/// Pairwise test of non-adjacent loop segments in the profile plane.
fn check_self_intersection(index: usize, profile: &[Point3]) -> Result<(), LoftError> {
    let polygon = project_to_profile_plane(profile).ok_or(LoftError::DegenerateProfile { index })?;
    let n = polygon.len();

    for i in 0..n {
        let (a, b) = (polygon[i], polygon[(i + 1) % n]);
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            let (c, d) = (polygon[j], polygon[(j + 1) % n]);
            if segments_cross(a, b, c, d) {
                return Err(LoftError::SelfIntersectingProfile {
                    index,
                    first_segment: i,
                    second_segment: j,
                });
            }
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_profile(cz: f64, w: f64, h: f64) -> Vec<Point3> {
        vec![
            Point3::new(-w / 2.0, -h / 2.0, cz),
            Point3::new(w / 2.0, -h / 2.0, cz),
            Point3::new(w / 2.0, h / 2.0, cz),
            Point3::new(-w / 2.0, h / 2.0, cz),
            Point3::new(-w / 2.0, -h / 2.0, cz),
        ]
    }

    #[test]
    fn test_capped_box_is_closed_solid() {
        let p0 = rect_profile(0.0, 2.0, 1.0);
        let p1 = rect_profile(5.0, 2.0, 1.0);
        let profiles: Vec<&[Point3]> = vec![&p0, &p1];

        let (mesh, diag, loft_diag) = loft_mesh(&profiles, LoftOptions::capped()).unwrap();

        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(loft_diag.cap_triangle_count, 4);
        assert_eq!(loft_diag.removed_duplicate_points, 2);
        assert!(loft_diag.profiles_closed);
        assert!(diag.is_valid_solid());
        assert!((mesh.volume() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_uncapped_loft_has_open_rims() {
        let p0 = rect_profile(0.0, 1.0, 1.0);
        let p1 = rect_profile(1.0, 1.0, 1.0);
        let profiles: Vec<&[Point3]> = vec![&p0, &p1];

        let (_, diag, _) = loft_mesh(&profiles, LoftOptions::default()).unwrap();
        assert_eq!(diag.open_edge_count, 8);
    }

    #[test]
    fn test_point_count_mismatch_is_rejected() {
        let p0 = rect_profile(0.0, 1.0, 1.0);
        let mut p1 = rect_profile(1.0, 1.0, 1.0);
        p1.insert(1, Point3::new(0.0, -0.5, 1.0));
        let profiles: Vec<&[Point3]> = vec![&p0, &p1];

        let err = loft_mesh(&profiles, LoftOptions::capped()).unwrap_err();
        assert_eq!(
            err,
            LoftError::PointCountMismatch {
                index: 1,
                expected: 4,
                found: 5
            }
        );
    }

    #[test]
    fn test_caps_require_closed_profiles() {
        let mut p0 = rect_profile(0.0, 1.0, 1.0);
        let mut p1 = rect_profile(1.0, 1.0, 1.0);
        p0.pop();
        p1.pop();
        let profiles: Vec<&[Point3]> = vec![&p0, &p1];

        assert_eq!(
            loft_mesh(&profiles, LoftOptions::capped()).unwrap_err(),
            LoftError::OpenProfile { index: 0 }
        );
        assert!(loft_mesh(&profiles, LoftOptions::default()).is_ok());
    }

    #[test]
    fn test_bow_tie_profile_is_rejected() {
        let bow_tie = |z: f64| {
            vec![
                Point3::new(0.0, 0.0, z),
                Point3::new(2.0, 2.0, z),
                Point3::new(2.0, 0.0, z),
                Point3::new(0.0, 1.0, z),
                Point3::new(0.0, 0.0, z),
            ]
        };
        let p0 = bow_tie(0.0);
        let p1 = bow_tie(1.0);
        let profiles: Vec<&[Point3]> = vec![&p0, &p1];

        let err = loft_mesh(&profiles, LoftOptions::capped()).unwrap_err();
        assert!(matches!(err, LoftError::SelfIntersectingProfile { index: 0, .. }));
    }

    #[test]
    fn test_single_profile_is_rejected() {
        let p0 = rect_profile(0.0, 1.0, 1.0);
        let profiles: Vec<&[Point3]> = vec![&p0];
        assert_eq!(
            loft_mesh(&profiles, LoftOptions::default()).unwrap_err(),
            LoftError::NotEnoughProfiles { count: 1 }
        );
    }
}
