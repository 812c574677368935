use std::collections::HashMap;

use super::diagnostics::GeomMeshDiagnostics;
use super::metrics::{GeomMetrics, TimingBucket};
use super::{BBox, Point3, Tolerance, Vec3};

/// Indexed triangle mesh produced by the loft kernel.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeomMesh {
    pub positions: Vec<[f64; 3]>,
    pub indices: Vec<u32>,
    pub normals: Option<Vec<[f64; 3]>>,
}

impl GeomMesh {
    /// Create a mesh with positions and indices only.
    #[must_use]
    pub fn new(positions: Vec<[f64; 3]>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            indices,
            normals: None,
        }
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Iterate triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| [tri[0], tri[1], tri[2]])
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.indices.len() % 3 != 0 {
            return Err("mesh indices are not a triangle list (len % 3 != 0)".to_string());
        }
        if self
            .positions
            .iter()
            .any(|p| !p[0].is_finite() || !p[1].is_finite() || !p[2].is_finite())
        {
            return Err("mesh has invalid vertex coordinates (NaN/Inf)".to_string());
        }
        let n = self.positions.len() as u32;
        if self.indices.iter().any(|&i| i >= n) {
            return Err("mesh has out-of-bounds vertex indices".to_string());
        }
        if self
            .normals
            .as_ref()
            .is_some_and(|normals| normals.len() != self.positions.len())
        {
            return Err("mesh normal buffer does not match vertex count".to_string());
        }
        Ok(())
    }

    /// Enclosed volume by the divergence theorem. Positive for outward winding.
    #[must_use]
    pub fn volume(&self) -> f64 {
        let points: Vec<Point3> = self.positions.iter().copied().map(Point3::from).collect();
        signed_volume(&points, &self.indices)
    }

    #[must_use]
    pub fn bbox(&self) -> Option<BBox> {
        BBox::from_points(self.positions.iter().copied().map(Point3::from))
    }
}

/// Shared state for a chain of geometry operations.
#[derive(Debug, Default)]
pub struct GeomContext {
    pub tolerance: Tolerance,
    pub metrics: GeomMetrics,
}

impl GeomContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_tolerance(tolerance: Tolerance) -> Self {
        Self {
            tolerance,
            metrics: GeomMetrics::default(),
        }
    }
}

/// Weld, cull, orient and annotate raw triangle soup into a final mesh.
pub(crate) fn finalize_mesh(
    points: Vec<Point3>,
    indices: Vec<u32>,
    tol: Tolerance,
    metrics: &mut GeomMetrics,
) -> (GeomMesh, GeomMeshDiagnostics) {
    let (points, mut indices, welded_vertex_count, degenerate_triangle_count, flipped_triangle_count) =
        metrics.time(TimingBucket::Welding, || {
            let (points, indices, welded) = weld_mesh_vertices(points, indices, tol);
            let (mut indices, culled) = cull_degenerate_triangles(&points, &indices, tol);
            let flipped = fix_triangle_winding_consistency(&mut indices);
            (points, indices, welded, culled, flipped)
        });

    let (open_edge_count, non_manifold_edge_count) =
        metrics.time(TimingBucket::Diagnostics, || count_edge_topology(&indices));

    let mut warnings = Vec::new();
    let mut enclosed_volume = None;
    if open_edge_count == 0 && non_manifold_edge_count == 0 {
        let volume = signed_volume(&points, &indices);
        if volume.is_finite() && volume < 0.0 {
            flip_all_triangles(&mut indices);
            warnings.push("mesh orientation flipped (outward)".to_string());
        }
        enclosed_volume = volume.is_finite().then_some(volume.abs());
    }
    if open_edge_count > 0 {
        warnings.push("mesh has open edges".to_string());
    }
    if non_manifold_edge_count > 0 {
        warnings.push("mesh has non-manifold edges".to_string());
    }

    let normals = compute_smooth_normals(&points, &indices);

    let mesh = GeomMesh {
        positions: points.into_iter().map(Point3::to_array).collect(),
        indices,
        normals: Some(normals),
    };

    let diagnostics = GeomMeshDiagnostics {
        vertex_count: mesh.vertex_count(),
        triangle_count: mesh.triangle_count(),
        welded_vertex_count,
        flipped_triangle_count,
        degenerate_triangle_count,
        open_edge_count,
        non_manifold_edge_count,
        enclosed_volume,
        timing: None,
        warnings,
    };

    (mesh, diagnostics)
}

/// Merge vertices closer than `tol` using a hashed grid with cell size `tol.eps`.
pub(crate) fn weld_mesh_vertices(
    points: Vec<Point3>,
    indices: Vec<u32>,
    tol: Tolerance,
) -> (Vec<Point3>, Vec<u32>, usize) {
    if !tol.eps.is_finite() || tol.eps <= 0.0 {
        return (points, indices, 0);
    }

    let inv = 1.0 / tol.eps;
    let cell_of = |p: Point3| -> Option<(i64, i64, i64)> {
        if !p.is_finite() {
            return None;
        }
        let q = |v: f64| (v * inv).floor().clamp(i64::MIN as f64, i64::MAX as f64) as i64;
        Some((q(p.x), q(p.y), q(p.z)))
    };

    let mut buckets: HashMap<(i64, i64, i64), Vec<u32>> = HashMap::new();
    let mut remap: Vec<u32> = Vec::with_capacity(points.len());
    let mut out_points: Vec<Point3> = Vec::with_capacity(points.len());

    for p in points.iter().copied() {
        let key = cell_of(p);

        let found = key.and_then(|(kx, ky, kz)| {
            (-1i64..=1)
                .flat_map(|dx| (-1i64..=1).flat_map(move |dy| (-1i64..=1).map(move |dz| (dx, dy, dz))))
                .filter_map(|(dx, dy, dz)| buckets.get(&(kx + dx, ky + dy, kz + dz)))
                .flatten()
                .copied()
                .find(|&cand| tol.approx_eq_point3(out_points[cand as usize], p))
        });

        let out_idx = match found {
            Some(existing) => existing,
            None => {
                let new_idx = out_points.len() as u32;
                out_points.push(p);
                if let Some(key) = key {
                    buckets.entry(key).or_default().push(new_idx);
                }
                new_idx
            }
        };
        remap.push(out_idx);
    }

    let out_indices = indices
        .into_iter()
        .map(|idx| remap.get(idx as usize).copied().unwrap_or(idx))
        .collect();

    let welded = points.len().saturating_sub(out_points.len());
    (out_points, out_indices, welded)
}

fn cull_degenerate_triangles(points: &[Point3], indices: &[u32], tol: Tolerance) -> (Vec<u32>, usize) {
    let mut out = Vec::with_capacity(indices.len());
    let mut removed = 0usize;

    for tri in indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0], tri[1], tri[2]);
        if i0 == i1 || i1 == i2 || i0 == i2 {
            removed += 1;
            continue;
        }

        let (Some(a), Some(b), Some(c)) = (
            points.get(i0 as usize).copied(),
            points.get(i1 as usize).copied(),
            points.get(i2 as usize).copied(),
        ) else {
            removed += 1;
            continue;
        };

        let area2 = b.sub_point(a).cross(c.sub_point(a)).length_squared();
        if !area2.is_finite() || area2 <= tol.eps_squared() * tol.eps_squared() {
            removed += 1;
            continue;
        }

        out.extend_from_slice(&[i0, i1, i2]);
    }

    (out, removed)
}

/// Propagate a consistent winding across shared manifold edges.
/// Returns the number of triangles flipped.
pub(crate) fn fix_triangle_winding_consistency(indices: &mut [u32]) -> usize {
    let tri_count = indices.len() / 3;
    if tri_count == 0 {
        return 0;
    }

    let mut edges: HashMap<(u32, u32), Vec<(usize, bool)>> = HashMap::with_capacity(tri_count * 3);
    for t in 0..tri_count {
        let tri = [indices[t * 3], indices[t * 3 + 1], indices[t * 3 + 2]];
        for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
            let (lo, hi, forward) = if a <= b { (a, b, true) } else { (b, a, false) };
            edges.entry((lo, hi)).or_default().push((t, forward));
        }
    }

    let mut visited = vec![false; tri_count];
    let mut flipped = vec![false; tri_count];

    for seed in 0..tri_count {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;
        let mut stack = vec![seed];

        while let Some(t) = stack.pop() {
            let tri = [indices[t * 3], indices[t * 3 + 1], indices[t * 3 + 2]];
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let (lo, hi, dir_t) = if a <= b { (a, b, true) } else { (b, a, false) };
                let Some(adj) = edges.get(&(lo, hi)) else {
                    continue;
                };
                if adj.len() != 2 {
                    continue;
                }
                let (other, dir_other) = if adj[0].0 == t { adj[1] } else { adj[0] };
                if other == t || visited[other] {
                    continue;
                }
                // Neighbours must traverse the shared edge in opposite directions.
                visited[other] = true;
                flipped[other] = flipped[t] ^ (dir_t == dir_other);
                stack.push(other);
            }
        }
    }

    let mut count = 0usize;
    for (t, &flip) in flipped.iter().enumerate() {
        if flip {
            indices.swap(t * 3 + 1, t * 3 + 2);
            count += 1;
        }
    }
    count
}

/// Count (open, non-manifold) edges.
pub(crate) fn count_edge_topology(indices: &[u32]) -> (usize, usize) {
    let mut edge_counts: HashMap<(u32, u32), u32> = HashMap::new();

    for tri in indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0], tri[1], tri[2]);
        if i0 == i1 || i1 == i2 || i0 == i2 {
            continue;
        }
        for (a, b) in [(i0, i1), (i1, i2), (i2, i0)] {
            *edge_counts.entry((a.min(b), a.max(b))).or_insert(0) += 1;
        }
    }

    edge_counts.values().fold((0, 0), |(open, non_manifold), &count| match count {
        1 => (open + 1, non_manifold),
        c if c > 2 => (open, non_manifold + 1),
        _ => (open, non_manifold),
    })
}

fn flip_all_triangles(indices: &mut [u32]) {
    for tri in indices.chunks_exact_mut(3) {
        tri.swap(1, 2);
    }
}

pub(crate) fn signed_volume(points: &[Point3], indices: &[u32]) -> f64 {
    let mut volume = 0.0;
    for tri in indices.chunks_exact(3) {
        let (Some(a), Some(b), Some(c)) = (
            points.get(tri[0] as usize),
            points.get(tri[1] as usize),
            points.get(tri[2] as usize),
        ) else {
            continue;
        };
        let av = a.sub_point(Point3::ORIGIN);
        let bv = b.sub_point(Point3::ORIGIN);
        let cv = c.sub_point(Point3::ORIGIN);
        volume += av.dot(bv.cross(cv));
    }
    volume / 6.0
}

/// Area-weighted vertex normals.
fn compute_smooth_normals(points: &[Point3], indices: &[u32]) -> Vec<[f64; 3]> {
    let mut normals = vec![Vec3::ZERO; points.len()];

    for tri in indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let (Some(a), Some(b), Some(c)) = (points.get(i0), points.get(i1), points.get(i2)) else {
            continue;
        };
        let n = b.sub_point(*a).cross(c.sub_point(*a));
        normals[i0] = normals[i0] + n;
        normals[i1] = normals[i1] + n;
        normals[i2] = normals[i2] + n;
    }

    normals
        .into_iter()
        .map(|n| n.normalized().unwrap_or(Vec3::Z).to_array())
        .collect()
}
