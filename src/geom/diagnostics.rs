//! Mesh diagnostics for lofted solids.
//!
//! Every meshing entry point returns a [`GeomMeshDiagnostics`] alongside the
//! mesh. Callers use it to decide whether the result is a usable solid
//! (watertight and manifold) and to surface repair warnings in logs.
//!
//! ```ignore
//! let (mesh, diag, _) = loft_mesh(&profiles, LoftOptions::capped())?;
//! if !diag.is_valid_solid() {
//!     log::warn!("wing mesh is not closed: {}", diag.summary());
//! }
//! ```

use std::fmt;

use super::metrics::GeomTimingReport;

/// Topology, repair and timing information for a generated mesh.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GeomMeshDiagnostics {
    pub vertex_count: usize,
    pub triangle_count: usize,

    /// Vertices merged by the tolerance weld.
    pub welded_vertex_count: usize,
    /// Triangles re-wound to agree with their neighbours.
    pub flipped_triangle_count: usize,
    /// Zero-area triangles dropped.
    pub degenerate_triangle_count: usize,

    /// Edges used by one triangle only.
    pub open_edge_count: usize,
    /// Edges shared by three or more triangles.
    pub non_manifold_edge_count: usize,

    /// Volume bounded by the mesh; set only when it is a closed solid.
    pub enclosed_volume: Option<f64>,

    /// Only populated with the `mesh_engine_metrics` feature.
    pub timing: Option<GeomTimingReport>,
    pub warnings: Vec<String>,
}

impl GeomMeshDiagnostics {
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        self.open_edge_count == 0
    }

    #[must_use]
    pub fn is_manifold(&self) -> bool {
        self.non_manifold_edge_count == 0
    }

    /// Watertight and manifold: the minimum for a solid.
    #[must_use]
    pub fn is_valid_solid(&self) -> bool {
        self.is_watertight() && self.is_manifold()
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    fn issue_counts(&self) -> [(&'static str, usize); 5] {
        [
            ("welded", self.welded_vertex_count),
            ("flipped", self.flipped_triangle_count),
            ("degenerate", self.degenerate_triangle_count),
            ("open", self.open_edge_count),
            ("non-manifold", self.non_manifold_edge_count),
        ]
    }

    /// One line for logs, e.g. `V:396 T:788 vol:0.0412` or `V:12 T:10 open:4`.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut line = format!("V:{} T:{}", self.vertex_count, self.triangle_count);
        for (label, count) in self.issue_counts() {
            if count > 0 {
                line.push_str(&format!(" {label}:{count}"));
            }
        }
        if let Some(volume) = self.enclosed_volume {
            line.push_str(&format!(" vol:{volume:.4}"));
        }
        line
    }
}

impl fmt::Display for GeomMeshDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.is_valid_solid() { "solid" } else { "open" };
        writeln!(
            f,
            "mesh ({status}): {} vertices, {} triangles",
            self.vertex_count, self.triangle_count
        )?;

        let issues: Vec<String> = self
            .issue_counts()
            .iter()
            .filter(|(_, count)| *count > 0)
            .map(|(label, count)| format!("{label}={count}"))
            .collect();
        if !issues.is_empty() {
            writeln!(f, "  repairs/topology: {}", issues.join(", "))?;
        }
        if let Some(volume) = self.enclosed_volume {
            writeln!(f, "  enclosed volume: {volume}")?;
        }
        for warning in &self.warnings {
            writeln!(f, "  warning: {warning}")?;
        }
        if let Some(timing) = &self.timing {
            write!(f, "  timing: {} ms", timing.total_ms())?;
        }
        Ok(())
    }
}
