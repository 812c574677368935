//! Mesh kernel: value types, loft, cap triangulation and mesh repair.

mod core;
mod diagnostics;
mod loft;
mod mesh;
mod metrics;
mod triangulation;

pub use core::{BBox, Point3, Tolerance, Vec3};
pub use diagnostics::GeomMeshDiagnostics;
pub use loft::{LoftDiagnostics, LoftError, LoftOptions, loft_mesh, loft_mesh_with_context};
pub use mesh::{GeomContext, GeomMesh};
pub use metrics::{GeomMetrics, GeomTimingReport, TimingBucket};
pub use triangulation::{TriangulationError, signed_area2, triangulate_polygon};

#[cfg(test)]
mod tests;
