//! Materializes a wing run into timestamped files.
//!
//! Every run writes `<dir>/<timestamp>.obj`, where the timestamp is UTC in
//! `YYYY-MM-DDTHH:MM:SS.ffffff` form. The OBJ starts with a comment preamble
//! (generator, wing sentence, parameters, model reply) followed by vertices,
//! normals and faces. `ExportFormat::Json` adds a `<timestamp>.json`
//! tessellated shape for web viewers.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use time::macros::format_description;

use crate::geom::GeomMesh;
use crate::mission::WingParameters;

pub const GENERATOR: &str = concat!("wingloft ", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("{action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("refusing to overwrite existing file {}", .0.display())]
    AlreadyExists(PathBuf),
    #[error("mesh validation failed: {0}")]
    InvalidMesh(String),
    #[error("json export failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("timestamp formatting failed: {0}")]
    Timestamp(#[from] time::error::Format),
    #[error("unknown export format {0:?} (expected obj or json)")]
    UnknownFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Obj,
    Json,
}

impl ExportFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Obj => "obj",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "obj" => Ok(Self::Obj),
            "json" => Ok(Self::Json),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

/// Where a mesh came from; rendered as OBJ comments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Provenance {
    pub description: Option<String>,
    pub parameters: Option<WingParameters>,
    pub model: Option<String>,
    pub reply: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapeBounds {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

/// Flat-buffer shape layout consumed by three.js style viewers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TessellatedShape {
    pub name: String,
    pub vertices: Vec<f64>,
    pub normals: Vec<f64>,
    pub triangles: Vec<u32>,
    pub bbox: Option<ShapeBounds>,
}

impl TessellatedShape {
    #[must_use]
    pub fn from_mesh(name: &str, mesh: &GeomMesh) -> Self {
        Self {
            name: name.to_string(),
            vertices: mesh.positions.iter().flatten().copied().collect(),
            normals: mesh.normals.iter().flatten().flatten().copied().collect(),
            triangles: mesh.indices.clone(),
            bbox: mesh.bbox().map(|b| ShapeBounds {
                min: b.min.to_array(),
                max: b.max.to_array(),
            }),
        }
    }
}

/// File stem for a run started at `at`, e.g. `2024-03-01T12:30:05.000123`.
pub fn timestamp_stem(at: OffsetDateTime) -> Result<String, ExportError> {
    let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]");
    Ok(at.to_offset(time::UtcOffset::UTC).format(&format)?)
}

/// Write OBJ text for `mesh` with a comment preamble.
pub fn write_obj<W: Write>(mut w: W, mesh: &GeomMesh, name: &str, provenance: &Provenance) -> io::Result<()> {
    writeln!(w, "# {GENERATOR}")?;
    if let Some(description) = provenance.description.as_deref() {
        writeln!(w, "# {description}")?;
    }
    if let Some(params) = provenance.parameters.as_ref() {
        writeln!(
            w,
            "# parameters: naca={} aspect_ratio={} taper_ratio={} sweep_angle={}",
            params.naca, params.aspect_ratio, params.taper_ratio, params.sweep_deg
        )?;
    }
    if let Some(model) = provenance.model.as_deref() {
        writeln!(w, "# model: {model}")?;
    }
    if let Some(reply) = provenance.reply.as_deref() {
        writeln!(w, "# reply:")?;
        for line in reply.lines() {
            writeln!(w, "#   {line}")?;
        }
    }

    writeln!(w, "o {name}")?;
    for p in &mesh.positions {
        writeln!(w, "v {} {} {}", p[0], p[1], p[2])?;
    }
    if let Some(normals) = mesh.normals.as_ref() {
        for n in normals {
            writeln!(w, "vn {} {} {}", n[0], n[1], n[2])?;
        }
    }

    let has_normals = mesh.normals.is_some();
    for tri in mesh.triangles() {
        let [a, b, c] = tri.map(|i| i + 1);
        if has_normals {
            writeln!(w, "f {a}//{a} {b}//{b} {c}//{c}")?;
        } else {
            writeln!(w, "f {a} {b} {c}")?;
        }
    }
    w.flush()
}

fn create_new(path: &Path) -> Result<BufWriter<File>, ExportError> {
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => Ok(BufWriter::new(file)),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(ExportError::AlreadyExists(path.to_path_buf())),
        Err(source) => Err(ExportError::Io {
            action: "create",
            path: path.to_path_buf(),
            source,
        }),
    }
}

pub fn write_obj_file(path: &Path, mesh: &GeomMesh, name: &str, provenance: &Provenance) -> Result<(), ExportError> {
    mesh.validate().map_err(ExportError::InvalidMesh)?;
    let w = create_new(path)?;
    write_obj(w, mesh, name, provenance).map_err(|source| ExportError::Io {
        action: "write",
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_json_file(path: &Path, mesh: &GeomMesh, name: &str) -> Result<(), ExportError> {
    mesh.validate().map_err(ExportError::InvalidMesh)?;
    let mut w = create_new(path)?;
    serde_json::to_writer(&mut w, &TessellatedShape::from_mesh(name, mesh))?;
    w.flush().map_err(|source| ExportError::Io {
        action: "flush",
        path: path.to_path_buf(),
        source,
    })
}

/// Write every requested format as `<dir>/<stem>.<ext>`, creating `dir` first.
pub fn export_mesh(
    dir: &Path,
    stem: &str,
    mesh: &GeomMesh,
    provenance: &Provenance,
    formats: &[ExportFormat],
) -> Result<Vec<PathBuf>, ExportError> {
    fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        action: "create dir",
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(formats.len());
    for format in formats {
        let path = dir.join(format!("{stem}.{}", format.extension()));
        match format {
            ExportFormat::Obj => write_obj_file(&path, mesh, "wing", provenance)?,
            ExportFormat::Json => write_json_file(&path, mesh, "wing")?,
        }
        log::info!("wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn triangle() -> GeomMesh {
        let mut mesh = GeomMesh::new(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], vec![0, 1, 2]);
        mesh.normals = Some(vec![[0.0, 0.0, 1.0]; 3]);
        mesh
    }

    #[test]
    fn test_timestamp_stem_format() {
        let stem = timestamp_stem(datetime!(2024-03-01 12:30:05.000123 UTC)).unwrap();
        assert_eq!(stem, "2024-03-01T12:30:05.000123");

        let shifted = timestamp_stem(datetime!(2024-03-01 14:30:05 +02:00)).unwrap();
        assert_eq!(shifted, "2024-03-01T12:30:05.000000");
    }

    #[test]
    fn test_obj_has_preamble_then_geometry() {
        let provenance = Provenance {
            description: Some("a test wing".into()),
            model: Some("gpt-test".into()),
            reply: Some("line one\nline two".into()),
            ..Default::default()
        };
        let mut out = Vec::new();
        write_obj(&mut out, &triangle(), "wing", &provenance).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], format!("# {GENERATOR}"));
        assert_eq!(lines[1], "# a test wing");
        assert!(lines.contains(&"#   line two"));
        assert!(lines.contains(&"o wing"));
        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 3);
        assert_eq!(text.lines().filter(|l| l.starts_with("vn ")).count(), 3);
        assert_eq!(lines.last(), Some(&"f 1//1 2//2 3//3"));
    }

    #[test]
    fn test_export_creates_directory_and_refuses_overwrite() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("generated");
        let formats = [ExportFormat::Obj, ExportFormat::Json];

        let written = export_mesh(&dir, "run", &triangle(), &Provenance::default(), &formats).unwrap();
        assert_eq!(written, vec![dir.join("run.obj"), dir.join("run.json")]);
        assert!(written.iter().all(|p| p.is_file()));

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&written[1]).unwrap()).unwrap();
        assert_eq!(json["name"], "wing");
        assert_eq!(json["triangles"].as_array().unwrap().len(), 3);
        assert_eq!(json["vertices"].as_array().unwrap().len(), 9);
        assert_eq!(json["bbox"]["max"][0], 1.0);

        let err = export_mesh(&dir, "run", &triangle(), &Provenance::default(), &formats).unwrap_err();
        assert!(matches!(err, ExportError::AlreadyExists(path) if path == dir.join("run.obj")));
    }

    #[test]
    fn test_invalid_mesh_is_not_written() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bad.obj");
        let mesh = GeomMesh::new(vec![[0.0, 0.0, 0.0]], vec![0, 1, 2]);

        assert!(matches!(
            write_obj_file(&path, &mesh, "bad", &Provenance::default()),
            Err(ExportError::InvalidMesh(_))
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("OBJ".parse::<ExportFormat>().unwrap(), ExportFormat::Obj);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!(matches!("stl".parse::<ExportFormat>(), Err(ExportError::UnknownFormat(_))));
    }
}
