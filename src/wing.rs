//! Straight tapered wing built by lofting a root and a tip airfoil section.
//!
//! The planform is rectangular in the sense that span is derived from the
//! root chord alone (`span = aspect_ratio * root_chord`). The root section
//! lies in the XY plane at `z = 0` and the tip section in the plane
//! `z = span`; both share the leading edge at `x = 0`.

use thiserror::Error;

use crate::airfoil::{AirfoilError, DEFAULT_STATIONS, NacaProfile};
use crate::geom::{
    GeomContext, GeomMesh, GeomMeshDiagnostics, LoftDiagnostics, LoftError, LoftOptions, Point3, TimingBucket,
    loft_mesh_with_context,
};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum WingError {
    #[error("invalid wing parameter {name}: {value} (must be positive and finite)")]
    InvalidParameter { name: &'static str, value: f64 },
    #[error("airfoil sampling failed: {0}")]
    Airfoil(#[from] AirfoilError),
    #[error("wing loft failed: {0}")]
    Loft(#[from] LoftError),
}

/// Inputs for [`build_wing`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WingOptions {
    /// Chordwise stations sampled per surface.
    pub stations: usize,
    pub root_chord: f64,
    pub taper_ratio: f64,
    pub aspect_ratio: f64,
    pub profile: NacaProfile,
}

impl Default for WingOptions {
    fn default() -> Self {
        Self {
            stations: DEFAULT_STATIONS,
            root_chord: 1.0,
            taper_ratio: 0.2,
            aspect_ratio: 10.0,
            profile: NacaProfile::default(),
        }
    }
}

impl WingOptions {
    #[must_use]
    pub fn span(&self) -> f64 {
        self.aspect_ratio * self.root_chord
    }

    #[must_use]
    pub fn tip_chord(&self) -> f64 {
        self.root_chord * self.taper_ratio
    }

    fn validate(&self) -> Result<(), WingError> {
        for (name, value) in [
            ("root_chord", self.root_chord),
            ("taper_ratio", self.taper_ratio),
            ("aspect_ratio", self.aspect_ratio),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(WingError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }
}

/// A closed wing solid plus the section loops it was lofted from.
#[derive(Debug, Clone)]
pub struct WingSolid {
    pub mesh: GeomMesh,
    pub mesh_diagnostics: GeomMeshDiagnostics,
    pub loft_diagnostics: LoftDiagnostics,
    /// Closed root loop at `z = 0`, first point repeated last.
    pub root_profile: Vec<Point3>,
    /// Closed tip loop at `z = span`, first point repeated last.
    pub tip_profile: Vec<Point3>,
    pub span: f64,
    pub root_chord: f64,
    pub tip_chord: f64,
}

impl WingSolid {
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.mesh.volume()
    }

    /// Trapezoidal planform area, `span * (root + tip) / 2`.
    #[must_use]
    pub fn planform_area(&self) -> f64 {
        self.span * (self.root_chord + self.tip_chord) / 2.0
    }
}

/// Build a wing with the default section (m=0.02, p=0.3, t=0.15).
pub fn build_airfoil_wing(
    n: usize,
    root_chord: f64,
    taper_ratio: f64,
    aspect_ratio: f64,
) -> Result<WingSolid, WingError> {
    build_wing(&WingOptions {
        stations: n,
        root_chord,
        taper_ratio,
        aspect_ratio,
        profile: NacaProfile::default(),
    })
}

pub fn build_wing(options: &WingOptions) -> Result<WingSolid, WingError> {
    options.validate()?;

    let span = options.span();
    let tip_chord = options.tip_chord();

    let mut ctx = GeomContext::new();
    ctx.metrics.begin();

    let (root_profile, tip_profile) = ctx.metrics.time(TimingBucket::Sampling, || {
        let root = section_loop(&options.profile, options.stations, options.root_chord, 0.0)?;
        let tip = section_loop(&options.profile, options.stations, tip_chord, span)?;
        Ok::<_, AirfoilError>((root, tip))
    })?;

    let profiles: Vec<&[Point3]> = vec![&root_profile, &tip_profile];
    let (mesh, mesh_diagnostics, loft_diagnostics) =
        loft_mesh_with_context(&profiles, LoftOptions::capped(), &mut ctx)?;

    if mesh_diagnostics.is_valid_solid() {
        log::debug!("wing solid: span={span} tip_chord={tip_chord} {}", mesh_diagnostics.summary());
    } else {
        log::warn!("wing mesh is not a closed solid: {}", mesh_diagnostics.summary());
    }

    Ok(WingSolid {
        mesh,
        mesh_diagnostics,
        loft_diagnostics,
        root_profile,
        tip_profile,
        span,
        root_chord: options.root_chord,
        tip_chord,
    })
}

fn section_loop(profile: &NacaProfile, n: usize, chord: f64, z: f64) -> Result<Vec<Point3>, AirfoilError> {
    Ok(profile
        .closed_profile(n, chord)?
        .into_iter()
        .map(|p| Point3::from_section(p, z))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_follows_aspect_ratio() {
        let wing = build_airfoil_wing(100, 1.0, 0.2, 10.0).unwrap();
        assert_eq!(wing.span, 10.0);
        assert!((wing.tip_chord - 0.2).abs() < 1e-15);
        assert!(wing.tip_profile.iter().all(|p| p.z == 10.0));
        assert!(wing.root_profile.iter().all(|p| p.z == 0.0));
    }

    #[test]
    fn test_untapered_tip_is_translated_root() {
        let wing = build_airfoil_wing(60, 1.5, 1.0, 4.0).unwrap();
        assert_eq!(wing.root_profile.len(), wing.tip_profile.len());
        for (root, tip) in wing.root_profile.iter().zip(&wing.tip_profile) {
            assert_eq!(tip.x, root.x);
            assert_eq!(tip.y, root.y);
            assert_eq!(tip.z - root.z, 6.0);
        }
    }

    #[test]
    fn test_section_loops_are_closed() {
        let wing = build_airfoil_wing(40, 2.0, 0.5, 6.0).unwrap();
        assert_eq!(wing.root_profile.first(), wing.root_profile.last());
        assert_eq!(wing.tip_profile.first(), wing.tip_profile.last());
    }

    #[test]
    fn test_wing_mesh_is_closed_with_positive_volume() {
        let wing = build_airfoil_wing(100, 1.0, 0.2, 10.0).unwrap();
        assert!(wing.mesh_diagnostics.is_valid_solid(), "{}", wing.mesh_diagnostics);
        assert_eq!(wing.mesh_diagnostics.degenerate_triangle_count, 0);
        assert!(wing.volume() > 0.0);
        assert!(wing.volume() < wing.planform_area() * 0.15 * 1.0);
        wing.mesh.validate().unwrap();

        // Leading edge and merged trailing edge are each shared by both surfaces.
        assert_eq!(wing.loft_diagnostics.points_per_profile, 2 * 100 - 2);
    }

    #[test]
    fn test_cambered_code_builds_closed_solid() {
        let options = WingOptions {
            stations: 80,
            profile: NacaProfile::from_code("6409").unwrap(),
            ..WingOptions::default()
        };
        let wing = build_wing(&options).unwrap();
        assert!(wing.mesh_diagnostics.is_valid_solid());
    }

    #[test]
    fn test_invalid_parameters_are_rejected() {
        assert_eq!(
            build_airfoil_wing(100, 1.0, 0.0, 10.0).unwrap_err(),
            WingError::InvalidParameter {
                name: "taper_ratio",
                value: 0.0
            }
        );
        assert!(matches!(
            build_airfoil_wing(100, f64::INFINITY, 0.5, 10.0),
            Err(WingError::InvalidParameter { name: "root_chord", .. })
        ));
        assert!(matches!(
            build_airfoil_wing(1, 1.0, 0.5, 10.0),
            Err(WingError::Airfoil(AirfoilError::TooFewStations(1)))
        ));
    }
}
