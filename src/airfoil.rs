//! NACA 4-digit airfoil sampling.
//!
//! A section is described by its maximum camber `m`, the chordwise position of
//! that camber `p` and the maximum thickness `t`, all as fractions of chord.
//! Points are returned in section coordinates: `x` along the chord from the
//! leading edge, `y` normal to it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Thickness polynomial coefficients shared by both trailing-edge variants.
const A0: f64 = 0.2969;
const A1: f64 = -0.1260;
const A2: f64 = -0.3516;
const A3: f64 = 0.2843;

/// Default number of chordwise stations per surface.
pub const DEFAULT_STATIONS: usize = 100;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AirfoilError {
    #[error("chord length must be positive and finite, got {0}")]
    InvalidChord(f64),
    #[error("station x={x} is outside [0, {chord}]")]
    StationOutOfRange { x: f64, chord: f64 },
    #[error("invalid NACA 4-digit code {0:?}")]
    InvalidNacaCode(String),
    #[error("maximum camber must be finite and non-negative, got {0}")]
    InvalidCamber(f64),
    #[error("camber position must lie in [0, 1), got {0}")]
    InvalidCamberPosition(f64),
    #[error("thickness must be positive and finite, got {0}")]
    InvalidThickness(f64),
    #[error("at least 2 stations are required, got {0}")]
    TooFewStations(usize),
}

/// Trailing-edge closure of the thickness distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailingEdge {
    /// Last coefficient -0.1036: thickness is exactly zero at `x = c`.
    #[default]
    Closed,
    /// Classic last coefficient -0.1015: a finite trailing-edge gap remains.
    Open,
}

impl TrailingEdge {
    #[must_use]
    pub const fn a4(self) -> f64 {
        match self {
            Self::Closed => -0.1036,
            Self::Open => -0.1015,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// NacaCode
// ─────────────────────────────────────────────────────────────────────────────

/// A validated four-digit NACA designation such as `2412`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NacaCode([u8; 4]);

impl NacaCode {
    /// Camber 2%, position 30%, thickness 15%.
    pub const DEFAULT: Self = Self([2, 3, 1, 5]);

    #[must_use]
    pub const fn digits(self) -> [u8; 4] {
        self.0
    }

    #[must_use]
    pub fn max_camber(self) -> f64 {
        f64::from(self.0[0]) / 100.0
    }

    #[must_use]
    pub fn camber_position(self) -> f64 {
        f64::from(self.0[1]) / 10.0
    }

    #[must_use]
    pub fn thickness(self) -> f64 {
        f64::from(self.0[2] * 10 + self.0[3]) / 100.0
    }

    /// Profile for this code with a closed trailing edge.
    pub fn profile(self) -> Result<NacaProfile, AirfoilError> {
        NacaProfile::new(self.max_camber(), self.camber_position(), self.thickness())
    }
}

impl Default for NacaCode {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl FromStr for NacaCode {
    type Err = AirfoilError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("NACA")
            .or_else(|| trimmed.strip_prefix("naca"))
            .unwrap_or(trimmed)
            .trim();

        let bytes = digits.as_bytes();
        if bytes.len() != 4 || !bytes.iter().all(u8::is_ascii_digit) {
            return Err(AirfoilError::InvalidNacaCode(s.to_string()));
        }
        Ok(Self([bytes[0] - b'0', bytes[1] - b'0', bytes[2] - b'0', bytes[3] - b'0']))
    }
}

impl TryFrom<String> for NacaCode {
    type Error = AirfoilError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NacaCode> for String {
    fn from(code: NacaCode) -> Self {
        code.to_string()
    }
}

impl fmt::Display for NacaCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "{a}{b}{c}{d}")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// NacaProfile
// ─────────────────────────────────────────────────────────────────────────────

/// Upper and lower surface point for one chordwise station.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePoint {
    pub upper: [f64; 2],
    pub lower: [f64; 2],
}

/// Index-aligned surface samples, leading edge to trailing edge.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EdgePoints {
    pub uppers: Vec<[f64; 2]>,
    pub lowers: Vec<[f64; 2]>,
}

impl EdgePoints {
    /// Upper surface followed by the reversed lower surface.
    ///
    /// Both surfaces start at the leading edge, so the loop ends on its
    /// starting point.
    #[must_use]
    pub fn into_closed_loop(self) -> Vec<[f64; 2]> {
        let mut profile = self.uppers;
        profile.extend(self.lowers.into_iter().rev());
        profile
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NacaProfile {
    pub max_camber: f64,
    pub camber_position: f64,
    pub thickness: f64,
    pub trailing_edge: TrailingEdge,
}

impl Default for NacaProfile {
    fn default() -> Self {
        Self {
            max_camber: 0.02,
            camber_position: 0.3,
            thickness: 0.15,
            trailing_edge: TrailingEdge::Closed,
        }
    }
}

impl NacaProfile {
    /// Validated profile with a closed trailing edge.
    pub fn new(max_camber: f64, camber_position: f64, thickness: f64) -> Result<Self, AirfoilError> {
        let profile = Self {
            max_camber,
            camber_position,
            thickness,
            trailing_edge: TrailingEdge::Closed,
        };
        profile.validate()?;
        Ok(profile)
    }

    pub fn from_code(code: &str) -> Result<Self, AirfoilError> {
        code.parse::<NacaCode>()?.profile()
    }

    #[must_use]
    pub fn with_trailing_edge(mut self, trailing_edge: TrailingEdge) -> Self {
        self.trailing_edge = trailing_edge;
        self
    }

    pub fn validate(&self) -> Result<(), AirfoilError> {
        if !self.max_camber.is_finite() || self.max_camber < 0.0 {
            return Err(AirfoilError::InvalidCamber(self.max_camber));
        }
        if !(0.0..1.0).contains(&self.camber_position) {
            return Err(AirfoilError::InvalidCamberPosition(self.camber_position));
        }
        if !self.thickness.is_finite() || self.thickness <= 0.0 {
            return Err(AirfoilError::InvalidThickness(self.thickness));
        }
        Ok(())
    }

    /// True when the mean line is the chord line.
    #[must_use]
    pub fn is_symmetric(&self) -> bool {
        self.max_camber == 0.0 || self.camber_position == 0.0
    }

    /// Half thickness `yt` at station `x` of a section with chord `c`.
    pub fn half_thickness(&self, x: f64, c: f64) -> Result<f64, AirfoilError> {
        self.validate()?;
        let xi = normalized_station(x, c)?;
        Ok(self.half_thickness_unchecked(xi, c))
    }

    /// Mean-line height `yc` and its slope angle `theta` (radians) at `x`.
    pub fn camber(&self, x: f64, c: f64) -> Result<(f64, f64), AirfoilError> {
        self.validate()?;
        let xi = normalized_station(x, c)?;
        Ok(self.camber_unchecked(xi, c))
    }

    /// Upper and lower surface points at station `x`.
    pub fn surface_point(&self, x: f64, c: f64) -> Result<SurfacePoint, AirfoilError> {
        self.validate()?;
        let xi = normalized_station(x, c)?;
        Ok(self.surface_point_unchecked(x, xi, c))
    }

    /// Sample `n` evenly spaced stations over `[0, c]`, both ends included.
    pub fn edge_points(&self, n: usize, c: f64) -> Result<EdgePoints, AirfoilError> {
        self.validate()?;
        check_chord(c)?;
        if n < 2 {
            return Err(AirfoilError::TooFewStations(n));
        }

        let mut uppers = Vec::with_capacity(n);
        let mut lowers = Vec::with_capacity(n);
        let last = (n - 1) as f64;
        for i in 0..n {
            let xi = i as f64 / last;
            let point = self.surface_point_unchecked(xi * c, xi, c);
            uppers.push(point.upper);
            lowers.push(point.lower);
        }

        Ok(EdgePoints { uppers, lowers })
    }

    /// Closed section loop: uppers then reversed lowers, first point repeated last.
    pub fn closed_profile(&self, n: usize, c: f64) -> Result<Vec<[f64; 2]>, AirfoilError> {
        Ok(self.edge_points(n, c)?.into_closed_loop())
    }

    fn half_thickness_unchecked(&self, xi: f64, c: f64) -> f64 {
        let a4 = self.trailing_edge.a4();
        let poly = A0 * xi.sqrt() + A1 * xi + A2 * xi.powi(2) + A3 * xi.powi(3) + a4 * xi.powi(4);
        ((self.thickness / 0.2) * c * poly).max(0.0)
    }

    fn camber_unchecked(&self, xi: f64, c: f64) -> (f64, f64) {
        if self.is_symmetric() {
            return (0.0, 0.0);
        }

        let m = self.max_camber;
        let p = self.camber_position;
        let (yc, slope) = if xi < p {
            let k = m / (p * p);
            (k * (2.0 * p * xi - xi * xi), k * (2.0 * p - 2.0 * xi))
        } else {
            let k = m / ((1.0 - p) * (1.0 - p));
            (k * ((1.0 - 2.0 * p) + 2.0 * p * xi - xi * xi), k * (2.0 * p - 2.0 * xi))
        };
        (yc * c, slope.atan())
    }

    fn surface_point_unchecked(&self, x: f64, xi: f64, c: f64) -> SurfacePoint {
        let yt = self.half_thickness_unchecked(xi, c);
        let (yc, theta) = self.camber_unchecked(xi, c);
        let (sin, cos) = theta.sin_cos();

        SurfacePoint {
            upper: [x - yt * sin, yc + yt * cos],
            lower: [x + yt * sin, yc - yt * cos],
        }
    }
}

fn check_chord(c: f64) -> Result<(), AirfoilError> {
    if c.is_finite() && c > 0.0 {
        Ok(())
    } else {
        Err(AirfoilError::InvalidChord(c))
    }
}

fn normalized_station(x: f64, c: f64) -> Result<f64, AirfoilError> {
    check_chord(c)?;
    if !(0.0..=c).contains(&x) {
        return Err(AirfoilError::StationOutOfRange { x, chord: c });
    }
    Ok((x / c).clamp(0.0, 1.0))
}

/// Edge points of the default section (m=0.02, p=0.3, t=0.15).
///
/// Upper-surface x is non-decreasing only up to about 1100 stations. Past
/// that, the leading-edge offset `-yt * sin(theta)` moves the first few
/// upper points behind the leading edge, so densely sampled loops must not
/// be assumed to be x-sorted.
pub fn generate_airfoil_edge_points(n: usize, c: f64) -> Result<EdgePoints, AirfoilError> {
    NacaProfile::default().edge_points(n, c)
}
