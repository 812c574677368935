//! Value types shared by the mesh kernel.
//!
//! Wing sections live in the XY plane and are stacked along +Z, so most
//! callers only build points with [`Point3::from_section`].

use std::ops::{Add, Sub};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    /// Span axis of a lofted wing.
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub const fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[must_use]
    pub const fn cross(self, rhs: Self) -> Self {
        Self {
            x: self.y * rhs.z - self.z * rhs.y,
            y: self.z * rhs.x - self.x * rhs.z,
            z: self.x * rhs.y - self.y * rhs.x,
        }
    }

    #[must_use]
    pub const fn length_squared(self) -> f64 {
        self.dot(self)
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Unit vector, or `None` for zero-length and non-finite input.
    #[must_use]
    pub fn normalized(self) -> Option<Self> {
        let len = self.length();
        (len.is_finite() && len > 0.0).then(|| Self::new(self.x / len, self.y / len, self.z / len))
    }

    #[must_use]
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Lift a section point `[x, y]` into the plane `z = offset`.
    #[must_use]
    pub const fn from_section(point: [f64; 2], offset: f64) -> Self {
        Self::new(point[0], point[1], offset)
    }

    #[must_use]
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    #[must_use]
    pub const fn sub_point(self, rhs: Self) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }

    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<[f64; 3]> for Point3 {
    fn from(p: [f64; 3]) -> Self {
        Self::new(p[0], p[1], p[2])
    }
}

impl Sub for Point3 {
    type Output = Vec3;
    fn sub(self, rhs: Self) -> Self::Output {
        self.sub_point(rhs)
    }
}

/// Axis-aligned bounds of a point set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub min: Point3,
    pub max: Point3,
}

impl BBox {
    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = Point3>) -> Option<Self> {
        points.into_iter().fold(None, |acc, p| {
            Some(match acc {
                None => Self { min: p, max: p },
                Some(Self { min, max }) => Self {
                    min: Point3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z)),
                    max: Point3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z)),
                },
            })
        })
    }

    #[must_use]
    pub fn size(self) -> Vec3 {
        self.max - self.min
    }
}

/// Distance below which two points are the same vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub eps: f64,
}

impl Tolerance {
    pub const DEFAULT: Self = Self { eps: 1e-9 };

    #[must_use]
    pub const fn new(eps: f64) -> Self {
        Self { eps }
    }

    #[must_use]
    pub const fn default_geom() -> Self {
        Self::DEFAULT
    }

    #[must_use]
    pub const fn eps_squared(self) -> f64 {
        self.eps * self.eps
    }

    #[must_use]
    pub fn approx_eq_point3(self, a: Point3, b: Point3) -> bool {
        (a - b).length_squared() <= self.eps_squared()
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_of_chord_and_thickness_axes_is_span() {
        let chord = Vec3::new(1.0, 0.0, 0.0);
        let thickness = Vec3::new(0.0, 1.0, 0.0);
        assert_eq!(chord.cross(thickness), Vec3::Z);
        assert_eq!(thickness.cross(chord).z, -1.0);
    }

    #[test]
    fn test_normalized_rejects_zero_vector() {
        assert!(Vec3::ZERO.normalized().is_none());
        let n = Vec3::new(3.0, 0.0, 4.0).normalized().unwrap();
        assert!((n.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_point_from_section_places_in_offset_plane() {
        let p = Point3::from_section([0.25, -0.01], 10.0);
        assert_eq!(p, Point3::new(0.25, -0.01, 10.0));
        assert_eq!(p - Point3::ORIGIN, Vec3::new(0.25, -0.01, 10.0));
    }

    #[test]
    fn test_point_from_buffer_array_round_trips() {
        let p = Point3::from([0.5, -0.02, 3.0]);
        assert_eq!(p, Point3::new(0.5, -0.02, 3.0));
        assert_eq!(Point3::from(p.to_array()), p);
    }

    #[test]
    fn test_bbox_of_section_points() {
        let bbox = BBox::from_points([
            Point3::new(0.0, -0.05, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.3, 0.08, 4.0),
        ])
        .unwrap();
        assert_eq!(bbox.min, Point3::new(0.0, -0.05, 0.0));
        assert_eq!(bbox.max, Point3::new(1.0, 0.08, 4.0));
        assert!((bbox.size().y - 0.13).abs() < 1e-15);
        assert!(BBox::from_points(Vec::new()).is_none());
    }

    #[test]
    fn test_tolerance_point_comparison() {
        let tol = Tolerance::new(1e-9);
        let a = Point3::new(1.0, 2.0, 3.0);
        assert!(tol.approx_eq_point3(a, Point3::new(1.0 + 1e-10, 2.0, 3.0)));
        assert!(!tol.approx_eq_point3(a, Point3::new(1.0 + 1e-8, 2.0, 3.0)));
    }
}
