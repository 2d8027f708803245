//! Quadric optical surfaces.
//!
//! Every surface carries a vertex, a circular aperture diameter, and the
//! vector(s) fixing its shape and orientation. All lengths are meters. The
//! vertex is the reference point for the aperture test and, for the closed
//! quadrics, anchors the branch of the surface a ray may intersect: the
//! intersection routines only accept hits on the cap containing the vertex.

mod intersections;

use serde::{Deserialize, Serialize};

use crate::core::{Float, math::vec3::Vec3};
use crate::rays::Ray;

/// The result of intersecting a ray with a surface.
///
/// A `Hit` leaves the ray untouched; moving the ray to the hit point is the
/// job of the redirections.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intersection {
    /// The ray meets the surface inside the aperture. `normal` is the unit
    /// outward normal at `point`.
    Hit { point: Vec3, normal: Vec3 },
    /// The ray meets the surface, but beyond the aperture radius.
    OutsideAperture,
    /// No intersection on the valid branch of the surface.
    NoIntersection,
}

/// A flat surface.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Plane {
    /// Vertex position.
    pub v: Vec3,
    /// Normal vector to the plane; any nonzero length.
    pub n: Vec3,
    /// Circular aperture diameter about the vertex.
    pub aperture: Float,
}

/// A spherical cap. The vertex lies on the sphere.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Sphere {
    /// Vertex position.
    pub v: Vec3,
    /// Vector from the vertex to the center; its length is the radius.
    pub vr: Vec3,
    /// Circular aperture diameter about the vertex.
    pub aperture: Float,
}

/// A paraboloid of revolution with its vertex at `v`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Paraboloid {
    /// Vertex position.
    pub v: Vec3,
    /// Vector from the vertex to the focus; its length is the focal length.
    pub f: Vec3,
    /// Circular aperture diameter about the vertex.
    pub aperture: Float,
}

/// A circular cylinder. The vertex lies on the surface.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Cylinder {
    /// Vertex position.
    pub v: Vec3,
    /// Vector from the vertex to the axis, perpendicular to it; its length
    /// is the radius.
    pub va: Vec3,
    /// Vector parallel to the cylinder axis; any nonzero length not parallel
    /// to `va`. The intersection routine orthonormalizes it against `va`.
    pub a: Vec3,
    /// Circular aperture diameter about the vertex.
    pub aperture: Float,
}

/// One sheet of a hyperboloid of revolution. The vertex lies on the surface.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Hyperboloid {
    /// Vertex position.
    pub v: Vec3,
    /// Vector from the vertex to the center; its length is the semi-major
    /// axis.
    pub a: Vec3,
    /// Eccentricity, > 1.
    pub e: Float,
    /// Circular aperture diameter about the vertex.
    pub aperture: Float,
}

/// Any surface the trace driver can stage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Surface {
    Plane(Plane),
    Sphere(Sphere),
    Paraboloid(Paraboloid),
    Cylinder(Cylinder),
    Hyperboloid(Hyperboloid),
}

impl Surface {
    /// Intersects a ray with the surface, dispatching on the variant.
    pub fn intersect(&self, ray: &Ray) -> Intersection {
        match self {
            Surface::Plane(s) => s.intersect(ray),
            Surface::Sphere(s) => s.intersect(ray),
            Surface::Paraboloid(s) => s.intersect(ray),
            Surface::Cylinder(s) => s.intersect(ray),
            Surface::Hyperboloid(s) => s.intersect(ray),
        }
    }
}

impl From<Plane> for Surface {
    fn from(s: Plane) -> Self {
        Surface::Plane(s)
    }
}

impl From<Sphere> for Surface {
    fn from(s: Sphere) -> Self {
        Surface::Sphere(s)
    }
}

impl From<Paraboloid> for Surface {
    fn from(s: Paraboloid) -> Self {
        Surface::Paraboloid(s)
    }
}

impl From<Cylinder> for Surface {
    fn from(s: Cylinder) -> Self {
        Surface::Cylinder(s)
    }
}

impl From<Hyperboloid> for Surface {
    fn from(s: Hyperboloid) -> Self {
        Surface::Hyperboloid(s)
    }
}
