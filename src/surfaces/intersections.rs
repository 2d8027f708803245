//! Ray-surface intersection routines.
//!
//! Each routine returns the hit point and the unit outward normal, or
//! reports that the ray missed the valid branch of the surface or struck it
//! outside the aperture. The ray itself is never modified here.
//!
//! All of the curved surfaces reduce to a quadratic in the ray parameter t.
//! For the closed quadrics (sphere, cylinder, hyperboloid) the root on the
//! vertex side of the center is selected; for the open paraboloid the
//! smallest non-negative root wins.

use crate::core::{
    Float,
    math::{
        quadratic::{self, Roots},
        vec3::Vec3,
    },
};
use crate::rays::Ray;

use super::{Cylinder, Hyperboloid, Intersection, Paraboloid, Plane, Sphere};

/// Selects a forward root whose intersection point lies on the vertex side
/// of the center, i.e. `(q - center) . side < 0`.
///
/// The `(-b + sqrt)/2a` root is preferred; the other root is consulted only
/// when the preferred one fails. A root behind the ray start never
/// qualifies.
fn vertex_side_root(roots: Roots, p: Vec3, d: Vec3, center: Vec3, side: Vec3) -> Option<Float> {
    let valid = |t: Float| t >= 0.0 && (p + d * t - center).dot(side) < 0.0;

    match roots {
        Roots::Linear(t) => valid(t).then_some(t),
        Roots::Pair { plus, minus } => {
            if valid(plus) {
                Some(plus)
            } else if valid(minus) {
                Some(minus)
            } else {
                None
            }
        }
    }
}

/// Selects the smallest non-negative root.
fn smallest_forward_root(roots: Roots) -> Option<Float> {
    match roots {
        Roots::Linear(t) => (t >= 0.0).then_some(t),
        Roots::Pair { plus, minus } => {
            let mut t = plus;
            if t < 0.0 || (minus >= 0.0 && minus < t) {
                t = minus;
            }
            (t >= 0.0).then_some(t)
        }
    }
}

impl Plane {
    /// Intersects a ray with the plane.
    pub fn intersect(&self, ray: &Ray) -> Intersection {
        let denom = ray.dir().dot(self.n);
        if denom == 0.0 {
            return Intersection::NoIntersection;
        }

        let t = (self.v.dot(self.n) - ray.pos().dot(self.n)) / denom;
        if t < 0.0 {
            return Intersection::NoIntersection;
        }
        let q = ray.pos() + ray.dir() * t;

        let n_mag = self.n.length();
        if n_mag == 0.0 {
            return Intersection::NoIntersection;
        }
        let normal = self.n / n_mag;

        // q lies on the plane, so the full offset from the vertex is the
        // in-plane radial distance.
        if (q - self.v).length() > self.aperture / 2.0 {
            return Intersection::OutsideAperture;
        }

        Intersection::Hit { point: q, normal }
    }
}

impl Sphere {
    /// Intersects a ray with the sphere, accepting only the cap containing
    /// the vertex.
    pub fn intersect(&self, ray: &Ray) -> Intersection {
        let (p, d) = (ray.pos(), ray.dir());
        let center = self.v + self.vr;
        let w0 = p - center;

        let a = d.dot(d);
        let b = 2.0 * d.dot(w0);
        let c = w0.dot(w0) - self.vr.dot(self.vr);

        let t = match quadratic::solve(a, b, c)
            .and_then(|roots| vertex_side_root(roots, p, d, center, self.vr))
        {
            Some(t) => t,
            None => return Intersection::NoIntersection,
        };
        let q = p + d * t;

        let radial = q - center;
        let radial_mag = radial.length();
        if radial_mag == 0.0 {
            return Intersection::NoIntersection;
        }
        let normal = radial / radial_mag;

        // Radial extent from the vertex, measured in the plane normal to vr.
        let offset = (q - self.v).reject(self.vr.normalize());
        if offset.length() > self.aperture / 2.0 {
            return Intersection::OutsideAperture;
        }

        Intersection::Hit { point: q, normal }
    }
}

impl Paraboloid {
    /// Intersects a ray with the paraboloid.
    pub fn intersect(&self, ray: &Ray) -> Intersection {
        let (p, d) = (ray.pos(), ray.dir());

        let focal_length = self.f.length();
        if focal_length == 0.0 {
            return Intersection::NoIntersection;
        }
        let axis = self.f / focal_length;

        // Offset from the focus; the surface equation in t follows from
        // |x - v - <x - v, axis> axis|^2 = 4 f <x - v, axis>.
        let w1 = p - self.v - self.f;
        let h = 2.0 * focal_length + w1.dot(axis);

        let a = d.dot(d) - d.dot(axis).powi(2);
        let b = 2.0 * d.dot(w1) - 2.0 * d.dot(axis) * h;
        let c = w1.dot(w1) - h * h;

        let t = match quadratic::solve(a, b, c).and_then(smallest_forward_root) {
            Some(t) => t,
            None => return Intersection::NoIntersection,
        };
        let q = p + d * t;

        let radial = (q - self.v).reject(axis);
        let r = radial.length();
        let normal = if r == 0.0 {
            axis
        } else {
            ((radial / r) * (-r / (2.0 * focal_length)) + axis).normalize()
        };

        if r > self.aperture / 2.0 {
            return Intersection::OutsideAperture;
        }

        Intersection::Hit { point: q, normal }
    }
}

impl Cylinder {
    /// Intersects a ray with the cylinder, accepting only the side facing
    /// the vertex.
    pub fn intersect(&self, ray: &Ray) -> Intersection {
        let (p, d) = (ray.pos(), ray.dir());

        let va_mag = self.va.length();
        if va_mag == 0.0 {
            return Intersection::NoIntersection;
        }
        let w0 = self.va / va_mag;

        // Orthonormalize the axis direction against va.
        let axis_raw = self.a.reject(w0);
        let axis_mag = axis_raw.length();
        if axis_mag == 0.0 {
            return Intersection::NoIntersection;
        }
        let axis = axis_raw / axis_mag;

        let center = self.v + self.va;
        let w2 = p - center;

        // The circle equation in the plane perpendicular to the axis.
        let d_perp = d.reject(axis);
        let w4 = w2.reject(axis);

        let a = d_perp.dot(d_perp);
        let b = 2.0 * d_perp.dot(w4);
        let c = w4.dot(w4) - self.va.dot(self.va);

        let t = match quadratic::solve(a, b, c)
            .and_then(|roots| vertex_side_root(roots, p, d, center, self.va))
        {
            Some(t) => t,
            None => return Intersection::NoIntersection,
        };
        let q = p + d * t;
        let w5 = q - center;

        let radial = w5.reject(axis);
        let radial_mag = radial.length();
        if radial_mag == 0.0 {
            return Intersection::NoIntersection;
        }
        let normal = radial / radial_mag;

        // Extent from the vertex in the axis/tangent plane.
        let offset = w5.reject(w0);
        if offset.length() > self.aperture / 2.0 {
            return Intersection::OutsideAperture;
        }

        Intersection::Hit { point: q, normal }
    }
}

impl Hyperboloid {
    /// Intersects a ray with the vertex sheet of the hyperboloid.
    pub fn intersect(&self, ray: &Ray) -> Intersection {
        let (p, d) = (ray.pos(), ray.dir());

        let a_mag = self.a.length();
        if a_mag == 0.0 {
            return Intersection::NoIntersection;
        }
        let center = self.v + self.a;
        let focus = center - self.a * self.e;
        let axis = -self.a / a_mag;

        // Focus-directrix form: |x - focus| = e * <x - c + a/e, axis>,
        // squared and expanded in t.
        let w3 = p - center + self.a / self.e;
        let w4 = p - focus;
        let e2 = self.e * self.e;
        let d_axis = axis.dot(d);
        let w3_axis = axis.dot(w3);

        let qa = d.dot(d) - e2 * d_axis * d_axis;
        let qb = 2.0 * (d.dot(w4) - e2 * d_axis * w3_axis);
        let qc = w4.dot(w4) - e2 * w3_axis * w3_axis;

        let t = match quadratic::solve(qa, qb, qc)
            .and_then(|roots| vertex_side_root(roots, p, d, center, self.a))
        {
            Some(t) => t,
            None => return Intersection::NoIntersection,
        };
        let q = p + d * t;

        let radial = (q - self.v).reject(axis);
        let r = radial.length();
        let normal = if r == 0.0 {
            axis
        } else {
            // The normal tilts off the axis by the slope of the sheet at
            // radius r; r0 is the asymptotic cone scale.
            let r0 = (a_mag * a_mag * (e2 - 1.0)).sqrt();
            let tilt = (a_mag / r0) * (r / (r0 * r0 + r * r).sqrt());
            let n = axis - (radial / r) * tilt;
            let n_mag = n.length();
            if n_mag == 0.0 {
                return Intersection::NoIntersection;
            }
            n / n_mag
        };

        if r > self.aperture / 2.0 {
            return Intersection::OutsideAperture;
        }

        Intersection::Hit { point: q, normal }
    }
}
