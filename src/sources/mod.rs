//! Ray bundle generators.
//!
//! Both generators copy the wavelength and color of the prototype ray onto
//! every emitted ray and seed the provenance key, so that rays born together
//! land in the same spot cluster: a parallel beam is identified by its
//! direction, a cone by its apex position.

use tracing::warn;

use crate::core::{DEG2RAD, Float, PI, math::vec3::Vec3};
use crate::rays::Ray;

/// Formats a provenance key from a vector and a wavelength.
fn provenance_key(v: Vec3, wavelength: Float) -> String {
    format!("{:e}{:e}{:e}{:e}", v.x(), v.y(), v.z(), wavelength)
}

/// An orthonormal pair spanning the plane perpendicular to the unit vector
/// `w`.
///
/// The first basis vector is built from the world axis most perpendicular to
/// `w`, so the construction has no degenerate direction. The particular
/// azimuthal orientation is arbitrary but deterministic.
fn transverse_basis(w: Vec3) -> (Vec3, Vec3) {
    let axes = [
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(0.0, 0.0, 1.0),
    ];
    let seed = axes
        .into_iter()
        .min_by(|a, b| {
            w.dot(*a)
                .abs()
                .partial_cmp(&w.dot(*b).abs())
                .expect("axis projections are finite")
        })
        .expect("axes is non-empty");

    let u0 = seed.reject(w).normalize();
    let u1 = w.cross(u0);
    (u0, u1)
}

/// Creates a circular beam of parallel rays centered on the ray `axis`.
///
/// One ray is emitted per lattice point (i * s, j * s) in the transverse
/// plane with i^2 + j^2 <= (D/2)^2, where `beam_dia` = D is the beam
/// diameter and `beam_step` = s the ray pitch, both in meters. Every ray
/// travels along the axis direction.
///
/// A null axis direction emits no rays.
pub fn beam(axis: &Ray, beam_dia: Float, beam_step: Float) -> Vec<Ray> {
    let speed = axis.dir().length();
    if speed == 0.0 {
        warn!("beam axis has a null direction; no rays emitted");
        return Vec::new();
    }
    let w = axis.dir() / speed;
    let (u0, u1) = transverse_basis(w);

    let key = provenance_key(axis.dir(), axis.wavelength());

    // Upper bound on the lattice population from the Gauss circle problem.
    let half = beam_dia / 2.0;
    let r_over_s = half / beam_step;
    let capacity = (PI * r_over_s * r_over_s + 9.0 * r_over_s).ceil() as usize;
    let mut rays = Vec::with_capacity(capacity);

    let n = r_over_s.floor() as i64;
    for i in -n..=n {
        for j in -n..=n {
            let x = i as Float * beam_step;
            let y = j as Float * beam_step;
            if x * x + y * y > half * half {
                continue;
            }

            let mut ray = Ray::new(axis.pos() + u0 * x + u1 * y, axis.dir(), axis.wavelength());
            ray.set_color(axis.color());
            ray.set_path_key(key.clone());
            rays.push(ray);
        }
    }
    rays
}

/// Creates a cone of rays opening around the ray `apex`.
///
/// `cone_dia` is the full opening angle of the cone and `cone_step` the
/// angular pitch, both in degrees. The axial ray is emitted first; each
/// shell j at polar angle j * step then carries floor(sin(theta) * 360 /
/// step) rays equally spaced in azimuth. All rays start at the apex
/// position and keep the magnitude of the apex direction.
///
/// A null apex direction emits no rays.
pub fn cone(apex: &Ray, cone_dia: Float, cone_step: Float) -> Vec<Ray> {
    let speed = apex.dir().length();
    if speed == 0.0 {
        warn!("cone apex has a null direction; no rays emitted");
        return Vec::new();
    }
    let w = apex.dir() / speed;

    let key = provenance_key(apex.pos(), apex.wavelength());

    let mut rays = Vec::new();
    let mut axial = apex.clone();
    axial.set_path_key(key.clone());
    rays.push(axial);

    // Frame perpendicular to the apex direction, from its spherical angles.
    let azimuth = w.y().atan2(w.x());
    let elevation = w.z().clamp(-1.0, 1.0).asin();
    let e1 = Vec3::new(azimuth.sin(), -azimuth.cos(), 0.0);
    let e2 = Vec3::new(
        azimuth.cos() * elevation.sin(),
        azimuth.sin() * elevation.sin(),
        -elevation.cos(),
    );

    let shells = ((cone_dia / 2.0) / cone_step).floor() as i32;
    for j in 1..=shells {
        let theta = (j as Float) * cone_step * DEG2RAD;
        let in_shell = (theta.sin() * 360.0 / cone_step).floor() as i32;
        for k in 0..in_shell {
            let phi = (k as Float) * (2.0 * PI / in_shell as Float);

            let dir = (e1 * (theta.sin() * phi.cos())
                + e2 * (theta.sin() * phi.sin())
                + w * theta.cos())
                * speed;

            let mut ray = Ray::new(apex.pos(), dir, apex.wavelength());
            ray.set_color(apex.color());
            ray.set_path_key(key.clone());
            rays.push(ray);
        }
    }
    rays
}

#[cfg(test)]
mod test {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn prototype(pos: Vec3, dir: Vec3) -> Ray {
        let mut ray = Ray::new(pos, dir, 632.8e-9);
        ray.set_color([200, 40, 0]);
        ray
    }

    #[test]
    fn test_beam_unit_lattice_in_unit_circle() {
        let axis = prototype(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
        let rays = beam(&axis, 2.0, 1.0);

        // Center plus the four on-axis boundary points; the corners fall
        // outside the circle.
        assert_eq!(rays.len(), 5);
    }

    #[test]
    fn test_beam_rays_are_parallel_and_transverse() {
        let axis = prototype(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.3, -0.4, 0.5));
        let rays = beam(&axis, 0.1, 0.01);

        assert!(!rays.is_empty());
        for ray in &rays {
            assert_eq!(ray.dir(), axis.dir());
            assert_eq!(ray.wavelength(), axis.wavelength());
            assert_eq!(ray.color(), axis.color());

            let offset = ray.pos() - axis.pos();
            assert_abs_diff_eq!(offset.dot(axis.dir()), 0.0, epsilon = 1e-12);
            assert!(offset.length() <= 0.05 + 1e-12);
        }
    }

    #[test]
    fn test_beam_along_every_world_axis() {
        // The transverse basis must not degenerate for any axis direction.
        for dir in [
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, -1.0),
        ] {
            let axis = prototype(Vec3::new(0.0, 0.0, 0.0), dir);
            let rays = beam(&axis, 2.0, 1.0);
            assert_eq!(rays.len(), 5, "direction {:?}", dir);
            for ray in &rays {
                assert!(ray.pos().x().is_finite());
            }
        }
    }

    #[test]
    fn test_beam_shares_one_path_key() {
        let axis = prototype(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
        let rays = beam(&axis, 2.0, 1.0);

        let key = rays[0].path_key();
        assert!(!key.is_empty());
        assert!(rays.iter().all(|r| r.path_key() == key));
    }

    #[test]
    fn test_beam_null_direction_emits_nothing() {
        let axis = prototype(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 0.0));
        assert!(beam(&axis, 2.0, 1.0).is_empty());
    }

    #[test]
    fn test_cone_ray_count() {
        // 20 degree cone at 2 degree pitch: five shells carrying
        // floor(sin(2j deg) * 180) rays each, plus the axial ray:
        // 1 + 6 + 12 + 18 + 25 + 31.
        let apex = prototype(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let rays = cone(&apex, 20.0, 2.0);

        assert_eq!(rays.len(), 93);
    }

    #[test]
    fn test_cone_axial_ray_comes_first() {
        let apex = prototype(Vec3::new(1.0, 1.0, 1.0), Vec3::new(0.0, 1.0, 0.0));
        let rays = cone(&apex, 10.0, 2.0);

        assert_eq!(rays[0].pos(), apex.pos());
        assert_eq!(rays[0].dir(), apex.dir());
    }

    #[test]
    fn test_cone_directions_stay_on_their_shells() {
        let apex = prototype(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let speed = apex.dir().length();
        let rays = cone(&apex, 20.0, 2.0);

        for ray in &rays {
            assert_eq!(ray.pos(), apex.pos());
            assert_abs_diff_eq!(ray.dir().length(), speed, epsilon = 1e-12);

            // Every direction lies within the half-cone angle, on a shell at
            // a multiple of the pitch.
            let cos_theta = ray.dir().dot(apex.dir()) / (speed * speed);
            let theta_deg = cos_theta.clamp(-1.0, 1.0).acos() / DEG2RAD;
            assert!(theta_deg <= 10.0 + 1e-9);
            let shell = theta_deg / 2.0;
            assert_abs_diff_eq!(shell, shell.round(), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_cone_scales_with_apex_speed() {
        let apex = prototype(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 2.5));
        let rays = cone(&apex, 10.0, 2.0);

        assert!(rays.len() > 1);
        for ray in &rays {
            assert_abs_diff_eq!(ray.dir().length(), 2.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_cone_null_direction_emits_nothing() {
        let apex = prototype(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 0.0));
        assert!(cone(&apex, 10.0, 2.0).is_empty());
    }

    #[test]
    fn test_cone_and_beam_key_on_different_provenance() {
        // A cone is identified by its apex position, a beam by its
        // direction: two cones from one point share a key, two parallel
        // beams from different points share a key.
        let apex = prototype(Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let tilted = prototype(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(
            cone(&apex, 4.0, 2.0)[0].path_key(),
            cone(&tilted, 4.0, 2.0)[0].path_key()
        );

        let here = prototype(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
        let there = prototype(Vec3::new(5.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(
            beam(&here, 2.0, 1.0)[0].path_key(),
            beam(&there, 2.0, 1.0)[0].path_key()
        );
    }
}
