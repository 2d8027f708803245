//! The staged trace driver.
//!
//! A trace is an ordered list of stages, each pairing a surface with the
//! interaction to apply there. The driver walks the ray collection through
//! every stage in order: rays that miss a surface, strike it outside the
//! aperture, or cannot be redirected are dropped; survivors are mutated in
//! place. The caller supplies the stage order; no occlusion or visibility
//! testing is performed.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::math::vec3::Vec3;
use crate::materials::Medium;
use crate::rays::Ray;
use crate::surfaces::{Intersection, Surface};

/// What happens to a ray at a stage's surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Interaction {
    /// Mirror reflection.
    Reflect,
    /// Refraction between two media; the index ratio is evaluated at each
    /// ray's wavelength.
    Refract { incident: Medium, transmitted: Medium },
    /// Grating diffraction at a fixed order. The outgoing wavelength equals
    /// the incident one.
    Diffract { grating: Vec3, order: i32 },
    /// Terminal impact, e.g. on a detector plane.
    Impact,
}

/// One step of an ordered trace: a surface and the interaction on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stage {
    pub surface: Surface,
    pub interaction: Interaction,
}

/// A line segment from a ray's previous position to a surface hit, for 3D
/// rendering of the trace.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Segment {
    pub start: Vec3,
    pub end: Vec3,
    pub color: [u8; 3],
}

/// What a trace pass produced besides the surviving rays.
#[derive(Debug, Default)]
pub struct TraceResults {
    /// One segment per surface hit, in trace order.
    pub segments: Vec<Segment>,
    /// Number of rays dropped across all stages.
    pub dropped: usize,
}

/// Traces the ray collection through the stages in order.
///
/// Rays are mutated in place; dropped rays are removed from the collection.
/// A dispersion lookup failure aborts the whole trace, since it means the
/// system was configured with a material outside its valid band.
pub fn trace(rays: &mut Vec<Ray>, stages: &[Stage]) -> Result<TraceResults> {
    let mut results = TraceResults::default();

    for (stage_id, stage) in stages.iter().enumerate() {
        let mut survivors = Vec::with_capacity(rays.len());

        for mut ray in rays.drain(..) {
            let (point, normal) = match stage.surface.intersect(&ray) {
                Intersection::Hit { point, normal } => (point, normal),
                Intersection::OutsideAperture => {
                    debug!(stage = stage_id, "ray dropped: outside aperture");
                    results.dropped += 1;
                    continue;
                }
                Intersection::NoIntersection => {
                    debug!(stage = stage_id, "ray dropped: no intersection");
                    results.dropped += 1;
                    continue;
                }
            };

            results.segments.push(Segment {
                start: ray.pos(),
                end: point,
                color: ray.color(),
            });

            let redirected = match &stage.interaction {
                Interaction::Reflect => {
                    ray.reflect(point, normal);
                    Ok(())
                }
                Interaction::Refract {
                    incident,
                    transmitted,
                } => {
                    let m = incident.n(ray.wavelength())? / transmitted.n(ray.wavelength())?;
                    ray.refract(point, normal, m)
                }
                Interaction::Diffract { grating, order } => {
                    let wl = ray.wavelength();
                    ray.diffract(point, normal, *grating, wl, wl, *order)
                }
                Interaction::Impact => {
                    ray.impact(point);
                    Ok(())
                }
            };

            match redirected {
                Ok(()) => survivors.push(ray),
                Err(reason) => {
                    debug!(stage = stage_id, %reason, "ray dropped");
                    results.dropped += 1;
                }
            }
        }

        *rays = survivors;
    }

    Ok(results)
}

#[cfg(test)]
mod test {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::materials::AIR;
    use crate::sources;
    use crate::surfaces::Plane;

    fn mirror_at(x: f64, aperture: f64) -> Surface {
        Surface::Plane(Plane {
            v: Vec3::new(x, 0.0, 0.0),
            n: Vec3::new(1.0, 0.0, 0.0),
            aperture,
        })
    }

    #[test]
    fn test_reflect_then_impact() {
        let axis = Ray::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), 500e-9);
        let mut rays = sources::beam(&axis, 2.0, 1.0);
        let count = rays.len();

        let stages = vec![
            Stage {
                surface: mirror_at(0.0, 10.0),
                interaction: Interaction::Reflect,
            },
            Stage {
                surface: mirror_at(-2.0, 10.0),
                interaction: Interaction::Impact,
            },
        ];

        let results = trace(&mut rays, &stages).unwrap();

        assert_eq!(rays.len(), count);
        assert_eq!(results.dropped, 0);
        // One segment per ray per stage.
        assert_eq!(results.segments.len(), 2 * count);
        for ray in &rays {
            assert_abs_diff_eq!(ray.pos().x(), -2.0, epsilon = 1e-12);
            assert_eq!(ray.dir(), Vec3::new(-1.0, 0.0, 0.0));
        }
    }

    #[test]
    fn test_rays_outside_the_aperture_are_dropped() {
        let axis = Ray::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), 500e-9);
        let mut rays = sources::beam(&axis, 2.0, 1.0);
        let count = rays.len();

        // Tight aperture: only the axial ray survives.
        let stages = vec![Stage {
            surface: mirror_at(0.0, 0.5),
            interaction: Interaction::Impact,
        }];

        let results = trace(&mut rays, &stages).unwrap();

        assert_eq!(rays.len(), 1);
        assert_eq!(results.dropped, count - 1);
        assert_eq!(results.segments.len(), 1);
    }

    #[test]
    fn test_refract_stage_bends_rays() {
        let mut rays = vec![Ray::new(
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            500e-9,
        )];

        let stages = vec![Stage {
            surface: mirror_at(0.0, 10.0),
            interaction: Interaction::Refract {
                incident: AIR,
                transmitted: Medium::Constant(1.5),
            },
        }];

        trace(&mut rays, &stages).unwrap();

        assert_eq!(rays.len(), 1);
        let dir = rays[0].dir();
        // Bent toward the normal, still moving in +x.
        let sin_out = dir.y().abs() / dir.length();
        let sin_in = (0.5_f64).sqrt();
        assert!(dir.x() > 0.0);
        assert_abs_diff_eq!(sin_out, sin_in * 1.000293 / 1.5, epsilon = 1e-9);
    }

    #[test]
    fn test_unreachable_diffraction_order_drops_the_ray() {
        let mut rays = vec![Ray::new(
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            500e-9,
        )];

        let stages = vec![Stage {
            surface: mirror_at(0.0, 10.0),
            interaction: Interaction::Diffract {
                grating: Vec3::new(0.0, 1.0e-6, 0.0),
                order: 3,
            },
        }];

        let results = trace(&mut rays, &stages).unwrap();

        assert!(rays.is_empty());
        assert_eq!(results.dropped, 1);
        // The hit itself was still recorded.
        assert_eq!(results.segments.len(), 1);
    }

    #[test]
    fn test_out_of_band_dispersion_aborts_the_trace() {
        // 10 um is outside the polynomial fit band.
        let mut rays = vec![Ray::new(
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            10.0e-6,
        )];

        let stages = vec![Stage {
            surface: mirror_at(0.0, 10.0),
            interaction: Interaction::Refract {
                incident: AIR,
                transmitted: Medium::Polynomial(crate::materials::FUSED_SILICA),
            },
        }];

        assert!(trace(&mut rays, &stages).is_err());
    }
}
