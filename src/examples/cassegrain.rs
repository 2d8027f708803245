//! A 2 m Cassegrain telescope with a refractive relay.
//!
//! A parabolic primary and a convex hyperbolic secondary share a focus; the
//! secondary reimages it through a BK7 field lens and a beamsplitter cube
//! onto a 1000 x 1000 detector with 4 um pixels. The incoming starlight is
//! modeled as parallel beams at three wavelengths with the central
//! obstruction of the secondary removed.

use anyhow::Result;

use crate::{
    AIR, Detector, Hyperboloid, Interaction, Medium, N_BK7, Paraboloid, Plane, Ray, Sphere,
    Stage, Surface, Vec3, beam,
};

pub const WAVELENGTHS: [f64; 3] = [800e-9, 600e-9, 400e-9];
pub const COLORS: [[u8; 3]; 3] = [[200, 40, 0], [40, 200, 0], [0, 40, 200]];

/// Beam diameter and ray pitch of the incoming starlight, in meters.
pub const BEAM_DIAMETER: f64 = 2.1;
pub const BEAM_PITCH: f64 = 0.07;

/// Radius of the shadow of the secondary mirror.
pub const CENTRAL_HOLE_RADIUS: f64 = 0.254;

/// Where the relayed focus lands.
pub const FOCAL_PLANE: Vec3 = Vec3::new(0.420, 0.0, 0.0);

const NBK7: Medium = Medium::Sellmeier(N_BK7);

/// The focal-plane detector.
pub fn detector() -> Result<Detector> {
    Detector::new(
        FOCAL_PLANE,
        Vec3::new(0.0, 0.0, -4.0e-6),
        Vec3::new(0.0, 4.0e-6, 0.0),
        1000,
        1000,
    )
}

/// The staged surface sequence, ending in an impact on the detector plane.
pub fn stages(detector: &Detector) -> Vec<Stage> {
    let primary = Paraboloid {
        v: Vec3::new(0.0, 0.0, 0.0),
        f: Vec3::new(3.0432, 0.0, 0.0),
        aperture: 2.0,
    };
    let secondary = Hyperboloid {
        v: Vec3::new(2.6314 + 0.3e-3, 0.0, 0.0),
        a: Vec3::new(-0.9007, 0.0, 0.0),
        e: 1.4577,
        aperture: 0.279,
    };
    let field_lens_front = Plane {
        v: Vec3::new(0.420 + 66.0e-3, 0.0, 0.0),
        n: Vec3::new(1.0, 0.0, 0.0),
        aperture: 50.0e-3,
    };
    let field_lens_back = Sphere {
        v: Vec3::new(0.420 + 63.0e-3, 0.0, 0.0),
        vr: Vec3::new(-100.0e-3, 0.0, 0.0),
        aperture: 50.0e-3,
    };
    let cube_front = Plane {
        v: Vec3::new(0.420 + 45.0e-3, 0.0, 0.0),
        n: Vec3::new(1.0, 0.0, 0.0),
        aperture: 30.0e-3,
    };
    let cube_back = Plane {
        v: Vec3::new(0.420 + 15.0e-3, 0.0, 0.0),
        n: Vec3::new(1.0, 0.0, 0.0),
        aperture: 30.0e-3,
    };

    vec![
        Stage {
            surface: Surface::Paraboloid(primary),
            interaction: Interaction::Reflect,
        },
        Stage {
            surface: Surface::Hyperboloid(secondary),
            interaction: Interaction::Reflect,
        },
        Stage {
            surface: Surface::Plane(field_lens_front),
            interaction: Interaction::Refract {
                incident: AIR,
                transmitted: NBK7,
            },
        },
        Stage {
            surface: Surface::Sphere(field_lens_back),
            interaction: Interaction::Refract {
                incident: NBK7,
                transmitted: AIR,
            },
        },
        Stage {
            surface: Surface::Plane(cube_front),
            interaction: Interaction::Refract {
                incident: AIR,
                transmitted: NBK7,
            },
        },
        Stage {
            surface: Surface::Plane(cube_back),
            interaction: Interaction::Refract {
                incident: NBK7,
                transmitted: AIR,
            },
        },
        Stage {
            surface: Surface::Plane(detector.plane()),
            interaction: Interaction::Impact,
        },
    ]
}

/// The incoming starlight: one parallel beam per wavelength, with the
/// central obstruction removed.
pub fn source_rays() -> Vec<Ray> {
    let mut rays = Vec::new();
    for (wavelength, color) in WAVELENGTHS.into_iter().zip(COLORS) {
        let mut axis = Ray::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0), wavelength);
        axis.set_color(color);
        rays.extend(beam(&axis, BEAM_DIAMETER, BEAM_PITCH));
    }

    rays.retain(|ray| ray.pos().y().hypot(ray.pos().z()) >= CENTRAL_HOLE_RADIUS);
    rays
}
