//! A small grating spectrograph bench.
//!
//! A point source at the focus of a parabolic collimator illuminates a
//! plane echelle grating; each ray is split over several orders, with the
//! order appended to its provenance key so every (wavelength, order) pair
//! forms its own spot cluster. A cross-disperser grating with rulings
//! perpendicular to the echelle's then spreads the overlapping orders along
//! the second detector axis, producing the familiar tilted echellogram.

use anyhow::Result;

use crate::{
    Detector, Interaction, Intersection, Paraboloid, Plane, Ray, Stage, Surface, Vec3, cone,
    trace,
};

pub const WAVELENGTHS: [f64; 3] = [500e-9, 550e-9, 600e-9];
pub const COLORS: [[u8; 3]; 3] = [[0, 200, 100], [100, 200, 0], [200, 100, 0]];

/// Full cone angle and angular pitch of the source, in degrees.
pub const CONE_DIAMETER: f64 = 4.0;
pub const CONE_PITCH: f64 = 1.0;

/// Ruling spacing of the echelle grating, in meters.
pub const GRATING_SPACING: f64 = 10.0e-6;

/// Echelle grating vector: perpendicular to the rulings, one ruling spacing
/// long.
pub const GRATING_VECTOR: Vec3 = Vec3::new(0.0, GRATING_SPACING, 0.0);

/// The diffraction orders every ray is split over at the echelle.
pub const ORDERS: [i32; 3] = [1, 2, 3];

/// Ruling spacing of the cross-disperser, in meters.
pub const CROSS_SPACING: f64 = 4.0e-6;

/// Cross-disperser grating vector: rulings perpendicular to the echelle's,
/// so wavelengths spread along z.
pub const CROSS_VECTOR: Vec3 = Vec3::new(0.0, 0.0, CROSS_SPACING);

/// The fixed order the cross-disperser works in.
pub const CROSS_ORDER: i32 = 1;

/// The parabolic collimator, with the source at its focus.
pub fn collimator() -> Paraboloid {
    Paraboloid {
        v: Vec3::new(1.0, 0.0, 0.0),
        f: Vec3::new(-1.0, 0.0, 0.0),
        aperture: 0.2,
    }
}

/// The echelle grating substrate.
pub fn grating() -> Plane {
    Plane {
        v: Vec3::new(-0.5, 0.0, 0.0),
        n: Vec3::new(1.0, 0.0, 0.0),
        aperture: 0.2,
    }
}

/// The cross-disperser substrate, catching the order fan off the echelle.
pub fn cross_disperser() -> Plane {
    Plane {
        v: Vec3::new(0.0, 0.06, 0.0),
        n: Vec3::new(-1.0, 0.0, 0.0),
        aperture: 0.2,
    }
}

/// The detector, centered on the cross-dispersed order fan.
pub fn detector() -> Result<Detector> {
    Detector::new(
        Vec3::new(-0.8, 0.15, 0.11),
        Vec3::new(0.0, 0.0, 40.0e-6),
        Vec3::new(0.0, 40.0e-6, 0.0),
        2048,
        2048,
    )
}

/// One cone of rays per wavelength, all from the collimator focus.
pub fn source_rays() -> Vec<Ray> {
    let mut rays = Vec::new();
    for (wavelength, color) in WAVELENGTHS.into_iter().zip(COLORS) {
        let mut apex = Ray::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), wavelength);
        apex.set_color(color);
        rays.extend(cone(&apex, CONE_DIAMETER, CONE_PITCH));
    }
    rays
}

/// Traces the full bench: collimate, split over the echelle orders,
/// cross-disperse, land on the detector and expose its image.
pub fn run() -> Result<(Vec<Ray>, Detector)> {
    let mut rays = source_rays();

    trace(
        &mut rays,
        &[Stage {
            surface: Surface::Paraboloid(collimator()),
            interaction: Interaction::Reflect,
        }],
    )?;

    // Split every ray over the echelle orders by hand; the staged driver
    // applies a single order, while an echelle observes several at once.
    let substrate = grating();
    let mut fanned = Vec::with_capacity(rays.len() * ORDERS.len());
    for ray in rays.drain(..) {
        let (q, n) = match substrate.intersect(&ray) {
            Intersection::Hit { point, normal } => (point, normal),
            _ => continue,
        };

        for order in ORDERS {
            let mut split = ray.clone();
            split.push_path_key(&order.to_string());
            let wavelength = split.wavelength();
            if split
                .diffract(q, n, GRATING_VECTOR, wavelength, wavelength, order)
                .is_ok()
            {
                fanned.push(split);
            }
        }
    }
    let mut rays = fanned;

    let mut detector = detector()?;
    trace(
        &mut rays,
        &[
            Stage {
                surface: Surface::Plane(cross_disperser()),
                interaction: Interaction::Diffract {
                    grating: CROSS_VECTOR,
                    order: CROSS_ORDER,
                },
            },
            Stage {
                surface: Surface::Plane(detector.plane()),
                interaction: Interaction::Impact,
            },
        ],
    )?;

    for ray in &rays {
        detector.expose(ray.pos(), 100);
    }

    Ok((rays, detector))
}
