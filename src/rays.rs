//! Light rays and the surface interactions that redirect them.
//!
//! A [Ray] is mutated in place as it walks an optical system: an
//! intersection routine produces the hit point and unit surface normal,
//! then one of the redirections below moves the ray to the hit point and
//! rotates its direction. The direction vector is not required to be unit;
//! its magnitude is preserved by every redirection.

use serde::{Deserialize, Serialize};

use crate::core::{Float, math::vec3::Vec3};

/// Maximum length of a provenance key, in bytes.
pub const PATH_KEY_MAX: usize = 80;

/// Why a ray could not be redirected at a surface.
///
/// These are per-ray outcomes, not configuration errors: the trace driver
/// responds by dropping the ray and moving on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectError {
    /// Refraction is impossible at this interface for this angle.
    TotalInternalReflection,
    /// Grazing incidence, a ray parallel to the grating rulings, a grating
    /// vector normal to the surface, or an order with no physical solution.
    InvalidDiffraction,
    /// The ray direction or the supplied surface normal has zero length.
    ZeroDirection,
}

impl std::fmt::Display for RedirectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TotalInternalReflection => write!(f, "total internal reflection"),
            Self::InvalidDiffraction => write!(f, "no valid diffracted direction"),
            Self::ZeroDirection => write!(f, "zero-length direction vector"),
        }
    }
}

impl std::error::Error for RedirectError {}

/// A single ray to be traced through an optical system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ray {
    pos: Vec3,
    dir: Vec3,
    wavelength: Float,
    color: [u8; 3],
    path_key: String,
}

impl Ray {
    /// Creates a ray at `pos` travelling along `dir` with the given vacuum
    /// wavelength in meters.
    pub fn new(pos: Vec3, dir: Vec3, wavelength: Float) -> Self {
        Self {
            pos,
            dir,
            wavelength,
            color: [255, 255, 255],
            path_key: String::new(),
        }
    }

    pub fn pos(&self) -> Vec3 {
        self.pos
    }

    pub fn dir(&self) -> Vec3 {
        self.dir
    }

    pub fn wavelength(&self) -> Float {
        self.wavelength
    }

    pub fn color(&self) -> [u8; 3] {
        self.color
    }

    pub fn set_color(&mut self, color: [u8; 3]) {
        self.color = color;
    }

    pub fn set_wavelength(&mut self, wavelength: Float) {
        self.wavelength = wavelength;
    }

    /// The provenance key: rays emitted together by a source generator share
    /// it, and spot statistics cluster on it.
    pub fn path_key(&self) -> &str {
        &self.path_key
    }

    pub(crate) fn set_path_key(&mut self, key: String) {
        self.path_key = key;
        self.truncate_path_key();
    }

    /// Appends a tag to the provenance key, e.g. a grating order, so that
    /// rays split at a surface land in separate spot clusters.
    ///
    /// The key is capped at [PATH_KEY_MAX] bytes; anything beyond is
    /// silently discarded.
    pub fn push_path_key(&mut self, tag: &str) {
        self.path_key.push_str(tag);
        self.truncate_path_key();
    }

    fn truncate_path_key(&mut self) {
        if self.path_key.len() > PATH_KEY_MAX {
            let mut end = PATH_KEY_MAX;
            while !self.path_key.is_char_boundary(end) {
                end -= 1;
            }
            self.path_key.truncate(end);
        }
    }

    /// Reflects the ray at the hit point `q` about the unit normal `n`.
    ///
    /// The direction magnitude is preserved.
    pub fn reflect(&mut self, q: Vec3, n: Vec3) {
        self.pos = q;
        self.dir = self.dir - n * (2.0 * self.dir.dot(n));
    }

    /// Refracts the ray at the hit point `q`.
    ///
    /// `n` is the unit surface normal and `m` the ratio of the incident
    /// medium's index of refraction to the transmission medium's. The normal
    /// may point to either side of the surface; it is oriented against the
    /// ray internally. The direction magnitude is preserved.
    pub fn refract(&mut self, q: Vec3, n: Vec3, m: Float) -> Result<(), RedirectError> {
        self.pos = q;

        let speed = self.dir.length();
        if speed == 0.0 {
            return Err(RedirectError::ZeroDirection);
        }
        let u = -self.dir / speed;

        // Orient the normal toward the incident side.
        let n = if u.dot(n) < 0.0 { -n } else { n };

        let w = u.cross(n);
        let sin_incidence = w.length();
        let sin_transmission = m * sin_incidence;
        if sin_transmission.abs() >= 1.0 {
            return Err(RedirectError::TotalInternalReflection);
        }
        let theta_t = sin_transmission.asin();

        if sin_incidence > 0.0 {
            // v spans the in-plane transverse direction on the far side.
            let v = (w / sin_incidence).cross(n);
            self.dir = (-n * theta_t.cos() + v * theta_t.sin()) * speed;
        } else {
            // Normal incidence: straight through.
            self.dir = -n * speed;
        }
        Ok(())
    }

    /// Diffracts the ray off a grating at the hit point `q`.
    ///
    /// `n` is the surface normal (normalized internally). `a` is the grating
    /// vector: perpendicular to the rulings, with magnitude equal to the
    /// ruling spacing; it need not lie in the surface plane, and its
    /// projection onto the plane sets the effective spacing. `wl_incident`
    /// and `wl_out` are the incident and outgoing wavelengths in meters
    /// (equal for a reflection grating), and `order` selects the diffraction
    /// lobe.
    ///
    /// The outgoing ray leaves on the side the normal points to: a ray
    /// arriving against `n` is sent back (reflection grating), a ray
    /// arriving along `n` continues through (transmission grating). The
    /// direction magnitude is preserved.
    pub fn diffract(
        &mut self,
        q: Vec3,
        n: Vec3,
        a: Vec3,
        wl_incident: Float,
        wl_out: Float,
        order: i32,
    ) -> Result<(), RedirectError> {
        self.pos = q;

        let n_mag = n.length();
        if n_mag == 0.0 {
            return Err(RedirectError::ZeroDirection);
        }
        let n = n / n_mag;

        let speed = self.dir.length();
        if speed == 0.0 {
            return Err(RedirectError::ZeroDirection);
        }
        let w0 = self.dir / speed;

        // Effective grating geometry in the surface plane.
        let a_plane = a.reject(n);
        let spacing = a_plane.length();
        if spacing == 0.0 {
            return Err(RedirectError::InvalidDiffraction);
        }
        let a_hat = a_plane / spacing;
        let t_hat = a_hat.cross(n);

        let alpha = w0.dot(n);
        let beta = w0.dot(a_hat);
        let gamma = w0.dot(t_hat); // ruling-parallel component, preserved

        if alpha == 0.0 {
            return Err(RedirectError::InvalidDiffraction);
        }
        let one_minus_g2 = 1.0 - gamma * gamma;
        if one_minus_g2 <= 0.0 {
            return Err(RedirectError::InvalidDiffraction);
        }

        // Work in the plane perpendicular to the rulings; the projection
        // stretches wavelengths by 1/sqrt(1 - gamma^2).
        let k = 1.0 / one_minus_g2.sqrt();
        let wli = wl_incident * k;
        let wlo = wl_out * k;

        let phi_i = beta.atan2(-alpha);
        let s = (phi_i.sin() / wli + Float::from(order) / spacing) * wlo;
        if s.abs() >= 1.0 {
            return Err(RedirectError::InvalidDiffraction);
        }
        let phi_o = s.asin();

        let out = t_hat * gamma + n * (phi_o.cos() / k) + a_hat * (phi_o.sin() / k);
        self.dir = out * speed;
        Ok(())
    }

    /// Terminates the ray's flight at the hit point `q`, e.g. on a detector.
    /// The direction is left unchanged.
    pub fn impact(&mut self, q: Vec3) {
        self.pos = q;
    }
}
