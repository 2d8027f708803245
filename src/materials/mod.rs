//! Wavelength-dependent indices of refraction.
//!
//! Two dispersion models are provided: a six-coefficient power-series
//! polynomial and the three-term Sellmeier formula. Coefficient sets for
//! common optical glasses are exposed as constants and through a by-name
//! lookup. Wavelengths are vacuum wavelengths in meters; the formulas
//! convert to micrometers internally.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::core::Float;

/// Index of refraction from the power series
/// n^2 = a0 + a1 L^2 + a2 L^-2 + a3 L^-4 + a4 L^-6 + a5 L^-8,
/// with L the wavelength in micrometers.
///
/// The coefficient sets shipped here are fitted over 0.3 um to 2.0 um;
/// evaluation outside that band is an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Polynomial {
    pub a: [Float; 6],
}

impl Polynomial {
    /// The index of refraction at the vacuum wavelength `wl` in meters.
    pub fn n(&self, wl: Float) -> Result<Float> {
        if !(0.3e-6..=2.0e-6).contains(&wl) {
            bail!(
                "wavelength {:e} m is outside the fitted dispersion band [0.3 um, 2.0 um]",
                wl
            );
        }

        let l2 = (wl * 1.0e6).powi(2);
        let n2 = self.a[0]
            + self.a[1] * l2
            + self.a[2] / l2
            + self.a[3] / l2.powi(2)
            + self.a[4] / l2.powi(3)
            + self.a[5] / l2.powi(4);
        Ok(n2.sqrt())
    }
}

/// Index of refraction from the Sellmeier formula
/// n^2 = 1 + B1 x/(x - C1) + B2 x/(x - C2) + B3 x/(x - C3),
/// with x the squared wavelength in micrometers.
///
/// No wavelength range is enforced; the caller is responsible for staying
/// clear of the resonance poles at x = Ci.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sellmeier {
    pub b: [Float; 3],
    pub c: [Float; 3],
}

impl Sellmeier {
    /// The index of refraction at the vacuum wavelength `wl` in meters.
    pub fn n(&self, wl: Float) -> Float {
        let x = (wl * 1.0e6).powi(2);
        let n2 = 1.0
            + self.b[0] * x / (x - self.c[0])
            + self.b[1] * x / (x - self.c[1])
            + self.b[2] * x / (x - self.c[2]);
        n2.sqrt()
    }
}

/// A refracting medium consulted per wavelength by the trace driver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Medium {
    /// A dispersion-free index, e.g. vacuum or air.
    Constant(Float),
    Polynomial(Polynomial),
    Sellmeier(Sellmeier),
}

impl Medium {
    /// The index of refraction at the vacuum wavelength `wl` in meters.
    pub fn n(&self, wl: Float) -> Result<Float> {
        match self {
            Medium::Constant(n) => Ok(*n),
            Medium::Polynomial(p) => p.n(wl),
            Medium::Sellmeier(s) => Ok(s.n(wl)),
        }
    }

    /// Looks up a named material from the built-in coefficient tables.
    pub fn from_name(name: &str) -> Option<Medium> {
        match name {
            "air" => Some(AIR),
            "CaF2" => Some(Medium::Polynomial(CAF2)),
            "TSU2" => Some(Medium::Polynomial(TSU2)),
            "TSU4" => Some(Medium::Polynomial(TSU4)),
            "TSU5" => Some(Medium::Polynomial(TSU5)),
            "TSU6" => Some(Medium::Polynomial(TSU6)),
            "TSU7" => Some(Medium::Polynomial(TSU7)),
            "fused silica" => Some(Medium::Polynomial(FUSED_SILICA)),
            "N-BAF10" => Some(Medium::Sellmeier(N_BAF10)),
            "N-SF6" => Some(Medium::Sellmeier(N_SF6)),
            "N-BK7" => Some(Medium::Sellmeier(N_BK7)),
            "SF2" => Some(Medium::Sellmeier(SF2)),
            _ => None,
        }
    }
}

/// Air at standard conditions.
pub const AIR: Medium = Medium::Constant(1.000293);

pub const CAF2: Polynomial = Polynomial {
    a: [
        2.0388472e0,
        -3.2320997e-3,
        6.1568960e-3,
        5.6612714e-5,
        -4.0951444e-9,
        2.2406560e-8,
    ],
};

pub const TSU2: Polynomial = Polynomial {
    a: [
        2.5310795e0,
        -1.0750804e-2,
        1.4091541e-2,
        2.4479041e-4,
        -4.3396907e-6,
        4.2269287e-7,
    ],
};

pub const TSU4: Polynomial = Polynomial {
    a: [
        2.5310397e0,
        -1.0751078e-2,
        1.4089396e-2,
        2.4455705e-4,
        -4.3189009e-6,
        4.2184152e-7,
    ],
};

pub const TSU5: Polynomial = Polynomial {
    a: [
        2.2182723e0,
        -5.2937745e-3,
        8.4751835e-3,
        9.0035648e-5,
        -2.1638749e-7,
        8.8532657e-8,
    ],
};

pub const TSU6: Polynomial = Polynomial {
    a: [
        2.3863743e0,
        -9.2750923e-3,
        1.2963764e-2,
        2.6012532e-4,
        -7.1806739e-6,
        6.4902518e-7,
    ],
};

pub const TSU7: Polynomial = Polynomial {
    a: [
        2.5309288e0,
        -1.0751176e-2,
        1.4087125e-2,
        2.4433615e-4,
        -4.2994607e-6,
        4.2104219e-7,
    ],
};

pub const FUSED_SILICA: Polynomial = Polynomial {
    a: [
        2.1045254e0,
        9.5251763e-3,
        8.5795589e-3,
        1.2770234e-4,
        -2.2841020e-6,
        1.2397250e-7,
    ],
};

pub const N_BAF10: Sellmeier = Sellmeier {
    b: [1.58514950e+00, 1.43559385e-01, 1.08521269e+00],
    c: [9.26681282e-03, 4.24489805e-02, 1.05613573e+02],
};

pub const N_SF6: Sellmeier = Sellmeier {
    b: [1.77931763e+00, 3.38149866e-01, 2.08734474e+00],
    c: [1.33714182e-02, 6.17533621e-02, 1.74017590e+02],
};

pub const N_BK7: Sellmeier = Sellmeier {
    b: [1.03961212e+00, 2.31792344e-01, 1.01046945e+00],
    c: [6.00069867e-03, 2.00179144e-02, 1.03560653e+02],
};

pub const SF2: Sellmeier = Sellmeier {
    b: [1.40301821e+00, 2.31767504e-01, 9.39056586e-01],
    c: [1.05795466e-02, 4.93226978e-02, 1.12405955e+02],
};
