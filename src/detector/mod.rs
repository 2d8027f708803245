//! A flat pixel-grid detector.
//!
//! The detector is described by its vertex and two pixel-axis vectors whose
//! lengths set the pixel pitch. A [Plane] is derived from them so the
//! detector can terminate a trace like any other surface, and impact
//! positions are binned into a 16-bit image buffer.

pub mod fits;

use anyhow::{Result, bail};
use ndarray::Array2;

use crate::core::{Float, math::vec3::Vec3};
use crate::surfaces::Plane;

#[derive(Debug, Clone)]
pub struct Detector {
    v: Vec3,
    vx: Vec3,
    vy: Vec3,
    nx: usize,
    ny: usize,
    image: Array2<u16>,
    plane: Plane,
}

impl Detector {
    /// Creates a detector with `nx` by `ny` pixels and a zeroed image.
    ///
    /// `vx` and `vy` are the pixel axis vectors; they must not be parallel.
    /// The derived plane's normal is along `vx` x `vy` and its aperture,
    /// 2 * (nx |vx| + ny |vy|), conservatively covers the grid.
    pub fn new(v: Vec3, vx: Vec3, vy: Vec3, nx: usize, ny: usize) -> Result<Self> {
        let normal = vx.cross(vy);
        let normal_mag = normal.length();
        if normal_mag == 0.0 {
            bail!("detector pixel axes are parallel or zero");
        }

        let aperture =
            2.0 * (nx as Float * vx.length() + ny as Float * vy.length());
        let plane = Plane {
            v,
            n: normal / normal_mag,
            aperture,
        };

        Ok(Self {
            v,
            vx,
            vy,
            nx,
            ny,
            image: Array2::zeros((ny, nx)),
            plane,
        })
    }

    /// The plane used to intersect rays with the detector.
    pub fn plane(&self) -> Plane {
        self.plane
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    /// The accumulated image, indexed `[row, column]` = `[j, i]`.
    pub fn image(&self) -> &Array2<u16> {
        &self.image
    }

    /// The pixel under a point on the detector plane, or `None` when the
    /// point projects off the grid. The vertex sits at the grid center.
    pub fn pixel_index(&self, pos: Vec3) -> Option<(usize, usize)> {
        let w = pos - self.v;
        let i = (w.dot(self.vx) / self.vx.dot(self.vx)).floor() as i64 + self.nx as i64 / 2;
        let j = (w.dot(self.vy) / self.vy.dot(self.vy)).floor() as i64 + self.ny as i64 / 2;

        if i < 0 || i >= self.nx as i64 || j < 0 || j >= self.ny as i64 {
            return None;
        }
        Some((i as usize, j as usize))
    }

    /// Accumulates `counts` into the pixel under `pos`, saturating at the
    /// 16-bit ceiling. Returns the pixel index, or `None` when the point is
    /// off the grid.
    pub fn expose(&mut self, pos: Vec3, counts: u16) -> Option<(usize, usize)> {
        let (i, j) = self.pixel_index(pos)?;
        self.image[[j, i]] = self.image[[j, i]].saturating_add(counts);
        Some((i, j))
    }

    /// Resets the image to zero.
    pub fn clear(&mut self) {
        self.image.fill(0);
    }
}
