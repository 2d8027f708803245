//! Spot-size statistics over traced rays.
//!
//! Rays carrying the same provenance key came from the same source bundle
//! and took the same sequence of interactions; after a trace their positions
//! form one spot on the focal surface. The reduction here measures each
//! spot's centroid and RMS extent.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::{Float, math::vec3::Vec3};
use crate::rays::Ray;

/// The statistics of one spot cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotSize {
    /// The provenance key shared by the cluster's rays.
    pub path_key: String,
    /// Number of rays in the cluster.
    pub count: usize,
    /// Mean ray position.
    pub centroid: Vec3,
    /// RMS deviation from the centroid along each axis.
    pub rms_axes: Vec3,
    /// Scalar RMS distance from the centroid.
    pub rms: Float,
}

/// Aggregate statistics over all non-singleton clusters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotAggregate {
    /// Number of clusters with at least two rays.
    pub clusters: usize,
    /// Mean of the per-axis RMS deviations.
    pub mean_rms_axes: Vec3,
    /// Mean of the scalar RMS deviations.
    pub mean_rms: Float,
}

/// Clusters rays by provenance key and computes per-cluster statistics.
///
/// The result is sorted by key. Singleton clusters are included with zero
/// RMS; [aggregate] skips them.
pub fn spot_sizes(rays: &[Ray]) -> Vec<SpotSize> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut sums: Vec<(Vec3, usize)> = Vec::new();

    for ray in rays {
        match index.get(ray.path_key()) {
            Some(&i) => {
                sums[i].0 += ray.pos();
                sums[i].1 += 1;
            }
            None => {
                index.insert(ray.path_key(), sums.len());
                sums.push((ray.pos(), 1));
            }
        }
    }

    let centroids: Vec<Vec3> = sums
        .iter()
        .map(|(sum, n)| *sum / *n as Float)
        .collect();

    // Second pass: sums of squared deviations about each centroid.
    let mut sq_sums: Vec<(Vec3, Float)> = vec![(Vec3::new(0.0, 0.0, 0.0), 0.0); sums.len()];
    for ray in rays {
        let i = index[ray.path_key()];
        let dev = ray.pos() - centroids[i];
        sq_sums[i].0 += Vec3::new(dev.x() * dev.x(), dev.y() * dev.y(), dev.z() * dev.z());
        sq_sums[i].1 += dev.dot(dev);
    }

    let mut spots: Vec<SpotSize> = index
        .into_iter()
        .map(|(key, i)| {
            let n = sums[i].1 as Float;
            let (sq_axes, sq) = sq_sums[i];
            SpotSize {
                path_key: key.to_string(),
                count: sums[i].1,
                centroid: centroids[i],
                rms_axes: Vec3::new(
                    (sq_axes.x() / n).sqrt(),
                    (sq_axes.y() / n).sqrt(),
                    (sq_axes.z() / n).sqrt(),
                ),
                rms: (sq / n).sqrt(),
            }
        })
        .collect();

    spots.sort_by(|a, b| a.path_key.cmp(&b.path_key));
    spots
}

/// Averages the RMS figures over clusters with two or more rays.
///
/// Returns `None` when every cluster is a singleton.
pub fn aggregate(spots: &[SpotSize]) -> Option<SpotAggregate> {
    let multi: Vec<&SpotSize> = spots.iter().filter(|s| s.count >= 2).collect();
    if multi.is_empty() {
        return None;
    }

    let n = multi.len() as Float;
    let mut mean_rms_axes = Vec3::new(0.0, 0.0, 0.0);
    let mut mean_rms = 0.0;
    for spot in &multi {
        mean_rms_axes += spot.rms_axes / n;
        mean_rms += spot.rms / n;
    }

    Some(SpotAggregate {
        clusters: multi.len(),
        mean_rms_axes,
        mean_rms,
    })
}
