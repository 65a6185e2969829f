//! K-means quantization (Lloyd's algorithm).
//!
//! Seeding is deterministic: unique colors are sorted by HSL lightness (ties
//! by packed RGBA value) and centroids start at evenly spaced samples of that
//! list, so identical inputs always converge identically. The assignment
//! phase fans out over unique colors with rayon; centroid recomputation
//! serializes between iterations.

use image::Rgba;
use rayon::prelude::*;

use super::WeightedColor;
use crate::color::rgb_to_hsl;

/// Iteration cap; Lloyd's converges long before this on pixel data.
const MAX_ITERATIONS: usize = 32;
/// Stop once no centroid moves further than this (Euclidean, channel units).
const CONVERGENCE_EPSILON: f64 = 0.5;

/// Run k-means over weighted colors, producing at most `target` entries.
pub fn palette(colors: &[WeightedColor], target: usize) -> Vec<Rgba<u8>> {
    if colors.is_empty() || target == 0 {
        return Vec::new();
    }
    let k = target.min(colors.len());
    let mut centroids = seed_centroids(colors, k);

    for _ in 0..MAX_ITERATIONS {
        let assignments = assign(colors, &centroids);

        let mut sums = vec![[0f64; 3]; k];
        let mut weights = vec![0f64; k];
        for (&(color, count), &cluster) in colors.iter().zip(&assignments) {
            let w = f64::from(count);
            for ch in 0..3 {
                sums[cluster][ch] += f64::from(color.0[ch]) * w;
            }
            weights[cluster] += w;
        }

        let mut movement: f64 = 0.0;
        let mut reseeded = false;
        for cluster in 0..k {
            if weights[cluster] == 0.0 {
                // Empty cluster: restart it at the point farthest from every
                // current centroid
                centroids[cluster] = farthest_point(colors, &centroids);
                reseeded = true;
                continue;
            }
            let next = [
                sums[cluster][0] / weights[cluster],
                sums[cluster][1] / weights[cluster],
                sums[cluster][2] / weights[cluster],
            ];
            movement = movement.max(euclidean(centroids[cluster], next));
            centroids[cluster] = next;
        }

        if !reseeded && movement < CONVERGENCE_EPSILON {
            break;
        }
    }

    let mut result: Vec<Rgba<u8>> = Vec::with_capacity(k);
    for centroid in centroids {
        let color = Rgba([
            centroid[0].round().clamp(0.0, 255.0) as u8,
            centroid[1].round().clamp(0.0, 255.0) as u8,
            centroid[2].round().clamp(0.0, 255.0) as u8,
            255,
        ]);
        if !result.contains(&color) {
            result.push(color);
        }
    }
    result
}

/// Evenly spaced samples of the lightness-sorted unique color list.
fn seed_centroids(colors: &[WeightedColor], k: usize) -> Vec<[f64; 3]> {
    let mut order: Vec<Rgba<u8>> = colors.iter().map(|&(c, _)| c).collect();
    order.sort_unstable_by(|a, b| {
        let la = rgb_to_hsl(a.0[0], a.0[1], a.0[2]).2;
        let lb = rgb_to_hsl(b.0[0], b.0[1], b.0[2]).2;
        la.partial_cmp(&lb)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| u32::from_be_bytes(a.0).cmp(&u32::from_be_bytes(b.0)))
    });

    (0..k)
        .map(|i| {
            let idx = if k == 1 { order.len() / 2 } else { i * (order.len() - 1) / (k - 1) };
            let c = order[idx];
            [f64::from(c.0[0]), f64::from(c.0[1]), f64::from(c.0[2])]
        })
        .collect()
}

/// Nearest-centroid assignment for every unique color, in parallel.
fn assign(colors: &[WeightedColor], centroids: &[[f64; 3]]) -> Vec<usize> {
    colors
        .par_iter()
        .map(|&(color, _)| {
            let point =
                [f64::from(color.0[0]), f64::from(color.0[1]), f64::from(color.0[2])];
            let mut best = 0;
            let mut best_dist = f64::MAX;
            for (i, centroid) in centroids.iter().enumerate() {
                let d = euclidean(point, *centroid);
                if d < best_dist {
                    best = i;
                    best_dist = d;
                }
            }
            best
        })
        .collect()
}

/// The unique color maximizing its distance to the nearest current centroid.
fn farthest_point(colors: &[WeightedColor], centroids: &[[f64; 3]]) -> [f64; 3] {
    let mut best = [0f64; 3];
    let mut best_dist = -1.0;
    for &(color, _) in colors {
        let point = [f64::from(color.0[0]), f64::from(color.0[1]), f64::from(color.0[2])];
        let nearest = centroids
            .iter()
            .map(|c| euclidean(point, *c))
            .fold(f64::MAX, f64::min);
        if nearest > best_dist {
            best = point;
            best_dist = nearest;
        }
    }
    best
}

fn euclidean(a: [f64; 3], b: [f64; 3]) -> f64 {
    let dr = a[0] - b[0];
    let dg = a[1] - b[1];
    let db = a[2] - b[2];
    (dr * dr + dg * dg + db * db).sqrt()
}
