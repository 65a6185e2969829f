//! Median-cut quantization.
//!
//! Starts from one bucket holding every clustering color, then repeatedly
//! splits the most populous bucket along the channel with the greatest value
//! range, at the population median of that channel, until the target bucket
//! count is reached or no bucket can split further. Each bucket's
//! representative is the pixel-weighted channel average of its members.

use image::Rgba;

use super::WeightedColor;

/// A partition of colors sharing a contiguous slab of RGB space.
struct Bucket {
    colors: Vec<WeightedColor>,
    population: u64,
}

impl Bucket {
    fn new(colors: Vec<WeightedColor>) -> Self {
        let population = colors.iter().map(|&(_, count)| u64::from(count)).sum();
        Self { colors, population }
    }

    /// A bucket with one unique color cannot split.
    fn splittable(&self) -> bool {
        self.colors.len() > 1
    }

    /// Channel index with the widest min..max spread.
    fn widest_channel(&self) -> usize {
        let mut min = [255u8; 3];
        let mut max = [0u8; 3];
        for &(color, _) in &self.colors {
            for ch in 0..3 {
                min[ch] = min[ch].min(color.0[ch]);
                max[ch] = max[ch].max(color.0[ch]);
            }
        }
        let ranges = [max[0] - min[0], max[1] - min[1], max[2] - min[2]];
        // First widest wins so equal spreads stay deterministic
        let mut widest = 0;
        for ch in 1..3 {
            if ranges[ch] > ranges[widest] {
                widest = ch;
            }
        }
        widest
    }

    /// Split at the population median of the widest channel.
    fn split(mut self) -> (Bucket, Bucket) {
        let channel = self.widest_channel();
        self.colors.sort_unstable_by_key(|&(color, _)| {
            // Secondary key keeps the sort total and reproducible
            (color.0[channel], u32::from_be_bytes(color.0))
        });

        let half = self.population / 2;
        let mut accumulated = 0u64;
        let mut split_idx = 1;
        for (i, &(_, count)) in self.colors.iter().enumerate() {
            accumulated += u64::from(count);
            if accumulated >= half && i + 1 < self.colors.len() {
                split_idx = i + 1;
                break;
            }
        }
        // Both halves keep at least one unique color
        split_idx = split_idx.clamp(1, self.colors.len() - 1);

        let right = self.colors.split_off(split_idx);
        (Bucket::new(self.colors), Bucket::new(right))
    }

    /// Pixel-weighted channel average of the bucket's members.
    fn representative(&self) -> Rgba<u8> {
        let mut sums = [0u64; 3];
        let mut total = 0u64;
        for &(color, count) in &self.colors {
            for ch in 0..3 {
                sums[ch] += u64::from(color.0[ch]) * u64::from(count);
            }
            total += u64::from(count);
        }
        if total == 0 {
            return Rgba([0, 0, 0, 255]);
        }
        let avg = |sum: u64| ((sum + total / 2) / total) as u8;
        Rgba([avg(sums[0]), avg(sums[1]), avg(sums[2]), 255])
    }
}

/// Run median-cut over weighted colors, producing at most `target` entries.
pub fn palette(colors: &[WeightedColor], target: usize) -> Vec<Rgba<u8>> {
    if colors.is_empty() {
        return Vec::new();
    }

    let mut buckets = vec![Bucket::new(colors.to_vec())];
    while buckets.len() < target {
        // Most populous splittable bucket; strict comparison keeps ties on
        // the earliest-inserted bucket
        let mut candidate: Option<usize> = None;
        for (i, bucket) in buckets.iter().enumerate() {
            if !bucket.splittable() {
                continue;
            }
            match candidate {
                Some(best) if buckets[best].population >= bucket.population => {}
                _ => candidate = Some(i),
            }
        }
        let Some(idx) = candidate else {
            break;
        };

        let bucket = buckets.swap_remove(idx);
        let (left, right) = bucket.split();
        buckets.push(left);
        buckets.push(right);
    }

    buckets.iter().map(Bucket::representative).collect()
}
