//! Blob motion: periodic orbits around a movable center, a short-range
//! repulsion sweep that breaks up clumps, and wraparound at padded edges.
//!
//! All coordinates are logical pixels.

use glam::DVec2;

use crate::blob::Blob;

/// Orbit amplitude as a fraction of the surface size.
const ORBIT_FRACTION: f64 = 0.3;
/// The y oscillation runs its phase 1.3x faster, giving Lissajous-like paths.
const Y_PHASE_FACTOR: f64 = 1.3;

/// Neighbours farther than this exert no force.
pub const REPULSION_RANGE: f64 = 150.0;
pub const REPULSION_STRENGTH: f64 = 0.15;
/// Two blobs overlap when their centers are closer than this fraction of
/// their average radius.
pub const OVERLAP_FACTOR: f64 = 0.6;
/// Extra force per overlapping neighbour beyond the first.
const CROWD_GAIN: f64 = 0.5;
/// Damping of the per-neighbour push when a blob is not crowded.
const SPARSE_DAMPING: f64 = 0.5;

/// Position on a blob's periodic orbit at `time`.
///
/// `center` is the orbit center and `bounds` the surface size; the orbit
/// spans 30% of the surface in each direction.
pub fn periodic_position(center: DVec2, bounds: DVec2, time: f64, speed: f64, phase: f64) -> DVec2 {
    let t = time * speed;
    DVec2::new(
        center.x + (t + phase).sin() * bounds.x * ORBIT_FRACTION,
        center.y + (t + phase * Y_PHASE_FACTOR).cos() * bounds.y * ORBIT_FRACTION,
    )
}

/// Moves every blob onto its orbit. `center_fraction` is the orbit center
/// as a fraction of `bounds`.
pub fn advance_positions(
    blobs: &mut [Blob],
    center_fraction: DVec2,
    bounds: DVec2,
    time: f64,
    speed: f64,
) {
    let center = bounds * center_fraction;
    for blob in blobs {
        blob.position = periodic_position(center, bounds, time, speed, blob.phase);
    }
}

/// Push on `from` away from `other` if they are within [`REPULSION_RANGE`].
fn push(from: DVec2, other: DVec2) -> Option<DVec2> {
    let delta = from - other;
    let distance = delta.length();
    if distance > 0.0 && distance < REPULSION_RANGE {
        let falloff = (REPULSION_RANGE - distance) / REPULSION_RANGE;
        Some(delta / distance * falloff * REPULSION_STRENGTH)
    } else {
        None
    }
}

/// One sequential repulsion sweep over the pool.
///
/// Blobs are visited in pool order and each sees the already-displaced
/// positions of earlier blobs, so the result depends on order. A blob with
/// two or more overlapping neighbours sums their pushes, amplified by
/// `1 + 0.5 * (overlaps - 1)`, and moves once. Otherwise it moves by half
/// of each push in turn.
pub fn apply_repulsion(blobs: &mut [Blob]) {
    for i in 0..blobs.len() {
        let me = blobs[i].position;
        let my_radius = blobs[i].radius;
        let overlapping: Vec<usize> = (0..blobs.len())
            .filter(|&j| j != i)
            .filter(|&j| {
                let threshold = (my_radius + blobs[j].radius) / 2.0 * OVERLAP_FACTOR;
                me.distance(blobs[j].position) < threshold
            })
            .collect();

        if overlapping.len() >= 2 {
            let gain = 1.0 + (overlapping.len() - 1) as f64 * CROWD_GAIN;
            let total: DVec2 = overlapping
                .iter()
                .filter_map(|&j| push(me, blobs[j].position))
                .sum();
            blobs[i].position += total * gain;
        } else {
            for &j in &overlapping {
                let other = blobs[j].position;
                if let Some(force) = push(blobs[i].position, other) {
                    blobs[i].position += force * SPARSE_DAMPING;
                }
            }
        }
    }
}

/// Teleports a position that left `[-radius, bound + radius]` to the
/// opposite padded edge. The x axis is handled before y.
pub fn wrap_position(position: DVec2, radius: f64, bounds: DVec2) -> DVec2 {
    let wrap = |v: f64, bound: f64| {
        let mut v = v;
        if v < -radius {
            v = bound + radius;
        }
        if v > bound + radius {
            v = -radius;
        }
        v
    };
    DVec2::new(wrap(position.x, bounds.x), wrap(position.y, bounds.y))
}

/// Applies [`wrap_position`] to every blob.
pub fn wrap_to_bounds(blobs: &mut [Blob], bounds: DVec2) {
    for blob in blobs {
        blob.position = wrap_position(blob.position, blob.radius, bounds);
    }
}
