//! Host-side numeric helpers used while building sketches.
use rand::seq::SliceRandom;
use rand::Rng;

/// `input` limited to `[min, max]`.
pub fn clamp(min: f32, input: f32, max: f32) -> f32 {
    min.max(input.min(max))
}

/// Linear remap of `input` from `[in_min, in_max]` to `[out_min, out_max]`,
/// unclamped.
pub fn map_range(in_min: f32, in_max: f32, input: f32, out_min: f32, out_max: f32) -> f32 {
    (input - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

pub fn lerp(start: f32, end: f32, amount: f32) -> f32 {
    (1.0 - amount) * start + amount * end
}

/// Rounds to `decimals` places through decimal formatting.
pub fn truncate(value: f32, decimals: usize) -> f32 {
    format!("{value:.decimals$}").parse().unwrap_or(value)
}

/// Position of `value` within `[min, max]`, clamped to [0, 1].
pub fn normalize(value: f32, min: f32, max: f32) -> f32 {
    ((value - min) / (max - min)).clamp(0.0, 1.0)
}

/// Aspect scale for a `width` x `height` surface; the shorter side is 1.
pub fn ratio(width: f32, height: f32) -> [f32; 2] {
    if width > height {
        [width / height, 1.0]
    } else {
        [1.0, height / width]
    }
}

/// Uniform sample from `[min, max)`; returns `min` when the range is empty.
pub fn random_from_range<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}

pub fn random_from_array<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> Option<&'a T> {
    items.choose(rng)
}
