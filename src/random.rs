/**
 * Random Dithering
 *
 * Every pixel is disturbed by independent uniform noise before a fixed
 * mid-level threshold is applied. A pixel of brightness b (normalised to
 * [0, 1]) therefore turns white with probability b, which preserves the
 * average brightness of large regions at the cost of a grainy, clumpy
 * pattern.
 *
 * The random source is always handed in by the caller. `seeded_rng` builds
 * one from an explicit seed for reproducible output, or from the wall clock
 * when no seed is given.
 */

use image::{GrayImage, ImageBuffer, Luma};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{SystemTime, UNIX_EPOCH};

/// Create a random number generator from an optional seed
///
/// Without a seed the generator is seeded from the current time. Two calls
/// landing in the same clock tick would see the same noise; pass distinct
/// seeds when independent results are required.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    let seed = seed.unwrap_or_else(clock_seed);
    log::debug!("seeding random generator with {}", seed);
    StdRng::seed_from_u64(seed)
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

/// Threshold each pixel after adding uniform noise from [-0.5, 0.5)
pub fn random_dither<R: Rng + ?Sized>(gray: &GrayImage, rng: &mut R) -> GrayImage {
    let (width, height) = gray.dimensions();

    ImageBuffer::from_fn(width, height, |x, y| {
        let brightness = gray.get_pixel(x, y).0[0] as f64 / 255.0;
        let noise = rng.gen::<f64>() - 0.5;

        if brightness + noise > 0.5 {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}
