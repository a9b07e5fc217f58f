/**
 * Floyd-Steinberg Error Diffusion
 *
 * Pixels are visited in raster order. Each visited pixel is thresholded at
 * 128 and the difference between its accumulated value and the chosen
 * level is pushed onto the neighbours that have not been visited yet:
 *
 * ```text
 *          X   7
 *      3   5   1      (sixteenths)
 * ```
 *
 * Errors accumulate in a separate `i32` buffer so that intermediate values
 * may leave the 0-255 range without wrapping. Only interior pixels are
 * visited: the last row and the first and last columns never receive a
 * threshold and keep their original grayscale value in the output.
 */

use image::{GrayImage, Luma};

/// Threshold separating black from white
pub const THRESHOLD: i32 = 128;

/// Signed running values of a grayscale image under error diffusion
#[derive(Debug, Clone)]
pub struct ErrorAccumulator {
    values: Vec<i32>,
    width: usize,
    height: usize,
}

impl ErrorAccumulator {
    /// Start from the raw samples of a grayscale image
    pub fn from_gray(gray: &GrayImage) -> Self {
        Self {
            values: gray.as_raw().iter().map(|&v| v as i32).collect(),
            width: gray.width() as usize,
            height: gray.height() as usize,
        }
    }

    /// Current accumulated value at (x, y)
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> i32 {
        self.values[y * self.width + x]
    }

    #[inline]
    fn add(&mut self, x: usize, y: usize, delta: i32) {
        self.values[y * self.width + x] += delta;
    }

    /// Threshold the pixel at (x, y) and spread its error
    ///
    /// Returns the chosen output level and the quantization error. Each
    /// share of the error is truncated toward zero, so an error of -55 hands
    /// out -24, -10, -17 and -3. The caller must keep (x, y) off the border:
    /// `1 <= x < width - 1` and `y < height - 1`.
    pub fn visit(&mut self, x: usize, y: usize) -> (u8, i32) {
        debug_assert!(x >= 1 && x + 1 < self.width && y + 1 < self.height);

        let old = self.get(x, y);
        let new = if old > THRESHOLD { 255 } else { 0 };
        let error = old - new;

        self.values[y * self.width + x] = new;
        self.add(x + 1, y, error * 7 / 16);
        self.add(x - 1, y + 1, error * 3 / 16);
        self.add(x, y + 1, error * 5 / 16);
        self.add(x + 1, y + 1, error / 16);

        (new as u8, error)
    }
}

/// Dither a grayscale image with Floyd-Steinberg error diffusion
///
/// Images narrower than 3 pixels or shorter than 2 rows have no interior
/// pixels and come back as an unchanged copy.
pub fn floyd_steinberg_dither(gray: &GrayImage) -> GrayImage {
    let mut output = gray.clone();
    let width = gray.width() as usize;
    let height = gray.height() as usize;

    if width < 3 || height < 2 {
        log::debug!(
            "{}x{} image has no interior pixels, skipping diffusion",
            width,
            height
        );
        return output;
    }

    let mut accumulator = ErrorAccumulator::from_gray(gray);

    for y in 0..height - 1 {
        for x in 1..width - 1 {
            let (level, _) = accumulator.visit(x, y);
            output.put_pixel(x as u32, y as u32, Luma([level]));
        }
    }

    output
}
