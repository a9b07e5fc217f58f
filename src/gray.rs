/**
 * Grayscale Conversion
 *
 * Collapses a colour image into a single luminance channel using the
 * ITU-R BT.601 weights (0.299 R + 0.587 G + 0.114 B). The weights are held
 * in 14-bit fixed point so that a pixel with equal channels maps back onto
 * itself exactly, which keeps the conversion idempotent.
 */

use image::{DynamicImage, GrayImage, ImageBuffer, Luma};

/// Fixed-point precision of the luminance weights
const WEIGHT_SHIFT: u32 = 14;
const RED_WEIGHT: u32 = 4899;
const GREEN_WEIGHT: u32 = 9617;
const BLUE_WEIGHT: u32 = 1868;

/// Luminance of a single RGB sample
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let sum = r as u32 * RED_WEIGHT + g as u32 * GREEN_WEIGHT + b as u32 * BLUE_WEIGHT;
    ((sum + (1 << (WEIGHT_SHIFT - 1))) >> WEIGHT_SHIFT) as u8
}

/// Convert an image to an 8-bit single-channel luminance buffer
///
/// Images that are already 8-bit grayscale are copied unchanged. Alpha
/// channels are ignored.
pub fn to_grayscale(image: &DynamicImage) -> GrayImage {
    if let DynamicImage::ImageLuma8(gray) = image {
        return gray.clone();
    }

    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();

    ImageBuffer::from_fn(width, height, |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        Luma([luminance(r, g, b)])
    })
}
