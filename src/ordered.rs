/**
 * Ordered (Bayer) Dithering
 *
 * Each pixel is compared against the cell of a small threshold matrix
 * selected by its position modulo the matrix size. The matrix is a
 * permutation of threshold levels arranged so that, when tiled, every
 * intermediate grey level switches on an evenly spread subset of pixels.
 *
 * The canonical 4×4 matrix is the default. Orders 2, 8 and 16 are built
 * with the usual recursion:
 *
 * ```text
 *   M(2n) = | 4·M(n) + 0   4·M(n) + 2 |
 *           | 4·M(n) + 3   4·M(n) + 1 |
 * ```
 */

use image::{GrayImage, ImageBuffer, Luma};

use crate::dither::{DitherError, Result};

/// Canonical 4×4 Bayer permutation of 0..15
pub const BAYER_4X4: [[u8; 4]; 4] = [
    [0, 8, 2, 10],
    [12, 4, 14, 6],
    [3, 11, 1, 9],
    [15, 7, 13, 5],
];

/// Matrix orders that can be built
pub const SUPPORTED_ORDERS: [usize; 4] = [2, 4, 8, 16];

/// A square threshold matrix scaled to the 0-255 range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdMatrix {
    order: usize,
    cells: Vec<u8>,
}

impl ThresholdMatrix {
    /// Build the scaled threshold matrix for the given order
    pub fn new(order: usize) -> Result<Self> {
        if !SUPPORTED_ORDERS.contains(&order) {
            return Err(DitherError::InvalidBayerOrder(order));
        }

        let levels = (order * order) as u32;
        let cells = bayer_levels(order)
            .into_iter()
            .map(|level| scale_level(level, levels))
            .collect();

        Ok(Self { order, cells })
    }

    /// The canonical 4×4 matrix
    pub fn standard() -> Self {
        let cells = BAYER_4X4
            .iter()
            .flatten()
            .map(|&level| scale_level(level as u32, 16))
            .collect();

        Self { order: 4, cells }
    }

    /// Side length of the matrix
    pub fn order(&self) -> usize {
        self.order
    }

    /// Threshold at image coordinates, tiling the matrix
    #[inline]
    pub fn threshold(&self, x: u32, y: u32) -> u8 {
        let col = x as usize % self.order;
        let row = y as usize % self.order;
        self.cells[row * self.order + col]
    }

    /// Matrix rows, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.cells.chunks(self.order)
    }
}

impl Default for ThresholdMatrix {
    fn default() -> Self {
        Self::standard()
    }
}

/// Scale a level in `0..levels` by `255 / levels`, rounding to nearest with
/// ties going down
///
/// Only the midpoint level of each matrix lands exactly on a half
/// (8·255/16 = 127.5), and it resolves to 127.
#[inline]
fn scale_level(level: u32, levels: u32) -> u8 {
    let scaled = (2 * level * 255 + levels - 1) / (2 * levels);
    scaled.min(255) as u8
}

/// Unscaled Bayer levels of the given power-of-two order, row-major
fn bayer_levels(order: usize) -> Vec<u32> {
    let mut size = 1;
    let mut levels = vec![0u32];

    while size < order {
        let next = size * 2;
        let mut grown = vec![0u32; next * next];

        for y in 0..size {
            for x in 0..size {
                let base = 4 * levels[y * size + x];
                grown[y * next + x] = base;
                grown[y * next + x + size] = base + 2;
                grown[(y + size) * next + x] = base + 3;
                grown[(y + size) * next + x + size] = base + 1;
            }
        }

        levels = grown;
        size = next;
    }

    levels
}

/// Threshold a grayscale image against a tiled matrix
///
/// A pixel turns white only when it is strictly brighter than its
/// threshold, so black stays black under every cell.
pub fn bayer_dither(gray: &GrayImage, matrix: &ThresholdMatrix) -> GrayImage {
    let (width, height) = gray.dimensions();

    ImageBuffer::from_fn(width, height, |x, y| {
        let value = gray.get_pixel(x, y).0[0];
        if value > matrix.threshold(x, y) {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCALED_4X4: [[u8; 4]; 4] = [
        [0, 127, 32, 159],
        [191, 64, 223, 96],
        [48, 175, 16, 143],
        [239, 112, 207, 80],
    ];

    fn uniform(width: u32, height: u32, value: u8) -> GrayImage {
        GrayImage::from_pixel(width, height, Luma([value]))
    }

    #[test]
    fn test_standard_matrix_literal() {
        let matrix = ThresholdMatrix::standard();
        let rows: Vec<&[u8]> = matrix.rows().collect();
        for (row, expected) in rows.iter().zip(SCALED_4X4.iter()) {
            assert_eq!(*row, &expected[..]);
        }
    }

    #[test]
    fn test_recursive_order_four_matches_canonical() {
        let levels = bayer_levels(4);
        let canonical: Vec<u32> = BAYER_4X4.iter().flatten().map(|&v| v as u32).collect();
        assert_eq!(levels, canonical);
        assert_eq!(ThresholdMatrix::new(4).unwrap(), ThresholdMatrix::standard());
    }

    #[test]
    fn test_recursive_orders_are_permutations() {
        for order in SUPPORTED_ORDERS {
            let mut levels = bayer_levels(order);
            levels.sort_unstable();
            let expected: Vec<u32> = (0..(order * order) as u32).collect();
            assert_eq!(levels, expected, "order {}", order);
        }
    }

    #[test]
    fn test_invalid_order_rejected() {
        assert!(ThresholdMatrix::new(0).is_err());
        assert!(ThresholdMatrix::new(3).is_err());
        assert!(ThresholdMatrix::new(32).is_err());
    }

    #[test]
    fn test_matrix_is_stable_across_calls() {
        assert_eq!(ThresholdMatrix::standard(), ThresholdMatrix::standard());
    }

    #[test]
    fn test_single_pixel_against_first_row() {
        let matrix = ThresholdMatrix::standard();
        let image = uniform(2, 1, 100);
        let result = bayer_dither(&image, &matrix);

        // 100 > 0 at (0, 0), 100 <= 127 at (0, 1)
        assert_eq!(result.get_pixel(0, 0).0[0], 255);
        assert_eq!(result.get_pixel(1, 0).0[0], 0);
    }

    #[test]
    fn test_matrix_tiles_modulo_order() {
        let matrix = ThresholdMatrix::standard();
        assert_eq!(matrix.threshold(5, 6), matrix.threshold(1, 2));
        assert_eq!(matrix.threshold(4, 4), 0);
        assert_eq!(matrix.threshold(7, 3), 80);
    }

    #[test]
    fn test_binary_input_is_fixed_point() {
        let matrix = ThresholdMatrix::standard();
        let image = GrayImage::from_fn(9, 7, |x, y| {
            if (x + y) % 3 == 0 {
                Luma([255])
            } else {
                Luma([0])
            }
        });
        assert_eq!(bayer_dither(&image, &matrix), image);
    }

    #[test]
    fn test_output_is_binary_and_deterministic() {
        let matrix = ThresholdMatrix::standard();
        let image = GrayImage::from_fn(23, 11, |x, y| Luma([((x * 11 + y * 17) % 256) as u8]));

        let first = bayer_dither(&image, &matrix);
        let second = bayer_dither(&image, &matrix);

        assert_eq!(first, second);
        assert_eq!(first.dimensions(), (23, 11));
        assert!(first.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }

    #[test]
    fn test_below_midpoint_fills_half_the_tile() {
        let matrix = ThresholdMatrix::standard();
        let result = bayer_dither(&uniform(4, 4, 127), &matrix);
        let white = result.pixels().filter(|p| p.0[0] == 255).count();
        assert_eq!(white, 8);
    }
}
