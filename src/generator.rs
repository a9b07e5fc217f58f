/**
 * Noise Texture Generator
 *
 * Produces the threshold texture used by the blue-noise ditherer. The
 * texture is synthesised in three steps:
 *
 * 1. Fill a float grid with independent uniform values in [0, 1)
 * 2. Smooth it with a separable Gaussian kernel (7 taps, sigma 1.5)
 * 3. Min-max normalise the result back onto [0, 1]
 *
 * NOTE ON SPECTRUM
 * ================
 * Blurring removes high frequencies, so the field is low-frequency
 * dominant rather than true blue noise. The ditherer relies on this exact
 * behaviour and it is kept as is.
 *
 * EDGE HANDLING
 * =============
 * `EdgeMode::Reflect` mirrors the grid at its edges without repeating the
 * edge sample (`dcb|abcd|cba`). `EdgeMode::Wrap` treats the grid as a
 * torus so that the texture tiles without seams. Wrapped blurs on
 * power-of-two grids run in the frequency domain: the kernel is transformed
 * once and the convolution becomes an element-wise product.
 */

use image::{GrayImage, ImageBuffer, Luma};
use rand::Rng;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use std::path::Path;
use thiserror::Error;

use crate::random::seeded_rng;

/// How the blur treats samples beyond the texture edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeMode {
    /// Mirror at the edge without repeating the edge sample
    #[default]
    Reflect,
    /// Wrap around, making the texture tileable
    Wrap,
}

/// Configuration for noise texture generation
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseConfig {
    /// Width of the texture in pixels
    pub width: usize,
    /// Height of the texture in pixels
    pub height: usize,
    /// Gaussian kernel size in taps (odd)
    pub kernel_size: usize,
    /// Gaussian standard deviation
    pub sigma: f32,
    /// Border handling of the blur
    pub edge_mode: EdgeMode,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 64,
            kernel_size: 7,
            sigma: 1.5,
            edge_mode: EdgeMode::Reflect,
        }
    }
}

/// Error types for noise generation
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// Width or height is zero
    #[error("Width and height must be positive")]
    InvalidDimensions,

    /// Kernel size is zero or even
    #[error("Kernel size must be odd and positive, got {0}")]
    InvalidKernelSize(usize),

    /// Sigma is zero, negative or not finite
    #[error("Sigma must be positive")]
    InvalidSigma,

    /// Texture data does not match the stated dimensions
    #[error("Expected {expected} texture values, got {actual}")]
    DataLength {
        /// Number of values implied by the dimensions
        expected: usize,
        /// Number of values supplied
        actual: usize,
    },

    /// Failed to load or save a texture image
    #[error("Texture image I/O failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type for generator operations
pub type Result<T> = std::result::Result<T, GeneratorError>;

/// A single-channel float texture with values in [0, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseTexture {
    data: Vec<f32>,
    width: usize,
    height: usize,
}

impl NoiseTexture {
    /// Wrap row-major texture data
    pub fn from_data(data: Vec<f32>, width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(GeneratorError::InvalidDimensions);
        }
        if data.len() != width * height {
            return Err(GeneratorError::DataLength {
                expected: width * height,
                actual: data.len(),
            });
        }

        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Load a texture from an image file, mapping 0-255 onto [0, 1]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let gray = image::open(path)?.to_luma8();
        let (width, height) = gray.dimensions();
        let data = gray.into_raw().into_iter().map(|v| v as f32 / 255.0).collect();

        Self::from_data(data, width as usize, height as usize)
    }

    /// Width of the texture
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the texture
    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major texture values
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Get the noise value at the given coordinates (with tiling)
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        let wrap_x = (x as usize) % self.width;
        let wrap_y = (y as usize) % self.height;
        self.data[wrap_y * self.width + wrap_x]
    }

    /// Quantise the texture to an 8-bit grayscale image
    pub fn to_gray_image(&self) -> GrayImage {
        ImageBuffer::from_fn(self.width as u32, self.height as u32, |x, y| {
            let value = self.data[y as usize * self.width + x as usize];
            Luma([(value.clamp(0.0, 1.0) * 255.0).round() as u8])
        })
    }
}

/// Generator for smoothed uniform-noise textures
#[derive(Debug, Clone)]
pub struct NoiseGenerator {
    width: usize,
    height: usize,
    area: usize,
    edge_mode: EdgeMode,
    kernel: Vec<f32>,

    // Wrapped blurs on power-of-two grids go through the FFT
    use_fft: bool,
    kernel_freq: Option<Vec<Complex<f32>>>,
}

impl NoiseGenerator {
    /// Check if a number is a power of two
    fn is_power_of_two(n: usize) -> bool {
        n > 0 && (n & (n - 1)) == 0
    }

    /// Create a new generator with the given configuration
    pub fn new(config: &NoiseConfig) -> Result<Self> {
        if config.width == 0 || config.height == 0 {
            return Err(GeneratorError::InvalidDimensions);
        }
        if config.kernel_size == 0 || config.kernel_size % 2 == 0 {
            return Err(GeneratorError::InvalidKernelSize(config.kernel_size));
        }
        if !(config.sigma > 0.0 && config.sigma.is_finite()) {
            return Err(GeneratorError::InvalidSigma);
        }

        let use_fft = config.edge_mode == EdgeMode::Wrap
            && Self::is_power_of_two(config.width)
            && Self::is_power_of_two(config.height);

        let mut generator = Self {
            width: config.width,
            height: config.height,
            area: config.width * config.height,
            edge_mode: config.edge_mode,
            kernel: gaussian_kernel(config.kernel_size, config.sigma),
            use_fft,
            kernel_freq: None,
        };

        if use_fft {
            generator.kernel_freq = Some(generator.create_kernel_fft());
        }

        Ok(generator)
    }

    /**
     * Place the separable kernel on the torus and transform it
     *
     * Taps that fall beyond a small grid wrap onto the same cell and add up,
     * exactly as the spatial wrapped convolution would.
     */
    fn create_kernel_fft(&self) -> Vec<Complex<f32>> {
        let mut kernel = vec![0.0f32; self.area];
        let radius = (self.kernel.len() / 2) as isize;

        for (ky, &wy) in self.kernel.iter().enumerate() {
            for (kx, &wx) in self.kernel.iter().enumerate() {
                let x = wrap_index(kx as isize - radius, self.width);
                let y = wrap_index(ky as isize - radius, self.height);
                kernel[y * self.width + x] += wy * wx;
            }
        }

        self.fft_2d_forward(&kernel)
    }

    /**
     * Perform 2D FFT on real-valued data
     */
    fn fft_2d_forward(&self, data: &[f32]) -> Vec<Complex<f32>> {
        let mut complex_data: Vec<Complex<f32>> =
            data.iter().map(|&x| Complex::new(x, 0.0)).collect();

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(self.width);

        for row in complex_data.chunks_mut(self.width) {
            fft.process(row);
        }

        let fft = planner.plan_fft_forward(self.height);
        let mut column = vec![Complex::new(0.0, 0.0); self.height];

        for x in 0..self.width {
            for y in 0..self.height {
                column[y] = complex_data[y * self.width + x];
            }
            fft.process(&mut column);
            for y in 0..self.height {
                complex_data[y * self.width + x] = column[y];
            }
        }

        complex_data
    }

    /**
     * Perform 2D inverse FFT, returning the normalised real part
     */
    fn fft_2d_inverse(&self, complex_data: &[Complex<f32>]) -> Vec<f32> {
        let mut data = complex_data.to_vec();

        let mut planner = FftPlanner::new();
        let ifft = planner.plan_fft_inverse(self.height);
        let mut column = vec![Complex::new(0.0, 0.0); self.height];

        for x in 0..self.width {
            for y in 0..self.height {
                column[y] = data[y * self.width + x];
            }
            ifft.process(&mut column);
            for y in 0..self.height {
                data[y * self.width + x] = column[y];
            }
        }

        let ifft = planner.plan_fft_inverse(self.width);

        for row in data.chunks_mut(self.width) {
            ifft.process(row);
        }

        data.iter().map(|c| c.re / (self.area as f32)).collect()
    }

    fn blur_fft(&self, data: &[f32]) -> Vec<f32> {
        let data_freq = self.fft_2d_forward(data);

        let result_freq: Vec<Complex<f32>> = match &self.kernel_freq {
            Some(kernel_freq) => data_freq
                .iter()
                .zip(kernel_freq.iter())
                .map(|(d, k)| d * k)
                .collect(),
            None => return self.blur_spatial(data),
        };

        self.fft_2d_inverse(&result_freq)
    }

    /**
     * Separable spatial convolution: rows first, then columns
     */
    fn blur_spatial(&self, data: &[f32]) -> Vec<f32> {
        let index: fn(isize, usize) -> usize = match self.edge_mode {
            EdgeMode::Reflect => reflect_index,
            EdgeMode::Wrap => wrap_index,
        };
        let radius = (self.kernel.len() / 2) as isize;

        let mut horizontal = vec![0.0f32; self.area];
        for y in 0..self.height {
            let row = &data[y * self.width..(y + 1) * self.width];
            for x in 0..self.width {
                horizontal[y * self.width + x] = self
                    .kernel
                    .iter()
                    .enumerate()
                    .map(|(k, &w)| w * row[index(x as isize + k as isize - radius, self.width)])
                    .sum();
            }
        }

        let mut blurred = vec![0.0f32; self.area];
        for y in 0..self.height {
            for x in 0..self.width {
                blurred[y * self.width + x] = self
                    .kernel
                    .iter()
                    .enumerate()
                    .map(|(k, &w)| {
                        let sy = index(y as isize + k as isize - radius, self.height);
                        w * horizontal[sy * self.width + x]
                    })
                    .sum();
            }
        }

        blurred
    }

    /// Smooth a row-major field with the configured kernel and edge mode
    pub fn blur(&self, data: &[f32]) -> Vec<f32> {
        if self.use_fft {
            self.blur_fft(data)
        } else {
            self.blur_spatial(data)
        }
    }

    /// Generate a texture, drawing the uniform field from `rng`
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> NoiseTexture {
        log::debug!(
            "generating {}x{} noise texture ({:?} edges, {} blur)",
            self.width,
            self.height,
            self.edge_mode,
            if self.use_fft { "FFT" } else { "spatial" }
        );

        let field: Vec<f32> = (0..self.area).map(|_| rng.gen::<f32>()).collect();
        let mut data = self.blur(&field);
        normalize_min_max(&mut data);

        NoiseTexture {
            data,
            width: self.width,
            height: self.height,
        }
    }
}

/// Normalised 1D Gaussian kernel with `size` taps
pub fn gaussian_kernel(size: usize, sigma: f32) -> Vec<f32> {
    let center = (size / 2) as f32;
    let divisor = 2.0 * sigma * sigma;

    let mut kernel: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (-d * d / divisor).exp()
        })
        .collect();

    let sum: f32 = kernel.iter().sum();
    for val in kernel.iter_mut() {
        *val /= sum;
    }

    kernel
}

/// Rescale values so the minimum maps to 0 and the maximum to 1
///
/// A constant field has no range and maps to all zeros.
pub fn normalize_min_max(data: &mut [f32]) {
    let (min, max) = data
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = max - min;

    for val in data.iter_mut() {
        *val = if range > 0.0 { (*val - min) / range } else { 0.0 };
    }
}

/// Mirror an out-of-range index back into `0..n` without repeating the edge
fn reflect_index(i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let period = 2 * (n as isize - 1);
    let i = i.rem_euclid(period);
    if i >= n as isize {
        (period - i) as usize
    } else {
        i as usize
    }
}

/// Wrap an index onto the torus `0..n`
fn wrap_index(i: isize, n: usize) -> usize {
    i.rem_euclid(n as isize) as usize
}

/**
 * Convenience function to generate a noise texture
 */
pub fn generate_noise_texture(config: &NoiseConfig, seed: Option<u64>) -> Result<NoiseTexture> {
    let generator = NoiseGenerator::new(config)?;
    Ok(generator.generate(&mut seeded_rng(seed)))
}

/**
 * Save a noise texture to PNG file
 */
pub fn save_noise_to_png<P: AsRef<Path>>(texture: &NoiseTexture, filename: P) -> Result<()> {
    texture.to_gray_image().save(&filename)?;
    log::info!("Saved noise texture to {}", filename.as_ref().display());

    Ok(())
}
