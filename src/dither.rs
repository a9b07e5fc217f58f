/**
 * Dithering Methods
 *
 * Ties the individual algorithms together behind one interface. Every
 * method converts the input to grayscale, runs its own pass and hands back
 * a single-channel image whose samples are 0 or 255, tagged with the method
 * that produced it.
 *
 * Stochastic methods draw from a generator created per call from
 * `DitherOptions::seed`, so a fixed seed reproduces the output exactly.
 */

use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use rand::Rng;
use std::fmt;
use thiserror::Error;

use crate::diffusion::floyd_steinberg_dither;
use crate::generator::{GeneratorError, NoiseConfig, NoiseGenerator, NoiseTexture};
use crate::gray::to_grayscale;
use crate::ordered::{bayer_dither, ThresholdMatrix};
use crate::random::{random_dither, seeded_rng};

/// Error types for dithering
#[derive(Error, Debug)]
pub enum DitherError {
    /// Bayer matrix order is not one of the supported sizes
    #[error("Unsupported Bayer matrix order {0} (expected 2, 4, 8 or 16)")]
    InvalidBayerOrder(usize),

    /// Noise texture configuration was rejected
    #[error("Noise texture error: {0}")]
    Generator(#[from] GeneratorError),
}

/// Result type for dithering operations
pub type Result<T> = std::result::Result<T, DitherError>;

/// The closed set of dithering methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Ordered dithering against a tiled Bayer matrix
    Bayer,
    /// Independent uniform noise per pixel
    Random,
    /// Floyd-Steinberg error diffusion
    FloydSteinberg,
    /// Tiled blurred-noise texture
    BlueNoise,
}

impl Method {
    /// Every method, in presentation order
    pub const ALL: [Method; 4] = [
        Method::Bayer,
        Method::Random,
        Method::FloydSteinberg,
        Method::BlueNoise,
    ];

    /// Human-readable name of the method
    pub fn label(&self) -> &'static str {
        match self {
            Method::Bayer => "Bayer Dithering",
            Method::Random => "Random Dithering",
            Method::FloydSteinberg => "Floyd Steinberg Dithering",
            Method::BlueNoise => "Blue Noise Dithering",
        }
    }

    /// Short lowercase identifier, suitable for file names
    pub fn slug(&self) -> &'static str {
        match self {
            Method::Bayer => "bayer",
            Method::Random => "random",
            Method::FloydSteinberg => "floyd-steinberg",
            Method::BlueNoise => "blue-noise",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Common interface of the dithering algorithms
pub trait Dither {
    /// Method implemented by this algorithm
    fn method(&self) -> Method;

    /// Reduce a grayscale image to black and white
    fn dither<R: Rng + ?Sized>(&self, gray: &GrayImage, rng: &mut R) -> GrayImage;
}

/// Ordered dithering with a Bayer threshold matrix
#[derive(Debug, Clone, Default)]
pub struct Bayer {
    matrix: ThresholdMatrix,
}

impl Bayer {
    /// Bayer dithering with a matrix of the given order
    pub fn new(order: usize) -> Result<Self> {
        Ok(Self {
            matrix: ThresholdMatrix::new(order)?,
        })
    }
}

impl Dither for Bayer {
    fn method(&self) -> Method {
        Method::Bayer
    }

    fn dither<R: Rng + ?Sized>(&self, gray: &GrayImage, _rng: &mut R) -> GrayImage {
        bayer_dither(gray, &self.matrix)
    }
}

/// Random threshold dithering
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomThreshold;

impl Dither for RandomThreshold {
    fn method(&self) -> Method {
        Method::Random
    }

    fn dither<R: Rng + ?Sized>(&self, gray: &GrayImage, rng: &mut R) -> GrayImage {
        random_dither(gray, rng)
    }
}

/// Floyd-Steinberg error diffusion
#[derive(Debug, Clone, Copy, Default)]
pub struct FloydSteinberg;

impl Dither for FloydSteinberg {
    fn method(&self) -> Method {
        Method::FloydSteinberg
    }

    fn dither<R: Rng + ?Sized>(&self, gray: &GrayImage, _rng: &mut R) -> GrayImage {
        floyd_steinberg_dither(gray)
    }
}

#[derive(Debug, Clone)]
enum TextureSource {
    Generate(NoiseGenerator),
    Fixed(NoiseTexture),
}

/// Dithering against a tiled blurred-noise texture
///
/// By default a fresh texture is synthesised for every image. A fixed
/// texture can be supplied instead when independent noise per call is not
/// needed.
#[derive(Debug, Clone)]
pub struct BlueNoise {
    source: TextureSource,
}

impl BlueNoise {
    /// Generate a new texture with `config` on every call
    pub fn new(config: &NoiseConfig) -> Result<Self> {
        Ok(Self {
            source: TextureSource::Generate(NoiseGenerator::new(config)?),
        })
    }

    /// Reuse the same texture on every call
    pub fn with_texture(texture: NoiseTexture) -> Self {
        Self {
            source: TextureSource::Fixed(texture),
        }
    }
}

impl Dither for BlueNoise {
    fn method(&self) -> Method {
        Method::BlueNoise
    }

    fn dither<R: Rng + ?Sized>(&self, gray: &GrayImage, rng: &mut R) -> GrayImage {
        match &self.source {
            TextureSource::Generate(generator) => {
                let texture = generator.generate(rng);
                blue_noise_dither(gray, &texture)
            }
            TextureSource::Fixed(texture) => blue_noise_dither(gray, texture),
        }
    }
}

/// Threshold normalised brightness plus centred texture noise at 0.5
pub fn blue_noise_dither(gray: &GrayImage, texture: &NoiseTexture) -> GrayImage {
    let (width, height) = gray.dimensions();

    ImageBuffer::from_fn(width, height, |x, y| {
        let brightness = gray.get_pixel(x, y).0[0] as f32 / 255.0;
        let noise = texture.get(x, y);

        if brightness + noise - 0.5 > 0.5 {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Options for dithering
#[derive(Debug, Clone)]
pub struct DitherOptions {
    /// Seed for the stochastic methods; `None` seeds from the clock
    pub seed: Option<u64>,
    /// Side length of the Bayer matrix
    pub bayer_order: usize,
    /// Texture parameters for blue-noise dithering
    pub noise: NoiseConfig,
    /// Fixed texture for blue-noise dithering, replacing generation
    pub texture: Option<NoiseTexture>,
}

impl Default for DitherOptions {
    fn default() -> Self {
        Self {
            seed: None,
            bayer_order: 4,
            noise: NoiseConfig::default(),
            texture: None,
        }
    }
}

/// A dithered image and the method that produced it
#[derive(Debug, Clone)]
pub struct Dithered {
    /// Method used
    pub method: Method,
    /// Single-channel output, same size as the input
    pub image: GrayImage,
}

impl Dithered {
    /// Human-readable name of the method used
    pub fn label(&self) -> &'static str {
        self.method.label()
    }
}

/// Validated set of algorithms, ready to run on any number of images
#[derive(Debug, Clone)]
pub struct Ditherer {
    bayer: Bayer,
    random: RandomThreshold,
    floyd_steinberg: FloydSteinberg,
    blue_noise: BlueNoise,
    seed: Option<u64>,
}

impl Ditherer {
    /// Validate the options and build every algorithm
    pub fn new(options: &DitherOptions) -> Result<Self> {
        let blue_noise = match &options.texture {
            Some(texture) => BlueNoise::with_texture(texture.clone()),
            None => BlueNoise::new(&options.noise)?,
        };

        Ok(Self {
            bayer: Bayer::new(options.bayer_order)?,
            random: RandomThreshold,
            floyd_steinberg: FloydSteinberg,
            blue_noise,
            seed: options.seed,
        })
    }

    /// Dither an image with one method
    pub fn run(&self, image: &DynamicImage, method: Method) -> Dithered {
        let gray = to_grayscale(image);
        log::debug!(
            "{} on {}x{} image",
            method.label(),
            gray.width(),
            gray.height()
        );

        // Each call starts its own stream, as if the generator were reseeded
        let mut rng = seeded_rng(self.seed);

        let image = match method {
            Method::Bayer => self.bayer.dither(&gray, &mut rng),
            Method::Random => self.random.dither(&gray, &mut rng),
            Method::FloydSteinberg => self.floyd_steinberg.dither(&gray, &mut rng),
            Method::BlueNoise => self.blue_noise.dither(&gray, &mut rng),
        };

        Dithered { method, image }
    }

    /// Dither the same image with every method
    pub fn run_all(&self, image: &DynamicImage) -> Vec<Dithered> {
        Method::ALL
            .iter()
            .map(|&method| self.run(image, method))
            .collect()
    }
}

/// Dither an image with a single method
pub fn dither(image: &DynamicImage, method: Method, options: &DitherOptions) -> Result<Dithered> {
    Ok(Ditherer::new(options)?.run(image, method))
}

/// Dither an image with all four methods
pub fn dither_all(image: &DynamicImage, options: &DitherOptions) -> Result<Vec<Dithered>> {
    Ok(Ditherer::new(options)?.run_all(image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn gradient(width: u32, height: u32) -> DynamicImage {
        let rgb = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 96])
        });
        DynamicImage::ImageRgb8(rgb)
    }

    fn seeded(seed: u64) -> DitherOptions {
        DitherOptions {
            seed: Some(seed),
            ..Default::default()
        }
    }

    fn is_binary(image: &GrayImage) -> bool {
        image.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255)
    }

    #[test]
    fn test_labels() {
        assert_eq!(Method::Bayer.label(), "Bayer Dithering");
        assert_eq!(Method::Random.label(), "Random Dithering");
        assert_eq!(Method::FloydSteinberg.label(), "Floyd Steinberg Dithering");
        assert_eq!(Method::BlueNoise.label(), "Blue Noise Dithering");
        assert_eq!(Method::FloydSteinberg.to_string(), "Floyd Steinberg Dithering");
        assert_eq!(Method::BlueNoise.slug(), "blue-noise");
    }

    #[test]
    fn test_dither_options_default() {
        let options = DitherOptions::default();
        assert!(options.seed.is_none());
        assert_eq!(options.bayer_order, 4);
        assert_eq!(options.noise, NoiseConfig::default());
        assert!(options.texture.is_none());
    }

    #[test]
    fn test_invalid_options_rejected() {
        let options = DitherOptions {
            bayer_order: 5,
            ..Default::default()
        };
        assert!(matches!(
            Ditherer::new(&options),
            Err(DitherError::InvalidBayerOrder(5))
        ));

        let options = DitherOptions {
            noise: NoiseConfig {
                kernel_size: 4,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            Ditherer::new(&options),
            Err(DitherError::Generator(GeneratorError::InvalidKernelSize(4)))
        ));
    }

    #[test]
    fn test_all_methods_in_order() {
        let results = dither_all(&gradient(20, 12), &seeded(1)).unwrap();
        let methods: Vec<Method> = results.iter().map(|r| r.method).collect();
        assert_eq!(methods, Method::ALL.to_vec());
    }

    #[test]
    fn test_dimensions_preserved() {
        for (width, height) in [(1, 1), (2, 1), (3, 2), (67, 45), (130, 3)] {
            let image = gradient(width, height);
            for result in dither_all(&image, &seeded(3)).unwrap() {
                assert_eq!(
                    result.image.dimensions(),
                    (width, height),
                    "{}",
                    result.label()
                );
            }
        }
    }

    #[test]
    fn test_binary_invariant() {
        let image = gradient(70, 50);
        let gray = to_grayscale(&image);

        for result in dither_all(&image, &seeded(11)).unwrap() {
            if result.method == Method::FloydSteinberg {
                let (width, height) = result.image.dimensions();
                for (x, y, pixel) in result.image.enumerate_pixels() {
                    if x == 0 || x == width - 1 || y == height - 1 {
                        assert_eq!(pixel, gray.get_pixel(x, y));
                    } else {
                        assert!(pixel.0[0] == 0 || pixel.0[0] == 255);
                    }
                }
            } else {
                assert!(is_binary(&result.image), "{}", result.label());
            }
        }
    }

    #[test]
    fn test_bayer_deterministic_without_seed() {
        let image = gradient(33, 17);
        let options = DitherOptions::default();
        let first = dither(&image, Method::Bayer, &options).unwrap();
        let second = dither(&image, Method::Bayer, &options).unwrap();
        assert_eq!(first.image, second.image);
    }

    #[test]
    fn test_seeded_runs_reproducible() {
        let image = gradient(48, 48);
        for method in [Method::Random, Method::BlueNoise] {
            let first = dither(&image, method, &seeded(77)).unwrap();
            let second = dither(&image, method, &seeded(77)).unwrap();
            assert_eq!(first.image, second.image, "{}", method);
        }
    }

    #[test]
    fn test_input_is_not_modified() {
        let image = gradient(16, 16);
        let copy = image.clone();
        let _ = dither_all(&image, &seeded(5)).unwrap();
        assert_eq!(image, copy);
    }

    #[test]
    fn test_random_brightness_bound() {
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(256, 256, Luma([128])));
        let result = dither(&image, Method::Random, &seeded(2024)).unwrap();

        let white = result.image.pixels().filter(|p| p.0[0] == 255).count();
        let fraction = white as f64 / (256.0 * 256.0);
        assert!((fraction - 128.0 / 255.0).abs() < 0.05, "fraction {}", fraction);
    }

    #[test]
    fn test_blue_noise_brightness_bound() {
        // A single 64×64 texture is strongly correlated and its white
        // fraction swings by about ±0.1 from seed to seed, so the bound is
        // checked on the mean over many textures.
        let gray = GrayImage::from_pixel(256, 256, Luma([128]));
        let generator = NoiseGenerator::new(&NoiseConfig::default()).unwrap();

        let runs = 128;
        let mut total = 0.0;
        for seed in 0..runs {
            let texture = generator.generate(&mut seeded_rng(Some(seed)));
            let result = blue_noise_dither(&gray, &texture);
            assert!(is_binary(&result));

            let white = result.pixels().filter(|p| p.0[0] == 255).count();
            total += white as f64 / (256.0 * 256.0);
        }

        let fraction = total / runs as f64;
        assert!((fraction - 128.0 / 255.0).abs() < 0.05, "mean fraction {}", fraction);
    }

    #[test]
    fn test_blue_noise_extremes() {
        let texture = NoiseTexture::from_data(vec![0.0, 0.3, 0.7, 1.0], 2, 2).unwrap();

        let black = blue_noise_dither(&GrayImage::from_pixel(5, 5, Luma([0])), &texture);
        assert!(black.pixels().all(|p| p.0[0] == 0));

        let white = blue_noise_dither(&GrayImage::from_pixel(5, 5, Luma([255])), &texture);
        // The texture minimum sits exactly on the threshold and stays black
        assert_eq!(white.get_pixel(0, 0).0[0], 0);
        assert_eq!(white.get_pixel(1, 0).0[0], 255);
        assert_eq!(white.get_pixel(2, 2).0[0], 0);
    }

    #[test]
    fn test_blue_noise_tiles_texture() {
        let texture = NoiseTexture::from_data(vec![0.2, 0.9, 0.9, 0.2], 2, 2).unwrap();
        let gray = GrayImage::from_pixel(6, 4, Luma([128]));
        let result = blue_noise_dither(&gray, &texture);

        for (x, y, pixel) in result.enumerate_pixels() {
            let expected = if (x + y) % 2 == 1 { 255 } else { 0 };
            assert_eq!(pixel.0[0], expected, "({}, {})", x, y);
        }
    }

    #[test]
    fn test_fixed_texture_is_reused() {
        let texture = NoiseTexture::from_data(vec![0.1, 0.6, 0.8, 0.4], 2, 2).unwrap();
        let options = DitherOptions {
            texture: Some(texture.clone()),
            ..Default::default()
        };
        let image = gradient(10, 10);

        let first = dither(&image, Method::BlueNoise, &options).unwrap();
        let second = dither(&image, Method::BlueNoise, &options).unwrap();
        assert_eq!(first.image, second.image);
        assert_eq!(first.image, blue_noise_dither(&to_grayscale(&image), &texture));
    }

    #[test]
    fn test_grayscale_input_accepted() {
        let gray = GrayImage::from_fn(9, 9, |x, y| Luma([((x + y) * 14) as u8]));
        let result = dither(
            &DynamicImage::ImageLuma8(gray.clone()),
            Method::Bayer,
            &DitherOptions::default(),
        )
        .unwrap();
        assert_eq!(result.image, bayer_dither(&gray, &ThresholdMatrix::standard()));
    }
}
