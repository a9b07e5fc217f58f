//! Mono Dither Library
//!
//! Reduces raster images to pure black and white with four classic
//! dithering methods:
//!
//! - **Bayer**: ordered dithering against a tiled 4×4 threshold matrix
//! - **Random**: independent uniform noise added before thresholding
//! - **Floyd-Steinberg**: error diffusion to four unvisited neighbours
//! - **Blue noise**: thresholding against a tiled, blurred noise texture
//!
//! Every method grayscale-converts its input and returns a single-channel
//! image of the same size whose samples are 0 or 255. The one exception is
//! Floyd-Steinberg, which leaves the first column, last column and last row
//! at their grayscale values.
//!
//! # Quick Start
//!
//! ```no_run
//! use mono_dither::{dither_all, DitherOptions};
//!
//! let image = image::open("input.jpg").unwrap();
//! let options = DitherOptions {
//!     seed: Some(42),
//!     ..Default::default()
//! };
//!
//! for result in dither_all(&image, &options).unwrap() {
//!     let name = format!("output-{}.png", result.method.slug());
//!     result.image.save(name).unwrap();
//! }
//! ```
//!
//! ## Noise Textures
//!
//! ```no_run
//! use mono_dither::{generate_noise_texture, save_noise_to_png, EdgeMode, NoiseConfig};
//!
//! let config = NoiseConfig {
//!     width: 128,
//!     height: 128,
//!     edge_mode: EdgeMode::Wrap,
//!     ..Default::default()
//! };
//!
//! let texture = generate_noise_texture(&config, Some(7)).unwrap();
//! save_noise_to_png(&texture, "noise.png").unwrap();
//! ```
//!
//! # Randomness
//!
//! Random and blue-noise dithering draw from a generator that is created
//! for each call. With `DitherOptions::seed` set the output is
//! reproducible; without it the generator is seeded from the clock.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Error diffusion module
pub mod diffusion;
/// Method dispatch and blue-noise dithering
pub mod dither;
/// Noise texture generation module
pub mod generator;
/// Grayscale conversion
pub mod gray;
/// Ordered (Bayer) dithering
pub mod ordered;
/// Random dithering and generator seeding
pub mod random;

// Re-export main types for convenience
pub use diffusion::{floyd_steinberg_dither, ErrorAccumulator};
pub use dither::{
    blue_noise_dither, dither, dither_all, Bayer, BlueNoise, Dither, DitherError, DitherOptions,
    Dithered, Ditherer, FloydSteinberg, Method, RandomThreshold,
};
pub use generator::{
    generate_noise_texture, save_noise_to_png, EdgeMode, GeneratorError, NoiseConfig,
    NoiseGenerator, NoiseTexture,
};
pub use gray::to_grayscale;
pub use ordered::{bayer_dither, ThresholdMatrix};
pub use random::{random_dither, seeded_rng};
