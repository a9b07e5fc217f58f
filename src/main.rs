/**
 * Mono Dither CLI - dither images to black and white and generate noise textures
 */

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

use mono_dither::{
    generate_noise_texture, save_noise_to_png, DitherOptions, Ditherer, EdgeMode, Method,
    NoiseConfig, NoiseTexture,
};

/// Black and white dithering tools
#[derive(Parser)]
#[command(name = "mono-dither")]
#[command(version)]
#[command(about = "Dither images to pure black and white", long_about = None)]
struct Cli {
    /// Log debug details (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dither an image with one method or all of them
    Dither {
        /// Input image path
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory (defaults to the input's directory)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Dithering method
        #[arg(short, long, value_enum, default_value_t = MethodArg::All)]
        method: MethodArg,

        /// Random seed for reproducible random and blue-noise output
        #[arg(long)]
        seed: Option<u64>,

        /// Bayer matrix order (2, 4, 8 or 16)
        #[arg(long, default_value = "4")]
        bayer_order: usize,

        /// Noise texture size (width and height)
        #[arg(long, default_value = "64")]
        noise_size: usize,

        /// Gaussian kernel size for the noise texture (odd)
        #[arg(long, default_value = "7")]
        kernel_size: usize,

        /// Gaussian sigma for the noise texture
        #[arg(long, default_value = "1.5")]
        sigma: f32,

        /// Blur the noise texture with wrap-around edges
        #[arg(long)]
        wrap: bool,

        /// Use a pre-generated noise texture instead of generating one
        #[arg(short, long)]
        noise: Option<PathBuf>,
    },

    /// Generate a blurred noise texture
    Noise {
        /// Output file path
        #[arg(short, long, default_value = "noise.png")]
        output: PathBuf,

        /// Texture width in pixels
        #[arg(long, default_value = "64")]
        width: usize,

        /// Texture height in pixels
        #[arg(long, default_value = "64")]
        height: usize,

        /// Gaussian kernel size (odd)
        #[arg(long, default_value = "7")]
        kernel_size: usize,

        /// Gaussian sigma
        #[arg(long, default_value = "1.5")]
        sigma: f32,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Blur with wrap-around edges so the texture tiles seamlessly
        #[arg(long)]
        wrap: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum MethodArg {
    Bayer,
    Random,
    FloydSteinberg,
    BlueNoise,
    All,
}

impl MethodArg {
    fn methods(self) -> Vec<Method> {
        match self {
            MethodArg::Bayer => vec![Method::Bayer],
            MethodArg::Random => vec![Method::Random],
            MethodArg::FloydSteinberg => vec![Method::FloydSteinberg],
            MethodArg::BlueNoise => vec![Method::BlueNoise],
            MethodArg::All => Method::ALL.to_vec(),
        }
    }
}

const MAX_TEXTURE_SIZE: usize = 1024;

fn edge_mode(wrap: bool) -> EdgeMode {
    if wrap {
        EdgeMode::Wrap
    } else {
        EdgeMode::Reflect
    }
}

fn output_path(dir: &Path, input: &Path, method: Method) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    dir.join(format!("{}-{}.png", stem, method.slug()))
}

fn create_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).context("Failed to create output directory")?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::Dither {
            input,
            output_dir,
            method,
            seed,
            bayer_order,
            noise_size,
            kernel_size,
            sigma,
            wrap,
            noise,
        } => {
            // Validate inputs
            if !input.exists() {
                anyhow::bail!("Input file does not exist: {}", input.display());
            }
            if noise_size == 0 || noise_size > MAX_TEXTURE_SIZE {
                anyhow::bail!("Noise size must be between 1 and {}", MAX_TEXTURE_SIZE);
            }

            let texture = match &noise {
                Some(path) => Some(
                    NoiseTexture::load(path)
                        .with_context(|| format!("Failed to load noise texture {}", path.display()))?,
                ),
                None => None,
            };

            let options = DitherOptions {
                seed,
                bayer_order,
                noise: NoiseConfig {
                    width: noise_size,
                    height: noise_size,
                    kernel_size,
                    sigma,
                    edge_mode: edge_mode(wrap),
                },
                texture,
            };
            let ditherer = Ditherer::new(&options).context("Invalid dithering options")?;

            let image = image::open(&input)
                .with_context(|| format!("Failed to load image {}", input.display()))?;

            let dir = match output_dir {
                Some(dir) => dir,
                None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
            };
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(&dir).context("Failed to create output directory")?;
            }

            println!("Processing: {}", input.display());
            println!("Dimensions: {}×{}", image.width(), image.height());
            if let Some(s) = seed {
                println!("Seed: {}", s);
            }
            println!();

            let methods = method.methods();
            let progress = ProgressBar::new(methods.len() as u64);
            progress.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
                    .progress_chars("##-"),
            );

            let mut written = Vec::with_capacity(methods.len());
            for method in methods {
                progress.set_message(method.label());

                let result = ditherer.run(&image, method);
                let path = output_path(&dir, &input, method);
                result
                    .image
                    .save(&path)
                    .with_context(|| format!("Failed to save {}", path.display()))?;

                written.push((result.label(), path));
                progress.inc(1);
            }
            progress.finish_and_clear();

            for (label, path) in &written {
                println!("{}: {}", label, path.display());
            }
            println!();
            println!("Done!");
        }

        Commands::Noise {
            output,
            width,
            height,
            kernel_size,
            sigma,
            seed,
            wrap,
        } => {
            if width > MAX_TEXTURE_SIZE || height > MAX_TEXTURE_SIZE {
                anyhow::bail!("Texture dimensions must not exceed {}", MAX_TEXTURE_SIZE);
            }

            println!("Generating {}×{} noise texture", width, height);
            println!("Kernel: {} taps, sigma {}", kernel_size, sigma);
            if let Some(s) = seed {
                println!("Seed: {}", s);
            }
            println!("Output: {}", output.display());
            println!();

            create_parent_dir(&output)?;

            let config = NoiseConfig {
                width,
                height,
                kernel_size,
                sigma,
                edge_mode: edge_mode(wrap),
            };
            let texture = generate_noise_texture(&config, seed)
                .context("Failed to generate noise texture")?;

            save_noise_to_png(&texture, &output).context("Failed to save noise texture")?;

            println!("Done!");
        }
    }

    Ok(())
}
