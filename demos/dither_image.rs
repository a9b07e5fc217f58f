/**
 * Example: Dither an image with every method
 *
 * Builds a horizontal gradient, dithers it with all four methods and
 * writes one PNG per method.
 *
 * Run with:
 *   cargo run --example dither_image
 */

use image::{DynamicImage, Rgb, RgbImage};
use mono_dither::{dither_all, DitherOptions};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Dithering Example\n");

    // Create a simple test gradient image
    println!("Step 1: Creating test gradient image...");
    let width = 256;
    let height = 64;
    let gradient = RgbImage::from_fn(width, height, |x, _| {
        let value = (x * 255 / (width - 1)) as u8;
        Rgb([value, value, value])
    });
    gradient.save("example-gradient.png")?;
    println!("  ✓ Saved example-gradient.png\n");

    // Dither with all four methods
    println!("Step 2: Dithering...");
    let options = DitherOptions {
        seed: Some(42),
        ..Default::default()
    };

    for result in dither_all(&DynamicImage::ImageRgb8(gradient), &options)? {
        let filename = format!("example-dithered-{}.png", result.method.slug());
        result.image.save(&filename)?;
        println!("  ✓ {} -> {}", result.label(), filename);
    }

    println!("\n✓ All methods completed!");

    Ok(())
}
