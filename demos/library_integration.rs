/**
 * Example: Using mono-dither as a library
 *
 * Shows the lower-level building blocks: driving a single algorithm
 * through the `Dither` trait, reusing one noise texture across several
 * images, and inspecting the error accumulator directly.
 *
 * Run with:
 *   cargo run --example library_integration
 */

use image::{GrayImage, Luma};
use mono_dither::{
    blue_noise_dither, generate_noise_texture, seeded_rng, Bayer, Dither, ErrorAccumulator,
    NoiseConfig,
};

fn create_test_image(size: u32) -> GrayImage {
    // Radial gradient, bright in the centre
    let center = size as f32 / 2.0;
    let max_dist = (2.0 * center * center).sqrt();

    GrayImage::from_fn(size, size, |x, y| {
        let dx = x as f32 - center;
        let dy = y as f32 - center;
        let dist = (dx * dx + dy * dy).sqrt();
        Luma([((1.0 - dist / max_dist) * 255.0) as u8])
    })
}

fn white_fraction(image: &GrayImage) -> f32 {
    let white = image.pixels().filter(|p| p.0[0] == 255).count();
    white as f32 / (image.width() * image.height()) as f32
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Library Integration Example\n");

    let input = create_test_image(200);
    let mut rng = seeded_rng(Some(7));

    // 1. One algorithm through the trait, with an 8×8 matrix
    let bayer = Bayer::new(8)?;
    let ordered = bayer.dither(&input, &mut rng);
    println!(
        "{} (8×8): {:.1}% white",
        bayer.method().label(),
        white_fraction(&ordered) * 100.0
    );

    // 2. One texture shared by several images
    let texture = generate_noise_texture(&NoiseConfig::default(), Some(7))?;
    for size in [50, 100, 200] {
        let result = blue_noise_dither(&create_test_image(size), &texture);
        println!(
            "Blue noise at {}×{}: {:.1}% white",
            size,
            size,
            white_fraction(&result) * 100.0
        );
    }

    // 3. A single error diffusion step
    let flat = GrayImage::from_pixel(3, 3, Luma([200]));
    let mut accumulator = ErrorAccumulator::from_gray(&flat);
    let (level, error) = accumulator.visit(1, 0);
    println!(
        "\nVisiting (1, 0): level {}, error {}, right neighbour now {}",
        level,
        error,
        accumulator.get(2, 0)
    );

    input.save("example-radial.png")?;
    ordered.save("example-radial-bayer8.png")?;
    println!("\n✓ Saved example-radial.png and example-radial-bayer8.png");

    Ok(())
}
