/**
 * Example: Generate a noise texture
 *
 * This example generates the blurred noise texture used by blue-noise
 * dithering, once with reflected edges and once with wrapped edges, and
 * saves both to PNG files.
 *
 * Run with:
 *   cargo run --example generate_texture
 */

use mono_dither::{generate_noise_texture, save_noise_to_png, EdgeMode, NoiseConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Generating noise textures...\n");

    for (name, edge_mode) in [("reflect", EdgeMode::Reflect), ("wrap", EdgeMode::Wrap)] {
        let config = NoiseConfig {
            width: 64,
            height: 64,
            edge_mode,
            ..Default::default()
        };

        // Use a seed for reproducibility
        let texture = generate_noise_texture(&config, Some(42))?;

        let filename = format!("example-noise-{}.png", name);
        save_noise_to_png(&texture, &filename)?;

        println!("{:<8} -> {}", name, filename);
    }

    println!("\nThe wrapped texture tiles without visible seams.");

    Ok(())
}
