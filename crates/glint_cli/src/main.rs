// Render a JSON scene description to a PNG.
// Run with: cargo run --release --bin glint -- <scene.json> <out.png>

use anyhow::{Context, Result};
use glint_core::{SceneDescription, TextureCache};
use glint_renderer::{render_with_progress, RenderConfig, Scene};
use std::env;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <scene.json> <out.png>", args[0]);
        std::process::exit(1);
    }

    let scene_path = Path::new(&args[1]);
    let output_path = Path::new(&args[2]);

    let json = std::fs::read_to_string(scene_path)
        .with_context(|| format!("Failed to read scene {}", scene_path.display()))?;
    let desc: SceneDescription = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse scene {}", scene_path.display()))?;

    // Image paths in the scene are relative to the scene file
    let base_dir = scene_path.parent().unwrap_or_else(|| Path::new("."));
    let textures = TextureCache::with_base_dir(base_dir);

    let scene = Scene::from_description(&desc, &textures).context("Invalid scene")?;
    let config = RenderConfig::from_description(&desc);

    log::info!(
        "Loaded {}: {} primitives, {} lights, {} textures ({:.1} MB)",
        scene_path.display(),
        scene.primitive_count(),
        scene.lights.len(),
        textures.len(),
        textures.total_size_bytes() as f64 / (1024.0 * 1024.0)
    );

    // Log roughly every tenth of the frame
    let last_decile = AtomicUsize::new(0);
    let image = render_with_progress(&scene, &config, |progress| {
        let decile = progress.completed * 10 / progress.total.max(1);
        if last_decile.fetch_max(decile, Ordering::Relaxed) < decile {
            log::info!("{}% ({}/{} pixels)", decile * 10, progress.completed, progress.total);
        }
    })?;

    let rgba = image::RgbaImage::from_raw(image.width, image.height, image.to_rgba())
        .context("Rendered buffer does not match the image size")?;
    rgba.save(output_path)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    log::info!("Wrote {}", output_path.display());
    Ok(())
}
