use anyhow::Result;
use rsmosaic::collect::global_variables::{get_temp_path, DEFAULT_ASSET_TYPE};
use rsmosaic::collect::planet::PlanetCollect;
use rsmosaic::commons::geojson_io;
use std::path::Path;

/// Example: activating and downloading assets for a reduced scene
/// collection, one scene at a time.
///
/// Expects the scene collection written by the `mosaic` or `reduce`
/// command and a valid API key in PL_API_KEY.
fn main() -> Result<()> {
    println!("=== Example: Downloading assets for a scene collection ===\n");

    let scenes = geojson_io::footprints_from_file(Path::new("mosaic_scenes.geojson"))?;
    println!("Scenes to download: {}", scenes.len());

    let collect = PlanetCollect::from_env()?;
    let dest_dir = get_temp_path();

    for (index, scene) in scenes.iter().enumerate() {
        let id = scene.id().unwrap_or("<no id>");
        println!("[{}/{}] activating {}", index + 1, scenes.len(), id);
        let path = collect.download_scene(scene.record(), DEFAULT_ASSET_TYPE, &dest_dir)?;
        println!("  -> {}", path.display());
    }

    println!("\nAll assets downloaded to {:?}", dest_dir);
    Ok(())
}
