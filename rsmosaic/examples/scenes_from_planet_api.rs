use anyhow::Result;
use geo::polygon;
use rsmosaic::collect::planet::PlanetCollect;
use rsmosaic::mosaic::scene_list::SceneSearch;
use rsmosaic::{coverage, reduce, Region};

/// Example: searching the Planet Data API for PlanetScope scenes over a
/// small region and reducing them to a minimal covering set.
///
/// Requires a valid API key in the PL_API_KEY environment variable.
fn main() -> Result<()> {
    println!("=== Example: Minimal scene set from the Planet Data API ===\n");

    // A small patch near San Francisco (WGS84).
    let region = Region::new(polygon![
        (x: -122.52, y: 37.70),
        (x: -122.35, y: 37.70),
        (x: -122.35, y: 37.82),
        (x: -122.52, y: 37.82),
    ])?;
    println!("Region area: {:.6} square degrees", region.area());

    let collect = PlanetCollect::from_env()?;
    let search = SceneSearch::new(&collect);

    println!("Searching the last 3 months of acquisitions...");
    let scenes = search.run(&region, 3)?;
    println!("Candidate scenes: {}", scenes.len());

    let full = coverage(&scenes, &region)?;
    let reduced = reduce(scenes, &region)?;
    println!(
        "Reduced to {} scenes at coverage {:.4}",
        reduced.len(),
        full
    );
    for footprint in &reduced {
        println!("  - {}", footprint.id().unwrap_or("<no id>"));
    }

    Ok(())
}
