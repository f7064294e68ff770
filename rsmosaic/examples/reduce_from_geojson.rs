use anyhow::Result;
use geo::polygon;
use rsmosaic::{coverage, reduce, Footprint, Region};
use serde_json::json;

/// Example: reducing a redundant scene stack over a unit region, offline.
fn main() -> Result<()> {
    println!("=== Example: Redundancy reduction over a synthetic region ===\n");

    let region = Region::new(polygon![
        (x: 0.0, y: 0.0),
        (x: 1.0, y: 0.0),
        (x: 1.0, y: 1.0),
        (x: 0.0, y: 1.0),
    ])?;

    // Five overlapping scenes: one full cover, two halves, two slivers.
    let footprints = vec![
        Footprint::new(
            polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)],
            json!({"id": "full"}),
        )?,
        Footprint::new(
            polygon![(x: 0.0, y: 0.0), (x: 0.5, y: 0.0), (x: 0.5, y: 1.0), (x: 0.0, y: 1.0)],
            json!({"id": "left-half"}),
        )?,
        Footprint::new(
            polygon![(x: 0.5, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.5, y: 1.0)],
            json!({"id": "right-half"}),
        )?,
        Footprint::new(
            polygon![(x: 0.2, y: 0.2), (x: 0.4, y: 0.2), (x: 0.4, y: 0.4), (x: 0.2, y: 0.4)],
            json!({"id": "sliver-1"}),
        )?,
        Footprint::new(
            polygon![(x: 0.6, y: 0.6), (x: 0.8, y: 0.6), (x: 0.8, y: 0.8), (x: 0.6, y: 0.8)],
            json!({"id": "sliver-2"}),
        )?,
    ];

    let before = coverage(&footprints, &region)?;
    println!("Coverage with {} scenes: {:.4}", footprints.len(), before);

    let reduced = reduce(footprints, &region)?;
    println!("Scenes kept after reduction: {}", reduced.len());
    for footprint in &reduced {
        println!("  - {}", footprint.id().unwrap_or("<no id>"));
    }

    let after = coverage(&reduced, &region)?;
    println!("Coverage after reduction: {:.4}", after);

    Ok(())
}
